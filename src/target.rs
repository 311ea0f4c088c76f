//! Target contexts.
//!
//! A target is a pre-existing visibility scope of the host into which a module's
//! definitions may have to be made reachable. Targets form a tree: every target but
//! the bootstrap scope has a parent, and a target sees everything its ancestors see.
//!
//! The host describes its scopes through [`TargetContext`]. [`Scope`] is a plain
//! in-memory implementation for hosts that don't have a namespace of their own.

use std::collections::HashMap ;
use std::sync::Arc ;
use std::sync::atomic::{ AtomicU64, Ordering };
use parking_lot::RwLock ;

use crate::DefineError ;



/// Unique identifier of a target context.
#[derive( Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord )]
pub struct TargetId( u64 );

impl TargetId {
	/// Creates a new target identifier from a `u64`.
	pub const fn new( id: u64 ) -> Self { Self( id )}
}

impl std::fmt::Display for TargetId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> Result<(), std::fmt::Error> {
		write!( f, "#{}", self.0 )
	}
}

impl From<TargetId> for u64 {
	fn from( id: TargetId ) -> Self { id.0 }
}

/// Where in the scope tree a target sits.
///
/// Determines how an attached module is made visible: bootstrap and application
/// targets receive the module's files on a global search path, nested targets get the
/// isolated context registered against them.
#[derive( Copy, Clone, Debug, Eq, Hash, PartialEq )]
pub enum TargetKind {
	/// The root scope, visible to everything.
	Bootstrap,
	/// The top-level application scope.
	Application,
	/// Any scope below the application scope.
	Nested,
}

/// A visibility scope of the host.
///
/// # Re-entrancy
///
/// The engine calls [`define`]( Self::define ) while transferring definitions. If the
/// host reacts to a definition by requesting further attachments, it must pass
/// [`CallOrigin::Definition`]( crate::CallOrigin::Definition ) so those attachments
/// are deferred instead of transferring from inside a transfer.
pub trait TargetContext: Send + Sync {
	/// Identifier of this scope. Must be stable and unique for the scope's lifetime.
	fn id( &self ) -> TargetId ;

	fn kind( &self ) -> TargetKind ;

	/// The enclosing scope, `None` for the bootstrap scope.
	fn parent( &self ) -> Option<Arc<dyn TargetContext>> ;

	/// The definition visible under `name` from this scope, if any, including what is
	/// inherited from ancestors.
	fn find_definition( &self, name: &str ) -> Option<Arc<[u8]>> ;

	/// Makes a definition visible in this scope.
	///
	/// # Errors
	/// Hosts may reject a definition; the engine logs and skips it.
	fn define( &self, name: &str, bytes: Arc<[u8]> ) -> Result<(), DefineError> ;
}

impl std::fmt::Debug for dyn TargetContext + '_ {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		write!( f, "{:?}{}", self.kind(), self.id() )
	}
}

type DefineHook = Box<dyn Fn( &str ) + Send + Sync>;

/// In-memory [`TargetContext`].
///
/// Lookups are parent-first: a definition held by an ancestor shadows one held here.
pub struct Scope {
	id: TargetId,
	kind: TargetKind,
	parent: Option<Arc<dyn TargetContext>>,
	definitions: RwLock<HashMap<String, Arc<[u8]>>>,
	on_define: Option<DefineHook>,
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new( 0 );

impl Scope {

	/// Creates a scope with a fresh identifier.
	pub fn new( kind: TargetKind, parent: Option<Arc<dyn TargetContext>> ) -> Self {
		Self {
			id: TargetId::new( NEXT_SCOPE_ID.fetch_add( 1, Ordering::Relaxed )),
			kind,
			parent,
			definitions: RwLock::new( HashMap::new() ),
			on_define: None,
		}
	}

	pub fn bootstrap() -> Self { Self::new( TargetKind::Bootstrap, None )}

	pub fn application( parent: Arc<dyn TargetContext> ) -> Self { Self::new( TargetKind::Application, Some( parent ))}

	pub fn nested( parent: Arc<dyn TargetContext> ) -> Self { Self::new( TargetKind::Nested, Some( parent ))}

	/// Adds definitions the scope holds on its own, before any module is attached.
	pub fn with_definitions( self, definitions: impl IntoIterator<Item = ( impl Into<String>, impl Into<Arc<[u8]>> )>) -> Self {
		self.definitions.write().extend( definitions.into_iter().map(|( name, bytes )| ( name.into(), bytes.into() )));
		self
	}

	/// Installs a callback run after every successful [`define`]( TargetContext::define ).
	pub fn with_define_hook( mut self, hook: impl Fn( &str ) + Send + Sync + 'static ) -> Self {
		self.on_define = Some( Box::new( hook ));
		self
	}

	/// Names defined directly in this scope, sorted.
	pub fn defined_names( &self ) -> Vec<String> {
		let mut names = self.definitions.read().keys().cloned().collect::<Vec<_>>();
		names.sort();
		names
	}

}

impl TargetContext for Scope {

	fn id( &self ) -> TargetId { self.id }

	fn kind( &self ) -> TargetKind { self.kind }

	fn parent( &self ) -> Option<Arc<dyn TargetContext>> { self.parent.clone() }

	fn find_definition( &self, name: &str ) -> Option<Arc<[u8]>> {
		self.parent.as_ref()
			.and_then(| parent | parent.find_definition( name ))
			.or_else(|| self.definitions.read().get( name ).cloned() )
	}

	fn define( &self, name: &str, bytes: Arc<[u8]> ) -> Result<(), DefineError> {
		{
			let mut definitions = self.definitions.write();
			if definitions.contains_key( name ) { return Err( DefineError::Duplicate( name.to_string() )) }
			definitions.insert( name.to_string(), bytes );
		}
		// lock released: the hook may call back into this scope
		if let Some( hook ) = &self.on_define { hook( name ) }
		Ok(())
	}

}

impl std::fmt::Debug for Scope {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Scope" )
			.field( "id", &self.id )
			.field( "kind", &self.kind )
			.field( "parent", &self.parent.as_ref().map(| parent | parent.id() ))
			.field( "definitions", &self.defined_names() )
			.finish_non_exhaustive()
	}
}
