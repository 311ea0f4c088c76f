//! Target → isolated context association and the chain-walk lookup protocol.
//!
//! Every lookup a target makes for module code goes through
//! [`ContextRegistry::lookup_chain`]: starting at the target and moving outwards
//! through its ancestors, the contexts attached at each level are handed to a
//! [`ChainOperation`]. The first level producing a result ends the walk.

use std::collections::HashMap ;
use std::path::PathBuf ;
use std::sync::Arc ;
use nonempty_collections::NEVec ;
use parking_lot::{ Mutex, RwLock };

use crate::{ IsolatedContext, TargetContext, TargetId };



/// One step of the chain walk.
///
/// Called with the target the lookup started from, the looked-up name (if any), the
/// contexts attached at the current level, and the level itself. Returning `Some`
/// stops the walk.
pub trait ChainOperation {
	type Output ;

	fn apply(
		&self,
		target: &dyn TargetContext,
		name: Option<&str>,
		contexts: &[Arc<IsolatedContext>],
		level: &dyn TargetContext,
	) -> Option<Self::Output> ;
}

type ContextList = Arc<Mutex<Vec<Arc<IsolatedContext>>>>;

/// Maps targets to the isolated contexts attached to them, in attachment order.
#[derive( Default )]
pub struct ContextRegistry {
	lists: RwLock<HashMap<TargetId, ContextList>>,
}

impl ContextRegistry {

	pub fn new() -> Self { Self::default() }

	/// Appends `context` to the contexts of `target` unless it is already there.
	///
	/// Returns whether the context was added.
	pub fn attach( &self, target: TargetId, context: Arc<IsolatedContext> ) -> bool {

		let list = self.lists.read().get( &target ).cloned();
		let list = match list {
			Some( list ) => list,
			None => Arc::clone( self.lists.write().entry( target ).or_default() ),
		};

		let mut contexts = list.lock();
		if contexts.iter().any(| attached | Arc::ptr_eq( attached, &context )) { return false }
		tracing::trace!( module = context.manifest().name(), scope = %target, "Attached isolated context" );
		contexts.push( context );
		true

	}

	/// Snapshot of the contexts attached to `target`, `None` if nothing ever was.
	pub fn contexts( &self, target: TargetId ) -> Option<Vec<Arc<IsolatedContext>>> {
		let list = self.lists.read().get( &target ).cloned()?;
		let snapshot = list.lock().clone();
		Some( snapshot )
	}

	/// Walks from `target` to the root, applying `operation` at every level that has
	/// attached contexts, and returns the first result.
	pub fn lookup_chain<O: ChainOperation + ?Sized>(
		&self,
		target: &dyn TargetContext,
		name: Option<&str>,
		operation: &O,
	) -> Option<O::Output> {

		let mut ancestor: Option<Arc<dyn TargetContext>> = None ;
		loop {
			let level = ancestor.as_deref().unwrap_or( target );
			if let Some( contexts ) = self.contexts( level.id() ) {
				if let Some( output ) = operation.apply( target, name, &contexts, level ) {
					return Some( output );
				}
			}
			ancestor = Some( level.parent()? );
		}

	}

	pub(crate) fn clear( &self ) { self.lists.write().clear() }

}

impl std::fmt::Debug for ContextRegistry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_map()
			.entries( self.lists.read().iter().map(|( target, list )| ( *target, list.lock().len() )))
			.finish()
	}
}

/// Marker returned by [`Inject`] once a level with attached contexts was reached.
#[derive( Copy, Clone, Debug, PartialEq, Eq )]
pub struct Injected ;

/// Transfers definitions from every open context at the first level that has any.
///
/// Always yields [`Injected`] so the walk stops there, whatever each context did.
#[derive( Copy, Clone, Debug, Default )]
pub struct Inject ;

impl ChainOperation for Inject {
	type Output = Injected ;

	fn apply( &self, _: &dyn TargetContext, _: Option<&str>, contexts: &[Arc<IsolatedContext>], level: &dyn TargetContext ) -> Option<Injected> {
		contexts.iter()
			.filter(| context | !context.is_closed() )
			.for_each(| context | { context.inject( level ); });
		Some( Injected )
	}
}

/// Content of the first matching definition.
#[derive( Copy, Clone, Debug, Default )]
pub struct FindDefinition ;

impl ChainOperation for FindDefinition {
	type Output = Arc<[u8]>;

	fn apply( &self, target: &dyn TargetContext, name: Option<&str>, contexts: &[Arc<IsolatedContext>], _: &dyn TargetContext ) -> Option<Arc<[u8]>> {
		let name = name?;
		let found = contexts.iter()
			.filter(| context | !context.is_closed() )
			.find_map(| context | context.lookup_definition( name ));
		tracing::trace!( scope = ?target, definition = name, found = found.is_some(), "Definition lookup" );
		found
	}
}

/// Path of the first matching resource.
#[derive( Copy, Clone, Debug, Default )]
pub struct FindResource ;

impl ChainOperation for FindResource {
	type Output = PathBuf ;

	fn apply( &self, _: &dyn TargetContext, name: Option<&str>, contexts: &[Arc<IsolatedContext>], _: &dyn TargetContext ) -> Option<PathBuf> {
		let name = name?;
		contexts.iter()
			.filter(| context | !context.is_closed() )
			.find_map(| context | context.lookup_resource( name ))
	}
}

/// Every path of the resource, from the first context that has any.
#[derive( Copy, Clone, Debug, Default )]
pub struct FindAllResources ;

impl ChainOperation for FindAllResources {
	type Output = NEVec<PathBuf>;

	fn apply( &self, _: &dyn TargetContext, name: Option<&str>, contexts: &[Arc<IsolatedContext>], _: &dyn TargetContext ) -> Option<NEVec<PathBuf>> {
		let name = name?;
		contexts.iter()
			.filter(| context | !context.is_closed() )
			.find_map(| context | context.lookup_all_resources( name ))
	}
}
