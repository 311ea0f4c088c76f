//! Isolated loading contexts.
//!
//! An [`IsolatedContext`] is the private namespace of one module for one target: it
//! sees the module's resolved files and nothing else, not even sibling contexts.
//! Resources are addressed by their `/`-separated path relative to the artifact that
//! holds them. Resources ending in [`DEFINITION_EXTENSION`] are definitions and are
//! addressed by dotted name, so `io/rules/okhttp/TracingInterceptor.def` is the
//! definition `io.rules.okhttp.TracingInterceptor`.

use std::cell::RefCell ;
use std::collections::HashSet ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use std::sync::atomic::{ AtomicBool, Ordering };
use indexmap::{ IndexMap, IndexSet };
use nonempty_collections::NEVec ;
use parking_lot::{ Mutex, RwLock };
use walkdir::WalkDir ;

use crate::{ Manifest, TargetContext, TargetId };



/// File extension marking a resource as a definition.
pub const DEFINITION_EXTENSION: &str = "def" ;

/// Resource path holding the definition `name`.
pub fn definition_resource( name: &str ) -> String {
	format!( "{}.{}", name.replace( '.', "/" ), DEFINITION_EXTENSION )
}

thread_local! {
	/// Targets this thread is currently transferring definitions into, innermost last.
	static TRANSFERS: RefCell<Vec<TargetId>> = const { RefCell::new( Vec::new() )};
}

/// Whether this thread is in the middle of transferring definitions into `target`.
pub(crate) fn transfer_in_progress( target: TargetId ) -> bool {
	TRANSFERS.with_borrow(| transfers | transfers.contains( &target ))
}

/// Marks a transfer into one target for as long as it lives.
struct TransferGuard( TargetId );

impl TransferGuard {
	fn enter( target: TargetId ) -> Self {
		TRANSFERS.with_borrow_mut(| transfers | transfers.push( target ));
		Self( target )
	}
}

impl Drop for TransferGuard {
	fn drop( &mut self ) {
		TRANSFERS.with_borrow_mut(| transfers | {
			if let Some( position ) = transfers.iter().rposition(| target | *target == self.0 ) {
				transfers.remove( position );
			}
		});
	}
}

fn definition_name( resource: &str ) -> Option<String> {
	resource.strip_suffix( DEFINITION_EXTENSION )
		.and_then(| stem | stem.strip_suffix( '.' ))
		.filter(| stem | !stem.is_empty() )
		.map(| stem | stem.replace( '/', "." ))
}

/// The private namespace of one module, created for one target.
pub struct IsolatedContext {
	manifest: Arc<Manifest>,
	parent_target: TargetId,
	resolved_files: IndexSet<PathBuf>,
	index: RwLock<IndexMap<String, Vec<PathBuf>>>,
	closed: AtomicBool,
	injected: Mutex<HashSet<TargetId>>,
}

impl IsolatedContext {

	/// Indexes `resolved_files`. Never fails: unreadable entries are logged and left out.
	pub fn new(
		manifest: Arc<Manifest>,
		parent_target: TargetId,
		resolved_files: impl IntoIterator<Item = PathBuf>,
	) -> Self {
		let resolved_files = resolved_files.into_iter().collect::<IndexSet<_>>();
		let index = Self::index( &manifest, &resolved_files );
		Self {
			manifest,
			parent_target,
			resolved_files,
			index: RwLock::new( index ),
			closed: AtomicBool::new( false ),
			injected: Mutex::new( HashSet::new() ),
		}
	}

	fn index( manifest: &Manifest, files: &IndexSet<PathBuf> ) -> IndexMap<String, Vec<PathBuf>> {
		let mut index = IndexMap::<String, Vec<PathBuf>>::new();
		for root in files {
			for entry in WalkDir::new( root ).sort_by_file_name() {
				let entry = match entry {
					Ok( entry ) => entry,
					Err( err ) => {
						tracing::warn!( module = manifest.name(), error = %err, "Skipping unreadable entry" );
						continue ;
					}
				};
				if !entry.file_type().is_file() { continue }
				let Some( name ) = Self::resource_name( root, entry.path() ) else { continue };
				index.entry( name ).or_default().push( entry.into_path() );
			}
		}
		index
	}

	/// `/`-separated path of `path` relative to its artifact. A file artifact holds a
	/// single resource named after the file.
	fn resource_name( root: &Path, path: &Path ) -> Option<String> {
		let relative = match path == root {
			true => Path::new( path.file_name()? ),
			false => path.strip_prefix( root ).ok()?,
		};
		relative.components()
			.map(| component | component.as_os_str().to_str() )
			.collect::<Option<Vec<_>>>()
			.map(| parts | parts.join( "/" ))
	}

	#[inline] pub fn manifest( &self ) -> &Arc<Manifest> { &self.manifest }

	/// The target this context was created for.
	#[inline] pub fn parent_target( &self ) -> TargetId { self.parent_target }

	#[inline] pub fn resolved_files( &self ) -> &IndexSet<PathBuf> { &self.resolved_files }

	#[inline] pub fn is_closed( &self ) -> bool { self.closed.load( Ordering::Acquire ) }

	/// Releases the resource index. Idempotent.
	pub fn close( &self ) {
		if !self.closed.swap( true, Ordering::AcqRel ) {
			self.index.write().clear();
			tracing::trace!( module = self.manifest.name(), scope = %self.parent_target, "Closed isolated context" );
		}
	}

	/// Dotted names of every definition in this context, in index order.
	pub fn definition_names( &self ) -> Vec<String> {
		self.index.read().keys().filter_map(| resource | definition_name( resource )).collect()
	}

	/// Whether attaching this context to `target` introduces no conflicting definitions.
	///
	/// Conflicting means a definition with the same name is already visible from the
	/// target with different content. Walks the whole index; callers cache the result.
	pub fn is_compatible( &self, target: &dyn TargetContext ) -> bool {
		self.is_compatible_with( target, | _: &str | None )
	}

	/// Like [`is_compatible`]( Self::is_compatible ), but definitions the target doesn't
	/// see itself are also looked up in `attached`: module code already made visible to
	/// the target outside of it, such as shared search paths.
	pub fn is_compatible_with( &self, target: &dyn TargetContext, attached: impl Fn( &str ) -> Option<Arc<[u8]>> ) -> bool {
		for name in self.definition_names() {
			let Some( visible ) = target.find_definition( &name ).or_else(|| attached( &name )) else { continue };
			match self.lookup_definition( &name ) {
				Some( own ) if own == visible => {},
				_ => {
					tracing::debug!(
						module = self.manifest.name(),
						scope = ?target,
						definition = %name,
						"Definition already visible with different content",
					);
					return false
				}
			}
		}
		true
	}

	/// Content of the definition `name`.
	pub fn lookup_definition( &self, name: &str ) -> Option<Arc<[u8]>> {
		let path = self.lookup_resource( &definition_resource( name ))?;
		match std::fs::read( &path ) {
			Ok( bytes ) => Some( bytes.into() ),
			Err( err ) => {
				tracing::warn!( module = self.manifest.name(), path = %path.display(), error = %err, "Cannot read definition" );
				None
			}
		}
	}

	/// First file providing the resource `name`.
	pub fn lookup_resource( &self, name: &str ) -> Option<PathBuf> {
		if self.closed_lookup( name ) { return None }
		self.index.read().get( name ).and_then(| paths | paths.first().cloned() )
	}

	/// Every file providing the resource `name`, in resolution order.
	pub fn lookup_all_resources( &self, name: &str ) -> Option<NEVec<PathBuf>> {
		if self.closed_lookup( name ) { return None }
		self.index.read().get( name ).and_then(| paths | NEVec::try_from_vec( paths.clone() ))
	}

	fn closed_lookup( &self, name: &str ) -> bool {
		let closed = self.is_closed();
		if closed { tracing::trace!( module = self.manifest.name(), resource = name, "Lookup on closed context" )}
		closed
	}

	/// Transfers every definition not yet visible from `target` into it.
	///
	/// Runs at most once per target; later calls return 0. Returns the number of
	/// definitions the target accepted.
	///
	/// Calls made on this thread while a transfer into the same target is underway
	/// (from inside [`TargetContext::define`]) return 0 and leave the transfer for a
	/// later call.
	pub fn inject( &self, target: &dyn TargetContext ) -> usize {
		if self.is_closed() { return 0 }
		if transfer_in_progress( target.id() ) {
			tracing::trace!( module = self.manifest.name(), scope = ?target, "Transfer underway, injection postponed" );
			return 0
		}
		if !self.injected.lock().insert( target.id() ) { return 0 }
		let _transfer = TransferGuard::enter( target.id() );
		tracing::trace!( module = self.manifest.name(), scope = ?target, "Injecting definitions" );
		self.definition_names().into_iter()
			.filter(| name | target.find_definition( name ).is_none() )
			.filter_map(| name | self.lookup_definition( &name ).map(| bytes | ( name, bytes )))
			.filter(|( name, bytes )| match target.define( name, Arc::clone( bytes )) {
				Ok(()) => true,
				Err( err ) => {
					tracing::debug!( module = self.manifest.name(), scope = ?target, error = %err, "Definition not transferred" );
					false
				}
			})
			.count()
	}

	/// Whether definitions were already transferred into `target`.
	pub fn is_injected( &self, target: TargetId ) -> bool { self.injected.lock().contains( &target )}

}

impl std::fmt::Debug for IsolatedContext {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "IsolatedContext" )
			.field( "module", &self.manifest.name() )
			.field( "parent_target", &self.parent_target )
			.field( "resolved_files", &self.resolved_files )
			.field( "closed", &self.is_closed() )
			.finish_non_exhaustive()
	}
}
