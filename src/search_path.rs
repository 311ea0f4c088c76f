//! Always-visible search paths.
//!
//! Modules attached to the bootstrap or application scope aren't registered per
//! target: their files are appended to a search path every scope below sees.

use std::path::PathBuf ;
use std::sync::Arc ;
use indexmap::IndexSet ;
use nonempty_collections::NEVec ;
use parking_lot::RwLock ;

use crate::IsolatedContext ;



#[derive( Default )]
struct Entries {
	files: IndexSet<PathBuf>,
	contexts: Vec<Arc<IsolatedContext>>,
}

/// An append-only list of files, searched in append order.
#[derive( Default )]
pub struct SearchPath {
	entries: RwLock<Entries>,
}

impl SearchPath {

	pub fn new() -> Self { Self::default() }

	/// Appends the files of `context`. Files already on the path are not added twice.
	///
	/// Returns how many files were new.
	pub fn append( &self, context: &Arc<IsolatedContext> ) -> usize {
		let mut entries = self.entries.write();
		if !entries.contexts.iter().any(| known | Arc::ptr_eq( known, context )) {
			entries.contexts.push( Arc::clone( context ));
		}
		context.resolved_files().iter()
			.filter(| file | entries.files.insert(( *file ).clone() ))
			.count()
	}

	/// Snapshot of the files on the path, in append order.
	pub fn files( &self ) -> Vec<PathBuf> { self.entries.read().files.iter().cloned().collect() }

	pub fn contains( &self, file: &std::path::Path ) -> bool { self.entries.read().files.contains( file )}

	pub fn find_definition( &self, name: &str ) -> Option<Arc<[u8]>> {
		self.contexts().iter().find_map(| context | context.lookup_definition( name ))
	}

	pub fn find_resource( &self, name: &str ) -> Option<PathBuf> {
		self.contexts().iter().find_map(| context | context.lookup_resource( name ))
	}

	/// Every path of the resource across the whole search path.
	pub fn find_all_resources( &self, name: &str ) -> Option<NEVec<PathBuf>> {
		let paths = self.contexts().iter()
			.filter_map(| context | context.lookup_all_resources( name ))
			.flatten()
			.collect::<IndexSet<_>>();
		NEVec::try_from_vec( paths.into_iter().collect() )
	}

	fn contexts( &self ) -> Vec<Arc<IsolatedContext>> { self.entries.read().contexts.clone() }

	pub(crate) fn clear( &self ) { *self.entries.write() = Entries::default() }

}

impl std::fmt::Debug for SearchPath {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_list().entries( self.entries.read().files.iter() ).finish()
	}
}
