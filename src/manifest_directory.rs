//! The process-wide set of discovered modules.
//!
//! Discovery and ordering are separate steps: [`ManifestDirectory::put`] only records
//! availability (in discovery order) and [`ManifestDirectory::sort`] establishes the
//! activation order. Once dependency descriptors are resolved, each module is
//! crosslinked to its resolved files with [`ManifestDirectory::crosslink`].

use std::collections::HashMap ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use indexmap::IndexMap ;
use parking_lot::RwLock ;

use crate::{ LoadError, Manifest };



struct Entry {
	discovered: usize,
	manifest: Arc<Manifest>,
}

#[derive( Default )]
struct Crosslink {
	dependencies: HashMap<PathBuf, Arc<[PathBuf]>>,
	versions: HashMap<String, String>,
}

/// Ordered mapping `source location -> manifest`.
///
/// Safe to share between threads; writers are serialized, readers run concurrently.
#[derive( Default )]
pub struct ManifestDirectory {
	entries: RwLock<IndexMap<PathBuf, Entry>>,
	crosslink: RwLock<Crosslink>,
}

impl ManifestDirectory {

	pub fn new() -> Self { Self::default() }

	/// Registers a manifest under its source location.
	///
	/// Putting an equal manifest again is a no-op and returns the registered instance.
	///
	/// # Errors
	/// [`LoadError::DuplicateManifest`] if a different manifest already claims the location.
	pub fn put( &self, manifest: impl Into<Arc<Manifest>> ) -> Result<Arc<Manifest>, LoadError> {
		let manifest = manifest.into();
		let mut entries = self.entries.write();
		if let Some( existing ) = entries.get( manifest.source_location() ) {
			return match Arc::ptr_eq( &existing.manifest, &manifest ) || *existing.manifest == *manifest {
				true => Ok( Arc::clone( &existing.manifest )),
				false => Err( LoadError::DuplicateManifest( manifest.source_location().to_path_buf() )),
			};
		}
		tracing::trace!( manifest = %manifest, "Registered manifest" );
		let discovered = entries.len();
		entries.insert( manifest.source_location().to_path_buf(), Entry { discovered, manifest: Arc::clone( &manifest )});
		Ok( manifest )
	}

	/// Orders entries by descending priority, keeping discovery order among equals.
	pub fn sort( &self ) {
		self.entries.write().sort_by(| _, a, _, b | b.manifest.priority().cmp( &a.manifest.priority() )
			.then( a.discovered.cmp( &b.discovered )));
	}

	pub fn get( &self, location: &Path ) -> Option<Arc<Manifest>> {
		self.entries.read().get( location ).map(| entry | Arc::clone( &entry.manifest ))
	}

	pub fn contains( &self, location: &Path ) -> bool { self.entries.read().contains_key( location )}

	pub fn len( &self ) -> usize { self.entries.read().len() }

	pub fn is_empty( &self ) -> bool { self.entries.read().is_empty() }

	/// Snapshot of all manifests in current order.
	pub fn manifests( &self ) -> Vec<Arc<Manifest>> {
		self.entries.read().values().map(| entry | Arc::clone( &entry.manifest )).collect()
	}

	/// Snapshot of all source locations in current order.
	pub fn locations( &self ) -> Vec<PathBuf> { self.entries.read().keys().cloned().collect() }

	/// Links a module to the files its descriptor resolved to.
	///
	/// # Errors
	/// - [`LoadError::MissingManifest`] if nothing was put for `location`
	/// - [`LoadError::VersionConflict`] if the module's name was crosslinked under another version
	/// - [`LoadError::UnreferencedModule`] if `resolved_files` doesn't contain `location`
	/// - [`LoadError::DuplicateDependencies`] if other files were already linked to `location`
	pub fn crosslink(
		&self,
		location: &Path,
		resolved_files: impl Into<Arc<[PathBuf]>>,
		declared_version: &str,
	) -> Result<(), LoadError> {

		let manifest = self.get( location ).ok_or_else(|| LoadError::MissingManifest( location.to_path_buf() ))?;
		let resolved_files = resolved_files.into();
		let mut crosslink = self.crosslink.write();

		if let Some( existing ) = crosslink.versions.get( manifest.name() ) {
			if existing != declared_version {
				return Err( LoadError::VersionConflict {
					name: manifest.name().to_string(),
					existing: existing.clone(),
					attempted: declared_version.to_string(),
				});
			}
		}

		if !resolved_files.iter().any(| file | file == location ) {
			return Err( LoadError::UnreferencedModule( location.to_path_buf() ));
		}

		match crosslink.dependencies.get( location ) {
			Some( existing ) if *existing == resolved_files => return Ok(()),
			Some( _ ) => return Err( LoadError::DuplicateDependencies( location.to_path_buf() )),
			None => {},
		}

		tracing::trace!( manifest = %manifest, files = ?resolved_files, "Registering dependencies" );
		crosslink.versions.insert( manifest.name().to_string(), declared_version.to_string() );
		crosslink.dependencies.insert( location.to_path_buf(), resolved_files );
		Ok(())

	}

	/// Files a module was crosslinked to.
	pub fn dependencies( &self, location: &Path ) -> Option<Arc<[PathBuf]>> {
		self.crosslink.read().dependencies.get( location ).cloned()
	}

	/// Version a module name was crosslinked under.
	pub fn version_of( &self, name: &str ) -> Option<String> {
		self.crosslink.read().versions.get( name ).cloned()
	}

	pub(crate) fn clear( &self ) {
		self.entries.write().clear();
		*self.crosslink.write() = Crosslink::default();
	}

}

impl std::fmt::Debug for ManifestDirectory {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_list().entries( self.entries.read().values().map(| entry | &entry.manifest )).finish()
	}
}
