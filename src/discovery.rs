//! Finding modules on disk.
//!
//! A module is a directory holding a `rule.toml`:
//!
//! ```toml
//! name = "okhttp"
//! kind = "rule"                       # or "exporter"
//! priority = 10
//! deferrers = [ "okhttp3.OkHttpClient" ]
//! dependencies = "dependencies.tgf"   # relative to the module, this is the default
//! ```
//!
//! Modules that can't be read are skipped and reported next to the ones that could,
//! so one broken module never hides the rest.

use std::path::{ Path, PathBuf };
use itertools::Itertools ;
use serde::Deserialize ;
use thiserror::Error ;

use crate::{ DependencyRef, Manifest, ManifestKind };



/// A successful operation where some parts failed without preventing the rest.
/// The `Vec<E>` holds the errors of the parts that were skipped.
pub type PartialSuccess<T, E> = ( T, Vec<E> );

/// Name of the file marking a directory as a module.
pub const MANIFEST_FILE: &str = "rule.toml" ;
/// Descriptor file used when a manifest doesn't name one.
pub const DEFAULT_DESCRIPTOR: &str = "dependencies.tgf" ;

#[derive( Error, Debug )]
pub enum DiscoveryError {

	#[error( "Cannot read module directory {}: {source}", path.display() )]
	UnreadableRoot { path: PathBuf, source: std::io::Error },

	#[error( "Cannot read manifest {}: {source}", path.display() )]
	UnreadableManifest { path: PathBuf, source: std::io::Error },

	#[error( "Invalid manifest {}: {source}", path.display() )]
	InvalidManifest { path: PathBuf, source: toml::de::Error },

}

/// Supplies manifests to a [`Runtime`]( crate::Runtime ).
pub trait ManifestSource {
	fn discover( &self ) -> PartialSuccess<Vec<Manifest>, DiscoveryError> ;
}

#[derive( Deserialize )]
#[serde( deny_unknown_fields )]
struct ManifestFile {
	name: String,
	#[serde( default )] kind: ManifestKind,
	#[serde( default )] priority: i32,
	#[serde( default )] deferrers: Vec<String>,
	dependencies: Option<PathBuf>,
}

/// Treats every immediate child directory of `root` holding a [`MANIFEST_FILE`] as a module.
///
/// Modules are reported in file name order.
#[derive( Clone, Debug )]
pub struct DirectoryDiscovery {
	root: PathBuf,
}

impl DirectoryDiscovery {

	pub fn new( root: impl Into<PathBuf> ) -> Self { Self { root: root.into() }}

	#[inline] pub fn root( &self ) -> &Path { &self.root }

	fn read_manifest( module: PathBuf ) -> Result<Manifest, DiscoveryError> {

		let path = module.join( MANIFEST_FILE );
		let text = std::fs::read_to_string( &path )
			.map_err(| source | DiscoveryError::UnreadableManifest { path: path.clone(), source })?;
		let data: ManifestFile = toml::from_str( &text )
			.map_err(| source | DiscoveryError::InvalidManifest { path, source })?;

		let descriptor = module.join( data.dependencies.as_deref().unwrap_or( Path::new( DEFAULT_DESCRIPTOR )));
		Ok( Manifest::new( data.name, data.kind, data.priority, DependencyRef::Descriptor( descriptor ), module )
			.with_deferrers( data.deferrers ))

	}

}

impl ManifestSource for DirectoryDiscovery {
	fn discover( &self ) -> PartialSuccess<Vec<Manifest>, DiscoveryError> {

		let entries = match std::fs::read_dir( &self.root ) {
			Ok( entries ) => entries,
			Err( source ) => return ( Vec::new(), vec![ DiscoveryError::UnreadableRoot { path: self.root.clone(), source }]),
		};

		let ( manifests, errors ): ( Vec<_>, Vec<_> ) = entries
			.filter_map( Result::ok )
			.map(| entry | entry.path() )
			.filter(| module | module.join( MANIFEST_FILE ).is_file() )
			.sorted()
			.map( Self::read_manifest )
			.partition_result();

		errors.iter().for_each(| error | tracing::warn!( %error, "Skipping module" ));
		tracing::debug!( root = %self.root.display(), modules = manifests.len(), "Discovered modules" );
		( manifests, errors )

	}
}
