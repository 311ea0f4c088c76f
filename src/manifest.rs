//! Module metadata.
//!
//! A [`Manifest`] describes one discoverable module: its name, whether it is an
//! instrumentation rule or an exporter, its load priority and where its dependency
//! descriptor lives. Manifests are created once at discovery and live for as long as
//! the [`ManifestDirectory`]( crate::ManifestDirectory ) that owns them. The only
//! mutable part is the per-target compatibility cache.

use std::path::{ Path, PathBuf };

use crate::{ DeferrerId, LoadError };
use crate::compatibility::CompatibilityCache ;



/// What a module contributes once activated.
#[derive( Copy, Clone, Debug, PartialEq, Eq, Hash, Default, serde::Deserialize )]
#[serde( rename_all = "lowercase" )]
pub enum ManifestKind {
	/// An instrumentation rule, applied to target code.
	#[default] Rule,
	/// An exporter, shipping what rules produce elsewhere.
	Exporter,
}

impl std::fmt::Display for ManifestKind {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::Rule => write!( f, "Rule" ),
			Self::Exporter => write!( f, "Exporter" ),
		}
	}
}

/// Where a module's dependency descriptor can be read from.
#[derive( Clone, Debug, PartialEq, Eq )]
pub enum DependencyRef {
	/// A descriptor file on disk.
	Descriptor( PathBuf ),
	/// Descriptor text supplied directly by the discovery collaborator.
	Inline( String ),
}

impl DependencyRef {
	/// Reads the descriptor text.
	///
	/// # Errors
	/// [`LoadError::Io`] if a descriptor file can't be read.
	pub fn read( &self ) -> Result<String, LoadError> {
		match self {
			Self::Descriptor( path ) => std::fs::read_to_string( path )
				.map_err(| source | LoadError::Io { path: path.clone(), source }),
			Self::Inline( text ) => Ok( text.clone() ),
		}
	}
}

/// Metadata of one module.
///
/// Identity is the [`source_location`]( Self::source_location ): two manifests for the
/// same location are the same module.
pub struct Manifest {
	name: String,
	kind: ManifestKind,
	priority: i32,
	dependency_ref: DependencyRef,
	source_location: PathBuf,
	deferrers: Vec<DeferrerId>,
	pub(crate) compatibility: CompatibilityCache,
}

impl Manifest {

	/// Creates a manifest with no deferrers.
	pub fn new(
		name: impl Into<String>,
		kind: ManifestKind,
		priority: i32,
		dependency_ref: DependencyRef,
		source_location: impl Into<PathBuf>,
	) -> Self {
		Self {
			name: name.into(),
			kind,
			priority,
			dependency_ref,
			source_location: source_location.into(),
			deferrers: Vec::with_capacity( 0 ),
			compatibility: CompatibilityCache::default(),
		}
	}

	/// Declares the trigger types this module waits for before it is safe to activate.
	pub fn with_deferrers( mut self, deferrers: impl IntoIterator<Item = impl Into<DeferrerId>> ) -> Self {
		self.deferrers = deferrers.into_iter().map( Into::into ).collect();
		self
	}

	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn kind( &self ) -> ManifestKind { self.kind }
	#[inline] pub fn priority( &self ) -> i32 { self.priority }
	#[inline] pub fn dependency_ref( &self ) -> &DependencyRef { &self.dependency_ref }
	#[inline] pub fn source_location( &self ) -> &Path { &self.source_location }
	#[inline] pub fn deferrers( &self ) -> &[DeferrerId] { &self.deferrers }

}

/// Compares the declared metadata, ignoring the compatibility cache.
impl PartialEq for Manifest {
	fn eq( &self, other: &Self ) -> bool {
		self.source_location == other.source_location
			&& self.name == other.name
			&& self.kind == other.kind
			&& self.priority == other.priority
			&& self.dependency_ref == other.dependency_ref
			&& self.deferrers == other.deferrers
	}
}
impl Eq for Manifest {}

impl std::fmt::Debug for Manifest {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Manifest" )
			.field( "name", &self.name )
			.field( "kind", &self.kind )
			.field( "priority", &self.priority )
			.field( "source_location", &self.source_location )
			.field( "deferrers", &self.deferrers )
			.finish_non_exhaustive()
	}
}

impl std::fmt::Display for Manifest {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "{} '{}' ({})", self.kind, self.name, self.source_location.display() )
	}
}
