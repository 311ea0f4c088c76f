//! Artifact coordinates.
//!
//! An artifact is named by a `group:artifact:version` coordinate. On disk it is a
//! file or directory named `<artifact>-<version>` (an optional single extension is
//! ignored, so `okhttp-3.14.2.jar`, `okhttp-3.14.2.rlib` and a directory
//! `okhttp-3.14.2` all match `com.squareup:okhttp:3.14.2`).

use std::path::Path ;
use std::str::FromStr ;

use crate::LoadError ;



/// A `group:artifact:version` coordinate.
#[derive( Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct ArtifactId {
	group: String,
	artifact: String,
	version: String,
}

impl ArtifactId {
	/// Creates a coordinate from its parts.
	pub fn new( group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String> ) -> Self {
		Self { group: group.into(), artifact: artifact.into(), version: version.into() }
	}

	#[inline] pub fn group( &self ) -> &str { &self.group }
	#[inline] pub fn artifact( &self ) -> &str { &self.artifact }
	#[inline] pub fn version( &self ) -> &str { &self.version }

	/// The name a file providing this artifact carries, minus any extension.
	pub fn file_stem( &self ) -> String { format!( "{}-{}", self.artifact, self.version )}

	/// Whether `path` provides this artifact.
	pub fn matches( &self, path: &Path ) -> bool {
		let Some( name ) = path.file_name().and_then(| name | name.to_str() ) else { return false };
		let stem = self.file_stem();
		if name == stem { return true }
		// `okhttp-3.14.2.jar` matches, `okhttp-3.14.2.1` must not match `3.14.2`
		name.strip_prefix( stem.as_str() )
			.and_then(| rest | rest.strip_prefix( '.' ))
			.is_some_and(| extension | !extension.is_empty()
				&& !extension.contains( '.' )
				&& !extension.chars().all(| c | c.is_ascii_digit() ))
	}
}

impl FromStr for ArtifactId {
	type Err = String ;

	fn from_str( coordinate: &str ) -> Result<Self, Self::Err> {
		let parts = coordinate.split( ':' ).collect::<Vec<_>>();
		match parts.as_slice() {
			[ group, artifact, version ] if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
				Ok( Self::new( *group, *artifact, *version )),
			_ => Err( format!( "expected 'group:artifact:version', found '{}'", coordinate )),
		}
	}
}

impl ArtifactId {
	pub(crate) fn parse_at( coordinate: &str, line: usize ) -> Result<Self, LoadError> {
		coordinate.parse().map_err(| reason | LoadError::malformed( line, reason ))
	}
}

impl std::fmt::Display for ArtifactId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "{}:{}:{}", self.group, self.artifact, self.version )
	}
}
