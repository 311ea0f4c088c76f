//! Error taxonomy.
//!
//! Only configuration faults are errors. A rule that turns out to be incompatible
//! with a target, or a lookup that finds nothing, is an ordinary `bool` / `Option`
//! outcome and never surfaces here.

use std::path::PathBuf ;
use thiserror::Error ;



/// Fatal configuration errors.
///
/// Any of these aborts the load sequence: once one is raised the manifest directory
/// can no longer be trusted as a whole.
#[derive( Error, Debug )]
pub enum LoadError {
	/// A dependency descriptor could not be parsed.
	#[error( "Malformed dependency data at line {line}: {reason}" )]
	MalformedDependencyData { line: usize, reason: String },
	/// A descriptor referenced an artifact that none of the candidate files provide.
	#[error( "Unsupported dependency descriptor for '{0}': referenced artifacts are not among the candidate files" )]
	UnsupportedDescriptor( String ),
	/// Two modules declared different versions under the same name.
	#[error( "Illegal attempt to overwrite previously defined version for '{name}': {existing} -> {attempted}" )]
	VersionConflict { name: String, existing: String, attempted: String },
	/// A dependency descriptor was found for a location no manifest was registered for.
	#[error( "No manifest registered for: {}", .0.display() )]
	MissingManifest( PathBuf ),
	/// Two different manifests claim the same source location.
	#[error( "A different manifest is already registered for: {}", .0.display() )]
	DuplicateManifest( PathBuf ),
	/// A second descriptor attempted to register dependencies for the same module.
	#[error( "Dependencies already registered for: {}", .0.display() )]
	DuplicateDependencies( PathBuf ),
	/// The resolved files of a descriptor do not include the module that owns it.
	#[error( "Descriptor of {} does not reference its own module", .0.display() )]
	UnreferencedModule( PathBuf ),
	/// An attachment was requested for a module whose dependencies were never crosslinked.
	#[error( "No dependencies registered for: {}", .0.display() )]
	MissingDependencies( PathBuf ),
	/// Reading a descriptor or configuration file failed.
	#[error( "Io Error at {}: {source}", path.display() )]
	Io { path: PathBuf, source: std::io::Error },
	/// The loader configuration is invalid.
	#[error( "Config Error: {0}" )] Config( #[from] ConfigError ),
}

impl LoadError {
	pub(crate) fn malformed( line: usize, reason: impl Into<String> ) -> Self {
		Self::MalformedDependencyData { line, reason: reason.into() }
	}
}

/// Errors raised while reading a [`LoaderConfig`]( crate::LoaderConfig ).
#[derive( Error, Debug )]
pub enum ConfigError {
	#[error( "Cannot read config file {}: {source}", path.display() )]
	Unreadable { path: PathBuf, source: std::io::Error },
	#[error( "Invalid config: {0}" )] Invalid( #[from] toml::de::Error ),
	#[error( "Invalid name pattern '{pattern}': {source}" )]
	InvalidPattern { pattern: String, source: globset::Error },
}

/// Errors raised by a host when it rejects a definition transfer.
///
/// These are logged and never abort anything: the definition simply stays
/// unavailable in that target.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum DefineError {
	/// The target already holds a definition under this name.
	#[error( "Duplicate definition: {0}" )] Duplicate( String ),
	/// The host refused the definition for its own reasons.
	#[error( "Definition of '{name}' rejected: {reason}" )]
	Rejected { name: String, reason: String },
}
