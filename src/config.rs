//! Loader configuration.
//!
//! Read from TOML:
//!
//! ```toml
//! attach_mode = "dynamic"      # "dynamic", "false" (static) or anything else (deferred)
//! dependency_scope = "compile"
//! paths = [ "/opt/rules" ]
//! verbose = [ "okhttp*" ]
//!
//! [rules]
//! "*" = false                   # disables every rule not matched below
//! okhttp = true
//! "jdbc*" = true
//!
//! [exporters]
//! jaeger = true
//! ```
//!
//! A module is enabled when the most specific matching entry of its kind says so. An
//! exact name beats any pattern and a longer pattern beats a shorter one. Without a
//! match the `"*"` entry decides, and without one of those everything is enabled.

use std::collections::BTreeMap ;
use std::path::{ Path, PathBuf };
use std::str::FromStr ;
use globset::{ Glob, GlobMatcher };
use serde::Deserialize ;

use crate::{ AttachMode, ConfigError, Manifest, ManifestKind, DEFAULT_SCOPE };



const WILDCARD: &str = "*" ;

#[derive( Deserialize, Default )]
#[serde( default, deny_unknown_fields )]
struct RawConfig {
	attach_mode: Option<String>,
	dependency_scope: Option<String>,
	paths: Vec<PathBuf>,
	verbose: Vec<String>,
	rules: BTreeMap<String, bool>,
	exporters: BTreeMap<String, bool>,
}

#[derive( Clone, Debug )]
struct NamePattern {
	pattern: String,
	matcher: GlobMatcher,
}

impl NamePattern {
	fn compile( pattern: &str ) -> Result<Self, ConfigError> {
		Glob::new( pattern )
			.map(| glob | Self { pattern: pattern.to_string(), matcher: glob.compile_matcher() })
			.map_err(| source | ConfigError::InvalidPattern { pattern: pattern.to_string(), source })
	}

	fn matches( &self, name: &str ) -> bool { self.pattern == name || self.matcher.is_match( name )}
}

/// Enable switches for one [`ManifestKind`].
#[derive( Clone, Debug, Default )]
struct Switches {
	all: Option<bool>,
	entries: Vec<( NamePattern, bool )>,
}

impl Switches {

	fn set( &mut self, pattern: &str, enabled: bool ) -> Result<(), ConfigError> {
		if pattern == WILDCARD {
			self.all = Some( enabled );
			return Ok(());
		}
		let compiled = NamePattern::compile( pattern )?;
		self.entries.retain(|( known, _ )| known.pattern != pattern );
		self.entries.push(( compiled, enabled ));
		Ok(())
	}

	fn is_enabled( &self, name: &str ) -> bool {
		if let Some(( _, enabled )) = self.entries.iter().find(|( entry, _ )| entry.pattern == name ) {
			return *enabled ;
		}
		self.entries.iter()
			.filter(|( entry, _ )| entry.matches( name ))
			.max_by_key(|( entry, _ )| entry.pattern.len() )
			.map_or_else(|| self.all.unwrap_or( true ), |( _, enabled )| *enabled )
	}

}

/// Settings of a [`Runtime`]( crate::Runtime ).
#[derive( Clone, Debug )]
pub struct LoaderConfig {
	attach_mode: AttachMode,
	dependency_scope: String,
	paths: Vec<PathBuf>,
	verbose: Vec<NamePattern>,
	rules: Switches,
	exporters: Switches,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			attach_mode: AttachMode::default(),
			dependency_scope: DEFAULT_SCOPE.to_string(),
			paths: Vec::new(),
			verbose: Vec::new(),
			rules: Switches::default(),
			exporters: Switches::default(),
		}
	}
}

impl LoaderConfig {

	/// Parses a configuration from TOML text.
	///
	/// # Errors
	/// [`ConfigError::Invalid`] for malformed TOML or unknown keys,
	/// [`ConfigError::InvalidPattern`] for a name pattern that isn't a valid glob.
	pub fn from_toml_str( text: &str ) -> Result<Self, ConfigError> {

		let raw: RawConfig = toml::from_str( text )?;

		let mut config = Self {
			attach_mode: raw.attach_mode.as_deref().and_then(| mode | AttachMode::from_str( mode ).ok() ).unwrap_or_default(),
			dependency_scope: raw.dependency_scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string() ),
			paths: raw.paths,
			..Self::default()
		};
		config.verbose = raw.verbose.iter()
			.map(| pattern | NamePattern::compile( pattern ))
			.collect::<Result<_, _>>()?;
		raw.rules.iter().try_for_each(|( pattern, enabled )| config.rules.set( pattern, *enabled ))?;
		raw.exporters.iter().try_for_each(|( pattern, enabled )| config.exporters.set( pattern, *enabled ))?;

		tracing::debug!( attach_mode = %config.attach_mode, scope = %config.dependency_scope, "Parsed loader config" );
		Ok( config )

	}

	/// Reads and parses a configuration file.
	///
	/// # Errors
	/// [`ConfigError::Unreadable`] if the file can't be read, otherwise as
	/// [`from_toml_str`]( Self::from_toml_str ).
	pub fn from_path( path: impl AsRef<Path> ) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		std::fs::read_to_string( path )
			.map_err(| source | ConfigError::Unreadable { path: path.to_path_buf(), source })
			.and_then(| text | Self::from_toml_str( &text ))
	}

	pub fn with_attach_mode( mut self, mode: AttachMode ) -> Self {
		self.attach_mode = mode ;
		self
	}

	pub fn with_dependency_scope( mut self, scope: impl Into<String> ) -> Self {
		self.dependency_scope = scope.into();
		self
	}

	pub fn with_path( mut self, path: impl Into<PathBuf> ) -> Self {
		self.paths.push( path.into() );
		self
	}

	/// Enables or disables modules of `kind` whose names match `pattern`.
	///
	/// # Errors
	/// [`ConfigError::InvalidPattern`] if `pattern` isn't a valid glob.
	pub fn with_enabled( mut self, kind: ManifestKind, pattern: &str, enabled: bool ) -> Result<Self, ConfigError> {
		self.switches_mut( kind ).set( pattern, enabled )?;
		Ok( self )
	}

	/// Marks modules whose names match `pattern` as verbose.
	///
	/// # Errors
	/// [`ConfigError::InvalidPattern`] if `pattern` isn't a valid glob.
	pub fn with_verbose( mut self, pattern: &str ) -> Result<Self, ConfigError> {
		self.verbose.push( NamePattern::compile( pattern )?);
		Ok( self )
	}

	#[inline] pub fn attach_mode( &self ) -> AttachMode { self.attach_mode }
	#[inline] pub fn dependency_scope( &self ) -> &str { &self.dependency_scope }
	#[inline] pub fn paths( &self ) -> &[PathBuf] { &self.paths }

	/// Whether `manifest` should be loaded at all.
	pub fn is_enabled( &self, manifest: &Manifest ) -> bool {
		self.switches( manifest.kind() ).is_enabled( manifest.name() )
	}

	pub fn is_verbose( &self, manifest: &Manifest ) -> bool {
		self.verbose.iter().any(| pattern | pattern.matches( manifest.name() ))
	}

	fn switches( &self, kind: ManifestKind ) -> &Switches {
		match kind {
			ManifestKind::Rule => &self.rules,
			ManifestKind::Exporter => &self.exporters,
		}
	}

	fn switches_mut( &mut self, kind: ManifestKind ) -> &mut Switches {
		match kind {
			ManifestKind::Rule => &mut self.rules,
			ManifestKind::Exporter => &mut self.exporters,
		}
	}

}
