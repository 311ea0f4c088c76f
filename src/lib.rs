//! A runtime loader for instrumentation modules with isolated dependencies.
//!
//! Modules ("rules" and "exporters") are discovered on disk, each describing the
//! artifacts it depends on. `rule_link` keeps every module's dependencies in an
//! isolated context of its own and only makes them visible to a target scope once
//! it has checked that nothing the target already sees conflicts with them.
//!
//! # Core Concepts
//!
//! - [`Manifest`]: Metadata of one module: name, kind, priority, dependency descriptor
//! 	and the trigger types it waits for before activation ([`DeferrerId`]). Identified
//! 	by its source location.
//!
//! - [`DependencyGraph`]: A parsed dependency descriptor. The first line names the
//! 	module's own artifact, the following lines are `from to [scope]` edges:
//!
//! 	```text
//! 	io.example:okhttp-rule:1.0
//! 	io.example:okhttp-rule:1.0 com.squareup:okhttp:3.14
//! 	com.squareup:okhttp:3.14 com.squareup:okio:1.17
//! 	com.squareup:okhttp:3.14 junit:junit:4.13 test
//! 	```
//!
//! - [`ManifestDirectory`]: Every registered module, ordered by priority, plus the files
//! 	each module's descriptor resolved to.
//!
//! - [`TargetContext`]: A scope definitions are looked up in and injected into. Targets
//! 	form a tree through [`TargetContext::parent`]. [`Scope`] is an in-memory
//! 	implementation.
//!
//! - [`IsolatedContext`]: The definitions and resources of one module, built against
//! 	one target. Closed for good once found incompatible.
//!
//! - [`InjectionController`]: Decides, once per module and target, whether the module
//! 	may be attached, and transfers its definitions into the target.
//!
//! - [`ActivationStateMachine`]: Holds activation back until every deferrer was observed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc ;
//! use rule_link::{ Runtime, LoaderConfig, Manifest, ManifestKind, DependencyRef, Scope, CallOrigin, RuleLoader };
//!
//! struct Noop ;
//! impl RuleLoader for Noop {
//! 	fn load_rules( &self, _: &[Arc<Manifest>], _: bool ) {}
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let module = dir.path().join( "greeter-1.0" );
//! std::fs::create_dir_all( module.join( "io/example" ))?;
//! std::fs::write( module.join( "io/example/Greeter.def" ), b"hello" )?;
//!
//! let runtime = Runtime::new( LoaderConfig::default() );
//! let manifest = runtime.directory().put( Manifest::new(
//! 	"greeter", ManifestKind::Rule, 0,
//! 	DependencyRef::Inline( "io.example:greeter:1.0".to_string() ),
//! 	&module,
//! ))?;
//! runtime.load( &[], &[], Arc::new( Noop ))?;
//!
//! let bootstrap: Arc<dyn rule_link::TargetContext> = Arc::new( Scope::bootstrap() );
//! let app: Arc<dyn rule_link::TargetContext> = Arc::new( Scope::application( bootstrap ));
//! let plugin = Scope::nested( app );
//!
//! assert!( runtime.request_attach( &manifest, &plugin, CallOrigin::Host )? );
//! assert_eq!( runtime.find_definition( &plugin, "io.example.Greeter" ).as_deref(), Some( &b"hello"[..] ));
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Everything is reported through [`tracing`]; install any subscriber to see it.

mod error ;
mod artifact ;
mod dependency_graph ;
mod manifest ;
mod manifest_directory ;
mod discovery ;
mod target ;
mod isolated_context ;
mod compatibility ;
mod context_registry ;
mod search_path ;
mod injection ;
mod activation ;
mod config ;
mod runtime ;

#[doc( no_inline )]
pub use nonempty_collections::NEVec ;

pub use error::{ LoadError, ConfigError, DefineError };
pub use artifact::ArtifactId ;
pub use dependency_graph::{ DependencyGraph, Edge, DEFAULT_SCOPE };
pub use manifest::{ Manifest, ManifestKind, DependencyRef };
pub use manifest_directory::ManifestDirectory ;
pub use discovery::{ ManifestSource, DirectoryDiscovery, DiscoveryError, PartialSuccess, MANIFEST_FILE, DEFAULT_DESCRIPTOR };
pub use target::{ TargetContext, TargetId, TargetKind, Scope };
pub use isolated_context::{ IsolatedContext, definition_resource, DEFINITION_EXTENSION };
pub use compatibility::{ CompatibilityChecker, Verdict };
pub use context_registry::{ ContextRegistry, ChainOperation, Inject, Injected, FindDefinition, FindResource, FindAllResources };
pub use search_path::SearchPath ;
pub use injection::{ InjectionController, CallOrigin, Attachment };
pub use activation::{ ActivationStateMachine, AttachMode, DeferrerId, Phase, RuleLoader };
pub use config::LoaderConfig ;
pub use runtime::Runtime ;
