//! The engine facade.
//!
//! [`Runtime::load`] runs the load sequence once: manifests are discovered, filtered by
//! the configuration, registered and sorted by priority, then each module's descriptor
//! is parsed and resolved to files before activation starts. Afterwards the runtime
//! serves attach requests and lookups for targets.

use std::path::PathBuf ;
use std::sync::Arc ;
use nonempty_collections::NEVec ;
use pipe_trait::Pipe ;

use crate::{
	ActivationStateMachine, CallOrigin, CompatibilityChecker, DefineError, DeferrerId, DependencyGraph,
	DirectoryDiscovery, DiscoveryError, InjectionController, LoadError, LoaderConfig, Manifest,
	ManifestDirectory, ManifestSource, PartialSuccess, Phase, RuleLoader, TargetContext,
};



/// The engine: owns every piece of loader state and runs the load sequence.
///
/// Load happens once, on a single thread; everything else may be called from any
/// thread afterwards.
#[derive( Debug )]
pub struct Runtime {
	config: LoaderConfig,
	directory: Arc<ManifestDirectory>,
	controller: InjectionController,
	activation: ActivationStateMachine,
}

impl Runtime {

	pub fn new( config: LoaderConfig ) -> Self {
		let directory = Arc::new( ManifestDirectory::new() );
		Self {
			controller: CompatibilityChecker::new( Arc::clone( &directory )).pipe( InjectionController::new ),
			activation: ActivationStateMachine::new( config.attach_mode() ),
			directory,
			config,
		}
	}

	#[inline] pub fn config( &self ) -> &LoaderConfig { &self.config }
	#[inline] pub fn directory( &self ) -> &Arc<ManifestDirectory> { &self.directory }
	#[inline] pub fn controller( &self ) -> &InjectionController { &self.controller }
	#[inline] pub fn activation( &self ) -> &ActivationStateMachine { &self.activation }

	/// Discovers, registers and crosslinks every enabled module, then starts activation.
	///
	/// Besides `sources`, every directory in [`LoaderConfig::paths`] is searched. Module
	/// locations are always candidates for resolution, ahead of `candidates`.
	///
	/// Modules that couldn't be discovered are skipped and returned alongside the
	/// resulting activation phase.
	///
	/// # Errors
	/// Any [`LoadError`]. The load is aborted and the runtime should be
	/// [`reset`]( Self::reset ) before another attempt.
	pub fn load(
		&self,
		sources: &[&dyn ManifestSource],
		candidates: &[PathBuf],
		loader: Arc<dyn RuleLoader>,
	) -> Result<PartialSuccess<Phase, DiscoveryError>, LoadError> {

		let configured = self.config.paths().iter().map( DirectoryDiscovery::new ).collect::<Vec<_>>();
		let ( manifests, errors ): ( Vec<_>, Vec<_> ) = sources.iter().copied()
			.chain( configured.iter().map(| source | source as &dyn ManifestSource ))
			.map(| source | source.discover() )
			.unzip();

		manifests.into_iter().flatten()
			.filter(| manifest | {
				let enabled = self.config.is_enabled( manifest );
				if !enabled { tracing::debug!( manifest = %manifest, "Module disabled" ) }
				enabled
			})
			.try_for_each(| manifest | self.directory.put( manifest ).map( drop ))?;
		self.directory.sort();

		let candidates = self.directory.locations().into_iter()
			.chain( candidates.iter().cloned() )
			.collect::<Vec<_>>();
		let manifests = self.directory.manifests();
		manifests.iter().try_for_each(| manifest | self.link( manifest, &candidates ))?;

		manifests.iter()
			.filter(| manifest | self.config.is_verbose( manifest ))
			.for_each(| manifest | tracing::info!( manifest = %manifest, "Verbose module" ));
		tracing::info!( modules = manifests.len(), "Loaded modules" );

		let phase = self.activation.start( manifests, loader );
		Ok(( phase, errors.into_iter().flatten().collect() ))

	}

	fn link( &self, manifest: &Manifest, candidates: &[PathBuf] ) -> Result<(), LoadError> {
		let graph = DependencyGraph::parse( &manifest.dependency_ref().read()? )?;
		let files = graph.resolve( candidates, self.config.dependency_scope() )
			.ok_or_else(|| LoadError::UnsupportedDescriptor( manifest.name().to_string() ))?;
		self.directory.crosslink( manifest.source_location(), files, graph.declared_version() )
	}

	/// See [`InjectionController::request_attach`].
	///
	/// # Errors
	/// [`LoadError::MissingDependencies`] if the module was never crosslinked.
	pub fn request_attach( &self, manifest: &Arc<Manifest>, target: &dyn TargetContext, origin: CallOrigin ) -> Result<bool, LoadError> {
		self.controller.request_attach( manifest, target, origin )
	}

	/// Attaches every loaded module compatible with `target`.
	///
	/// Returns the modules that were attached, in priority order.
	///
	/// # Errors
	/// [`LoadError::MissingDependencies`] if a module was never crosslinked.
	pub fn attach_all( &self, target: &dyn TargetContext, origin: CallOrigin ) -> Result<Vec<Arc<Manifest>>, LoadError> {
		self.directory.manifests().into_iter()
			.map(| manifest | self.request_attach( &manifest, target, origin ).map(| attached | attached.then_some( manifest )))
			.filter_map( Result::transpose )
			.collect()
	}

	pub fn inject( &self, target: &dyn TargetContext ) -> bool { self.controller.inject( target )}

	pub fn find_definition( &self, target: &dyn TargetContext, name: &str ) -> Option<Arc<[u8]>> {
		self.controller.find_definition( target, name )
	}

	pub fn find_resource( &self, target: &dyn TargetContext, name: &str ) -> Option<PathBuf> {
		self.controller.find_resource( target, name )
	}

	pub fn find_all_resources( &self, target: &dyn TargetContext, name: &str ) -> Option<NEVec<PathBuf>> {
		self.controller.find_all_resources( target, name )
	}

	/// Defines `name` in `target` from the first module visible to it that has it.
	///
	/// Returns `Ok( false )` when no visible module has the definition.
	///
	/// # Errors
	/// Whatever `target` rejects the definition with.
	pub fn define_from_modules( &self, target: &dyn TargetContext, name: &str ) -> Result<bool, DefineError> {
		match self.find_definition( target, name ) {
			Some( bytes ) => target.define( name, bytes ).map(| () | true ),
			None => Ok( false ),
		}
	}

	pub fn notify_trigger_observed( &self, deferrer: &DeferrerId ) -> bool {
		self.activation.notify_trigger_observed( deferrer )
	}

	pub fn all_deferrers_satisfied( &self ) -> bool { self.activation.all_deferrers_satisfied() }

	/// Drops every manifest, attachment and search path entry and rewinds activation.
	pub fn reset( &self ) {
		tracing::debug!( "Resetting runtime" );
		self.directory.clear();
		self.controller.clear();
		self.activation.reset( self.config.attach_mode() );
	}

}
