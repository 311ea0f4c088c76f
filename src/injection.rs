//! Attaching modules to targets and transferring their definitions.
//!
//! [`InjectionController::request_attach`] is where a module meets a target: the
//! compatibility verdict decides whether it may, the target's kind decides how it is
//! made visible, and the [`CallOrigin`] decides whether definitions are transferred
//! right away or left for a later [`InjectionController::inject`].

use std::path::PathBuf ;
use std::sync::Arc ;
use nonempty_collections::NEVec ;

use crate::{ CompatibilityChecker, ContextRegistry, LoadError, Manifest, SearchPath, TargetContext, TargetKind };
use crate::context_registry::{ FindAllResources, FindDefinition, FindResource, Inject };
use crate::isolated_context::transfer_in_progress ;



/// Where an attachment request comes from.
///
/// Transferring definitions while the host is itself in the middle of accepting a
/// definition can produce duplicate or circular definitions. Hosts calling back into
/// the engine from inside [`TargetContext::define`] may pass [`CallOrigin::Definition`];
/// the attachment is then recorded but the transfer waits for the next
/// [`InjectionController::inject`]. Calls made on the thread that is transferring into
/// the same target are treated as [`CallOrigin::Definition`] whatever they pass.
#[derive( Copy, Clone, Debug, PartialEq, Eq, Default )]
pub enum CallOrigin {
	/// An ordinary call from the host.
	#[default] Host,
	/// A call made while a definition transfer is in progress.
	Definition,
}

/// How a successful attachment was carried out.
#[derive( Copy, Clone, Debug, PartialEq, Eq )]
pub enum Attachment {
	/// Files appended to the bootstrap search path.
	Bootstrap,
	/// Files appended to the application search path.
	Application,
	/// Context registered against the target and definitions transferred.
	Injected,
	/// Context registered against the target, transfer postponed.
	Deferred,
}

/// Attaches modules to targets and serves lookups for module code.
#[derive( Debug )]
pub struct InjectionController {
	checker: CompatibilityChecker,
	registry: ContextRegistry,
	bootstrap_path: SearchPath,
	application_path: SearchPath,
}

impl InjectionController {

	pub fn new( checker: CompatibilityChecker ) -> Self {
		Self {
			checker,
			registry: ContextRegistry::new(),
			bootstrap_path: SearchPath::new(),
			application_path: SearchPath::new(),
		}
	}

	#[inline] pub fn checker( &self ) -> &CompatibilityChecker { &self.checker }
	#[inline] pub fn registry( &self ) -> &ContextRegistry { &self.registry }
	#[inline] pub fn bootstrap_path( &self ) -> &SearchPath { &self.bootstrap_path }
	#[inline] pub fn application_path( &self ) -> &SearchPath { &self.application_path }

	/// Makes `manifest` reachable from `target` if the two are compatible.
	///
	/// Compatibility is tested against the target's own definitions and against module
	/// code already visible from it through attached contexts or search paths. Returns `false`, with no side effects, when they aren't.
	///
	/// # Errors
	/// [`LoadError::MissingDependencies`] if the module was never crosslinked.
	pub fn request_attach( &self, manifest: &Arc<Manifest>, target: &dyn TargetContext, origin: CallOrigin ) -> Result<bool, LoadError> {
		self.attach( manifest, target, origin ).map(| attachment | attachment.is_some() )
	}

	/// Like [`request_attach`]( Self::request_attach ) but reports how the module was attached.
	///
	/// # Errors
	/// [`LoadError::MissingDependencies`] if the module was never crosslinked.
	pub fn attach( &self, manifest: &Arc<Manifest>, target: &dyn TargetContext, origin: CallOrigin ) -> Result<Option<Attachment>, LoadError> {

		let verdict = self.checker.verdict_with( manifest, target, &| name: &str | self.find_definition( target, name ))?;
		if !verdict.is_compatible() { return Ok( None ) }
		let context = verdict.context();

		let origin = match transfer_in_progress( target.id() ) {
			true => CallOrigin::Definition,
			false => origin,
		};

		let attachment = match target.kind() {
			TargetKind::Bootstrap => {
				self.bootstrap_path.append( context );
				Attachment::Bootstrap
			},
			TargetKind::Application => {
				self.application_path.append( context );
				Attachment::Application
			},
			TargetKind::Nested => {
				self.registry.attach( target.id(), Arc::clone( context ));
				match origin {
					CallOrigin::Definition => Attachment::Deferred,
					CallOrigin::Host => {
						context.inject( target );
						Attachment::Injected
					},
				}
			},
		};

		tracing::debug!( module = manifest.name(), scope = ?target, ?attachment, "Attached module" );
		Ok( Some( attachment ))

	}

	/// Transfers pending definitions into `target` from the nearest level of its
	/// ancestry that has modules attached.
	///
	/// Returns whether such a level was found.
	pub fn inject( &self, target: &dyn TargetContext ) -> bool {
		tracing::trace!( scope = ?target, "inject" );
		self.registry.lookup_chain( target, None, &Inject ).is_some()
	}

	/// Content of the module definition `name` as seen from `target`.
	pub fn find_definition( &self, target: &dyn TargetContext, name: &str ) -> Option<Arc<[u8]>> {
		self.registry.lookup_chain( target, Some( name ), &FindDefinition )
			.or_else(|| self.search_paths( target ).into_iter().find_map(| path | path.find_definition( name )))
	}

	/// First module resource `name` as seen from `target`.
	pub fn find_resource( &self, target: &dyn TargetContext, name: &str ) -> Option<PathBuf> {
		tracing::trace!( scope = ?target, resource = name, "find_resource" );
		self.registry.lookup_chain( target, Some( name ), &FindResource )
			.or_else(|| self.search_paths( target ).into_iter().find_map(| path | path.find_resource( name )))
	}

	/// Every module resource `name` as seen from `target`.
	pub fn find_all_resources( &self, target: &dyn TargetContext, name: &str ) -> Option<NEVec<PathBuf>> {
		tracing::trace!( scope = ?target, resource = name, "find_all_resources" );
		self.registry.lookup_chain( target, Some( name ), &FindAllResources )
			.or_else(|| self.search_paths( target ).into_iter().find_map(| path | path.find_all_resources( name )))
	}

	/// Search paths visible from `target`, nearest first.
	fn search_paths( &self, target: &dyn TargetContext ) -> Vec<&SearchPath> {
		let mut paths = Vec::with_capacity( 2 );
		let mut ancestor: Option<Arc<dyn TargetContext>> = None ;
		loop {
			let level = ancestor.as_deref().unwrap_or( target );
			match level.kind() {
				TargetKind::Application => paths.push( &self.application_path ),
				TargetKind::Bootstrap => paths.push( &self.bootstrap_path ),
				TargetKind::Nested => {},
			}
			match level.parent() {
				Some( parent ) => ancestor = Some( parent ),
				None => return paths,
			}
		}
	}

	pub(crate) fn clear( &self ) {
		self.registry.clear();
		self.bootstrap_path.clear();
		self.application_path.clear();
		self.checker.reset_counter();
	}

}
