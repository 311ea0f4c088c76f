//! Deferred activation.
//!
//! Some modules can't be activated safely until certain trigger types have been
//! observed in the host (their **deferrers**). In [`AttachMode::StaticDeferred`] only
//! the trigger detection of those modules is installed at start; everything is
//! activated once the last pending trigger is reported through
//! [`ActivationStateMachine::notify_trigger_observed`]. Triggers reported before
//! [`ActivationStateMachine::start`] are remembered and count once it runs.
//!
//! The state machine only ever moves forward: `Idle → Deferred → Activated` or
//! `Idle → Activated`.

use std::convert::Infallible ;
use std::str::FromStr ;
use std::sync::Arc ;
use indexmap::IndexSet ;
use parking_lot::Mutex ;

use crate::Manifest ;



/// Identifies a trigger type a module waits for.
#[derive( Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct DeferrerId( String );

impl DeferrerId {
	pub fn new( id: impl Into<String> ) -> Self { Self( id.into() )}
	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl From<&str> for DeferrerId {
	fn from( id: &str ) -> Self { Self( id.to_string() )}
}

impl From<String> for DeferrerId {
	fn from( id: String ) -> Self { Self( id )}
}

impl std::fmt::Display for DeferrerId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		std::fmt::Display::fmt( &self.0, f )
	}
}

/// When modules are activated.
#[derive( Copy, Clone, Debug, PartialEq, Eq, Default )]
pub enum AttachMode {
	/// Activate everything at start.
	Static,
	/// Activate everything at start; the loader was attached to an already running host.
	Dynamic,
	/// Wait for deferrers before activating. Downgrades to `Static` when there are none.
	#[default] StaticDeferred,
}

/// `"dynamic"` and `"false"` select [`AttachMode::Dynamic`] and [`AttachMode::Static`];
/// anything else keeps the default.
impl FromStr for AttachMode {
	type Err = Infallible ;

	fn from_str( setting: &str ) -> Result<Self, Self::Err> {
		Ok( match setting.trim() {
			"dynamic" => Self::Dynamic,
			"false" => Self::Static,
			_ => Self::StaticDeferred,
		})
	}
}

impl std::fmt::Display for AttachMode {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::Static => write!( f, "static" ),
			Self::Dynamic => write!( f, "dynamic" ),
			Self::StaticDeferred => write!( f, "static (deferred)" ),
		}
	}
}

/// Where the state machine is.
#[derive( Copy, Clone, Debug, PartialEq, Eq )]
pub enum Phase {
	/// [`ActivationStateMachine::start`] wasn't called yet.
	Idle,
	/// Only deferrers are installed; waiting for triggers.
	Deferred,
	/// All modules were handed to the [`RuleLoader`].
	Activated,
}

/// Applies modules to the host. The capability itself is opaque to this crate.
pub trait RuleLoader: Send + Sync {
	/// Activates `manifests`. With `deferrers_only`, only installs trigger detection
	/// for the modules that declared deferrers.
	fn load_rules( &self, manifests: &[Arc<Manifest>], deferrers_only: bool );
}

struct State {
	mode: AttachMode,
	phase: Phase,
	pending: IndexSet<DeferrerId>,
	observed_early: IndexSet<DeferrerId>,
	waiting: Option<( Vec<Arc<Manifest>>, Arc<dyn RuleLoader> )>,
}

/// Governs when the discovered modules are collectively activated.
pub struct ActivationStateMachine {
	state: Mutex<State>,
}

impl ActivationStateMachine {

	pub fn new( mode: AttachMode ) -> Self {
		Self { state: Mutex::new( State {
			mode,
			phase: Phase::Idle,
			pending: IndexSet::new(),
			observed_early: IndexSet::new(),
			waiting: None,
		})}
	}

	pub fn mode( &self ) -> AttachMode { self.state.lock().mode }

	pub fn phase( &self ) -> Phase { self.state.lock().phase }

	/// Deferrers not yet observed, in declaration order. Empty unless activation is deferred.
	pub fn pending( &self ) -> Vec<DeferrerId> { self.state.lock().pending.iter().cloned().collect() }

	/// Scans `manifests` for deferrers and activates now or installs the deferrers.
	///
	/// Calling it again after the first time does nothing. Returns the resulting phase.
	pub fn start( &self, manifests: Vec<Arc<Manifest>>, loader: Arc<dyn RuleLoader> ) -> Phase {

		let deferrers_only = {
			let mut guard = self.state.lock();
			let state = &mut *guard ;
			if state.phase != Phase::Idle { return state.phase }

			let declared = manifests.iter()
				.flat_map(| manifest | manifest.deferrers().iter().cloned() )
				.collect::<IndexSet<_>>();
			tracing::info!( mode = %state.mode, deferrers = declared.len(), "Starting activation" );

			if declared.is_empty() {
				if state.mode == AttachMode::StaticDeferred {
					tracing::info!( "0 deferrers were detected, overriding to static" );
					state.mode = AttachMode::Static ;
				}
			} else {
				declared.iter().for_each(| deferrer | tracing::info!( %deferrer, "Deferrer detected" ));
			}

			state.pending = declared.into_iter()
				.filter(| deferrer | !state.observed_early.contains( deferrer ))
				.collect();
			state.observed_early.clear();

			match state.mode {
				AttachMode::StaticDeferred if !state.pending.is_empty() => {
					state.phase = Phase::Deferred ;
					state.waiting = Some(( manifests.clone(), Arc::clone( &loader )));
					true
				},
				AttachMode::StaticDeferred => {
					tracing::info!( "Every deferrer was observed before start" );
					state.phase = Phase::Activated ;
					false
				},
				AttachMode::Static | AttachMode::Dynamic => {
					// nothing waits for triggers once everything is active
					state.pending.clear();
					state.phase = Phase::Activated ;
					false
				},
			}
		};

		// lock released: loaders may report triggers synchronously
		loader.load_rules( &manifests, deferrers_only );
		match deferrers_only {
			true => tracing::debug!( "Activation deferred" ),
			false => tracing::debug!( "Activated all modules" ),
		}
		self.phase()

	}

	/// Records that the trigger `deferrer` was observed.
	///
	/// Before [`start`]( Self::start ) the observation is kept and taken into account
	/// when it runs. Returns `true` if this observation completed a deferred activation.
	pub fn notify_trigger_observed( &self, deferrer: &DeferrerId ) -> bool {

		let waiting = {
			let mut state = self.state.lock();
			if state.phase == Phase::Idle {
				tracing::debug!( %deferrer, "Trigger observed before start" );
				state.observed_early.insert( deferrer.clone() );
				return false
			}
			if !state.pending.shift_remove( deferrer ) {
				tracing::trace!( %deferrer, "Trigger already observed or never declared" );
				return false
			}
			tracing::debug!( %deferrer, remaining = state.pending.len(), "Trigger observed" );
			if !state.pending.is_empty() || state.phase != Phase::Deferred { return false }
			state.phase = Phase::Activated ;
			state.waiting.take()
		};

		match waiting {
			Some(( manifests, loader )) => {
				tracing::info!( modules = manifests.len(), "All deferrers satisfied, activating" );
				loader.load_rules( &manifests, false );
				true
			},
			None => false,
		}

	}

	/// Whether no declared trigger is still awaited.
	///
	/// Reports pending triggers, not activation: `true` in [`Phase::Idle`] and after
	/// [`AttachMode::Static`] or [`AttachMode::Dynamic`] activated everything, since
	/// nothing waits for triggers then.
	pub fn all_deferrers_satisfied( &self ) -> bool { self.state.lock().pending.is_empty() }

	pub(crate) fn reset( &self, mode: AttachMode ) {
		*self.state.lock() = State {
			mode,
			phase: Phase::Idle,
			pending: IndexSet::new(),
			observed_early: IndexSet::new(),
			waiting: None,
		};
	}

}

impl std::fmt::Debug for ActivationStateMachine {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct( "ActivationStateMachine" )
			.field( "mode", &state.mode )
			.field( "phase", &state.phase )
			.field( "pending", &state.pending )
			.finish_non_exhaustive()
	}
}
