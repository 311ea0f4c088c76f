//! Memoized compatibility testing.
//!
//! Whether a module fits a target is decided once per `(manifest, target)` pair and
//! never revisited. The decision is single-flight: concurrent callers for the same
//! pair block on the same cell, so exactly one [`IsolatedContext`] is constructed per
//! pair no matter how many threads ask.

use std::collections::HashMap ;
use std::sync::Arc ;
use std::sync::atomic::{ AtomicUsize, Ordering };
use once_cell::sync::OnceCell ;
use parking_lot::Mutex ;

use crate::{ IsolatedContext, LoadError, Manifest, ManifestDirectory, TargetContext, TargetId };



/// Per-manifest cache of verdicts keyed by target. Write-once per target.
#[derive( Default )]
pub(crate) struct CompatibilityCache {
	cells: Mutex<HashMap<TargetId, Arc<OnceCell<Verdict>>>>,
}

impl CompatibilityCache {
	fn cell( &self, target: TargetId ) -> Arc<OnceCell<Verdict>> {
		Arc::clone( self.cells.lock().entry( target ).or_default() )
	}

	fn get( &self, target: TargetId ) -> Option<Verdict> {
		self.cells.lock().get( &target ).and_then(| cell | cell.get().cloned() )
	}
}

/// The outcome of a compatibility test.
///
/// Holds the isolated context that was built for the test. When the pair is
/// incompatible the context has already been closed.
#[derive( Clone, Debug )]
pub struct Verdict {
	compatible: bool,
	context: Arc<IsolatedContext>,
}

impl Verdict {
	#[inline] pub fn is_compatible( &self ) -> bool { self.compatible }
	#[inline] pub fn context( &self ) -> &Arc<IsolatedContext> { &self.context }
}

/// Runs and memoizes compatibility tests.
#[derive( Debug )]
pub struct CompatibilityChecker {
	directory: Arc<ManifestDirectory>,
	constructed: AtomicUsize,
}

impl CompatibilityChecker {

	pub fn new( directory: Arc<ManifestDirectory> ) -> Self {
		Self { directory, constructed: AtomicUsize::new( 0 )}
	}

	/// Whether `manifest` can be attached to `target`.
	///
	/// # Errors
	/// [`LoadError::MissingDependencies`] if the module was never crosslinked.
	pub fn check( &self, manifest: &Arc<Manifest>, target: &dyn TargetContext ) -> Result<bool, LoadError> {
		self.verdict( manifest, target ).map(| verdict | verdict.compatible )
	}

	/// The memoized verdict for `manifest` on `target`, computing it on first use.
	///
	/// Only definitions the target itself sees are considered; see
	/// [`verdict_with`]( Self::verdict_with ).
	///
	/// # Errors
	/// [`LoadError::MissingDependencies`] if the module was never crosslinked. Nothing
	/// is cached in that case.
	pub fn verdict( &self, manifest: &Arc<Manifest>, target: &dyn TargetContext ) -> Result<Verdict, LoadError> {
		self.verdict_with( manifest, target, &| _: &str | None )
	}

	/// The memoized verdict for `manifest` on `target`, also testing against the module
	/// definitions `attached` reports visible from the target.
	///
	/// # Errors
	/// As [`verdict`]( Self::verdict ).
	pub fn verdict_with(
		&self,
		manifest: &Arc<Manifest>,
		target: &dyn TargetContext,
		attached: &dyn Fn( &str ) -> Option<Arc<[u8]>>,
	) -> Result<Verdict, LoadError> {

		let cell = manifest.compatibility.cell( target.id() );
		if let Some( verdict ) = cell.get() {
			tracing::trace!( module = manifest.name(), scope = ?target, compatible = verdict.compatible, "Compatibility [cached]" );
			return Ok( verdict.clone() );
		}

		cell.get_or_try_init(|| {

			let files = self.directory.dependencies( manifest.source_location() )
				.ok_or_else(|| LoadError::MissingDependencies( manifest.source_location().to_path_buf() ))?;

			self.constructed.fetch_add( 1, Ordering::Relaxed );
			let context = Arc::new( IsolatedContext::new( Arc::clone( manifest ), target.id(), files.iter().cloned() ));
			let compatible = context.is_compatible_with( target, attached );

			if !compatible {
				tracing::debug!( module = manifest.name(), scope = ?target, "Module is incompatible with target" );
				context.close();
			}

			Ok::<_, LoadError>( Verdict { compatible, context })

		}).cloned()

	}

	/// The cached verdict, without computing one.
	pub fn cached( &self, manifest: &Manifest, target: TargetId ) -> Option<Verdict> {
		manifest.compatibility.get( target )
	}

	/// How many isolated contexts were built for compatibility tests so far.
	pub fn constructed( &self ) -> usize { self.constructed.load( Ordering::Relaxed )}

	pub(crate) fn reset_counter( &self ) { self.constructed.store( 0, Ordering::Relaxed )}

}
