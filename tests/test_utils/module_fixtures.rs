#[allow( dead_code )]
mod module_fixtures {

	use std::path::{ Path, PathBuf };
	use std::sync::Arc ;
	use parking_lot::Mutex ;
	use rule_link::{ DependencyRef, Manifest, ManifestDirectory, ManifestKind, RuleLoader, Scope, TargetContext, definition_resource };

	/// Artifacts and modules laid out in a temporary directory.
	pub struct Workspace {
		dir: tempfile::TempDir,
	}

	impl Workspace {

		pub fn new() -> Self {
			init_tracing();
			Self { dir: tempfile::tempdir().expect( "Failed to create temporary directory" ) }
		}

		pub fn path( &self ) -> &Path { self.dir.path() }

		/// Creates the artifact directory `stem` holding the given definitions.
		pub fn artifact( &self, stem: &str, definitions: &[( &str, &str )]) -> PathBuf {
			let root = self.dir.path().join( stem );
			std::fs::create_dir_all( &root ).expect( "Failed to create artifact" );
			definitions.iter().for_each(|( name, content )| write( &root.join( definition_resource( name )), content ));
			root
		}

		/// Writes a plain resource into an existing artifact.
		pub fn resource( &self, artifact: &Path, name: &str, content: &str ) -> PathBuf {
			let path = artifact.join( name );
			write( &path, content );
			path
		}

		/// Writes an arbitrary file relative to the workspace root.
		pub fn file( &self, relative: &str, content: &str ) -> PathBuf {
			let path = self.dir.path().join( relative );
			write( &path, content );
			path
		}

		/// Creates a discoverable module under `root/stem` with its manifest and descriptor.
		pub fn module( &self, root: &str, stem: &str, manifest: &str, descriptor: &str, definitions: &[( &str, &str )]) -> PathBuf {
			let module = self.dir.path().join( root ).join( stem );
			std::fs::create_dir_all( &module ).expect( "Failed to create module" );
			write( &module.join( rule_link::MANIFEST_FILE ), manifest );
			write( &module.join( rule_link::DEFAULT_DESCRIPTOR ), descriptor );
			definitions.iter().for_each(|( name, content )| write( &module.join( definition_resource( name )), content ));
			module
		}

	}

	/// Routes engine logs to the test output. Only the first call per binary installs it.
	pub fn init_tracing() {
		let subscriber = tracing_subscriber::fmt()
			.with_max_level( tracing::Level::DEBUG )
			.with_test_writer()
			.finish();
		let _ = tracing::subscriber::set_global_default( subscriber );
	}

	fn write( path: &Path, content: &str ) {
		if let Some( parent ) = path.parent() {
			std::fs::create_dir_all( parent ).expect( "Failed to create parent directory" );
		}
		std::fs::write( path, content ).expect( "Failed to write fixture file" );
	}

	/// A rule manifest whose descriptor is given inline.
	pub fn manifest( name: &str, location: &Path, descriptor: &str ) -> Manifest {
		Manifest::new( name, ManifestKind::Rule, 0, DependencyRef::Inline( descriptor.to_string() ), location )
	}

	/// Registers and crosslinks the module `name` at version 1.0, holding `definitions`.
	pub fn linked_module( workspace: &Workspace, directory: &ManifestDirectory, name: &str, definitions: &[( &str, &str )]) -> Arc<Manifest> {
		let location = workspace.artifact( &format!( "{}-1.0", name ), definitions );
		let registered = directory.put( manifest( name, &location, &format!( "g:{}:1.0", name )))
			.expect( "Failed to register manifest" );
		directory.crosslink( &location, vec![ location.clone() ], "1.0" ).expect( "Failed to crosslink" );
		registered
	}

	/// Bootstrap, application and one nested scope below them.
	pub fn scopes() -> ( Arc<dyn TargetContext>, Arc<dyn TargetContext>, Arc<dyn TargetContext> ) {
		let bootstrap: Arc<dyn TargetContext> = Arc::new( Scope::bootstrap() );
		let application: Arc<dyn TargetContext> = Arc::new( Scope::application( Arc::clone( &bootstrap )));
		let nested: Arc<dyn TargetContext> = Arc::new( Scope::nested( Arc::clone( &application )));
		( bootstrap, application, nested )
	}

	/// Records every activation request.
	#[derive( Default )]
	pub struct RecordingLoader {
		calls: Mutex<Vec<( Vec<String>, bool )>>,
	}

	impl RecordingLoader {
		pub fn new() -> Arc<Self> { Arc::new( Self::default() ) }

		/// Module names and the `deferrers_only` flag of every call, in order.
		pub fn calls( &self ) -> Vec<( Vec<String>, bool )> { self.calls.lock().clone() }
	}

	impl RuleLoader for RecordingLoader {
		fn load_rules( &self, manifests: &[Arc<Manifest>], deferrers_only: bool ) {
			let names = manifests.iter().map(| manifest | manifest.name().to_string() ).collect();
			self.calls.lock().push(( names, deferrers_only ));
		}
	}

}
