use std::path::{ Path, PathBuf };
use rule_link::{ LoadError, ManifestDirectory };
use crate::module_fixtures::manifest ;

fn files( location: &str, dependencies: &[&str] ) -> Vec<PathBuf> {
	std::iter::once( location ).chain( dependencies.iter().copied() ).map( PathBuf::from ).collect()
}

#[test]
fn crosslink_registers_dependencies_and_version() {

	let directory = ManifestDirectory::new();
	directory.put( manifest( "okhttp", Path::new( "/modules/okhttp-1.0" ), "" )).expect( "Failed to register manifest" );

	directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/modules/okhttp-1.0", &[ "/lib/okio-1.17.jar" ]), "1.0" )
		.expect( "Failed to crosslink" );

	assert_eq!(
		directory.dependencies( Path::new( "/modules/okhttp-1.0" )).as_deref(),
		Some( files( "/modules/okhttp-1.0", &[ "/lib/okio-1.17.jar" ]).as_slice() ),
	);
	assert_eq!( directory.version_of( "okhttp" ).as_deref(), Some( "1.0" ));

}

#[test]
fn crosslink_same_files_twice_is_noop() {

	let directory = ManifestDirectory::new();
	directory.put( manifest( "okhttp", Path::new( "/modules/okhttp-1.0" ), "" )).expect( "Failed to register manifest" );

	directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/modules/okhttp-1.0", &[]), "1.0" ).expect( "Failed to crosslink" );
	directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/modules/okhttp-1.0", &[]), "1.0" ).expect( "Repeated crosslink failed" );

}

#[test]
fn crosslink_error_version_conflict() {

	let directory = ManifestDirectory::new();
	directory.put( manifest( "okhttp", Path::new( "/modules/okhttp-1.0" ), "" )).expect( "Failed to register manifest" );
	directory.put( manifest( "okhttp", Path::new( "/other/okhttp-2.0" ), "" )).expect( "Failed to register manifest" );

	directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/modules/okhttp-1.0", &[]), "1.0" ).expect( "Failed to crosslink" );

	match directory.crosslink( Path::new( "/other/okhttp-2.0" ), files( "/other/okhttp-2.0", &[]), "2.0" ) {
		Err( LoadError::VersionConflict { name, existing, attempted }) => {
			assert_eq!( name, "okhttp" );
			assert_eq!( existing, "1.0" );
			assert_eq!( attempted, "2.0" );
		},
		value => panic!( "Expected VersionConflict, found: {:?}", value ),
	}
	assert_eq!( directory.version_of( "okhttp" ).as_deref(), Some( "1.0" ));
	assert!( directory.dependencies( Path::new( "/other/okhttp-2.0" )).is_none() );

}

#[test]
fn crosslink_error_missing_manifest() {
	let directory = ManifestDirectory::new();
	match directory.crosslink( Path::new( "/modules/ghost-1.0" ), files( "/modules/ghost-1.0", &[]), "1.0" ) {
		Err( LoadError::MissingManifest( _ )) => {},
		value => panic!( "Expected MissingManifest, found: {:?}", value ),
	}
}

#[test]
fn crosslink_error_unreferenced_module() {

	let directory = ManifestDirectory::new();
	directory.put( manifest( "okhttp", Path::new( "/modules/okhttp-1.0" ), "" )).expect( "Failed to register manifest" );

	match directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/lib/okio-1.17.jar", &[]), "1.0" ) {
		Err( LoadError::UnreferencedModule( _ )) => {},
		value => panic!( "Expected UnreferencedModule, found: {:?}", value ),
	}

}

#[test]
fn crosslink_error_duplicate_dependencies() {

	let directory = ManifestDirectory::new();
	directory.put( manifest( "okhttp", Path::new( "/modules/okhttp-1.0" ), "" )).expect( "Failed to register manifest" );

	directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/modules/okhttp-1.0", &[]), "1.0" ).expect( "Failed to crosslink" );

	match directory.crosslink( Path::new( "/modules/okhttp-1.0" ), files( "/modules/okhttp-1.0", &[ "/lib/okio-1.17.jar" ]), "1.0" ) {
		Err( LoadError::DuplicateDependencies( _ )) => {},
		value => panic!( "Expected DuplicateDependencies, found: {:?}", value ),
	}

}
