use std::path::Path ;
use rule_link::{ ArtifactId, DependencyGraph, DEFAULT_SCOPE };
use crate::module_fixtures::Workspace ;

#[test]
fn resolve_picks_referenced_files_only() {

	let workspace = Workspace::new();
	let rule = workspace.artifact( "okhttp-rule-1.0", &[] );
	let okhttp = workspace.file( "lib/okhttp-3.14.jar", "" );
	let okio = workspace.file( "lib/okio-1.17.jar", "" );
	let noise = [
		workspace.file( "lib/okhttp-3.13.jar", "" ),
		workspace.file( "lib/junit-4.13.jar", "" ),
		workspace.file( "lib/unrelated-1.0.jar", "" ),
	];

	let graph = DependencyGraph::parse( "\
		io.example:okhttp-rule:1.0\n\
		io.example:okhttp-rule:1.0 com.squareup:okhttp:3.14\n\
		com.squareup:okhttp:3.14 com.squareup:okio:1.17\n\
		com.squareup:okhttp:3.14 junit:junit:4.13 test\n\
	" ).expect( "Failed to parse descriptor" );

	let candidates = noise.iter().cloned()
		.chain([ okio.clone(), okhttp.clone(), rule.clone() ])
		.collect::<Vec<_>>();

	assert_eq!( graph.resolve( &candidates, DEFAULT_SCOPE ), Some( vec![ rule, okhttp, okio ]));

}

#[test]
fn resolve_none_when_artifact_missing() {

	let graph = DependencyGraph::parse( "g:a:1.0\ng:a:1.0 g:b:2.0\n" ).expect( "Failed to parse descriptor" );
	let candidates = [ Path::new( "/modules/a-1.0" ), Path::new( "/lib/b-2.1.jar" )];

	assert_eq!( graph.resolve( &candidates, DEFAULT_SCOPE ), None );

}

#[test]
fn resolve_deduplicates_shared_files() {

	// two coordinates resolving to one file are listed once
	let graph = DependencyGraph::parse( "g:a:1.0\ng:a:1.0 g:b:2.0\ng:a:1.0 other:b:2.0\n" ).expect( "Failed to parse descriptor" );
	let candidates = [ Path::new( "/modules/a-1.0" ), Path::new( "/lib/b-2.0.jar" )];

	assert_eq!(
		graph.resolve( &candidates, DEFAULT_SCOPE ),
		Some( vec![ Path::new( "/modules/a-1.0" ).to_path_buf(), Path::new( "/lib/b-2.0.jar" ).to_path_buf() ]),
	);

}

#[test]
fn artifact_matches_file_names() {

	let artifact = ArtifactId::new( "com.squareup", "okhttp", "3.14.2" );

	assert!( artifact.matches( Path::new( "/lib/okhttp-3.14.2.jar" )));
	assert!( artifact.matches( Path::new( "/lib/okhttp-3.14.2" )));
	assert!( !artifact.matches( Path::new( "/lib/okhttp-3.14.2.1" )));
	assert!( !artifact.matches( Path::new( "/lib/okhttp-3.14.jar" )));
	assert!( !artifact.matches( Path::new( "/lib/okhttp-3.14.2.jar.bak" )));
	assert!( !artifact.matches( Path::new( "/lib/my-okhttp-3.14.2.jar" )));

}

#[test]
fn artifact_parses_coordinates() {
	assert_eq!( "g:a:1".parse::<ArtifactId>(), Ok( ArtifactId::new( "g", "a", "1" )));
	assert!( "g:a".parse::<ArtifactId>().is_err() );
	assert!( "g::1".parse::<ArtifactId>().is_err() );
	assert!( "g:a:1:x".parse::<ArtifactId>().is_err() );
}
