use std::path::Path ;
use rule_link::{ DependencyRef, Manifest, ManifestDirectory, ManifestKind };

fn prioritised( name: &str, priority: i32 ) -> Manifest {
	Manifest::new(
		name,
		ManifestKind::Rule,
		priority,
		DependencyRef::Inline( format!( "g:{}:1.0", name )),
		Path::new( "/modules" ).join( format!( "{}-1.0", name )),
	)
}

#[test]
fn sort_orders_by_descending_priority() {

	let directory = ManifestDirectory::new();
	[( "low", -5 ), ( "first-default", 0 ), ( "high", 10 ), ( "second-default", 0 ), ( "highest", 100 )]
		.into_iter()
		.for_each(|( name, priority )| { directory.put( prioritised( name, priority )).expect( "Failed to register manifest" ); });

	// discovery order until sorted
	let discovered = directory.manifests().iter().map(| manifest | manifest.name().to_string() ).collect::<Vec<_>>();
	assert_eq!( discovered, vec![ "low", "first-default", "high", "second-default", "highest" ]);

	directory.sort();

	let sorted = directory.manifests().iter().map(| manifest | manifest.name().to_string() ).collect::<Vec<_>>();
	assert_eq!( sorted, vec![ "highest", "high", "first-default", "second-default", "low" ]);

}

#[test]
fn sort_is_stable_across_repeats() {

	let directory = ManifestDirectory::new();
	[ "a", "b", "c" ].into_iter()
		.for_each(| name | { directory.put( prioritised( name, 1 )).expect( "Failed to register manifest" ); });

	directory.sort();
	directory.sort();

	let sorted = directory.locations();
	assert_eq!( sorted, vec![
		Path::new( "/modules/a-1.0" ).to_path_buf(),
		Path::new( "/modules/b-1.0" ).to_path_buf(),
		Path::new( "/modules/c-1.0" ).to_path_buf(),
	]);

}
