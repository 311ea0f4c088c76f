use std::sync::Arc ;
use rule_link::{ CompatibilityChecker, ManifestDirectory, Scope };
use crate::module_fixtures::{ Workspace, linked_module };

const THREADS: usize = 16 ;

#[test]
fn single_flight_builds_one_context() {

	let workspace = Workspace::new();
	let directory = Arc::new( ManifestDirectory::new() );
	let module = linked_module( &workspace, &directory, "okhttp", &[( "io.rules.okhttp.Interceptor", "v1" )]);
	let checker = CompatibilityChecker::new( Arc::clone( &directory ));
	let target = Scope::bootstrap();

	let verdicts = std::thread::scope(| scope | {
		let handles = ( 0..THREADS )
			.map(| _ | scope.spawn(|| checker.verdict( &module, &target ).expect( "Check failed" )))
			.collect::<Vec<_>>();
		handles.into_iter().map(| handle | handle.join().expect( "Thread panicked" )).collect::<Vec<_>>()
	});

	assert_eq!( checker.constructed(), 1 );
	assert!( verdicts.iter().all(| verdict | verdict.is_compatible() ));
	assert!( verdicts.windows( 2 ).all(| pair | Arc::ptr_eq( pair[0].context(), pair[1].context() )));

}

#[test]
fn single_flight_incompatible_closes_once() {

	let workspace = Workspace::new();
	let directory = Arc::new( ManifestDirectory::new() );
	let module = linked_module( &workspace, &directory, "okhttp", &[( "com.squareup.okhttp.Call", "3.14" )]);
	let checker = CompatibilityChecker::new( Arc::clone( &directory ));
	let target = Scope::bootstrap().with_definitions([( "com.squareup.okhttp.Call", b"2.7".to_vec() )]);

	let results = std::thread::scope(| scope | {
		let handles = ( 0..THREADS )
			.map(| _ | scope.spawn(|| checker.check( &module, &target ).expect( "Check failed" )))
			.collect::<Vec<_>>();
		handles.into_iter().map(| handle | handle.join().expect( "Thread panicked" )).collect::<Vec<_>>()
	});

	assert!( results.iter().all(| compatible | !compatible ));
	assert_eq!( checker.constructed(), 1 );

}
