use rule_link::{ DependencyRef, DeferrerId, DirectoryDiscovery, DiscoveryError, ManifestKind, ManifestSource, DEFAULT_DESCRIPTOR };
use crate::module_fixtures::Workspace ;

#[test]
fn discovery_reads_module_manifests() {

	let workspace = Workspace::new();
	let okhttp = workspace.module( "rules", "okhttp-1.0", r#"
		name = "okhttp"
		priority = 5
		deferrers = [ "okhttp3.OkHttpClient" ]
	"#, "io.rules:okhttp:1.0\n", &[]);
	let jaeger = workspace.module( "rules", "jaeger-1.2", r#"
		name = "jaeger"
		kind = "exporter"
		dependencies = "deps/custom.tgf"
	"#, "io.exporters:jaeger:1.2\n", &[]);
	workspace.file( "rules/not-a-module/readme.txt", "" );

	let ( manifests, errors ) = DirectoryDiscovery::new( workspace.path().join( "rules" )).discover();
	assert_no_errors!( errors );

	// file name order
	assert_eq!( manifests.iter().map(| manifest | manifest.name() ).collect::<Vec<_>>(), vec![ "jaeger", "okhttp" ]);

	let jaeger_manifest = &manifests[0];
	assert_eq!( jaeger_manifest.kind(), ManifestKind::Exporter );
	assert_eq!( jaeger_manifest.priority(), 0 );
	assert_eq!( jaeger_manifest.source_location(), jaeger );
	assert_eq!( jaeger_manifest.dependency_ref(), &DependencyRef::Descriptor( jaeger.join( "deps/custom.tgf" )));

	let okhttp_manifest = &manifests[1];
	assert_eq!( okhttp_manifest.kind(), ManifestKind::Rule );
	assert_eq!( okhttp_manifest.priority(), 5 );
	assert_eq!( okhttp_manifest.deferrers(), &[ DeferrerId::from( "okhttp3.OkHttpClient" )]);
	assert_eq!( okhttp_manifest.dependency_ref(), &DependencyRef::Descriptor( okhttp.join( DEFAULT_DESCRIPTOR )));

}

#[test]
fn discovery_skips_broken_modules() {

	let workspace = Workspace::new();
	workspace.module( "rules", "good-1.0", "name = \"good\"\n", "g:good:1.0\n", &[]);
	workspace.module( "rules", "broken-1.0", "name = \n", "g:broken:1.0\n", &[]);
	workspace.module( "rules", "unknown-1.0", "name = \"unknown\"\ncolour = \"blue\"\n", "g:unknown:1.0\n", &[]);

	let ( manifests, errors ) = DirectoryDiscovery::new( workspace.path().join( "rules" )).discover();

	assert_eq!( manifests.iter().map(| manifest | manifest.name() ).collect::<Vec<_>>(), vec![ "good" ]);
	assert_eq!( errors.len(), 2 );
	assert!( errors.iter().all(| error | matches!( error, DiscoveryError::InvalidManifest { .. })));

}

#[test]
fn discovery_error_missing_root() {
	let workspace = Workspace::new();
	let ( manifests, errors ) = DirectoryDiscovery::new( workspace.path().join( "nowhere" )).discover();
	assert!( manifests.is_empty() );
	assert!( matches!( errors.as_slice(), [ DiscoveryError::UnreadableRoot { .. }]));
}
