use std::path::Path ;
use rule_link::{ DependencyRef, LoaderConfig, Manifest, ManifestKind };

fn module( name: &str, kind: ManifestKind ) -> Manifest {
	Manifest::new( name, kind, 0, DependencyRef::Inline( String::new() ), Path::new( "/modules" ).join( name ))
}

#[test]
fn enable_everything_by_default() {
	let config = LoaderConfig::default();
	assert!( config.is_enabled( &module( "okhttp", ManifestKind::Rule )));
	assert!( config.is_enabled( &module( "jaeger", ManifestKind::Exporter )));
	assert!( !config.is_verbose( &module( "okhttp", ManifestKind::Rule )));
}

#[test]
fn enable_wildcard_and_exceptions() {

	let config = LoaderConfig::from_toml_str( r#"
		[rules]
		"*" = false
		okhttp = true
		"jdbc*" = true
		"jdbc-legacy" = false
	"# ).expect( "Failed to parse config" );

	assert!( config.is_enabled( &module( "okhttp", ManifestKind::Rule )));
	assert!( config.is_enabled( &module( "jdbc", ManifestKind::Rule )));
	assert!( config.is_enabled( &module( "jdbc-pool", ManifestKind::Rule )));
	assert!( !config.is_enabled( &module( "jdbc-legacy", ManifestKind::Rule )));
	assert!( !config.is_enabled( &module( "servlet", ManifestKind::Rule )));
	// rule switches leave exporters alone
	assert!( config.is_enabled( &module( "servlet", ManifestKind::Exporter )));

}

#[test]
fn enable_longer_pattern_wins() {

	let config = LoaderConfig::default()
		.with_enabled( ManifestKind::Exporter, "*-tracer", false ).expect( "Invalid pattern" )
		.with_enabled( ManifestKind::Exporter, "jaeger-*-tracer", true ).expect( "Invalid pattern" );

	assert!( !config.is_enabled( &module( "zipkin-tracer", ManifestKind::Exporter )));
	assert!( config.is_enabled( &module( "jaeger-grpc-tracer", ManifestKind::Exporter )));
	assert!( config.is_enabled( &module( "jaeger", ManifestKind::Exporter )));

}

#[test]
fn enable_verbose_patterns() {
	let config = LoaderConfig::default().with_verbose( "okhttp*" ).expect( "Invalid pattern" );
	assert!( config.is_verbose( &module( "okhttp3", ManifestKind::Rule )));
	assert!( !config.is_verbose( &module( "jdbc", ManifestKind::Rule )));
}
