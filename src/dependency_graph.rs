//! Dependency descriptors.
//!
//! Every module ships a small descriptor listing the artifacts it needs. The first
//! line declares the module itself as `group:artifact:version`; each following line
//! is a directed edge `<from> <to> [scope]` between two coordinates. A missing scope
//! means [`DEFAULT_SCOPE`]. Blank lines and `#` comments are ignored.
//!
//! ```text
//! io.rules:okhttp-rule:1.2.0
//! io.rules:okhttp-rule:1.2.0 com.squareup:okhttp:3.14.2 compile
//! com.squareup:okhttp:3.14.2 com.squareup:okio:1.17.2
//! io.rules:okhttp-rule:1.2.0 junit:junit:4.13 test
//! ```

use std::collections::VecDeque ;
use std::path::{ Path, PathBuf };
use indexmap::IndexSet ;
use itertools::Itertools ;

use crate::{ ArtifactId, LoadError };



/// Scope assumed for edges that don't declare one.
pub const DEFAULT_SCOPE: &str = "compile" ;

/// A directed dependency between two artifacts under a scope.
#[derive( Clone, Debug, PartialEq, Eq, Hash )]
pub struct Edge {
	pub from: ArtifactId,
	pub to: ArtifactId,
	pub scope: String,
}

/// A parsed dependency descriptor. Immutable once parsed.
#[derive( Clone, Debug )]
pub struct DependencyGraph {
	root: ArtifactId,
	nodes: IndexSet<ArtifactId>,
	edges: IndexSet<Edge>,
}

impl DependencyGraph {

	/// Parses a descriptor.
	///
	/// # Errors
	/// [`LoadError::MalformedDependencyData`] when the input is empty, the first line
	/// isn't a coordinate, or an edge line doesn't have the `<from> <to> [scope]` shape.
	pub fn parse( data: &str ) -> Result<Self, LoadError> {

		let mut lines = data.lines().enumerate().map(|( index, line )| ( index + 1, line.trim() ));

		let root = match lines.next() {
			Some(( line, first )) if !first.is_empty() => ArtifactId::parse_at( first, line )?,
			_ => return Err( LoadError::malformed( 1, "missing root declaration" )),
		};

		let edges = lines
			.filter(|( _, line )| !line.is_empty() && !line.starts_with( '#' ))
			.map(|( line, text )| Self::parse_edge( line, text ))
			.collect::<Result<IndexSet<_>, _>>()?;

		let nodes = std::iter::once( root.clone() )
			.chain( edges.iter().flat_map(| edge | [ edge.from.clone(), edge.to.clone() ]))
			.collect();

		Ok( Self { root, nodes, edges })

	}

	fn parse_edge( line: usize, text: &str ) -> Result<Edge, LoadError> {
		match text.split_whitespace().collect::<Vec<_>>().as_slice() {
			[ from, to ] => Ok( Edge {
				from: ArtifactId::parse_at( from, line )?,
				to: ArtifactId::parse_at( to, line )?,
				scope: DEFAULT_SCOPE.to_string(),
			}),
			[ from, to, scope ] => Ok( Edge {
				from: ArtifactId::parse_at( from, line )?,
				to: ArtifactId::parse_at( to, line )?,
				scope: ( *scope ).to_string(),
			}),
			_ => Err( LoadError::malformed( line, format!( "expected '<from> <to> [scope]', found '{}'", text ))),
		}
	}

	/// The module this descriptor belongs to.
	#[inline] pub fn root( &self ) -> &ArtifactId { &self.root }

	/// Version declared on the first line.
	#[inline] pub fn declared_version( &self ) -> &str { self.root.version() }

	#[inline] pub fn nodes( &self ) -> &IndexSet<ArtifactId> { &self.nodes }

	#[inline] pub fn edges( &self ) -> &IndexSet<Edge> { &self.edges }

	/// Every artifact the root needs under `scope`: the root plus everything reachable
	/// from it through edges of that scope, in breadth-first order.
	pub fn transitive( &self, scope: &str ) -> IndexSet<&ArtifactId> {

		let adjacency = self.edges.iter()
			.filter(| edge | edge.scope == scope )
			.map(| edge | ( &edge.from, &edge.to ))
			.into_group_map();

		let mut visited = IndexSet::from([ &self.root ]);
		let mut queue = VecDeque::from([ &self.root ]);
		while let Some( node ) = queue.pop_front() {
			adjacency.get( node ).into_iter().flatten()
				.for_each(| next | if visited.insert( *next ) { queue.push_back( *next ) });
		}
		visited

	}

	/// Narrows `candidates` down to the files providing the artifacts referenced
	/// under `scope`.
	///
	/// Returns `None` when a referenced artifact has no matching candidate. Callers
	/// treat that as an unsupported descriptor.
	pub fn resolve<P: AsRef<Path>>( &self, candidates: &[P], scope: &str ) -> Option<Vec<PathBuf>> {
		self.transitive( scope ).into_iter()
			.map(| artifact | candidates.iter()
				.map(| candidate | candidate.as_ref() )
				.find(| candidate | artifact.matches( candidate ))
				.map( Path::to_path_buf ))
			.collect::<Option<IndexSet<_>>>()
			.map(| files | files.into_iter().collect())
	}

}
