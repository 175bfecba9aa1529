//! Resolution chains.
//!
//! A chain records, level by level, which resolver produced which applied
//! path prefix. It is stored as an index-addressed array: position `i` is
//! nesting depth `i`, and the applied path lengths of positions `0..=i` sum
//! to the number of segments consumed through depth `i`.

use crate::routing::path::Path;
use crate::routing::resolver::{BoxError, Resolved, ViewResolution, ViewResolver};

/// One position of a chain.
pub struct ChainEntry<V> {
    /// The resolver that produced this position. Re-resolution of this depth
    /// starts here.
    pub resolver: ViewResolver<V>,
    pub resolution: Resolved<V>,
}

impl<V: Clone> Clone for ChainEntry<V> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            resolution: self.resolution.clone(),
        }
    }
}

/// The accumulated nested match for one full path.
pub struct ResolutionChain<V> {
    entries: Vec<ChainEntry<V>>,
}

impl<V> Default for ResolutionChain<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ResolutionChain<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChainEntry<V>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of segments consumed by the whole chain.
    pub fn consumed(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.resolution.applied_path.len())
            .sum()
    }

    /// Applied path of each position, root first.
    pub fn applied_paths(&self) -> Vec<Path> {
        self.entries
            .iter()
            .map(|e| e.resolution.applied_path.clone())
            .collect()
    }

    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn push(&mut self, entry: ChainEntry<V>) {
        self.entries.push(entry);
    }
}

/// Why a traversal stopped.
#[derive(Debug)]
pub enum TraversalEnd {
    /// The path was exhausted, or the last level does not nest.
    Complete,
    /// A level reported no match for a non-empty remainder.
    NotFound { remaining: Path },
    /// A resolver failed. The remainder from this level is unresolved.
    Failed { remaining: Path, error: BoxError },
}

/// Freshly resolved positions plus the reason resolution stopped.
pub struct Traversal<V> {
    pub entries: Vec<ChainEntry<V>>,
    pub end: TraversalEnd,
}

/// Resolve `remaining` level by level, starting with `resolver`.
///
/// After each resolved level the unconsumed suffix is handed to that level's
/// continuation. An empty suffix is still offered to the continuation so
/// index routes can match; a not-found for an empty suffix is not a miss.
pub async fn traverse<V>(mut remaining: Path, resolver: Option<ViewResolver<V>>) -> Traversal<V> {
    let mut entries = Vec::new();
    let mut next = resolver;

    while let Some(current) = next.take() {
        let outcome = match current.resolve(remaining.clone()).await {
            Ok(outcome) => outcome,
            Err(error) => {
                return Traversal {
                    entries,
                    end: TraversalEnd::Failed { remaining, error },
                }
            }
        };

        match outcome {
            ViewResolution::NotFound { .. } if remaining.is_empty() => break,
            ViewResolution::NotFound { .. } => {
                tracing::debug!(depth = entries.len(), remaining = %remaining, "No route matched");
                return Traversal {
                    entries,
                    end: TraversalEnd::NotFound { remaining },
                };
            }
            ViewResolution::Resolved(resolution) => {
                let consumed = resolution.applied_path.len();
                tracing::debug!(
                    depth = entries.len(),
                    applied = %resolution.applied_path,
                    "Level resolved"
                );
                remaining = remaining.skip(consumed);
                // A level that consumes nothing ends the chain.
                if consumed > 0 {
                    next = resolution.continuation.clone();
                }
                entries.push(ChainEntry {
                    resolver: current,
                    resolution,
                });
            }
        }
    }

    Traversal {
        entries,
        end: TraversalEnd::Complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::resolver::ResolverInput;
    use crate::routing::route::RouteDescriptor;

    fn nested() -> ViewResolver<&'static str> {
        ResolverInput::Routes(vec![RouteDescriptor::parse("a")
            .unwrap()
            .view("V1")
            .routes(vec![
                RouteDescriptor::parse("b").unwrap().view("V2").into(),
                RouteDescriptor::parse("").unwrap().view("Index").into(),
            ])
            .into()])
        .into_resolver()
    }

    #[tokio::test]
    async fn test_traverse_full_match() {
        let t = traverse(Path::from(["a", "b"]), Some(nested())).await;
        assert!(matches!(t.end, TraversalEnd::Complete));
        let applied: Vec<_> = t.entries.iter().map(|e| e.resolution.applied_path.clone()).collect();
        assert_eq!(applied, vec![Path::from(["a"]), Path::from(["b"])]);
    }

    #[tokio::test]
    async fn test_traverse_partial_match() {
        let t = traverse(Path::from(["a", "x"]), Some(nested())).await;
        assert_eq!(t.entries.len(), 1);
        match t.end {
            TraversalEnd::NotFound { remaining } => assert_eq!(remaining, Path::from(["x"])),
            other => panic!("unexpected end {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_traverse_index_route() {
        let t = traverse(Path::from(["a"]), Some(nested())).await;
        assert!(matches!(t.end, TraversalEnd::Complete));
        assert_eq!(t.entries.len(), 2);
        assert_eq!(t.entries[1].resolution.view, Some("Index"));
        assert!(t.entries[1].resolution.applied_path.is_empty());
    }

    #[tokio::test]
    async fn test_traverse_no_match_at_root() {
        let t = traverse(Path::from(["zzz", "b"]), Some(nested())).await;
        assert!(t.entries.is_empty());
        match t.end {
            TraversalEnd::NotFound { remaining } => assert_eq!(remaining, Path::from(["zzz", "b"])),
            other => panic!("unexpected end {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_traverse_without_resolver() {
        let t = traverse::<&str>(Path::from(["a"]), None).await;
        assert!(t.entries.is_empty());
        assert!(matches!(t.end, TraversalEnd::Complete));
    }
}
