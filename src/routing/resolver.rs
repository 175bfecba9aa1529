//! View resolvers.
//!
//! A resolver maps the remaining path at one nesting level to a
//! [`ViewResolution`]: either the prefix it applied (with params, view and a
//! continuation for the next level) or an explicit not-found.

use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::routing::matcher::{parse_template, Params, PatternError, Segment};
use crate::routing::path::Path;
use crate::routing::route::{compile_routes, RouteDescriptor, RouteEntry, RouteInput};

/// Error type produced by user-supplied collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a single resolver invocation.
pub type ResolveResult<V> = Result<ViewResolution<V>, BoxError>;

/// One level of a successful match.
pub struct Resolved<V> {
    pub applied_path: Path,
    pub params: Params,
    pub view: Option<V>,
    /// Resolver for the next nesting level, if the route nests.
    pub continuation: Option<ViewResolver<V>>,
}

impl<V: Clone> Clone for Resolved<V> {
    fn clone(&self) -> Self {
        Self {
            applied_path: self.applied_path.clone(),
            params: self.params.clone(),
            view: self.view.clone(),
            continuation: self.continuation.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Resolved<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("applied_path", &self.applied_path)
            .field("params", &self.params)
            .field("view", &self.view)
            .field("nests", &self.continuation.is_some())
            .finish()
    }
}

/// Outcome of resolving one level.
#[derive(Debug)]
pub enum ViewResolution<V> {
    Resolved(Resolved<V>),
    /// No route matched. Carries the unconsumed path.
    NotFound { remaining: Path },
}

impl<V> ViewResolution<V> {
    pub fn not_found(remaining: Path) -> Self {
        ViewResolution::NotFound { remaining }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewResolution::NotFound { .. })
    }
}

/// Asynchronous resolution of one nesting level.
pub trait Resolve<V>: Send + Sync {
    fn resolve(&self, remaining: Path) -> BoxFuture<'static, ResolveResult<V>>;
}

/// Shared handle to a resolver.
pub type ViewResolver<V> = Arc<dyn Resolve<V>>;

impl<V, F, Fut> Resolve<V> for F
where
    F: Fn(Path) -> Fut + Send + Sync,
    Fut: Future<Output = ResolveResult<V>> + Send + 'static,
{
    fn resolve(&self, remaining: Path) -> BoxFuture<'static, ResolveResult<V>> {
        Box::pin(self(remaining))
    }
}

/// Wrap an async function as a resolver.
pub fn resolver_fn<V, F, Fut>(f: F) -> ViewResolver<V>
where
    V: 'static,
    F: Fn(Path) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolveResult<V>> + Send + 'static,
{
    Arc::new(f)
}

/// Resolves against an ordered list of compiled routes. First match wins.
pub struct RoutesResolver<V> {
    routes: Vec<Arc<dyn RouteEntry<V>>>,
}

impl<V: Clone + Send + Sync + 'static> RoutesResolver<V> {
    pub fn new(routes: Vec<Arc<dyn RouteEntry<V>>>) -> Self {
        Self { routes }
    }

    /// Synchronous lookup shared by [`Resolve::resolve`].
    pub fn lookup(&self, remaining: &Path) -> ViewResolution<V> {
        for route in &self.routes {
            if let Some(hit) = route.match_path(remaining) {
                tracing::trace!(
                    template = route.template(),
                    applied = %hit.consumed,
                    "Route matched"
                );
                return ViewResolution::Resolved(Resolved {
                    applied_path: hit.consumed,
                    params: hit.params,
                    view: route.view(),
                    continuation: route.continuation(),
                });
            }
        }
        ViewResolution::not_found(remaining.clone())
    }
}

impl<V: Clone + Send + Sync + 'static> Resolve<V> for RoutesResolver<V> {
    fn resolve(&self, remaining: Path) -> BoxFuture<'static, ResolveResult<V>> {
        let outcome = self.lookup(&remaining);
        Box::pin(async move { Ok(outcome) })
    }
}

/// Root resolver for an empty route list.
///
/// Reports not-found for any non-empty path; the empty path resolves to a
/// trivial level with no view and no continuation.
pub struct EmptyResolver;

impl<V: Send + 'static> Resolve<V> for EmptyResolver {
    fn resolve(&self, remaining: Path) -> BoxFuture<'static, ResolveResult<V>> {
        let outcome = if remaining.is_empty() {
            ViewResolution::Resolved(Resolved {
                applied_path: Path::root(),
                params: Params::new(),
                view: None,
                continuation: None,
            })
        } else {
            ViewResolution::not_found(remaining)
        };
        Box::pin(async move { Ok(outcome) })
    }
}

/// Try each resolver in order and return the first resolution that is not
/// a not-found. Errors short-circuit.
pub fn combine<V: Send + 'static>(resolvers: Vec<ViewResolver<V>>) -> ViewResolver<V> {
    let resolvers: Arc<[ViewResolver<V>]> = resolvers.into();
    Arc::new(move |remaining: Path| first_found(resolvers.clone(), remaining))
}

async fn first_found<V>(resolvers: Arc<[ViewResolver<V>]>, remaining: Path) -> ResolveResult<V> {
    for resolver in resolvers.iter() {
        let outcome = resolver.resolve(remaining.clone()).await?;
        if !outcome.is_not_found() {
            return Ok(outcome);
        }
    }
    Ok(ViewResolution::not_found(remaining))
}

/// Every accepted shape of routing input, normalized once by
/// [`ResolverInput::into_resolver`].
pub enum ResolverInput<V> {
    /// A caller-supplied resolver (dynamic or lazily loaded trees).
    Function(ViewResolver<V>),
    /// An ordered list of routes.
    Routes(Vec<RouteInput<V>>),
    /// Ordered template → view pairs without nesting.
    PathMap(Vec<(Vec<Segment>, V)>),
}

impl<V: Clone + Send + Sync + 'static> ResolverInput<V> {
    /// Build a [`ResolverInput::PathMap`] from textual templates.
    pub fn path_map<K, I>(entries: I) -> Result<Self, PatternError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        entries
            .into_iter()
            .map(|(template, view)| parse_template(template.as_ref()).map(|path| (path, view)))
            .collect::<Result<Vec<_>, _>>()
            .map(ResolverInput::PathMap)
    }

    /// Normalize into the root resolver.
    pub fn into_resolver(self) -> ViewResolver<V> {
        match self {
            ResolverInput::Function(resolver) => resolver,
            ResolverInput::Routes(routes) => routes_resolver(routes),
            ResolverInput::PathMap(entries) => routes_resolver(
                entries
                    .into_iter()
                    .map(|(path, view)| RouteDescriptor::new(path).view(view).into())
                    .collect(),
            ),
        }
    }
}

impl<V> From<ViewResolver<V>> for ResolverInput<V> {
    fn from(resolver: ViewResolver<V>) -> Self {
        ResolverInput::Function(resolver)
    }
}

impl<V> From<Vec<RouteInput<V>>> for ResolverInput<V> {
    fn from(routes: Vec<RouteInput<V>>) -> Self {
        ResolverInput::Routes(routes)
    }
}

fn routes_resolver<V: Clone + Send + Sync + 'static>(routes: Vec<RouteInput<V>>) -> ViewResolver<V> {
    let compiled = compile_routes(routes);
    if compiled.is_empty() {
        Arc::new(EmptyResolver)
    } else {
        Arc::new(RoutesResolver::new(compiled))
    }
}

/// Continuation resolver for nested routes. `None` when there is nothing to
/// nest into.
pub fn nested_resolver<V: Clone + Send + Sync + 'static>(
    routes: Vec<RouteInput<V>>,
) -> Option<ViewResolver<V>> {
    if routes.is_empty() {
        return None;
    }
    Some(Arc::new(RoutesResolver::new(compile_routes(routes))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved<V>(outcome: ViewResolution<V>) -> Resolved<V> {
        match outcome {
            ViewResolution::Resolved(r) => r,
            ViewResolution::NotFound { remaining } => panic!("not found: {}", remaining),
        }
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let root = ResolverInput::path_map([(":any", "param"), ("a", "literal")])
            .unwrap()
            .into_resolver();
        let r = resolved(root.resolve(Path::from(["a"])).await.unwrap());
        assert_eq!(r.view, Some("param"));
        assert_eq!(r.params.get("any").map(String::as_str), Some("a"));
    }

    #[tokio::test]
    async fn test_empty_routes_report_not_found() {
        let root = ResolverInput::<&str>::Routes(Vec::new()).into_resolver();
        match root.resolve(Path::from(["a", "b"])).await.unwrap() {
            ViewResolution::NotFound { remaining } => assert_eq!(remaining, Path::from(["a", "b"])),
            other => panic!("unexpected {:?}", other),
        }

        let r = resolved(root.resolve(Path::root()).await.unwrap());
        assert!(r.applied_path.is_empty());
        assert!(r.view.is_none());
        assert!(r.continuation.is_none());
    }

    #[tokio::test]
    async fn test_combine_falls_through_not_found() {
        let first = ResolverInput::path_map([("a", 1)]).unwrap().into_resolver();
        let second = ResolverInput::path_map([("b", 2)]).unwrap().into_resolver();
        let combined = combine(vec![first, second]);

        let r = resolved(combined.resolve(Path::from(["b"])).await.unwrap());
        assert_eq!(r.view, Some(2));

        let miss = combined.resolve(Path::from(["c"])).await.unwrap();
        assert!(miss.is_not_found());
    }

    #[tokio::test]
    async fn test_combine_short_circuits_errors() {
        let failing = resolver_fn(|_path: Path| async { Err::<ViewResolution<i32>, BoxError>("boom".into()) });
        let never = ResolverInput::path_map([(":any", 2)]).unwrap().into_resolver();
        let combined = combine(vec![failing, never]);
        let err = combined.resolve(Path::from(["x"])).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
