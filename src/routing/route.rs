//! Route descriptors and their compiled form.
//!
//! Descriptors are compiled once, at configuration time, into
//! [`RouteEntry`] trait objects. Component routes defer building their view
//! and continuation until first matched, then keep the result for the
//! lifetime of the route.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::routing::matcher::{parse_template, PathMatch, PathMatcher, PatternError, Segment};
use crate::routing::path::Path;
use crate::routing::resolver::{nested_resolver, ViewResolver};

/// A compiled route: matcher plus associated view and continuation.
pub trait RouteEntry<V>: Send + Sync {
    fn match_path(&self, path: &Path) -> Option<PathMatch>;

    fn view(&self) -> Option<V>;

    /// Resolver for routes nested under this one.
    fn continuation(&self) -> Option<ViewResolver<V>>;

    /// Template text for logs.
    fn template(&self) -> &str {
        "<route>"
    }
}

/// Declarative route: template, optional view, nested routes.
pub struct RouteDescriptor<V> {
    pub path: Vec<Segment>,
    pub view: Option<V>,
    pub routes: Vec<RouteInput<V>>,
}

impl<V> RouteDescriptor<V> {
    pub fn new(path: Vec<Segment>) -> Self {
        Self {
            path,
            view: None,
            routes: Vec::new(),
        }
    }

    /// Parse a `/`-separated template.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        parse_template(template).map(Self::new)
    }

    pub fn view(mut self, view: V) -> Self {
        self.view = Some(view);
        self
    }

    pub fn routes(mut self, routes: Vec<RouteInput<V>>) -> Self {
        self.routes = routes;
        self
    }
}

/// What a component route produces when first matched.
pub struct Component<V> {
    pub view: Option<V>,
    pub routes: Vec<RouteInput<V>>,
}

impl<V> Component<V> {
    pub fn new(view: V) -> Self {
        Self {
            view: Some(view),
            routes: Vec::new(),
        }
    }

    pub fn routes(mut self, routes: Vec<RouteInput<V>>) -> Self {
        self.routes = routes;
        self
    }
}

/// Factory invoked at most once per component route.
pub type ComponentFactory<V> = Arc<dyn Fn() -> Component<V> + Send + Sync>;

/// Any accepted route shape.
pub enum RouteInput<V> {
    Descriptor(RouteDescriptor<V>),
    /// A pre-built route.
    Route(Arc<dyn RouteEntry<V>>),
    /// A lazily built, memoized route.
    Component {
        path: Vec<Segment>,
        component: ComponentFactory<V>,
    },
}

impl<V> RouteInput<V> {
    pub fn component<F>(path: Vec<Segment>, component: F) -> Self
    where
        F: Fn() -> Component<V> + Send + Sync + 'static,
    {
        RouteInput::Component {
            path,
            component: Arc::new(component),
        }
    }
}

impl<V> From<RouteDescriptor<V>> for RouteInput<V> {
    fn from(descriptor: RouteDescriptor<V>) -> Self {
        RouteInput::Descriptor(descriptor)
    }
}

struct Target<V> {
    view: Option<V>,
    continuation: Option<ViewResolver<V>>,
}

enum Binding<V> {
    Eager(Target<V>),
    Lazy {
        component: ComponentFactory<V>,
        cell: OnceLock<Target<V>>,
    },
}

/// The standard compiled route.
pub struct Route<V> {
    matcher: PathMatcher,
    binding: Binding<V>,
}

impl<V: Clone + Send + Sync + 'static> Route<V> {
    pub fn new(path: Vec<Segment>, view: Option<V>, routes: Vec<RouteInput<V>>) -> Self {
        Self {
            matcher: PathMatcher::new(path),
            binding: Binding::Eager(Target {
                view,
                continuation: nested_resolver(routes),
            }),
        }
    }

    pub fn lazy(path: Vec<Segment>, component: ComponentFactory<V>) -> Self {
        Self {
            matcher: PathMatcher::new(path),
            binding: Binding::Lazy {
                component,
                cell: OnceLock::new(),
            },
        }
    }

    fn target(&self) -> &Target<V> {
        match &self.binding {
            Binding::Eager(target) => target,
            Binding::Lazy { component, cell } => cell.get_or_init(|| {
                tracing::debug!(template = self.matcher.template(), "Building component route");
                let built = component();
                Target {
                    view: built.view,
                    continuation: nested_resolver(built.routes),
                }
            }),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> RouteEntry<V> for Route<V> {
    fn match_path(&self, path: &Path) -> Option<PathMatch> {
        self.matcher.match_path(path)
    }

    fn view(&self) -> Option<V> {
        self.target().view.clone()
    }

    fn continuation(&self) -> Option<ViewResolver<V>> {
        self.target().continuation.clone()
    }

    fn template(&self) -> &str {
        self.matcher.template()
    }
}

impl<V> fmt::Debug for Route<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("template", &self.matcher.template())
            .field("lazy", &matches!(self.binding, Binding::Lazy { .. }))
            .finish()
    }
}

/// Compile route inputs into route entries, preserving order.
pub fn compile_routes<V: Clone + Send + Sync + 'static>(
    routes: Vec<RouteInput<V>>,
) -> Vec<Arc<dyn RouteEntry<V>>> {
    routes
        .into_iter()
        .map(|input| match input {
            RouteInput::Descriptor(d) => {
                Arc::new(Route::new(d.path, d.view, d.routes)) as Arc<dyn RouteEntry<V>>
            }
            RouteInput::Route(route) => route,
            RouteInput::Component { path, component } => Arc::new(Route::lazy(path, component)),
        })
        .collect()
}
