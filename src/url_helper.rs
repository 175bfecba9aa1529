//! URL helpers for building links relative to a resolved position.
//!
//! Each activated chain position gets a [`UrlHelper`] holding the path it
//! applied and a link to its parent's helper. The absolute path is only
//! materialized on demand by walking the parent links.

use std::fmt;
use std::sync::Arc;

use crate::router::navigator::Navigate;
use crate::routing::Path;

/// Immutable path position plus parent link.
#[derive(Clone)]
pub struct UrlHelper {
    inner: Arc<Node>,
}

struct Node {
    path: Path,
    parent: Option<UrlHelper>,
    navigator: Option<Arc<dyn Navigate>>,
}

impl UrlHelper {
    pub fn new(path: Path, parent: Option<UrlHelper>) -> Self {
        let navigator = parent.as_ref().and_then(|p| p.inner.navigator.clone());
        Self {
            inner: Arc::new(Node {
                path,
                parent,
                navigator,
            }),
        }
    }

    /// A parentless helper that navigates through `navigator`.
    pub fn root(path: Path, navigator: Option<Arc<dyn Navigate>>) -> Self {
        Self {
            inner: Arc::new(Node {
                path,
                parent: None,
                navigator,
            }),
        }
    }

    /// A helper one level below this one.
    pub fn child(&self, path: Path) -> Self {
        Self::new(path, Some(self.clone()))
    }

    /// The segments applied at this level only.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn parent(&self) -> Option<&UrlHelper> {
        self.inner.parent.as_ref()
    }

    /// The full path from the root down to this level.
    pub fn to_absolute(&self) -> Path {
        let mut stack = Vec::new();
        let mut current = Some(self);
        while let Some(url) = current {
            stack.push(url.path());
            current = url.parent();
        }

        let mut absolute = Path::root();
        for path in stack.into_iter().rev() {
            absolute = absolute.join(path);
        }
        absolute
    }

    /// Absolute path of this level extended by `extra`.
    pub fn route(&self, extra: &[&str]) -> Path {
        let mut path = self.to_absolute();
        for segment in extra {
            path.push(*segment);
        }
        path
    }

    /// `route(extra)` rendered as `/a/b`.
    pub fn stringify(&self, extra: &[&str]) -> String {
        self.route(extra).to_string()
    }

    /// Navigate to `route(extra)`. Returns false if no navigator is attached.
    pub fn navigate(&self, extra: &[&str]) -> bool {
        self.link(extra).go()
    }

    pub fn link(&self, extra: &[&str]) -> Link {
        Link {
            route: self.route(extra),
            navigator: self.inner.navigator.clone(),
        }
    }

    /// Link to this level.
    pub fn self_link(&self) -> Link {
        self.link(&[])
    }

    /// Link to the parent level, if any.
    pub fn parent_link(&self) -> Option<Link> {
        self.parent().map(UrlHelper::self_link)
    }

    /// Resolve a textual path: a leading `/` makes it absolute, otherwise it
    /// is relative to this level.
    pub fn resolve(&self, partial: &str) -> Path {
        if partial.starts_with('/') {
            Path::parse(partial)
        } else {
            self.to_absolute().join(&Path::parse(partial))
        }
    }

    /// A helper rooted at `resolve(partial)`.
    pub fn scope(&self, partial: &str) -> UrlHelper {
        UrlHelper::root(self.resolve(partial), self.inner.navigator.clone())
    }
}

impl fmt::Debug for UrlHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlHelper")
            .field("path", self.path())
            .field("absolute", &self.to_absolute())
            .finish()
    }
}

impl fmt::Display for UrlHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_absolute())
    }
}

/// A navigable absolute route.
#[derive(Clone)]
pub struct Link {
    route: Path,
    navigator: Option<Arc<dyn Navigate>>,
}

impl Link {
    pub fn route(&self) -> &Path {
        &self.route
    }

    /// Navigate to this link. Returns false if no navigator is attached.
    pub fn go(&self) -> bool {
        match &self.navigator {
            Some(navigator) => {
                navigator.execute(self.route.clone());
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Link").field(&self.route).finish()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.route)
    }
}
