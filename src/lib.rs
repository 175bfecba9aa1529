//! Hierarchical client-side router.
//!
//! Resolves nested paths into a chain of views, re-resolving only the part
//! of the chain a path change invalidates and disposing every view that
//! falls out of scope.

pub mod config;
pub mod error;
pub mod observability;
pub mod router;
pub mod routing;
pub mod url_helper;

pub use config::schema::RouterConfig;
pub use error::{FailureContext, RouterError};
pub use router::{Navigator, RouteSnapshot, Router, RouterSubscription};
pub use routing::{Path, ResolverInput, RouteDescriptor};
pub use url_helper::UrlHelper;
