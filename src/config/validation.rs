//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every route template compiles
//! - Detect sibling routes that can never match
//! - Validate value ranges (poll interval > 0, known log level)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::routing::{PatternError, Segment};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem. `route` is the location in the tree, e.g.
/// `routes[1].routes[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{route}: invalid pattern segment `{segment}`: {message}")]
    InvalidPattern {
        route: String,
        segment: String,
        message: String,
    },

    #[error("{route}: parameter marker without a name")]
    EmptyParamName { route: String },

    #[error("{route}: parameter `{name}` bound more than once")]
    DuplicateParam { route: String, name: String },

    #[error("{route}: template `{template}` already used by a sibling")]
    DuplicateTemplate { route: String, template: String },

    #[error("{route}: `{template}` is unreachable behind sibling `{by}`")]
    ShadowedRoute {
        route: String,
        template: String,
        by: String,
    },

    #[error("invalid base path `{value}`: {message}")]
    InvalidBasePath { value: String, message: String },

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<PatternError> for ValidationError {
    fn from(e: PatternError) -> Self {
        ValidationError::InvalidPattern {
            route: "routes".to_string(),
            segment: e.segment,
            message: e.source.to_string(),
        }
    }
}

/// Validate the whole configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base = &config.router.base_path;
    if !base.starts_with('/') {
        errors.push(ValidationError::InvalidBasePath {
            value: base.clone(),
            message: "must start with `/`".to_string(),
        });
    } else if base.split('/').any(|s| s.starts_with(':') || s.starts_with('~')) {
        errors.push(ValidationError::InvalidBasePath {
            value: base.clone(),
            message: "must be literal segments only".to_string(),
        });
    }

    if config.router.poll_interval_ms == 0 {
        errors.push(ValidationError::InvalidValue {
            field: "router.poll_interval_ms".to_string(),
            message: "must be greater than 0".to_string(),
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidValue {
            field: "observability.log_level".to_string(),
            message: format!("unknown level `{}`", config.observability.log_level),
        });
    }

    validate_siblings(&config.routes, "routes", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_siblings(routes: &[RouteConfig], location: &str, errors: &mut Vec<ValidationError>) {
    // Templates that compiled, with their location and source text.
    let mut earlier: Vec<(Vec<Segment>, String)> = Vec::new();
    let mut seen = HashSet::new();

    for (i, route) in routes.iter().enumerate() {
        let here = format!("{}[{}]", location, i);

        if let Some(segments) = validate_template(route, &here, errors) {
            let template = render(&segments);
            if !seen.insert(template.clone()) {
                errors.push(ValidationError::DuplicateTemplate {
                    route: here.clone(),
                    template,
                });
            } else if let Some((_, by)) = earlier.iter().find(|(prior, _)| shadows(prior, &segments)) {
                errors.push(ValidationError::ShadowedRoute {
                    route: here.clone(),
                    template,
                    by: by.clone(),
                });
            }
            let rendered = render(&segments);
            earlier.push((segments, rendered));
        }

        validate_siblings(&route.routes, &format!("{}.routes", here), errors);
    }
}

/// Check one template. Returns its segments if it compiles.
fn validate_template(
    route: &RouteConfig,
    location: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut names = HashSet::new();
    let mut valid = true;

    for raw in route.path.split('/').filter(|s| !s.is_empty()) {
        match Segment::parse(raw) {
            Ok(Segment::Param(name)) if name.is_empty() => {
                errors.push(ValidationError::EmptyParamName {
                    route: location.to_string(),
                });
                valid = false;
            }
            Ok(segment) => {
                if let Segment::Param(name) = &segment {
                    if !names.insert(name.clone()) {
                        errors.push(ValidationError::DuplicateParam {
                            route: location.to_string(),
                            name: name.clone(),
                        });
                    }
                }
                segments.push(segment);
            }
            Err(e) => {
                errors.push(ValidationError::InvalidPattern {
                    route: location.to_string(),
                    segment: e.segment,
                    message: e.source.to_string(),
                });
                valid = false;
            }
        }
    }

    valid.then_some(segments)
}

/// Returns true if `prior` matches every path `later` could match.
///
/// Matching is by prefix, so a shorter template whose segments cover the
/// later one position by position wins first. Pattern segments are never
/// assumed to cover anything.
fn shadows(prior: &[Segment], later: &[Segment]) -> bool {
    if prior.is_empty() || prior.len() > later.len() {
        return false;
    }
    prior.iter().zip(later).all(|(p, l)| match (p, l) {
        (Segment::Param(_), _) => true,
        (Segment::Literal(a), Segment::Literal(b)) => a == b,
        _ => false,
    })
}

fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(Segment::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str, routes: Vec<RouteConfig>) -> RouteConfig {
        RouteConfig {
            path: path.to_string(),
            view: Some(path.to_string()),
            routes,
        }
    }

    fn config(routes: Vec<RouteConfig>) -> RouterConfig {
        RouterConfig {
            routes,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(vec![
            route("", vec![]),
            route("users", vec![route(":id", vec![]), route("new", vec![])]),
            route("~^v[0-9]+$", vec![]),
        ]);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut cfg = config(vec![
            route("~[", vec![]),
            route("a/:", vec![]),
            route("b/:x/:x", vec![route("c", vec![]), route("c", vec![])]),
        ]);
        cfg.router.poll_interval_ms = 0;
        cfg.router.base_path = "app".to_string();

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(matches!(&errors[0], ValidationError::InvalidBasePath { .. }));
        assert!(matches!(&errors[1], ValidationError::InvalidValue { field, .. } if field == "router.poll_interval_ms"));
        assert!(matches!(&errors[2], ValidationError::InvalidPattern { route, .. } if route == "routes[0]"));
        assert!(matches!(&errors[3], ValidationError::EmptyParamName { route } if route == "routes[1]"));
        assert!(matches!(&errors[4], ValidationError::DuplicateParam { name, .. } if name == "x"));
        assert!(
            matches!(&errors[5], ValidationError::DuplicateTemplate { route, .. } if route == "routes[2].routes[1]")
        );
    }

    #[test]
    fn test_detects_shadowed_siblings() {
        let cfg = config(vec![route(":id", vec![]), route("new", vec![])]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ShadowedRoute {
                route: "routes[1]".to_string(),
                template: "new".to_string(),
                by: ":id".to_string(),
            }]
        );

        // A shorter literal prefix also wins first.
        let cfg = config(vec![route("a", vec![]), route("a/b", vec![])]);
        assert!(validate_config(&cfg).is_err());

        // The reverse order is fine.
        let cfg = config(vec![route("a/b", vec![]), route("a", vec![]), route(":id", vec![])]);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_index_route_shadows_nothing() {
        let cfg = config(vec![route("", vec![]), route("a", vec![])]);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut cfg = config(vec![]);
        cfg.observability.log_level = "loud".to_string();
        let errors = validate_config(&cfg).unwrap_err();
        assert!(matches!(&errors[0], ValidationError::InvalidValue { field, .. } if field == "observability.log_level"));
    }
}
