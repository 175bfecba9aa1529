//! Routers built from configuration and the alternative route inputs.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{route, Recorder};
use nested_router::config::{parse_config, ConfigError, ValidationError};
use nested_router::router::on_dispose;
use nested_router::routing::{combine, Component, Path, ResolverInput, RouteInput, Segment};
use nested_router::{RouteSnapshot, Router, RouterConfig};

const CONFIG: &str = r#"
[router]
base_path = "/app"

[[routes]]
path = ""
view = "Home"

[[routes]]
path = "users"
view = "UserList"

[[routes.routes]]
path = "new"
view = "NewUser"

[[routes.routes]]
path = ":id"
view = "UserDetail"

[[routes.routes.routes]]
path = "posts"
view = "UserPosts"

[[routes]]
path = "~^v[0-9]+$"
view = "Versioned"
"#;

fn views(snapshot: &RouteSnapshot<String>) -> Vec<String> {
    snapshot
        .views
        .iter()
        .map(|v| v.view.clone().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_router_from_config() {
    let config = parse_config(CONFIG).unwrap();
    let router = Router::from_config(&config).unwrap();
    let navigator = router.navigator();
    let mut sub = router.start(|_resolved, _url| Ok(on_dispose(|| {})));

    navigator.execute_str("/app/users/42/posts");
    let snapshot = sub.next().await.unwrap();
    assert_eq!(views(&snapshot), vec!["UserList", "UserDetail", "UserPosts"]);
    assert_eq!(snapshot.views[1].params.get("id").map(String::as_str), Some("42"));

    navigator.execute_str("/app/users/new");
    let snapshot = sub.next().await.unwrap();
    assert_eq!(views(&snapshot), vec!["UserList", "NewUser"]);

    navigator.execute_str("/app");
    let snapshot = sub.next().await.unwrap();
    assert_eq!(views(&snapshot), vec!["Home"]);
    assert!(snapshot.views[0].url.path().is_empty());

    navigator.execute_str("/app/v2/extra");
    let snapshot = sub.next().await.unwrap();
    assert_eq!(views(&snapshot), vec!["Versioned"]);
    assert_eq!(snapshot.remainder, Path::from(["extra"]));
    assert!(!snapshot.is_not_found());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config: RouterConfig = toml::from_str(CONFIG).unwrap();
    let id_route = config.routes[1].routes[1].clone();
    config.routes[1].routes.insert(0, id_route);

    match Router::from_config(&config) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors
                .iter()
                .any(|e| matches!(e, ValidationError::DuplicateTemplate { template, .. } if template == ":id")));
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("config should be rejected"),
    }
}

#[tokio::test]
async fn test_component_routes_build_once() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let recorder = Recorder::new();
    let router = Router::new(vec![
        route("home", "Home", vec![]),
        RouteInput::component(vec![Segment::Literal("admin".into())], move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Component::new("Admin").routes(vec![route("audit", "Audit", vec![])])
        }),
    ]);
    let mut sub = router.start(recorder.executor());
    let navigator = router.navigator();

    navigator.execute_str("/home");
    sub.next().await.unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 0);

    for path in ["/admin/audit", "/home", "/admin"] {
        navigator.execute_str(path);
        sub.next().await.unwrap();
    }
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(recorder.activated().contains(&"Audit@/admin/audit".to_string()));
}

#[tokio::test]
async fn test_path_map_and_combined_resolvers() {
    let recorder = Recorder::new();
    let docs = ResolverInput::path_map([("docs/:page", "Docs")]).unwrap().into_resolver();
    let fallback = ResolverInput::path_map([(":anything", "Fallback")]).unwrap().into_resolver();
    let router = Router::new(ResolverInput::Function(combine(vec![docs, fallback])));
    let mut sub = router.start(recorder.executor());
    let navigator = router.navigator();

    navigator.execute_str("/docs/intro");
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot.views[0].view, Some("Docs"));
    assert_eq!(snapshot.views[0].params.get("page").map(String::as_str), Some("intro"));

    navigator.execute_str("/pricing");
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot.views[0].view, Some("Fallback"));
}
