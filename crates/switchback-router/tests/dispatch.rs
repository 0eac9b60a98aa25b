//! End-to-end dispatch behavior across the muxes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use switchback_http::{Handler, Method, Request, Response, StatusCode};
use switchback_router::{MethodMux, PathMux, RouteError, RouteLookup, TableMux, path_params};

fn body_of(response: Response) -> String {
    let (_, _, body) = response.into_parts();
    String::from_utf8(body.into_bytes()).unwrap()
}

#[test]
fn a_realistic_route_table_dispatches_correctly() {
    let mut mux = PathMux::new();
    mux.handle("/", |_req: &mut Request| Response::ok().body_text("home"))
        .unwrap();
    mux.handle("/users", |_req: &mut Request| {
        Response::ok().body_text("users")
    })
    .unwrap();
    mux.handle("/users/:id", |req: &mut Request| {
        let id = path_params(req).get("id").unwrap_or("?").to_string();
        Response::ok().body_text(format!("user {id}"))
    })
    .unwrap();
    mux.handle("/users/:id/posts", |req: &mut Request| {
        let id = path_params(req).get("id").unwrap_or("?").to_string();
        Response::ok().body_text(format!("posts of {id}"))
    })
    .unwrap();
    mux.handle("/files/*path", |req: &mut Request| {
        let path = path_params(req).get("path").unwrap_or("").to_string();
        Response::ok().body_text(format!("file {path}"))
    })
    .unwrap();

    let cases = [
        (Method::Get, "/", "home"),
        (Method::Get, "/users", "users"),
        (Method::Get, "/users/7", "user 7"),
        (Method::Get, "/users/7/posts", "posts of 7"),
        (Method::Get, "/files/docs/readme.txt", "file docs/readme.txt"),
    ];
    for (method, path, expected) in cases {
        let mut req = Request::new(method, path);
        assert_eq!(body_of(mux.dispatch(&mut req)), expected, "{path}");
    }

    // A static sibling at the parameter's position is a conflict, not a
    // more specific route.
    assert!(matches!(
        mux.handle("/users/all", |_req: &mut Request| Response::ok()),
        Err(RouteError::WildcardConflict { .. })
    ));

    let mut req = Request::new(Method::Get, "/nope");
    assert_eq!(mux.dispatch(&mut req).status(), StatusCode::NOT_FOUND);
}

#[test]
fn nested_method_mux_under_a_path_route() {
    let mut per_method = MethodMux::new();
    per_method
        .handle(Method::Get, |_req: &mut Request| {
            Response::ok().body_text("list")
        })
        .unwrap();
    per_method
        .handle(Method::Post, |_req: &mut Request| {
            Response::new(StatusCode::NO_CONTENT)
        })
        .unwrap();

    let mut mux = PathMux::new();
    mux.handle("/items", per_method).unwrap();

    let mut req = Request::new(Method::Get, "/items");
    assert_eq!(body_of(mux.dispatch(&mut req)), "list");

    let mut req = Request::new(Method::Post, "/items");
    assert_eq!(mux.dispatch(&mut req).status(), StatusCode::NO_CONTENT);

    let mut req = Request::new(Method::Delete, "/items");
    assert_eq!(
        mux.dispatch(&mut req).status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[test]
fn a_table_can_front_a_path_mux() {
    let mut api = PathMux::new();
    api.handle("/items/:id", |req: &mut Request| {
        let id = path_params(req).get("id").unwrap_or("?").to_string();
        Response::ok().body_text(format!("api item {id}"))
    })
    .unwrap();

    let mut table = TableMux::new();
    table.handle_prefix("/api", api).unwrap();
    table
        .handle_method(Method::Options, |_req: &mut Request| {
            Response::new(StatusCode::NO_CONTENT)
        })
        .unwrap();

    let mut req = Request::new(Method::Get, "/api/items/3");
    assert_eq!(body_of(table.call(&mut req)), "api item 3");
    assert_eq!(req.path(), "/api/items/3");

    let mut req = Request::new(Method::Options, "/anywhere");
    assert_eq!(table.call(&mut req).status(), StatusCode::NO_CONTENT);
}

#[test]
fn lookup_exposes_handler_and_bindings_without_dispatching() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_handler = Arc::clone(&calls);

    let mut mux = PathMux::new();
    mux.handle("/users/:id", move |_req: &mut Request| {
        calls_in_handler.fetch_add(1, Ordering::SeqCst);
        Response::ok()
    })
    .unwrap();

    match mux.lookup("/users/9") {
        RouteLookup::Match(found) => {
            assert_eq!(found.params.get("id"), Some("9"));
            // Looking up does not run the handler.
            assert_eq!(calls.load(Ordering::SeqCst), 0);

            let mut req = Request::new(Method::Get, "/users/9");
            found.handler.call(&mut req);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
        RouteLookup::NotFound { .. } => panic!("expected a match"),
    }

    match mux.lookup("/users/9/") {
        RouteLookup::Match(_) => panic!("expected a slash mismatch"),
        RouteLookup::NotFound {
            trailing_slash_redirect,
        } => assert!(trailing_slash_redirect),
    }
}

#[test]
fn redirects_across_methods_and_queries() {
    let mut mux = PathMux::new();
    mux.handle("/path/", |_req: &mut Request| Response::ok())
        .unwrap();
    mux.handle("/other", |_req: &mut Request| Response::ok())
        .unwrap();
    let mux = mux.with_redirect_trailing_slash(true);

    // GET gets a permanent redirect.
    let mut req = Request::new(Method::Get, "/path");
    let response = mux.dispatch(&mut req);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.header_value("location"), Some(&b"/path/"[..]));

    // Everything else keeps its method through a 307.
    for method in [Method::Post, Method::Put, Method::Delete, Method::Patch] {
        let mut req = Request::new(method, "/path");
        let response = mux.dispatch(&mut req);
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{method}");
    }

    // Superfluous trailing slash, with the query carried over.
    let mut req = Request::new(Method::Get, "/other/");
    req.set_query(Some("a=1&b=2".to_string()));
    let response = mux.dispatch(&mut req);
    assert_eq!(
        response.header_value("location"),
        Some(&b"/other?a=1&b=2"[..])
    );
}

#[test]
fn a_shared_mux_serves_concurrent_lookups() {
    let mut mux = PathMux::new();
    mux.handle("/users/:id", |req: &mut Request| {
        let id = path_params(req).get("id").unwrap_or("?").to_string();
        Response::ok().body_text(id)
    })
    .unwrap();
    mux.handle("/static/*rest", |_req: &mut Request| Response::ok())
        .unwrap();
    let mux = Arc::new(mux);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let mux = Arc::clone(&mux);
            scope.spawn(move || {
                for i in 0..200 {
                    let id = worker * 1000 + i;
                    let mut req = Request::new(Method::Get, format!("/users/{id}"));
                    let response = mux.dispatch(&mut req);
                    assert_eq!(body_of(response), id.to_string());
                    assert_eq!(path_params(&req).get("id"), Some(id.to_string().as_str()));

                    let mut req = Request::new(Method::Get, "/static/a/b/c");
                    assert!(mux.dispatch(&mut req).status().is_success());
                }
            });
        }
    });
}

#[test]
fn recovery_isolates_a_panicking_route() {
    let mut mux = PathMux::new();
    mux.handle("/ok", |_req: &mut Request| Response::ok().body_text("fine"))
        .unwrap();
    mux.handle("/panic", |_req: &mut Request| -> Response {
        panic!("handler blew up")
    })
    .unwrap();
    let mux = mux.with_recover(|req, _payload| {
        Response::new(StatusCode::INTERNAL_SERVER_ERROR)
            .body_text(format!("recovered on {}", req.path()))
    });

    let mut req = Request::new(Method::Get, "/panic");
    let response = mux.dispatch(&mut req);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(response), "recovered on /panic");

    // The mux keeps serving afterwards.
    let mut req = Request::new(Method::Get, "/ok");
    assert_eq!(body_of(mux.dispatch(&mut req)), "fine");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Any slash-free segment values substituted into a two-param
        // pattern come back out bound to the right names.
        #[test]
        fn param_values_round_trip(
            user in "[A-Za-z0-9._~-]{1,16}",
            post in "[A-Za-z0-9._~-]{1,16}",
        ) {
            let mut mux = PathMux::new();
            mux.handle("/users/:user/posts/:post", |_req: &mut Request| {
                Response::ok()
            })
            .unwrap();

            let path = format!("/users/{user}/posts/{post}");
            match mux.lookup(&path) {
                RouteLookup::Match(found) => {
                    prop_assert_eq!(found.params.get("user"), Some(user.as_str()));
                    prop_assert_eq!(found.params.get("post"), Some(post.as_str()));
                    prop_assert_eq!(found.params.len(), 2);
                }
                RouteLookup::NotFound { .. } => panic!("no match for {path}"),
            }
        }

        // Unregistered static paths never match a static-only table.
        #[test]
        fn unregistered_paths_stay_unmatched(suffix in "[a-z]{1,12}") {
            let mut mux = PathMux::new();
            mux.handle("/fixed", |_req: &mut Request| Response::ok()).unwrap();

            let path = format!("/fixed/{suffix}");
            prop_assert!(!mux.lookup(&path).is_match());
        }
    }
}
