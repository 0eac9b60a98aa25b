//! A small routing table exercised by hand.
//!
//! Run with: cargo run --example getting_started

use switchback::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut mux = PathMux::new();

    mux.handle("/", |_req: &mut Request| {
        Response::ok().body_text("welcome")
    })?;

    mux.handle("/items/:id", |req: &mut Request| {
        let id = path_params(req).get("id").unwrap_or("?");
        match Response::ok().json(&serde_json::json!({ "item": id })) {
            Ok(response) => response,
            Err(_) => Response::new(StatusCode::INTERNAL_SERVER_ERROR),
        }
    })?;

    mux.handle("/static/*filepath", |req: &mut Request| {
        let file = path_params(req).get("filepath").unwrap_or("");
        Response::ok().body_text(format!("would serve {file}"))
    })?;

    // One path, different verbs.
    let mut items = MethodMux::new();
    items.handle(Method::Get, |_req: &mut Request| {
        Response::ok().body_text("list")
    })?;
    items.handle(Method::Post, |_req: &mut Request| {
        Response::new(StatusCode::NO_CONTENT)
    })?;
    mux.handle("/items", items)?;

    let mux = mux
        .with_redirect_trailing_slash(true)
        .with_recover(|_req, _payload| {
            Response::new(StatusCode::INTERNAL_SERVER_ERROR).body_text("recovered")
        });

    for (method, path) in [
        (Method::Get, "/"),
        (Method::Get, "/items"),
        (Method::Post, "/items"),
        (Method::Get, "/items/42"),
        (Method::Get, "/static/css/site.css"),
        (Method::Get, "/missing"),
    ] {
        let mut req = Request::new(method, path);
        let response = mux.dispatch(&mut req);
        println!("{method} {path} -> {}", response.status());
    }

    Ok(())
}
