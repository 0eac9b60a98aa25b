//! Radix-tree HTTP path routing.
//!
//! switchback routes request paths to handlers through a compressed
//! prefix tree: lookup cost follows the path length, not the number of
//! registered routes. Patterns mix static segments with `:name`
//! parameters and a trailing `*name` catch-all, conflicting patterns
//! are rejected when registered, and the dispatcher can answer
//! trailing-slash mismatches with a redirect instead of a 404.
//!
//! # Quick Start
//!
//! ```
//! use switchback::prelude::*;
//!
//! let mut mux = PathMux::new();
//! mux.handle("/items/:id", |req: &mut Request| {
//!     let id = path_params(req).get("id").unwrap_or("?").to_string();
//!     Response::ok().body_text(id)
//! })
//! .unwrap();
//! let mux = mux.with_redirect_trailing_slash(true);
//!
//! let mut req = Request::new(Method::Get, "/items/7");
//! let response = mux.dispatch(&mut req);
//! assert!(response.status().is_success());
//! ```
//!
//! # Crate Structure
//!
//! - [`switchback_http`] — Request, Response, Method, and the Handler
//!   trait
//! - [`switchback_router`] — the routing trie and the three dispatchers

#![forbid(unsafe_code)]

// Re-export crates
pub use switchback_http as http;
pub use switchback_router as router;

// Re-export commonly used types
pub use switchback_http::{
    ArcHandler, Body, Handler, Headers, InvalidMethod, Method, Request, Response, ResponseBody,
    StatusCode,
};
pub use switchback_router::{
    MAX_PARAMS, MethodMux, MethodMuxError, Param, Params, PathMux, RouteError, RouteLookup,
    RouteMatch, TableMux, path_params,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Handler, Method, MethodMux, Params, PathMux, Request, Response, RouteError, StatusCode,
        TableMux, path_params,
    };
    pub use serde::{Deserialize, Serialize};
}
