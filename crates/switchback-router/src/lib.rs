//! Radix-tree path router and dispatch muxes.
//!
//! The routing trie stores patterns as a compressed prefix tree, so
//! lookup cost scales with the path length rather than the number of
//! routes. Patterns mix static segments with `:name` parameters (one
//! segment) and a trailing `*name` catch-all (the rest of the path),
//! and every conflict between patterns is rejected at registration.
//!
//! Three dispatchers build on it:
//!
//! - [`PathMux`] — pattern-based dispatch with optional trailing-slash
//!   redirects and panic recovery
//! - [`MethodMux`] — one handler per HTTP method, for nesting under a
//!   path route
//! - [`TableMux`] — a flat method/prefix table checked in registration
//!   order

#![warn(unsafe_code)]

mod error;
mod r#match;
mod methodmux;
mod mux;
mod params;
mod table;
mod trie;

pub use error::{MethodMuxError, RouteError};
pub use methodmux::MethodMux;
pub use mux::PathMux;
pub use params::{MAX_PARAMS, Param, Params, path_params};
pub use r#match::{RouteLookup, RouteMatch};
pub use table::TableMux;
