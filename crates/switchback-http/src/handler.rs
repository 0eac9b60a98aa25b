//! The handler capability.

use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// A request handler: anything invocable with a request/response pair.
///
/// Dispatchers are polymorphic over this trait and never inspect handler
/// internals. Handlers must be `Send + Sync` because a built dispatcher
/// is shared across however many threads the host serves requests on.
pub trait Handler: Send + Sync {
    /// Handle one request, producing a response.
    fn call(&self, req: &mut Request) -> Response;
}

/// A shared, type-erased handler.
pub type ArcHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(&mut Request) -> Response + Send + Sync,
{
    fn call(&self, req: &mut Request) -> Response {
        self(req)
    }
}
