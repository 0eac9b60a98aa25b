//! Per-method dispatch.

use std::sync::Arc;

use switchback_http::{ArcHandler, Handler, Method, Request, Response};

use crate::error::MethodMuxError;

/// A method multiplexer: one handler slot per HTTP method.
///
/// Usually nested under a [`PathMux`](crate::PathMux) route so that one
/// path serves different verbs:
///
/// ```
/// use switchback_http::{Method, Request, Response};
/// use switchback_router::{MethodMux, PathMux};
///
/// let mut per_method = MethodMux::new();
/// per_method
///     .handle(Method::Get, |_req: &mut Request| Response::ok())
///     .unwrap();
///
/// let mut mux = PathMux::new();
/// mux.handle("/items", per_method).unwrap();
/// ```
#[derive(Default)]
pub struct MethodMux {
    slots: [Option<ArcHandler>; 9],
    method_not_allowed: Option<ArcHandler>,
}

fn slot_index(method: Method) -> usize {
    match method {
        Method::Get => 0,
        Method::Head => 1,
        Method::Post => 2,
        Method::Put => 3,
        Method::Delete => 4,
        Method::Connect => 5,
        Method::Options => 6,
        Method::Trace => 7,
        Method::Patch => 8,
    }
}

impl MethodMux {
    /// A mux with every slot empty. Every request draws the
    /// method-not-allowed response until handlers are registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`MethodMuxError::DuplicateMethod`] when the slot is
    /// already occupied.
    pub fn handle(
        &mut self,
        method: Method,
        handler: impl Handler + 'static,
    ) -> Result<(), MethodMuxError> {
        let slot = &mut self.slots[slot_index(method)];
        if slot.is_some() {
            return Err(MethodMuxError::DuplicateMethod { method });
        }
        *slot = Some(Arc::new(handler));
        Ok(())
    }

    /// Replace the fallback invoked when the request's method has no
    /// handler. The default answers 405.
    #[must_use]
    pub fn with_method_not_allowed(mut self, handler: impl Handler + 'static) -> Self {
        self.method_not_allowed = Some(Arc::new(handler));
        self
    }

    /// The handler registered for `method`, if any.
    #[must_use]
    pub fn get(&self, method: Method) -> Option<&ArcHandler> {
        self.slots[slot_index(method)].as_ref()
    }
}

impl Handler for MethodMux {
    fn call(&self, req: &mut Request) -> Response {
        if let Some(handler) = self.get(req.method()) {
            let handler = Arc::clone(handler);
            return handler.call(req);
        }
        match &self.method_not_allowed {
            Some(handler) => {
                let handler = Arc::clone(handler);
                handler.call(req)
            }
            None => Response::method_not_allowed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchback_http::StatusCode;

    fn echo(tag: &'static str) -> impl Handler + 'static {
        move |_req: &mut Request| Response::ok().body_text(tag)
    }

    fn body_of(response: Response) -> String {
        let (_, _, body) = response.into_parts();
        String::from_utf8(body.into_bytes()).unwrap()
    }

    #[test]
    fn routes_by_method() {
        let mut mux = MethodMux::new();
        mux.handle(Method::Get, echo("get")).unwrap();
        mux.handle(Method::Post, echo("post")).unwrap();

        let mut req = Request::new(Method::Get, "/items");
        assert_eq!(body_of(mux.call(&mut req)), "get");

        let mut req = Request::new(Method::Post, "/items");
        assert_eq!(body_of(mux.call(&mut req)), "post");
    }

    #[test]
    fn unregistered_methods_answer_405() {
        let mut mux = MethodMux::new();
        mux.handle(Method::Get, echo("get")).unwrap();

        let mut req = Request::new(Method::Delete, "/items");
        assert_eq!(mux.call(&mut req).status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn custom_method_not_allowed_runs() {
        let mux = MethodMux::new().with_method_not_allowed(|_req: &mut Request| {
            Response::new(StatusCode::METHOD_NOT_ALLOWED).body_text("nope")
        });

        let mut req = Request::new(Method::Trace, "/items");
        assert_eq!(body_of(mux.call(&mut req)), "nope");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut mux = MethodMux::new();
        mux.handle(Method::Put, echo("a")).unwrap();
        assert_eq!(
            mux.handle(Method::Put, echo("b")).unwrap_err(),
            MethodMuxError::DuplicateMethod {
                method: Method::Put
            }
        );

        let mut req = Request::new(Method::Put, "/items");
        assert_eq!(body_of(mux.call(&mut req)), "a");
    }

    #[test]
    fn every_method_has_a_slot() {
        let mut mux = MethodMux::new();
        for method in Method::ALL {
            mux.handle(method, echo("x")).unwrap();
        }
        for method in Method::ALL {
            assert!(mux.get(method).is_some());
        }
    }
}
