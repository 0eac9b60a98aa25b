//! Flat dispatch table over methods and path prefixes.

use std::sync::Arc;

use switchback_http::{ArcHandler, Handler, Method, Request, Response};

use crate::error::{MethodMuxError, RouteError};

/// A flat dispatch table: whole-method handlers plus path-prefix
/// handlers, checked in registration order.
///
/// A method entry claims every request with that method. A prefix entry
/// claims requests whose path starts with the prefix; before delegating,
/// the matched prefix is stripped from the request path, and the
/// original path is restored once the nested handler returns.
///
/// Prefix entries are checked before method entries; within each group,
/// the first registration wins. Dispatch order never depends on
/// anything but the order handlers were added.
#[derive(Default)]
pub struct TableMux {
    methods: Vec<(Method, ArcHandler)>,
    prefixes: Vec<(String, ArcHandler)>,
    no_match: Option<ArcHandler>,
}

impl TableMux {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every request with `method`.
    ///
    /// # Errors
    ///
    /// Returns [`MethodMuxError::DuplicateMethod`] when the method
    /// already has an entry.
    pub fn handle_method(
        &mut self,
        method: Method,
        handler: impl Handler + 'static,
    ) -> Result<(), MethodMuxError> {
        if self.methods.iter().any(|(m, _)| *m == method) {
            return Err(MethodMuxError::DuplicateMethod { method });
        }
        self.methods.push((method, Arc::new(handler)));
        Ok(())
    }

    /// Claim every request whose path starts with `prefix`. The prefix
    /// is stripped before the nested handler runs.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingLeadingSlash`] when the prefix does
    /// not begin with `/`, or [`RouteError::DuplicateRoute`] when the
    /// exact prefix is already registered.
    pub fn handle_prefix(
        &mut self,
        prefix: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), RouteError> {
        if !prefix.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                pattern: prefix.to_string(),
            });
        }
        if self.prefixes.iter().any(|(p, _)| p == prefix) {
            return Err(RouteError::DuplicateRoute {
                pattern: prefix.to_string(),
            });
        }
        self.prefixes.push((prefix.to_string(), Arc::new(handler)));
        Ok(())
    }

    /// Replace the fallback invoked when no entry claims the request.
    ///
    /// Without one, the table answers 405 when it routes purely by
    /// method and the request's method has no entry; in every other
    /// unclaimed case it answers 404.
    #[must_use]
    pub fn with_no_match(mut self, handler: impl Handler + 'static) -> Self {
        self.no_match = Some(Arc::new(handler));
        self
    }
}

impl Handler for TableMux {
    fn call(&self, req: &mut Request) -> Response {
        let path = req.path().to_string();
        if let Some((prefix, handler)) = self
            .prefixes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
        {
            let handler = Arc::clone(handler);
            let remainder = &path[prefix.len()..];
            if remainder.is_empty() {
                req.set_path("/");
            } else {
                req.set_path(remainder);
            }
            let response = handler.call(req);
            req.set_path(path);
            return response;
        }

        if let Some((_, handler)) = self
            .methods
            .iter()
            .find(|(method, _)| *method == req.method())
        {
            let handler = Arc::clone(handler);
            return handler.call(req);
        }

        match &self.no_match {
            Some(handler) => {
                let handler = Arc::clone(handler);
                handler.call(req)
            }
            None if self.prefixes.is_empty() && !self.methods.is_empty() => {
                Response::method_not_allowed()
            }
            None => Response::not_found(),
        }
    }
}
