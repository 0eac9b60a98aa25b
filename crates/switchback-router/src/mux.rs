//! Path-based dispatch over the routing trie.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use switchback_http::{Handler, Method, Request, Response, StatusCode};

use crate::error::RouteError;
use crate::params::attach_params;
use crate::r#match::RouteLookup;
use crate::trie::Node;

type RecoverHook = Box<dyn Fn(&mut Request, Box<dyn Any + Send>) -> Response + Send + Sync>;

/// A path multiplexer: routes requests to handlers by path pattern.
///
/// Patterns are registered with [`handle`](Self::handle) and looked up
/// per request with [`dispatch`](Self::dispatch). Registration happens
/// during startup on one thread; a built mux is immutable and shared
/// freely afterwards.
///
/// ```
/// use switchback_http::{Method, Request, Response};
/// use switchback_router::{path_params, PathMux};
///
/// let mut mux = PathMux::new();
/// mux.handle("/items/:id", |req: &mut Request| {
///     let id = path_params(req).get("id").unwrap_or("?").to_string();
///     Response::ok().body_text(id)
/// })
/// .unwrap();
///
/// let mut req = Request::new(Method::Get, "/items/7");
/// let response = mux.dispatch(&mut req);
/// assert!(response.status().is_success());
/// ```
pub struct PathMux {
    root: Node,
    not_found: Option<Arc<dyn Handler>>,
    recover: Option<RecoverHook>,
    redirect_trailing_slash: bool,
}

impl Default for PathMux {
    fn default() -> Self {
        Self::new()
    }
}

impl PathMux {
    /// An empty mux. Every dispatch is a 404 until routes are added.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            not_found: None,
            recover: None,
            redirect_trailing_slash: false,
        }
    }

    /// Register `handler` for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the pattern is malformed, already
    /// registered, or conflicts with an existing route. Previously
    /// registered routes keep serving on error.
    pub fn handle(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), RouteError> {
        self.root.insert(pattern, Arc::new(handler))
    }

    /// Replace the fallback invoked when no route matches.
    #[must_use]
    pub fn with_not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Install a recovery hook. With a hook set, a panicking handler is
    /// caught at the dispatch boundary and the hook produces the
    /// response; without one, panics propagate to the caller.
    #[must_use]
    pub fn with_recover<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Request, Box<dyn Any + Send>) -> Response + Send + Sync + 'static,
    {
        self.recover = Some(Box::new(hook));
        self
    }

    /// Enable or disable trailing-slash redirects. Off by default.
    #[must_use]
    pub fn with_redirect_trailing_slash(mut self, enabled: bool) -> Self {
        self.redirect_trailing_slash = enabled;
        self
    }

    /// Look up `path` without dispatching.
    ///
    /// Useful for building wrappers that need the handler and bindings
    /// but want to drive invocation themselves.
    pub fn lookup(&self, path: &str) -> RouteLookup<'_> {
        self.root.lookup(path)
    }

    /// Route `req` to its handler and return the response.
    ///
    /// When the recovery hook is set, a panic inside the matched handler
    /// (or the not-found fallback) is caught and handed to the hook
    /// together with its payload.
    pub fn dispatch(&self, req: &mut Request) -> Response {
        if let Some(hook) = &self.recover {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.route(req)));
            match outcome {
                Ok(response) => response,
                Err(payload) => hook(req, payload),
            }
        } else {
            self.route(req)
        }
    }

    fn route(&self, req: &mut Request) -> Response {
        // The lookup borrows the tree, not the request, so the path is
        // detached up front.
        let path = req.path().to_string();
        match self.root.lookup(&path) {
            RouteLookup::Match(found) => {
                let handler = Arc::clone(found.handler);
                attach_params(req, found.params);
                handler.call(req)
            }
            RouteLookup::NotFound {
                trailing_slash_redirect,
            } => {
                if trailing_slash_redirect
                    && self.redirect_trailing_slash
                    && path != "/"
                    && req.method() != Method::Connect
                {
                    return redirect_response(req, &path);
                }
                match &self.not_found {
                    Some(handler) => {
                        let handler = Arc::clone(handler);
                        handler.call(req)
                    }
                    None => Response::not_found(),
                }
            }
        }
    }
}

impl Handler for PathMux {
    fn call(&self, req: &mut Request) -> Response {
        self.dispatch(req)
    }
}

/// Build the redirect for a trailing-slash mismatch: permanent for safe
/// GETs, 307 otherwise so the method and body survive the hop.
fn redirect_response(req: &Request, path: &str) -> Response {
    let mut location = match path.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => format!("{path}/"),
    };
    if let Some(query) = req.query() {
        location.push('?');
        location.push_str(query);
    }
    let status = if req.method() == Method::Get {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::TEMPORARY_REDIRECT
    };
    Response::redirect(status, location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::path_params;

    fn echo(tag: &'static str) -> impl Handler + 'static {
        move |_req: &mut Request| Response::ok().body_text(tag)
    }

    fn body_of(response: Response) -> String {
        let (_, _, body) = response.into_parts();
        String::from_utf8(body.into_bytes()).unwrap()
    }

    #[test]
    fn dispatches_to_the_matching_route() {
        let mut mux = PathMux::new();
        mux.handle("/a", echo("a")).unwrap();
        mux.handle("/b/:id", echo("b")).unwrap();

        let mut req = Request::new(Method::Get, "/a");
        assert_eq!(body_of(mux.dispatch(&mut req)), "a");

        let mut req = Request::new(Method::Get, "/b/42");
        assert_eq!(body_of(mux.dispatch(&mut req)), "b");
        assert_eq!(path_params(&req).get("id"), Some("42"));
    }

    #[test]
    fn default_not_found_is_a_plain_404() {
        let mux = PathMux::new();
        let mut req = Request::new(Method::Get, "/missing");
        assert_eq!(mux.dispatch(&mut req).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn custom_not_found_handler_runs() {
        let mut mux = PathMux::new();
        mux.handle("/here", echo("here")).unwrap();
        let mux = mux.with_not_found(|_req: &mut Request| {
            Response::new(StatusCode::NOT_FOUND).body_text("custom")
        });

        let mut req = Request::new(Method::Get, "/gone");
        assert_eq!(body_of(mux.dispatch(&mut req)), "custom");
    }

    #[test]
    fn trailing_slash_redirects_when_enabled() {
        let mut mux = PathMux::new();
        mux.handle("/items/", echo("items")).unwrap();
        mux.handle("/solo", echo("solo")).unwrap();
        let mux = mux.with_redirect_trailing_slash(true);

        let mut req = Request::new(Method::Get, "/items");
        let response = mux.dispatch(&mut req);
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.header_value("location"), Some(&b"/items/"[..]));

        let mut req = Request::new(Method::Get, "/solo/");
        let response = mux.dispatch(&mut req);
        assert_eq!(response.header_value("location"), Some(&b"/solo"[..]));
    }

    #[test]
    fn non_get_redirects_preserve_the_method() {
        let mut mux = PathMux::new();
        mux.handle("/submit/", echo("submit")).unwrap();
        let mux = mux.with_redirect_trailing_slash(true);

        let mut req = Request::new(Method::Post, "/submit");
        let response = mux.dispatch(&mut req);
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[test]
    fn redirects_keep_the_query_string() {
        let mut mux = PathMux::new();
        mux.handle("/items/", echo("items")).unwrap();
        let mux = mux.with_redirect_trailing_slash(true);

        let mut req = Request::new(Method::Get, "/items");
        req.set_query(Some("page=2".to_string()));
        let response = mux.dispatch(&mut req);
        assert_eq!(
            response.header_value("location"),
            Some(&b"/items/?page=2"[..])
        );
    }

    #[test]
    fn redirects_are_off_by_default() {
        let mut mux = PathMux::new();
        mux.handle("/items/", echo("items")).unwrap();

        let mut req = Request::new(Method::Get, "/items");
        assert_eq!(mux.dispatch(&mut req).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn the_bare_root_never_redirects() {
        let mut mux = PathMux::new();
        mux.handle("/:top/", echo("top")).unwrap();
        let mux = mux.with_redirect_trailing_slash(true);

        // "/" could only "match" by binding an empty segment; it must
        // 404 rather than bounce to itself.
        let mut req = Request::new(Method::Get, "/");
        assert_eq!(mux.dispatch(&mut req).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn connect_requests_never_redirect() {
        let mut mux = PathMux::new();
        mux.handle("/proxy/", echo("proxy")).unwrap();
        let mux = mux.with_redirect_trailing_slash(true);

        let mut req = Request::new(Method::Connect, "/proxy");
        assert_eq!(mux.dispatch(&mut req).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn recovery_hook_turns_panics_into_responses() {
        let mut mux = PathMux::new();
        mux.handle("/boom", |_req: &mut Request| -> Response {
            panic!("kaboom");
        })
        .unwrap();
        let mux = mux.with_recover(|_req, payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .copied()
                .unwrap_or("unknown panic");
            Response::new(StatusCode::INTERNAL_SERVER_ERROR).body_text(detail)
        });

        let mut req = Request::new(Method::Get, "/boom");
        let response = mux.dispatch(&mut req);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response), "kaboom");
    }

    #[test]
    fn panics_propagate_without_a_hook() {
        let mut mux = PathMux::new();
        mux.handle("/boom", |_req: &mut Request| -> Response {
            panic!("kaboom");
        })
        .unwrap();

        let mux = std::sync::Arc::new(mux);
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let mut req = Request::new(Method::Get, "/boom");
            mux.dispatch(&mut req);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn registration_errors_leave_existing_routes_serving() {
        let mut mux = PathMux::new();
        mux.handle("/foo", echo("foo")).unwrap();
        assert!(mux.handle("/foo", echo("dup")).is_err());

        let mut req = Request::new(Method::Get, "/foo");
        assert_eq!(body_of(mux.dispatch(&mut req)), "foo");
    }
}
