//! Route lookup results.

use switchback_http::ArcHandler;

use crate::params::Params;

/// A matched route: its handler and the parameters bound along the way.
pub struct RouteMatch<'a> {
    /// The matched handler.
    pub handler: &'a ArcHandler,
    /// Parameter bindings in pattern order.
    pub params: Params,
}

/// Result of looking up a path against the routing tree.
pub enum RouteLookup<'a> {
    /// A route matched the path exactly.
    Match(RouteMatch<'a>),
    /// No route matched.
    NotFound {
        /// Whether an exact match exists if a single trailing slash is
        /// added to or removed from the requested path.
        trailing_slash_redirect: bool,
    },
}

impl RouteLookup<'_> {
    /// Whether a route matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    /// Whether a trailing-slash redirect is recommended.
    #[must_use]
    pub fn trailing_slash_redirect(&self) -> bool {
        matches!(
            self,
            Self::NotFound {
                trailing_slash_redirect: true
            }
        )
    }
}
