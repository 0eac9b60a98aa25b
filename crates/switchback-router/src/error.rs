//! Registration-time errors.
//!
//! These are programmer/configuration errors: they surface while routes
//! are being registered, before traffic is served. Request-time outcomes
//! (no match, trailing-slash mismatch) are ordinary control-flow results
//! and never appear here.

use switchback_http::Method;

/// Error returned when a route pattern cannot be registered.
///
/// Every variant names the offending pattern so that a startup failure
/// points straight at the bad registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern is empty or does not begin with `/`.
    MissingLeadingSlash {
        /// The rejected pattern.
        pattern: String,
    },
    /// The exact pattern is already registered.
    DuplicateRoute {
        /// The rejected pattern.
        pattern: String,
    },
    /// A wildcard segment has an empty name, contains a second `:`/`*`
    /// marker, or a marker appears mid-segment.
    InvalidWildcard {
        /// The rejected pattern.
        pattern: String,
        /// The offending segment.
        segment: String,
    },
    /// A catch-all segment is not the final segment of the pattern.
    CatchAllNotLast {
        /// The rejected pattern.
        pattern: String,
    },
    /// A catch-all claims a position whose segment root already has a
    /// handler.
    CatchAllConflict {
        /// The rejected pattern.
        pattern: String,
    },
    /// The pattern contends with an existing route at the same tree
    /// position (wildcard vs. differently-named wildcard, wildcard vs.
    /// static sibling, or static vs. existing wildcard).
    WildcardConflict {
        /// The rejected pattern.
        pattern: String,
        /// The segment of the already-registered route it collides with.
        existing: String,
    },
    /// The pattern binds more parameters than [`MAX_PARAMS`].
    ///
    /// [`MAX_PARAMS`]: crate::MAX_PARAMS
    TooManyParams {
        /// The rejected pattern.
        pattern: String,
        /// The number of parameters the pattern would bind.
        count: usize,
    },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLeadingSlash { pattern } => {
                write!(f, "pattern {pattern:?} must begin with '/'")
            }
            Self::DuplicateRoute { pattern } => {
                write!(f, "a handler is already registered for pattern {pattern:?}")
            }
            Self::InvalidWildcard { pattern, segment } => {
                write!(
                    f,
                    "invalid wildcard segment {segment:?} in pattern {pattern:?}"
                )
            }
            Self::CatchAllNotLast { pattern } => {
                write!(
                    f,
                    "catch-all must be the final segment of pattern {pattern:?}"
                )
            }
            Self::CatchAllConflict { pattern } => {
                write!(
                    f,
                    "catch-all in pattern {pattern:?} conflicts with an existing handler for the segment root"
                )
            }
            Self::WildcardConflict { pattern, existing } => {
                write!(
                    f,
                    "pattern {pattern:?} conflicts with existing route segment {existing:?}"
                )
            }
            Self::TooManyParams { pattern, count } => {
                write!(
                    f,
                    "pattern {pattern:?} binds {count} parameters, more than the supported maximum"
                )
            }
        }
    }
}

impl std::error::Error for RouteError {}

impl RouteError {
    /// The pattern that was rejected.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::MissingLeadingSlash { pattern }
            | Self::DuplicateRoute { pattern }
            | Self::InvalidWildcard { pattern, .. }
            | Self::CatchAllNotLast { pattern }
            | Self::CatchAllConflict { pattern }
            | Self::WildcardConflict { pattern, .. }
            | Self::TooManyParams { pattern, .. } => pattern,
        }
    }
}

/// Error returned when a method-table registration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMuxError {
    /// The method slot is already occupied.
    DuplicateMethod {
        /// The method whose slot was already set.
        method: Method,
    },
}

impl std::fmt::Display for MethodMuxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateMethod { method } => {
                write!(f, "a handler is already registered for method {method}")
            }
        }
    }
}

impl std::error::Error for MethodMuxError {}
