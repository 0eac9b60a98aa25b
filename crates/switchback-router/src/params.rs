//! Parameter bindings and their request-scoped attachment.

use switchback_http::Request;

/// Maximum number of parameters a single route pattern may bind.
///
/// Fixed at build time; registration rejects patterns that would exceed
/// it, and lookup preallocates its binding sequence from the tree's
/// recorded capacity so no growth happens on the hot path.
pub const MAX_PARAMS: usize = 32;

/// A single URL parameter, consisting of a key and a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// The parameter name, without its `:`/`*` marker.
    pub key: String,
    /// The path segment (or remainder, for a catch-all) bound to it.
    pub value: String,
}

/// An ordered sequence of URL parameters, as produced by a lookup.
///
/// Order is the left-to-right occurrence of parameters in the matched
/// pattern, so values may also be read by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: Vec<Param>,
}

impl Params {
    /// Create an empty binding sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, key: &str, value: &str) {
        self.inner.push(Param {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// The value of the first parameter whose key matches `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|param| param.key == name)
            .map(|param| param.value.as_str())
    }

    /// Iterate over the bindings in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.inner.iter()
    }

    /// The number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no parameters were bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::ops::Index<usize> for Params {
    type Output = Param;

    fn index(&self, index: usize) -> &Param {
        &self.inner[index]
    }
}

// The extension key is this private type, so no unrelated code sharing
// the request's extension map can clobber or read the bindings.
struct ParamsExtension(Params);

static EMPTY_PARAMS: Params = Params { inner: Vec::new() };

pub(crate) fn attach_params(req: &mut Request, params: Params) {
    req.insert_extension(ParamsExtension(params));
}

/// The parameter bindings attached to `req` by the dispatching
/// [`PathMux`](crate::PathMux).
///
/// Returns an empty sequence when the request was not dispatched through
/// a parameterized route; never an error.
#[must_use]
pub fn path_params(req: &Request) -> &Params {
    req.get_extension::<ParamsExtension>()
        .map_or(&EMPTY_PARAMS, |ext| &ext.0)
}
