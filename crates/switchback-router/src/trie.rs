//! The routing trie: a compressed prefix tree over route patterns.
//!
//! Each node holds the literal substring it matches relative to its
//! parent, so chains of single-child nodes collapse into one edge.
//! Static children are kept in descending-priority order with a parallel
//! first-byte index, so branch selection is a byte lookup rather than a
//! scan. A parameter or catch-all child lives in its own slot and is
//! mutually exclusive with static children at the same position.
//!
//! The tree is built single-threaded during registration and never
//! mutated afterwards; `lookup` takes `&self` and is safe to call from
//! any number of threads at once.

use std::sync::Arc;

use memchr::memchr;
use switchback_http::Handler;

use crate::error::RouteError;
use crate::params::{MAX_PARAMS, Params};
use crate::r#match::{RouteLookup, RouteMatch};

pub(crate) type StoredHandler = Arc<dyn Handler>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Root,
    Static,
    Param,
    CatchAll,
}

pub(crate) struct Node {
    /// Literal substring matched at this node, relative to its parent.
    /// `":name"` for parameter nodes, `"*name"` for catch-alls, empty
    /// for the root.
    segment: String,
    kind: Kind,
    /// First byte of each static child, parallel to `children`.
    indices: Vec<u8>,
    /// Static children, descending priority.
    children: Vec<Node>,
    /// At most one parameter or catch-all child.
    wildcard: Option<Box<Node>>,
    handler: Option<StoredHandler>,
    /// Number of registered routes passing through this node.
    priority: u32,
    /// Maximum parameters any route in this subtree binds.
    param_capacity: u8,
}

impl Node {
    pub(crate) fn root() -> Self {
        let mut node = Self::new(String::new(), Kind::Root);
        node.priority = 0;
        node
    }

    fn new(segment: String, kind: Kind) -> Self {
        Self {
            segment,
            kind,
            indices: Vec::new(),
            children: Vec::new(),
            wildcard: None,
            handler: None,
            priority: 1,
            param_capacity: 0,
        }
    }

    /// Register `handler` under `pattern`. Called on the root only.
    pub(crate) fn insert(
        &mut self,
        pattern: &str,
        handler: StoredHandler,
    ) -> Result<(), RouteError> {
        debug_assert_eq!(self.kind, Kind::Root);
        let param_count = validate_pattern(pattern)?;
        self.priority += 1;
        self.insert_at(pattern, pattern, handler, param_count)
    }

    fn insert_at(
        &mut self,
        path: &str,
        pattern: &str,
        handler: StoredHandler,
        param_count: u8,
    ) -> Result<(), RouteError> {
        let common = longest_common_prefix(path, &self.segment);
        if common < self.segment.len() {
            self.split(common);
        }
        self.param_capacity = self.param_capacity.max(param_count);

        let path = &path[common..];
        if path.is_empty() {
            if self.handler.is_some() {
                return Err(RouteError::DuplicateRoute {
                    pattern: pattern.to_string(),
                });
            }
            self.handler = Some(handler);
            return Ok(());
        }

        if let Some(wild) = self.wildcard.as_deref_mut() {
            // Continuations at this position must run through the
            // existing wildcard with the same name.
            let seg_len = wild.segment.len();
            let through_param = wild.kind == Kind::Param
                && path.starts_with(wild.segment.as_str())
                && (path.len() == seg_len || path.as_bytes()[seg_len] == b'/');
            if through_param {
                wild.priority += 1;
                return wild.insert_at(path, pattern, handler, param_count);
            }
            if wild.kind == Kind::CatchAll && path == wild.segment {
                return Err(RouteError::DuplicateRoute {
                    pattern: pattern.to_string(),
                });
            }
            return Err(RouteError::WildcardConflict {
                pattern: pattern.to_string(),
                existing: wild.segment.clone(),
            });
        }

        let first = path.as_bytes()[0];
        if first == b':' || first == b'*' {
            if let Some(child) = self.children.first() {
                return Err(RouteError::WildcardConflict {
                    pattern: pattern.to_string(),
                    existing: child.segment.clone(),
                });
            }
            if first == b'*' && self.handler.is_some() {
                return Err(RouteError::CatchAllConflict {
                    pattern: pattern.to_string(),
                });
            }
            return self.grow(path, handler, param_count);
        }

        if let Some(pos) = self.indices.iter().position(|&b| b == first) {
            let pos = self.bump_child(pos);
            return self.children[pos].insert_at(path, pattern, handler, param_count);
        }
        self.grow(path, handler, param_count)
    }

    /// Build a fresh chain of nodes for `path` under `self`. The path
    /// may still contain wildcard segments.
    fn grow(
        &mut self,
        path: &str,
        handler: StoredHandler,
        param_count: u8,
    ) -> Result<(), RouteError> {
        let Some(wild_start) = find_wildcard(path) else {
            let mut child = Node::new(path.to_string(), Kind::Static);
            child.param_capacity = param_count;
            child.handler = Some(handler);
            self.attach_static(child);
            return Ok(());
        };

        if wild_start > 0 {
            let mut child = Node::new(path[..wild_start].to_string(), Kind::Static);
            child.param_capacity = param_count;
            self.attach_static(child);
            let pos = self.children.len() - 1;
            return self.children[pos].grow(&path[wild_start..], handler, param_count);
        }

        if path.as_bytes()[0] == b':' {
            let end = memchr(b'/', path.as_bytes()).unwrap_or(path.len());
            let mut param = Node::new(path[..end].to_string(), Kind::Param);
            param.param_capacity = param_count;
            if end == path.len() {
                param.handler = Some(handler);
            } else {
                param.grow(&path[end..], handler, param_count)?;
            }
            self.wildcard = Some(Box::new(param));
            return Ok(());
        }

        // Catch-all: validation guarantees it is the final segment.
        let mut catch = Node::new(path.to_string(), Kind::CatchAll);
        catch.param_capacity = param_count;
        catch.handler = Some(handler);
        self.wildcard = Some(Box::new(catch));
        Ok(())
    }

    /// Split this node at `at`: the suffix of the segment, together with
    /// the handler and all descendants, moves into a new child, and this
    /// node keeps only the common prefix.
    fn split(&mut self, at: usize) {
        let child = Node {
            segment: self.segment.split_off(at),
            kind: Kind::Static,
            indices: std::mem::take(&mut self.indices),
            children: std::mem::take(&mut self.children),
            wildcard: self.wildcard.take(),
            handler: self.handler.take(),
            priority: self.priority - 1,
            param_capacity: self.param_capacity,
        };
        self.indices = vec![child.segment.as_bytes()[0]];
        self.children = vec![child];
    }

    fn attach_static(&mut self, child: Node) {
        self.indices.push(child.segment.as_bytes()[0]);
        self.children.push(child);
    }

    /// Bump the priority of the child at `pos` and bubble it forward
    /// past lower-priority siblings, keeping ties in stable order.
    /// Returns the child's new position.
    fn bump_child(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;
        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            self.indices.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }
        new_pos
    }

    /// Walk `path` against the tree, binding parameters along the way.
    ///
    /// Pure and reentrant: never mutates the tree.
    pub(crate) fn lookup<'n>(&'n self, path: &str) -> RouteLookup<'n> {
        let mut params = Params::with_capacity(usize::from(self.param_capacity));
        let mut node = self;
        let mut path = path;

        loop {
            let segment = node.segment.as_str();
            if path.len() > segment.len() {
                if !path.starts_with(segment) {
                    return RouteLookup::NotFound {
                        trailing_slash_redirect: false,
                    };
                }
                path = &path[segment.len()..];

                // Prefer a static child selected by first byte; the
                // wildcard slot only applies where no static child does.
                let first = path.as_bytes()[0];
                if let Some(pos) = node.indices.iter().position(|&b| b == first) {
                    node = &node.children[pos];
                    continue;
                }

                match node.wildcard.as_deref() {
                    Some(wild) if wild.kind == Kind::Param => {
                        if params.len() >= MAX_PARAMS {
                            // Degenerate path; refuse rather than grow
                            // past the preallocated capacity.
                            return RouteLookup::NotFound {
                                trailing_slash_redirect: false,
                            };
                        }
                        let end = memchr(b'/', path.as_bytes()).unwrap_or(path.len());
                        params.push(&wild.segment[1..], &path[..end]);

                        if end == path.len() {
                            if let Some(handler) = &wild.handler {
                                return RouteLookup::Match(RouteMatch { handler, params });
                            }
                            return RouteLookup::NotFound {
                                trailing_slash_redirect: wild.slash_child_tsr(),
                            };
                        }
                        if wild.children.is_empty() {
                            // Dead end; recommend dropping a lone
                            // trailing slash if that reaches the param
                            // handler.
                            let tsr = path.len() == end + 1 && wild.handler.is_some();
                            return RouteLookup::NotFound {
                                trailing_slash_redirect: tsr,
                            };
                        }
                        // All continuations past a parameter start with
                        // '/', so the radix property leaves exactly one
                        // static child here.
                        path = &path[end..];
                        node = &wild.children[0];
                    }
                    Some(wild) => {
                        // Catch-all: bind the entire remainder and stop.
                        if params.len() >= MAX_PARAMS {
                            return RouteLookup::NotFound {
                                trailing_slash_redirect: false,
                            };
                        }
                        params.push(&wild.segment[1..], path);
                        if let Some(handler) = &wild.handler {
                            return RouteLookup::Match(RouteMatch { handler, params });
                        }
                        return RouteLookup::NotFound {
                            trailing_slash_redirect: false,
                        };
                    }
                    None => {
                        let tsr = path == "/" && node.handler.is_some();
                        return RouteLookup::NotFound {
                            trailing_slash_redirect: tsr,
                        };
                    }
                }
            } else if path == segment {
                if let Some(handler) = &node.handler {
                    return RouteLookup::Match(RouteMatch { handler, params });
                }
                // A catch-all child matches the empty remainder, so
                // `/foo/` hits `/foo/*rest` with an empty binding.
                if let Some(wild) = node.wildcard.as_deref() {
                    if wild.kind == Kind::CatchAll {
                        if let Some(handler) = &wild.handler {
                            params.push(&wild.segment[1..], "");
                            return RouteLookup::Match(RouteMatch { handler, params });
                        }
                    } else if path == "/" && node.kind != Kind::Root {
                        return RouteLookup::NotFound {
                            trailing_slash_redirect: true,
                        };
                    }
                }
                return RouteLookup::NotFound {
                    trailing_slash_redirect: node.slash_child_tsr(),
                };
            } else {
                // The path diverges inside this node's segment. The only
                // redirect-worthy shape is the segment being exactly the
                // path plus a trailing slash, with something to serve
                // there.
                let tsr = path == "/"
                    || (segment.len() == path.len() + 1
                        && segment.as_bytes()[path.len()] == b'/'
                        && segment.starts_with(path)
                        && (node.handler.is_some() || node.empty_catch_all().is_some()));
                return RouteLookup::NotFound {
                    trailing_slash_redirect: tsr,
                };
            }
        }
    }

    /// A handler reachable by appending a single `/` to a path that
    /// ends exactly at this node.
    fn slash_child_tsr(&self) -> bool {
        self.indices
            .iter()
            .position(|&b| b == b'/')
            .map(|pos| &self.children[pos])
            .is_some_and(|child| {
                (child.segment.len() == 1 && child.handler.is_some())
                    || (child.segment == "/" && child.empty_catch_all().is_some())
            })
    }

    /// The catch-all child's handler, if one exists to serve an empty
    /// remainder.
    fn empty_catch_all(&self) -> Option<&StoredHandler> {
        match self.wildcard.as_deref() {
            Some(wild) if wild.kind == Kind::CatchAll => wild.handler.as_ref(),
            _ => None,
        }
    }
}

/// Length of the common byte prefix of `a` and `b`, rounded down to a
/// character boundary of both.
fn longest_common_prefix(a: &str, b: &str) -> usize {
    let mut len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while !a.is_char_boundary(len) {
        len -= 1;
    }
    len
}

fn find_wildcard(path: &str) -> Option<usize> {
    path.bytes().position(|b| b == b':' || b == b'*')
}

/// Check pattern syntax and return the number of parameters it binds.
fn validate_pattern(pattern: &str) -> Result<u8, RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let mut count = 0usize;
    let mut segments = pattern[1..].split('/').peekable();
    while let Some(segment) = segments.next() {
        let bytes = segment.as_bytes();
        match bytes.first() {
            Some(b':' | b'*') => {
                let name = &segment[1..];
                if name.is_empty() || name.bytes().any(|b| b == b':' || b == b'*') {
                    return Err(RouteError::InvalidWildcard {
                        pattern: pattern.to_string(),
                        segment: segment.to_string(),
                    });
                }
                if bytes[0] == b'*' && segments.peek().is_some() {
                    return Err(RouteError::CatchAllNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                count += 1;
            }
            _ => {
                // A marker anywhere but segment start is malformed.
                if bytes.iter().any(|&b| b == b':' || b == b'*') {
                    return Err(RouteError::InvalidWildcard {
                        pattern: pattern.to_string(),
                        segment: segment.to_string(),
                    });
                }
            }
        }
    }

    if count > MAX_PARAMS {
        return Err(RouteError::TooManyParams {
            pattern: pattern.to_string(),
            count,
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    let count = count as u8;
    Ok(count)
}
