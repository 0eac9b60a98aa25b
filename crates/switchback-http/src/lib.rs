//! Core request/response types for switchback.
//!
//! This crate provides the vocabulary shared by every dispatcher in the
//! workspace:
//!
//! - [`Request`] and [`Response`] with their supporting types
//!   ([`Method`], [`StatusCode`], [`Headers`], [`Body`])
//! - The [`Handler`] capability trait that all dispatchers consume and
//!   implement
//!
//! It deliberately knows nothing about routing, sockets, or parsing.
//! A transport hands a [`Request`] to some [`Handler`] and writes the
//! returned [`Response`] back out; everything in between is composition.

#![forbid(unsafe_code)]

mod handler;
mod method;
mod request;
mod response;

pub use handler::{ArcHandler, Handler};
pub use method::{InvalidMethod, Method};
pub use request::{Body, Headers, Request};
pub use response::{Response, ResponseBody, StatusCode};
