//! Tower middleware layers installed ahead of the application router.
//!
//! [`host_validation`] holds the `Host` header gate; see
//! [`server::build_router`](crate::server::build_router) for where it sits in
//! the layer stack.

pub mod host_validation;
