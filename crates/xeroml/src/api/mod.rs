//! Client-level API endpoints.
//!
//! Each submodule adds methods to [`XeroMlClient`](crate::XeroMlClient) for
//! one area of the service.

mod parse;
mod sessions;
mod usage;
