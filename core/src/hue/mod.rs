//! Hue v1 REST Facade (component D).
//!
//! Implements the subset of the Hue v1 HTTP API that Echo exercises during
//! discovery and control.
pub mod mapping;
pub mod routes;
pub mod types;
