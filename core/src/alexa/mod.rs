//! Alexa Directive Handler (component E).
//!
//! Accepts Smart Home v3 JSON directives at a single `POST /alexa` endpoint
//! and funnels every mapped directive through the same `dispatch` core the
//! Hue facade uses.
pub mod mapping;
pub mod routes;
pub mod types;
