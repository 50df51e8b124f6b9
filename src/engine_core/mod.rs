//! Core types and orchestration.
//!
//! Events, wire models, errors and constants live here, together with the
//! dispatcher that ties the engines together and the `Sink` seam.

pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod models;
pub mod traits;
