//! `fieldtrack` - Real-time tracking of field service route execution
//!
//! This library provides the core functionality for sampling device
//! positions during route execution, ingesting and storing location
//! batches append-only, and deriving traveled paths and progress
//! summaries for operations dashboards.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod ingress;
pub mod logging;
pub mod point;
pub mod progress;
pub mod reconstruct;
pub mod route;
pub mod sampler;
pub mod status;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use geo::{Bounds, Coordinate};
pub use ingress::LocationIngress;
pub use logging::init_logging;
pub use point::LocationPoint;
pub use progress::RouteProgress;
pub use reconstruct::{Reconstruction, TrackedPath};
pub use route::{Route, Stop};
pub use sampler::{LocationSink, PositionSampler, PositionSource};
pub use status::DerivedStopStatus;
pub use storage::{StoreStats, TrackingStore};
