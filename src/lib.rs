//! Build, parse and validate PPMP (Production Performance Management
//! Protocol) v2 payloads.
//!
//! ```
//! let device = ppmp::Device::new("a4927dad-58d4-4580-b460-79cefd56775b").unwrap();
//! let payload = device.measurement(None, &[("temperature", 36.7)]).unwrap();
//!
//! let text = ppmp::dumps(&payload, false).unwrap();
//! let parsed = ppmp::loads(&text, true).unwrap();
//! assert_eq!(parsed, payload);
//! ```

pub mod constants;
pub mod offsets;
pub mod payload;

pub use payload::{
    common::Device, loads, loads_with, measurement, message, process, series, REGISTRY,
};
pub use schema::{dumps, problems, validate_or_raise, Entity, EntityError, Problem, Value};
