//! DOM-free logic behind the Brightlane page behaviors.
//!
//! The web shell stays a thin wiring layer over this crate so the form
//! validation, slider arithmetic, counter ramp, and endpoint selection can be
//! unit-tested natively.

pub mod counter;
pub mod endpoint;
pub mod form;
pub mod slider;
pub mod viewport;
