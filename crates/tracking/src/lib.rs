//! Order tracking domain module.
//!
//! Projects the fulfillment system's tracking-event sequence into the
//! current status and a completion fraction for progress display. Read-only
//! over its input and total over any input, including statuses this build
//! has never heard of.

pub mod timeline;

pub use timeline::{project, TrackingEvent, TrackingProjection, TrackingStatus};
