//! Core abstractions for studysync.
//!
//! This module provides the clock boundary and shared time utilities used
//! across features.

mod clock;
mod duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_duration_mmss, parse_duration};
