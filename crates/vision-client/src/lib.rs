//! Vision model access.
//!
//! Posts a chart screenshot to the hosted vision API and returns the raw
//! text the model produced. Parsing that text into a candidate signal is the
//! extractor's job; this crate deliberately treats the model as a black box.

mod client;
mod types;

pub use client::VisionClient;
pub use types::{ChartReadout, ChartRequest, VisionError};
