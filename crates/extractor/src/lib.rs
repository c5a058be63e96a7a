//! Structured response extraction.
//!
//! Recovers a [`CandidateSignal`] from raw model output that may contain
//! markdown fences, surrounding prose, or only a partial JSON object. The
//! recovery is deliberately bounded: direct parse, fence strip, then
//! first-`{`/last-`}` substring. No general JSON repair.

mod extract;

pub use extract::extract_candidate;
