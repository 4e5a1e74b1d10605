//! Hardened route matching
//!
//! The strict pattern grammar lives in [`pattern`]; [`codec`] defines the
//! reversible delimiter rewriting; [`safe`] combines the two so untrusted
//! pattern text can never crash compilation; [`router`] is the dispatch
//! table built on top.

pub mod codec;
pub mod pattern;
pub mod router;
pub mod safe;

pub use pattern::{PathSegment, RoutePattern, RoutePatternError};
pub use router::{RouteMatch, Router};
pub use safe::{might_cause_issue, SafePattern};
