//! Error rendering and message normalization

pub mod normalize;
pub mod responses;

pub use normalize::{restore_body, sanitize_error};
pub use responses::{ErrorBody, FieldError};
