//! Framework-owned request model

pub mod cookies;
pub mod request;
pub mod validation;

pub use request::Request;
pub use validation::{Source, ValidateMiddleware};
