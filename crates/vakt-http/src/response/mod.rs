//! Framework-owned response model

pub mod response;

pub use response::{Response, ResponseBody};
