//! Cache middleware stages

pub mod response_cache;
