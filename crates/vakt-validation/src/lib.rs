//! # vakt-validation
//!
//! Declarative request validation: named schemas composed of per-field
//! rules, primitive coercions and cross-field refinements, aggregating
//! every violation into one ordered error set. Framework-agnostic; the
//! pipeline binds schemas to request sources in vakt-http.

pub mod error;
pub mod schema;
pub mod traits;
pub mod validators;

pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use schema::{Coerce, Field, Schema, SchemaRegistry, UnknownFields};
pub use traits::ValidationRule;

pub use validators::{
    custom::CustomValidator,
    date::{DateRangeValidator, DateValidator},
    email::EmailValidator,
    length::LengthValidator,
    numeric::NumericValidator,
    pattern::PatternValidator,
    required::RequiredValidator,
};
