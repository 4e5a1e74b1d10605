//! Declarative schemas and the startup registry
//!
//! A [`Schema`] describes the expected shape of one request source: a
//! list of fields in declaration order, each with required/default
//! handling, an optional primitive coercion and a rule set, plus
//! schema-level refinements that run only once every per-field check has
//! passed. `validate` never aborts early; it either returns the complete
//! normalized output or the complete error set.

use crate::error::{ValidationError, ValidationErrors, ValidationResult};
use crate::traits::ValidationRule;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Primitive coercion applied before a field's rules run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    /// `"42"` becomes `42`, `"3.5"` becomes `3.5`
    Number,
    /// `"true"`/`"false"` (and `"1"`/`"0"`) become booleans
    Boolean,
    /// Numbers and booleans become their string rendering
    String,
}

impl Coerce {
    /// Apply the coercion; values that do not convert pass through for
    /// the field's rules to reject with a proper message.
    fn apply(&self, value: Value) -> Value {
        match (self, value) {
            (Coerce::Number, Value::String(s)) => match s.parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => match s.parse::<f64>() {
                    Ok(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::String(s)),
                    Err(_) => Value::String(s),
                },
            },
            (Coerce::Boolean, Value::String(s)) => match s.as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => Value::String(s),
            },
            (Coerce::String, Value::Number(n)) => Value::String(n.to_string()),
            (Coerce::String, Value::Bool(b)) => Value::String(b.to_string()),
            (_, value) => value,
        }
    }
}

/// What happens to input keys no field declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFields {
    /// Silently dropped from the normalized output
    #[default]
    Strip,
    /// Copied through to the normalized output untouched
    Preserve,
}

/// One declared field of a schema
#[derive(Clone)]
pub struct Field {
    name: String,
    required: bool,
    default: Option<Value>,
    coerce: Option<Coerce>,
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default: None,
            coerce: None,
            rules: Vec::new(),
        }
    }

    /// Missing or empty input is a violation
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value substituted when the input omits the field or sends null
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Primitive coercion applied before rules run
    pub fn coerce(mut self, coerce: Coerce) -> Self {
        self.coerce = Some(coerce);
        self
    }

    /// Attach a validation rule; rules run in attachment order
    pub fn rule<R: ValidationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Schema-level refinement: a rule run against the whole normalized
/// object, reporting against one field path.
#[derive(Clone)]
struct Refinement {
    field: String,
    rule: Arc<dyn ValidationRule>,
}

/// Named, immutable description of one request source's expected shape
#[derive(Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
    unknown_fields: UnknownFields,
    refinements: Vec<Refinement>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            unknown_fields: UnknownFields::default(),
            refinements: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Policy for input keys no field declares
    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Cross-field constraint evaluated after every per-field check has
    /// passed, reported against `field` (the most specific path).
    pub fn refine<R: ValidationRule + 'static>(mut self, field: impl Into<String>, rule: R) -> Self {
        self.refinements.push(Refinement {
            field: field.into(),
            rule: Arc::new(rule),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate one request source.
    ///
    /// Success returns the normalized output: declared fields with
    /// defaults applied and coercions performed, unknown keys handled
    /// per policy. Failure returns every violation; the input is never
    /// partially consumed or mutated.
    pub async fn validate(&self, input: &Value) -> ValidationResult<Value> {
        let empty = Map::new();
        let object = match input {
            Value::Object(map) => map,
            // Absent sources validate like an empty object so required
            // fields still report.
            Value::Null => &empty,
            _ => {
                return Err(ValidationError::with_code(
                    self.name.clone(),
                    "expected an object",
                    "invalid_type",
                )
                .into());
            }
        };

        let mut errors = ValidationErrors::new();
        let mut output = Map::new();

        for field in &self.fields {
            let mut value = object.get(field.name()).cloned().unwrap_or(Value::Null);

            if value.is_null() {
                if let Some(default) = &field.default {
                    value = default.clone();
                }
            }

            if let Some(coerce) = field.coerce {
                value = coerce.apply(value);
            }

            if field.required {
                let missing = match &value {
                    Value::Null => true,
                    Value::String(s) => s.trim().is_empty(),
                    _ => false,
                };
                if missing {
                    errors.add(ValidationError::with_code(
                        field.name(),
                        format!("{} is required", field.name()),
                        "required",
                    ));
                    // Rules would pile redundant errors onto an absent
                    // value.
                    continue;
                }
            }

            for rule in &field.rules {
                if let Err(rule_errors) = rule.validate(&value, field.name()).await {
                    errors.merge(rule_errors);
                }
            }

            if !value.is_null() {
                output.insert(field.name().to_string(), value);
            }
        }

        if self.unknown_fields == UnknownFields::Preserve {
            for (key, value) in object {
                if !self.fields.iter().any(|f| f.name() == key) {
                    output.insert(key.clone(), value.clone());
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // Refinements see only fully valid data.
        let normalized = Value::Object(output);
        for refinement in &self.refinements {
            if let Err(refine_errors) = refinement.rule.validate(&normalized, &refinement.field).await {
                errors.merge(refine_errors);
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("unknown_fields", &self.unknown_fields)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

/// Read-only registry of named schemas.
///
/// Built once at startup, then shared immutably across every request;
/// nothing mutates it at request time.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its own name. Last registration wins,
    /// which only matters during startup assembly.
    pub fn register(mut self, schema: Schema) -> Self {
        self.schemas.insert(schema.name().to_string(), Arc::new(schema));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
