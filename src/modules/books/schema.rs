//! Payload validation for book writes.
//!
//! Both named schemas share one field table; the JSON Schema documents are
//! generated from it and compiled once when the module is built.

use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{ValidationError, Validator};
use serde_json::{json, Map, Value};

use super::models::Book;

/// Primitive JSON type a book field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
}

impl FieldType {
    pub fn json_type(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
        }
    }
}

/// Every book field, all required.
pub const BOOK_FIELDS: &[(&str, FieldType)] = &[
    ("isbn", FieldType::String),
    ("amazon_url", FieldType::String),
    ("author", FieldType::String),
    ("language", FieldType::String),
    ("pages", FieldType::Integer),
    ("publisher", FieldType::String),
    ("title", FieldType::String),
    ("year", FieldType::Integer),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    BookCreate,
    BookUpdate,
}

impl SchemaName {
    pub const ALL: [SchemaName; 2] = [SchemaName::BookCreate, SchemaName::BookUpdate];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaName::BookCreate => "book-create",
            SchemaName::BookUpdate => "book-update",
        }
    }

    fn fields(self) -> &'static [(&'static str, FieldType)] {
        match self {
            SchemaName::BookCreate | SchemaName::BookUpdate => BOOK_FIELDS,
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON Schema document for `name`. Unknown properties are allowed.
pub fn json_schema(name: SchemaName) -> Value {
    let mut properties = Map::new();
    for (field, field_type) in name.fields() {
        properties.insert(
            (*field).to_string(),
            json!({ "type": field_type.json_type() }),
        );
    }
    let required: Vec<&str> = name.fields().iter().map(|(field, _)| *field).collect();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": format!("urn:bookly:{}", name),
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Compiled validators for every named schema.
pub struct SchemaRegistry {
    validators: HashMap<SchemaName, Validator>,
}

impl SchemaRegistry {
    pub fn new() -> anyhow::Result<Self> {
        let mut validators = HashMap::new();
        for name in SchemaName::ALL {
            let validator = jsonschema::validator_for(&json_schema(name))
                .map_err(|e| anyhow!("schema '{}' does not compile: {}", name, e))?;
            validators.insert(name, validator);
        }
        Ok(Self { validators })
    }

    /// Check `payload` against `name`; an empty list means the payload is valid.
    pub fn validate(&self, name: SchemaName, payload: &Value) -> Vec<String> {
        match self.validators.get(&name) {
            Some(validator) => validator.iter_errors(payload).map(|e| describe(&e)).collect(),
            None => vec![format!("unknown schema '{}'", name)],
        }
    }

    /// Validate and convert into a [`Book`].
    pub fn validate_book(
        &self,
        name: SchemaName,
        mut payload: Value,
    ) -> Result<Book, Vec<String>> {
        let errors = self.validate(name, &payload);
        if !errors.is_empty() {
            return Err(errors);
        }

        let out_of_range = normalize_integers(name, &mut payload);
        if !out_of_range.is_empty() {
            return Err(out_of_range);
        }

        serde_json::from_value::<Book>(payload).map_err(|e| vec![e.to_string()])
    }
}

fn describe(error: &ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    let field = path.trim_start_matches('/');

    match &error.kind {
        ValidationErrorKind::Required { property } => match property.as_str() {
            Some(name) => format!("{} is required", name),
            None => format!("{} is required", property),
        },
        ValidationErrorKind::Type {
            kind: TypeKind::Single(expected),
        } => {
            let subject = if field.is_empty() { "payload" } else { field };
            format!("{} must be {}", subject, expected)
        }
        _ => error.to_string(),
    }
}

// Schema "integer" admits any whole number, including `264.0`; the row
// stores 32-bit integers. Rewrites each integer field in place and reports
// the ones that do not fit.
fn normalize_integers(name: SchemaName, payload: &mut Value) -> Vec<String> {
    let mut errors = Vec::new();
    for (field, field_type) in name.fields() {
        if *field_type != FieldType::Integer {
            continue;
        }
        if let Some(value) = payload.get_mut(*field) {
            match as_i32(value) {
                Some(number) => *value = Value::from(number),
                None => errors.push(format!("{} must be integer", field)),
            }
        }
    }
    errors
}

fn as_i32(value: &Value) -> Option<i32> {
    if let Some(number) = value.as_i64() {
        return i32::try_from(number).ok();
    }
    value
        .as_f64()
        .filter(|number| number.fract() == 0.0)
        .filter(|number| *number >= f64::from(i32::MIN) && *number <= f64::from(i32::MAX))
        .map(|number| number as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> Value {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Lane",
            "language": "english",
            "pages": 264,
            "publisher": "Princeton University Press",
            "title": "Power-Up: Unlocking the Hidden Power in video Games",
            "year": 2017
        })
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new().unwrap()
    }

    #[test]
    fn accepts_complete_payload() {
        let schemas = registry();
        for name in SchemaName::ALL {
            assert!(schemas.validate(name, &valid_payload()).is_empty());
        }
    }

    #[test]
    fn every_missing_field_is_reported() {
        let schemas = registry();
        for (field, _) in BOOK_FIELDS {
            let mut payload = valid_payload();
            payload.as_object_mut().unwrap().remove(*field);

            let errors = schemas.validate(SchemaName::BookCreate, &payload);
            assert_eq!(errors, vec![format!("{} is required", field)]);
        }
    }

    #[test]
    fn wrong_types_are_reported_per_field() {
        let schemas = registry();
        let mut payload = valid_payload();
        payload["author"] = json!(12);
        payload["pages"] = json!("264");

        let mut errors = schemas.validate(SchemaName::BookUpdate, &payload);
        errors.sort();
        assert_eq!(
            errors,
            vec![
                "author must be string".to_string(),
                "pages must be integer".to_string()
            ]
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut payload = valid_payload();
        payload["edition"] = json!("2nd");
        assert!(registry()
            .validate(SchemaName::BookCreate, &payload)
            .is_empty());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let errors = registry().validate(SchemaName::BookCreate, &json!(["isbn"]));
        assert_eq!(errors, vec!["payload must be object".to_string()]);
    }

    #[test]
    fn validate_book_builds_typed_record() {
        let book = registry()
            .validate_book(SchemaName::BookCreate, valid_payload())
            .unwrap();
        assert_eq!(book.isbn, "0691161518");
        assert_eq!(book.pages, 264);
        assert_eq!(book.year, 2017);
    }

    #[test]
    fn validate_book_rejects_out_of_range_integers() {
        let mut payload = valid_payload();
        payload["pages"] = json!(10_000_000_000_i64);

        let errors = registry()
            .validate_book(SchemaName::BookCreate, payload)
            .unwrap_err();
        assert_eq!(errors, vec!["pages must be integer".to_string()]);
    }

    #[test]
    fn validate_book_accepts_whole_number_floats() {
        let mut payload = valid_payload();
        payload["pages"] = json!(264.0);
        payload["year"] = json!(2017.0);

        let book = registry()
            .validate_book(SchemaName::BookCreate, payload)
            .unwrap();
        assert_eq!(book.pages, 264);
        assert_eq!(book.year, 2017);
    }

    #[test]
    fn validate_book_rejects_fractional_and_oversized_floats() {
        let schemas = registry();

        let mut payload = valid_payload();
        payload["pages"] = json!(264.5);
        let errors = schemas
            .validate_book(SchemaName::BookCreate, payload)
            .unwrap_err();
        assert_eq!(errors, vec!["pages must be integer".to_string()]);

        let mut payload = valid_payload();
        payload["year"] = json!(1.0e12);
        let errors = schemas
            .validate_book(SchemaName::BookUpdate, payload)
            .unwrap_err();
        assert_eq!(errors, vec!["year must be integer".to_string()]);
    }

    #[test]
    fn generated_schema_lists_all_fields_as_required() {
        let schema = json_schema(SchemaName::BookCreate);
        assert_eq!(schema["required"].as_array().unwrap().len(), BOOK_FIELDS.len());
        assert_eq!(schema["properties"]["year"]["type"], "integer");
        assert!(schema.get("additionalProperties").is_none());
    }
}
