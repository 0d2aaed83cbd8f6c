//! Configuration validation utilities.
//!
//! Each pluggable implementation (signing capability, ledger collaborator)
//! validates its own TOML table before it is built. Schemas list required and
//! optional fields with a type and an optional custom validator; nested
//! tables are validated recursively and errors carry the dotted field path.

use crate::AccountId;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	/// A float; TOML integers are accepted as well.
	Float {
		min: Option<f64>,
		max: Option<f64>,
	},
	Boolean,
	/// A string holding a 20-byte account or contract identifier.
	Address,
	/// A string holding an `http://` or `https://` URL.
	Url,
	Array(Box<FieldType>),
	Table(Schema),
}

/// Custom validator run after type checking.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named field of a schema.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}
}

/// Validation schema for a TOML table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Checks that required fields are present, validates each present
	/// field's type, runs custom validators and recurses into nested tables.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| type_mismatch("root", "table", config))?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field(field, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field(field, value)?;
			}
		}

		Ok(())
	}
}

fn validate_field(field: &Field, value: &toml::Value) -> Result<(), ValidationError> {
	validate_field_type(&field.name, value, &field.field_type)?;
	if let Some(validator) = &field.validator {
		validator(value).map_err(|message| ValidationError::InvalidValue {
			field: field.name.clone(),
			message,
		})?;
	}
	Ok(())
}

fn type_mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn out_of_range(field: &str, message: String) -> ValidationError {
	ValidationError::InvalidValue {
		field: field.to_string(),
		message,
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(type_mismatch(field_name, "string", value));
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| type_mismatch(field_name, "integer", value))?;
			if let Some(min_val) = min.filter(|m| int_val < *m) {
				return Err(out_of_range(
					field_name,
					format!("Value {} is less than minimum {}", int_val, min_val),
				));
			}
			if let Some(max_val) = max.filter(|m| int_val > *m) {
				return Err(out_of_range(
					field_name,
					format!("Value {} is greater than maximum {}", int_val, max_val),
				));
			}
		},
		FieldType::Float { min, max } => {
			let float_val = value
				.as_float()
				.or_else(|| value.as_integer().map(|i| i as f64))
				.ok_or_else(|| type_mismatch(field_name, "float", value))?;
			if let Some(min_val) = min.filter(|m| float_val < *m) {
				return Err(out_of_range(
					field_name,
					format!("Value {} is less than minimum {}", float_val, min_val),
				));
			}
			if let Some(max_val) = max.filter(|m| float_val > *m) {
				return Err(out_of_range(
					field_name,
					format!("Value {} is greater than maximum {}", float_val, max_val),
				));
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(type_mismatch(field_name, "boolean", value));
			}
		},
		FieldType::Address => {
			let s = value
				.as_str()
				.ok_or_else(|| type_mismatch(field_name, "address string", value))?;
			AccountId::parse(s).map_err(|e| out_of_range(field_name, e.to_string()))?;
		},
		FieldType::Url => {
			let s = value
				.as_str()
				.ok_or_else(|| type_mismatch(field_name, "url string", value))?;
			if !(s.starts_with("http://") || s.starts_with("https://")) {
				return Err(out_of_range(
					field_name,
					"URL must start with http:// or https://".to_string(),
				));
			}
		},
		FieldType::Array(inner_type) => {
			let array = value
				.as_array()
				.ok_or_else(|| type_mismatch(field_name, "array", value))?;
			for (i, item) in array.iter().enumerate() {
				validate_field_type(&format!("{}[{}]", field_name, i), item, inner_type)?;
			}
		},
		FieldType::Table(schema) => {
			schema.validate(value).map_err(|e| match e {
				ValidationError::MissingField(f) => {
					ValidationError::MissingField(format!("{}.{}", field_name, f))
				},
				ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
					field: format!("{}.{}", field_name, field),
					message,
				},
				ValidationError::TypeMismatch {
					field,
					expected,
					actual,
				} => ValidationError::TypeMismatch {
					field: format!("{}.{}", field_name, field),
					expected,
					actual,
				},
			})?;
		},
	}

	Ok(())
}

/// A configuration schema that validates TOML values.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn provider_schema() -> Schema {
		Schema::new(
			vec![Field::new("rpc_url", FieldType::Url)],
			vec![
				Field::new(
					"gas_price_multiplier",
					FieldType::Float {
						min: Some(1.0),
						max: None,
					},
				),
				Field::new(
					"unsafe_recipient_ids",
					FieldType::Array(Box::new(FieldType::Address)),
				),
				Field::new(
					"gateway",
					FieldType::Table(Schema::new(
						vec![Field::new("actions_order_id", FieldType::Address)],
						vec![],
					)),
				),
			],
		)
	}

	#[test]
	fn test_valid_config() {
		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "http://localhost:8545"
			gas_price_multiplier = 1.1
			unsafe_recipient_ids = ["0x5fbdb2315678afecb367f032d93f642f64180aa3"]
			"#,
		)
		.unwrap();
		assert!(provider_schema().validate(&config).is_ok());
	}

	#[test]
	fn test_rejects_bad_url_and_address() {
		let config: toml::Value = toml::from_str(r#"rpc_url = "localhost:8545""#).unwrap();
		assert!(matches!(
			provider_schema().validate(&config),
			Err(ValidationError::InvalidValue { .. })
		));

		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "http://localhost:8545"
			unsafe_recipient_ids = ["0x1234"]
			"#,
		)
		.unwrap();
		let err = provider_schema().validate(&config).unwrap_err();
		assert!(err.to_string().contains("unsafe_recipient_ids[0]"));
	}

	#[test]
	fn test_float_accepts_integer_and_checks_minimum() {
		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "https://rpc.example"
			gas_price_multiplier = 2
			"#,
		)
		.unwrap();
		assert!(provider_schema().validate(&config).is_ok());

		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "https://rpc.example"
			gas_price_multiplier = 0.5
			"#,
		)
		.unwrap();
		assert!(provider_schema().validate(&config).is_err());
	}

	#[test]
	fn test_nested_missing_field_has_path() {
		let config: toml::Value = toml::from_str(
			r#"
			rpc_url = "https://rpc.example"
			[gateway]
			"#,
		)
		.unwrap();
		match provider_schema().validate(&config) {
			Err(ValidationError::MissingField(f)) => assert_eq!(f, "gateway.actions_order_id"),
			other => panic!("unexpected result: {:?}", other),
		}
	}
}
