//! Float-tolerant numeric inputs.
//!
//! Seeds and expirations are frequently produced from wall-clock arithmetic
//! (`now_ms * 60.1234`) and arrive as floating point. The value a caller hands
//! over is kept as given; truncation to an integer happens only when the
//! order is encoded, so two parties holding the same input always agree.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when a numeric input cannot be interpreted as a
/// non-negative integer.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid numeric value '{0}'")]
pub struct NumericError(pub String);

/// A numeric order field supplied as an integer, a float or a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
	Integer(u64),
	Float(f64),
	Text(String),
}

impl Numeric {
	/// Truncates the value toward zero.
	///
	/// Fractional parts are dropped, never rounded. Negative, NaN and infinite
	/// values are rejected.
	pub fn to_integer(&self) -> Result<u64, NumericError> {
		match self {
			Numeric::Integer(v) => Ok(*v),
			Numeric::Float(v) => truncate_float(*v),
			Numeric::Text(s) => {
				let trimmed = s.trim();
				if let Ok(v) = trimmed.parse::<u64>() {
					return Ok(v);
				}
				let parsed = trimmed
					.parse::<f64>()
					.map_err(|_| NumericError(s.clone()))?;
				truncate_float(parsed)
			},
		}
	}

	/// Interprets the value as milliseconds and truncates it to whole seconds.
	pub fn to_seconds(&self) -> Result<u64, NumericError> {
		match self {
			Numeric::Integer(v) => Ok(*v / 1000),
			Numeric::Float(v) => truncate_float(*v / 1000.0),
			Numeric::Text(s) => match s.trim().parse::<u64>() {
				Ok(v) => Ok(v / 1000),
				Err(_) => truncate_float(self.to_float()? / 1000.0),
			},
		}
	}

	/// Returns the value as a float.
	pub fn to_float(&self) -> Result<f64, NumericError> {
		match self {
			Numeric::Integer(v) => Ok(*v as f64),
			Numeric::Float(v) => Ok(*v),
			Numeric::Text(s) => s.trim().parse::<f64>().map_err(|_| NumericError(s.clone())),
		}
	}
}

fn truncate_float(value: f64) -> Result<u64, NumericError> {
	if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
		return Err(NumericError(value.to_string()));
	}
	Ok(value.trunc() as u64)
}

impl From<u64> for Numeric {
	fn from(v: u64) -> Self {
		Numeric::Integer(v)
	}
}

impl From<f64> for Numeric {
	fn from(v: f64) -> Self {
		Numeric::Float(v)
	}
}

impl From<&str> for Numeric {
	fn from(v: &str) -> Self {
		Numeric::Text(v.to_string())
	}
}

impl fmt::Display for Numeric {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Numeric::Integer(v) => write!(f, "{}", v),
			Numeric::Float(v) => write!(f, "{}", v),
			Numeric::Text(s) => write!(f, "{}", s),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_float_seed_truncates() {
		let seed = Numeric::from(1535113220.12345);
		assert_eq!(seed.to_integer().unwrap(), 1535113220);
		assert_eq!(Numeric::from(0.999).to_integer().unwrap(), 0);
		assert_eq!(Numeric::from(7.5).to_integer().unwrap(), 7);
	}

	#[test]
	fn test_float_and_integer_agree() {
		assert_eq!(
			Numeric::from(1535113220.12345).to_integer(),
			Numeric::from(1535113220u64).to_integer()
		);
		assert_eq!(
			Numeric::from("1535113220.9").to_integer(),
			Numeric::from("1535113220").to_integer()
		);
	}

	#[test]
	fn test_to_seconds() {
		assert_eq!(Numeric::from(1_700_000_000_999u64).to_seconds().unwrap(), 1_700_000_000);
		assert_eq!(Numeric::from(1_700_000_000_999.75).to_seconds().unwrap(), 1_700_000_000);
		assert_eq!(Numeric::from("1700000000999").to_seconds().unwrap(), 1_700_000_000);
	}

	#[test]
	fn test_rejects_negative_and_non_finite() {
		assert!(Numeric::from(-1.0).to_integer().is_err());
		assert!(Numeric::from(f64::NAN).to_integer().is_err());
		assert!(Numeric::from(f64::INFINITY).to_seconds().is_err());
		assert!(Numeric::from("abc").to_integer().is_err());
	}

	#[test]
	fn test_deserialize_untagged() {
		let v: Numeric = serde_json::from_str("42").unwrap();
		assert_eq!(v, Numeric::Integer(42));
		let v: Numeric = serde_json::from_str("42.5").unwrap();
		assert_eq!(v, Numeric::Float(42.5));
		let v: Numeric = serde_json::from_str("\"42\"").unwrap();
		assert_eq!(v, Numeric::Text("42".to_string()));
	}
}
