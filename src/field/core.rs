use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Primitive type a query or header field is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ScalarType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw scalar could not be decoded as the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecodeError {
    /// The type the field was declared with
    pub expected: ScalarType,
    /// The raw value as received
    pub raw: String,
}

impl FieldDecodeError {
    fn new(expected: ScalarType, raw: &str) -> Self {
        Self {
            expected,
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for FieldDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got `{}`", self.expected, self.raw)
    }
}

impl std::error::Error for FieldDecodeError {}

/// Rust types that can be decoded from a single raw scalar string.
pub trait FromScalar: Sized {
    /// The schema type this Rust type corresponds to
    const SCALAR_TYPE: ScalarType;

    /// Decode `raw`, failing if it is not a valid representation.
    fn from_scalar(raw: &str) -> Result<Self, FieldDecodeError>;
}

impl FromScalar for String {
    const SCALAR_TYPE: ScalarType = ScalarType::String;

    fn from_scalar(raw: &str) -> Result<Self, FieldDecodeError> {
        Ok(raw.to_string())
    }
}

impl FromScalar for bool {
    const SCALAR_TYPE: ScalarType = ScalarType::Boolean;

    fn from_scalar(raw: &str) -> Result<Self, FieldDecodeError> {
        raw.parse()
            .map_err(|_| FieldDecodeError::new(ScalarType::Boolean, raw))
    }
}

impl FromScalar for f64 {
    const SCALAR_TYPE: ScalarType = ScalarType::Number;

    fn from_scalar(raw: &str) -> Result<Self, FieldDecodeError> {
        // NaN and infinities have no JSON representation
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(FieldDecodeError::new(ScalarType::Number, raw)),
        }
    }
}

macro_rules! integer_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl FromScalar for $ty {
                const SCALAR_TYPE: ScalarType = ScalarType::Integer;

                fn from_scalar(raw: &str) -> Result<Self, FieldDecodeError> {
                    raw.parse()
                        .map_err(|_| FieldDecodeError::new(ScalarType::Integer, raw))
                }
            }
        )*
    };
}

integer_from_scalar!(i32, i64, u32, u64);

/// Decode `raw` according to `ty` into a JSON value.
///
/// The returned value is what ends up in the bound query/header record, so a
/// declared `integer` becomes a JSON number and can later be projected into an
/// `i64` or `u32` field by serde.
pub fn parse_scalar(ty: ScalarType, raw: &str) -> Result<Value, FieldDecodeError> {
    match ty {
        ScalarType::String => String::from_scalar(raw).map(Value::String),
        ScalarType::Integer => i64::from_scalar(raw).map(Value::from),
        ScalarType::Number => {
            let v = f64::from_scalar(raw)?;
            Number::from_f64(v)
                .map(Value::Number)
                .ok_or_else(|| FieldDecodeError::new(ScalarType::Number, raw))
        }
        ScalarType::Boolean => bool::from_scalar(raw).map(Value::Bool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_scalar(ScalarType::Integer, "2").unwrap(), json!(2));
        assert_eq!(parse_scalar(ScalarType::Integer, "-17").unwrap(), json!(-17));
        assert!(parse_scalar(ScalarType::Integer, "2.5").is_err());
        assert!(parse_scalar(ScalarType::Integer, "").is_err());
        assert!(parse_scalar(ScalarType::Integer, " 2").is_err());
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_scalar(ScalarType::Number, "2.5").unwrap(), json!(2.5));
        assert!(parse_scalar(ScalarType::Number, "NaN").is_err());
        assert!(parse_scalar(ScalarType::Number, "inf").is_err());
    }

    #[test]
    fn test_parse_boolean_is_strict() {
        assert_eq!(parse_scalar(ScalarType::Boolean, "true").unwrap(), json!(true));
        assert_eq!(parse_scalar(ScalarType::Boolean, "false").unwrap(), json!(false));
        assert!(parse_scalar(ScalarType::Boolean, "yes").is_err());
        assert!(parse_scalar(ScalarType::Boolean, "1").is_err());
    }

    #[test]
    fn test_string_accepts_anything() {
        assert_eq!(parse_scalar(ScalarType::String, "").unwrap(), json!(""));
        assert_eq!(parse_scalar(ScalarType::String, "a b").unwrap(), json!("a b"));
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        assert_eq!(u64::from_scalar("9").unwrap(), 9);
        let err = u32::from_scalar("-1").unwrap_err();
        assert_eq!(err.expected, ScalarType::Integer);
        assert_eq!(err.to_string(), "expected integer, got `-1`");
    }

    #[test]
    fn test_scalar_type_serde_names() {
        let ty: ScalarType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(ty, ScalarType::Boolean);
        assert_eq!(serde_json::to_string(&ScalarType::Number).unwrap(), "\"number\"");
    }
}
