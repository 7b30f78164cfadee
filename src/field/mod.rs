//! # Field Module
//!
//! Decodes a single raw scalar string (one query parameter or one header value)
//! into a typed value.
//!
//! ## Supported Types
//!
//! | [`ScalarType`] | Rust type       | Accepted input                  |
//! |----------------|-----------------|---------------------------------|
//! | `string`       | `String`        | anything                        |
//! | `integer`      | `i64`           | `FromStr` for `i64` (`-12`)     |
//! | `number`       | `f64`           | finite `f64` (`2.5`, `1e3`)     |
//! | `boolean`      | `bool`          | exactly `true` or `false`       |
//!
//! Decoding is pure: the same input always yields the same output and nothing
//! outside the returned value is touched. The binder calls [`parse_scalar`] for
//! every declared query and header field; handlers that want a concrete Rust
//! type can call [`FromScalar::from_scalar`] directly.
//!
//! ```rust
//! use brrtbind::field::{parse_scalar, FromScalar, ScalarType};
//!
//! assert_eq!(parse_scalar(ScalarType::Integer, "42").unwrap(), serde_json::json!(42));
//! assert!(parse_scalar(ScalarType::Integer, "forty-two").is_err());
//! assert_eq!(u32::from_scalar("7").unwrap(), 7);
//! ```

mod core;

pub use self::core::{parse_scalar, FieldDecodeError, FromScalar, ScalarType};
