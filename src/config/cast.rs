//! Casting raw values (environment strings or literal defaults) to declared types.
//!
//! The absent marker (`None`) passes through every caster untouched, so a
//! missing value is never confused with a casted zero value.

use toml::Value;

use super::error::CastError;
use super::field::FieldType;

/// Recognized boolean tokens, matched case-insensitively.
pub const BOOL_TOKENS: [(&str, bool); 4] =
    [("yes", true), ("true", true), ("false", false), ("no", false)];

/// Casts `raw` to `ty`, propagating `None` without invoking any conversion.
pub fn cast(ty: FieldType, raw: Option<Value>) -> Result<Option<Value>, CastError> {
    raw.map(|value| cast_value(ty, value)).transpose()
}

fn cast_value(ty: FieldType, value: Value) -> Result<Value, CastError> {
    match ty {
        FieldType::String => to_string(value).map(Value::String),
        FieldType::Integer => to_integer(value).map(Value::Integer),
        FieldType::Float => to_float(value).map(Value::Float),
        FieldType::Boolean => cast_bool(&value).map(Value::Boolean),
        FieldType::Custom { cast, .. } => cast(value),
    }
}

/// Casts a value to a boolean.
///
/// Non-empty strings must be one of [`BOOL_TOKENS`]; everything else,
/// including the empty string, falls back to truthiness.
pub fn cast_bool(value: &Value) -> Result<bool, CastError> {
    match value {
        Value::String(s) if !s.is_empty() => BOOL_TOKENS
            .iter()
            .find(|(token, _)| s.eq_ignore_ascii_case(token))
            .map(|&(_, b)| b)
            .ok_or_else(|| CastError::UnknownBoolToken(s.clone())),
        other => Ok(truthy(other)),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Boolean(b) => *b,
        Value::Array(a) => !a.is_empty(),
        Value::Table(t) => !t.is_empty(),
        Value::Datetime(_) => true,
    }
}

fn to_string(value: Value) -> Result<String, CastError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Integer(i) => Ok(i.to_string()),
        // keep the fractional part: 1.0 renders as "1.0", not "1"
        Value::Float(f) => Ok(format!("{f:?}")),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        other => Err(unsupported("string", &other)),
    }
}

fn to_integer(value: Value) -> Result<i64, CastError> {
    match value {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| CastError::InvalidInteger(s)),
        Value::Integer(i) => Ok(i),
        Value::Float(f) if f.is_finite() => float_to_integer(f),
        Value::Boolean(b) => Ok(i64::from(b)),
        other => Err(unsupported("integer", &other)),
    }
}

/// Truncates toward zero. Values outside `i64` are an error, never clamped.
fn float_to_integer(f: f64) -> Result<i64, CastError> {
    // 2^63, exactly representable as f64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let truncated = f.trunc();
    if (-LIMIT..LIMIT).contains(&truncated) {
        Ok(truncated as i64)
    } else {
        Err(CastError::IntegerOutOfRange(f))
    }
}

fn to_float(value: Value) -> Result<f64, CastError> {
    match value {
        Value::String(s) => s.trim().parse().map_err(|_| CastError::InvalidFloat(s)),
        Value::Integer(i) => Ok(i as f64),
        Value::Float(f) => Ok(f),
        Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
        other => Err(unsupported("float", &other)),
    }
}

fn unsupported(expected: &'static str, found: &Value) -> CastError {
    CastError::Unsupported {
        expected,
        found: found.type_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn test_absent_propagates_through_every_type() {
        for ty in [
            FieldType::String,
            FieldType::Integer,
            FieldType::Float,
            FieldType::Boolean,
        ] {
            assert_eq!(cast(ty, None).unwrap(), None, "{ty:?}");
        }
    }

    #[test]
    fn test_absent_never_reaches_custom_caster() {
        fn explode(_: Value) -> Result<Value, CastError> {
            panic!("custom caster invoked for absent value");
        }
        let ty = FieldType::Custom {
            name: "explode",
            cast: explode,
        };
        assert_eq!(cast(ty, None).unwrap(), None);
    }

    #[test]
    fn test_bool_tokens_any_case() {
        for token in ["yes", "YES", "True", "tRuE"] {
            assert!(cast_bool(&s(token)).unwrap(), "{token}");
        }
        for token in ["no", "No", "FALSE", "false"] {
            assert!(!cast_bool(&s(token)).unwrap(), "{token}");
        }
    }

    #[test]
    fn test_bool_unknown_token_fails() {
        assert_eq!(
            cast_bool(&s("maybe")),
            Err(CastError::UnknownBoolToken("maybe".into()))
        );
        // "1" is a non-empty string, so it goes through the token table
        assert!(cast_bool(&s("1")).is_err());
    }

    #[test]
    fn test_bool_truthiness_fallback() {
        assert!(!cast_bool(&s("")).unwrap());
        assert!(!cast_bool(&Value::Integer(0)).unwrap());
        assert!(cast_bool(&Value::Integer(-3)).unwrap());
        assert!(!cast_bool(&Value::Float(0.0)).unwrap());
        assert!(cast_bool(&Value::Float(0.5)).unwrap());
        assert!(!cast_bool(&Value::Boolean(false)).unwrap());
        assert!(!cast_bool(&Value::Array(vec![])).unwrap());
        assert!(cast_bool(&Value::Array(vec![Value::Integer(1)])).unwrap());
    }

    #[test]
    fn test_integer_cast() {
        assert_eq!(
            cast(FieldType::Integer, Some(s("8080"))).unwrap(),
            Some(Value::Integer(8080))
        );
        assert_eq!(
            cast(FieldType::Integer, Some(s(" -7 "))).unwrap(),
            Some(Value::Integer(-7))
        );
        assert_eq!(
            cast(FieldType::Integer, Some(Value::Float(3.9))).unwrap(),
            Some(Value::Integer(3))
        );
        assert_eq!(
            cast(FieldType::Integer, Some(Value::Boolean(true))).unwrap(),
            Some(Value::Integer(1))
        );
    }

    #[test]
    fn test_integer_cast_error_propagates() {
        assert_eq!(
            cast(FieldType::Integer, Some(s("abc"))),
            Err(CastError::InvalidInteger("abc".into()))
        );
        assert!(matches!(
            cast(FieldType::Integer, Some(Value::Float(f64::NAN))),
            Err(CastError::Unsupported { expected: "integer", .. })
        ));
    }

    #[test]
    fn test_integer_cast_rejects_out_of_range_float() {
        assert_eq!(
            cast(FieldType::Integer, Some(Value::Float(1e20))),
            Err(CastError::IntegerOutOfRange(1e20))
        );
        assert_eq!(
            cast(FieldType::Integer, Some(Value::Float(-1e20))),
            Err(CastError::IntegerOutOfRange(-1e20))
        );
        assert_eq!(
            cast(FieldType::Integer, Some(Value::Float(9_223_372_036_854_775_808.0))),
            Err(CastError::IntegerOutOfRange(9_223_372_036_854_775_808.0))
        );
        assert_eq!(
            cast(FieldType::Integer, Some(Value::Float(-9_223_372_036_854_775_808.0))).unwrap(),
            Some(Value::Integer(i64::MIN))
        );
    }

    #[test]
    fn test_float_cast() {
        assert_eq!(
            cast(FieldType::Float, Some(s("2.5"))).unwrap(),
            Some(Value::Float(2.5))
        );
        assert_eq!(
            cast(FieldType::Float, Some(Value::Integer(4))).unwrap(),
            Some(Value::Float(4.0))
        );
        assert_eq!(
            cast(FieldType::Float, Some(s("fast"))),
            Err(CastError::InvalidFloat("fast".into()))
        );
    }

    #[test]
    fn test_string_cast_renders_native_values() {
        assert_eq!(
            cast(FieldType::String, Some(s(""))).unwrap(),
            Some(s(""))
        );
        assert_eq!(
            cast(FieldType::String, Some(Value::Integer(8888))).unwrap(),
            Some(s("8888"))
        );
        assert_eq!(
            cast(FieldType::String, Some(Value::Float(1.0))).unwrap(),
            Some(s("1.0"))
        );
        assert_eq!(
            cast(FieldType::String, Some(Value::Float(2.5))).unwrap(),
            Some(s("2.5"))
        );
        assert_eq!(
            cast(FieldType::String, Some(Value::Boolean(true))).unwrap(),
            Some(s("true"))
        );
    }

    #[test]
    fn test_custom_cast() {
        fn upper(value: Value) -> Result<Value, CastError> {
            match value {
                Value::String(s) => Ok(Value::String(s.to_uppercase())),
                _ => Err(CastError::Custom("expected text".into())),
            }
        }
        let ty = FieldType::Custom {
            name: "upper",
            cast: upper,
        };
        assert_eq!(cast(ty, Some(s("info"))).unwrap(), Some(s("INFO")));
        assert_eq!(
            cast(ty, Some(Value::Integer(1))),
            Err(CastError::Custom("expected text".into()))
        );
    }
}
