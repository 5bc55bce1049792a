//! Cell coercion rules
//!
//! Missing cells (null or NaN) always coerce to `Null`; nullability is
//! checked separately by the validator.

use featstore_core::Value;

use crate::DataType;

/// Convert `value` into the canonical cell for `dtype`.
///
/// Returns `None` when the value cannot represent the type.
pub fn coerce(value: &Value, dtype: DataType) -> Option<Value> {
    if value.is_missing() {
        return Some(Value::Null);
    }
    match dtype {
        DataType::String => to_string(value),
        DataType::UInt64 => to_u64(value).map(Value::UInt),
        DataType::Int64 => to_i64(value).map(Value::Int),
        DataType::Float32 => to_f32(value).map(|x| Value::Float(x as f64)),
        DataType::Float64 => to_f64(value).map(Value::Float),
    }
}

/// Whether a cell already has the canonical representation of `dtype`
pub fn is_exact(value: &Value, dtype: DataType) -> bool {
    match (value, dtype) {
        (Value::Null, _) => true,
        (Value::Str(_), DataType::String) => true,
        (Value::UInt(_), DataType::UInt64) => true,
        (Value::Int(_), DataType::Int64) => true,
        (Value::Float(x), DataType::Float32) => x.is_nan() || fits_f32(*x),
        (Value::Float(_), DataType::Float64) => true,
        _ => false,
    }
}

fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::Str(s) => Some(Value::Str(s.clone())),
        Value::Int(_) | Value::UInt(_) => Some(Value::Str(value.to_string())),
        // Keep the decimal part so that 1.0 renders as "1.0", not "1"
        Value::Float(x) => Some(Value::Str(format!("{:?}", x))),
        _ => None,
    }
}

fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::UInt(u) => Some(*u),
        Value::Int(i) => u64::try_from(*i).ok(),
        Value::Bool(b) => Some(*b as u64),
        // u64::MAX as f64 rounds up to 2^64, which is out of range
        Value::Float(x) => integral_f64(*x)
            .filter(|x| *x >= 0.0 && *x < u64::MAX as f64)
            .map(|x| x as u64),
        Value::Str(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(|x| to_u64(&Value::Float(x))))
        }
        Value::Null => None,
    }
}

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::UInt(u) => i64::try_from(*u).ok(),
        Value::Bool(b) => Some(*b as i64),
        Value::Float(x) => integral_f64(*x)
            .filter(|x| *x >= i64::MIN as f64 && *x < i64::MAX as f64)
            .map(|x| x as i64),
        Value::Str(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(|x| to_i64(&Value::Float(x))))
        }
        Value::Null => None,
    }
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
}

fn to_f32(value: &Value) -> Option<f32> {
    to_f64(value).filter(|x| x.is_nan() || fits_f32(*x)).map(|x| x as f32)
}

/// Finite values must lie within the f32 range; infinities pass through
fn fits_f32(x: f64) -> bool {
    !x.is_finite() || x.abs() <= f32::MAX as f64
}

fn integral_f64(x: f64) -> Option<f64> {
    (x.is_finite() && x.fract() == 0.0).then_some(x)
}
