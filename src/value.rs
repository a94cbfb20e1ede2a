use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A zero-argument function under test. Returning `Err` is the equivalent of throwing.
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>);

impl Callable {
    pub fn new(f: impl Fn() -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> anyhow::Result<Value> {
        (self.0)()
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Function]")
    }
}

/// Dynamically typed value handed to matchers and carried in test results.
///
/// Arrays, objects and functions are shared behind an `Arc`: cloning a value keeps
/// its identity, building a new one creates a distinct identity. This is what
/// separates strict equality from deep equality.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Arc<Vec<Value>>),
    /// Entries keep insertion order.
    Object(Arc<Vec<(String, Value)>>),
    Function(Callable),
}

impl Value {
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn function(f: impl Fn() -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
        Value::Function(Callable::new(f))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Identity comparison: primitives by value (`NaN` never equals itself, `0`
    /// equals `-0`), arrays/objects/functions by allocation.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Numeric coercion of primitives. Composite values coerce to `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => parse_numeric(s.trim()),
            Value::Undefined | Value::Array(_) | Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// String coercion, as used by substring containment and pattern matching.
    pub fn coerce_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.coerce_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".into(),
            Value::Function(_) => "function".into(),
        }
    }

    /// Canonical JSON text. `None` for values with no JSON form (`undefined`,
    /// functions). Object keys are emitted in insertion order, so two objects
    /// with the same entries in a different order serialize differently.
    pub fn to_json(&self) -> Option<String> {
        match self {
            Value::Undefined | Value::Function(_) => None,
            _ => serde_json::to_string(self).ok(),
        }
    }

    fn is_omitted_in_object(&self) -> bool {
        matches!(self, Value::Undefined | Value::Function(_))
    }
}

/// Structural equality through the canonical JSON form.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    a.to_json() == b.to_json()
}

fn parse_numeric(s: &str) -> f64 {
    match s {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        s if s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
        {
            s.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.into()
    } else if n == 0.0 {
        "0".into()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Shortest digits with a signed exponent: `1e-7`, `1.5e+21`.
fn exponent_form(n: f64) -> String {
    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if !n.is_finite() {
                    serializer.serialize_unit()
                } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let present: Vec<_> = entries
                    .iter()
                    .filter(|(_, v)| !v.is_omitted_in_object())
                    .collect();
                let mut map = serializer.serialize_map(Some(present.len()))?;
                for (key, value) in present {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(entries) if entries.is_empty() => f.write_str("{}"),
            Value::Object(entries) => {
                f.write_str("{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str(" }")
            }
            Value::Function(_) => f.write_str("[Function]"),
            other => f.write_str(&other.coerce_string()),
        }
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Function(callable)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strict_equality_uses_identity_for_composites() {
        let a = Value::object([("a", Value::from(1))]);
        let b = Value::object([("a", Value::from(1))]);
        assert!(a.strict_eq(&a.clone()));
        assert!(!a.strict_eq(&b));
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn strict_equality_on_numbers() {
        assert!(!Value::from(f64::NAN).strict_eq(&Value::from(f64::NAN)));
        assert!(Value::from(0.0).strict_eq(&Value::from(-0.0)));
        assert!(!Value::from(1).strict_eq(&Value::from("1")));
    }

    #[test]
    fn json_follows_stringify_rules() {
        let value = Value::object([
            ("n", Value::from(1)),
            ("f", Value::from(2.5)),
            ("skip", Value::Undefined),
            ("func", Value::function(|| Ok(Value::Null))),
            ("list", Value::array([Value::Undefined, Value::from(f64::NAN)])),
        ]);
        assert_eq!(
            value.to_json().as_deref(),
            Some(r#"{"n":1,"f":2.5,"list":[null,null]}"#)
        );
        assert_eq!(Value::Undefined.to_json(), None);
    }

    #[test]
    fn deep_equality_is_key_order_sensitive() {
        let ab = Value::object([("a", Value::from(1)), ("b", Value::from(2))]);
        let ba = Value::object([("b", Value::from(2)), ("a", Value::from(1))]);
        assert!(!deep_equal(&ab, &ba));
    }

    #[test]
    fn truthiness() {
        for falsy in [
            Value::Undefined,
            Value::Null,
            Value::from(false),
            Value::from(0),
            Value::from(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{} should be falsy", falsy);
        }
        assert!(Value::array(Vec::<Value>::new()).is_truthy());
        assert!(Value::from("0").is_truthy());
    }

    #[test]
    fn number_coercion() {
        assert_eq!(Value::from(" 42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
    }

    #[test]
    fn display_is_readable() {
        let value = Value::object([
            ("name", Value::from("Ada")),
            ("tags", Value::array([1, 2])),
        ]);
        assert_eq!(value.to_string(), r#"{ name: "Ada", tags: [1, 2] }"#);
        assert_eq!(Value::from(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::from(3.0).to_string(), "3");
    }

    #[test]
    fn converts_from_json() {
        let value = Value::from(json!({"a": [1, null, "x"]}));
        assert_eq!(value.to_json().as_deref(), Some(r#"{"a":[1,null,"x"]}"#));
    }

    #[test]
    fn json_conversion_keeps_key_order() {
        let from_json = Value::from(json!({"b": 1, "a": 2}));
        let built = Value::object([("b", Value::from(1)), ("a", Value::from(2))]);
        assert_eq!(from_json.to_json().as_deref(), Some(r#"{"b":1,"a":2}"#));
        assert!(deep_equal(&from_json, &built));
    }

    #[test]
    fn numbers_switch_to_exponent_form_at_the_cutoffs() {
        assert_eq!(Value::from(1e-6).coerce_string(), "0.000001");
        assert_eq!(Value::from(1e-7).coerce_string(), "1e-7");
        assert_eq!(Value::from(-1.5e-7).coerce_string(), "-1.5e-7");
        assert_eq!(Value::from(1e20).coerce_string(), "100000000000000000000");
        assert_eq!(Value::from(1e21).coerce_string(), "1e+21");
        assert_eq!(Value::from(-2.5e22).coerce_string(), "-2.5e+22");
        assert_eq!(Value::from(123.456).coerce_string(), "123.456");
    }
}
