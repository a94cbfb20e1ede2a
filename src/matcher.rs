//! Chainable expectations over [`Value`]s.
//!
//! Every matcher consumes the [`Expectation`] and returns an [`AssertionResult`];
//! none of them panics. Negation is carried as a flag on a fresh expectation
//! returned by [`Expectation::not`], so one expectation yields exactly one verdict.

use regex::Regex;

use crate::thrown;
use crate::value::{Value, deep_equal};

/// Decimal digits compared by [`Expectation::to_be_close_to`] when none are given.
pub const DEFAULT_PRECISION: i32 = 2;

#[derive(Debug, Clone)]
pub struct AssertionResult {
    pub passed: bool,
    pub message: String,
    pub expected: Value,
    pub actual: Value,
}

/// Pattern accepted by [`Expectation::to_match`]. Sources are compiled on use.
#[derive(Debug, Clone)]
pub enum Pattern {
    Regex(Regex),
    Source(String),
}

impl Pattern {
    fn compile(self) -> Result<Regex, regex::Error> {
        match self {
            Pattern::Regex(re) => Ok(re),
            Pattern::Source(source) => Regex::new(&source),
        }
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

impl From<&Regex> for Pattern {
    fn from(re: &Regex) -> Self {
        Pattern::Regex(re.clone())
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Pattern::Source(source.to_string())
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Pattern::Source(source)
    }
}

pub fn expect(actual: impl Into<Value>) -> Expectation {
    Expectation {
        actual: actual.into(),
        negated: false,
    }
}

#[derive(Debug, Clone)]
#[must_use = "an expectation does nothing until a matcher is called"]
pub struct Expectation {
    actual: Value,
    negated: bool,
}

impl Expectation {
    /// Flip the verdict of the matcher called next. Calling it twice cancels out.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self {
            negated: !self.negated,
            ..self
        }
    }

    pub fn to_be(self, expected: impl Into<Value>) -> AssertionResult {
        let expected = expected.into();
        let pass = self.actual.strict_eq(&expected);
        self.verdict(pass, "to be", expected)
    }

    pub fn to_equal(self, expected: impl Into<Value>) -> AssertionResult {
        let expected = expected.into();
        let pass = deep_equal(&self.actual, &expected);
        self.verdict(pass, "to equal", expected)
    }

    /// Passes when `|actual - expected| < 10^-precision / 2`.
    pub fn to_be_close_to(self, expected: f64, precision: Option<i32>) -> AssertionResult {
        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        let tolerance = 10f64.powi(-precision) / 2.0;
        let pass = (self.actual.to_number() - expected).abs() < tolerance;
        let verb = format!("to be close to (precision {})", precision);
        self.verdict(pass, &verb, Value::from(expected))
    }

    /// The actual value must be a function. It passes when calling it returns `Err`
    /// or panics, and, given a `substring`, when the thrown message contains it.
    pub fn to_throw(self, substring: Option<&str>) -> AssertionResult {
        let expected = substring.map_or_else(|| Value::from("an error"), Value::from);
        let Value::Function(callable) = &self.actual else {
            let message = format!(
                "to_throw expects a function, received {}",
                self.actual.type_name()
            );
            return self.usage_error(message, expected);
        };

        let thrown = thrown::catch(|| callable.call()).err();
        let pass = match (&thrown, substring) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(message), Some(sub)) => message.contains(sub),
        };

        let not = if self.negated { "not " } else { "" };
        let message = match &thrown {
            Some(thrown) => format!("expected function {}to throw {}, it threw {:?}", not, expected, thrown),
            None => format!("expected function {}to throw {}, it returned normally", not, expected),
        };
        AssertionResult {
            passed: pass != self.negated,
            message,
            expected,
            actual: thrown.map_or(Value::from("no error"), Value::from),
        }
    }

    /// Substring search for strings, strict-equality membership for arrays.
    pub fn to_contain(self, item: impl Into<Value>) -> AssertionResult {
        let item = item.into();
        let pass = match &self.actual {
            Value::Str(s) => s.contains(&item.coerce_string()),
            Value::Array(items) => items.iter().any(|v| v.strict_eq(&item)),
            other => {
                let message = format!(
                    "to_contain expects a string or an array, received {}",
                    other.type_name()
                );
                return self.usage_error(message, item);
            }
        };
        self.verdict(pass, "to contain", item)
    }

    pub fn to_be_truthy(self) -> AssertionResult {
        let pass = self.actual.is_truthy();
        self.verdict(pass, "to be truthy", Value::from("truthy"))
    }

    pub fn to_be_falsy(self) -> AssertionResult {
        let pass = !self.actual.is_truthy();
        self.verdict(pass, "to be falsy", Value::from("falsy"))
    }

    pub fn to_be_null(self) -> AssertionResult {
        let pass = self.actual.is_null();
        self.verdict(pass, "to be", Value::Null)
    }

    pub fn to_be_undefined(self) -> AssertionResult {
        let pass = self.actual.is_undefined();
        self.verdict(pass, "to be", Value::Undefined)
    }

    pub fn to_be_defined(self) -> AssertionResult {
        let pass = !self.actual.is_undefined();
        self.verdict(pass, "to be defined", Value::from("defined"))
    }

    /// Strings are measured in UTF-16 code units.
    pub fn to_have_length(self, expected: usize) -> AssertionResult {
        let length = match &self.actual {
            Value::Str(s) => s.encode_utf16().count(),
            Value::Array(items) => items.len(),
            other => {
                let message = format!("{} has no length", other.type_name());
                return self.usage_error(message, Value::from(expected));
            }
        };
        let pass = length == expected;
        let not = if self.negated { "not " } else { "" };
        AssertionResult {
            passed: pass != self.negated,
            message: format!(
                "expected {} {}to have length {}, got {}",
                self.actual, not, expected, length
            ),
            expected: Value::from(expected),
            actual: Value::from(length),
        }
    }

    pub fn to_be_greater_than(self, expected: f64) -> AssertionResult {
        let pass = self.actual.to_number() > expected;
        self.verdict(pass, "to be greater than", Value::from(expected))
    }

    pub fn to_be_less_than(self, expected: f64) -> AssertionResult {
        let pass = self.actual.to_number() < expected;
        self.verdict(pass, "to be less than", Value::from(expected))
    }

    /// Matches the actual value's string form against `pattern`.
    pub fn to_match(self, pattern: impl Into<Pattern>) -> AssertionResult {
        let re = match pattern.into().compile() {
            Ok(re) => re,
            Err(err) => {
                let message = format!("invalid pattern: {}", err);
                return self.usage_error(message, Value::Undefined);
            }
        };
        let pass = re.is_match(&self.actual.coerce_string());
        self.verdict(pass, "to match", Value::from(format!("/{}/", re.as_str())))
    }

    fn verdict(self, pass: bool, verb: &str, expected: Value) -> AssertionResult {
        let not = if self.negated { "not " } else { "" };
        AssertionResult {
            passed: pass != self.negated,
            message: format!("expected {} {}{} {}", self.actual, not, verb, expected),
            expected,
            actual: self.actual,
        }
    }

    /// Contract violations always fail, negated or not.
    fn usage_error(self, message: String, expected: Value) -> AssertionResult {
        AssertionResult {
            passed: false,
            message,
            expected,
            actual: self.actual,
        }
    }
}
