//! Built-in test suites shown by the terminal front end.

use anyhow::bail;

use crate::matcher::expect;
use crate::models::{TestDefinition, TestOutcome};
use crate::runner::{RunnerError, TestRunner};
use crate::value::Value;

pub struct Suite {
    pub name: &'static str,
    pub title: &'static str,
    build: fn() -> Vec<TestDefinition>,
}

impl Suite {
    pub fn definitions(&self) -> Vec<TestDefinition> {
        (self.build)()
    }

    pub fn runner(&self) -> Result<TestRunner, RunnerError> {
        TestRunner::new(self.title, self.definitions())
    }
}

const SUITES: &[Suite] = &[
    Suite {
        name: "basics",
        title: "Calculator: Arrange, Act, Assert",
        build: basics,
    },
    Suite {
        name: "matchers",
        title: "Matcher Tour",
        build: matchers,
    },
    Suite {
        name: "errors",
        title: "When Tests Throw",
        build: errors,
    },
];

pub fn all() -> &'static [Suite] {
    SUITES
}

pub fn names() -> impl Iterator<Item = &'static str> {
    SUITES.iter().map(|s| s.name)
}

pub fn by_name(name: &str) -> Option<&'static Suite> {
    SUITES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

fn divide(a: f64, b: f64) -> anyhow::Result<f64> {
    if b == 0.0 {
        bail!("Cannot divide by zero");
    }
    Ok(a / b)
}

fn greet(name: &str) -> String {
    format!("Hello, {}!", name.trim())
}

fn basics() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new("adds two numbers", "Arrange 2 and 3, act with add, assert 5", || {
            let (a, b) = (2.0, 3.0);
            let sum = add(a, b);
            Ok(expect(sum).to_be(5).into())
        }),
        TestDefinition::new("divides two numbers", "10 / 4 is 2.5", || {
            let quotient = divide(10.0, 4.0)?;
            Ok(TestOutcome::new(2.5, quotient))
        }),
        TestDefinition::assertion(
            "rejects division by zero",
            "divide(1, 0) throws an error mentioning division by zero",
            || expect(Value::function(|| Ok(divide(1.0, 0.0)?.into()))).to_throw(Some("divide by zero")),
        ),
        TestDefinition::new(
            "adds floating point numbers",
            "0.1 + 0.2 compared exactly with 0.3 fails; see the next test",
            || Ok(TestOutcome::new(0.3, add(0.1, 0.2))),
        ),
        TestDefinition::assertion(
            "adds floating point numbers approximately",
            "0.1 + 0.2 is close to 0.3",
            || expect(add(0.1, 0.2)).to_be_close_to(0.3, None),
        ),
        TestDefinition::assertion("greets by name", "greeting contains the trimmed name", || {
            expect(greet("  Ada ")).to_contain("Ada!")
        }),
    ]
}

fn matchers() -> Vec<TestDefinition> {
    vec![
        TestDefinition::assertion("to_be", "primitives compare by value", || expect("ok").to_be("ok")),
        TestDefinition::assertion("to_equal", "objects compare by structure", || {
            let user = Value::object([("name", Value::from("Ada")), ("age", Value::from(36))]);
            let copy = Value::object([("name", Value::from("Ada")), ("age", Value::from(36))]);
            expect(user).to_equal(copy)
        }),
        TestDefinition::assertion("not.to_be", "two equal objects are not the same object", || {
            let a = Value::object([("id", Value::from(1))]);
            let b = Value::object([("id", Value::from(1))]);
            expect(a).not().to_be(b)
        }),
        TestDefinition::assertion("to_be_close_to", "pi to two decimals", || {
            expect(std::f64::consts::PI).to_be_close_to(3.14, Some(2))
        }),
        TestDefinition::assertion("to_contain", "array membership", || {
            expect(vec!["apple", "banana", "cherry"]).to_contain("banana")
        }),
        TestDefinition::assertion("to_have_length", "string length", || expect("hello").to_have_length(5)),
        TestDefinition::assertion("to_match", "email pattern", || {
            expect("ada@example.com").to_match(r"^[^@\s]+@[^@\s]+\.\w+$")
        }),
        TestDefinition::assertion("to_be_truthy", "non-empty strings are truthy", || {
            expect("text").to_be_truthy()
        }),
        TestDefinition::assertion("to_be_falsy", "zero is falsy", || expect(0).to_be_falsy()),
        TestDefinition::assertion("to_be_null", "missing lookup is null", || {
            let lookup: Option<i32> = None;
            expect(lookup).to_be_null()
        }),
        TestDefinition::assertion("to_be_undefined", "unit is undefined", || expect(()).to_be_undefined()),
        TestDefinition::assertion("to_be_defined", "null still counts as defined", || {
            expect(Value::Null).to_be_defined()
        }),
        TestDefinition::assertion("to_be_greater_than", "10 > 5", || expect(10).to_be_greater_than(5.0)),
        TestDefinition::assertion("to_be_less_than", "5 < 10", || expect(5).to_be_less_than(10.0)),
    ]
}

fn errors() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new("returns an error", "an Err is reported as a failure", || {
            bail!("boom")
        }),
        TestDefinition::new("panics", "a panic is caught and reported", || {
            let items: Vec<i32> = Vec::new();
            let first = items.first().copied();
            match first {
                Some(n) => Ok(TestOutcome::new(1, n)),
                None => panic!("list was empty"),
            }
        }),
        TestDefinition::assertion(
            "to_throw on a value",
            "using to_throw on a number is a usage error",
            || expect(42).to_throw(None),
        ),
        TestDefinition::assertion(
            "wrong error message",
            "the function throws, but not the expected message",
            || expect(Value::function(|| bail!("x"))).to_throw(Some("y")),
        ),
        TestDefinition::assertion("does not throw", "a well-behaved function", || {
            expect(Value::function(|| Ok(divide(9.0, 3.0)?.into()))).not().to_throw(None)
        }),
    ]
}
