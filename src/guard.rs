//! Call-boundary guards.
//!
//! Instead of wrapping a function, the caller runs [`Accepts::check`] right
//! after binding arguments and [`Returns::check`] right before handing back a
//! result. [`Guarded::call`] strings the two around a closure.
use indexmap::IndexMap;
use tracing::debug;

use crate::coerce::coerce;
use crate::descriptor::Descriptor;
use crate::engine::is_type;
use crate::error::{InputTypeError, ReturnTypeError, TypeCheckError};
use crate::value::Value;

/// Bound arguments, in the function's declaration order.
pub type Arguments = IndexMap<String, Value>;

/// Coerce `value` to `descriptor` and re-check it.
fn coerce_checked(value: &Value, descriptor: &Descriptor) -> Option<Value> {
    match coerce(value, descriptor) {
        Ok(v) if is_type(&v, descriptor) => Some(v),
        Ok(v) => {
            debug!(%descriptor, coerced = %v, "coerced value still does not conform");
            None
        }
        Err(error) => {
            debug!(%error, "coercion failed");
            None
        }
    }
}

// ------------------------------- Accepts ---------------------------------- //

#[derive(Debug, Clone, Default)]
pub struct Accepts {
    params: IndexMap<String, Descriptor>,
    coerce_type: bool,
}

impl Accepts {
    pub fn new() -> Self { Self::default() }

    pub fn param(mut self, name: impl Into<String>, descriptor: impl Into<Descriptor>) -> Self {
        self.params.insert(name.into(), descriptor.into());
        self
    }

    pub fn coerce_type(mut self, on: bool) -> Self {
        self.coerce_type = on;
        self
    }

    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> { self.params.get(name) }

    /// Validate bound arguments in declaration order, stopping at the first
    /// failing one. Every declared parameter must be bound; arguments without
    /// a declared descriptor pass through untouched.
    pub fn check(&self, mut args: Arguments) -> Result<Arguments, InputTypeError> {
        for (name, descriptor) in &self.params {
            let Some(value) = args.get_mut(name) else {
                debug!(param = %name, %descriptor, "argument missing");
                return Err(InputTypeError::missing(name, descriptor));
            };
            if is_type(value, descriptor) {
                continue;
            }
            if !self.coerce_type {
                debug!(param = %name, observed = value.type_name(), %descriptor, "argument rejected");
                return Err(InputTypeError::new(name, value, descriptor));
            }
            match coerce_checked(value, descriptor) {
                Some(coerced) => {
                    debug!(param = %name, from = %value, to = %coerced, "argument coerced");
                    *value = coerced;
                }
                None => return Err(InputTypeError::new(name, value, descriptor)),
            }
        }
        Ok(args)
    }

    /// Bind positional values to the declared parameters in order, then check.
    /// Extra positional values are bound as `arg{i}` and left unchecked.
    pub fn check_positional(&self, values: Vec<Value>) -> Result<Arguments, InputTypeError> {
        let mut names = self.params.keys();
        let args = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let name = names.next().cloned().unwrap_or_else(|| format!("arg{i}"));
                (name, v)
            })
            .collect();
        self.check(args)
    }
}

// ------------------------------- Returns ---------------------------------- //

#[derive(Debug, Clone)]
pub struct Returns {
    descriptor: Descriptor,
    coerce_type: bool,
}

impl Returns {
    pub fn new(descriptor: impl Into<Descriptor>) -> Self {
        Self { descriptor: descriptor.into(), coerce_type: false }
    }

    pub fn coerce_type(mut self, on: bool) -> Self {
        self.coerce_type = on;
        self
    }

    pub fn descriptor(&self) -> &Descriptor { &self.descriptor }

    pub fn check(&self, value: Value) -> Result<Value, ReturnTypeError> {
        if is_type(&value, &self.descriptor) {
            return Ok(value);
        }
        if self.coerce_type {
            if let Some(coerced) = coerce_checked(&value, &self.descriptor) {
                debug!(from = %value, to = %coerced, "return value coerced");
                return Ok(coerced);
            }
        }
        debug!(observed = value.type_name(), descriptor = %self.descriptor, "return value rejected");
        Err(ReturnTypeError::new(&value, &self.descriptor))
    }
}

// ------------------------------- Guarded ---------------------------------- //

/// Both guards around one function.
#[derive(Debug, Clone, Default)]
pub struct Guarded {
    pub accepts: Option<Accepts>,
    pub returns: Option<Returns>,
}

impl Guarded {
    pub fn new() -> Self { Self::default() }

    pub fn accepts(mut self, accepts: Accepts) -> Self {
        self.accepts = Some(accepts);
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Check arguments, run `f`, check its result.
    pub fn call<F>(&self, args: Arguments, f: F) -> Result<Value, TypeCheckError>
    where
        F: FnOnce(&Arguments) -> Value,
    {
        let args = match &self.accepts {
            Some(accepts) => accepts.check(args)?,
            None => args,
        };
        let out = f(&args);
        match &self.returns {
            Some(returns) => Ok(returns.check(out)?),
            None => Ok(out),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Primitive::*;
    use serde_json::json;
    use std::cell::Cell;

    fn args(pairs: &[(&str, Value)]) -> Arguments {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn add(args: &Arguments) -> Value {
        match (&args["a"], &args["b"]) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
            (a, b) => {
                let f = |v: &Value| match v {
                    Value::Int(i) => *i as f64,
                    Value::Float(x) => x.0,
                    _ => f64::NAN,
                };
                Value::float(f(a) + f(b))
            }
        }
    }

    fn add_ints() -> Guarded {
        Guarded::new().accepts(Accepts::new().param("a", Int).param("b", Int))
    }

    #[test]
    fn valid_arguments_pass() {
        let out = add_ints().call(args(&[("a", 1.into()), ("b", 2.into())]), add);
        assert_eq!(out, Ok(Value::Int(3)));
    }

    #[test]
    fn first_failing_argument_is_reported() {
        let err = add_ints()
            .call(args(&[("a", 1.0.into()), ("b", 2.0.into())]), add)
            .unwrap_err();
        match &err {
            TypeCheckError::Input(e) => {
                assert_eq!(e.name, "a");
                assert_eq!(e.observed, "float");
                assert_eq!(e.expected, "int");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.to_string(), "Argument `a` is not of type `int`.");
    }

    #[test]
    fn function_is_not_called_when_arguments_fail() {
        let called = Cell::new(false);
        let _ = add_ints().call(args(&[("a", "x".into()), ("b", 2.into())]), |a| {
            called.set(true);
            add(a)
        });
        assert!(!called.get());
    }

    #[test]
    fn coercion_converts_arguments() {
        let g = Guarded::new().accepts(Accepts::new().param("a", Int).param("b", Int).coerce_type(true));
        let out = g.call(args(&[("a", 1.0.into()), ("b", 2.0.into())]), add);
        assert_eq!(out, Ok(Value::Int(3)));
    }

    #[test]
    fn failed_coercion_is_reported_as_input_error() {
        let a = Accepts::new().param("a", Int).coerce_type(true);
        let err = a.check(args(&[("a", "one".into())])).unwrap_err();
        assert_eq!(err.name, "a");
        assert_eq!(err.observed, "str");
    }

    #[test]
    fn unions_accept_either_branch() {
        let num = Descriptor::any_of([Int, Float]).unwrap();
        let g = Guarded::new().accepts(Accepts::new().param("a", num.clone()).param("b", num));
        assert_eq!(g.call(args(&[("a", 1.into()), ("b", 2.into())]), add), Ok(Value::Int(3)));
        assert_eq!(g.call(args(&[("a", 1.into()), ("b", 2.0.into())]), add), Ok(Value::float(3.0)));
        let err = g.call(args(&[("a", 1.into()), ("b", "two".into())]), add).unwrap_err();
        assert_eq!(err.name(), "b");
    }

    #[test]
    fn intersections_require_every_branch() {
        let int_number = Descriptor::all_of([Number, Int]).unwrap();
        let g = Guarded::new().accepts(Accepts::new().param("a", int_number.clone()).param("b", int_number));
        assert_eq!(g.call(args(&[("a", 1.into()), ("b", 2.into())]), add), Ok(Value::Int(3)));
        assert!(g.call(args(&[("a", 1.0.into()), ("b", 2.0.into())]), add).is_err());
    }

    #[test]
    fn return_value_is_checked() {
        let g = Guarded::new().returns(Returns::new(Int));
        assert_eq!(g.call(args(&[("a", 1.into()), ("b", 2.into())]), add), Ok(Value::Int(3)));
        let err = g.call(args(&[("a", 1.0.into()), ("b", 2.0.into())]), add).unwrap_err();
        assert!(matches!(err, TypeCheckError::Return(_)));
        assert_eq!(err.to_string(), "Return value is not of type `int`.");
        assert_eq!(err.observed(), "float");
    }

    #[test]
    fn return_value_coercion() {
        let g = Guarded::new().returns(Returns::new(Int).coerce_type(true));
        assert_eq!(g.call(args(&[("a", 1.0.into()), ("b", 2.0.into())]), add), Ok(Value::Int(3)));
        let err = g
            .call(args(&[("a", "one".into()), ("b", "two".into())]), |_| Value::from("onetwo"))
            .unwrap_err();
        assert!(matches!(err, TypeCheckError::Return(_)));
    }

    #[test]
    fn container_parameters() {
        let a = Accepts::new()
            .param("d", Descriptor::dict(Int, Object))
            .param("l", Descriptor::list(Int))
            .param("t", Descriptor::tuple(Int))
            .param("s", Descriptor::set(Int));
        let ok = args(&[
            ("d", Value::Dict([(1.into(), "one".into()), (2.into(), "two".into())].into_iter().collect())),
            ("l", Value::List(vec![1.into(), 2.into()])),
            ("t", Value::Tuple(vec![1.into(), 2.into()])),
            ("s", Value::Set([1.into(), 2.into()].into_iter().collect())),
        ]);
        assert!(a.check(ok.clone()).is_ok());

        let with = |name: &str, v: Value| {
            let mut bound = ok.clone();
            bound.insert(name.to_string(), v);
            bound
        };
        let bad_dict = with("d", Value::Dict([(1.0.into(), "one".into())].into_iter().collect()));
        assert_eq!(a.check(bad_dict).unwrap_err().name, "d");
        let bad_set = with("s", Value::Set([1.0.into(), 2.0.into()].into_iter().collect()));
        assert_eq!(a.check(bad_set).unwrap_err().name, "s");
        let tuple_as_list = with("l", Value::Tuple(vec![1.into()]));
        assert_eq!(a.check(tuple_as_list).unwrap_err().name, "l");
    }

    #[test]
    fn nested_parameter() {
        let a = Accepts::new().param("d", Descriptor::dict(Int, Descriptor::dict(Str, Float)));
        let one = |v: serde_json::Value| Value::Dict([(Value::Int(1), Value::from(v))].into_iter().collect());
        assert!(a.check(args(&[("d", one(json!({"one": 1.0})))])).is_ok());
        assert!(a.check(args(&[("d", one(json!(1)))])).is_err());
        assert!(a.check(args(&[("d", one(json!({"one": "one"})))])).is_err());
        assert!(a.check(args(&[("d", Value::from(json!({"one": {"one": 1}})))])).is_err());
    }

    #[test]
    fn failures_follow_declaration_order_not_binding_order() {
        let err = add_ints()
            .call(args(&[("b", 2.0.into()), ("a", 1.0.into())]), add)
            .unwrap_err();
        assert_eq!(err.name(), "a");
    }

    #[test]
    fn missing_declared_argument_is_rejected() {
        let called = Cell::new(false);
        let err = add_ints()
            .call(args(&[("b", 2.into())]), |a| {
                called.set(true);
                add(a)
            })
            .unwrap_err();
        assert!(!called.get());
        assert_eq!(err.name(), "a");
        assert_eq!(err.observed(), crate::error::MISSING);
        assert!(Accepts::new().param("a", Int).check_positional(vec![]).is_err());
    }

    #[test]
    fn undeclared_arguments_pass_through() {
        let a = Accepts::new().param("a", Int);
        let out = a.check(args(&[("a", 1.into()), ("extra", "anything".into())])).unwrap();
        assert_eq!(out["extra"], Value::from("anything"));
    }

    #[test]
    fn positional_binding_follows_declaration_order() {
        let a = Accepts::new().param("a", Int).param("b", Str).coerce_type(true);
        let out = a.check_positional(vec![1.5.into(), 2.into(), Value::None]).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), ["a", "b", "arg2"]);
        assert_eq!(out["a"], Value::Int(1));
        assert_eq!(out["b"], Value::from("2"));
    }
}
