//! Global builtin functions and builtin type constructors.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHasher;

use super::convert::{complex_of, user_method, Number};
use super::operators::MAX_REPEAT_LEN;
use super::{CallArgs, EvalResult, Interpreter};
use crate::exception::ExceptionKind;
use crate::namespace::Namespace;
use crate::value::{
    Builtin, ClassObject, Complex, DictValue, Instance, Property, RangeValue, TypeTag, Value,
};

/// Round half to even at `ndigits` decimal places.
fn round_float(value: f64, ndigits: i64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match usize::try_from(ndigits) {
        Ok(places) => format!("{value:.places$}").parse().unwrap_or(value),
        Err(_) => {
            let scale = 10f64.powi(i32::try_from(-ndigits).unwrap_or(i32::MAX));
            (value / scale).round_ties_even() * scale
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "callers check the float is finite and within range"
)]
fn float_to_int(value: f64) -> i64 {
    value as i64
}

/// Parse an `int()` literal: optional sign, digits, `_` separators and
/// base prefixes when `base` allows them.
fn parse_int(text: &str, base: u32) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let lower = digits.to_ascii_lowercase();
    let (base, digits) = match (base, lower.get(..2)) {
        (0 | 16, Some("0x")) => (16, &digits[2..]),
        (0 | 8, Some("0o")) => (8, &digits[2..]),
        (0 | 2, Some("0b")) => (2, &digits[2..]),
        (0, _) => (10, digits),
        (base, _) => (base, digits),
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = i64::from_str_radix(&cleaned, base).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(['+', '-']);
    let negative = lower.starts_with('-');
    let special = match unsigned {
        "inf" | "infinity" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    };
    if let Some(value) = special {
        return Some(if negative { -value } else { value });
    }
    if text.contains("__") || text.starts_with('_') || text.ends_with('_') {
        return None;
    }
    text.replace('_', "").parse().ok()
}

impl Interpreter<'_> {
    pub(crate) fn call_builtin(
        &self,
        builtin: Builtin,
        receiver: Option<&Value>,
        mut args: CallArgs,
    ) -> EvalResult {
        if let Some(receiver) = receiver {
            return self.call_native_method(builtin, receiver, args);
        }
        if !builtin.is_global() {
            if args.args.is_empty() {
                return Err(self.type_error(format!(
                    "unbound method {}() needs an argument",
                    builtin.name()
                )));
            }
            let receiver = args.args.remove(0);
            return self.call_native_method(builtin, &receiver, args);
        }
        let name = builtin.name();
        match builtin {
            Builtin::Print => self.builtin_print(args),
            Builtin::Len => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let len = self.len_of(&args.args[0])?;
                Ok(Value::Int(i64::try_from(len).map_err(|_| self.overflow())?))
            }
            Builtin::Repr => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                Ok(Value::from(self.to_repr(&args.args[0])?))
            }
            Builtin::IsInstance => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 2, 2)?;
                self.isinstance(&args.args[0], &args.args[1]).map(Value::Bool)
            }
            Builtin::IsSubclass => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 2, 2)?;
                let Value::Class(class) = &args.args[0] else {
                    return Err(self.type_error("issubclass() arg 1 must be a class"));
                };
                self.issubclass(class, &args.args[1]).map(Value::Bool)
            }
            Builtin::HasAttr => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 2, 2)?;
                let attr = self.attribute_name(&args.args[1], name)?;
                match self.lookup_attr(&args.args[0], &attr) {
                    Ok(found) => Ok(Value::Bool(found.is_some())),
                    Err(raised) if raised.is_instance_of("AttributeError") => {
                        Ok(Value::Bool(false))
                    }
                    Err(raised) => Err(raised),
                }
            }
            Builtin::GetAttr => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 2, 3)?;
                let attr = self.attribute_name(&args.args[1], name)?;
                match (self.get_attr(&args.args[0], &attr), args.args.get(2)) {
                    (Err(raised), Some(default)) if raised.is_instance_of("AttributeError") => {
                        Ok(default.clone())
                    }
                    (result, _) => result,
                }
            }
            Builtin::SetAttr => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 3, 3)?;
                let attr = self.attribute_name(&args.args[1], name)?;
                self.set_attr(&args.args[0], &attr, args.args[2].clone())?;
                Ok(Value::None)
            }
            Builtin::Abs => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let value = &args.args[0];
                if let Value::Complex(c) = value {
                    return Ok(Value::Float(c.abs()));
                }
                match Number::of(value) {
                    Some(Number::Int(i)) => {
                        i.checked_abs().map(Value::Int).ok_or_else(|| self.overflow())
                    }
                    Some(Number::Float(f)) => Ok(Value::Float(f.abs())),
                    None => self.call_dunder(value, "__abs__", Vec::new())?.ok_or_else(|| {
                        self.type_error(format!(
                            "bad operand type for abs(): '{}'",
                            value.type_name()
                        ))
                    }),
                }
            }
            Builtin::Min | Builtin::Max => self.builtin_extreme(builtin, args),
            Builtin::Sum => {
                let start = args.take_keyword("start");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 2)?;
                let mut total = start
                    .or_else(|| args.args.get(1).cloned())
                    .unwrap_or(Value::Int(0));
                if let Value::Str(_) = total {
                    return Err(
                        self.type_error("sum() can't sum strings [use ''.join(seq) instead]")
                    );
                }
                for item in self.iterate(&args.args[0])? {
                    total = self.binary_op(nbi_ir::BinaryOp::Add, &total, &item)?;
                }
                Ok(total)
            }
            Builtin::Sorted => {
                let key = args.take_keyword("key");
                let reverse = args.take_keyword("reverse");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let mut items = self.iterate(&args.args[0])?;
                let reverse = match reverse {
                    Some(flag) => self.truthy(&flag)?,
                    None => false,
                };
                self.sort_values(&mut items, key.as_ref(), reverse)?;
                Ok(Value::list(items))
            }
            Builtin::Reversed => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                if let Some(result) = self.call_dunder(&args.args[0], "__reversed__", Vec::new())? {
                    return Ok(result);
                }
                if let Value::Instance(instance) = &args.args[0] {
                    if user_method(&instance.class, "__getitem__").is_none() {
                        return Err(self.type_error(format!(
                            "'{}' object is not reversible",
                            instance.class.name
                        )));
                    }
                }
                let mut items = self.iterate(&args.args[0])?;
                items.reverse();
                Ok(Value::list(items))
            }
            Builtin::Enumerate => {
                let start = args.take_keyword("start");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 2)?;
                let start = match start.or_else(|| args.args.get(1).cloned()) {
                    Some(start) => self.expect_int(&start, "'start' must be an integer")?,
                    None => 0,
                };
                let items = self.iterate(&args.args[0])?;
                let mut pairs = Vec::with_capacity(items.len());
                let mut index = start;
                for item in items {
                    pairs.push(Value::tuple(vec![Value::Int(index), item]));
                    index = index.checked_add(1).ok_or_else(|| self.overflow())?;
                }
                Ok(Value::list(pairs))
            }
            Builtin::Zip => {
                self.no_keywords(name, &args)?;
                let columns = args
                    .args
                    .iter()
                    .map(|iterable| self.iterate(iterable))
                    .collect::<EvalResult<Vec<_>>>()?;
                let len = columns.iter().map(Vec::len).min().unwrap_or(0);
                let rows = (0..len)
                    .map(|i| Value::tuple(columns.iter().map(|column| column[i].clone()).collect()))
                    .collect();
                Ok(Value::list(rows))
            }
            Builtin::Map => {
                self.no_keywords(name, &args)?;
                if args.args.len() < 2 {
                    return Err(self.type_error("map() must have at least two arguments."));
                }
                let function = &args.args[0];
                let columns = args.args[1..]
                    .iter()
                    .map(|iterable| self.iterate(iterable))
                    .collect::<EvalResult<Vec<_>>>()?;
                let len = columns.iter().map(Vec::len).min().unwrap_or(0);
                let mut results = Vec::with_capacity(len);
                for i in 0..len {
                    let call_args = columns.iter().map(|column| column[i].clone()).collect();
                    results.push(self.call(function, call_args)?);
                }
                Ok(Value::list(results))
            }
            Builtin::Filter => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 2, 2)?;
                let predicate = &args.args[0];
                let mut kept = Vec::new();
                for item in self.iterate(&args.args[1])? {
                    let keep = if predicate.is_none() {
                        self.truthy(&item)?
                    } else {
                        let verdict = self.call(predicate, vec![item.clone()])?;
                        self.truthy(&verdict)?
                    };
                    if keep {
                        kept.push(item);
                    }
                }
                Ok(Value::list(kept))
            }
            Builtin::Any | Builtin::All => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let want = builtin == Builtin::Any;
                for item in self.iterate(&args.args[0])? {
                    if self.truthy(&item)? == want {
                        return Ok(Value::Bool(want));
                    }
                }
                Ok(Value::Bool(!want))
            }
            Builtin::Round => self.builtin_round(args),
            Builtin::Id => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                Ok(Value::Int(self.id_of(&args.args[0])))
            }
            Builtin::Callable => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                Ok(Value::Bool(match &args.args[0] {
                    Value::Function(_)
                    | Value::Builtin(_)
                    | Value::BoundMethod(_)
                    | Value::Class(_)
                    | Value::StaticMethod(_) => true,
                    Value::Instance(instance) => instance.class.lookup("__call__").is_some(),
                    _ => false,
                }))
            }
            Builtin::Chr => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let code = self.index_int(&args.args[0])?;
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .map(|c| Value::from(c.to_string()))
                    .ok_or_else(|| self.value_error("chr() arg not in range(0x110000)"))
            }
            Builtin::Ord => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let Value::Str(text) = &args.args[0] else {
                    return Err(self.type_error(format!(
                        "ord() expected string of length 1, but {} found",
                        args.args[0].type_name()
                    )));
                };
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                    _ => Err(self.type_error(format!(
                        "ord() expected a character, but string of length {} found",
                        text.chars().count()
                    ))),
                }
            }
            Builtin::Super => {
                self.no_keywords(name, &args)?;
                match args.args.as_slice() {
                    [Value::Class(class), receiver] => self.make_super(class, receiver.clone()),
                    [] => Err(self.runtime_error("super(): no arguments")),
                    _ => Err(self.type_error("super() argument 1 must be a type")),
                }
            }
            Builtin::StaticMethod | Builtin::ClassMethod => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 1)?;
                let function = Rc::new(args.args[0].clone());
                Ok(if builtin == Builtin::StaticMethod {
                    Value::StaticMethod(function)
                } else {
                    Value::ClassMethod(function)
                })
            }
            Builtin::Property => {
                let fget = args.take_keyword("fget").or_else(|| args.args.first().cloned());
                let fset = args.take_keyword("fset").or_else(|| args.args.get(1).cloned());
                args.take_keyword("fdel");
                args.take_keyword("doc");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 4)?;
                Ok(Value::Property(Rc::new(Property {
                    fget: fget.filter(|f| !f.is_none()),
                    fset: fset.filter(|f| !f.is_none()),
                })))
            }
            Builtin::Next => self.builtin_next(args),
            Builtin::GetIpython => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::Session(Rc::clone(self.runtime.session())))
            }
            _ => Err(self.not_callable(&Value::Builtin(builtin))),
        }
    }

    /// `next(iterator[, default])` over generators and `__next__` objects.
    fn builtin_next(&self, args: CallArgs) -> EvalResult {
        self.no_keywords("next", &args)?;
        self.arity("next", &args.args, 1, 2)?;
        let default = args.args.get(1).cloned();
        let iterator = &args.args[0];
        let exhausted = |default: Option<Value>| {
            default
                .ok_or_else(|| self.exception_with_args(ExceptionKind::StopIteration, Vec::new()))
        };
        match iterator {
            Value::Generator(generator) if !generator.is_async => {
                match self.generator_next(generator)? {
                    Some(item) => Ok(item),
                    None => exhausted(default),
                }
            }
            Value::Instance(instance) if user_method(&instance.class, "__next__").is_some() => {
                match self.call_dunder(iterator, "__next__", Vec::new()) {
                    Ok(Some(item)) => Ok(item),
                    Ok(None) => exhausted(default),
                    Err(raised) if raised.is_instance_of("StopIteration") && default.is_some() => {
                        exhausted(default)
                    }
                    Err(raised) => Err(raised),
                }
            }
            other => Err(self.type_error(format!(
                "'{}' object is not an iterator",
                other.type_name()
            ))),
        }
    }

    fn builtin_print(&self, mut args: CallArgs) -> EvalResult {
        let separator = self.optional_text(args.take_keyword("sep"), " ", "sep")?;
        let end = self.optional_text(args.take_keyword("end"), "\n", "end")?;
        args.take_keyword("flush");
        if let Some(file) = args.take_keyword("file") {
            if !file.is_none() {
                return Err(self.type_error("print() file argument is not supported"));
            }
        }
        self.no_extra_keywords("print", &args)?;
        let parts = args
            .args
            .iter()
            .map(|value| self.to_str(value))
            .collect::<EvalResult<Vec<_>>>()?;
        let mut text = parts.join(&separator);
        text.push_str(&end);
        self.runtime.output().print(&text);
        Ok(Value::None)
    }

    fn optional_text(
        &self,
        value: Option<Value>,
        default: &str,
        keyword: &str,
    ) -> EvalResult<String> {
        match value {
            None | Some(Value::None) => Ok(default.to_owned()),
            Some(Value::Str(s)) => Ok(s.to_string()),
            Some(other) => Err(self.type_error(format!(
                "{keyword} must be None or a string, not {}",
                other.type_name()
            ))),
        }
    }

    fn attribute_name(&self, value: &Value, function: &str) -> EvalResult<String> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(self.type_error(format!(
                "{function}(): attribute name must be string, not '{}'",
                other.type_name()
            ))),
        }
    }

    fn isinstance(&self, value: &Value, classinfo: &Value) -> EvalResult<bool> {
        match classinfo {
            Value::Class(class) => Ok(self.is_instance(value, class)),
            Value::Tuple(classes) => {
                for class in classes.iter() {
                    if self.isinstance(value, class)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Err(self.type_error(
                "isinstance() arg 2 must be a type, a tuple of types, or a union",
            )),
        }
    }

    fn issubclass(&self, class: &Rc<ClassObject>, classinfo: &Value) -> EvalResult<bool> {
        match classinfo {
            Value::Class(other) => Ok(class.is_subclass_of(other)),
            Value::Tuple(classes) => {
                for other in classes.iter() {
                    if self.issubclass(class, other)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Err(self.type_error(
                "issubclass() arg 2 must be a class, a tuple of classes, or a union",
            )),
        }
    }

    /// `min`/`max` over one iterable or several arguments.
    fn builtin_extreme(&self, builtin: Builtin, mut args: CallArgs) -> EvalResult {
        let name = builtin.name();
        let key = args.take_keyword("key").filter(|key| !key.is_none());
        let default = args.take_keyword("default");
        self.no_extra_keywords(name, &args)?;
        let items = match args.args.as_slice() {
            [] => {
                return Err(self.type_error(format!(
                    "{name} expected at least 1 argument, got 0"
                )))
            }
            [iterable] => self.iterate(iterable)?,
            _ => {
                if default.is_some() {
                    return Err(self.type_error(format!(
                        "Cannot specify a default for {name}() with multiple positional arguments"
                    )));
                }
                args.args.clone()
            }
        };
        let mut best: Option<(Value, Value)> = None;
        for item in items {
            let rank = match &key {
                Some(key) => self.call(key, vec![item.clone()])?,
                None => item.clone(),
            };
            let better = match &best {
                None => true,
                Some((best_rank, _)) if builtin == Builtin::Min => {
                    self.compare(nbi_ir::CmpOp::Lt, &rank, best_rank)?
                }
                Some((best_rank, _)) => self.compare(nbi_ir::CmpOp::Gt, &rank, best_rank)?,
            };
            if better {
                best = Some((rank, item));
            }
        }
        match (best, default) {
            (Some((_, item)), _) => Ok(item),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(self.value_error(format!("{name}() iterable argument is empty"))),
        }
    }

    fn builtin_round(&self, mut args: CallArgs) -> EvalResult {
        let ndigits = args.take_keyword("ndigits");
        self.no_extra_keywords("round", &args)?;
        self.arity("round", &args.args, 1, 2)?;
        let ndigits = match ndigits.or_else(|| args.args.get(1).cloned()) {
            None | Some(Value::None) => None,
            Some(n) => Some(self.expect_int(&n, "'ndigits' must be an integer")?),
        };
        let value = &args.args[0];
        match (Number::of(value), ndigits) {
            (Some(Number::Int(i)), None) => Ok(Value::Int(i)),
            (Some(Number::Int(i)), Some(n)) if n >= 0 => Ok(Value::Int(i)),
            (Some(Number::Int(i)), Some(n)) => {
                let exponent = u32::try_from(-n).map_err(|_| self.overflow())?;
                let Some(scale) = 10i64.checked_pow(exponent) else {
                    return Ok(Value::Int(0));
                };
                let quotient = i.div_euclid(scale);
                let remainder = i.rem_euclid(scale);
                let twice = remainder.saturating_mul(2);
                let rounded = if twice > scale || (twice == scale && quotient % 2 != 0) {
                    quotient + 1
                } else {
                    quotient
                };
                rounded.checked_mul(scale).map(Value::Int).ok_or_else(|| self.overflow())
            }
            (Some(Number::Float(f)), None) => {
                if f.is_nan() {
                    return Err(self.value_error("cannot convert float NaN to integer"));
                }
                if f.is_infinite() {
                    return Err(self.exception(
                        ExceptionKind::OverflowError,
                        "cannot convert float infinity to integer",
                    ));
                }
                let rounded = f.round_ties_even();
                if rounded.abs() >= 9.223_372_036_854_775_807e18 {
                    return Err(self.overflow());
                }
                Ok(Value::Int(float_to_int(rounded)))
            }
            (Some(Number::Float(f)), Some(n)) => Ok(Value::Float(round_float(f, n))),
            (None, _) => match self.call_dunder(value, "__round__", args.args[1..].to_vec())? {
                Some(result) => Ok(result),
                None => Err(self.type_error(format!(
                    "type {} doesn't define __round__ method",
                    value.type_name()
                ))),
            },
        }
    }

    /// Stable identity number; equal scalars share one.
    fn id_of(&self, value: &Value) -> i64 {
        if let Some(address) = value.identity() {
            return i64::try_from(address).unwrap_or(i64::MAX);
        }
        let mut hasher = FxHasher::default();
        if let Some(key) = value.hash_key() {
            key.hash(&mut hasher);
        }
        value.type_name().hash(&mut hasher);
        i64::try_from(hasher.finish() >> 1).unwrap_or_default()
    }

    /// Call a builtin class: `int("3")`, `list(x)`, `range(5)`.
    pub(crate) fn construct_builtin(&self, tag: TypeTag, mut args: CallArgs) -> EvalResult {
        let name = tag.name();
        match tag {
            TypeTag::Object => {
                self.no_keywords(name, &args)?;
                if !args.args.is_empty() {
                    return Err(self.type_error("object() takes no arguments"));
                }
                Ok(Value::Instance(Rc::new(Instance::new(Rc::clone(
                    self.runtime.type_class(TypeTag::Object),
                )))))
            }
            TypeTag::Type => {
                self.no_keywords(name, &args)?;
                match args.args.as_slice() {
                    [value] => Ok(Value::Class(self.runtime.class_of(value))),
                    [Value::Str(class_name), Value::Tuple(bases), Value::Dict(body)] => {
                        self.create_type(class_name, bases, &body.borrow())
                    }
                    _ => Err(self.type_error("type() takes 1 or 3 arguments")),
                }
            }
            TypeTag::Int => {
                let base = args.take_keyword("base");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 2)?;
                let base = base.or_else(|| args.args.get(1).cloned());
                match args.args.first() {
                    None => Ok(Value::Int(0)),
                    Some(value) => self.to_int(value, base.as_ref()),
                }
            }
            TypeTag::Float => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 1)?;
                match args.args.first() {
                    None => Ok(Value::Float(0.0)),
                    Some(value) => self.to_float(value),
                }
            }
            TypeTag::Str => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 1)?;
                match args.args.first() {
                    None => Ok(Value::from("")),
                    Some(value) => Ok(Value::from(self.to_str(value)?)),
                }
            }
            TypeTag::Bool => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 1)?;
                match args.args.first() {
                    None => Ok(Value::Bool(false)),
                    Some(value) => self.truthy(value).map(Value::Bool),
                }
            }
            TypeTag::List | TypeTag::Tuple => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 1)?;
                let items = match args.args.first() {
                    None => Vec::new(),
                    Some(iterable) => self.iterate(iterable)?,
                };
                Ok(if tag == TypeTag::List {
                    Value::list(items)
                } else {
                    Value::tuple(items)
                })
            }
            TypeTag::Dict => {
                self.arity(name, &args.args, 0, 1)?;
                let mut dict = DictValue::new();
                if let Some(source) = args.args.first() {
                    self.update_dict(&mut dict, source)?;
                }
                for (key, value) in std::mem::take(&mut args.keywords) {
                    dict.insert(
                        crate::value::HashKey::Str(key.as_str().into()),
                        Value::from(key),
                        value,
                    );
                }
                Ok(Value::dict(dict))
            }
            TypeTag::Range => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 1, 3)?;
                let bounds = args
                    .args
                    .iter()
                    .map(|bound| self.index_int(bound))
                    .collect::<EvalResult<Vec<_>>>()?;
                let (start, stop, step) = match bounds[..] {
                    [stop] => (0, stop, 1),
                    [start, stop] => (start, stop, 1),
                    [start, stop, step, ..] => (start, stop, step),
                    [] => (0, 0, 1),
                };
                if step == 0 {
                    return Err(self.value_error("range() arg 3 must not be zero"));
                }
                Ok(Value::Range(Rc::new(RangeValue { start, stop, step })))
            }
            TypeTag::Complex => {
                let real = args.take_keyword("real");
                let imag = args.take_keyword("imag");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 2)?;
                let real = real.or_else(|| args.args.first().cloned());
                let imag = imag.or_else(|| args.args.get(1).cloned());
                let part = |value: Option<Value>, position: &str| match value {
                    None => Ok(Complex::new(0.0, 0.0)),
                    Some(value) => complex_of(&value).ok_or_else(|| {
                        self.type_error(format!(
                            "complex() {position} argument must be a number, not '{}'",
                            value.type_name()
                        ))
                    }),
                };
                let (real, imag) = (part(real, "first")?, part(imag, "second")?);
                Ok(Value::Complex(Complex::new(real.re - imag.im, real.im + imag.re)))
            }
            TypeTag::Bytes => self.construct_bytes(args),
            TypeTag::Set => {
                self.no_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 1)?;
                Ok(Value::set(match args.args.first() {
                    None => Default::default(),
                    Some(iterable) => self.collect_set(iterable)?,
                }))
            }
            other => Err(self.type_error(format!("cannot create '{}' instances", other.name()))),
        }
    }

    /// `bytes()`, `bytes(n)`, `bytes(iterable_of_ints)` and
    /// `bytes(text, encoding)`.
    fn construct_bytes(&self, mut args: CallArgs) -> EvalResult {
        let encoding = args.take_keyword("encoding");
        let errors = args.take_keyword("errors");
        self.no_extra_keywords("bytes", &args)?;
        self.arity("bytes", &args.args, 0, 3)?;
        let rest: Vec<Value> = args.args.iter().skip(1).cloned().collect();
        let mut keywords = Vec::new();
        keywords.extend(encoding.map(|value| ("encoding".to_owned(), value)));
        keywords.extend(errors.map(|value| ("errors".to_owned(), value)));
        let Some(source) = args.args.first() else {
            return Ok(Value::bytes(Vec::new()));
        };
        if let Value::Str(text) = source {
            if rest.is_empty() && keywords.is_empty() {
                return Err(self.type_error("string argument without an encoding"));
            }
            return self.str_encode(text, CallArgs { args: rest, keywords });
        }
        if !rest.is_empty() || !keywords.is_empty() {
            return Err(self.type_error("encoding without a string argument"));
        }
        match source {
            Value::Bytes(bytes) => Ok(Value::Bytes(Rc::clone(bytes))),
            Value::Int(_) | Value::Bool(_) => {
                let count = self.index_int(source)?;
                let count =
                    usize::try_from(count).map_err(|_| self.value_error("negative count"))?;
                if count > MAX_REPEAT_LEN {
                    return Err(self.exception_with_args(ExceptionKind::MemoryError, Vec::new()));
                }
                Ok(Value::bytes(vec![0; count]))
            }
            iterable => {
                let bytes = self
                    .iterate(iterable)?
                    .iter()
                    .map(|item| {
                        let byte = self.index_int(item)?;
                        u8::try_from(byte)
                            .map_err(|_| self.value_error("bytes must be in range(0, 256)"))
                    })
                    .collect::<EvalResult<Vec<u8>>>()?;
                Ok(Value::bytes(bytes))
            }
        }
    }

    /// Insert the pairs of a dict or an iterable of pairs into `dict`.
    pub(crate) fn update_dict(&self, dict: &mut DictValue, source: &Value) -> EvalResult<()> {
        if let Value::Dict(other) = source {
            let entries: Vec<(Value, Value)> = other
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            for (key, value) in entries {
                let hash = self.hash_key_of(&key)?;
                dict.insert(hash, key, value);
            }
            return Ok(());
        }
        for (position, pair) in self.iterate(source)?.into_iter().enumerate() {
            let items = self.iterate(&pair).map_err(|_| {
                self.type_error(format!(
                    "cannot convert dictionary update sequence element #{position} to a sequence"
                ))
            })?;
            let [key, value] = <[Value; 2]>::try_from(items).map_err(|items| {
                self.value_error(format!(
                    "dictionary update sequence element #{position} has length {}; 2 is required",
                    items.len()
                ))
            })?;
            let hash = self.hash_key_of(&key)?;
            dict.insert(hash, key, value);
        }
        Ok(())
    }

    /// `int` or `bool` used where an index-like integer is required.
    pub(crate) fn index_int(&self, value: &Value) -> EvalResult<i64> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(self.type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                other.type_name()
            ))),
        }
    }

    fn to_int(&self, value: &Value, base: Option<&Value>) -> EvalResult {
        if let Some(base) = base {
            let Value::Str(text) = value else {
                return Err(self.type_error("int() can't convert non-string with explicit base"));
            };
            let radix = self.expect_int(base, "'base' must be an integer")?;
            let radix = u32::try_from(radix)
                .ok()
                .filter(|r| *r == 0 || (2..=36).contains(r))
                .ok_or_else(|| self.value_error("int() base must be >= 2 and <= 36, or 0"))?;
            return parse_int(text, radix).map(Value::Int).ok_or_else(|| {
                self.value_error(format!(
                    "invalid literal for int() with base {radix}: {}",
                    crate::runtime::str_repr(text)
                ))
            });
        }
        match value {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) => {
                if f.is_nan() {
                    return Err(self.value_error("cannot convert float NaN to integer"));
                }
                if f.is_infinite() {
                    return Err(self.exception(
                        ExceptionKind::OverflowError,
                        "cannot convert float infinity to integer",
                    ));
                }
                let truncated = f.trunc();
                if truncated.abs() >= 9.223_372_036_854_775_807e18 {
                    return Err(self.overflow());
                }
                Ok(Value::Int(float_to_int(truncated)))
            }
            Value::Str(text) => parse_int(text, 10).map(Value::Int).ok_or_else(|| {
                self.value_error(format!(
                    "invalid literal for int() with base 10: {}",
                    crate::runtime::str_repr(text)
                ))
            }),
            other => match self.call_dunder(other, "__int__", Vec::new())? {
                Some(result) => Ok(result),
                None => Err(self.type_error(format!(
                    "int() argument must be a string, a bytes-like object or a real number, not '{}'",
                    other.type_name()
                ))),
            },
        }
    }

    fn to_float(&self, value: &Value) -> EvalResult {
        match value {
            Value::Str(text) => parse_float(text).map(Value::Float).ok_or_else(|| {
                self.value_error(format!(
                    "could not convert string to float: {}",
                    crate::runtime::str_repr(text)
                ))
            }),
            other => match Number::of(other) {
                Some(number) => Ok(Value::Float(number.to_f64())),
                None => match self.call_dunder(other, "__float__", Vec::new())? {
                    Some(result) => Ok(result),
                    None => Err(self.type_error(format!(
                        "float() argument must be a string or a real number, not '{}'",
                        other.type_name()
                    ))),
                },
            },
        }
    }

    /// Three-argument `type(name, bases, dict)`.
    fn create_type(&self, name: &str, bases: &[Value], body: &DictValue) -> EvalResult {
        let mut base_classes = Vec::with_capacity(bases.len());
        for base in bases {
            match base {
                Value::Class(class) if class.builtin_base().is_none() => {
                    base_classes.push(Rc::clone(class))
                }
                other => {
                    return Err(self.type_error(format!(
                        "type() bases must be classes without builtin bases, not '{}'",
                        other.type_name()
                    )))
                }
            }
        }
        if base_classes.is_empty() {
            base_classes.push(Rc::clone(self.runtime.type_class(TypeTag::Object)));
        }
        let namespace = Namespace::new();
        for (key, value) in body.iter() {
            let Some(key) = key.as_str() else {
                return Err(self.type_error("type() dict keys must be strings"));
            };
            namespace.set(key, value.clone());
        }
        let module = namespace
            .get("__module__")
            .and_then(|m| m.as_str().map(str::to_owned))
            .unwrap_or_else(|| "__main__".to_owned());
        let class = ClassObject::new(name, name, module, base_classes, namespace).ok_or_else(|| {
            self.type_error("Cannot create a consistent method resolution order (MRO)")
        })?;
        Ok(Value::Class(class))
    }
}
