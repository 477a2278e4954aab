//! Arithmetic, bitwise, comparison and containment operators.

use std::cmp::Ordering;

use nbi_ir::{BinaryOp, CmpOp, UnaryOp};

use super::convert::{complex_of, Number};
use super::{EvalResult, Interpreter};
use crate::exception::ExceptionKind;
use crate::value::{Complex, DictValue, Value};

/// Largest item count a repeated sequence, or a zero-filled `bytes`, may
/// have.
pub(crate) const MAX_REPEAT_LEN: usize = 1 << 26;

fn holds(op: CmpOp, ordering: Ordering) -> bool {
    match op {
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::LtE => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::GtE => ordering != Ordering::Less,
        _ => false,
    }
}

/// Dunder tried on the left operand of an ordering comparison, and its
/// reflection tried on the right.
fn ordering_dunders(op: CmpOp) -> (&'static str, &'static str) {
    match op {
        CmpOp::Lt => ("__lt__", "__gt__"),
        CmpOp::LtE => ("__le__", "__ge__"),
        CmpOp::Gt => ("__gt__", "__lt__"),
        _ => ("__ge__", "__le__"),
    }
}

/// Why a sequence repetition was refused.
#[derive(Debug, PartialEq)]
enum RepeatError {
    /// The item count does not fit in a `usize`.
    Overflow,
    /// The item count is past [`MAX_REPEAT_LEN`].
    TooLarge,
}

fn repeat<T: Clone>(items: &[T], times: i64) -> Result<Vec<T>, RepeatError> {
    if items.is_empty() || times <= 0 {
        return Ok(Vec::new());
    }
    let times = usize::try_from(times).map_err(|_| RepeatError::Overflow)?;
    let len = items.len().checked_mul(times).ok_or(RepeatError::Overflow)?;
    if len > MAX_REPEAT_LEN {
        return Err(RepeatError::TooLarge);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    Ok(out)
}

fn complex_mul(a: Complex, b: Complex) -> Complex {
    Complex::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re)
}

/// `None` when `b` is zero.
fn complex_div(a: Complex, b: Complex) -> Option<Complex> {
    let denominator = b.re * b.re + b.im * b.im;
    if denominator == 0.0 {
        return None;
    }
    Some(Complex::new(
        (a.re * b.re + a.im * b.im) / denominator,
        (a.im * b.re - a.re * b.im) / denominator,
    ))
}

impl Interpreter<'_> {
    pub(crate) fn binary_op(&self, op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
        if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
            match op {
                BinaryOp::BitAnd => return Ok(Value::Bool(a & b)),
                BinaryOp::BitOr => return Ok(Value::Bool(a | b)),
                BinaryOp::BitXor => return Ok(Value::Bool(a ^ b)),
                _ => {}
            }
        }
        if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
            let result = match (a, b) {
                (Number::Int(a), Number::Int(b)) => self.int_op(op, a, b)?,
                (a, b) => self.float_op(op, a.to_f64(), b.to_f64())?,
            };
            if let Some(result) = result {
                return Ok(result);
            }
        } else if let Some(result) = self.complex_op(op, left, right)? {
            return Ok(result);
        } else if let Some(result) = self.sequence_op(op, left, right)? {
            return Ok(result);
        }
        if let Some(result) = self.call_dunder(left, op.dunder(), vec![right.clone()])? {
            return Ok(result);
        }
        let reflected = format!("__r{}", &op.dunder()[2..]);
        if let Some(result) = self.call_dunder(right, &reflected, vec![left.clone()])? {
            return Ok(result);
        }
        if op == BinaryOp::Add {
            if let Some(kind @ ("str" | "list" | "tuple")) = left.type_tag().map(|tag| tag.name()) {
                return Err(self.type_error(format!(
                    "can only concatenate {kind} (not \"{}\") to {kind}",
                    right.type_name()
                )));
            }
        }
        let symbol = match op {
            BinaryOp::Pow => "** or pow()",
            other => other.as_symbol(),
        };
        Err(self.type_error(format!(
            "unsupported operand type(s) for {symbol}: '{}' and '{}'",
            left.type_name(),
            right.type_name()
        )))
    }

    /// `None` when the operator is not defined for ints.
    fn int_op(&self, op: BinaryOp, a: i64, b: i64) -> EvalResult<Option<Value>> {
        let overflow = || self.overflow();
        let value = match op {
            BinaryOp::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
            BinaryOp::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
            BinaryOp::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(self.zero_division("division by zero"));
                }
                return self.float_op(op, Number::Int(a).to_f64(), Number::Int(b).to_f64());
            }
            BinaryOp::FloorDiv => {
                if b == 0 {
                    return Err(self.zero_division("integer division or modulo by zero"));
                }
                let quotient = a.checked_div(b).ok_or_else(overflow)?;
                let adjust = a % b != 0 && ((a < 0) != (b < 0));
                Value::Int(if adjust { quotient - 1 } else { quotient })
            }
            BinaryOp::Mod => {
                if b == 0 {
                    return Err(self.zero_division("integer modulo by zero"));
                }
                let remainder = a.checked_rem(b).ok_or_else(overflow)?;
                let adjust = remainder != 0 && ((remainder < 0) != (b < 0));
                Value::Int(if adjust { remainder + b } else { remainder })
            }
            BinaryOp::Pow => {
                if b < 0 {
                    return self.float_op(op, Number::Int(a).to_f64(), Number::Int(b).to_f64());
                }
                let exponent = u32::try_from(b).map_err(|_| overflow())?;
                Value::Int(a.checked_pow(exponent).ok_or_else(overflow)?)
            }
            BinaryOp::BitAnd => Value::Int(a & b),
            BinaryOp::BitOr => Value::Int(a | b),
            BinaryOp::BitXor => Value::Int(a ^ b),
            BinaryOp::LShift => {
                if b < 0 {
                    return Err(self.value_error("negative shift count"));
                }
                if a == 0 {
                    Value::Int(0)
                } else {
                    let shift = u32::try_from(b).ok().filter(|s| *s < 64).ok_or_else(overflow)?;
                    let shifted = a << shift;
                    if shifted >> shift != a {
                        return Err(overflow());
                    }
                    Value::Int(shifted)
                }
            }
            BinaryOp::RShift => {
                if b < 0 {
                    return Err(self.value_error("negative shift count"));
                }
                let shift = u32::try_from(b.min(63)).unwrap_or(63);
                Value::Int(a >> shift)
            }
            BinaryOp::MatMul => return Ok(None),
        };
        Ok(Some(value))
    }

    fn float_op(&self, op: BinaryOp, a: f64, b: f64) -> EvalResult<Option<Value>> {
        let value = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return Err(self.zero_division("float division by zero"));
                }
                a / b
            }
            BinaryOp::FloorDiv => {
                if b == 0.0 {
                    return Err(self.zero_division("float floor division by zero"));
                }
                (a / b).floor()
            }
            BinaryOp::Mod => {
                if b == 0.0 {
                    return Err(self.zero_division("float modulo"));
                }
                let remainder = a % b;
                if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                    remainder + b
                } else {
                    remainder
                }
            }
            BinaryOp::Pow => {
                if a == 0.0 && b < 0.0 {
                    return Err(self.zero_division("0.0 cannot be raised to a negative power"));
                }
                if a < 0.0 && b.fract() != 0.0 {
                    return Err(self.value_error("math domain error"));
                }
                let result = a.powf(b);
                if result.is_infinite() && a.is_finite() && b.is_finite() {
                    return Err(self.exception(
                        ExceptionKind::OverflowError,
                        "(34, 'Numerical result out of range')",
                    ));
                }
                result
            }
            BinaryOp::MatMul
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::LShift
            | BinaryOp::RShift => return Ok(None),
        };
        Ok(Some(Value::Float(value)))
    }

    /// Arithmetic with at least one complex operand; `None` for anything
    /// else.
    fn complex_op(&self, op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Option<Value>> {
        if !matches!(left, Value::Complex(_)) && !matches!(right, Value::Complex(_)) {
            return Ok(None);
        }
        let (Some(a), Some(b)) = (complex_of(left), complex_of(right)) else {
            return Ok(None);
        };
        let value = match op {
            BinaryOp::Add => Complex::new(a.re + b.re, a.im + b.im),
            BinaryOp::Sub => Complex::new(a.re - b.re, a.im - b.im),
            BinaryOp::Mul => complex_mul(a, b),
            BinaryOp::Div => {
                complex_div(a, b).ok_or_else(|| self.zero_division("complex division by zero"))?
            }
            BinaryOp::Pow => self.complex_pow(a, b)?,
            _ => return Ok(None),
        };
        Ok(Some(Value::Complex(value)))
    }

    fn complex_pow(&self, base: Complex, exponent: Complex) -> EvalResult<Complex> {
        if exponent.re == 0.0 && exponent.im == 0.0 {
            return Ok(Complex::new(1.0, 0.0));
        }
        if base.re == 0.0 && base.im == 0.0 {
            if exponent.im != 0.0 || exponent.re < 0.0 {
                return Err(self.zero_division("0.0 to a negative or complex power"));
            }
            return Ok(Complex::new(0.0, 0.0));
        }
        let small_integral =
            exponent.im == 0.0 && exponent.re.fract() == 0.0 && exponent.re.abs() <= 100.0;
        let result = if small_integral {
            let mut result = Complex::new(1.0, 0.0);
            let mut remaining = exponent.re.abs();
            while remaining >= 1.0 {
                result = complex_mul(result, base);
                remaining -= 1.0;
            }
            if exponent.re < 0.0 {
                complex_div(Complex::new(1.0, 0.0), result)
                    .ok_or_else(|| self.zero_division("complex division by zero"))?
            } else {
                result
            }
        } else {
            let magnitude = base.abs();
            let angle = base.im.atan2(base.re);
            let mut length = magnitude.powf(exponent.re);
            let mut phase = angle * exponent.re;
            if exponent.im != 0.0 {
                length /= (angle * exponent.im).exp();
                phase += exponent.im * magnitude.ln();
            }
            Complex::new(length * phase.cos(), length * phase.sin())
        };
        if !(result.re.is_finite() && result.im.is_finite()) {
            return Err(self.exception(ExceptionKind::OverflowError, "complex exponentiation"));
        }
        Ok(result)
    }

    /// `items * times`, refusing results that cannot be allocated.
    fn repeated<T: Clone>(&self, items: &[T], times: i64) -> EvalResult<Vec<T>> {
        repeat(items, times).map_err(|err| match err {
            RepeatError::Overflow => {
                self.exception(ExceptionKind::OverflowError, "repeated sequence is too long")
            }
            RepeatError::TooLarge => {
                self.exception_with_args(ExceptionKind::MemoryError, Vec::new())
            }
        })
    }

    /// Operators on strings, bytes, lists, tuples, dicts and sets.
    fn sequence_op(&self, op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Option<Value>> {
        Ok(Some(match (op, left, right) {
            (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Value::from(format!("{a}{b}")),
            (BinaryOp::Add, Value::Bytes(a), Value::Bytes(b)) => {
                Value::bytes([&a[..], &b[..]].concat())
            }
            (BinaryOp::Add, Value::List(a), Value::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Value::list(items)
            }
            (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
                Value::tuple(a.iter().chain(b.iter()).cloned().collect())
            }
            (BinaryOp::Mul, sequence, count @ (Value::Int(_) | Value::Bool(_)))
            | (BinaryOp::Mul, count @ (Value::Int(_) | Value::Bool(_)), sequence) => {
                let times = self.expect_int(count, "can't multiply sequence by non-int")?;
                match sequence {
                    Value::Str(s) => {
                        let chars: Vec<char> = s.chars().collect();
                        let repeated = self.repeated(&chars, times)?;
                        Value::from(repeated.into_iter().collect::<String>())
                    }
                    Value::Bytes(b) => Value::bytes(self.repeated(b, times)?),
                    Value::List(items) => {
                        let items = items.borrow().clone();
                        Value::list(self.repeated(&items, times)?)
                    }
                    Value::Tuple(items) => Value::tuple(self.repeated(items, times)?),
                    _ => return Ok(None),
                }
            }
            (BinaryOp::Mod, Value::Str(template), args) => {
                Value::from(self.percent_format(template, args)?)
            }
            (BinaryOp::BitOr, Value::Dict(a), Value::Dict(b)) => {
                let mut merged = DictValue::new();
                for dict in [a, b] {
                    for (key, value) in dict.borrow().iter() {
                        let hash = self.hash_key_of(key)?;
                        merged.insert(hash, key.clone(), value.clone());
                    }
                }
                Value::dict(merged)
            }
            (BinaryOp::BitOr, Value::Set(a), Value::Set(b)) => {
                Value::set(a.borrow().union(&b.borrow()))
            }
            (BinaryOp::BitAnd, Value::Set(a), Value::Set(b)) => {
                Value::set(a.borrow().intersection(&b.borrow()))
            }
            (BinaryOp::Sub, Value::Set(a), Value::Set(b)) => {
                Value::set(a.borrow().difference(&b.borrow()))
            }
            (BinaryOp::BitXor, Value::Set(a), Value::Set(b)) => {
                Value::set(a.borrow().symmetric_difference(&b.borrow()))
            }
            _ => return Ok(None),
        }))
    }

    pub(crate) fn unary_op(&self, op: UnaryOp, operand: &Value) -> EvalResult {
        if op == UnaryOp::Not {
            return Ok(Value::Bool(!self.truthy(operand)?));
        }
        if let Value::Complex(c) = operand {
            match op {
                UnaryOp::Neg => return Ok(Value::Complex(Complex::new(-c.re, -c.im))),
                UnaryOp::Pos => return Ok(operand.clone()),
                _ => {}
            }
        }
        let result = match (op, Number::of(operand)) {
            (UnaryOp::Neg, Some(Number::Int(i))) => {
                Some(Value::Int(i.checked_neg().ok_or_else(|| self.overflow())?))
            }
            (UnaryOp::Neg, Some(Number::Float(f))) => Some(Value::Float(-f)),
            (UnaryOp::Pos, Some(Number::Int(i))) => Some(Value::Int(i)),
            (UnaryOp::Pos, Some(Number::Float(f))) => Some(Value::Float(f)),
            (UnaryOp::Invert, Some(Number::Int(i))) => Some(Value::Int(!i)),
            _ => None,
        };
        if let Some(result) = result {
            return Ok(result);
        }
        let dunder = match op {
            UnaryOp::Neg => "__neg__",
            UnaryOp::Pos => "__pos__",
            _ => "__invert__",
        };
        if let Some(result) = self.call_dunder(operand, dunder, Vec::new())? {
            return Ok(result);
        }
        Err(self.type_error(format!(
            "bad operand type for unary {}: '{}'",
            op.as_symbol(),
            operand.type_name()
        )))
    }

    /// `left op= right`. Lists extend and sets merge in place; instances
    /// may define the in-place dunder.
    pub(crate) fn inplace_op(&self, op: BinaryOp, left: Value, right: Value) -> EvalResult {
        if let (BinaryOp::Add, Value::List(items)) = (op, &left) {
            let extra = self.iterate(&right)?;
            items.borrow_mut().extend(extra);
            return Ok(left);
        }
        if let (BinaryOp::BitOr, Value::Set(set), Value::Set(other)) = (op, &left, &right) {
            let other = other.borrow().clone();
            set.borrow_mut().extend(&other);
            return Ok(left);
        }
        let dunder = format!("__i{}", &op.dunder()[2..]);
        if let Some(result) = self.call_dunder(&left, &dunder, vec![right.clone()])? {
            return Ok(result);
        }
        self.binary_op(op, &left, &right)
    }

    pub(crate) fn compare(&self, op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
        match op {
            CmpOp::Eq => self.values_equal(left, right),
            CmpOp::NotEq => match self.call_dunder(left, "__ne__", vec![right.clone()])? {
                Some(result) => self.truthy(&result),
                None => Ok(!self.values_equal(left, right)?),
            },
            CmpOp::Lt | CmpOp::LtE | CmpOp::Gt | CmpOp::GtE => self.ordering(op, left, right),
            CmpOp::In => self.contains(right, left),
            CmpOp::NotIn => Ok(!self.contains(right, left)?),
            CmpOp::Is => Ok(left.is(right)),
            CmpOp::IsNot => Ok(!left.is(right)),
        }
    }

    fn ordering(&self, op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
        if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
            return Ok(match (a, b) {
                (Number::Int(a), Number::Int(b)) => holds(op, a.cmp(&b)),
                (a, b) => a
                    .to_f64()
                    .partial_cmp(&b.to_f64())
                    .is_some_and(|ordering| holds(op, ordering)),
            });
        }
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(holds(op, a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                self.sequence_ordering(op, &a, &b)
            }
            (Value::Tuple(a), Value::Tuple(b)) => self.sequence_ordering(op, a, b),
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                Ok(match op {
                    CmpOp::LtE => a.is_subset(&b),
                    CmpOp::Lt => a.len() < b.len() && a.is_subset(&b),
                    CmpOp::GtE => b.is_subset(&a),
                    CmpOp::Gt => b.len() < a.len() && b.is_subset(&a),
                    _ => false,
                })
            }
            _ => {
                let (dunder, reflected) = ordering_dunders(op);
                if let Some(result) = self.call_dunder(left, dunder, vec![right.clone()])? {
                    return self.truthy(&result);
                }
                if let Some(result) = self.call_dunder(right, reflected, vec![left.clone()])? {
                    return self.truthy(&result);
                }
                Err(self.type_error(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    op.as_symbol(),
                    left.type_name(),
                    right.type_name()
                )))
            }
        }
    }

    /// Lexicographic comparison: the first unequal pair decides.
    fn sequence_ordering(&self, op: CmpOp, a: &[Value], b: &[Value]) -> EvalResult<bool> {
        for (x, y) in a.iter().zip(b) {
            if !self.values_equal(x, y)? {
                return self.ordering(op, x, y);
            }
        }
        Ok(holds(op, a.len().cmp(&b.len())))
    }

    /// `item in container`.
    pub(crate) fn contains(&self, container: &Value, item: &Value) -> EvalResult<bool> {
        match container {
            Value::Str(haystack) => match item {
                Value::Str(needle) => Ok(haystack.contains(&**needle)),
                other => Err(self.type_error(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.type_name()
                ))),
            },
            Value::List(items) => {
                let items = items.borrow().clone();
                self.any_equal(&items, item)
            }
            Value::Tuple(items) => self.any_equal(items, item),
            Value::Bytes(haystack) => match item {
                Value::Bytes(needle) if needle.is_empty() => Ok(true),
                Value::Bytes(needle) => {
                    Ok(haystack.windows(needle.len()).any(|window| window == &needle[..]))
                }
                Value::Int(_) | Value::Bool(_) => {
                    let byte = self.expect_int(item, "an integer is required")?;
                    let byte = u8::try_from(byte)
                        .map_err(|_| self.value_error("byte must be in range(0, 256)"))?;
                    Ok(haystack.contains(&byte))
                }
                other => Err(self.type_error(format!(
                    "a bytes-like object is required, not '{}'",
                    other.type_name()
                ))),
            },
            Value::Dict(dict) => {
                let hash = self.hash_key_of(item)?;
                Ok(dict.borrow().contains(&hash))
            }
            Value::Set(set) => {
                let hash = self.hash_key_of(item)?;
                Ok(set.borrow().contains(&hash))
            }
            Value::Range(range) => Ok(match Number::of(item) {
                Some(Number::Int(i)) => {
                    let offset = i128::from(i) - i128::from(range.start);
                    let step = i128::from(range.step);
                    let inside = if step > 0 {
                        i >= range.start && i < range.stop
                    } else {
                        i <= range.start && i > range.stop
                    };
                    inside && offset % step == 0
                }
                _ => self.any_equal(&self.iterate(container)?, item)?,
            }),
            Value::Instance(_) => {
                let contains = self.call_dunder(container, "__contains__", vec![item.clone()])?;
                if let Some(result) = contains {
                    return self.truthy(&result);
                }
                let items = self.iterate(container)?;
                self.any_equal(&items, item)
            }
            other => Err(self.type_error(format!(
                "argument of type '{}' is not iterable",
                other.type_name()
            ))),
        }
    }

    fn any_equal(&self, items: &[Value], item: &Value) -> EvalResult<bool> {
        for candidate in items {
            if candidate.is(item) || self.values_equal(candidate, item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Sort `items` in place with `<`, optionally through `key`.
    pub(crate) fn sort_values(
        &self,
        items: &mut Vec<Value>,
        key: Option<&Value>,
        reverse: bool,
    ) -> EvalResult<()> {
        let keys = match key {
            Some(key) if !key.is_none() => items
                .iter()
                .map(|item| self.call(key, vec![item.clone()]))
                .collect::<EvalResult<Vec<_>>>()?,
            _ => items.clone(),
        };
        let mut order: Vec<usize> = (0..items.len()).collect();
        self.merge_sort(&mut order, &keys, reverse)?;
        let sorted: Vec<Value> = order.into_iter().map(|i| items[i].clone()).collect();
        *items = sorted;
        Ok(())
    }

    /// Stable merge sort of `order` by `keys`. Comparison errors abort.
    fn merge_sort(&self, order: &mut Vec<usize>, keys: &[Value], reverse: bool) -> EvalResult<()> {
        if order.len() <= 1 {
            return Ok(());
        }
        let mut right = order.split_off(order.len() / 2);
        self.merge_sort(order, keys, reverse)?;
        self.merge_sort(&mut right, keys, reverse)?;
        let left = std::mem::take(order);
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            let (l, r) = (&keys[left[i]], &keys[right[j]]);
            let right_first = if reverse {
                self.ordering(CmpOp::Lt, l, r)?
            } else {
                self.ordering(CmpOp::Lt, r, l)?
            };
            if right_first {
                merged.push(right[j]);
                j += 1;
            } else {
                merged.push(left[i]);
                i += 1;
            }
        }
        merged.extend_from_slice(&left[i..]);
        merged.extend_from_slice(&right[j..]);
        *order = merged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{repeat, RepeatError, MAX_REPEAT_LEN};

    #[test]
    fn repeat_refuses_oversized_results_before_allocating() {
        assert_eq!(repeat(&[0], 10_000_000_000_000), Err(RepeatError::TooLarge));
        assert_eq!(repeat(&[0, 1, 2], i64::MAX), Err(RepeatError::Overflow));
        assert_eq!(repeat(&[7], 3), Ok(vec![7, 7, 7]));
    }

    #[test]
    fn repeat_of_nothing_is_empty() {
        assert_eq!(repeat::<u8>(&[], i64::MAX), Ok(Vec::new()));
        assert_eq!(repeat(&[1], -5), Ok(Vec::new()));
        let limit = i64::try_from(MAX_REPEAT_LEN).unwrap_or(i64::MAX);
        assert_eq!(repeat(&[1u8], limit).map(|v| v.len()), Ok(MAX_REPEAT_LEN));
    }
}
