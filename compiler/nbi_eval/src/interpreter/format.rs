//! f-strings, `str.format` and printf-style `%` formatting.

use nbi_ir::FStringPart;

use super::convert::Number;
use super::{CallArgs, EvalResult, Frame, Interpreter};
use crate::runtime::{format_spec, FormatArg};
use crate::value::Value;

/// `ascii()` of a repr: non-ASCII characters become escapes.
fn ascii_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match u32::from(c) {
            code if code < 0x80 => out.push(c),
            code if code <= 0xff => out.push_str(&format!("\\x{code:02x}")),
            code if code <= 0xffff => out.push_str(&format!("\\u{code:04x}")),
            code => out.push_str(&format!("\\U{code:08x}")),
        }
    }
    out
}

/// One `%` conversion: `%(name)-08.3f`.
#[derive(Default)]
struct Conversion {
    key: Option<String>,
    left: bool,
    zero: bool,
    sign: Option<char>,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
    kind: char,
}

impl Conversion {
    /// Equivalent format-spec text for the `format()` mini-language.
    /// `kind` is `None` for the text conversions `%s`, `%r` and `%a`.
    fn spec(&self, kind: Option<char>) -> String {
        let mut spec = String::new();
        if self.left {
            spec.push('<');
        } else if kind.is_none() {
            spec.push('>');
        }
        if kind.is_some() {
            if let Some(sign) = self.sign {
                spec.push(sign);
            }
            if self.alternate {
                spec.push('#');
            }
            if self.zero && !self.left {
                spec.push('0');
            }
        }
        if let Some(width) = self.width {
            spec.push_str(&width.to_string());
        }
        if let (Some(precision), Some('f' | 'F' | 'e' | 'E' | 'g' | 'G')) = (self.precision, kind) {
            spec.push('.');
            spec.push_str(&precision.to_string());
        }
        if let Some(kind) = kind {
            spec.push(kind);
        }
        spec
    }
}

#[expect(clippy::cast_possible_truncation, reason = "%d truncates floats toward zero")]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

impl Interpreter<'_> {
    /// `format(value, spec)`.
    pub(crate) fn format_value(&self, value: &Value, spec: &str) -> EvalResult<String> {
        if let Some(result) = self.call_dunder(value, "__format__", vec![Value::from(spec)])? {
            return match result {
                Value::Str(s) => Ok(s.to_string()),
                other => Err(self.type_error(format!(
                    "__format__ must return a str, not {}",
                    other.type_name()
                ))),
            };
        }
        if spec.is_empty() {
            return self.to_str(value);
        }
        let arg = match value {
            Value::Int(i) => FormatArg::Int(*i),
            Value::Bool(b) => FormatArg::Int(i64::from(*b)),
            Value::Float(f) => FormatArg::Float(*f),
            Value::Str(s) => FormatArg::Str(s),
            other => {
                return Err(self.type_error(format!(
                    "unsupported format string passed to {}.__format__",
                    other.type_name()
                )))
            }
        };
        format_spec(arg, spec).map_err(|message| self.value_error(message))
    }

    fn convert_field(&self, value: Value, conversion: Option<char>) -> EvalResult {
        Ok(match conversion {
            Some('r') => Value::from(self.to_repr(&value)?),
            Some('s') => Value::from(self.to_str(&value)?),
            Some('a') => Value::from(ascii_escape(&self.to_repr(&value)?)),
            Some(other) => {
                return Err(self.value_error(format!(
                    "Unknown conversion specifier {other}"
                )))
            }
            None => value,
        })
    }

    pub(crate) fn format_fstring(&self, parts: &[FStringPart], frame: &Frame) -> EvalResult {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Field {
                    expr,
                    conversion,
                    spec,
                } => {
                    let value = self.eval(expr, frame)?;
                    let value = self.convert_field(value, *conversion)?;
                    out.push_str(&self.format_value(&value, spec.as_deref().unwrap_or(""))?);
                }
            }
        }
        Ok(Value::from(out))
    }

    /// `template.format(*args, **kwargs)`.
    pub(crate) fn str_format(&self, template: &str, call: &CallArgs) -> EvalResult<String> {
        let chars: Vec<char> = template.chars().collect();
        let mut out = String::new();
        let mut auto_index = Some(0usize);
        let mut manual = false;
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '{' if chars.get(i + 1) == Some(&'{') => {
                    out.push('{');
                    i += 2;
                }
                '}' if chars.get(i + 1) == Some(&'}') => {
                    out.push('}');
                    i += 2;
                }
                '}' => return Err(self.value_error("Single '}' encountered in format string")),
                '{' => {
                    let Some(close) = chars[i + 1..].iter().position(|&c| c == '}') else {
                        return Err(self.value_error("Single '{' encountered in format string"));
                    };
                    let field: String = chars[i + 1..i + 1 + close].iter().collect();
                    i += close + 2;
                    let (field, spec) = field.split_once(':').unwrap_or((field.as_str(), ""));
                    let (field, conversion) = match field.split_once('!') {
                        Some((field, conv)) => (field, conv.chars().next()),
                        None => (field, None),
                    };
                    let value = self.resolve_format_field(
                        field,
                        call,
                        &mut auto_index,
                        &mut manual,
                    )?;
                    let value = self.convert_field(value, conversion)?;
                    out.push_str(&self.format_value(&value, spec)?);
                }
                c => {
                    out.push(c);
                    i += 1;
                }
            }
        }
        Ok(out)
    }

    /// `0`, `name`, `name.attr` or `name[key]` inside a replacement field.
    fn resolve_format_field(
        &self,
        field: &str,
        call: &CallArgs,
        auto_index: &mut Option<usize>,
        manual: &mut bool,
    ) -> EvalResult {
        let head_end = field.find(['.', '[']).unwrap_or(field.len());
        let (head, mut rest) = field.split_at(head_end);
        let mut value = if head.is_empty() {
            if *manual {
                return Err(self.value_error(
                    "cannot switch from manual field specification to automatic field numbering",
                ));
            }
            let index = auto_index.unwrap_or_default();
            *auto_index = Some(index + 1);
            self.positional_field(call, index)?
        } else if let Ok(index) = head.parse::<usize>() {
            if auto_index.is_some_and(|next| next > 0) {
                return Err(self.value_error(
                    "cannot switch from automatic field numbering to manual field specification",
                ));
            }
            *manual = true;
            *auto_index = None;
            self.positional_field(call, index)?
        } else {
            call.keywords
                .iter()
                .find(|(key, _)| key == head)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| self.key_error(Value::from(head)))?
        };
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                value = self.get_attr(&value, &after[..end])?;
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let Some(end) = after.find(']') else {
                    return Err(self.value_error("Missing ']' in format string"));
                };
                let key = &after[..end];
                let key = key.parse::<i64>().map_or_else(|_| Value::from(key), Value::Int);
                value = self.get_item(&value, &key)?;
                rest = &after[end + 1..];
            } else {
                return Err(self.value_error(
                    "Only '.' or '[' may follow ']' in format field specifier",
                ));
            }
        }
        Ok(value)
    }

    fn positional_field(&self, call: &CallArgs, index: usize) -> EvalResult {
        call.args.get(index).cloned().ok_or_else(|| {
            self.index_error(format!(
                "Replacement index {index} out of range for positional args tuple"
            ))
        })
    }

    /// `template % args`.
    pub(crate) fn percent_format(&self, template: &str, args: &Value) -> EvalResult<String> {
        let positional: Vec<Value> = match args {
            Value::Tuple(items) => items.to_vec(),
            other => vec![other.clone()],
        };
        let mapping = matches!(args, Value::Dict(_));
        let mut next = 0usize;
        let mut out = String::new();
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let mut conversion = Conversion::default();
            if chars.peek() == Some(&'(') {
                chars.next();
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some(')') => break,
                        Some(c) => key.push(c),
                        None => return Err(self.value_error("incomplete format key")),
                    }
                }
                conversion.key = Some(key);
            }
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => conversion.left = true,
                    '0' => conversion.zero = true,
                    '+' => conversion.sign = Some('+'),
                    ' ' if conversion.sign.is_none() => conversion.sign = Some(' '),
                    ' ' => {}
                    '#' => conversion.alternate = true,
                    _ => break,
                }
                chars.next();
            }
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            conversion.width = digits.parse().ok();
            if chars.next_if_eq(&'.').is_some() {
                let mut digits = String::new();
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    digits.push(d);
                }
                conversion.precision = Some(digits.parse().unwrap_or(0));
            }
            let Some(kind) = chars.next() else {
                return Err(self.value_error("incomplete format"));
            };
            conversion.kind = kind;
            if kind == '%' {
                out.push('%');
                continue;
            }
            let value = match &conversion.key {
                Some(key) => {
                    if !mapping {
                        return Err(self.type_error("format requires a mapping"));
                    }
                    self.get_item(args, &Value::from(key.as_str()))?
                }
                None => {
                    let value = positional.get(next).cloned().ok_or_else(|| {
                        self.type_error("not enough arguments for format string")
                    })?;
                    next += 1;
                    value
                }
            };
            out.push_str(&self.percent_conversion(&conversion, &value)?);
        }
        if !mapping && next < positional.len() {
            return Err(self.type_error(
                "not all arguments converted during string formatting",
            ));
        }
        Ok(out)
    }

    fn percent_conversion(&self, conversion: &Conversion, value: &Value) -> EvalResult<String> {
        let text = match conversion.kind {
            's' => self.to_str(value)?,
            'r' => self.to_repr(value)?,
            'a' => ascii_escape(&self.to_repr(value)?),
            kind @ ('d' | 'i' | 'x' | 'X' | 'o' | 'c') => {
                let number = match value {
                    Value::Int(i) => *i,
                    Value::Bool(b) => i64::from(*b),
                    Value::Float(f) if kind != 'c' => truncate(*f),
                    Value::Str(s) if kind == 'c' && s.chars().count() == 1 => {
                        return Ok(s.to_string());
                    }
                    other => {
                        return Err(self.type_error(format!(
                            "%{kind} format: a real number is required, not {}",
                            other.type_name()
                        )))
                    }
                };
                let kind = if kind == 'i' { 'd' } else { kind };
                return format_spec(FormatArg::Int(number), &conversion.spec(Some(kind)))
                    .map_err(|message| self.value_error(message));
            }
            kind @ ('f' | 'F' | 'e' | 'E' | 'g' | 'G') => {
                let Some(number) = Number::of(value) else {
                    return Err(self.type_error(format!(
                        "must be real number, not {}",
                        value.type_name()
                    )));
                };
                return format_spec(FormatArg::Float(number.to_f64()), &conversion.spec(Some(kind)))
                    .map_err(|message| self.value_error(message));
            }
            other => {
                return Err(self.value_error(format!(
                    "unsupported format character '{other}'"
                )))
            }
        };
        let text: String = match conversion.precision {
            Some(precision) => text.chars().take(precision).collect(),
            None => text,
        };
        format_spec(FormatArg::Str(&text), &conversion.spec(None))
            .map_err(|message| self.value_error(message))
    }
}
