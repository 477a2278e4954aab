//! Number and string rendering: `repr` of floats and strings, and the
//! format-spec mini-language used by f-strings and `str.format`.

use std::fmt::Write;

/// Shortest round-tripping representation, with the exponent rules of the
/// interactive shell (`1e+16`, `1.5e-05`, `3.0`).
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let abs = value.abs();
    if abs == 0.0 || (1e-4..1e16).contains(&abs) {
        let text = format!("{value}");
        if text.contains('.') {
            text
        } else {
            text + ".0"
        }
    } else {
        normalize_exponent(&format!("{value:e}"))
    }
}

/// Rewrite Rust's `1.5e-5` as `1.5e-05`.
fn normalize_exponent(text: &str) -> String {
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text.to_owned(),
    }
}

/// Quoted string literal: single quotes unless the text contains a single
/// quote and no double quote.
pub(crate) fn str_repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `b'...'` literal, quoted the way [`str_repr`] quotes text.
pub(crate) fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(char::from(quote));
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..=0x7e => out.push(char::from(b)),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(char::from(quote));
    out
}

/// `1j`, `(1+2j)`, `(-0-1.5j)`: the real part is omitted only when it is
/// positive zero, and integral parts drop their `.0`.
pub(crate) fn complex_repr(re: f64, im: f64) -> String {
    let imag = complex_part(im);
    if re == 0.0 && re.is_sign_positive() {
        return format!("{imag}j");
    }
    let sign = if imag.starts_with('-') { "" } else { "+" };
    format!("({}{sign}{imag}j)", complex_part(re))
}

fn complex_part(value: f64) -> String {
    let mut text = float_repr(value);
    if text.ends_with(".0") {
        text.truncate(text.len() - 2);
    }
    text
}

/// A value the mini-language knows how to format.
#[derive(Copy, Clone, Debug)]
pub(crate) enum FormatArg<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
}

#[derive(Default)]
struct Spec {
    fill: Option<char>,
    align: Option<char>,
    sign: Option<char>,
    alternate: bool,
    zero: bool,
    width: usize,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

fn parse_spec(spec: &str) -> Result<Spec, String> {
    let invalid = || format!("Invalid format specifier '{spec}'");
    let chars: Vec<char> = spec.chars().collect();
    let mut i = 0;
    let mut out = Spec::default();
    let is_align = |c: char| matches!(c, '<' | '>' | '^' | '=');
    if chars.len() >= 2 && is_align(chars[1]) {
        out.fill = Some(chars[0]);
        out.align = Some(chars[1]);
        i = 2;
    } else if chars.first().copied().is_some_and(is_align) {
        out.align = Some(chars[0]);
        i = 1;
    }
    if let Some(&c @ ('+' | '-' | ' ')) = chars.get(i) {
        out.sign = Some(c);
        i += 1;
    }
    if chars.get(i) == Some(&'#') {
        out.alternate = true;
        i += 1;
    }
    if chars.get(i) == Some(&'0') {
        out.zero = true;
        i += 1;
    }
    let start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    if i > start {
        let digits: String = chars[start..i].iter().collect();
        out.width = digits.parse().map_err(|_| invalid())?;
    }
    if let Some(&c @ (',' | '_')) = chars.get(i) {
        out.grouping = Some(c);
        i += 1;
    }
    if chars.get(i) == Some(&'.') {
        i += 1;
        let start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return Err("Format specifier missing precision".to_owned());
        }
        let digits: String = chars[start..i].iter().collect();
        out.precision = Some(digits.parse().map_err(|_| invalid())?);
    }
    if let Some(&c) = chars.get(i) {
        out.kind = Some(c);
        i += 1;
    }
    if i != chars.len() {
        return Err(invalid());
    }
    Ok(out)
}

/// Apply a format spec (the part after `:` in `{x:>10}`).
pub(crate) fn format_spec(arg: FormatArg<'_>, spec: &str) -> Result<String, String> {
    let spec = parse_spec(spec)?;
    match arg {
        FormatArg::Str(text) => format_str(text, &spec),
        FormatArg::Int(value) => format_int(value, &spec),
        FormatArg::Float(value) => format_float(value, &spec),
    }
}

fn format_str(text: &str, spec: &Spec) -> Result<String, String> {
    if !matches!(spec.kind, None | Some('s')) {
        return Err(format!(
            "Unknown format code '{}' for object of type 'str'",
            spec.kind.unwrap_or('s')
        ));
    }
    if spec.sign.is_some() {
        return Err("Sign not allowed in string format specifier".to_owned());
    }
    let body: String = match spec.precision {
        Some(n) => text.chars().take(n).collect(),
        None => text.to_owned(),
    };
    Ok(pad(String::new(), body, spec, '<'))
}

#[expect(clippy::cast_precision_loss, reason = "float presentation types on ints")]
fn format_int(value: i64, spec: &Spec) -> Result<String, String> {
    let magnitude = value.unsigned_abs();
    let (digits, prefix) = match spec.kind {
        None | Some('d' | 'n') => (group(&magnitude.to_string(), spec.grouping, 3), ""),
        Some('x') => (group(&format!("{magnitude:x}"), spec.grouping, 4), "0x"),
        Some('X') => (group(&format!("{magnitude:X}"), spec.grouping, 4), "0X"),
        Some('o') => (group(&format!("{magnitude:o}"), spec.grouping, 4), "0o"),
        Some('b') => (group(&format!("{magnitude:b}"), spec.grouping, 4), "0b"),
        Some('c') => {
            let c = u32::try_from(value)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| "%c arg not in range(0x110000)".to_owned())?;
            return Ok(pad(String::new(), c.to_string(), spec, '<'));
        }
        Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%') => {
            return format_float(value as f64, spec);
        }
        Some(other) => {
            return Err(format!(
                "Unknown format code '{other}' for object of type 'int'"
            ))
        }
    };
    if spec.precision.is_some() {
        return Err("Precision not allowed in integer format specifier".to_owned());
    }
    let mut sign = sign_text(value < 0, spec.sign);
    if spec.alternate {
        sign.push_str(prefix);
    }
    Ok(pad(sign, digits, spec, '>'))
}

fn format_float(value: f64, spec: &Spec) -> Result<String, String> {
    let negative = value.is_sign_negative() && !value.is_nan();
    let abs = value.abs();
    let body = if abs.is_nan() {
        "nan".to_owned()
    } else if abs.is_infinite() {
        "inf".to_owned()
    } else {
        match spec.kind {
            Some('f' | 'F') => fixed(abs, spec.precision.unwrap_or(6), spec),
            Some('e' | 'E') => {
                normalize_exponent(&format!("{:.*e}", spec.precision.unwrap_or(6), abs))
            }
            Some('g' | 'G') => general(abs, spec.precision.unwrap_or(6), spec.alternate, spec),
            Some('%') => fixed(abs * 100.0, spec.precision.unwrap_or(6), spec) + "%",
            None => match spec.precision {
                Some(precision) => general(abs, precision, true, spec),
                None => {
                    let text = float_repr(abs);
                    match spec.grouping {
                        Some(sep) => match text.split_once('.') {
                            Some((int, frac)) if !text.contains('e') => {
                                format!("{}.{frac}", group(int, Some(sep), 3))
                            }
                            _ => text,
                        },
                        None => text,
                    }
                }
            },
            Some(other) => {
                return Err(format!(
                    "Unknown format code '{other}' for object of type 'float'"
                ))
            }
        }
    };
    let body = if matches!(spec.kind, Some('F' | 'E' | 'G')) {
        body.to_uppercase()
    } else {
        body
    };
    Ok(pad(sign_text(negative, spec.sign), body, spec, '>'))
}

fn fixed(abs: f64, precision: usize, spec: &Spec) -> String {
    let text = format!("{abs:.precision$}");
    match (spec.grouping, text.split_once('.')) {
        (Some(sep), Some((int, frac))) => format!("{}.{frac}", group(int, Some(sep), 3)),
        (Some(sep), None) => group(&text, Some(sep), 3),
        (None, _) => text,
    }
}

/// `g` presentation: fixed or scientific depending on the exponent, with
/// trailing zeros removed unless `keep_point` asks for at least one
/// fractional digit.
fn general(abs: f64, precision: usize, keep_point: bool, spec: &Spec) -> String {
    let precision = precision.max(1);
    if abs == 0.0 {
        return if keep_point && spec.kind.is_none() {
            "0.0".to_owned()
        } else {
            "0".to_owned()
        };
    }
    let sci = format!("{:.*e}", precision - 1, abs);
    let exp: i64 = sci
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    let precision_i = i64::try_from(precision).unwrap_or(i64::MAX);
    if (-4..precision_i).contains(&exp) {
        let decimals = usize::try_from(precision_i - 1 - exp).unwrap_or(0);
        let text = fixed(abs, decimals, spec);
        let text = strip_zeros(&text, spec.alternate);
        if keep_point && spec.kind.is_none() && !text.contains('.') {
            text + ".0"
        } else {
            text
        }
    } else {
        let (mantissa, _) = sci.split_once('e').unwrap_or((&sci, ""));
        let mantissa = strip_zeros(mantissa, spec.alternate);
        normalize_exponent(&format!("{mantissa}e{exp}"))
    }
}

fn strip_zeros(text: &str, alternate: bool) -> String {
    if alternate || !text.contains('.') {
        return text.to_owned();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

fn sign_text(negative: bool, sign: Option<char>) -> String {
    match (negative, sign) {
        (true, _) => "-".to_owned(),
        (false, Some('+')) => "+".to_owned(),
        (false, Some(' ')) => " ".to_owned(),
        (false, _) => String::new(),
    }
}

/// Insert `sep` every `every` digits from the right.
fn group(digits: &str, sep: Option<char>, every: usize) -> String {
    let Some(sep) = sep else {
        return digits.to_owned();
    };
    let count = digits.chars().count();
    let mut out = String::with_capacity(digits.len() + count / every);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % every == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn pad(sign: String, body: String, spec: &Spec, default_align: char) -> String {
    let (fill, align) = if spec.zero && spec.align.is_none() {
        (spec.fill.unwrap_or('0'), '=')
    } else {
        (spec.fill.unwrap_or(' '), spec.align.unwrap_or(default_align))
    };
    let len = sign.chars().count() + body.chars().count();
    if len >= spec.width {
        return sign + &body;
    }
    let gap = spec.width - len;
    let fill_str = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();
    match align {
        '<' => sign + &body + &fill_str(gap),
        '^' => fill_str(gap / 2) + &sign + &body + &fill_str(gap - gap / 2),
        '=' => sign + &fill_str(gap) + &body,
        _ => fill_str(gap) + &sign + &body,
    }
}

#[cfg(test)]
mod tests;
