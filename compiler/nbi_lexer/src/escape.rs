//! Backslash escapes in non-raw string literals.

use crate::LexErrorKind;

/// Resolve the escapes in a string body.
///
/// Unknown escapes are kept verbatim, backslash included. A backslash
/// before a newline joins the lines.
pub fn unescape(body: &str) -> Result<String, LexErrorKind> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0C'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0B'),
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(code_point(value, esc)?);
            }
            'x' => out.push(hex_escape(&mut chars, 2, esc)?),
            'u' => out.push(hex_escape(&mut chars, 4, esc)?),
            'U' => out.push(hex_escape(&mut chars, 8, esc)?),
            'N' => return Err(LexErrorKind::UnsupportedEscape(esc)),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

/// Resolve the escapes in a bytes body.
///
/// Only ASCII may appear literally; `\x` and octal escapes produce single
/// bytes. `\u`, `\U` and `\N` mean nothing in bytes and are kept verbatim.
pub fn unescape_bytes(body: &str) -> Result<Vec<u8>, LexErrorKind> {
    if !body.is_ascii() {
        return Err(LexErrorKind::NonAsciiBytes);
    }
    let mut out = Vec::with_capacity(body.len());
    let mut bytes = body.bytes().peekable();

    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let Some(esc) = bytes.next() else {
            out.push(b'\\');
            break;
        };
        match esc {
            b'\n' => {}
            b'\\' | b'\'' | b'"' => out.push(esc),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0B),
            b'0'..=b'7' => {
                let mut value = u32::from(esc - b'0');
                for _ in 0..2 {
                    match bytes.peek().copied().filter(|d| (b'0'..=b'7').contains(d)) {
                        Some(digit) => {
                            value = value * 8 + u32::from(digit - b'0');
                            bytes.next();
                        }
                        None => break,
                    }
                }
                // Values past 0o377 wrap, as they do in CPython.
                out.push(value.to_le_bytes()[0]);
            }
            b'x' => {
                let mut value = 0u8;
                for _ in 0..2 {
                    let digit = bytes
                        .next()
                        .and_then(|d| char::from(d).to_digit(16))
                        .and_then(|d| u8::try_from(d).ok())
                        .ok_or(LexErrorKind::TruncatedEscape('x'))?;
                    value = value * 16 + digit;
                }
                out.push(value);
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    esc: char,
) -> Result<char, LexErrorKind> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or(LexErrorKind::TruncatedEscape(esc))?;
        value = value * 16 + digit;
    }
    code_point(value, esc)
}

fn code_point(value: u32, esc: char) -> Result<char, LexErrorKind> {
    char::from_u32(value).ok_or(LexErrorKind::TruncatedEscape(esc))
}
