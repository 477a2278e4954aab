//! F-string bodies.
//!
//! The lexer hands over the raw body; here it is split into literal text
//! and `{expr!conv:spec}` fields. Field expressions are lexed and parsed on
//! their own, with spans and lines shifted back into the cell.

use nbi_ir::{Expr, FStringPart, Span};
use nbi_lexer::{lex, unescape, LexError};

use crate::{ParseError, ParseErrorKind, Parser};

pub(crate) fn parse_fstring(
    body: &str,
    raw: bool,
    offset: u32,
    line: u32,
) -> Result<Vec<FStringPart>, ParseError> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    let error = |kind: &'static str, at: usize| {
        ParseError::new(ParseErrorKind::FString(kind), Span::point(offset + to_u32(at)))
    };

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                literal.push('{');
                i += 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                literal.push('}');
                i += 2;
            }
            b'}' => return Err(error("single '}' is not allowed", i)),
            b'{' => {
                flush_literal(&mut parts, &mut literal, raw, offset, i)?;
                i = parse_field(body, i + 1, offset, line, &mut parts)?;
            }
            _ => {
                let ch_len = body[i..].chars().next().map_or(1, char::len_utf8);
                literal.push_str(&body[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    flush_literal(&mut parts, &mut literal, raw, offset, i)?;
    Ok(parts)
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn flush_literal(
    parts: &mut Vec<FStringPart>,
    literal: &mut String,
    raw: bool,
    offset: u32,
    at: usize,
) -> Result<(), ParseError> {
    if literal.is_empty() {
        return Ok(());
    }
    let text = std::mem::take(literal);
    let text = if raw {
        text
    } else {
        unescape(&text).map_err(|kind| {
            ParseError::from(LexError::new(kind, Span::point(offset + to_u32(at))))
        })?
    };
    parts.push(FStringPart::Literal(text));
    Ok(())
}

/// Parse one field starting just after its `{`. Returns the index just
/// past the closing `}`.
fn parse_field(
    body: &str,
    start: usize,
    offset: u32,
    line: u32,
    parts: &mut Vec<FStringPart>,
) -> Result<usize, ParseError> {
    let bytes = body.as_bytes();
    let error = |kind: &'static str, at: usize| {
        ParseError::new(ParseErrorKind::FString(kind), Span::point(offset + to_u32(at)))
    };

    let end = find_expression_end(bytes, start).ok_or_else(|| error("expecting '}'", start))?;
    let source = &body[start..end];
    if source.trim().is_empty() {
        return Err(error("valid expression required before '}'", start));
    }

    // `{name=}` echoes the expression text before its value.
    let trimmed = source.trim_end();
    let self_documenting = trimmed.ends_with('=')
        && !["==", "!=", "<=", ">="].iter().any(|op| trimmed.ends_with(op));
    let expr_source = if self_documenting {
        &trimmed[..trimmed.len() - 1]
    } else {
        source
    };
    if self_documenting {
        parts.push(FStringPart::Literal(source.to_string()));
    }

    let leading = expr_source.len() - expr_source.trim_start().len();
    let field_line = line + to_u32(body[..start].matches('\n').count());
    let expr = parse_field_expr(
        expr_source.trim(),
        offset + to_u32(start + leading),
        field_line,
    )?;

    let mut i = end;
    let mut conversion = None;
    if bytes[i] == b'!' {
        let conv = body[i + 1..].chars().next();
        match conv {
            Some(c @ ('r' | 's' | 'a')) => conversion = Some(c),
            _ => return Err(error("invalid conversion character", i + 1)),
        }
        i += 2;
        if !matches!(bytes.get(i), Some(b':' | b'}')) {
            return Err(error("expecting '}'", i));
        }
    }

    let mut spec = None;
    if bytes[i] == b':' {
        let spec_start = i + 1;
        let mut j = spec_start;
        while j < bytes.len() && bytes[j] != b'}' {
            if bytes[j] == b'{' {
                return Err(ParseError::new(
                    ParseErrorKind::Unsupported("nested replacement field in format spec"),
                    Span::point(offset + to_u32(j)),
                ));
            }
            j += 1;
        }
        if j >= bytes.len() {
            return Err(error("expecting '}'", spec_start));
        }
        spec = Some(body[spec_start..j].to_string());
        i = j;
    }

    if self_documenting && conversion.is_none() && spec.is_none() {
        conversion = Some('r');
    }
    parts.push(FStringPart::Field {
        expr,
        conversion,
        spec,
    });
    Ok(i + 1)
}

/// Index of the `!`, `:` or `}` that ends the expression part of a field.
/// Brackets and quoted strings are skipped over.
fn find_expression_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth > 0 => depth -= 1,
            b'}' => return Some(i),
            b'!' if depth == 0 && bytes.get(i + 1) != Some(&b'=') => return Some(i),
            b':' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Lex and parse a field expression, moving its locations into the cell.
fn parse_field_expr(source: &str, offset: u32, line: u32) -> Result<Expr, ParseError> {
    let shift = |span: Span| Span::new(span.start + offset, span.end + offset);
    let mut tokens = lex(source).map_err(|err| {
        let span = shift(err.span);
        ParseError::from(LexError::new(err.kind, span))
    })?;
    for token in &mut tokens {
        token.span = shift(token.span);
        token.line += line - 1;
    }
    Parser::new(&tokens).parse_standalone_expr()
}

#[cfg(test)]
mod tests;
