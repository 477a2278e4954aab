//! Tokenizer for notebook cell source.
//!
//! Two layers: logos produces raw tokens (with string bodies scanned by a
//! callback), then [`lex`] cooks them into [`Token`]s. Cooking resolves
//! keywords, parses numeric literals, unescapes strings, and inserts the
//! `Newline`/`Indent`/`Dedent` layout tokens the parser relies on.

mod escape;
mod indent;
mod keywords;
mod lex_error;
mod raw_token;
mod token;

use logos::Logos;
use nbi_ir::{BinaryOp, LineIndex, Span};

use indent::{column_at, IndentChange, IndentStack};
use raw_token::RawToken;

pub use escape::{unescape, unescape_bytes};
pub use lex_error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind};

/// Lex a whole cell into a token list ending with `Eof`.
///
/// Blank and comment-only lines produce no tokens. Every logical line ends
/// with `Newline`, including the last one, and all open blocks are closed
/// with `Dedent`s before `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut indents = IndentStack::new();
    let mut at_line_start = true;
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let range = raw.span();
        let span = Span::from_range(range.clone());
        let line = lines.line(span.start);

        let Ok(kind) = result else {
            return Err(LexError::new(classify_error(&raw), span));
        };

        if kind == RawToken::Newline {
            if !at_line_start && !indents.in_brackets() {
                tokens.push(Token::new(TokenKind::Newline, span, line));
                at_line_start = true;
            }
            continue;
        }

        if at_line_start {
            let column = column_at(source, range.start);
            let change = indents
                .process(column)
                .map_err(|kind| LexError::new(kind, span))?;
            let marker = Span::point(span.start);
            match change {
                IndentChange::Same => {}
                IndentChange::Indent => tokens.push(Token::new(TokenKind::Indent, marker, line)),
                IndentChange::Dedent(count) => tokens.extend(
                    std::iter::repeat_with(|| Token::new(TokenKind::Dedent, marker, line))
                        .take(count),
                ),
            }
            at_line_start = false;
        }

        match kind {
            RawToken::LParen | RawToken::LBracket | RawToken::LBrace => indents.open_bracket(),
            RawToken::RParen | RawToken::RBracket | RawToken::RBrace => indents.close_bracket(),
            _ => {}
        }

        let cooked = cook(kind, raw.slice(), span).map_err(|kind| LexError::new(kind, span))?;
        tokens.push(Token::new(cooked, span, line));
    }

    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    let eof = Span::point(end);
    let last_line = lines.line(end);
    if !at_line_start {
        tokens.push(Token::new(TokenKind::Newline, eof, last_line));
    }
    for _ in 0..indents.open_blocks() {
        tokens.push(Token::new(TokenKind::Dedent, eof, last_line));
    }
    tokens.push(Token::new(TokenKind::Eof, eof, last_line));
    Ok(tokens)
}

/// Work out why logos rejected the current slice.
fn classify_error(raw: &logos::Lexer<'_, RawToken>) -> LexErrorKind {
    let slice = raw.slice();
    match slice.chars().last() {
        Some(quote @ ('"' | '\'')) => {
            let doubled: String = [quote, quote].iter().collect();
            if raw.remainder().starts_with(&doubled) {
                LexErrorKind::UnterminatedTripleString
            } else {
                LexErrorKind::UnterminatedString
            }
        }
        Some('\\') => LexErrorKind::StrayBackslash,
        Some(c) => LexErrorKind::InvalidCharacter(c),
        None => LexErrorKind::InvalidCharacter('\0'),
    }
}

fn cook(raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexErrorKind> {
    let kind = match raw {
        RawToken::Ident => {
            keywords::lookup(slice).unwrap_or_else(|| TokenKind::Name(slice.to_string()))
        }
        RawToken::Int => {
            let digits = number_digits(slice, "decimal")?;
            if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
                return Err(LexErrorKind::InvalidNumber("decimal"));
            }
            TokenKind::Int(digits.parse().map_err(|_| LexErrorKind::IntOverflow)?)
        }
        RawToken::HexInt => TokenKind::Int(radix_int(slice, 16, "hexadecimal")?),
        RawToken::OctInt => TokenKind::Int(radix_int(slice, 8, "octal")?),
        RawToken::BinInt => TokenKind::Int(radix_int(slice, 2, "binary")?),
        RawToken::Float => {
            let digits = number_digits(slice, "float")?;
            TokenKind::Float(
                digits
                    .parse()
                    .map_err(|_| LexErrorKind::InvalidNumber("float"))?,
            )
        }
        RawToken::Imaginary => {
            let digits = number_digits(slice.trim_end_matches(['j', 'J']), "imaginary")?;
            TokenKind::Imaginary(
                digits
                    .parse()
                    .map_err(|_| LexErrorKind::InvalidNumber("imaginary"))?,
            )
        }
        RawToken::String => cook_string(slice, span)?,
        RawToken::Newline => TokenKind::Newline,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::ColonEq => TokenKind::ColonEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::DoubleStar => TokenKind::DoubleStar,
        RawToken::Slash => TokenKind::Slash,
        RawToken::DoubleSlash => TokenKind::DoubleSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::At => TokenKind::At,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::LShift => TokenKind::LShift,
        RawToken::RShift => TokenKind::RShift,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::PlusEq => TokenKind::AugAssign(BinaryOp::Add),
        RawToken::MinusEq => TokenKind::AugAssign(BinaryOp::Sub),
        RawToken::StarEq => TokenKind::AugAssign(BinaryOp::Mul),
        RawToken::SlashEq => TokenKind::AugAssign(BinaryOp::Div),
        RawToken::DoubleSlashEq => TokenKind::AugAssign(BinaryOp::FloorDiv),
        RawToken::PercentEq => TokenKind::AugAssign(BinaryOp::Mod),
        RawToken::DoubleStarEq => TokenKind::AugAssign(BinaryOp::Pow),
        RawToken::AtEq => TokenKind::AugAssign(BinaryOp::MatMul),
        RawToken::AmpEq => TokenKind::AugAssign(BinaryOp::BitAnd),
        RawToken::PipeEq => TokenKind::AugAssign(BinaryOp::BitOr),
        RawToken::CaretEq => TokenKind::AugAssign(BinaryOp::BitXor),
        RawToken::LShiftEq => TokenKind::AugAssign(BinaryOp::LShift),
        RawToken::RShiftEq => TokenKind::AugAssign(BinaryOp::RShift),
    };
    Ok(kind)
}

/// Strip digit separators. `_` may only sit between two digits.
fn number_digits(slice: &str, what: &'static str) -> Result<String, LexErrorKind> {
    if slice.ends_with('_') || slice.contains("__") || slice.contains("_.") || slice.contains("._")
    {
        return Err(LexErrorKind::InvalidNumber(what));
    }
    Ok(slice.replace('_', ""))
}

fn radix_int(slice: &str, radix: u32, what: &'static str) -> Result<i64, LexErrorKind> {
    let body = &slice[2..];
    let digits = number_digits(body.strip_prefix('_').unwrap_or(body), what)?;
    if digits.is_empty() {
        return Err(LexErrorKind::InvalidNumber(what));
    }
    i64::from_str_radix(&digits, radix).map_err(|_| LexErrorKind::IntOverflow)
}

/// Split a string token into prefix, quote length and body, then cook it.
fn cook_string(slice: &str, span: Span) -> Result<TokenKind, LexErrorKind> {
    let prefix_len = slice.find(['"', '\'']).unwrap_or(0);
    let prefix = slice[..prefix_len].to_ascii_lowercase();
    let rest = &slice[prefix_len..];
    let quote_len = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        3
    } else {
        1
    };
    let body = rest
        .get(quote_len..rest.len().saturating_sub(quote_len))
        .unwrap_or_default();

    let (raw, fstring) = match prefix.as_str() {
        "" | "u" => (false, false),
        "r" => (true, false),
        "f" => (false, true),
        "rf" | "fr" => (true, true),
        "b" => return unescape_bytes(body).map(TokenKind::Bytes),
        "br" | "rb" => return raw_bytes(body).map(TokenKind::Bytes),
        other => return Err(LexErrorKind::InvalidStringPrefix(other.to_string())),
    };

    if fstring {
        let offset = span.start + u32::try_from(prefix_len + quote_len).unwrap_or(0);
        return Ok(TokenKind::FString {
            body: body.to_string(),
            raw,
            offset,
        });
    }
    if raw {
        return Ok(TokenKind::Str(body.to_string()));
    }
    unescape(body).map(TokenKind::Str)
}

fn raw_bytes(body: &str) -> Result<Vec<u8>, LexErrorKind> {
    if body.is_ascii() {
        Ok(body.as_bytes().to_vec())
    } else {
        Err(LexErrorKind::NonAsciiBytes)
    }
}

#[cfg(test)]
mod tests;
