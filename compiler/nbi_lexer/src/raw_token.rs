//! Raw token from logos, before keyword lookup and literal cooking.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\x0C\r]+")] // Horizontal whitespace
#[logos(skip r"#[^\n]*")] // Comments
#[logos(skip r"\\\r?\n")] // Explicit line joining
pub(crate) enum RawToken {
    #[token("\n")]
    Newline,

    // Literals
    #[regex(r#"([rRbBuUfF]|[rRbBfF][rRbBfF])?["']"#, string_body)]
    String,
    #[regex(r"[0-9][0-9_]*")]
    Int,
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexInt,
    #[regex(r"0[oO][0-7_]+")]
    OctInt,
    #[regex(r"0[bB][01_]+")]
    BinInt,
    #[regex(r"[0-9][0-9_]*\.([0-9][0-9_]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    Float,
    #[regex(r"[0-9][0-9_]*[jJ]")]
    #[regex(r"[0-9][0-9_]*\.([0-9][0-9_]*)?([eE][+-]?[0-9]+)?[jJ]")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[jJ]")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[jJ]")]
    Imaginary,
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Ident,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,
    #[token(":=")]
    ColonEq,

    // Operators
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("@")]
    At,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Augmented assignment
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("//=")]
    DoubleSlashEq,
    #[token("%=")]
    PercentEq,
    #[token("**=")]
    DoubleStarEq,
    #[token("@=")]
    AtEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    LShiftEq,
    #[token(">>=")]
    RShiftEq,
}

/// Consume a string body after its prefix and opening quote.
///
/// Triple-quoted bodies may span lines; single-quoted ones stop at a
/// newline. A backslash always protects the following byte, raw or not.
/// Returns `None` (a lex error) when the closing quote is missing.
fn string_body(lex: &mut Lexer<RawToken>) -> Option<()> {
    let opener = lex.slice().as_bytes();
    let quote = *opener.last()?;
    let rest = lex.remainder().as_bytes();
    let triple = rest.len() >= 2 && rest[0] == quote && rest[1] == quote;
    let mut i = if triple { 2 } else { 0 };
    while i < rest.len() {
        match rest[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b if b == quote => {
                if !triple {
                    lex.bump(i + 1);
                    return Some(());
                }
                if rest.get(i + 1) == Some(&quote) && rest.get(i + 2) == Some(&quote) {
                    lex.bump(i + 3);
                    return Some(());
                }
            }
            b'\n' if !triple => return None,
            _ => {}
        }
        i += 1;
    }
    None
}
