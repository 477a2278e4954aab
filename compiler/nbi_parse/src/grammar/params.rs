//! Parameter lists for `def` and `lambda`.

use nbi_ir::{Param, Parameters};
use nbi_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parameters up to (not including) `closing`.
    ///
    /// `annotations` allows `name: expr`, which `lambda` does not. A bare
    /// `*` starts the keyword-only section; `/` is accepted and ignored.
    /// Ordering problems (defaults, duplicates) are left to the compiler.
    pub(crate) fn parse_parameters(
        &mut self,
        closing: &TokenKind,
        annotations: bool,
    ) -> Result<Parameters, ParseError> {
        let mut params = Parameters::default();
        let mut keyword_only = false;

        while !self.check(closing) {
            if self.eat(&TokenKind::Slash) {
                // Positional-only marker.
            } else if self.eat(&TokenKind::DoubleStar) {
                let name = self.expect_name()?;
                self.parse_annotation(annotations)?;
                params.kwarg = Some(name);
            } else if self.eat(&TokenKind::Star) {
                keyword_only = true;
                if self.cursor.check_name() {
                    let name = self.expect_name()?;
                    self.parse_annotation(annotations)?;
                    params.vararg = Some(name);
                }
            } else {
                let name = self.expect_name()?;
                let annotation = self.parse_annotation(annotations)?;
                let default = if self.eat(&TokenKind::Eq) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                let param = Param {
                    name,
                    annotation,
                    default,
                };
                if keyword_only {
                    params.kwonly.push(param);
                } else {
                    params.positional.push(param);
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_annotation(
        &mut self,
        annotations: bool,
    ) -> Result<Option<nbi_ir::Expr>, ParseError> {
        if annotations && self.eat(&TokenKind::Colon) {
            return Ok(Some(self.parse_expr()?));
        }
        Ok(None)
    }
}
