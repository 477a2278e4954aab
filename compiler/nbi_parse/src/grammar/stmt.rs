//! Statement parsing.

use std::rc::Rc;

use nbi_ir::{
    Alias, Argument, ClassDef, ExceptHandler, Expr, ExprKind, FunctionDef, ImportFrom,
    ImportNames, Stmt, StmtKind, TryStmt, WithItem,
};
use nbi_lexer::TokenKind;
use nbi_stack::ensure_sufficient_stack;

use super::{check_assign_target, check_delete_target, check_single_target};
use crate::{ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    /// Parse one statement line or compound statement.
    ///
    /// A simple-statement line may hold several `;`-separated statements,
    /// so this returns a list.
    pub(crate) fn parse_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let kind = match self.current_kind() {
            TokenKind::Def => self.parse_function_def(Vec::new(), false)?,
            TokenKind::Class => self.parse_class_def(Vec::new())?,
            TokenKind::At => return self.parse_decorated().map(|stmt| vec![stmt]),
            TokenKind::Async => return self.parse_async().map(|stmt| vec![stmt]),
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for(false)?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::With => self.parse_with(false)?,
            _ => return self.parse_simple_line(),
        };
        Ok(vec![Stmt::new(kind, self.span_from(start), line)])
    }

    /// `simple_stmt (';' simple_stmt)* [';'] NEWLINE`
    fn parse_simple_line(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            stmts.push(self.parse_simple_statement()?);
            if !self.eat(&TokenKind::Semicolon) || self.check(&TokenKind::Newline) {
                break;
            }
        }
        self.expect(&TokenKind::Newline)?;
        Ok(stmts)
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let kind = match self.current_kind() {
            TokenKind::Pass => {
                self.advance();
                StmtKind::Pass
            }
            TokenKind::Break => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Return => {
                self.advance();
                if self.at_statement_end() {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_yield_or_testlist()?))
                }
            }
            TokenKind::Raise => self.parse_raise()?,
            TokenKind::Global => {
                self.advance();
                StmtKind::Global(self.parse_name_list()?)
            }
            TokenKind::Nonlocal => {
                self.advance();
                StmtKind::Nonlocal(self.parse_name_list()?)
            }
            TokenKind::Del => {
                self.advance();
                let target = self.parse_target_list()?;
                check_delete_target(&target)?;
                match target.kind {
                    ExprKind::Tuple(items) => StmtKind::Delete(items),
                    _ => StmtKind::Delete(vec![target]),
                }
            }
            TokenKind::Assert => {
                self.advance();
                let test = self.parse_expr()?;
                let msg = if self.eat(&TokenKind::Comma) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            TokenKind::Import => self.parse_import()?,
            TokenKind::From => self.parse_from_import()?,
            TokenKind::Name(name) if name == "match" && self.looks_like_match_statement() => {
                return Err(self.error_here(ParseErrorKind::Unsupported("match statement")));
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Stmt::new(kind, self.span_from(start), line))
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    /// `match <subject>:` starts with a name followed by something that
    /// cannot continue an expression statement.
    fn looks_like_match_statement(&self) -> bool {
        matches!(
            self.peek_next_kind(),
            TokenKind::Name(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imaginary(_)
                | TokenKind::Str(_)
                | TokenKind::Bytes(_)
                | TokenKind::FString { .. }
                | TokenKind::LBrace
                | TokenKind::None
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Assignment, augmented or annotated assignment, or a bare expression.
    fn parse_expression_statement(&mut self) -> Result<StmtKind, ParseError> {
        let first = self.parse_yield_or_testlist()?;

        if let TokenKind::AugAssign(op) = self.current_kind() {
            self.advance();
            check_single_target(&first)?;
            let value = self.parse_yield_or_testlist()?;
            return Ok(StmtKind::AugAssign {
                target: first,
                op: *op,
                value,
            });
        }

        if self.eat(&TokenKind::Colon) {
            check_single_target(&first)?;
            let annotation = self.parse_expr()?;
            let value = if self.eat(&TokenKind::Eq) {
                Some(self.parse_yield_or_testlist()?)
            } else {
                None
            };
            return Ok(StmtKind::AnnAssign {
                target: first,
                annotation,
                value,
            });
        }

        if !self.check(&TokenKind::Eq) {
            if let ExprKind::Starred(_) = first.kind {
                return Err(ParseError::new(
                    ParseErrorKind::Unsupported("starred expression here"),
                    first.span,
                ));
            }
            return Ok(StmtKind::Expr(first));
        }

        let mut targets = vec![first];
        let value = loop {
            self.advance();
            let next = self.parse_yield_or_testlist()?;
            if !self.check(&TokenKind::Eq) {
                break next;
            }
            targets.push(next);
        };
        for target in &targets {
            check_assign_target(target)?;
        }
        if let ExprKind::Starred(_) = value.kind {
            return Err(ParseError::new(
                ParseErrorKind::Unsupported("starred expression here"),
                value.span,
            ));
        }
        Ok(StmtKind::Assign { targets, value })
    }

    fn parse_raise(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        if self.at_statement_end() {
            return Ok(StmtKind::Raise {
                exc: None,
                cause: None,
            });
        }
        let exc = self.parse_expr()?;
        let cause = if self.eat(&TokenKind::From) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(StmtKind::Raise {
            exc: Some(exc),
            cause,
        })
    }

    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_name()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_name()?);
        }
        Ok(names)
    }

    /// `a.b.c`
    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_name()?;
        while self.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    /// `import a.b as c, d`
    fn parse_import(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let mut aliases = Vec::new();
        loop {
            let name = self.parse_dotted_name()?;
            let asname = if self.eat(&TokenKind::As) {
                Some(self.expect_name()?)
            } else {
                None
            };
            aliases.push(Alias { name, asname });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(StmtKind::Import(aliases))
    }

    /// `from ..pkg.mod import (a as b, c)` or `from mod import *`
    fn parse_from_import(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let mut level = 0;
        loop {
            if self.eat(&TokenKind::Dot) {
                level += 1;
            } else if self.eat(&TokenKind::Ellipsis) {
                level += 3;
            } else {
                break;
            }
        }
        let module = if self.check(&TokenKind::Import) && level > 0 {
            None
        } else {
            Some(self.parse_dotted_name()?)
        };
        self.expect(&TokenKind::Import)?;

        if self.eat(&TokenKind::Star) {
            return Ok(StmtKind::ImportFrom(ImportFrom {
                module,
                names: ImportNames::Star,
                level,
            }));
        }

        let parenthesized = self.eat(&TokenKind::LParen);
        let mut aliases = Vec::new();
        loop {
            let name = self.expect_name()?;
            let asname = if self.eat(&TokenKind::As) {
                Some(self.expect_name()?)
            } else {
                None
            };
            aliases.push(Alias { name, asname });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parenthesized && self.check(&TokenKind::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(&TokenKind::RParen)?;
        }
        Ok(StmtKind::ImportFrom(ImportFrom {
            module,
            names: ImportNames::List(aliases),
            level,
        }))
    }

    /// `':' NEWLINE INDENT stmt+ DEDENT` or `':' simple_stmts`.
    fn parse_block(&mut self, after: &'static str) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::Colon)?;
        if !self.eat(&TokenKind::Newline) {
            return self.parse_simple_line();
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(self.error_here(ParseErrorKind::ExpectedBlock(after)));
        }
        let mut body = Vec::new();
        while !self.eat(&TokenKind::Dedent) {
            if self.check(&TokenKind::Eof) {
                return Err(self.error_expected("dedent"));
            }
            if self.check(&TokenKind::Indent) {
                return Err(self.error_here(ParseErrorKind::UnexpectedIndent));
            }
            body.extend(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_decorated(&mut self) -> Result<Stmt, ParseError> {
        let mut decorators = Vec::new();
        while self.eat(&TokenKind::At) {
            decorators.push(self.parse_expr()?);
            self.expect(&TokenKind::Newline)?;
        }
        let start = self.current_span();
        let line = self.current_line();
        let kind = match self.current_kind() {
            TokenKind::Def => self.parse_function_def(decorators, false)?,
            TokenKind::Class => self.parse_class_def(decorators)?,
            TokenKind::Async if self.peek_next_kind() == &TokenKind::Def => {
                self.advance();
                self.parse_function_def(decorators, true)?
            }
            _ => return Err(self.error_expected("'def' or 'class' after decorator")),
        };
        Ok(Stmt::new(kind, self.span_from(start), line))
    }

    fn parse_async(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        self.advance();
        let kind = match self.current_kind() {
            TokenKind::Def => self.parse_function_def(Vec::new(), true)?,
            TokenKind::For => self.parse_for(true)?,
            TokenKind::With => self.parse_with(true)?,
            _ => return Err(self.error_expected("'def', 'for' or 'with' after 'async'")),
        };
        Ok(Stmt::new(kind, self.span_from(start), line))
    }

    /// `def name(params) [-> expr]: block`, positioned on `def`.
    fn parse_function_def(
        &mut self,
        decorators: Vec<Expr>,
        is_async: bool,
    ) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Def)?;
        let name = self.expect_name()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_parameters(&TokenKind::RParen, true)?;
        self.expect(&TokenKind::RParen)?;
        let returns = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let body = self.parse_block("function definition")?;
        Ok(StmtKind::FunctionDef(Rc::new(FunctionDef {
            name,
            params,
            body,
            decorators,
            returns,
            is_async,
        })))
    }

    /// `class Name[(bases, kw=value)]: block`
    fn parse_class_def(&mut self, decorators: Vec<Expr>) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Class)?;
        let name = self.expect_name()?;
        let mut bases = Vec::new();
        let mut keywords = Vec::new();
        if self.eat(&TokenKind::LParen) {
            for arg in self.parse_call_arguments()? {
                match arg {
                    Argument::Positional(base) => bases.push(base),
                    Argument::Keyword(key, value) => keywords.push((key, value)),
                    Argument::Unpack(e) | Argument::UnpackMapping(e) => {
                        return Err(ParseError::new(
                            ParseErrorKind::Unsupported("argument unpacking in class bases"),
                            e.span,
                        ))
                    }
                }
            }
        }
        let body = self.parse_block("class definition")?;
        Ok(StmtKind::ClassDef(Rc::new(ClassDef {
            name,
            bases,
            keywords,
            body,
            decorators,
        })))
    }

    /// `if`/`elif` chains nest: each `elif` becomes an `If` in `orelse`.
    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let test = self.parse_expr()?;
        let body = self.parse_block("'if' statement")?;
        let orelse = self.parse_else_chain()?;
        Ok(StmtKind::If { test, body, orelse })
    }

    fn parse_else_chain(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.check(&TokenKind::Elif) {
            let start = self.current_span();
            let line = self.current_line();
            let kind = self.parse_if()?;
            return Ok(vec![Stmt::new(kind, self.span_from(start), line)]);
        }
        if self.eat(&TokenKind::Else) {
            return self.parse_block("'else' statement");
        }
        Ok(Vec::new())
    }

    fn parse_optional_else(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.eat(&TokenKind::Else) {
            self.parse_block("'else' statement")
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_while(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let test = self.parse_expr()?;
        let body = self.parse_block("'while' statement")?;
        let orelse = self.parse_optional_else()?;
        Ok(StmtKind::While { test, body, orelse })
    }

    fn parse_for(&mut self, is_async: bool) -> Result<StmtKind, ParseError> {
        self.advance();
        let target = self.parse_target_list()?;
        check_assign_target(&target)?;
        self.expect(&TokenKind::In)?;
        let iter = self.parse_testlist_star_expr()?;
        let body = self.parse_block("'for' statement")?;
        let orelse = self.parse_optional_else()?;
        Ok(StmtKind::For {
            target,
            iter,
            body,
            orelse,
            is_async,
        })
    }

    fn parse_try(&mut self) -> Result<StmtKind, ParseError> {
        let try_span = self.current_span();
        self.advance();
        let body = self.parse_block("'try' statement")?;

        let mut handlers = Vec::new();
        while self.check(&TokenKind::Except) {
            let line = self.current_line();
            self.advance();
            if self.check(&TokenKind::Star) {
                return Err(self.error_here(ParseErrorKind::Unsupported("except*")));
            }
            let (kind, name) = if self.check(&TokenKind::Colon) {
                (None, None)
            } else {
                let kind = self.parse_expr()?;
                let name = if self.eat(&TokenKind::As) {
                    Some(self.expect_name()?)
                } else {
                    None
                };
                (Some(kind), name)
            };
            let body = self.parse_block("'except' statement")?;
            handlers.push(ExceptHandler {
                kind,
                name,
                body,
                line,
            });
        }

        let orelse = if !handlers.is_empty() {
            self.parse_optional_else()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat(&TokenKind::Finally) {
            self.parse_block("'finally' statement")?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(ParseError::new(ParseErrorKind::BareTry, try_span));
        }
        Ok(StmtKind::Try(Box::new(TryStmt {
            body,
            handlers,
            orelse,
            finalbody,
        })))
    }

    fn parse_with(&mut self, is_async: bool) -> Result<StmtKind, ParseError> {
        self.advance();
        let mut items = Vec::new();
        loop {
            let context = self.parse_expr()?;
            let target = if self.eat(&TokenKind::As) {
                let target = self.parse_target()?;
                check_assign_target(&target)?;
                Some(target)
            } else {
                None
            };
            items.push(WithItem { context, target });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let body = self.parse_block("'with' statement")?;
        Ok(StmtKind::With {
            items,
            body,
            is_async,
        })
    }

    /// Whether the statement at the cursor can bind a name at module level
    /// through a definition or an import.
    pub(crate) fn starts_declaration(&self) -> bool {
        match self.current_kind() {
            TokenKind::Def
            | TokenKind::Class
            | TokenKind::At
            | TokenKind::Import
            | TokenKind::From => true,
            TokenKind::Async => self.peek_next_kind() == &TokenKind::Def,
            _ => false,
        }
    }

    /// Move past the statement that starts at the cursor, nested blocks and
    /// `else`/`elif`/`except`/`finally` clauses included.
    pub(crate) fn skip_statement(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => return,
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                    if depth == 0 && !continues_compound(self.current_kind()) {
                        return;
                    }
                    continue;
                }
                TokenKind::Newline if depth == 0 => {
                    self.advance();
                    if !self.check(&TokenKind::Indent) && !continues_compound(self.current_kind())
                    {
                        return;
                    }
                    continue;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// Clauses that belong to the compound statement before them.
fn continues_compound(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Else | TokenKind::Elif | TokenKind::Except | TokenKind::Finally
    )
}

#[cfg(test)]
mod tests;
