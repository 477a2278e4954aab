//! Syntax tree for cell programs.
//!
//! The tree is owned (`Vec`/`Box`) except for function, class and lambda
//! definitions, which sit behind `Rc` so runtime function values can share
//! them without copying bodies.

mod expr;
mod locations;
mod operators;
mod stmt;
mod yields;

pub use expr::{Argument, Comprehension, Constant, Expr, ExprKind, FStringPart, Lambda};
pub use locations::fix_missing_locations;
pub use operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
pub use stmt::{
    Alias, ClassDef, ExceptHandler, FunctionDef, ImportFrom, ImportNames, Param, Parameters,
    Stmt, StmtKind, TryStmt, WithItem,
};

/// A parsed unit of source: one cell, or a filtered subset of one.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Program { body }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Keep the top-level statements accepted by `keep`, in order.
    ///
    /// Nested bodies are untouched.
    #[must_use]
    pub fn retain_top_level(self, mut keep: impl FnMut(&Stmt) -> bool) -> Program {
        Program {
            body: self.body.into_iter().filter(|stmt| keep(stmt)).collect(),
        }
    }
}
