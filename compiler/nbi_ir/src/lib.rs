//! Syntax tree and source locations shared by the notebook cell lexer,
//! parser and interpreter.

pub mod ast;
mod span;

pub use ast::{
    fix_missing_locations, Alias, Argument, BinaryOp, BoolOp, ClassDef, CmpOp, Comprehension,
    Constant, ExceptHandler, Expr, ExprKind, FStringPart, FunctionDef, ImportFrom, ImportNames,
    Lambda, Param, Parameters, Program, Stmt, StmtKind, TryStmt, UnaryOp, WithItem,
};
pub use span::{LineIndex, Span};
