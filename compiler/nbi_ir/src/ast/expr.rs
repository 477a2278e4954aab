//! Expression nodes.

use std::rc::Rc;

use super::operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
use super::stmt::Parameters;
use crate::Span;

/// Expression node. `line` is 1-based within the cell; `0` means "unknown"
/// and is backfilled by [`crate::fix_missing_locations`].
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub line: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span, line: u32) -> Self {
        Expr { kind, span, line }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        match &self.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => true,
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                items.iter().all(Expr::is_assignable)
            }
            ExprKind::Starred(inner) => inner.is_assignable(),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Name(String),
    Constant(Constant),
    FString(Vec<FStringPart>),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    /// Entries in source order. A `None` key is a `**mapping` entry.
    Dict(Vec<(Option<Expr>, Expr)>),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    /// `lower:upper:step`; only valid as a subscript index.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Argument>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<(CmpOp, Expr)>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda(Rc<Lambda>),
    /// List comprehension. Generator expressions lower to this too.
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
    Starred(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Imaginary literal `2j`; the real part is zero.
    Imaginary(f64),
    Ellipsis,
}

/// One piece of an f-string.
#[derive(Clone, Debug, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Field {
        expr: Expr,
        /// `!r`, `!s` or `!a`.
        conversion: Option<char>,
        spec: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    pub params: Parameters,
    pub body: Expr,
}

/// `[async] for target in iter if cond...` clause of a comprehension.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub conditions: Vec<Expr>,
    pub is_async: bool,
}

/// Call-site argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Positional(Expr),
    Keyword(String, Expr),
    /// `*iterable`
    Unpack(Expr),
    /// `**mapping`
    UnpackMapping(Expr),
}

impl Argument {
    pub fn expr(&self) -> &Expr {
        match self {
            Argument::Positional(e)
            | Argument::Keyword(_, e)
            | Argument::Unpack(e)
            | Argument::UnpackMapping(e) => e,
        }
    }

    pub fn expr_mut(&mut self) -> &mut Expr {
        match self {
            Argument::Positional(e)
            | Argument::Keyword(_, e)
            | Argument::Unpack(e)
            | Argument::UnpackMapping(e) => e,
        }
    }
}
