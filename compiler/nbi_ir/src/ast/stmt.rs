//! Statement nodes.

use std::rc::Rc;

use super::expr::Expr;
use super::operators::BinaryOp;
use crate::Span;

/// Statement node. `line` is the 1-based line of the first token.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub line: u32,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span, line: u32) -> Self {
        Stmt { kind, span, line }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    FunctionDef(Rc<FunctionDef>),
    ClassDef(Rc<ClassDef>),
    Import(Vec<Alias>),
    ImportFrom(ImportFrom),
    Expr(Expr),
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },
    Return(Option<Expr>),
    Pass,
    Break,
    Continue,
    Raise {
        exc: Option<Expr>,
        cause: Option<Expr>,
    },
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Delete(Vec<Expr>),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
    },
    Try(Box<TryStmt>),
    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        is_async: bool,
    },
}

impl StmtKind {
    /// Function, async function, class, `import` and `from ... import`.
    ///
    /// These are the only top-level statements a notebook cell contributes
    /// to an imported module.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            StmtKind::FunctionDef(_)
                | StmtKind::ClassDef(_)
                | StmtKind::Import(_)
                | StmtKind::ImportFrom(_)
        )
    }

    /// Short lowercase description for logs.
    pub fn describe(&self) -> &'static str {
        match self {
            StmtKind::FunctionDef(def) if def.is_async => "async function definition",
            StmtKind::FunctionDef(_) => "function definition",
            StmtKind::ClassDef(_) => "class definition",
            StmtKind::Import(_) => "import",
            StmtKind::ImportFrom(_) => "from-import",
            StmtKind::Expr(_) => "expression",
            StmtKind::Assign { .. } | StmtKind::AnnAssign { .. } => "assignment",
            StmtKind::AugAssign { .. } => "augmented assignment",
            StmtKind::Return(_) => "return",
            StmtKind::Pass => "pass",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Raise { .. } => "raise",
            StmtKind::Assert { .. } => "assert",
            StmtKind::Global(_) => "global",
            StmtKind::Nonlocal(_) => "nonlocal",
            StmtKind::Delete(_) => "del",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::For { is_async: true, .. } => "async for",
            StmtKind::For { .. } => "for",
            StmtKind::Try(_) => "try",
            StmtKind::With { is_async: true, .. } => "async with",
            StmtKind::With { .. } => "with",
        }
    }
}

/// `def` or `async def`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Parameters,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
    pub returns: Option<Expr>,
    pub is_async: bool,
}

/// Parameter list shared by `def` and `lambda`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Parameters {
    pub positional: Vec<Param>,
    /// `*args`
    pub vararg: Option<String>,
    /// Parameters after `*` or `*args`.
    pub kwonly: Vec<Param>,
    /// `**kwargs`
    pub kwarg: Option<String>,
}

impl Parameters {
    /// Every bound name in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positional
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.vararg.as_deref())
            .chain(self.kwonly.iter().map(|p| p.name.as_str()))
            .chain(self.kwarg.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    /// `metaclass=...` and friends. Parsed, not interpreted.
    pub keywords: Vec<(String, Expr)>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

/// `a.b.c as d` in an import statement, or `x as y` in a from-import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportFrom {
    /// `None` for `from . import x`.
    pub module: Option<String>,
    pub names: ImportNames,
    /// Number of leading dots.
    pub level: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportNames {
    Star,
    List(Vec<Alias>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStmt {
    pub body: Vec<Stmt>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Vec<Stmt>,
    pub finalbody: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExceptHandler {
    /// Exception class (or tuple of classes); `None` for a bare `except:`.
    pub kind: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithItem {
    pub context: Expr,
    pub target: Option<Expr>,
}
