//! Static checks that turn a parsed program into a runnable [`CodeUnit`].
//!
//! The parser accepts some statements that are only legal in context
//! (`return` outside a function, `break` outside a loop, ...). Those are
//! rejected here, before any statement runs, so a cell either executes from
//! its first statement or not at all.

mod scope;
mod validate;

use std::rc::Rc;

use nbi_ir::{Program, Span};
use thiserror::Error;

pub(crate) use scope::ScopeInfo;

/// A program that passed the static checks, tagged with the display name
/// tracebacks will show for it.
#[derive(Debug)]
pub struct CodeUnit {
    program: Program,
    filename: Rc<str>,
}

impl CodeUnit {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub(crate) fn filename_rc(&self) -> Rc<str> {
        Rc::clone(&self.filename)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub filename: String,
    /// 1-based line of the offending statement or expression.
    pub line: u32,
    /// Location in the source the program was parsed from.
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("'return' outside function")]
    ReturnOutsideFunction,
    #[error("'await' outside function")]
    AwaitOutsideFunction,
    #[error("'await' outside async function")]
    AwaitOutsideAsyncFunction,
    #[error("'break' outside loop")]
    BreakOutsideLoop,
    #[error("'continue' not properly in loop")]
    ContinueOutsideLoop,
    #[error("nonlocal declaration not allowed at module level")]
    NonlocalAtModuleLevel,
    #[error("no binding for nonlocal '{0}' found")]
    NonlocalWithoutBinding(String),
    #[error("name '{0}' is parameter and global")]
    ParameterAndGlobal(String),
    #[error("name '{0}' is parameter and nonlocal")]
    ParameterAndNonlocal(String),
    #[error("name '{0}' is nonlocal and global")]
    NonlocalAndGlobal(String),
    #[error("duplicate argument '{0}' in function definition")]
    DuplicateArgument(String),
    #[error("parameter without a default follows parameter with a default")]
    NonDefaultAfterDefault,
    #[error("keyword argument repeated: {0}")]
    RepeatedKeyword(String),
    #[error("import * only allowed at module level")]
    StarImportInFunction,
    #[error("'yield' outside function")]
    YieldOutsideFunction,
    #[error("'yield' inside {0}")]
    YieldInComprehension(&'static str),
    #[error("'yield' inside lambda is not supported")]
    YieldInLambda,
    #[error("'yield from' inside async function")]
    YieldFromInAsyncFunction,
    #[error("'{0}' outside async function")]
    AsyncOutsideAsyncFunction(&'static str),
    #[error("asynchronous comprehension outside of an asynchronous function")]
    AsyncComprehensionOutsideAsyncFunction,
}

/// Check `program` and wrap it for execution under `filename`.
#[tracing::instrument(level = "debug", skip(program), fields(statements = program.body.len()))]
pub fn compile(program: Program, filename: &str) -> Result<CodeUnit, CompileError> {
    validate::check_program(&program).map_err(|(kind, line, span)| CompileError {
        kind,
        filename: filename.to_owned(),
        line,
        span,
    })?;
    Ok(CodeUnit {
        program,
        filename: filename.into(),
    })
}
