//! Selective execution of one notebook cell.
//!
//! A cell contributes only its top-level declarations (functions, async
//! functions, classes and imports) to the module. Everything else is parsed
//! and then dropped. Failures are reported to the diagnostics sink and stay
//! local to the cell.

use std::path::Path;

use nbi_eval::{
    compile, render_syntax_error, ImportHook, Interpreter, LineAttributionRecord, Namespace,
    Runtime, SharedOutput,
};
use nbi_ir::{fix_missing_locations, LineIndex, Program};

/// How running one cell went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    /// Every selected statement ran.
    Executed { statements: usize },
    /// Nothing declaration-shaped; the namespace and line cache are untouched.
    NoDeclarations,
    ParseFailed,
    CompileFailed,
    /// Statements that ran before the failure keep their bindings.
    ExecutionFailed,
}

impl CellOutcome {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::ParseFailed | Self::CompileFailed | Self::ExecutionFailed
        )
    }
}

/// Name tracebacks show for a cell: `"<origin> (cell N)"`, or the origin
/// alone when the cell has no ordinal.
pub fn display_name(origin: &Path, ordinal: Option<usize>) -> String {
    match ordinal {
        Some(ordinal) => format!("{} (cell {ordinal})", origin.display()),
        None => origin.display().to_string(),
    }
}

/// Keep the top-level declaration statements of `program`, in order.
pub fn select_declarations(program: Program) -> Program {
    program.retain_top_level(|stmt| stmt.kind.is_declaration())
}

fn source_line(source: &str, line: u32) -> Option<&str> {
    source.lines().nth(usize::try_from(line).ok()?.checked_sub(1)?)
}

/// Parses, filters, compiles and runs cells against a module namespace.
pub struct CellFilterExecutor<'a> {
    runtime: &'a Runtime,
    importer: &'a dyn ImportHook,
    diagnostics: &'a SharedOutput,
}

impl<'a> CellFilterExecutor<'a> {
    pub fn new(
        runtime: &'a Runtime,
        importer: &'a dyn ImportHook,
        diagnostics: &'a SharedOutput,
    ) -> Self {
        CellFilterExecutor {
            runtime,
            importer,
            diagnostics,
        }
    }

    /// Run the declarations of `source` with `namespace` as globals.
    #[tracing::instrument(
        level = "debug",
        skip(self, source, namespace, origin),
        fields(origin = %origin.display())
    )]
    pub fn run(
        &self,
        source: &str,
        namespace: &Namespace,
        origin: &Path,
        ordinal: Option<usize>,
    ) -> CellOutcome {
        let program = match nbi_parse::parse_declarations(source) {
            Ok(program) => program,
            Err(err) => {
                let filename = origin.display().to_string();
                tracing::warn!(cell = ?ordinal, error = %err, "cell has a syntax error");
                self.report(&render_syntax_error(
                    &filename,
                    err.line,
                    err.column,
                    source_line(source, err.line),
                    &err.to_string(),
                ));
                return CellOutcome::ParseFailed;
            }
        };

        let mut selected = select_declarations(program);
        if selected.is_empty() {
            tracing::debug!(cell = ?ordinal, "no declarations");
            return CellOutcome::NoDeclarations;
        }
        fix_missing_locations(&mut selected);
        let statements = selected.body.len();

        let name = display_name(origin, ordinal);
        self.runtime
            .line_cache()
            .install(LineAttributionRecord::new(name.as_str(), source));

        let code = match compile(selected, &name) {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(cell = %name, error = %err, "cell failed to compile");
                let (line, column) = LineIndex::new(source).line_col(err.span.start);
                let line = if err.line == 0 { line } else { err.line };
                self.report(&render_syntax_error(
                    &name,
                    line,
                    column,
                    source_line(source, line),
                    &err.to_string(),
                ));
                return CellOutcome::CompileFailed;
            }
        };

        let interpreter = Interpreter::new(self.runtime, self.importer);
        match interpreter.exec_code(&code, namespace) {
            Ok(()) => CellOutcome::Executed { statements },
            Err(raised) => {
                tracing::warn!(cell = %name, exception = raised.type_name(), "cell raised");
                self.report(&interpreter.format_exception(&raised));
                CellOutcome::ExecutionFailed
            }
        }
    }

    fn report(&self, text: &str) {
        self.diagnostics.print(text);
    }
}
