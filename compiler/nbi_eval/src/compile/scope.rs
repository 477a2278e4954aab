//! Which names a function body binds locally.

use nbi_ir::{Comprehension, Expr, ExprKind, ImportNames, Parameters, Stmt, StmtKind};
use rustc_hash::FxHashSet;

/// Name classification for one function, lambda or comprehension scope.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ScopeInfo {
    locals: FxHashSet<String>,
    globals: FxHashSet<String>,
    nonlocals: FxHashSet<String>,
}

impl ScopeInfo {
    pub(crate) fn for_function(params: &Parameters, body: &[Stmt]) -> Self {
        let mut collector = Collector::default();
        for name in params.names() {
            collector.bound.insert(name.to_owned());
        }
        collector.block(body);
        collector.finish()
    }

    pub(crate) fn for_lambda(params: &Parameters) -> Self {
        ScopeInfo {
            locals: params.names().map(str::to_owned).collect(),
            ..ScopeInfo::default()
        }
    }

    pub(crate) fn for_comprehension(generators: &[Comprehension]) -> Self {
        let mut collector = Collector::default();
        for generator in generators {
            collector.target(&generator.target);
        }
        collector.finish()
    }

    pub(crate) fn is_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    pub(crate) fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    pub(crate) fn is_nonlocal(&self, name: &str) -> bool {
        self.nonlocals.contains(name)
    }
}

#[derive(Default)]
struct Collector {
    bound: FxHashSet<String>,
    globals: FxHashSet<String>,
    nonlocals: FxHashSet<String>,
}

impl Collector {
    fn finish(self) -> ScopeInfo {
        let Collector {
            mut bound,
            globals,
            nonlocals,
        } = self;
        bound.retain(|name| !globals.contains(name) && !nonlocals.contains(name));
        ScopeInfo {
            locals: bound,
            globals,
            nonlocals,
        }
    }

    fn block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => {
                self.bound.insert(def.name.clone());
            }
            StmtKind::ClassDef(def) => {
                self.bound.insert(def.name.clone());
            }
            StmtKind::Import(aliases) => {
                for alias in aliases {
                    let name = alias
                        .asname
                        .as_deref()
                        .unwrap_or_else(|| alias.name.split('.').next().unwrap_or(&alias.name));
                    self.bound.insert(name.to_owned());
                }
            }
            StmtKind::ImportFrom(import) => {
                if let ImportNames::List(aliases) = &import.names {
                    for alias in aliases {
                        self.bound
                            .insert(alias.asname.as_ref().unwrap_or(&alias.name).clone());
                    }
                }
            }
            StmtKind::Assign { targets, .. } => {
                for target in targets {
                    self.target(target);
                }
            }
            StmtKind::AugAssign { target, .. } | StmtKind::AnnAssign { target, .. } => {
                self.target(target);
            }
            StmtKind::Delete(targets) => {
                for target in targets {
                    self.target(target);
                }
            }
            StmtKind::Global(names) => self.globals.extend(names.iter().cloned()),
            StmtKind::Nonlocal(names) => self.nonlocals.extend(names.iter().cloned()),
            StmtKind::If { body, orelse, .. } | StmtKind::While { body, orelse, .. } => {
                self.block(body);
                self.block(orelse);
            }
            StmtKind::For {
                target,
                body,
                orelse,
                ..
            } => {
                self.target(target);
                self.block(body);
                self.block(orelse);
            }
            StmtKind::Try(try_stmt) => {
                self.block(&try_stmt.body);
                for handler in &try_stmt.handlers {
                    if let Some(name) = &handler.name {
                        self.bound.insert(name.clone());
                    }
                    self.block(&handler.body);
                }
                self.block(&try_stmt.orelse);
                self.block(&try_stmt.finalbody);
            }
            StmtKind::With { items, body, .. } => {
                for item in items {
                    if let Some(target) = &item.target {
                        self.target(target);
                    }
                }
                self.block(body);
            }
            StmtKind::Expr(_)
            | StmtKind::Return(_)
            | StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Raise { .. }
            | StmtKind::Assert { .. } => {}
        }
    }

    fn target(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Name(name) => {
                self.bound.insert(name.clone());
            }
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for item in items {
                    self.target(item);
                }
            }
            ExprKind::Starred(inner) => self.target(inner),
            _ => {}
        }
    }
}
