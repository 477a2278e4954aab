use nbi_ir::{Constant, ExprKind, ImportNames, Program, StmtKind};
use pretty_assertions::assert_eq;

use crate::{parse, ParseError, ParseErrorKind};

fn program(source: &str) -> Program {
    match parse(source) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse at {}:{}: {err}", err.line, err.column),
    }
}

fn error(source: &str) -> ParseError {
    match parse(source) {
        Ok(program) => panic!("unexpectedly parsed: {program:?}"),
        Err(err) => err,
    }
}

#[test]
fn function_definition_with_every_parameter_kind() {
    let source = "\
@cache
@wrap(1)
def f(a, b: int = 2, *args, key, flag=False, **kw) -> str:
    return a
";
    let program = program(source);
    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected def");
    };
    assert_eq!(program.body[0].line, 3);
    assert_eq!(def.name, "f");
    assert_eq!(def.decorators.len(), 2);
    assert_eq!(
        def.params.names().collect::<Vec<_>>(),
        ["a", "b", "args", "key", "flag", "kw"]
    );
    assert_eq!(def.params.positional.len(), 2);
    assert_eq!(def.params.kwonly.len(), 2);
    assert!(def.params.positional[1].annotation.is_some());
    assert!(def.params.positional[1].default.is_some());
    assert!(def.returns.is_some());
    assert!(!def.is_async);
    assert_eq!(def.body.len(), 1);
}

#[test]
fn async_def_and_keyword_only_marker() {
    let program = program("async def run(*, timeout):\n    await tick()\n");
    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected def");
    };
    assert!(def.is_async);
    assert_eq!(def.params.vararg, None);
    assert_eq!(def.params.kwonly[0].name, "timeout");
}

#[test]
fn class_definition() {
    let program = program("class C(Base, metaclass=Meta):\n    x = 1\n    def m(self): pass\n");
    let StmtKind::ClassDef(def) = &program.body[0].kind else {
        panic!("expected class");
    };
    assert_eq!(def.name, "C");
    assert_eq!(def.bases.len(), 1);
    assert_eq!(def.keywords[0].0, "metaclass");
    assert_eq!(def.body.len(), 2);
}

#[test]
fn import_forms() {
    let program = program(
        "import os.path as p, sys\nfrom ..pkg.mod import (a as b, c,)\nfrom . import sibling\nfrom m import *\nfrom ... import up\n",
    );
    let StmtKind::Import(aliases) = &program.body[0].kind else {
        panic!("expected import");
    };
    assert_eq!(aliases[0].name, "os.path");
    assert_eq!(aliases[0].asname.as_deref(), Some("p"));
    assert_eq!(aliases[1].name, "sys");

    let StmtKind::ImportFrom(from) = &program.body[1].kind else {
        panic!("expected from-import");
    };
    assert_eq!(from.level, 2);
    assert_eq!(from.module.as_deref(), Some("pkg.mod"));
    let ImportNames::List(names) = &from.names else {
        panic!("expected names");
    };
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].asname.as_deref(), Some("b"));

    let StmtKind::ImportFrom(from) = &program.body[2].kind else {
        panic!("expected from-import");
    };
    assert_eq!((from.level, from.module.as_deref()), (1, None));

    let StmtKind::ImportFrom(from) = &program.body[3].kind else {
        panic!("expected from-import");
    };
    assert_eq!(from.names, ImportNames::Star);

    let StmtKind::ImportFrom(from) = &program.body[4].kind else {
        panic!("expected from-import");
    };
    assert_eq!(from.level, 3);
}

#[test]
fn assignment_forms() {
    let program = program("a = b = 1\nx, *rest = items\nn += 1\ny: int = 2\nz: str\nobj.attr[0] = v\n");
    let kinds: Vec<&str> = program.body.iter().map(|s| s.kind.describe()).collect();
    assert_eq!(
        kinds,
        [
            "assignment",
            "assignment",
            "augmented assignment",
            "assignment",
            "assignment",
            "assignment"
        ]
    );
    let StmtKind::Assign { targets, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(targets.len(), 2);
    let StmtKind::AnnAssign { value, .. } = &program.body[4].kind else {
        panic!("expected annotated assignment");
    };
    assert!(value.is_none());
}

#[test]
fn invalid_targets() {
    assert_eq!(
        error("f() = 1\n").kind,
        ParseErrorKind::InvalidTarget("function call")
    );
    assert_eq!(
        error("1 += x\n").kind,
        ParseErrorKind::InvalidTarget("literal")
    );
    assert_eq!(
        error("del f()\n").kind,
        ParseErrorKind::InvalidDeleteTarget("function call")
    );
}

#[test]
fn semicolons_split_statements() {
    let program = program("a = 1; b = 2;\nc = 3\n");
    assert_eq!(program.body.len(), 3);
    assert_eq!(program.body[1].line, 1);
    assert_eq!(program.body[2].line, 2);
}

#[test]
fn if_elif_else_nests() {
    let program = program("if a:\n    x\nelif b:\n    y\nelse:\n    z\n");
    let StmtKind::If { orelse, .. } = &program.body[0].kind else {
        panic!("expected if");
    };
    assert_eq!(orelse.len(), 1);
    assert_eq!(orelse[0].line, 3);
    let StmtKind::If { orelse: inner, .. } = &orelse[0].kind else {
        panic!("expected elif");
    };
    assert_eq!(inner[0].line, 6);
}

#[test]
fn loops_and_one_line_blocks() {
    let program = program(
        "for i, (a, b) in pairs: total += a\nelse: done()\nwhile n: n -= 1\n",
    );
    let StmtKind::For { target, orelse, .. } = &program.body[0].kind else {
        panic!("expected for");
    };
    assert!(matches!(target.kind, ExprKind::Tuple(_)));
    assert_eq!(orelse.len(), 1);
    assert!(matches!(program.body[1].kind, StmtKind::While { .. }));
}

#[test]
fn try_statement() {
    let source = "\
try:
    risky()
except (KeyError, IndexError) as err:
    handle(err)
except:
    pass
else:
    ok()
finally:
    cleanup()
";
    let program = program(source);
    let StmtKind::Try(stmt) = &program.body[0].kind else {
        panic!("expected try");
    };
    assert_eq!(stmt.handlers.len(), 2);
    assert_eq!(stmt.handlers[0].name.as_deref(), Some("err"));
    assert_eq!(stmt.handlers[0].line, 3);
    assert!(stmt.handlers[1].kind.is_none());
    assert_eq!(stmt.orelse.len(), 1);
    assert_eq!(stmt.finalbody.len(), 1);

    assert_eq!(error("try:\n    x\ny = 1\n").kind, ParseErrorKind::BareTry);
}

#[test]
fn with_raise_assert_global() {
    let program = program(
        "with open(p) as f, lock:\n    pass\nraise ValueError('x') from err\nassert ok, 'msg'\nglobal g, h\n",
    );
    let StmtKind::With { items, .. } = &program.body[0].kind else {
        panic!("expected with");
    };
    assert_eq!(items.len(), 2);
    assert!(items[1].target.is_none());
    assert!(matches!(
        program.body[1].kind,
        StmtKind::Raise {
            exc: Some(_),
            cause: Some(_)
        }
    ));
    assert!(matches!(
        program.body[2].kind,
        StmtKind::Assert { msg: Some(_), .. }
    ));
    assert_eq!(
        program.body[3].kind,
        StmtKind::Global(vec!["g".to_string(), "h".to_string()])
    );
}

#[test]
fn block_errors_carry_locations() {
    let err = error("def f():\nreturn 1\n");
    assert_eq!(err.kind, ParseErrorKind::ExpectedBlock("function definition"));
    assert_eq!(err.line, 2);

    let err = error("x = 1\n    y = 2\n");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedIndent);
    assert_eq!(err.line, 2);
}

#[test]
fn unsupported_statements() {
    assert_eq!(
        error("match command:\n    case 1:\n        pass\n").kind,
        ParseErrorKind::Unsupported("match statement")
    );
    assert_eq!(
        error("if (n := 3) > 2:\n    pass\n").kind,
        ParseErrorKind::Unsupported("assignment expression")
    );
}

#[test]
fn generator_bodies() {
    let program = program("def gen():\n    yield 1\n    x = yield\n    yield from range(3)\n");
    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected def");
    };
    assert!(def.is_generator());
    assert!(matches!(
        &def.body[0].kind,
        StmtKind::Expr(e) if matches!(e.kind, ExprKind::Yield(Some(_)))
    ));
    assert!(matches!(
        &def.body[1].kind,
        StmtKind::Assign { value, .. } if matches!(value.kind, ExprKind::Yield(None))
    ));
    assert!(matches!(
        &def.body[2].kind,
        StmtKind::Expr(e) if matches!(e.kind, ExprKind::YieldFrom(_))
    ));
}

#[test]
fn async_loops_and_context_managers() {
    let async_program = program(
        "async def f(xs, lock):\n    async for x in xs: ...\n    async with lock as held:\n        pass\n",
    );
    let StmtKind::FunctionDef(def) = &async_program.body[0].kind else {
        panic!("expected def");
    };
    assert!(matches!(def.body[0].kind, StmtKind::For { is_async: true, .. }));
    assert!(matches!(def.body[1].kind, StmtKind::With { is_async: true, .. }));

    let plain = program("for x in xs:\n    pass\n");
    assert!(matches!(plain.body[0].kind, StmtKind::For { is_async: false, .. }));
}

#[test]
fn match_is_still_a_name() {
    let program = program("match = re.match(p, s)\nmatch.group(0)\n");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn docstrings_are_expression_statements() {
    let program = program("def f():\n    \"\"\"Doc.\n\n    More.\n    \"\"\"\n    return 1\n");
    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected def");
    };
    let StmtKind::Expr(doc) = &def.body[0].kind else {
        panic!("expected docstring");
    };
    assert!(matches!(doc.kind, ExprKind::Constant(Constant::Str(_))));
    assert_eq!(def.body[1].line, 6);
}
