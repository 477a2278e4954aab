use nbi_ir::{Argument, BoolOp, Constant, Expr, ExprKind, FStringPart, StmtKind};
use pretty_assertions::assert_eq;

use crate::{parse, parse_expression, ParseErrorKind};

/// Compact prefix rendering so precedence is visible in one string.
fn dump(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Name(name) => name.clone(),
        ExprKind::Constant(Constant::Int(n)) => n.to_string(),
        ExprKind::Constant(Constant::Float(f)) => format!("{f:?}"),
        ExprKind::Constant(Constant::Str(s)) => format!("{s:?}"),
        ExprKind::Constant(Constant::Bytes(b)) => format!("b{:?}", String::from_utf8_lossy(b)),
        ExprKind::Constant(Constant::Imaginary(f)) => format!("{f:?}j"),
        ExprKind::Constant(Constant::None) => "None".to_string(),
        ExprKind::Constant(Constant::Bool(b)) => b.to_string(),
        ExprKind::Constant(Constant::Ellipsis) => "...".to_string(),
        ExprKind::FString(parts) => format!("f[{}]", parts.len()),
        ExprKind::List(items) => format!("[{}]", join(items)),
        ExprKind::Tuple(items) => format!("(tuple {})", join(items)),
        ExprKind::Dict(entries) => {
            let inner: Vec<String> = entries
                .iter()
                .map(|(k, v)| match k {
                    Some(k) => format!("{}: {}", dump(k), dump(v)),
                    None => format!("**{}", dump(v)),
                })
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        ExprKind::Set(items) => format!("(set {})", join(items)),
        ExprKind::Attribute { value, attr } => format!("{}.{attr}", dump(value)),
        ExprKind::Subscript { value, index } => format!("{}[{}]", dump(value), dump(index)),
        ExprKind::Slice { lower, upper, step } => {
            let part = |e: &Option<Box<Expr>>| e.as_deref().map(dump).unwrap_or_default();
            format!("{}:{}:{}", part(lower), part(upper), part(step))
        }
        ExprKind::Call { func, args } => {
            let args: Vec<String> = args
                .iter()
                .map(|arg| match arg {
                    Argument::Positional(e) => dump(e),
                    Argument::Keyword(k, e) => format!("{k}={}", dump(e)),
                    Argument::Unpack(e) => format!("*{}", dump(e)),
                    Argument::UnpackMapping(e) => format!("**{}", dump(e)),
                })
                .collect();
            format!("{}({})", dump(func), args.join(", "))
        }
        ExprKind::Binary { left, op, right } => {
            format!("({} {} {})", op.as_symbol(), dump(left), dump(right))
        }
        ExprKind::Unary { op, operand } => format!("({} {})", op.as_symbol(), dump(operand)),
        ExprKind::BoolOp { op, values } => {
            let name = if *op == BoolOp::And { "and" } else { "or" };
            format!("({name} {})", join(values))
        }
        ExprKind::Compare { left, ops } => {
            let mut out = format!("(cmp {}", dump(left));
            for (op, right) in ops {
                out.push_str(&format!(" {} {}", op.as_symbol(), dump(right)));
            }
            out.push(')');
            out
        }
        ExprKind::IfExp { test, body, orelse } => {
            format!("(if {} {} {})", dump(test), dump(body), dump(orelse))
        }
        ExprKind::Lambda(lambda) => {
            let names: Vec<&str> = lambda.params.names().collect();
            format!("(lambda [{}] {})", names.join(" "), dump(&lambda.body))
        }
        ExprKind::ListComp { elt, generators } => {
            format!("(listcomp {} x{})", dump(elt), generators.len())
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => format!(
            "(dictcomp {} {} x{})",
            dump(key),
            dump(value),
            generators.len()
        ),
        ExprKind::SetComp { elt, generators } => {
            let asynchronous = generators.iter().filter(|g| g.is_async).count();
            format!("(setcomp {} x{} async{asynchronous})", dump(elt), generators.len())
        }
        ExprKind::Await(inner) => format!("(await {})", dump(inner)),
        ExprKind::Yield(None) => "(yield)".to_string(),
        ExprKind::Yield(Some(value)) => format!("(yield {})", dump(value)),
        ExprKind::YieldFrom(inner) => format!("(yield-from {})", dump(inner)),
        ExprKind::Starred(inner) => format!("*{}", dump(inner)),
    }
}

fn join(items: &[Expr]) -> String {
    items.iter().map(dump).collect::<Vec<_>>().join(" ")
}

fn expr(source: &str) -> String {
    match parse_expression(source) {
        Ok(e) => dump(&e),
        Err(err) => panic!("{source:?} failed to parse: {err}"),
    }
}

fn expr_error(source: &str) -> ParseErrorKind {
    match parse_expression(source) {
        Ok(e) => panic!("{source:?} parsed as {}", dump(&e)),
        Err(err) => err.kind,
    }
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(expr("1 + 2 * 3"), "(+ 1 (* 2 3))");
    assert_eq!(expr("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    assert_eq!(expr("a - b - c"), "(- (- a b) c)");
    assert_eq!(expr("a // b % c"), "(% (// a b) c)");
}

#[test]
fn power_is_right_associative_and_binds_tighter_than_unary() {
    assert_eq!(expr("2 ** 3 ** 2"), "(** 2 (** 3 2))");
    assert_eq!(expr("-2 ** 2"), "(- (** 2 2))");
    assert_eq!(expr("2 ** -1"), "(** 2 (- 1))");
}

#[test]
fn bitwise_levels() {
    assert_eq!(expr("a | b ^ c & d << 1"), "(| a (^ b (& c (<< d 1))))");
}

#[test]
fn comparison_chains() {
    assert_eq!(expr("a < b <= c"), "(cmp a < b <= c)");
    assert_eq!(expr("x not in y"), "(cmp x not in y)");
    assert_eq!(expr("x is not None"), "(cmp x is not None)");
}

#[test]
fn boolean_operators() {
    assert_eq!(expr("a or b and not c"), "(or a (and b (not c)))");
    assert_eq!(expr("a and b and c"), "(and a b c)");
}

#[test]
fn conditional_expression() {
    assert_eq!(expr("a if t else b"), "(if t a b)");
    assert_eq!(expr("a if t else b if u else c"), "(if t a (if u b c))");
}

#[test]
fn lambdas() {
    assert_eq!(expr("lambda: 0"), "(lambda [] 0)");
    assert_eq!(expr("lambda x, *r, k=1, **kw: x"), "(lambda [x r k kw] x)");
}

#[test]
fn postfix_chains() {
    assert_eq!(expr("a.b(c)[d].e"), "a.b(c)[d].e");
    assert_eq!(
        expr("f(1, *xs, k=2, **kw)"),
        "f(1, *xs, k=2, **kw)"
    );
}

#[test]
fn slices() {
    assert_eq!(expr("xs[1:2]"), "xs[1:2:]");
    assert_eq!(expr("xs[::-1]"), "xs[::(- 1)]");
    assert_eq!(expr("m[i, 1:]"), "m[(tuple i 1::)]");
}

#[test]
fn displays() {
    assert_eq!(expr("[]"), "[]");
    assert_eq!(expr("[1, 2,]"), "[1 2]");
    assert_eq!(expr("()"), "(tuple )");
    assert_eq!(expr("(1,)"), "(tuple 1)");
    assert_eq!(expr("{'a': 1, 'b': 2}"), r#"{"a": 1, "b": 2}"#);
    assert_eq!(expr("a, *b"), "(tuple a *b)");
}

#[test]
fn comprehensions() {
    assert_eq!(expr("[x * 2 for x in xs if x]"), "(listcomp (* x 2) x1)");
    assert_eq!(expr("[a for b in c for a in b]"), "(listcomp a x2)");
    assert_eq!(expr("{k: v for k, v in items}"), "(dictcomp k v x1)");
    assert_eq!(expr("sum(x for x in xs)"), "sum((listcomp x x1))");
    assert_eq!(expr("(x for x in xs)"), "(listcomp x x1)");
}

#[test]
fn comprehension_condition_is_not_a_conditional_expression() {
    let parsed = parse_expression("[x for x in xs if x > 0]");
    let Ok(Expr {
        kind: ExprKind::ListComp { generators, .. },
        ..
    }) = parsed
    else {
        panic!("expected a list comprehension");
    };
    assert_eq!(generators[0].conditions.len(), 1);
    assert_eq!(dump(&generators[0].conditions[0]), "(cmp x > 0)");
}

#[test]
fn adjacent_strings_concatenate() {
    assert_eq!(expr("'a' 'b' \"c\""), r#""abc""#);
    assert_eq!(expr("'n=' f'{n}'"), "f[2]");
}

#[test]
fn await_binds_to_primary() {
    assert_eq!(expr("await f(x) + 1"), "(+ (await f(x)) 1)");
}

#[test]
fn set_displays_and_comprehensions() {
    assert_eq!(expr("{1, 2}"), "(set 1 2)");
    assert_eq!(expr("{a, *rest,}"), "(set a *rest)");
    assert_eq!(expr("{x for x in xs}"), "(setcomp x x1 async0)");
    assert_eq!(expr("{x async for x in xs if x}"), "(setcomp x x1 async1)");
    assert_eq!(expr("{}"), "{}");
}

#[test]
fn dict_displays_unpack_mappings() {
    assert_eq!(expr("{**a}"), "{**a}");
    assert_eq!(expr("{'k': 1, **a, **b | c}"), r#"{"k": 1, **a, **(| b c)}"#);
}

#[test]
fn bytes_and_imaginary_literals() {
    assert_eq!(expr("b'ab' b'cd'"), r#"b"abcd""#);
    assert_eq!(expr("1 + 2j"), "(+ 1 2.0j)");
    assert_eq!(expr_error("b'a' 'b'"), ParseErrorKind::MixedBytes);
    assert_eq!(expr_error("'a' b'b'"), ParseErrorKind::MixedBytes);
}

#[test]
fn parenthesized_yield() {
    assert_eq!(expr("(yield)"), "(yield)");
    assert_eq!(expr("(yield a, b)"), "(yield (tuple a b))");
    assert_eq!(expr("(yield from xs)"), "(yield-from xs)");
}

#[test]
fn unsupported_forms() {
    assert_eq!(
        expr_error("(y := 3)"),
        ParseErrorKind::Unsupported("assignment expression")
    );
    assert_eq!(expr_error("1 + yield"), ParseErrorKind::InvalidSyntax);
    assert_eq!(
        expr_error("f(a=1, 2)"),
        ParseErrorKind::PositionalAfterKeyword
    );
}

#[test]
fn expression_lines_follow_tokens() {
    let program = parse("x = (1 +\n     two)\n").unwrap_or_default();
    let StmtKind::Assign { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { right, .. } = &value.kind else {
        panic!("expected binary");
    };
    assert_eq!(value.line, 1);
    assert_eq!(right.line, 2);
}

#[test]
fn fstring_fields_parse_as_expressions() {
    let Ok(Expr {
        kind: ExprKind::FString(parts),
        ..
    }) = parse_expression("f'{a + b!r:>4}'")
    else {
        panic!("expected f-string");
    };
    let [FStringPart::Field {
        expr,
        conversion,
        spec,
    }] = parts.as_slice()
    else {
        panic!("expected one field");
    };
    assert_eq!(dump(expr), "(+ a b)");
    assert_eq!(*conversion, Some('r'));
    assert_eq!(spec.as_deref(), Some(">4"));
}
