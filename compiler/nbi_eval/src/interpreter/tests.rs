use pretty_assertions::assert_eq;

use crate::compile::compile;
use crate::exception::RaisedException;
use crate::import_hook::NoImports;
use crate::line_cache::LineAttributionRecord;
use crate::namespace::Namespace;
use crate::print_handler::{buffer_sink, SharedOutput};
use crate::runtime::Runtime;
use crate::value::Value;

use super::Interpreter;

const CELL: &str = "<cell>";

struct Run {
    result: Result<(), RaisedException>,
    output: String,
    namespace: Namespace,
    traceback: Option<String>,
}

fn run_with(runtime: &Runtime, output: &SharedOutput, source: &str) -> Run {
    let program = nbi_parse::parse(source).unwrap_or_else(|err| panic!("parse failed: {err}"));
    let code = compile(program, CELL).unwrap_or_else(|err| panic!("compile failed: {err}"));
    runtime
        .line_cache()
        .install(LineAttributionRecord::new(CELL, source));
    let namespace = Namespace::new();
    namespace.set("__name__", Value::from("cells"));
    let interpreter = Interpreter::new(runtime, &NoImports);
    let result = interpreter.exec_code(&code, &namespace);
    let traceback = result
        .as_ref()
        .err()
        .map(|raised| interpreter.format_exception(raised));
    Run {
        result,
        output: output.get_output(),
        namespace,
        traceback,
    }
}

fn run(source: &str) -> Run {
    let output = buffer_sink();
    let runtime = Runtime::new(output.clone());
    run_with(&runtime, &output, source)
}

/// Printed output of a program that must succeed.
fn printed(source: &str) -> String {
    let run = run(source);
    if let Some(traceback) = run.traceback {
        panic!("program raised:\n{traceback}");
    }
    run.output
}

/// Last traceback line of a program that must fail.
fn error(source: &str) -> String {
    let run = run(source);
    let traceback = run
        .traceback
        .unwrap_or_else(|| panic!("program succeeded with output {:?}", run.output));
    traceback.trim_end().lines().last().unwrap_or_default().to_owned()
}

#[test]
fn arithmetic_follows_python_semantics() {
    assert_eq!(
        printed("print(1 + 2, 7 // 2, -7 // 2, 7 % -3, 2 ** 10, 1 / 2, 3 * 1.5)\n"),
        "3 3 -4 -2 1024 0.5 4.5\n"
    );
    assert_eq!(printed("print(True + True, 10 - 2.5, -(3))\n"), "2 7.5 -3\n");
}

#[test]
fn integer_overflow_raises() {
    assert_eq!(error("x = 2 ** 63\n"), "OverflowError: integer overflow");
}

#[test]
fn division_by_zero_messages() {
    assert_eq!(error("1 / 0\n"), "ZeroDivisionError: division by zero");
    assert_eq!(
        error("1 // 0\n"),
        "ZeroDivisionError: integer division or modulo by zero"
    );
}

#[test]
fn closures_share_cells_with_nonlocal() {
    let source = "\
def counter():
    count = 0
    def bump():
        nonlocal count
        count += 1
        return count
    return bump

c = counter()
c()
c()
print(c())
";
    assert_eq!(printed(source), "3\n");
}

#[test]
fn globals_are_rebound_by_global_declarations() {
    let source = "\
total = 0
def add(n):
    global total
    total = total + n
add(2)
add(5)
print(total)
";
    assert_eq!(printed(source), "7\n");
}

#[test]
fn classes_inherit_and_call_super() {
    let source = "\
class A:
    def __init__(self, x):
        self.x = x
    def describe(self):
        return f\"A({self.x})\"

class B(A):
    def __init__(self, x, y):
        super().__init__(x)
        self.y = y
    def describe(self):
        return super().describe() + f\"+{self.y}\"

b = B(1, 2)
print(b.describe(), isinstance(b, A), type(b).__name__)
";
    assert_eq!(printed(source), "A(1)+2 True B\n");
}

#[test]
fn diamond_inheritance_uses_c3_order() {
    let source = "\
class A:
    pass
class B(A):
    pass
class C(A):
    pass
class D(B, C):
    pass
print([k.__name__ for k in D.__mro__])
";
    assert_eq!(printed(source), "['D', 'B', 'C', 'A', 'object']\n");
}

#[test]
fn properties_and_class_level_methods() {
    let source = "\
class Temp:
    scale = 'C'
    def __init__(self):
        self._value = 0
    @property
    def value(self):
        return self._value
    @value.setter
    def value(self, new):
        self._value = new * 2
    @classmethod
    def unit(cls):
        return cls.scale
    @staticmethod
    def zero():
        return 0

t = Temp()
t.value = 21
print(t.value, Temp.unit(), t.zero())
";
    assert_eq!(printed(source), "42 C 0\n");
}

#[test]
fn dunder_methods_drive_operators_and_repr() {
    let source = "\
class V:
    def __init__(self, x):
        self.x = x
    def __add__(self, other):
        return V(self.x + other.x)
    def __eq__(self, other):
        return self.x == other.x
    def __repr__(self):
        return f'V({self.x})'
    def __len__(self):
        return self.x

print(V(1) + V(2), V(3) == V(3), len(V(4)), bool(V(0)))
";
    assert_eq!(printed(source), "V(3) True 4 False\n");
}

#[test]
fn try_except_else_finally_ordering() {
    let source = "\
def attempt(d, k):
    try:
        v = d[k]
    except KeyError as e:
        print('missing', e)
    else:
        print('found', v)
    finally:
        print('done')

attempt({'a': 1}, 'a')
attempt({}, 'b')
";
    assert_eq!(printed(source), "found 1\ndone\nmissing 'b'\ndone\n");
}

#[test]
fn finally_return_overrides_exception() {
    let source = "\
def f():
    try:
        raise ValueError('lost')
    finally:
        return 'kept'
print(f())
";
    assert_eq!(printed(source), "kept\n");
}

#[test]
fn custom_exceptions_and_chaining() {
    let source = "\
class AppError(Exception):
    pass

try:
    try:
        int('x')
    except ValueError as e:
        raise AppError('wrapped') from e
except AppError as err:
    print(type(err).__name__, err, isinstance(err, Exception))
";
    assert_eq!(printed(source), "AppError wrapped True\n");
}

#[test]
fn uncaught_exception_keeps_earlier_bindings() {
    let run = run("x = 1\ny = undefined_name\nz = 3\n");
    let raised = run.result.err().unwrap_or_else(|| panic!("expected NameError"));
    assert_eq!(raised.type_name(), "NameError");
    assert_eq!(
        raised.message().as_deref(),
        Some("name 'undefined_name' is not defined")
    );
    assert!(run.namespace.contains("x"));
    assert!(!run.namespace.contains("z"));
}

#[test]
fn traceback_shows_cell_lines() {
    let source = "\
def f():
    return 1 / 0
f()
";
    let traceback = run(source).traceback.unwrap_or_default();
    assert_eq!(
        traceback,
        "Traceback (most recent call last):\n  \
         File \"<cell>\", line 3, in <module>\n    f()\n  \
         File \"<cell>\", line 2, in f\n    return 1 / 0\n\
         ZeroDivisionError: division by zero\n"
    );
}

#[test]
fn recursion_limit_raises_recursion_error() {
    let output = buffer_sink();
    let mut runtime = Runtime::new(output.clone());
    runtime.set_recursion_limit(50);
    let run = run_with(&runtime, &output, "def f(n):\n    return f(n + 1)\nf(0)\n");
    let traceback = run.traceback.unwrap_or_default();
    assert!(traceback.contains("[Previous line repeated"), "{traceback}");
    assert!(
        traceback.ends_with("RecursionError: maximum recursion depth exceeded\n"),
        "{traceback}"
    );
}

#[test]
fn comprehensions_have_their_own_scope() {
    let source = "\
x = 'outer'
squares = [x * x for x in range(6) if x % 2 == 0]
table = {k: v for k, v in zip('ab', [1, 2])}
print(squares, table, x)
";
    assert_eq!(printed(source), "[0, 4, 16] {'a': 1, 'b': 2} outer\n");
}

#[test]
fn unpacking_with_star_target() {
    assert_eq!(
        printed("a, *b, c = [1, 2, 3, 4]\nprint(a, b, c)\n"),
        "1 [2, 3] 4\n"
    );
    assert_eq!(
        error("a, b = [1, 2, 3]\n"),
        "ValueError: too many values to unpack (expected 2)"
    );
}

#[test]
fn string_formatting_flavours() {
    let source = "\
name = 'nb'
print(f'{3.14159:.2f}|{42:>5}|{name!r}')
print('{} and {k}'.format(1, k='x'))
print('%s-%03d' % ('a', 7))
";
    assert_eq!(printed(source), "3.14|   42|'nb'\n1 and x\na-007\n");
}

#[test]
fn builtin_functions() {
    let source = "\
words = ['pear', 'fig', 'apple']
print(sorted(words), sorted(words, key=len, reverse=True))
print(min(3, 1, 2), max(words, key=len), sum([1, 2, 3], 10))
print(list(enumerate('ab', 1)), any([0, 1]), all([]))
print(round(2.5), round(3.5), round(1.26, 1), abs(-4))
print(getattr(words, 'missing', 'dflt'), hasattr(words, 'append'))
print(int('0x1f', 16), float('1.5'), str(12), chr(65), ord('a'))
";
    assert_eq!(
        printed(source),
        "['apple', 'fig', 'pear'] ['apple', 'pear', 'fig']\n\
         1 apple 16\n\
         [(1, 'a'), (2, 'b')] True True\n\
         2 4 1.3 4\n\
         dflt True\n\
         31 1.5 12 A 97\n"
    );
}

#[test]
fn container_methods() {
    let source = "\
items = [3, 1, 2]
items.append(4)
items.sort()
items.insert(0, 0)
last = items.pop()
d = {'a': 1}
d.update(b=2)
d.setdefault('c', 3)
print(items, last, d.get('z', 'none'), list(d.items()))
print(' '.join(['a', 'b']), 'a,b,,c'.split(','), '  pad '.strip(), 'x'.upper())
";
    assert_eq!(
        printed(source),
        "[0, 1, 2, 3] 4 none [('a', 1), ('b', 2), ('c', 3)]\n\
         a b ['a', 'b', '', 'c'] pad X\n"
    );
}

#[test]
fn slicing_lists_and_strings() {
    let source = "\
xs = list(range(10))
print(xs[2:5], xs[::-3], 'hello'[1:-1])
xs[1:3] = ['a']
del xs[-1]
print(xs)
";
    assert_eq!(
        printed(source),
        "[2, 3, 4] [9, 6, 3, 0] ell\n[0, 'a', 3, 4, 5, 6, 7, 8]\n"
    );
}

#[test]
fn with_statement_runs_exit_and_can_suppress() {
    let source = "\
class Quiet:
    def __enter__(self):
        print('enter')
        return self
    def __exit__(self, kind, value, tb):
        print('exit', kind.__name__)
        return True

with Quiet() as q:
    raise KeyError('x')
print('after')
";
    assert_eq!(printed(source), "enter\nexit KeyError\nafter\n");
}

#[test]
fn coroutines_run_only_when_awaited() {
    let source = "\
async def inner():
    print('inner ran')
    return 5

pending = inner()
print(type(pending).__name__)
";
    assert_eq!(printed(source), "coroutine\n");
}

#[test]
fn awaiting_chains_coroutines() {
    let output = buffer_sink();
    let runtime = Runtime::new(output.clone());
    let source = "\
async def inner():
    return 5

async def outer():
    return await inner() + 1
";
    let run = run_with(&runtime, &output, source);
    assert!(run.result.is_ok());
    let outer = run
        .namespace
        .get("outer")
        .unwrap_or_else(|| panic!("outer not defined"));
    let interpreter = Interpreter::new(&runtime, &NoImports);
    let coroutine = interpreter
        .call(&outer, Vec::new())
        .unwrap_or_else(|err| panic!("{err:?}"));
    let result = interpreter
        .await_value(&coroutine)
        .unwrap_or_else(|err| panic!("{err:?}"));
    assert!(matches!(result, Value::Int(6)));
    assert!(interpreter.await_value(&coroutine).is_err());
}

#[test]
fn argument_binding_errors() {
    let source = "def f(a, b=1, *, c):\n    return a\nf(1, 2, 3)\n";
    assert_eq!(
        error(source),
        "TypeError: f() takes from 1 to 2 positional arguments but 3 were given"
    );
    assert_eq!(
        error("def g(a):\n    return a\ng(1, a=2)\n"),
        "TypeError: g() got multiple values for argument 'a'"
    );
}

#[test]
fn attribute_errors_name_the_type() {
    assert_eq!(
        error("x = 1\nx.missing\n"),
        "AttributeError: 'int' object has no attribute 'missing'"
    );
    assert_eq!(
        error("class C:\n    pass\nC.nope\n"),
        "AttributeError: type object 'C' has no attribute 'nope'"
    );
}

#[test]
fn imports_go_through_the_hook() {
    assert_eq!(
        error("import missing.child\n"),
        "ModuleNotFoundError: No module named 'missing.child'"
    );
    assert_eq!(
        error("from . import sibling\n"),
        "ImportError: attempted relative import with no known parent package"
    );
}

#[test]
fn public_api_calls_functions_with_keywords() {
    let output = buffer_sink();
    let runtime = Runtime::new(output.clone());
    let run = run_with(
        &runtime,
        &output,
        "def greet(name, punct='!'):\n    return 'hi ' + name + punct\n",
    );
    let greet = run
        .namespace
        .get("greet")
        .unwrap_or_else(|| panic!("greet not defined"));
    let interpreter = Interpreter::new(&runtime, &NoImports);
    let value = interpreter
        .call_with_keywords(
            &greet,
            vec![Value::from("nb")],
            vec![("punct".to_owned(), Value::from("?"))],
        )
        .unwrap_or_else(|err| panic!("{err:?}"));
    assert_eq!(interpreter.str_of(&value).ok().as_deref(), Some("hi nb?"));
    assert_eq!(interpreter.repr_of(&value).ok().as_deref(), Some("'hi nb?'"));
}

#[test]
fn generators_hand_out_yielded_values_in_order() {
    let source = "\
def gen():
    yield 1
    yield from [2, 3]
    yield

g = gen()
print(next(g), list(g))
print(next(g, 'done'))

def countdown(n):
    while n:
        yield n
        n -= 1

print([v for v in countdown(3)], sum(countdown(4)))
print(type(gen()).__name__, repr(gen()).startswith('<generator object gen at 0x'))
";
    assert_eq!(
        printed(source),
        "1 [2, 3, None]\ndone\n[3, 2, 1] 10\ngenerator True\n"
    );
}

#[test]
fn generator_errors() {
    assert_eq!(
        error("def gen():\n    yield 1\ng = gen()\nnext(g)\nnext(g)\n"),
        "StopIteration"
    );
    let reentrant = "\
def selfish():
    yield next(g)
g = selfish()
next(g)
";
    assert_eq!(error(reentrant), "ValueError: generator already executing");
    let broken = "\
def broken():
    yield 1
    raise KeyError('k')
list(broken())
";
    assert_eq!(error(broken), "KeyError: 'k'");
    assert_eq!(error("next([1])\n"), "TypeError: 'list' object is not an iterator");
}

#[test]
fn bytes_literals_and_conversions() {
    let source = r"
data = b'ab' + bytes([99])
print(data, len(data), data[0], data[-1:], b'b' in data, 97 in data)
print('café'.encode(), b'caf\xc3\xa9'.decode('utf-8'))
print(bytes(3), bytes('hi', 'ascii'), list(b'hi'), b'x' * 3)
";
    assert_eq!(
        printed(source),
        "b'abc' 3 97 b'c' True True\nb'caf\\xc3\\xa9' caf\u{e9}\nb'\\x00\\x00\\x00' b'hi' [104, 105] b'xxx'\n"
    );
    assert_eq!(
        error("bytes('hi')\n"),
        "TypeError: string argument without an encoding"
    );
    assert_eq!(
        error("bytes([256])\n"),
        "ValueError: bytes must be in range(0, 256)"
    );
}

#[test]
fn complex_arithmetic() {
    let source = "\
z = (1 + 2j) * (3 - 1j)
print(z, z.real, z.imag, z.conjugate(), abs(3 + 4j))
print(1j ** 2, complex(1, 2) == 1 + 2j, 2j / 1j, -(1 + 1j), 2j)
";
    assert_eq!(
        printed(source),
        "(5+5j) 5.0 5.0 (5-5j) 5.0\n(-1+0j) True (2+0j) (-1-1j) 2j\n"
    );
    assert_eq!(
        error("1j < 2j\n"),
        "TypeError: '<' not supported between instances of 'complex' and 'complex'"
    );
    assert_eq!(error("1j / 0\n"), "ZeroDivisionError: complex division by zero");
}

#[test]
fn sets_keep_insertion_order() {
    let source = "\
s = {3, 1, 3, 2}
s.add(4)
s.discard(9)
print(s, len(s), 2 in s, set())
print({1, 2} | {2, 5}, {1, 2} & {2, 5}, {1, 2} - {2}, {1, 2} ^ {2, 5})
print({1, 2} <= {1, 2, 3}, {1, 2} < {1, 2}, {x % 3 for x in range(10)}, {1, 2} == {2, 1})
s |= {7}
print(s.pop(), s.union([8]), s.issuperset({1}))
";
    assert_eq!(
        printed(source),
        "{3, 1, 2, 4} 4 True set()\n\
         {1, 2, 5} {2} {1} {1, 5}\n\
         True False {0, 1, 2} True\n\
         7 {3, 1, 2, 4, 8} True\n"
    );
    assert_eq!(error("{[1]}\n"), "TypeError: unhashable type: 'list'");
    assert_eq!(error("set().pop()\n"), "KeyError: 'pop from an empty set'");
}

#[test]
fn dict_displays_merge_unpacked_mappings() {
    assert_eq!(
        printed("a = {'x': 1}\nprint({**a, 'y': 2, **{'x': 3}})\n"),
        "{'x': 3, 'y': 2}\n"
    );
    assert_eq!(error("{**[1]}\n"), "TypeError: 'list' object is not a mapping");
}

#[test]
fn huge_repetitions_fail_without_allocating() {
    assert_eq!(error("[0] * 10000000000000\n"), "MemoryError");
    assert_eq!(error("'ab' * 10000000000000\n"), "MemoryError");
    assert_eq!(error("bytes(10000000000000)\n"), "MemoryError");
    assert_eq!(
        error("(0, 1, 2) * 9223372036854775807\n"),
        "OverflowError: repeated sequence is too long"
    );
    assert_eq!(printed("print(len([None] * 1000), [] * 10000000000000)\n"), "1000 []\n");
}

#[test]
fn async_loops_and_context_managers() {
    let output = buffer_sink();
    let runtime = Runtime::new(output.clone());
    let source = "\
async def agen(n):
    for i in range(n):
        yield i * 10

class Ticker:
    def __init__(self, n):
        self.n = n
    def __aiter__(self):
        return self
    async def __anext__(self):
        if self.n == 0:
            raise StopAsyncIteration
        self.n -= 1
        return self.n

class Guard:
    async def __aenter__(self):
        print('enter')
        return 'guarded'
    async def __aexit__(self, kind, exc, tb):
        print('exit', kind is None)

async def main():
    seen = []
    async for value in agen(3):
        seen.append(value)
    async for tick in Ticker(2):
        seen.append(tick)
    async with Guard() as g:
        seen.append(g)
    return seen + [x async for x in agen(2)]

async def plain():
    async for x in [1]:
        pass
";
    let run = run_with(&runtime, &output, source);
    assert!(run.result.is_ok());
    let interpreter = Interpreter::new(&runtime, &NoImports);
    let call = |name: &str| {
        let function = run
            .namespace
            .get(name)
            .unwrap_or_else(|| panic!("{name} not defined"));
        let coroutine = interpreter
            .call(&function, Vec::new())
            .unwrap_or_else(|err| panic!("{err:?}"));
        interpreter.await_value(&coroutine)
    };
    let seen = call("main").unwrap_or_else(|err| panic!("{err:?}"));
    assert_eq!(
        interpreter.repr_of(&seen).ok().as_deref(),
        Some("[0, 10, 20, 1, 0, 'guarded', 0, 10]")
    );
    assert_eq!(output.get_output(), "enter\nexit True\n");
    let raised = call("plain").err().unwrap_or_else(|| panic!("plain() succeeded"));
    assert_eq!(
        interpreter.exception_summary(&raised.exception),
        "TypeError: 'async for' requires an object with __aiter__ method, got list"
    );
}
