use pretty_assertions::assert_eq;

use super::*;
use crate::print_handler::silent_sink;

#[test]
fn builtins_namespace_holds_functions_types_and_exceptions() {
    let runtime = Runtime::new(silent_sink());
    let builtins = runtime.builtins();
    assert!(matches!(builtins.get("print"), Some(Value::Builtin(Builtin::Print))));
    assert!(matches!(builtins.get("int"), Some(Value::Class(_))));
    assert!(matches!(builtins.get("KeyError"), Some(Value::Class(_))));
    assert!(!builtins.contains("get_ipython"));
}

#[test]
fn bool_is_an_int_subclass() {
    let runtime = Runtime::new(silent_sink());
    let bool_class = runtime.class_of(&Value::Bool(true));
    assert_eq!(bool_class.name, "bool");
    assert!(bool_class.is_subclass_of(runtime.type_class(TypeTag::Int)));
    assert!(bool_class.is_subclass_of(runtime.type_class(TypeTag::Object)));
}

#[test]
fn exception_hierarchy_follows_parents() {
    let runtime = Runtime::new(silent_sink());
    let not_found = runtime.exception_class(ExceptionKind::ModuleNotFoundError);
    let mro = not_found.mro();
    let names: Vec<&str> = mro.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["ModuleNotFoundError", "ImportError", "Exception", "BaseException", "object"]
    );
}

#[test]
fn session_is_stable_per_runtime() {
    let first = Runtime::new(silent_sink());
    let second = Runtime::new(silent_sink());
    assert_eq!(first.session().id(), first.session().id());
    assert_ne!(first.session().id(), second.session().id());
}

#[test]
fn recursion_limit_is_adjustable() {
    let mut runtime = Runtime::new(silent_sink());
    assert_eq!(runtime.recursion_limit(), 1000);
    runtime.set_recursion_limit(50);
    assert_eq!(runtime.recursion_limit(), 50);
}
