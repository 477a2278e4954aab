//! Importing single notebooks.

mod common;

use std::rc::Rc;

use common::{as_int, as_string, call, call_ok, Workspace};
use nbi_import::{ImportError, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn only_declarations_become_module_members() {
    let ws = Workspace::new();
    ws.notebook(
        "analysis.ipynb",
        &["print('running the whole analysis')\nROWS = 3\ndef rows():\n    return 3\n"],
    );
    let env = ws.env();
    let module = env.import_module("analysis").unwrap_or_else(|err| panic!("{err}"));

    assert!(module.get("rows").is_some());
    assert!(module.get("ROWS").is_none());
    assert_eq!(ws.output.get_output(), "");
    assert_eq!(ws.diagnostics.get_output(), "");
    assert_eq!(as_int(&call_ok(&env, "analysis", "rows")), 3);
}

#[test]
fn module_metadata_is_visible() {
    let ws = Workspace::new();
    let origin = ws.notebook("report.ipynb", &["def f():\n    return __name__\n"]);
    let env = ws.env();
    let module = env.import_module("report").unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(module.name(), "report");
    assert_eq!(module.origin(), Some(origin.as_path()));
    assert_eq!(module.loader(), Some("notebook"));
    assert!(!module.is_package());
    assert_eq!(as_string(&call_ok(&env, "report", "f")), "report");
    assert_eq!(
        module.get("__file__").as_ref().and_then(Value::as_str),
        Some(origin.display().to_string().as_str())
    );
}

#[test]
fn names_match_loosely() {
    let ws = Workspace::new();
    ws.notebook("3. Clean_Data.ipynb", &["def clean():\n    return 'clean'\n"]);
    let env = ws.env();
    env.import_module("clean_data").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_string(&call_ok(&env, "clean_data", "clean")), "clean");
    assert!(matches!(env.import_module("Clean"), Err(ImportError::NotFound(_))));
}

#[test]
fn later_cells_override_earlier_ones() {
    let ws = Workspace::new();
    ws.notebook(
        "versions.ipynb",
        &[
            "def version():\n    return 1\n",
            "def version():\n    return 2\n",
        ],
    );
    let env = ws.env();
    env.import_module("versions").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_int(&call_ok(&env, "versions", "version")), 2);
}

#[test]
fn one_line_definitions_later_cell_wins() {
    let ws = Workspace::new();
    ws.notebook("single.ipynb", &["def a(): return 1", "def a(): return 2"]);
    let env = ws.env();
    env.import_module("single").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_int(&call_ok(&env, "single", "a")), 2);
}

#[test]
fn invalid_cell_after_valid_one() {
    let ws = Workspace::new();
    ws.notebook("partial.ipynb", &["def ok(): return 1", "this is not valid syntax ("]);
    let env = ws.env();
    env.import_module("partial").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_int(&call_ok(&env, "partial", "ok")), 1);
    assert!(ws.diagnostics.get_output().contains("SyntaxError: "));
}

#[test]
fn broken_cells_do_not_abort_the_import() {
    let ws = Workspace::new();
    let origin = ws.notebook(
        "mixed.ipynb",
        &[
            "def broken(:\n    pass\n",
            "def first():\n    return 1\nfrom nowhere import thing\ndef skipped():\n    return 2\n",
            "def last():\n    return 3\n",
        ],
    );
    let env = ws.env();
    let module = env.import_module("mixed").unwrap_or_else(|err| panic!("{err}"));

    assert!(module.get("broken").is_none());
    assert!(module.get("first").is_some());
    assert!(module.get("skipped").is_none());
    assert!(module.get("last").is_some());

    let report = ws.diagnostics.get_output();
    assert!(
        report.contains(&format!("  File \"{}\", line 1\n", origin.display())),
        "{report}"
    );
    assert!(report.contains("SyntaxError: "), "{report}");
    assert!(
        report.contains(&format!("  File \"{} (cell 2)\", line 3, in <module>\n", origin.display())),
        "{report}"
    );
    assert!(
        report.contains("ModuleNotFoundError: No module named 'nowhere'\n"),
        "{report}"
    );
}

#[test]
fn tracebacks_name_the_cell_and_show_original_lines() {
    let ws = Workspace::new();
    let origin = ws.notebook_json(
        "errors.ipynb",
        &json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {},
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": "# Errors"},
                {"cell_type": "code", "metadata": {}, "outputs": [], "execution_count": 1,
                 "source": ["x = compute()\n", "def boom():\n", "    raise ValueError('bad input')\n"]}
            ]
        }),
    );
    let env = ws.env();
    env.import_module("errors").unwrap_or_else(|err| panic!("{err}"));

    let raised = call(&env, "errors", "boom")
        .err()
        .unwrap_or_else(|| panic!("boom returned"));
    assert_eq!(raised.type_name(), "ValueError");
    let traceback = env.render_traceback(&raised);
    assert_eq!(
        traceback,
        format!(
            "Traceback (most recent call last):\n  File \"{} (cell 2)\", line 3, in boom\n    raise ValueError('bad input')\nValueError: bad input\n",
            origin.display()
        )
    );
}

#[test]
fn class_bodies_and_functions_see_earlier_cells() {
    let ws = Workspace::new();
    ws.notebook(
        "model.ipynb",
        &[
            "def label():\n    return 'model'\n",
            "class Model:\n    name = label()\n    def describe(self):\n        return self.name + '!'\n",
            "def build():\n    return Model().describe()\n",
        ],
    );
    let env = ws.env();
    env.import_module("model").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_string(&call_ok(&env, "model", "build")), "model!");
}

#[test]
fn async_functions_are_kept() {
    let ws = Workspace::new();
    ws.notebook("jobs.ipynb", &["async def fetch():\n    return 5\n"]);
    let env = ws.env();
    env.import_module("jobs").unwrap_or_else(|err| panic!("{err}"));
    assert!(matches!(call_ok(&env, "jobs", "fetch"), Value::Coroutine(_)));
}

#[test]
fn session_accessor_is_shared() {
    let ws = Workspace::new();
    ws.notebook("one.ipynb", &["def session():\n    return get_ipython()\n"]);
    ws.notebook(
        "two.ipynb",
        &["def session():\n    return get_ipython()\ndef stable():\n    return get_ipython() is get_ipython()\n"],
    );
    let env = ws.env();
    env.import_module("one").unwrap_or_else(|err| panic!("{err}"));
    env.import_module("two").unwrap_or_else(|err| panic!("{err}"));

    let (Value::Session(first), Value::Session(second)) =
        (call_ok(&env, "one", "session"), call_ok(&env, "two", "session"))
    else {
        panic!("get_ipython() did not return the session");
    };
    assert!(Rc::ptr_eq(&first, &second));
    assert!(Rc::ptr_eq(&first, env.runtime().session()));
    assert!(matches!(call_ok(&env, "two", "stable"), Value::Bool(true)));
}

#[test]
fn version_three_documents_load() {
    let ws = Workspace::new();
    ws.notebook_json(
        "legacy.ipynb",
        &json!({
            "nbformat": 3,
            "nbformat_minor": 0,
            "metadata": {},
            "worksheets": [{
                "cells": [
                    {"cell_type": "heading", "level": 1, "source": ["Legacy"]},
                    {"cell_type": "code", "language": "python", "outputs": [],
                     "input": ["def old():\n", "    return 'v3'\n"]}
                ]
            }]
        }),
    );
    let env = ws.env();
    env.import_module("legacy").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_string(&call_ok(&env, "legacy", "old")), "v3");
}

#[test]
fn unreadable_documents_fail_the_import() {
    let ws = Workspace::new();
    ws.write("corrupt.ipynb", "{ not json");
    let env = ws.env();
    let err = env
        .import_module("corrupt")
        .err()
        .unwrap_or_else(|| panic!("corrupt notebook imported"));
    assert!(matches!(err, ImportError::Document(_)));
    assert!(err.to_string().contains("invalid notebook JSON"), "{err}");
    assert!(env.module("corrupt").is_none());
}

#[test]
fn missing_modules_raise_inside_cells() {
    let ws = Workspace::new();
    ws.notebook(
        "needs.ipynb",
        &["def probe():\n    try:\n        import absent\n    except ModuleNotFoundError as err:\n        return err.name\n"],
    );
    let env = ws.env();
    env.import_module("needs").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_string(&call_ok(&env, "needs", "probe")), "absent");
}
