//! On-disk notebook trees for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use nbi_eval::{buffer_sink, SharedOutput};
use nbi_import::{ImportConfig, ImportEnvironment, RaisedException, Value};
use serde_json::json;
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
    pub output: SharedOutput,
    pub diagnostics: SharedOutput,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}")),
            output: buffer_sink(),
            diagnostics: buffer_sink(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap_or_else(|err| panic!("mkdir {relative}: {err}"));
        path
    }

    /// nbformat 4 notebook whose cells are all code cells.
    pub fn notebook(&self, relative: &str, cells: &[&str]) -> PathBuf {
        let cells: Vec<_> = cells
            .iter()
            .map(|source| {
                json!({
                    "cell_type": "code",
                    "execution_count": null,
                    "metadata": {},
                    "outputs": [],
                    "source": source,
                })
            })
            .collect();
        self.notebook_json(relative, &json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {},
            "cells": cells,
        }))
    }

    pub fn notebook_json(&self, relative: &str, document: &serde_json::Value) -> PathBuf {
        self.write(relative, &document.to_string())
    }

    pub fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|err| panic!("mkdir: {err}"));
        }
        fs::write(&path, text).unwrap_or_else(|err| panic!("write {relative}: {err}"));
        path
    }

    /// Environment searching only this workspace, with captured sinks.
    pub fn env(&self) -> ImportEnvironment {
        ImportEnvironment::with_output(
            ImportConfig::new([self.root()]),
            SharedOutput::clone(&self.output),
            SharedOutput::clone(&self.diagnostics),
        )
    }
}

pub fn call(
    env: &ImportEnvironment,
    module: &str,
    function: &str,
) -> Result<Value, RaisedException> {
    let module = env
        .module(module)
        .unwrap_or_else(|| panic!("{module} is not imported"));
    let callee = module
        .get(function)
        .unwrap_or_else(|| panic!("{function} is not bound"));
    env.call(&callee, Vec::new())
}

pub fn call_ok(env: &ImportEnvironment, module: &str, function: &str) -> Value {
    call(env, module, function).unwrap_or_else(|err| panic!("{}", env.render_traceback(&err)))
}

pub fn as_int(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        _ => panic!("expected int"),
    }
}

pub fn as_string(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| panic!("expected str"))
}
