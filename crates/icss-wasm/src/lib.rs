//! WASM bindings for the ICSS compiler.
//!
//! Exposes `compile()` and `check()` to JavaScript via wasm-bindgen.
//! `compile` returns the CSS text or throws; `check` returns an array of
//! `{ kind, message, line, column, target }` objects.

use icss_semantic::{Diagnostic, DiagnosticKind, NodeTarget};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Compile ICSS source to CSS.
///
/// Throws a JS error if parsing fails or the stylesheet does not type check.
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<String, JsError> {
    icss_codegen::compile(source).map_err(|e| JsError::new(&compile_error_message(&e)))
}

/// Type check ICSS source without generating CSS.
///
/// Returns an empty array for a clean stylesheet. Throws only on a parse
/// error.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<JsValue, JsError> {
    let report = check_source(source).map_err(|e| JsError::new(&e))?;

    let array = js_sys::Array::new();
    for entry in &report {
        let value = serde_wasm_bindgen::to_value(entry)
            .map_err(|e| JsError::new(&format!("Failed to serialize diagnostic: {e}")))?;
        array.push(&value);
    }
    Ok(array.into())
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A diagnostic as seen from JavaScript: flat, camelCase, no nested span.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDiagnostic {
    kind: DiagnosticKind,
    message: String,
    line: usize,
    column: usize,
    target: NodeTarget,
}

impl From<Diagnostic> for JsDiagnostic {
    fn from(d: Diagnostic) -> Self {
        Self {
            kind: d.kind,
            message: d.message,
            line: d.span.line,
            column: d.span.column,
            target: d.target,
        }
    }
}

fn check_source(source: &str) -> Result<Vec<JsDiagnostic>, String> {
    let sheet = icss_parser::Parser::parse(source).map_err(|e| e.to_string())?;
    Ok(icss_semantic::check(&sheet)
        .into_iter()
        .map(JsDiagnostic::from)
        .collect())
}

/// Type errors are joined into one message so a thrown JS error carries all of them.
fn compile_error_message(error: &icss_codegen::CompileError) -> String {
    match error {
        icss_codegen::CompileError::Check(diagnostics) => {
            let mut lines = vec![error.to_string()];
            lines.extend(diagnostics.iter().map(ToString::to_string));
            lines.join("\n")
        }
        other => other.to_string(),
    }
}
