//! vexpr evaluator as a WASM module for browser environments.
//!
//! This crate exposes [`vexpr_eval`] via `wasm-bindgen`. Named vectors are
//! passed in as a JSON object mapping names to arrays of numbers.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { evaluate } from 'vexpr-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(evaluate("x * 2 + mean(x)", '{"x": [1, 2, 3]}'));
//! // { success: true, values: [4, 6, 8], error: null, message: null }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vexpr_eval::{EvalOptions, Evaluator, FunctionRegistry};
use vexpr_types::{EvalError, MapResolver};
use wasm_bindgen::prelude::*;

/// Result envelope returned to JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResponse {
    pub success: bool,
    /// Active elements of the result, when evaluation succeeded.
    pub values: Option<Vec<f64>>,
    /// Structured evaluation error.
    pub error: Option<EvalError>,
    /// Human-readable rendering of the failure.
    pub message: Option<String>,
}

impl EvalResponse {
    fn from_result(result: Result<Vec<f64>, EvalError>) -> Self {
        match result {
            Ok(values) => Self {
                success: true,
                values: Some(values),
                error: None,
                message: None,
            },
            Err(error) => Self {
                success: false,
                values: None,
                message: Some(error.to_string()),
                error: Some(error),
            },
        }
    }

    fn invalid_input(what: &str, detail: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            values: None,
            error: None,
            message: Some(format!("invalid {what}: {detail}")),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"success":false,"values":null,"error":null,"message":"Serialization error: {}"}}"#,
                e
            )
        })
    }
}

fn run(expression: &str, bindings: HashMap<String, Vec<f64>>, options: EvalOptions) -> EvalResponse {
    let resolver: MapResolver = bindings.into_iter().collect();
    let result = Evaluator::new(options)
        .evaluate(expression, &resolver)
        .map(|v| v.into_values());
    EvalResponse::from_result(result)
}

fn parse_bindings(bindings_json: &str) -> Result<HashMap<String, Vec<f64>>, EvalResponse> {
    if bindings_json.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(bindings_json).map_err(|e| EvalResponse::invalid_input("bindings", e))
}

/// Evaluate a vector expression.
///
/// `bindings_json` is a JSON object such as `{"x": [1, 2, 3]}`; an empty
/// string means no bindings. Returns a JSON [`EvalResponse`].
#[wasm_bindgen]
pub fn evaluate(expression: &str, bindings_json: &str) -> String {
    match parse_bindings(bindings_json) {
        Ok(bindings) => run(expression, bindings, EvalOptions::default()).to_json(),
        Err(response) => response.to_json(),
    }
}

/// Evaluate with options, e.g. `{"random_seed": 7, "max_depth": 32}`.
///
/// Absent option fields take their defaults.
#[wasm_bindgen]
pub fn evaluate_with_options(expression: &str, bindings_json: &str, options_json: &str) -> String {
    let bindings = match parse_bindings(bindings_json) {
        Ok(bindings) => bindings,
        Err(response) => return response.to_json(),
    };
    let options = if options_json.trim().is_empty() {
        EvalOptions::default()
    } else {
        match serde_json::from_str(options_json) {
            Ok(options) => options,
            Err(e) => return EvalResponse::invalid_input("options", e).to_json(),
        }
    };
    run(expression, bindings, options).to_json()
}

/// Evaluate with bindings passed as a plain JavaScript object, returning
/// the [`EvalResponse`] as a JavaScript object.
#[wasm_bindgen(js_name = evaluateObject)]
pub fn evaluate_object(expression: &str, bindings: JsValue) -> Result<JsValue, JsValue> {
    let response = match serde_wasm_bindgen::from_value::<HashMap<String, Vec<f64>>>(bindings) {
        Ok(bindings) => run(expression, bindings, EvalOptions::default()),
        Err(e) => EvalResponse::invalid_input("bindings", e),
    };
    serde_wasm_bindgen::to_value(&response).map_err(JsValue::from)
}

/// Return the builtin function names as a JSON array, sorted.
#[wasm_bindgen]
pub fn function_names() -> String {
    serde_json::to_string(&FunctionRegistry::global().names()).unwrap_or_else(|_| "[]".to_string())
}

/// Return the evaluator version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
