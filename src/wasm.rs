use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::config::SolverConfig;
use crate::equation::{Equation, ParseEquationError, SolutionMode, Solutions};

impl From<ParseEquationError> for JsValue {
    fn from(e: ParseEquationError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

fn to_array(solutions: Solutions) -> Array {
    solutions.into_iter().map(|d| JsValue::from_str(&d)).collect()
}

fn mode(unique: bool) -> SolutionMode {
    if unique { SolutionMode::Unique } else { SolutionMode::All }
}

/// Solve `a : b :: c : x` with the default configuration, returning the solutions as an array of strings.
#[wasm_bindgen(js_name = solveAnalogy)]
pub fn solve_analogy(a: &str, b: &str, c: &str, unique: bool) -> Array {
    to_array(Equation::new(a, b, c).solve(&SolverConfig::default(), mode(unique)))
}

/// Solve an equation written as `A : B :: C : D`, where `D` is ignored.
#[wasm_bindgen(js_name = solveNotation)]
pub fn solve_notation(notation: &str, unique: bool) -> Result<Array, JsValue> {
    let equation: Equation = notation.parse()?;
    Ok(to_array(equation.solve(&SolverConfig::default(), mode(unique))))
}
