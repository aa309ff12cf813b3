pub mod procedure;

use crate::Error;
use crate::MAX_EVAL_DEPTH;
use crate::ast::{List, NumericKind, Value};
use crate::builtinops::get_builtin_ops;
use procedure::Procedure;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Environment for identifier bindings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<Box<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    /// Child scope whose lookups fall back to `parent`
    pub fn with_parent(parent: Environment) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    pub fn define(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.get(name)))
    }

    /// Register a custom builtin function in the environment.
    ///
    /// The function receives the reduced operands exactly as the evaluator
    /// hands them over: a [`Value::List`] of arguments, or [`Value::EmptyList`]
    /// when the call has none.
    ///
    /// # Example
    /// ```
    /// use consxp::evaluator::{create_global_env, eval};
    /// use consxp::ast::{Value, sym, val};
    /// use consxp::Error;
    ///
    /// fn count_args(args: &Value) -> Result<Value, Error> {
    ///     match args {
    ///         Value::List(list) => Ok(val(list.len() as i64)),
    ///         _ => Ok(val(0)),
    ///     }
    /// }
    ///
    /// let mut env = create_global_env();
    /// env.register_builtin_function("count", count_args);
    /// let expr = val(vec![sym("count"), val(1), val(2)]);
    /// assert_eq!(eval(&expr, &env).unwrap(), val(2));
    /// ```
    pub fn register_builtin_function(
        &mut self,
        name: &str,
        func: fn(&Value) -> Result<Value, Error>,
    ) {
        self.register_procedure(Procedure::new(name, func));
    }

    /// Bind a procedure under its own id
    pub fn register_procedure(&mut self, procedure: Procedure) {
        debug!(id = procedure.id(), "registering procedure");
        self.bindings
            .insert(procedure.id().to_owned(), Value::Procedure(procedure));
    }

    /// Get all bindings in this environment and its parents
    /// Returns a Vec of (name, value) pairs sorted by name
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut bindings = HashMap::new();

        // Start with parent bindings (so they can be overridden by local bindings)
        if let Some(parent) = &self.parent {
            for (name, value) in parent.get_all_bindings() {
                bindings.insert(name, value);
            }
        }

        for (name, value) in &self.bindings {
            bindings.insert(name.clone(), value.clone());
        }

        let mut result: Vec<_> = bindings.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

/// Reduce an expression against `env` (public API)
pub fn eval(expr: &Value, env: &Environment) -> Result<Value, Error> {
    eval_with_depth_tracking(expr, env, 0).inspect_err(|err| {
        debug!(%expr, error = %err, "evaluation failed");
    })
}

/// Evaluate top-level expressions in order, returning the value of the last one.
/// An empty program evaluates to the empty list.
pub fn eval_program(exprs: &[Value], env: &Environment) -> Result<Value, Error> {
    exprs
        .iter()
        .try_fold(Value::EmptyList, |_, expr| eval(expr, env))
}

/// Evaluate an expression with depth tracking to prevent stack overflow
fn eval_with_depth_tracking(expr: &Value, env: &Environment, depth: usize) -> Result<Value, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::EvalError(format!(
            "Evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        )));
    }
    trace!(depth, %expr, "reducing");
    match expr {
        // Self-evaluating forms
        Value::Number(_) | Value::Pair(_) | Value::EmptyList | Value::Procedure(_) => {
            Ok(expr.clone())
        }

        Value::Identifier(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundIdentifier(name.clone())),

        // Application
        Value::List(elements) => {
            eval_list(elements, env, depth).map_err(|err| add_context(err, expr))
        }
    }
}

/// Helper function to add expression context to errors
fn add_context(error: Error, expr: &Value) -> Error {
    match error {
        Error::EvalError(msg) => {
            Error::EvalError(format!("{msg}\n  Context: while evaluating: {expr}"))
        }
        // Type mismatches, unbound identifiers and parse errors carry their own detail
        other => other,
    }
}

/// Reduce every element left to right, then apply the reduced head to the
/// reduced tail (`EmptyList` when the call has no operands).
fn eval_list(elements: &List, env: &Environment, depth: usize) -> Result<Value, Error> {
    let mut reduced = List::with_capacity(elements.len());
    for element in elements {
        reduced.push_back(eval_with_depth_tracking(element, env, depth + 1)?);
    }

    let Some((head, tail)) = reduced.split_first() else {
        return Err(Error::EvalError("Cannot evaluate empty list".to_owned()));
    };
    let procedure = head.downcast_ref::<Procedure>()?;
    trace!(id = procedure.id(), args = %tail, "applying");
    procedure.apply(&tail)
}

/// Create a global environment binding `+ - * /` over integers
pub fn create_global_env() -> Environment {
    create_global_env_with(NumericKind::Integer)
}

/// Create a global environment binding `+ - * /` over numbers of `kind`
pub fn create_global_env_with(kind: NumericKind) -> Environment {
    debug!(%kind, "building global environment");
    let mut env = Environment::new();
    for builtin_op in get_builtin_ops() {
        env.register_procedure(builtin_op.procedure(kind));
    }
    env
}
