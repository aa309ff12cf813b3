use crate::Error;
use crate::ast::Value;
use std::fmt;
use std::sync::Arc;

/// Erased native function type stored in every [`Procedure`].
///
/// A procedure receives its whole argument structure as one value (a list of
/// reduced operands, a raw pair, or the empty list) and validates it itself.
pub type ProcedureFn = dyn Fn(&Value) -> Result<Value, Error> + Send + Sync;

/// Native callable value. Cloning shares the underlying function.
#[derive(Clone)]
pub struct Procedure {
    id: String,
    func: Arc<ProcedureFn>,
}

impl Procedure {
    pub fn new<F>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Procedure {
            id: id.into(),
            func: Arc::new(func),
        }
    }

    /// Name the procedure was registered under
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Invoke the native function. No validation happens here.
    pub fn apply(&self, args: &Value) -> Result<Value, Error> {
        (self.func)(args)
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Procedure({})", self.id)
    }
}

/// Two procedures are equal when they share the same function (one is a clone of
/// the other) and carry the same id. Separately built procedures never compare
/// equal, so the integer `+` differs from the real `+`.
impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.func, &other.func)
    }
}
