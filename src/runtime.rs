use std::collections::HashMap;
use std::sync::OnceLock;

use crate::errors::RuntimeError;
use crate::functions::{register_builtins, Function};
use crate::value::Value;

/// The function registry consulted during evaluation.
///
/// A new runtime starts with the 26 built-ins registered. Register any
/// extensions before sharing the runtime across threads; lookups never
/// mutate it, so concurrent searches do not contend.
pub struct Runtime {
    functions: HashMap<String, Box<dyn Function>>,
}

impl Runtime {
    pub fn new() -> Self {
        let mut functions = HashMap::new();
        register_builtins(&mut functions);
        Runtime { functions }
    }

    /// Adds a caller-defined function. Re-registering a name replaces
    /// the previous entry, built-ins included.
    pub fn register(&mut self, name: &str, function: Box<dyn Function>) {
        self.functions.insert(name.to_string(), function);
    }

    /// Looks up a function by exact name, validates the evaluated
    /// arguments against its signature, and invokes it.
    pub(crate) fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?;
        function.signature().validate(name, args)?;
        function.invoke(args, self)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}

/// The shared runtime used by [`crate::Expression::search`]. Built on
/// first use and never extended afterwards.
pub(crate) fn default_runtime() -> &'static Runtime {
    static DEFAULT: OnceLock<Runtime> = OnceLock::new();
    DEFAULT.get_or_init(Runtime::new)
}
