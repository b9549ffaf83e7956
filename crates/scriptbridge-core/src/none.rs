//! The inert interpreter.
//!
//! [`NoInterpreter`] satisfies [`ScriptInterpreter`] without evaluating
//! anything. Discovery falls back to it when no provider is registered, and it
//! backs [`ScriptLanguage::None`] in the cache.

use crate::class_table::ClassDescriptor;
use crate::error::ScriptResult;
use crate::interpreter::{ContextScope, OutputSink, ParsedScript, ScriptInterpreter};
use crate::language::ScriptLanguage;
use crate::provider::InterpreterProvider;
use crate::value::ScriptValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Interpreter that does nothing.
#[derive(Debug, Default)]
pub struct NoInterpreter {
    closed: AtomicBool,
}

impl NoInterpreter {
    pub fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
        }
    }
}

impl ScriptInterpreter for NoInterpreter {
    fn language(&self) -> ScriptLanguage {
        ScriptLanguage::None
    }

    fn run_script(&self, _path: &str) -> ScriptResult<ParsedScript> {
        Ok(ParsedScript::noop())
    }

    fn run_command(&self, _source: &str) -> ScriptResult<ScriptValue> {
        Ok(ScriptValue::empty())
    }

    fn print(&self, _text: &str) {}

    fn set_output(&self, _sink: OutputSink) {}

    fn class_methods(&self, _class: &ClassDescriptor) -> ScriptValue {
        ScriptValue::empty()
    }

    fn file_header(&self) -> &str {
        ""
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) -> ScriptResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider for [`NoInterpreter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterpreterProvider;

impl NoInterpreterProvider {
    pub fn new() -> Self {
        Self
    }

    /// Build a [`NoInterpreter`] directly.
    pub fn interpreter(&self) -> Arc<dyn ScriptInterpreter> {
        Arc::new(NoInterpreter::new())
    }
}

impl InterpreterProvider for NoInterpreterProvider {
    fn language(&self) -> ScriptLanguage {
        ScriptLanguage::None
    }

    fn name(&self) -> &str {
        "No Interpreter"
    }

    fn create(&self, _scope: ContextScope) -> ScriptResult<Arc<dyn ScriptInterpreter>> {
        Ok(self.interpreter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_table::MethodSignature;

    fn interpreter() -> Arc<dyn ScriptInterpreter> {
        NoInterpreterProvider::new().interpreter()
    }

    #[test]
    fn test_run_script() {
        let parsed = interpreter().run_script("").unwrap();
        parsed.run().unwrap();

        let parsed = interpreter().run_script("does/not/exist.rb").unwrap();
        parsed.run().unwrap();
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(interpreter().file_extension(), "txt");
    }

    #[test]
    fn test_file_header() {
        assert_eq!(interpreter().file_header(), "");
    }

    #[test]
    fn test_class_methods() {
        let string = ClassDescriptor::new("String").method(MethodSignature::new("len"));
        let integer = ClassDescriptor::new("Integer");

        assert_eq!(interpreter().class_methods(&string), ScriptValue::empty());
        assert_eq!(interpreter().class_methods(&integer), ScriptValue::empty());
    }

    #[test]
    fn test_run_command() {
        assert_eq!(interpreter().run_command("azerty").unwrap(), ScriptValue::empty());
        assert_eq!(interpreter().run_command("").unwrap(), ScriptValue::empty());
    }

    #[test]
    fn test_print() {
        interpreter().print("azerty");
    }

    #[test]
    fn test_set_output() {
        interpreter().set_output(Box::new(Vec::<u8>::new()));
    }

    #[test]
    fn test_close() {
        let i = interpreter();
        assert!(!i.is_closed());
        i.close().unwrap();
        assert!(i.is_closed());
        i.close().unwrap();
        assert!(i.is_closed());
    }

    #[test]
    fn test_provider_identity() {
        let provider = NoInterpreterProvider::new();
        assert_eq!(provider.language(), ScriptLanguage::None);

        let created = provider.create(ContextScope::SingleThread).unwrap();
        assert_eq!(created.language(), ScriptLanguage::None);
        assert!(!created.is_closed());
    }
}
