//! Interpreter provider trait.

use crate::error::ScriptResult;
use crate::interpreter::{ContextScope, ScriptInterpreter};
use crate::language::ScriptLanguage;
use std::sync::Arc;

/// A factory for one kind of interpreter.
///
/// Providers are stateless and registered with a
/// [`ProviderRegistry`](crate::ProviderRegistry) by the host. Backend crates
/// export one provider each.
pub trait InterpreterProvider: Send + Sync {
    /// Language of the interpreters this provider builds.
    fn language(&self) -> ScriptLanguage;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Construct a new interpreter handle.
    fn create(&self, scope: ContextScope) -> ScriptResult<Arc<dyn ScriptInterpreter>>;
}
