//! # scriptbridge-core
//!
//! Core traits and types for calling embedded scripting languages without
//! depending on a concrete interpreter.
//!
//! This crate provides:
//! - The [`ScriptInterpreter`] capability trait every backend implements
//! - The inert [`NoInterpreter`] backend used as the universal fallback
//! - An explicit [`ProviderRegistry`] with first-found-or-fallback discovery
//! - The per-language [`InterpreterCache`]
//! - A host-supplied [`ClassTable`] describing host types to backends
//!
//! ## Resolution
//!
//! ```text
//!   host ──► InterpreterCache::get_interpreter(Ruby)
//!                 │ cached? ──yes──► Arc<dyn ScriptInterpreter>
//!                 │ no
//!                 ▼
//!            ProviderRegistry::get(Ruby) ──► provider.create(scope)
//!
//!   host ──► InterpreterCache::engine()
//!                 │
//!                 ▼
//!            get_interpreter(first registered language)
//!
//!   host ──► EngineLocator::engine()      (registry only, no cache)
//!                 │
//!                 ▼
//!            first registered provider, or NoInterpreter
//! ```

pub mod cache;
pub mod class_table;
pub mod discovery;
pub mod error;
pub mod interpreter;
pub mod language;
pub mod none;
pub mod provider;
pub mod value;

pub use cache::InterpreterCache;
pub use class_table::{ClassDescriptor, ClassTable, Describe, MethodSignature};
pub use discovery::{discover_engine, EngineLocator, ProviderRegistry};
pub use error::{FactoryError, FactoryResult, ScriptError, ScriptResult};
pub use interpreter::{ContextScope, OutputSink, ParsedScript, ScriptInterpreter};
pub use language::ScriptLanguage;
pub use none::{NoInterpreter, NoInterpreterProvider};
pub use provider::InterpreterProvider;
pub use value::ScriptValue;

/// Convenience re-exports for backend and host crates.
pub mod prelude {
    pub use crate::cache::InterpreterCache;
    pub use crate::class_table::{ClassDescriptor, ClassTable, Describe, MethodSignature};
    pub use crate::discovery::{discover_engine, EngineLocator, ProviderRegistry};
    pub use crate::error::{FactoryError, FactoryResult, ScriptError, ScriptResult};
    pub use crate::interpreter::{ContextScope, OutputSink, ParsedScript, ScriptInterpreter};
    pub use crate::language::ScriptLanguage;
    pub use crate::none::{NoInterpreter, NoInterpreterProvider};
    pub use crate::provider::InterpreterProvider;
    pub use crate::value::ScriptValue;
}
