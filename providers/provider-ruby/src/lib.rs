//! # provider-ruby
//!
//! Ruby support for scriptbridge.
//!
//! Ruby source is evaluated by an external `ruby` executable; this crate does
//! not interpret Ruby itself. Every evaluation runs in a fresh process, so
//! local variables do not carry over from one command to the next. Output the
//! script writes to stdout is forwarded to the interpreter's output sink.
//!
//! ```no_run
//! use provider_ruby::RubyInterpreterProvider;
//! use scriptbridge_core::prelude::*;
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(RubyInterpreterProvider::default());
//!
//! let cache = InterpreterCache::new(registry, ContextScope::Concurrent);
//! let ruby = cache.get_interpreter(ScriptLanguage::Ruby).unwrap();
//! assert_eq!(ruby.run_command("2 + 2").unwrap(), ScriptValue::Integer(4));
//! ```

mod interpreter;
mod process;
mod settings;

pub use interpreter::RubyInterpreter;
pub use process::{ruby_string_literal, RubyProcess};
pub use settings::RubySettings;

use scriptbridge_core::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Provider building [`RubyInterpreter`]s.
#[derive(Debug, Clone, Default)]
pub struct RubyInterpreterProvider {
    settings: RubySettings,
}

impl RubyInterpreterProvider {
    pub fn new(settings: RubySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RubySettings {
        &self.settings
    }
}

impl InterpreterProvider for RubyInterpreterProvider {
    fn language(&self) -> ScriptLanguage {
        ScriptLanguage::Ruby
    }

    fn name(&self) -> &str {
        "Ruby (external runtime)"
    }

    /// Fails when the configured executable cannot be run.
    fn create(&self, scope: ContextScope) -> ScriptResult<Arc<dyn ScriptInterpreter>> {
        let process = RubyProcess::from_settings(&self.settings);
        let version = process.version()?;
        debug!("Using {}", version);

        Ok(Arc::new(RubyInterpreter::with_process(process, scope)))
    }
}
