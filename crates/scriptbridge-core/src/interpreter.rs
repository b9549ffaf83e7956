//! The interpreter capability trait.
//!
//! Every scripting backend implements [`ScriptInterpreter`]. Handles are shared
//! behind `Arc`, so all operations take `&self` and backends keep their mutable
//! state (output sink, closed flag) behind interior mutability.

use crate::class_table::ClassDescriptor;
use crate::error::ScriptResult;
use crate::language::ScriptLanguage;
use crate::value::ScriptValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// A writable destination for script output.
pub type OutputSink = Box<dyn Write + Send>;

/// Concurrency tier chosen by the host when a backend is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextScope {
    /// Evaluations on one handle may run at the same time.
    #[default]
    Concurrent,

    /// Evaluations on one handle run one at a time.
    SingleThread,
}

/// A script that has been loaded and checked once and can be run again.
#[derive(Clone)]
pub struct ParsedScript {
    replay: Arc<dyn Fn() -> ScriptResult<()> + Send + Sync>,
}

impl ParsedScript {
    /// Wrap a replay closure.
    pub fn new<F>(replay: F) -> Self
    where
        F: Fn() -> ScriptResult<()> + Send + Sync + 'static,
    {
        Self {
            replay: Arc::new(replay),
        }
    }

    /// A script whose replay does nothing.
    pub fn noop() -> Self {
        Self::new(|| Ok(()))
    }

    /// Run the script again.
    pub fn run(&self) -> ScriptResult<()> {
        (self.replay)()
    }
}

impl fmt::Debug for ParsedScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedScript").finish_non_exhaustive()
    }
}

/// Operations every scripting backend exposes.
///
/// `set_output` replaces shared backend state: callers must not race it
/// against `print` or evaluation on the same handle.
pub trait ScriptInterpreter: Send + Sync {
    /// Language this backend evaluates.
    fn language(&self) -> ScriptLanguage;

    /// Parse a script file.
    ///
    /// Returns a [`ParsedScript`] that runs the script, as often as needed,
    /// without reloading it.
    fn run_script(&self, path: &str) -> ScriptResult<ParsedScript>;

    /// Evaluate a snippet and return its value.
    fn run_command(&self, source: &str) -> ScriptResult<ScriptValue>;

    /// Print a line through the backend. Failures are logged, never returned.
    fn print(&self, text: &str);

    /// Redirect the output of `print` and of evaluated scripts.
    fn set_output(&self, sink: OutputSink);

    /// Describe the methods of a host type. Failures are logged and degrade
    /// to an inert value.
    fn class_methods(&self, class: &ClassDescriptor) -> ScriptValue;

    /// Header to put at the top of a generated script file.
    fn file_header(&self) -> &str;

    /// Script file extension, without ".".
    fn file_extension(&self) -> &str;

    fn is_closed(&self) -> bool;

    /// Release backend resources. Idempotent: the handle is closed afterwards
    /// even when an error is returned.
    fn close(&self) -> ScriptResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parsed_script_replays() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let script = ParsedScript::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        script.run().unwrap();
        script.clone().run().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_noop_script() {
        assert!(ParsedScript::noop().run().is_ok());
    }

    #[test]
    fn test_default_scope() {
        assert_eq!(ContextScope::default(), ContextScope::Concurrent);
    }
}
