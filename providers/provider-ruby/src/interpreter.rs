use crate::process::{ruby_string_literal, RubyProcess};
use crate::settings::RubySettings;
use scriptbridge_core::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error};

/// Ruby interpreter delegating to an external runtime.
pub struct RubyInterpreter {
    runtime: Arc<RubyRuntime>,
}

/// State shared between the handle and the scripts it parsed.
struct RubyRuntime {
    process: RwLock<RubyProcess>,
    output: Mutex<Option<OutputSink>>,
    /// Present for [`ContextScope::SingleThread`].
    serial: Option<Mutex<()>>,
    closed: AtomicBool,
}

impl RubyRuntime {
    fn evaluate(&self, source: &str, file_name: &str) -> ScriptResult<ScriptValue> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ScriptError::Closed(ScriptLanguage::Ruby));
        }

        let _serial = self
            .serial
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));

        let evaluation = self
            .process
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .eval(source, file_name)?;

        if !evaluation.stderr.is_empty() {
            debug!(
                stderr = %String::from_utf8_lossy(&evaluation.stderr).trim(),
                "ruby wrote to stderr"
            );
        }
        self.forward(&evaluation.stdout)?;

        Ok(evaluation.value)
    }

    fn forward(&self, bytes: &[u8]) -> ScriptResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        match output.as_mut() {
            Some(sink) => sink
                .write_all(bytes)
                .and_then(|_| sink.flush())
                .map_err(|e| ScriptError::Backend(format!("Failed to write script output: {}", e))),
            None => Ok(()),
        }
    }
}

impl RubyInterpreter {
    /// Interpreter using `ruby` from `PATH`.
    pub fn new() -> Self {
        Self::with_settings(&RubySettings::default(), ContextScope::default())
    }

    pub fn with_settings(settings: &RubySettings, scope: ContextScope) -> Self {
        Self::with_process(RubyProcess::from_settings(settings), scope)
    }

    pub fn with_process(process: RubyProcess, scope: ContextScope) -> Self {
        let serial = match scope {
            ContextScope::Concurrent => None,
            ContextScope::SingleThread => Some(Mutex::new(())),
        };

        Self {
            runtime: Arc::new(RubyRuntime {
                process: RwLock::new(process),
                output: Mutex::new(Some(Box::new(std::io::stdout()))),
                serial,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Require a library before every later evaluation.
    pub fn require(&self, library: impl Into<String>) {
        self.runtime
            .process
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .require(library);
    }

    /// Add a directory to the load path of every later evaluation.
    pub fn add_load_path(&self, dir: impl Into<PathBuf>) {
        self.runtime
            .process
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_load_path(dir);
    }
}

impl Default for RubyInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptInterpreter for RubyInterpreter {
    fn language(&self) -> ScriptLanguage {
        ScriptLanguage::Ruby
    }

    fn run_script(&self, path: &str) -> ScriptResult<ParsedScript> {
        if self.is_closed() {
            return Err(ScriptError::Closed(ScriptLanguage::Ruby));
        }

        let source = std::fs::read_to_string(path).map_err(|e| ScriptError::io(path, e))?;
        self.runtime
            .process
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .check_syntax(Path::new(path))?;
        debug!("Parsed ruby script {}", path);

        let runtime = Arc::clone(&self.runtime);
        let file_name = path.to_string();
        Ok(ParsedScript::new(move || {
            runtime.evaluate(&source, &file_name).map(|_| ())
        }))
    }

    fn run_command(&self, source: &str) -> ScriptResult<ScriptValue> {
        self.runtime.evaluate(source, "-")
    }

    fn print(&self, text: &str) {
        let source = format!("puts {}", ruby_string_literal(text));
        if let Err(e) = self.runtime.evaluate(&source, "print") {
            error!("Failed to print through ruby: {}", e);
        }
    }

    fn set_output(&self, sink: OutputSink) {
        if self.is_closed() {
            debug!("Ignoring output redirection on closed ruby interpreter");
            return;
        }
        *self.runtime.output.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    /// Signatures come from the host's descriptor, so no Ruby process is
    /// started.
    fn class_methods(&self, class: &ClassDescriptor) -> ScriptValue {
        if self.is_closed() {
            let e = ScriptError::Closed(ScriptLanguage::Ruby);
            error!("Failed to list methods of {}: {}", class.name, e);
            return ScriptValue::String(e.to_string());
        }

        ScriptValue::List(
            class
                .signatures()
                .into_iter()
                .map(ScriptValue::from)
                .collect(),
        )
    }

    fn file_header(&self) -> &str {
        "#!//usr//bin//ruby\n"
    }

    fn file_extension(&self) -> &str {
        "rb"
    }

    fn is_closed(&self) -> bool {
        self.runtime.closed.load(Ordering::SeqCst)
    }

    fn close(&self) -> ScriptResult<()> {
        if self.runtime.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let sink = self
            .runtime
            .output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sink {
            Some(mut sink) => sink
                .flush()
                .map_err(|e| ScriptError::Backend(format!("Failed to flush script output: {}", e))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_runtime() -> RubyInterpreter {
        RubyInterpreter::with_process(
            RubyProcess::new("/nonexistent/bin/ruby"),
            ContextScope::SingleThread,
        )
    }

    #[test]
    fn test_file_header() {
        assert_eq!(RubyInterpreter::new().file_header(), "#!//usr//bin//ruby\n");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(RubyInterpreter::new().file_extension(), "rb");
    }

    #[test]
    fn test_run_script_not_exists() {
        let interpreter = RubyInterpreter::new();
        let err = interpreter.run_script("none.rb").unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));

        assert!(interpreter.run_script("").is_err());
    }

    #[test]
    fn test_missing_runtime_command() {
        let err = missing_runtime().run_command("2+2").unwrap_err();
        assert!(matches!(err, ScriptError::Backend(_)));
    }

    #[test]
    fn test_missing_runtime_print_does_not_fail() {
        missing_runtime().print("testing output");
    }

    #[test]
    fn test_class_methods_without_runtime() {
        let class = ClassDescriptor::new("Box")
            .method(MethodSignature::new("size").returns("u32"))
            .method(MethodSignature::new("resize").param("u32").param("u32"));

        assert_eq!(
            missing_runtime().class_methods(&class),
            ScriptValue::List(vec!["size() -> u32".into(), "resize(u32, u32)".into()])
        );
        assert_eq!(
            missing_runtime().class_methods(&ClassDescriptor::new("Empty")),
            ScriptValue::List(Vec::new())
        );
    }

    #[test]
    fn test_closed_class_methods_reports_error() {
        let interpreter = missing_runtime();
        interpreter.close().unwrap();

        let class = ClassDescriptor::new("Box").method(MethodSignature::new("size"));
        assert!(matches!(interpreter.class_methods(&class), ScriptValue::String(_)));
    }

    #[test]
    fn test_close() {
        let interpreter = missing_runtime();
        assert!(!interpreter.is_closed());

        interpreter.close().unwrap();
        assert!(interpreter.is_closed());
        interpreter.close().unwrap();
        assert!(interpreter.is_closed());
    }

    #[test]
    fn test_closed_interpreter_refuses_work() {
        let interpreter = missing_runtime();
        interpreter.close().unwrap();

        assert!(matches!(
            interpreter.run_command("1"),
            Err(ScriptError::Closed(ScriptLanguage::Ruby))
        ));
        assert!(matches!(
            interpreter.run_script("none.rb"),
            Err(ScriptError::Closed(ScriptLanguage::Ruby))
        ));
        interpreter.print("ignored");
        interpreter.set_output(Box::new(Vec::<u8>::new()));
    }
}
