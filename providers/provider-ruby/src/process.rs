//! Running source through an external `ruby` process.
//!
//! Source is handed to the child through a temporary file and evaluated by a
//! small bootstrap program at the top level. The bootstrap writes a JSON reply
//! (the value of the last expression, or the error) to a second temporary
//! file, which keeps the reply apart from whatever the script prints.

use crate::settings::RubySettings;
use scriptbridge_core::{ScriptError, ScriptResult, ScriptValue};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

const SOURCE_ENV: &str = "SCRIPTBRIDGE_SOURCE";
const RESULT_ENV: &str = "SCRIPTBRIDGE_RESULT";
const FILE_ENV: &str = "SCRIPTBRIDGE_FILE";

const CLASS_KEY: &str = "__class__";
const INSPECT_KEY: &str = "__inspect__";

const BOOTSTRAP: &str = r##"
require 'json'

module ScriptBridge
  def self.encode(v)
    case v
    when nil, true, false, String then v
    when Integer then v.bit_length < 64 ? v : v.to_s
    when Float then v.finite? ? v : v.to_s
    when Symbol then v.to_s
    when Array then v.map { |x| encode(x) }
    when Hash then v.each_with_object({}) { |(k, x), h| h[k.to_s] = encode(x) }
    else ({ '__class__' => v.class.to_s, '__inspect__' => v.inspect })
    end
  end

  def self.reply(h)
    File.write(ENV.fetch('SCRIPTBRIDGE_RESULT'), JSON.generate(h))
  end

  def self.run
    src = File.read(ENV.fetch('SCRIPTBRIDGE_SOURCE'))
    value = TOPLEVEL_BINDING.eval(src, ENV.fetch('SCRIPTBRIDGE_FILE', '-'))
    $stdout.flush
    reply('status' => 'ok', 'value' => encode(value))
    0
  rescue SyntaxError => e
    reply('status' => 'parse_error', 'message' => e.message)
    2
  rescue SystemExit
    reply('status' => 'ok', 'value' => nil)
    0
  rescue Exception => e
    reply('status' => 'error', 'message' => "#{e.class}: #{e.message}")
    1
  end
end

exit ScriptBridge.run
"##;

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Reply {
    Ok { value: serde_json::Value },
    ParseError { message: String },
    Error { message: String },
}

/// Result of one evaluation.
#[derive(Debug)]
pub struct Evaluation {
    /// Value of the last expression.
    pub value: ScriptValue,

    /// Bytes the script wrote to stdout.
    pub stdout: Vec<u8>,

    /// Bytes the script wrote to stderr (warnings and the like).
    pub stderr: Vec<u8>,
}

/// Launch options for the Ruby runtime.
#[derive(Debug, Clone)]
pub struct RubyProcess {
    executable: PathBuf,
    load_paths: Vec<PathBuf>,
    requires: Vec<String>,
}

impl RubyProcess {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            load_paths: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn from_settings(settings: &RubySettings) -> Self {
        Self {
            executable: settings.executable.clone(),
            load_paths: settings.load_paths.clone(),
            requires: settings.requires.clone(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Require a library before every evaluation.
    pub fn require(&mut self, library: impl Into<String>) {
        let library = library.into();
        if !self.requires.contains(&library) {
            self.requires.push(library);
        }
    }

    /// Add a directory to the load path of every evaluation.
    pub fn add_load_path(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.load_paths.contains(&dir) {
            self.load_paths.push(dir);
        }
    }

    /// Report the runtime version (`ruby --version`).
    pub fn version(&self) -> ScriptResult<String> {
        let output = self.run(Command::new(&self.executable).arg("--version"))?;
        if !output.status.success() {
            return Err(ScriptError::Backend(format!(
                "{} --version failed: {}",
                self.executable.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Check the syntax of a file without running it (`ruby -c`).
    pub fn check_syntax(&self, path: &Path) -> ScriptResult<()> {
        let output = self.run(Command::new(&self.executable).arg("-c").arg(path))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ScriptError::Parse(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }

    /// Evaluate `source`, reporting errors against `file_name`.
    pub fn eval(&self, source: &str, file_name: &str) -> ScriptResult<Evaluation> {
        let mut source_file = NamedTempFile::with_suffix(".rb").map_err(|e| {
            ScriptError::Backend(format!("Failed to create source file: {}", e))
        })?;
        source_file.write_all(source.as_bytes()).map_err(|e| {
            ScriptError::Backend(format!("Failed to write source file: {}", e))
        })?;

        let result_file = NamedTempFile::new().map_err(|e| {
            ScriptError::Backend(format!("Failed to create result file: {}", e))
        })?;

        let mut command = Command::new(&self.executable);
        for dir in &self.load_paths {
            command.arg("-I").arg(dir);
        }
        for library in &self.requires {
            command.arg("-r").arg(library);
        }
        command
            .arg("-e")
            .arg(BOOTSTRAP)
            .env(SOURCE_ENV, source_file.path())
            .env(RESULT_ENV, result_file.path())
            .env(FILE_ENV, file_name);

        tracing::trace!(command = ?command, "Evaluating ruby source");
        let output = self.run(&mut command)?;

        let reply = std::fs::read_to_string(result_file.path()).map_err(|e| {
            ScriptError::Backend(format!("Failed to read evaluation result: {}", e))
        })?;

        if reply.trim().is_empty() {
            let exit_code = output
                .status
                .code()
                .map_or_else(|| "None".to_string(), |c| c.to_string());
            return Err(ScriptError::Backend(format!(
                "ruby exited without a result (Exit Code: {}): {}",
                exit_code,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let reply: Reply = serde_json::from_str(&reply)
            .map_err(|e| ScriptError::Backend(format!("Malformed evaluation result: {}", e)))?;

        match reply {
            Reply::Ok { value } => Ok(Evaluation {
                value: decode(value),
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Reply::ParseError { message } => Err(ScriptError::Parse(message)),
            Reply::Error { message } => Err(ScriptError::Evaluation(message)),
        }
    }

    fn run(&self, command: &mut Command) -> ScriptResult<Output> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ScriptError::Backend(format!(
                        "'{}' command not found in PATH",
                        self.executable.display()
                    ))
                } else {
                    ScriptError::Backend(format!(
                        "Failed to start {}: {}",
                        self.executable.display(),
                        e
                    ))
                }
            })
    }
}

impl Default for RubyProcess {
    fn default() -> Self {
        Self::from_settings(&RubySettings::default())
    }
}

/// Map the bootstrap's JSON encoding onto [`ScriptValue`].
fn decode(value: serde_json::Value) -> ScriptValue {
    match value {
        serde_json::Value::Array(items) => ScriptValue::List(items.into_iter().map(decode).collect()),
        serde_json::Value::Object(map) => {
            if map.len() == 2 {
                if let (Some(serde_json::Value::String(class_name)), Some(serde_json::Value::String(inspect))) =
                    (map.get(CLASS_KEY), map.get(INSPECT_KEY))
                {
                    return ScriptValue::Object {
                        class_name: class_name.clone(),
                        inspect: inspect.clone(),
                    };
                }
            }
            ScriptValue::Map(map.into_iter().map(|(k, v)| (k, decode(v))).collect())
        }
        other => ScriptValue::from(other),
    }
}

/// Quote text as a single-quoted Ruby string literal.
pub fn ruby_string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('\'');
    for c in text.chars() {
        if c == '\\' || c == '\'' {
            literal.push('\\');
        }
        literal.push(c);
    }
    literal.push('\'');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_literal() {
        assert_eq!(ruby_string_literal("abc"), "'abc'");
        assert_eq!(ruby_string_literal("it's"), r"'it\'s'");
        assert_eq!(ruby_string_literal(r"a\b"), r"'a\\b'");
        assert_eq!(ruby_string_literal(""), "''");
    }

    #[test]
    fn test_decode_object_marker() {
        let value = decode(json!({"__class__": "Box", "__inspect__": "#<Box 5>"}));
        assert_eq!(
            value,
            ScriptValue::Object {
                class_name: "Box".to_string(),
                inspect: "#<Box 5>".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_nested() {
        let value = decode(json!([1, {"k": {"__class__": "Set", "__inspect__": "#<Set: {}>"}}]));
        let ScriptValue::List(items) = value else {
            panic!("expected a list");
        };
        assert_eq!(items[0], ScriptValue::Integer(1));

        let ScriptValue::Map(map) = &items[1] else {
            panic!("expected a map");
        };
        assert!(matches!(&map["k"], ScriptValue::Object { class_name, .. } if class_name == "Set"));
    }

    #[test]
    fn test_decode_plain_map() {
        let value = decode(json!({"a": 1, "b": "two"}));
        let ScriptValue::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"], ScriptValue::String("two".to_string()));
    }

    #[test]
    fn test_missing_executable() {
        let process = RubyProcess::new("/nonexistent/bin/ruby");
        assert!(matches!(process.version(), Err(ScriptError::Backend(_))));
        assert!(matches!(process.eval("1", "-"), Err(ScriptError::Backend(_))));
    }

    #[test]
    fn test_require_deduplicates() {
        let mut process = RubyProcess::default();
        process.require("set");
        process.require("set");
        process.add_load_path("lib");
        process.add_load_path("lib");

        assert_eq!(process.requires, vec!["set"]);
        assert_eq!(process.load_paths, vec![PathBuf::from("lib")]);
    }
}
