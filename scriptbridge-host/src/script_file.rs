//! Generated script files.
//!
//! A new script starts with the backend's header line and is named with the
//! backend's extension, so the same template works for every language.

use anyhow::{Context, Result};
use scriptbridge_core::ScriptInterpreter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// A script file to be written for a particular interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    name: String,
    body: String,
}

impl ScriptFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: String::new(),
        }
    }

    /// Content placed after the header.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<name>.<ext>`, or the bare name when the backend has no extension.
    pub fn file_name(&self, interpreter: &dyn ScriptInterpreter) -> String {
        match interpreter.file_extension() {
            "" => self.name.clone(),
            ext => format!("{}.{}", self.name, ext),
        }
    }

    /// Full file content: header followed by the body.
    pub fn render(&self, interpreter: &dyn ScriptInterpreter) -> String {
        format!("{}{}", interpreter.file_header(), self.body)
    }

    /// Write the file into `dir`, refusing to replace an existing one.
    pub fn write(&self, dir: &Path, interpreter: &dyn ScriptInterpreter) -> Result<PathBuf> {
        self.validate_name()?;

        let path = dir.join(self.file_name(interpreter));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create script file: {}", path.display()))?;

        file.write_all(self.render(interpreter).as_bytes())
            .with_context(|| format!("Failed to write script file: {}", path.display()))?;

        info!(
            "Created {} script at: {}",
            interpreter.language(),
            path.display()
        );
        Ok(path)
    }

    fn validate_name(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Script name must not be empty");
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            anyhow::bail!("Script name must be a plain file name: {}", self.name);
        }
        Ok(())
    }
}
