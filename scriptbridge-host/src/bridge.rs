//! # Bridge
//!
//! The composition root: builds the provider registry, the per-language
//! interpreter cache and the class table from a [`Config`], and owns them for
//! the lifetime of the host. The ambient engine is served from the same cache,
//! so there is never more than one live handle per language.

use crate::config::Config;
use anyhow::{Context, Result};
use provider_ruby::RubyInterpreterProvider;
use scriptbridge_core::prelude::*;
use std::sync::Arc;
use tracing::info;

/// Everything a host needs to run scripts.
pub struct Bridge {
    cache: InterpreterCache,
    classes: ClassTable,
}

impl Bridge {
    /// Wire the bridge from configuration.
    pub fn from_config(config: &Config) -> Self {
        let scope = config.engine.context_scope;

        let mut classes = ClassTable::new();
        for class in &config.classes {
            classes.register(class.clone());
        }

        let bridge = Self {
            cache: InterpreterCache::new(Self::build_registry(config), scope),
            classes,
        };

        info!(
            "Script languages available: {:?}, {} host class(es) described",
            bridge.cache.languages(),
            bridge.classes.len()
        );
        bridge
    }

    /// Build the provider registry described by the configuration, in
    /// discovery order.
    pub fn build_registry(config: &Config) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();

        if config.languages.ruby.enabled {
            registry.register(RubyInterpreterProvider::new(
                config.languages.ruby.settings.clone(),
            ));
        }

        match config.engine.preferred_language {
            Some(ScriptLanguage::None) => {
                registry.register(NoInterpreterProvider::new());
                registry.prefer(ScriptLanguage::None);
            }
            Some(language) => {
                registry.prefer(language);
            }
            None => {}
        }

        registry
    }

    /// The ambient engine: the interpreter for the first language in
    /// discovery order.
    pub fn engine(&self) -> Arc<dyn ScriptInterpreter> {
        self.cache.engine()
    }

    /// Interpreter for an explicit language.
    pub fn interpreter(&self, language: ScriptLanguage) -> FactoryResult<Arc<dyn ScriptInterpreter>> {
        self.cache.get_interpreter(language)
    }

    /// Interpreter for a language given by name.
    pub fn interpreter_by_name(&self, name: &str) -> FactoryResult<Arc<dyn ScriptInterpreter>> {
        self.cache.get_interpreter_by_name(name)
    }

    /// Interpreter for `language` if given, the ambient engine otherwise.
    pub fn select(&self, language: Option<&str>) -> Result<Arc<dyn ScriptInterpreter>> {
        match language {
            Some(name) => self
                .interpreter_by_name(name)
                .with_context(|| format!("Cannot select script language '{}'", name)),
            None => Ok(self.engine()),
        }
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// Describe a registered host class through an interpreter.
    pub fn class_methods(&self, interpreter: &dyn ScriptInterpreter, class_name: &str) -> Result<ScriptValue> {
        let class = self
            .classes
            .get(class_name)
            .with_context(|| format!("Unknown host class: {}", class_name))?;
        Ok(interpreter.class_methods(class))
    }

    /// Close every interpreter this bridge handed out.
    pub fn shutdown(&self) {
        self.cache.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scripting_disabled() -> Config {
        let mut config = Config::default();
        config.languages.ruby.enabled = false;
        config
    }

    #[test]
    fn test_registry_follows_config() {
        let registry = Bridge::build_registry(&Config::default());
        assert_eq!(registry.list(), vec![ScriptLanguage::Ruby]);

        let registry = Bridge::build_registry(&scripting_disabled());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prefer_none() {
        let mut config = Config::default();
        config.engine.preferred_language = Some(ScriptLanguage::None);

        let registry = Bridge::build_registry(&config);
        assert_eq!(registry.list(), vec![ScriptLanguage::None, ScriptLanguage::Ruby]);

        let bridge = Bridge::from_config(&config);
        assert_eq!(bridge.engine().language(), ScriptLanguage::None);
    }

    #[test]
    fn test_engine_is_the_cached_handle() {
        let mut config = scripting_disabled();
        config.engine.preferred_language = Some(ScriptLanguage::None);

        let bridge = Bridge::from_config(&config);
        let engine = bridge.engine();
        let none = bridge.interpreter(ScriptLanguage::None).unwrap();
        assert!(Arc::ptr_eq(&engine, &none));
        assert!(Arc::ptr_eq(&engine, &bridge.select(None).unwrap()));
    }

    #[test]
    fn test_disabled_scripting_falls_back() {
        let bridge = Bridge::from_config(&scripting_disabled());

        let engine = bridge.engine();
        assert_eq!(engine.file_extension(), "txt");
        assert_eq!(engine.run_command("1 + 1").unwrap(), ScriptValue::empty());

        assert!(bridge.interpreter(ScriptLanguage::Ruby).is_err());
        assert!(bridge.select(Some("ruby")).is_err());
        assert!(bridge.select(Some("none")).is_ok());
    }

    #[test]
    fn test_missing_runtime_falls_back() {
        let mut config = Config::default();
        config.languages.ruby.settings.executable = PathBuf::from("/nonexistent/bin/ruby");

        let bridge = Bridge::from_config(&config);
        assert_eq!(bridge.engine().language(), ScriptLanguage::None);

        let ruby = bridge.interpreter(ScriptLanguage::Ruby).unwrap();
        assert_eq!(ruby.file_extension(), "txt");
        assert!(Arc::ptr_eq(&bridge.engine(), &ruby));
    }

    #[test]
    fn test_class_methods() {
        let mut config = scripting_disabled();
        config
            .classes
            .push(ClassDescriptor::new("Box").method(MethodSignature::new("size")));

        let bridge = Bridge::from_config(&config);
        let engine = bridge.engine();
        assert!(bridge.classes().contains("Box"));
        assert_eq!(bridge.class_methods(engine.as_ref(), "Box").unwrap(), ScriptValue::empty());
        assert!(bridge.class_methods(engine.as_ref(), "Atom").is_err());
    }

    #[test]
    fn test_shutdown() {
        let bridge = Bridge::from_config(&scripting_disabled());
        let none = bridge.interpreter(ScriptLanguage::None).unwrap();
        let engine = bridge.engine();

        bridge.shutdown();
        assert!(none.is_closed());
        assert!(engine.is_closed());
    }
}
