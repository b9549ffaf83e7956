//! Provider registration and engine discovery.
//!
//! The host registers providers in a [`ProviderRegistry`], in priority order.
//! [`discover_engine`] picks the first registered provider; when the registry
//! is empty, or the chosen provider cannot build an interpreter, it falls back
//! to [`NoInterpreter`]. Finding nothing is the expected case for builds
//! without scripting, so discovery never fails.

use crate::error::ScriptResult;
use crate::interpreter::{ContextScope, ScriptInterpreter};
use crate::language::ScriptLanguage;
use crate::none::NoInterpreter;
use crate::provider::InterpreterProvider;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Ordered registry of interpreter providers.
///
/// # Example
///
/// ```
/// use scriptbridge_core::{NoInterpreterProvider, ProviderRegistry, ScriptLanguage};
///
/// let mut registry = ProviderRegistry::new();
/// registry.register(NoInterpreterProvider::new());
///
/// let provider = registry.get(ScriptLanguage::None).unwrap();
/// println!("Loaded provider: {}", provider.name());
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn InterpreterProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty provider registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider.
    ///
    /// Providers are discovered in registration order. If a provider for the
    /// same language already exists, it is replaced in place and keeps its
    /// position.
    pub fn register<P>(&mut self, provider: P)
    where
        P: InterpreterProvider + 'static,
    {
        self.register_arc(Arc::new(provider));
    }

    /// Register an already shared provider.
    pub fn register_arc(&mut self, provider: Arc<dyn InterpreterProvider>) {
        let language = provider.language();
        debug!("Registering {} provider: {}", language, provider.name());

        match self.position(language) {
            Some(index) => self.providers[index] = provider,
            None => self.providers.push(provider),
        }
    }

    /// Move the provider for `language` to the front, making it the one
    /// discovery picks. Returns false if no such provider is registered.
    pub fn prefer(&mut self, language: ScriptLanguage) -> bool {
        match self.position(language) {
            Some(index) => {
                let provider = self.providers.remove(index);
                self.providers.insert(0, provider);
                true
            }
            None => false,
        }
    }

    /// Get the provider for a language.
    pub fn get(&self, language: ScriptLanguage) -> Option<Arc<dyn InterpreterProvider>> {
        self.position(language)
            .map(|index| Arc::clone(&self.providers[index]))
    }

    /// The provider discovery would pick.
    pub fn first(&self) -> Option<Arc<dyn InterpreterProvider>> {
        self.providers.first().cloned()
    }

    /// Registered languages, in discovery order.
    pub fn list(&self) -> Vec<ScriptLanguage> {
        self.providers.iter().map(|p| p.language()).collect()
    }

    /// Get the number of registered providers.
    pub fn count(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Check if a provider for the language is registered.
    pub fn contains(&self, language: ScriptLanguage) -> bool {
        self.position(language).is_some()
    }

    /// Remove the provider for a language.
    pub fn remove(&mut self, language: ScriptLanguage) -> Option<Arc<dyn InterpreterProvider>> {
        self.position(language)
            .map(|index| self.providers.remove(index))
    }

    /// Clear all providers from the registry.
    pub fn clear(&mut self) {
        self.providers.clear();
    }

    fn position(&self, language: ScriptLanguage) -> Option<usize> {
        self.providers.iter().position(|p| p.language() == language)
    }
}

/// Build "the" interpreter: the first registered provider's, or the inert one.
pub fn discover_engine(registry: &ProviderRegistry, scope: ContextScope) -> Arc<dyn ScriptInterpreter> {
    let Some(provider) = registry.first() else {
        info!("No interpreter provider registered, scripting disabled");
        return Arc::new(NoInterpreter::new());
    };

    match provider.create(scope) {
        Ok(interpreter) => {
            info!("Discovered {} interpreter: {}", provider.language(), provider.name());
            interpreter
        }
        Err(e) => {
            warn!(
                "Failed to create {} interpreter, scripting disabled: {}",
                provider.language(),
                e
            );
            Arc::new(NoInterpreter::new())
        }
    }
}

/// Memoized ambient engine.
///
/// Discovery runs on the first call to [`EngineLocator::engine`] and is not
/// repeated, unless the host asks for it with [`EngineLocator::rediscover`] or
/// the engine it found has since been closed.
pub struct EngineLocator {
    registry: Arc<ProviderRegistry>,
    scope: ContextScope,
    engine: RwLock<Option<Arc<dyn ScriptInterpreter>>>,
}

impl EngineLocator {
    pub fn new(registry: Arc<ProviderRegistry>, scope: ContextScope) -> Self {
        Self {
            registry,
            scope,
            engine: RwLock::new(None),
        }
    }

    /// Get the engine, discovering it if needed.
    pub fn engine(&self) -> Arc<dyn ScriptInterpreter> {
        {
            let engine = self.engine.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(engine) = engine.as_ref().filter(|e| !e.is_closed()) {
                return Arc::clone(engine);
            }
        }

        let mut engine = self.engine.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have discovered while we waited for the write lock
        if let Some(current) = engine.as_ref().filter(|e| !e.is_closed()) {
            return Arc::clone(current);
        }

        let discovered = discover_engine(&self.registry, self.scope);
        *engine = Some(Arc::clone(&discovered));
        discovered
    }

    /// Forget the current engine and run discovery again.
    pub fn rediscover(&self) -> Arc<dyn ScriptInterpreter> {
        let mut engine = self.engine.write().unwrap_or_else(PoisonError::into_inner);
        let discovered = discover_engine(&self.registry, self.scope);
        *engine = Some(Arc::clone(&discovered));
        discovered
    }

    /// Close the current engine, if one was discovered.
    ///
    /// The next call to [`EngineLocator::engine`] discovers again.
    pub fn close(&self) -> ScriptResult<()> {
        let engine = self
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match engine {
            Some(engine) => engine.close(),
            None => Ok(()),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}
