//! Per-language interpreter cache.
//!
//! [`InterpreterCache`] hands out one shared handle per [`ScriptLanguage`],
//! constructing it on first request through the provider registered for that
//! language. The cache is an ordinary value owned by the host; there is no
//! process-wide instance.

use crate::discovery::ProviderRegistry;
use crate::error::{FactoryError, FactoryResult};
use crate::interpreter::{ContextScope, ScriptInterpreter};
use crate::language::ScriptLanguage;
use crate::none::{NoInterpreter, NoInterpreterProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

type Slot = Arc<Mutex<Option<Arc<dyn ScriptInterpreter>>>>;

/// Get-or-create cache of interpreters keyed by language.
///
/// A handle closed by a caller is not handed out again: the next lookup for
/// its language evicts it and builds a replacement.
///
/// Each language has its own slot. Construction holds only that slot's lock,
/// so a slow backend start does not block lookups for other languages.
/// [`InterpreterCache::is_cached`] and [`InterpreterCache::count`] wait for a
/// construction in progress.
pub struct InterpreterCache {
    providers: ProviderRegistry,
    scope: ContextScope,
    slots: Mutex<HashMap<ScriptLanguage, Slot>>,
}

impl InterpreterCache {
    /// Create a cache over the given providers.
    ///
    /// [`ScriptLanguage::None`] is always resolvable: the inert provider is
    /// added when the registry lacks one.
    pub fn new(mut providers: ProviderRegistry, scope: ContextScope) -> Self {
        if !providers.contains(ScriptLanguage::None) {
            providers.register(NoInterpreterProvider::new());
        }

        Self {
            providers,
            scope,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the interpreter for a language.
    ///
    /// Fails with [`FactoryError::UnhandledConfiguration`] when no provider is
    /// registered for `language`.
    pub fn get_interpreter(&self, language: ScriptLanguage) -> FactoryResult<Arc<dyn ScriptInterpreter>> {
        let provider = self
            .providers
            .get(language)
            .ok_or_else(|| FactoryError::UnhandledConfiguration(language.to_string()))?;

        let slot = Arc::clone(self.slots().entry(language).or_default());
        // Held across construction so concurrent first requests build one handle
        let mut slot = lock_slot(&slot);

        if let Some(existing) = slot.as_ref() {
            if !existing.is_closed() {
                return Ok(Arc::clone(existing));
            }
            debug!("Evicting closed {} interpreter", language);
        }

        let interpreter = match provider.create(self.scope) {
            Ok(interpreter) => {
                info!("Created {} interpreter: {}", language, provider.name());
                interpreter
            }
            Err(e) => {
                warn!(
                    "Failed to create {} interpreter, using no-op interpreter: {}",
                    language, e
                );
                Arc::new(NoInterpreter::new()) as Arc<dyn ScriptInterpreter>
            }
        };

        *slot = Some(Arc::clone(&interpreter));
        Ok(interpreter)
    }

    /// Get or create the interpreter for a language given by name.
    pub fn get_interpreter_by_name(&self, name: &str) -> FactoryResult<Arc<dyn ScriptInterpreter>> {
        self.get_interpreter(ScriptLanguage::parse(name)?)
    }

    /// The ambient engine: the cached interpreter for the first registered
    /// language.
    ///
    /// Shares the handle [`InterpreterCache::get_interpreter`] returns for the
    /// same language.
    pub fn engine(&self) -> Arc<dyn ScriptInterpreter> {
        let language = self
            .providers
            .first()
            .map_or(ScriptLanguage::None, |provider| provider.language());

        match self.get_interpreter(language) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("No engine available, scripting disabled: {}", e);
                Arc::new(NoInterpreter::new())
            }
        }
    }

    /// Check whether a live interpreter is cached for the language.
    pub fn is_cached(&self, language: ScriptLanguage) -> bool {
        let Some(slot) = self.slots().get(&language).cloned() else {
            return false;
        };
        let cached = lock_slot(&slot);
        cached.as_ref().is_some_and(|interpreter| !interpreter.is_closed())
    }

    /// Languages this cache can construct, in discovery order.
    pub fn languages(&self) -> Vec<ScriptLanguage> {
        self.providers.list()
    }

    /// Get the number of cached interpreters.
    pub fn count(&self) -> usize {
        let slots: Vec<Slot> = self.slots().values().cloned().collect();
        slots.iter().filter(|slot| lock_slot(slot).is_some()).count()
    }

    /// Close every cached interpreter and empty the cache.
    ///
    /// Close failures are logged; every handle is closed regardless.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.slots().drain().collect();
        for (language, slot) in drained {
            let Some(interpreter) = lock_slot(&slot).take() else {
                continue;
            };
            match interpreter.close() {
                Ok(()) => debug!("Closed {} interpreter", language),
                Err(e) => warn!("Error while closing {} interpreter: {}", language, e),
            }
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ScriptLanguage, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_slot(slot: &Slot) -> MutexGuard<'_, Option<Arc<dyn ScriptInterpreter>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for InterpreterCache {
    fn default() -> Self {
        Self::new(ProviderRegistry::new(), ContextScope::default())
    }
}
