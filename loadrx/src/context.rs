use crate::LogicError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A plugin that can be installed into a [`Context`].
///
/// Installing turns the plugin into its context record, which every logic
/// built on that container instance can read but never mutate.
pub trait Plugin: 'static {
    const NAME: &'static str;
    type Context: Send + Sync + 'static;

    fn into_context(self) -> Self::Context;
}

/// One container instance. Logics built against the same context share its
/// plugin records; independent contexts never see each other's records.
#[derive(Default)]
pub struct Context {
    plugins: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install<P: Plugin>(&mut self, plugin: P) -> Result<(), LogicError> {
        let id = TypeId::of::<P>();
        if self.plugins.contains_key(&id) {
            return Err(LogicError::PluginAlreadyInstalled(P::NAME));
        }
        self.plugins.insert(id, Arc::new(plugin.into_context()));
        self.names.push(P::NAME);
        debug!(plugin = P::NAME, "plugin installed");
        Ok(())
    }

    pub fn with_plugin<P: Plugin>(mut self, plugin: P) -> Result<Self, LogicError> {
        self.install(plugin)?;
        Ok(self)
    }

    pub fn plugin<P: Plugin>(&self) -> Option<Arc<P::Context>> {
        self.plugins
            .get(&TypeId::of::<P>())
            .cloned()
            .and_then(|context| context.downcast::<P::Context>().ok())
    }

    pub fn plugin_names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("plugins", &self.names)
            .finish()
    }
}
