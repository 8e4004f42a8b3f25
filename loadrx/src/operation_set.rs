use crate::Loader;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub fn success_action(operation: &str) -> String {
    format!("{operation}Success")
}

pub fn failure_action(operation: &str) -> String {
    format!("{operation}Failure")
}

pub fn loading_reducer(slice: &str) -> String {
    format!("{slice}Loading")
}

pub fn source_reducer(slice: &str) -> String {
    format!("{slice}Source")
}

/// The `__default` entry of an operation set.
#[derive(Clone)]
pub enum DefaultSource {
    Value(Value),
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultSource {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultSource::Value(value) => value.clone(),
            DefaultSource::Producer(producer) => producer(),
        }
    }
}

impl fmt::Debug for DefaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSource::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultSource::Producer(_) => f.write_str("Producer"),
        }
    }
}

/// Named loaders updating one slice, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct OperationSet {
    default: Option<DefaultSource>,
    operations: Vec<(String, Loader)>,
}

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultSource::Value(value.into()));
        self
    }

    pub fn with_default_fn<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultSource::Producer(Arc::new(producer)));
        self
    }

    /// Adds an operation. Re-declaring a name replaces its loader in place.
    pub fn operation(mut self, name: impl Into<String>, loader: Loader) -> Self {
        let name = name.into();
        match self.operations.iter().position(|(existing, _)| *existing == name) {
            Some(index) => self.operations[index].1 = loader,
            None => self.operations.push((name, loader)),
        }
        self
    }

    pub fn default_source(&self) -> Option<&DefaultSource> {
        self.default.as_ref()
    }

    pub fn operations(&self) -> &[(String, Loader)] {
        &self.operations
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|(name, _)| name.as_str())
    }

    pub fn first_operation(&self) -> Option<&str> {
        self.names().next()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// An operation set, optionally paired with a default (the array form).
#[derive(Debug, Clone)]
pub enum OperationSetDescriptor {
    Plain(OperationSet),
    WithDefault(Value, OperationSet),
}

impl OperationSetDescriptor {
    pub fn into_parts(self) -> (Option<Value>, OperationSet) {
        match self {
            OperationSetDescriptor::Plain(operations) => (None, operations),
            OperationSetDescriptor::WithDefault(default, operations) => (Some(default), operations),
        }
    }
}

impl From<OperationSet> for OperationSetDescriptor {
    fn from(operations: OperationSet) -> Self {
        OperationSetDescriptor::Plain(operations)
    }
}

impl<V: Into<Value>> From<(V, OperationSet)> for OperationSetDescriptor {
    fn from((default, operations): (V, OperationSet)) -> Self {
        OperationSetDescriptor::WithDefault(default.into(), operations)
    }
}

/// Slice key to operation set.
#[derive(Debug, Clone, Default)]
pub struct LoaderSpec {
    slices: BTreeMap<String, OperationSetDescriptor>,
}

impl LoaderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice(
        mut self,
        key: impl Into<String>,
        operations: impl Into<OperationSetDescriptor>,
    ) -> Self {
        self.slices.insert(key.into(), operations.into());
        self
    }

    pub fn slice_keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl IntoIterator for LoaderSpec {
    type Item = (String, OperationSetDescriptor);
    type IntoIter = std::collections::btree_map::IntoIter<String, OperationSetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.into_iter()
    }
}
