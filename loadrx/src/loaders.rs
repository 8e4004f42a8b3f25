use crate::{
    resolve_default, synthesize_actions, synthesize_lazy_selector, synthesize_listeners,
    synthesize_reducers, Extension, LoaderSpec, LogicBuilder, OperationSetDescriptor,
};
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Fire the first operation on the first read of the slice.
    pub lazy: bool,
}

impl LoaderOptions {
    pub fn lazy() -> Self {
        LoaderOptions { lazy: true }
    }
}

/// A loader specification, given as is or computed from the partially
/// built logic so it can inspect what was declared before it.
pub enum LoaderInput {
    Literal(LoaderSpec),
    Computed(Box<dyn FnOnce(&LogicBuilder) -> LoaderSpec + Send>),
}

impl LoaderInput {
    pub fn computed<F>(input: F) -> Self
    where
        F: FnOnce(&LogicBuilder) -> LoaderSpec + Send + 'static,
    {
        LoaderInput::Computed(Box::new(input))
    }

    fn resolve(self, logic: &LogicBuilder) -> LoaderSpec {
        match self {
            LoaderInput::Literal(spec) => spec,
            LoaderInput::Computed(input) => input(logic),
        }
    }
}

impl From<LoaderSpec> for LoaderInput {
    fn from(spec: LoaderSpec) -> Self {
        LoaderInput::Literal(spec)
    }
}

impl fmt::Debug for LoaderInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderInput::Literal(spec) => f.debug_tuple("Literal").field(spec).finish(),
            LoaderInput::Computed(_) => f.write_str("Computed"),
        }
    }
}

/// Build step adding actions, reducers and listeners for every slice.
pub fn loaders(
    input: impl Into<LoaderInput>,
    options: LoaderOptions,
) -> impl FnOnce(&mut LogicBuilder) {
    let input = input.into();
    move |logic: &mut LogicBuilder| {
        let spec = input.resolve(logic);
        for (slice, descriptor) in spec {
            extend_slice(logic, &slice, descriptor, options);
        }
    }
}

fn extend_slice(
    logic: &mut LogicBuilder,
    slice: &str,
    descriptor: OperationSetDescriptor,
    options: LoaderOptions,
) {
    let (array_default, operations) = descriptor.into_parts();
    let default = resolve_default(
        logic.default_for(slice),
        array_default.as_ref(),
        operations.default_source(),
    );

    let mut extension = Extension {
        actions: synthesize_actions(logic, slice, &operations),
        reducers: synthesize_reducers(logic, slice, &operations, default, options.lazy),
        listeners: synthesize_listeners(slice, &operations),
        ..Extension::default()
    };
    if options.lazy {
        extension
            .selectors
            .extend(synthesize_lazy_selector(logic, slice, &operations));
    }

    trace!(
        logic = %logic.path(),
        slice,
        actions = extension.actions.len(),
        reducers = extension.reducers.len(),
        lazy = options.lazy,
        "loaders extended"
    );
    logic.apply(extension);
}

impl LogicBuilder {
    pub fn loaders(self, input: impl Into<LoaderInput>, options: LoaderOptions) -> Self {
        self.extend(loaders(input, options))
    }
}
