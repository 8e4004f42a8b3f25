mod actions;
mod breakpoint;
mod context;
mod defaults;
mod error;
mod lazy;
mod listeners;
mod loader;
mod loaders;
mod logic;
mod operation_set;
mod plugin;
mod reducers;

#[cfg(test)]
mod unit_tests;

pub use actions::*;
pub use breakpoint::*;
pub use context::*;
pub use defaults::*;
pub use error::*;
pub use lazy::*;
pub use listeners::*;
pub use loader::*;
pub use loaders::*;
pub use logic::*;
pub use operation_set::*;
pub use plugin::*;
pub use reducers::*;

pub use serde_json::{json, Value};
