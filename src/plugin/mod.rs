//! Renderer plugins.
//!
//! A plugin is a named symbol table ([`abi::PluginLibrary`]) obtained from a
//! [`registry::PluginLoader`]. The content strategy resolves the entry points once while the
//! worker is starting; `create` and `render` are required, everything else is optional.

pub mod abi;
pub mod pulse;
pub mod registry;

pub use abi::{PluginEntryPoints, PluginLibrary, PluginState, PluginSymbol, RenderStatus};
pub use registry::{PluginLoader, PluginRegistry, StaticLibrary};
