use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::backend::RenderContext;
use crate::foundation::core::ChannelConfig;
use crate::foundation::error::{StrobeError, StrobeResult};
use crate::plugin::abi::{
    PluginLibrary, PluginState, PluginSymbol, SYM_CHOOSE_CONFIG, SYM_CREATE, SYM_CREATE_CONTEXT,
    SYM_DESTROY, SYM_INIT, SYM_RENDER, SYM_SIZE_CHANGED,
};

/// Opens plugin libraries by name.
pub trait PluginLoader: Send + Sync {
    fn open(&self, name: &str) -> StrobeResult<Arc<dyn PluginLibrary>>;
}

/// A library assembled in-process from closures.
#[derive(Clone, Debug)]
pub struct StaticLibrary {
    name: String,
    symbols: BTreeMap<String, PluginSymbol>,
}

impl StaticLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: BTreeMap::new(),
        }
    }

    /// Export `symbol` under an arbitrary name.
    pub fn export(mut self, name: impl Into<String>, symbol: PluginSymbol) -> Self {
        self.symbols.insert(name.into(), symbol);
        self
    }

    pub fn create(
        self,
        f: impl Fn(u32, u32, &[String]) -> Result<PluginState, i32> + Send + Sync + 'static,
    ) -> Self {
        self.export(SYM_CREATE, PluginSymbol::Create(Arc::new(f)))
    }

    pub fn init(self, f: impl Fn(&mut PluginState) -> i32 + Send + Sync + 'static) -> Self {
        self.export(SYM_INIT, PluginSymbol::Init(Arc::new(f)))
    }

    pub fn render(
        self,
        f: impl Fn(&mut PluginState, &mut dyn RenderContext) -> i32 + Send + Sync + 'static,
    ) -> Self {
        self.export(SYM_RENDER, PluginSymbol::Render(Arc::new(f)))
    }

    pub fn destroy(self, f: impl Fn(PluginState) + Send + Sync + 'static) -> Self {
        self.export(SYM_DESTROY, PluginSymbol::Destroy(Arc::new(f)))
    }

    pub fn size_changed(
        self,
        f: impl Fn(&mut PluginState, u32, u32) -> i32 + Send + Sync + 'static,
    ) -> Self {
        self.export(SYM_SIZE_CHANGED, PluginSymbol::SizeChanged(Arc::new(f)))
    }

    pub fn choose_config(
        self,
        f: impl Fn(&mut PluginState, ChannelConfig) -> Option<ChannelConfig> + Send + Sync + 'static,
    ) -> Self {
        self.export(SYM_CHOOSE_CONFIG, PluginSymbol::ChooseConfig(Arc::new(f)))
    }

    pub fn create_context(
        self,
        f: impl Fn(&mut PluginState) -> Option<u32> + Send + Sync + 'static,
    ) -> Self {
        self.export(SYM_CREATE_CONTEXT, PluginSymbol::CreateContext(Arc::new(f)))
    }
}

impl PluginLibrary for StaticLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self, name: &str) -> Option<PluginSymbol> {
        self.symbols.get(name).cloned()
    }
}

/// Name-indexed set of libraries.
///
/// Lookups accept bare names (`pulse`) as well as shared-object paths (`/system/lib/libpulse.so`),
/// which resolve to their file stem without the `lib` prefix.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    libs: BTreeMap<String, Arc<dyn PluginLibrary>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the bundled plugins.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(crate::plugin::pulse::library());
        reg
    }

    pub fn register(&mut self, lib: impl PluginLibrary + 'static) -> &mut Self {
        self.libs.insert(lib.name().to_string(), Arc::new(lib));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libs.keys().map(String::as_str)
    }
}

fn library_key(name: &str) -> &str {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    stem.strip_prefix("lib").unwrap_or(stem)
}

impl PluginLoader for PluginRegistry {
    fn open(&self, name: &str) -> StrobeResult<Arc<dyn PluginLibrary>> {
        self.libs
            .get(name)
            .or_else(|| self.libs.get(library_key(name)))
            .cloned()
            .ok_or_else(|| StrobeError::plugin(format!("unable to open plugin library '{name}'")))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.libs.keys()).finish()
    }
}
