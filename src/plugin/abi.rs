use std::any::Any;
use std::sync::Arc;

use crate::backend::RenderContext;
use crate::foundation::core::ChannelConfig;
use crate::foundation::error::{StrobeError, StrobeResult};

/// Opaque per-instance plugin data returned by `create`.
pub type PluginState = Box<dyn Any + Send>;

pub type CreateFn = Arc<dyn Fn(u32, u32, &[String]) -> Result<PluginState, i32> + Send + Sync>;
pub type InitFn = Arc<dyn Fn(&mut PluginState) -> i32 + Send + Sync>;
pub type RenderFn = Arc<dyn Fn(&mut PluginState, &mut dyn RenderContext) -> i32 + Send + Sync>;
pub type DestroyFn = Arc<dyn Fn(PluginState) + Send + Sync>;
pub type SizeChangedFn = Arc<dyn Fn(&mut PluginState, u32, u32) -> i32 + Send + Sync>;
pub type ChooseConfigFn =
    Arc<dyn Fn(&mut PluginState, ChannelConfig) -> Option<ChannelConfig> + Send + Sync>;
pub type CreateContextFn = Arc<dyn Fn(&mut PluginState) -> Option<u32> + Send + Sync>;

pub const SYM_CREATE: &str = "create";
pub const SYM_INIT: &str = "init";
pub const SYM_RENDER: &str = "render";
pub const SYM_DESTROY: &str = "destroy";
pub const SYM_SIZE_CHANGED: &str = "sizeChanged";
pub const SYM_CHOOSE_CONFIG: &str = "chooseConfig";
pub const SYM_CREATE_CONTEXT: &str = "createContext";

/// One exported entry point.
#[derive(Clone)]
pub enum PluginSymbol {
    Create(CreateFn),
    Init(InitFn),
    Render(RenderFn),
    Destroy(DestroyFn),
    SizeChanged(SizeChangedFn),
    ChooseConfig(ChooseConfigFn),
    CreateContext(CreateContextFn),
}

impl PluginSymbol {
    fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => SYM_CREATE,
            Self::Init(_) => SYM_INIT,
            Self::Render(_) => SYM_RENDER,
            Self::Destroy(_) => SYM_DESTROY,
            Self::SizeChanged(_) => SYM_SIZE_CHANGED,
            Self::ChooseConfig(_) => SYM_CHOOSE_CONFIG,
            Self::CreateContext(_) => SYM_CREATE_CONTEXT,
        }
    }
}

impl std::fmt::Debug for PluginSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PluginSymbol({})", self.kind())
    }
}

/// A loaded plugin library.
pub trait PluginLibrary: Send + Sync {
    fn name(&self) -> &str;
    /// Look up an exported entry point by name.
    fn symbol(&self, name: &str) -> Option<PluginSymbol>;
}

/// Decoded result of a `render` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStatus {
    /// Frame rendered; present it.
    Ok,
    /// Context lost; rebuild it and retry once.
    Reinit,
    /// The plugin has nothing more to show.
    Done,
    /// Frame rendered; do not present.
    NoPresent,
    /// Unrecognized positive code, treated as success.
    Unknown(i32),
    /// Negative code.
    Error(i32),
}

impl RenderStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Reinit,
            2 => Self::Done,
            3 => Self::NoPresent,
            c if c < 0 => Self::Error(c),
            c => Self::Unknown(c),
        }
    }
}

/// Resolved entry points of one plugin library.
#[derive(Clone)]
pub struct PluginEntryPoints {
    pub library: String,
    pub create: CreateFn,
    pub render: RenderFn,
    pub init: Option<InitFn>,
    pub destroy: Option<DestroyFn>,
    pub size_changed: Option<SizeChangedFn>,
    pub choose_config: Option<ChooseConfigFn>,
    pub create_context: Option<CreateContextFn>,
}

macro_rules! lookup {
    ($lib:expr, $name:expr, $variant:ident) => {
        match $lib.symbol($name) {
            None => None,
            Some(PluginSymbol::$variant(f)) => Some(f),
            Some(other) => {
                return Err(StrobeError::plugin(format!(
                    "'{}' exports {} with the signature of {}",
                    $lib.name(),
                    $name,
                    other.kind()
                )));
            }
        }
    };
}

impl PluginEntryPoints {
    /// Resolve all entry points. A missing required symbol is an error; missing optional
    /// symbols are left unset.
    pub fn resolve(lib: &dyn PluginLibrary) -> StrobeResult<Self> {
        let required = |name: &str| {
            StrobeError::plugin(format!("'{}' does not export {name}", lib.name()))
        };

        let create = lookup!(lib, SYM_CREATE, Create).ok_or_else(|| required(SYM_CREATE))?;
        let render = lookup!(lib, SYM_RENDER, Render).ok_or_else(|| required(SYM_RENDER))?;

        Ok(Self {
            library: lib.name().to_string(),
            create,
            render,
            init: lookup!(lib, SYM_INIT, Init),
            destroy: lookup!(lib, SYM_DESTROY, Destroy),
            size_changed: lookup!(lib, SYM_SIZE_CHANGED, SizeChanged),
            choose_config: lookup!(lib, SYM_CHOOSE_CONFIG, ChooseConfig),
            create_context: lookup!(lib, SYM_CREATE_CONTEXT, CreateContext),
        })
    }
}

impl std::fmt::Debug for PluginEntryPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntryPoints")
            .field("library", &self.library)
            .field("init", &self.init.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("size_changed", &self.size_changed.is_some())
            .field("choose_config", &self.choose_config.is_some())
            .field("create_context", &self.create_context.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plugin/abi.rs"]
mod tests;
