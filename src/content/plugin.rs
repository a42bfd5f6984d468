use crate::backend::{ContextRequest, RenderContext, Surface};
use crate::content::{PaintCtx, PaintOutcome, StartCtx};
use crate::foundation::core::{ChannelConfig, PixelFormat};
use crate::foundation::error::{StrobeError, StrobeResult};
use crate::plugin::{PluginEntryPoints, PluginState, RenderStatus};

const DEFAULT_CHANNELS: ChannelConfig = ChannelConfig {
    red: 8,
    green: 8,
    blue: 8,
    alpha: 8,
};
const DEFAULT_CLIENT_VERSION: u32 = 2;

/// Frames produced by a renderer plugin through a render context.
pub struct PluginContent {
    library: String,
    args: Vec<String>,
    format: PixelFormat,
    entry: Option<PluginEntryPoints>,
    state: Option<PluginState>,
    context: Option<Box<dyn RenderContext>>,
    size: (u32, u32),
    frames: u64,
}

impl PluginContent {
    /// Parse `library [args...]`.
    pub fn from_content(content: &str) -> Self {
        let mut parts = content.split_whitespace().map(str::to_string);
        Self {
            library: parts.next().unwrap_or_default(),
            args: parts.collect(),
            format: PixelFormat::default(),
            entry: None,
            state: None,
            context: None,
            size: (0, 0),
            frames: 0,
        }
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub(crate) fn prepare(&mut self, ctx: StartCtx<'_>) -> StrobeResult<()> {
        if self.library.is_empty() {
            return Err(StrobeError::plugin("no plugin library given"));
        }
        let lib = ctx.plugins.open(&self.library)?;
        let entry = PluginEntryPoints::resolve(lib.as_ref())?;

        let (w, h) = ctx.spec.initial_size();
        self.size = (w.max(0) as u32, h.max(0) as u32);
        self.format = ctx.spec.format;

        let state = (entry.create)(self.size.0, self.size.1, &self.args).map_err(|code| {
            StrobeError::plugin(format!("'{}' create failed ({code})", self.library))
        })?;
        self.state = Some(state);
        self.entry = Some(entry);

        self.bind_context(ctx.surface)?;
        self.init()
    }

    /// Build the render context from the plugin-chosen config and client version.
    fn bind_context(&mut self, surface: &mut dyn Surface) -> StrobeResult<()> {
        let (Some(entry), Some(state)) = (self.entry.as_ref(), self.state.as_mut()) else {
            return Err(StrobeError::plugin("plugin not created"));
        };

        let default = self.format.channel_config().unwrap_or(DEFAULT_CHANNELS);
        let config = match entry.choose_config.as_ref() {
            None => default,
            Some(choose) => choose(state, default).unwrap_or_else(|| {
                tracing::warn!(plugin = %entry.library, "plugin chose no config, using default");
                default
            }),
        };
        let client_version = entry
            .create_context
            .as_ref()
            .and_then(|f| f(state))
            .unwrap_or(DEFAULT_CLIENT_VERSION);

        self.context = None;
        self.context = Some(surface.create_context(&ContextRequest {
            config,
            client_version,
        })?);
        Ok(())
    }

    /// Runs once per plugin instance; a context rebuild does not re-run it.
    fn init(&mut self) -> StrobeResult<()> {
        let (Some(entry), Some(state)) = (self.entry.as_ref(), self.state.as_mut()) else {
            return Err(StrobeError::plugin("plugin not created"));
        };
        if let Some(init) = entry.init.as_ref() {
            let code = init(state);
            if code != 0 {
                return Err(StrobeError::plugin(format!(
                    "'{}' init failed ({code})",
                    entry.library
                )));
            }
        }
        Ok(())
    }

    fn render_once(&mut self) -> StrobeResult<RenderStatus> {
        let (Some(entry), Some(state), Some(gl)) = (
            self.entry.as_ref(),
            self.state.as_mut(),
            self.context.as_mut(),
        ) else {
            return Err(StrobeError::plugin("plugin not prepared"));
        };
        Ok(RenderStatus::from_code((entry.render)(state, gl.as_mut())))
    }

    fn resize(&mut self, size: (u32, u32)) -> StrobeResult<()> {
        if let Some(gl) = self.context.as_mut() {
            gl.purge_buffers()?;
        }
        if let (Some(entry), Some(state)) = (self.entry.as_ref(), self.state.as_mut())
            && let Some(changed) = entry.size_changed.as_ref()
        {
            let code = changed(state, size.0, size.1);
            if code != 0 {
                return Err(StrobeError::plugin(format!(
                    "'{}' sizeChanged failed ({code})",
                    entry.library
                )));
            }
        }
        self.size = size;
        Ok(())
    }

    fn finish(&mut self, status: RenderStatus, retried: bool) -> StrobeResult<PaintOutcome> {
        let present = match status {
            RenderStatus::Ok => true,
            RenderStatus::Unknown(code) => {
                tracing::warn!(plugin = %self.library, code, "unknown render status, continuing");
                true
            }
            RenderStatus::NoPresent => false,
            RenderStatus::Reinit => {
                debug_assert!(retried);
                tracing::debug!(plugin = %self.library, "reinit requested again after retry");
                false
            }
            RenderStatus::Done => return Ok(PaintOutcome::Completed),
            RenderStatus::Error(code) => {
                return Err(StrobeError::plugin(format!(
                    "'{}' render failed ({code})",
                    self.library
                )));
            }
        };

        self.frames += 1;
        if present && let Some(gl) = self.context.as_mut() {
            gl.present()?;
        }
        Ok(PaintOutcome::Painted)
    }

    pub(crate) fn paint(&mut self, ctx: PaintCtx<'_>) -> StrobeResult<PaintOutcome> {
        if ctx.size != self.size {
            // Last frame at the old dimensions, before the buffers are purged.
            match self.render_once()? {
                RenderStatus::Done => return Ok(PaintOutcome::Completed),
                RenderStatus::Reinit => {
                    tracing::debug!(plugin = %self.library, "ignoring reinit before resize");
                }
                status => {
                    self.finish(status, false)?;
                }
            }
            self.resize(ctx.size)?;
        }

        match self.render_once()? {
            RenderStatus::Reinit => {
                if ctx.cancel.is_cancelled() {
                    return Ok(PaintOutcome::Cancelled);
                }
                tracing::debug!(plugin = %self.library, "rebuilding render context");
                self.bind_context(ctx.surface)?;
                let again = self.render_once()?;
                self.finish(again, true)
            }
            status => self.finish(status, false),
        }
    }
}

impl Drop for PluginContent {
    fn drop(&mut self) {
        if let (Some(entry), Some(state)) = (self.entry.as_ref(), self.state.take())
            && let Some(destroy) = entry.destroy.as_ref()
        {
            destroy(state);
        }
    }
}

impl std::fmt::Debug for PluginContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContent")
            .field("library", &self.library)
            .field("args", &self.args)
            .field("entry", &self.entry)
            .field("size", &self.size)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/plugin.rs"]
mod tests;
