//! Loader dot-grid animation contract.
//!
//! The host runs the actual Web Animations; the core only hands out
//! handles and asks for them to be cancelled again.

use crate::config::LoaderConfig;
use crate::ids::{IdAllocator, LoaderHandle};
use crate::outputs::{CoreEvent, Effect, Target};
use crate::session::Ctx;

#[derive(Debug, Default)]
pub struct LoaderAnimation {
    ids: IdAllocator,
    handles: Vec<LoaderHandle>,
}

impl LoaderAnimation {
    /// Replace any running animation with a fresh grid of dots.
    pub(crate) fn start(&mut self, ctx: &mut Ctx, cfg: &LoaderConfig) {
        if !self.handles.is_empty() {
            ctx.effect(Effect::CancelLoader {
                handles: std::mem::take(&mut self.handles),
            });
        }
        ctx.effect(Effect::SetHtml {
            target: Target::Loader,
            html: String::new(),
        });
        self.handles = (0..cfg.dots).map(|_| self.ids.alloc_loader()).collect();
        ctx.effect(Effect::SpawnLoader {
            handles: self.handles.clone(),
            cycle_ms: cfg.cycle_ms,
            stagger_ms: cfg.stagger_ms,
        });
        ctx.event(CoreEvent::LoaderStarted);
    }

    /// Cancel every running dot. A no-op when nothing runs.
    pub(crate) fn stop(&mut self, ctx: &mut Ctx) {
        if self.handles.is_empty() {
            return;
        }
        ctx.effect(Effect::CancelLoader {
            handles: std::mem::take(&mut self.handles),
        });
        ctx.event(CoreEvent::LoaderStopped);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    #[inline]
    pub fn handles(&self) -> &[LoaderHandle] {
        &self.handles
    }
}
