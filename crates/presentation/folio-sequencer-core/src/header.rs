//! Sticky header background and the scroll-driven logo override.

use crate::config::HeaderConfig;
use crate::layout::PageLayout;
use crate::outputs::{Effect, Target};
use crate::page_colors::{header_background, logo_tone, LogoTone};
use crate::session::Ctx;

#[derive(Debug)]
pub struct HeaderState {
    cfg: HeaderConfig,
    /// Only rotating pages hand the logo over to the scroll position.
    smart_logo: bool,
    scroll_override: bool,
    scroll_y: f64,
}

impl HeaderState {
    pub fn new(cfg: &HeaderConfig, smart_logo: bool) -> Self {
        Self {
            cfg: cfg.clone(),
            smart_logo,
            scroll_override: false,
            scroll_y: 0.0,
        }
    }

    /// Logo tone is pinned by the scroll position.
    #[inline]
    pub fn logo_override(&self) -> bool {
        self.scroll_override
    }

    #[inline]
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Header background opacity at scroll offset `y`.
    pub fn opacity_at(&self, y: f64) -> f64 {
        if y <= 0.0 {
            0.0
        } else if y <= self.cfg.fade_distance_px {
            (y / self.cfg.fade_distance_px).min(1.0) * self.cfg.max_opacity
        } else {
            self.cfg.max_opacity
        }
    }

    /// Colour the header after the page background.
    pub(crate) fn init(&mut self, ctx: &mut Ctx, layout: &PageLayout, timeline_index: usize) {
        let color = layout
            .background_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(self.cfg.fallback_background.as_str());
        ctx.effect(Effect::css_var(
            Target::Header,
            "--header-bg-color",
            header_background(color, self.cfg.max_opacity),
        ));
        self.on_scroll(ctx, 0.0, timeline_index, layout.has_logo());
    }

    pub(crate) fn on_scroll(&mut self, ctx: &mut Ctx, y: f64, timeline_index: usize, has_logo: bool) {
        self.scroll_y = y;
        if y > 0.0 {
            ctx.effect(Effect::add_class(Target::Header, "scrolled"));
            ctx.effect(Effect::css_var(
                Target::Header,
                "--header-bg-opacity",
                self.opacity_at(y).to_string(),
            ));
            ctx.effect(Effect::remove_class(Target::Header, "scrolled-max"));
        } else {
            ctx.effect(Effect::remove_class(Target::Header, "scrolled"));
            ctx.effect(Effect::remove_class(Target::Header, "scrolled-max"));
            ctx.effect(Effect::css_var(Target::Header, "--header-bg-opacity", "0"));
        }

        if self.smart_logo && has_logo {
            self.switch_logo(ctx, y, timeline_index);
        }
    }

    fn switch_logo(&mut self, ctx: &mut Ctx, y: f64, timeline_index: usize) {
        let light = if y < self.cfg.logo_override_px {
            self.scroll_override = false;
            ctx.effect(Effect::remove_class(Target::Logo, "scroll-override"));
            timeline_index == 1
        } else {
            self.scroll_override = true;
            ctx.effect(Effect::add_class(Target::Logo, "scroll-override"));
            logo_tone("index.html") == LogoTone::Light
        };
        ctx.effect(if light {
            Effect::add_class(Target::Logo, "light")
        } else {
            Effect::remove_class(Target::Logo, "light")
        });
    }
}
