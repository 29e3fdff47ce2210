//! Faux page transitions for internal links.
//!
//! An intercepted click fades the page into the destination's background
//! colour and logo tone, then navigates once the fade has run.

use hashbrown::HashSet;

use crate::clock::TaskId;
use crate::config::TransitionConfig;
use crate::layout::PageLayout;
use crate::outputs::{CoreEvent, Effect, Target};
use crate::page_colors::{logo_tone, page_color, LogoTone};
use crate::session::{Ctx, Task};

/// Whether a link click should run a page transition instead of the
/// browser's default navigation.
pub fn is_intercepted_link(href: &str, target_blank: bool) -> bool {
    !(href.is_empty()
        || href.starts_with('#')
        || href.starts_with("http")
        || href.starts_with("//")
        || target_blank)
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransitionTask {
    /// Delayed start after a logo click.
    Start { href: String },
    SwitchLogo { dark: bool },
    FadeHero,
    Navigate { url: String },
}

#[derive(Debug)]
pub struct PageTransition {
    cfg: TransitionConfig,
    pending: HashSet<TaskId>,
    active: bool,
}

impl PageTransition {
    pub fn new(cfg: &TransitionConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            pending: HashSet::new(),
            active: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn schedule(&mut self, ctx: &mut Ctx, delay: u64, task: TransitionTask) {
        let id = ctx.after(delay, Task::Transition(task));
        self.pending.insert(id);
    }

    /// Handle a link click. An intercepted click emits
    /// [`CoreEvent::LinkIntercepted`], which tells the host to prevent the
    /// default navigation; other clicks emit nothing.
    pub(crate) fn link_clicked(
        &mut self,
        ctx: &mut Ctx,
        layout: &PageLayout,
        href: &str,
        target_blank: bool,
        logo: bool,
    ) {
        if !is_intercepted_link(href, target_blank) {
            return;
        }
        // a newer click replaces whatever transition was underway
        self.cancel(ctx);
        ctx.event(CoreEvent::LinkIntercepted {
            href: href.to_string(),
        });
        if logo {
            let delay = self.cfg.logo_click_delay_ms;
            self.schedule(
                ctx,
                delay,
                TransitionTask::Start {
                    href: href.to_string(),
                },
            );
        } else {
            self.perform(ctx, layout, href);
        }
    }

    pub(crate) fn on_task(&mut self, ctx: &mut Ctx, layout: &PageLayout, id: TaskId, task: TransitionTask) {
        if !self.pending.remove(&id) {
            return;
        }
        match task {
            TransitionTask::Start { href } => self.perform(ctx, layout, &href),
            TransitionTask::SwitchLogo { dark } => {
                ctx.effect(if dark {
                    Effect::remove_class(Target::Logo, "light")
                } else {
                    Effect::add_class(Target::Logo, "light")
                });
                let fade = self.cfg.duration_ms.saturating_sub(self.cfg.logo_delay_ms);
                ctx.effect(Effect::style(
                    Target::Logo,
                    "transition",
                    format!("filter {fade}ms ease, opacity {fade}ms ease, color {fade}ms ease"),
                ));
                ctx.event(CoreEvent::LogoToneChanged { light: !dark });
            }
            TransitionTask::FadeHero => fade_hero(ctx),
            TransitionTask::Navigate { url } => {
                self.active = false;
                ctx.effect(Effect::Navigate { url: url.clone() });
                ctx.event(CoreEvent::NavigationStarted { url });
            }
        }
    }

    fn perform(&mut self, ctx: &mut Ctx, layout: &PageLayout, href: &str) {
        let destination = page_color(href);
        let dark_logo = logo_tone(href) == LogoTone::Dark;
        let cfg = self.cfg.clone();
        self.active = true;
        log::info!("page transition to {href} ({destination})");

        ctx.effect(Effect::add_class(Target::Header, "page-transition"));
        ctx.effect(Effect::css_var(Target::Header, "--header-bg-opacity", "0"));

        if layout.has_logo() {
            self.schedule(
                ctx,
                cfg.logo_delay_ms,
                TransitionTask::SwitchLogo { dark: dark_logo },
            );
        }

        ctx.effect(Effect::style(
            Target::BackgroundOverlay,
            "background-color",
            destination,
        ));
        ctx.effect(Effect::style(
            Target::BackgroundOverlay,
            "transition",
            format!("opacity {}ms ease", cfg.duration_ms),
        ));
        ctx.effect(Effect::style(Target::BackgroundOverlay, "opacity", "1"));

        let fade = cfg.content_fade_ms;
        ctx.effect(Effect::style(
            Target::ContentGrid,
            "transition",
            format!("opacity {fade}ms cubic-bezier(0.2, 0, 0.8, 0.5), filter {fade}ms ease"),
        ));
        ctx.effect(Effect::style(Target::ContentGrid, "opacity", "0"));
        ctx.effect(Effect::style(Target::ContentGrid, "filter", "blur(10px)"));

        if layout.is_immersive_static() {
            fade_hero(ctx);
        } else {
            self.schedule(ctx, cfg.hero_fade_delay_ms, TransitionTask::FadeHero);
        }

        self.schedule(
            ctx,
            cfg.duration_ms,
            TransitionTask::Navigate {
                url: href.to_string(),
            },
        );
    }

    /// Drop every pending step of a transition.
    pub(crate) fn cancel(&mut self, ctx: &mut Ctx) {
        for id in self.pending.drain() {
            ctx.cancel(id);
        }
        self.active = false;
    }
}

fn fade_hero(ctx: &mut Ctx) {
    ctx.effect(Effect::style(
        Target::HeroText,
        "transition",
        "opacity 0.5s ease-out",
    ));
    ctx.effect(Effect::style(Target::HeroText, "opacity", "0"));
    ctx.effect(Effect::add_class(Target::Hero, "fade-out"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_filtering() {
        assert!(is_intercepted_link("proj-nqs.html", false));
        assert!(is_intercepted_link("/index.html", false));
        assert!(!is_intercepted_link("#contact", false));
        assert!(!is_intercepted_link("https://example.com", false));
        assert!(!is_intercepted_link("//cdn.example.com/x", false));
        assert!(!is_intercepted_link("proj-nqs.html", true));
        assert!(!is_intercepted_link("", false));
    }
}
