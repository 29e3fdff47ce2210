//! Back/forward restores.
//!
//! A page brought back from the bfcache (or re-entered through history)
//! skips the loader and replays the content reveal from a clean slate.

use serde::{Deserialize, Serialize};

use crate::layout::PageKind;
use crate::outputs::{CoreEvent, Effect, Target};
use crate::sequencer::{CascadeState, HeroGate, HeroStartReason, LoaderHide, SequencerPhase};
use crate::session::Session;

/// What detected the history navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreSource {
    PerformanceEntry,
    PageShowPersisted,
    PageShowNavEntry,
    PopState,
}

impl RestoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerformanceEntry => "performance-entry",
            Self::PageShowPersisted => "pageshow-persisted",
            Self::PageShowNavEntry => "pageshow-nav-entry",
            Self::PopState => "popstate",
        }
    }
}

/// Decide whether a `pageshow` should trigger a restore.
pub fn restore_trigger(persisted: bool, back_forward_entry: bool) -> Option<RestoreSource> {
    match (persisted, back_forward_entry) {
        (true, _) => Some(RestoreSource::PageShowPersisted),
        (false, true) => Some(RestoreSource::PageShowNavEntry),
        (false, false) => None,
    }
}

/// One restore per page visit; `pagehide` re-arms it.
#[derive(Debug, Default)]
pub struct HistoryGuard {
    restored: bool,
}

impl HistoryGuard {
    /// Returns `false` if a restore already ran for this visit.
    pub fn try_enter(&mut self) -> bool {
        !std::mem::replace(&mut self.restored, true)
    }

    pub fn clear(&mut self) {
        self.restored = false;
    }

    #[inline]
    pub fn is_restored(&self) -> bool {
        self.restored
    }
}

impl Session {
    pub(crate) fn restore_from_history_navigation(&mut self, source: RestoreSource) {
        if !self.history.try_enter() {
            log::debug!("history restore from {} ignored, already restored", source.as_str());
            return;
        }
        let is_static = self.kind == PageKind::Static;

        for class in ["loaded", "content-ready", "hover-effects-ready"] {
            self.ctx.effect(Effect::add_class(Target::Body, class));
        }
        self.cards_ready = true;
        self.hover_effects_enabled = true;

        // in-flight timers from the previous visit must not fire into the restored page
        self.timeline.reset(&mut self.ctx);
        self.cascade.reset(&mut self.ctx);
        self.transition.cancel(&mut self.ctx);
        for id in [
            self.seq.hero_timeout.take(),
            self.seq.cascade_poll.take(),
            self.seq.local_failsafe.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.ctx.cancel(id);
        }

        self.seq.loaded = true;
        self.seq.loading_complete = true;
        self.seq.cascade = CascadeState::NotStarted;
        self.seq.loader_hide = LoaderHide::Hidden;
        self.seq.hero = if is_static {
            HeroGate::Started {
                reason: HeroStartReason::HistoryNav,
            }
        } else {
            HeroGate::Idle
        };
        if is_static {
            self.set_phase(SequencerPhase::Started);
            self.refresh_settled();
        } else {
            // the hero is queued again below, so the phase follows the flags
            self.rewind_phase(SequencerPhase::AssetsReady);
        }

        self.ctx.effect(Effect::remove_class(Target::Hero, "fade-out"));
        self.ctx.effect(Effect::clear_style(Target::Hero, "filter"));
        self.ctx.effect(Effect::clear_style(Target::Hero, "opacity"));
        if self.layout.hero_text.is_some() {
            self.ctx.effect(Effect::remove_class(Target::HeroText, "blur"));
            for property in ["opacity", "filter", "transition"] {
                self.ctx.effect(Effect::clear_style(Target::HeroText, property));
            }
        }
        for property in ["opacity", "filter", "transition"] {
            self.ctx
                .effect(Effect::clear_style(Target::ContentGrid, property));
        }
        self.ctx
            .effect(Effect::remove_class(Target::Header, "page-transition"));
        self.ctx
            .effect(Effect::clear_style(Target::Header, "--header-bg-opacity"));
        self.ctx
            .effect(Effect::style(Target::BackgroundOverlay, "opacity", "0"));
        self.ctx
            .effect(Effect::add_class(Target::LoadingOverlay, "hide"));

        self.loader.stop(&mut self.ctx);
        self.cache_link_colors();
        self.apply_text_card_colors();
        self.reset_hero_for_history();

        for card in self.layout.cards() {
            let target = Target::Card(card.id);
            for property in ["animation", "opacity", "transform"] {
                self.ctx.effect(Effect::clear_style(target.clone(), property));
            }
            if card.text_card {
                for index in 0..card.reveal_units.len() {
                    self.ctx.effect(Effect::remove_class(
                        Target::WordUnit {
                            card: card.id,
                            index,
                        },
                        "visible",
                    ));
                }
                self.ctx
                    .effect(Effect::remove_class(Target::CardText(card.id), "animating"));
            }
        }

        if is_static {
            self.start_static_content();
            self.videos.ensure_playback(&mut self.ctx, 0);
        } else {
            self.start_content_cascade();
            self.queue_hero_start(HeroStartReason::HistoryNav);
            if self.videos.has_video(0) {
                self.ctx.effect(Effect::PlayMedia {
                    target: Target::SlideVideo(0),
                });
            }
        }

        log::info!("restored from history navigation ({})", source.as_str());
        self.ctx.event(CoreEvent::HistoryRestored { source });
    }

    /// Put the hero back to its authored first-slide state.
    fn reset_hero_for_history(&mut self) {
        let Some(snapshot) = self.layout.hero_text.as_ref() else {
            return;
        };

        self.ctx.effect(Effect::remove_class(Target::HeroText, "blur"));
        self.ctx.effect(Effect::clear_style(Target::HeroText, "filter"));
        self.ctx
            .effect(Effect::clear_style(Target::HeroText, "transition"));

        match self.kind {
            PageKind::Static => {
                self.ctx
                    .effect(Effect::style(Target::HeroText, "opacity", "1"));
                return;
            }
            PageKind::Plain => return,
            PageKind::Rotating => {}
        }

        self.ctx.effect(Effect::SetHtml {
            target: Target::HeroText,
            html: snapshot.html.clone(),
        });
        self.ctx
            .effect(Effect::style(Target::HeroText, "color", snapshot.color.clone()));
        self.ctx
            .effect(Effect::style(Target::HeroText, "opacity", "1"));

        for index in 0..self.layout.slides.len() {
            let slide = Target::Slide(index);
            let first = index == 0;
            self.ctx.effect(Effect::clear_style(slide.clone(), "transition"));
            self.ctx.effect(Effect::style(
                slide.clone(),
                "opacity",
                if first { "1" } else { "0" },
            ));
            self.ctx
                .effect(Effect::style(slide, "z-index", if first { "0" } else { "" }));
        }

        if self.videos.has_video(0) {
            self.ctx.effect(Effect::SeekMedia {
                target: Target::SlideVideo(0),
                time: 0.0,
            });
            self.videos.ensure_playback(&mut self.ctx, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pageshow_triggers() {
        assert_eq!(
            restore_trigger(true, false),
            Some(RestoreSource::PageShowPersisted)
        );
        assert_eq!(
            restore_trigger(false, true),
            Some(RestoreSource::PageShowNavEntry)
        );
        assert_eq!(restore_trigger(false, false), None);
    }

    #[test]
    fn guard_enters_once_until_cleared() {
        let mut guard = HistoryGuard::default();
        assert!(guard.try_enter());
        assert!(!guard.try_enter());
        guard.clear();
        assert!(!guard.is_restored());
        assert!(guard.try_enter());
    }
}
