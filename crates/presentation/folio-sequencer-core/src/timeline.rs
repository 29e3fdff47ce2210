//! Hero slideshow timeline.
//!
//! A cyclic cross-fading slideshow with per-slide hero text and logo tone.
//! Every timer the timeline arms is tracked so `stop()` can cancel the
//! whole chain.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::clock::{Millis, TaskId};
use crate::media::SlideVideos;
use crate::outputs::{CoreEvent, Effect, Target};
use crate::session::{Ctx, Task};

/// One entry of the hero timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineSlide {
    pub duration_ms: Millis,
    /// Hero text as HTML (may contain `<br>`).
    pub text: String,
    pub hero_text_delay_s: f64,
    pub logo_switch_delay_s: f64,
    pub hero_text_color: String,
}

impl TimelineSlide {
    #[inline]
    pub fn text_delay_ms(&self) -> Millis {
        seconds_to_ms(self.hero_text_delay_s)
    }

    #[inline]
    pub fn logo_delay_ms(&self) -> Millis {
        seconds_to_ms(self.logo_switch_delay_s)
    }
}

fn seconds_to_ms(seconds: f64) -> Millis {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as Millis
    } else {
        0
    }
}

pub fn default_slides() -> Vec<TimelineSlide> {
    vec![
        TimelineSlide {
            duration_ms: 8000,
            text: "Turning ideas into<br>form and function".to_string(),
            hero_text_delay_s: 3.0,
            logo_switch_delay_s: 0.0,
            hero_text_color: "#000".to_string(),
        },
        TimelineSlide {
            duration_ms: 7000,
            text: "Creating intuitive<br>user experiences".to_string(),
            hero_text_delay_s: 2.7,
            logo_switch_delay_s: 2.7,
            hero_text_color: "#fff".to_string(),
        },
        TimelineSlide {
            duration_ms: 10000,
            text: "Elevating concepts<br>through motion".to_string(),
            hero_text_delay_s: 6.7,
            logo_switch_delay_s: 6.7,
            hero_text_color: "#000".to_string(),
        },
    ]
}

/// Cross-fade duration from a `--hero-intro-duration` value in seconds.
///
/// Reads the leading number the way `parseFloat` does; a missing, zero or
/// unparseable value yields `default_ms`.
pub fn parse_fade_duration(raw: Option<&str>, default_ms: Millis) -> Millis {
    let Some(raw) = raw else {
        return default_ms;
    };
    let raw = raw.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in raw.char_indices() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            '+' | '-' if i == 0 => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    // "2." still parses, a lone sign does not
    let number = raw[..end].trim_end_matches('.');
    match number.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => (seconds * 1000.0).round() as Millis,
        _ => default_ms,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimelineState {
    Idle,
    /// Started, first slide text not revealed yet.
    Intro,
    Showing { index: usize },
    Crossfading { from: usize, to: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineTask {
    RevealIntroText,
    Advance,
    EnableIncomingFade { slide: usize },
    RevealText { index: usize },
    SwitchLogo { index: usize },
    CompleteCrossfade { from: usize, to: usize },
}

#[derive(Debug)]
pub struct HeroTimeline {
    slides: Vec<TimelineSlide>,
    fade_ms: Millis,
    incoming_delay_ms: Millis,
    has_logo: bool,
    state: TimelineState,
    index: usize,
    pending: HashSet<TaskId>,
}

impl HeroTimeline {
    pub fn new(
        slides: Vec<TimelineSlide>,
        fade_ms: Millis,
        incoming_delay_ms: Millis,
        has_logo: bool,
    ) -> Self {
        Self {
            slides,
            fade_ms,
            incoming_delay_ms,
            has_logo,
            state: TimelineState::Idle,
            index: 0,
            pending: HashSet::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Index of the slide currently shown.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn fade_ms(&self) -> Millis {
        self.fade_ms
    }

    #[inline]
    pub fn slides(&self) -> &[TimelineSlide] {
        &self.slides
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn fade_transition(&self) -> String {
        let f = self.fade_ms;
        format!("opacity {f}ms, filter {f}ms, transform {f}ms")
    }

    fn schedule(&mut self, ctx: &mut Ctx, delay: Millis, task: TimelineTask) {
        let id = ctx.after(delay, Task::Timeline(task));
        self.pending.insert(id);
    }

    /// Begin the intro: hidden, blurred hero text that resolves into the
    /// first slide's text, then the first advance.
    pub(crate) fn start(&mut self, ctx: &mut Ctx, videos: &mut SlideVideos) {
        self.stop(ctx);
        let Some(first) = self.slides.first() else {
            log::warn!("hero timeline has no slides, not starting");
            return;
        };
        let (text_delay, duration) = (first.text_delay_ms(), first.duration_ms);

        self.index = 0;
        self.state = TimelineState::Intro;
        if videos.has_video(0) {
            ctx.effect(Effect::SeekMedia {
                target: Target::SlideVideo(0),
                time: 0.0,
            });
            videos.ensure_playback(ctx, 0);
        }
        ctx.effect(Effect::style(Target::HeroText, "opacity", "0"));
        ctx.effect(Effect::style(
            Target::HeroText,
            "transition",
            self.fade_transition(),
        ));
        ctx.effect(Effect::add_class(Target::HeroText, "blur"));

        self.schedule(ctx, text_delay, TimelineTask::RevealIntroText);
        self.schedule(ctx, duration, TimelineTask::Advance);
        log::info!("hero timeline started ({} slides)", self.slides.len());
    }

    /// Run a fired timeline task. Tasks not armed by this timeline are dropped.
    pub(crate) fn on_task(
        &mut self,
        id: TaskId,
        task: TimelineTask,
        logo_override: bool,
        ctx: &mut Ctx,
        videos: &mut SlideVideos,
    ) {
        if !self.pending.remove(&id) {
            log::debug!("dropping stale timeline task {task:?}");
            return;
        }
        match task {
            TimelineTask::RevealIntroText => {
                self.reveal_text(ctx, 0);
                if self.state == TimelineState::Intro {
                    self.state = TimelineState::Showing { index: 0 };
                }
            }
            TimelineTask::Advance => self.next_slide(ctx, videos),
            TimelineTask::EnableIncomingFade { slide } => {
                ctx.effect(Effect::style(
                    Target::Slide(slide),
                    "transition",
                    format!("opacity {}ms", self.fade_ms),
                ));
            }
            TimelineTask::RevealText { index } => self.reveal_text(ctx, index),
            TimelineTask::SwitchLogo { index } => self.switch_logo(ctx, index, logo_override),
            TimelineTask::CompleteCrossfade { from, to } => {
                self.complete_crossfade(ctx, videos, from, to)
            }
        }
    }

    fn next_slide(&mut self, ctx: &mut Ctx, videos: &mut SlideVideos) {
        let len = self.slides.len();
        if len == 0 {
            return;
        }
        let from = self.index;
        let to = (from + 1) % len;
        let (text_delay, logo_delay) = {
            let next = &self.slides[to];
            (next.text_delay_ms(), next.logo_delay_ms())
        };

        // incoming slide appears at once, its fade re-enabled shortly after
        ctx.effect(Effect::style(Target::Slide(to), "transition", "none"));
        ctx.effect(Effect::style(Target::Slide(to), "opacity", "1"));
        ctx.effect(Effect::style(Target::Slide(to), "z-index", "0"));
        self.schedule(
            ctx,
            self.incoming_delay_ms,
            TimelineTask::EnableIncomingFade { slide: to },
        );

        if videos.has_video(to) {
            ctx.effect(Effect::SeekMedia {
                target: Target::SlideVideo(to),
                time: 0.0,
            });
            videos.ensure_playback(ctx, to);
        }

        ctx.effect(Effect::style(
            Target::HeroText,
            "transition",
            self.fade_transition(),
        ));
        ctx.effect(Effect::style(Target::HeroText, "opacity", "0"));
        ctx.effect(Effect::add_class(Target::HeroText, "blur"));

        ctx.effect(Effect::style(
            Target::Slide(from),
            "transition",
            format!("opacity {}ms", self.fade_ms),
        ));
        ctx.effect(Effect::style(Target::Slide(from), "opacity", "0"));
        ctx.effect(Effect::style(Target::Slide(from), "z-index", "1"));

        // text never changes before the fade-out has finished
        self.schedule(
            ctx,
            text_delay.max(self.fade_ms),
            TimelineTask::RevealText { index: to },
        );
        if self.has_logo {
            self.schedule(ctx, logo_delay, TimelineTask::SwitchLogo { index: to });
        }
        self.schedule(
            ctx,
            self.fade_ms,
            TimelineTask::CompleteCrossfade { from, to },
        );
        self.state = TimelineState::Crossfading { from, to };
    }

    fn complete_crossfade(&mut self, ctx: &mut Ctx, videos: &mut SlideVideos, from: usize, to: usize) {
        if videos.has_video(from) {
            ctx.effect(Effect::PauseMedia {
                target: Target::SlideVideo(from),
            });
            if !videos.is_looping(from) {
                ctx.effect(Effect::SeekMedia {
                    target: Target::SlideVideo(from),
                    time: 0.0,
                });
            }
        }
        ctx.effect(Effect::style(Target::Slide(from), "z-index", "0"));

        self.index = to;
        self.state = TimelineState::Showing { index: to };
        ctx.event(CoreEvent::SlideAdvanced { index: to });

        let duration = self.slides.get(to).map_or(0, |s| s.duration_ms);
        let remaining = duration.saturating_sub(self.fade_ms);
        let next = if remaining > 0 { remaining } else { duration };
        self.schedule(ctx, next, TimelineTask::Advance);
    }

    fn reveal_text(&self, ctx: &mut Ctx, index: usize) {
        let Some(slide) = self.slides.get(index) else {
            return;
        };
        ctx.effect(Effect::SetHtml {
            target: Target::HeroText,
            html: slide.text.clone(),
        });
        ctx.effect(Effect::style(
            Target::HeroText,
            "color",
            slide.hero_text_color.clone(),
        ));
        ctx.effect(Effect::remove_class(Target::HeroText, "blur"));
        ctx.effect(Effect::style(Target::HeroText, "opacity", "1"));
        ctx.event(CoreEvent::HeroTextUpdated { index });
    }

    fn switch_logo(&self, ctx: &mut Ctx, index: usize, logo_override: bool) {
        if logo_override {
            log::debug!("logo switch for slide {index} suppressed by scroll override");
            return;
        }
        let light = index == 1;
        ctx.effect(if light {
            Effect::add_class(Target::Logo, "light")
        } else {
            Effect::remove_class(Target::Logo, "light")
        });
        ctx.event(CoreEvent::LogoToneChanged { light });
    }

    /// Cancel every pending timeline task. The current index is kept.
    pub(crate) fn stop(&mut self, ctx: &mut Ctx) {
        for id in self.pending.drain() {
            ctx.cancel(id);
        }
        self.state = TimelineState::Idle;
    }

    /// Stop and rewind to the first slide.
    pub(crate) fn reset(&mut self, ctx: &mut Ctx) {
        self.stop(ctx);
        self.index = 0;
    }
}
