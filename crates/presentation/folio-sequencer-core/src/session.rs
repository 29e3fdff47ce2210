//! Session: one page visit.
//!
//! Owns every component, the virtual clock and the output buffer. Hosts
//! call [`Session::update`] with host events and elapsed time and apply the
//! returned effects in order.

use serde::{Deserialize, Serialize};

use crate::cascade::{CascadeAnimator, CascadeTask};
use crate::clock::{Millis, Scheduler, TaskId};
use crate::config::Config;
use crate::error::SequencerError;
use crate::header::HeaderState;
use crate::history::{restore_trigger, HistoryGuard, RestoreSource};
use crate::inputs::{HostEvent, Inputs};
use crate::layout::{PageKind, PageLayout};
use crate::lightbox::{point_inside_media, Lightbox};
use crate::loader::LoaderAnimation;
use crate::media::SlideVideos;
use crate::outputs::{CoreEvent, Effect, Outputs};
use crate::phone::{PhoneRevealGate, PhoneState};
use crate::readiness::{AssetSource, EssentialAssets, HeroReadinessMonitor, SignalState};
use crate::sequencer::{Sequencer, SequencerFlags, SequencerPhase, SequencerTask};
use crate::timeline::{parse_fade_duration, HeroTimeline, TimelineState, TimelineTask};
use crate::transition::{PageTransition, TransitionTask};

/// A scheduled unit of work, routed to its owning component when due.
#[derive(Debug)]
pub(crate) enum Task {
    Sequencer(SequencerTask),
    Timeline(TimelineTask),
    Cascade(CascadeTask),
    Transition(TransitionTask),
}

/// Clock plus output buffer, handed to components so they can schedule and
/// emit without borrowing the whole session.
#[derive(Debug, Default)]
pub(crate) struct Ctx {
    pub(crate) clock: Scheduler<Task>,
    pub(crate) out: Outputs,
}

impl Ctx {
    #[inline]
    pub(crate) fn now(&self) -> Millis {
        self.clock.now()
    }

    #[inline]
    pub(crate) fn effect(&mut self, effect: Effect) {
        let at = self.clock.now();
        self.out.push_effect(at, effect);
    }

    #[inline]
    pub(crate) fn event(&mut self, event: CoreEvent) {
        let at = self.clock.now();
        self.out.push_event(at, event);
    }

    #[inline]
    pub(crate) fn after(&mut self, delay: Millis, task: Task) -> TaskId {
        self.clock.schedule_in(delay, task)
    }

    #[inline]
    pub(crate) fn cancel(&mut self, id: TaskId) {
        self.clock.cancel(id);
    }
}

/// Read-only snapshot for collaborators and hosts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub now: Millis,
    pub phase: SequencerPhase,
    pub flags: SequencerFlags,
    pub cards_ready: bool,
    pub hover_effects_enabled: bool,
    pub timeline_index: usize,
    pub timeline_state: TimelineState,
    pub logo_override: bool,
    pub lightbox_open: bool,
    pub lightbox_index: Option<usize>,
    pub phone: PhoneState,
    pub loader_running: bool,
    pub pending_tasks: usize,
}

pub struct Session {
    pub(crate) cfg: Config,
    pub(crate) layout: PageLayout,
    pub(crate) kind: PageKind,
    pub(crate) ctx: Ctx,
    pub(crate) seq: Sequencer,
    pub(crate) essentials: EssentialAssets,
    pub(crate) hero_monitor: HeroReadinessMonitor,
    pub(crate) videos: SlideVideos,
    pub(crate) loader: LoaderAnimation,
    pub(crate) timeline: HeroTimeline,
    pub(crate) cascade: CascadeAnimator,
    pub(crate) history: HistoryGuard,
    pub(crate) lightbox: Lightbox,
    pub(crate) phone: PhoneRevealGate,
    pub(crate) header: HeaderState,
    pub(crate) transition: PageTransition,
    pub(crate) cards_ready: bool,
    pub(crate) hover_effects_enabled: bool,
    pub(crate) dom_ready_at: Option<Millis>,
}

impl Session {
    /// Build a session for one page. Nothing is emitted until `DomReady`.
    pub fn new(cfg: Config, layout: PageLayout) -> Result<Self, SequencerError> {
        layout.validate()?;
        let kind = layout.kind();
        if kind.has_timeline() {
            if cfg.hero.slides.is_empty() {
                return Err(SequencerError::EmptyTimeline);
            }
            let page = layout.slides.len();
            if page > 0 && page != cfg.hero.slides.len() {
                return Err(SequencerError::TimelineMismatch {
                    timeline: cfg.hero.slides.len(),
                    page,
                });
            }
        }

        let fade_ms = parse_fade_duration(layout.hero_fade.as_deref(), cfg.hero.default_fade_ms);
        let timeline = HeroTimeline::new(
            cfg.hero.slides.clone(),
            fade_ms,
            cfg.hero.incoming_transition_delay_ms,
            layout.has_logo(),
        );
        let essentials = EssentialAssets::new(layout.fonts_api, layout.logo);
        let videos = SlideVideos::from_layout(&layout);
        let lightbox = Lightbox::new(&cfg.lightbox);
        let phone = PhoneRevealGate::new(&cfg.phone, layout.coarse_pointer);
        let header = HeaderState::new(&cfg.header, kind == PageKind::Rotating);
        let transition = PageTransition::new(&cfg.transition);
        log::debug!("session for {} ({:?}, {} slides)", layout.path, kind, layout.slides.len());

        Ok(Self {
            cfg,
            layout,
            kind,
            ctx: Ctx::default(),
            seq: Sequencer::default(),
            essentials,
            hero_monitor: HeroReadinessMonitor::default(),
            videos,
            loader: LoaderAnimation::default(),
            timeline,
            cascade: CascadeAnimator::default(),
            history: HistoryGuard::default(),
            lightbox,
            phone,
            header,
            transition,
            cards_ready: false,
            hover_effects_enabled: false,
            dom_ready_at: None,
        })
    }

    /// Apply `inputs` at the current time, then advance the clock by `dt_ms`.
    pub fn update(&mut self, dt_ms: Millis, inputs: Inputs) -> &Outputs {
        self.ctx.out.clear();
        for event in inputs.events {
            self.dispatch(event);
        }
        let until = self.ctx.now().saturating_add(dt_ms);
        self.run_until(until);
        &self.ctx.out
    }

    /// Apply one event without advancing the clock.
    pub fn handle(&mut self, event: HostEvent) -> &Outputs {
        self.update(0, Inputs::one(event))
    }

    pub fn advance(&mut self, dt_ms: Millis) -> &Outputs {
        self.update(dt_ms, Inputs::default())
    }

    fn run_until(&mut self, until: Millis) {
        while let Some((id, task)) = self.ctx.clock.pop_due(until) {
            self.run_task(id, task);
        }
        self.ctx.clock.settle_at(until);
    }

    fn run_task(&mut self, id: TaskId, task: Task) {
        match task {
            Task::Sequencer(task) => self.run_sequencer_task(task),
            Task::Timeline(task) => {
                let logo_override = self.header.logo_override();
                self.timeline
                    .on_task(id, task, logo_override, &mut self.ctx, &mut self.videos);
            }
            Task::Cascade(task) => {
                if self.cascade.fired(id) {
                    self.run_cascade_task(task);
                }
            }
            Task::Transition(task) => {
                self.transition
                    .on_task(&mut self.ctx, &self.layout, id, task);
            }
        }
    }

    fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::DomReady => self.on_dom_ready(),
            HostEvent::WindowLoaded => {
                let delay = self.cfg.sequencer.cards_ready_after_load_ms;
                self.ctx
                    .after(delay, Task::Sequencer(SequencerTask::CardsReadyAfterLoad));
            }
            HostEvent::FontsReady => self.observe_essential(AssetSource::Font, SignalState::Ready),
            HostEvent::FontsFailed => {
                log::warn!("font loading failed, continuing");
                self.observe_essential(AssetSource::Font, SignalState::Errored);
            }
            HostEvent::LogoLoaded => self.observe_essential(AssetSource::Logo, SignalState::Ready),
            HostEvent::LogoFailed => {
                log::warn!("logo failed to load, continuing");
                self.observe_essential(AssetSource::Logo, SignalState::Errored);
            }
            HostEvent::Media { slide, event } => self.on_media(slide, event),
            HostEvent::PageShow {
                persisted,
                back_forward_entry,
            } => {
                if let Some(source) = restore_trigger(persisted, back_forward_entry) {
                    self.restore(source);
                }
            }
            HostEvent::PopState => self.restore(RestoreSource::PopState),
            HostEvent::PageHide => self.history.clear(),
            HostEvent::Scroll { y } => {
                let index = self.timeline.index();
                let has_logo = self.layout.has_logo();
                self.header.on_scroll(&mut self.ctx, y, index, has_logo);
            }
            HostEvent::Resize => {
                self.lightbox.on_resize(&mut self.ctx, &self.layout);
                if let Some(id) = self.seq.resize.take() {
                    self.ctx.cancel(id);
                }
                let delay = self.cfg.sequencer.resize_debounce_ms;
                self.seq.resize =
                    Some(self.ctx.after(delay, Task::Sequencer(SequencerTask::ResizeSettled)));
            }
            HostEvent::Activity => self.phone.register_activity(),
            HostEvent::PhoneClicked => {
                let now = self.ctx.now();
                let elapsed = self.dom_ready_at.map_or(0, |at| now.saturating_sub(at));
                self.phone.click(&mut self.ctx, elapsed);
            }
            HostEvent::PhoneFetched { outcome } => self.phone.fetched(&mut self.ctx, outcome),
            HostEvent::CardClicked { card } => {
                match self.layout.card(card).map(|c| c.text_card) {
                    None => {
                        let err = SequencerError::UnknownCard { id: card };
                        log::warn!("{err}");
                        self.ctx.event(CoreEvent::Warning {
                            message: err.to_string(),
                        });
                    }
                    Some(true) => log::debug!("text card {card} has no lightbox entry"),
                    Some(false) => {
                        self.apply_mobile_ordering();
                        self.lightbox.open(&mut self.ctx, &self.layout, card);
                    }
                }
            }
            HostEvent::LightboxKey { key } => self.lightbox.handle_key(&mut self.ctx, &key),
            HostEvent::LightboxNext => self.lightbox.show_next(&mut self.ctx),
            HostEvent::LightboxPrev => self.lightbox.show_prev(&mut self.ctx),
            HostEvent::LightboxClose => self.lightbox.close(&mut self.ctx),
            HostEvent::LightboxBackdropClick {
                x,
                y,
                on_control,
                in_container,
                container,
                media_aspect,
                media_rect,
            } => {
                let inside =
                    in_container && point_inside_media(x, y, container, media_aspect, media_rect);
                self.lightbox.backdrop_click(&mut self.ctx, on_control, inside);
            }
            HostEvent::TouchStart { x } => self.lightbox.touch_start(x),
            HostEvent::TouchEnd { x } => self.lightbox.touch_end(&mut self.ctx, x),
            HostEvent::LinkClicked {
                href,
                target_blank,
                logo,
            } => {
                self.transition
                    .link_clicked(&mut self.ctx, &self.layout, &href, target_blank, logo);
            }
        }
    }

    fn restore(&mut self, source: RestoreSource) {
        if self.dom_ready_at.is_none() {
            log::debug!("history restore from {} before DomReady ignored", source.as_str());
            return;
        }
        self.restore_from_history_navigation(source);
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            now: self.ctx.now(),
            phase: self.seq.phase(),
            flags: self.seq.flags(),
            cards_ready: self.cards_ready,
            hover_effects_enabled: self.hover_effects_enabled,
            timeline_index: self.timeline.index(),
            timeline_state: self.timeline.state(),
            logo_override: self.header.logo_override(),
            lightbox_open: self.lightbox.is_open(),
            lightbox_index: self.lightbox.current(),
            phone: self.phone.state(),
            loader_running: self.loader.is_running(),
            pending_tasks: self.ctx.clock.pending(),
        }
    }

    #[inline]
    pub fn now(&self) -> Millis {
        self.ctx.now()
    }

    #[inline]
    pub fn next_due(&self) -> Option<Millis> {
        self.ctx.clock.next_due()
    }

    #[inline]
    pub fn phase(&self) -> SequencerPhase {
        self.seq.phase()
    }

    #[inline]
    pub fn flags(&self) -> SequencerFlags {
        self.seq.flags()
    }

    #[inline]
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    #[inline]
    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    #[inline]
    pub fn timeline(&self) -> &HeroTimeline {
        &self.timeline
    }

    #[inline]
    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    #[inline]
    pub fn phone(&self) -> &PhoneRevealGate {
        &self.phone
    }

    #[inline]
    pub fn cascade(&self) -> &CascadeAnimator {
        &self.cascade
    }

    #[inline]
    pub fn videos(&self) -> &SlideVideos {
        &self.videos
    }

    #[inline]
    pub fn essentials(&self) -> &EssentialAssets {
        &self.essentials
    }

    #[inline]
    pub fn pending_tasks(&self) -> usize {
        self.ctx.clock.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CardSpec, SlideSpec};

    fn index_layout() -> PageLayout {
        PageLayout {
            path: "/index.html".into(),
            slides: vec![SlideSpec::default(); 3],
            left_column: vec![CardSpec::new(1)],
            right_column: vec![CardSpec::new(2)],
            ..PageLayout::default()
        }
    }

    #[test]
    fn construction_validates_timeline() {
        let mut layout = index_layout();
        layout.slides.pop();
        let err = Session::new(Config::default(), layout).err();
        assert_eq!(
            err,
            Some(SequencerError::TimelineMismatch {
                timeline: 3,
                page: 2
            })
        );

        let mut cfg = Config::default();
        cfg.hero.slides.clear();
        let err = Session::new(cfg, index_layout()).err();
        assert_eq!(err, Some(SequencerError::EmptyTimeline));
    }

    #[test]
    fn nothing_happens_before_dom_ready() {
        let mut session = Session::new(Config::default(), index_layout()).expect("session");
        assert!(session.advance(20_000).is_empty());
        assert_eq!(session.phase(), SequencerPhase::Idle);
        assert_eq!(session.now(), 20_000);
    }

    #[test]
    fn outputs_are_stamped_with_fire_time() {
        let mut session = Session::new(Config::default(), index_layout()).expect("session");
        session.handle(HostEvent::DomReady);
        let out = session.advance(10_000);
        assert!(out.effects.windows(2).all(|w| w[0].at <= w[1].at));
        assert!(out.effects.iter().all(|e| e.at <= 10_000));
    }
}
