//! Page start-up choreography.
//!
//! Loader, essentials, failsafes, hero gating and the content cascade. The
//! sequencer state is a handful of small tagged enums; the four legacy
//! flags are derived from them in [`SequencerFlags`].

use serde::{Deserialize, Serialize};

use crate::cascade::{alternating_sequence, CascadeTask, WordPacing};
use crate::clock::{Millis, TaskId};
use crate::error::SequencerError;
use crate::inputs::MediaEvent;
use crate::layout::{LogoStatus, PageKind};
use crate::outputs::{CoreEvent, Effect, Target};
use crate::page_colors::{has_dark_background, logo_tone, page_color};
use crate::readiness::{AssetSource, HeroProbe, HeroReadyReason, SignalState};
use crate::session::{Session, Task};
use crate::transition::is_intercepted_link;

/// Coarse progress of the page. Only ever moves forward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerPhase {
    Idle,
    LoaderRunning,
    AssetsReady,
    GlobalFailsafe,
    HeroQueued,
    Started,
    Settled,
}

impl SequencerPhase {
    fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::LoaderRunning => 1,
            Self::AssetsReady | Self::GlobalFailsafe => 2,
            Self::HeroQueued => 3,
            Self::Started => 4,
            Self::Settled => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoaderRunning => "loader_running",
            Self::AssetsReady => "assets_ready",
            Self::GlobalFailsafe => "global_failsafe",
            Self::HeroQueued => "hero_queued",
            Self::Started => "started",
            Self::Settled => "settled",
        }
    }

    #[inline]
    pub fn can_transition_to(&self, to: SequencerPhase) -> bool {
        to.rank() > self.rank()
    }

    /// Validate a move to `to`.
    pub fn transition(self, to: SequencerPhase) -> Result<SequencerPhase, SequencerError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(SequencerError::InvalidTransition {
                from: self.name(),
                to: to.name(),
            })
        }
    }
}

/// What started (or tried to start) the hero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroStartReason {
    Direct,
    HeroReady,
    ReadyStateMetadata,
    LoadedMetadata,
    LoadedData,
    VideoError,
    Timeout,
    LoaderComplete,
    GlobalFailsafe,
    HistoryNav,
}

impl From<HeroReadyReason> for HeroStartReason {
    fn from(reason: HeroReadyReason) -> Self {
        match reason {
            HeroReadyReason::NotApplicable => Self::HeroReady,
            HeroReadyReason::ReadyStateMetadata => Self::ReadyStateMetadata,
            HeroReadyReason::LoadedMetadata => Self::LoadedMetadata,
            HeroReadyReason::LoadedData => Self::LoadedData,
            HeroReadyReason::Error => Self::VideoError,
            HeroReadyReason::Timeout => Self::Timeout,
        }
    }
}

/// Hero start gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum HeroGate {
    Idle,
    /// Readiness timed out on a video without data; re-queue on `loadeddata`.
    AwaitingLoadedData,
    /// Queued, waiting for the first video to buffer.
    AwaitingVideo { reason: HeroStartReason },
    /// Ready, polling until the content cascade has been initiated.
    AwaitingCascade { reason: HeroStartReason },
    Started { reason: HeroStartReason },
}

impl HeroGate {
    #[inline]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    #[inline]
    pub fn is_queued(&self) -> bool {
        matches!(
            self,
            Self::AwaitingVideo { .. } | Self::AwaitingCascade { .. } | Self::Started { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeState {
    NotStarted,
    /// Rotating cascade initiated.
    Scheduled,
    /// Static-page reveal initiated.
    Static,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderHide {
    NotScheduled,
    Scheduled,
    /// Hidden, or suppressed after a history restore.
    Hidden,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Failsafe {
    Local,
    Global,
}

/// The four start-up flags as booleans.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerFlags {
    pub hero_started: bool,
    pub hero_queued: bool,
    pub cascade_started: bool,
    pub static_content_initialized: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SequencerTask {
    FontTimeout,
    LogoTimeout,
    EssentialsSettled,
    HeroReady(HeroReadyReason),
    HeroReadinessTimeout,
    LocalFailsafe,
    GlobalFailsafe,
    HeroAdvanceTimeout,
    CascadePoll,
    LoaderHide,
    StaticLoaderStop,
    CardsReadyAfterLoad,
    ResizeSettled,
}

#[derive(Debug)]
pub struct Sequencer {
    pub(crate) phase: SequencerPhase,
    pub(crate) hero: HeroGate,
    pub(crate) cascade: CascadeState,
    pub(crate) loader_hide: LoaderHide,
    /// The local path (essentials or local failsafe) has run.
    pub(crate) loading_complete: bool,
    /// Body carries `loaded`.
    pub(crate) loaded: bool,
    pub(crate) local_failsafe: Option<TaskId>,
    pub(crate) hero_timeout: Option<TaskId>,
    pub(crate) cascade_poll: Option<TaskId>,
    pub(crate) resize: Option<TaskId>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            phase: SequencerPhase::Idle,
            hero: HeroGate::Idle,
            cascade: CascadeState::NotStarted,
            loader_hide: LoaderHide::NotScheduled,
            loading_complete: false,
            loaded: false,
            local_failsafe: None,
            hero_timeout: None,
            cascade_poll: None,
            resize: None,
        }
    }
}

impl Sequencer {
    #[inline]
    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    #[inline]
    pub fn hero(&self) -> HeroGate {
        self.hero
    }

    #[inline]
    pub fn cascade(&self) -> CascadeState {
        self.cascade
    }

    #[inline]
    pub fn loader_hide(&self) -> LoaderHide {
        self.loader_hide
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn flags(&self) -> SequencerFlags {
        SequencerFlags {
            hero_started: self.hero.is_started(),
            hero_queued: self.hero.is_queued(),
            cascade_started: self.cascade != CascadeState::NotStarted,
            static_content_initialized: self.cascade == CascadeState::Static,
        }
    }
}

impl Session {
    fn after(&mut self, delay: Millis, task: SequencerTask) -> TaskId {
        self.ctx.after(delay, Task::Sequencer(task))
    }

    pub(crate) fn set_phase(&mut self, to: SequencerPhase) {
        match self.seq.phase.transition(to) {
            Ok(to) => {
                let from = std::mem::replace(&mut self.seq.phase, to);
                log::debug!("phase {} -> {}", from.name(), to.name());
                self.ctx.event(CoreEvent::PhaseChanged { from, to });
            }
            Err(err) => log::debug!("{err}, ignored"),
        }
    }

    /// A history restore replays start-up, the one case where the phase
    /// moves back.
    pub(crate) fn rewind_phase(&mut self, to: SequencerPhase) {
        if self.seq.phase == to {
            return;
        }
        let from = std::mem::replace(&mut self.seq.phase, to);
        log::debug!("phase {} -> {} (restore)", from.name(), to.name());
        self.ctx.event(CoreEvent::PhaseChanged { from, to });
    }

    pub(crate) fn refresh_settled(&mut self) {
        if self.seq.hero.is_started() && self.seq.loader_hide == LoaderHide::Hidden {
            self.set_phase(SequencerPhase::Settled);
        }
    }

    pub(crate) fn on_dom_ready(&mut self) {
        if self.dom_ready_at.is_some() {
            log::debug!("duplicate DomReady ignored");
            return;
        }
        self.dom_ready_at = Some(self.ctx.now());
        log::info!("dom ready on {} ({:?} page)", self.layout.path, self.kind);

        if self.layout.logo == LogoStatus::Complete {
            self.ctx.effect(Effect::MeasureLogoWidth);
        }

        let rotating = self.kind == PageKind::Rotating;
        match self.hero_monitor.begin(rotating, self.layout.first_video()) {
            HeroProbe::Ready(reason) => {
                self.after(0, SequencerTask::HeroReady(reason));
            }
            HeroProbe::Waiting { request_load } => {
                if request_load {
                    self.ctx.effect(Effect::LoadMedia {
                        target: Target::SlideVideo(0),
                    });
                }
                let timeout = self.cfg.readiness.hero_readiness_timeout_ms;
                self.after(timeout, SequencerTask::HeroReadinessTimeout);
            }
        }

        self.start_loading();
        let global = self.cfg.sequencer.global_failsafe_ms;
        self.after(global, SequencerTask::GlobalFailsafe);

        for card in self.layout.cards().filter(|c| !c.text_card && c.thumbnail_video) {
            self.ctx
                .effect(Effect::add_class(Target::Card(card.id), "has-video"));
        }
        self.apply_mobile_ordering();

        if self.layout.navigation == crate::layout::NavigationType::BackForward {
            self.restore_from_history_navigation(crate::history::RestoreSource::PerformanceEntry);
        }

        self.apply_text_card_colors();
        self.cache_link_colors();
        let index = self.timeline.index();
        self.header.init(&mut self.ctx, &self.layout, index);

        if self.kind == PageKind::Static {
            self.init_static_page();
        } else if !self.layout.slides.is_empty() {
            self.ctx
                .effect(Effect::style(Target::Slide(0), "opacity", "1"));
        }
    }

    fn start_loading(&mut self) {
        self.loader.start(&mut self.ctx, &self.cfg.loader);
        self.set_phase(SequencerPhase::LoaderRunning);

        let local = self.cfg.sequencer.local_failsafe_ms;
        self.seq.local_failsafe = Some(self.after(local, SequencerTask::LocalFailsafe));

        if self.essentials.needs_font_timeout() {
            let timeout = self.cfg.readiness.font_timeout_ms;
            self.after(timeout, SequencerTask::FontTimeout);
        }
        if self.essentials.needs_logo_timeout() {
            let timeout = self.cfg.readiness.logo_timeout_ms;
            self.after(timeout, SequencerTask::LogoTimeout);
        }
        if self.essentials.all_concluded() {
            self.essentials_concluded();
        }
    }

    /// Record a font or logo conclusion.
    pub(crate) fn observe_essential(&mut self, source: AssetSource, state: SignalState) {
        if self.essentials.observe(source, state) && self.dom_ready_at.is_some() {
            self.essentials_concluded();
        }
    }

    fn essentials_concluded(&mut self) {
        if self.layout.has_logo() {
            self.ctx.effect(Effect::MeasureLogoWidth);
        }
        let settle = self.cfg.readiness.settle_delay_ms;
        self.after(settle, SequencerTask::EssentialsSettled);
    }

    pub(crate) fn run_sequencer_task(&mut self, task: SequencerTask) {
        match task {
            SequencerTask::FontTimeout => {
                log::debug!("font readiness timed out");
                self.observe_essential(AssetSource::Font, SignalState::TimedOut);
            }
            SequencerTask::LogoTimeout => {
                log::debug!("logo readiness timed out");
                self.observe_essential(AssetSource::Logo, SignalState::TimedOut);
            }
            SequencerTask::EssentialsSettled => {
                if !self.essentials.resolve() {
                    return;
                }
                self.ctx.event(CoreEvent::EssentialsReady);
                if !self.seq.loading_complete {
                    if let Some(id) = self.seq.local_failsafe.take() {
                        self.ctx.cancel(id);
                    }
                    self.seq.loading_complete = true;
                    self.hide_loader_and_start_page();
                }
            }
            SequencerTask::HeroReady(reason) => self.hero_ready(reason),
            SequencerTask::HeroReadinessTimeout => {
                if let Some(reason) = self.hero_monitor.time_out() {
                    log::warn!("first hero video not ready after timeout");
                    self.hero_ready(reason);
                }
            }
            SequencerTask::LocalFailsafe => {
                self.seq.local_failsafe = None;
                if !self.seq.loading_complete {
                    log::warn!("loading failsafe fired, forcing page start");
                    self.ctx.event(CoreEvent::FailsafeFired {
                        failsafe: Failsafe::Local,
                    });
                    self.seq.loading_complete = true;
                    self.hide_loader_and_start_page();
                }
            }
            SequencerTask::GlobalFailsafe => self.global_failsafe(),
            SequencerTask::HeroAdvanceTimeout => {
                self.seq.hero_timeout = None;
                if let HeroGate::AwaitingVideo { reason } = self.seq.hero {
                    log::warn!("first hero video still buffering, starting anyway");
                    self.begin_hero_sequence(reason);
                }
            }
            SequencerTask::CascadePoll => {
                self.seq.cascade_poll = None;
                if let HeroGate::AwaitingCascade { reason } = self.seq.hero {
                    self.begin_hero_sequence(reason);
                }
            }
            SequencerTask::LoaderHide => {
                self.ctx
                    .effect(Effect::add_class(Target::LoadingOverlay, "hide"));
                self.loader.stop(&mut self.ctx);
                self.seq.loader_hide = LoaderHide::Hidden;
                self.ctx.event(CoreEvent::LoaderHidden);
                self.refresh_settled();
            }
            SequencerTask::StaticLoaderStop => {
                self.loader.stop(&mut self.ctx);
                self.ctx
                    .effect(Effect::add_class(Target::LoadingOverlay, "hide"));
            }
            SequencerTask::CardsReadyAfterLoad => self.cards_ready = true,
            SequencerTask::ResizeSettled => {
                self.seq.resize = None;
                self.apply_mobile_ordering();
            }
        }
    }

    fn hero_ready(&mut self, reason: HeroReadyReason) {
        log::debug!("hero ready: {reason:?}");
        self.ctx.event(CoreEvent::HeroReady { reason });
        self.queue_hero_start(reason.into());
    }

    fn global_failsafe(&mut self) {
        if self.seq.loaded {
            return;
        }
        log::warn!("global failsafe fired, forcing page start");
        self.ctx.event(CoreEvent::FailsafeFired {
            failsafe: Failsafe::Global,
        });
        self.seq.loaded = true;
        self.ctx.effect(Effect::add_class(Target::Body, "loaded"));
        self.ctx
            .effect(Effect::add_class(Target::LoadingOverlay, "hide"));
        self.set_phase(SequencerPhase::GlobalFailsafe);

        if self.kind == PageKind::Rotating {
            self.queue_hero_start(HeroStartReason::GlobalFailsafe);
            self.start_content_cascade();
        } else {
            self.start_static_content();
        }
    }

    /// Local-path completion: interaction on, hero queued, content revealed.
    pub(crate) fn hide_loader_and_start_page(&mut self) {
        self.set_phase(SequencerPhase::AssetsReady);
        self.enable_interaction();
        self.queue_hero_start(HeroStartReason::LoaderComplete);
        self.seq.loaded = true;
        self.ctx.effect(Effect::add_class(Target::Body, "loaded"));

        if self.kind == PageKind::Static {
            self.start_static_content();
        } else {
            self.start_content_cascade();
        }
    }

    fn enable_interaction(&mut self) {
        self.cards_ready = true;
        self.hover_effects_enabled = true;
        for card in self.layout.cards().filter(|c| !c.text_card) {
            self.ctx.effect(Effect::remove_class(
                Target::Card(card.id),
                "disable-hover-effects",
            ));
            if card.image_src.is_some() {
                self.ctx
                    .effect(Effect::style(Target::CardThumbnail(card.id), "opacity", "1"));
            }
        }
        self.ctx
            .effect(Effect::add_class(Target::Body, "hover-effects-ready"));
        log::info!("assets loaded, interaction enabled");
    }

    /// Ask for the hero to start. Idempotent once queued.
    pub(crate) fn queue_hero_start(&mut self, reason: HeroStartReason) {
        // without slides there is nothing to rotate, on any kind of page
        if self.kind == PageKind::Static || self.layout.slides.is_empty() {
            if !self.seq.hero.is_started() {
                self.seq.hero = HeroGate::Started { reason };
                self.ctx.event(CoreEvent::HeroStarted { reason });
                self.set_phase(SequencerPhase::Started);
                self.refresh_settled();
            }
            return;
        }
        match self.kind {
            PageKind::Plain => {
                if !self.seq.hero.is_started() {
                    self.seq.hero = HeroGate::Started { reason };
                    self.timeline.start(&mut self.ctx, &mut self.videos);
                    self.ctx.event(CoreEvent::HeroStarted { reason });
                    self.set_phase(SequencerPhase::Started);
                    self.refresh_settled();
                }
                return;
            }
            PageKind::Rotating | PageKind::Static => {}
        }

        let first = self.videos.state(0).copied();
        if reason == HeroStartReason::Timeout && first.is_some_and(|v| v.ready_state < 2) {
            log::warn!("hero readiness timed out, waiting for loadeddata");
            self.ctx.effect(Effect::LoadMedia {
                target: Target::SlideVideo(0),
            });
            if self.seq.hero == HeroGate::Idle {
                self.seq.hero = HeroGate::AwaitingLoadedData;
            }
            let delay = self.cfg.sequencer.loader_hide_stalled_ms;
            self.schedule_loader_hide(delay);
            return;
        }

        if self.seq.hero.is_queued() {
            return;
        }
        self.set_phase(SequencerPhase::HeroQueued);

        let Some(first) = first else {
            self.begin_hero_sequence(reason);
            return;
        };
        if first.ready_state == 0 {
            self.ctx.effect(Effect::LoadMedia {
                target: Target::SlideVideo(0),
            });
        }
        if first.can_advance() {
            self.begin_hero_sequence(reason);
            return;
        }
        self.seq.hero = HeroGate::AwaitingVideo { reason };
        let timeout = self.cfg.sequencer.hero_advance_timeout_ms;
        self.seq.hero_timeout = Some(self.after(timeout, SequencerTask::HeroAdvanceTimeout));
    }

    /// Start the hero once the cascade has been initiated, polling until then.
    fn begin_hero_sequence(&mut self, reason: HeroStartReason) {
        if self.seq.hero.is_started() {
            return;
        }
        if self.seq.cascade == CascadeState::NotStarted {
            self.seq.hero = HeroGate::AwaitingCascade { reason };
            if self.seq.cascade_poll.is_none() {
                let poll = self.cfg.sequencer.cascade_poll_ms;
                self.seq.cascade_poll = Some(self.after(poll, SequencerTask::CascadePoll));
            }
            return;
        }

        if let Some(id) = self.seq.hero_timeout.take() {
            self.ctx.cancel(id);
        }
        self.seq.hero = HeroGate::Started { reason };
        if reason == HeroStartReason::Timeout {
            log::warn!("starting hero after readiness timeout");
        }
        for slide in 1..self.videos.len() {
            self.videos.ensure_playback(&mut self.ctx, slide);
        }
        self.timeline.start(&mut self.ctx, &mut self.videos);
        let delay = self.cfg.sequencer.loader_hide_ms;
        self.schedule_loader_hide(delay);

        self.ctx.event(CoreEvent::HeroStarted { reason });
        self.set_phase(SequencerPhase::Started);
        self.refresh_settled();
    }

    /// Slide video media event: playback bookkeeping and hero gating.
    pub(crate) fn on_media(&mut self, slide: usize, event: MediaEvent) {
        self.videos.observe(&mut self.ctx, slide, event);
        if slide != 0 {
            return;
        }
        if let Some(reason) = self.hero_monitor.observe(event) {
            self.after(0, SequencerTask::HeroReady(reason));
        }
        match self.seq.hero {
            HeroGate::AwaitingVideo { reason }
                if matches!(
                    event,
                    MediaEvent::CanPlayThrough | MediaEvent::LoadedData | MediaEvent::Error
                ) =>
            {
                self.begin_hero_sequence(reason);
            }
            HeroGate::AwaitingLoadedData if event == MediaEvent::LoadedData => {
                self.seq.hero = HeroGate::Idle;
                self.queue_hero_start(HeroStartReason::LoadedData);
            }
            _ => {}
        }
    }

    pub(crate) fn start_content_cascade(&mut self) {
        if self.seq.cascade != CascadeState::NotStarted {
            return;
        }
        self.seq.cascade = CascadeState::Scheduled;
        let delay = self.cfg.cascade.start_delay_ms;
        self.cascade.schedule(&mut self.ctx, delay, CascadeTask::Begin);
        self.ctx
            .event(CoreEvent::CascadeStarted { static_page: false });
    }

    pub(crate) fn start_static_content(&mut self) {
        if self.seq.cascade == CascadeState::Static {
            return;
        }
        self.seq.cascade = CascadeState::Static;
        self.ctx
            .effect(Effect::add_class(Target::Body, "content-ready"));
        let delay = self.cfg.cascade.static_start_delay_ms;
        self.cascade
            .schedule(&mut self.ctx, delay, CascadeTask::BeginStatic);
        self.ctx
            .event(CoreEvent::CascadeStarted { static_page: true });
    }

    pub(crate) fn run_cascade_task(&mut self, task: CascadeTask) {
        match task {
            CascadeTask::Begin => {
                self.ctx
                    .effect(Effect::add_class(Target::Body, "content-ready"));
                let order = alternating_sequence(
                    &self.layout.left_column,
                    &self.layout.right_column,
                    true,
                );
                self.cascade
                    .queue_reveals(&mut self.ctx, &order, &self.cfg.cascade);
                let delay = self.cfg.sequencer.loader_hide_ms;
                self.schedule_loader_hide(delay);
            }
            CascadeTask::BeginStatic => {
                for card in self.layout.cards() {
                    self.cascade
                        .reveal_card(&mut self.ctx, card, &self.cfg.cascade);
                }
                let stop = self.cfg.cascade.static_loader_stop_ms;
                self.after(stop, SequencerTask::StaticLoaderStop);
                let delay = self.cfg.sequencer.loader_hide_static_ms;
                self.schedule_loader_hide(delay);
            }
            CascadeTask::RevealCard { card } => match self.layout.card(card) {
                Some(spec) => self
                    .cascade
                    .reveal_card(&mut self.ctx, spec, &self.cfg.cascade),
                None => log::warn!("{}", SequencerError::UnknownCard { id: card }),
            },
            CascadeTask::AnimateWords { card } => {
                let pacing = WordPacing::from_config(&self.cfg.cascade, self.layout.is_long_text());
                if let Some(spec) = self.layout.card(card) {
                    self.cascade.animate_words(&mut self.ctx, spec, pacing);
                }
            }
            CascadeTask::RevealWord { card, index } => {
                self.ctx.effect(Effect::add_class(
                    Target::WordUnit { card, index },
                    "visible",
                ));
            }
        }
    }

    /// Single-fire overlay hide; later calls are no-ops.
    pub(crate) fn schedule_loader_hide(&mut self, delay: Millis) {
        if self.seq.loader_hide != LoaderHide::NotScheduled {
            return;
        }
        self.seq.loader_hide = LoaderHide::Scheduled;
        self.after(delay, SequencerTask::LoaderHide);
    }

    fn init_static_page(&mut self) {
        self.seq.loaded = true;
        self.ctx.effect(Effect::add_class(Target::Body, "loaded"));
        self.start_static_content();

        if let Some(first) = self.layout.slides.first() {
            let dark = first.dark_background;
            self.ctx
                .effect(Effect::style(Target::Slide(0), "opacity", "1"));
            self.videos.ensure_playback(&mut self.ctx, 0);
            if self.layout.hero_text.is_some() {
                self.ctx
                    .effect(Effect::style(Target::HeroText, "opacity", "1"));
                self.ctx
                    .effect(Effect::style(Target::HeroText, "transition", "none"));
                self.ctx
                    .effect(Effect::remove_class(Target::HeroText, "blur"));
            }
            if dark && self.layout.has_logo() {
                self.ctx.effect(Effect::add_class(Target::Logo, "light"));
            }
        } else if self.layout.hero_text.is_some() {
            self.ctx
                .effect(Effect::style(Target::HeroText, "opacity", "1"));
            self.ctx
                .effect(Effect::style(Target::HeroText, "transition", "none"));
            self.ctx
                .effect(Effect::remove_class(Target::HeroText, "blur"));
        }
    }

    /// Number the cards for the single-column layout and hand the order to
    /// the lightbox.
    pub(crate) fn apply_mobile_ordering(&mut self) {
        let order = alternating_sequence(&self.layout.left_column, &self.layout.right_column, false);
        if order.is_empty() {
            return;
        }
        for (i, card) in order.iter().enumerate() {
            let value = (i + 1).to_string();
            self.ctx.effect(Effect::attribute(
                Target::Card(*card),
                "data-mobile-order",
                value.clone(),
            ));
            self.ctx
                .effect(Effect::css_var(Target::Card(*card), "--mobile-order", value));
        }
        self.lightbox.set_order(&self.layout, order);
    }

    /// Dark or light styling for text cards, after the page background.
    pub(crate) fn apply_text_card_colors(&mut self) {
        let dark = has_dark_background(&self.layout.path)
            || self.layout.has_class("xrpa")
            || self.layout.has_class("nqs");
        let class = if dark { "dark-text-card" } else { "light-text-card" };
        for card in self.layout.text_cards() {
            let target = Target::Card(card.id);
            self.ctx
                .effect(Effect::remove_class(target.clone(), "dark-text-card"));
            self.ctx
                .effect(Effect::remove_class(target.clone(), "light-text-card"));
            self.ctx.effect(Effect::clear_style(target.clone(), "background"));
            self.ctx.effect(Effect::add_class(target, class));
        }
    }

    /// Stamp destination colour and logo tone on every internal link.
    pub(crate) fn cache_link_colors(&mut self) {
        for (i, href) in self.layout.links.iter().enumerate() {
            if !is_intercepted_link(href, false) {
                continue;
            }
            self.ctx.effect(Effect::attribute(
                Target::Link(i),
                "data-destination-color",
                page_color(href),
            ));
            self.ctx.effect(Effect::attribute(
                Target::Link(i),
                "data-destination-logo",
                logo_tone(href).as_str(),
            ));
        }
    }
}
