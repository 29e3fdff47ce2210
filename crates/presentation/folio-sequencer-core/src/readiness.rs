//! Readiness monitoring for essential assets and the first hero video.
//!
//! Nothing here ever fails: an error or a timeout concludes a signal the
//! same way a success does, so the page always starts.

use serde::{Deserialize, Serialize};

use crate::inputs::MediaEvent;
use crate::layout::{LogoStatus, VideoSpec};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Font,
    Logo,
    HeroVideo,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Pending,
    Ready,
    TimedOut,
    Errored,
}

/// Readiness of one asset. The first conclusion wins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSignal {
    pub source: AssetSource,
    pub state: SignalState,
}

impl ReadinessSignal {
    pub fn pending(source: AssetSource) -> Self {
        Self {
            source,
            state: SignalState::Pending,
        }
    }

    #[inline]
    pub fn is_concluded(&self) -> bool {
        self.state != SignalState::Pending
    }

    /// Returns `true` if this call concluded the signal.
    pub fn conclude(&mut self, state: SignalState) -> bool {
        if self.is_concluded() || state == SignalState::Pending {
            return false;
        }
        self.state = state;
        true
    }
}

/// Fonts and logo, the assets the loader waits for.
#[derive(Clone, Debug)]
pub struct EssentialAssets {
    font: ReadinessSignal,
    /// `None` when the page has no logo.
    logo: Option<ReadinessSignal>,
    resolved: bool,
}

impl EssentialAssets {
    pub fn new(fonts_api: bool, logo: LogoStatus) -> Self {
        let mut font = ReadinessSignal::pending(AssetSource::Font);
        if !fonts_api {
            font.conclude(SignalState::Ready);
        }
        let logo = match logo {
            LogoStatus::Absent => None,
            LogoStatus::Complete => {
                let mut signal = ReadinessSignal::pending(AssetSource::Logo);
                signal.conclude(SignalState::Ready);
                Some(signal)
            }
            LogoStatus::Loading => Some(ReadinessSignal::pending(AssetSource::Logo)),
        };
        Self {
            font,
            logo,
            resolved: false,
        }
    }

    pub fn needs_font_timeout(&self) -> bool {
        !self.font.is_concluded()
    }

    pub fn needs_logo_timeout(&self) -> bool {
        self.logo.is_some_and(|l| !l.is_concluded())
    }

    /// Record a conclusion. Returns `true` when this observation completed
    /// the set.
    pub fn observe(&mut self, source: AssetSource, state: SignalState) -> bool {
        let was_done = self.all_concluded();
        match source {
            AssetSource::Font => {
                self.font.conclude(state);
            }
            AssetSource::Logo => {
                if let Some(logo) = self.logo.as_mut() {
                    logo.conclude(state);
                }
            }
            AssetSource::HeroVideo => {}
        }
        !was_done && self.all_concluded()
    }

    pub fn all_concluded(&self) -> bool {
        self.font.is_concluded() && self.logo.map_or(true, |l| l.is_concluded())
    }

    /// Mark the settle delay as elapsed. Returns `false` if already resolved.
    pub fn resolve(&mut self) -> bool {
        !std::mem::replace(&mut self.resolved, true)
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn signals(&self) -> Vec<ReadinessSignal> {
        std::iter::once(self.font).chain(self.logo).collect()
    }
}

/// Why the first hero video was considered ready.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroReadyReason {
    /// Not a rotating page, or no first video.
    NotApplicable,
    ReadyStateMetadata,
    LoadedMetadata,
    LoadedData,
    Error,
    Timeout,
}

/// Result of probing the first video when monitoring begins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeroProbe {
    Ready(HeroReadyReason),
    /// Wait for a media event or the timeout; `request_load` asks the host
    /// to call `.load()` on the video.
    Waiting { request_load: bool },
}

/// One-shot monitor for the first hero video.
#[derive(Clone, Debug, Default)]
pub struct HeroReadinessMonitor {
    waiting: bool,
    outcome: Option<HeroReadyReason>,
}

impl HeroReadinessMonitor {
    pub fn begin(&mut self, rotating: bool, first_video: Option<&VideoSpec>) -> HeroProbe {
        let probe = match (rotating, first_video) {
            (true, Some(video)) if video.ready_state >= 1 => {
                HeroProbe::Ready(HeroReadyReason::ReadyStateMetadata)
            }
            (true, Some(video)) => HeroProbe::Waiting {
                request_load: video.ready_state == 0,
            },
            _ => HeroProbe::Ready(HeroReadyReason::NotApplicable),
        };
        self.waiting = matches!(probe, HeroProbe::Waiting { .. });
        self.outcome = match probe {
            HeroProbe::Ready(reason) => Some(reason),
            HeroProbe::Waiting { .. } => None,
        };
        probe
    }

    /// Feed a first-video media event. Returns the reason if it concluded.
    pub fn observe(&mut self, event: MediaEvent) -> Option<HeroReadyReason> {
        let reason = match event {
            MediaEvent::LoadedMetadata => HeroReadyReason::LoadedMetadata,
            MediaEvent::LoadedData => HeroReadyReason::LoadedData,
            MediaEvent::Error => HeroReadyReason::Error,
            MediaEvent::CanPlayThrough => return None,
        };
        self.conclude(reason)
    }

    pub fn time_out(&mut self) -> Option<HeroReadyReason> {
        self.conclude(HeroReadyReason::Timeout)
    }

    /// Conclude a monitor that is waiting. Later calls return `None`.
    pub fn conclude(&mut self, reason: HeroReadyReason) -> Option<HeroReadyReason> {
        if !self.waiting || self.outcome.is_some() {
            return None;
        }
        self.waiting = false;
        self.outcome = Some(reason);
        Some(reason)
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    #[inline]
    pub fn outcome(&self) -> Option<HeroReadyReason> {
        self.outcome
    }
}

/// Live view of one slide video, updated from media events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoState {
    pub ready_state: u8,
    pub errored: bool,
    /// Playback was requested and is waiting for `loadeddata`.
    pub awaiting_data: bool,
}

impl VideoState {
    pub fn from_spec(spec: &VideoSpec) -> Self {
        Self {
            ready_state: spec.ready_state,
            ..Self::default()
        }
    }

    pub fn observe(&mut self, event: MediaEvent) {
        match event.implied_ready_state() {
            Some(state) => self.ready_state = self.ready_state.max(state),
            None => self.errored = true,
        }
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.ready_state >= 2
    }

    /// Enough buffered to start the hero, or failed and not worth waiting for.
    #[inline]
    pub fn can_advance(&self) -> bool {
        self.ready_state >= 3 || self.errored
    }
}
