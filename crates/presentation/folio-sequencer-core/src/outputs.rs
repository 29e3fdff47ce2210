//! Output contracts from the session.
//!
//! Outputs carry the DOM effects produced during one `update()` call, each
//! stamped with the virtual time it was produced at, plus a separate list
//! of semantic events. Adapters apply effects to the host document.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::history::RestoreSource;
use crate::ids::{CardId, LoaderHandle};
use crate::readiness::HeroReadyReason;
use crate::sequencer::{Failsafe, HeroStartReason, SequencerPhase};

/// DOM element an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    Body,
    /// `document.documentElement`
    Root,
    Logo,
    LoadingOverlay,
    Loader,
    Hero,
    HeroText,
    ContentGrid,
    Header,
    BackgroundOverlay,
    Slide(usize),
    SlideVideo(usize),
    Card(CardId),
    CardThumbnail(CardId),
    CardText(CardId),
    WordUnit { card: CardId, index: usize },
    Lightbox,
    LightboxContainer,
    LightboxImage,
    LightboxVideo,
    LightboxCaption,
    LightboxClose,
    PhoneButton,
    PhoneContainer,
    /// Anchor by index into `PageLayout::links`.
    Link(usize),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    AddClass {
        target: Target,
        class: String,
    },
    RemoveClass {
        target: Target,
        class: String,
    },
    SetStyle {
        target: Target,
        property: String,
        value: String,
    },
    ClearStyle {
        target: Target,
        property: String,
    },
    SetCssVar {
        target: Target,
        name: String,
        value: String,
    },
    SetAttribute {
        target: Target,
        name: String,
        value: String,
    },
    SetHtml {
        target: Target,
        html: String,
    },
    SetText {
        target: Target,
        text: String,
    },
    LoadMedia {
        target: Target,
    },
    PlayMedia {
        target: Target,
    },
    PauseMedia {
        target: Target,
    },
    SeekMedia {
        target: Target,
        time: f64,
    },
    SetMediaSource {
        target: Target,
        src: Option<String>,
    },
    SpawnLoader {
        handles: Vec<LoaderHandle>,
        cycle_ms: Millis,
        stagger_ms: Millis,
    },
    CancelLoader {
        handles: Vec<LoaderHandle>,
    },
    /// Wrap each word of the card text in a `.word-animate` span.
    DecomposeWords {
        card: CardId,
    },
    /// Copy the logo's rendered width into `--logo-width`.
    MeasureLogoWidth,
    /// Constrain lightbox media to the viewport minus caption height.
    FitLightboxMedia {
        margin_px: f64,
    },
    Focus {
        target: Target,
    },
    RestoreFocus,
    Fetch {
        url: String,
        no_store: bool,
    },
    Navigate {
        url: String,
    },
    OpenExternal {
        url: String,
    },
}

impl Effect {
    pub fn add_class(target: Target, class: &str) -> Self {
        Self::AddClass {
            target,
            class: class.to_string(),
        }
    }

    pub fn remove_class(target: Target, class: &str) -> Self {
        Self::RemoveClass {
            target,
            class: class.to_string(),
        }
    }

    pub fn style(target: Target, property: &str, value: impl Into<String>) -> Self {
        Self::SetStyle {
            target,
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn clear_style(target: Target, property: &str) -> Self {
        Self::ClearStyle {
            target,
            property: property.to_string(),
        }
    }

    pub fn css_var(target: Target, name: &str, value: impl Into<String>) -> Self {
        Self::SetCssVar {
            target,
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn attribute(target: Target, name: &str, value: impl Into<String>) -> Self {
        Self::SetAttribute {
            target,
            name: name.to_string(),
            value: value.into(),
        }
    }

    /// Target element, when the effect has one.
    pub fn target(&self) -> Option<&Target> {
        match self {
            Self::AddClass { target, .. }
            | Self::RemoveClass { target, .. }
            | Self::SetStyle { target, .. }
            | Self::ClearStyle { target, .. }
            | Self::SetCssVar { target, .. }
            | Self::SetAttribute { target, .. }
            | Self::SetHtml { target, .. }
            | Self::SetText { target, .. }
            | Self::LoadMedia { target }
            | Self::PlayMedia { target }
            | Self::PauseMedia { target }
            | Self::SeekMedia { target, .. }
            | Self::SetMediaSource { target, .. }
            | Self::Focus { target } => Some(target),
            _ => None,
        }
    }
}

/// Discrete semantic signals emitted while sequencing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CoreEvent {
    PhaseChanged {
        from: SequencerPhase,
        to: SequencerPhase,
    },
    LoaderStarted,
    LoaderStopped,
    LoaderHidden,
    EssentialsReady,
    HeroReady {
        reason: HeroReadyReason,
    },
    FailsafeFired {
        failsafe: Failsafe,
    },
    HeroStarted {
        reason: HeroStartReason,
    },
    CascadeStarted {
        static_page: bool,
    },
    CardRevealed {
        card: CardId,
    },
    SlideAdvanced {
        index: usize,
    },
    HeroTextUpdated {
        index: usize,
    },
    LogoToneChanged {
        light: bool,
    },
    HistoryRestored {
        source: RestoreSource,
    },
    LightboxOpened {
        index: usize,
    },
    LightboxClosed,
    PhoneHint {
        message: String,
    },
    PhoneRevealed {
        fallback: bool,
    },
    LinkIntercepted {
        href: String,
    },
    NavigationStarted {
        url: String,
    },
    Warning {
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub at: Millis,
    pub effect: Effect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at: Millis,
    pub event: CoreEvent,
}

/// Outputs returned by `Session::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub effects: Vec<TimedEffect>,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.effects.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_effect(&mut self, at: Millis, effect: Effect) {
        self.effects.push(TimedEffect { at, effect });
    }

    #[inline]
    pub fn push_event(&mut self, at: Millis, event: CoreEvent) {
        self.events.push(TimedEvent { at, event });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.events.is_empty()
    }

    /// Append another batch, keeping order.
    pub fn extend_from(&mut self, other: &Outputs) {
        self.effects.extend(other.effects.iter().cloned());
        self.events.extend(other.events.iter().cloned());
    }
}
