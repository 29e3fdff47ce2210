//! Input contracts for the session.
//!
//! Hosts translate DOM events into [`HostEvent`]s and pass them to
//! `Session::update()` together with the elapsed time.

use serde::{Deserialize, Serialize};

use crate::ids::CardId;
use crate::lightbox::Rect;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Events applied, in order, before the clock advances.
    #[serde(default)]
    pub events: Vec<HostEvent>,
}

impl Inputs {
    pub fn one(event: HostEvent) -> Self {
        Self {
            events: vec![event],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    DomReady,
    WindowLoaded,
    FontsReady,
    FontsFailed,
    LogoLoaded,
    LogoFailed,
    Media {
        slide: usize,
        event: MediaEvent,
    },
    PageShow {
        persisted: bool,
        /// The navigation timing entry reports `back_forward`.
        #[serde(default)]
        back_forward_entry: bool,
    },
    PopState,
    PageHide,
    Scroll {
        y: f64,
    },
    Resize,
    /// Pointer, touch or key activity anywhere on the document.
    Activity,
    PhoneClicked,
    PhoneFetched {
        outcome: FetchOutcome,
    },
    CardClicked {
        card: CardId,
    },
    LightboxKey {
        key: String,
    },
    LightboxNext,
    LightboxPrev,
    LightboxClose,
    LightboxBackdropClick {
        x: f64,
        y: f64,
        /// Click landed on a close/nav control.
        #[serde(default)]
        on_control: bool,
        /// Click landed inside the media container element.
        #[serde(default)]
        in_container: bool,
        container: Rect,
        /// Intrinsic width/height ratio of the visible media, if known.
        #[serde(default)]
        media_aspect: Option<f64>,
        /// Rendered rect of the visible media, used when the aspect is unknown.
        #[serde(default)]
        media_rect: Option<Rect>,
    },
    TouchStart {
        x: f64,
    },
    TouchEnd {
        x: f64,
    },
    LinkClicked {
        href: String,
        #[serde(default)]
        target_blank: bool,
        /// Click on the logo or inside a `.logo-card`.
        #[serde(default)]
        logo: bool,
    },
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaEvent {
    LoadedMetadata,
    LoadedData,
    CanPlayThrough,
    Error,
}

impl MediaEvent {
    /// Minimum `readyState` implied by the event.
    pub fn implied_ready_state(&self) -> Option<u8> {
        match self {
            Self::LoadedMetadata => Some(1),
            Self::LoadedData => Some(2),
            Self::CanPlayThrough => Some(4),
            Self::Error => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success { body: String },
    Failure { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_tagged_json() {
        let ev: HostEvent =
            serde_json::from_str(r#"{ "type": "media", "slide": 0, "event": "loadeddata" }"#)
                .expect("media event parses");
        assert_eq!(
            ev,
            HostEvent::Media {
                slide: 0,
                event: MediaEvent::LoadedData
            }
        );

        let ev: HostEvent =
            serde_json::from_str(r#"{ "type": "page_show", "persisted": true }"#)
                .expect("pageshow parses");
        assert_eq!(
            ev,
            HostEvent::PageShow {
                persisted: true,
                back_forward_entry: false
            }
        );
    }

    #[test]
    fn fetch_outcome_json() {
        let ok: FetchOutcome =
            serde_json::from_str(r#"{ "status": "success", "body": " 123 " }"#).expect("parses");
        assert_eq!(
            ok,
            FetchOutcome::Success {
                body: " 123 ".into()
            }
        );
    }
}
