//! Session configuration.
//!
//! Every timing constant of the page choreography lives here. `Default`
//! reproduces the production site; hosts may override any subset from JSON.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::SequencerError;
use crate::timeline::{default_slides, TimelineSlide};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub readiness: ReadinessConfig,
    pub sequencer: SequencerConfig,
    pub cascade: CascadeConfig,
    pub loader: LoaderConfig,
    pub hero: HeroConfig,
    pub phone: PhoneConfig,
    pub transition: TransitionConfig,
    pub lightbox: LightboxConfig,
    pub header: HeaderConfig,
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self, SequencerError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Essential-asset and hero-video readiness bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub font_timeout_ms: Millis,
    pub logo_timeout_ms: Millis,
    /// Pause after fonts and logo have concluded, before the page starts.
    pub settle_delay_ms: Millis,
    pub hero_readiness_timeout_ms: Millis,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            font_timeout_ms: 800,
            logo_timeout_ms: 1000,
            settle_delay_ms: 300,
            hero_readiness_timeout_ms: 5000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub local_failsafe_ms: Millis,
    pub global_failsafe_ms: Millis,
    /// Upper bound on waiting for the first hero video to be able to advance.
    pub hero_advance_timeout_ms: Millis,
    pub cascade_poll_ms: Millis,
    pub loader_hide_ms: Millis,
    pub loader_hide_stalled_ms: Millis,
    pub loader_hide_static_ms: Millis,
    pub cards_ready_after_load_ms: Millis,
    pub resize_debounce_ms: Millis,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            local_failsafe_ms: 5000,
            global_failsafe_ms: 8000,
            hero_advance_timeout_ms: 6000,
            cascade_poll_ms: 100,
            loader_hide_ms: 1200,
            loader_hide_stalled_ms: 1600,
            loader_hide_static_ms: 800,
            cards_ready_after_load_ms: 3000,
            resize_debounce_ms: 250,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub start_delay_ms: Millis,
    pub first_card_delay_ms: Millis,
    pub stagger_ms: Millis,
    /// Delay between a text card's reveal and its word animation.
    pub text_words_delay_ms: Millis,
    pub static_start_delay_ms: Millis,
    pub static_loader_stop_ms: Millis,
    pub word_base_delay_ms: f64,
    pub word_max_eased_ms: f64,
    pub long_text_word_base_delay_ms: f64,
    pub long_text_word_max_eased_ms: f64,
    pub card_animation: String,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 100,
            first_card_delay_ms: 200,
            stagger_ms: 200,
            text_words_delay_ms: 200,
            static_start_delay_ms: 300,
            static_loader_stop_ms: 800,
            word_base_delay_ms: 12.0,
            word_max_eased_ms: 100.0,
            long_text_word_base_delay_ms: 6.0,
            long_text_word_max_eased_ms: 50.0,
            card_animation: "cardFadeIn 1.2s cubic-bezier(0.4, 0, 0.2, 1) forwards".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub dots: u32,
    pub cycle_ms: Millis,
    pub stagger_ms: Millis,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dots: 9,
            cycle_ms: 1200,
            stagger_ms: 50,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub slides: Vec<TimelineSlide>,
    /// Used when the page does not provide a parseable `--hero-intro-duration`.
    pub default_fade_ms: Millis,
    pub incoming_transition_delay_ms: Millis,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            slides: default_slides(),
            default_fade_ms: 2000,
            incoming_transition_delay_ms: 50,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    pub endpoint: String,
    pub min_elapsed_ms: Millis,
    pub fine_pointer_interactions: u32,
    pub coarse_pointer_interactions: u32,
    /// Attempts allowed before the educational redirect opens.
    pub max_attempts: u32,
    pub redirect_url: String,
    pub fallback_number: String,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            endpoint: "protected/phone.txt".to_string(),
            min_elapsed_ms: 1000,
            fine_pointer_interactions: 5,
            coarse_pointer_interactions: 2,
            max_attempts: 2,
            redirect_url: "https://da.wikipedia.org/wiki/Web_scraping".to_string(),
            fallback_number: "+45 51 26 28 93".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: Millis,
    pub content_fade_ms: Millis,
    pub logo_delay_ms: Millis,
    pub logo_click_delay_ms: Millis,
    pub hero_fade_delay_ms: Millis,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            content_fade_ms: 600,
            logo_delay_ms: 200,
            logo_click_delay_ms: 200,
            hero_fade_delay_ms: 100,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LightboxConfig {
    pub swipe_threshold_px: f64,
    pub media_margin_px: f64,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 40.0,
            media_margin_px: 32.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub fade_distance_px: f64,
    pub max_opacity: f64,
    pub logo_override_px: f64,
    pub fallback_background: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            fade_distance_px: 100.0,
            max_opacity: 0.95,
            logo_override_px: 100.0,
            fallback_background: "#F9F9F9".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_site_timings() {
        let cfg = Config::default();
        assert_eq!(cfg.sequencer.local_failsafe_ms, 5000);
        assert_eq!(cfg.sequencer.global_failsafe_ms, 8000);
        assert_eq!(cfg.readiness.font_timeout_ms, 800);
        assert_eq!(cfg.readiness.logo_timeout_ms, 1000);
        assert_eq!(cfg.hero.slides.len(), 3);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = Config::from_json(r#"{ "sequencer": { "global_failsafe_ms": 9000 } }"#)
            .expect("partial config parses");
        assert_eq!(cfg.sequencer.global_failsafe_ms, 9000);
        assert_eq!(cfg.sequencer.local_failsafe_ms, 5000);
        assert_eq!(cfg.cascade.stagger_ms, 200);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = Config::from_json("{ nope").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }
}
