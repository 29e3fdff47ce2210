//! Phone number reveal gate.
//!
//! The number is fetched only after the visitor has been on the page for a
//! while and has moved around a bit, which keeps naive scrapers out.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::config::PhoneConfig;
use crate::inputs::FetchOutcome;
use crate::outputs::{CoreEvent, Effect, Target};
use crate::session::Ctx;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneState {
    Idle,
    /// Request in flight; further clicks are ignored.
    Fetching,
    Revealed,
}

#[derive(Debug)]
pub struct PhoneRevealGate {
    cfg: PhoneConfig,
    required: u32,
    score: u32,
    attempts: u32,
    state: PhoneState,
}

impl PhoneRevealGate {
    pub fn new(cfg: &PhoneConfig, coarse_pointer: bool) -> Self {
        let required = if coarse_pointer {
            cfg.coarse_pointer_interactions
        } else {
            cfg.fine_pointer_interactions
        };
        Self {
            cfg: cfg.clone(),
            required,
            score: 0,
            attempts: 0,
            state: PhoneState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> PhoneState {
        self.state
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[inline]
    pub fn required(&self) -> u32 {
        self.required
    }

    /// Pointer, touch or key activity. Saturates at the required score.
    pub fn register_activity(&mut self) {
        self.score = (self.score + 1).min(self.required);
    }

    /// Reveal button clicked `elapsed` ms after the page became interactive.
    pub(crate) fn click(&mut self, ctx: &mut Ctx, elapsed: Millis) {
        if self.state != PhoneState::Idle {
            log::debug!("phone click ignored while {:?}", self.state);
            return;
        }
        self.attempts += 1;

        if elapsed >= self.cfg.min_elapsed_ms && self.score >= self.required {
            self.state = PhoneState::Fetching;
            ctx.effect(Effect::Fetch {
                url: self.cfg.endpoint.clone(),
                no_store: true,
            });
            return;
        }

        let message = self.hint(elapsed);
        ctx.effect(Effect::SetText {
            target: Target::PhoneContainer,
            text: message.clone(),
        });
        ctx.event(CoreEvent::PhoneHint { message });
        if self.attempts > self.cfg.max_attempts {
            ctx.effect(Effect::OpenExternal {
                url: self.cfg.redirect_url.clone(),
            });
        }
    }

    fn hint(&self, elapsed: Millis) -> String {
        let remaining = self.required.saturating_sub(self.score);
        if remaining > 0 {
            let plural = if remaining == 1 { "" } else { "s" };
            return format!("Almost there – give it {remaining} more move{plural} and try again.");
        }
        let wait = self.cfg.min_elapsed_ms.saturating_sub(elapsed);
        if wait > 0 {
            let seconds = wait.div_ceil(100) as f64 / 10.0;
            format!("Hang on {seconds:.1}s and then tap once more.")
        } else {
            "Give it a second and try again – it's worth the suspense.".to_string()
        }
    }

    /// Result of the fetch requested by `click`.
    pub(crate) fn fetched(&mut self, ctx: &mut Ctx, outcome: FetchOutcome) {
        if self.state != PhoneState::Fetching {
            log::debug!("unexpected phone fetch result while {:?}", self.state);
            return;
        }
        self.state = PhoneState::Revealed;
        ctx.effect(Effect::attribute(Target::PhoneButton, "data-revealed", "true"));
        match outcome {
            FetchOutcome::Success { body } => {
                let number = body.trim();
                if !number.is_empty() {
                    ctx.effect(Effect::SetText {
                        target: Target::PhoneContainer,
                        text: number.to_string(),
                    });
                }
                ctx.effect(Effect::add_class(Target::PhoneButton, "revealed"));
                ctx.event(CoreEvent::PhoneRevealed { fallback: false });
            }
            FetchOutcome::Failure { reason } => {
                log::warn!("could not reveal phone number: {reason}");
                ctx.effect(Effect::SetText {
                    target: Target::PhoneContainer,
                    text: self.cfg.fallback_number.clone(),
                });
                ctx.event(CoreEvent::PhoneRevealed { fallback: true });
            }
        }
    }
}
