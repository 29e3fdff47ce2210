//! Card cascade: alternating reveal order and per-word text animation.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::clock::{Millis, TaskId};
use crate::config::CascadeConfig;
use crate::ids::CardId;
use crate::layout::{CardSpec, RevealUnit};
use crate::outputs::{CoreEvent, Effect, Target};
use crate::session::{Ctx, Task};

/// Reveal order for the two-column grid.
///
/// The first text card is taken out of the left column and, when
/// `include_text_card` is set, placed first. The rest interleave
/// `right[i]`, `left[i]` up to the longer column.
pub fn alternating_sequence(
    left: &[CardSpec],
    right: &[CardSpec],
    include_text_card: bool,
) -> Vec<CardId> {
    let text_index = left.iter().position(|c| c.text_card);
    let left_rest: Vec<CardId> = left
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != text_index)
        .map(|(_, c)| c.id)
        .collect();

    let mut sequence = Vec::with_capacity(left.len() + right.len());
    if include_text_card {
        if let Some(text) = text_index.and_then(|i| left.get(i)) {
            sequence.push(text.id);
        }
    }
    for i in 0..left_rest.len().max(right.len()) {
        if let Some(card) = right.get(i) {
            sequence.push(card.id);
        }
        if let Some(id) = left_rest.get(i) {
            sequence.push(*id);
        }
    }
    sequence
}

#[inline]
pub fn ease_out_expo(t: f64) -> f64 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

/// Per-word pacing of the text card animation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordPacing {
    pub base_ms: f64,
    pub max_eased_ms: f64,
}

impl WordPacing {
    pub fn from_config(cfg: &CascadeConfig, long_text: bool) -> Self {
        if long_text {
            Self {
                base_ms: cfg.long_text_word_base_delay_ms,
                max_eased_ms: cfg.long_text_word_max_eased_ms,
            }
        } else {
            Self {
                base_ms: cfg.word_base_delay_ms,
                max_eased_ms: cfg.word_max_eased_ms,
            }
        }
    }
}

/// Reveal delay of every unit, relative to the start of the animation.
///
/// Word `i` of `n` appears at `i * base + ease_out_expo(i / (n - 1)) * max`
/// (a lone word uses progress 1). A divider appears `base` after the
/// previous unit.
pub fn word_reveal_delays(units: &[RevealUnit], pacing: WordPacing) -> Vec<f64> {
    let words = units.iter().filter(|u| **u == RevealUnit::Word).count();
    let span = words.saturating_sub(1).max(1) as f64;

    let mut word_index = 0usize;
    let mut last = 0.0;
    units
        .iter()
        .map(|unit| {
            last = match unit {
                RevealUnit::Word => {
                    let progress = if words <= 1 {
                        1.0
                    } else {
                        word_index as f64 / span
                    };
                    let delay = word_index as f64 * pacing.base_ms
                        + ease_out_expo(progress) * pacing.max_eased_ms;
                    word_index += 1;
                    delay
                }
                RevealUnit::Divider => last + pacing.base_ms,
            };
            last
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum WordSegment {
    Word(String),
    Space(String),
}

/// Split text into words and the whitespace runs between them.
pub fn split_words(text: &str) -> Vec<WordSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_space = false;

    for ch in text.chars() {
        let space = ch.is_whitespace();
        if !current.is_empty() && space != in_space {
            segments.push(segment(std::mem::take(&mut current), in_space));
        }
        in_space = space;
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(segment(current, in_space));
    }
    segments
}

fn segment(text: String, space: bool) -> WordSegment {
    if space {
        WordSegment::Space(text)
    } else {
        WordSegment::Word(text)
    }
}

/// Scheduled steps of the cascade.
#[derive(Clone, Debug, PartialEq)]
pub enum CascadeTask {
    /// Rotating pages: mark content ready and queue card reveals.
    Begin,
    /// Static pages: reveal every card at once.
    BeginStatic,
    RevealCard { card: CardId },
    AnimateWords { card: CardId },
    RevealWord { card: CardId, index: usize },
}

/// Tracks cascade timers and which text cards are mid-animation.
#[derive(Debug, Default)]
pub struct CascadeAnimator {
    pending: HashSet<TaskId>,
    animating: HashSet<CardId>,
}

impl CascadeAnimator {
    pub(crate) fn schedule(&mut self, ctx: &mut Ctx, delay: Millis, task: CascadeTask) {
        let id = ctx.after(delay, Task::Cascade(task));
        self.pending.insert(id);
    }

    /// Forget a task that just fired. Returns `false` for unknown ids.
    pub(crate) fn fired(&mut self, id: TaskId) -> bool {
        self.pending.remove(&id)
    }

    /// Queue the rotating cascade: cards in `order` at `first + stagger * i`.
    pub(crate) fn queue_reveals(&mut self, ctx: &mut Ctx, order: &[CardId], cfg: &CascadeConfig) {
        for (i, card) in order.iter().enumerate() {
            let delay = cfg.first_card_delay_ms + cfg.stagger_ms * i as Millis;
            self.schedule(ctx, delay, CascadeTask::RevealCard { card: *card });
        }
    }

    pub(crate) fn reveal_card(&mut self, ctx: &mut Ctx, card: &CardSpec, cfg: &CascadeConfig) {
        ctx.effect(Effect::style(
            Target::Card(card.id),
            "animation",
            cfg.card_animation.clone(),
        ));
        ctx.event(CoreEvent::CardRevealed { card: card.id });
        if card.text_card {
            self.schedule(
                ctx,
                cfg.text_words_delay_ms,
                CascadeTask::AnimateWords { card: card.id },
            );
        }
    }

    /// Decompose the card text and schedule each unit. A card already
    /// animating is left alone.
    pub(crate) fn animate_words(&mut self, ctx: &mut Ctx, card: &CardSpec, pacing: WordPacing) {
        if !self.animating.insert(card.id) {
            log::debug!("{} already animating, skipping word reveal", card.id);
            return;
        }
        ctx.effect(Effect::add_class(Target::CardText(card.id), "animating"));
        ctx.effect(Effect::DecomposeWords { card: card.id });
        for (index, delay) in word_reveal_delays(&card.reveal_units, pacing)
            .into_iter()
            .enumerate()
        {
            // setTimeout truncates fractional delays
            self.schedule(
                ctx,
                delay as Millis,
                CascadeTask::RevealWord {
                    card: card.id,
                    index,
                },
            );
        }
    }

    #[inline]
    pub fn is_animating(&self, card: CardId) -> bool {
        self.animating.contains(&card)
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every pending step and clear the animating markers.
    pub(crate) fn reset(&mut self, ctx: &mut Ctx) {
        for id in self.pending.drain() {
            ctx.cancel(id);
        }
        self.animating.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(ids: &[u32], text_at: Option<usize>) -> Vec<CardSpec> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                if Some(i) == text_at {
                    CardSpec::text(*id, Vec::new())
                } else {
                    CardSpec::new(*id)
                }
            })
            .collect()
    }

    #[test]
    fn interleaves_right_then_left_after_text_card() {
        // text card is the first left card
        let left = column(&[1, 2, 3], Some(0));
        let right = column(&[10, 11, 12], None);
        let ids: Vec<u32> = alternating_sequence(&left, &right, true)
            .into_iter()
            .map(|c| c.0)
            .collect();
        assert_eq!(ids, vec![1, 10, 2, 11, 3, 12]);
    }

    #[test]
    fn longer_left_column_keeps_every_card() {
        let left = column(&[1, 2, 3, 4], Some(0));
        let right = column(&[10, 11, 12], None);
        let seq = alternating_sequence(&left, &right, true);
        assert_eq!(seq.len(), 7);

        let without_text = alternating_sequence(&left, &right, false);
        let ids: Vec<u32> = without_text.into_iter().map(|c| c.0).collect();
        assert_eq!(ids, vec![10, 2, 11, 3, 12, 4]);
    }

    #[test]
    fn text_card_elsewhere_in_left_column() {
        let left = column(&[1, 2, 3], Some(1));
        let right = column(&[10], None);
        let ids: Vec<u32> = alternating_sequence(&left, &right, true)
            .into_iter()
            .map(|c| c.0)
            .collect();
        assert_eq!(ids, vec![2, 10, 1, 3]);
    }

    #[test]
    fn word_delays_follow_expo_curve() {
        let pacing = WordPacing {
            base_ms: 12.0,
            max_eased_ms: 100.0,
        };
        let units = [
            RevealUnit::Word,
            RevealUnit::Word,
            RevealUnit::Word,
            RevealUnit::Divider,
        ];
        let delays = word_reveal_delays(&units, pacing);
        assert_eq!(delays.len(), 4);
        assert!((delays[0] - 0.0).abs() < 1e-9);
        assert!((delays[1] - 108.875).abs() < 1e-9);
        assert!((delays[2] - 124.0).abs() < 1e-9);
        assert!((delays[3] - 136.0).abs() < 1e-9);
    }

    #[test]
    fn single_word_uses_full_progress() {
        let pacing = WordPacing {
            base_ms: 6.0,
            max_eased_ms: 50.0,
        };
        let delays = word_reveal_delays(&[RevealUnit::Word], pacing);
        assert_eq!(delays, vec![50.0]);
    }

    #[test]
    fn long_text_pacing_is_faster() {
        let cfg = CascadeConfig::default();
        let normal = WordPacing::from_config(&cfg, false);
        let long = WordPacing::from_config(&cfg, true);
        assert_eq!(normal.base_ms, 12.0);
        assert_eq!(long.base_ms, 6.0);
        assert_eq!(long.max_eased_ms, 50.0);
    }

    #[test]
    fn split_words_keeps_whitespace_runs() {
        let segments = split_words("Hello  brave\nworld");
        assert_eq!(
            segments,
            vec![
                WordSegment::Word("Hello".into()),
                WordSegment::Space("  ".into()),
                WordSegment::Word("brave".into()),
                WordSegment::Space("\n".into()),
                WordSegment::Word("world".into()),
            ]
        );
        assert!(split_words("").is_empty());
    }

    #[test]
    fn expo_endpoints() {
        assert_eq!(ease_out_expo(0.0), 0.0);
        assert_eq!(ease_out_expo(1.0), 1.0);
    }
}
