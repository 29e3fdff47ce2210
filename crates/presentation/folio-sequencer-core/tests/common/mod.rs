#![allow(dead_code)]

use folio_sequencer_core::{
    Config, CoreEvent, Effect, HostEvent, Millis, PageLayout, Session, TimedEffect, TimedEvent,
};

pub fn layout(name: &str) -> PageLayout {
    folio_test_fixtures::layouts::load(name).expect("layout fixture")
}

/// A session plus everything it has emitted so far.
pub struct Harness {
    pub session: Session,
    pub effects: Vec<TimedEffect>,
    pub events: Vec<TimedEvent>,
}

impl Harness {
    pub fn new(fixture: &str) -> Self {
        Self::with_config(fixture, Config::default())
    }

    pub fn with_config(fixture: &str, cfg: Config) -> Self {
        Self::from_layout(layout(fixture), cfg)
    }

    pub fn from_layout(layout: PageLayout, cfg: Config) -> Self {
        Self {
            session: Session::new(cfg, layout).expect("session builds"),
            effects: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn send(&mut self, event: HostEvent) -> &mut Self {
        let out = self.session.handle(event);
        self.effects.extend(out.effects.iter().cloned());
        self.events.extend(out.events.iter().cloned());
        self
    }

    pub fn advance(&mut self, dt: Millis) -> &mut Self {
        let out = self.session.advance(dt);
        self.effects.extend(out.effects.iter().cloned());
        self.events.extend(out.events.iter().cloned());
        self
    }

    /// Advance to an absolute time.
    pub fn run_to(&mut self, at: Millis) -> &mut Self {
        let now = self.session.now();
        assert!(at >= now, "cannot run back from {now} to {at}");
        self.advance(at - now)
    }

    pub fn clear(&mut self) {
        self.effects.clear();
        self.events.clear();
    }

    pub fn event_times(&self, pred: impl Fn(&CoreEvent) -> bool) -> Vec<Millis> {
        self.events
            .iter()
            .filter(|e| pred(&e.event))
            .map(|e| e.at)
            .collect()
    }

    pub fn first_event(&self, pred: impl Fn(&CoreEvent) -> bool) -> Option<Millis> {
        self.event_times(pred).first().copied()
    }

    pub fn count_events(&self, pred: impl Fn(&CoreEvent) -> bool) -> usize {
        self.event_times(pred).len()
    }

    pub fn effect_times(&self, effect: &Effect) -> Vec<Millis> {
        self.effects
            .iter()
            .filter(|e| &e.effect == effect)
            .map(|e| e.at)
            .collect()
    }

    pub fn has_effect(&self, effect: &Effect) -> bool {
        self.effects.iter().any(|e| &e.effect == effect)
    }

    pub fn count_effects(&self, pred: impl Fn(&Effect) -> bool) -> usize {
        self.effects.iter().filter(|e| pred(&e.effect)).count()
    }
}
