mod common;

use common::Harness;
use folio_sequencer_core::sequencer::Failsafe;
use folio_sequencer_core::{
    CardId, Config, CoreEvent, Effect, HeroReadyReason, HeroStartReason, HostEvent, MediaEvent,
    SequencerPhase, Target,
};

fn media(slide: usize, event: MediaEvent) -> HostEvent {
    HostEvent::Media { slide, event }
}

fn hero_started(h: &Harness) -> Vec<(u64, HeroStartReason)> {
    h.events
        .iter()
        .filter_map(|e| match e.event {
            CoreEvent::HeroStarted { reason } => Some((e.at, reason)),
            _ => None,
        })
        .collect()
}

#[test]
fn cold_index_waits_for_essentials_then_first_video() {
    let mut h = Harness::new("index");
    h.send(HostEvent::DomReady);
    assert_eq!(h.session.phase(), SequencerPhase::LoaderRunning);
    assert!(h.session.view().loader_running);
    assert!(h.has_effect(&Effect::LoadMedia {
        target: Target::SlideVideo(0)
    }));

    h.run_to(100).send(HostEvent::FontsReady);
    h.run_to(200).send(HostEvent::LogoLoaded);
    assert_eq!(h.effect_times(&Effect::MeasureLogoWidth), vec![200]);

    h.run_to(500);
    assert_eq!(h.first_event(|e| *e == CoreEvent::EssentialsReady), Some(500));
    assert_eq!(h.session.phase(), SequencerPhase::HeroQueued);
    let view = h.session.view();
    assert!(view.cards_ready);
    assert!(view.hover_effects_enabled);
    assert!(view.flags.hero_queued);
    assert!(!view.flags.hero_started);
    assert!(view.flags.cascade_started);
    assert!(h.has_effect(&Effect::add_class(Target::Body, "loaded")));

    h.run_to(2000);
    let reveals: Vec<_> = h
        .events
        .iter()
        .filter_map(|e| match e.event {
            CoreEvent::CardRevealed { card } => Some((e.at, card.0)),
            _ => None,
        })
        .collect();
    assert_eq!(
        reveals,
        vec![(800, 2), (1000, 10), (1200, 1), (1400, 11), (1600, 3), (1800, 12)]
    );
    assert_eq!(h.first_event(|e| *e == CoreEvent::LoaderHidden), Some(1800));
    assert!(hero_started(&h).is_empty());

    h.send(media(0, MediaEvent::CanPlayThrough));
    assert_eq!(hero_started(&h), vec![(2000, HeroStartReason::LoaderComplete)]);
    assert_eq!(h.session.phase(), SequencerPhase::Settled);

    h.run_to(9000);
    assert_eq!(h.count_events(|e| matches!(e, CoreEvent::FailsafeFired { .. })), 0);
    assert_eq!(
        h.first_event(|e| *e
            == CoreEvent::HeroReady {
                reason: HeroReadyReason::Timeout
            }),
        Some(5000)
    );
    assert_eq!(hero_started(&h).len(), 1);
}

#[test]
fn warm_index_polls_until_cascade_begins() {
    let mut h = Harness::new("index-warm");
    h.send(HostEvent::DomReady);
    assert_eq!(h.effect_times(&Effect::MeasureLogoWidth), vec![0, 0]);
    assert_eq!(
        h.first_event(|e| *e
            == CoreEvent::HeroReady {
                reason: HeroReadyReason::ReadyStateMetadata
            }),
        Some(0)
    );
    assert!(h.session.flags().hero_queued);
    assert!(!h.session.flags().hero_started);

    h.run_to(2000);
    assert_eq!(
        hero_started(&h),
        vec![(300, HeroStartReason::ReadyStateMetadata)]
    );
    assert_eq!(h.first_event(|e| *e == CoreEvent::LoaderHidden), Some(1500));
    assert_eq!(h.session.phase(), SequencerPhase::Settled);
    assert!(h.has_effect(&Effect::PlayMedia {
        target: Target::SlideVideo(1)
    }));
}

#[test]
fn readiness_timeout_waits_for_loadeddata() {
    let mut cfg = Config::default();
    cfg.readiness.font_timeout_ms = 6500;
    cfg.sequencer.local_failsafe_ms = 7000;
    let mut h = Harness::with_config("index", cfg);
    h.send(HostEvent::DomReady);

    h.run_to(5000);
    assert_eq!(
        h.first_event(|e| *e
            == CoreEvent::HeroReady {
                reason: HeroReadyReason::Timeout
            }),
        Some(5000)
    );
    assert!(!h.session.flags().hero_queued);
    assert_eq!(
        h.effect_times(&Effect::LoadMedia {
            target: Target::SlideVideo(0)
        }),
        vec![0, 5000]
    );

    h.run_to(5200).send(media(0, MediaEvent::LoadedData));
    assert!(h.session.flags().hero_queued);
    assert!(hero_started(&h).is_empty());

    h.run_to(7000);
    // the stalled-video overlay hide runs on its own clock
    assert_eq!(h.first_event(|e| *e == CoreEvent::LoaderHidden), Some(6600));
    assert_eq!(h.first_event(|e| *e == CoreEvent::EssentialsReady), Some(6800));
    h.send(media(0, MediaEvent::CanPlayThrough));
    assert_eq!(hero_started(&h), vec![(7000, HeroStartReason::LoadedData)]);
    assert_eq!(h.count_events(|e| matches!(e, CoreEvent::FailsafeFired { .. })), 0);
}

#[test]
fn local_failsafe_starts_page_when_essentials_hang() {
    let mut cfg = Config::default();
    cfg.readiness.font_timeout_ms = 9000;
    let mut layout = common::layout("index-warm");
    layout.fonts_api = true;
    let mut h = Harness::from_layout(layout, cfg);
    h.send(HostEvent::DomReady);
    h.run_to(4999);
    assert!(!h.session.view().cards_ready);

    h.run_to(5000);
    assert_eq!(
        h.event_times(|e| *e
            == CoreEvent::FailsafeFired {
                failsafe: Failsafe::Local
            }),
        vec![5000]
    );
    assert!(h.session.view().cards_ready);

    h.run_to(10_000);
    // essentials concluding later do not restart the page
    assert_eq!(h.first_event(|e| *e == CoreEvent::EssentialsReady), Some(9300));
    assert_eq!(h.count_events(|e| matches!(e, CoreEvent::CascadeStarted { .. })), 1);
    assert_eq!(hero_started(&h).len(), 1);
}

#[test]
fn failed_essentials_still_resolve() {
    let mut h = Harness::new("index");
    h.send(HostEvent::DomReady);
    h.run_to(100).send(HostEvent::FontsFailed);
    h.run_to(200).send(HostEvent::LogoFailed);
    assert_eq!(h.effect_times(&Effect::MeasureLogoWidth), vec![200]);

    h.run_to(1500);
    // concluded at the failure, then the usual settle delay
    assert_eq!(h.first_event(|e| *e == CoreEvent::EssentialsReady), Some(500));
    assert_eq!(h.count_events(|e| matches!(e, CoreEvent::FailsafeFired { .. })), 0);
    assert!(h.session.view().cards_ready);
}

#[test]
fn config_fixture_overrides_only_named_timings() {
    let cfg: Config = folio_test_fixtures::configs::load("fast-failsafes").expect("config fixture");
    assert_eq!(cfg.readiness.font_timeout_ms, 400);
    assert_eq!(cfg.readiness.logo_timeout_ms, 1000);

    let mut h = Harness::with_config("index", cfg);
    h.send(HostEvent::DomReady);
    h.run_to(3000);
    // logo times out last, settling before the shortened local failsafe
    assert_eq!(h.first_event(|e| *e == CoreEvent::EssentialsReady), Some(1300));
    assert_eq!(h.count_events(|e| matches!(e, CoreEvent::FailsafeFired { .. })), 0);
}

#[test]
fn global_failsafe_forces_rotating_start() {
    let mut cfg = Config::default();
    cfg.readiness.font_timeout_ms = 9500;
    cfg.sequencer.local_failsafe_ms = 9000;
    let mut h = Harness::with_config("index", cfg);
    h.send(HostEvent::DomReady);

    h.run_to(8000);
    assert_eq!(
        h.event_times(|e| *e
            == CoreEvent::FailsafeFired {
                failsafe: Failsafe::Global
            }),
        vec![8000]
    );
    assert!(h.has_effect(&Effect::add_class(Target::LoadingOverlay, "hide")));
    assert_eq!(h.session.phase(), SequencerPhase::HeroQueued);
    assert_eq!(
        h.first_event(|e| *e == CoreEvent::CascadeStarted { static_page: false }),
        Some(8000)
    );

    h.run_to(14_000);
    assert_eq!(hero_started(&h), vec![(14_000, HeroStartReason::GlobalFailsafe)]);
}

#[test]
fn window_load_marks_cards_ready() {
    let mut cfg = Config::default();
    cfg.readiness.font_timeout_ms = 9000;
    cfg.sequencer.local_failsafe_ms = 9500;
    let mut h = Harness::with_config("index", cfg);
    h.send(HostEvent::DomReady).send(HostEvent::WindowLoaded);
    h.run_to(2999);
    assert!(!h.session.view().cards_ready);
    h.run_to(3000);
    assert!(h.session.view().cards_ready);
    assert_eq!(h.session.phase(), SequencerPhase::LoaderRunning);
}

#[test]
fn static_page_reveals_everything_at_once() {
    let mut h = Harness::new("static-project");
    h.send(HostEvent::DomReady);
    assert_eq!(hero_started(&h), vec![(0, HeroStartReason::HeroReady)]);
    assert!(h.session.flags().static_content_initialized);
    assert!(h.has_effect(&Effect::add_class(Target::Logo, "light")));
    assert!(h.has_effect(&Effect::add_class(Target::Card(CardId(1)), "dark-text-card")));
    assert!(h.has_effect(&Effect::PlayMedia {
        target: Target::SlideVideo(0)
    }));

    h.run_to(2000);
    let reveals = h.event_times(|e| matches!(e, CoreEvent::CardRevealed { .. }));
    assert_eq!(reveals, vec![300, 300, 300, 300]);
    let words: Vec<_> = (0..3)
        .map(|index| {
            h.effect_times(&Effect::add_class(
                Target::WordUnit {
                    card: CardId(1),
                    index,
                },
                "visible",
            ))
        })
        .collect();
    assert_eq!(words, vec![vec![500], vec![608], vec![624]]);
    assert_eq!(h.first_event(|e| *e == CoreEvent::LoaderStopped), Some(1100));
    assert_eq!(h.first_event(|e| *e == CoreEvent::LoaderHidden), Some(1100));
    assert_eq!(h.session.phase(), SequencerPhase::Settled);
    assert!(h.session.view().cards_ready);

    h.run_to(9000);
    assert_eq!(h.count_events(|e| matches!(e, CoreEvent::FailsafeFired { .. })), 0);
}

#[test]
fn plain_page_starts_timeline_without_gating() {
    let mut h = Harness::new("plain");
    h.send(HostEvent::DomReady);
    assert_eq!(hero_started(&h), vec![(0, HeroStartReason::HeroReady)]);

    h.run_to(11_000);
    assert_eq!(h.first_event(|e| *e == CoreEvent::EssentialsReady), Some(300));
    assert_eq!(h.first_event(|e| *e == CoreEvent::LoaderHidden), Some(1600));
    assert_eq!(
        h.event_times(|e| *e == CoreEvent::SlideAdvanced { index: 1 }),
        vec![10_000]
    );
}

#[test]
fn duplicate_dom_ready_is_ignored() {
    let mut h = Harness::new("index-warm");
    h.send(HostEvent::DomReady);
    h.clear();
    h.send(HostEvent::DomReady);
    assert!(h.effects.is_empty());
    assert!(h.events.is_empty());
}
