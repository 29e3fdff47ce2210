mod common;

use common::Harness;
use folio_sequencer_core::{
    Config, CoreEvent, Effect, HostEvent, LogoStatus, PageKind, PageLayout, Target, TimelineState,
};

fn started_warm() -> Harness {
    let mut h = Harness::new("index-warm");
    h.send(HostEvent::DomReady);
    h.run_to(300);
    assert!(h.session.flags().hero_started);
    h
}

#[test]
fn slides_cycle_and_wrap_to_first() {
    let mut h = started_warm();
    assert_eq!(h.session.timeline().state(), TimelineState::Intro);

    h.run_to(28_000);
    let advanced: Vec<_> = h
        .events
        .iter()
        .filter_map(|e| match e.event {
            CoreEvent::SlideAdvanced { index } => Some((e.at, index)),
            _ => None,
        })
        .collect();
    assert_eq!(advanced, vec![(10_300, 1), (17_300, 2), (27_300, 0)]);
    assert_eq!(h.session.view().timeline_index, 0);
    assert_eq!(
        h.session.timeline().state(),
        TimelineState::Showing { index: 0 }
    );

    let texts: Vec<_> = h
        .events
        .iter()
        .filter_map(|e| match e.event {
            CoreEvent::HeroTextUpdated { index } => Some((e.at, index)),
            _ => None,
        })
        .collect();
    // slide text waits for its delay, never less than the fade
    assert_eq!(texts[..3], [(3300, 0), (11_000, 1), (22_000, 2)]);
}

#[test]
fn logo_follows_slides() {
    let mut h = started_warm();
    h.run_to(26_000);
    let tones: Vec<_> = h
        .events
        .iter()
        .filter_map(|e| match e.event {
            CoreEvent::LogoToneChanged { light } => Some((e.at, light)),
            _ => None,
        })
        .collect();
    assert_eq!(tones, vec![(11_000, true), (22_000, false), (25_300, false)]);
}

#[test]
fn scroll_override_suppresses_logo_switch() {
    let mut h = started_warm();
    h.run_to(5000).send(HostEvent::Scroll { y: 150.0 });
    assert!(h.session.view().logo_override);
    assert!(h.has_effect(&Effect::add_class(Target::Logo, "scroll-override")));

    h.run_to(12_000);
    assert_eq!(
        h.count_events(|e| matches!(e, CoreEvent::LogoToneChanged { .. })),
        0
    );

    // back near the top the logo follows the current slide again
    h.clear();
    h.send(HostEvent::Scroll { y: 20.0 });
    assert!(!h.session.view().logo_override);
    assert!(h.has_effect(&Effect::add_class(Target::Logo, "light")));
}

#[test]
fn crossfade_effects_for_incoming_and_outgoing_slides() {
    let mut h = started_warm();
    h.run_to(8299);
    h.clear();
    h.run_to(8300);
    assert!(h.has_effect(&Effect::style(Target::Slide(1), "opacity", "1")));
    assert!(h.has_effect(&Effect::style(Target::Slide(0), "opacity", "0")));
    assert!(h.has_effect(&Effect::SeekMedia {
        target: Target::SlideVideo(1),
        time: 0.0
    }));
    assert_eq!(
        h.session.timeline().state(),
        TimelineState::Crossfading { from: 0, to: 1 }
    );

    h.run_to(8350);
    assert!(h.has_effect(&Effect::style(
        Target::Slide(1),
        "transition",
        "opacity 2000ms"
    )));

    h.clear();
    h.run_to(10_300);
    // slide 0 does not loop, so it is rewound once hidden
    assert!(h.has_effect(&Effect::PauseMedia {
        target: Target::SlideVideo(0)
    }));
    assert!(h.has_effect(&Effect::SeekMedia {
        target: Target::SlideVideo(0),
        time: 0.0
    }));
}

#[test]
fn looping_video_is_not_rewound() {
    let mut h = started_warm();
    h.run_to(27_299);
    h.clear();
    h.run_to(27_300);
    assert!(h.has_effect(&Effect::PauseMedia {
        target: Target::SlideVideo(2)
    }));
    assert!(!h.has_effect(&Effect::SeekMedia {
        target: Target::SlideVideo(2),
        time: 0.0
    }));
}

fn event_log(h: &Harness, pick: impl Fn(&CoreEvent) -> Option<usize>) -> Vec<(u64, usize)> {
    h.events
        .iter()
        .filter_map(|e| pick(&e.event).map(|i| (e.at, i)))
        .collect()
}

#[test]
fn short_text_delay_still_waits_for_the_fade() {
    let mut cfg = Config::default();
    for slide in &mut cfg.hero.slides {
        slide.hero_text_delay_s = 0.1;
    }
    let mut layout = common::layout("index-warm");
    layout.hero_fade = Some("0.5".into());
    let mut h = Harness::from_layout(layout, cfg);
    h.send(HostEvent::DomReady);
    h.run_to(16_000);
    assert_eq!(h.session.timeline().fade_ms(), 500);

    let texts = event_log(&h, |e| match e {
        CoreEvent::HeroTextUpdated { index } => Some(*index),
        _ => None,
    });
    let advances = event_log(&h, |e| match e {
        CoreEvent::SlideAdvanced { index } => Some(*index),
        _ => None,
    });
    // the intro has no fade to wait for; crossfades start 500 ms before each advance
    assert_eq!(texts, vec![(400, 0), (8800, 1), (15_800, 2)]);
    assert_eq!(advances, vec![(8800, 1), (15_800, 2)]);
}

#[test]
fn pages_without_slides_never_rotate() {
    for (path, kind) in [("/about.html", PageKind::Plain), ("/", PageKind::Rotating)] {
        let layout = PageLayout {
            path: path.into(),
            logo: LogoStatus::Complete,
            fonts_api: false,
            ..PageLayout::default()
        };
        let mut h = Harness::from_layout(layout, Config::default());
        assert_eq!(h.session.kind(), kind);
        h.send(HostEvent::DomReady);
        h.run_to(30_000);

        assert!(h.session.flags().hero_started, "{path}");
        assert_eq!(h.count_events(|e| matches!(e, CoreEvent::HeroStarted { .. })), 1);
        assert_eq!(
            h.count_events(|e| matches!(
                e,
                CoreEvent::SlideAdvanced { .. }
                    | CoreEvent::LogoToneChanged { .. }
                    | CoreEvent::HeroTextUpdated { .. }
            )),
            0,
            "{path}"
        );
        assert_eq!(h.session.timeline().state(), TimelineState::Idle);
        assert_eq!(h.session.timeline().pending(), 0);
        assert_eq!(h.session.pending_tasks(), 0, "{path}");
    }
}
