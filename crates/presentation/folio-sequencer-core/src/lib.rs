//! Folio Sequencer Core (host-agnostic)
//!
//! Loading readiness, hero slideshow, card cascade and history-restore
//! sequencing for the Folio portfolio site. The host feeds DOM facts
//! ([`PageLayout`]) and events ([`HostEvent`]) into a [`Session`] and applies
//! the returned [`Effect`]s; all timing runs on the virtual [`Scheduler`] so
//! the whole page choreography can be stepped deterministically.

pub mod cascade;
pub mod clock;
pub mod config;
pub mod error;
pub mod header;
pub mod history;
pub mod ids;
pub mod inputs;
pub mod layout;
pub mod lightbox;
pub mod loader;
pub mod media;
pub mod outputs;
pub mod page_colors;
pub mod phone;
pub mod readiness;
pub mod sequencer;
pub mod session;
pub mod timeline;
pub mod transition;

// Re-exports for consumers (adapters)
pub use cascade::{alternating_sequence, split_words, word_reveal_delays, WordPacing, WordSegment};
pub use clock::{Millis, Scheduler, TaskId};
pub use config::Config;
pub use error::SequencerError;
pub use history::RestoreSource;
pub use ids::{CardId, LoaderHandle};
pub use inputs::{FetchOutcome, HostEvent, Inputs, MediaEvent};
pub use layout::{CardSpec, LogoStatus, NavigationType, PageKind, PageLayout, RevealUnit, SlideSpec};
pub use lightbox::{LightboxGalleryItem, MediaKind, Rect};
pub use outputs::{CoreEvent, Effect, Outputs, Target, TimedEffect, TimedEvent};
pub use page_colors::LogoTone;
pub use readiness::{AssetSource, HeroReadyReason, ReadinessSignal, SignalState};
pub use sequencer::{HeroStartReason, SequencerFlags, SequencerPhase};
pub use session::{Session, SessionView};
pub use timeline::{TimelineSlide, TimelineState};
