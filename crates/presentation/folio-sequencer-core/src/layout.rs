//! Page layout: the DOM facts a host measures once before `DomReady`.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::SequencerError;
use crate::ids::CardId;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// `location.pathname`, e.g. `/index.html` or `/`.
    pub path: String,
    pub body_classes: Vec<String>,
    pub slides: Vec<SlideSpec>,
    pub left_column: Vec<CardSpec>,
    pub right_column: Vec<CardSpec>,
    pub logo: LogoStatus,
    /// Whether `document.fonts.ready` exists in this browser.
    pub fonts_api: bool,
    pub coarse_pointer: bool,
    /// Hero text as authored in the markup, captured for history restores.
    pub hero_text: Option<HeroTextSnapshot>,
    /// Raw `--hero-intro-duration` custom property value.
    pub hero_fade: Option<String>,
    /// Page background colour as declared by the page, if any.
    pub background_color: Option<String>,
    /// `href` of every anchor in document order.
    pub links: Vec<String>,
    pub navigation: NavigationType,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            body_classes: Vec::new(),
            slides: Vec::new(),
            left_column: Vec::new(),
            right_column: Vec::new(),
            logo: LogoStatus::default(),
            fonts_api: true,
            coarse_pointer: false,
            hero_text: None,
            hero_fade: None,
            background_color: None,
            links: Vec::new(),
            navigation: NavigationType::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlideSpec {
    pub video: Option<VideoSpec>,
    /// `data-background="dark"` on the slide.
    pub dark_background: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoSpec {
    /// `HTMLMediaElement.readyState` when the layout was captured.
    pub ready_state: u8,
    pub looping: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CardSpec {
    pub id: CardId,
    /// The double-height text card.
    #[serde(default)]
    pub text_card: bool,
    /// Card carries a hover `.thumbnail-video`.
    #[serde(default)]
    pub thumbnail_video: bool,
    #[serde(default)]
    pub video_src: Option<String>,
    #[serde(default)]
    pub image_src: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption_html: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Word/divider units of the text card body, in reveal order.
    #[serde(default)]
    pub reveal_units: Vec<RevealUnit>,
}

impl CardSpec {
    pub fn new(id: u32) -> Self {
        Self {
            id: CardId(id),
            text_card: false,
            thumbnail_video: false,
            video_src: None,
            image_src: None,
            alt: String::new(),
            caption_html: String::new(),
            title: String::new(),
            body: String::new(),
            reveal_units: Vec::new(),
        }
    }

    pub fn text(id: u32, units: Vec<RevealUnit>) -> Self {
        Self {
            text_card: true,
            reveal_units: units,
            ..Self::new(id)
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RevealUnit {
    Word,
    Divider,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogoStatus {
    Absent,
    Complete,
    #[default]
    Loading,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HeroTextSnapshot {
    pub html: String,
    pub color: String,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    #[default]
    Navigate,
    Reload,
    BackForward,
    Prerender,
}

/// How the hero behaves on this page.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Landing page: gated, rotating hero timeline.
    Rotating,
    /// Project page with a single hero slide.
    Static,
    /// Multi-slide page off the landing path: timeline starts without gating.
    Plain,
}

impl PageKind {
    #[inline]
    pub fn has_timeline(&self) -> bool {
        !matches!(self, Self::Static)
    }
}

impl PageLayout {
    #[inline]
    pub fn has_class(&self, class: &str) -> bool {
        self.body_classes.iter().any(|c| c == class)
    }

    pub fn is_index_page(&self) -> bool {
        self.path.ends_with("index.html") || self.path == "/"
    }

    pub fn is_static_page(&self) -> bool {
        self.has_class("static-page") || self.slides.len() == 1
    }

    pub fn kind(&self) -> PageKind {
        if self.is_static_page() {
            PageKind::Static
        } else if self.is_index_page() {
            PageKind::Rotating
        } else {
            PageKind::Plain
        }
    }

    /// Long-text variant with faster word pacing.
    pub fn is_long_text(&self) -> bool {
        self.has_class("regapp")
    }

    /// Static pages whose transitions fade the hero without delay.
    pub fn is_immersive_static(&self) -> bool {
        let path_match = ["uiux.html", "template.html", "xrpa.html"]
            .iter()
            .any(|p| self.path.contains(p));
        self.is_static_page() && (path_match || self.has_class("xrpa"))
    }

    #[inline]
    pub fn has_logo(&self) -> bool {
        self.logo != LogoStatus::Absent
    }

    pub fn first_video(&self) -> Option<&VideoSpec> {
        self.slides.first().and_then(|s| s.video.as_ref())
    }

    /// All cards in document order (`.content-grid .card`).
    pub fn cards(&self) -> impl Iterator<Item = &CardSpec> {
        self.left_column.iter().chain(self.right_column.iter())
    }

    pub fn card(&self, id: CardId) -> Option<&CardSpec> {
        self.cards().find(|c| c.id == id)
    }

    pub fn text_cards(&self) -> impl Iterator<Item = &CardSpec> {
        self.cards().filter(|c| c.text_card)
    }

    pub fn validate(&self) -> Result<(), SequencerError> {
        let mut seen = HashSet::new();
        for card in self.cards() {
            if !seen.insert(card.id) {
                return Err(SequencerError::DuplicateCard { id: card.id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(n: usize) -> Vec<SlideSpec> {
        vec![SlideSpec::default(); n]
    }

    #[test]
    fn page_kind_follows_path_and_slides() {
        let mut layout = PageLayout {
            path: "/index.html".into(),
            slides: slides(3),
            ..PageLayout::default()
        };
        assert_eq!(layout.kind(), PageKind::Rotating);

        layout.path = "/".into();
        assert_eq!(layout.kind(), PageKind::Rotating);

        layout.slides = slides(1);
        assert_eq!(layout.kind(), PageKind::Static);

        layout.slides = slides(3);
        layout.body_classes = vec!["static-page".into()];
        assert_eq!(layout.kind(), PageKind::Static);

        layout.body_classes.clear();
        layout.path = "/proj-motion.html".into();
        assert_eq!(layout.kind(), PageKind::Plain);
    }

    #[test]
    fn immersive_static_needs_static_page() {
        let mut layout = PageLayout {
            path: "/xrpa.html".into(),
            slides: slides(1),
            ..PageLayout::default()
        };
        assert!(layout.is_immersive_static());
        layout.slides = slides(2);
        assert!(!layout.is_immersive_static());
    }

    #[test]
    fn duplicate_cards_are_rejected() {
        let layout = PageLayout {
            left_column: vec![CardSpec::new(1)],
            right_column: vec![CardSpec::new(1)],
            ..PageLayout::default()
        };
        assert_eq!(
            layout.validate(),
            Err(SequencerError::DuplicateCard { id: CardId(1) })
        );
    }

    #[test]
    fn layout_json_defaults() {
        let layout: PageLayout = serde_json::from_str(r#"{ "path": "/proj-nqs.html" }"#)
            .expect("layout parses");
        assert!(layout.fonts_api);
        assert_eq!(layout.logo, LogoStatus::Loading);
        assert_eq!(layout.navigation, NavigationType::Navigate);
    }
}
