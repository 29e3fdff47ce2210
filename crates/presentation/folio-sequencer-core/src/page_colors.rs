//! Per-page background colour and logo tone table.
//!
//! Lookups key on the last path segment of a URL, so `proj-nqs.html`,
//! `/proj-nqs.html` and `https://host/proj-nqs.html` all resolve alike.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoTone {
    /// Dark logo on a light page.
    Dark,
    Light,
}

impl LogoTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

struct PageEntry {
    name: &'static str,
    color: &'static str,
    tone: LogoTone,
    dark_background: bool,
}

const PAGES: &[PageEntry] = &[
    PageEntry {
        name: "index.html",
        color: "#F9F9F9",
        tone: LogoTone::Dark,
        dark_background: false,
    },
    PageEntry {
        name: "proj-motion.html",
        color: "#121212",
        tone: LogoTone::Light,
        dark_background: true,
    },
    PageEntry {
        name: "proj-ai-video.html",
        color: "#201e1f",
        tone: LogoTone::Light,
        dark_background: true,
    },
    PageEntry {
        name: "proj-xrpa.html",
        color: "#081c32",
        tone: LogoTone::Light,
        dark_background: true,
    },
    PageEntry {
        name: "proj-nqs.html",
        color: "#000000",
        tone: LogoTone::Light,
        dark_background: true,
    },
    PageEntry {
        name: "proj-confidential.html",
        color: "#8C8C8C",
        tone: LogoTone::Light,
        dark_background: true,
    },
    PageEntry {
        name: "proj-regapp.html",
        color: "#262626",
        tone: LogoTone::Light,
        dark_background: true,
    },
];

pub const DEFAULT_PAGE_COLOR: &str = "#FFFFFF";

/// Trailing path segment of a URL.
pub fn page_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

fn entry(url: &str) -> Option<&'static PageEntry> {
    let name = page_name(url);
    PAGES.iter().find(|p| p.name == name)
}

pub fn page_color(url: &str) -> &'static str {
    entry(url).map_or(DEFAULT_PAGE_COLOR, |p| p.color)
}

pub fn logo_tone(url: &str) -> LogoTone {
    entry(url).map_or(LogoTone::Dark, |p| p.tone)
}

pub fn has_dark_background(url: &str) -> bool {
    entry(url).is_some_and(|p| p.dark_background)
}

/// `#rrggbb` to `rgba(r, g, b, alpha)`. Malformed channels read as 0.
pub fn hex_to_rgba(hex: &str, alpha: f64) -> String {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    format!(
        "rgba({}, {}, {}, {})",
        channel(1..3),
        channel(3..5),
        channel(5..7),
        alpha
    )
}

/// Header background for a page colour given as hex or `rgb()`.
pub fn header_background(color: &str, alpha: f64) -> String {
    if color.starts_with('#') {
        hex_to_rgba(color, alpha)
    } else {
        color
            .replacen("rgb(", "rgba(", 1)
            .replacen(')', &format!(", {alpha})"), 1)
    }
}
