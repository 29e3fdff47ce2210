//! Gallery lightbox over the non-text cards.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::config::LightboxConfig;
use crate::ids::CardId;
use crate::layout::PageLayout;
use crate::outputs::{CoreEvent, Effect, Target};
use crate::session::Ctx;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightboxGalleryItem {
    pub kind: MediaKind,
    pub source_url: String,
    pub caption_html: String,
    pub title: String,
    pub body: String,
    pub alt: String,
    pub card: CardId,
}

/// Viewport rectangle in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Gallery items for `order`, skipping text cards. A card's video wins
/// over its image; repeated `kind|source` pairs are kept once.
pub fn build_gallery(layout: &PageLayout, order: &[CardId]) -> Vec<LightboxGalleryItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for card in order.iter().filter_map(|id| layout.card(*id)) {
        if card.text_card {
            continue;
        }
        let source = match (&card.video_src, &card.image_src) {
            (Some(src), _) if !src.is_empty() => Some((MediaKind::Video, src)),
            (_, Some(src)) if !src.is_empty() => Some((MediaKind::Image, src)),
            _ => None,
        };
        let Some((kind, src)) = source else {
            continue;
        };
        if !seen.insert(format!("{}|{}", kind.as_str(), src)) {
            continue;
        }
        items.push(LightboxGalleryItem {
            kind,
            source_url: src.clone(),
            caption_html: card.caption_html.trim().to_string(),
            title: card.title.trim().to_string(),
            body: card.body.trim().to_string(),
            alt: card.alt.clone(),
            card: card.id,
        });
    }
    items
}

/// Whether a click lands on the visible, letterboxed media.
///
/// With a known aspect ratio the media is fitted inside `container` and
/// centred; otherwise `media_rect` sizes it. Without either there is no
/// visible media.
pub fn point_inside_media(
    x: f64,
    y: f64,
    container: Rect,
    aspect: Option<f64>,
    media_rect: Option<Rect>,
) -> bool {
    let (width, height) = match (aspect.filter(|a| a.is_finite() && *a > 0.0), media_rect) {
        (Some(aspect), _) => {
            let container_aspect = container.width / container.height;
            if container_aspect > aspect {
                (container.height * aspect, container.height)
            } else {
                (container.width, container.width / aspect)
            }
        }
        (None, Some(rect)) => (rect.width, rect.height),
        (None, None) => return false,
    };
    let left = container.x + (container.width - width) / 2.0;
    let top = container.y + (container.height - height) / 2.0;
    x >= left && x <= left + width && y >= top && y <= top + height
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Caption markup: the card overlay if present, else title and body.
pub fn caption_html(item: &LightboxGalleryItem) -> String {
    if !item.caption_html.is_empty() {
        return item.caption_html.clone();
    }
    let mut html = String::new();
    if !item.title.is_empty() {
        html.push_str(&format!(
            "<h3 class=\"ty-heading\">{}</h3>",
            escape_html(&item.title)
        ));
    }
    if !item.body.is_empty() {
        html.push_str(&format!("<p class=\"lightbox ty-body\">{}</p>", item.body));
    }
    html
}

#[derive(Debug)]
pub struct Lightbox {
    items: Vec<LightboxGalleryItem>,
    order: Vec<CardId>,
    current: Option<usize>,
    open: bool,
    touch_start_x: f64,
    swipe_threshold_px: f64,
    media_margin_px: f64,
}

impl Lightbox {
    pub fn new(cfg: &LightboxConfig) -> Self {
        Self {
            items: Vec::new(),
            order: Vec::new(),
            current: None,
            open: false,
            touch_start_x: 0.0,
            swipe_threshold_px: cfg.swipe_threshold_px,
            media_margin_px: cfg.media_margin_px,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn items(&self) -> &[LightboxGalleryItem] {
        &self.items
    }

    pub fn current_item(&self) -> Option<&LightboxGalleryItem> {
        self.items.get(self.current?)
    }

    /// Adopt a new card order (mobile ordering) and rebuild the items.
    pub fn set_order(&mut self, layout: &PageLayout, order: Vec<CardId>) {
        self.order = order;
        self.refresh(layout);
    }

    pub fn refresh(&mut self, layout: &PageLayout) {
        self.items = build_gallery(layout, &self.order);
    }

    pub(crate) fn open(&mut self, ctx: &mut Ctx, layout: &PageLayout, card: CardId) {
        self.refresh(layout);
        if self.items.is_empty() {
            log::debug!("lightbox has no items, ignoring click on {card}");
            return;
        }
        let target = layout.card(card).and_then(|c| {
            c.video_src
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(c.image_src.as_deref())
        });
        let index = target
            .and_then(|src| self.items.iter().position(|i| i.source_url == src))
            .unwrap_or(0);

        self.open = true;
        ctx.effect(Effect::add_class(Target::Lightbox, "active"));
        ctx.effect(Effect::attribute(Target::Lightbox, "role", "dialog"));
        ctx.effect(Effect::attribute(Target::Lightbox, "aria-modal", "true"));
        ctx.effect(Effect::attribute(Target::Lightbox, "aria-hidden", "false"));
        ctx.effect(Effect::style(Target::Body, "overflow", "hidden"));
        self.show_item(ctx, index as isize);
        ctx.effect(Effect::Focus {
            target: Target::LightboxClose,
        });
        ctx.event(CoreEvent::LightboxOpened {
            index: self.current.unwrap_or(0),
        });
    }

    pub(crate) fn close(&mut self, ctx: &mut Ctx) {
        if !self.open {
            return;
        }
        self.open = false;
        ctx.effect(Effect::remove_class(Target::Lightbox, "active"));
        ctx.effect(Effect::attribute(Target::Lightbox, "aria-hidden", "true"));
        ctx.effect(Effect::clear_style(Target::Body, "overflow"));
        stop_media(ctx);
        ctx.effect(Effect::RestoreFocus);
        ctx.event(CoreEvent::LightboxClosed);
    }

    /// Show item `index`, wrapping in both directions.
    pub(crate) fn show_item(&mut self, ctx: &mut Ctx, index: isize) {
        let len = self.items.len() as isize;
        if len == 0 {
            return;
        }
        let index = index.rem_euclid(len) as usize;
        self.current = Some(index);
        let item = &self.items[index];

        stop_media(ctx);
        match item.kind {
            MediaKind::Video => {
                ctx.effect(Effect::SetMediaSource {
                    target: Target::LightboxVideo,
                    src: Some(item.source_url.clone()),
                });
                ctx.effect(Effect::LoadMedia {
                    target: Target::LightboxVideo,
                });
                ctx.effect(Effect::PlayMedia {
                    target: Target::LightboxVideo,
                });
                ctx.effect(Effect::add_class(Target::LightboxVideo, "visible"));
            }
            MediaKind::Image => {
                ctx.effect(Effect::attribute(
                    Target::LightboxImage,
                    "src",
                    item.source_url.clone(),
                ));
                if !item.alt.is_empty() {
                    ctx.effect(Effect::attribute(
                        Target::LightboxImage,
                        "alt",
                        item.alt.clone(),
                    ));
                }
                ctx.effect(Effect::add_class(Target::LightboxImage, "visible"));
            }
        }
        ctx.effect(Effect::SetHtml {
            target: Target::LightboxCaption,
            html: caption_html(item),
        });
        ctx.effect(Effect::FitLightboxMedia {
            margin_px: self.media_margin_px,
        });
    }

    pub(crate) fn show_next(&mut self, ctx: &mut Ctx) {
        if let Some(current) = self.current.filter(|_| !self.items.is_empty()) {
            self.show_item(ctx, current as isize + 1);
        } else if !self.items.is_empty() {
            self.show_item(ctx, 0);
        }
    }

    pub(crate) fn show_prev(&mut self, ctx: &mut Ctx) {
        if let Some(current) = self.current.filter(|_| !self.items.is_empty()) {
            self.show_item(ctx, current as isize - 1);
        } else if !self.items.is_empty() {
            self.show_item(ctx, -1);
        }
    }

    /// Keyboard handling, active only while open.
    pub(crate) fn handle_key(&mut self, ctx: &mut Ctx, key: &str) {
        if !self.open {
            return;
        }
        match key {
            "Escape" => self.close(ctx),
            "ArrowLeft" => self.show_prev(ctx),
            "ArrowRight" => self.show_next(ctx),
            _ => {}
        }
    }

    pub(crate) fn touch_start(&mut self, x: f64) {
        self.touch_start_x = x;
    }

    /// Horizontal swipe beyond the threshold: left for next, right for previous.
    pub(crate) fn touch_end(&mut self, ctx: &mut Ctx, x: f64) {
        if !self.open {
            return;
        }
        let dx = x - self.touch_start_x;
        if dx.abs() > self.swipe_threshold_px {
            if dx < 0.0 {
                self.show_next(ctx);
            } else {
                self.show_prev(ctx);
            }
        }
    }

    /// Click on the dialog backdrop. Clicks on controls or on the media
    /// itself keep it open.
    pub(crate) fn backdrop_click(
        &mut self,
        ctx: &mut Ctx,
        on_control: bool,
        inside_media: bool,
    ) {
        if on_control || inside_media {
            return;
        }
        self.close(ctx);
    }

    /// Viewport resize: refit open media and rebuild the items.
    pub(crate) fn on_resize(&mut self, ctx: &mut Ctx, layout: &PageLayout) {
        if self.open {
            ctx.effect(Effect::FitLightboxMedia {
                margin_px: self.media_margin_px,
            });
        }
        self.refresh(layout);
    }
}

fn stop_media(ctx: &mut Ctx) {
    ctx.effect(Effect::PauseMedia {
        target: Target::LightboxVideo,
    });
    ctx.effect(Effect::SetMediaSource {
        target: Target::LightboxVideo,
        src: None,
    });
    ctx.effect(Effect::LoadMedia {
        target: Target::LightboxVideo,
    });
    ctx.effect(Effect::remove_class(Target::LightboxVideo, "visible"));
    ctx.effect(Effect::attribute(Target::LightboxImage, "src", ""));
    ctx.effect(Effect::attribute(Target::LightboxImage, "alt", ""));
    ctx.effect(Effect::remove_class(Target::LightboxImage, "visible"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CardSpec;

    fn image_card(id: u32, src: &str) -> CardSpec {
        CardSpec {
            image_src: Some(src.to_string()),
            ..CardSpec::new(id)
        }
    }

    #[test]
    fn gallery_prefers_video_and_dedups() {
        let mut video = image_card(2, "poster.jpg");
        video.video_src = Some("clip.mp4".into());
        let layout = PageLayout {
            left_column: vec![CardSpec::text(0, Vec::new()), image_card(1, "a.jpg")],
            right_column: vec![video, image_card(3, "a.jpg"), CardSpec::new(4)],
            ..PageLayout::default()
        };
        let order = [CardId(0), CardId(2), CardId(1), CardId(3), CardId(4)];
        let items = build_gallery(&layout, &order);
        let summary: Vec<_> = items
            .iter()
            .map(|i| (i.kind, i.source_url.as_str(), i.card.0))
            .collect();
        assert_eq!(
            summary,
            vec![(MediaKind::Video, "clip.mp4", 2), (MediaKind::Image, "a.jpg", 1)]
        );
    }

    #[test]
    fn letterboxed_hit_test() {
        // 400x200 container, square media fitted to 200x200 in the middle
        let container = Rect::new(0.0, 0.0, 400.0, 200.0);
        assert!(point_inside_media(200.0, 100.0, container, Some(1.0), None));
        assert!(point_inside_media(100.0, 0.0, container, Some(1.0), None));
        assert!(!point_inside_media(50.0, 100.0, container, Some(1.0), None));

        // tall container, wide media: bars above and below
        let tall = Rect::new(10.0, 10.0, 100.0, 300.0);
        assert!(!point_inside_media(60.0, 20.0, tall, Some(2.0), None));
        assert!(point_inside_media(60.0, 160.0, tall, Some(2.0), None));
    }

    #[test]
    fn hit_test_falls_back_to_media_rect() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let media = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(point_inside_media(200.0, 200.0, container, None, Some(media)));
        assert!(!point_inside_media(10.0, 10.0, container, None, Some(media)));
        assert!(!point_inside_media(200.0, 200.0, container, None, None));
    }

    #[test]
    fn caption_falls_back_to_title_and_body() {
        let item = LightboxGalleryItem {
            kind: MediaKind::Image,
            source_url: "a.jpg".into(),
            caption_html: String::new(),
            title: "R&D <lab>".into(),
            body: "Built with <em>care</em>".into(),
            alt: String::new(),
            card: CardId(1),
        };
        assert_eq!(
            caption_html(&item),
            "<h3 class=\"ty-heading\">R&amp;D &lt;lab&gt;</h3>\
             <p class=\"lightbox ty-body\">Built with <em>care</em></p>"
        );
    }
}
