//! Hero slide videos and the "ensure playback" routine.

use crate::inputs::MediaEvent;
use crate::layout::PageLayout;
use crate::outputs::{Effect, Target};
use crate::readiness::VideoState;
use crate::session::Ctx;

#[derive(Clone, Copy, Debug)]
struct SlideVideo {
    state: VideoState,
    looping: bool,
    /// Listeners were attached by a previous playback request.
    bound: bool,
}

/// Live state of every slide's video, indexed by slide.
#[derive(Debug, Default)]
pub struct SlideVideos {
    slides: Vec<Option<SlideVideo>>,
}

impl SlideVideos {
    pub fn from_layout(layout: &PageLayout) -> Self {
        let slides = layout
            .slides
            .iter()
            .map(|s| {
                s.video.as_ref().map(|v| SlideVideo {
                    state: VideoState::from_spec(v),
                    looping: v.looping,
                    bound: false,
                })
            })
            .collect();
        Self { slides }
    }

    #[inline]
    pub fn has_video(&self, slide: usize) -> bool {
        matches!(self.slides.get(slide), Some(Some(_)))
    }

    pub fn state(&self, slide: usize) -> Option<&VideoState> {
        self.slides.get(slide)?.as_ref().map(|v| &v.state)
    }

    pub fn is_looping(&self, slide: usize) -> bool {
        self.slides
            .get(slide)
            .and_then(|v| v.as_ref())
            .is_some_and(|v| v.looping)
    }

    /// Start playback once the video has data, marking it ready.
    pub(crate) fn ensure_playback(&mut self, ctx: &mut Ctx, slide: usize) {
        let Some(Some(video)) = self.slides.get_mut(slide) else {
            return;
        };
        if video.state.has_data() {
            video.state.awaiting_data = false;
            mark_ready(ctx, slide);
            ctx.effect(Effect::PlayMedia {
                target: Target::SlideVideo(slide),
            });
            return;
        }
        let first_bind = !video.bound;
        video.bound = true;
        video.state.awaiting_data = true;
        if first_bind || video.state.ready_state == 0 {
            ctx.effect(Effect::LoadMedia {
                target: Target::SlideVideo(slide),
            });
        }
    }

    /// Apply a media event. Completes a pending playback request.
    pub(crate) fn observe(&mut self, ctx: &mut Ctx, slide: usize, event: MediaEvent) {
        let Some(Some(video)) = self.slides.get_mut(slide) else {
            log::debug!("media event for slide {slide} without a video");
            return;
        };
        video.state.observe(event);
        if !video.state.awaiting_data {
            return;
        }
        match event {
            MediaEvent::LoadedData => {
                video.state.awaiting_data = false;
                mark_ready(ctx, slide);
                ctx.effect(Effect::PlayMedia {
                    target: Target::SlideVideo(slide),
                });
            }
            MediaEvent::Error => {
                video.state.awaiting_data = false;
                mark_ready(ctx, slide);
            }
            _ => {}
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

fn mark_ready(ctx: &mut Ctx, slide: usize) {
    ctx.effect(Effect::add_class(Target::SlideVideo(slide), "video-ready"));
    ctx.effect(Effect::add_class(Target::Slide(slide), "video-loaded"));
}
