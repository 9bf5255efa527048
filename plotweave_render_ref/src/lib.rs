// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotweave Render Reference Context.
//!
//! This crate provides [`RecordingContext`], a [`RenderContext`] that draws
//! nothing and instead records every call together with the clip depth at
//! which it was issued.
//!
//! It is intentionally *not* a reference renderer:
//! - It does **not** rasterize or serialize anything.
//! - It records calls as issued, including degenerate ones, so tests can
//!   assert on exactly what a caller asked for.
//! - Clip support can be switched off to exercise the manual clipping
//!   fallbacks of [`RenderContextExt`](plotweave_render::RenderContextExt).

use plotweave_render::text::TextLayout;
use plotweave_render::{
    Color, Font, HorizontalAlignment, Image, LineJoin, Rect, RenderContext, Result, ScreenPoint,
    Size, StandardFontMetrics, VerticalAlignment,
};

/// A recorded render call.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// [`RenderContext::draw_line`].
    Line {
        /// Polyline vertices.
        points: Vec<ScreenPoint>,
        /// Stroke color.
        stroke: Color,
        /// Stroke thickness.
        thickness: f64,
        /// Dash pattern, in units of thickness.
        dash_array: Option<Vec<f64>>,
        /// Join style.
        line_join: LineJoin,
        /// Whether smoothing was disabled.
        aliased: bool,
    },
    /// [`RenderContext::draw_line_segments`].
    LineSegments {
        /// Segment endpoints, in pairs.
        points: Vec<ScreenPoint>,
        /// Stroke color.
        stroke: Color,
        /// Stroke thickness.
        thickness: f64,
        /// Dash pattern, in units of thickness.
        dash_array: Option<Vec<f64>>,
    },
    /// [`RenderContext::draw_polygon`].
    Polygon {
        /// Polygon vertices.
        points: Vec<ScreenPoint>,
        /// Fill color.
        fill: Color,
        /// Stroke color.
        stroke: Color,
        /// Stroke thickness.
        thickness: f64,
    },
    /// [`RenderContext::draw_rectangle`].
    Rectangle {
        /// The rectangle.
        rect: Rect,
        /// Fill color.
        fill: Color,
        /// Stroke color.
        stroke: Color,
        /// Stroke thickness.
        thickness: f64,
    },
    /// [`RenderContext::draw_ellipse`].
    Ellipse {
        /// Bounding rectangle.
        rect: Rect,
        /// Fill color.
        fill: Color,
        /// Stroke color.
        stroke: Color,
        /// Stroke thickness.
        thickness: f64,
    },
    /// [`RenderContext::draw_text`].
    Text {
        /// The text.
        text: String,
        /// Fill color.
        fill: Color,
        /// Resolved placement.
        layout: TextLayout,
    },
    /// [`RenderContext::draw_image`].
    Image {
        /// Identity of the drawn image.
        image_id: u64,
        /// Source region in image pixels.
        src: Rect,
        /// Destination rectangle.
        dst: Rect,
        /// Opacity.
        opacity: f64,
        /// Whether smooth resampling was requested.
        interpolate: bool,
    },
    /// [`RenderContext::set_clip`] (only recorded when clipping is supported).
    SetClip(Rect),
    /// [`RenderContext::reset_clip`].
    ResetClip,
    /// [`RenderContext::clean_up`].
    CleanUp,
}

/// A recorded call and the clip depth it ran at.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// The call.
    pub command: Command,
    /// Number of active clips after the call was applied.
    pub clip_depth: u32,
}

/// Recording implementation of [`RenderContext`].
///
/// Text is measured with [`StandardFontMetrics`].
#[derive(Debug)]
pub struct RecordingContext {
    events: Vec<Event>,
    clip_stack: Vec<Rect>,
    supports_clipping: bool,
    renders_to_screen: bool,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            clip_stack: Vec::new(),
            supports_clipping: true,
            renders_to_screen: false,
        }
    }
}

impl RecordingContext {
    /// Creates a recorder whose `set_clip` succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose `set_clip` reports no clip support.
    pub fn without_clipping() -> Self {
        Self {
            supports_clipping: false,
            ..Self::default()
        }
    }

    /// Makes [`RenderContext::renders_to_screen`] return `value`.
    pub fn with_renders_to_screen(mut self, value: bool) -> Self {
        self.renders_to_screen = value;
        self
    }

    /// Recorded events in call order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Recorded commands in call order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.events.iter().map(|e| &e.command)
    }

    /// Number of clips currently pushed.
    pub fn clip_depth(&self) -> u32 {
        u32::try_from(self.clip_stack.len()).expect("RecordingContext: clip stack overflow")
    }

    /// The innermost active clip, if any.
    pub fn current_clip(&self) -> Option<Rect> {
        self.clip_stack.last().copied()
    }

    /// Forgets recorded events but keeps the clip stack.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, command: Command) {
        let clip_depth = self.clip_depth();
        self.events.push(Event {
            command,
            clip_depth,
        });
    }
}

impl RenderContext for RecordingContext {
    fn renders_to_screen(&self) -> bool {
        self.renders_to_screen
    }

    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        self.record(Command::Line {
            points: points.to_vec(),
            stroke,
            thickness,
            dash_array: dash_array.map(<[f64]>::to_vec),
            line_join,
            aliased,
        });
        Ok(())
    }

    fn draw_line_segments(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        _line_join: LineJoin,
        _aliased: bool,
    ) -> Result<()> {
        self.record(Command::LineSegments {
            points: points.to_vec(),
            stroke,
            thickness,
            dash_array: dash_array.map(<[f64]>::to_vec),
        });
        Ok(())
    }

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        fill: Color,
        stroke: Color,
        thickness: f64,
        _dash_array: Option<&[f64]>,
        _line_join: LineJoin,
        _aliased: bool,
    ) -> Result<()> {
        self.record(Command::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
            thickness,
        });
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        self.record(Command::Rectangle {
            rect,
            fill,
            stroke,
            thickness,
        });
        Ok(())
    }

    fn draw_ellipse(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        self.record(Command::Ellipse {
            rect,
            fill,
            stroke,
            thickness,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        position: ScreenPoint,
        text: &str,
        fill: Color,
        font: &Font<'_>,
        rotation_degrees: f64,
        halign: HorizontalAlignment,
        valign: VerticalAlignment,
        max_size: Option<Size>,
    ) -> Result<()> {
        let measured = self.measure_text(text, font);
        let layout = TextLayout::new(position, measured, rotation_degrees, halign, valign, max_size);
        self.record(Command::Text {
            text: text.to_owned(),
            fill,
            layout,
        });
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &Font<'_>) -> Size {
        StandardFontMetrics::measure(text, font)
    }

    fn draw_image(
        &mut self,
        image: &Image,
        src: Rect,
        dst: Rect,
        opacity: f64,
        interpolate: bool,
    ) -> Result<()> {
        self.record(Command::Image {
            image_id: image.id(),
            src,
            dst,
            opacity,
            interpolate,
        });
        Ok(())
    }

    fn set_clip(&mut self, rect: Rect) -> Result<bool> {
        if !self.supports_clipping {
            return Ok(false);
        }
        self.clip_stack.push(rect);
        self.record(Command::SetClip(rect));
        Ok(true)
    }

    fn reset_clip(&mut self) -> Result<()> {
        if self.clip_stack.pop().is_none() {
            panic!("reset_clip underflow in RecordingContext");
        }
        self.record(Command::ResetClip);
        Ok(())
    }

    fn clean_up(&mut self) {
        self.record(Command::CleanUp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotweave_render::RenderContextExt;

    #[test]
    fn tracks_clip_depth() {
        let mut rc = RecordingContext::new();
        let clip = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rc.set_clip(clip).unwrap());
        rc.draw_rectangle(clip, Color::RED, Color::BLACK, 1.0).unwrap();
        rc.reset_clip().unwrap();

        let depths: Vec<_> = rc.events().iter().map(|e| e.clip_depth).collect();
        assert_eq!(depths, vec![1, 1, 0]);
        assert_eq!(rc.current_clip(), None);
    }

    #[test]
    fn without_clipping_reports_no_support() {
        let mut rc = RecordingContext::without_clipping();
        assert!(!rc.set_clip(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap());
        assert_eq!(rc.events().len(), 0);
    }

    #[test]
    fn text_is_laid_out_with_standard_metrics() {
        let mut rc = RecordingContext::new();
        let font = Font::new("Arial", 10.0);
        rc.draw_text(
            ScreenPoint::new(50.0, 50.0),
            "Hi",
            Color::BLACK,
            &font,
            0.0,
            HorizontalAlignment::Center,
            VerticalAlignment::Top,
            None,
        )
        .unwrap();
        let Some(Command::Text { layout, .. }) = rc.commands().next() else {
            panic!("expected a text command");
        };
        assert_eq!(layout.size, rc.measure_text("Hi", &font));
        assert!(layout.offset.x < 0.0);
    }

    #[test]
    fn scoped_clip_is_balanced() {
        let mut rc = RecordingContext::new();
        rc.with_clip(Rect::new(0.0, 0.0, 5.0, 5.0), |rc, clipped| {
            assert!(clipped);
            rc.draw_line(
                &[ScreenPoint::ORIGIN, ScreenPoint::new(1.0, 1.0)],
                Color::BLACK,
                1.0,
                None,
                LineJoin::Round,
                false,
            )
        })
        .unwrap();
        assert_eq!(rc.clip_depth(), 0);
    }

    #[test]
    #[should_panic(expected = "reset_clip underflow")]
    fn unbalanced_reset_panics() {
        let mut rc = RecordingContext::new();
        let _ = rc.reset_clip();
    }
}
