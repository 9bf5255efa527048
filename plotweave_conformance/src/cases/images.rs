// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// The sample image whole, as a sub-rectangle, half transparent, and with
/// both sampling modes.
pub(super) struct ImageSubRectAndOpacity;

impl ConformanceCase for ImageSubRectAndOpacity {
    fn name(&self) -> &'static str {
        "image_sub_rect_and_opacity"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let image = sample_image();
        let whole = Rect::new(0.0, 0.0, 4.0, 2.0);
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        rc.draw_image(
            &image,
            whole,
            Rect::new(0.0, 0.0, half_w, half_h),
            1.0,
            false,
        )?;
        rc.draw_image(
            &image,
            whole,
            Rect::new(half_w, 0.0, width, half_h),
            1.0,
            true,
        )?;
        rc.draw_image(
            &image,
            Rect::new(1.0, 0.0, 3.0, 1.0),
            Rect::new(0.0, half_h, half_w, height),
            1.0,
            false,
        )?;
        rc.draw_image(
            &image,
            whole,
            Rect::new(half_w, half_h, width, height),
            0.5,
            false,
        )
    }
}

/// An image format no backend decodes to pixels. Backends that need pixels
/// skip it; SVG embeds the encoded bytes.
pub(super) struct UndecodableImage;

impl ConformanceCase for UndecodableImage {
    fn name(&self) -> &'static str {
        "image_undecodable"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let mut bmp = b"BM".to_vec();
        bmp.resize(26, 0);
        bmp[18] = 2;
        bmp[22] = 2;
        let image = Image::from_bytes(bmp)?;
        rc.draw_image(
            &image,
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, width, height),
            1.0,
            true,
        )
    }
}
