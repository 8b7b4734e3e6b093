//! Aspect-preserving placement of a source frame inside a fixed target box.
//!
//! The frame is always scaled uniformly and centered. With
//! [`FitMode::Letterbox`] it is scaled until it touches the target on one
//! axis and the remainder becomes pad bars. With [`FitMode::Fill`] it is
//! scaled until it covers the target and the overflow is cropped.

/// How a frame is fitted into the target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Whole frame visible, pad bars fill the rest.
    #[default]
    Letterbox,
    /// Target fully covered, overflow cropped symmetrically.
    Fill,
}

/// Where a scaled frame lands on the target canvas.
///
/// Offsets are negative when the frame overflows the canvas (fill mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitLayout {
    /// Horizontal offset of the scaled frame.
    pub x: i64,
    /// Vertical offset of the scaled frame.
    pub y: i64,
    /// Width of the scaled frame.
    pub width: u32,
    /// Height of the scaled frame.
    pub height: u32,
}

impl FitLayout {
    /// Compute the placement of a `source_width × source_height` frame on a
    /// `target_width × target_height` canvas.
    pub fn compute(
        mode: FitMode,
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        match mode {
            FitMode::Letterbox => {
                Self::letterbox(source_width, source_height, target_width, target_height)
            }
            FitMode::Fill => Self::fill(source_width, source_height, target_width, target_height),
        }
    }

    /// Letterbox placement.
    ///
    /// A relatively wider source spans the full target width and gets bars
    /// above and below; a relatively taller one spans the full height and
    /// gets bars left and right. Scaled sides are at least one pixel.
    pub fn letterbox(
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        if source_width == 0 || source_height == 0 {
            return Self::full(target_width, target_height);
        }

        let video_aspect = source_width as f64 / source_height as f64;
        let target_aspect = target_width as f64 / target_height as f64;

        if video_aspect > target_aspect {
            let height =
                ((target_width as f64 / video_aspect).round() as u32).clamp(1, target_height);
            Self {
                x: 0,
                y: i64::from((target_height - height) / 2),
                width: target_width,
                height,
            }
        } else {
            let width =
                ((target_height as f64 * video_aspect).round() as u32).clamp(1, target_width);
            Self {
                x: i64::from((target_width - width) / 2),
                y: 0,
                width,
                height: target_height,
            }
        }
    }

    /// Crop-to-fill placement.
    ///
    /// A relatively wider source spans the full target height and overflows
    /// left and right; a relatively taller one spans the full width and
    /// overflows top and bottom.
    pub fn fill(source_width: u32, source_height: u32, target_width: u32, target_height: u32) -> Self {
        if source_width == 0 || source_height == 0 {
            return Self::full(target_width, target_height);
        }

        let video_aspect = source_width as f64 / source_height as f64;
        let target_aspect = target_width as f64 / target_height as f64;

        if video_aspect > target_aspect {
            let width = ((target_height as f64 * video_aspect).round() as u32).max(target_width);
            Self {
                x: (i64::from(target_width) - i64::from(width)) / 2,
                y: 0,
                width,
                height: target_height,
            }
        } else {
            let height = ((target_width as f64 / video_aspect).round() as u32).max(target_height);
            Self {
                x: 0,
                y: (i64::from(target_height) - i64::from(height)) / 2,
                width: target_width,
                height,
            }
        }
    }

    fn full(target_width: u32, target_height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: target_width,
            height: target_height,
        }
    }

    /// Whether the frame exactly covers the canvas with nothing cropped.
    pub fn is_full_bleed(&self, target_width: u32, target_height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == target_width && self.height == target_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_aspect_has_no_padding() {
        let layout = FitLayout::letterbox(1280, 720, 160, 90);
        assert!(layout.is_full_bleed(160, 90));
        assert!(FitLayout::fill(1280, 720, 160, 90).is_full_bleed(160, 90));
    }

    #[test]
    fn wide_source_in_square_target_is_letterboxed() {
        let layout = FitLayout::letterbox(1280, 720, 100, 100);
        assert_eq!((layout.width, layout.height), (100, 56));
        assert_eq!((layout.x, layout.y), (0, 22));
    }

    #[test]
    fn tall_source_in_wide_target_is_pillarboxed() {
        let layout = FitLayout::letterbox(720, 1280, 320, 180);
        assert_eq!((layout.width, layout.height), (101, 180));
        assert_eq!((layout.x, layout.y), (109, 0));
    }

    #[test]
    fn wide_source_fill_overflows_horizontally() {
        let layout = FitLayout::compute(FitMode::Fill, 1280, 720, 100, 100);
        assert_eq!((layout.width, layout.height), (178, 100));
        assert_eq!((layout.x, layout.y), (-39, 0));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        let layout = FitLayout::letterbox(10_000, 1, 50, 50);
        assert_eq!((layout.width, layout.height), (50, 1));
    }

    #[test]
    fn degenerate_source_fills_target() {
        assert!(FitLayout::letterbox(0, 0, 64, 48).is_full_bleed(64, 48));
    }
}
