#![forbid(unsafe_code)]

//! Pure placement geometry.
//!
//! These functions compute margins and offsets from measured boxes and
//! never touch the document, so [`Marker::place`](crate::Marker::place)
//! stays idempotent: every call starts again from the marker's natural
//! margins captured at build time.
//!
//! # Invariants
//!
//! 1. `left`/`right` positions center vertically with `margin-top = -h/2`.
//! 2. `top`/`bottom` positions center horizontally with `margin-left = -w/2`,
//!    shifted (never clipped) so the marker stays inside the viewport.
//! 3. Overlay offsets keep exactly `spacing` pixels between the marker and
//!    the anchor on the side named by the position.

use waymark_core::geometry::{Point, Rect, Sides, Size};

use crate::placement::Position;

/// Perpendicular-axis centering shared by inline and sibling placement.
///
/// `anchor` is the anchor's document box; the marker is assumed to be laid
/// out from the anchor's horizontal center (CSS `left: 50%`).
#[must_use]
pub fn centering_margin(
    position: Position,
    marker: Size,
    anchor: Rect,
    viewport: Rect,
    base: Sides,
) -> Sides {
    let mut margin = base;
    if position.is_vertical_edge() {
        margin.top = -marker.height / 2.0;
    } else if position.is_horizontal_edge() {
        let mut left = -marker.width / 2.0;

        let overflow_right = anchor.center_x() + left + marker.width - viewport.right();
        if overflow_right > 0.0 {
            left -= overflow_right;
        }
        // Left edge wins when the marker is wider than the viewport.
        let overflow_left = viewport.left() - (anchor.center_x() + left);
        if overflow_left > 0.0 {
            left += overflow_left;
        }
        margin.left = left;
    }
    margin
}

/// Sibling-placement correction for the anchor's own margin.
///
/// When the anchor carries a positive margin on the side the marker abuts,
/// the marker's facing margin is pulled back by exactly that amount,
/// relative to the marker's natural margin.
#[must_use]
pub fn sibling_margin(position: Position, anchor_margin: Sides, natural: Sides) -> Sides {
    let mut margin = natural;
    if position.is_right_side() && anchor_margin.right > 0.0 {
        margin.left = natural.left - anchor_margin.right;
    } else if position.is_left_side() && anchor_margin.left > 0.0 {
        margin.right = natural.right - anchor_margin.left;
    }
    margin
}

/// Absolute document offset of an overlay marker.
#[must_use]
pub fn overlay_offset(position: Position, anchor: Rect, marker: Size, spacing: f64) -> Point {
    let above = anchor.top() - marker.height - spacing;
    let below = anchor.bottom() + spacing;
    let before = anchor.left() - marker.width - spacing;
    let after = anchor.right() + spacing;
    let center_x = anchor.center_x() - marker.width / 2.0;
    let center_y = anchor.center_y() - marker.height / 2.0;

    match position {
        Position::TopLeft => Point::new(before, above),
        Position::Top => Point::new(center_x, above),
        Position::TopRight => Point::new(after, above),
        Position::Right => Point::new(after, center_y),
        Position::BottomRight => Point::new(after, below),
        Position::Bottom => Point::new(center_x, below),
        Position::BottomLeft => Point::new(before, below),
        Position::Left => Point::new(before, center_y),
    }
}

/// Horizontal distance between the marker's center and the anchor's center.
#[must_use]
pub fn arrow_drift(marker: Rect, anchor: Rect) -> f64 {
    (marker.center_x() - anchor.center_x()).abs()
}

/// Arrow offset, relative to the marker's left edge, that points at the
/// anchor's horizontal center. Clamped to the marker's own width.
#[must_use]
pub fn arrow_left(marker: Rect, anchor: Rect, arrow_width: f64) -> f64 {
    let max = (marker.width - arrow_width).max(0.0);
    (anchor.center_x() - marker.left() - arrow_width / 2.0).clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    #[test]
    fn vertical_edges_center_on_height() {
        let m = centering_margin(
            Position::Left,
            Size::new(30.0, 20.0),
            Rect::new(100.0, 100.0, 200.0, 50.0),
            VIEWPORT,
            Sides::ZERO,
        );
        assert_eq!(m.top, -10.0);
        assert_eq!(m.left, 0.0);
    }

    #[test]
    fn horizontal_edges_center_on_width() {
        let m = centering_margin(
            Position::Bottom,
            Size::new(30.0, 20.0),
            Rect::new(100.0, 100.0, 200.0, 50.0),
            VIEWPORT,
            Sides::ZERO,
        );
        assert_eq!(m.left, -15.0);
        assert_eq!(m.top, 0.0);
    }

    #[test]
    fn clamps_against_left_edge() {
        // Anchor center at x=10, marker 60 wide would start at -20.
        let m = centering_margin(
            Position::Top,
            Size::new(60.0, 20.0),
            Rect::new(0.0, 100.0, 20.0, 20.0),
            VIEWPORT,
            Sides::ZERO,
        );
        assert_eq!(m.left, -10.0);
    }

    #[test]
    fn clamps_against_right_edge() {
        // Anchor center at x=990, marker 60 wide would end at 1020.
        let m = centering_margin(
            Position::Bottom,
            Size::new(60.0, 20.0),
            Rect::new(980.0, 100.0, 20.0, 20.0),
            VIEWPORT,
            Sides::ZERO,
        );
        assert_eq!(m.left, -50.0);
    }

    #[test]
    fn corners_are_not_centered() {
        let base = Sides::new(1.0, 2.0, 3.0, 4.0);
        let m = centering_margin(
            Position::TopLeft,
            Size::new(60.0, 20.0),
            Rect::new(100.0, 100.0, 20.0, 20.0),
            VIEWPORT,
            base,
        );
        assert_eq!(m, base);
    }

    #[test]
    fn sibling_right_pulls_back_by_anchor_margin() {
        let natural = Sides::horizontal(4.0, 2.0);
        let m = sibling_margin(Position::Right, Sides::new(0.0, 12.0, 0.0, 0.0), natural);
        assert_eq!(m.left, -8.0);
        assert_eq!(m.right, 2.0);
    }

    #[test]
    fn sibling_left_pulls_back_by_anchor_margin() {
        let natural = Sides::horizontal(4.0, 2.0);
        let m = sibling_margin(Position::BottomLeft, Sides::new(0.0, 0.0, 0.0, 6.0), natural);
        assert_eq!(m.right, -4.0);
        assert_eq!(m.left, 4.0);
    }

    #[test]
    fn sibling_ignores_non_positive_margin() {
        let natural = Sides::horizontal(4.0, 2.0);
        let m = sibling_margin(Position::Right, Sides::new(0.0, -5.0, 0.0, 0.0), natural);
        assert_eq!(m, natural);
        let m = sibling_margin(Position::Top, Sides::all(10.0), natural);
        assert_eq!(m, natural);
    }

    #[test]
    fn overlay_right_snaps_beside_anchor() {
        let anchor = Rect::new(100.0, 200.0, 80.0, 40.0);
        let p = overlay_offset(Position::Right, anchor, Size::new(24.0, 16.0), 15.0);
        assert_eq!(p.x, 100.0 + 80.0 + 15.0);
        assert_eq!(p.y, 200.0 + 20.0 - 8.0);
    }

    #[test]
    fn overlay_top_sits_above_centered() {
        let anchor = Rect::new(100.0, 200.0, 80.0, 40.0);
        let p = overlay_offset(Position::Top, anchor, Size::new(24.0, 16.0), 15.0);
        assert_eq!(p.y, 200.0 - 16.0 - 15.0);
        assert_eq!(p.x, 140.0 - 12.0);
    }

    #[test]
    fn overlay_corners_clear_both_axes() {
        let anchor = Rect::new(100.0, 200.0, 80.0, 40.0);
        let size = Size::new(24.0, 16.0);
        let p = overlay_offset(Position::BottomLeft, anchor, size, 10.0);
        assert_eq!(p, Point::new(100.0 - 24.0 - 10.0, 240.0 + 10.0));
        let p = overlay_offset(Position::TopRight, anchor, size, 10.0);
        assert_eq!(p, Point::new(190.0, 200.0 - 16.0 - 10.0));
    }

    #[test]
    fn arrow_points_at_anchor_center() {
        let marker = Rect::new(0.0, 0.0, 100.0, 20.0);
        let anchor = Rect::new(10.0, 40.0, 20.0, 20.0);
        assert_eq!(arrow_drift(marker, anchor), 30.0);
        assert_eq!(arrow_left(marker, anchor, 10.0), 15.0);
        let far = Rect::new(400.0, 40.0, 20.0, 20.0);
        assert_eq!(arrow_left(marker, far, 10.0), 90.0);
    }
}
