// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Vec2};

/// Edge-inclusive point test of `bounds` shifted by `-offset`.
///
/// Shifting the point by `+offset` is equivalent and avoids building a rect.
pub(crate) fn contains_with_offset(bounds: Rect, offset: Vec2, pt: Point) -> bool {
    let p = pt + offset;
    let r = bounds.abs();
    r.x0 <= p.x && r.y0 <= p.y && p.x <= r.x1 && p.y <= r.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_inside() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains_with_offset(r, Vec2::ZERO, Point::new(0.0, 0.0)));
        assert!(contains_with_offset(r, Vec2::ZERO, Point::new(10.0, 10.0)));
        assert!(!contains_with_offset(r, Vec2::ZERO, Point::new(10.5, 5.0)));
    }

    #[test]
    fn offset_moves_bounds_toward_origin() {
        // Surface scrolled by (100, 50): an element at (100..110, 50..60) in
        // viewport space sits at (0..10, 0..10) on the surface.
        let r = Rect::new(100.0, 50.0, 110.0, 60.0);
        let off = Vec2::new(100.0, 50.0);
        assert!(contains_with_offset(r, off, Point::new(5.0, 5.0)));
        assert!(!contains_with_offset(r, off, Point::new(105.0, 55.0)));
    }

    #[test]
    fn flipped_rect_is_normalized() {
        let r = Rect::new(10.0, 10.0, 0.0, 0.0);
        assert!(contains_with_offset(r, Vec2::ZERO, Point::new(5.0, 5.0)));
    }
}
