//! Property tests: rectangle algebra, clip containment, float clamping and
//! the opaque-blend identity.

use ember_tui::pipeline::{
    AbsolutePosition, AnchorPoint, FloatConfig, RenderContext, clamp_to_screen, resolve_rect,
};
use ember_tui::{FrameBuffer, Rect, Rgba, blend};
use proptest::prelude::*;

fn rect() -> impl Strategy<Value = Rect> {
    (-50i32..50, -50i32..50, -20i32..60, -20i32..60).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn anchor_point() -> impl Strategy<Value = AnchorPoint> {
    prop_oneof![
        Just(AnchorPoint::TopLeft),
        Just(AnchorPoint::TopCenter),
        Just(AnchorPoint::TopRight),
        Just(AnchorPoint::BottomLeft),
        Just(AnchorPoint::BottomCenter),
        Just(AnchorPoint::BottomRight),
        Just(AnchorPoint::LeftTop),
        Just(AnchorPoint::LeftCenter),
        Just(AnchorPoint::LeftBottom),
        Just(AnchorPoint::RightTop),
        Just(AnchorPoint::RightCenter),
        Just(AnchorPoint::RightBottom),
    ]
}

fn float_config() -> impl Strategy<Value = FloatConfig> {
    let offset = (-30i32..30, -30i32..30);
    prop_oneof![
        (anchor_point(), offset.clone())
            .prop_map(|(point, (dx, dy))| FloatConfig::anchored("anchor", point).offset(dx, dy)),
        (
            prop_oneof![
                Just(AbsolutePosition::Center),
                Just(AbsolutePosition::TopCenter),
                Just(AbsolutePosition::BottomCenter),
                Just(AbsolutePosition::Offset),
            ],
            offset,
        )
            .prop_map(|(pos, (dx, dy))| FloatConfig::absolute(pos).offset(dx, dy)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn self_intersection_is_identity(r in rect()) {
        prop_assume!(!r.is_empty());
        prop_assert_eq!(r.intersect(&r), r);
    }

    #[test]
    fn degenerate_rects_are_empty(x in -50i32..50, y in -50i32..50, w in -20i32..=0, h in 0i32..20) {
        prop_assert!(Rect::new(x, y, w, h).is_empty());
        prop_assert!(Rect::new(x, y, h, w).is_empty());
    }

    #[test]
    fn adjacent_rects_do_not_overlap(r in rect(), gap in 0i32..10) {
        prop_assume!(!r.is_empty());
        let right = Rect::new(r.right() + gap, r.y, r.width, r.height);
        let below = Rect::new(r.x, r.bottom() + gap, r.width, r.height);
        prop_assert!(r.intersect(&right).is_empty());
        prop_assert!(r.intersect(&below).is_empty());
    }

    #[test]
    fn intersection_lies_in_both(a in rect(), b in rect()) {
        let i = a.intersect(&b);
        prop_assert!(a.contains_rect(&i));
        prop_assert!(b.contains_rect(&i));
    }

    #[test]
    fn sub_context_clip_never_grows(
        outer in (0i32..40, 0i32..20, -10i32..50, -10i32..30),
        inner in (-20i32..40, -20i32..20, -10i32..50, -10i32..30),
        scroll in 0i32..20,
    ) {
        let mut buffer = FrameBuffer::new(40, 20);
        let mut root = RenderContext::root(&mut buffer);
        let screen = root.clip();

        let mut parent = root.sub_context(outer.0, outer.1, outer.2, outer.3);
        let parent_clip = parent.clip();
        prop_assert!(screen.contains_rect(&parent_clip));

        let plain = parent.sub_context(inner.0, inner.1, inner.2, inner.3).clip();
        prop_assert!(parent_clip.contains_rect(&plain));

        let overflow = parent.overflow_sub_context(inner.0, inner.1, inner.2, inner.3).clip();
        prop_assert_eq!(overflow, parent_clip);

        let scrolled = parent
            .scrolled_sub_context(inner.0, inner.1, inner.2, inner.3, scroll)
            .clip();
        prop_assert!(parent_clip.contains_rect(&scrolled));
    }

    #[test]
    fn clipped_text_stays_inside_clip(
        dx in -10i32..30,
        dy in -5i32..10,
        w in 0i32..20,
        text in "[a-z]{0,40}",
    ) {
        let mut buffer = FrameBuffer::new(30, 10);
        let clip = {
            let mut root = RenderContext::root(&mut buffer);
            let mut sub = root.sub_context(dx, dy, w, 1);
            sub.draw_text(0, 0, &text, Rgba::WHITE, ember_tui::Attr::NONE);
            sub.clip()
        };

        for (x, y, cell) in buffer.iter() {
            if cell.symbol != ' ' {
                prop_assert!(clip.contains(i32::from(x), i32::from(y)));
            }
        }
    }

    #[test]
    fn floats_are_clamped_on_screen(
        config in float_config(),
        size in (0i32..120, 0i32..60),
        anchor in proptest::option::of(rect()),
        screen in (1i32..100, 1i32..50),
    ) {
        let placed = resolve_rect(&config, size, anchor, screen);
        prop_assert!(Rect::new(0, 0, screen.0, screen.1).contains_rect(&placed));
        prop_assert!(placed.x >= 0 && placed.y >= 0);
        prop_assert!(placed.right() <= screen.0 && placed.bottom() <= screen.1);
    }

    #[test]
    fn clamping_keeps_fitting_rects(x in 0i32..50, y in 0i32..20, w in 0i32..30, h in 0i32..10) {
        let r = Rect::new(x, y, w, h);
        prop_assert_eq!(clamp_to_screen(r, 80, 30), r);
    }

    #[test]
    fn opaque_source_passes_through(
        src in (0u8..=255, 0u8..=255, 0u8..=255),
        dst in (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255),
    ) {
        let source = Rgba::rgb(src.0, src.1, src.2);
        let dest = Rgba::new(dst.0, dst.1, dst.2, dst.3);
        prop_assert_eq!(blend(Some(source), Some(dest), None), Some(source));
        prop_assert_eq!(blend(Some(source), None, Some(dest)), Some(source));
        prop_assert_eq!(Rgba::blend(source, dest), source);
    }
}
