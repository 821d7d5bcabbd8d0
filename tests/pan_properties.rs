use std::path::Path;

use pocketpdf::inputs::{Button, ButtonReps};
use pocketpdf::pdf::{
    CacheKey, FullPageCache, PageGeometry, PanEngine, Rasterizer, Rect, Rotation, ScreenSize, Session, TileRenderer,
    ViewportTransform, ZOOM_LEVELS,
};
use pocketpdf::settings::Settings;
use pocketpdf::test_utils::SyntheticRasterizer;
use proptest::prelude::*;

const SCREEN: ScreenSize = ScreenSize::new(64, 40);

fn rotation(quarter_turns: u8) -> Rotation {
    Rotation::from_degrees(i32::from(quarter_turns) * 90)
}

fn geometry() -> impl Strategy<Value = PageGeometry> {
    let media = prop::sample::select(vec![
        Rect::new(0.0, 0.0, 612.0, 792.0),
        Rect::new(0.0, 0.0, 595.276, 841.89),
        Rect::new(12.3, 7.7, 620.1, 799.6),
    ]);
    (media, 0u8..4).prop_map(|(media, turns)| PageGeometry::new(media, rotation(turns)))
}

fn button() -> impl Strategy<Value = Button> {
    prop::sample::select(Button::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn incremental_pans_match_full_render(
        level in 0usize..ZOOM_LEVELS.len(),
        turns in 0u8..4,
        geometry in geometry(),
        moves in prop::collection::vec((-90i32..90, -90i32..90), 1..10),
    ) {
        let raster = SyntheticRasterizer::new(1).with_geometry(geometry);
        let doc = raster.open(Path::new("prop.pdf")).unwrap();
        let page = raster.load_page(&doc, 0).unwrap();
        let transform = ViewportTransform::new(geometry, ZOOM_LEVELS[level], rotation(turns));
        let renderer = TileRenderer::new(&raster, &page, &transform);

        let mut panned = PanEngine::new(SCREEN);
        panned.redraw_full(&renderer).unwrap();
        let (mut x, mut y) = (0, 0);
        for (dx, dy) in moves {
            x += dx;
            y += dy;
            panned.pan_to(&renderer, x, y).unwrap();
        }

        let mut fresh = PanEngine::new(SCREEN);
        fresh.set_offset(x, y);
        fresh.redraw_full(&renderer).unwrap();

        prop_assert_eq!(panned.offset(), (x, y));
        prop_assert_eq!(panned.front(), fresh.front());
    }

    #[test]
    fn cache_blit_matches_viewport_render(
        level in 0usize..=14,
        turns in 0u8..4,
        geometry in geometry(),
        fx in 0.0f64..=1.0,
        fy in 0.0f64..=1.0,
    ) {
        let raster = SyntheticRasterizer::new(1).with_geometry(geometry);
        let doc = raster.open(Path::new("prop.pdf")).unwrap();
        let page = raster.load_page(&doc, 0).unwrap();
        let transform = ViewportTransform::new(geometry, ZOOM_LEVELS[level], rotation(turns));
        let renderer = TileRenderer::new(&raster, &page, &transform);

        let (max_x, max_y) = transform.max_offset(SCREEN.width, SCREEN.height);
        let x = (f64::from(max_x) * fx).round() as i32;
        let y = (f64::from(max_y) * fy).round() as i32;

        let mut cache = FullPageCache::new();
        let key = CacheKey { page: 1, zoom_level: level, rotation: rotation(turns) };
        cache.store(&raster, key, renderer.render_full_page().unwrap().into_inner());
        prop_assert_eq!(cache.dimensions(), Some(transform.page_extent()));

        let mut cached = PanEngine::new(SCREEN);
        prop_assert!(cached.redraw_from_cache(&cache, x, y));
        let mut rendered = PanEngine::new(SCREEN);
        rendered.set_offset(x, y);
        rendered.redraw_full(&renderer).unwrap();

        // Pages smaller than the screen are centered instead
        let (width, height) = transform.page_extent();
        if width >= SCREEN.width && height >= SCREEN.height {
            prop_assert_eq!(cached.front(), rendered.front());
        }
        cache.release(&raster);
    }

    #[test]
    fn session_view_stays_in_bounds(
        fast_scroll in any::<bool>(),
        frames in prop::collection::vec((button(), 1u32..30), 1..80),
    ) {
        let raster = SyntheticRasterizer::new(15);
        let mut settings = Settings {
            fast_scroll,
            screen: SCREEN,
            ..Settings::default()
        };
        settings.controls.rotate_clockwise = Some(Button::Select);
        let mut session = Session::open(&raster, Path::new("/prop/doc.pdf"), &settings, None).unwrap();

        for (button, count) in frames {
            session.update(&ButtonReps::default().with(button, count), &settings);

            let (x, y) = session.offset();
            prop_assert!((1..=15).contains(&session.current_page()));
            prop_assert!(session.zoom().level() < ZOOM_LEVELS.len());
            if fast_scroll {
                prop_assert!(session.zoom().factor() <= 2.0);
            }
            if let Some((width, height)) = session.page_extent() {
                let max_x = width.saturating_sub(SCREEN.width) as i32;
                let max_y = height.saturating_sub(SCREEN.height) as i32;
                prop_assert!((0..=max_x).contains(&x), "x {} outside 0..={}", x, max_x);
                prop_assert!((0..=max_y).contains(&y), "y {} outside 0..={}", y, max_y);
            }
        }

        drop(session);
        let stats = raster.stats();
        prop_assert_eq!(stats.released, stats.rendered);
    }
}
