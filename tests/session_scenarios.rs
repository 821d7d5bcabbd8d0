use std::path::Path;

use pocketpdf::inputs::{Button, ButtonReps};
use pocketpdf::pdf::{
    IRect, NEUTRAL_FILL, PageError, PageGeometry, Rect, Rotation, Session, ViewCommand,
};
use pocketpdf::settings::Settings;
use pocketpdf::test_utils::SyntheticRasterizer;
use pocketpdf::test_utils::test_helpers::FrameScriptBuilder;

const DOC: &str = "/library/manual.pdf";

fn press(button: Button) -> ButtonReps {
    ButtonReps::default().with(button, 1)
}

fn idle() -> ButtonReps {
    ButtonReps::default()
}

fn fast_scroll() -> Settings {
    Settings {
        fast_scroll: true,
        ..Settings::default()
    }
}

/// Run idle frames until the page banner is gone
fn settle<R: pocketpdf::pdf::Rasterizer>(session: &mut Session<R>, settings: &Settings) {
    for _ in 0..60 {
        session.update(&idle(), settings);
    }
}

#[test]
fn panning_down_one_step_renders_one_strip() {
    let raster = SyntheticRasterizer::new(3);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    assert_eq!(session.zoom().level(), 4);
    raster.clear_log();

    assert_eq!(session.update(&press(Button::Down), &settings), ViewCommand::MarkDirty);
    assert_eq!(session.offset(), (0, 16));
    assert_eq!(
        raster.rendered_regions(),
        vec![IRect::from_origin_size(0, 272, 480, 16)]
    );
}

#[test]
fn corrupt_page_shows_error_and_navigation_continues() {
    let raster = SyntheticRasterizer::new(5).with_corrupt_page(2);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    settle(&mut session, &settings);
    let page_one = session.front_buffer().pixels().to_vec();

    session.update(&press(Button::RTrigger), &settings);
    assert_eq!(session.update(&idle(), &settings), ViewCommand::MarkDirty);
    assert_eq!(session.current_page(), 2);
    assert!(matches!(session.page_error(), Some(PageError::Content(_))));
    assert_eq!(
        session.overlay(&settings).error.as_deref(),
        Some("Error in page 2: syntax error in content stream")
    );
    assert_eq!(session.front_buffer().pixels(), page_one.as_slice());

    // Panning a broken page is a no-op
    settle(&mut session, &settings);
    assert_eq!(session.update(&press(Button::Down), &settings), ViewCommand::None);

    session.update(&press(Button::RTrigger), &settings);
    session.update(&idle(), &settings);
    assert_eq!(session.current_page(), 3);
    assert!(session.page_error().is_none());
    assert!(session.overlay(&settings).error.is_none());
}

#[test]
fn toggling_fast_scroll_requests_reload() {
    let raster = SyntheticRasterizer::new(2);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();

    let toggled = fast_scroll();
    assert_eq!(session.update(&idle(), &toggled), ViewCommand::Reload);
    assert_eq!(session.update(&press(Button::Down), &toggled), ViewCommand::Reload);
    assert_eq!(session.offset(), (0, 0));

    session.reload(&toggled);
    assert_eq!(session.update(&idle(), &toggled), ViewCommand::MarkDirty);
    assert_eq!(session.cached_full_page(), Some((612, 792)));
}

#[test]
fn fast_scroll_caps_zoom_at_two() {
    let raster = SyntheticRasterizer::new(1);
    let settings = fast_scroll();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();

    for _ in 0..20 {
        session.update(&press(Button::Triangle), &settings);
        session.update(&idle(), &settings);
    }
    assert_eq!(session.zoom().level(), 14);
    assert_eq!(session.zoom().factor(), 2.0);
    assert_eq!(session.cached_full_page(), Some((1224, 1584)));
}

#[test]
fn zoom_clamps_at_both_table_ends() {
    let raster = SyntheticRasterizer::new(1);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();

    for _ in 0..30 {
        session.update(&press(Button::Triangle), &settings);
    }
    assert_eq!(session.zoom().level(), 24);
    assert_eq!(session.zoom().factor(), 16.0);

    for _ in 0..30 {
        session.update(&press(Button::Cross), &settings);
    }
    assert_eq!(session.zoom().level(), 0);
    assert_eq!(session.overlay(&settings).banner.unwrap().0, "Zoom 0.25x");
}

#[test]
fn zoom_keeps_page_point_at_corner() {
    let raster = SyntheticRasterizer::new(1);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    for frame in FrameScriptBuilder::new().tap(Button::Down, 5).tap(Button::Right, 2).build() {
        session.update(&frame, &settings);
    }
    assert_eq!(session.offset(), (32, 80));

    // 1.0 -> 1.1
    session.update(&press(Button::Triangle), &settings);
    assert_eq!(session.offset(), (35, 88));
}

#[test]
fn cache_and_incremental_paths_agree() {
    let script = FrameScriptBuilder::new()
        .hold(Button::Down, 30)
        .tap(Button::Right, 3)
        .tap(Button::Up, 2)
        .hold(Button::Left, 22)
        .build();

    let incremental_raster = SyntheticRasterizer::new(1);
    let cached_raster = SyntheticRasterizer::new(1);
    let plain = Settings::default();
    let fast = fast_scroll();
    let mut incremental = Session::open(&incremental_raster, Path::new(DOC), &plain, None).unwrap();
    let mut cached = Session::open(&cached_raster, Path::new(DOC), &fast, None).unwrap();

    for frame in &script {
        incremental.update(frame, &plain);
        cached.update(frame, &fast);
        assert_eq!(incremental.offset(), cached.offset());
        assert_eq!(incremental.front_buffer(), cached.front_buffer());
    }
    assert_eq!(cached_raster.stats().rendered, 1);
}

const A4: Rect = Rect::new(0.0, 0.0, 595.276, 841.89);

#[test]
fn cache_and_incremental_agree_at_far_edges() {
    let cases = [
        (PageGeometry::new(A4, Rotation::Deg0), Rotation::Deg0),
        (PageGeometry::new(A4, Rotation::Deg0), Rotation::Deg90),
        (PageGeometry::new(A4, Rotation::Deg90), Rotation::Deg270),
        (PageGeometry::new(A4, Rotation::Deg270), Rotation::Deg90),
        (PageGeometry::new(A4, Rotation::Deg180), Rotation::Deg90),
        (
            PageGeometry::new(Rect::new(12.3, 7.7, 620.1, 799.6), Rotation::Deg90),
            Rotation::Deg270,
        ),
    ];
    let script = FrameScriptBuilder::new()
        .hold(Button::Right, 80)
        .hold(Button::Down, 80)
        .tap(Button::Left, 2)
        .tap(Button::Up, 3)
        .hold(Button::Right, 30)
        .build();

    for (geometry, rotation) in cases {
        let incremental_raster = SyntheticRasterizer::new(1).with_geometry(geometry);
        let cached_raster = SyntheticRasterizer::new(1).with_geometry(geometry);
        let plain = Settings::default();
        let fast = fast_scroll();
        let mut incremental =
            Session::open(&incremental_raster, Path::new(DOC), &plain, None).unwrap();
        let mut cached = Session::open(&cached_raster, Path::new(DOC), &fast, None).unwrap();

        incremental.set_rotation(rotation);
        cached.set_rotation(rotation);
        incremental.update(&idle(), &plain);
        cached.update(&idle(), &fast);
        assert!(!cached.is_loading());

        let extent = incremental.page_extent().unwrap();
        assert_eq!(cached.page_extent(), Some(extent));
        assert_eq!(cached.cached_full_page(), Some(extent), "{geometry:?} {rotation:?}");

        let max = (extent.0 as i32 - 480, extent.1 as i32 - 272);
        let mut reached_corner = false;
        for frame in &script {
            incremental.update(frame, &plain);
            cached.update(frame, &fast);
            assert_eq!(incremental.offset(), cached.offset());
            reached_corner |= incremental.offset() == max;
            assert_eq!(
                incremental.front_buffer(),
                cached.front_buffer(),
                "{geometry:?} {rotation:?} at {:?}",
                incremental.offset()
            );
        }
        assert!(reached_corner, "{geometry:?} {rotation:?} never reached {max:?}");
    }
}

#[test]
fn resume_follows_a_shrunken_document() {
    let raster = SyntheticRasterizer::new(6);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    session.reload_page(5);
    session.update(&idle(), &settings);

    raster.set_page_count(3);
    session.notify_suspended();
    assert_eq!(session.update(&idle(), &settings), ViewCommand::MarkDirty);
    assert_eq!(session.page_count(), 3);
    assert_eq!(session.current_page(), 3);
    assert!(session.page_error().is_none());
}

#[test]
fn small_page_is_centered_in_fast_scroll() {
    let raster = SyntheticRasterizer::new(1)
        .with_geometry(PageGeometry::new(Rect::new(0.0, 0.0, 200.0, 100.0), Rotation::Deg0));
    let settings = fast_scroll();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    session.update(&press(Button::Down), &settings);

    assert_eq!(session.offset(), (0, 0));
    let front = session.front_buffer();
    assert_eq!(front.row(0)[0], NEUTRAL_FILL);
    // 200x100 centered on 480x272
    assert_eq!(front.row(85)[140], NEUTRAL_FILL);
    assert_eq!(front.row(86)[139], NEUTRAL_FILL);
    assert_ne!(front.row(86)[140], NEUTRAL_FILL);
    assert_ne!(front.row(185)[339], NEUTRAL_FILL);
    assert_eq!(front.row(185)[340], NEUTRAL_FILL);
    assert_eq!(front.row(186)[339], NEUTRAL_FILL);
}

#[test]
fn rotation_swaps_page_extent() {
    let raster = SyntheticRasterizer::new(1);
    let mut settings = Settings::default();
    settings.controls.rotate_clockwise = Some(Button::Square);
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();

    assert_eq!(session.update(&press(Button::Square), &settings), ViewCommand::MarkDirty);
    assert_eq!(session.rotation(), Rotation::Deg90);
    assert_eq!(session.page_extent(), Some((792, 612)));
    assert_eq!(session.current_page(), 1);
}

#[test]
fn menu_and_page_chooser_are_forwarded() {
    let raster = SyntheticRasterizer::new(1);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    assert_eq!(session.update(&press(Button::Start), &settings), ViewCommand::InvokeMenu);
    assert_eq!(
        session.update(&press(Button::Select), &settings),
        ViewCommand::InvokePageChooser
    );
}

#[test]
fn page_navigation_clamps_and_resets_vertical_offset() {
    let raster = SyntheticRasterizer::new(12);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    session.update(&press(Button::Down), &settings);
    session.update(&press(Button::Right), &settings);
    settle(&mut session, &settings);

    session.update(&press(Button::Square), &settings);
    assert_eq!(session.current_page(), 1);

    session.update(&press(Button::Circle), &settings);
    assert_eq!(session.current_page(), 11);
    assert_eq!(session.offset(), (16, 0));
    session.update(&idle(), &settings);
    settle(&mut session, &settings);

    session.update(&press(Button::Circle), &settings);
    assert_eq!(session.current_page(), 12);
}

#[test]
fn failed_resume_retries_every_sixty_frames() {
    let raster = SyntheticRasterizer::new(4);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    session.reload_page(3);
    session.update(&idle(), &settings);
    let before = session.front_buffer().pixels().to_vec();

    session.notify_suspended();
    raster.fail_opens(Some(|| pocketpdf::pdf::OpenError::corrupt("card removed")));
    assert_eq!(session.update(&idle(), &settings), ViewCommand::MarkDirty);
    assert!(session.is_resume_failed());
    assert_eq!(session.front_buffer().pixels(), before.as_slice());
    assert_eq!(raster.stats().closed, 1);

    for _ in 0..59 {
        assert_eq!(session.update(&idle(), &settings), ViewCommand::None);
    }
    raster.fail_opens(None);
    assert_eq!(session.update(&idle(), &settings), ViewCommand::MarkDirty);
    assert!(!session.is_resume_failed());
    assert_eq!(session.current_page(), 3);
    assert_eq!(raster.stats().opened, 2);
}

#[test]
fn resume_reopens_and_restores_position() {
    let raster = SyntheticRasterizer::new(4);
    let settings = Settings::default();
    let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
    session.update(&press(Button::Triangle), &settings);
    session.reload_page(2);
    session.update(&idle(), &settings);

    session.notify_suspended();
    assert_eq!(session.update(&idle(), &settings), ViewCommand::MarkDirty);
    assert_eq!(session.current_page(), 2);
    assert_eq!(session.zoom().level(), 5);

    let stats = raster.stats();
    assert_eq!((stats.opened, stats.closed), (2, 1));
}

#[test]
fn every_tile_is_released() {
    let raster = SyntheticRasterizer::new(3);
    let frames = FrameScriptBuilder::new()
        .hold(Button::Down, 25)
        .tap(Button::Triangle, 2)
        .tap(Button::Right, 4)
        .idle(60)
        .tap(Button::RTrigger, 1)
        .build();

    for settings in [Settings::default(), fast_scroll()] {
        let mut session = Session::open(&raster, Path::new(DOC), &settings, None).unwrap();
        for frame in &frames {
            session.update(frame, &settings);
        }
        drop(session);
    }
    let stats = raster.stats();
    assert_eq!(stats.released, stats.rendered);
    assert_eq!(stats.pages_loaded, stats.pages_dropped);
    assert_eq!(stats.opened, stats.closed);
}
