use flipbook_core::*;

#[test]
fn test_defaults() {
    let viewport = ViewportController::default();
    assert_eq!(viewport.zoom(), 1.0);
    assert_eq!(viewport.fit_mode(), FitMode::Auto);
}

#[test]
fn test_zoom_steps_and_clamps() {
    let mut viewport = ViewportController::default();
    viewport.zoom_in();
    assert_eq!(viewport.zoom(), 1.25);

    for _ in 0..20 {
        viewport.zoom_in();
    }
    assert_eq!(viewport.zoom(), 3.0);

    for _ in 0..20 {
        viewport.zoom_out();
    }
    assert_eq!(viewport.zoom(), 0.5);
}

#[test]
fn test_manual_zoom_overrides_fit() {
    let mut viewport = ViewportController::default();
    viewport.fit_width();
    assert_eq!(viewport.fit_mode(), FitMode::Width);

    viewport.zoom_out();
    assert_eq!(viewport.fit_mode(), FitMode::Auto);
    assert_eq!(viewport.zoom(), 0.75);
}

#[test]
fn test_fit_resets_zoom() {
    let mut viewport = ViewportController::default();
    viewport.zoom_in();
    viewport.zoom_in();
    viewport.fit_page();
    assert_eq!(viewport.fit_mode(), FitMode::Page);
    assert_eq!(viewport.zoom(), 1.0);
}

#[test]
fn test_set_zoom_snaps_to_steps() {
    let mut viewport = ViewportController::default();
    viewport.set_zoom(1.4);
    assert_eq!(viewport.zoom(), 1.5);
    viewport.set_zoom(10.0);
    assert_eq!(viewport.zoom(), 3.0);
    viewport.set_zoom(0.1);
    assert_eq!(viewport.zoom(), 0.5);
}

#[test]
fn test_display_scale_per_mode() {
    let mut viewport = ViewportController::default();
    let page = (500.0, 1000.0);
    let view = (2000.0, 800.0);

    viewport.fit_width();
    assert_eq!(viewport.display_scale(page, view, 2), 2.0);

    viewport.fit_page();
    assert_eq!(viewport.display_scale(page, view, 2), 0.8);

    viewport.set_zoom(1.5);
    assert_eq!(viewport.display_scale(page, view, 2), 1.5);
}
