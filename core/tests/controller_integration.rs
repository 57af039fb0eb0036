//! Rendering scenarios driven through the controller with a recording surface.

use xbattbar_rs_core::{
    BarController, BarError, BarEvent, BarGeometry, BarRenderer, PackedColor, Palette, PopupState,
    PowerStatus, Rect, Result, ScreenEdge, Surface, Target, TextExtents, WindowEvent,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fill(Target, PackedColor, Rect),
    TextColors(PackedColor, PackedColor),
    Measure(String),
    Text(Target, i16, i16, String),
    Resize(Target, Rect),
    Show(Target),
    Hide(Target),
}

#[derive(Default)]
struct RecordingSurface {
    calls: Vec<Call>,
    fail_measure: bool,
}

impl RecordingSurface {
    fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for RecordingSurface {
    fn fill_rectangle(&mut self, target: Target, color: PackedColor, rect: Rect) -> Result<()> {
        self.calls.push(Call::Fill(target, color, rect));
        Ok(())
    }

    fn set_text_colors(&mut self, foreground: PackedColor, background: PackedColor) -> Result<()> {
        self.calls.push(Call::TextColors(foreground, background));
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> Result<TextExtents> {
        self.calls.push(Call::Measure(text.to_owned()));
        if self.fail_measure {
            return Err(BarError::draw("font gone"));
        }
        Ok(TextExtents {
            width: 10 * text.len() as u16,
            ascent: 15,
            descent: 5,
        })
    }

    fn draw_text(&mut self, target: Target, x: i16, y: i16, text: &str) -> Result<()> {
        self.calls.push(Call::Text(target, x, y, text.to_owned()));
        Ok(())
    }

    fn resize_window(&mut self, target: Target, rect: Rect) -> Result<()> {
        self.calls.push(Call::Resize(target, rect));
        Ok(())
    }

    fn show_window(&mut self, target: Target) -> Result<()> {
        self.calls.push(Call::Show(target));
        Ok(())
    }

    fn hide_window(&mut self, target: Target) -> Result<()> {
        self.calls.push(Call::Hide(target));
        Ok(())
    }
}

fn controller(edge: ScreenEdge) -> BarController<RecordingSurface> {
    let geometry = BarGeometry::new(edge, 4, 800, 600);
    BarController::new(
        BarRenderer::new(geometry, Palette::default()),
        RecordingSurface::default(),
    )
}

const GRAY: PackedColor = PackedColor::new(128, 128, 128, 255);

#[test]
fn test_absent_status_fills_placeholder_once() {
    for (edge, full) in [
        (ScreenEdge::Bottom, Rect::new(0, 0, 800, 4)),
        (ScreenEdge::Top, Rect::new(0, 0, 800, 4)),
        (ScreenEdge::Left, Rect::new(0, 0, 4, 600)),
        (ScreenEdge::Right, Rect::new(0, 0, 4, 600)),
    ] {
        let mut bar = controller(edge);
        bar.handle(BarEvent::Window(WindowEvent::Expose)).unwrap();
        assert_eq!(
            bar.surface_mut().take(),
            vec![Call::Fill(Target::Bar, GRAY, full)],
            "edge {edge}"
        );
    }
}

#[test]
fn test_failed_poll_falls_back_to_placeholder() {
    let mut bar = controller(ScreenEdge::Bottom);
    bar.handle(BarEvent::Status(Some(PowerStatus::without_estimate(0.5, false))))
        .unwrap();
    bar.surface_mut().take();

    bar.handle(BarEvent::Status(None)).unwrap();
    assert!(bar.state().current.is_none());
    assert_eq!(
        bar.surface_mut().take(),
        vec![Call::Fill(Target::Bar, GRAY, Rect::new(0, 0, 800, 4))]
    );
}

#[test]
fn test_full_and_charging() {
    let mut bar = controller(ScreenEdge::Bottom);
    bar.handle(BarEvent::Status(Some(PowerStatus::without_estimate(1.0, true))))
        .unwrap();
    assert_eq!(
        bar.surface_mut().take(),
        vec![
            Call::Fill(Target::Bar, PackedColor::from_argb(0xFF00_88FF), Rect::new(0, 0, 800, 4)),
            Call::Fill(Target::Bar, PackedColor::from_argb(0xFF00_4488), Rect::new(800, 0, 0, 4)),
        ]
    );
}

#[test]
fn test_vertical_bar_fills_from_bottom() {
    let mut bar = controller(ScreenEdge::Right);
    bar.handle(BarEvent::Status(Some(PowerStatus::without_estimate(0.25, true))))
        .unwrap();
    let calls = bar.surface_mut().take();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Call::Fill(_, _, rect) if rect == Rect::new(0, 450, 4, 150)));
    assert!(matches!(calls[1], Call::Fill(_, _, rect) if rect == Rect::new(0, 0, 4, 450)));
}

#[test]
fn test_out_of_range_levels_clamp() {
    let mut low = controller(ScreenEdge::Top);
    let mut zero = controller(ScreenEdge::Top);
    low.handle(BarEvent::Status(Some(PowerStatus::without_estimate(-0.3, false))))
        .unwrap();
    zero.handle(BarEvent::Status(Some(PowerStatus::without_estimate(0.0, false))))
        .unwrap();
    assert_eq!(low.surface_mut().take(), zero.surface_mut().take());

    let mut high = controller(ScreenEdge::Top);
    let mut one = controller(ScreenEdge::Top);
    high.handle(BarEvent::Status(Some(PowerStatus::without_estimate(1.7, false))))
        .unwrap();
    one.handle(BarEvent::Status(Some(PowerStatus::without_estimate(1.0, false))))
        .unwrap();
    assert_eq!(high.surface_mut().take(), one.surface_mut().take());
}

#[test]
fn test_hover_shows_popup_with_label() {
    let mut bar = controller(ScreenEdge::Bottom);
    bar.handle(BarEvent::Status(Some(PowerStatus::without_estimate(0.42, false))))
        .unwrap();
    bar.surface_mut().take();

    bar.handle(BarEvent::Window(WindowEvent::PointerEnter)).unwrap();
    assert_eq!(bar.state().popup.state(), PopupState::Visible);

    let label = "Charge level: 42%".to_owned();
    let calls = bar.surface_mut().take();
    assert_eq!(calls[0], Call::Show(Target::Popup));
    assert_eq!(
        &calls[3..],
        &[
            Call::TextColors(PackedColor::BLACK, PackedColor::WHITE),
            Call::Measure(label.clone()),
            // 170 + 10 wide, 15 + 5 + 10 tall, centered on 800x600
            Call::Resize(Target::Popup, Rect::new(310, 285, 180, 30)),
            Call::Text(Target::Popup, 5, 20, label),
        ]
    );

    // A second enter is a no-op
    bar.handle(BarEvent::Window(WindowEvent::PointerEnter)).unwrap();
    assert!(bar.surface_mut().take().is_empty());

    bar.handle(BarEvent::Window(WindowEvent::PointerLeave)).unwrap();
    assert_eq!(bar.surface_mut().take(), vec![Call::Hide(Target::Popup)]);
    assert_eq!(bar.state().popup.state(), PopupState::Hidden);

    bar.handle(BarEvent::Window(WindowEvent::PointerLeave)).unwrap();
    assert!(bar.surface_mut().take().is_empty());
}

#[test]
fn test_map_redraw_keeps_popup_state() {
    let mut bar = controller(ScreenEdge::Bottom);
    bar.handle(BarEvent::Window(WindowEvent::Map)).unwrap();
    assert_eq!(bar.state().popup.state(), PopupState::Hidden);
    assert_eq!(bar.surface_mut().take().len(), 1);
}

#[test]
fn test_draw_error_aborts_only_current_pass() {
    let mut bar = controller(ScreenEdge::Bottom);
    bar.handle(BarEvent::Status(Some(PowerStatus::without_estimate(0.5, false))))
        .unwrap();
    bar.handle(BarEvent::Window(WindowEvent::PointerEnter)).unwrap();
    bar.surface_mut().take();

    bar.surface_mut().fail_measure = true;
    let err = bar
        .handle(BarEvent::Window(WindowEvent::Expose))
        .unwrap_err();
    assert!(matches!(err, BarError::Draw { .. }));
    let calls = bar.surface_mut().take();
    assert!(!calls.iter().any(|c| matches!(c, Call::Text(..))));

    bar.surface_mut().fail_measure = false;
    bar.handle(BarEvent::Window(WindowEvent::Expose)).unwrap();
    let calls = bar.surface_mut().take();
    assert!(calls.iter().any(|c| matches!(c, Call::Text(..))));
}

#[tokio::test]
async fn test_run_drains_channel() {
    let bar = controller(ScreenEdge::Bottom);
    let (tx, rx) = tokio::sync::mpsc::channel(4);
    tx.send(BarEvent::Window(WindowEvent::Expose)).await.unwrap();
    drop(tx);
    // Returns once the sender is gone
    bar.run(rx).await;
}
