use asu_heatmap::asu_heatmap_types::cartesian::{Point2d, Rect, Size};
use asu_heatmap::control::{MouseButton, RawUserEvent};
use asu_heatmap::layer::attribution::Attribution;
use asu_heatmap::render::Canvas;
use asu_heatmap::{AppState, Messenger};
use egui::{Align2, Color32, Event, FontId, Painter, Pos2, Sense, Ui, Vec2};

use crate::image_store::ImageStore;

const POPUP_PADDING: f32 = 6.0;
const POPUP_FONT_SIZE: f32 = 14.0;

/// Widget showing the map of an [`AppState`] and passing the user input to it.
pub struct EguiMap<'a> {
    state: &'a mut AppState,
    images: &'a ImageStore,
}

impl<'a> EguiMap<'a> {
    /// Creates the widget. Images are taken from the given store.
    pub fn new(state: &'a mut AppState, images: &'a ImageStore) -> Self {
        Self { state, images }
    }

    /// Shows the map in all available space of the `ui`.
    pub fn show_ui(&mut self, ui: &mut Ui) {
        let available_size = ui.available_size().floor();
        let (rect, response) = ui.allocate_exact_size(available_size, Sense::click_and_drag());

        self.state
            .set_size(Size::new(rect.width() as f64, rect.height() as f64));

        if response.contains_pointer() || response.dragged() || response.drag_stopped() {
            let (events, hover_pos) =
                ui.input(|input| (input.events.clone(), input.pointer.hover_pos()));
            let offset = [-rect.left(), -rect.top()];
            for event in &events {
                if let Some(raw_event) = convert_event(event, offset, hover_pos) {
                    self.state.handle_event(raw_event);
                }
            }
        }

        self.state.animate();
        if self.state.map().is_animating() {
            ui.ctx().request_repaint();
        }

        let mut canvas = EguiCanvas {
            painter: ui.painter_at(rect),
            origin: rect.min,
            size: Size::new(rect.width() as f64, rect.height() as f64),
            images: self.images,
        };
        self.state.render(&mut canvas);

        let attributions = self.state.attributions();
        if !attributions.is_empty() {
            egui::Window::new("Attributions")
                .collapsible(false)
                .title_bar(false)
                .anchor(Align2::RIGHT_BOTTOM, [-10., -10.])
                .auto_sized()
                .show(ui.ctx(), |ui| {
                    show_attributions(ui, &attributions);
                });
        }
    }
}

fn show_attributions(ui: &mut Ui, attributions: &[Attribution]) {
    ui.horizontal(|ui| {
        for (index, attribution) in attributions.iter().enumerate() {
            if index > 0 {
                ui.label(" | ");
            }

            match attribution.get_url() {
                Some(url) => ui.hyperlink_to(attribution.get_text(), url),
                None => ui.label(attribution.get_text()),
            };
        }
    });
}

fn convert_event(event: &Event, offset: [f32; 2], hover_pos: Option<Pos2>) -> Option<RawUserEvent> {
    let to_map_px = |position: Pos2| {
        Point2d::new(
            (position.x + offset[0]) as f64,
            (position.y + offset[1]) as f64,
        )
    };

    match event {
        Event::PointerButton {
            button, pressed, ..
        } => {
            let button = match button {
                egui::PointerButton::Primary => MouseButton::Left,
                egui::PointerButton::Secondary => MouseButton::Right,
                egui::PointerButton::Middle => MouseButton::Middle,
                _ => MouseButton::Other,
            };

            Some(match pressed {
                true => RawUserEvent::ButtonPressed(button),
                false => RawUserEvent::ButtonReleased(button),
            })
        }
        Event::PointerMoved(position) => Some(RawUserEvent::PointerMoved(to_map_px(*position))),
        Event::MouseWheel { delta, unit, .. } => {
            let zoom = match unit {
                egui::MouseWheelUnit::Point => delta[1] as f64 / 50.0,
                egui::MouseWheelUnit::Line => delta[1] as f64,
                egui::MouseWheelUnit::Page => delta[1] as f64 * 3.0,
            };

            if zoom.abs() < 0.0001 {
                return None;
            }

            Some(RawUserEvent::Scroll(zoom))
        }
        Event::Zoom(factor) if *factor > 0.0 => {
            let center = hover_pos?;
            Some(RawUserEvent::Zoom(1.0 / *factor as f64, to_map_px(center)))
        }
        _ => None,
    }
}

/// Paints the map with the egui painter.
struct EguiCanvas<'a> {
    painter: Painter,
    origin: Pos2,
    size: Size,
    images: &'a ImageStore,
}

impl EguiCanvas<'_> {
    fn to_screen(&self, point: Point2d) -> Pos2 {
        self.origin + Vec2::new(point.x as f32, point.y as f32)
    }
}

impl Canvas for EguiCanvas<'_> {
    fn size(&self) -> Size {
        self.size
    }

    fn draw_image(&mut self, source: &str, screen_rect: Rect, opacity: f32) {
        let Some(texture) = self.images.texture(source) else {
            return;
        };

        let rect = egui::Rect::from_min_max(
            self.to_screen(Point2d::new(screen_rect.x_min(), screen_rect.y_min())),
            self.to_screen(Point2d::new(screen_rect.x_max(), screen_rect.y_max())),
        );
        let uv = egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        self.painter
            .image(texture.id(), rect, uv, Color32::WHITE.gamma_multiply(opacity));
    }

    fn draw_popup(&mut self, anchor: Point2d, text: &str) {
        let galley = self.painter.layout_no_wrap(
            text.to_string(),
            FontId::proportional(POPUP_FONT_SIZE),
            Color32::BLACK,
        );
        let rect = Align2::CENTER_BOTTOM
            .anchor_size(self.to_screen(anchor), galley.size())
            .expand(POPUP_PADDING)
            .translate(Vec2::new(0.0, -POPUP_PADDING));

        self.painter.rect_filled(rect, 4.0, Color32::WHITE);
        self.painter.galley(
            rect.min + Vec2::splat(POPUP_PADDING),
            galley,
            Color32::BLACK,
        );
    }
}

/// Requests a repaint of the egui context when the map changes.
#[derive(Debug, Clone)]
pub struct MapStateMessenger {
    context: egui::Context,
}

impl MapStateMessenger {
    /// Creates a messenger for the context.
    pub fn new(context: egui::Context) -> Self {
        Self { context }
    }
}

impl Messenger for MapStateMessenger {
    fn request_redraw(&self) {
        log::trace!("Redraw requested");
        self.context.request_repaint();
    }
}
