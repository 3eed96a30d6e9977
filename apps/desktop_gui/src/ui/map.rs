//! Clickable coordinate pad standing in for a slippy map.
//!
//! Positions use Web Mercator pixel space, so a click lands on the same
//! coordinates a tiled map at the same zoom would report.

use std::f64::consts::PI;

use eframe::egui;
use shared::domain::Coordinates;

const TILE_SIZE: f64 = 256.0;
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;
pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 19;

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

/// Coordinates to world pixels at `zoom`.
pub fn project(position: Coordinates, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let latitude = position
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let x = (position.longitude + 180.0) / 360.0 * size;
    let y = (1.0 - (latitude.tan() + 1.0 / latitude.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// World pixels at `zoom` back to coordinates.
pub fn unproject(x: f64, y: f64, zoom: u8) -> Coordinates {
    let size = world_size(zoom);
    let longitude = x / size * 360.0 - 180.0;
    let latitude = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
    Coordinates::new(latitude, wrap_longitude(longitude))
}

fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: u8,
}

impl MapViewport {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn screen_to_coordinates(&self, rect: egui::Rect, pos: egui::Pos2) -> Coordinates {
        let (cx, cy) = project(self.center, self.zoom);
        let dx = f64::from(pos.x - rect.center().x);
        let dy = f64::from(pos.y - rect.center().y);
        unproject(cx + dx, cy + dy, self.zoom)
    }

    pub fn coordinates_to_screen(&self, rect: egui::Rect, position: Coordinates) -> egui::Pos2 {
        let (cx, cy) = project(self.center, self.zoom);
        let (px, py) = project(position, self.zoom);
        rect.center() + egui::vec2((px - cx) as f32, (py - cy) as f32)
    }

    pub fn pan_by(&mut self, delta: egui::Vec2) {
        let (cx, cy) = project(self.center, self.zoom);
        self.center = unproject(
            cx - f64::from(delta.x),
            cy - f64::from(delta.y),
            self.zoom,
        );
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }
}

pub struct MapResponse {
    pub clicked: Option<Coordinates>,
    pub panned: bool,
}

pub fn show_map(
    ui: &mut egui::Ui,
    viewport: &mut MapViewport,
    marker: Coordinates,
    height: f32,
) -> MapResponse {
    let size = egui::vec2(ui.available_width(), height);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    let visuals = ui.visuals();

    painter.rect_filled(rect, 8.0, visuals.extreme_bg_color);

    let grid_color = visuals.weak_text_color().gamma_multiply(0.25);
    let step = 64.0;
    let (cx, cy) = project(viewport.center, viewport.zoom);
    let offset_x = (-(cx as f32) + rect.width() / 2.0).rem_euclid(step);
    let offset_y = (-(cy as f32) + rect.height() / 2.0).rem_euclid(step);
    let mut x = rect.left() + offset_x;
    while x < rect.right() {
        painter.line_segment(
            [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
            egui::Stroke::new(1.0, grid_color),
        );
        x += step;
    }
    let mut y = rect.top() + offset_y;
    while y < rect.bottom() {
        painter.line_segment(
            [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
            egui::Stroke::new(1.0, grid_color),
        );
        y += step;
    }

    let marker_pos = viewport.coordinates_to_screen(rect, marker);
    if rect.contains(marker_pos) {
        painter.circle_filled(marker_pos, 7.0, egui::Color32::from_rgb(52, 203, 121));
        painter.circle_stroke(
            marker_pos,
            7.0,
            egui::Stroke::new(2.0, egui::Color32::WHITE),
        );
    }

    painter.text(
        rect.left_bottom() + egui::vec2(8.0, -8.0),
        egui::Align2::LEFT_BOTTOM,
        format!(
            "center {:.5}, {:.5}  zoom {}",
            viewport.center.latitude, viewport.center.longitude, viewport.zoom
        ),
        egui::FontId::monospace(11.0),
        visuals.weak_text_color(),
    );

    let mut panned = false;
    if response.dragged() {
        viewport.pan_by(response.drag_delta());
        panned = true;
    }

    let clicked = if response.clicked() {
        response
            .interact_pointer_pos()
            .map(|pos| viewport.screen_to_coordinates(rect, pos))
    } else {
        None
    };

    MapResponse { clicked, panned }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(600.0, 400.0))
    }

    fn close(a: Coordinates, b: Coordinates, tolerance: f64) -> bool {
        (a.latitude - b.latitude).abs() < tolerance && (a.longitude - b.longitude).abs() < tolerance
    }

    #[test]
    fn projection_round_trips() {
        let position = Coordinates::new(-23.5, -46.6);
        let (x, y) = project(position, 15);
        assert!(close(unproject(x, y, 15), position, 1e-9));
    }

    #[test]
    fn clicking_the_center_returns_the_center() {
        let viewport = MapViewport::new(Coordinates::new(-23.5, -46.6), 15);
        let clicked = viewport.screen_to_coordinates(rect(), rect().center());
        assert!(close(clicked, viewport.center, 1e-9));
    }

    #[test]
    fn screen_directions_match_compass() {
        let viewport = MapViewport::new(Coordinates::new(-23.5, -46.6), 15);
        let east = viewport.screen_to_coordinates(rect(), rect().center() + egui::vec2(50.0, 0.0));
        let north = viewport.screen_to_coordinates(rect(), rect().center() + egui::vec2(0.0, -50.0));
        assert!(east.longitude > viewport.center.longitude);
        assert!(north.latitude > viewport.center.latitude);
    }

    #[test]
    fn marker_lands_where_it_was_clicked() {
        let viewport = MapViewport::new(Coordinates::new(-23.5, -46.6), 15);
        let click = egui::pos2(420.0, 130.0);
        let position = viewport.screen_to_coordinates(rect(), click);
        let back = viewport.coordinates_to_screen(rect(), position);
        assert!((back.x - click.x).abs() < 0.01);
        assert!((back.y - click.y).abs() < 0.01);
    }

    #[test]
    fn panning_moves_center_against_drag() {
        let mut viewport = MapViewport::new(Coordinates::new(0.0, 0.0), 10);
        viewport.pan_by(egui::vec2(100.0, 0.0));
        assert!(viewport.center.longitude < 0.0);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut viewport = MapViewport::new(Coordinates::default(), MAX_ZOOM + 5);
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport.zoom_in();
        assert_eq!(viewport.zoom, MAX_ZOOM);

        let mut viewport = MapViewport::new(Coordinates::default(), MIN_ZOOM);
        viewport.zoom_out();
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }
}
