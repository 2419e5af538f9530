//! Geographic window shown around a map marker on a character grid.

use crate::projection::MapMarker;

/// Zoom levels are tile zooms; a character grid is far coarser than a
/// 256px tile, so the window is widened by this many levels.
const GRID_ZOOM_OFFSET: i32 = 5;
const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Viewport {
    pub fn around(latitude: f64, longitude: f64, zoom: u8) -> Self {
        let half_width = (180.0 / 2_f64.powi(i32::from(zoom) - GRID_ZOOM_OFFSET)).min(180.0);
        // Character cells are about twice as tall as they are wide.
        let half_height = (half_width / 2.0).min(90.0);

        Self {
            x_bounds: window(longitude, half_width, 180.0),
            y_bounds: window(latitude, half_height, 90.0),
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.x_bounds[1] - self.x_bounds[0]) / 2.0
    }
}

/// A window of `half` around `center`, shifted to stay within `[-limit, limit]`.
fn window(center: f64, half: f64, limit: f64) -> [f64; 2] {
    let center = center.clamp(-limit + half, limit - half);
    [center - half, center + half]
}

/// Radius in degrees, never smaller than a few cells so it stays visible.
pub fn marker_radius(marker: &MapMarker, viewport: &Viewport) -> f64 {
    (marker.radius_meters / METERS_PER_DEGREE).max(viewport.half_width() / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(latitude: f64, longitude: f64) -> MapMarker {
        MapMarker {
            latitude,
            longitude,
            zoom: 13,
            radius_meters: 1000.0,
            title: "Your Location",
            popup: Vec::new(),
        }
    }

    #[test]
    fn viewport_centers_on_marker() {
        let viewport = Viewport::around(10.0, 20.0, 13);

        let center_x = (viewport.x_bounds[0] + viewport.x_bounds[1]) / 2.0;
        let center_y = (viewport.y_bounds[0] + viewport.y_bounds[1]) / 2.0;
        assert!((center_x - 20.0).abs() < 1e-9);
        assert!((center_y - 10.0).abs() < 1e-9);
        assert!(viewport.half_width() < 1.0);
    }

    #[test]
    fn viewport_shifts_at_the_edges() {
        let viewport = Viewport::around(89.9, 179.9, 13);

        assert!(viewport.x_bounds[0] < 179.9 && viewport.x_bounds[1] <= 180.0 + 1e-9);
        assert!(viewport.y_bounds[0] < 89.9 && viewport.y_bounds[1] <= 90.0 + 1e-9);
        assert!(viewport.x_bounds[1] - 179.9 < viewport.half_width());
    }

    #[test]
    fn low_zoom_shows_whole_world() {
        let viewport = Viewport::around(0.0, 0.0, 0);
        assert_eq!(viewport.x_bounds, [-180.0, 180.0]);
        assert_eq!(viewport.y_bounds, [-90.0, 90.0]);
    }

    #[test]
    fn marker_radius_stays_visible() {
        let marker = marker(0.0, 0.0);
        let zoomed = Viewport::around(0.0, 0.0, 13);
        let wide = Viewport::around(0.0, 0.0, 5);

        assert!(marker_radius(&marker, &zoomed) >= 1000.0 / METERS_PER_DEGREE);
        assert!((marker_radius(&marker, &wide) - 9.0).abs() < 1e-9);
    }
}
