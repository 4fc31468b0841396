//! Spherical Web-Mercator projection into map pixel space.
//!
//! Pixel coordinates follow the slippy-map convention: 256 px tiles, origin
//! at the north-west corner, y growing southwards.

use serde::{Deserialize, Serialize};

use super::{LatLon, Vec2};

pub const TILE_SIZE_PX: f64 = 256.0;
/// Latitude limit where the projection becomes square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Map camera: zoom level plus the world-pixel position of the container's
/// top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub origin: Vec2,
}

impl Viewport {
    pub fn new(zoom: f64, origin: Vec2) -> Self {
        Self { zoom, origin }
    }

    /// Container pixel position of `coord`.
    pub fn to_container(&self, coord: LatLon) -> Vec2 {
        project(coord, self.zoom) - self.origin
    }
}

pub fn world_size_px(zoom: f64) -> f64 {
    TILE_SIZE_PX * zoom.exp2()
}

/// World pixel position of `coord` at `zoom`.
///
/// Longitudes outside [-180, 180] are projected linearly, so normalized
/// trajectories (longitudes up to 360) stay continuous.
pub fn project(coord: LatLon, zoom: f64) -> Vec2 {
    let size = world_size_px(zoom);
    let lat = coord.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (coord.lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    Vec2::new(x, y)
}
