use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Longitude spread above which a trajectory is treated as wrapping.
pub const ANTIMERIDIAN_SPAN_DEG: f64 = 180.0;

/// `max(lon) - min(lon)` over the sequence, or `None` when it is empty.
pub fn longitude_span(coords: &[LatLon]) -> Option<f64> {
    let first = coords.first()?;
    let (min, max) = coords
        .iter()
        .skip(1)
        .fold((first.lon, first.lon), |(lo, hi), c| (lo.min(c.lon), hi.max(c.lon)));
    Some(max - min)
}

pub fn crosses_antimeridian(coords: &[LatLon]) -> bool {
    longitude_span(coords).is_some_and(|span| span > ANTIMERIDIAN_SPAN_DEG)
}

/// Makes a trajectory that wraps across ±180° continuous for rendering.
///
/// When the longitude spread exceeds 180°, every negative longitude is
/// shifted by +360°; otherwise the sequence is returned unchanged.
///
/// Trajectories are assumed to be geographically short. A path that really
/// spans more than half the globe is misread as wrapping and gets shifted
/// too; that is a known limitation of the heuristic.
pub fn normalize_antimeridian(coords: &[LatLon]) -> Vec<LatLon> {
    if !crosses_antimeridian(coords) {
        return coords.to_vec();
    }
    coords
        .iter()
        .map(|c| {
            if c.lon < 0.0 {
                LatLon::new(c.lat, c.lon + 360.0)
            } else {
                *c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LatLon, crosses_antimeridian, longitude_span, normalize_antimeridian};

    fn lons(coords: &[LatLon]) -> Vec<f64> {
        coords.iter().map(|c| c.lon).collect()
    }

    #[test]
    fn wrapping_trajectory_is_shifted_east() {
        let coords = [LatLon::new(60.0, 179.0), LatLon::new(61.0, -179.0)];
        assert!(crosses_antimeridian(&coords));
        let out = normalize_antimeridian(&coords);
        assert_eq!(lons(&out), vec![179.0, 181.0]);
        assert_eq!(out[1].lat, 61.0);
    }

    #[test]
    fn short_trajectory_is_unchanged() {
        let coords = [LatLon::new(40.0, 10.0), LatLon::new(41.0, 20.0)];
        assert_eq!(longitude_span(&coords), Some(10.0));
        assert_eq!(normalize_antimeridian(&coords), coords.to_vec());
    }

    #[test]
    fn exactly_half_globe_is_not_wrapping() {
        let coords = [LatLon::new(0.0, -90.0), LatLon::new(0.0, 90.0)];
        assert!(!crosses_antimeridian(&coords));
        assert_eq!(normalize_antimeridian(&coords), coords.to_vec());
    }

    #[test]
    fn empty_sequence_passes_through() {
        assert_eq!(longitude_span(&[]), None);
        assert!(normalize_antimeridian(&[]).is_empty());
    }
}
