//! Colours and default styles for the linked views.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use foundation::ids::ClusterId;
use serde::{Serialize, Serializer};

/// 8-bit sRGB colour, serialized as `"#rrggbb"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
pub const LIME: Rgb = Rgb::new(0x00, 0xff, 0x00);
pub const GREY: Rgb = Rgb::new(0x80, 0x80, 0x80);
pub const ORANGE: Rgb = Rgb::new(0xff, 0xa5, 0x00);
pub const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);
pub const YELLOW: Rgb = Rgb::new(0xff, 0xff, 0x00);
pub const SILVER: Rgb = Rgb::new(0xc0, 0xc0, 0xc0);

pub const EDGE_LOW: Rgb = Rgb::new(0xff, 0x1a, 0x1a);
pub const EDGE_HIGH: Rgb = Rgb::new(0x1a, 0x1a, 0xff);

/// The ten-colour categorical scheme used for per-cluster line colours.
pub const CATEGORY10: [Rgb; 10] = [
    Rgb::new(0x1f, 0x77, 0xb4),
    Rgb::new(0xff, 0x7f, 0x0e),
    Rgb::new(0x2c, 0xa0, 0x2c),
    Rgb::new(0xd6, 0x27, 0x28),
    Rgb::new(0x94, 0x67, 0xbd),
    Rgb::new(0x8c, 0x56, 0x4b),
    Rgb::new(0xe3, 0x77, 0xc2),
    Rgb::new(0x7f, 0x7f, 0x7f),
    Rgb::new(0xbc, 0xbd, 0x22),
    Rgb::new(0x17, 0xbe, 0xcf),
];

/// Assigns categorical colours to clusters in ascending id order, cycling
/// after ten.
pub fn categorical(clusters: &BTreeSet<ClusterId>) -> BTreeMap<ClusterId, Rgb> {
    clusters
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, CATEGORY10[i % CATEGORY10.len()]))
        .collect()
}

/// Linear colour scale over a numeric domain, clamped at both ends.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearScale {
    pub min: f64,
    pub max: f64,
    pub from: Rgb,
    pub to: Rgb,
}

impl LinearScale {
    pub fn new(min: f64, max: f64, from: Rgb, to: Rgb) -> Self {
        Self { min, max, from, to }
    }

    /// Scale spanning the range of `values`; `None` when empty.
    pub fn spanning(values: impl IntoIterator<Item = f64>, from: Rgb, to: Rgb) -> Option<Self> {
        let (min, max) = values.into_iter().fold(None, |acc: Option<(f64, f64)>, v| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            })
        })?;
        Some(Self::new(min, max, from, to))
    }

    pub fn color(&self, value: f64) -> Rgb {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.from;
        }
        self.from.lerp(self.to, (value - self.min) / span)
    }

    /// Matrix cell colours: yellow at 1 to red at 100.
    pub fn cell_counts() -> Self {
        Self::new(1.0, 100.0, YELLOW, RED)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub color: Rgb,
    pub size: f64,
}

pub const NODE_DEFAULT: NodeStyle = NodeStyle {
    color: ORANGE,
    size: 3.0,
};
pub const NODE_SELECTED: NodeStyle = NodeStyle {
    color: RED,
    size: 4.0,
};
pub const NODE_SENTINEL: NodeStyle = NodeStyle {
    color: SILVER,
    size: 3.0,
};

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: Rgb,
    pub weight: f64,
}

pub const LINE_DEFAULT_WEIGHT: f64 = 2.0;
pub const LINE_SENTINEL: LineStyle = LineStyle {
    color: WHITE,
    weight: LINE_DEFAULT_WEIGHT,
};
pub const LINE_SELECTED: LineStyle = LineStyle {
    color: LIME,
    weight: 5.0,
};
/// Cluster-mates of lassoed lines.
pub const LINE_MEMBER: LineStyle = LineStyle {
    color: GREY,
    weight: 3.0,
};
pub const LINE_FADED: LineStyle = LineStyle {
    color: GREY,
    weight: 1.0,
};

pub const EDGE_SIZE: f64 = 1.0;

pub const CELL_SELECTED_STROKE: Rgb = LIME;
pub const CELL_FADED_OPACITY: f64 = 0.3;
