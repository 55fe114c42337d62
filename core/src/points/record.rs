use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single geotagged post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub timestamp: NaiveDateTime,
}

impl PointRecord {
    pub fn new(x: f64, y: f64, timestamp: NaiveDateTime) -> Self {
        Self { x, y, timestamp }
    }
}

/// Axis-aligned extent of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn from_points(points: &[PointRecord]) -> Option<Self> {
        let first = points.first()?;
        let seed = Self {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        Some(points.iter().fold(seed, |acc, p| Self {
            x_min: acc.x_min.min(p.x),
            x_max: acc.x_max.max(p.x),
            y_min: acc.y_min.min(p.y),
            y_max: acc.y_max.max(p.y),
        }))
    }

    /// Grows each axis by `fraction` of its range on both sides.
    pub fn padded(&self, fraction: f64) -> Self {
        let x_pad = (self.x_max - self.x_min) * fraction;
        let y_pad = (self.y_max - self.y_min) * fraction;
        Self {
            x_min: self.x_min - x_pad,
            x_max: self.x_max + x_pad,
            y_min: self.y_min - y_pad,
            y_max: self.y_max + y_pad,
        }
    }

    pub fn x_range(&self) -> [f64; 2] {
        [self.x_min, self.x_max]
    }

    pub fn y_range(&self) -> [f64; 2] {
        [self.y_min, self.y_max]
    }
}
