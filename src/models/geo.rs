/// Axis-aligned bounding box in geographic coordinates, radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        BoundingBox {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Builds a bounding box from degree coordinates.
    pub fn from_degrees(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        BoundingBox {
            min_lon: min_lon.to_radians(),
            max_lon: max_lon.to_radians(),
            min_lat: min_lat.to_radians(),
            max_lat: max_lat.to_radians(),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(other.min_lon, other.min_lat) && self.contains(other.max_lon, other.max_lat)
    }

    /// Expands each side by `frac` of the corresponding span.
    pub fn expanded(&self, frac: f64) -> Self {
        let dlon = self.width() * frac;
        let dlat = self.height() * frac;
        BoundingBox {
            min_lon: self.min_lon - dlon,
            max_lon: self.max_lon + dlon,
            min_lat: self.min_lat - dlat,
            max_lat: self.max_lat + dlat,
        }
    }
}
