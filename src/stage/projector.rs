use crate::{model::Position, util::mean_point};
use geo::Point;
use serde::Serialize;

/// Local equirectangular approximation centred on the mean of a point set.
///
/// The factors are fitted once on the full way set and reused by every
/// later stage, so distances stay comparable after filtering and clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub km_per_lon_deg: f64,
    pub km_per_lat_deg: f64,
}

impl Projection {
    pub fn fit(points: impl IntoIterator<Item = Point<f64>>) -> Option<Self> {
        let centroid = mean_point(points)?;
        Some(Self::centered_on(centroid))
    }

    pub fn centered_on(origin: Point<f64>) -> Self {
        let phi = origin.y().to_radians();
        let km_per_lon_deg = (111132.954 * phi.cos() - 93.55 * (3. * phi).cos()
            + 0.118 * (5. * phi).cos())
            / 1000.;
        let km_per_lat_deg = (111132.92 - 559.82 * (2. * phi).cos() + 1.175 * (4. * phi).cos()
            - 0.0023 * (6. * phi).cos())
            / 1000.;
        Projection {
            origin_lon: origin.x(),
            origin_lat: origin.y(),
            km_per_lon_deg,
            km_per_lat_deg,
        }
    }

    /// Planar kilometres relative to the origin.
    pub fn project(&self, lon: f64, lat: f64) -> Point<f64> {
        Point::new(
            (lon - self.origin_lon) * self.km_per_lon_deg,
            (lat - self.origin_lat) * self.km_per_lat_deg,
        )
    }

    pub fn position(&self, point: Point<f64>) -> Position {
        let planar = self.project(point.x(), point.y());
        Position {
            lon: point.x(),
            lat: point.y(),
            x: planar.x(),
            y: planar.y(),
        }
    }
}
