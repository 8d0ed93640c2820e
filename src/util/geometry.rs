use geo::{Centroid, EuclideanDistance, LineString, MultiPoint, Point};

/// Mean earth radius used for polyline lengths.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Euclidean distance between two projected points.
pub fn planar_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    a.euclidean_distance(&b)
}

/// Equirectangular approximation of the great-circle distance in km
/// between two lon/lat points given in degrees.
pub fn equirectangular_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lon1, lat1) = (a.x().to_radians(), a.y().to_radians());
    let (lon2, lat2) = (b.x().to_radians(), b.y().to_radians());
    let dx = (lon2 - lon1) * ((lat1 + lat2) / 2.).cos();
    let dy = lat2 - lat1;
    EARTH_RADIUS_KM * (dx * dx + dy * dy).sqrt()
}

/// Sum of the equirectangular lengths of every segment of a lon/lat polyline.
pub fn polyline_length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| equirectangular_distance(segment.start_point(), segment.end_point()))
        .sum()
}

/// Arithmetic mean of the given points. Repeated points are weighted by
/// how often they occur.
pub fn mean_point(points: impl IntoIterator<Item = Point<f64>>) -> Option<Point<f64>> {
    MultiPoint::from_iter(points).centroid()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
