use glam::DVec3;

use super::geo::{angular_separation, interpolate_direction, GeoPoint, DEGENERATE_SEPARATION_RAD};

/// Builds the waypoints of a flight path: `segments + 1` points from `origin`
/// to `destination`, all at `altitude` from the globe centre. `segments` is
/// floored at 1, so a request for 0 segments still yields both endpoints.
///
/// Intermediate points come from [`interpolate_direction`], so the path is the
/// chord between the endpoints pushed back out to the sphere rather than a true
/// great-circle arc. The first and last points are the exact endpoint
/// projections. Coincident endpoints give the origin repeated.
pub fn generate(
    origin: &GeoPoint,
    destination: &GeoPoint,
    segments: usize,
    altitude: f64,
) -> Vec<DVec3> {
    let segments = segments.max(1);
    let start = origin.position(altitude);

    if angular_separation(origin, destination) < DEGENERATE_SEPARATION_RAD {
        return vec![start; segments + 1];
    }

    let from = origin.direction();
    let to = destination.direction();

    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..segments {
        let t = i as f64 / segments as f64;
        points.push(interpolate_direction(from, to, t) * altitude);
    }
    points.push(destination.position(altitude));

    points
}
