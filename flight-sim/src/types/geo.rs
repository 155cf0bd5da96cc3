//! Conversions between geographic coordinates and globe-space vectors.
//!
//! The globe is a sphere centred at the origin with the north pole on +Y. The
//! same mapping is used for paths, flight transforms and airport markers, so
//! everything stays anchored to the same spot on the rendered sphere.

use glam::DVec3;

/// Longitude offset applied before the spherical mapping. The renderer's globe
/// texture is built with the same offset.
pub const LONGITUDE_OFFSET_DEG: f64 = 180.0;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Below this separation two points are treated as the same place.
pub const DEGENERATE_SEPARATION_RAD: f64 = 1e-9;

const MIN_DIRECTION_LENGTH: f64 = 1e-9;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Unit vector from the globe centre towards this point.
    pub fn direction(&self) -> DVec3 {
        geo_to_vec(self.latitude, self.longitude, 1.0)
    }

    /// Position of this point at `radius` from the globe centre.
    pub fn position(&self, radius: f64) -> DVec3 {
        geo_to_vec(self.latitude, self.longitude, radius)
    }
}

/// Maps (lat, lon, radius) to globe space. Out-of-range coordinates are not
/// validated; they go through the same formula.
pub fn geo_to_vec(latitude: f64, longitude: f64, radius: f64) -> DVec3 {
    let phi = (90.0 - latitude).to_radians();
    let theta = (longitude + LONGITUDE_OFFSET_DEG).to_radians();

    DVec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`geo_to_vec`], ignoring the radius. Longitude is wrapped to
/// [-180, 180).
pub fn vec_to_geo(position: DVec3) -> GeoPoint {
    let radius = position.length();
    if radius < MIN_DIRECTION_LENGTH {
        return GeoPoint::new(0.0, 0.0);
    }

    let latitude = (position.y / radius).clamp(-1.0, 1.0).asin().to_degrees();
    let theta = position.z.atan2(-position.x).to_degrees();
    let longitude = (theta - LONGITUDE_OFFSET_DEG + 180.0).rem_euclid(360.0) - 180.0;

    GeoPoint::new(latitude, longitude)
}

/// Central angle between two points in radians, using the haversine formula.
pub fn angular_separation(origin: &GeoPoint, destination: &GeoPoint) -> f64 {
    let origin_lat_rad = origin.latitude.to_radians();
    let dest_lat_rad = destination.latitude.to_radians();

    let delta_lat = dest_lat_rad - origin_lat_rad;
    let delta_lon = (destination.longitude - origin.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + origin_lat_rad.cos() * dest_lat_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` past 1 for near-antipodal points.
    let a = a.clamp(0.0, 1.0);

    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn haversine_distance_km(origin: &GeoPoint, destination: &GeoPoint) -> f64 {
    EARTH_RADIUS_KM * angular_separation(origin, destination)
}

/// Initial bearing from `origin` towards `destination`, in degrees clockwise
/// from north in [0, 360).
pub fn initial_bearing(origin: &GeoPoint, destination: &GeoPoint) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = destination.latitude.to_radians();
    let delta_lon = (destination.longitude - origin.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Linear interpolation between two directions, projected back onto the unit
/// sphere.
///
/// This is not a slerp: intermediate points sag below the true great-circle
/// arc, most visibly halfway between widely separated endpoints. When the
/// interpolated vector is too short to normalize (coincident or antipodal
/// endpoints) the start direction is returned instead of a NaN.
pub fn interpolate_direction(from: DVec3, to: DVec3, t: f64) -> DVec3 {
    let lerped = from.lerp(to, t);
    let length = lerped.length();

    if length.is_finite() && length >= MIN_DIRECTION_LENGTH {
        lerped / length
    } else {
        from.normalize_or_zero()
    }
}
