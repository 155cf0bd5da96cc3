use glam::DVec3;

use super::airport::{AirportId, AirportRegistry};
use super::flight::FlightId;
use super::geo::GeoPoint;
use super::transform::TransformBuffer;

/// A ray in globe space. The direction is normalized on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Ray {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `origin` through `target`.
    pub fn towards(origin: DVec3, target: DVec3) -> Self {
        Ray::new(origin, target - origin)
    }

    /// Camera ray looking straight down at a point on the globe from
    /// `camera_distance` away from the centre.
    pub fn looking_down_at(point: &GeoPoint, camera_distance: f64) -> Self {
        Ray::towards(point.position(camera_distance), DVec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Flight(FlightId),
    Airport(AirportId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub target: PickTarget,
    /// Distance along the ray to the first intersection.
    pub distance: f64,
}

/// Ray queries against airport markers and active flight slots.
///
/// Every flight is tested against the same bounding sphere centred on its
/// current slot position, so no per-flight geometry is stored.
#[derive(Debug, Clone)]
pub struct PickIndex {
    pub near: f64,
    pub far: f64,
    pub flight_radius: f64,
    pub airport_radius: f64,
    pub airport_altitude: f64,
}

impl PickIndex {
    /// Returns the closest hit with a distance in `[near, far]`, if any.
    pub fn pick(
        &self,
        ray: &Ray,
        transforms: &TransformBuffer,
        airports: &AirportRegistry,
    ) -> Option<PickHit> {
        if ray.direction == DVec3::ZERO {
            return None;
        }

        let airport_hits = airports.iter().filter_map(|airport| {
            let center = airport.marker_position(self.airport_altitude);
            self.intersect(ray, center, self.airport_radius)
                .map(|distance| PickHit {
                    target: PickTarget::Airport(airport.id),
                    distance,
                })
        });

        let flight_hits = transforms.active().filter_map(|(id, slot)| {
            self.intersect(ray, slot.position, self.flight_radius)
                .map(|distance| PickHit {
                    target: PickTarget::Flight(id),
                    distance,
                })
        });

        airport_hits
            .chain(flight_hits)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// First distance along `ray` at which it enters (or, from inside, leaves)
    /// the sphere, restricted to the near/far window.
    fn intersect(&self, ray: &Ray, center: DVec3, radius: f64) -> Option<f64> {
        let offset = ray.origin - center;
        let b = offset.dot(ray.direction);
        let c = offset.length_squared() - radius * radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        [-b - root, -b + root]
            .into_iter()
            .find(|distance| *distance >= self.near && *distance <= self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::SimConfig;
    use crate::types::flight::{Flight, FlightMetadata};

    fn index() -> PickIndex {
        PickIndex {
            near: 0.0,
            far: 100.0,
            flight_radius: 0.02,
            airport_radius: 0.01,
            airport_altitude: 1.0,
        }
    }

    #[test]
    fn test_ray_sphere_entry_distance() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z);
        let distance = index().intersect(&ray, DVec3::ZERO, 1.0);
        assert_eq!(distance, Some(4.0));
    }

    #[test]
    fn test_far_window_excludes_hits() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z);
        let short = PickIndex {
            far: 3.0,
            ..index()
        };
        assert_eq!(short.intersect(&ray, DVec3::ZERO, 1.0), None);
    }

    #[test]
    fn test_picks_closest_of_airport_and_flight() {
        let mut airports = AirportRegistry::new();
        let aep = GeoPoint::new(-34.553, -58.413);
        let airport = airports.insert("AEP", "ARG", "Aeroparque", aep);

        let flight = Flight::new(
            FlightId(0),
            aep,
            GeoPoint::new(-32.883, -68.845),
            0.0,
            FlightMetadata::default(),
            &SimConfig::default(),
        );
        let mut transforms = TransformBuffer::new(1, 1.02, 0.01);
        transforms.update(std::slice::from_ref(&flight), 0.0);

        let ray = Ray::looking_down_at(&aep, 3.0);
        let hit = index().pick(&ray, &transforms, &airports).unwrap();

        // The flight sits above the airport, so the camera reaches it first.
        assert_eq!(hit.target, PickTarget::Flight(FlightId(0)));

        let empty = TransformBuffer::new(1, 1.02, 0.01);
        let hit = index().pick(&ray, &empty, &airports).unwrap();
        assert_eq!(hit.target, PickTarget::Airport(airport));
    }

    #[test]
    fn test_miss_returns_none() {
        let airports = AirportRegistry::new();
        let transforms = TransformBuffer::new(0, 1.02, 0.01);
        let ray = Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::Y);

        assert_eq!(index().pick(&ray, &transforms, &airports), None);
    }
}
