//! Station matching by great-circle distance.
//!
//! Positions are classified against the static station list by picking the
//! closest station and accepting it only if it lies within a caller-supplied
//! radius. Everything here is pure.

use serde::Serialize;

use crate::domain::{Position, Station};

/// Mean Earth radius used for haversine distances, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Radius used when sampling the rider's ambient nearest station.
pub const AMBIENT_RADIUS_M: f64 = 200.0;

/// A station close enough to a position to count as "here".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationMatch {
    #[serde(flatten)]
    pub station: Station,
    /// Distance to the station, rounded to whole metres. The radius test
    /// runs on the unrounded distance, so this can exceed a fractional radius.
    #[serde(rename = "distanceM")]
    pub distance_m: u32,
    /// Whether the match also lies inside the station's own geofence
    pub within_geofence: bool,
}

/// Great-circle distance between two points, in metres.
///
/// Symmetric, and zero for identical points.
pub fn haversine_m(a_lat: f64, a_lon: f64, b_lat: f64, b_lon: f64) -> f64 {
    let d_lat = (b_lat - a_lat).to_radians();
    let d_lon = (b_lon - a_lon).to_radians();
    let s1 = (d_lat / 2.0).sin();
    let s2 = (d_lon / 2.0).sin();
    let a = s1 * s1 + a_lat.to_radians().cos() * b_lat.to_radians().cos() * s2 * s2;
    // Rounding can push `a` marginally above 1 for antipodal points.
    // `clamp` keeps NaN, where `min` would swallow it.
    2.0 * EARTH_RADIUS_M * a.sqrt().clamp(0.0, 1.0).asin()
}

/// Find the station closest to `(lat, lon)`, if it is within `max_radius_m`.
///
/// Ties go to the station that appears first in `stations`. That order is an
/// artifact of the input, not a policy. Coordinates are not validated: a NaN
/// distance never beats the running best, so a NaN query matches nothing.
///
/// # Examples
///
/// ```
/// use journey_logger::domain::{Station, StationId};
/// use journey_logger::geo::nearest_station;
///
/// let a = Station::new(StationId::parse("A").unwrap(), "A", "L1", 0.0, 0.0, 10.0);
/// let m = nearest_station(0.0, 0.0, &[a], 20.0).unwrap();
/// assert_eq!(m.station.station_id.as_str(), "A");
/// assert_eq!(m.distance_m, 0);
/// ```
pub fn nearest_station(
    lat: f64,
    lon: f64,
    stations: &[Station],
    max_radius_m: f64,
) -> Option<StationMatch> {
    let mut best: Option<(&Station, f64)> = None;

    for station in stations {
        let d = haversine_m(lat, lon, station.lat, station.lon);
        let closer = match best {
            Some((_, best_d)) => d < best_d,
            None => d < f64::INFINITY,
        };
        if closer {
            best = Some((station, d));
        }
    }

    let (station, d) = best?;
    if d > max_radius_m || max_radius_m.is_nan() {
        return None;
    }

    Some(StationMatch {
        station: station.clone(),
        distance_m: d.round() as u32,
        within_geofence: d <= station.geofence_radius_m,
    })
}

/// [`nearest_station`] for a position sample.
pub fn nearest_to(
    position: &Position,
    stations: &[Station],
    max_radius_m: f64,
) -> Option<StationMatch> {
    nearest_station(position.lat, position.lon, stations, max_radius_m)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::StationId;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = (f64, f64)> {
        (-89.0f64..89.0, -179.0f64..179.0)
    }

    fn stations() -> impl Strategy<Value = Vec<Station>> {
        prop::collection::vec(coord(), 0..8).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lon))| {
                    Station::new(
                        StationId::parse(&format!("S{i}")).unwrap(),
                        format!("Station {i}"),
                        "L1",
                        lat,
                        lon,
                        100.0,
                    )
                })
                .collect()
        })
    }

    proptest! {
        /// Distance is symmetric
        #[test]
        fn symmetric(a in coord(), b in coord()) {
            let ab = haversine_m(a.0, a.1, b.0, b.1);
            let ba = haversine_m(b.0, b.1, a.0, a.1);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        /// Distance from a point to itself is zero
        #[test]
        fn identity(a in coord()) {
            prop_assert_eq!(haversine_m(a.0, a.1, a.0, a.1), 0.0);
        }

        /// No match iff every station is beyond the radius
        #[test]
        fn none_iff_all_beyond_radius(
            p in coord(),
            s in stations(),
            r in 0u32..2_000_000,
        ) {
            let r = f64::from(r);
            let all_beyond = s.iter().all(|st| haversine_m(p.0, p.1, st.lat, st.lon) > r);
            let m = nearest_station(p.0, p.1, &s, r);
            prop_assert_eq!(m.is_none(), all_beyond);
        }

        /// Matched distance never exceeds an integral radius. A fractional
        /// radius can be exceeded by the rounding to whole metres.
        #[test]
        fn distance_within_radius(p in coord(), s in stations(), r in 0u32..2_000_000) {
            if let Some(m) = nearest_station(p.0, p.1, &s, f64::from(r)) {
                prop_assert!(m.distance_m <= r);
            }
        }

        /// Repeated calls give identical answers
        #[test]
        fn deterministic(p in coord(), s in stations(), r in 0u32..2_000_000) {
            let r = f64::from(r);
            prop_assert_eq!(
                nearest_station(p.0, p.1, &s, r),
                nearest_station(p.0, p.1, &s, r)
            );
        }
    }
}
