// SPDX-License-Identifier: Apache-2.0
// Copyright 2024, 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The three-stage spatial query: bbox prune, exact intersection, altitude
//! overlap.

use std::time::Instant;

use geo::{Area, BooleanOps, BoundingRect, Contains, Point, Polygon};
use log::{debug, trace};
use rayon::prelude::*;

use crate::cancellation::CancellationToken;
use crate::corridor::Corridor;
use crate::error::Error;
use crate::flightpath::FlightPath;
use crate::geometry::GeometryLoader;
use crate::measurements::great_circle_km;
use crate::nd::AirspaceIndex;
use crate::report::{categorize, Crossing};
use crate::store::Store;

/// Minimum interior-intersection area (deg^2) before a candidate counts as a
/// real crossing rather than a mere touch.
const MIN_INTERSECTION_AREA: f64 = 1e-12;

/// Samples per path segment when locating entry/exit points.
const SAMPLES_PER_SEGMENT: usize = 32;

/// Runs the full query pipeline for `path`, returning crossings sorted by
/// `(distance_km, airspace_id)`.
///
/// A corridor that crosses the antimeridian is split into sub-corridors
/// first; their results are merged, keeping the shortest `distance_km` per
/// airspace id on overlap.
pub fn crossings(
    path: &FlightPath,
    width_nm: f64,
    height_ft: f64,
    index: &AirspaceIndex,
    store: &Store,
    loader: &GeometryLoader,
    cancellation: &CancellationToken,
) -> Result<Vec<Crossing>, Error> {
    let started = Instant::now();
    let segments = split_at_antimeridian(path);
    if segments.len() > 1 {
        debug!("path split into {} sub-path(s) at the antimeridian", segments.len());
    }

    let mut merged: Vec<Crossing> = Vec::new();

    for (sub_path, offset_km) in segments {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let corridor = Corridor::build(&sub_path, width_nm, height_ft);
        let mut found = query_single(&sub_path, &corridor, offset_km, index, store, loader, cancellation)?;
        merged.append(&mut found);
    }

    // Merge duplicates across sub-corridors, keeping the smallest distance.
    let mut by_id: std::collections::HashMap<i64, Crossing> = std::collections::HashMap::new();
    for crossing in merged {
        by_id
            .entry(crossing.airspace_id)
            .and_modify(|existing| {
                if crossing.distance_km < existing.distance_km {
                    *existing = crossing.clone();
                }
            })
            .or_insert(crossing);
    }

    let mut result: Vec<Crossing> = by_id.into_values().collect();
    result.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.airspace_id.cmp(&b.airspace_id))
    });

    debug!("crossings query resolved {} result(s) in {:?}", result.len(), started.elapsed());
    Ok(result)
}

fn query_single(
    path: &FlightPath,
    corridor: &Corridor,
    path_offset_km: f64,
    index: &AirspaceIndex,
    store: &Store,
    loader: &GeometryLoader,
    cancellation: &CancellationToken,
) -> Result<Vec<Crossing>, Error> {
    // Stage 1: bbox prune.
    let envelope = corridor
        .polygon
        .bounding_rect()
        .ok_or_else(|| Error::Internal("corridor polygon has no bounding rect".into()))?;
    let candidate_ids = index.candidates_intersecting(&envelope);
    trace!("query_single: {} candidate(s) after bbox prune", candidate_ids.len());

    if cancellation.is_cancelled() {
        return Err(Error::Cancelled);
    }

    // Stage 2: exact intersection, fanned out, merged in id-sorted order.
    let mut exact: Vec<(i64, Polygon<f64>)> = candidate_ids
        .par_iter()
        .filter_map(|&id| {
            if cancellation.is_cancelled() {
                return None;
            }
            let rings = match loader.load(id) {
                Ok(r) => r,
                Err(_) => return None,
            };
            intersection_of(&corridor.polygon, &rings).map(|poly| (id, poly))
        })
        .collect();
    exact.sort_by_key(|(id, _)| *id);

    if cancellation.is_cancelled() {
        return Err(Error::Cancelled);
    }

    // Stage 3: altitude overlap, then compute entry/exit distance+altitude.
    let mut crossings = Vec::new();
    for (id, intersection) in exact {
        let airspace = match store.get_by_id(id)? {
            Some(a) => a,
            None => continue,
        };

        let a_lo = airspace.min_altitude.to_feet();
        let a_hi = airspace.max_altitude.to_feet();
        let (c_lo, c_hi) = corridor.altitude_interval;

        let overlaps = a_lo <= c_hi && c_lo <= a_hi;
        if !overlaps {
            continue;
        }

        let (entry_km, _exit_km, entry_alt, exit_alt) = locate_entry_exit(path, &intersection);

        let category = categorize(airspace.code_type, airspace.class.as_deref());
        crossings.push(Crossing {
            airspace_id: id,
            code_id: airspace.code_id.clone(),
            name: airspace.name.clone(),
            airspace_type: airspace.code_type.as_str().to_string(),
            class: airspace.class.clone(),
            min_alt_ft: a_lo,
            max_alt_ft: a_hi,
            distance_km: path_offset_km + entry_km,
            entry_alt_ft: entry_alt,
            exit_alt_ft: exit_alt,
            critical: airspace.is_critical() || category.is_critical_bucket(),
            category,
        });
    }

    Ok(crossings)
}

/// Returns the (non-degenerate) intersection of the corridor with any ring
/// component of an airspace, if the overlap has real interior area.
fn intersection_of(corridor: &Polygon<f64>, rings: &[Polygon<f64>]) -> Option<Polygon<f64>> {
    for ring in rings {
        let intersection = corridor.intersection(ring);
        let area: f64 = intersection.unsigned_area();
        if area >= MIN_INTERSECTION_AREA {
            return intersection.0.into_iter().next();
        }
    }
    None
}

/// Finds the arc-length along `path` (kilometers, from its own start) where
/// it enters and exits `region`, with linearly-interpolated altitudes.
///
/// Samples each segment rather than solving the intersection exactly: cheap
/// and accurate enough for the corridor widths this system targets. If no
/// sampled point falls inside (the corridor buffer overlaps the airspace but
/// the centerline itself doesn't), reports `(0, 0)` at the path start.
fn locate_entry_exit(path: &FlightPath, region: &Polygon<f64>) -> (f64, f64, f64, f64) {
    let waypoints = path.waypoints();
    let mut cumulative_km = 0.0;
    let mut entry: Option<(f64, f64)> = None;
    let mut exit: Option<(f64, f64)> = None;

    for pair in waypoints.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let seg_km = great_circle_km(a.lat, a.lon, b.lat, b.lon);

        for step in 0..=SAMPLES_PER_SEGMENT {
            let t = step as f64 / SAMPLES_PER_SEGMENT as f64;
            let lat = a.lat + (b.lat - a.lat) * t;
            let lon = a.lon + (b.lon - a.lon) * t;
            let alt = a.alt_ft + (b.alt_ft - a.alt_ft) * t;
            let dist = cumulative_km + seg_km * t;

            if region.contains(&Point::new(lon, lat)) {
                if entry.is_none() {
                    entry = Some((dist, alt));
                }
                exit = Some((dist, alt));
            }
        }

        cumulative_km += seg_km;
    }

    match (entry, exit) {
        (Some((ed, ea)), Some((xd, xa))) => (ed, xd, ea, xa),
        _ => (0.0, 0.0, waypoints[0].alt_ft, waypoints[0].alt_ft),
    }
}

/// The `(lat, alt_ft)` at which segment `a -> b` crosses the antimeridian,
/// found by unwrapping `b`'s longitude onto a continuous number line with
/// `a`'s and linearly interpolating lat/alt to the +-180 degree crossing.
fn interpolate_antimeridian(
    a: &crate::flightpath::Waypoint,
    b: &crate::flightpath::Waypoint,
) -> (f64, f64) {
    let unwrapped_b_lon = if b.lon - a.lon > 180.0 {
        b.lon - 360.0
    } else {
        b.lon + 360.0
    };
    let target_lon = a.lon.signum() * 180.0;
    let t = (target_lon - a.lon) / (unwrapped_b_lon - a.lon);

    (
        a.lat + (b.lat - a.lat) * t,
        a.alt_ft + (b.alt_ft - a.alt_ft) * t,
    )
}

/// Splits `path` into sub-paths at each antimeridian crossing (an adjacent
/// waypoint pair more than 180 degrees apart in longitude), returning each
/// sub-path with its cumulative distance offset from the original start.
///
/// Each crossing gets a synthetic waypoint interpolated onto +-180 degrees
/// longitude at each end, so even a single crossing segment (a 2-waypoint
/// path whose only segment crosses the dateline) yields two real 2-point
/// sub-paths rather than being dropped or returned unsplit.
fn split_at_antimeridian(path: &FlightPath) -> Vec<(FlightPath, f64)> {
    let waypoints = path.waypoints();
    let mut groups: Vec<Vec<crate::flightpath::Waypoint>> = vec![vec![waypoints[0].clone()]];

    for (i, pair) in waypoints.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        if (b.lon - a.lon).abs() > 180.0 {
            let (lat, alt) = interpolate_antimeridian(a, b);
            let exit_lon = a.lon.signum() * 180.0;

            groups.last_mut().unwrap().push(crate::flightpath::Waypoint {
                id: format!("{}_AM{i}", a.id),
                lat,
                lon: exit_lon,
                alt_ft: alt,
            });
            groups.push(vec![crate::flightpath::Waypoint {
                id: format!("{}_AM{i}", b.id),
                lat,
                lon: -exit_lon,
                alt_ft: alt,
            }]);
        }
        groups.last_mut().unwrap().push(b.clone());
    }

    let mut result = Vec::new();
    let mut offset_km = 0.0;
    for group in groups {
        if group.len() < 2 {
            continue;
        }
        let seg_len_km: f64 = group
            .windows(2)
            .map(|pair| great_circle_km(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
            .sum();

        if let Ok(sub_path) = FlightPath::from_waypoints(group) {
            result.push((sub_path, offset_km));
        }
        offset_km += seg_len_km;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flightpath::Waypoint;
    use crate::measurements::VerticalLimit;
    use crate::nd::{bounding_rect, AirspaceType};
    use crate::store::{AirspaceRecord, BorderRecord};

    fn wp(id: &str, lat: f64, lon: f64, alt_ft: f64) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            lat,
            lon,
            alt_ft,
        }
    }

    fn square_record(code_id: &str, min_alt: VerticalLimit, max_alt: VerticalLimit) -> AirspaceRecord {
        AirspaceRecord {
            code_id: code_id.to_string(),
            code_type: AirspaceType::Tma,
            name: Some("Test".into()),
            class: None,
            min_altitude: min_alt,
            max_altitude: max_alt,
            operating_hours: None,
            remarks: None,
            borders: vec![BorderRecord {
                vertices: vec![(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)],
            }],
        }
    }

    fn build_index(store: &Store) -> AirspaceIndex {
        let with_geometry = store.iter_all_with_geometry().unwrap();
        AirspaceIndex::build(with_geometry.into_iter().filter_map(|(a, rings)| {
            let flat: Vec<(f64, f64)> = rings.into_iter().flatten().collect();
            bounding_rect(&flat).map(|r| (a.id, r))
        }))
    }

    #[test]
    fn empty_dataset_yields_no_crossings() {
        let store = Store::open_in_memory().unwrap();
        let index = build_index(&store);
        let loader = GeometryLoader::new(&store, 16);
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.5, 2.5, 1000.0),
            wp("W2", 48.5, 2.5001, 1000.0),
        ])
        .unwrap();

        let result = crossings(
            &path,
            1.0,
            500.0,
            &index,
            &store,
            &loader,
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn contained_corridor_yields_exactly_one_crossing_at_zero_distance() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .bulk_insert(vec![square_record(
                "LFR1",
                VerticalLimit::Ground,
                VerticalLimit::Feet(2000),
            )])
            .unwrap();
        let index = build_index(&store);
        let loader = GeometryLoader::new(&store, 16);

        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.5, 2.5, 1000.0),
            wp("W2", 48.5, 2.5001, 1000.0),
        ])
        .unwrap();

        let result = crossings(
            &path,
            1.0,
            500.0,
            &index,
            &store,
            &loader,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code_id, "LFR1");
        assert!(result[0].distance_km < 0.01);
    }

    #[test]
    fn altitude_miss_yields_no_crossings() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .bulk_insert(vec![square_record(
                "LFR1",
                VerticalLimit::Ground,
                VerticalLimit::Feet(2000),
            )])
            .unwrap();
        let index = build_index(&store);
        let loader = GeometryLoader::new(&store, 16);

        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.5, 2.5, 3000.0),
            wp("W2", 48.5, 2.6, 3000.0),
        ])
        .unwrap();

        let result = crossings(
            &path,
            1.0,
            100.0,
            &index,
            &store,
            &loader,
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn unlimited_ceiling_is_always_reported_regardless_of_corridor_top() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .bulk_insert(vec![square_record(
                "LFR1",
                VerticalLimit::Ground,
                VerticalLimit::Unlimited,
            )])
            .unwrap();
        let index = build_index(&store);
        let loader = GeometryLoader::new(&store, 16);

        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.5, 2.5, 45000.0),
            wp("W2", 48.5, 2.6, 45000.0),
        ])
        .unwrap();

        let result = crossings(
            &path,
            1.0,
            100.0,
            &index,
            &store,
            &loader,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn cancellation_is_observed_before_work_starts() {
        let store = Store::open_in_memory().unwrap();
        let index = build_index(&store);
        let loader = GeometryLoader::new(&store, 16);
        let token = CancellationToken::new();
        token.cancel();

        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.5, 2.5, 1000.0),
            wp("W2", 48.6, 2.6, 1000.0),
        ])
        .unwrap();

        let result = crossings(&path, 1.0, 500.0, &index, &store, &loader, &token);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn two_waypoint_antimeridian_crossing_splits_into_two_sub_paths() {
        // The literal scenario: a single-segment path whose only waypoints
        // straddle the dateline (179 -> -179), rather than a longer path
        // where the crossing sits safely inside an interior segment.
        let path = FlightPath::from_waypoints(vec![wp("W1", 0.0, 179.0, 1000.0), wp("W2", 0.0, -179.0, 1000.0)]).unwrap();

        let segments = split_at_antimeridian(&path);
        assert_eq!(segments.len(), 2);

        let (first, first_offset) = &segments[0];
        let (second, second_offset) = &segments[1];

        assert_eq!(first.waypoints().len(), 2);
        assert_eq!(second.waypoints().len(), 2);
        assert_eq!(*first_offset, 0.0);
        assert!(second_offset > &0.0);

        // Each sub-path's synthetic crossing waypoint sits exactly on the
        // antimeridian, on the side its own group belongs to.
        assert_eq!(first.waypoints()[1].lon, 180.0);
        assert_eq!(second.waypoints()[0].lon, -180.0);
    }

    #[test]
    fn two_waypoint_antimeridian_crossing_still_finds_crossings_on_either_side() {
        let mut store = Store::open_in_memory().unwrap();
        // A custom record, not `square_record`, since the airspace needs to
        // sit near 179 degrees longitude to be on the approach side of a
        // path crossing the dateline at (0, 180).
        store
            .bulk_insert(vec![AirspaceRecord {
                code_id: "LFR1".into(),
                code_type: AirspaceType::Tma,
                name: Some("Test".into()),
                class: None,
                min_altitude: VerticalLimit::Ground,
                max_altitude: VerticalLimit::Feet(2000),
                operating_hours: None,
                remarks: None,
                borders: vec![BorderRecord {
                    vertices: vec![(-0.1, 179.5), (0.1, 179.5), (0.1, 179.95), (-0.1, 179.95)],
                }],
            }])
            .unwrap();
        let index = build_index(&store);
        let loader = GeometryLoader::new(&store, 16);

        let path = FlightPath::from_waypoints(vec![wp("W1", 0.0, 179.0, 1000.0), wp("W2", 0.0, -179.0, 1000.0)]).unwrap();

        let result = crossings(&path, 10.0, 500.0, &index, &store, &loader, &CancellationToken::new()).unwrap();
        assert!(result.iter().any(|c| c.code_id == "LFR1"));
    }
}
