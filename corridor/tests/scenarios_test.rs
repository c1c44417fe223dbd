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

//! Black-box scenarios exercised against the public API: a corridor crossing
//! an empty dataset, a single contained airspace, an altitude miss, a
//! critical-airspace flag, and a corridor that crosses the antimeridian.

use corridor::cancellation::CancellationToken;
use corridor::flightpath::{FlightPath, Waypoint};
use corridor::geometry::GeometryLoader;
use corridor::measurements::VerticalLimit;
use corridor::nd::{bounding_rect, AirspaceIndex, AirspaceType};
use corridor::query::crossings;
use corridor::store::{AirspaceRecord, BorderRecord, Store};

fn wp(id: &str, lat: f64, lon: f64, alt_ft: f64) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        lat,
        lon,
        alt_ft,
    }
}

fn square(code_id: &str, corners: [(f64, f64); 4], class: Option<&str>, min: VerticalLimit, max: VerticalLimit) -> AirspaceRecord {
    AirspaceRecord {
        code_id: code_id.to_string(),
        code_type: AirspaceType::Tma,
        name: Some(format!("{code_id} airspace")),
        class: class.map(str::to_string),
        min_altitude: min,
        max_altitude: max,
        operating_hours: None,
        remarks: None,
        borders: vec![BorderRecord {
            vertices: corners.to_vec(),
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
fn empty_corridor_in_empty_dataset_yields_no_crossings() {
    let store = Store::open_in_memory().unwrap();
    let index = build_index(&store);
    let loader = GeometryLoader::new(&store, 16);

    let path = FlightPath::from_waypoints(vec![
        wp("W1", 10.0, 10.0, 1000.0),
        wp("W2", 10.5, 10.5, 1000.0),
    ])
    .unwrap();

    let result = crossings(&path, 10.0, 1000.0, &index, &store, &loader, &CancellationToken::new()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn single_contained_airspace_is_reported_once_at_zero_distance() {
    let mut store = Store::open_in_memory().unwrap();
    store
        .bulk_insert(vec![square(
            "LFR1",
            [(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)],
            None,
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

    let result = crossings(&path, 1.0, 500.0, &index, &store, &loader, &CancellationToken::new()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].code_id, "LFR1");
    assert!(result[0].distance_km < 0.01);
}

#[test]
fn altitude_miss_produces_no_crossings() {
    let mut store = Store::open_in_memory().unwrap();
    store
        .bulk_insert(vec![square(
            "LFR1",
            [(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)],
            None,
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

    let result = crossings(&path, 1.0, 100.0, &index, &store, &loader, &CancellationToken::new()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn class_a_tma_overlap_is_flagged_critical() {
    let mut store = Store::open_in_memory().unwrap();
    store
        .bulk_insert(vec![square(
            "LFR1",
            [(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)],
            Some("A"),
            VerticalLimit::Ground,
            VerticalLimit::Feet(19500),
        )])
        .unwrap();
    let index = build_index(&store);
    let loader = GeometryLoader::new(&store, 16);

    let path = FlightPath::from_waypoints(vec![
        wp("W1", 48.5, 2.5, 5000.0),
        wp("W2", 48.5, 2.6, 5000.0),
    ])
    .unwrap();

    let result = crossings(&path, 1.0, 500.0, &index, &store, &loader, &CancellationToken::new()).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0].critical);
}

#[test]
fn antimeridian_crossing_still_finds_a_polygon_on_the_approach_side() {
    // A polygon sitting just this side of the antimeridian, entirely within
    // one sub-path's half of the split.
    let mut store = Store::open_in_memory().unwrap();
    store
        .bulk_insert(vec![square(
            "LFR1",
            [(-0.1, 179.5), (0.1, 179.5), (0.1, 179.95), (-0.1, 179.95)],
            None,
            VerticalLimit::Ground,
            VerticalLimit::Feet(5000),
        )])
        .unwrap();
    let index = build_index(&store);
    let loader = GeometryLoader::new(&store, 16);

    // An approach leg (W1->W2) well clear of the dateline, then a final
    // segment (W2->W3) that crosses it; the airspace sits on the far side.
    let path = FlightPath::from_waypoints(vec![
        wp("W1", 0.0, 170.0, 1000.0),
        wp("W2", 0.0, 179.7, 1000.0),
        wp("W3", 0.0, -179.0, 1000.0),
    ])
    .unwrap();

    let result = crossings(&path, 10.0, 1000.0, &index, &store, &loader, &CancellationToken::new()).unwrap();
    assert!(result.iter().any(|c| c.code_id == "LFR1"));
}
