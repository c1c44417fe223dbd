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

//! Turns stored vertex rings into closed, simplified polygon rings.

use geo::{Coord, LineString, Polygon};

/// Tolerance (degrees) below which a ring's first and last vertex are
/// treated as already closed.
const CLOSURE_EPSILON: f64 = 1e-7;

/// Degenerate-ring area threshold (deg^2, shoelace-formula units).
const MIN_RING_AREA: f64 = 1e-12;

/// Closes and filters a set of borders (already ordered by ordinal, each a
/// `(lat, lon)` vertex sequence ordered by its own ordinal) into polygon
/// components.
///
/// A border whose endpoints are within [`CLOSURE_EPSILON`] degrees is
/// treated as already closed; otherwise the first vertex is appended to
/// close it. Rings whose oriented area falls below [`MIN_RING_AREA`] are
/// discarded as degenerate.
pub fn assemble_rings(borders: &[Vec<(f64, f64)>]) -> Vec<Polygon<f64>> {
    borders
        .iter()
        .filter_map(|vertices| close_ring(vertices))
        .filter(|ring| ring.len() >= 4) // closed ring: >= 3 distinct + repeat of first
        .filter(|ring| shoelace_area(ring).abs() >= MIN_RING_AREA)
        .map(|ring| {
            let coords: Vec<Coord<f64>> = ring
                .into_iter()
                .map(|(lat, lon)| Coord { x: lon, y: lat })
                .collect();
            Polygon::new(LineString::new(coords), vec![])
        })
        .collect()
}

fn close_ring(vertices: &[(f64, f64)]) -> Option<Vec<(f64, f64)>> {
    if vertices.len() < 3 {
        return None;
    }

    let first = vertices[0];
    let last = *vertices.last().unwrap();
    let already_closed =
        (first.0 - last.0).abs() < CLOSURE_EPSILON && (first.1 - last.1).abs() < CLOSURE_EPSILON;

    let mut ring = vertices.to_vec();
    if !already_closed {
        ring.push(first);
    }
    Some(ring)
}

/// Oriented (signed) polygon area via the shoelace formula, in the same
/// `(lat, lon)` degree units the ring is stored in.
fn shoelace_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for window in ring.windows(2) {
        let (lat1, lon1) = window[0];
        let (lat2, lon2) = window[1];
        sum += lon1 * lat2 - lon2 * lat1;
    }
    sum / 2.0
}
