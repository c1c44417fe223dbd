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

//! Bounding-box spatial index over airspace ids.
//!
//! The index owns only ids and minimum bounding rectangles, never raw
//! geometry: assembling a candidate's actual polygon is the geometry
//! loader's job, invoked only for ids this index has already narrowed down.

use geo::{Coord, Rect};
use log::{debug, trace};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Bulk-loaded (Sort-Tile-Recursive) R-tree keyed by each airspace's bounding
/// rectangle in `(lon, lat)`.
///
/// Built lazily on first query and rebuilt only when the store signals a
/// bulk update; readers otherwise hold a stable, immutable snapshot.
pub struct AirspaceIndex {
    tree: RTree<GeomWithData<Rectangle<geo::Point<f64>>, i64>>,
}

impl AirspaceIndex {
    /// Builds an index from `(airspace_id, min_lon, min_lat, max_lon, max_lat)`
    /// bounding rectangles.
    pub fn build(entries: impl Iterator<Item = (i64, Rect<f64>)>) -> Self {
        let entries: Vec<_> = entries
            .map(|(id, rect)| {
                let rectangle = Rectangle::from_corners(
                    geo::Point::new(rect.min().x, rect.min().y),
                    geo::Point::new(rect.max().x, rect.max().y),
                );
                GeomWithData::new(rectangle, id)
            })
            .collect();

        debug!("built airspace index over {} entries", entries.len());
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns airspace ids whose bounding rectangle intersects `envelope`.
    ///
    /// This is the bbox-prune stage of the query pipeline: a strict
    /// superset of the exact-intersection result.
    pub fn candidates_intersecting(&self, envelope: &Rect<f64>) -> Vec<i64> {
        let aabb = AABB::from_corners(
            geo::Point::new(envelope.min().x, envelope.min().y),
            geo::Point::new(envelope.max().x, envelope.max().y),
        );

        let candidates: Vec<i64> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|entry| entry.data)
            .collect();
        trace!("bbox prune found {} candidate(s)", candidates.len());
        candidates
    }
}

/// Computes the minimum bounding rectangle of a ring of `(lat, lon)` points.
pub fn bounding_rect(points: &[(f64, f64)]) -> Option<Rect<f64>> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(lat, lon) in points {
        min_x = min_x.min(lon);
        max_x = max_x.max(lon);
        min_y = min_y.min(lat);
        max_y = max_y.max(lat);
    }

    if !min_x.is_finite() {
        return None;
    }

    Some(Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Rect<f64> {
        Rect::new(
            Coord { x: min_lon, y: min_lat },
            Coord { x: max_lon, y: max_lat },
        )
    }

    #[test]
    fn finds_candidate_whose_bbox_intersects_query() {
        let index = AirspaceIndex::build(
            vec![(1, rect(2.0, 48.0, 3.0, 49.0)), (2, rect(10.0, 40.0, 11.0, 41.0))].into_iter(),
        );

        let candidates = index.candidates_intersecting(&rect(2.4, 48.4, 2.6, 48.6));
        assert_eq!(candidates, vec![1]);
    }

    #[test]
    fn excludes_non_overlapping_bbox() {
        let index = AirspaceIndex::build(vec![(1, rect(2.0, 48.0, 3.0, 49.0))].into_iter());

        let candidates = index.candidates_intersecting(&rect(20.0, 20.0, 21.0, 21.0));
        assert!(candidates.is_empty());
    }

    #[test]
    fn bounding_rect_of_square() {
        let rect = bounding_rect(&[(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)]).unwrap();
        assert_eq!(rect.min().x, 2.0);
        assert_eq!(rect.max().x, 3.0);
        assert_eq!(rect.min().y, 48.0);
        assert_eq!(rect.max().y, 49.0);
    }

    #[test]
    fn bounding_rect_of_empty_is_none() {
        assert!(bounding_rect(&[]).is_none());
    }
}
