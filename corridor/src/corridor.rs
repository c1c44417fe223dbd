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

//! Expands a [`FlightPath`] into a 3-D [`Corridor`] polygon plus altitude
//! interval, the unit the query engine consumes.

use geo::Polygon;

use crate::flightpath::FlightPath;
use crate::measurements::buffer_polyline;

/// A geodesic buffer around a flight path's concatenated great-circle
/// segments, with an altitude interval derived from the path's waypoint
/// altitudes.
pub struct Corridor {
    pub polygon: Polygon<f64>,
    /// `[min_wp_alt - height_ft, max_wp_alt + height_ft]`.
    pub altitude_interval: (f64, f64),
}

impl Corridor {
    /// Builds a corridor from `path` with `width_nm` lateral margin (default
    /// 10) and `height_ft` vertical margin (default 1000).
    pub fn build(path: &FlightPath, width_nm: f64, height_ft: f64) -> Self {
        let points: Vec<(f64, f64)> = path.waypoints().iter().map(|w| (w.lat, w.lon)).collect();
        let polygon = buffer_polyline(&points, width_nm);

        let min_alt = path.min_altitude_ft();
        let max_alt = path.max_altitude_ft();

        Self {
            polygon,
            altitude_interval: (min_alt - height_ft, max_alt + height_ft),
        }
    }
}

/// Default corridor vertical margin, feet.
pub const DEFAULT_HEIGHT_FT: f64 = 1000.0;
/// Default corridor lateral margin, nautical miles.
pub const DEFAULT_WIDTH_NM: f64 = 10.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flightpath::Waypoint;

    fn wp(id: &str, lat: f64, lon: f64, alt_ft: f64) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            lat,
            lon,
            alt_ft,
        }
    }

    #[test]
    fn altitude_interval_adds_margin_both_ways() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 1000.0),
            wp("W2", 48.5, 2.5, 2000.0),
        ])
        .unwrap();

        let corridor = Corridor::build(&path, DEFAULT_WIDTH_NM, DEFAULT_HEIGHT_FT);
        assert_eq!(corridor.altitude_interval, (0.0, 3000.0));
    }
}
