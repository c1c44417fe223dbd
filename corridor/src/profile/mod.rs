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

//! Rewrites a waypoint sequence's altitudes into a physically flyable
//! climb/cruise/descent profile.
//!
//! Each branch (a pair of consecutive waypoints) carries a target altitude —
//! the altitude of its first waypoint. A transition is attributed to the
//! branch where the target altitude actually changes: a synthetic top-of-
//! climb or top-of-descent waypoint is inserted inside that branch, at the
//! point the configured climb/descent rate would reach the new target.

use log::{debug, info, warn};
use serde::Serialize;

use crate::elevation::Elevation;
use crate::error::Error;
use crate::flightpath::{FlightPath, Waypoint};
use crate::measurements::{great_circle_km, km_to_nm};

/// Feet added above field elevation to anchor departure/arrival altitudes.
const PATTERN_ALTITUDE_FT: f64 = 1000.0;

/// Fraction of a branch's length below which a transition is considered to
/// land exactly at the branch boundary rather than truly inside it — this
/// is what keeps re-running the corrector over its own output a no-op.
const BOUNDARY_EPSILON: f64 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Action {
    Climb,
    Descent,
    Level,
}

/// One row of the branch report: `(index, distance_nm, action, from_alt,
/// to_alt)` plus the `unreachable` marker.
#[derive(Clone, Debug, Serialize)]
pub struct BranchReport {
    pub index: usize,
    pub distance_nm: f64,
    pub action: Action,
    pub from_alt_ft: f64,
    pub to_alt_ft: f64,
    pub unreachable: bool,
}

/// The corrected flight path plus its branch report.
pub struct CorrectionResult {
    pub path: FlightPath,
    pub branches: Vec<BranchReport>,
    /// Set when any field elevation lookup degraded to the 0 ft fallback.
    pub elevation_estimated: bool,
}

/// Configurable vertical-rate profile corrector.
pub struct ProfileCorrector {
    climb_rate_ftpm: f64,
    descent_rate_ftpm: f64,
    ground_speed_kt: f64,
}

impl ProfileCorrector {
    pub fn new(climb_rate_ftpm: f64, descent_rate_ftpm: f64, ground_speed_kt: f64) -> Self {
        Self {
            climb_rate_ftpm,
            descent_rate_ftpm,
            ground_speed_kt,
        }
    }

    /// Horizontal distance covered per minute at the configured ground
    /// speed, in kilometers.
    fn km_per_minute(&self) -> f64 {
        self.ground_speed_kt * 1.852 / 60.0
    }

    /// Produces a corrected profile and its branch report for `path`.
    ///
    /// Deterministic: running `correct` twice on the same input produces the
    /// same waypoint sequence, since the climb/descent points are placed by
    /// a pure function of each branch's endpoints. Idempotent under
    /// self-reapplication: a branch whose `to` waypoint is itself a
    /// previously-synthesized `Climb_*`/`Descent_*` marker is recognized as
    /// already carrying its target altitude and is never split again, so
    /// feeding the corrector's own output back in reproduces it unchanged.
    pub fn correct(&self, path: &FlightPath, elevation: &Elevation) -> Result<CorrectionResult, Error> {
        let waypoints = path.waypoints();
        if waypoints.len() < 2 {
            return Err(Error::InputMalformed(
                "profile correction needs at least 2 waypoints".into(),
            ));
        }

        let mut anchored: Vec<Waypoint> = waypoints.to_vec();
        let mut elevation_estimated = false;

        let first_field = elevation.sample(anchored[0].lat, anchored[0].lon);
        anchored[0].alt_ft = first_field.elevation_ft + PATTERN_ALTITUDE_FT;
        elevation_estimated |= first_field.estimated;

        let last = anchored.len() - 1;
        let last_field = elevation.sample(anchored[last].lat, anchored[last].lon);
        anchored[last].alt_ft = last_field.elevation_ft + PATTERN_ALTITUDE_FT;
        elevation_estimated |= last_field.estimated;

        let mut out_waypoints = Vec::with_capacity(anchored.len() * 2);
        let mut branches = Vec::with_capacity(anchored.len() - 1);
        let km_per_min = self.km_per_minute();

        out_waypoints.push(anchored[0].clone());

        for k in 0..anchored.len() - 1 {
            let from = &anchored[k];
            let to = &anchored[k + 1];
            let branch_km = great_circle_km(from.lat, from.lon, to.lat, to.lon);
            let from_alt = from.alt_ft;
            let to_alt = to.alt_ft;
            let delta = to_alt - from_alt;

            // A branch landing on a waypoint already synthesized by a prior
            // correction pass already carries its target altitude at `to`;
            // splitting it again would insert a second, near-duplicate
            // transition a few meters away. Recognize it and leave it alone.
            let to_already_resolved = is_synthetic_transition(&to.id);

            let (action, unreachable) = if delta > f64::EPSILON {
                let unreachable = if to_already_resolved {
                    false
                } else {
                    let climb_time_min = delta / self.climb_rate_ftpm;
                    let needed_km = climb_time_min * km_per_min;
                    let unreachable = needed_km > branch_km + BOUNDARY_EPSILON;
                    let t = (needed_km / branch_km).clamp(0.0, 1.0);

                    if t < 1.0 - BOUNDARY_EPSILON {
                        let (lat, lon) = interpolate(from, to, t);
                        out_waypoints.push(Waypoint {
                            id: format!("Climb_{}_{}", from.id, to_alt.round() as i64),
                            lat,
                            lon,
                            alt_ft: to_alt,
                        });
                    }
                    unreachable
                };
                (Action::Climb, unreachable)
            } else if delta < -f64::EPSILON {
                let unreachable = if to_already_resolved {
                    false
                } else {
                    let descent_time_min = (-delta) / self.descent_rate_ftpm;
                    let needed_km = descent_time_min * km_per_min;
                    let unreachable = needed_km > branch_km + BOUNDARY_EPSILON;
                    let t = (1.0 - (needed_km / branch_km)).clamp(0.0, 1.0);

                    if t > BOUNDARY_EPSILON {
                        let (lat, lon) = interpolate(from, to, t);
                        out_waypoints.push(Waypoint {
                            id: format!("Descent_{}_{}", from_alt.round() as i64, to.id),
                            lat,
                            lon,
                            alt_ft: to_alt,
                        });
                    }
                    unreachable
                };
                (Action::Descent, unreachable)
            } else {
                (Action::Level, false)
            };

            debug!("branch {k}: {action:?} {from_alt:.0}ft -> {to_alt:.0}ft over {branch_km:.1}km");
            if unreachable {
                warn!("branch {k} cannot reach {to_alt:.0}ft within its length; clamping to branch end");
            }

            out_waypoints.push(to.clone());

            branches.push(BranchReport {
                index: k,
                distance_nm: km_to_nm(branch_km),
                action,
                from_alt_ft: from_alt,
                to_alt_ft: to_alt,
                unreachable,
            });
        }

        let corrected = FlightPath::from_waypoints(out_waypoints)?;
        info!(
            "profile correction complete: {} branch(es), {} waypoint(s) in corrected path",
            branches.len(),
            corrected.waypoints().len()
        );

        Ok(CorrectionResult {
            path: corrected,
            branches,
            elevation_estimated,
        })
    }
}

/// Whether `id` names a waypoint synthesized by a previous `correct` call.
fn is_synthetic_transition(id: &str) -> bool {
    id.starts_with("Climb_") || id.starts_with("Descent_")
}

fn interpolate(from: &Waypoint, to: &Waypoint, t: f64) -> (f64, f64) {
    (
        from.lat + (to.lat - from.lat) * t,
        from.lon + (to.lon - from.lon) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wp(id: &str, lat: f64, lon: f64, alt_ft: f64) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            lat,
            lon,
            alt_ft,
        }
    }

    fn no_network_elevation() -> Elevation {
        Elevation::new(
            Some("http://127.0.0.1:0/unreachable".into()),
            Duration::from_millis(10),
            Duration::from_secs(0),
        )
        .unwrap()
    }

    #[test]
    fn flat_request_needing_a_climb_inserts_a_named_transition() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 79.0),
            wp("W2", 48.5, 2.5, 1400.0),
            wp("W3", 49.0, 3.0, 548.0),
        ])
        .unwrap();

        let corrector = ProfileCorrector::new(500.0, 500.0, 100.0);
        let elevation = no_network_elevation();
        let result = corrector.correct(&path, &elevation).unwrap();

        assert!(result
            .path
            .waypoints()
            .iter()
            .any(|w| w.id == "Climb_W1_1400"));
    }

    #[test]
    fn endpoints_are_anchored_to_field_elevation_plus_pattern_altitude() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 5000.0),
            wp("W2", 48.5, 2.5, 5000.0),
        ])
        .unwrap();

        let corrector = ProfileCorrector::new(500.0, 500.0, 100.0);
        let elevation = no_network_elevation();
        let result = corrector.correct(&path, &elevation).unwrap();

        let waypoints = result.path.waypoints();
        assert!((waypoints[0].alt_ft - PATTERN_ALTITUDE_FT).abs() < 1.0);
        assert!(result.elevation_estimated);
    }

    #[test]
    fn level_branch_inserts_no_transition_waypoint() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 1000.0),
            wp("W2", 48.5, 2.5, 1000.0),
            wp("W3", 49.0, 3.0, 1000.0),
        ])
        .unwrap();

        let corrector = ProfileCorrector::new(500.0, 500.0, 100.0);
        let elevation = no_network_elevation();
        let result = corrector.correct(&path, &elevation).unwrap();

        // Only the anchored endpoints differ; W2 and the branch report
        // should show LEVEL with no synthetic insertion.
        assert_eq!(result.branches[0].action, Action::Level);
        assert_eq!(result.branches[1].action, Action::Level);
        assert_eq!(result.path.waypoints().len(), 3);
    }

    #[test]
    fn unreachable_climb_is_flagged_and_clamped_to_branch_end() {
        // W1 and W3 get re-anchored to field elevation; W2 is the interior
        // waypoint whose extreme altitude forces a climb rate the short
        // branch can't physically deliver.
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 0.0),
            wp("W2", 48.001, 2.001, 40000.0),
            wp("W3", 48.002, 2.002, 0.0),
        ])
        .unwrap();

        let corrector = ProfileCorrector::new(500.0, 500.0, 100.0);
        let elevation = no_network_elevation();
        let result = corrector.correct(&path, &elevation).unwrap();

        assert!(result.branches[0].unreachable);
    }

    #[test]
    fn correcting_the_same_input_twice_is_deterministic() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 79.0),
            wp("W2", 48.5, 2.5, 1400.0),
            wp("W3", 49.0, 3.0, 548.0),
        ])
        .unwrap();

        let corrector = ProfileCorrector::new(500.0, 500.0, 100.0);
        let elevation = no_network_elevation();
        let first = corrector.correct(&path, &elevation).unwrap();
        let second = corrector.correct(&path, &elevation).unwrap();

        assert_eq!(first.path.waypoints().len(), second.path.waypoints().len());
        for (a, b) in first.path.waypoints().iter().zip(second.path.waypoints()) {
            assert_eq!(a.id, b.id);
            assert!((a.alt_ft - b.alt_ft).abs() < 1e-9);
        }
    }

    #[test]
    fn reapplying_correction_to_its_own_output_is_a_no_op() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 79.0),
            wp("W2", 48.5, 2.5, 1400.0),
            wp("W3", 49.0, 3.0, 548.0),
        ])
        .unwrap();

        let corrector = ProfileCorrector::new(500.0, 500.0, 100.0);
        let elevation = no_network_elevation();
        let once = corrector.correct(&path, &elevation).unwrap();
        let twice = corrector.correct(&once.path, &elevation).unwrap();

        assert_eq!(once.path.waypoints().len(), twice.path.waypoints().len());
        for (a, b) in once.path.waypoints().iter().zip(twice.path.waypoints()) {
            assert_eq!(a.id, b.id);
            assert!((a.lat - b.lat).abs() < 1e-9);
            assert!((a.lon - b.lon).abs() < 1e-9);
            assert!((a.alt_ft - b.alt_ft).abs() < 1e-9);
        }
    }
}
