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

//! Parses a KML route (Placemark sequence) or a GPS trace (single
//! LineString) into an ordered [`FlightPath`].

use kml::types::Geometry;
use kml::{Kml, KmlReader};

use crate::error::Error;
use crate::measurements::great_circle_km;

const METERS_IN_FEET: f64 = 3.28084;

/// A single point in a [`FlightPath`].
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    /// Taken from the Placemark name (route), or synthesized as
    /// `TRK_0001, ...` for a GPS trace. May be empty.
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Feet MSL; `NaN` when the source KML omitted an altitude, flagging the
    /// waypoint for the profile corrector.
    pub alt_ft: f64,
}

impl Waypoint {
    pub fn has_altitude(&self) -> bool {
        !self.alt_ft.is_nan()
    }
}

/// An ordered, immutable sequence of waypoints built from an external KML
/// input.
#[derive(Clone, Debug)]
pub struct FlightPath {
    waypoints: Vec<Waypoint>,
}

impl FlightPath {
    /// Parses a KML document containing either a sequence of Placemark
    /// points (a nav route) or a single Placemark LineString (a GPS trace).
    pub fn from_kml(xml: &str) -> Result<Self, Error> {
        let mut reader = KmlReader::<&[u8], f64>::from_str(xml)
            .map_err(|e| Error::InputMalformed(e.to_string()))?;
        let document = reader
            .read()
            .map_err(|e| Error::InputMalformed(e.to_string()))?;

        let mut waypoints = Vec::new();
        collect_placemarks(&document, &mut waypoints);

        let path = Self { waypoints };
        path.validate()?;
        Ok(path)
    }

    /// Builds a flight path directly from an in-memory sequence, for tests
    /// and for feeding corrected output back through the pipeline.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Result<Self, Error> {
        let path = Self { waypoints };
        path.validate()?;
        Ok(path)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.waypoints.len() < 2 {
            return Err(Error::InputMalformed(
                "flight path needs at least 2 waypoints".into(),
            ));
        }
        for pair in self.waypoints.windows(2) {
            if pair[0].lat == pair[1].lat && pair[0].lon == pair[1].lon {
                return Err(Error::InputMalformed(
                    "adjacent waypoints must not be identical".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Total great-circle arc length of the path, in kilometers.
    pub fn length_km(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| great_circle_km(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
            .sum()
    }

    pub fn min_altitude_ft(&self) -> f64 {
        self.waypoints
            .iter()
            .map(|w| w.alt_ft)
            .filter(|a| !a.is_nan())
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_altitude_ft(&self) -> f64 {
        self.waypoints
            .iter()
            .map(|w| w.alt_ft)
            .filter(|a| !a.is_nan())
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

fn collect_placemarks(kml: &Kml<f64>, out: &mut Vec<Waypoint>) {
    match kml {
        Kml::KmlDocument(doc) => {
            for el in &doc.elements {
                collect_placemarks(el, out);
            }
        }
        Kml::Document { elements, .. } => {
            for el in elements {
                collect_placemarks(el, out);
            }
        }
        Kml::Folder(folder) => {
            for el in &folder.elements {
                collect_placemarks(el, out);
            }
        }
        Kml::Placemark(placemark) => match &placemark.geometry {
            Some(Geometry::Point(point)) => {
                out.push(Waypoint {
                    id: placemark.name.clone().unwrap_or_default(),
                    lat: point.coord.y,
                    lon: point.coord.x,
                    alt_ft: point
                        .coord
                        .z
                        .map(|m| m * METERS_IN_FEET)
                        .unwrap_or(f64::NAN),
                });
            }
            Some(Geometry::LineString(line)) => {
                for (i, coord) in line.coords.iter().enumerate() {
                    out.push(Waypoint {
                        id: format!("TRK_{:04}", i + 1),
                        lat: coord.y,
                        lon: coord.x,
                        alt_ft: coord.z.map(|m| m * METERS_IN_FEET).unwrap_or(f64::NAN),
                    });
                }
            }
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, lat: f64, lon: f64, alt_ft: f64) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            lat,
            lon,
            alt_ft,
        }
    }

    #[test]
    fn rejects_single_waypoint() {
        let err = FlightPath::from_waypoints(vec![wp("W1", 48.0, 2.0, 1000.0)]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_duplicate_adjacent_waypoints() {
        let err = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 1000.0),
            wp("W1", 48.0, 2.0, 1000.0),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn accepts_valid_two_waypoint_path() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, 1000.0),
            wp("W2", 48.5, 2.5, 1200.0),
        ])
        .unwrap();
        assert_eq!(path.waypoints().len(), 2);
        assert!(path.length_km() > 0.0);
    }

    #[test]
    fn altitude_bounds_ignore_nan() {
        let path = FlightPath::from_waypoints(vec![
            wp("W1", 48.0, 2.0, f64::NAN),
            wp("W2", 48.5, 2.5, 1200.0),
            wp("W3", 49.0, 3.0, 800.0),
        ])
        .unwrap();
        assert_eq!(path.min_altitude_ft(), 800.0);
        assert_eq!(path.max_altitude_ft(), 1200.0);
    }
}
