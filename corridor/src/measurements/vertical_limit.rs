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

use std::cmp::Ordering;
use std::fmt;

/// An altitude expressed in its originally-published unit.
///
/// Mirrors the AIXM `codeDistVer`/`uomDistVer` tagging: the same numeric
/// value means different things depending on the unit, so the unit travels
/// with the value until a comparison forces normalization to feet. `Gnd` and
/// `Unlimited` carry no numeric value at all.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VerticalLimit {
    Feet(i32),
    FlightLevel(u16),
    Meters(f64),
    Ground,
    Unlimited,
}

const METERS_IN_FOOT: f64 = 3.28084;

fn is_gnd(s: Option<&str>) -> bool {
    s.is_some_and(|s| s.eq_ignore_ascii_case("GND"))
}

fn is_unl(s: Option<&str>) -> bool {
    s.is_some_and(|s| s.eq_ignore_ascii_case("UNL"))
}

impl VerticalLimit {
    /// Builds a limit from an AIXM `codeDistVer`/`valDistVer`/`uomDistVer`
    /// triple.
    ///
    /// `GND` and `UNL` ignore the numeric value. Unrecognized unit codes fall
    /// back to treating the value as already being in feet, matching the
    /// AIXM profile's most common `uomDistVer` value.
    pub fn from_aixm(code: Option<&str>, value: Option<f64>, unit: Option<&str>) -> Self {
        if matches!(code, Some("STD")) {
            return Self::FlightLevel(value.unwrap_or(0.0).round() as u16);
        }
        if is_gnd(code) || is_gnd(unit) {
            return Self::Ground;
        }
        if is_unl(code) || is_unl(unit) {
            return Self::Unlimited;
        }

        match unit {
            Some("FL") => Self::FlightLevel(value.unwrap_or(0.0).round() as u16),
            Some("M") => Self::Meters(value.unwrap_or(0.0)),
            Some("FT") | None => Self::Feet(value.unwrap_or(0.0).round() as i32),
            Some(_) => Self::Feet(value.unwrap_or(0.0).round() as i32),
        }
    }

    /// Normalizes this limit to feet MSL. `Unlimited` is represented as
    /// `f64::INFINITY`, never mixed back into arithmetic without an explicit
    /// check.
    pub fn to_feet(self) -> f64 {
        match self {
            Self::Feet(v) => v as f64,
            Self::FlightLevel(v) => v as f64 * 100.0,
            Self::Meters(v) => v * METERS_IN_FOOT,
            Self::Ground => 0.0,
            Self::Unlimited => f64::INFINITY,
        }
    }

    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl fmt::Display for VerticalLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feet(v) => write!(f, "{v} ft"),
            Self::FlightLevel(v) => write!(f, "FL{v}"),
            Self::Meters(v) => write!(f, "{v} m"),
            Self::Ground => write!(f, "GND"),
            Self::Unlimited => write!(f, "UNL"),
        }
    }
}

impl Eq for VerticalLimit {}

impl PartialOrd for VerticalLimit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VerticalLimit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_feet().partial_cmp(&other.to_feet()).unwrap_or(Ordering::Equal)
    }
}
