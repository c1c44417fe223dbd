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

use std::fmt::{Display, Formatter, Result};

use crate::measurements::VerticalLimit;

/// Closed set of AIXM airspace type tags this system understands.
///
/// Raw `codeType` strings that don't match any known variant collapse to
/// [`AirspaceType::DOther`], preserving the "other danger area" semantics
/// used in the French AIP dataset.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AirspaceType {
    Ras,
    Tma,
    Ctr,
    R,
    D,
    P,
    Cta,
    DOther,
    Other,
}

impl AirspaceType {
    /// Maps a raw AIXM `codeType` string onto the closed set.
    pub fn from_aixm_code(code: &str) -> Self {
        match code {
            "RAS" => Self::Ras,
            "TMA" => Self::Tma,
            "CTR" => Self::Ctr,
            "R" => Self::R,
            "D" => Self::D,
            "P" => Self::P,
            "CTA" => Self::Cta,
            "D-OTHER" => Self::DOther,
            _ => Self::DOther,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ras => "RAS",
            Self::Tma => "TMA",
            Self::Ctr => "CTR",
            Self::R => "R",
            Self::D => "D",
            Self::P => "P",
            Self::Cta => "CTA",
            Self::DOther => "D-OTHER",
            Self::Other => "other",
        }
    }

    /// Whether this type is automatically critical regardless of class,
    /// per the crossing categorization rules.
    pub fn is_inherently_critical(&self) -> bool {
        matches!(self, Self::P | Self::R)
    }
}

impl Display for AirspaceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

/// An airspace record as persisted by the airspace store, with vertical
/// limits normalized into [`VerticalLimit`] but not yet assembled into
/// geometry (that's the geometry loader's job, see
/// [`crate::geometry::GeometryLoader`]).
#[derive(Clone, Debug)]
pub struct Airspace {
    pub id: i64,
    pub code_id: String,
    pub code_type: AirspaceType,
    pub class: Option<String>,
    pub name: Option<String>,
    pub min_altitude: VerticalLimit,
    pub max_altitude: VerticalLimit,
    pub operating_hours: Option<String>,
    pub remarks: Option<String>,
}

impl Airspace {
    /// Whether a crossing of this airspace is critical: P/R type, or Class A.
    pub fn is_critical(&self) -> bool {
        self.code_type.is_inherently_critical() || self.class.as_deref() == Some("A")
    }
}

impl Display for Airspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.name {
            Some(name) => write!(
                f,
                "{} ({}): {}/{}",
                self.code_id, name, self.min_altitude, self.max_altitude
            ),
            None => write!(
                f,
                "{}: {}/{}",
                self.code_id, self.min_altitude, self.max_altitude
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_collapses_to_d_other() {
        assert_eq!(AirspaceType::from_aixm_code("XYZ"), AirspaceType::DOther);
    }

    #[test]
    fn restricted_and_prohibited_are_critical() {
        assert!(AirspaceType::R.is_inherently_critical());
        assert!(AirspaceType::P.is_inherently_critical());
        assert!(!AirspaceType::Tma.is_inherently_critical());
    }

    #[test]
    fn class_a_airspace_is_critical_even_if_type_is_not() {
        let a = Airspace {
            id: 1,
            code_id: "LFR1".into(),
            code_type: AirspaceType::Tma,
            class: Some("A".into()),
            name: None,
            min_altitude: VerticalLimit::Ground,
            max_altitude: VerticalLimit::FlightLevel(195),
            operating_hours: None,
            remarks: None,
        };
        assert!(a.is_critical());
    }
}
