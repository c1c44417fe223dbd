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

//! Crossing results and their categorization into reporting buckets.

use serde::Serialize;

use crate::nd::AirspaceType;

/// One airspace the corridor crosses.
#[derive(Clone, Debug, Serialize)]
pub struct Crossing {
    pub airspace_id: i64,
    pub code_id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub airspace_type: String,
    pub class: Option<String>,
    pub min_alt_ft: f64,
    pub max_alt_ft: f64,
    pub distance_km: f64,
    pub entry_alt_ft: f64,
    pub exit_alt_ft: f64,
    pub critical: bool,
    pub category: Category,
}

/// Reporting buckets, per the categorization rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Category {
    Tma,
    Ras,
    ControlZone,
    Restricted,
    Prohibited,
    Danger,
    ClassA,
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tma => "TMAs",
            Self::Ras => "RAS",
            Self::ControlZone => "Control Zones (CTR)",
            Self::Restricted => "Restricted (R)",
            Self::Prohibited => "Prohibited (P)",
            Self::Danger => "Danger (D)",
            Self::ClassA => "Class-A",
            Self::Other => "Other",
        }
    }

    pub fn is_critical_bucket(&self) -> bool {
        matches!(self, Self::Restricted | Self::Prohibited | Self::ClassA)
    }
}

/// Picks the reporting bucket for an airspace type + class, favoring Class-A
/// over its structural type when both apply.
pub fn categorize(airspace_type: AirspaceType, class: Option<&str>) -> Category {
    if class == Some("A") {
        return Category::ClassA;
    }
    match airspace_type {
        AirspaceType::Tma => Category::Tma,
        AirspaceType::Ras => Category::Ras,
        AirspaceType::Ctr => Category::ControlZone,
        AirspaceType::R => Category::Restricted,
        AirspaceType::P => Category::Prohibited,
        AirspaceType::D | AirspaceType::DOther => Category::Danger,
        AirspaceType::Cta | AirspaceType::Other => Category::Other,
    }
}

/// A human-readable summary grouping crossings by [`Category`], with the
/// critical bucket highlighted.
pub fn summarize(crossings: &[Crossing]) -> String {
    use std::collections::BTreeMap;
    use std::fmt::Write;

    let mut buckets: BTreeMap<&'static str, Vec<&Crossing>> = BTreeMap::new();
    for crossing in crossings {
        buckets
            .entry(crossing.category.label())
            .or_default()
            .push(crossing);
    }

    let mut out = String::new();
    for (label, items) in &buckets {
        let critical_marker = if items.iter().any(|c| c.critical) {
            " [CRITICAL]"
        } else {
            ""
        };
        let _ = writeln!(out, "{label}{critical_marker}: {} crossing(s)", items.len());
        for item in items {
            let _ = writeln!(
                out,
                "  {} at {:.1} km ({:.0}-{:.0} ft)",
                item.code_id, item.distance_km, item.min_alt_ft, item.max_alt_ft
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_a_takes_priority_over_structural_type() {
        assert_eq!(categorize(AirspaceType::Tma, Some("A")), Category::ClassA);
    }

    #[test]
    fn restricted_and_prohibited_map_directly() {
        assert_eq!(categorize(AirspaceType::R, None), Category::Restricted);
        assert_eq!(categorize(AirspaceType::P, None), Category::Prohibited);
    }

    #[test]
    fn danger_and_d_other_share_a_bucket() {
        assert_eq!(categorize(AirspaceType::D, None), Category::Danger);
        assert_eq!(categorize(AirspaceType::DOther, None), Category::Danger);
    }

    #[test]
    fn summary_flags_critical_bucket() {
        let crossing = Crossing {
            airspace_id: 1,
            code_id: "LFP1".into(),
            name: None,
            airspace_type: "P".into(),
            class: None,
            min_alt_ft: 0.0,
            max_alt_ft: 2000.0,
            distance_km: 5.0,
            entry_alt_ft: 1000.0,
            exit_alt_ft: 1000.0,
            critical: true,
            category: Category::Prohibited,
        };
        let summary = summarize(&[crossing]);
        assert!(summary.contains("CRITICAL"));
    }
}
