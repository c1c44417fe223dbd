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

//! Serde-deserializable structs that mirror the AIXM 4.5 XML structure used by
//! the French AIP airspace extract.
//!
//! These are internal types used by the parser. They map directly to the XML
//! nesting, then get rasterized and flattened into the public
//! [`Airspace`](crate::Airspace) and [`Border`](crate::Border) types.

#![allow(dead_code)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct AseXml {
    #[serde(rename = "AseUid")]
    pub uid: AseUidXml,
    #[serde(rename = "txtName", default)]
    pub txt_name: Option<String>,
    #[serde(rename = "codeClass", default)]
    pub code_class: Option<String>,
    #[serde(rename = "codeDistVerUpper", default)]
    pub code_dist_ver_upper: Option<String>,
    #[serde(rename = "valDistVerUpper", default)]
    pub val_dist_ver_upper: Option<String>,
    #[serde(rename = "uomDistVerUpper", default)]
    pub uom_dist_ver_upper: Option<String>,
    #[serde(rename = "codeDistVerLower", default)]
    pub code_dist_ver_lower: Option<String>,
    #[serde(rename = "valDistVerLower", default)]
    pub val_dist_ver_lower: Option<String>,
    #[serde(rename = "uomDistVerLower", default)]
    pub uom_dist_ver_lower: Option<String>,
    #[serde(rename = "Att", default)]
    pub att: Vec<AttXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AseUidXml {
    #[serde(rename = "codeType", default)]
    pub code_type: Option<String>,
    #[serde(rename = "codeId", default)]
    pub code_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttXml {
    #[serde(rename = "codeWorkHr", default)]
    pub code_work_hr: Option<String>,
    #[serde(rename = "txtRmk", default)]
    pub txt_rmk: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AbdXml {
    #[serde(rename = "AbdUid", default)]
    pub uid: Option<AbdUidXml>,
    #[serde(rename = "Avx", default)]
    pub vertices: Vec<AvxXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AbdUidXml {
    #[serde(rename = "AseUid", default)]
    pub ase_uid: Option<AseUidXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvxXml {
    #[serde(rename = "codeType", default)]
    pub code_type: Option<String>,
    #[serde(rename = "geoLat", default)]
    pub geo_lat: Option<String>,
    #[serde(rename = "geoLong", default)]
    pub geo_long: Option<String>,
    #[serde(rename = "geoLatArc", default)]
    pub geo_lat_arc: Option<String>,
    #[serde(rename = "geoLongArc", default)]
    pub geo_long_arc: Option<String>,
    #[serde(rename = "valRadiusArc", default)]
    pub val_radius_arc: Option<String>,
    #[serde(rename = "uomRadiusArc", default)]
    pub uom_radius_arc: Option<String>,
}
