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

//! Turns a stream of raw [`aixm::Feature`]s into [`AirspaceRecord`]s ready
//! for [`Store::bulk_insert`].
//!
//! `Ase` and `Abd` elements arrive independently and in document order;
//! borders are matched to their owning airspace by `code_id` after the fact,
//! since a border may appear before or after its airspace in the source
//! document.

use std::collections::HashMap;

use aixm::{Feature, Features};
use log::{debug, warn};

use crate::error::{Diagnostic, Error};
use crate::measurements::VerticalLimit;
use crate::nd::AirspaceType;
use crate::store::{AirspaceRecord, BorderRecord};

/// Minimum fraction of input records that must parse cleanly for extraction
/// to be considered successful.
const MIN_SUCCESS_RATE: f64 = 0.95;

/// Parses `xml` into [`AirspaceRecord`]s, accumulating a diagnostic for every
/// record that fails to decode rather than aborting the whole batch.
///
/// Returns `Err(Error::DatasetIncomplete)` if the overall success rate falls
/// below [`MIN_SUCCESS_RATE`]; callers that only care about the usable
/// records can still reach them via the error's diagnostics list length
/// compared to the reported record count in the log output.
pub fn extract(xml: &[u8]) -> Result<Vec<AirspaceRecord>, Error> {
    let mut airspaces: Vec<AirspaceRecord> = Vec::new();
    let mut index_by_code: HashMap<String, usize> = HashMap::new();
    let mut pending_borders: Vec<(String, BorderRecord)> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut total = 0usize;

    for (i, feature) in Features::new(xml).enumerate() {
        total += 1;
        match feature {
            Ok(Feature::Airspace(ase)) => match record_from_airspace(&ase) {
                Ok(record) => {
                    index_by_code.insert(record.code_id.clone(), airspaces.len());
                    airspaces.push(record);
                }
                Err(reason) => {
                    warn!("skipping malformed Ase at record {i}: {reason}");
                    diagnostics.push(Diagnostic::new(i, reason));
                }
            },
            Ok(Feature::Border(abd)) => match abd.ase_code_id {
                Some(code_id) if abd.vertices.len() >= 3 => {
                    pending_borders.push((code_id, BorderRecord { vertices: abd.vertices }));
                }
                Some(_) => {
                    diagnostics.push(Diagnostic::new(i, "border has fewer than 3 vertices"));
                }
                None => {
                    diagnostics.push(Diagnostic::new(i, "border has no owning airspace"));
                }
            },
            Err(e) => {
                warn!("skipping unparsable feature at record {i}: {e}");
                diagnostics.push(Diagnostic::new(i, e.to_string()));
            }
        }
    }

    for (code_id, border) in pending_borders {
        if let Some(&idx) = index_by_code.get(&code_id) {
            airspaces[idx].borders.push(border);
        } else {
            diagnostics.push(Diagnostic::new(
                total,
                format!("border references unknown airspace {code_id}"),
            ));
        }
    }

    debug!(
        "extracted {} airspace(s), {} diagnostic(s) out of {} record(s)",
        airspaces.len(),
        diagnostics.len(),
        total
    );

    if total > 0 {
        let success_rate = 1.0 - (diagnostics.len() as f64 / total as f64);
        if success_rate < MIN_SUCCESS_RATE {
            return Err(Error::DatasetIncomplete(diagnostics));
        }
    }

    Ok(airspaces)
}

fn record_from_airspace(ase: &aixm::Airspace) -> Result<AirspaceRecord, String> {
    let code_id = ase.code_id().map_err(|e| e.to_string())?.to_string();
    let code_type = AirspaceType::from_aixm_code(ase.code_type().unwrap_or(""));

    let upper = ase.upper_limit();
    let lower = ase.lower_limit();
    let max_altitude = VerticalLimit::from_aixm(upper.code.as_deref(), upper.value, upper.unit.as_deref());
    let min_altitude = VerticalLimit::from_aixm(lower.code.as_deref(), lower.value, lower.unit.as_deref());

    Ok(AirspaceRecord {
        code_id,
        code_type,
        name: ase.name().map(str::to_string),
        class: ase.class().map(str::to_string),
        min_altitude,
        max_altitude,
        operating_hours: ase.operating_hours().map(str::to_string),
        remarks: ase.remarks().map(str::to_string),
        borders: Vec::new(),
    })
}
