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

use std::collections::BTreeMap;

use rusqlite::{params, Connection};

use crate::error::Error;

/// Store-wide counts, used by the CLI's `extract` summary.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Fraction (0.0-1.0) of airspaces that have at least one border.
    pub geometry_coverage: f64,
}

pub(super) fn compute(conn: &Connection) -> Result<Statistics, Error> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM airspaces", params![], |r| r.get(0))?;

    let mut by_type = BTreeMap::new();
    let mut stmt = conn.prepare("SELECT code_type, COUNT(*) FROM airspaces GROUP BY code_type")?;
    let rows = stmt.query_map(params![], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
    })?;
    for row in rows {
        let (code_type, count) = row?;
        by_type.insert(code_type, count);
    }

    let with_geometry: usize = conn.query_row(
        "SELECT COUNT(DISTINCT airspace_id) FROM borders",
        params![],
        |r| r.get(0),
    )?;

    let geometry_coverage = if total == 0 {
        0.0
    } else {
        with_geometry as f64 / total as f64
    };

    Ok(Statistics {
        total,
        by_type,
        geometry_coverage,
    })
}
