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

//! Persistent, indexed storage of airspaces and their boundary components.
//!
//! The store is read-heavy after extraction: one exclusive writer during
//! [`Store::bulk_insert`], many concurrent readers otherwise. SQLite's own
//! locking gives us that for free; we don't add extra synchronization here.

mod statistics;

pub use statistics::Statistics;

use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::error::Error;
use crate::measurements::VerticalLimit;
use crate::nd::{Airspace, AirspaceType};

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        r#"
        CREATE TABLE airspaces (
            id INTEGER PRIMARY KEY,
            code_id TEXT NOT NULL,
            code_type TEXT NOT NULL,
            name TEXT,
            airspace_class TEXT,
            min_altitude_ft REAL NOT NULL,
            max_altitude_ft REAL NOT NULL,
            min_altitude_unit TEXT NOT NULL,
            max_altitude_unit TEXT NOT NULL,
            operating_hours TEXT,
            remarks TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX idx_airspaces_code_id ON airspaces(code_id);
        CREATE INDEX idx_airspaces_name ON airspaces(name);

        CREATE TABLE borders (
            id INTEGER PRIMARY KEY,
            airspace_id INTEGER NOT NULL REFERENCES airspaces(id),
            ordinal INTEGER NOT NULL
        );
        CREATE INDEX idx_borders_airspace_id ON borders(airspace_id);

        CREATE TABLE vertices (
            id INTEGER PRIMARY KEY,
            border_id INTEGER NOT NULL REFERENCES borders(id),
            ordinal INTEGER NOT NULL,
            lat REAL NOT NULL,
            lon REAL NOT NULL
        );
        CREATE INDEX idx_vertices_border_ordinal ON vertices(border_id, ordinal);
        "#,
    )])
}

/// A single border's vertex sequence, as handed to [`Store::bulk_insert`].
pub struct BorderRecord {
    pub vertices: Vec<(f64, f64)>,
}

/// One airspace plus its borders, as produced by the AIXM parser and handed
/// to [`Store::bulk_insert`].
pub struct AirspaceRecord {
    pub code_id: String,
    pub code_type: AirspaceType,
    pub name: Option<String>,
    pub class: Option<String>,
    pub min_altitude: VerticalLimit,
    pub max_altitude: VerticalLimit,
    pub operating_hours: Option<String>,
    pub remarks: Option<String>,
    pub borders: Vec<BorderRecord>,
}

fn unit_tag(limit: VerticalLimit) -> &'static str {
    match limit {
        VerticalLimit::Feet(_) => "FT",
        VerticalLimit::FlightLevel(_) => "FL",
        VerticalLimit::Meters(_) => "M",
        VerticalLimit::Ground => "GND",
        VerticalLimit::Unlimited => "UNL",
    }
}

fn unit_from_tag(tag: &str, feet: f64) -> VerticalLimit {
    match tag {
        "FL" => VerticalLimit::FlightLevel((feet / 100.0).round() as u16),
        "M" => VerticalLimit::Meters(feet / 3.28084),
        "GND" => VerticalLimit::Ground,
        "UNL" => VerticalLimit::Unlimited,
        _ => VerticalLimit::Feet(feet.round() as i32),
    }
}

/// SQLite-backed airspace store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if necessary) a store at `path`, running any pending
    /// migrations.
    pub fn open(path: &str) -> Result<Self, Error> {
        let mut conn = Connection::open(path)?;
        migrations()
            .to_latest(&mut conn)
            .map_err(Error::from)?;
        debug!("opened store at {path}, migrations up to date");
        Ok(Self { conn })
    }

    /// Opens an in-memory store, primarily for tests.
    pub fn open_in_memory() -> Result<Self, Error> {
        let mut conn = Connection::open_in_memory()?;
        migrations().to_latest(&mut conn).map_err(Error::from)?;
        Ok(Self { conn })
    }

    /// Transactionally inserts `records`. On a `code_id` conflict, the later
    /// record replaces the earlier one (its old borders/vertices are
    /// dropped first).
    pub fn bulk_insert(&mut self, records: Vec<AirspaceRecord>) -> Result<usize, Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        for record in records {
            let existing_id: Option<i64> = tx
                .query_row(
                    "SELECT id FROM airspaces WHERE code_id = ?1",
                    params![record.code_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(id) = existing_id {
                debug!("replacing existing airspace {} (code_id={})", id, record.code_id);
                tx.execute(
                    "DELETE FROM vertices WHERE border_id IN (SELECT id FROM borders WHERE airspace_id = ?1)",
                    params![id],
                )?;
                tx.execute("DELETE FROM borders WHERE airspace_id = ?1", params![id])?;
                tx.execute("DELETE FROM airspaces WHERE id = ?1", params![id])?;
            }

            tx.execute(
                "INSERT INTO airspaces (
                    code_id, code_type, name, airspace_class,
                    min_altitude_ft, max_altitude_ft, min_altitude_unit, max_altitude_unit,
                    operating_hours, remarks, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime('now'), datetime('now'))",
                params![
                    record.code_id,
                    record.code_type.as_str(),
                    record.name,
                    record.class,
                    record.min_altitude.to_feet(),
                    record.max_altitude.to_feet(),
                    unit_tag(record.min_altitude),
                    unit_tag(record.max_altitude),
                    record.operating_hours,
                    record.remarks,
                ],
            )?;
            let airspace_id = tx.last_insert_rowid();

            for (border_ordinal, border) in record.borders.into_iter().enumerate() {
                tx.execute(
                    "INSERT INTO borders (airspace_id, ordinal) VALUES (?1, ?2)",
                    params![airspace_id, border_ordinal as i64],
                )?;
                let border_id = tx.last_insert_rowid();

                for (vertex_ordinal, (lat, lon)) in border.vertices.into_iter().enumerate() {
                    tx.execute(
                        "INSERT INTO vertices (border_id, ordinal, lat, lon) VALUES (?1, ?2, ?3, ?4)",
                        params![border_id, vertex_ordinal as i64, lat, lon],
                    )?;
                }
            }

            inserted += 1;
        }

        tx.commit()?;
        info!("bulk_insert committed {inserted} airspace record(s)");
        Ok(inserted)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Airspace>, Error> {
        self.conn
            .query_row(
                "SELECT id, code_id, code_type, name, airspace_class,
                        min_altitude_ft, max_altitude_ft, min_altitude_unit, max_altitude_unit,
                        operating_hours, remarks
                 FROM airspaces WHERE id = ?1",
                params![id],
                row_to_airspace,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn get_by_code(&self, code_id: &str) -> Result<Option<Airspace>, Error> {
        self.conn
            .query_row(
                "SELECT id, code_id, code_type, name, airspace_class,
                        min_altitude_ft, max_altitude_ft, min_altitude_unit, max_altitude_unit,
                        operating_hours, remarks
                 FROM airspaces WHERE code_id = ?1",
                params![code_id],
                row_to_airspace,
            )
            .optional()
            .map_err(Error::from)
    }

    /// Substring match on name or code_id, ordered by `(code_type, code_id)`.
    pub fn search_by_keyword(
        &self,
        keyword: &str,
        case_sensitive: bool,
        limit: usize,
    ) -> Result<Vec<Airspace>, Error> {
        let pattern = format!("%{keyword}%");
        let sql = if case_sensitive {
            "SELECT id, code_id, code_type, name, airspace_class,
                    min_altitude_ft, max_altitude_ft, min_altitude_unit, max_altitude_unit,
                    operating_hours, remarks
             FROM airspaces
             WHERE (name GLOB ?1 OR code_id GLOB ?1)
             ORDER BY code_type, code_id LIMIT ?2"
        } else {
            "SELECT id, code_id, code_type, name, airspace_class,
                    min_altitude_ft, max_altitude_ft, min_altitude_unit, max_altitude_unit,
                    operating_hours, remarks
             FROM airspaces
             WHERE (name LIKE ?1 OR code_id LIKE ?1)
             ORDER BY code_type, code_id LIMIT ?2"
        };
        let glob_pattern = format!("*{keyword}*");
        let bind_pattern = if case_sensitive { &glob_pattern } else { &pattern };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![bind_pattern, limit as i64], row_to_airspace)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
    }

    /// Iterates airspaces that have at least one border, together with their
    /// assembled vertex rings, for building the spatial index.
    pub fn iter_all_with_geometry(&self) -> Result<Vec<(Airspace, Vec<Vec<(f64, f64)>>)>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code_id, code_type, name, airspace_class,
                    min_altitude_ft, max_altitude_ft, min_altitude_unit, max_altitude_unit,
                    operating_hours, remarks
             FROM airspaces
             WHERE EXISTS (SELECT 1 FROM borders WHERE borders.airspace_id = airspaces.id)",
        )?;
        let airspaces: Vec<Airspace> = stmt
            .query_map(params![], row_to_airspace)?
            .collect::<Result<_, _>>()?;

        let mut result = Vec::with_capacity(airspaces.len());
        for airspace in airspaces {
            let rings = self.borders_for(airspace.id)?;
            result.push((airspace, rings));
        }
        Ok(result)
    }

    /// Ordered vertex rings for every border of `airspace_id`, borders sorted
    /// by ordinal and vertices within a border sorted by ordinal.
    pub fn borders_for(&self, airspace_id: i64) -> Result<Vec<Vec<(f64, f64)>>, Error> {
        let mut border_stmt = self
            .conn
            .prepare("SELECT id FROM borders WHERE airspace_id = ?1 ORDER BY ordinal")?;
        let border_ids: Vec<i64> = border_stmt
            .query_map(params![airspace_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut vertex_stmt = self
            .conn
            .prepare("SELECT lat, lon FROM vertices WHERE border_id = ?1 ORDER BY ordinal")?;

        border_ids
            .into_iter()
            .map(|border_id| {
                vertex_stmt
                    .query_map(params![border_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<(f64, f64)>, _>>()
                    .map_err(Error::from)
            })
            .collect()
    }

    pub fn get_statistics(&self) -> Result<Statistics, Error> {
        statistics::compute(&self.conn)
    }
}

fn row_to_airspace(row: &rusqlite::Row) -> rusqlite::Result<Airspace> {
    let code_type: String = row.get(2)?;
    let min_ft: f64 = row.get(5)?;
    let max_ft: f64 = row.get(6)?;
    let min_unit: String = row.get(7)?;
    let max_unit: String = row.get(8)?;

    Ok(Airspace {
        id: row.get(0)?,
        code_id: row.get(1)?,
        code_type: AirspaceType::from_aixm_code(&code_type),
        name: row.get(3)?,
        class: row.get(4)?,
        min_altitude: unit_from_tag(&min_unit, min_ft),
        max_altitude: unit_from_tag(&max_unit, max_ft),
        operating_hours: row.get(9)?,
        remarks: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_record(code_id: &str) -> AirspaceRecord {
        AirspaceRecord {
            code_id: code_id.to_string(),
            code_type: AirspaceType::Tma,
            name: Some("Test TMA".into()),
            class: Some("A".into()),
            min_altitude: VerticalLimit::Ground,
            max_altitude: VerticalLimit::FlightLevel(65),
            operating_hours: Some("H24".into()),
            remarks: None,
            borders: vec![BorderRecord {
                vertices: vec![(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)],
            }],
        }
    }

    #[test]
    fn bulk_insert_then_get_by_code_round_trips() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_insert(vec![square_record("LFR1")]).unwrap();

        let airspace = store.get_by_code("LFR1").unwrap().unwrap();
        assert_eq!(airspace.code_id, "LFR1");
        assert_eq!(airspace.max_altitude, VerticalLimit::FlightLevel(65));
        assert!(airspace.is_critical());
    }

    #[test]
    fn bulk_insert_replaces_on_code_conflict() {
        let mut store = Store::open_in_memory().unwrap();
        store.bulk_insert(vec![square_record("LFR1")]).unwrap();

        let mut updated = square_record("LFR1");
        updated.name = Some("Updated name".into());
        store.bulk_insert(vec![updated]).unwrap();

        let airspace = store.get_by_code("LFR1").unwrap().unwrap();
        assert_eq!(airspace.name.as_deref(), Some("Updated name"));

        let stats = store.get_statistics().unwrap();
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn search_by_keyword_matches_name_or_code() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .bulk_insert(vec![square_record("LFR1"), square_record("LFP2")])
            .unwrap();

        let results = store.search_by_keyword("LFR", false, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code_id, "LFR1");
    }

    #[test]
    fn iter_all_with_geometry_skips_airspaces_without_borders() {
        let mut store = Store::open_in_memory().unwrap();
        let mut no_border = square_record("LFR2");
        no_border.borders.clear();
        store
            .bulk_insert(vec![square_record("LFR1"), no_border])
            .unwrap();

        let results = store.iter_all_with_geometry().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.code_id, "LFR1");
        assert_eq!(results[0].1.len(), 1);
        assert_eq!(results[0].1[0].len(), 4);
    }
}
