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

use std::num::NonZeroUsize;
use std::sync::Mutex;

use geo::Polygon;
use log::trace;
use lru::LruCache;

use crate::error::Error;
use crate::store::Store;

use super::assembly::assemble_rings;

/// Assembles per-airspace polygon(s) on demand, caching the result.
///
/// The cache is an internally synchronized LRU (strict eviction, immutable
/// entries once built), matching the "many concurrent readers" resource
/// model: callers never see a half-built polygon.
pub struct GeometryLoader<'a> {
    store: &'a Store,
    cache: Mutex<LruCache<i64, Vec<Polygon<f64>>>>,
}

impl<'a> GeometryLoader<'a> {
    pub fn new(store: &'a Store, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            store,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the assembled polygon components for `airspace_id`, building
    /// and caching them on first access.
    pub fn load(&self, airspace_id: i64) -> Result<Vec<Polygon<f64>>, Error> {
        if let Some(hit) = self.cache.lock().unwrap().get(&airspace_id) {
            trace!("geometry cache hit for airspace {airspace_id}");
            return Ok(hit.clone());
        }

        trace!("geometry cache miss for airspace {airspace_id}, assembling rings");
        let borders = self.store.borders_for(airspace_id)?;
        let rings = assemble_rings(&borders);
        self.cache.lock().unwrap().put(airspace_id, rings.clone());
        Ok(rings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::VerticalLimit;
    use crate::nd::AirspaceType;
    use crate::store::{AirspaceRecord, BorderRecord};

    fn test_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store
            .bulk_insert(vec![AirspaceRecord {
                code_id: "LFR1".into(),
                code_type: AirspaceType::Tma,
                name: None,
                class: None,
                min_altitude: VerticalLimit::Ground,
                max_altitude: VerticalLimit::FlightLevel(65),
                operating_hours: None,
                remarks: None,
                borders: vec![BorderRecord {
                    vertices: vec![(48.0, 2.0), (49.0, 2.0), (49.0, 3.0), (48.0, 3.0)],
                }],
            }])
            .unwrap();
        store
    }

    #[test]
    fn loads_and_caches_polygon() {
        let store = test_store();
        let airspace = store.get_by_code("LFR1").unwrap().unwrap();
        let loader = GeometryLoader::new(&store, 4);

        let first = loader.load(airspace.id).unwrap();
        assert_eq!(first.len(), 1);

        // Second access should come from cache and return the same shape.
        let second = loader.load(airspace.id).unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn unknown_airspace_yields_no_components() {
        let store = test_store();
        let loader = GeometryLoader::new(&store, 4);
        let rings = loader.load(999).unwrap();
        assert!(rings.is_empty());
    }
}
