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

//! Terrain elevation lookups for the profile corrector's climb/descent
//! anchors.
//!
//! Backed by the Open-Elevation public API by default. A lookup that can't
//! complete within its budget degrades to a 0 ft estimate rather than
//! failing the whole correction; callers that care are told via
//! [`Sample::estimated`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{trace, warn};
use serde::Deserialize;

use crate::error::Error;

const DEFAULT_URL: &str = "https://api.open-elevation.com/api/v1/lookup";

/// Coordinates are rounded to 5 decimal places (roughly 1 m) before being
/// used as a cache key, matching the precision this oracle is meaningful to.
fn cache_key(lat: f64, lon: f64) -> (i64, i64) {
    ((lat * 1e5).round() as i64, (lon * 1e5).round() as i64)
}

/// One elevation result: either a real sample from the oracle, or a
/// graceful-degradation estimate after a timeout/network failure.
#[derive(Copy, Clone, Debug)]
pub struct Sample {
    pub elevation_ft: f64,
    pub estimated: bool,
}

#[derive(Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Deserialize)]
struct LookupResult {
    elevation: f64,
}

/// A terrain elevation oracle with an in-memory cache and an overall time
/// budget shared across every call made through one instance.
pub struct Elevation {
    client: reqwest::blocking::Client,
    url: String,
    cache: Mutex<HashMap<(i64, i64), Sample>>,
    deadline: Instant,
}

impl Elevation {
    /// Builds an oracle hitting `url` (defaults to the Open-Elevation public
    /// API), with `per_call_timeout` applied to each HTTP request and
    /// `overall_budget` applied across every [`Elevation::sample`] call this
    /// instance makes.
    pub fn new(
        url: Option<String>,
        per_call_timeout: Duration,
        overall_budget: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(per_call_timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            cache: Mutex::new(HashMap::new()),
            deadline: Instant::now() + overall_budget,
        })
    }

    /// Looks up the terrain elevation under `(lat, lon)`, in feet.
    ///
    /// Returns a cached value when available. Once the overall budget is
    /// exhausted, or on any network/timeout error, returns a degraded sample
    /// (`0.0` ft, `estimated: true`) rather than propagating the error: a
    /// flight-profile correction should still produce a usable result when
    /// the oracle is flaky.
    pub fn sample(&self, lat: f64, lon: f64) -> Sample {
        let key = cache_key(lat, lon);
        if let Some(hit) = self.cache.lock().unwrap().get(&key) {
            trace!("elevation cache hit for ({lat:.5}, {lon:.5})");
            return *hit;
        }

        if Instant::now() >= self.deadline {
            warn!("elevation budget exhausted, falling back to 0 ft estimate for ({lat:.5}, {lon:.5})");
            return self.degrade(key);
        }

        match self.fetch(lat, lon) {
            Ok(elevation_m) => {
                let sample = Sample {
                    elevation_ft: elevation_m * 3.28084,
                    estimated: false,
                };
                self.cache.lock().unwrap().insert(key, sample);
                sample
            }
            Err(e) => {
                warn!("elevation lookup for ({lat:.5}, {lon:.5}) failed ({e}), falling back to 0 ft estimate");
                self.degrade(key)
            }
        }
    }

    fn degrade(&self, key: (i64, i64)) -> Sample {
        let sample = Sample {
            elevation_ft: 0.0,
            estimated: true,
        };
        self.cache.lock().unwrap().insert(key, sample);
        sample
    }

    fn fetch(&self, lat: f64, lon: f64) -> Result<f64, Error> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("locations", format!("{lat},{lon}"))])
            .send()?
            .error_for_status()?;

        let parsed: LookupResponse = response.json()?;
        parsed
            .results
            .first()
            .map(|r| r.elevation)
            .ok_or_else(|| Error::Internal("elevation oracle returned no results".into()))
    }
}
