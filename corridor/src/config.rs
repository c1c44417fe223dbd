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

//! Named configuration options shared by the corridor builder, query engine
//! and profile corrector.

/// Tunable parameters, each defaulting to the values the system ships with.
#[derive(Copy, Clone, Debug)]
pub struct Config {
    pub corridor_height_ft: f64,
    pub corridor_width_nm: f64,
    pub climb_rate_ftpm: f64,
    pub descent_rate_ftpm: f64,
    pub ground_speed_kt: f64,
    pub geometry_cache_size: usize,
    pub elevation_timeout_s: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corridor_height_ft: 1000.0,
            corridor_width_nm: 10.0,
            climb_rate_ftpm: 500.0,
            descent_rate_ftpm: 500.0,
            ground_speed_kt: 100.0,
            geometry_cache_size: 1024,
            elevation_timeout_s: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.corridor_height_ft, 1000.0);
        assert_eq!(config.corridor_width_nm, 10.0);
        assert_eq!(config.climb_rate_ftpm, 500.0);
        assert_eq!(config.descent_rate_ftpm, 500.0);
        assert_eq!(config.ground_speed_kt, 100.0);
        assert_eq!(config.geometry_cache_size, 1024);
        assert_eq!(config.elevation_timeout_s, 5);
    }
}
