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

//! Airspace corridor crossing analysis and flight profile correction.
//!
//! Given a flight path and an AIXM 4.5 airspace dataset, this crate answers
//! two questions: which airspaces does a buffered corridor around the path
//! cross ([`query::crossings`]), and what does a physically flyable vertical
//! profile for that path look like ([`profile::ProfileCorrector`]).

pub mod cancellation;
pub mod config;
pub mod corridor;
pub mod elevation;
pub mod error;
pub mod extract;
pub mod flightpath;
pub mod geometry;
pub mod measurements;
pub mod nd;
pub mod profile;
pub mod query;
pub mod report;
pub mod store;

pub use cancellation::CancellationToken;
pub use config::Config;
pub use corridor::Corridor;
pub use error::Error;
pub use flightpath::FlightPath;
pub use query::crossings;
pub use report::Crossing;
