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

//! Error kinds shared across the store, query engine and profile corrector.

use std::fmt;

/// A diagnostic describing one skipped record, kept alongside the
/// [`Error::DatasetIncomplete`] that reports the batch outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub record_index: usize,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(record_index: usize, reason: impl Into<String>) -> Self {
        Self {
            record_index,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}", self.record_index, self.reason)
    }
}

#[derive(Debug)]
pub enum Error {
    /// Input could not be parsed at all (malformed XML/KML).
    InputMalformed(String),
    /// Input was well-formed but uses a format/profile this system doesn't
    /// support.
    InputUnsupported(String),
    /// The referenced dataset (SQLite database, AIXM file) does not exist or
    /// cannot be opened.
    DatasetMissing(String),
    /// Extraction completed but below the acceptable success threshold, or a
    /// read found fewer usable records than expected.
    DatasetIncomplete(Vec<Diagnostic>),
    /// The terrain elevation oracle could not be reached.
    NetworkUnavailable(String),
    /// A network call or overall budget exceeded its deadline.
    Timeout(String),
    /// The caller's cancellation signal was observed.
    Cancelled,
    /// Anything else: a broken invariant, a corrupt cache entry, etc.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputMalformed(msg) => write!(f, "malformed input: {msg}"),
            Error::InputUnsupported(msg) => write!(f, "unsupported input: {msg}"),
            Error::DatasetMissing(msg) => write!(f, "dataset missing: {msg}"),
            Error::DatasetIncomplete(diags) => {
                write!(f, "dataset incomplete: {} record(s) skipped", diags.len())
            }
            Error::NetworkUnavailable(msg) => write!(f, "network unavailable: {msg}"),
            Error::Timeout(msg) => write!(f, "timeout: {msg}"),
            Error::Cancelled => write!(f, "operation cancelled"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<aixm::Error> for Error {
    fn from(e: aixm::Error) -> Self {
        Error::InputMalformed(e.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

impl From<rusqlite_migration::Error> for Error {
    fn from(e: rusqlite_migration::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

impl From<kml::Error> for Error {
    fn from(e: kml::Error) -> Self {
        Error::InputMalformed(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::NetworkUnavailable(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::DatasetMissing(e.to_string())
    }
}
