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

//! Streaming parser for the AIXM 4.5 airspace extract profile used by the
//! French AIP.
//!
//! [`Features`] scans an XML byte slice and yields [`Feature::Airspace`] and
//! [`Feature::Border`] records in document order, without ever materializing
//! the whole DOM. Arc and circle boundary primitives are rasterized into
//! plain vertex sequences before they reach the caller.

mod error;
mod features;
mod parser;
mod xml;

pub use error::Error;
pub use features::{Airspace, Border, Feature, RawLimit};
pub use parser::Features;
