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

//! Streaming AIXM 4.5 XML parser.
//!
//! Scans the XML byte stream for `Ase` and `Abd` elements and deserializes
//! each subtree with serde. Peak memory is independent of document size: only
//! one feature's subtree is ever materialized at a time.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Error;
use crate::features::{Airspace, Border, Feature};
use crate::xml::{AbdXml, AseXml};

/// Streaming iterator over AIXM 4.5 features (`Ase`, `Abd`) in an XML
/// document.
///
/// All other elements are silently skipped. Yields features in document
/// order, which callers rely on for deterministic ordinal assignment.
pub struct Features<'a> {
    reader: Reader<&'a [u8]>,
    data: &'a [u8],
    buf: Vec<u8>,
}

impl<'a> Features<'a> {
    /// Creates a new streaming parser from an AIXM 4.5 XML byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            data,
            buf: Vec::new(),
        }
    }
}

impl<'a> Iterator for Features<'a> {
    type Item = Result<Feature, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let local = local_name(name.as_ref());

                    let kind = match local {
                        b"Ase" => FeatureKind::Ase,
                        b"Abd" => FeatureKind::Abd,
                        _ => continue,
                    };

                    let tag = String::from_utf8_lossy(e.as_ref()).to_string();
                    let end = e.to_end().into_owned();
                    let result = self
                        .reader
                        .read_to_end(end.name())
                        .map_err(Error::from)
                        .and_then(|span| {
                            let content = std::str::from_utf8(
                                &self.data[span.start as usize..span.end as usize],
                            )?;
                            let end_name = end.name();
                            let end_tag = std::str::from_utf8(end_name.as_ref())?;
                            let xml = format!("<{tag}>{content}</{end_tag}>");
                            deserialize_feature(kind, &xml)
                        });

                    return Some(result);
                }
                Ok(Event::Eof) => return None,
                Err(e) => return Some(Err(e.into())),
                _ => continue,
            }
        }
    }
}

enum FeatureKind {
    Ase,
    Abd,
}

fn deserialize_feature(kind: FeatureKind, xml: &str) -> Result<Feature, Error> {
    Ok(match kind {
        FeatureKind::Ase => {
            let raw: AseXml = quick_xml::de::from_str(xml)?;
            Feature::Airspace(Airspace::new(raw))
        }
        FeatureKind::Abd => {
            let raw: AbdXml = quick_xml::de::from_str(xml)?;
            Feature::Border(Border::from_xml(raw)?)
        }
    })
}

/// Returns the local name portion of a possibly namespace-prefixed XML name.
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .position(|&b| b == b':')
        .map_or(name, |pos| &name[pos + 1..])
}
