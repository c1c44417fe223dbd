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

//! AIXM 4.5 feature types yielded by the [`Features`](crate::Features)
//! iterator.
//!
//! Each type is deserialized directly from the AIXM XML using serde. Vertex
//! sequences that use arc or circle primitives are rasterized into line
//! segments before they reach the caller, so consumers only ever see ordered
//! `(lat, lon)` decimal-degree points.

use crate::error::Error;
use crate::xml::{AbdXml, AseXml, AvxXml};

/// Maximum number of vertices a single arc is rasterized into.
const MAX_ARC_VERTICES: usize = 128;

/// At least one vertex per degree of arc swept.
const MIN_VERTICES_PER_DEGREE: f64 = 1.0;

/// A parsed AIXM 4.5 feature yielded by [`Features`](crate::Features).
pub enum Feature {
    /// An airspace header (AIXM `Ase`).
    Airspace(Airspace),
    /// An airspace boundary component (AIXM `Abd`), already rasterized.
    Border(Border),
}

/// A vertical limit as found verbatim in the XML (`codeDistVer`,
/// `valDistVer`, `uomDistVer`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawLimit {
    /// `ALT`, `STD` or `HEI`; `None` when the element was entirely absent.
    pub code: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

/// An airspace header from an AIXM `Ase` element.
#[derive(Debug)]
pub struct Airspace {
    raw: AseXml,
}

impl Airspace {
    pub(crate) fn new(raw: AseXml) -> Self {
        Self { raw }
    }

    /// The stable, SIA-assigned code (e.g. `LFR35A`). Never empty for a
    /// well-formed `Ase`.
    pub fn code_id(&self) -> Result<&str, Error> {
        self.raw
            .uid
            .code_id
            .as_deref()
            .ok_or(Error::MissingField("AseUid/codeId"))
    }

    /// The raw AIXM type string (e.g. `TMA`, `D-OTHER`).
    pub fn code_type(&self) -> Option<&str> {
        self.raw.uid.code_type.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.txt_name.as_deref()
    }

    /// ICAO class letter, if published.
    pub fn class(&self) -> Option<&str> {
        self.raw.code_class.as_deref()
    }

    pub fn upper_limit(&self) -> RawLimit {
        RawLimit {
            code: self.raw.code_dist_ver_upper.clone(),
            value: self.raw.val_dist_ver_upper.as_deref().and_then(parse_f64),
            unit: self.raw.uom_dist_ver_upper.clone(),
        }
    }

    pub fn lower_limit(&self) -> RawLimit {
        RawLimit {
            code: self.raw.code_dist_ver_lower.clone(),
            value: self.raw.val_dist_ver_lower.as_deref().and_then(parse_f64),
            unit: self.raw.uom_dist_ver_lower.clone(),
        }
    }

    /// Operating hours, taken from the first `Att` that carries a
    /// `codeWorkHr` value.
    pub fn operating_hours(&self) -> Option<&str> {
        self.raw
            .att
            .iter()
            .find_map(|a| a.code_work_hr.as_deref())
    }

    /// Free-text remarks, taken from the first `Att` that carries a
    /// `txtRmk` value.
    pub fn remarks(&self) -> Option<&str> {
        self.raw.att.iter().find_map(|a| a.txt_rmk.as_deref())
    }
}

/// An airspace boundary component from an AIXM `Abd` element, with all arc
/// and circle primitives already rasterized into `(lat, lon)` points.
#[derive(Debug)]
pub struct Border {
    /// The `codeId` of the `Ase` this border belongs to, read from the
    /// border's `AbdUid/AseUid` back-reference.
    pub ase_code_id: Option<String>,
    /// The `codeType` of the `Ase` this border belongs to.
    pub ase_code_type: Option<String>,
    /// Ordered vertex sequence in decimal degrees, `(lat, lon)`.
    pub vertices: Vec<(f64, f64)>,
}

impl Border {
    pub(crate) fn from_xml(raw: AbdXml) -> Result<Self, Error> {
        let (ase_code_id, ase_code_type) = match raw.uid {
            Some(uid) => match uid.ase_uid {
                Some(ase_uid) => (ase_uid.code_id, ase_uid.code_type),
                None => (None, None),
            },
            None => (None, None),
        };

        let mut vertices = Vec::new();
        let mut prev: Option<(f64, f64)> = None;

        for avx in &raw.vertices {
            let point = decode_vertex(avx)?;

            match (prev, avx.code_type.as_deref()) {
                (Some(start), Some("CWA")) | (Some(start), Some("CCA")) => {
                    let clockwise = avx.code_type.as_deref() == Some("CWA");
                    let arc = rasterize_arc(start, point, avx, clockwise)?;
                    vertices.extend(arc);
                }
                _ => vertices.push(point),
            }

            prev = Some(point);
        }

        Ok(Self {
            ase_code_id,
            ase_code_type,
            vertices,
        })
    }
}

/// Decodes a single `Avx` vertex's own coordinate (`geoLat`/`geoLong`), not
/// the arc center.
fn decode_vertex(avx: &AvxXml) -> Result<(f64, f64), Error> {
    let lat = avx
        .geo_lat
        .as_deref()
        .ok_or(Error::MissingField("Avx/geoLat"))?;
    let lon = avx
        .geo_long
        .as_deref()
        .ok_or(Error::MissingField("Avx/geoLong"))?;

    Ok((
        parse_dms(lat, true).ok_or_else(|| Error::InvalidValue {
            field: "Avx/geoLat",
            value: lat.to_string(),
        })?,
        parse_dms(lon, false).ok_or_else(|| Error::InvalidValue {
            field: "Avx/geoLong",
            value: lon.to_string(),
        })?,
    ))
}

/// Rasterizes a clockwise/counter-clockwise arc from `start` to `end` around
/// the center carried in `avx` (`geoLatArc`/`geoLongArc`).
///
/// Uses a local equirectangular projection anchored at the arc center, which
/// is adequate for the short radii (a handful of nautical miles) that occur
/// in published airspace boundaries.
fn rasterize_arc(
    start: (f64, f64),
    end: (f64, f64),
    avx: &AvxXml,
    clockwise: bool,
) -> Result<Vec<(f64, f64)>, Error> {
    let center_lat = avx
        .geo_lat_arc
        .as_deref()
        .and_then(|s| parse_dms(s, true))
        .ok_or(Error::MissingField("Avx/geoLatArc"))?;
    let center_lon = avx
        .geo_long_arc
        .as_deref()
        .and_then(|s| parse_dms(s, false))
        .ok_or(Error::MissingField("Avx/geoLongArc"))?;

    let cos_lat = center_lat.to_radians().cos().max(1e-6);

    let project = |p: (f64, f64)| -> (f64, f64) {
        ((p.1 - center_lon) * cos_lat, p.0 - center_lat)
    };
    let unproject = |(x, y): (f64, f64)| -> (f64, f64) { (y + center_lat, x / cos_lat + center_lon) };

    let (sx, sy) = project(start);
    let (ex, ey) = project(end);

    let start_angle = sy.atan2(sx);
    let mut end_angle = ey.atan2(ex);
    let radius = (sx * sx + sy * sy).sqrt();

    // Normalize the sweep direction to match the published rotation sense.
    if clockwise && end_angle > start_angle {
        end_angle -= std::f64::consts::PI * 2.0;
    } else if !clockwise && end_angle < start_angle {
        end_angle += std::f64::consts::PI * 2.0;
    }

    let sweep_deg = (end_angle - start_angle).abs().to_degrees();
    let steps = ((sweep_deg * MIN_VERTICES_PER_DEGREE).ceil() as usize)
        .max(1)
        .min(MAX_ARC_VERTICES);

    let mut points = Vec::with_capacity(steps);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let angle = start_angle + (end_angle - start_angle) * t;
        let (x, y) = (radius * angle.cos(), radius * angle.sin());
        points.push(unproject((x, y)));
    }

    Ok(points)
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

/// Parses a fixed-width AIXM DMS coordinate.
///
/// Latitude: `DDMMSS.ss` followed by `N`/`S`, e.g. `485948.00N`.
/// Longitude: `DDDMMSS.ss` followed by `E`/`W`, e.g. `0022741.00E`.
pub(crate) fn parse_dms(s: &str, is_lat: bool) -> Option<f64> {
    let s = s.trim();
    let (digits, hemi) = s.split_at(s.len().checked_sub(1)?);
    let sign = match hemi {
        "N" | "E" => 1.0,
        "S" | "W" => -1.0,
        _ => return None,
    };

    let deg_len = if is_lat { 2 } else { 3 };
    if digits.len() < deg_len + 4 {
        return None;
    }

    let (deg_str, rest) = digits.split_at(deg_len);
    let (min_str, sec_str) = rest.split_at(2);

    let degrees: f64 = deg_str.parse().ok()?;
    let minutes: f64 = min_str.parse().ok()?;
    let seconds: f64 = sec_str.parse().ok()?;

    let max_deg = if is_lat { 90.0 } else { 180.0 };
    if degrees > max_deg || minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }

    Some(sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}
