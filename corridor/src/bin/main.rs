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

//! `corridor` CLI: extracts an AIXM dataset, reports corridor crossings, and
//! corrects a flight profile.

use std::fmt::Write as _;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use corridor::cancellation::CancellationToken;
use corridor::config::Config;
use corridor::elevation::Elevation;
use corridor::error::Error;
use corridor::flightpath::FlightPath;
use corridor::geometry::GeometryLoader;
use corridor::nd::{bounding_rect, AirspaceIndex};
use corridor::profile::ProfileCorrector;
use corridor::store::Store;
use corridor::{extract, query, report};

#[derive(Parser)]
#[command(name = "corridor", about = "Airspace corridor crossing analysis and flight profile correction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an AIXM 4.5 file and persist it into a SQLite store.
    Extract {
        aixm_file: String,
        db_path: String,
    },
    /// Report which airspaces a route's buffered corridor crosses.
    Crossings {
        db_path: String,
        route_kml: String,
        #[arg(long, default_value_t = Config::default().corridor_width_nm)]
        width_nm: f64,
        #[arg(long, default_value_t = Config::default().corridor_height_ft)]
        height_ft: f64,
    },
    /// Rewrite a route's altitudes into a flyable climb/cruise/descent profile.
    CorrectProfile {
        route_kml: String,
        #[arg(long, default_value_t = Config::default().climb_rate_ftpm)]
        climb_fpm: f64,
        #[arg(long, default_value_t = Config::default().descent_rate_ftpm)]
        descent_fpm: f64,
        #[arg(long, default_value_t = Config::default().ground_speed_kt)]
        ground_speed_kt: f64,
        #[arg(long)]
        elevation_url: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Extract { aixm_file, db_path } => run_extract(&aixm_file, &db_path),
        Command::Crossings {
            db_path,
            route_kml,
            width_nm,
            height_ft,
        } => run_crossings(&db_path, &route_kml, width_nm, height_ft),
        Command::CorrectProfile {
            route_kml,
            climb_fpm,
            descent_fpm,
            ground_speed_kt,
            elevation_url,
        } => run_correct_profile(&route_kml, climb_fpm, descent_fpm, ground_speed_kt, elevation_url),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn exit_code_for(e: &Error) -> u8 {
    match e {
        Error::InputMalformed(_) | Error::InputUnsupported(_) => 2,
        Error::DatasetMissing(_) => 3,
        Error::DatasetIncomplete(_) => 4,
        Error::NetworkUnavailable(_) | Error::Timeout(_) => 5,
        Error::Cancelled | Error::Internal(_) => 4,
    }
}

fn run_extract(aixm_file: &str, db_path: &str) -> Result<(), Error> {
    let started = Instant::now();
    let xml = std::fs::read(aixm_file)?;

    let records = match extract::extract(&xml) {
        Ok(records) => records,
        Err(Error::DatasetIncomplete(diags)) => {
            for diag in &diags {
                warn!("{diag}");
            }
            return Err(Error::DatasetIncomplete(diags));
        }
        Err(e) => return Err(e),
    };

    let mut store = Store::open(db_path)?;
    let inserted = store.bulk_insert(records)?;
    info!("extracted and inserted {inserted} airspace(s) in {:?}", started.elapsed());

    let stats = store.get_statistics()?;
    println!(
        "{} airspaces, {:.1}% with geometry",
        stats.total,
        stats.geometry_coverage * 100.0
    );
    Ok(())
}

fn run_crossings(db_path: &str, route_kml: &str, width_nm: f64, height_ft: f64) -> Result<(), Error> {
    let started = Instant::now();
    let store = Store::open(db_path)?;
    let xml = std::fs::read_to_string(route_kml)?;
    let path = FlightPath::from_kml(&xml)?;

    let with_geometry = store.iter_all_with_geometry()?;
    let index = AirspaceIndex::build(with_geometry.into_iter().filter_map(|(a, rings)| {
        let flat: Vec<(f64, f64)> = rings.into_iter().flatten().collect();
        bounding_rect(&flat).map(|r| (a.id, r))
    }));

    let config = Config::default();
    let loader = GeometryLoader::new(&store, config.geometry_cache_size);
    let cancellation = CancellationToken::new();

    let crossings = query::crossings(&path, width_nm, height_ft, &index, &store, &loader, &cancellation)?;
    info!("query over {} candidate(s) completed in {:?}", crossings.len(), started.elapsed());

    eprintln!("{}", report::summarize(&crossings));
    println!("{}", serde_json::to_string(&crossings).map_err(|e| Error::Internal(e.to_string()))?);
    Ok(())
}

fn run_correct_profile(
    route_kml: &str,
    climb_fpm: f64,
    descent_fpm: f64,
    ground_speed_kt: f64,
    elevation_url: Option<String>,
) -> Result<(), Error> {
    let xml = std::fs::read_to_string(route_kml)?;
    let path = FlightPath::from_kml(&xml)?;

    let config = Config::default();
    let elevation = Elevation::new(
        elevation_url,
        Duration::from_secs(config.elevation_timeout_s),
        Duration::from_secs(config.elevation_timeout_s * path.waypoints().len() as u64),
    )?;

    let corrector = ProfileCorrector::new(climb_fpm, descent_fpm, ground_speed_kt);
    let result = corrector.correct(&path, &elevation)?;

    if result.elevation_estimated {
        warn!("one or more field elevations could not be fetched; using 0 ft MSL estimates");
    }

    for branch in &result.branches {
        let marker = if branch.unreachable { " [unreachable]" } else { "" };
        eprintln!(
            "branch {}: {:?} {:.0}ft -> {:.0}ft over {:.1}nm{marker}",
            branch.index, branch.action, branch.from_alt_ft, branch.to_alt_ft, branch.distance_nm
        );
    }

    #[derive(serde::Serialize)]
    struct BranchReportOutput<'a> {
        branches: &'a [corridor::profile::BranchReport],
        elevation_estimated: bool,
    }
    let report_json = BranchReportOutput {
        branches: &result.branches,
        elevation_estimated: result.elevation_estimated,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&report_json).map_err(|e| Error::Internal(e.to_string()))?
    );

    println!("{}", to_kml(&result.path));
    Ok(())
}

/// Renders a corrected flight path back into a minimal KML Placemark
/// sequence, preserving the input's lon/lat/alt-in-meters convention.
fn to_kml(path: &FlightPath) -> String {
    const FEET_IN_METER: f64 = 3.28084;

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\"><Document>\n");
    for wp in path.waypoints() {
        let alt_m = wp.alt_ft / FEET_IN_METER;
        let _ = writeln!(
            out,
            "  <Placemark><name>{}</name><Point><coordinates>{},{},{}</coordinates></Point></Placemark>",
            wp.id, wp.lon, wp.lat, alt_m
        );
    }
    out.push_str("</Document></kml>\n");
    out
}
