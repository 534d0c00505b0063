//! Recorded vision telemetry.
//!
//! Expected headers:
//! rotational,lateral,depth,has_target
//!
//! Example:
//! rotational,lateral,depth,has_target
//! 4.5,-1.0,0.42,true
//! 0.0,0.0,0.0,false

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::Deserializer;
use seeker_traits::Telemetry;

const HEADERS: [&str; 4] = ["rotational", "lateral", "depth", "has_target"];

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TelemetryRow {
    pub rotational: f64,
    pub lateral: f64,
    pub depth: f64,
    /// Accepts true/false, 1/0, or yes/no.
    #[serde(deserialize_with = "de_flag")]
    pub has_target: bool,
}

impl From<TelemetryRow> for Telemetry {
    fn from(r: TelemetryRow) -> Self {
        Telemetry::new(r.rotational, r.lateral, r.depth, r.has_target)
    }
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid has_target value '{other}'"
        ))),
    }
}

/// Parse telemetry rows from any CSV reader, enforcing the exact header set.
pub fn parse_telemetry_csv<R: Read>(reader: R) -> eyre::Result<Vec<TelemetryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read telemetry CSV headers: {e}"))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != HEADERS {
        eyre::bail!(
            "telemetry CSV must have headers '{}', got: {}",
            HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TelemetryRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !(row.rotational.is_finite() && row.lateral.is_finite() && row.depth.is_finite())
                {
                    eyre::bail!("telemetry row {} has non-finite offsets", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => eyre::bail!("invalid telemetry row {}: {}", idx + 2, e),
        }
    }
    if rows.is_empty() {
        eyre::bail!("telemetry CSV contains no frames");
    }
    Ok(rows)
}

pub fn load_telemetry_csv(path: &Path) -> eyre::Result<Vec<TelemetryRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open telemetry CSV {:?}: {}", path, e))?;
    parse_telemetry_csv(file).map_err(|e| e.wrap_err(format!("telemetry CSV {path:?}")))
}
