//! BRO XML CPT reader
//!
//! Parses CPT dispatch files from the Dutch BRO registry (broservices.nl
//! schemas) into [`CptRecord`] structs. Elements are matched on their local
//! names because namespace prefixes vary between BRO exporters.
//!
//! Layout of a dispatch file, as far as this reader cares:
//! - `broId`, `qualityClass`, `conePenetrometerType` — identification
//! - `offset` — vertical offset of the local reference level (m NAP)
//! - `predrilledDepth`, `coneSurfaceQuotient`, `pos` — survey metadata
//! - `parameters` — per-channel presence flags (`ja`/`nee`), in the column
//!   order of the values block
//! - `values` — the measurement table: rows separated by `;`, fields by `,`,
//!   with `-999999` as the no-measurement sentinel

use crate::cpt::CptRecord;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// BRO parse errors. No partial record is ever returned.
#[derive(Debug, Error)]
pub enum BroParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    #[error("Parse error for {item}: {message}")]
    Malformed { item: String, message: String },
}

/// Reader behaviour knobs.
#[derive(Debug, Clone)]
pub struct BroReaderConfig {
    /// Cell value treated as "no measurement" and converted to NaN
    pub nan_sentinel: f64,
    /// Sort rows by ascending penetration length after parsing
    pub sort_rows: bool,
}

impl Default for BroReaderConfig {
    fn default() -> Self {
        Self {
            nan_sentinel: -999999.0,
            sort_rows: true,
        }
    }
}

/// Channels a values-block column can map to. Columns flagged present but
/// not interpreted by this reader still occupy an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    PenetrationLength,
    Depth,
    ConeResistance,
    LocalFriction,
    FrictionRatio,
    PorePressureU1,
    PorePressureU2,
    PorePressureU3,
    Other,
}

impl Channel {
    fn from_local_name(name: &str) -> Self {
        match name {
            "penetrationLength" => Channel::PenetrationLength,
            "depth" => Channel::Depth,
            "coneResistance" => Channel::ConeResistance,
            "localFriction" => Channel::LocalFriction,
            "frictionRatio" => Channel::FrictionRatio,
            "porePressureU1" => Channel::PorePressureU1,
            "porePressureU2" => Channel::PorePressureU2,
            "porePressureU3" => Channel::PorePressureU3,
            _ => Channel::Other,
        }
    }
}

/// Accumulated state while walking the XML event stream.
#[derive(Default)]
struct ParseState {
    name: Option<String>,
    quality_class: Option<String>,
    cpt_type: Option<String>,
    offset: Option<f64>,
    predrilled_z: Option<f64>,
    a: Vec<f64>,
    coordinates: Option<(f64, f64)>,
    columns: Vec<Channel>,
    seen_parameters: bool,
    values: Option<String>,
}

/// BRO XML CPT file reader.
pub struct BroXmlReader;

impl BroXmlReader {
    /// Read and parse a BRO XML CPT file with default settings.
    pub fn read(path: impl AsRef<Path>) -> Result<CptRecord, BroParseError> {
        Self::read_with(path, &BroReaderConfig::default())
    }

    /// Read and parse a BRO XML CPT file.
    pub fn read_with(
        path: impl AsRef<Path>,
        config: &BroReaderConfig,
    ) -> Result<CptRecord, BroParseError> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| BroParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let record = Self::parse_str(&xml, config)?;
        info!(
            name = %record.name,
            rows = record.len(),
            "parsed BRO CPT file {}",
            path.display()
        );
        Ok(record)
    }

    /// Parse BRO XML from an in-memory string.
    pub fn parse_str(xml: &str, config: &BroReaderConfig) -> Result<CptRecord, BroParseError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut state = ParseState::default();
        let mut path: Vec<String> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if local == "parameters" {
                        state.seen_parameters = true;
                    }
                    path.push(local);
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape()?.trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    Self::capture_text(&mut state, &path, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Self::build_record(state, config)
    }

    /// Route the text content of the current element into the parse state.
    fn capture_text(
        state: &mut ParseState,
        path: &[String],
        text: &str,
    ) -> Result<(), BroParseError> {
        let element = match path.last() {
            Some(e) => e.as_str(),
            None => return Ok(()),
        };
        let in_parameters = path.iter().rev().skip(1).any(|p| p.as_str() == "parameters");

        if in_parameters {
            // Presence flags, in column order of the values block.
            if text == "ja" {
                state.columns.push(Channel::from_local_name(element));
            }
            return Ok(());
        }

        match element {
            "broId" => state.name = Some(text.to_string()),
            "qualityClass" => state.quality_class = Some(text.to_string()),
            "conePenetrometerType" => state.cpt_type = Some(text.to_string()),
            "offset" => state.offset = Some(parse_f64(element, text)?),
            "predrilledDepth" => state.predrilled_z = Some(parse_f64(element, text)?),
            "coneSurfaceQuotient" => state.a.push(parse_f64(element, text)?),
            "pos" => {
                let mut parts = text.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(x), Some(y)) => {
                        state.coordinates =
                            Some((parse_f64("pos", x)?, parse_f64("pos", y)?));
                    }
                    _ => {
                        return Err(BroParseError::Malformed {
                            item: "pos".to_string(),
                            message: format!("expected two coordinates, got '{text}'"),
                        })
                    }
                }
            }
            "values" => state.values = Some(text.to_string()),
            _ => {}
        }
        Ok(())
    }

    /// Assemble the final record, enforcing required elements.
    fn build_record(
        state: ParseState,
        config: &BroReaderConfig,
    ) -> Result<CptRecord, BroParseError> {
        let name = state.name.ok_or(BroParseError::MissingElement("broId"))?;
        let offset = state.offset.ok_or(BroParseError::MissingElement("offset"))?;
        if !state.seen_parameters {
            return Err(BroParseError::MissingElement("parameters"));
        }
        if !state.columns.contains(&Channel::PenetrationLength) {
            return Err(BroParseError::MissingElement("penetrationLength"));
        }
        let values = state.values.ok_or(BroParseError::MissingElement("values"))?;

        let mut record = CptRecord {
            name,
            quality_class: state.quality_class.unwrap_or_default(),
            cpt_type: state.cpt_type.unwrap_or_default(),
            local_reference_level: offset,
            coordinates: state.coordinates,
            predrilled_z: state.predrilled_z.unwrap_or(0.0),
            a: state.a,
            ..CptRecord::default()
        };

        parse_values(&values, &state.columns, config, &mut record)?;

        if config.sort_rows {
            sort_by_penetration_length(&mut record);
        }

        // BRO files without an explicit depth column report depth via the
        // penetration length.
        if record.depth.is_empty() {
            record.depth = record.penetration_length.clone();
        }

        debug!(
            rows = record.len(),
            columns = state.columns.len(),
            "assembled CPT record"
        );
        Ok(record)
    }
}

/// Parse the semicolon-row / comma-field values block into record channels.
fn parse_values(
    raw: &str,
    columns: &[Channel],
    config: &BroReaderConfig,
    record: &mut CptRecord,
) -> Result<(), BroParseError> {
    for row in raw.split(';') {
        let row = row.trim();
        if row.is_empty() {
            continue;
        }
        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() < columns.len() {
            return Err(BroParseError::Malformed {
                item: "values".to_string(),
                message: format!(
                    "row has {} fields, expected {}: '{row}'",
                    fields.len(),
                    columns.len()
                ),
            });
        }
        for (channel, field) in columns.iter().zip(&fields) {
            let target = match channel {
                Channel::PenetrationLength => &mut record.penetration_length,
                Channel::Depth => &mut record.depth,
                Channel::ConeResistance => &mut record.tip,
                Channel::LocalFriction => &mut record.friction,
                Channel::FrictionRatio => &mut record.friction_nbr,
                Channel::PorePressureU1 => &mut record.pore_pressure_u1,
                Channel::PorePressureU2 => &mut record.pore_pressure_u2,
                Channel::PorePressureU3 => &mut record.pore_pressure_u3,
                Channel::Other => continue,
            };
            let value = parse_f64("values", field.trim())?;
            target.push(if value == config.nan_sentinel {
                f64::NAN
            } else {
                value
            });
        }
    }

    if record.penetration_length.is_empty() {
        return Err(BroParseError::Malformed {
            item: "values".to_string(),
            message: "no measurement rows present".to_string(),
        });
    }
    Ok(())
}

/// Reorder all populated channels by ascending penetration length.
fn sort_by_penetration_length(record: &mut CptRecord) {
    let n = record.penetration_length.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        record.penetration_length[i].total_cmp(&record.penetration_length[j])
    });
    if order.iter().enumerate().all(|(i, &o)| i == o) {
        return;
    }
    for ch in record.channels_mut() {
        let reordered: Vec<f64> = order.iter().map(|&i| ch[i]).collect();
        *ch = reordered;
    }
}

fn parse_f64(item: &str, s: &str) -> Result<f64, BroParseError> {
    s.parse::<f64>().map_err(|e| BroParseError::Malformed {
        item: item.to_string(),
        message: format!("'{s}': {e}"),
    })
}
