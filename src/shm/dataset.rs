//! DSS laboratory dataset loader
//!
//! Reads semicolon-delimited lab test CSV files (DSS / triaxial) into
//! parallel columns. Column order is free; names are matched
//! case-insensitively from the header row. Empty or unparseable numeric
//! cells load as NaN, mirroring how the estimator treats missing
//! measurements.
//!
//! Expected columns: `Pc`, `sigma_vc_eff`, `tau_40` (required);
//! `sigma_v0_eff`, `TestConditions` (optional).

use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Lab CSV loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Empty dataset: no data rows after the header")]
    Empty,
}

/// Column indices resolved from the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    test_conditions: Option<usize>,
    pc: Option<usize>,
    sigma_vc_eff: Option<usize>,
    sigma_v0_eff: Option<usize>,
    tau_40: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &str) -> Self {
        let mut map = Self::default();
        for (idx, col) in header.split(';').enumerate() {
            match col.trim().to_lowercase().as_str() {
                "testconditions" => map.test_conditions = Some(idx),
                "pc" => map.pc = Some(idx),
                "sigma_vc_eff" => map.sigma_vc_eff = Some(idx),
                "sigma_v0_eff" => map.sigma_v0_eff = Some(idx),
                "tau_40" => map.tau_40 = Some(idx),
                _ => {}
            }
        }
        map
    }
}

/// One loaded lab dataset: parallel columns, one row per test.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DssDataset {
    /// Test condition label per row (e.g. "In situ"), empty when the
    /// column is absent
    pub test_conditions: Vec<String>,
    /// Preconsolidation stress Pc (kPa)
    pub pc: Vec<f64>,
    /// Vertical effective consolidation stress (kPa)
    pub sigma_vc_eff: Vec<f64>,
    /// In-situ vertical effective stress (kPa); NaN when absent
    pub sigma_v0_eff: Vec<f64>,
    /// Undrained shear strength at 40% of the peak strain criterion (kPa)
    pub tau_40: Vec<f64>,
}

impl DssDataset {
    /// Load a semicolon-delimited lab CSV file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::parse_str(&text)?;
        debug!(rows = dataset.len(), "loaded lab dataset {}", path.display());
        Ok(dataset)
    }

    /// Parse CSV content from an in-memory string.
    pub fn parse_str(text: &str) -> Result<Self, DatasetError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or(DatasetError::Empty)?;
        let map = ColumnMap::from_header(header);

        let pc_idx = map.pc.ok_or(DatasetError::MissingColumn("Pc"))?;
        let svc_idx = map
            .sigma_vc_eff
            .ok_or(DatasetError::MissingColumn("sigma_vc_eff"))?;
        let tau_idx = map.tau_40.ok_or(DatasetError::MissingColumn("tau_40"))?;

        let mut dataset = DssDataset::default();
        for line in lines {
            let fields: Vec<&str> = line.split(';').collect();
            let cell = |idx: Option<usize>| -> f64 {
                idx.and_then(|i| fields.get(i))
                    .and_then(|f| f.trim().parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            };
            dataset.pc.push(cell(Some(pc_idx)));
            dataset.sigma_vc_eff.push(cell(Some(svc_idx)));
            dataset.sigma_v0_eff.push(cell(map.sigma_v0_eff));
            dataset.tau_40.push(cell(Some(tau_idx)));
            dataset.test_conditions.push(
                map.test_conditions
                    .and_then(|i| fields.get(i))
                    .map(|f| f.trim().to_string())
                    .unwrap_or_default(),
            );
        }

        if dataset.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.pc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pc.is_empty()
    }

    /// Drop rows without a tau_40 measurement.
    pub fn retain_complete_tau(&mut self) {
        let keep: Vec<bool> = self.tau_40.iter().map(|t| !t.is_nan()).collect();
        retain_rows(&mut self.pc, &keep);
        retain_rows(&mut self.sigma_vc_eff, &keep);
        retain_rows(&mut self.sigma_v0_eff, &keep);
        retain_rows(&mut self.tau_40, &keep);
        let mut i = 0;
        self.test_conditions.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    }

    /// Rows whose TestConditions label equals `condition`.
    pub fn filter_test_condition(&self, condition: &str) -> DssDataset {
        let keep: Vec<bool> = self
            .test_conditions
            .iter()
            .map(|c| c == condition)
            .collect();
        let select = |col: &[f64]| -> Vec<f64> {
            col.iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| *v)
                .collect()
        };
        DssDataset {
            test_conditions: self
                .test_conditions
                .iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(c, _)| c.clone())
                .collect(),
            pc: select(&self.pc),
            sigma_vc_eff: select(&self.sigma_vc_eff),
            sigma_v0_eff: select(&self.sigma_v0_eff),
            tau_40: select(&self.tau_40),
        }
    }

    /// OCR derived from the consolidation stress: Pc / sigma_vc_eff,
    /// clamped to >= 1.
    pub fn ocr(&self) -> Vec<f64> {
        derive_ocr(&self.pc, &self.sigma_vc_eff)
    }

    /// OCR derived from the in-situ stress: Pc / sigma_v0_eff, clamped.
    pub fn ocr_v0(&self) -> Vec<f64> {
        derive_ocr(&self.pc, &self.sigma_v0_eff)
    }
}

fn derive_ocr(pc: &[f64], sigma: &[f64]) -> Vec<f64> {
    pc.iter()
        .zip(sigma)
        .map(|(p, s)| {
            let ocr = p / s;
            if ocr < 1.0 {
                1.0
            } else {
                ocr
            }
        })
        .collect()
}

fn retain_rows(col: &mut Vec<f64>, keep: &[bool]) {
    let mut i = 0;
    col.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}
