//! Geosonde: Geotechnical Data Processing
//!
//! Library for working with cone penetration test (CPT) soundings and
//! laboratory strength data.
//!
//! ## Architecture
//!
//! - **CPT module**: BRO XML sounding reader and channel cleaning operations
//!   (NaN removal, duplicate depths, pre-drill interpolation, sign
//!   correction, NAP depth conversion)
//! - **SHM module**: SHANSEP undrained-strength parameter estimation via
//!   log-space linear regression, plus the DSS laboratory dataset loader

pub mod cpt;
pub mod shm;

// Re-export the CPT surface
pub use cpt::{BroParseError, BroReaderConfig, BroXmlReader, CptRecord};

// Re-export the SHM surface
pub use shm::{
    DatasetError, DssDataset, ParameterEstimate, ShansepError, ShansepFit, ShansepMode,
    ShansepUtils,
};
