//! Soil strength parameter module (SHM)
//!
//! SHANSEP undrained-strength model fitting and the laboratory dataset
//! loader that feeds it:
//!
//! - `shansep`: fits `log(tau/sigma) = log(S) + m * log(OCR)` by least
//!   squares, with either parameter optionally held fixed
//! - `dataset`: semicolon-delimited DSS/triaxial lab CSV loader with a
//!   derived, clamped OCR column

mod dataset;
mod shansep;

pub use dataset::{DatasetError, DssDataset};
pub use shansep::{ParameterEstimate, ShansepError, ShansepFit, ShansepMode, ShansepUtils};
