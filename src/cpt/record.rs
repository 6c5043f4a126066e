//! CPT sounding record
//!
//! A [`CptRecord`] is a set of parallel per-depth channels plus scalar
//! metadata for one sounding. Optional channels that were absent from the
//! source file stay empty; they are never zero-filled.

use serde::{Deserialize, Serialize};

/// One parsed CPT sounding: parallel numeric channels plus metadata.
///
/// Invariant: every non-empty per-depth channel has the same length and is
/// ordered by increasing penetration length. `depth_to_reference` is derived
/// by [`CptRecord::parse_nap_to_depth`] and not otherwise mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CptRecord {
    /// Sounding identifier (BRO broId, e.g. "CPT000000003688")
    pub name: String,
    /// BRO quality class, e.g. "klasse2"
    pub quality_class: String,
    /// Cone penetrometer type, e.g. "F7.5CKE/V-1214"
    pub cpt_type: String,
    /// Vertical offset of the local reference level (m NAP, may be negative)
    pub local_reference_level: f64,
    /// Horizontal position (RD easting/northing) when present in the file
    pub coordinates: Option<(f64, f64)>,
    /// Pre-drilled depth above the first measured sample (m)
    pub predrilled_z: f64,
    /// Cone surface (area) quotient coefficients
    pub a: Vec<f64>,

    /// Penetration length (m), the row key for de-duplication
    pub penetration_length: Vec<f64>,
    /// Depth below surface (m)
    pub depth: Vec<f64>,
    /// Cone tip resistance qc (MPa)
    pub tip: Vec<f64>,
    /// Local sleeve friction fs (MPa)
    pub friction: Vec<f64>,
    /// Friction ratio Rf (%)
    pub friction_nbr: Vec<f64>,
    /// Pore pressure u1, measured at the cone face (MPa)
    pub pore_pressure_u1: Vec<f64>,
    /// Pore pressure u2, measured behind the cone (MPa)
    pub pore_pressure_u2: Vec<f64>,
    /// Pore pressure u3, measured behind the friction sleeve (MPa)
    pub pore_pressure_u3: Vec<f64>,
    /// Depth relative to the vertical datum: `local_reference_level - depth`
    pub depth_to_reference: Vec<f64>,
}

impl CptRecord {
    /// Number of rows, taken from the penetration length channel (falling
    /// back to depth for records assembled without one).
    pub fn len(&self) -> usize {
        if self.penetration_length.is_empty() {
            self.depth.len()
        } else {
            self.penetration_length.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All populated per-depth channels, mutably. Used by the cleaning
    /// operations to apply one row mask across the whole record.
    pub(crate) fn channels_mut(&mut self) -> Vec<&mut Vec<f64>> {
        let all = vec![
            &mut self.penetration_length,
            &mut self.depth,
            &mut self.tip,
            &mut self.friction,
            &mut self.friction_nbr,
            &mut self.pore_pressure_u1,
            &mut self.pore_pressure_u2,
            &mut self.pore_pressure_u3,
            &mut self.depth_to_reference,
        ];
        all.into_iter().filter(|c| !c.is_empty()).collect()
    }

    /// All populated per-depth channels, immutably.
    pub(crate) fn channels(&self) -> Vec<&Vec<f64>> {
        let all = vec![
            &self.penetration_length,
            &self.depth,
            &self.tip,
            &self.friction,
            &self.friction_nbr,
            &self.pore_pressure_u1,
            &self.pore_pressure_u2,
            &self.pore_pressure_u3,
            &self.depth_to_reference,
        ];
        all.into_iter().filter(|c| !c.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_prefers_penetration_length() {
        let mut cpt = CptRecord::default();
        cpt.depth = vec![1.0, 2.0];
        assert_eq!(cpt.len(), 2);
        cpt.penetration_length = vec![1.0, 2.0, 3.0];
        assert_eq!(cpt.len(), 3);
    }

    #[test]
    fn empty_channels_are_skipped() {
        let mut cpt = CptRecord::default();
        cpt.depth = vec![1.0];
        cpt.tip = vec![2.0];
        // u1..u3 and depth_to_reference absent
        assert_eq!(cpt.channels().len(), 2);
    }
}
