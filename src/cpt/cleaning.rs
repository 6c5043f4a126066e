//! Channel cleaning operations for CPT records
//!
//! Cleaning steps applied between parsing and interpretation:
//! - NaN row removal
//! - Duplicate penetration-length removal
//! - Pre-drill interpolation (synthesize near-surface samples)
//! - Negative-value flooring for measured channels
//! - NAP depth-reference conversion
//!
//! Each masking operation computes one keep-mask from its key channel and
//! applies it to every populated channel in a single pass, so cross-channel
//! index alignment holds by construction.

use crate::cpt::CptRecord;
use std::collections::HashSet;
use tracing::debug;

impl CptRecord {
    /// Remove rows containing NaN in any populated channel.
    ///
    /// All retained channels keep identical length and stay index-aligned.
    pub fn drop_nan_values(&mut self) {
        let n = self.len();
        let mut keep = vec![true; n];
        for ch in self.channels() {
            debug_assert_eq!(ch.len(), n, "channel length mismatch before NaN drop");
            for (i, v) in ch.iter().enumerate() {
                if v.is_nan() {
                    keep[i] = false;
                }
            }
        }
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            debug!(dropped, "dropping NaN rows from CPT record");
            self.apply_row_mask(&keep);
        }
    }

    /// Remove rows whose penetration length repeats an earlier value,
    /// keeping the first occurrence in order.
    pub fn drop_duplicate_depth_values(&mut self) {
        let mut seen: HashSet<u64> = HashSet::with_capacity(self.penetration_length.len());
        let keep: Vec<bool> = self
            .penetration_length
            .iter()
            .map(|v| {
                // +0.0 and -0.0 are the same depth
                let v = if *v == 0.0 { 0.0 } else { *v };
                seen.insert(v.to_bits())
            })
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            debug!(dropped, "dropping duplicate penetration lengths");
            self.apply_row_mask(&keep);
        }
    }

    /// Synthesize near-surface samples over the pre-drilled interval so the
    /// depth channel starts at 0.
    ///
    /// With `predrilled_z > 0`, synthetic depths `0, h, 2h, …` (h = mean
    /// depth spacing) are prefixed up to the pre-drill depth. Measured
    /// channels (tip, friction, friction ratio) are prefixed with the
    /// constant average of their first `length_of_average_points` samples;
    /// pore pressures ramp linearly from 0 at the surface to their first
    /// measured value.
    ///
    /// With `predrilled_z == 0` a single surface row is prefixed instead:
    /// measured channels get the same first-points average, pore pressures a
    /// copy of their first value (no ramp).
    pub fn perform_pre_drill_interpretation(&mut self, length_of_average_points: usize) {
        if self.depth.is_empty() || self.depth[0] <= 0.0 {
            return;
        }
        let first_depth = self.depth[0];
        let k = length_of_average_points.clamp(1, self.depth.len());
        let head_avg = |ch: &[f64]| ch.iter().take(k).sum::<f64>() / k.min(ch.len()) as f64;

        // Synthetic depths for the pre-drilled interval. Spacing is the mean
        // of the measured depth increments. The prefix is capped at the first
        // measured depth so the channel stays sorted even when the recorded
        // pre-drill depth overshoots it.
        let prefix: Vec<f64> = if self.predrilled_z > 0.0 && self.depth.len() >= 2 {
            let spacing = self
                .depth
                .windows(2)
                .map(|w| w[1] - w[0])
                .sum::<f64>()
                / (self.depth.len() - 1) as f64;
            if spacing > 0.0 {
                let bound = self.predrilled_z.min(first_depth);
                let count = (bound / spacing - 1e-9).ceil().max(1.0) as usize;
                (0..count).map(|i| i as f64 * spacing).collect()
            } else {
                vec![0.0]
            }
        } else {
            vec![0.0]
        };
        let ramp = self.predrilled_z > 0.0;
        debug!(
            rows = prefix.len(),
            predrilled_z = self.predrilled_z,
            "prefixing pre-drill samples"
        );

        // Measured channels: constant head average.
        for ch in [&mut self.tip, &mut self.friction, &mut self.friction_nbr] {
            if ch.is_empty() {
                continue;
            }
            let avg = head_avg(ch);
            ch.splice(0..0, std::iter::repeat(avg).take(prefix.len()));
        }

        // Pore pressures: linear ramp from 0 at the surface to the first
        // measured value (copy of the first value in the no-predrill case).
        for ch in [
            &mut self.pore_pressure_u1,
            &mut self.pore_pressure_u2,
            &mut self.pore_pressure_u3,
        ] {
            if ch.is_empty() {
                continue;
            }
            let first = ch[0];
            let values: Vec<f64> = prefix
                .iter()
                .map(|d| if ramp { first * d / first_depth } else { first })
                .collect();
            ch.splice(0..0, values);
        }

        // Row-key channels get the synthetic depths themselves.
        if !self.penetration_length.is_empty() {
            self.penetration_length.splice(0..0, prefix.iter().copied());
        }
        if !self.depth_to_reference.is_empty() {
            let lrl = self.local_reference_level;
            self.depth_to_reference
                .splice(0..0, prefix.iter().map(|d| lrl - d));
        }
        self.depth.splice(0..0, prefix);
    }

    /// Floor the measured channels (tip, friction, friction ratio) at 0.
    ///
    /// Pore pressures stay untouched: suction below the water table
    /// legitimately reads negative.
    pub fn correct_for_negatives(&mut self) {
        for ch in [&mut self.tip, &mut self.friction, &mut self.friction_nbr] {
            for v in ch.iter_mut() {
                if *v < 0.0 {
                    *v = 0.0;
                }
            }
        }
    }

    /// Compute `depth_to_reference = local_reference_level - depth`.
    ///
    /// The depth channel itself is not mutated.
    pub fn parse_nap_to_depth(&mut self) {
        let lrl = self.local_reference_level;
        self.depth_to_reference = self.depth.iter().map(|d| lrl - d).collect();
    }

    /// Apply a keep-mask to every populated channel.
    fn apply_row_mask(&mut self, keep: &[bool]) {
        for ch in self.channels_mut() {
            debug_assert_eq!(ch.len(), keep.len(), "channel length mismatch in row mask");
            let mut i = 0;
            ch.retain(|_| {
                let k = keep[i];
                i += 1;
                k
            });
        }
    }
}
