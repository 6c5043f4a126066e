//! BRO XML CPT Integration Tests
//!
//! Exercises the reader and cleaning pipeline against the BRO CPT fixture
//! that ships with the repo (data/cpt/bro_xml/). The fixture has 32
//! measurement rows of which 3 carry the -999999 no-measurement sentinel in
//! the friction ratio channel.

use geosonde::cpt::{BroParseError, BroXmlReader};
use std::path::PathBuf;

/// Path to the BRO CPT fixture that ships with the repo.
fn bro_xml_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data/cpt/bro_xml/CPT000000003688_IMBRO_A.xml")
}

#[test]
fn read_round_trip() {
    let cpt = BroXmlReader::read(bro_xml_path()).expect("fixture must parse");

    assert_eq!(cpt.name, "CPT000000003688");
    assert_eq!(cpt.quality_class, "klasse2");
    assert_eq!(cpt.cpt_type, "F7.5CKE/V-1214");
    assert_eq!(cpt.local_reference_level, -1.75);
    assert_eq!(cpt.predrilled_z, 0.0);
    assert_eq!(cpt.a, vec![0.8]);
    assert_eq!(cpt.coordinates, Some((82372.584, 455203.262)));

    // Depth starts at the surface and reaches the final penetration
    let min = cpt.depth.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = cpt.depth.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(min, 0.0);
    assert_eq!(max, 24.56);

    // All populated channels parse to the same length
    assert_eq!(cpt.len(), 32);
    assert_eq!(cpt.depth.len(), 32);
    assert_eq!(cpt.tip.len(), 32);
    assert_eq!(cpt.friction.len(), 32);
    assert_eq!(cpt.friction_nbr.len(), 32);
    assert_eq!(cpt.pore_pressure_u1.len(), 32);

    // Channels flagged "nee" in the parameters block stay absent
    assert!(cpt.pore_pressure_u2.is_empty());
    assert!(cpt.pore_pressure_u3.is_empty());
}

#[test]
fn read_and_drop_nans() {
    let mut cpt = BroXmlReader::read(bro_xml_path()).expect("fixture must parse");
    let name = cpt.name.clone();
    let quality_class = cpt.quality_class.clone();
    let cpt_type = cpt.cpt_type.clone();
    let lrl = cpt.local_reference_level;

    cpt.drop_nan_values();

    // Metadata survives cleaning
    assert_eq!(cpt.name, name);
    assert_eq!(cpt.quality_class, quality_class);
    assert_eq!(cpt.cpt_type, cpt_type);
    assert_eq!(cpt.local_reference_level, lrl);

    // 3 sentinel rows dropped, all channels aligned
    assert_eq!(cpt.depth.len(), cpt.friction_nbr.len());
    assert_eq!(cpt.friction_nbr.len(), 29);
    assert!(cpt.friction_nbr.iter().all(|v| !v.is_nan()));
    assert!(cpt.tip.iter().all(|v| !v.is_nan()));

    eprintln!("read_and_drop_nans: {} rows retained", cpt.len());
}

#[test]
fn drop_duplicate_depth_values_shrinks_all_channels() {
    let mut cpt = BroXmlReader::read(bro_xml_path()).expect("fixture must parse");

    // Forge duplicates of the first penetration length
    cpt.penetration_length[1] = 0.0;
    cpt.penetration_length[2] = 0.0;
    cpt.penetration_length[3] = 0.0;
    let previous_length = cpt.penetration_length.len();

    cpt.drop_duplicate_depth_values();

    assert_eq!(cpt.penetration_length.len(), previous_length - 3);
    assert_eq!(cpt.friction_nbr.len(), cpt.penetration_length.len());
    assert_eq!(cpt.depth.len(), cpt.penetration_length.len());
}

#[test]
fn full_cleaning_pipeline() {
    let mut cpt = BroXmlReader::read(bro_xml_path()).expect("fixture must parse");

    cpt.drop_nan_values();
    cpt.drop_duplicate_depth_values();
    cpt.perform_pre_drill_interpretation(3);
    cpt.correct_for_negatives();
    cpt.parse_nap_to_depth();

    assert!(cpt.tip.iter().all(|v| *v >= 0.0));
    assert!(cpt.friction.iter().all(|v| *v >= 0.0));
    assert_eq!(cpt.depth_to_reference.len(), cpt.depth.len());
    // Surface sample sits at the local reference level
    assert_eq!(cpt.depth_to_reference[0], cpt.local_reference_level);

    let lengths: Vec<usize> = [
        &cpt.penetration_length,
        &cpt.depth,
        &cpt.tip,
        &cpt.friction,
        &cpt.friction_nbr,
        &cpt.pore_pressure_u1,
        &cpt.depth_to_reference,
    ]
    .iter()
    .map(|c| c.len())
    .collect();
    assert!(
        lengths.iter().all(|l| *l == lengths[0]),
        "channels diverged: {lengths:?}"
    );

    eprintln!("full_cleaning_pipeline: {} rows after cleaning", cpt.len());
}

#[test]
fn missing_file_reports_io_error() {
    let err = BroXmlReader::read("/nonexistent/sounding.xml").unwrap_err();
    assert!(matches!(err, BroParseError::Io { .. }));
}
