//! SHANSEP Regression Tests
//!
//! Fits the SHANSEP parameters against the DSS lab dataset that ships with
//! the repo (data/shm/Data_KIJK_DSS.csv) and pins the fitted values. The
//! dataset has 24 rows, 2 of them without a tau_40 measurement and 2 with
//! OCR below 1 (clamped by the estimator).

use geosonde::shm::{DssDataset, ShansepMode, ShansepUtils};
use std::path::PathBuf;

const TOL: f64 = 0.00051;

fn dss_csv_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/shm/Data_KIJK_DSS.csv")
}

fn load_complete() -> DssDataset {
    let mut ds = DssDataset::from_csv(dss_csv_path()).expect("fixture must load");
    assert_eq!(ds.len(), 24);
    ds.retain_complete_tau();
    assert_eq!(ds.len(), 22);
    ds
}

#[test]
fn fit_both_parameters_with_linear_regression() {
    let ds = load_complete();
    let fit = ShansepUtils::fit(&ds.ocr(), &ds.tau_40, &ds.sigma_vc_eff, ShansepMode::FitBoth)
        .expect("regression must succeed");

    assert!((fit.s.value - 0.3943).abs() < TOL, "S = {}", fit.s.value);
    assert!((fit.m.value - 0.8786).abs() < TOL, "m = {}", fit.m.value);
    assert!((fit.s.std - 0.0062).abs() < TOL, "s_std = {}", fit.s.std);
    assert!((fit.m.std - 0.0136).abs() < TOL, "m_std = {}", fit.m.std);
    assert_eq!(fit.samples, 22);
    assert!(fit.r_squared > 0.99, "r² = {}", fit.r_squared);

    let p = fit.m_p_value.expect("free slope reports a p-value");
    assert!(p < 1e-6, "OCR trend must be highly significant, p = {p}");

    eprintln!(
        "fit_both: S = {:.4} ± {:.4}, m = {:.4} ± {:.4} (n = {})",
        fit.s.value, fit.s.std, fit.m.value, fit.m.std, fit.samples
    );
}

#[test]
fn fixed_s_reproduces_free_fit_slope() {
    let ds = load_complete();
    let free = ShansepUtils::fit(&ds.ocr(), &ds.tau_40, &ds.sigma_vc_eff, ShansepMode::FitBoth)
        .unwrap();

    let fixed = ShansepUtils::fit(
        &ds.ocr(),
        &ds.tau_40,
        &ds.sigma_vc_eff,
        ShansepMode::FixedS(free.s.value),
    )
    .unwrap();

    // Supplied S is echoed unchanged
    assert_eq!(fixed.s.value, free.s.value);
    assert_eq!(fixed.s.std, 0.0);
    // Pinning the intercept at its own least-squares value leaves the slope
    assert!(
        (fixed.m.value - free.m.value).abs() < 0.0051,
        "m = {} vs {}",
        fixed.m.value,
        free.m.value
    );
    assert!((fixed.m.std - 0.0060).abs() < TOL, "m_std = {}", fixed.m.std);
}

#[test]
fn fixed_m_reproduces_free_fit_ratio() {
    let ds = load_complete();
    let free = ShansepUtils::fit(&ds.ocr(), &ds.tau_40, &ds.sigma_vc_eff, ShansepMode::FitBoth)
        .unwrap();

    let fixed = ShansepUtils::fit(
        &ds.ocr(),
        &ds.tau_40,
        &ds.sigma_vc_eff,
        ShansepMode::FixedM(free.m.value),
    )
    .unwrap();

    assert_eq!(fixed.m.value, free.m.value);
    assert_eq!(fixed.m.std, 0.0);
    assert!(
        (fixed.s.value - free.s.value).abs() < 0.0051,
        "S = {} vs {}",
        fixed.s.value,
        free.s.value
    );
    assert!((fixed.s.std - 0.0027).abs() < TOL, "s_std = {}", fixed.s.std);
}

#[test]
fn supplied_m_trades_off_against_fitted_log_s() {
    // In-situ subset, OCR derived from the in-situ vertical stress
    let mut ds = DssDataset::from_csv(dss_csv_path()).expect("fixture must load");
    ds.retain_complete_tau();
    let ds = ds.filter_test_condition("In situ");
    assert_eq!(ds.len(), 12);

    let base = ShansepUtils::fit(&ds.ocr_v0(), &ds.tau_40, &ds.sigma_v0_eff, ShansepMode::FitBoth)
        .unwrap();

    // A higher supplied m must produce a smaller ln(S)
    let hi = ShansepUtils::fit(
        &ds.ocr_v0(),
        &ds.tau_40,
        &ds.sigma_v0_eff,
        ShansepMode::FixedM(base.m.value + 0.1),
    )
    .unwrap();
    assert!(hi.s.value.ln() < base.s.value.ln());

    // A lower supplied m must produce a larger ln(S)
    let lo = ShansepUtils::fit(
        &ds.ocr_v0(),
        &ds.tau_40,
        &ds.sigma_v0_eff,
        ShansepMode::FixedM(base.m.value - 0.1),
    )
    .unwrap();
    assert!(lo.s.value.ln() > base.s.value.ln());
}

#[test]
fn derived_ocr_is_clamped() {
    let ds = load_complete();
    let ocr = ds.ocr();
    assert!(ocr.iter().all(|o| *o >= 1.0));
    // The fixture contains two tests consolidated below Pc
    let clamped = ocr.iter().filter(|o| **o == 1.0).count();
    assert_eq!(clamped, 2);
}
