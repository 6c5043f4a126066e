//! SHANSEP parameter estimation
//!
//! Fits the SHANSEP undrained-strength model
//!
//! ```text
//! tau / sigma = S * OCR^m      <=>      ln(tau/sigma) = ln(S) + m * ln(OCR)
//! ```
//!
//! by ordinary least squares on the log-transformed data. Either parameter
//! can be held fixed, which reduces the problem to a one-parameter fit along
//! the same regression line. OCR values below 1 are clamped to 1 before the
//! log transform; rows with non-finite inputs or non-positive tau/sigma are
//! dropped.
//!
//! Standard errors come from the residual variance (df = n-2 for the
//! two-parameter fit, n-1 with one parameter pinned). The standard error of
//! S itself is obtained from the intercept error by the delta method. The
//! slope p-value uses the statrs Student's t distribution.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;
use tracing::debug;

/// SHANSEP fitting errors
#[derive(Debug, Error)]
pub enum ShansepError {
    #[error("Fewer than 2 valid data points after filtering (got {0})")]
    InsufficientData(usize),

    #[error("Zero variance in ln(OCR): slope cannot be fitted")]
    DegenerateInput,

    #[error("Invalid fixed parameter: {0}")]
    InvalidFixedParameter(&'static str),
}

/// Which parameters are free in the fit. Holding both fixed is not a fit,
/// so that state is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShansepMode {
    /// Fit both S and m
    FitBoth,
    /// Hold S fixed, fit m
    FixedS(f64),
    /// Hold m fixed, fit S
    FixedM(f64),
}

/// A fitted (or supplied) parameter with its standard error.
/// Fixed parameters are echoed back with a standard error of 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterEstimate {
    pub value: f64,
    pub std: f64,
}

/// Result of a SHANSEP regression.
#[derive(Debug, Clone, Serialize)]
pub struct ShansepFit {
    /// Normally consolidated strength ratio S
    pub s: ParameterEstimate,
    /// Strength increase exponent m
    pub m: ParameterEstimate,
    /// Coefficient of determination of the log-space fit
    pub r_squared: f64,
    /// Two-tailed p-value of the slope (two-parameter fit only)
    pub m_p_value: Option<f64>,
    /// Valid data points used in the fit
    pub samples: usize,
}

/// SHANSEP regression utilities.
pub struct ShansepUtils;

impl ShansepUtils {
    /// Fit the SHANSEP parameters to measured lab data.
    ///
    /// # Arguments
    /// * `ocr` - Overconsolidation ratios (clamped to >= 1)
    /// * `tau` - Undrained shear strength at the cutoff strain (kPa)
    /// * `sigma` - Vertical effective consolidation stress (kPa)
    /// * `mode` - Which parameters are free
    pub fn fit(
        ocr: &[f64],
        tau: &[f64],
        sigma: &[f64],
        mode: ShansepMode,
    ) -> Result<ShansepFit, ShansepError> {
        let (x, y) = log_transform(ocr, tau, sigma);
        let n = x.len();
        if n < 2 {
            return Err(ShansepError::InsufficientData(n));
        }
        debug!(samples = n, ?mode, "fitting SHANSEP parameters");

        match mode {
            ShansepMode::FitBoth => fit_both(&x, &y),
            ShansepMode::FixedS(s) => fit_fixed_s(&x, &y, s),
            ShansepMode::FixedM(m) => fit_fixed_m(&x, &y, m),
        }
    }
}

/// Clamp OCR, drop invalid rows, and move to log space.
fn log_transform(ocr: &[f64], tau: &[f64], sigma: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::with_capacity(ocr.len());
    let mut y = Vec::with_capacity(ocr.len());
    for ((&o, &t), &s) in ocr.iter().zip(tau).zip(sigma) {
        if !o.is_finite() || !t.is_finite() || !s.is_finite() || t <= 0.0 || s <= 0.0 {
            continue;
        }
        x.push(o.max(1.0).ln());
        y.push((t / s).ln());
    }
    (x, y)
}

fn fit_both(x: &[f64], y: &[f64]) -> Result<ShansepFit, ShansepError> {
    let n = x.len();
    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let sxx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
    if sxx <= 0.0 {
        return Err(ShansepError::DegenerateInput);
    }
    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let rss: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - intercept - slope * xi).powi(2))
        .sum();
    let syy: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    // Residual variance; with exactly 2 points the fit is exact.
    let s2 = if n > 2 { rss / (n - 2) as f64 } else { 0.0 };
    let se_slope = (s2 / sxx).sqrt();
    let se_intercept = (s2 * (1.0 / nf + x_mean * x_mean / sxx)).sqrt();

    let s = intercept.exp();
    Ok(ShansepFit {
        s: ParameterEstimate {
            value: s,
            // Delta method: se(exp(a)) = exp(a) * se(a)
            std: s * se_intercept,
        },
        m: ParameterEstimate {
            value: slope,
            std: se_slope,
        },
        r_squared: r_squared(rss, syy),
        m_p_value: slope_p_value(slope, se_slope, n),
        samples: n,
    })
}

fn fit_fixed_s(x: &[f64], y: &[f64], s: f64) -> Result<ShansepFit, ShansepError> {
    if !s.is_finite() || s <= 0.0 {
        return Err(ShansepError::InvalidFixedParameter(
            "S must be positive and finite",
        ));
    }
    let n = x.len();
    let intercept = s.ln();

    let sx2: f64 = x.iter().map(|xi| xi * xi).sum();
    if sx2 <= 0.0 {
        return Err(ShansepError::DegenerateInput);
    }
    let slope = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| xi * (yi - intercept))
        .sum::<f64>()
        / sx2;

    let rss: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - intercept - slope * xi).powi(2))
        .sum();
    let s2 = rss / (n - 1) as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let syy: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    Ok(ShansepFit {
        s: ParameterEstimate { value: s, std: 0.0 },
        m: ParameterEstimate {
            value: slope,
            std: (s2 / sx2).sqrt(),
        },
        r_squared: r_squared(rss, syy),
        m_p_value: None,
        samples: n,
    })
}

fn fit_fixed_m(x: &[f64], y: &[f64], m: f64) -> Result<ShansepFit, ShansepError> {
    if !m.is_finite() {
        return Err(ShansepError::InvalidFixedParameter("m must be finite"));
    }
    let n = x.len();
    let nf = n as f64;

    // With the slope pinned, the least-squares intercept is the mean residual.
    let intercept = x.iter().zip(y).map(|(xi, yi)| yi - m * xi).sum::<f64>() / nf;

    let rss: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - intercept - m * xi).powi(2))
        .sum();
    let s2 = rss / (n - 1) as f64;
    let se_intercept = (s2 / nf).sqrt();
    let y_mean = y.iter().sum::<f64>() / nf;
    let syy: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    let s = intercept.exp();
    Ok(ShansepFit {
        s: ParameterEstimate {
            value: s,
            std: s * se_intercept,
        },
        m: ParameterEstimate { value: m, std: 0.0 },
        r_squared: r_squared(rss, syy),
        m_p_value: None,
        samples: n,
    })
}

fn r_squared(rss: f64, syy: f64) -> f64 {
    if syy > 0.0 {
        1.0 - rss / syy
    } else {
        1.0
    }
}

/// Two-tailed p-value of the slope via Student's t with n-2 degrees of
/// freedom. Undefined for n < 3 or a zero standard error.
fn slope_p_value(slope: f64, se_slope: f64, n: usize) -> Option<f64> {
    if n < 3 || se_slope <= 0.0 {
        return None;
    }
    let df = (n - 2) as f64;
    let t_stat = slope / se_slope;
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => Some(2.0 * (1.0 - dist.cdf(t_stat.abs()))),
        Err(_) => None,
    }
}
