// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Contains the D'Agostino-Pearson omnibus test of normality.
//!
//! The test combines a test of the sample skewness ([`skew_test`]) and a test of the sample
//! kurtosis ([`kurtosis_test`]). Each of them transforms the corresponding sample moment into
//! a statistic that is approximately standard normal if the dataset is drawn from a normal
//! distribution. The sum of their squares is approximately χ² distributed with 2 degrees of
//! freedom.
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{DistributionError, Result};

/// Minimal number of samples for [`skew_test`] and [`normal_test`].
pub const MIN_SKEW_SAMPLES: usize = 8;
/// Minimal number of samples for [`kurtosis_test`].
pub const MIN_KURTOSIS_SAMPLES: usize = 5;
/// Below this number of samples the normal approximation of [`kurtosis_test`] is unreliable.
const RELIABLE_KURTOSIS_SAMPLES: usize = 20;

/// The outcome of [`normal_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalTest {
    /// The K² statistic: sum of the squared z-scores of the skewness and kurtosis tests.
    pub statistic: f64,
    /// Probability of a statistic at least as large under the hypothesis of normality.
    pub pvalue: f64,
}

/// Central moments of a dataset, normalised by `n` rather than `n - 1`.
struct Moments {
    n: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl Moments {
    #[allow(clippy::cast_precision_loss)]
    fn new(samples: &[f64]) -> Result<Self> {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for x in samples {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        if m2 <= 0.0 {
            return Err(DistributionError::ZeroSpread);
        }
        Ok(Self {
            n,
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
        })
    }

    /// Biased sample skewness.
    fn skewness(&self) -> f64 {
        self.m3 / self.m2.powf(1.5)
    }

    /// Biased sample kurtosis (Pearson's definition, 3 for a normal distribution).
    fn kurtosis(&self) -> f64 {
        self.m4 / (self.m2 * self.m2)
    }
}

fn require(samples: &[f64], required: usize) -> Result<()> {
    if samples.len() < required {
        return Err(DistributionError::InsufficientSamples {
            required,
            actual: samples.len(),
        });
    }
    Ok(())
}

/// Returns the z-score of the sample skewness of `samples`.
///
/// # Errors
/// [`DistributionError::InsufficientSamples`] for less than [`MIN_SKEW_SAMPLES`] samples and
/// [`DistributionError::ZeroSpread`] if all samples are equal.
pub fn skew_test(samples: &[f64]) -> Result<f64> {
    require(samples, MIN_SKEW_SAMPLES)?;
    let moments = Moments::new(samples)?;
    Ok(skew_z(&moments))
}

fn skew_z(moments: &Moments) -> f64 {
    let n = moments.n;
    let y = moments.skewness() * f64::sqrt((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0)));
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + f64::sqrt(2.0 * (beta2 - 1.0));
    let delta = 1.0 / f64::sqrt(0.5 * w2.ln());
    let alpha = f64::sqrt(2.0 / (w2 - 1.0));
    delta * (y / alpha).asinh()
}

/// Returns the z-score of the sample kurtosis of `samples`.
///
/// # Errors
/// [`DistributionError::InsufficientSamples`] for less than [`MIN_KURTOSIS_SAMPLES`] samples and
/// [`DistributionError::ZeroSpread`] if all samples are equal.
pub fn kurtosis_test(samples: &[f64]) -> Result<f64> {
    require(samples, MIN_KURTOSIS_SAMPLES)?;
    if samples.len() < RELIABLE_KURTOSIS_SAMPLES {
        log::warn!(
            "kurtosis test is unreliable for {} samples, at least {RELIABLE_KURTOSIS_SAMPLES} are recommended",
            samples.len()
        );
    }
    let moments = Moments::new(samples)?;
    Ok(kurtosis_z(&moments))
}

fn kurtosis_z(moments: &Moments) -> f64 {
    let n = moments.n;
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let variance = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (moments.kurtosis() - expected) / variance.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * f64::sqrt(6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0)));
    let a = 6.0
        + 8.0 / sqrt_beta1
            * (2.0 / sqrt_beta1 + f64::sqrt(1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)));
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * f64::sqrt(2.0 / (a - 4.0));
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / f64::sqrt(2.0 / (9.0 * a))
}

/// Runs the D'Agostino-Pearson test of the hypothesis that `samples` are drawn from a normal
/// distribution.
///
/// A small [`NormalTest::pvalue`] is evidence against normality.
///
/// # Errors
/// [`DistributionError::InsufficientSamples`] for less than [`MIN_SKEW_SAMPLES`] samples and
/// [`DistributionError::ZeroSpread`] if all samples are equal.
pub fn normal_test(samples: &[f64]) -> Result<NormalTest> {
    let skew = skew_test(samples)?;
    let kurtosis = kurtosis_test(samples)?;
    let statistic = skew * skew + kurtosis * kurtosis;
    let chi_squared = ChiSquared::new(2.0)?;
    let pvalue = 1.0 - chi_squared.cdf(statistic);
    log::debug!(
        "normality test on {} samples: K² = {statistic}, p = {pvalue}",
        samples.len()
    );
    Ok(NormalTest { statistic, pvalue })
}
