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

//! Contains [`GaussianKde`], a kernel density estimate with a Gaussian kernel.
//!
//! The density at `x` is the average of normal densities centred at every sample:
//!
//! f(x) = (1/n) Σᵢ φ_h(x - xᵢ)
//!
//! where φ_h is the density of a normal distribution with the mean 0 and the standard deviation
//! `h` (the bandwidth).
use statrs::{
    distribution::{Continuous, Normal},
    statistics::Statistics,
};

use crate::error::{DistributionError, Result};

/// A Gaussian kernel density estimate fitted to a dataset.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
    /// Normal distribution centred at 0 with the standard deviation equal to the bandwidth
    kernel: Normal,
}

impl GaussianKde {
    /// Fits a density estimate to `samples` with the bandwidth chosen by Scott's rule:
    /// the unbiased standard deviation of `samples` times `n^(-1/5)`.
    ///
    /// # Errors
    /// [`DistributionError::InsufficientSamples`] if there are less than 2 samples and
    /// [`DistributionError::ZeroSpread`] if all samples are equal.
    pub fn fit(samples: &[f64]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(DistributionError::InsufficientSamples {
                required: 2,
                actual: samples.len(),
            });
        }
        let stdev = Statistics::std_dev(samples);
        if stdev <= 0.0 {
            return Err(DistributionError::ZeroSpread);
        }
        let bandwidth = stdev * Self::scott_factor(samples.len());
        log::debug!(
            "fitted a kernel density estimate to {} samples, bandwidth {bandwidth}",
            samples.len()
        );
        Self::with_bandwidth(samples, bandwidth)
    }

    /// Constructs a density estimate from `samples` with an explicit `bandwidth`.
    ///
    /// # Errors
    /// [`DistributionError::EmptySamples`] if `samples` is empty and
    /// [`DistributionError::Statistics`] if `bandwidth` is not a positive number.
    pub fn with_bandwidth(samples: &[f64], bandwidth: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(DistributionError::EmptySamples);
        }
        Ok(Self {
            samples: samples.to_vec(),
            bandwidth,
            kernel: Normal::new(0.0, bandwidth)?,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    /// The multiplier of the standard deviation in Scott's rule.
    fn scott_factor(n: usize) -> f64 {
        (n as f64).powf(-0.2)
    }

    /// Returns the bandwidth of the kernel.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Returns the estimated probability density at `x`.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        let total: f64 = self.samples.iter().map(|s| self.kernel.pdf(x - s)).sum();
        #[allow(clippy::cast_precision_loss)]
        return total / self.samples.len() as f64;
    }

    /// Returns the logarithm of the estimated probability density at `x`.
    ///
    /// The sum over the kernels is done in the log space, so the result stays finite far away
    /// from the samples, where [`Self::pdf`] underflows to 0.
    #[must_use]
    pub fn ln_pdf(&self, x: f64) -> f64 {
        let terms: Vec<f64> = self
            .samples
            .iter()
            .map(|s| self.kernel.ln_pdf(x - s))
            .collect();
        let peak = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !peak.is_finite() {
            return peak;
        }
        let total: f64 = terms.iter().map(|t| (t - peak).exp()).sum();
        #[allow(clippy::cast_precision_loss)]
        return peak + total.ln() - (self.samples.len() as f64).ln();
    }

    /// Returns the estimated probability densities at each of `xs`.
    #[must_use]
    pub fn pdf_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.pdf(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "{actual} is not within {tolerance} of {expected}"
        );
    }

    #[test]
    fn bandwidth_follows_scott_rule() {
        // unbiased standard deviation of [0, 1, 2, 3] is sqrt(5/3)
        let kde = GaussianKde::fit(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        let expected = (5.0f64 / 3.0).sqrt() * 4.0f64.powf(-0.2);
        assert_close(kde.bandwidth(), expected, 1e-12);
    }

    #[test]
    fn pdf_matches_hand_computation() {
        let samples = [-1.0, 1.0];
        let kde = GaussianKde::fit(&samples).unwrap();
        // unbiased standard deviation is sqrt(2)
        let h = 2.0f64.sqrt() * 2.0f64.powf(-0.2);
        let phi = |u: f64| (-0.5 * u * u).exp() / (h * (2.0 * std::f64::consts::PI).sqrt());
        let expected = 0.5 * (phi(1.0 / h) + phi(-1.0 / h));
        assert_close(kde.pdf(0.0), expected, 1e-12);
    }

    #[test]
    fn ln_pdf_is_log_of_pdf() {
        let kde = GaussianKde::fit(&[0.1, 0.4, 0.35, 0.8, 0.9, 0.55]).unwrap();
        for x in [-1.0, 0.0, 0.3, 0.5, 1.2] {
            assert_close(kde.ln_pdf(x), kde.pdf(x).ln(), 1e-9);
        }
    }

    #[test]
    fn ln_pdf_stays_finite_far_from_samples() {
        let kde = GaussianKde::fit(&[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(kde.pdf(1e4), 0.0);
        let ln = kde.ln_pdf(1e4);
        assert!(ln.is_finite() && ln < -1e6);
    }

    #[test]
    fn density_integrates_to_one() {
        let kde = GaussianKde::fit(&[0.0, 0.5, 0.7, 2.0, 3.5]).unwrap();
        let step = 0.01;
        let grid: Vec<f64> = (0..2000_i32).map(|i| -10.0 + f64::from(i) * step).collect();
        let integral: f64 = kde.pdf_all(&grid).iter().sum::<f64>() * step;
        assert_close(integral, 1.0, 1e-3);
    }

    #[test]
    fn degenerate_samples_are_rejected() {
        assert_eq!(
            GaussianKde::fit(&[1.0]).unwrap_err(),
            DistributionError::InsufficientSamples {
                required: 2,
                actual: 1
            }
        );
        assert_eq!(
            GaussianKde::fit(&[2.0, 2.0, 2.0]).unwrap_err(),
            DistributionError::ZeroSpread
        );
        assert!(matches!(
            GaussianKde::with_bandwidth(&[1.0], -1.0),
            Err(DistributionError::Statistics(_))
        ));
    }
}
