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

//! Contains [`FittingDistribution`] trait and its implementors.
//!
//! A [`Distribution`](crate::Distribution) summarises its samples either with a normal
//! distribution or with a kernel density estimate. [`FittingDistribution`] is the common way to
//! construct both from a dataset.
use statrs::{distribution::Normal, statistics::Statistics};

use crate::error::{DistributionError, Result};
use crate::kde::GaussianKde;

#[allow(clippy::module_name_repetitions)]
/// A trait for probability distributions that can be constructed from a dataset.
pub trait FittingDistribution: Sized {
    /// Constructs `Self` from `samples` dataset in a way that approximates its distribution.
    ///
    /// # Errors
    /// Returns an error if `samples` cannot determine the parameters of `Self`.
    fn fit(samples: &[f64]) -> Result<Self>;
}

impl FittingDistribution for Normal {
    /// Returns a normal distribution with the mean equal to the mean of `samples` and the standard
    /// deviation equal to the population standard deviation of `samples`.
    fn fit(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(DistributionError::EmptySamples);
        }
        let mean = Statistics::mean(samples);
        let stdev = Statistics::population_std_dev(samples);
        if stdev <= 0.0 {
            return Err(DistributionError::ZeroSpread);
        }
        Ok(Normal::new(mean, stdev)?)
    }
}

impl FittingDistribution for GaussianKde {
    /// Returns a kernel density estimate with the bandwidth chosen by Scott's rule.
    fn fit(samples: &[f64]) -> Result<Self> {
        GaussianKde::fit(samples)
    }
}
