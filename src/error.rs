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

//! Contains [`DistributionError`], the error type of the crate.
use statrs::StatsError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
/// Errors that can occur when building a [`Distribution`](crate::Distribution) or running a
/// statistical routine on a dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// A distribution needs at least one sample.
    #[error("empty samples: a distribution needs at least one sample")]
    EmptySamples,

    /// A sample is NaN or infinite.
    #[error("non-finite sample at index {index}: {value}")]
    NonFiniteSample {
        /// Position of the offending value in the input
        index: usize,
        /// The offending value
        value: f64,
    },

    /// The dataset is too small for the requested routine.
    #[error("insufficient samples: at least {required} required, got {actual}")]
    InsufficientSamples {
        /// Minimal number of samples
        required: usize,
        /// Number of samples provided
        actual: usize,
    },

    /// All the samples have the same value.
    #[error("zero spread: all samples are equal")]
    ZeroSpread,

    /// `statrs` rejected the parameters of a distribution. Holds the message of the original
    /// error, which is neither `Clone` nor `PartialEq`.
    #[error("statistics error: {0}")]
    Statistics(String),
}

impl From<StatsError> for DistributionError {
    fn from(err: StatsError) -> Self {
        Self::Statistics(err.to_string())
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, DistributionError>;

/// Returns an error for the first non-finite value in `samples`.
pub(crate) fn check_finite(samples: &[f64]) -> Result<()> {
    match samples.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(DistributionError::NonFiniteSample {
            index,
            value: samples[index],
        }),
        None => Ok(()),
    }
}
