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

//! Contains the [`Distribution`] struct and its serialised form [`DistributionDict`].
use std::{borrow::Cow, fmt};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::{distribution::Normal, statistics::Statistics};

use crate::error::{check_finite, DistributionError, Result};
use crate::fitting::FittingDistribution;
use crate::kde::GaussianKde;
use crate::normality::{self, NormalTest};

/// A probability distribution described by a set of samples drawn from it.
///
/// All statistics are calculated from the samples every time they are requested, so they always
/// reflect the samples added with [`Distribution::add_samples`].
///
/// The standard deviation [`Distribution::s`] and the variance [`Distribution::v`] are only
/// reported when the samples pass a test of normality, otherwise the spread should be described
/// with the confidence interval [`Distribution::con_int`].
///
/// `add_samples` takes `&mut self`, so sharing a `Distribution` between threads requires
/// external synchronisation.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "DistributionDict", try_from = "DistributionDict")]
pub struct Distribution {
    samples: Vec<f64>, // never empty, all finite
    /// A label of the distribution. It doesn't affect any statistics.
    pub name: String,
    /// The significance level of the normality test used by [`Distribution::normal`].
    pub alpha: f64,
    /// The percentiles used by [`Distribution::con_int`].
    pub ci_points: [f64; 2],
    /// Seed of the random generator used to subsample large datasets before the normality test.
    random_state: u64,
}

impl Distribution {
    /// The default value of `self.alpha`
    pub const DEFAULT_ALPHA: f64 = 0.05;
    /// The default value of `self.ci_points`, corresponding to the 95% interval
    pub const DEFAULT_CI_POINTS: [f64; 2] = [2.5, 97.5];
    /// The default seed of the random generator
    pub const DEFAULT_RANDOM_STATE: u64 = 1;
    /// Datasets larger than this are subsampled before the normality test.
    pub const MAX_NORMALITY_SAMPLES: usize = 500;
    /// Number of points in the grid searched by [`Distribution::dist_max`]
    const DIST_MAX_GRID: usize = 1000;
    /// Number of golden-section steps refining the grid search of [`Distribution::dist_max`]
    const DIST_MAX_REFINEMENTS: usize = 64;

    /// Constructs a distribution from `samples` with an empty name.
    ///
    /// # Errors
    /// [`DistributionError::EmptySamples`] if `samples` is empty and
    /// [`DistributionError::NonFiniteSample`] if any of them is NaN or infinite.
    pub fn new(samples: impl Into<Vec<f64>>) -> Result<Self> {
        Self::named(samples, String::new())
    }

    /// Constructs a distribution from `samples` with the given `name`.
    ///
    /// # Errors
    /// [`DistributionError::EmptySamples`] if `samples` is empty and
    /// [`DistributionError::NonFiniteSample`] if any of them is NaN or infinite.
    pub fn named(samples: impl Into<Vec<f64>>, name: impl Into<String>) -> Result<Self> {
        let samples = samples.into();
        if samples.is_empty() {
            return Err(DistributionError::EmptySamples);
        }
        check_finite(&samples)?;
        Ok(Self {
            samples,
            name: name.into(),
            alpha: Self::DEFAULT_ALPHA,
            ci_points: Self::DEFAULT_CI_POINTS,
            random_state: Self::DEFAULT_RANDOM_STATE,
        })
    }

    /// Replaces the seed of the random generator.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Returns the samples in the order they were added.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn size(&self) -> usize {
        self.samples.len()
    }

    /// Returns the smallest sample.
    #[must_use]
    pub fn min(&self) -> f64 {
        Statistics::min(&self.samples)
    }

    /// Returns the largest sample.
    #[must_use]
    pub fn max(&self) -> f64 {
        Statistics::max(&self.samples)
    }

    /// Appends `new_samples` to the samples.
    ///
    /// # Errors
    /// [`DistributionError::NonFiniteSample`] if any of `new_samples` is NaN or infinite. In this
    /// case no samples are added.
    pub fn add_samples(&mut self, new_samples: &[f64]) -> Result<()> {
        check_finite(new_samples)?;
        self.samples.extend_from_slice(new_samples);
        Ok(())
    }

    /// Returns the samples the normality test is run on.
    ///
    /// Datasets larger than [`Self::MAX_NORMALITY_SAMPLES`] are resampled with replacement down to
    /// that size. The generator is seeded anew on every call, so the result is reproducible.
    fn normality_samples(&self) -> Cow<'_, [f64]> {
        if self.size() <= Self::MAX_NORMALITY_SAMPLES {
            return Cow::Borrowed(&self.samples);
        }
        let mut rng = StdRng::seed_from_u64(self.random_state);
        let subsample = (0..Self::MAX_NORMALITY_SAMPLES)
            .map(|_| self.samples[rng.gen_range(0..self.size())])
            .collect();
        Cow::Owned(subsample)
    }

    /// Runs the D'Agostino-Pearson normality test on the samples.
    ///
    /// # Errors
    /// [`DistributionError::InsufficientSamples`] for less than
    /// [`normality::MIN_SKEW_SAMPLES`] samples and [`DistributionError::ZeroSpread`] if all
    /// samples are equal.
    pub fn normality_test(&self) -> Result<NormalTest> {
        normality::normal_test(&self.normality_samples())
    }

    /// Returns `true` if the normality test doesn't reject the hypothesis that the samples are
    /// drawn from a normal distribution at the significance level `self.alpha`.
    ///
    /// Datasets the test can't be run on are not considered normal.
    #[must_use]
    pub fn normal(&self) -> bool {
        match self.normality_test() {
            Ok(test) => test.pvalue > self.alpha,
            Err(err) => {
                log::debug!("distribution {:?} is not normal: {err}", self.name);
                false
            }
        }
    }

    /// Returns the mean of the samples.
    #[must_use]
    pub fn n(&self) -> f64 {
        Statistics::mean(&self.samples)
    }

    /// Returns the standard deviation of the samples if they are normally distributed.
    #[must_use]
    pub fn s(&self) -> Option<f64> {
        self.normal()
            .then(|| Statistics::population_std_dev(&self.samples))
    }

    /// Returns the variance of the samples if they are normally distributed.
    #[must_use]
    pub fn v(&self) -> Option<f64> {
        self.normal()
            .then(|| Statistics::population_variance(&self.samples))
    }

    /// Returns the normal distribution with the mean [`Self::n`] and the standard deviation
    /// [`Self::s`], if the samples are normally distributed.
    #[must_use]
    pub fn to_normal(&self) -> Option<Normal> {
        if !self.normal() {
            return None;
        }
        <Normal as FittingDistribution>::fit(&self.samples).ok()
    }

    /// Returns a kernel density estimate fitted to the samples.
    ///
    /// Returns `None` if there is only one distinct sample value.
    #[must_use]
    pub fn kde(&self) -> Option<GaussianKde> {
        <GaussianKde as FittingDistribution>::fit(&self.samples).ok()
    }

    /// Returns the probability density at `x` estimated from the samples.
    ///
    /// Returns NaN if the density can't be estimated (see [`Self::kde`]).
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        self.kde().map_or(f64::NAN, |kde| kde.pdf(x))
    }

    /// Returns the logarithm of [`Self::pdf`].
    #[must_use]
    pub fn logpdf(&self, x: f64) -> f64 {
        self.kde().map_or(f64::NAN, |kde| kde.ln_pdf(x))
    }

    /// Returns the negated [`Self::pdf`], for use with minimisers.
    #[must_use]
    pub fn negative_pdf(&self, x: f64) -> f64 {
        -self.pdf(x)
    }

    /// Returns the most likely value of the distribution: the point in `[self.min(),
    /// self.max()]` where the estimated probability density is the largest.
    #[must_use]
    pub fn dist_max(&self) -> f64 {
        let (lower, upper) = (self.min(), self.max());
        let Some(kde) = self.kde() else {
            // All samples are equal
            return lower;
        };
        #[allow(clippy::cast_precision_loss)]
        let step = (upper - lower) / (Self::DIST_MAX_GRID - 1) as f64;
        #[allow(clippy::cast_precision_loss)]
        let (coarse, _) = (0..Self::DIST_MAX_GRID)
            .map(|i| lower + i as f64 * step)
            .map(|x| (x, kde.pdf(x)))
            .fold((lower, f64::NEG_INFINITY), |best, point| {
                if point.1 > best.1 {
                    point
                } else {
                    best
                }
            });
        log::trace!("dist_max grid search peaked at {coarse}");
        golden_section_max(
            |x| kde.pdf(x),
            f64::max(coarse - step, lower),
            f64::min(coarse + step, upper),
            Self::DIST_MAX_REFINEMENTS,
        )
    }

    /// Returns the `q`-th percentile of the samples, interpolating linearly between the closest
    /// ranks. `q` is clamped to `[0, 100]`.
    #[must_use]
    pub fn percentile(&self, q: f64) -> f64 {
        percentile_of_sorted(&self.sorted(), q)
    }

    /// Returns the confidence interval at the percentiles `self.ci_points` as offsets from the
    /// mean.
    #[must_use]
    pub fn con_int(&self) -> (f64, f64) {
        self.con_int_with(self.ci_points)
    }

    /// Returns the offsets of the percentiles `ci_points` from the mean, e.g. `[2.5, 97.5]` gives
    /// the 95% interval.
    #[must_use]
    pub fn con_int_with(&self, ci_points: [f64; 2]) -> (f64, f64) {
        let sorted = self.sorted();
        let mean = self.n();
        (
            percentile_of_sorted(&sorted, ci_points[0]) - mean,
            percentile_of_sorted(&sorted, ci_points[1]) - mean,
        )
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    /// Returns the serialisable description of the distribution.
    #[must_use]
    pub fn to_dict(&self) -> DistributionDict {
        DistributionDict {
            samples: self.samples.clone(),
            name: self.name.clone(),
        }
    }

    /// Constructs a distribution from its description. The settings that are not part of `dict`
    /// take their default values.
    ///
    /// # Errors
    /// The same as [`Self::named`].
    pub fn from_dict(dict: DistributionDict) -> Result<Self> {
        Self::named(dict.samples, dict.name)
    }
}

/// Returns the `q`-th percentile of `sorted`, which must not be empty.
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let rank = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = rank.floor() as usize;
    let fraction = rank - rank.floor();
    match sorted.get(index + 1) {
        Some(next) => sorted[index] + fraction * (next - sorted[index]),
        None => sorted[index],
    }
}

/// Returns the point in `[lower, upper]` where unimodal `density` is the largest.
fn golden_section_max(
    density: impl Fn(f64) -> f64,
    mut lower: f64,
    mut upper: f64,
    steps: usize,
) -> f64 {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let mut left = upper - ratio * (upper - lower);
    let mut right = lower + ratio * (upper - lower);
    let (mut left_value, mut right_value) = (density(left), density(right));
    for _ in 0..steps {
        if left_value > right_value {
            upper = right;
            right = left;
            right_value = left_value;
            left = upper - ratio * (upper - lower);
            left_value = density(left);
        } else {
            lower = left;
            left = right;
            left_value = right_value;
            right = lower + ratio * (upper - lower);
            right_value = density(right);
        }
    }
    (lower + upper) / 2.0
}

impl fmt::Display for Distribution {
    /// Writes the mean and the standard deviation if the samples are normally distributed, and
    /// the mean with the offsets of the confidence interval otherwise.
    ///
    /// Numbers use Rust's `{:.3e}` notation: the exponent has no sign for positive powers and no
    /// zero padding, e.g. `2.000e0 +/- 1.037e-4` rather than `2.000e+00 +/- 1.037e-04`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.n();
        match self.s() {
            Some(s) => write!(f, "{n:.3e} +/- {s:.3e}"),
            None => {
                let (lower, upper) = self.con_int();
                write!(f, "{n:.3e} +{upper:.3e} -{:.3e}", -lower)
            }
        }
    }
}

impl fmt::Debug for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.samples, f)
    }
}

#[allow(clippy::module_name_repetitions)]
/// The plain description of a [`Distribution`]: the samples and the name.
///
/// This is the form in which a [`Distribution`] is serialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionDict {
    /// The samples in order
    pub samples: Vec<f64>,
    /// The name, empty if not given
    #[serde(default)]
    pub name: String,
}

impl From<Distribution> for DistributionDict {
    fn from(distribution: Distribution) -> Self {
        Self {
            samples: distribution.samples,
            name: distribution.name,
        }
    }
}

impl TryFrom<DistributionDict> for Distribution {
    type Error = DistributionError;

    fn try_from(dict: DistributionDict) -> Result<Self> {
        Self::from_dict(dict)
    }
}
