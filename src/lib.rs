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

//! A distribution described by the samples drawn from it.
//!
//! Results of Monte-Carlo simulations, bootstrap resampling and Markov chains are sets of
//! samples rather than a value with an error. [`Distribution`] wraps such a set and answers the
//! usual questions about it: what is the most likely value, how large is the spread, is it
//! reasonable to report the spread as a standard deviation.
//!
//! # Examples
//!
//! A measurement repeated many times with a random error of the instrument:
//! ```
//! use rand::SeedableRng;
//! use rand_distr::{Distribution as _, Normal};
//! use sample_distribution::Distribution;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(3);
//! let instrument = Normal::new(63.2, 4.9).unwrap();
//! let measurements: Vec<f64> = instrument.sample_iter(&mut rng).take(1000).collect();
//!
//! let distr = Distribution::named(measurements, "measurement").unwrap();
//! assert_eq!(distr.size(), 1000);
//! assert!((distr.n() - 63.2).abs() < 1.0);
//!
//! // The offsets of the 2.5% and 97.5% percentiles from the mean
//! let (lower, upper) = distr.con_int();
//! assert!(lower < 0.0 && upper > 0.0);
//!
//! // The standard deviation is only reported if the samples look normally distributed
//! match distr.s() {
//!     Some(s) => println!("{}: {} ± {s}", distr.name, distr.n()),
//!     None => println!("{}: {}{upper:+}{lower:+}", distr.name, distr.n()),
//! }
//! ```
//!
//! The spread of samples that are clearly not normally distributed is not reported as a
//! standard deviation:
//! ```
//! use sample_distribution::Distribution;
//!
//! // 100 evenly spaced points in [0, 1]
//! let flat: Vec<f64> = (0..100).map(|i| f64::from(i) / 99.0).collect();
//! let distr = Distribution::new(flat).unwrap();
//!
//! assert!(!distr.normal());
//! assert_eq!(distr.s(), None);
//! assert_eq!(distr.v(), None);
//! // The density is estimated with a Gaussian kernel, so it doesn't drop to zero at the edges
//! assert!(distr.pdf(0.0) > 0.0);
//! assert_eq!(distr.negative_pdf(0.5), -distr.pdf(0.5));
//! ```
//!
//! A distribution is saved as its samples and its name:
//! ```
//! use sample_distribution::{Distribution, DistributionDict};
//!
//! let mut distr = Distribution::named(vec![1.0, 2.0, 4.0], "counts").unwrap();
//! distr.add_samples(&[8.0]).unwrap();
//!
//! let dict = distr.to_dict();
//! assert_eq!(
//!     dict,
//!     DistributionDict {
//!         samples: vec![1.0, 2.0, 4.0, 8.0],
//!         name: "counts".to_string(),
//!     }
//! );
//! let restored = Distribution::from_dict(dict).unwrap();
//! assert_eq!(restored.samples(), distr.samples());
//! ```
#![deny(clippy::pedantic)]
#![deny(missing_docs)]

pub mod distribution;
pub mod error;
pub mod fitting;
pub mod kde;
pub mod normality;

pub use distribution::{Distribution, DistributionDict};
pub use error::{DistributionError, Result};
