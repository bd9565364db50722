//! https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Parallel_algorithm

use super::StreamingMetric;
use num_traits::ToPrimitive;

/// `MeanVariance` accumulates the count, mean, and sum of squared deviations (m2) of a stream of values. NaN values are skipped.
#[derive(Clone, Debug, Default)]
pub struct MeanVariance {
	pub n: u64,
	pub mean: f64,
	pub m2: f64,
}

impl MeanVariance {
	pub fn compute(values: &[f32]) -> MeanVariance {
		let mut mean_variance = MeanVariance::default();
		for value in values {
			mean_variance.update(*value);
		}
		mean_variance
	}

	/// The population variance, or `None` if no values were seen.
	pub fn variance(&self) -> Option<f64> {
		if self.n == 0 {
			None
		} else {
			Some(self.m2 / self.n.to_f64()?)
		}
	}

	/// The sample variance with one degree of freedom removed, or `None` if fewer than two values were seen.
	pub fn sample_variance(&self) -> Option<f64> {
		if self.n < 2 {
			None
		} else {
			Some(self.m2 / (self.n - 1).to_f64()?)
		}
	}
}

impl StreamingMetric<'_> for MeanVariance {
	type Input = f32;
	type Output = MeanVariance;

	fn update(&mut self, value: f32) {
		if value.is_nan() {
			return;
		}
		self.merge(MeanVariance {
			n: 1,
			mean: value.into(),
			m2: 0.0,
		});
	}

	fn merge(&mut self, other: Self) {
		if other.n == 0 {
			return;
		}
		if self.n == 0 {
			*self = other;
			return;
		}
		let n_a = self.n as f64;
		let n_b = other.n as f64;
		let delta = other.mean - self.mean;
		self.mean = (n_a * self.mean + n_b * other.mean) / (n_a + n_b);
		self.m2 += other.m2 + delta * delta * (n_a * n_b / (n_a + n_b));
		self.n += other.n;
	}

	fn finalize(self) -> MeanVariance {
		self
	}
}

#[test]
fn test_mean_variance() {
	let mean_variance = MeanVariance::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0, f32::NAN]);
	assert_eq!(mean_variance.n, 8);
	assert!((mean_variance.mean - 5.0).abs() < 1e-9);
	assert!((mean_variance.variance().unwrap() - 4.0).abs() < 1e-9);
	assert!((mean_variance.sample_variance().unwrap() - 32.0 / 7.0).abs() < 1e-9);
	let mut a = MeanVariance::compute(&[2.0, 4.0, 4.0]);
	a.merge(MeanVariance::compute(&[4.0, 5.0, 5.0, 7.0, 9.0]));
	assert!((a.m2 - mean_variance.m2).abs() < 1e-9);
}
