use super::{MeanVariance, StreamingMetric};
use num_traits::ToPrimitive;

/// `RegressionMetrics` computes the squared and absolute error of predictions against labels, along with the coefficient of determination (R²).
#[derive(Default)]
pub struct RegressionMetrics {
	labels: MeanVariance,
	absolute_error: f64,
	squared_error: f64,
}

pub struct RegressionMetricsInput<'a> {
	pub predictions: &'a [f32],
	pub labels: &'a [f32],
}

#[derive(Debug)]
pub struct RegressionMetricsOutput {
	pub mse: f32,
	pub rmse: f32,
	pub mae: f32,
	pub r2: f32,
	/// The root mean squared error of always predicting the mean of the labels.
	pub baseline_rmse: f32,
}

impl<'a> StreamingMetric<'a> for RegressionMetrics {
	type Input = RegressionMetricsInput<'a>;
	type Output = RegressionMetricsOutput;

	fn update(&mut self, input: RegressionMetricsInput) {
		for (prediction, label) in input.predictions.iter().zip(input.labels.iter()) {
			let error = f64::from(*prediction) - f64::from(*label);
			self.absolute_error += error.abs();
			self.squared_error += error * error;
			self.labels.update(*label);
		}
	}

	fn merge(&mut self, other: Self) {
		self.labels.merge(other.labels);
		self.absolute_error += other.absolute_error;
		self.squared_error += other.squared_error;
	}

	fn finalize(self) -> RegressionMetricsOutput {
		let n = self.labels.n.to_f64().unwrap_or(0.0);
		if n == 0.0 {
			return RegressionMetricsOutput {
				mse: 0.0,
				rmse: 0.0,
				mae: 0.0,
				r2: 0.0,
				baseline_rmse: 0.0,
			};
		}
		let mse = self.squared_error / n;
		let mae = self.absolute_error / n;
		let baseline_mse = self.labels.m2 / n;
		// With constant labels the total sum of squares is zero, so R² is 1 for a perfect fit and 0 otherwise.
		let r2 = if self.labels.m2 > 0.0 {
			1.0 - self.squared_error / self.labels.m2
		} else if self.squared_error == 0.0 {
			1.0
		} else {
			0.0
		};
		RegressionMetricsOutput {
			mse: mse as f32,
			rmse: mse.sqrt() as f32,
			mae: mae as f32,
			r2: r2 as f32,
			baseline_rmse: baseline_mse.sqrt() as f32,
		}
	}
}

#[test]
fn test_regression_metrics() {
	let mut metrics = RegressionMetrics::default();
	metrics.update(RegressionMetricsInput {
		predictions: &[2.5, 0.0, 2.0, 8.0],
		labels: &[3.0, -0.5, 2.0, 7.0],
	});
	let metrics = metrics.finalize();
	// sklearn.metrics.r2_score gives 0.9486081370449679 for this input.
	assert!((metrics.r2 - 0.948_608_1).abs() < 1e-5);
	assert!((metrics.mse - 0.375).abs() < 1e-6);
	assert!((metrics.mae - 0.5).abs() < 1e-6);
	assert!((metrics.rmse - 0.375f32.sqrt()).abs() < 1e-6);
}

#[test]
fn test_constant_labels() {
	let mut perfect = RegressionMetrics::default();
	perfect.update(RegressionMetricsInput {
		predictions: &[1.0, 1.0],
		labels: &[1.0, 1.0],
	});
	assert_eq!(perfect.finalize().r2, 1.0);
	let mut imperfect = RegressionMetrics::default();
	imperfect.update(RegressionMetricsInput {
		predictions: &[1.0, 2.0],
		labels: &[1.0, 1.0],
	});
	assert_eq!(imperfect.finalize().r2, 0.0);
}
