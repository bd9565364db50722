/*!
This crate defines the [`Metric`](trait.Metric.html) and [`StreamingMetric`](trait.StreamingMetric.html) traits and the concrete metrics sapling reports: [`ClassificationMetrics`](struct.ClassificationMetrics.html) (accuracy and weighted F1), [`RegressionMetrics`](struct.RegressionMetrics.html) (R² and RMSE), and the summary statistics used by imputation and exploration.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod classification;
mod mean_variance;
mod median;
mod mode;
mod regression;

pub use self::classification::{
	ClassMetrics, ClassificationMetrics, ClassificationMetricsInput, ClassificationMetricsOutput,
};
pub use self::mean_variance::MeanVariance;
pub use self::median::{quantile, Median};
pub use self::mode::{Mode, ModeOutput};
pub use self::regression::{RegressionMetrics, RegressionMetricsInput, RegressionMetricsOutput};

/**
The `Metric` trait defines a common interface to metrics that are computed when the entire input is available at once.

The lifetime `'a` allows `Input`s and `Output`s to borrow from their enclosing scope.
*/
pub trait Metric<'a> {
	type Input;
	type Output;
	fn compute(input: Self::Input) -> Self::Output;
}

/**
The `StreamingMetric` trait defines a common interface to metrics that are computed in a streaming manner, where the input arrives in chunks.

After being initialized, a metric can have `update()` called on it any number of times. Two metrics can be combined with `merge()`. When finished aggregating, call `finalize()` to produce the `Output`.

```
use sapling_metrics::StreamingMetric;

struct Min(f32);

impl StreamingMetric<'_> for Min {
	type Input = f32;
	type Output = f32;
	fn update(&mut self, input: Self::Input) {
		self.0 = self.0.min(input)
	}
	fn merge(&mut self, other: Self) { self.0 = self.0.min(other.0) }
	fn finalize(self) -> Self::Output { self.0 }
}
```
*/
pub trait StreamingMetric<'a> {
	/// `Input` is the type to aggregate in calls to `update()`.
	type Input;
	/// `Output` is the return type of `finalize()`.
	type Output;
	/// Update this streaming metric with `input`.
	fn update(&mut self, input: Self::Input);
	/// Merge multiple independently computed streaming metrics.
	fn merge(&mut self, other: Self);
	/// When you are done aggregating `Input`s, call `finalize()` to produce an `Output`.
	fn finalize(self) -> Self::Output;
}
