use crate::{Labels, Model};
use anyhow::{format_err, Result};
use ndarray::prelude::*;
use sapling_metrics::{
	ClassificationMetrics, ClassificationMetricsInput, RegressionMetrics, RegressionMetricsInput,
	StreamingMetric,
};

/// The metrics reported for a model on one set of examples. The baselines are the scores of always predicting the most frequent class or the mean label.
#[derive(Clone, Debug, PartialEq)]
pub enum Metrics {
	Classification {
		accuracy: f32,
		f1_weighted: f32,
		baseline_accuracy: f32,
	},
	Regression {
		r2: f32,
		rmse: f32,
		baseline_rmse: f32,
	},
}

/// Predict `features` with `model` and score the predictions against `labels`.
pub fn evaluate(model: &Model, features: ArrayView2<f32>, labels: &Labels) -> Result<Metrics> {
	match (model, labels) {
		(Model::Classifier(model), Labels::Classes { classes, labels }) => {
			let predictions = model.predict(features)?;
			let mut metrics = ClassificationMetrics::new(classes.len());
			metrics.update(ClassificationMetricsInput {
				predictions: &predictions,
				labels,
			});
			let metrics = metrics.finalize();
			Ok(Metrics::Classification {
				accuracy: metrics.accuracy,
				f1_weighted: metrics.f1_weighted,
				baseline_accuracy: metrics.baseline_accuracy,
			})
		}
		(Model::Regressor(model), Labels::Values(labels)) => {
			let predictions = model.predict(features)?;
			let mut metrics = RegressionMetrics::default();
			metrics.update(RegressionMetricsInput {
				predictions: &predictions,
				labels,
			});
			let metrics = metrics.finalize();
			Ok(Metrics::Regression {
				r2: metrics.r2,
				rmse: metrics.rmse,
				baseline_rmse: metrics.baseline_rmse,
			})
		}
		_ => Err(format_err!(
			"a {} model cannot be evaluated with these labels",
			model.problem_type()
		)),
	}
}

#[test]
fn test_evaluate_classifier() {
	let features = array![[1.0], [2.0], [3.0], [4.0]];
	let labels = Labels::Classes {
		classes: vec!["a".to_owned(), "b".to_owned()],
		labels: vec![0, 0, 1, 1],
	};
	let model = Model::train(features.view(), &labels, &Default::default()).unwrap();
	let metrics = evaluate(&model, array![[1.5], [3.5], [0.0]].view(), &Labels::Classes {
		classes: vec!["a".to_owned(), "b".to_owned()],
		labels: vec![0, 1, 1],
	})
	.unwrap();
	match metrics {
		Metrics::Classification { accuracy, .. } => assert!((accuracy - 2.0 / 3.0).abs() < 1e-6),
		_ => panic!("expected classification metrics"),
	}
}

#[test]
fn test_evaluate_mismatch() {
	let features = array![[1.0], [2.0]];
	let model = Model::train(features.view(), &Labels::Values(vec![1.0, 2.0]), &Default::default())
		.unwrap();
	let labels = Labels::Classes {
		classes: vec!["a".to_owned(), "b".to_owned()],
		labels: vec![0, 1],
	};
	assert!(evaluate(&model, features.view(), &labels).is_err());
}
