use super::StreamingMetric;
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// `ClassificationMetrics` accumulates a confusion matrix from predicted and true class indexes and computes accuracy along with per class and support weighted precision, recall, and F1 score.
pub struct ClassificationMetrics {
	/// The shape of the confusion matrix is (n_classes x n_classes).
	confusion_matrix: Array2<u64>,
}

pub struct ClassificationMetricsInput<'a> {
	/// (n_examples), 0-indexed class indexes
	pub predictions: &'a [usize],
	/// (n_examples), 0-indexed class indexes
	pub labels: &'a [usize],
}

#[derive(Debug)]
pub struct ClassificationMetricsOutput {
	pub class_metrics: Vec<ClassMetrics>,
	pub accuracy: f32,
	pub precision_weighted: f32,
	pub recall_weighted: f32,
	/// The mean of the per class F1 scores, weighted by the number of examples of each class.
	pub f1_weighted: f32,
	/// The accuracy of always predicting the most common class.
	pub baseline_accuracy: f32,
}

/// When a precision or recall is undefined because its denominator is zero, it is reported as 0, and so is the F1 score.
#[derive(Debug)]
pub struct ClassMetrics {
	pub true_positives: u64,
	pub false_positives: u64,
	pub true_negatives: u64,
	pub false_negatives: u64,
	pub precision: f32,
	pub recall: f32,
	pub f1_score: f32,
}

impl ClassificationMetrics {
	pub fn new(n_classes: usize) -> Self {
		//                                           prediction    label
		//                                               |           |
		//                                               v           v
		let confusion_matrix = <Array2<u64>>::zeros((n_classes, n_classes));
		Self { confusion_matrix }
	}
}

fn ratio(numerator: u64, denominator: u64) -> f32 {
	if denominator == 0 {
		0.0
	} else {
		numerator.to_f32().unwrap_or(0.0) / denominator.to_f32().unwrap_or(1.0)
	}
}

impl<'a> StreamingMetric<'a> for ClassificationMetrics {
	type Input = ClassificationMetricsInput<'a>;
	type Output = ClassificationMetricsOutput;

	fn update(&mut self, input: ClassificationMetricsInput) {
		for (prediction, label) in input.predictions.iter().zip(input.labels.iter()) {
			self.confusion_matrix[(*prediction, *label)] += 1;
		}
	}

	fn merge(&mut self, other: Self) {
		self.confusion_matrix += &other.confusion_matrix;
	}

	fn finalize(self) -> ClassificationMetricsOutput {
		let n_classes = self.confusion_matrix.nrows();
		let n_examples = self.confusion_matrix.sum();
		let confusion_matrix = self.confusion_matrix;
		let class_metrics: Vec<ClassMetrics> = (0..n_classes)
			.map(|class_index| {
				let true_positives = confusion_matrix[(class_index, class_index)];
				let false_positives = confusion_matrix.row(class_index).sum() - true_positives;
				let false_negatives = confusion_matrix.column(class_index).sum() - true_positives;
				let true_negatives =
					n_examples - true_positives - false_positives - false_negatives;
				let precision = ratio(true_positives, true_positives + false_positives);
				let recall = ratio(true_positives, true_positives + false_negatives);
				let f1_score = if precision + recall > 0.0 {
					2.0 * (precision * recall) / (precision + recall)
				} else {
					0.0
				};
				ClassMetrics {
					true_positives,
					false_positives,
					true_negatives,
					false_negatives,
					precision,
					recall,
					f1_score,
				}
			})
			.collect();
		let n_correct: u64 = confusion_matrix.diag().sum();
		let accuracy = ratio(n_correct, n_examples);
		let n_examples_per_class = confusion_matrix.sum_axis(Axis(0));
		let weighted = |value: &dyn Fn(&ClassMetrics) -> f32| -> f32 {
			if n_examples == 0 {
				return 0.0;
			}
			class_metrics
				.iter()
				.zip(n_examples_per_class.iter())
				.map(|(class, n_examples_in_class)| {
					value(class) * n_examples_in_class.to_f32().unwrap_or(0.0)
				})
				.sum::<f32>() / n_examples.to_f32().unwrap_or(1.0)
		};
		let precision_weighted = weighted(&|class| class.precision);
		let recall_weighted = weighted(&|class| class.recall);
		let f1_weighted = weighted(&|class| class.f1_score);
		let baseline_accuracy = ratio(
			n_examples_per_class.iter().cloned().max().unwrap_or(0),
			n_examples,
		);
		ClassificationMetricsOutput {
			class_metrics,
			accuracy,
			precision_weighted,
			recall_weighted,
			f1_weighted,
			baseline_accuracy,
		}
	}
}

#[cfg(test)]
fn assert_close(a: f32, b: f32) {
	assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
}

#[test]
fn test_binary() {
	let mut metrics = ClassificationMetrics::new(2);
	let labels = [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
	let predictions = [
		0, // correct
		0, // correct
		0, // correct
		0, // correct
		0, // correct
		1, // incorrect
		1, // incorrect
		1, // incorrect
		1, // correct
		1, // correct
		1, // correct
		0, // incorrect
		0, // incorrect
	];
	metrics.update(ClassificationMetricsInput {
		predictions: &predictions,
		labels: &labels,
	});
	let metrics = metrics.finalize();
	assert_eq!(metrics.class_metrics[0].true_positives, 5);
	assert_eq!(metrics.class_metrics[0].false_positives, 2);
	assert_eq!(metrics.class_metrics[0].false_negatives, 3);
	assert_eq!(metrics.class_metrics[1].true_negatives, 5);
	assert_close(metrics.accuracy, 8.0 / 13.0);
	assert_close(metrics.class_metrics[0].f1_score, 2.0 / 3.0);
	assert_close(metrics.class_metrics[1].f1_score, 6.0 / 11.0);
	assert_close(
		metrics.f1_weighted,
		(8.0 * (2.0 / 3.0) + 5.0 * (6.0 / 11.0)) / 13.0,
	);
	assert_close(metrics.baseline_accuracy, 8.0 / 13.0);
}

#[test]
fn test_multiclass() {
	// example taken from https://en.wikipedia.org/wiki/Confusion_matrix
	let mut metrics = ClassificationMetrics::new(3);
	let labels = [
		0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
	];
	let predictions = [
		0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
	];
	metrics.update(ClassificationMetricsInput {
		predictions: &predictions,
		labels: &labels,
	});
	let metrics = metrics.finalize();
	assert_close(metrics.accuracy, 19.0 / 27.0);
	assert_close(metrics.class_metrics[2].precision, 11.0 / 12.0);
	assert_close(metrics.class_metrics[2].recall, 11.0 / 13.0);
	let f1s = [2.0 / 3.0, 3.0 / 7.0, 0.88];
	let supports = [8.0, 6.0, 13.0];
	let expected = (f1s[0] * supports[0] + f1s[1] * supports[1] + f1s[2] * supports[2]) / 27.0;
	assert_close(metrics.f1_weighted, expected);
	assert_close(metrics.recall_weighted, metrics.accuracy);
}

#[test]
fn test_class_never_predicted() {
	let mut metrics = ClassificationMetrics::new(2);
	metrics.update(ClassificationMetricsInput {
		predictions: &[0, 0, 0, 0],
		labels: &[0, 0, 1, 1],
	});
	let metrics = metrics.finalize();
	assert_eq!(metrics.class_metrics[1].precision, 0.0);
	assert_eq!(metrics.class_metrics[1].f1_score, 0.0);
	assert_close(metrics.accuracy, 0.5);
	insta::assert_debug_snapshot!(metrics.class_metrics[1], @r###"
 ClassMetrics {
     true_positives: 0,
     false_positives: 0,
     true_negatives: 2,
     false_negatives: 2,
     precision: 0.0,
     recall: 0.0,
     f1_score: 0.0,
 }
 "###);
}
