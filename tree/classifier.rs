use crate::{
	compute_feature_importances,
	train::{train, Labels},
	DotOptions, NodeValue, TrainOptions, Tree, TreeError,
};
use ndarray::prelude::*;

/// `Classifier`s predict which of a fixed set of classes an example belongs to, for example whether a passenger survived or which species a flower is.
#[derive(Clone, Debug, PartialEq)]
pub struct Classifier {
	pub tree: Tree,
	/// The names of the classes. Labels and predictions are indexes into this list.
	pub classes: Vec<String>,
	/// The normalized impurity decrease contributed by each feature.
	pub feature_importances: Vec<f32>,
}

impl Classifier {
	/// Train a classifier. `labels` are indexes into `classes`.
	pub fn train(
		features: ArrayView2<f32>,
		labels: &[usize],
		classes: Vec<String>,
		options: &TrainOptions,
	) -> Result<Classifier, TreeError> {
		let tree = train(
			features,
			Labels::Classes {
				labels,
				n_classes: classes.len(),
			},
			options,
		)?;
		let feature_importances = compute_feature_importances(&tree, features.ncols());
		Ok(Classifier {
			tree,
			classes,
			feature_importances,
		})
	}

	/// Predict the index of the class of each row of `features`: the most common class in the row's leaf, with ties going to the class that comes first.
	pub fn predict(&self, features: ArrayView2<f32>) -> Result<Vec<usize>, TreeError> {
		self.check_features(features)?;
		let predictions = features
			.axis_iter(Axis(0))
			.map(|row| match &self.tree.leaf(row).stats.value {
				NodeValue::ClassCounts(counts) => argmax(counts),
				NodeValue::Mean(_) => 0,
			})
			.collect();
		Ok(predictions)
	}

	/// Predict the probability of each class for each row of `features`, as the fraction of training examples of each class in the row's leaf.
	pub fn predict_probabilities(&self, features: ArrayView2<f32>) -> Result<Array2<f32>, TreeError> {
		self.check_features(features)?;
		let mut probabilities = Array2::zeros((features.nrows(), self.classes.len()));
		for (row, mut probabilities) in features
			.axis_iter(Axis(0))
			.zip(probabilities.axis_iter_mut(Axis(0)))
		{
			let stats = &self.tree.leaf(row).stats;
			if let NodeValue::ClassCounts(counts) = &stats.value {
				for (probability, count) in probabilities.iter_mut().zip(counts.iter()) {
					*probability = *count as f32 / stats.n_examples as f32;
				}
			}
		}
		Ok(probabilities)
	}

	/// Render the tree in the Graphviz DOT language, labeling branches with `feature_names` and leaves with the class names.
	pub fn to_dot(&self, feature_names: &[String]) -> String {
		self.tree.to_dot(&DotOptions {
			feature_names: Some(feature_names),
			class_names: Some(&self.classes),
			..Default::default()
		})
	}

	fn check_features(&self, features: ArrayView2<f32>) -> Result<(), TreeError> {
		let expected = self.feature_importances.len();
		if features.ncols() != expected {
			return Err(TreeError::FeatureCountMismatch {
				expected,
				actual: features.ncols(),
			});
		}
		Ok(())
	}
}

pub(crate) fn argmax(counts: &[usize]) -> usize {
	let mut best_index = 0;
	for (index, count) in counts.iter().enumerate() {
		if *count > counts[best_index] {
			best_index = index;
		}
	}
	best_index
}

#[cfg(test)]
fn classes(names: &[&str]) -> Vec<String> {
	names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_classifier() {
	// Only the second feature separates the classes.
	let features = array![
		[0.0, 1.0],
		[1.0, 2.0],
		[0.0, 3.0],
		[1.0, 10.0],
		[0.0, 11.0],
		[1.0, 12.0],
	];
	let labels = [0, 0, 0, 1, 1, 1];
	let model = Classifier::train(
		features.view(),
		&labels,
		classes(&["no", "yes"]),
		&TrainOptions::default(),
	)
	.unwrap();
	assert_eq!(model.tree.nodes.len(), 3);
	assert_eq!(model.feature_importances, vec![0.0, 1.0]);
	assert_eq!(model.predict(features.view()).unwrap(), labels.to_vec());
	assert_eq!(
		model.predict(array![[0.0, 6.0], [0.0, 7.0]].view()).unwrap(),
		vec![0, 1]
	);
	assert_eq!(
		model.predict(array![[0.0]].view()),
		Err(TreeError::FeatureCountMismatch {
			expected: 2,
			actual: 1
		})
	);
}

#[test]
fn test_max_depth() {
	let features = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
	let labels = [0, 1, 0, 1, 0, 1, 0, 1];
	let options = TrainOptions {
		max_depth: 2,
		..Default::default()
	};
	let model = Classifier::train(features.view(), &labels, classes(&["a", "b"]), &options).unwrap();
	assert!(model.tree.depth() <= 2);
	let probabilities = model.predict_probabilities(features.view()).unwrap();
	for row in probabilities.axis_iter(Axis(0)) {
		assert!((row.sum() - 1.0).abs() < 1e-6);
	}
}

#[test]
fn test_deterministic() {
	let features = array![
		[1.0, 5.0, 2.0],
		[2.0, 4.0, 2.0],
		[3.0, 3.0, 1.0],
		[4.0, 2.0, 1.0],
		[5.0, 1.0, 0.0],
		[6.0, 0.0, 0.0],
	];
	let labels = [0, 0, 1, 1, 2, 2];
	let train = || {
		Classifier::train(
			features.view(),
			&labels,
			classes(&["a", "b", "c"]),
			&TrainOptions::default(),
		)
		.unwrap()
	};
	assert_eq!(train(), train());
}

#[test]
fn test_argmax_ties() {
	assert_eq!(argmax(&[1, 3, 3]), 1);
	assert_eq!(argmax(&[2, 2]), 0);
}
