use crate::{
	compute_feature_importances,
	train::{train, Labels},
	DotOptions, NodeValue, TrainOptions, Tree, TreeError,
};
use ndarray::prelude::*;

/// `Regressor`s predict continuous target values, for example the selling price of a home.
#[derive(Clone, Debug, PartialEq)]
pub struct Regressor {
	pub tree: Tree,
	/// The normalized impurity decrease contributed by each feature.
	pub feature_importances: Vec<f32>,
}

impl Regressor {
	/// Train a regressor.
	pub fn train(
		features: ArrayView2<f32>,
		labels: &[f32],
		options: &TrainOptions,
	) -> Result<Regressor, TreeError> {
		let tree = train(features, Labels::Values(labels), options)?;
		let feature_importances = compute_feature_importances(&tree, features.ncols());
		Ok(Regressor {
			tree,
			feature_importances,
		})
	}

	/// Predict the mean of the training labels in each row's leaf.
	pub fn predict(&self, features: ArrayView2<f32>) -> Result<Vec<f32>, TreeError> {
		let expected = self.feature_importances.len();
		if features.ncols() != expected {
			return Err(TreeError::FeatureCountMismatch {
				expected,
				actual: features.ncols(),
			});
		}
		let predictions = features
			.axis_iter(Axis(0))
			.map(|row| match self.tree.leaf(row).stats.value {
				NodeValue::Mean(mean) => mean,
				NodeValue::ClassCounts(_) => 0.0,
			})
			.collect();
		Ok(predictions)
	}

	pub fn to_dot(&self, feature_names: &[String]) -> String {
		self.tree.to_dot(&DotOptions {
			feature_names: Some(feature_names),
			..Default::default()
		})
	}
}

#[test]
fn test_regressor() {
	let features = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
	let labels = [1.0, 1.0, 1.0, 5.0, 5.0, 8.0];
	let options = TrainOptions {
		max_depth: 1,
		..Default::default()
	};
	let model = Regressor::train(features.view(), &labels, &options).unwrap();
	assert_eq!(
		model.predict(array![[0.0], [20.0]].view()).unwrap(),
		vec![1.0, 6.0]
	);
	assert_eq!(model.feature_importances, vec![1.0]);
	let model = Regressor::train(features.view(), &labels, &TrainOptions::default()).unwrap();
	assert_eq!(model.predict(features.view()).unwrap(), labels.to_vec());
}

#[test]
fn test_constant_labels() {
	let features = array![[1.0], [2.0], [3.0]];
	let model = Regressor::train(features.view(), &[4.0, 4.0, 4.0], &TrainOptions::default()).unwrap();
	assert_eq!(model.tree.nodes.len(), 1);
	assert_eq!(model.feature_importances, vec![0.0]);
}
