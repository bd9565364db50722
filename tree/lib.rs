/*!
This crate implements CART decision trees for classification and regression. Classifiers choose splits that minimize Gini impurity and regressors choose splits that minimize squared error. Every split compares a single feature with a threshold halfway between two adjacent training values.

```
use ndarray::prelude::*;
use sapling_tree::{Classifier, TrainOptions};

let features = array![[1.0], [2.0], [10.0], [11.0]];
let labels = [0, 0, 1, 1];
let classes = vec!["small".to_owned(), "large".to_owned()];
let model = Classifier::train(features.view(), &labels, classes, &TrainOptions::default()).unwrap();
assert_eq!(model.predict(features.view()).unwrap(), vec![0, 0, 1, 1]);
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod classifier;
mod dot;
mod feature_importances;
mod regressor;
mod train;

pub use self::classifier::Classifier;
pub use self::dot::DotOptions;
pub use self::feature_importances::compute_feature_importances;
pub use self::regressor::Regressor;

use ndarray::prelude::*;
use sapling_util::finite::NotFiniteError;

/// These are the options passed to `Classifier::train` and `Regressor::train`.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainOptions {
	/// The depth of the tree will never exceed this value. The root has depth 0.
	pub max_depth: usize,
	/// A node with fewer training examples than this will not be split.
	pub min_examples_split: usize,
	/// A split is only valid if each child receives at least this many training examples.
	pub min_examples_leaf: usize,
	/// Seeds the shuffle of the order in which features are searched for splits. Two trainings with the same seed and data produce the same tree.
	pub seed: u64,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			max_depth: 5,
			min_examples_split: 2,
			min_examples_leaf: 1,
			seed: 42,
		}
	}
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TreeError {
	#[error("cannot train a tree without any examples")]
	NoExamples,
	#[error("cannot train a tree without any features")]
	NoFeatures,
	#[error("there are {n_labels} labels for {n_examples} examples")]
	LabelCountMismatch { n_examples: usize, n_labels: usize },
	#[error("label {label} is out of range for {n_classes} classes")]
	LabelOutOfRange { label: usize, n_classes: usize },
	#[error("invalid label")]
	InvalidLabel(#[from] NotFiniteError),
	#[error("{name} must be at least {min}, but it is {value}")]
	InvalidOption {
		name: &'static str,
		min: usize,
		value: usize,
	},
	#[error("the tree was trained with {expected} features, but {actual} were given")]
	FeatureCountMismatch { expected: usize, actual: usize },
}

/// Trees are stored as a `Vec` of `Node`s in depth first order, so the root is at index 0. Each branch in the tree has two indexes into the `Vec`, one for each of its children.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Follow the branches from the root to the leaf that `features` belongs to.
	pub fn leaf(&self, features: ArrayView1<f32>) -> &LeafNode {
		let mut node_index = 0;
		loop {
			match &self.nodes[node_index] {
				Node::Branch(BranchNode {
					left_child_index,
					right_child_index,
					split,
					..
				}) => {
					node_index = if features[split.feature_index] <= split.split_value {
						*left_child_index
					} else {
						*right_child_index
					};
				}
				Node::Leaf(leaf) => return leaf,
			}
		}
	}

	pub fn depth(&self) -> usize {
		fn depth(tree: &Tree, node_index: usize) -> usize {
			match &tree.nodes[node_index] {
				Node::Branch(branch) => {
					1 + depth(tree, branch.left_child_index).max(depth(tree, branch.right_child_index))
				}
				Node::Leaf(_) => 0,
			}
		}
		depth(self, 0)
	}

	pub fn n_leaves(&self) -> usize {
		self.nodes
			.iter()
			.filter(|node| matches!(node, Node::Leaf(_)))
			.count()
	}
}

/// A node is either a branch or a leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

impl Node {
	pub fn stats(&self) -> &NodeStats {
		match self {
			Node::Branch(branch) => &branch.stats,
			Node::Leaf(leaf) => &leaf.stats,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BranchNode {
	pub left_child_index: usize,
	pub right_child_index: usize,
	pub split: BranchSplitContinuous,
	pub stats: NodeStats,
}

/// A continuous branch split takes the value of a single feature and compares it with `split_value`. If the value is <= `split_value`, the example is sent left. Otherwise, including when the value is NaN, it is sent right.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchSplitContinuous {
	pub feature_index: usize,
	pub split_value: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafNode {
	pub stats: NodeStats,
}

/// The training examples that reached a node, summarized.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStats {
	pub n_examples: usize,
	/// Gini impurity for classification, mean squared error for regression.
	pub impurity: f32,
	pub value: NodeValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
	/// The number of training examples of each class.
	ClassCounts(Vec<usize>),
	/// The mean of the training labels.
	Mean(f32),
}
