use crate::{
	BranchNode, BranchSplitContinuous, LeafNode, Node, NodeStats, NodeValue, TrainOptions, Tree,
	TreeError,
};
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use sapling_util::finite::Finite;
use std::cmp::Ordering;

/// The labels a tree is trained on decide the split criterion.
#[derive(Clone, Copy)]
pub enum Labels<'a> {
	/// Class indexes in `0..n_classes`, split by Gini impurity.
	Classes { labels: &'a [usize], n_classes: usize },
	/// Continuous values, split by squared error.
	Values(&'a [f32]),
}

impl<'a> Labels<'a> {
	fn len(&self) -> usize {
		match self {
			Labels::Classes { labels, .. } => labels.len(),
			Labels::Values(labels) => labels.len(),
		}
	}
}

/// To avoid code duplication, this shared `train` function is called by `Classifier::train` and `Regressor::train`.
pub fn train(
	features: ArrayView2<f32>,
	labels: Labels,
	options: &TrainOptions,
) -> Result<Tree, TreeError> {
	validate(features, labels, options)?;
	// Store each feature contiguously, because the split search reads one feature at a time.
	let columns: Vec<Vec<f32>> = features
		.axis_iter(Axis(1))
		.map(|column| column.to_vec())
		.collect();
	let mut builder = TreeBuilder {
		columns: &columns,
		labels,
		options,
		rng: Xoshiro256Plus::seed_from_u64(options.seed),
		nodes: Vec::new(),
	};
	builder.build((0..features.nrows()).collect(), 0);
	let tree = Tree {
		nodes: builder.nodes,
	};
	log::debug!(
		"trained a tree with {} nodes, {} leaves, and depth {}",
		tree.nodes.len(),
		tree.n_leaves(),
		tree.depth()
	);
	Ok(tree)
}

fn validate(features: ArrayView2<f32>, labels: Labels, options: &TrainOptions) -> Result<(), TreeError> {
	let check = |name: &'static str, value: usize, min: usize| {
		if value < min {
			Err(TreeError::InvalidOption { name, min, value })
		} else {
			Ok(())
		}
	};
	check("max_depth", options.max_depth, 1)?;
	check("min_examples_split", options.min_examples_split, 2)?;
	check("min_examples_leaf", options.min_examples_leaf, 1)?;
	if features.nrows() == 0 {
		return Err(TreeError::NoExamples);
	}
	if features.ncols() == 0 {
		return Err(TreeError::NoFeatures);
	}
	if labels.len() != features.nrows() {
		return Err(TreeError::LabelCountMismatch {
			n_examples: features.nrows(),
			n_labels: labels.len(),
		});
	}
	match labels {
		Labels::Classes { labels, n_classes } => {
			if let Some(label) = labels.iter().find(|label| **label >= n_classes) {
				return Err(TreeError::LabelOutOfRange {
					label: *label,
					n_classes,
				});
			}
		}
		Labels::Values(labels) => {
			for label in labels.iter() {
				Finite::new(*label)?;
			}
		}
	}
	Ok(())
}

struct TreeBuilder<'a> {
	columns: &'a [Vec<f32>],
	labels: Labels<'a>,
	options: &'a TrainOptions,
	rng: Xoshiro256Plus,
	nodes: Vec<Node>,
}

#[derive(Clone, Debug)]
struct SplitCandidate {
	feature_index: usize,
	split_value: f32,
	/// The impurity of the node times its number of examples, less the same quantity for both children.
	impurity_decrease: f64,
}

impl<'a> TreeBuilder<'a> {
	/// Add the subtree for the examples at `indexes`, returning the index of its root node. Nodes are numbered in depth first order with the left subtree first.
	fn build(&mut self, indexes: Vec<usize>, depth: usize) -> usize {
		let accumulator = Accumulator::from_indexes(self.labels, &indexes);
		let n_examples = indexes.len();
		let impurity = accumulator.impurity();
		let stats = NodeStats {
			n_examples,
			impurity: impurity.to_f32().unwrap_or(0.0),
			value: accumulator.value(),
		};
		let node_index = self.nodes.len();
		let is_leaf = depth >= self.options.max_depth
			|| n_examples < self.options.min_examples_split
			|| n_examples < 2 * self.options.min_examples_leaf
			|| impurity <= f64::EPSILON;
		let split = if is_leaf {
			None
		} else {
			self.choose_best_split(&indexes, &accumulator)
		};
		let split = match split {
			Some(split) => split,
			None => {
				self.nodes.push(Node::Leaf(LeafNode { stats }));
				return node_index;
			}
		};
		// Reserve this node's index so its children are numbered after it.
		self.nodes.push(Node::Leaf(LeafNode {
			stats: stats.clone(),
		}));
		let values = &self.columns[split.feature_index];
		let (left_indexes, right_indexes): (Vec<usize>, Vec<usize>) = indexes
			.iter()
			.partition(|index| values[**index] <= split.split_value);
		let left_child_index = self.build(left_indexes, depth + 1);
		let right_child_index = self.build(right_indexes, depth + 1);
		self.nodes[node_index] = Node::Branch(BranchNode {
			left_child_index,
			right_child_index,
			split: BranchSplitContinuous {
				feature_index: split.feature_index,
				split_value: split.split_value,
			},
			stats,
		});
		node_index
	}

	/// Features are searched in a shuffled order. When two splits decrease impurity equally, the one found first wins.
	fn choose_best_split(
		&mut self,
		indexes: &[usize],
		accumulator: &Accumulator,
	) -> Option<SplitCandidate> {
		let mut feature_order: Vec<usize> = (0..self.columns.len()).collect();
		feature_order.shuffle(&mut self.rng);
		let columns = self.columns;
		let labels = self.labels;
		let min_examples_leaf = self.options.min_examples_leaf;
		// Each feature is searched in parallel, but the results are reduced in feature order so the choice does not depend on scheduling.
		let candidates: Vec<Option<SplitCandidate>> = feature_order
			.par_iter()
			.map(|feature_index| {
				choose_best_split_for_feature(
					*feature_index,
					&columns[*feature_index],
					labels,
					indexes,
					accumulator,
					min_examples_leaf,
				)
			})
			.collect();
		candidates
			.into_iter()
			.flatten()
			.fold(None, |best: Option<SplitCandidate>, candidate| match best {
				Some(best) if best.impurity_decrease >= candidate.impurity_decrease => Some(best),
				_ => Some(candidate),
			})
	}
}

fn choose_best_split_for_feature(
	feature_index: usize,
	values: &[f32],
	labels: Labels,
	indexes: &[usize],
	parent: &Accumulator,
	min_examples_leaf: usize,
) -> Option<SplitCandidate> {
	// NaN values sort last, so they always end up in the right child.
	let mut sorted_indexes = indexes.to_owned();
	sorted_indexes.sort_by(|a, b| compare_nan_last(values[*a], values[*b]));
	let n_examples = sorted_indexes.len();
	let parent_impurity = parent.impurity() * n_examples.to_f64()?;
	let mut left = Accumulator::empty(labels);
	let mut right = parent.clone();
	let mut best: Option<SplitCandidate> = None;
	for position in 1..n_examples {
		let index = sorted_indexes[position - 1];
		left.add(labels, index);
		right.remove(labels, index);
		let previous = values[index];
		let next = values[sorted_indexes[position]];
		// It is only possible to split between two distinct values.
		if !(previous < next) {
			continue;
		}
		if position < min_examples_leaf || n_examples - position < min_examples_leaf {
			continue;
		}
		let children_impurity = left.impurity() * left.n_examples().to_f64()?
			+ right.impurity() * right.n_examples().to_f64()?;
		let impurity_decrease = (parent_impurity - children_impurity).max(0.0);
		if best
			.as_ref()
			.map(|best| impurity_decrease > best.impurity_decrease)
			.unwrap_or(true)
		{
			best = Some(SplitCandidate {
				feature_index,
				split_value: midpoint(previous, next),
				impurity_decrease,
			});
		}
	}
	best
}

fn compare_nan_last(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
		(false, true) => Ordering::Less,
		(true, false) => Ordering::Greater,
		(true, true) => Ordering::Equal,
	}
}

/// The threshold halfway between two adjacent values. If rounding makes it equal to `next`, `previous` is used instead so that `next` still goes right.
fn midpoint(previous: f32, next: f32) -> f32 {
	let midpoint = previous / 2.0 + next / 2.0;
	if midpoint >= next || !midpoint.is_finite() {
		previous
	} else {
		midpoint
	}
}

/// Sufficient statistics of the labels of a set of examples, which can be updated one example at a time as a split position moves.
#[derive(Clone, Debug)]
enum Accumulator {
	Classes {
		counts: Vec<usize>,
		n_examples: usize,
	},
	Values {
		sum: f64,
		sum_of_squares: f64,
		n_examples: usize,
	},
}

impl Accumulator {
	fn empty(labels: Labels) -> Accumulator {
		match labels {
			Labels::Classes { n_classes, .. } => Accumulator::Classes {
				counts: vec![0; n_classes],
				n_examples: 0,
			},
			Labels::Values(_) => Accumulator::Values {
				sum: 0.0,
				sum_of_squares: 0.0,
				n_examples: 0,
			},
		}
	}

	fn from_indexes(labels: Labels, indexes: &[usize]) -> Accumulator {
		let mut accumulator = Accumulator::empty(labels);
		for index in indexes {
			accumulator.add(labels, *index);
		}
		accumulator
	}

	fn add(&mut self, labels: Labels, index: usize) {
		match (self, labels) {
			(
				Accumulator::Classes { counts, n_examples },
				Labels::Classes { labels, .. },
			) => {
				counts[labels[index]] += 1;
				*n_examples += 1;
			}
			(
				Accumulator::Values {
					sum,
					sum_of_squares,
					n_examples,
				},
				Labels::Values(labels),
			) => {
				let value = f64::from(labels[index]);
				*sum += value;
				*sum_of_squares += value * value;
				*n_examples += 1;
			}
			_ => unreachable!(),
		}
	}

	fn remove(&mut self, labels: Labels, index: usize) {
		match (self, labels) {
			(
				Accumulator::Classes { counts, n_examples },
				Labels::Classes { labels, .. },
			) => {
				counts[labels[index]] -= 1;
				*n_examples -= 1;
			}
			(
				Accumulator::Values {
					sum,
					sum_of_squares,
					n_examples,
				},
				Labels::Values(labels),
			) => {
				let value = f64::from(labels[index]);
				*sum -= value;
				*sum_of_squares -= value * value;
				*n_examples -= 1;
			}
			_ => unreachable!(),
		}
	}

	fn n_examples(&self) -> usize {
		match self {
			Accumulator::Classes { n_examples, .. } => *n_examples,
			Accumulator::Values { n_examples, .. } => *n_examples,
		}
	}

	/// Gini impurity for classes and the variance of the labels for values. Both are zero for an empty set.
	fn impurity(&self) -> f64 {
		let n_examples = match self.n_examples().to_f64() {
			Some(n_examples) if n_examples > 0.0 => n_examples,
			_ => return 0.0,
		};
		match self {
			Accumulator::Classes { counts, .. } => {
				let sum_of_squared_proportions: f64 = counts
					.iter()
					.map(|count| {
						let proportion = *count as f64 / n_examples;
						proportion * proportion
					})
					.sum();
				1.0 - sum_of_squared_proportions
			}
			Accumulator::Values {
				sum,
				sum_of_squares,
				..
			} => {
				let mean = sum / n_examples;
				(sum_of_squares / n_examples - mean * mean).max(0.0)
			}
		}
	}

	fn value(&self) -> NodeValue {
		match self {
			Accumulator::Classes { counts, .. } => NodeValue::ClassCounts(counts.clone()),
			Accumulator::Values { sum, n_examples, .. } => {
				let mean = if *n_examples == 0 {
					0.0
				} else {
					sum / *n_examples as f64
				};
				NodeValue::Mean(mean as f32)
			}
		}
	}
}

#[test]
fn test_midpoint() {
	assert_eq!(midpoint(1.0, 2.0), 1.5);
	assert_eq!(midpoint(1.0, 1.0 + f32::EPSILON), 1.0);
}

#[test]
fn test_invalid_options() {
	let features = array![[1.0], [2.0]];
	let labels = Labels::Values(&[1.0, 2.0]);
	let options = TrainOptions {
		min_examples_split: 1,
		..Default::default()
	};
	assert_eq!(
		train(features.view(), labels, &options),
		Err(TreeError::InvalidOption {
			name: "min_examples_split",
			min: 2,
			value: 1,
		})
	);
	assert_eq!(
		train(
			features.view(),
			Labels::Values(&[1.0]),
			&TrainOptions::default()
		),
		Err(TreeError::LabelCountMismatch {
			n_examples: 2,
			n_labels: 1,
		})
	);
	assert!(train(
		features.view(),
		Labels::Values(&[1.0, f32::NAN]),
		&TrainOptions::default()
	)
	.is_err());
}

#[test]
fn test_min_examples_leaf() {
	let features = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
	let labels = [0, 1, 1, 1, 1];
	let options = TrainOptions {
		min_examples_leaf: 2,
		..Default::default()
	};
	let tree = train(
		features.view(),
		Labels::Classes {
			labels: &labels,
			n_classes: 2,
		},
		&options,
	)
	.unwrap();
	for node in tree.nodes.iter() {
		assert!(node.stats().n_examples >= 2);
	}
}
