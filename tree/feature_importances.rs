use crate::{Node, Tree};
use num_traits::ToPrimitive;

/// This function computes feature importances using the "impurity decrease" method, where a feature's importance is the total decrease in impurity, weighted by the number of examples, of all the branches that split on it. The importances are normalized to sum to 1, unless the tree has no branches, in which case they are all 0.
pub fn compute_feature_importances(tree: &Tree, n_features: usize) -> Vec<f32> {
	let mut feature_importances = vec![0.0f64; n_features];
	for node in tree.nodes.iter() {
		if let Node::Branch(branch) = node {
			let weighted_impurity = |node: &Node| {
				let stats = node.stats();
				f64::from(stats.impurity) * stats.n_examples.to_f64().unwrap_or(0.0)
			};
			let decrease = weighted_impurity(node)
				- weighted_impurity(&tree.nodes[branch.left_child_index])
				- weighted_impurity(&tree.nodes[branch.right_child_index]);
			feature_importances[branch.split.feature_index] += decrease.max(0.0);
		}
	}
	let total: f64 = feature_importances.iter().sum();
	feature_importances
		.into_iter()
		.map(|feature_importance| {
			if total > 0.0 {
				(feature_importance / total) as f32
			} else {
				0.0
			}
		})
		.collect()
}
