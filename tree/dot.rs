use crate::{classifier::argmax, Node, NodeStats, NodeValue, Tree};
use std::fmt::Write;

/// Options for rendering a tree with `Tree::to_dot`.
#[derive(Clone, Debug)]
pub struct DotOptions<'a> {
	/// The names of the features, by feature index. Without names, features are labeled `X[i]`.
	pub feature_names: Option<&'a [String]>,
	/// The names of the classes of a classification tree. Without names, classes are labeled `y[i]`.
	pub class_names: Option<&'a [String]>,
	/// The number of digits after the decimal point for thresholds and impurities.
	pub precision: usize,
}

impl<'a> Default for DotOptions<'a> {
	fn default() -> Self {
		Self {
			feature_names: None,
			class_names: None,
			precision: 3,
		}
	}
}

impl Tree {
	/**
	Render the tree in the [Graphviz DOT language](https://graphviz.org/doc/info/lang.html). Nodes are drawn as filled, rounded boxes. A classification node is colored by its majority class, more intensely the purer it is. A regression node is colored more intensely the larger its value.

	```text
	digraph Tree {
	node [shape=box, style="filled, rounded", color="black", fontname="helvetica"] ;
	edge [fontname="helvetica"] ;
	0 [label="x <= 6.5\ngini = 0.5\nsamples = 4\nvalue = [2, 2]\nclass = no", fillcolor="#ffffff"] ;
	...
	}
	```
	*/
	pub fn to_dot(&self, options: &DotOptions) -> String {
		let palette = Palette::new(self);
		let mut dot = String::new();
		dot.push_str("digraph Tree {\n");
		dot.push_str(
			"node [shape=box, style=\"filled, rounded\", color=\"black\", fontname=\"helvetica\"] ;\n",
		);
		dot.push_str("edge [fontname=\"helvetica\"] ;\n");
		if !self.nodes.is_empty() {
			self.write_dot_node(&mut dot, options, &palette, 0, None);
		}
		dot.push_str("}\n");
		dot
	}

	fn write_dot_node(
		&self,
		dot: &mut String,
		options: &DotOptions,
		palette: &Palette,
		node_index: usize,
		parent: Option<(usize, bool)>,
	) {
		let node = &self.nodes[node_index];
		let mut lines = Vec::new();
		if let Node::Branch(branch) = node {
			let feature_index = branch.split.feature_index;
			let feature_name = options
				.feature_names
				.and_then(|names| names.get(feature_index))
				.cloned()
				.unwrap_or_else(|| format!("X[{}]", feature_index));
			lines.push(format!(
				"{} <= {}",
				feature_name,
				format_number(branch.split.split_value, options.precision)
			));
		}
		let stats = node.stats();
		lines.extend(stats_lines(stats, options));
		let label = escape(&lines.join("\n")).replace('\n', "\\n");
		writeln!(
			dot,
			"{} [label=\"{}\", fillcolor=\"{}\"] ;",
			node_index,
			label,
			palette.color(stats)
		)
		.ok();
		if let Some((parent_index, is_left)) = parent {
			if parent_index == 0 {
				let (angle, head_label) = if is_left { (45, "True") } else { (-45, "False") };
				writeln!(
					dot,
					"{} -> {} [labeldistance=2.5, labelangle={}, headlabel=\"{}\"] ;",
					parent_index, node_index, angle, head_label
				)
				.ok();
			} else {
				writeln!(dot, "{} -> {} ;", parent_index, node_index).ok();
			}
		}
		if let Node::Branch(branch) = node {
			self.write_dot_node(
				dot,
				options,
				palette,
				branch.left_child_index,
				Some((node_index, true)),
			);
			self.write_dot_node(
				dot,
				options,
				palette,
				branch.right_child_index,
				Some((node_index, false)),
			);
		}
	}
}

fn stats_lines(stats: &NodeStats, options: &DotOptions) -> Vec<String> {
	match &stats.value {
		NodeValue::ClassCounts(counts) => {
			let class_index = argmax(counts);
			let class_name = options
				.class_names
				.and_then(|names| names.get(class_index))
				.cloned()
				.unwrap_or_else(|| format!("y[{}]", class_index));
			let counts: Vec<String> = counts.iter().map(|count| count.to_string()).collect();
			vec![
				format!("gini = {}", format_number(stats.impurity, options.precision)),
				format!("samples = {}", stats.n_examples),
				format!("value = [{}]", counts.join(", ")),
				format!("class = {}", class_name),
			]
		}
		NodeValue::Mean(mean) => vec![
			format!(
				"squared_error = {}",
				format_number(stats.impurity, options.precision)
			),
			format!("samples = {}", stats.n_examples),
			format!("value = {}", format_number(*mean, options.precision)),
		],
	}
}

/// Round to `precision` digits, then drop trailing zeros while keeping at least one digit after the decimal point, so 0.5 is `0.5` and 6 is `6.0`.
fn format_number(value: f32, precision: usize) -> String {
	let formatted = format!("{:.*}", precision, value);
	if !formatted.contains('.') {
		return format!("{}.0", formatted);
	}
	let trimmed = formatted.trim_end_matches('0');
	if trimmed.ends_with('.') {
		format!("{}0", trimmed)
	} else {
		trimmed.to_owned()
	}
}

fn escape(label: &str) -> String {
	label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Chooses node fill colors the way scikit-learn's `export_graphviz` does.
struct Palette {
	colors: Vec<(u8, u8, u8)>,
	/// The smallest and largest node values of a regression tree.
	bounds: Option<(f32, f32)>,
}

impl Palette {
	fn new(tree: &Tree) -> Palette {
		let n_classes = tree
			.nodes
			.first()
			.map(|node| match &node.stats().value {
				NodeValue::ClassCounts(counts) => counts.len(),
				NodeValue::Mean(_) => 0,
			})
			.unwrap_or(0);
		if n_classes > 0 {
			return Palette {
				colors: color_brew(n_classes),
				bounds: None,
			};
		}
		let means = tree.nodes.iter().filter_map(|node| match node.stats().value {
			NodeValue::Mean(mean) => Some(mean),
			NodeValue::ClassCounts(_) => None,
		});
		let bounds = means.fold(None, |bounds: Option<(f32, f32)>, mean| match bounds {
			Some((min, max)) => Some((min.min(mean), max.max(mean))),
			None => Some((mean, mean)),
		});
		Palette {
			colors: color_brew(2),
			bounds,
		}
	}

	fn color(&self, stats: &NodeStats) -> String {
		let (color, alpha) = match (&stats.value, self.bounds) {
			(NodeValue::ClassCounts(counts), _) => {
				let class_index = argmax(counts);
				let total = counts.iter().sum::<usize>().max(1) as f32;
				let mut proportions: Vec<f32> =
					counts.iter().map(|count| *count as f32 / total).collect();
				proportions.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
				let alpha = match proportions.as_slice() {
					[first, second, ..] if *second < 1.0 => (first - second) / (1.0 - second),
					_ => 0.0,
				};
				(self.colors[class_index % self.colors.len()], alpha)
			}
			(NodeValue::Mean(mean), Some((min, max))) if max > min => {
				(self.colors[0], (mean - min) / (max - min))
			}
			(NodeValue::Mean(_), _) => (self.colors[0], 0.0),
		};
		let blend = |channel: u8| -> u8 {
			(alpha * f32::from(channel) + (1.0 - alpha) * 255.0).round() as u8
		};
		format!(
			"#{:02x}{:02x}{:02x}",
			blend(color.0),
			blend(color.1),
			blend(color.2)
		)
	}
}

/// Generate `n` colors with evenly spaced hues.
fn color_brew(n: usize) -> Vec<(u8, u8, u8)> {
	let (saturation, value) = (0.75, 0.9);
	let chroma = saturation * value;
	let m = value - chroma;
	let step = 360.0 / n as f64;
	(0..n)
		.map(|i| {
			let hue = (25.0 + step * i as f64) as i64;
			let hue_bar = hue as f64 / 60.0;
			let x = chroma * (1.0 - ((hue_bar % 2.0) - 1.0).abs());
			let (r, g, b) = match hue_bar as i64 {
				0 => (chroma, x, 0.0),
				1 => (x, chroma, 0.0),
				2 => (0.0, chroma, x),
				3 => (0.0, x, chroma),
				4 => (x, 0.0, chroma),
				5 => (chroma, 0.0, x),
				_ => (chroma, x, 0.0),
			};
			let channel = |c: f64| (255.0 * (c + m)) as u8;
			(channel(r), channel(g), channel(b))
		})
		.collect()
}

#[cfg(test)]
fn test_tree() -> Tree {
	use crate::{BranchNode, BranchSplitContinuous, LeafNode};
	Tree {
		nodes: vec![
			Node::Branch(BranchNode {
				left_child_index: 1,
				right_child_index: 2,
				split: BranchSplitContinuous {
					feature_index: 0,
					split_value: 6.5,
				},
				stats: NodeStats {
					n_examples: 4,
					impurity: 0.5,
					value: NodeValue::ClassCounts(vec![2, 2]),
				},
			}),
			Node::Leaf(LeafNode {
				stats: NodeStats {
					n_examples: 2,
					impurity: 0.0,
					value: NodeValue::ClassCounts(vec![2, 0]),
				},
			}),
			Node::Leaf(LeafNode {
				stats: NodeStats {
					n_examples: 2,
					impurity: 0.0,
					value: NodeValue::ClassCounts(vec![0, 2]),
				},
			}),
		],
	}
}

#[test]
fn test_to_dot() {
	let feature_names = vec!["x".to_owned()];
	let class_names = vec!["no".to_owned(), "yes".to_owned()];
	let dot = test_tree().to_dot(&DotOptions {
		feature_names: Some(&feature_names),
		class_names: Some(&class_names),
		..Default::default()
	});
	insta::assert_snapshot!(dot, @r###"
 digraph Tree {
 node [shape=box, style="filled, rounded", color="black", fontname="helvetica"] ;
 edge [fontname="helvetica"] ;
 0 [label="x <= 6.5\ngini = 0.5\nsamples = 4\nvalue = [2, 2]\nclass = no", fillcolor="#ffffff"] ;
 1 [label="gini = 0.0\nsamples = 2\nvalue = [2, 0]\nclass = no", fillcolor="#e58139"] ;
 0 -> 1 [labeldistance=2.5, labelangle=45, headlabel="True"] ;
 2 [label="gini = 0.0\nsamples = 2\nvalue = [0, 2]\nclass = yes", fillcolor="#399de5"] ;
 0 -> 2 [labeldistance=2.5, labelangle=-45, headlabel="False"] ;
 }
 "###);
}

#[test]
fn test_to_dot_without_names() {
	let dot = test_tree().to_dot(&DotOptions::default());
	assert!(dot.contains("label=\"X[0] <= 6.5\\ngini = 0.5"));
	assert!(dot.contains("class = y[1]"));
}

#[test]
fn test_format_number() {
	assert_eq!(format_number(0.5, 3), "0.5");
	assert_eq!(format_number(6.0, 3), "6.0");
	assert_eq!(format_number(2.0 / 3.0, 3), "0.667");
	assert_eq!(format_number(12.0, 0), "12.0");
}

#[test]
fn test_color_brew() {
	assert_eq!(color_brew(2), vec![(229, 129, 57), (57, 157, 229)]);
}
