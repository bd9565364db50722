use crate::ProblemType;
use anyhow::{format_err, Result};
use ndarray::prelude::*;
use sapling_dataframe::ColumnView;
use sapling_tree::{Classifier, Regressor, Tree, TreeError};
use sapling_util::finite::{distinct_values, Finite};
use std::collections::BTreeSet;

/// The target column encoded for training.
#[derive(Clone, Debug, PartialEq)]
pub enum Labels {
	/// `labels` are indexes into `classes`, which are the distinct target values in sorted order.
	Classes {
		classes: Vec<String>,
		labels: Vec<usize>,
	},
	Values(Vec<f32>),
}

impl Labels {
	/// Encode `column`, which must not have missing values. Classes are collected from the whole column, so a class that only appears in the test rows still has an index.
	pub fn from_column(column: &ColumnView, problem_type: ProblemType) -> Result<Labels> {
		let labels = match problem_type {
			ProblemType::Regression => {
				let column = column.as_number().ok_or_else(|| {
					format_err!(
						"the target column \"{}\" must be a number column for regression",
						column.name()
					)
				})?;
				Labels::Values(column.data.to_vec())
			}
			ProblemType::Classification => match column.as_number() {
				// Number classes are sorted numerically rather than by their names, so "2" comes before "10".
				Some(number_column) => {
					let classes: Vec<Finite> = distinct_values(number_column.data).into_iter().collect();
					let labels = number_column
						.data
						.iter()
						.map(|value| {
							let value = Finite::new(*value)?;
							classes
								.binary_search(&value)
								.map_err(|_| format_err!("{} is not a class", value))
						})
						.collect::<Result<_>>()?;
					Labels::Classes {
						classes: classes.iter().map(|class| class.to_string()).collect(),
						labels,
					}
				}
				None => {
					let values = (0..column.len())
						.map(|index| {
							column.display_value(index).ok_or_else(|| {
								format_err!("the target column \"{}\" has a missing value", column.name())
							})
						})
						.collect::<Result<Vec<String>>>()?;
					let classes: Vec<String> = values
						.iter()
						.cloned()
						.collect::<BTreeSet<String>>()
						.into_iter()
						.collect();
					let labels = values
						.iter()
						.map(|value| {
							classes
								.binary_search(value)
								.map_err(|_| format_err!("{} is not a class", value))
						})
						.collect::<Result<_>>()?;
					Labels::Classes { classes, labels }
				}
			},
		};
		if let Labels::Classes { classes, .. } = &labels {
			if classes.len() < 2 {
				return Err(format_err!(
					"the target column \"{}\" must have at least two classes, but it has {}",
					column.name(),
					classes.len()
				));
			}
		}
		Ok(labels)
	}

	pub fn len(&self) -> usize {
		match self {
			Labels::Classes { labels, .. } => labels.len(),
			Labels::Values(values) => values.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Split into the labels before `index` and the labels from `index` on. Both halves keep every class.
	pub fn split_at(&self, index: usize) -> (Labels, Labels) {
		match self {
			Labels::Classes { classes, labels } => {
				let (a, b) = labels.split_at(index);
				(
					Labels::Classes {
						classes: classes.clone(),
						labels: a.to_vec(),
					},
					Labels::Classes {
						classes: classes.clone(),
						labels: b.to_vec(),
					},
				)
			}
			Labels::Values(values) => {
				let (a, b) = values.split_at(index);
				(Labels::Values(a.to_vec()), Labels::Values(b.to_vec()))
			}
		}
	}
}

/// A trained decision tree of the kind the labels call for.
#[derive(Clone, Debug, PartialEq)]
pub enum Model {
	Classifier(Classifier),
	Regressor(Regressor),
}

impl Model {
	pub fn train(
		features: ArrayView2<f32>,
		labels: &Labels,
		options: &sapling_tree::TrainOptions,
	) -> Result<Model, TreeError> {
		match labels {
			Labels::Classes { classes, labels } => Ok(Model::Classifier(Classifier::train(
				features,
				labels,
				classes.clone(),
				options,
			)?)),
			Labels::Values(values) => Ok(Model::Regressor(Regressor::train(
				features, values, options,
			)?)),
		}
	}

	pub fn problem_type(&self) -> ProblemType {
		match self {
			Model::Classifier(_) => ProblemType::Classification,
			Model::Regressor(_) => ProblemType::Regression,
		}
	}

	pub fn tree(&self) -> &Tree {
		match self {
			Model::Classifier(model) => &model.tree,
			Model::Regressor(model) => &model.tree,
		}
	}

	pub fn feature_importances(&self) -> &[f32] {
		match self {
			Model::Classifier(model) => &model.feature_importances,
			Model::Regressor(model) => &model.feature_importances,
		}
	}

	pub fn to_dot(&self, feature_names: &[String]) -> String {
		match self {
			Model::Classifier(model) => model.to_dot(feature_names),
			Model::Regressor(model) => model.to_dot(feature_names),
		}
	}
}

#[test]
fn test_number_classes_sort_numerically() {
	let data = [10.0, 2.0, 10.0, 1.5];
	let column = ColumnView::Number(sapling_dataframe::NumberColumnView { name: "y", data: &data });
	let labels = Labels::from_column(&column, ProblemType::Classification).unwrap();
	assert_eq!(
		labels,
		Labels::Classes {
			classes: vec!["1.5".to_owned(), "2".to_owned(), "10".to_owned()],
			labels: vec![2, 1, 2, 0],
		}
	);
	let (train, test) = labels.split_at(3);
	assert_eq!(train.len(), 3);
	assert_eq!(
		test,
		Labels::Classes {
			classes: vec!["1.5".to_owned(), "2".to_owned(), "10".to_owned()],
			labels: vec![0],
		}
	);
}

#[test]
fn test_text_classes() {
	let data = vec![Some("yes".to_owned()), Some("no".to_owned()), Some("yes".to_owned())];
	let column = ColumnView::Text(sapling_dataframe::TextColumnView { name: "y", data: &data });
	let labels = Labels::from_column(&column, ProblemType::Classification).unwrap();
	assert_eq!(
		labels,
		Labels::Classes {
			classes: vec!["no".to_owned(), "yes".to_owned()],
			labels: vec![1, 0, 1],
		}
	);
}

#[test]
fn test_single_class() {
	let data = vec![Some("yes".to_owned()), Some("yes".to_owned())];
	let column = ColumnView::Text(sapling_dataframe::TextColumnView { name: "y", data: &data });
	assert!(Labels::from_column(&column, ProblemType::Classification).is_err());
}
