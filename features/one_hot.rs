use fnv::FnvHashMap;
use ndarray::prelude::*;
use std::collections::BTreeSet;

/**
A `FittedOneHotEncoder` creates one feature for each category observed in training for each of its columns. For each example, all of a column's features are 0.0 except the one corresponding to the example's value, which is 1.0. Missing values and categories not seen in training encode as all zeros.

# Example

| value      | encoding  |
|------------|-----------|
| "blue"     | [1, 0, 0] |
| "green"    | [0, 1, 0] |
| "red"      | [0, 0, 1] |
| "purple"   | [0, 0, 0] |
| missing    | [0, 0, 0] |
*/
#[derive(Clone, Debug, PartialEq)]
pub struct FittedOneHotEncoder {
	/// The sorted categories of each column, in group column order.
	pub categories: Vec<Vec<String>>,
}

impl FittedOneHotEncoder {
	pub fn fit(columns: &[Vec<Option<String>>]) -> FittedOneHotEncoder {
		let categories = columns
			.iter()
			.map(|values| {
				values
					.iter()
					.filter_map(|value| value.as_deref())
					.collect::<BTreeSet<&str>>()
					.into_iter()
					.map(|value| value.to_owned())
					.collect()
			})
			.collect();
		FittedOneHotEncoder { categories }
	}

	pub fn n_features(&self) -> usize {
		self.categories.iter().map(|categories| categories.len()).sum()
	}

	/// Encode `columns` into a matrix with one row per example and `n_features()` columns.
	pub fn encode(&self, columns: &[Vec<Option<String>>], n_rows: usize) -> Array2<f32> {
		let mut features = Array2::zeros((n_rows, self.n_features()));
		let mut offset = 0;
		for (values, categories) in columns.iter().zip(self.categories.iter()) {
			let indexes: FnvHashMap<&str, usize> = categories
				.iter()
				.enumerate()
				.map(|(index, category)| (category.as_str(), index))
				.collect();
			for (row, value) in values.iter().enumerate() {
				if let Some(index) = value.as_deref().and_then(|value| indexes.get(value)) {
					features[(row, offset + index)] = 1.0;
				}
			}
			offset += categories.len();
		}
		features
	}

	/// `"{column}_{category}"` for each category of each column.
	pub fn feature_names(&self, column_names: &[String]) -> Vec<String> {
		column_names
			.iter()
			.zip(self.categories.iter())
			.flat_map(|(column_name, categories)| {
				categories
					.iter()
					.map(move |category| format!("{}_{}", column_name, category))
			})
			.collect()
	}
}

#[test]
fn test_one_hot_encode() {
	let train = vec![vec![
		Some("red".to_owned()),
		Some("blue".to_owned()),
		Some("red".to_owned()),
	]];
	let encoder = FittedOneHotEncoder::fit(&train);
	assert_eq!(
		encoder.categories,
		vec![vec!["blue".to_owned(), "red".to_owned()]]
	);
	let test = vec![vec![
		Some("red".to_owned()),
		Some("purple".to_owned()),
		None,
	]];
	let features = encoder.encode(&test, 3);
	assert_eq!(
		features,
		array![[0.0, 1.0], [0.0, 0.0], [0.0, 0.0]]
	);
	assert_eq!(
		encoder.feature_names(&["color".to_owned()]),
		vec!["color_blue".to_owned(), "color_red".to_owned()]
	);
}
