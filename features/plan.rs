use crate::{FeaturesError, FittedImputer, FittedOneHotEncoder, ImputeStrategy};
use ndarray::prelude::*;
use sapling_dataframe::{ColumnView, DataFrameView};

/// Numeric columns are always transformed first and categorical columns second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
	Numeric,
	Categorical,
}

impl GroupKind {
	pub fn name(self) -> &'static str {
		match self {
			GroupKind::Numeric => "num",
			GroupKind::Categorical => "cat",
		}
	}
}

impl std::fmt::Display for GroupKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
	Impute(ImputeStrategy),
	/// One hot encoding ignores unknown categories: they encode as all zeros.
	OneHotEncode,
}

impl std::fmt::Display for Step {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Step::Impute(ImputeStrategy::Median) => write!(f, "median imputation"),
			Step::Impute(ImputeStrategy::MostFrequent) => write!(f, "most frequent imputation"),
			Step::OneHotEncode => write!(f, "one hot encoding"),
		}
	}
}

/// A group with no steps passes its columns through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformerGroup {
	pub kind: GroupKind,
	pub columns: Vec<String>,
	pub steps: Vec<Step>,
}

/**
A `TransformationPlan` describes how the selected columns of a dataframe become features. It always has two groups, numeric then categorical, and every selected column appears in exactly one of them.

| group | columns                   | steps                                                 |
|-------|---------------------------|-------------------------------------------------------|
| num   | the numeric columns       | median imputation if any value is missing             |
| cat   | the categorical columns   | most frequent imputation if any value is missing, then one hot encoding |
*/
#[derive(Clone, Debug, PartialEq)]
pub struct TransformationPlan {
	pub groups: Vec<TransformerGroup>,
}

/// Build the plan for `numeric_columns` and `categorical_columns`. Whether a group imputes is decided by whether any of its cells in `dataframe` is missing.
pub fn create_preprocessor(
	numeric_columns: &[String],
	categorical_columns: &[String],
	dataframe: &DataFrameView,
) -> Result<TransformationPlan, FeaturesError> {
	let numeric = find_columns(numeric_columns, dataframe)?;
	for column in numeric.iter() {
		if column.as_number().is_none() {
			return Err(FeaturesError::NotANumberColumn {
				column: column.name().to_owned(),
				kind: column.kind(),
			});
		}
	}
	let categorical = find_columns(categorical_columns, dataframe)?;

	let mut numeric_steps = Vec::new();
	if has_missing(&numeric) {
		numeric_steps.push(Step::Impute(ImputeStrategy::Median));
	}
	let mut categorical_steps = Vec::new();
	if !categorical.is_empty() {
		if has_missing(&categorical) {
			categorical_steps.push(Step::Impute(ImputeStrategy::MostFrequent));
		}
		categorical_steps.push(Step::OneHotEncode);
	}
	Ok(TransformationPlan {
		groups: vec![
			TransformerGroup {
				kind: GroupKind::Numeric,
				columns: numeric_columns.to_owned(),
				steps: numeric_steps,
			},
			TransformerGroup {
				kind: GroupKind::Categorical,
				columns: categorical_columns.to_owned(),
				steps: categorical_steps,
			},
		],
	})
}

fn has_missing(columns: &[&ColumnView]) -> bool {
	columns.iter().any(|column| column.missing_count() > 0)
}

fn find_columns<'a, 'b>(
	column_names: &[String],
	dataframe: &'b DataFrameView<'a>,
) -> Result<Vec<&'b ColumnView<'a>>, FeaturesError> {
	column_names
		.iter()
		.map(|name| {
			dataframe
				.column(name)
				.ok_or_else(|| FeaturesError::ColumnNotFound(name.clone()))
		})
		.collect()
}

/// The values of a group as they flow through its steps.
enum GroupValues {
	Numbers(Vec<Vec<f32>>),
	Categories(Vec<Vec<Option<String>>>),
	Encoded(Array2<f32>),
}

impl GroupValues {
	fn gather(
		kind: GroupKind,
		column_names: &[String],
		dataframe: &DataFrameView,
	) -> Result<GroupValues, FeaturesError> {
		let columns = find_columns(column_names, dataframe)?;
		match kind {
			GroupKind::Numeric => {
				let values = columns
					.iter()
					.map(|column| match column.as_number() {
						Some(column) => Ok(column.data.to_vec()),
						None => Err(FeaturesError::NotANumberColumn {
							column: column.name().to_owned(),
							kind: column.kind(),
						}),
					})
					.collect::<Result<_, _>>()?;
				Ok(GroupValues::Numbers(values))
			}
			// Number columns in the categorical group are encoded by their display string.
			GroupKind::Categorical => Ok(GroupValues::Categories(
				columns
					.iter()
					.map(|column| {
						(0..column.len())
							.map(|index| column.display_value(index))
							.collect()
					})
					.collect(),
			)),
		}
	}

	fn into_features(self, kind: GroupKind, n_rows: usize) -> Result<Array2<f32>, FeaturesError> {
		match self {
			GroupValues::Numbers(columns) => Ok(Array2::from_shape_fn(
				(n_rows, columns.len()),
				|(row, column)| columns[column][row],
			)),
			GroupValues::Categories(columns) if columns.is_empty() => Ok(Array2::zeros((n_rows, 0))),
			GroupValues::Categories(_) => Err(FeaturesError::NotEncoded(kind)),
			GroupValues::Encoded(features) => Ok(features),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum FittedStep {
	Impute(FittedImputer),
	OneHotEncode(FittedOneHotEncoder),
}

impl FittedStep {
	fn fit(step: Step, values: &GroupValues, group: GroupKind) -> Result<FittedStep, FeaturesError> {
		match (step, values) {
			(Step::Impute(ImputeStrategy::Median), GroupValues::Numbers(columns)) => {
				Ok(FittedStep::Impute(FittedImputer::fit_median(columns)))
			}
			(Step::Impute(ImputeStrategy::MostFrequent), GroupValues::Categories(columns)) => {
				Ok(FittedStep::Impute(FittedImputer::fit_most_frequent(columns)))
			}
			(Step::OneHotEncode, GroupValues::Categories(columns)) => {
				Ok(FittedStep::OneHotEncode(FittedOneHotEncoder::fit(columns)))
			}
			_ => Err(FeaturesError::UnsupportedStep { step, group }),
		}
	}

	fn step(&self) -> Step {
		match self {
			FittedStep::Impute(FittedImputer::Median { .. }) => {
				Step::Impute(ImputeStrategy::Median)
			}
			FittedStep::Impute(FittedImputer::MostFrequent { .. }) => {
				Step::Impute(ImputeStrategy::MostFrequent)
			}
			FittedStep::OneHotEncode(_) => Step::OneHotEncode,
		}
	}

	fn apply(
		&self,
		values: GroupValues,
		group: GroupKind,
		n_rows: usize,
	) -> Result<GroupValues, FeaturesError> {
		match (self, values) {
			(FittedStep::Impute(FittedImputer::Median { fill_values }), GroupValues::Numbers(mut columns)) => {
				FittedImputer::impute_numbers(fill_values, &mut columns);
				Ok(GroupValues::Numbers(columns))
			}
			(
				FittedStep::Impute(FittedImputer::MostFrequent { fill_values }),
				GroupValues::Categories(mut columns),
			) => {
				FittedImputer::impute_categories(fill_values, &mut columns);
				Ok(GroupValues::Categories(columns))
			}
			(FittedStep::OneHotEncode(encoder), GroupValues::Categories(columns)) => {
				Ok(GroupValues::Encoded(encoder.encode(&columns, n_rows)))
			}
			_ => Err(FeaturesError::UnsupportedStep {
				step: self.step(),
				group,
			}),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FittedGroup {
	pub kind: GroupKind,
	pub columns: Vec<String>,
	pub steps: Vec<FittedStep>,
}

/// A `FittedPlan` holds everything learned from the training data, so it can transform training and test data identically.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedPlan {
	pub groups: Vec<FittedGroup>,
}

impl TransformationPlan {
	pub fn fit(&self, dataframe: &DataFrameView) -> Result<FittedPlan, FeaturesError> {
		let groups = self
			.groups
			.iter()
			.map(|group| group.fit(dataframe))
			.collect::<Result<_, _>>()?;
		Ok(FittedPlan { groups })
	}
}

impl TransformerGroup {
	/// Steps are fit in order, each on the output of the previous one.
	fn fit(&self, dataframe: &DataFrameView) -> Result<FittedGroup, FeaturesError> {
		let n_rows = dataframe.nrows();
		let mut values = GroupValues::gather(self.kind, &self.columns, dataframe)?;
		let mut steps = Vec::with_capacity(self.steps.len());
		for step in self.steps.iter() {
			let fitted_step = FittedStep::fit(*step, &values, self.kind)?;
			values = fitted_step.apply(values, self.kind, n_rows)?;
			steps.push(fitted_step);
		}
		if let GroupValues::Categories(columns) = &values {
			if !columns.is_empty() {
				return Err(FeaturesError::NotEncoded(self.kind));
			}
		}
		Ok(FittedGroup {
			kind: self.kind,
			columns: self.columns.clone(),
			steps,
		})
	}
}

impl FittedGroup {
	pub fn n_features(&self) -> usize {
		self.steps
			.iter()
			.fold(self.columns.len(), |n_features, step| match step {
				FittedStep::Impute(_) => n_features,
				FittedStep::OneHotEncode(encoder) => encoder.n_features(),
			})
	}

	pub fn transform(&self, dataframe: &DataFrameView) -> Result<Array2<f32>, FeaturesError> {
		let n_rows = dataframe.nrows();
		let mut values = GroupValues::gather(self.kind, &self.columns, dataframe)?;
		for step in self.steps.iter() {
			values = step.apply(values, self.kind, n_rows)?;
		}
		values.into_features(self.kind, n_rows)
	}
}

impl FittedPlan {
	pub fn n_features(&self) -> usize {
		self.groups.iter().map(|group| group.n_features()).sum()
	}

	/// Compute the feature matrix for `dataframe`, with one row per example and the features of each group side by side in plan order.
	pub fn transform(&self, dataframe: &DataFrameView) -> Result<Array2<f32>, FeaturesError> {
		let mut features = Array2::zeros((dataframe.nrows(), self.n_features()));
		let mut offset = 0;
		for group in self.groups.iter() {
			let group_features = group.transform(dataframe)?;
			let n_features = group_features.ncols();
			features
				.slice_mut(s![.., offset..offset + n_features])
				.assign(&group_features);
			offset += n_features;
		}
		Ok(features)
	}
}

#[cfg(test)]
fn names(names: &[&str]) -> Vec<String> {
	names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_numeric_passthrough() {
	let dataframe = crate::test_dataframe();
	let view = dataframe.view();
	let plan = create_preprocessor(&names(&["age"]), &[], &view).unwrap();
	assert_eq!(
		plan,
		TransformationPlan {
			groups: vec![
				TransformerGroup {
					kind: GroupKind::Numeric,
					columns: names(&["age"]),
					steps: vec![],
				},
				TransformerGroup {
					kind: GroupKind::Categorical,
					columns: vec![],
					steps: vec![],
				},
			],
		}
	);
	let features = plan.fit(&view).unwrap().transform(&view).unwrap();
	assert_eq!(features, array![[31.0], [45.0], [27.0], [52.0]]);
}

#[test]
fn test_numeric_missing_is_imputed() {
	let dataframe = crate::test_dataframe();
	let view = dataframe.view();
	let plan = create_preprocessor(&names(&["age", "income"]), &[], &view).unwrap();
	assert_eq!(
		plan.groups[0].steps,
		vec![Step::Impute(ImputeStrategy::Median)]
	);
	let fitted = plan.fit(&view).unwrap();
	let features = fitted.transform(&view).unwrap();
	assert!(features.iter().all(|value| !value.is_nan()));
	assert_eq!(features[(1, 1)], 250.0);
}

#[test]
fn test_categorical_steps() {
	let dataframe = crate::test_dataframe();
	let view = dataframe.view();
	let plan = create_preprocessor(&[], &names(&["color", "note"]), &view).unwrap();
	assert_eq!(
		plan.groups[1].steps,
		vec![Step::Impute(ImputeStrategy::MostFrequent), Step::OneHotEncode]
	);
	let plan = create_preprocessor(&[], &names(&["note"]), &view).unwrap();
	assert_eq!(plan.groups[1].steps, vec![Step::OneHotEncode]);
	let fitted = create_preprocessor(&[], &names(&["color"]), &view)
		.unwrap()
		.fit(&view)
		.unwrap();
	// The missing color is imputed as "red", the most frequent color.
	let features = fitted.transform(&view).unwrap();
	assert_eq!(
		features,
		array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]]
	);
}

#[test]
fn test_number_column_as_category() {
	let dataframe = crate::dataframe_from_csv("rooms\n1\n2\n1\n");
	let view = dataframe.view();
	let fitted = create_preprocessor(&[], &names(&["rooms"]), &view)
		.unwrap()
		.fit(&view)
		.unwrap();
	assert_eq!(
		fitted.groups[1].steps,
		vec![FittedStep::OneHotEncode(FittedOneHotEncoder {
			categories: vec![names(&["1", "2"])]
		})]
	);
}

#[test]
fn test_unseen_category() {
	let train = crate::dataframe_from_csv("color\nred\nblue\n");
	let test = crate::dataframe_from_csv("color\ngreen\n");
	let fitted = create_preprocessor(&[], &names(&["color"]), &train.view())
		.unwrap()
		.fit(&train.view())
		.unwrap();
	let features = fitted.transform(&test.view()).unwrap();
	assert_eq!(features, array![[0.0, 0.0]]);
}

#[test]
fn test_invalid_columns() {
	let dataframe = crate::test_dataframe();
	let view = dataframe.view();
	assert_eq!(
		create_preprocessor(&names(&["missing"]), &[], &view),
		Err(FeaturesError::ColumnNotFound("missing".to_owned()))
	);
	assert_eq!(
		create_preprocessor(&names(&["note"]), &[], &view),
		Err(FeaturesError::NotANumberColumn {
			column: "note".to_owned(),
			kind: sapling_dataframe::ColumnKind::Text,
		})
	);
}
