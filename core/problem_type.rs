use sapling_dataframe::ColumnView;
use sapling_util::finite::distinct_values;

/// A number target with more distinct values than this is treated as continuous.
pub const MAX_CLASSIFICATION_UNIQUE_VALUES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
	Classification,
	Regression,
}

impl std::fmt::Display for ProblemType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ProblemType::Classification => write!(f, "classification"),
			ProblemType::Regression => write!(f, "regression"),
		}
	}
}

/// A number column with more than `MAX_CLASSIFICATION_UNIQUE_VALUES` distinct values is a regression target. Any other column, including a number column with few distinct values, is a classification target.
pub fn determine_problem_type(target: &ColumnView) -> ProblemType {
	match target.as_number() {
		Some(column) if distinct_values(column.data).len() > MAX_CLASSIFICATION_UNIQUE_VALUES => {
			ProblemType::Regression
		}
		_ => ProblemType::Classification,
	}
}

#[cfg(test)]
fn number_column(data: &[f32]) -> ColumnView {
	ColumnView::Number(sapling_dataframe::NumberColumnView { name: "y", data })
}

#[test]
fn test_few_numbers_is_classification() {
	let data = [1.0, 2.0, 1.0, 2.0, 1.0];
	assert_eq!(
		determine_problem_type(&number_column(&data)),
		ProblemType::Classification
	);
}

#[test]
fn test_many_numbers_is_regression() {
	let data: Vec<f32> = (0..12).map(|i| i as f32 * 0.5 + 0.1).collect();
	assert_eq!(
		determine_problem_type(&number_column(&data)),
		ProblemType::Regression
	);
}

#[test]
fn test_threshold() {
	// Missing values do not count as distinct values.
	let mut data: Vec<f32> = (0..10).map(|i| i as f32).collect();
	data.push(f32::NAN);
	assert_eq!(
		determine_problem_type(&number_column(&data)),
		ProblemType::Classification
	);
	data.push(10.0);
	assert_eq!(
		determine_problem_type(&number_column(&data)),
		ProblemType::Regression
	);
}

#[test]
fn test_text_is_classification() {
	let data = vec![Some("a".to_owned()), Some("b".to_owned()), Some("a".to_owned())];
	let column = ColumnView::Text(sapling_dataframe::TextColumnView {
		name: "y",
		data: &data,
	});
	assert_eq!(
		determine_problem_type(&column),
		ProblemType::Classification
	);
}
