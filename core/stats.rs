use crate::{config::Config, determine_problem_type, train::load_dataframe, ProblemType};
use anyhow::{format_err, Result};
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use sapling_dataframe::{ColumnKind, ColumnView, DataFrame, NumberColumnView};
use sapling_features::{detect_column_types, ColumnRoles};
use sapling_metrics::{quantile, MeanVariance, Metric, Mode};
use std::{collections::BTreeSet, path::Path};

/// The number of rows shown in the preview.
pub const PREVIEW_N_ROWS: usize = 5;

/// Everything `sapling explore` reports about a dataset.
#[derive(Clone, Debug)]
pub struct ExploreOutput {
	pub n_rows: usize,
	pub column_names: Vec<String>,
	/// The first rows of the dataset formatted for display, with missing values as empty strings.
	pub preview: Vec<Vec<String>>,
	pub target_column_name: Option<String>,
	pub problem_type: Option<ProblemType>,
	/// The roles of the columns other than the target.
	pub roles: ColumnRoles,
	pub summaries: Vec<ColumnSummary>,
	pub missing_counts: Vec<(String, usize)>,
	/// The correlations between the numeric feature columns and, if it is a number column, the target. This is `None` when there are no numeric feature columns.
	pub correlation: Option<CorrelationMatrix>,
}

/// Descriptive statistics of one column. `unique`, `top`, and `freq` are only computed for columns that are not number columns, and `number` only for number columns with at least one value.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
	pub column_name: String,
	pub kind: ColumnKind,
	/// The number of values that are not missing.
	pub count: usize,
	pub unique: Option<usize>,
	/// The most frequent value.
	pub top: Option<String>,
	/// The number of times `top` occurs.
	pub freq: Option<usize>,
	pub number: Option<NumberSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberSummary {
	pub mean: f32,
	/// The sample standard deviation, which needs at least two values.
	pub std: Option<f32>,
	pub min: f32,
	pub p25: f32,
	pub p50: f32,
	pub p75: f32,
	pub max: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
	pub column_names: Vec<String>,
	/// (n_columns, n_columns) Pearson correlation coefficients. A pair with fewer than two rows where both values are present, or with a constant column, has a NaN coefficient.
	pub values: Array2<f32>,
}

/// Load the csv at `file_path` and describe it.
pub fn explore(
	file_path: &Path,
	target_column_name: Option<&str>,
	config: &Config,
) -> Result<ExploreOutput> {
	let dataframe = load_dataframe(file_path, config)?;
	explore_dataframe(&dataframe, target_column_name, config)
}

pub(crate) fn explore_dataframe(
	dataframe: &DataFrame,
	target_column_name: Option<&str>,
	config: &Config,
) -> Result<ExploreOutput> {
	let view = dataframe.view();
	let column_names: Vec<String> = view
		.columns
		.iter()
		.map(|column| column.name().to_owned())
		.collect();
	let target_column = match target_column_name {
		Some(target_column_name) => Some(view.column(target_column_name).ok_or_else(|| {
			format_err!(
				"did not find target column \"{}\" among column names \"{}\"",
				target_column_name,
				column_names.join(", ")
			)
		})?),
		None => None,
	};
	let problem_type = target_column.map(|column| determine_problem_type(column));
	let features = match target_column {
		Some(target_column) => view.without(target_column.name()),
		None => view.clone(),
	};
	let type_sets = config.column_type_sets.clone().unwrap_or_default();
	let roles = detect_column_types(&features, &type_sets);
	let summaries = view.columns.iter().map(describe_column).collect();
	let missing_counts = view
		.columns
		.iter()
		.map(|column| (column.name().to_owned(), column.missing_count()))
		.collect();
	let mut correlation_columns: Vec<NumberColumnView> = roles
		.numeric
		.iter()
		.filter_map(|name| features.column(name).and_then(|column| column.as_number()))
		.collect();
	let correlation = if correlation_columns.is_empty() {
		None
	} else {
		if let Some(target_column) = target_column.and_then(|column| column.as_number()) {
			correlation_columns.push(target_column);
		}
		Some(correlation_matrix(&correlation_columns))
	};
	let preview = (0..view.nrows().min(PREVIEW_N_ROWS))
		.map(|row| {
			view.columns
				.iter()
				.map(|column| column.display_value(row).unwrap_or_default())
				.collect()
		})
		.collect();
	log::debug!(
		"explored {} rows and {} columns",
		view.nrows(),
		view.ncols()
	);
	Ok(ExploreOutput {
		n_rows: view.nrows(),
		column_names,
		preview,
		target_column_name: target_column_name.map(|name| name.to_owned()),
		problem_type,
		roles,
		summaries,
		missing_counts,
		correlation,
	})
}

pub fn describe_column(column: &ColumnView) -> ColumnSummary {
	let column_name = column.name().to_owned();
	let kind = column.kind();
	match column.as_number() {
		Some(column) => {
			let mut values: Vec<f32> = column
				.data
				.iter()
				.cloned()
				.filter(|value| !value.is_nan())
				.collect();
			values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
			let number = describe_numbers(&values);
			ColumnSummary {
				column_name,
				kind,
				count: values.len(),
				unique: None,
				top: None,
				freq: None,
				number,
			}
		}
		None => {
			let values: Vec<String> = (0..column.len())
				.filter_map(|index| column.display_value(index))
				.collect();
			let value_refs: Vec<&str> = values.iter().map(|value| value.as_str()).collect();
			let unique = value_refs.iter().collect::<BTreeSet<_>>().len();
			let mode = Mode::compute(value_refs.as_slice());
			ColumnSummary {
				column_name,
				kind,
				count: values.len(),
				unique: Some(unique),
				top: mode.as_ref().map(|mode| mode.value.to_owned()),
				freq: mode.map(|mode| mode.count),
				number: None,
			}
		}
	}
}

/// `sorted_values` must be sorted ascending and contain no NaN.
fn describe_numbers(sorted_values: &[f32]) -> Option<NumberSummary> {
	let min = *sorted_values.first()?;
	let max = *sorted_values.last()?;
	let mean_variance = MeanVariance::compute(sorted_values);
	Some(NumberSummary {
		mean: mean_variance.mean.to_f32()?,
		std: mean_variance
			.sample_variance()
			.and_then(|variance| variance.sqrt().to_f32()),
		min,
		p25: quantile(sorted_values, 0.25)?,
		p50: quantile(sorted_values, 0.5)?,
		p75: quantile(sorted_values, 0.75)?,
		max,
	})
}

/// Compute the Pearson correlation of every pair of `columns`, using for each pair only the rows where both values are present.
pub fn correlation_matrix(columns: &[NumberColumnView]) -> CorrelationMatrix {
	let n_columns = columns.len();
	let mut values = Array2::zeros((n_columns, n_columns));
	for i in 0..n_columns {
		for j in i..n_columns {
			let correlation = pearson(columns[i].data, columns[j].data);
			values[(i, j)] = correlation;
			values[(j, i)] = correlation;
		}
	}
	CorrelationMatrix {
		column_names: columns
			.iter()
			.map(|column| column.name.to_owned())
			.collect(),
		values,
	}
}

fn pearson(a: &[f32], b: &[f32]) -> f32 {
	let pairs: Vec<(f64, f64)> = a
		.iter()
		.zip(b.iter())
		.filter(|(a, b)| !a.is_nan() && !b.is_nan())
		.map(|(a, b)| (f64::from(*a), f64::from(*b)))
		.collect();
	let n = pairs.len() as f64;
	if pairs.len() < 2 {
		return f32::NAN;
	}
	let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
	let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
	let (mut covariance, mut variance_a, mut variance_b) = (0.0, 0.0, 0.0);
	for (a, b) in pairs.iter() {
		covariance += (a - mean_a) * (b - mean_b);
		variance_a += (a - mean_a) * (a - mean_a);
		variance_b += (b - mean_b) * (b - mean_b);
	}
	if variance_a == 0.0 || variance_b == 0.0 {
		return f32::NAN;
	}
	(covariance / (variance_a * variance_b).sqrt()) as f32
}

#[test]
fn test_describe_number_column() {
	let data = [4.0, 1.0, f32::NAN, 3.0, 2.0];
	let column = ColumnView::Number(NumberColumnView { name: "x", data: &data });
	let summary = describe_column(&column);
	assert_eq!(summary.count, 4);
	assert_eq!(summary.unique, None);
	let number = summary.number.unwrap();
	assert_eq!(number.mean, 2.5);
	assert_eq!(number.min, 1.0);
	assert_eq!(number.p25, 1.75);
	assert_eq!(number.p50, 2.5);
	assert_eq!(number.p75, 3.25);
	assert_eq!(number.max, 4.0);
	assert!((number.std.unwrap() - 1.290_994_4).abs() < 1e-5);
}

#[test]
fn test_describe_text_column() {
	let data = vec![
		Some("b".to_owned()),
		None,
		Some("a".to_owned()),
		Some("b".to_owned()),
	];
	let column = ColumnView::Text(sapling_dataframe::TextColumnView { name: "x", data: &data });
	let summary = describe_column(&column);
	assert_eq!(
		summary,
		ColumnSummary {
			column_name: "x".to_owned(),
			kind: ColumnKind::Text,
			count: 3,
			unique: Some(2),
			top: Some("b".to_owned()),
			freq: Some(2),
			number: None,
		}
	);
}

#[test]
fn test_correlation_matrix() {
	let a = [1.0, 2.0, 3.0, 4.0];
	let b = [8.0, 6.0, 4.0, f32::NAN];
	let c = [5.0, 5.0, 5.0, 5.0];
	let columns = [
		NumberColumnView { name: "a", data: &a },
		NumberColumnView { name: "b", data: &b },
		NumberColumnView { name: "c", data: &c },
	];
	let matrix = correlation_matrix(&columns);
	assert!((matrix.values[(0, 0)] - 1.0).abs() < 1e-6);
	assert!((matrix.values[(0, 1)] + 1.0).abs() < 1e-6);
	assert!((matrix.values[(1, 0)] + 1.0).abs() < 1e-6);
	assert!(matrix.values[(0, 2)].is_nan());
}

#[test]
fn test_explore() {
	let file_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/passengers.csv");
	let output = explore(&file_path, Some("survived"), &Config::default()).unwrap();
	assert_eq!(output.n_rows, 48);
	assert_eq!(output.column_names.len(), 7);
	assert_eq!(output.preview.len(), PREVIEW_N_ROWS);
	assert_eq!(output.problem_type, Some(ProblemType::Classification));
	assert_eq!(output.roles.numeric, vec!["age".to_owned(), "fare".to_owned()]);
	let missing: Vec<usize> = output.missing_counts.iter().map(|(_, count)| *count).collect();
	assert_eq!(missing, vec![0, 0, 0, 5, 0, 3, 0]);
	let correlation = output.correlation.unwrap();
	assert_eq!(
		correlation.column_names,
		vec!["age".to_owned(), "fare".to_owned(), "survived".to_owned()]
	);
	assert!(explore(&file_path, Some("missing"), &Config::default()).is_err());
}
