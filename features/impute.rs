use sapling_metrics::{Metric, Median, Mode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImputeStrategy {
	/// Replace missing numbers with the median of the column's training values.
	Median,
	/// Replace missing categories with the most frequent training value.
	MostFrequent,
}

/// The fill values learned for each column of a group, in group column order.
#[derive(Clone, Debug, PartialEq)]
pub enum FittedImputer {
	Median { fill_values: Vec<f32> },
	/// A column with no valid training values has no fill value and stays missing.
	MostFrequent { fill_values: Vec<Option<String>> },
}

impl FittedImputer {
	pub fn fit_median(columns: &[Vec<f32>]) -> FittedImputer {
		let fill_values = columns
			.iter()
			.map(|values| Median::compute(values.as_slice()).unwrap_or(0.0))
			.collect();
		FittedImputer::Median { fill_values }
	}

	pub fn fit_most_frequent(columns: &[Vec<Option<String>>]) -> FittedImputer {
		let fill_values = columns
			.iter()
			.map(|values| {
				let values: Vec<&str> = values.iter().filter_map(|value| value.as_deref()).collect();
				Mode::compute(values.as_slice()).map(|mode| mode.value.to_owned())
			})
			.collect();
		FittedImputer::MostFrequent { fill_values }
	}

	pub fn impute_numbers(fill_values: &[f32], columns: &mut [Vec<f32>]) {
		for (values, fill_value) in columns.iter_mut().zip(fill_values.iter()) {
			for value in values.iter_mut().filter(|value| value.is_nan()) {
				*value = *fill_value;
			}
		}
	}

	pub fn impute_categories(fill_values: &[Option<String>], columns: &mut [Vec<Option<String>>]) {
		for (values, fill_value) in columns.iter_mut().zip(fill_values.iter()) {
			for value in values.iter_mut().filter(|value| value.is_none()) {
				*value = fill_value.clone();
			}
		}
	}
}

#[test]
fn test_fit_median() {
	let imputer = FittedImputer::fit_median(&[
		vec![1.0, f32::NAN, 3.0, 10.0],
		vec![f32::NAN, f32::NAN],
	]);
	assert_eq!(
		imputer,
		FittedImputer::Median {
			fill_values: vec![3.0, 0.0]
		}
	);
}

#[test]
fn test_fit_most_frequent() {
	let columns = vec![
		vec![
			Some("b".to_owned()),
			Some("a".to_owned()),
			None,
			Some("b".to_owned()),
		],
		vec![None, None],
	];
	let imputer = FittedImputer::fit_most_frequent(&columns);
	assert_eq!(
		imputer,
		FittedImputer::MostFrequent {
			fill_values: vec![Some("b".to_owned()), None]
		}
	);
	let mut columns = columns;
	if let FittedImputer::MostFrequent { fill_values } = &imputer {
		FittedImputer::impute_categories(fill_values, &mut columns);
	}
	assert_eq!(columns[0][2], Some("b".to_owned()));
	assert_eq!(columns[1], vec![None, None]);
}
