use crate::{FittedGroup, FittedPlan, FittedStep};

/// Name every column of the matrix produced by `plan.transform()`, in the same order.
pub fn get_feature_names(plan: &FittedPlan) -> Vec<String> {
	plan.groups
		.iter()
		.flat_map(|group| group.feature_names())
		.collect()
}

impl FittedGroup {
	/// A group with no steps keeps its column names. Otherwise each step that derives new names replaces the running list.
	pub fn feature_names(&self) -> Vec<String> {
		self.steps
			.iter()
			.fold(self.columns.clone(), |names, step| {
				step.feature_names_out(&names).unwrap_or(names)
			})
	}
}

impl FittedStep {
	/// Imputation does not change the number or meaning of its columns, so it has no names of its own.
	pub fn feature_names_out(&self, input: &[String]) -> Option<Vec<String>> {
		match self {
			FittedStep::Impute(_) => None,
			FittedStep::OneHotEncode(encoder) => Some(encoder.feature_names(input)),
		}
	}
}

#[cfg(test)]
fn fit(numeric: &[&str], categorical: &[&str]) -> (FittedPlan, ndarray::Array2<f32>) {
	let dataframe = crate::test_dataframe();
	let view = dataframe.view();
	let to_strings = |names: &[&str]| -> Vec<String> {
		names.iter().map(|name| name.to_string()).collect()
	};
	let plan = crate::create_preprocessor(&to_strings(numeric), &to_strings(categorical), &view)
		.unwrap()
		.fit(&view)
		.unwrap();
	let features = plan.transform(&view).unwrap();
	(plan, features)
}

#[test]
fn test_numeric_names() {
	let (plan, features) = fit(&["age", "income"], &[]);
	let names = get_feature_names(&plan);
	assert_eq!(names, vec!["age", "income"]);
	assert_eq!(names.len(), features.ncols());
}

#[test]
fn test_categorical_names() {
	let (plan, features) = fit(&[], &["color"]);
	let names = get_feature_names(&plan);
	assert_eq!(names, vec!["color_blue", "color_red"]);
	assert_eq!(names.len(), features.ncols());
}

#[test]
fn test_mixed_names_include_every_group() {
	let (plan, features) = fit(&["age", "income"], &["color", "note"]);
	let names = get_feature_names(&plan);
	assert_eq!(
		names,
		vec![
			"age",
			"income",
			"color_blue",
			"color_red",
			"note_a",
			"note_b",
			"note_c",
			"note_d",
		]
	);
	assert_eq!(names.len(), features.ncols());
	assert_eq!(names.len(), plan.n_features());
}
