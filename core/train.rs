use crate::{
	config::Config,
	determine_problem_type,
	evaluate::{evaluate, Metrics},
	model::{Labels, Model},
	ProblemType,
};
use anyhow::{format_err, Context, Result};
use num_traits::ToPrimitive;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use sapling_dataframe::{Column, DataFrame, FromCsvOptions};
use sapling_features::{
	create_preprocessor, detect_column_types, get_feature_names, ColumnRoles,
};
use std::path::Path;

/// The seed used to shuffle the rows and to train the tree, so every run on the same data gives the same model.
pub const SEED: u64 = 42;

/// The number of feature importances kept in the output.
pub const MAX_FEATURE_IMPORTANCES: usize = 20;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrainError {
	#[error("no features were selected, select at least one feature to train a model")]
	NoFeaturesSelected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureImportance {
	pub feature_name: String,
	pub importance: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainOutput {
	pub target_column_name: String,
	/// The number of rows in the csv.
	pub n_rows: usize,
	/// The number of rows dropped because their target value is missing.
	pub n_dropped: usize,
	pub problem_type: ProblemType,
	/// The class names, for classification.
	pub classes: Option<Vec<String>>,
	pub feature_names: Vec<String>,
	pub n_train: usize,
	pub n_test: usize,
	pub train_metrics: Metrics,
	pub test_metrics: Metrics,
	/// The most important features, most important first.
	pub feature_importances: Vec<FeatureImportance>,
	pub dot: String,
}

/// Train a decision tree to predict `target_column_name` from the other columns of the csv at `file_path`.
pub fn train(file_path: &Path, target_column_name: &str, config: &Config) -> Result<TrainOutput> {
	config.validate()?;

	// load the dataframe from the csv file
	let dataframe = load_dataframe(file_path, config)?;
	let n_rows = dataframe.nrows();

	// drop the rows whose target value is missing
	let target_column = find_column(&dataframe, target_column_name)?.view();
	let keep: Vec<usize> = (0..n_rows)
		.filter(|index| !target_column.is_missing(*index))
		.collect();
	let n_dropped = n_rows - keep.len();
	let mut dataframe = if n_dropped > 0 {
		log::warn!(
			"dropping {} rows with a missing value in the target column \"{}\"",
			n_dropped,
			target_column_name
		);
		dataframe.take_rows(&keep)
	} else {
		dataframe
	};

	shuffle(&mut dataframe, SEED);

	let view = dataframe.view();
	let target_column = view
		.column(target_column_name)
		.ok_or_else(|| format_err!("did not find target column \"{}\"", target_column_name))?;
	let features = view.without(target_column_name);

	// assign the feature columns to roles and build the initial plan, which reports columns that cannot be placed before any selection is applied
	let type_sets = config.column_type_sets.clone().unwrap_or_default();
	let roles = detect_column_types(&features, &type_sets);
	let plan = create_preprocessor(&roles.numeric, &roles.categorical, &features)?;
	log::debug!("initial plan has {} groups", plan.groups.len());

	let problem_type = determine_problem_type(target_column);
	log::info!("detected problem type: {}", problem_type);

	// apply the feature selection and rebuild the plan for the selected columns
	let roles = select_features(roles, config.features.as_deref())?;
	let plan = create_preprocessor(&roles.numeric, &roles.categorical, &features)?;

	let labels = Labels::from_column(target_column, problem_type)?;

	// train test split
	let n_examples = labels.len();
	let n_test = (config.test_fraction() * n_examples.to_f64().unwrap_or(0.0))
		.ceil()
		.to_usize()
		.unwrap_or(0);
	let n_train = n_examples.saturating_sub(n_test);
	if n_train == 0 || n_test == 0 {
		return Err(format_err!(
			"cannot split {} rows into a train and test set with test fraction {}",
			n_examples,
			config.test_fraction()
		));
	}
	let (features_train, features_test) = features.split_at_row(n_train);
	let (labels_train, labels_test) = labels.split_at(n_train);
	log::info!("training on {} rows, testing on {} rows", n_train, n_test);

	// fit the plan on the training rows only, then transform both splits
	let plan = plan.fit(&features_train)?;
	let x_train = plan.transform(&features_train)?;
	let x_test = plan.transform(&features_test)?;
	let feature_names = get_feature_names(&plan);

	let model = Model::train(x_train.view(), &labels_train, &config.tree_options(SEED))
		.context("failed to train the model")?;
	log::info!(
		"trained a tree with depth {} and {} leaves",
		model.tree().depth(),
		model.tree().n_leaves()
	);

	let train_metrics = evaluate(&model, x_train.view(), &labels_train)?;
	let test_metrics = evaluate(&model, x_test.view(), &labels_test)?;

	let mut feature_importances: Vec<FeatureImportance> = feature_names
		.iter()
		.zip(model.feature_importances().iter())
		.map(|(feature_name, importance)| FeatureImportance {
			feature_name: feature_name.clone(),
			importance: *importance,
		})
		.collect();
	feature_importances.sort_by(|a, b| {
		b.importance
			.partial_cmp(&a.importance)
			.unwrap_or(std::cmp::Ordering::Equal)
	});
	feature_importances.truncate(MAX_FEATURE_IMPORTANCES);

	let classes = match &labels {
		Labels::Classes { classes, .. } => Some(classes.clone()),
		Labels::Values(_) => None,
	};
	let dot = model.to_dot(&feature_names);

	Ok(TrainOutput {
		target_column_name: target_column_name.to_owned(),
		n_rows,
		n_dropped,
		problem_type,
		classes,
		feature_names,
		n_train,
		n_test,
		train_metrics,
		test_metrics,
		feature_importances,
		dot,
	})
}

pub(crate) fn load_dataframe(file_path: &Path, config: &Config) -> Result<DataFrame> {
	let options = FromCsvOptions {
		column_types: config.dataframe_column_types(),
		..Default::default()
	};
	let dataframe = DataFrame::from_path(file_path, options)
		.with_context(|| format!("failed to load {}", file_path.display()))?;
	log::info!(
		"loaded {} rows and {} columns from {}",
		dataframe.nrows(),
		dataframe.ncols(),
		file_path.display()
	);
	Ok(dataframe)
}

fn find_column<'a>(dataframe: &'a DataFrame, column_name: &str) -> Result<&'a Column> {
	dataframe.column(column_name).ok_or_else(|| {
		format_err!(
			"did not find target column \"{}\" among column names \"{}\"",
			column_name,
			dataframe.column_names().join(", ")
		)
	})
}

/// Restrict `roles` to the `selected` columns. With no selection, every column with a role is kept. Either way, ending up with no columns is `TrainError::NoFeaturesSelected`.
fn select_features(roles: ColumnRoles, selected: Option<&[String]>) -> Result<ColumnRoles> {
	let roles = match selected {
		Some(selected) => {
			for column_name in selected.iter() {
				if !roles.numeric.contains(column_name) && !roles.categorical.contains(column_name) {
					return Err(format_err!(
						"the feature \"{}\" is not a numeric or categorical column",
						column_name
					));
				}
			}
			roles.retain(selected)
		}
		None => roles,
	};
	if roles.is_empty() {
		return Err(TrainError::NoFeaturesSelected.into());
	}
	Ok(roles)
}

/// Shuffle the rows of `dataframe`. Every column is shuffled with its own rng seeded identically, so the rows stay aligned.
fn shuffle(dataframe: &mut DataFrame, seed: u64) {
	dataframe.columns.par_iter_mut().for_each(|column| {
		let mut rng = Xoshiro256Plus::seed_from_u64(seed);
		match column {
			Column::Unknown(_) => {}
			Column::Number(column) => column.data.shuffle(&mut rng),
			Column::Enum(column) => column.data.shuffle(&mut rng),
			Column::Text(column) => column.data.shuffle(&mut rng),
		}
	});
}

#[cfg(test)]
fn passengers_path() -> std::path::PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/passengers.csv")
}

#[test]
fn test_train_classification() {
	let output = train(&passengers_path(), "survived", &Config::default()).unwrap();
	assert_eq!(output.problem_type, ProblemType::Classification);
	assert_eq!(output.classes, Some(vec!["0".to_owned(), "1".to_owned()]));
	assert_eq!(output.n_rows, 48);
	assert_eq!(output.n_dropped, 0);
	assert_eq!(output.n_test, 10);
	assert_eq!(output.n_train, 38);
	assert!(matches!(output.test_metrics, Metrics::Classification { .. }));
	assert!(output.dot.starts_with("digraph Tree {"));
	let total: f32 = output
		.feature_importances
		.iter()
		.map(|feature_importance| feature_importance.importance)
		.sum();
	assert!(total <= 1.0 + 1e-5);
	let again = train(&passengers_path(), "survived", &Config::default()).unwrap();
	assert_eq!(output, again);
}

#[test]
fn test_train_regression() {
	let output = train(&passengers_path(), "fare", &Config::default()).unwrap();
	assert_eq!(output.problem_type, ProblemType::Regression);
	assert_eq!(output.classes, None);
	assert!(matches!(output.train_metrics, Metrics::Regression { .. }));
}

#[test]
fn test_missing_target_rows_are_dropped() {
	let output = train(&passengers_path(), "age", &Config::default()).unwrap();
	assert_eq!(output.n_dropped, 5);
	assert_eq!(output.n_train + output.n_test, 43);
}

#[test]
fn test_feature_selection() {
	let config = Config {
		features: Some(vec!["sex".to_owned(), "age".to_owned()]),
		..Default::default()
	};
	let output = train(&passengers_path(), "survived", &config).unwrap();
	assert_eq!(
		output.feature_names,
		vec![
			"age".to_owned(),
			"sex_female".to_owned(),
			"sex_male".to_owned()
		]
	);
}

#[test]
fn test_no_features_selected() {
	let config = Config {
		features: Some(vec![]),
		..Default::default()
	};
	let error = train(&passengers_path(), "survived", &config).unwrap_err();
	assert_eq!(
		error.downcast_ref::<TrainError>(),
		Some(&TrainError::NoFeaturesSelected)
	);
}

#[test]
fn test_no_placeable_features() {
	let file_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/empty_features.csv");
	let error = train(&file_path, "target", &Config::default()).unwrap_err();
	assert_eq!(
		error.downcast_ref::<TrainError>(),
		Some(&TrainError::NoFeaturesSelected)
	);
}

#[test]
fn test_invalid_inputs() {
	assert!(train(&passengers_path(), "missing", &Config::default()).is_err());
	let config = Config {
		features: Some(vec!["survived".to_owned()]),
		..Default::default()
	};
	assert!(train(&passengers_path(), "survived", &config).is_err());
	let config = Config {
		tree: Some(crate::TreeConfig {
			max_depth: Some(21),
			..Default::default()
		}),
		..Default::default()
	};
	let error = train(&passengers_path(), "survived", &config).unwrap_err();
	assert_eq!(
		error.to_string(),
		"max_depth must be between 1 and 20, but it is 21"
	);
}
