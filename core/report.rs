use crate::{
	evaluate::Metrics,
	stats::{ColumnSummary, ExploreOutput},
	train::TrainOutput,
};
use sapling_util::table::Table;
use std::fmt::{self, Display, Formatter};

fn format_number(value: f32) -> String {
	format!("{:.4}", value)
}

fn metric_rows(metrics: &Metrics) -> Vec<(&'static str, f32)> {
	match metrics {
		Metrics::Classification {
			accuracy,
			f1_weighted,
			baseline_accuracy,
		} => vec![
			("accuracy", *accuracy),
			("f1 (weighted)", *f1_weighted),
			("baseline accuracy", *baseline_accuracy),
		],
		Metrics::Regression {
			r2,
			rmse,
			baseline_rmse,
		} => vec![
			("r2", *r2),
			("rmse", *rmse),
			("baseline rmse", *baseline_rmse),
		],
	}
}

fn header(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| (*value).to_owned()).collect()
}

impl Display for TrainOutput {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		writeln!(f, "target: {}", self.target_column_name)?;
		writeln!(f, "problem type: {}", self.problem_type)?;
		if let Some(classes) = &self.classes {
			writeln!(f, "classes: {}", classes.join(", "))?;
		}
		write!(f, "rows: {}", self.n_rows)?;
		if self.n_dropped > 0 {
			write!(f, " ({} dropped with a missing target)", self.n_dropped)?;
		}
		writeln!(f, ", train: {}, test: {}", self.n_train, self.n_test)?;
		writeln!(
			f,
			"features ({}): {}",
			self.feature_names.len(),
			self.feature_names.join(", ")
		)?;
		writeln!(f)?;
		let mut metrics = Table::new(header(&["metric", "train", "test"])).numeric();
		for ((name, train), (_, test)) in metric_rows(&self.train_metrics)
			.into_iter()
			.zip(metric_rows(&self.test_metrics))
		{
			metrics.push_row(vec![name.to_owned(), format_number(train), format_number(test)]);
		}
		write!(f, "{}", metrics)?;
		if !self.feature_importances.is_empty() {
			writeln!(f)?;
			let mut importances = Table::new(header(&["feature", "importance"])).numeric();
			for feature_importance in self.feature_importances.iter() {
				importances.push_row(vec![
					feature_importance.feature_name.clone(),
					format_number(feature_importance.importance),
				]);
			}
			write!(f, "{}", importances)?;
		}
		Ok(())
	}
}

fn summary_row(summary: &ColumnSummary) -> Vec<String> {
	let optional = |value: Option<String>| value.unwrap_or_default();
	let number = summary.number.as_ref();
	vec![
		summary.column_name.clone(),
		summary.kind.to_string(),
		summary.count.to_string(),
		optional(summary.unique.map(|unique| unique.to_string())),
		optional(summary.top.clone()),
		optional(summary.freq.map(|freq| freq.to_string())),
		optional(number.map(|number| format_number(number.mean))),
		optional(number.and_then(|number| number.std).map(format_number)),
		optional(number.map(|number| format_number(number.min))),
		optional(number.map(|number| format_number(number.p25))),
		optional(number.map(|number| format_number(number.p50))),
		optional(number.map(|number| format_number(number.p75))),
		optional(number.map(|number| format_number(number.max))),
	]
}

impl Display for ExploreOutput {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"rows: {}, columns: {}",
			self.n_rows,
			self.column_names.len()
		)?;
		if let (Some(target_column_name), Some(problem_type)) =
			(&self.target_column_name, self.problem_type)
		{
			writeln!(f, "target: {} ({})", target_column_name, problem_type)?;
		}
		writeln!(f, "numeric columns: {}", self.roles.numeric.join(", "))?;
		writeln!(f, "categorical columns: {}", self.roles.categorical.join(", "))?;

		writeln!(f)?;
		let mut preview = Table::new(self.column_names.clone());
		for row in self.preview.iter() {
			preview.push_row(row.clone());
		}
		write!(f, "{}", preview)?;

		writeln!(f)?;
		let mut summaries = Table::new(header(&[
			"column", "type", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%",
			"75%", "max",
		]))
		.numeric();
		for summary in self.summaries.iter() {
			summaries.push_row(summary_row(summary));
		}
		write!(f, "{}", summaries)?;

		writeln!(f)?;
		let mut missing = Table::new(header(&["column", "missing"])).numeric();
		for (column_name, count) in self.missing_counts.iter() {
			missing.push_row(vec![column_name.clone(), count.to_string()]);
		}
		write!(f, "{}", missing)?;

		if let Some(correlation) = &self.correlation {
			writeln!(f)?;
			let mut column_names = vec![String::new()];
			column_names.extend(correlation.column_names.iter().cloned());
			let mut table = Table::new(column_names).numeric();
			for (column_name, row) in correlation
				.column_names
				.iter()
				.zip(correlation.values.outer_iter())
			{
				let mut cells = vec![column_name.clone()];
				cells.extend(row.iter().map(|value| format_number(*value)));
				table.push_row(cells);
			}
			write!(f, "{}", table)?;
		}
		Ok(())
	}
}

#[test]
fn test_train_report() {
	use crate::ProblemType;
	let output = TrainOutput {
		target_column_name: "y".to_owned(),
		n_rows: 10,
		n_dropped: 1,
		problem_type: ProblemType::Classification,
		classes: Some(vec!["a".to_owned(), "b".to_owned()]),
		feature_names: vec!["x".to_owned()],
		n_train: 7,
		n_test: 2,
		train_metrics: Metrics::Classification {
			accuracy: 1.0,
			f1_weighted: 1.0,
			baseline_accuracy: 0.5714,
		},
		test_metrics: Metrics::Classification {
			accuracy: 0.5,
			f1_weighted: 0.3333,
			baseline_accuracy: 0.5,
		},
		feature_importances: vec![crate::FeatureImportance {
			feature_name: "x".to_owned(),
			importance: 1.0,
		}],
		dot: String::new(),
	};
	let expected = "\
target: y
problem type: classification
classes: a, b
rows: 10 (1 dropped with a missing target), train: 7, test: 2
features (1): x

| metric            |  train |   test |
|-------------------|--------|--------|
| accuracy          | 1.0000 | 0.5000 |
| f1 (weighted)     | 1.0000 | 0.3333 |
| baseline accuracy | 0.5714 | 0.5000 |

| feature | importance |
|---------|------------|
| x       |     1.0000 |
";
	assert_eq!(output.to_string(), expected);
}

#[test]
fn test_explore_report() {
	let file_path =
		std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/passengers.csv");
	let output = crate::explore(&file_path, Some("survived"), &crate::Config::default()).unwrap();
	let report = output.to_string();
	assert!(report.starts_with("rows: 48, columns: 7\ntarget: survived (classification)\n"));
	assert!(report.contains("| age      |       5 |"));
}
