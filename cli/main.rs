//! This module contains the main entrypoint to the sapling cli.

use anyhow::{Context, Result};
use clap::{Args, Parser};
use colored::Colorize;
use sapling_core::{Config, TrainError, TrainOutput};
use std::{
	io::Write,
	path::{Path, PathBuf},
};

#[derive(Parser)]
#[clap(about = "Explore a csv and train a decision tree on it.")]
enum Options {
	#[clap(name = "train")]
	Train(TrainOptions),
	#[clap(name = "explore")]
	Explore(ExploreOptions),
}

#[derive(Args, Debug)]
#[clap(about = "train a decision tree")]
#[clap(long_about = "train a decision tree classifier or regressor on a csv file and print its metrics")]
struct TrainOptions {
	#[clap(short, long, help = "the path to your .csv file")]
	file: PathBuf,
	#[clap(short, long, help = "the name of the column to predict")]
	target: String,
	#[clap(
		long = "feature",
		help = "a column to train on, repeat to select several, defaults to every column"
	)]
	features: Vec<String>,
	#[clap(long, help = "the fraction of rows held out for testing, between 0.1 and 0.5")]
	test_fraction: Option<f64>,
	#[clap(long, help = "the maximum depth of the tree, between 1 and 20")]
	max_depth: Option<usize>,
	#[clap(long, help = "the minimum number of examples needed to split a node, between 2 and 20")]
	min_examples_split: Option<usize>,
	#[clap(long, help = "the minimum number of examples in a leaf, between 1 and 20")]
	min_examples_leaf: Option<usize>,
	#[clap(short, long, help = "the path to a config file")]
	config: Option<PathBuf>,
	#[clap(long, help = "the path to write the tree in graphviz dot format to, instead of printing it")]
	dot: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[clap(about = "describe a csv file")]
#[clap(long_about = "print descriptive statistics, missing values, and correlations of a csv file")]
struct ExploreOptions {
	#[clap(short, long, help = "the path to your .csv file")]
	file: PathBuf,
	#[clap(short, long, help = "the name of the column to predict")]
	target: Option<String>,
	#[clap(short, long, help = "the path to a config file")]
	config: Option<PathBuf>,
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("sapling=info"))
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
	let options = Options::parse();
	let result = match options {
		Options::Train(options) => cli_train(options),
		Options::Explore(options) => cli_explore(options),
	};
	if let Err(error) = result {
		if let Some(TrainError::NoFeaturesSelected) = error.downcast_ref::<TrainError>() {
			eprintln!("{}: {}", "warning".yellow().bold(), error);
			return;
		}
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_train(options: TrainOptions) -> Result<()> {
	let mut config = sapling_core::load_config(options.config.as_deref())?.unwrap_or_default();
	// command line flags override the config file
	if !options.features.is_empty() {
		config.features = Some(options.features.clone());
	}
	if options.test_fraction.is_some() {
		config.test_fraction = options.test_fraction;
	}
	let mut tree = config.tree.take().unwrap_or_default();
	if options.max_depth.is_some() {
		tree.max_depth = options.max_depth;
	}
	if options.min_examples_split.is_some() {
		tree.min_examples_split = options.min_examples_split;
	}
	if options.min_examples_leaf.is_some() {
		tree.min_examples_leaf = options.min_examples_leaf;
	}
	config.tree = Some(tree);

	let output = sapling_core::train(&options.file, &options.target, &config)?;
	write_train_output(&output, options.dot.as_deref(), &mut std::io::stdout())
}

/// The dot file is written before anything is printed, so a failed write prints no report.
fn write_train_output(
	output: &TrainOutput,
	dot_path: Option<&Path>,
	stdout: &mut dyn Write,
) -> Result<()> {
	if let Some(dot_path) = dot_path {
		std::fs::write(dot_path, &output.dot)
			.with_context(|| format!("failed to write {}", dot_path.display()))?;
		log::info!("wrote the tree to {}", dot_path.display());
	}
	write!(stdout, "{}", output)?;
	if dot_path.is_none() {
		writeln!(stdout)?;
		write!(stdout, "{}", output.dot)?;
	}
	Ok(())
}

fn cli_explore(options: ExploreOptions) -> Result<()> {
	let config: Config = sapling_core::load_config(options.config.as_deref())?.unwrap_or_default();
	let output = sapling_core::explore(&options.file, options.target.as_deref(), &config)?;
	print!("{}", output);
	Ok(())
}

#[cfg(test)]
fn test_output() -> TrainOutput {
	let metrics = sapling_core::Metrics::Regression {
		r2: 0.5,
		rmse: 1.0,
		baseline_rmse: 2.0,
	};
	TrainOutput {
		target_column_name: "y".to_owned(),
		n_rows: 5,
		n_dropped: 0,
		problem_type: sapling_core::ProblemType::Regression,
		classes: None,
		feature_names: vec!["x".to_owned()],
		n_train: 4,
		n_test: 1,
		train_metrics: metrics.clone(),
		test_metrics: metrics,
		feature_importances: Vec::new(),
		dot: "digraph Tree {\n}\n".to_owned(),
	}
}

#[test]
fn test_failed_dot_write_prints_nothing() {
	let dot_path = std::env::temp_dir()
		.join("sapling-no-such-directory")
		.join("tree.dot");
	let mut stdout = Vec::new();
	assert!(write_train_output(&test_output(), Some(&dot_path), &mut stdout).is_err());
	assert!(stdout.is_empty());
}

#[test]
fn test_dot_printed_after_report() {
	let mut stdout = Vec::new();
	write_train_output(&test_output(), None, &mut stdout).unwrap();
	let stdout = String::from_utf8(stdout).unwrap();
	assert!(stdout.starts_with("target: y\n"));
	assert!(stdout.ends_with("\ndigraph Tree {\n}\n"));
}
