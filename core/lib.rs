/*!
This crate ties sapling together. [`train`](fn.train.html) loads a csv, infers the problem type from the target column, builds and fits the preprocessing plan, trains a decision tree, and evaluates it on a held out test set. [`explore`](fn.explore.html) computes descriptive statistics, missing value counts, and correlations for a csv.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod config;
mod evaluate;
mod model;
mod problem_type;
mod report;
mod stats;
mod train;

pub use self::config::{load_config, ColumnType, Config, TreeConfig};
pub use self::evaluate::{evaluate, Metrics};
pub use self::model::{Labels, Model};
pub use self::problem_type::{
	determine_problem_type, ProblemType, MAX_CLASSIFICATION_UNIQUE_VALUES,
};
pub use self::stats::{
	correlation_matrix, describe_column, explore, ColumnSummary, CorrelationMatrix, ExploreOutput,
	NumberSummary,
};
pub use self::train::{train, FeatureImportance, TrainError, TrainOutput, SEED};
