/*!
This module defines the `Config` struct, which is read from a yaml file to configure [`train`](../fn.train.html) and [`explore`](../fn.explore.html). Every field is optional.

```yaml
column_types:
  zip_code:
    type: text
column_type_sets:
  numeric: [number]
  categorical: [enum, text]
test_fraction: 0.25
features: [age, sex, class]
tree:
  max_depth: 4
  min_examples_split: 10
  min_examples_leaf: 5
```
*/

use anyhow::{format_err, Context, Result};
use sapling_features::ColumnTypeSets;
use std::{collections::BTreeMap, path::Path};

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct Config {
	/// Force the type of these columns instead of inferring it.
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub column_type_sets: Option<ColumnTypeSets>,
	pub test_fraction: Option<f64>,
	/// The columns to train on. If this is `None`, every numeric and categorical column other than the target is used.
	pub features: Option<Vec<String>>,
	pub tree: Option<TreeConfig>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ColumnType {
	#[serde(rename = "unknown")]
	Unknown,
	#[serde(rename = "number")]
	Number,
	#[serde(rename = "enum")]
	Enum { options: Vec<String> },
	#[serde(rename = "text")]
	Text,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct TreeConfig {
	pub max_depth: Option<usize>,
	pub min_examples_split: Option<usize>,
	pub min_examples_leaf: Option<usize>,
}

pub fn load_config(config_path: Option<&Path>) -> Result<Option<Config>> {
	if let Some(config_path) = config_path {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		let config = serde_yaml::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
		Ok(Some(config))
	} else {
		Ok(None)
	}
}

impl Config {
	pub fn test_fraction(&self) -> f64 {
		self.test_fraction.unwrap_or(DEFAULT_TEST_FRACTION)
	}

	pub fn tree_options(&self, seed: u64) -> sapling_tree::TrainOptions {
		let defaults = sapling_tree::TrainOptions::default();
		let tree = self.tree.clone().unwrap_or_default();
		sapling_tree::TrainOptions {
			max_depth: tree.max_depth.unwrap_or(defaults.max_depth),
			min_examples_split: tree.min_examples_split.unwrap_or(defaults.min_examples_split),
			min_examples_leaf: tree.min_examples_leaf.unwrap_or(defaults.min_examples_leaf),
			seed,
		}
	}

	/// Check that the test fraction and tree options are in the ranges sapling accepts.
	pub fn validate(&self) -> Result<()> {
		let test_fraction = self.test_fraction();
		if !(0.1..=0.5).contains(&test_fraction) {
			return Err(format_err!(
				"test_fraction must be between 0.1 and 0.5, but it is {}",
				test_fraction
			));
		}
		let options = self.tree_options(0);
		let ranges = [
			("max_depth", options.max_depth, 1, 20),
			("min_examples_split", options.min_examples_split, 2, 20),
			("min_examples_leaf", options.min_examples_leaf, 1, 20),
		];
		for (name, value, min, max) in ranges.iter() {
			if value < min || value > max {
				return Err(format_err!(
					"{} must be between {} and {}, but it is {}",
					name,
					min,
					max,
					value
				));
			}
		}
		Ok(())
	}

	pub(crate) fn dataframe_column_types(
		&self,
	) -> Option<BTreeMap<String, sapling_dataframe::ColumnType>> {
		self.column_types.as_ref().map(|column_types| {
			column_types
				.iter()
				.map(|(column_name, column_type)| {
					let column_type = match column_type {
						ColumnType::Unknown => sapling_dataframe::ColumnType::Unknown,
						ColumnType::Number => sapling_dataframe::ColumnType::Number,
						ColumnType::Enum { options } => sapling_dataframe::ColumnType::Enum {
							options: options.clone(),
						},
						ColumnType::Text => sapling_dataframe::ColumnType::Text,
					};
					(column_name.clone(), column_type)
				})
				.collect()
		})
	}
}

#[test]
fn test_parse_config() {
	let config: Config = serde_yaml::from_str(
		r#"
column_types:
  zip_code:
    type: text
  rooms:
    type: enum
    options: ["1", "2"]
column_type_sets:
  numeric: [number]
  categorical: [enum]
test_fraction: 0.25
features: [age, sex]
tree:
  max_depth: 4
"#,
	)
	.unwrap();
	assert_eq!(config.test_fraction(), 0.25);
	assert_eq!(
		config.column_type_sets,
		Some(ColumnTypeSets {
			numeric: vec![sapling_dataframe::ColumnKind::Number],
			categorical: vec![sapling_dataframe::ColumnKind::Enum],
		})
	);
	let options = config.tree_options(42);
	assert_eq!(options.max_depth, 4);
	assert_eq!(options.min_examples_split, 2);
	assert_eq!(options.min_examples_leaf, 1);
	let column_types = config.dataframe_column_types().unwrap();
	assert_eq!(
		column_types.get("rooms"),
		Some(&sapling_dataframe::ColumnType::Enum {
			options: vec!["1".to_owned(), "2".to_owned()]
		})
	);
	assert!(config.validate().is_ok());
}

#[test]
fn test_validate() {
	let config = Config {
		test_fraction: Some(0.6),
		..Default::default()
	};
	assert!(config.validate().is_err());
	let config = Config {
		tree: Some(TreeConfig {
			max_depth: Some(21),
			..Default::default()
		}),
		..Default::default()
	};
	let error = config.validate().unwrap_err();
	assert_eq!(
		error.to_string(),
		"max_depth must be between 1 and 20, but it is 21"
	);
	assert!(Config::default().validate().is_ok());
}
