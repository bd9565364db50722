use sapling_dataframe::{ColumnKind, DataFrameView};

/// The column kinds that are treated as numeric and as categorical features. A kind in neither list is excluded from training.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ColumnTypeSets {
	pub numeric: Vec<ColumnKind>,
	pub categorical: Vec<ColumnKind>,
}

impl Default for ColumnTypeSets {
	fn default() -> Self {
		Self {
			numeric: vec![ColumnKind::Number],
			categorical: vec![ColumnKind::Enum, ColumnKind::Text],
		}
	}
}

/// Column names by role, each in source column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnRoles {
	pub numeric: Vec<String>,
	pub categorical: Vec<String>,
}

impl ColumnRoles {
	pub fn is_empty(&self) -> bool {
		self.numeric.is_empty() && self.categorical.is_empty()
	}

	/// Keep only the columns named in `selected`.
	pub fn retain(&self, selected: &[String]) -> ColumnRoles {
		let keep = |names: &[String]| -> Vec<String> {
			names
				.iter()
				.filter(|name| selected.contains(name))
				.cloned()
				.collect()
		};
		ColumnRoles {
			numeric: keep(&self.numeric),
			categorical: keep(&self.categorical),
		}
	}
}

/// Assign each column of `dataframe` to the numeric or categorical role according to its kind. The numeric set is checked first, so a kind listed in both sets is numeric.
pub fn detect_column_types(dataframe: &DataFrameView, type_sets: &ColumnTypeSets) -> ColumnRoles {
	let mut roles = ColumnRoles::default();
	for column in dataframe.columns.iter() {
		let kind = column.kind();
		if type_sets.numeric.contains(&kind) {
			roles.numeric.push(column.name().to_owned());
		} else if type_sets.categorical.contains(&kind) {
			roles.categorical.push(column.name().to_owned());
		}
	}
	roles
}

#[test]
fn test_detect_column_types() {
	let dataframe = crate::test_dataframe();
	let roles = detect_column_types(&dataframe.view(), &ColumnTypeSets::default());
	assert_eq!(roles.numeric, vec!["age".to_owned(), "income".to_owned()]);
	assert_eq!(roles.categorical, vec!["color".to_owned(), "note".to_owned()]);
}

#[test]
fn test_detect_column_types_custom_sets() {
	let dataframe = crate::test_dataframe();
	let type_sets = ColumnTypeSets {
		numeric: vec![],
		categorical: vec![ColumnKind::Number, ColumnKind::Enum],
	};
	let roles = detect_column_types(&dataframe.view(), &type_sets);
	assert!(roles.numeric.is_empty());
	assert_eq!(
		roles.categorical,
		vec!["age".to_owned(), "color".to_owned(), "income".to_owned()]
	);
}
