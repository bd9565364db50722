use super::*;
use anyhow::{format_err, Result};
use fnv::FnvHashMap;
use itertools::izip;
use std::{
	collections::{BTreeMap, BTreeSet},
	path::Path,
};

#[derive(Clone)]
pub struct FromCsvOptions<'a> {
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub infer_options: InferOptions,
	pub invalid_values: &'a [&'a str],
}

impl<'a> Default for FromCsvOptions<'a> {
	fn default() -> Self {
		Self {
			column_types: None,
			infer_options: InferOptions::default(),
			invalid_values: DEFAULT_INVALID_VALUES,
		}
	}
}

#[derive(Clone, Debug)]
pub struct InferOptions {
	/// A column whose values do not all parse as numbers is inferred as an enum column if it has at most this many unique values, and as a text column otherwise.
	pub enum_max_unique_values: usize,
}

impl Default for InferOptions {
	fn default() -> Self {
		Self {
			enum_max_unique_values: 100,
		}
	}
}

/// These values are the default values that are considered missing.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

/// The file extensions `DataFrame::from_path` knows how to read.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv"];

impl DataFrame {
	/// Load a dataframe from a csv file. Files with any other extension are rejected before they are opened.
	pub fn from_path(path: &Path, options: FromCsvOptions) -> Result<Self> {
		let extension = path
			.extension()
			.and_then(|extension| extension.to_str())
			.map(|extension| extension.to_lowercase());
		match extension.as_deref() {
			Some(extension) if SUPPORTED_EXTENSIONS.contains(&extension) => {}
			_ => {
				return Err(format_err!(
					"unsupported file format for {}, expected one of: {}",
					path.display(),
					SUPPORTED_EXTENSIONS.join(", ")
				))
			}
		}
		Self::from_csv(&mut csv::Reader::from_path(path)?, options)
	}

	pub fn from_csv<R>(reader: &mut csv::Reader<R>, options: FromCsvOptions) -> Result<Self>
	where
		R: std::io::Read + std::io::Seek,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let n_columns = column_names.len();
		let start_position = reader.position().clone();
		let infer_options = &options.infer_options;
		let invalid_values = options.invalid_values;
		let mut n_rows = None;

		#[derive(Clone, Debug)]
		enum ColumnTypeOrInferStats<'a> {
			ColumnType(ColumnType),
			InferStats(InferStats<'a>),
		}

		// Retrieve any column types present in the options.
		let mut column_types: Vec<ColumnTypeOrInferStats> = match options.column_types.as_ref() {
			Some(column_types) => column_names
				.iter()
				.map(|column_name| match column_types.get(column_name) {
					Some(column_type) => ColumnTypeOrInferStats::ColumnType(column_type.clone()),
					None => ColumnTypeOrInferStats::InferStats(InferStats::new(
						infer_options,
						invalid_values,
					)),
				})
				.collect(),
			None => vec![
				ColumnTypeOrInferStats::InferStats(InferStats::new(
					infer_options,
					invalid_values
				));
				n_columns
			],
		};

		// Passing over the csv to infer column types is only necessary if one or more columns did not have its type specified.
		let needs_infer = column_types.iter().any(|column_type| {
			matches!(column_type, ColumnTypeOrInferStats::InferStats(_))
		});

		let column_types: Vec<ColumnType> = if needs_infer {
			let mut infer_stats: Vec<(usize, &mut InferStats)> = column_types
				.iter_mut()
				.enumerate()
				.filter_map(|(index, column_type)| match column_type {
					ColumnTypeOrInferStats::ColumnType(_) => None,
					ColumnTypeOrInferStats::InferStats(infer_stats) => Some((index, infer_stats)),
				})
				.collect();
			let mut record = csv::StringRecord::new();
			let mut n_rows_computed = 0;
			while reader.read_record(&mut record)? {
				n_rows_computed += 1;
				for (index, infer_stats) in infer_stats.iter_mut() {
					let value = record.get(*index).ok_or_else(|| {
						format_err!("row {} has too few fields", n_rows_computed)
					})?;
					infer_stats.update(value);
				}
			}
			n_rows = Some(n_rows_computed);
			let column_types = column_types
				.into_iter()
				.map(|column_type| match column_type {
					ColumnTypeOrInferStats::ColumnType(column_type) => column_type,
					ColumnTypeOrInferStats::InferStats(infer_stats) => infer_stats.finalize(),
				})
				.collect();
			// After inference, return back to the beginning of the csv to load the values.
			reader.seek(start_position)?;
			column_types
		} else {
			column_types
				.into_iter()
				.filter_map(|column_type| match column_type {
					ColumnTypeOrInferStats::ColumnType(column_type) => Some(column_type),
					ColumnTypeOrInferStats::InferStats(_) => None,
				})
				.collect()
		};

		let mut dataframe = Self::new(column_names, column_types);
		if let Some(n_rows) = n_rows {
			for column in dataframe.columns.iter_mut() {
				match column {
					Column::Unknown(_) => {}
					Column::Number(column) => column.data.reserve_exact(n_rows),
					Column::Enum(column) => column.data.reserve_exact(n_rows),
					Column::Text(column) => column.data.reserve_exact(n_rows),
				}
			}
		}
		// Enum values are looked up by option, so build a map from option to index for each enum column.
		let enum_options_maps: Vec<Option<FnvHashMap<String, usize>>> = dataframe
			.columns
			.iter()
			.map(|column| {
				column.as_enum().map(|column| {
					column
						.options
						.iter()
						.enumerate()
						.map(|(index, option)| (option.clone(), index))
						.collect()
				})
			})
			.collect();
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			for (column, options_map, value) in izip!(
				dataframe.columns.iter_mut(),
				enum_options_maps.iter(),
				record.iter()
			) {
				let is_invalid = invalid_values.contains(&value);
				match column {
					Column::Unknown(column) => {
						column.len += 1;
					}
					Column::Number(column) => {
						let value = match lexical::parse::<f32, _>(value) {
							Ok(value) if value.is_finite() && !is_invalid => value,
							_ => std::f32::NAN,
						};
						column.data.push(value);
					}
					Column::Enum(column) => {
						let value = options_map
							.as_ref()
							.and_then(|options_map| options_map.get(value))
							.and_then(|index| NonZeroUsize::new(index + 1));
						column.data.push(value);
					}
					Column::Text(column) => {
						let value = if is_invalid {
							None
						} else {
							Some(value.to_owned())
						};
						column.data.push(value);
					}
				}
			}
		}
		log::debug!(
			"loaded {} rows and {} columns",
			dataframe.nrows(),
			dataframe.ncols()
		);
		Ok(dataframe)
	}
}

#[derive(Clone, Debug)]
pub struct InferStats<'a> {
	infer_options: &'a InferOptions,
	invalid_values: &'a [&'a str],
	column_type: InferColumnType,
	unique_values: Option<BTreeSet<String>>,
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum InferColumnType {
	Unknown,
	Number,
	Enum,
	Text,
}

impl<'a> InferStats<'a> {
	pub fn new(infer_options: &'a InferOptions, invalid_values: &'a [&'a str]) -> Self {
		Self {
			infer_options,
			invalid_values,
			column_type: InferColumnType::Unknown,
			unique_values: Some(BTreeSet::new()),
		}
	}

	pub fn update(&mut self, value: &str) {
		if self.invalid_values.contains(&value) {
			return;
		}
		if let Some(unique_values) = self.unique_values.as_mut() {
			if !unique_values.contains(value) {
				unique_values.insert(value.to_owned());
			}
			if unique_values.len() > self.infer_options.enum_max_unique_values {
				self.unique_values = None;
			}
		}
		match self.column_type {
			InferColumnType::Unknown | InferColumnType::Number => {
				if lexical::parse::<f32, _>(value)
					.map(|value| value.is_finite())
					.unwrap_or(false)
				{
					self.column_type = InferColumnType::Number;
				} else if self.unique_values.is_some() {
					self.column_type = InferColumnType::Enum;
				} else {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Enum => {
				if self.unique_values.is_none() {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Text => {}
		}
	}

	pub fn finalize(self) -> ColumnType {
		match (self.column_type, self.unique_values) {
			(InferColumnType::Unknown, _) => ColumnType::Unknown,
			(InferColumnType::Number, _) => ColumnType::Number,
			(InferColumnType::Enum, Some(unique_values)) => ColumnType::Enum {
				options: unique_values.into_iter().collect(),
			},
			(InferColumnType::Enum, None) | (InferColumnType::Text, _) => ColumnType::Text,
		}
	}
}

#[test]
fn test_infer() {
	let csv = r#"number,enum,text,empty
1,test,hello,
2,test,world,?
,,,
"#;
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: None,
			infer_options: InferOptions {
				enum_max_unique_values: 1,
			},
			..Default::default()
		},
	)
	.unwrap();
	insta::assert_debug_snapshot!(df, @r###"
 DataFrame {
     columns: [
         Number(
             NumberColumn {
                 name: "number",
                 data: [
                     1.0,
                     2.0,
                     NaN,
                 ],
             },
         ),
         Enum(
             EnumColumn {
                 name: "enum",
                 options: [
                     "test",
                 ],
                 data: [
                     Some(
                         1,
                     ),
                     Some(
                         1,
                     ),
                     None,
                 ],
             },
         ),
         Text(
             TextColumn {
                 name: "text",
                 data: [
                     Some(
                         "hello",
                     ),
                     Some(
                         "world",
                     ),
                     None,
                 ],
             },
         ),
         Unknown(
             UnknownColumn {
                 name: "empty",
                 len: 3,
             },
         ),
     ],
 }
 "###);
}

#[test]
fn test_column_types() {
	let csv = r#"number,text,enum
1,test,hello
2,test,world
"#;
	let mut column_types = BTreeMap::new();
	column_types.insert("text".to_owned(), ColumnType::Text);
	column_types.insert(
		"enum".to_owned(),
		ColumnType::Enum {
			options: vec!["hello".to_owned(), "world".to_owned()],
		},
	);
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: Some(column_types),
			infer_options: InferOptions {
				enum_max_unique_values: 2,
			},
			..Default::default()
		},
	)
	.unwrap();
	assert_eq!(df.column("number").map(|c| c.kind()), Some(ColumnKind::Number));
	assert_eq!(df.column("text").map(|c| c.kind()), Some(ColumnKind::Text));
	let column = df.column("enum").and_then(|c| c.as_enum()).unwrap();
	assert_eq!(
		column.data,
		vec![NonZeroUsize::new(1), NonZeroUsize::new(2)]
	);
}

#[test]
fn test_unsupported_extension() {
	let error = DataFrame::from_path(Path::new("data.xlsx"), FromCsvOptions::default())
		.unwrap_err();
	assert!(error.to_string().contains("unsupported file format"));
}
