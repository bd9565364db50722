/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. It only implements what sapling needs: loading a csv with column type inference, selecting columns by name, reordering rows, and splitting rows into train and test views.

Missing values are represented per column type: `NaN` in number columns and `None` in enum and text columns.
*/

#![allow(clippy::tabs_in_doc_comments)]

use std::num::NonZeroUsize;

pub mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrameView<'a> {
	pub columns: Vec<ColumnView<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Unknown(UnknownColumn),
	Number(NumberColumn),
	Enum(EnumColumn),
	Text(TextColumn),
}

/// An unknown column has no valid values, so only its length is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumn {
	pub name: String,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// Values are 1-based indexes into `options`, so that `None` can represent a missing value without growing the size of each element.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnView<'a> {
	Unknown(UnknownColumnView<'a>),
	Number(NumberColumnView<'a>),
	Enum(EnumColumnView<'a>),
	Text(TextColumnView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumnView<'a> {
	pub name: &'a str,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumnView<'a> {
	pub name: &'a str,
	pub options: &'a [String],
	pub data: &'a [Option<NonZeroUsize>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [Option<String>],
}

/// The type of a column, including the options for enum columns. This is used to construct a dataframe and to override type inference when loading a csv.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Unknown,
	Number,
	Enum { options: Vec<String> },
	Text,
}

/// The storage kind of a column without any of its data. Sets of kinds decide which columns are treated as numeric or categorical features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
pub enum ColumnKind {
	#[serde(rename = "unknown")]
	Unknown,
	#[serde(rename = "number")]
	Number,
	#[serde(rename = "enum")]
	Enum,
	#[serde(rename = "text")]
	Text,
}

impl std::fmt::Display for ColumnKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ColumnKind::Unknown => "unknown",
			ColumnKind::Number => "number",
			ColumnKind::Enum => "enum",
			ColumnKind::Text => "text",
		};
		write!(f, "{}", s)
	}
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Unknown => Column::Unknown(UnknownColumn::new(column_name)),
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}

	pub fn view(&self) -> DataFrameView {
		let columns = self.columns.iter().map(|column| column.view()).collect();
		DataFrameView { columns }
	}

	/// Build a new dataframe containing the rows at `indices`, in that order.
	pub fn take_rows(&self, indices: &[usize]) -> DataFrame {
		let columns = self
			.columns
			.iter()
			.map(|column| column.take_rows(indices))
			.collect();
		DataFrame { columns }
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn kind(&self) -> ColumnKind {
		match self {
			Self::Unknown(_) => ColumnKind::Unknown,
			Self::Number(_) => ColumnKind::Number,
			Self::Enum(_) => ColumnKind::Enum,
			Self::Text(_) => ColumnKind::Text,
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn view(&self) -> ColumnView {
		match self {
			Self::Unknown(column) => ColumnView::Unknown(column.view()),
			Self::Number(column) => ColumnView::Number(column.view()),
			Self::Enum(column) => ColumnView::Enum(column.view()),
			Self::Text(column) => ColumnView::Text(column.view()),
		}
	}

	fn take_rows(&self, indices: &[usize]) -> Column {
		match self {
			Self::Unknown(column) => Column::Unknown(UnknownColumn {
				name: column.name.clone(),
				len: indices.len(),
			}),
			Self::Number(column) => Column::Number(NumberColumn {
				name: column.name.clone(),
				data: indices.iter().map(|index| column.data[*index]).collect(),
			}),
			Self::Enum(column) => Column::Enum(EnumColumn {
				name: column.name.clone(),
				options: column.options.clone(),
				data: indices.iter().map(|index| column.data[*index]).collect(),
			}),
			Self::Text(column) => Column::Text(TextColumn {
				name: column.name.clone(),
				data: indices
					.iter()
					.map(|index| column.data[*index].clone())
					.collect(),
			}),
		}
	}
}

impl UnknownColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}

	pub fn view(&self) -> UnknownColumnView {
		UnknownColumnView {
			name: &self.name,
			len: self.len,
		}
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> NumberColumnView {
		NumberColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> EnumColumnView {
		EnumColumnView {
			name: &self.name,
			data: &self.data,
			options: &self.options,
		}
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> TextColumnView {
		TextColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl<'a> DataFrameView<'a> {
	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column(&self, name: &str) -> Option<&ColumnView<'a>> {
		self.columns.iter().find(|column| column.name() == name)
	}

	/// Return a view without the column named `column_name`.
	pub fn without(&self, column_name: &str) -> DataFrameView<'a> {
		let columns = self
			.columns
			.iter()
			.filter(|column| column.name() != column_name)
			.cloned()
			.collect();
		DataFrameView { columns }
	}

	pub fn split_at_row(&self, index: usize) -> (Self, Self) {
		let iter = self.columns.iter().map(|column| column.split_at_row(index));
		let mut columns_a = Vec::with_capacity(self.columns.len());
		let mut columns_b = Vec::with_capacity(self.columns.len());
		for (column_a, column_b) in iter {
			columns_a.push(column_a);
			columns_b.push(column_b);
		}
		(Self { columns: columns_a }, Self { columns: columns_b })
	}
}

impl<'a> ColumnView<'a> {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &'a str {
		match self {
			Self::Unknown(s) => s.name,
			Self::Number(s) => s.name,
			Self::Enum(s) => s.name,
			Self::Text(s) => s.name,
		}
	}

	pub fn kind(&self) -> ColumnKind {
		match self {
			Self::Unknown(_) => ColumnKind::Unknown,
			Self::Number(_) => ColumnKind::Number,
			Self::Enum(_) => ColumnKind::Enum,
			Self::Text(_) => ColumnKind::Text,
		}
	}

	pub fn as_number(&self) -> Option<NumberColumnView<'a>> {
		match self {
			Self::Number(s) => Some(s.clone()),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<EnumColumnView<'a>> {
		match self {
			Self::Enum(s) => Some(s.clone()),
			_ => None,
		}
	}

	/// Return true if the value at `index` is missing. Every value in an unknown column is missing.
	pub fn is_missing(&self, index: usize) -> bool {
		match self {
			Self::Unknown(_) => true,
			Self::Number(column) => column.data[index].is_nan(),
			Self::Enum(column) => column.data[index].is_none(),
			Self::Text(column) => column.data[index].is_none(),
		}
	}

	pub fn missing_count(&self) -> usize {
		(0..self.len()).filter(|index| self.is_missing(*index)).count()
	}

	/// Format the value at `index` as a string, or return `None` if it is missing.
	pub fn display_value(&self, index: usize) -> Option<String> {
		match self {
			Self::Unknown(_) => None,
			Self::Number(column) => {
				let value = column.data[index];
				if value.is_nan() {
					None
				} else {
					Some(value.to_string())
				}
			}
			Self::Enum(column) => column.data[index]
				.map(|value| column.options[value.get() - 1].clone()),
			Self::Text(column) => column.data[index].clone(),
		}
	}

	pub fn split_at_row(&self, index: usize) -> (Self, Self) {
		match self {
			ColumnView::Unknown(column) => (
				ColumnView::Unknown(UnknownColumnView {
					name: column.name,
					len: index,
				}),
				ColumnView::Unknown(UnknownColumnView {
					name: column.name,
					len: column.len - index,
				}),
			),
			ColumnView::Number(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Number(NumberColumnView {
						name: column.name,
						data: data_a,
					}),
					ColumnView::Number(NumberColumnView {
						name: column.name,
						data: data_b,
					}),
				)
			}
			ColumnView::Enum(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Enum(EnumColumnView {
						name: column.name,
						options: column.options,
						data: data_a,
					}),
					ColumnView::Enum(EnumColumnView {
						name: column.name,
						options: column.options,
						data: data_b,
					}),
				)
			}
			ColumnView::Text(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Text(TextColumnView {
						name: column.name,
						data: data_a,
					}),
					ColumnView::Text(TextColumnView {
						name: column.name,
						data: data_b,
					}),
				)
			}
		}
	}
}

#[test]
fn test_take_rows_and_split() {
	let mut dataframe = DataFrame::new(
		vec!["x".to_owned(), "color".to_owned()],
		vec![
			ColumnType::Number,
			ColumnType::Enum {
				options: vec!["red".to_owned(), "blue".to_owned()],
			},
		],
	);
	if let Column::Number(column) = &mut dataframe.columns[0] {
		column.data = vec![1.0, 2.0, f32::NAN];
	}
	if let Column::Enum(column) = &mut dataframe.columns[1] {
		column.data = vec![NonZeroUsize::new(1), None, NonZeroUsize::new(2)];
	}
	let reordered = dataframe.take_rows(&[2, 0, 1]);
	let view = reordered.view();
	let (train, test) = view.split_at_row(2);
	assert_eq!(train.nrows(), 2);
	assert_eq!(test.nrows(), 1);
	let color = train.column("color").unwrap();
	assert_eq!(color.display_value(0), Some("blue".to_owned()));
	assert_eq!(color.display_value(1), Some("red".to_owned()));
	assert!(train.column("x").unwrap().is_missing(0));
	assert_eq!(test.column("color").unwrap().missing_count(), 1);
}
