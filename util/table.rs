/*!
This module renders plain text tables for terminal output, used for the descriptive statistics and metrics reports.

```text
| column | count | mean |
|--------|-------|------|
| age    | 10    | 31.5 |
```
*/

use itertools::izip;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
	Left,
	Right,
}

#[derive(Debug)]
pub struct Table {
	padding: usize,
	header: Vec<String>,
	rows: Vec<Vec<String>>,
	align: Vec<Align>,
}

impl Table {
	pub fn new(header: Vec<String>) -> Table {
		let align = vec![Align::Left; header.len()];
		Table {
			padding: 1,
			header,
			rows: Vec::new(),
			align,
		}
	}

	/// Right align every column except the first, which usually holds a label.
	pub fn numeric(mut self) -> Table {
		for align in self.align.iter_mut().skip(1) {
			*align = Align::Right;
		}
		self
	}

	/// Rows shorter than the header are padded with empty cells.
	pub fn push_row(&mut self, mut row: Vec<String>) {
		row.resize(self.header.len(), String::new());
		self.rows.push(row);
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	fn column_widths(&self) -> Vec<usize> {
		let mut column_widths: Vec<usize> = self
			.header
			.iter()
			.map(|header| header.chars().count())
			.collect();
		for row in self.rows.iter() {
			for (column_width, value) in izip!(column_widths.iter_mut(), row.iter()) {
				*column_width = usize::max(*column_width, value.chars().count());
			}
		}
		column_widths
	}

	fn write_row(
		&self,
		f: &mut std::fmt::Formatter<'_>,
		column_widths: &[usize],
		values: &[String],
	) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, align, value) in izip!(column_widths, &self.align, values) {
			let fill = column_width - value.chars().count();
			let (left, right) = match align {
				Align::Left => (self.padding, fill + self.padding),
				Align::Right => (fill + self.padding, self.padding),
			};
			write!(f, "{}{}{}|", " ".repeat(left), value, " ".repeat(right))?;
		}
		writeln!(f)
	}
}

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let column_widths = self.column_widths();
		self.write_row(f, &column_widths, &self.header)?;
		write!(f, "|")?;
		for column_width in column_widths.iter() {
			write!(f, "{}|", "-".repeat(column_width + 2 * self.padding))?;
		}
		writeln!(f)?;
		for row in self.rows.iter() {
			self.write_row(f, &column_widths, row)?;
		}
		Ok(())
	}
}

#[test]
fn test_table() {
	let mut table = Table::new(vec!["column".to_owned(), "count".to_owned()]).numeric();
	table.push_row(vec!["age".to_owned(), "10".to_owned()]);
	table.push_row(vec!["name".to_owned()]);
	let expected = "\
| column | count |
|--------|-------|
| age    |    10 |
| name   |       |
";
	assert_eq!(table.to_string(), expected);
}
