/*!
This module provides the `Finite` type, an `f32` that is known to be neither infinite nor NaN. Because of that guarantee it can implement `Eq`, `Ord`, and `Hash`, which makes it usable as a key in sets and maps, for example to count the distinct values in a number column.

```
use sapling_util::finite::Finite;

let n = Finite::new(1.0).unwrap();
assert!(Finite::new(n.get() / 0.0).is_err());
```
*/

use std::{
	cmp::Ordering,
	collections::BTreeSet,
	hash::{Hash, Hasher},
};
use thiserror::Error;

#[derive(Clone, Copy, Debug)]
pub struct Finite(f32);

/// This error is returned when constructing a `Finite` from an infinite or NaN value.
#[derive(Debug, Error, PartialEq)]
#[error("{0} is not finite")]
pub struct NotFiniteError(pub f32);

impl Finite {
	pub fn new(value: f32) -> Result<Finite, NotFiniteError> {
		if value.is_finite() {
			Ok(Finite(value))
		} else {
			Err(NotFiniteError(value))
		}
	}

	pub fn get(self) -> f32 {
		self.0
	}
}

impl std::fmt::Display for Finite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl PartialEq for Finite {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl Eq for Finite {}

impl PartialOrd for Finite {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Finite {
	fn cmp(&self, other: &Self) -> Ordering {
		// Neither value can be NaN, so `partial_cmp` always returns `Some`.
		self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
	}
}

impl Hash for Finite {
	fn hash<H: Hasher>(&self, state: &mut H) {
		// 0.0 and -0.0 compare equal, so they must hash equally.
		let value = if self.0 == 0.0 { 0.0f32 } else { self.0 };
		value.to_bits().hash(state);
	}
}

/// Collect the distinct finite values in `values` in ascending order. NaN and infinite values are skipped.
pub fn distinct_values(values: &[f32]) -> BTreeSet<Finite> {
	values
		.iter()
		.filter_map(|value| Finite::new(*value).ok())
		.collect()
}

#[test]
fn test_distinct_values() {
	let values = [1.0, 2.0, f32::NAN, 1.0, f32::INFINITY, -0.0, 0.0];
	let distinct: Vec<f32> = distinct_values(&values)
		.into_iter()
		.map(|value| value.get())
		.collect();
	assert_eq!(distinct.len(), 3);
	assert_eq!(distinct[1..], [1.0, 2.0]);
}
