use super::Metric;
use std::collections::BTreeMap;

/// The most frequent value and its count. Ties are broken in favor of the smallest value, so the result does not depend on input order.
pub struct Mode;

#[derive(Debug, Clone, PartialEq)]
pub struct ModeOutput<'a> {
	pub value: &'a str,
	pub count: usize,
}

impl<'a> Metric<'a> for Mode {
	type Input = &'a [&'a str];
	type Output = Option<ModeOutput<'a>>;
	fn compute(input: Self::Input) -> Self::Output {
		let mut histogram: BTreeMap<&str, usize> = BTreeMap::new();
		for value in input.iter() {
			*histogram.entry(*value).or_insert(0) += 1;
		}
		// The histogram iterates in ascending order, so only replace the best on a strictly greater count.
		histogram
			.into_iter()
			.fold(None::<ModeOutput<'a>>, |best, (value, count)| match best {
				Some(best) if best.count >= count => Some(best),
				_ => Some(ModeOutput { value, count }),
			})
	}
}

#[test]
fn test_mode() {
	let values = ["b", "a", "b", "a", "c"];
	assert_eq!(
		Mode::compute(&values),
		Some(ModeOutput {
			value: "a",
			count: 2
		})
	);
	assert_eq!(Mode::compute(&[]), None);
}
