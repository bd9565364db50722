use super::Metric;

/// The median of the non-NaN values, or `None` if there are none. For an even number of values, it is the mean of the two middle values.
pub struct Median;

impl<'a> Metric<'a> for Median {
	type Input = &'a [f32];
	type Output = Option<f32>;
	fn compute(input: Self::Input) -> Self::Output {
		let mut values: Vec<f32> = input.iter().cloned().filter(|v| !v.is_nan()).collect();
		values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
		quantile(&values, 0.5)
	}
}

/// Compute the `q` quantile of `sorted_values` using linear interpolation between the closest ranks. `sorted_values` must be sorted ascending and contain no NaN.
pub fn quantile(sorted_values: &[f32], q: f32) -> Option<f32> {
	if sorted_values.is_empty() {
		return None;
	}
	let last = sorted_values.len() - 1;
	let position = f64::from(q) * last as f64;
	let lower = (position.floor() as usize).min(last);
	let upper = (position.ceil() as usize).min(last);
	let fraction = (position - lower as f64) as f32;
	let lower_value = sorted_values[lower];
	let upper_value = sorted_values[upper];
	Some(lower_value + (upper_value - lower_value) * fraction)
}

#[test]
fn test_median() {
	assert_eq!(Median::compute(&[3.0, 1.0, f32::NAN, 2.0]), Some(2.0));
	assert_eq!(Median::compute(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
	assert_eq!(Median::compute(&[f32::NAN]), None);
}

#[test]
fn test_quantile() {
	let values = [1.0, 2.0, 3.0, 4.0, 5.0];
	assert_eq!(quantile(&values, 0.25), Some(2.0));
	assert_eq!(quantile(&values, 0.0), Some(1.0));
	assert_eq!(quantile(&values, 1.0), Some(5.0));
	assert_eq!(quantile(&[1.0, 2.0], 0.25), Some(1.25));
}

#[test]
fn test_quantile_large_input() {
	// As an f32, the last index rounds up to the length.
	let values = vec![1.0; (1 << 24) + 4];
	assert_eq!(quantile(&values, 1.0), Some(1.0));
	assert_eq!(quantile(&values, 0.5), Some(1.0));
}
