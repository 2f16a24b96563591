pub mod insights;
pub mod period;
pub mod summary;
pub mod trends;

pub use insights::wellness_insights;
pub use period::{Granularity, Period};
pub use summary::dashboard_summary;
pub use trends::mood_trends;

/// Average of the values that are present, matching SQL AVG over a nullable
/// column: an empty input yields None, never NaN.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut count = 0u32;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::mean;

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn mean_averages_what_it_gets() {
        assert_eq!(mean([2.0, 4.0, 6.0].into_iter()), Some(4.0));
        assert_eq!(mean([5.0].into_iter()), Some(5.0));
    }
}
