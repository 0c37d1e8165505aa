//! Bucketing Rules
//! Discretizes continuous price and rating values into fixed named ranges.

/// A named half-open range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

impl Bucket {
    pub const fn new(name: &'static str, min: f64, max: f64) -> Self {
        Self { name, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

pub const PRICE_BUCKETS: [Bucket; 4] = [
    Bucket::new("Low ($0-50)", 0.0, 50.0),
    Bucket::new("Medium ($50-100)", 50.0, 100.0),
    Bucket::new("High ($100-200)", 100.0, 200.0),
    Bucket::new("Premium ($200+)", 200.0, f64::INFINITY),
];

pub const RATING_BUCKETS: [Bucket; 3] = [
    Bucket::new("Low (0-3)", 0.0, 3.0),
    Bucket::new("Medium (3-4)", 3.0, 4.0),
    Bucket::new("High (4-5)", 4.0, 5.0),
];

/// Index of the first bucket containing `value`.
///
/// NaN never matches, so rows with a missing value drop out of the stage.
pub fn bucket_index(buckets: &[Bucket], value: f64) -> Option<usize> {
    buckets.iter().position(|b| b.contains(value))
}

pub fn price_bucket(price: f64) -> Option<usize> {
    bucket_index(&PRICE_BUCKETS, price)
}

pub fn rating_bucket(rating: f64) -> Option<usize> {
    bucket_index(&RATING_BUCKETS, rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_scenario() {
        assert_eq!(price_bucket(10.0), Some(0));
        assert_eq!(price_bucket(60.0), Some(1));
        assert_eq!(price_bucket(210.0), Some(3));
    }

    #[test]
    fn test_upper_bound_goes_to_next_range() {
        assert_eq!(price_bucket(50.0), Some(1));
        assert_eq!(price_bucket(100.0), Some(2));
        assert_eq!(price_bucket(200.0), Some(3));
        assert_eq!(rating_bucket(3.0), Some(1));
        assert_eq!(rating_bucket(4.0), Some(2));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(price_bucket(f64::NAN), None);
        assert_eq!(price_bucket(-1.0), None);
        assert_eq!(rating_bucket(5.0), None);
        assert_eq!(rating_bucket(f64::NAN), None);
    }

    #[test]
    fn test_assignment_is_pure() {
        for v in [0.0, 3.0, 3.99, 4.5, 42.0] {
            assert_eq!(rating_bucket(v), rating_bucket(v));
            assert_eq!(price_bucket(v), price_bucket(v));
        }
    }
}
