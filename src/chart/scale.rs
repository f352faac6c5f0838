//! Linear scales mapping data values to pixel coordinates.

/// Affine map from a data domain to a pixel range.
///
/// Output is always clamped into the range. A degenerate domain
/// (`min == max`) maps every value to the start of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Whether the domain has no extent
    pub fn is_degenerate(&self) -> bool {
        let (d0, d1) = self.domain;
        !d0.is_finite() || !d1.is_finite() || (d1 - d0).abs() < f64::EPSILON
    }

    /// Map a domain value to the range
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;

        if self.is_degenerate() || !value.is_finite() {
            return r0;
        }

        let t = (value - d0) / (d1 - d0);
        let mapped = r0 + t * (r1 - r0);
        mapped.clamp(r0.min(r1), r0.max(r1))
    }

    /// `count` equal intervals over the domain, as `count + 1` boundary values.
    /// A degenerate domain yields its single value.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        if count == 0 || self.is_degenerate() {
            return vec![d0];
        }

        (0..=count)
            .map(|i| d0 + (d1 - d0) * i as f64 / count as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_endpoints() {
        let scale = LinearScale::new((10.0, 20.0), (0.0, 400.0));
        assert_eq!(scale.map(10.0), 0.0);
        assert_eq!(scale.map(15.0), 200.0);
        assert_eq!(scale.map(20.0), 400.0);
    }

    #[test]
    fn test_inverted_range() {
        let scale = LinearScale::new((0.0, 100.0), (300.0, 0.0));
        assert_eq!(scale.map(0.0), 300.0);
        assert_eq!(scale.map(100.0), 0.0);
        assert_eq!(scale.map(25.0), 225.0);
    }

    #[test]
    fn test_clamped_to_range() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(scale.map(-5.0), 0.0);
        assert_eq!(scale.map(50.0), 100.0);
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 640.0));
        assert!(scale.is_degenerate());
        assert_eq!(scale.map(5.0), 0.0);
        assert_eq!(scale.ticks(5), vec![5.0]);

        let baseline = LinearScale::new((0.0, 0.0), (550.0, 0.0));
        assert_eq!(baseline.map(0.0), 550.0);
    }

    #[test]
    fn test_monotonic() {
        let scale = LinearScale::new((1_700_000_000_000.0, 1_710_000_000_000.0), (0.0, 680.0));
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=100 {
            let t = 1_699_000_000_000.0 + step as f64 * 120_000_000.0;
            let x = scale.map(t);
            assert!(x >= previous, "scale decreased at step {}", step);
            previous = x;
        }
    }

    #[test]
    fn test_ticks() {
        let scale = LinearScale::new((0.0, 1000.0), (0.0, 1.0));
        assert_eq!(scale.ticks(5), vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]);
        assert_eq!(scale.ticks(0), vec![0.0]);
    }
}
