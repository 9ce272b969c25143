//! Linear data-to-pixel mapping.

/// Maps a data interval onto a pixel interval. The range may be inverted
/// (SVG y grows downward, so vertical scales run high-to-low).
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps `x` from the domain onto the range. A degenerate domain
    /// (zero width) maps everything to the range midpoint.
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (x - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_endpoints_to_range() {
        let s = LinearScale::new((0.0, 10.0), (100.0, 200.0));
        assert_eq!(s.apply(0.0), 100.0);
        assert_eq!(s.apply(10.0), 200.0);
        assert_eq!(s.apply(5.0), 150.0);
    }

    #[test]
    fn inverted_range_flips_direction() {
        // A y-scale: larger data values land higher on screen (smaller y).
        let s = LinearScale::new((0.0, 1.0), (400.0, 0.0));
        assert_eq!(s.apply(0.0), 400.0);
        assert_eq!(s.apply(1.0), 0.0);
        assert_eq!(s.apply(0.25), 300.0);
    }

    #[test]
    fn extrapolates_outside_domain() {
        let s = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(s.apply(-1.0), -10.0);
        assert_eq!(s.apply(11.0), 110.0);
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let s = LinearScale::new((5.0, 5.0), (0.0, 100.0));
        assert_eq!(s.apply(5.0), 50.0);
        assert_eq!(s.apply(999.0), 50.0);
    }
}
