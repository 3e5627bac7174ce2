use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;

/// Source of a per-frame shader parameter.
///
/// A provider is evaluated once per frame. `Dynamic` providers may return a
/// different value on every call, so callers must never cache a value across
/// frames expecting it to be stable.
pub enum Provider {
    Constant(f32),
    Dynamic(Box<dyn FnMut() -> f32>),
}

impl Provider {
    pub fn constant(value: f32) -> Self {
        Self::Constant(value)
    }

    pub fn dynamic(f: impl FnMut() -> f32 + 'static) -> Self {
        Self::Dynamic(Box::new(f))
    }

    /// Uniformly random value in `[lo, hi]` on every call.
    ///
    /// A degenerate or inverted range collapses to a constant `lo`.
    pub fn uniform(lo: f32, hi: f32, mut rng: StdRng) -> Self {
        if !(hi > lo) {
            return Self::Constant(lo);
        }
        Self::dynamic(move || rng.gen_range(lo..=hi))
    }

    /// Evaluate the provider. Non-finite results are replaced by `0.0`.
    pub fn value(&mut self) -> f32 {
        let v = match self {
            Self::Constant(v) => *v,
            Self::Dynamic(f) => f(),
        };
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    /// Evaluate and clamp to `>= 0`, for timings and counts.
    pub fn value_non_negative(&mut self) -> f32 {
        self.value().max(0.0)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }
}

impl From<f32> for Provider {
    fn from(value: f32) -> Self {
        Self::Constant(value)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "Constant({v})"),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn constant_returns_same_value() {
        let mut p = Provider::constant(0.25);
        assert_eq!(p.value(), 0.25);
        assert_eq!(p.value(), 0.25);
        assert!(p.is_constant());
    }

    #[test]
    fn dynamic_is_called_every_time() {
        let mut n = 0.0;
        let mut p = Provider::dynamic(move || {
            n += 1.0;
            n
        });
        assert_eq!(p.value(), 1.0);
        assert_eq!(p.value(), 2.0);
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut p = Provider::uniform(0.7, 1.1, StdRng::seed_from_u64(3));
        for _ in 0..500 {
            let v = p.value();
            assert!((0.7..=1.1).contains(&v), "{v}");
        }
    }

    #[test]
    fn inverted_range_collapses_to_constant() {
        let p = Provider::uniform(2.0, 1.0, StdRng::seed_from_u64(3));
        assert!(p.is_constant());
    }

    #[test]
    fn malformed_values_are_sanitized() {
        let mut nan = Provider::dynamic(|| f32::NAN);
        assert_eq!(nan.value(), 0.0);
        let mut neg = Provider::constant(-4.0);
        assert_eq!(neg.value_non_negative(), 0.0);
    }
}
