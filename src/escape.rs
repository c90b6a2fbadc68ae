// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Takes a point on the complex plane,
//! repeatedly squares it and adds a constant, and measures how
//! quickly the result runs off past the escape radius.  That
//! "velocity" is the number used to color the pixel.

use num::Complex;

use crate::errors::RenderError;

/// Which end of the recurrence `z = z * z + c` the pixel supplies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelRole {
    /// The pixel is `c`, and iteration starts from the seed.  With a
    /// seed of zero this is the classic Mandelbrot set.
    Constant,
    /// The pixel is the starting `z`, and the seed is `c`.  This is a
    /// Julia set.
    Initial,
}

/// How an iteration count is turned into a normalized score before it
/// reaches the gradient.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Curve {
    /// `k / N`
    Linear,
    /// `sqrt(k / N)`, which spreads out the low counts found far from
    /// the set.
    Sqrt,
}

/// The parameters of an escape-time fractal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FractalParameters {
    /// The fixed half of the recurrence: `z0` when the pixel is `c`,
    /// `c` when the pixel is `z0`.
    pub seed: Complex<f64>,
    /// A point has escaped once `|z| >= escape_radius`.
    pub escape_radius: f64,
    /// The iteration cap.
    pub max_iterations: usize,
    /// What the pixel coordinate stands for.
    pub role: PixelRole,
    /// Count-to-score mapping.
    pub curve: Curve,
}

impl FractalParameters {
    /// The Mandelbrot set: pixels are `c`, `z0` is the seed, scores are
    /// linear.
    pub fn new(
        seed: Complex<f64>,
        escape_radius: f64,
        max_iterations: usize,
    ) -> Result<Self, RenderError> {
        if !(escape_radius > 0.0) || !escape_radius.is_finite() {
            return Err(RenderError::InvalidParameters(format!(
                "escape radius {} must be positive",
                escape_radius
            )));
        }
        if max_iterations == 0 {
            return Err(RenderError::InvalidParameters(
                "the iteration cap must be at least one".to_string(),
            ));
        }
        if !seed.re.is_finite() || !seed.im.is_finite() {
            return Err(RenderError::InvalidParameters(format!("seed {} is not finite", seed)));
        }
        Ok(FractalParameters {
            seed,
            escape_radius,
            max_iterations,
            role: PixelRole::Constant,
            curve: Curve::Linear,
        })
    }

    /// Changes what the pixel coordinate stands for.
    pub fn with_role(self, role: PixelRole) -> Self {
        FractalParameters { role, ..self }
    }

    /// Changes the count-to-score mapping.
    pub fn with_curve(self, curve: Curve) -> Self {
        FractalParameters { curve, ..self }
    }

    /// Run the recurrence for one pixel, arranging `z0` and `c`
    /// according to the pixel role.
    pub fn iterate(&self, pixel: Complex<f64>) -> usize {
        let (z0, c) = match self.role {
            PixelRole::Constant => (self.seed, pixel),
            PixelRole::Initial => (pixel, self.seed),
        };
        escape_time(c, z0, self.escape_radius, self.max_iterations)
    }

    /// The normalized score for one pixel, in [0, 1].
    pub fn score(&self, pixel: Complex<f64>) -> f64 {
        score(self.iterate(pixel), self.max_iterations, self.curve)
    }
}

/// This is our classic iterator function.  Iterates `z = z * z + c`
/// from `z0` and returns the index of the first iteration whose result
/// lands on or outside the escape radius, so a point that escapes on
/// the very first step reports 0.  A `z0` that starts outside the
/// radius also reports 0.  A point still inside after `limit`
/// iterations reports `limit`.
///
/// Because counting starts at 0, a point whose first escaped value is
/// the last one computed (`z` at step `limit`) reports `limit - 1`.
/// That still counts as escaped: only `limit` itself means inside.
pub fn escape_time(c: Complex<f64>, z0: Complex<f64>, radius: f64, limit: usize) -> usize {
    let bound = radius * radius;
    let mut z = z0;
    if z.norm_sqr() >= bound {
        return 0;
    }
    for i in 0..limit {
        z = z * z + c;
        if z.norm_sqr() >= bound {
            return i;
        }
    }
    limit
}

/// Turns an iteration count into a score in [0, 1].  A count that hit
/// the cap is "inside the set" and scores exactly 0.0, so that the
/// interior always takes the first color of the gradient.
pub fn score(iterations: usize, limit: usize, curve: Curve) -> f64 {
    if iterations >= limit {
        return 0.0;
    }
    let v = iterations as f64 / limit as f64;
    match curve {
        Curve::Linear => v,
        Curve::Sqrt => v.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const ZERO: Complex<f64> = Complex { re: 0.0, im: 0.0 };

    #[test]
    fn outside_radius_escapes_immediately() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let r = rng.gen_range(2.0001, 1e3);
            let theta = rng.gen_range(0.0, 2.0 * std::f64::consts::PI);
            let c = Complex::from_polar(&r, &theta);
            assert_eq!(escape_time(c, ZERO, 2.0, 50), 0);
        }
    }

    #[test]
    fn start_outside_radius_reports_zero() {
        assert_eq!(escape_time(ZERO, Complex::new(3.0, 0.0), 2.0, 50), 0);
    }

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(ZERO, ZERO, 2.0, 50), 50);
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), ZERO, 2.0, 1000), 1000);
    }

    #[test]
    fn counts_stay_within_the_cap() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2000 {
            let c = Complex::new(rng.gen_range(-2.5, 1.5), rng.gen_range(-1.5, 1.5));
            let k = escape_time(c, ZERO, 2.0, 64);
            assert!(k <= 64);
        }
    }

    #[test]
    fn near_miss_escapes_after_a_few_steps() {
        // z1 = c, z2 = c^2 + c = -0.25 + 2.53125i
        let c = Complex::new(-1.625, -1.125);
        assert_eq!(escape_time(c, ZERO, 2.0, 50), 1);
    }

    #[test]
    fn escaping_on_the_last_step_is_not_inside() {
        // z1 = 1, z2 = 2: the first escaped value is the last one computed.
        let one = Complex::new(1.0, 0.0);
        assert_eq!(escape_time(one, ZERO, 2.0, 2), 1);
        assert_eq!(score(1, 2, Curve::Linear), 0.5);
        // With a cap of one, z2 is never computed.
        assert_eq!(escape_time(one, ZERO, 2.0, 1), 1);
        assert_eq!(score(1, 1, Curve::Linear), 0.0);

        let fractal = FractalParameters::new(ZERO, 2.0, 2).unwrap();
        assert!(fractal.score(one) > 0.0);
    }

    #[test]
    fn interior_scores_exactly_zero() {
        assert_eq!(score(50, 50, Curve::Linear), 0.0);
        assert_eq!(score(50, 50, Curve::Sqrt), 0.0);
        assert_eq!(score(10, 40, Curve::Linear), 0.25);
        assert_eq!(score(10, 40, Curve::Sqrt), 0.5);
    }

    #[test]
    fn parameters_are_validated() {
        assert!(FractalParameters::new(ZERO, 0.0, 10).is_err());
        assert!(FractalParameters::new(ZERO, -1.0, 10).is_err());
        assert!(FractalParameters::new(ZERO, 2.0, 0).is_err());
        assert!(FractalParameters::new(Complex::new(std::f64::NAN, 0.0), 2.0, 10).is_err());
        assert!(FractalParameters::new(ZERO, 2.0, 10).is_ok());
    }

    #[test]
    fn pixel_role_swaps_the_recurrence() {
        let mandel = FractalParameters::new(ZERO, 2.0, 100).unwrap();
        let julia = FractalParameters::new(Complex::new(-1.0, 0.0), 2.0, 100)
            .unwrap()
            .with_role(PixelRole::Initial);
        // 0 -> -1 -> 0 cycles under both arrangements.
        assert_eq!(mandel.iterate(Complex::new(-1.0, 0.0)), 100);
        assert_eq!(julia.iterate(ZERO), 100);
        // 1.7 -> 1.89 -> 2.57
        assert_eq!(julia.iterate(Complex::new(1.7, 0.0)), 1);
    }

    #[test]
    fn alternate_seed_is_respected() {
        let one = FractalParameters::new(Complex::new(1.0, 0.0), 2.0, 100).unwrap();
        // z0 = 1, c = 0: z stays at 1 forever.
        assert_eq!(one.iterate(ZERO), 100);
        // z0 = 1, c = 1: 2 escapes on the first step.
        assert_eq!(one.iterate(Complex::new(1.0, 0.0)), 0);
    }
}
