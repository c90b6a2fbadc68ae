// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gradients turn a normalized score into a color by blending linearly
//! between an ordered list of color stops.

use image::Rgb;

use crate::errors::RenderError;

/// A color pinned to a position in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop {
    /// Where on the ramp this color sits.
    pub position: f64,
    /// The color at exactly that position.
    pub color: Rgb<u8>,
}

impl ColorStop {
    /// Constructor.
    pub fn new(position: f64, r: u8, g: u8, b: u8) -> ColorStop {
        ColorStop {
            position,
            color: Rgb([r, g, b]),
        }
    }
}

/// An ordered, validated set of color stops.  Positions are unique and
/// strictly increasing, the first is 0.0 and the last is 1.0.  Once
/// built, a gradient is immutable and can be shared by every worker.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    /// Validates the stops.  They must already be sorted; this will
    /// not sort them for you.
    pub fn new(stops: Vec<ColorStop>) -> Result<Gradient, RenderError> {
        let invalid = |reason: String| Err(RenderError::InvalidGradient(reason));

        if stops.len() < 2 {
            return invalid(format!("need at least two stops, got {}", stops.len()));
        }
        if let Some(stop) = stops.iter().find(|s| !(s.position >= 0.0 && s.position <= 1.0)) {
            return invalid(format!("stop position {} is outside [0, 1]", stop.position));
        }
        for pair in stops.windows(2) {
            if pair[1].position == pair[0].position {
                return invalid(format!("duplicate stop position {}", pair[0].position));
            }
            if pair[1].position < pair[0].position {
                return invalid(format!(
                    "stops are not sorted: {} follows {}",
                    pair[1].position, pair[0].position
                ));
            }
        }
        if stops[0].position != 0.0 {
            return invalid(format!("first stop is at {}, not 0.0", stops[0].position));
        }
        let last = stops[stops.len() - 1].position;
        if last != 1.0 {
            return invalid(format!("last stop is at {}, not 1.0", last));
        }
        Ok(Gradient { stops })
    }

    /// The stops, in ascending order.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Returns the color at `v`.  Values at or beyond either end of the
    /// ramp take that end's color exactly, and a value that lands on a
    /// stop takes that stop's color.  NaN is treated as 0.
    pub fn color_at(&self, v: f64) -> Rgb<u8> {
        let first = &self.stops[0];
        let last = &self.stops[self.stops.len() - 1];
        if v.is_nan() || v <= first.position {
            return first.color;
        }
        if v >= last.position {
            return last.color;
        }

        // There is always a match: last.position > v.
        let i = self
            .stops
            .iter()
            .position(|s| s.position >= v)
            .unwrap_or(self.stops.len() - 1);
        let (lo, hi) = (&self.stops[i - 1], &self.stops[i]);
        if hi.position == v {
            return hi.color;
        }
        let t = (v - lo.position) / (hi.position - lo.position);
        blend(lo.color, hi.color, t)
    }

    /// The palette of the interactive explorer: black at the heart of
    /// the set, through violet and sea green, to pale aqua.
    pub fn classic() -> Gradient {
        Gradient {
            stops: vec![
                ColorStop::new(0.0, 0, 0, 0),
                ColorStop::new(0.05, 103, 41, 131),
                ColorStop::new(0.2, 9, 206, 135),
                ColorStop::new(0.4, 26, 80, 179),
                ColorStop::new(1.0, 60, 231, 186),
            ],
        }
    }

    /// A palette of hard bands that returns to black at the top end,
    /// so slow-escaping points fade into the set.
    pub fn banded() -> Gradient {
        Gradient {
            stops: vec![
                ColorStop::new(0.0, 0, 0, 0),
                ColorStop::new(0.1, 139, 113, 201),
                ColorStop::new(0.2, 122, 164, 68),
                ColorStop::new(0.3, 102, 40, 80),
                ColorStop::new(0.5, 77, 173, 152),
                ColorStop::new(0.7, 197, 120, 62),
                ColorStop::new(1.0, 0, 0, 0),
            ],
        }
    }

    /// Black to white.
    pub fn grayscale() -> Gradient {
        Gradient {
            stops: vec![ColorStop::new(0.0, 0, 0, 0), ColorStop::new(1.0, 255, 255, 255)],
        }
    }

    /// Looks up a preset by name.
    pub fn named(name: &str) -> Option<Gradient> {
        match name {
            "classic" => Some(Gradient::classic()),
            "banded" => Some(Gradient::banded()),
            "grayscale" => Some(Gradient::grayscale()),
            _ => None,
        }
    }
}

/// Per-channel `hi * t + lo * (1 - t)`, rounded to the nearest level.
fn blend(lo: Rgb<u8>, hi: Rgb<u8>, t: f64) -> Rgb<u8> {
    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let v = f64::from(hi[c]) * t + f64::from(lo[c]) * (1.0 - t);
        *slot = num::clamp(v.round(), 0.0, 255.0) as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_red_white() -> Gradient {
        Gradient::new(vec![
            ColorStop::new(0.0, 0, 0, 0),
            ColorStop::new(0.5, 255, 0, 0),
            ColorStop::new(1.0, 255, 255, 255),
        ])
        .unwrap()
    }

    #[test]
    fn blends_halfway_between_stops() {
        assert_eq!(black_red_white().color_at(0.25), Rgb([128, 0, 0]));
    }

    #[test]
    fn exact_stop_gives_pure_color() {
        assert_eq!(black_red_white().color_at(0.5), Rgb([255, 0, 0]));
        assert_eq!(black_red_white().color_at(0.0), Rgb([0, 0, 0]));
        assert_eq!(black_red_white().color_at(1.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn upper_blend_leans_toward_white() {
        let c = black_red_white().color_at(0.9);
        assert_eq!(c[0], 255);
        assert_eq!(c[1], c[2]);
        assert!(c[1] > 128, "{:?}", c);
        assert_eq!(c, Rgb([255, 204, 204]));
    }

    #[test]
    fn out_of_range_clamps_to_end_stops() {
        let g = black_red_white();
        assert_eq!(g.color_at(-0.5), Rgb([0, 0, 0]));
        assert_eq!(g.color_at(1.5), Rgb([255, 255, 255]));
        assert_eq!(g.color_at(std::f64::INFINITY), Rgb([255, 255, 255]));
        assert_eq!(g.color_at(std::f64::NAN), Rgb([0, 0, 0]));

        // The last color is not black, so a missing clamp would show.
        let c = Gradient::classic();
        assert_eq!(c.color_at(1.0), Rgb([60, 231, 186]));
    }

    #[test]
    fn rejects_unsorted_stops() {
        let g = Gradient::new(vec![
            ColorStop::new(0.0, 0, 0, 0),
            ColorStop::new(0.7, 1, 1, 1),
            ColorStop::new(0.3, 2, 2, 2),
            ColorStop::new(1.0, 3, 3, 3),
        ]);
        assert!(g.is_err());
    }

    #[test]
    fn rejects_duplicate_positions() {
        let g = Gradient::new(vec![
            ColorStop::new(0.0, 0, 0, 0),
            ColorStop::new(0.5, 1, 1, 1),
            ColorStop::new(0.5, 2, 2, 2),
            ColorStop::new(1.0, 3, 3, 3),
        ]);
        assert!(g.is_err());
    }

    #[test]
    fn rejects_missing_endpoints() {
        let no_zero =
            Gradient::new(vec![ColorStop::new(0.1, 0, 0, 0), ColorStop::new(1.0, 1, 1, 1)]);
        let no_one =
            Gradient::new(vec![ColorStop::new(0.0, 0, 0, 0), ColorStop::new(0.9, 1, 1, 1)]);
        let lonely = Gradient::new(vec![ColorStop::new(0.0, 0, 0, 0)]);
        let wild = Gradient::new(vec![ColorStop::new(0.0, 0, 0, 0), ColorStop::new(1.5, 1, 1, 1)]);
        assert!(no_zero.is_err());
        assert!(no_one.is_err());
        assert!(lonely.is_err());
        assert!(wild.is_err());
    }

    #[test]
    fn presets_are_valid() {
        for name in &["classic", "banded", "grayscale"] {
            let preset = Gradient::named(name).unwrap();
            assert_eq!(Gradient::new(preset.stops().to_vec()), Ok(preset));
        }
        assert!(Gradient::named("plaid").is_none());
    }
}
