// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Rectangle, RenderWindow and PlaneMapper structs, which
//! describe a relationship between a rectangle on the integral pixel
//! plane with an origin at 0,0, and a rectangle on the complex plane
//! with an arbitrary pair of corners.
use num::Complex;
use std::convert::TryFrom;

use crate::errors::RenderError;

/// Describes the x, y of a pixel in a raster.  Column first, then row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// An axis-aligned rectangle with positive area.  Used for both the
/// pixel plane and the complex plane; on the complex plane the real
/// part of a point is the x-component and the imaginary part is the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rectangle {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rectangle {
    /// Builds a rectangle from its two extreme corners.  Fails when
    /// either axis is empty or inverted, or when a bound isn't finite.
    pub fn new(
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
    ) -> Result<Rectangle, RenderError> {
        let finite =
            x_min.is_finite() && y_min.is_finite() && x_max.is_finite() && y_max.is_finite();
        // Written so that NaN lands in the error branch.
        if !finite || !(x_max > x_min) || !(y_max > y_min) {
            return Err(RenderError::DegenerateRectangle(x_min, y_min, x_max, y_max));
        }
        Ok(Rectangle {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Builds a rectangle from an origin corner and a size.
    pub fn from_origin_size(
        x1: f64,
        y1: f64,
        width: f64,
        height: f64,
    ) -> Result<Rectangle, RenderError> {
        Rectangle::new(x1, y1, x1 + width, y1 + height)
    }

    /// Builds a rectangle from the left-lower and right-upper corners
    /// of a region of the complex plane.
    pub fn from_corners(
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Rectangle, RenderError> {
        Rectangle::new(leftlower.re, leftlower.im, rightupper.re, rightupper.im)
    }

    /// A square of side `extent` centered on `center`.
    pub fn around(center: Complex<f64>, extent: f64) -> Result<Rectangle, RenderError> {
        let half = 0.5 * extent;
        Rectangle::new(center.re - half, center.im - half, center.re + half, center.im + half)
    }

    /// Left edge.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Top edge in pixel space, bottom edge on the complex plane.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Right edge.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// The edge opposite `y_min`.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Horizontal extent, always positive.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical extent, always positive.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// The `{x1, y1, width, height}` form of this rectangle.
    pub fn origin_size(&self) -> (f64, f64, f64, f64) {
        (self.x_min, self.y_min, self.width(), self.height())
    }

    /// The midpoint, as a point on the complex plane.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(0.5 * (self.x_min + self.x_max), 0.5 * (self.y_min + self.y_max))
    }

    /// Whether the point lies inside, edges included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

/// Maps points in a source rectangle to the corresponding points in a
/// target rectangle, each axis independently.  Both rectangles were
/// validated when they were built, so mapping can never divide by
/// zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The rectangle points are mapped from.
    pub source: Rectangle,
    /// The rectangle points are mapped to.
    pub target: Rectangle,
}

impl PlaneMapper {
    /// Constructor.
    pub fn new(source: Rectangle, target: Rectangle) -> PlaneMapper {
        PlaneMapper { source, target }
    }

    /// Map `(x, y)` from the source rectangle into the target.
    pub fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let (s, d) = (&self.source, &self.target);
        let tx = (x - s.x_min) / s.width();
        let ty = (y - s.y_min) / s.height();
        (tx * d.width() + d.x_min, ty * d.height() + d.y_min)
    }

    /// The mapper that undoes this one.
    pub fn inverse(&self) -> PlaneMapper {
        PlaneMapper::new(self.target, self.source)
    }
}

/// A region of the complex plane, plus the size of the raster it is
/// sampled into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderWindow {
    /// The region of the complex plane being sampled.
    pub plane: Rectangle,
    /// Raster columns.
    pub pixel_width: usize,
    /// Raster rows.
    pub pixel_height: usize,
}

impl RenderWindow {
    /// Constructor.  The resolution must be positive on both axes, and
    /// no larger than an `image` buffer can hold (`u32::MAX` a side).
    pub fn new(
        plane: Rectangle,
        pixel_width: usize,
        pixel_height: usize,
    ) -> Result<RenderWindow, RenderError> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(RenderError::InvalidParameters(format!(
                "resolution {}x{} has no pixels",
                pixel_width, pixel_height
            )));
        }
        if u32::try_from(pixel_width).is_err() || u32::try_from(pixel_height).is_err() {
            return Err(RenderError::InvalidParameters(format!(
                "resolution {}x{} is too large for a raster",
                pixel_width, pixel_height
            )));
        }
        Ok(RenderWindow {
            plane,
            pixel_width,
            pixel_height,
        })
    }

    /// The pixel plane, `[0, width] x [0, height]`.
    pub fn pixels(&self) -> Rectangle {
        Rectangle {
            x_min: 0.0,
            y_min: 0.0,
            x_max: self.pixel_width as f64,
            y_max: self.pixel_height as f64,
        }
    }

    /// The total number of pixels in the raster.
    pub fn len(&self) -> usize {
        self.pixel_width * self.pixel_height
    }

    /// Never true for a window built through `new`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps pixel-plane coordinates onto the complex plane.
    pub fn mapper(&self) -> PlaneMapper {
        PlaneMapper::new(self.pixels(), self.plane)
    }

    /// Given a pixel of the raster, return the point on the complex
    /// plane at the center of that pixel.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let (re, im) = self.mapper().map(pixel.0 as f64 + 0.5, pixel.1 as f64 + 0.5);
        Complex::new(re, im)
    }

    /// Given a point on the complex plane, return the pixel that
    /// contains it, or None if the point is outside the window.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        if !self.plane.contains(point.re, point.im) {
            return None;
        }
        let (x, y) = self.mapper().inverse().map(point.re, point.im);
        Some(Pixel(
            (x as usize).min(self.pixel_width - 1),
            (y as usize).min(self.pixel_height - 1),
        ))
    }

    /// The window covering the pixel block `[left, right) x [top,
    /// bottom)` of this one: same mapping, smaller raster.
    pub fn sub_window(
        &self,
        left: usize,
        top: usize,
        right: usize,
        bottom: usize,
    ) -> Result<RenderWindow, RenderError> {
        let mapper = self.mapper();
        let (x_min, y_min) = mapper.map(left as f64, top as f64);
        let (x_max, y_max) = mapper.map(right as f64, bottom as f64);
        RenderWindow::new(
            Rectangle::new(x_min, y_min, x_max, y_max)?,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }

    /// Recenters the window on the plane point under pixel-space
    /// coordinates `(x, y)` and scales the plane extent by `factor`,
    /// keeping the resolution.  A factor below one zooms in.
    pub fn zoom_at(&self, x: f64, y: f64, factor: f64) -> Result<RenderWindow, RenderError> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(RenderError::InvalidParameters(format!(
                "zoom factor {} must be positive",
                factor
            )));
        }
        let (re, im) = self.mapper().map(x, y);
        let half_w = 0.5 * factor * self.plane.width();
        let half_h = 0.5 * factor * self.plane.height();
        RenderWindow::new(
            Rectangle::new(re - half_w, im - half_h, re + half_w, im + half_h)?,
            self.pixel_width,
            self.pixel_height,
        )
    }
}
