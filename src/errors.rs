// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The errors a render request can run into.  Validation happens when
//! a value is built, so almost everything here is reported before a
//! single worker is started; only `IncompleteAssembly` and
//! `Cancelled` come out of the scheduling phase.

use failure::Fail;

/// Everything that can go wrong between building a render request and
/// handing back a finished raster.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum RenderError {
    /// A rectangle with zero or negative area, or with non-finite
    /// corners.
    #[fail(
        display = "Degenerate rectangle: ({}, {}) .. ({}, {}) has no area",
        _0, _1, _2, _3
    )]
    DegenerateRectangle(f64, f64, f64, f64),

    /// Color stops that are unsorted, duplicated, out of range, or
    /// missing either end of [0, 1].
    #[fail(display = "Invalid gradient: {}", _0)]
    InvalidGradient(String),

    /// A tile grid with no tiles, or more tiles along an axis than
    /// there are pixels.
    #[fail(display = "Invalid tile grid: {}", _0)]
    InvalidTileGrid(String),

    /// Fractal or window parameters outside their domain.
    #[fail(display = "Invalid parameters: {}", _0)]
    InvalidParameters(String),

    /// Fewer (or more) finished tiles than were scheduled.
    #[fail(
        display = "Incomplete assembly: expected {} tiles, received {}",
        expected, received
    )]
    IncompleteAssembly {
        /// Tiles scheduled.
        expected: usize,
        /// Tiles actually delivered.
        received: usize,
    },

    /// The caller raised the cancellation flag before every tile was
    /// finished.
    #[fail(display = "Render cancelled")]
    Cancelled,
}
