#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tiled escape-time renderer
//!
//! The Mandelbrot set takes a point on the complex plane, repeatedly
//! squares it and adds a constant, and measures how quickly that
//! number goes to infinity.  This "velocity" is the number used to
//! color the pixel: it is normalized against the iteration cap and
//! looked up in a gradient of color stops.  Points that never escape
//! are the black heart of the set.
//!
//! Every pixel can be computed without looking at any other, so the
//! raster is cut into a grid of tiles, the tiles are painted by a pool
//! of worker threads, and the finished sub-images are copied back into
//! place.  The result doesn't depend on the grid or the number of
//! threads: the same request always produces the same bytes.

use log::info;
use std::time::Instant;

pub mod assemble;
pub mod errors;
pub mod escape;
pub mod gradient;
pub mod planes;
pub mod tiles;

pub use assemble::{assemble, Raster, SubTile};
pub use errors::RenderError;
pub use escape::{escape_time, score, Curve, FractalParameters, PixelRole};
pub use gradient::{ColorStop, Gradient};
pub use planes::{Pixel, PlaneMapper, Rectangle, RenderWindow};
pub use tiles::{render_tile, schedule, schedule_with, RenderOptions, Tile, TileGrid};

/// Renders the window with one worker per CPU.
pub fn render(
    window: &RenderWindow,
    fractal: &FractalParameters,
    gradient: &Gradient,
    grid: TileGrid,
) -> Result<Raster, RenderError> {
    render_with(window, fractal, gradient, grid, &RenderOptions::default())
}

/// The main function, and primary entry point.  Partitions the window,
/// paints every tile on the worker pool, and assembles the result.
pub fn render_with(
    window: &RenderWindow,
    fractal: &FractalParameters,
    gradient: &Gradient,
    grid: TileGrid,
    options: &RenderOptions,
) -> Result<Raster, RenderError> {
    let tiles = grid.partition(window)?;
    let expected = tiles.len();
    info!(
        "rendering {}x{} pixels of {:?} as {}x{} tiles on {} workers",
        window.pixel_width,
        window.pixel_height,
        window.plane,
        grid.tiles_x,
        grid.tiles_y,
        options.workers.min(expected)
    );

    let started = Instant::now();
    let finished = schedule(window, fractal, gradient, tiles, options)?;
    let raster = assemble(window, expected, finished)?;
    info!("render finished in {:?}", started.elapsed());
    Ok(raster)
}
