// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tile scheduler.  Cuts the raster into a fixed grid of
//! rectangular tiles and hands them to a pool of worker threads.  Each
//! worker owns the tile it is painting and its private sub-image; the
//! only thing the workers share is the queue of tiles still to be
//! done and the channel the finished tiles go back on.

use crossbeam::channel;
use itertools::iproduct;
use log::{debug, warn};
use std::convert::TryFrom;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::assemble::{Raster, SubTile};
use crate::errors::RenderError;
use crate::escape::FractalParameters;
use crate::gradient::Gradient;
use crate::planes::{Pixel, RenderWindow};

/// The number of tiles across and down.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    /// Tiles per row.
    pub tiles_x: usize,
    /// Tiles per column.
    pub tiles_y: usize,
}

/// One block of the raster waiting to be painted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tile {
    /// The upper-left pixel of the block in the full raster.
    pub offset: Pixel,
    /// Columns in the block.
    pub width: usize,
    /// Rows in the block.
    pub height: usize,
    /// The part of the complex plane this block covers.
    pub sub_window: RenderWindow,
}

impl TileGrid {
    /// Constructor.  The grid is checked against a window when it is
    /// partitioned.
    pub fn new(tiles_x: usize, tiles_y: usize) -> TileGrid {
        TileGrid { tiles_x, tiles_y }
    }

    /// The number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.tiles_x * self.tiles_y
    }

    /// True for a grid with no tiles, which no window accepts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cuts the window into tiles, row by row.  Every tile in a row or
    /// column is the same size except the last, which also takes
    /// whatever is left over from the integer division, so that the
    /// tiles cover the raster exactly once.
    pub fn partition(&self, window: &RenderWindow) -> Result<Vec<Tile>, RenderError> {
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(RenderError::InvalidTileGrid(format!(
                "{}x{} has no tiles",
                self.tiles_x, self.tiles_y
            )));
        }
        if self.tiles_x > window.pixel_width || self.tiles_y > window.pixel_height {
            return Err(RenderError::InvalidTileGrid(format!(
                "{}x{} tiles do not fit in {}x{} pixels",
                self.tiles_x, self.tiles_y, window.pixel_width, window.pixel_height
            )));
        }

        // The window's fields are public, so it may not have come
        // through RenderWindow::new.
        raster_side(window.pixel_width)?;
        raster_side(window.pixel_height)?;

        let columns = spans(window.pixel_width, self.tiles_x);
        let rows = spans(window.pixel_height, self.tiles_y);
        iproduct!(rows, columns)
            .map(|((top, height), (left, width))| -> Result<Tile, RenderError> {
                Ok(Tile {
                    offset: Pixel(left, top),
                    width,
                    height,
                    sub_window: window.sub_window(left, top, left + width, top + height)?,
                })
            })
            .collect()
    }
}

/// Splits `total` into `count` runs of `(start, length)`; the last run
/// absorbs the remainder.  Requires `1 <= count <= total`.
fn spans(total: usize, count: usize) -> Vec<(usize, usize)> {
    let step = total / count;
    (0..count)
        .map(|i| {
            let start = i * step;
            let length = if i + 1 == count { total - start } else { step };
            (start, length)
        })
        .collect()
}

/// Knobs for the worker pool.
#[derive(Copy, Clone, Debug)]
pub struct RenderOptions<'a> {
    /// The most threads to run at once.  Never more than the number of
    /// tiles are started.
    pub workers: usize,
    /// Raise this flag to abandon the render.  Workers look at it
    /// between pixels.
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> Default for RenderOptions<'a> {
    fn default() -> Self {
        RenderOptions {
            workers: num_cpus::get(),
            cancel: None,
        }
    }
}

/// Paints one tile.  Each pixel's point on the plane is computed from
/// its position in the full window, not the tile, so the picture is
/// the same however the raster was cut up.  Fails with `Cancelled` if
/// the flag goes up part way through.
pub fn render_tile(
    window: &RenderWindow,
    tile: &Tile,
    fractal: &FractalParameters,
    gradient: &Gradient,
    cancel: Option<&AtomicBool>,
) -> Result<SubTile, RenderError> {
    let mut image = Raster::new(raster_side(tile.width)?, raster_side(tile.height)?);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
            return Err(RenderError::Cancelled);
        }
        let global = Pixel(tile.offset.0 + x as usize, tile.offset.1 + y as usize);
        *pixel = gradient.color_at(fractal.score(window.pixel_to_point(&global)));
    }
    Ok(SubTile {
        offset: tile.offset,
        sub_window: tile.sub_window,
        image,
    })
}

/// The `image` crate measures rasters in `u32`.
pub(crate) fn raster_side(pixels: usize) -> Result<u32, RenderError> {
    u32::try_from(pixels).map_err(|_| {
        RenderError::InvalidParameters(format!("{} pixels do not fit in a raster", pixels))
    })
}

/// Runs every tile through a bounded pool of workers and collects the
/// finished sub-images, in whatever order they complete.  Blocks until
/// every worker has stopped.  A worker that dies takes its tile with
/// it; the shortfall is left for the assembler to report.
pub fn schedule(
    window: &RenderWindow,
    fractal: &FractalParameters,
    gradient: &Gradient,
    tiles: Vec<Tile>,
    options: &RenderOptions,
) -> Result<Vec<SubTile>, RenderError> {
    schedule_with(tiles, options, |tile| {
        render_tile(window, tile, fractal, gradient, options.cancel)
    })
}

/// The worker pool itself, with the painter passed in.  A painter
/// that fails stops its worker; the tiles the other workers finish
/// are still returned.
pub fn schedule_with<P>(
    tiles: Vec<Tile>,
    options: &RenderOptions,
    paint: P,
) -> Result<Vec<SubTile>, RenderError>
where
    P: Fn(&Tile) -> Result<SubTile, RenderError> + Sync,
{
    let expected = tiles.len();
    let workers = options.workers.max(1).min(expected.max(1));
    let cancel = options.cancel;
    let queue = Arc::new(Mutex::new(tiles.into_iter()));
    let (sender, receiver) = channel::bounded::<SubTile>(workers);
    let mut finished: Vec<SubTile> = Vec::with_capacity(expected);
    let paint = &paint;

    let outcome = crossbeam::scope(|spawner| {
        for _ in 0..workers {
            let queue = queue.clone();
            let sender = sender.clone();
            spawner.spawn(move |_| loop {
                let tile = { queue.lock().ok().and_then(|mut tiles| tiles.next()) };
                match tile {
                    Some(tile) => match paint(&tile) {
                        Ok(done) => {
                            if sender.send(done).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            debug!("worker stopping: {}", e);
                            break;
                        }
                    },
                    None => {
                        break;
                    }
                }
            });
        }
        // Only the workers hold senders now, so the receiver closes
        // once the last of them stops.
        drop(sender);
        for done in receiver.iter().take(expected) {
            debug!(
                "tile at {},{} ({}x{}) done, {}/{}",
                done.offset.0,
                done.offset.1,
                done.image.width(),
                done.image.height(),
                finished.len() + 1,
                expected
            );
            finished.push(done);
        }
    });

    if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
        warn!("render cancelled after {}/{} tiles", finished.len(), expected);
        return Err(RenderError::Cancelled);
    }
    if outcome.is_err() {
        warn!("a worker died; {}/{} tiles finished", finished.len(), expected);
    }
    Ok(finished)
}
