// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Puts the finished tiles back together into one raster.

use image::RgbImage;

use crate::errors::RenderError;
use crate::planes::{Pixel, RenderWindow};
use crate::tiles::raster_side;

/// An RGB image.  Both the final picture and every tile's sub-image.
pub type Raster = RgbImage;

/// A painted tile on its way to the assembler.
#[derive(Clone, Debug)]
pub struct SubTile {
    /// Where the tile's upper-left pixel goes in the full raster.
    pub offset: Pixel,
    /// The part of the complex plane the tile covers.
    pub sub_window: RenderWindow,
    /// The tile's pixels.
    pub image: Raster,
}

/// Given every finished tile, copy each one into a fresh raster the
/// size of the window at its offset.  `expected` is the number of
/// tiles that were scheduled; anything else is an error, and no
/// partial picture is returned.
pub fn assemble(
    window: &RenderWindow,
    expected: usize,
    tiles: Vec<SubTile>,
) -> Result<Raster, RenderError> {
    if tiles.len() != expected {
        return Err(RenderError::IncompleteAssembly {
            expected,
            received: tiles.len(),
        });
    }

    let mut raster = Raster::new(
        raster_side(window.pixel_width)?,
        raster_side(window.pixel_height)?,
    );
    for tile in tiles {
        let Pixel(left, top) = tile.offset;
        let right = left + tile.image.width() as usize;
        let bottom = top + tile.image.height() as usize;
        if right > window.pixel_width || bottom > window.pixel_height {
            return Err(RenderError::InvalidTileGrid(format!(
                "a {}x{} tile at {},{} overruns the {}x{} raster",
                tile.image.width(),
                tile.image.height(),
                left,
                top,
                window.pixel_width,
                window.pixel_height
            )));
        }
        // Both fit in u32: they are bounded by the raster's sides.
        let (left, top) = (left as u32, top as u32);
        for (x, y, pixel) in tile.image.enumerate_pixels() {
            raster.put_pixel(left + x, top + y, *pixel);
        }
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::Rectangle;
    use image::Rgb;

    fn window() -> RenderWindow {
        RenderWindow::new(Rectangle::new(0.0, 0.0, 1.0, 1.0).unwrap(), 3, 2).unwrap()
    }

    fn solid(offset: Pixel, width: u32, height: u32, shade: u8) -> SubTile {
        let w = window();
        SubTile {
            offset,
            sub_window: w
                .sub_window(
                    offset.0,
                    offset.1,
                    offset.0 + width as usize,
                    offset.1 + height as usize,
                )
                .unwrap(),
            image: Raster::from_pixel(width, height, Rgb([shade, shade, shade])),
        }
    }

    #[test]
    fn places_tiles_at_their_offsets() {
        // Delivered out of order on purpose.
        let tiles = vec![solid(Pixel(1, 0), 2, 2, 200), solid(Pixel(0, 0), 1, 2, 100)];
        let raster = assemble(&window(), 2, tiles).unwrap();
        assert_eq!(raster.dimensions(), (3, 2));
        assert_eq!(*raster.get_pixel(0, 0), Rgb([100, 100, 100]));
        assert_eq!(*raster.get_pixel(0, 1), Rgb([100, 100, 100]));
        assert_eq!(*raster.get_pixel(1, 1), Rgb([200, 200, 200]));
        assert_eq!(*raster.get_pixel(2, 0), Rgb([200, 200, 200]));
    }

    #[test]
    fn missing_tile_is_an_error() {
        let tiles = vec![solid(Pixel(0, 0), 1, 2, 100)];
        assert_eq!(
            assemble(&window(), 2, tiles).err(),
            Some(RenderError::IncompleteAssembly {
                expected: 2,
                received: 1
            })
        );
    }

    #[test]
    fn overrunning_tile_is_an_error() {
        let mut stray = solid(Pixel(1, 0), 2, 2, 1);
        stray.offset = Pixel(2, 0);
        let tiles = vec![solid(Pixel(0, 0), 1, 2, 100), stray];
        assert!(assemble(&window(), 2, tiles).is_err());
    }
}
