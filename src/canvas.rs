// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The contract between the renderer and the image it draws on.  The
//! renderer only ever writes pixels; it never owns the storage.
//!
//! An `RgbImage` is a canvas, and so is a `Band`: a run of whole rows
//! of an `RgbImage` borrowed mutably on its own, which lets several
//! workers draw into one image at the same time without locking.

use error::FractalError;
use image::{ImageBuffer, Rgb, RgbImage};

const CHANNELS: usize = 3;

/// A fixed-size, row/column addressed raster.
pub trait Canvas {
    /// Number of columns.
    fn width(&self) -> usize;

    /// Number of rows.
    fn height(&self) -> usize;

    /// Reads a pixel, or nothing if the address is out of range.
    fn get_pixel(&self, x: usize, y: usize) -> Option<Rgb<u8>>;

    /// Writes a pixel, refusing addresses outside the canvas.
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb<u8>) -> Result<(), FractalError>;

    /// Writes a pixel if the address is in range, and reports whether
    /// it was.  Never fails.
    fn try_set_pixel(&mut self, x: usize, y: usize, color: Rgb<u8>) -> bool {
        self.set_pixel(x, y, color).is_ok()
    }
}

impl Canvas for RgbImage {
    fn width(&self) -> usize {
        ImageBuffer::width(self) as usize
    }

    fn height(&self) -> usize {
        ImageBuffer::height(self) as usize
    }

    fn get_pixel(&self, x: usize, y: usize) -> Option<Rgb<u8>> {
        if x < Canvas::width(self) && y < Canvas::height(self) {
            Some(*ImageBuffer::get_pixel(self, x as u32, y as u32))
        } else {
            None
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb<u8>) -> Result<(), FractalError> {
        if x < Canvas::width(self) && y < Canvas::height(self) {
            self.put_pixel(x as u32, y as u32, color);
            Ok(())
        } else {
            Err(FractalError::PixelOutOfBounds { x, y })
        }
    }
}

/// A horizontal strip of whole rows cut out of a larger image.  Rows
/// are addressed relative to the strip; `top` says where the strip
/// starts in the image it came from.
#[derive(Debug)]
pub struct Band<'a> {
    data: &'a mut [u8],
    width: usize,
    top: usize,
}

impl<'a> Band<'a> {
    /// The image row that row 0 of this band corresponds to.
    pub fn top(&self) -> usize {
        self.top
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height() {
            Some((y * self.width + x) * CHANNELS)
        } else {
            None
        }
    }
}

impl<'a> Canvas for Band<'a> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.data.len() / (self.width * CHANNELS)
    }

    fn get_pixel(&self, x: usize, y: usize) -> Option<Rgb<u8>> {
        self.offset(x, y)
            .map(|at| Rgb([self.data[at], self.data[at + 1], self.data[at + 2]]))
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb<u8>) -> Result<(), FractalError> {
        match self.offset(x, y) {
            Some(at) => {
                self.data[at..at + CHANNELS].copy_from_slice(&color.0);
                Ok(())
            }
            None => Err(FractalError::PixelOutOfBounds { x, y }),
        }
    }
}

/// Cuts an image into disjoint bands of `rows` rows each (the last one
/// may be shorter).  Together the bands cover every pixel exactly once.
pub fn bands<'a>(image: &'a mut RgbImage, rows: usize) -> impl Iterator<Item = Band<'a>> + 'a {
    let width = ImageBuffer::width(image) as usize;
    let rows = rows.max(1);
    let data: &'a mut [u8] = &mut **image;
    data.chunks_mut((width * CHANNELS * rows).max(1))
        .enumerate()
        .map(move |(index, data)| Band {
            data,
            width,
            top: index * rows,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    #[test]
    fn set_pixel_refuses_out_of_range_addresses() {
        let mut image = RgbImage::new(4, 3);
        assert_eq!(Canvas::set_pixel(&mut image, 3, 2, RED), Ok(()));
        assert_eq!(
            Canvas::set_pixel(&mut image, 4, 0, RED),
            Err(FractalError::PixelOutOfBounds { x: 4, y: 0 })
        );
        assert_eq!(
            Canvas::set_pixel(&mut image, 0, 3, RED),
            Err(FractalError::PixelOutOfBounds { x: 0, y: 3 })
        );
        assert_eq!(Canvas::get_pixel(&image, 3, 2), Some(RED));
        assert_eq!(Canvas::get_pixel(&image, 4, 2), None);
    }

    #[test]
    fn try_set_pixel_reports_instead_of_failing() {
        let mut image = RgbImage::new(2, 2);
        assert!(image.try_set_pixel(1, 1, RED));
        assert!(!image.try_set_pixel(2, 1, RED));
        assert!(!image.try_set_pixel(1, 2, RED));
        assert_eq!(Canvas::get_pixel(&image, 1, 1), Some(RED));
    }

    #[test]
    fn bands_cover_the_image_exactly_once() {
        let mut image = RgbImage::new(5, 7);
        {
            let bands: Vec<Band> = bands(&mut image, 3).collect();
            assert_eq!(bands.len(), 3);
            assert_eq!(bands.iter().map(|b| b.top()).collect::<Vec<_>>(), vec![0, 3, 6]);
            assert_eq!(bands.iter().map(|b| b.height()).collect::<Vec<_>>(), vec![3, 3, 1]);
        }
        for mut band in bands(&mut image, 3) {
            let top = band.top() as u8;
            for y in 0..band.height() {
                for x in 0..band.width() {
                    assert!(band.try_set_pixel(x, y, Rgb([x as u8, top + y as u8, 1])));
                }
            }
            assert!(!band.try_set_pixel(0, band.height(), RED));
        }
        for (x, y, pixel) in image.enumerate_pixels() {
            assert_eq!(*pixel, Rgb([x as u8, y as u8, 1]));
        }
    }
}
