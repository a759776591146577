// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Drawable dimensional flipper
//!
//! A utility proxy for the `Drawable` trait that maps the width to the
//! original height, and vice versa, as well as every x to y and vice
//! versa.
//!
//! This has the effect of making it possible to treat each column in a
//! vertical scan as a row, so the mask scanner only has to be written
//! once.

use crate::drawable::Drawable;
use crate::error::LqrError;

pub struct Flipper<'a, D>
where
    D: Drawable + ?Sized,
{
    pub drawable: &'a D,
}

impl<'a, D> Drawable for Flipper<'a, D>
where
    D: Drawable + ?Sized,
{
    fn width(&self) -> u32 {
        self.drawable.height()
    }

    fn height(&self) -> u32 {
        self.drawable.width()
    }

    fn bpp(&self) -> u8 {
        self.drawable.bpp()
    }

    fn has_alpha(&self) -> bool {
        self.drawable.has_alpha()
    }

    fn offsets(&self) -> (i32, i32) {
        let (x, y) = self.drawable.offsets();
        (y, x)
    }

    fn get_row(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError> {
        self.drawable.get_col(y, x, len, out)
    }

    fn get_col(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError> {
        self.drawable.get_row(y, x, len, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Layer;
    use crate::drawable::{read_col, read_row};
    use crate::pixelbuffer::PixelBuffer;

    #[test]
    fn rows_of_the_flip_are_columns_of_the_original() {
        // 3 wide, 2 tall: [0 1 2] [3 4 5]
        let mut layer =
            Layer::from_buffer("m", PixelBuffer::from_raw(3, 2, 1, (0..6).collect()).unwrap());
        layer.set_offsets(7, -2);
        let flipped = Flipper { drawable: &layer };
        assert_eq!((flipped.width(), flipped.height()), (2, 3));
        assert_eq!(flipped.offsets(), (-2, 7));
        assert_eq!(read_row(&flipped, 0, 2, 2).unwrap(), vec![2, 5]);
        assert_eq!(read_col(&flipped, 1, 0, 3).unwrap(), vec![3, 4, 5]);
    }
}
