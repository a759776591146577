// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpers around a liquid rescale (seam carving) engine: guessing a
//! target size from a discard mask, and drawing the engine's seam
//! history as an overlay layer.

mod ternary;

pub mod canvas;
pub mod carver;
pub mod drawable;
pub mod error;
pub mod estimate;
pub mod flipper;
pub mod mask;
pub mod pixelbuffer;
pub mod progress;
pub mod seammap;
pub mod session;
pub mod settings;

pub use canvas::{Canvas, Layer, LayerId};
pub use carver::Carver;
pub use error::LqrError;
pub use estimate::{estimate, guess_new_size, Estimate, Geometry};
pub use mask::{scan, Direction, DiscardMask};
pub use pixelbuffer::PixelBuffer;
pub use seammap::{composite, write_all_vmaps, Colour, VisibilityMap};
pub use session::{DialogContext, DialogEvent};
pub use settings::{OperMode, ResizeSettings};
