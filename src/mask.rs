// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scan a discard mask
//!
//! A discard mask is a layer the user paints over the parts of the
//! image that should go first.  It may be smaller than the base image
//! and sit anywhere relative to it, so every scan starts by working out
//! the overlap between the two, in the coordinate frame of the base
//! image.  Each line of the overlap (a row for a horizontal resize, a
//! column for a vertical one) is then reduced to the number of pixels
//! that are "active", that is, painted strongly enough to count.

use crate::cq;
use crate::drawable::Drawable;
use crate::error::{try_alloc, LqrError};
use crate::flipper::Flipper;
use crate::progress::{tick, Progress};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A pixel is active when its weighted intensity reaches this value
/// divided by the number of colour channels.
pub const ACTIVITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Resize the width; scan rows.
    Horizontal,
    /// Resize the height; scan columns.
    Vertical,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Horizontal
    }
}

impl TryFrom<i32> for Direction {
    type Error = LqrError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Direction::Horizontal),
            1 => Ok(Direction::Vertical),
            other => Err(LqrError::InvalidDirection(other)),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" | "h" => Ok(Direction::Horizontal),
            "vertical" | "v" => Ok(Direction::Vertical),
            _ => Err(format!("unknown direction '{}'", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(cq!(*self == Direction::Horizontal, "horizontal", "vertical"))
    }
}

/// A discard layer placed against the base image it applies to.
#[derive(Debug)]
pub struct DiscardMask<'a, D: Drawable + ?Sized> {
    pub layer: &'a D,
    /// Offsets of the mask relative to the base image.
    pub x_off: i32,
    pub y_off: i32,
    pub old_width: u32,
    pub old_height: u32,
}

impl<'a, D: Drawable + ?Sized> DiscardMask<'a, D> {
    /// Place `layer` against a base image of the given size whose own
    /// offsets are `base_offsets`.
    pub fn new(layer: &'a D, base_offsets: (i32, i32), old_width: u32, old_height: u32) -> Self {
        let (x_off, y_off) = layer.offsets();
        DiscardMask {
            layer,
            x_off: x_off - base_offsets.0,
            y_off: y_off - base_offsets.1,
            old_width,
            old_height,
        }
    }

    /// How many pixels long each scanned line is.
    pub fn overlap_extent(&self, direction: Direction) -> u32 {
        let span = match direction {
            Direction::Horizontal => overlap(self.x_off, self.layer.width(), self.old_width),
            Direction::Vertical => overlap(self.y_off, self.layer.height(), self.old_height),
        };
        (span.end - span.start) as u32
    }
}

// The part of [off, off + extent) that lands inside [0, limit), in base
// image coordinates.  Never inverted.
fn overlap(off: i32, extent: u32, limit: u32) -> Range<i64> {
    let start = std::cmp::max(0, i64::from(off));
    let end = std::cmp::min(i64::from(limit), i64::from(extent) + i64::from(off));
    start..std::cmp::max(start, end)
}

/// Decide whether a single pixel counts as painted.  The colour
/// channels are averaged into [0, 1], weighted by alpha when there is
/// one, and compared against `ACTIVITY_THRESHOLD / colour channels`.
pub fn is_active(pixel: &[u8], has_alpha: bool) -> bool {
    let colours = cq!(has_alpha, pixel.len().saturating_sub(1), pixel.len());
    if colours == 0 {
        return false;
    }
    let sum: f64 = pixel[..colours].iter().map(|c| f64::from(*c)).sum();
    let intensity = sum / (255.0 * colours as f64);
    let weighted = cq!(
        has_alpha,
        intensity * f64::from(pixel[colours]) / 255.0,
        intensity
    );
    weighted >= ACTIVITY_THRESHOLD / colours as f64
}

/// Count the active pixels along every line of the overlap between the
/// mask and the base image.  Horizontal scans walk rows, vertical scans
/// walk columns.
pub fn scan<D>(
    mask: &DiscardMask<D>,
    direction: Direction,
    progress: &mut dyn Progress,
) -> Result<Vec<u32>, LqrError>
where
    D: Drawable + ?Sized,
{
    match direction {
        Direction::Horizontal => scan_rows(
            mask.layer,
            (mask.x_off, mask.y_off),
            (mask.old_width, mask.old_height),
            progress,
        ),
        Direction::Vertical => scan_rows(
            &Flipper {
                drawable: mask.layer,
            },
            (mask.y_off, mask.x_off),
            (mask.old_height, mask.old_width),
            progress,
        ),
    }
}

fn scan_rows<D>(
    layer: &D,
    (x_off, y_off): (i32, i32),
    (old_width, old_height): (u32, u32),
    progress: &mut dyn Progress,
) -> Result<Vec<u32>, LqrError>
where
    D: Drawable + ?Sized,
{
    let span = overlap(x_off, layer.width(), old_width);
    let lines = overlap(y_off, layer.height(), old_height);
    if span.start == span.end || lines.start == lines.end {
        tracing::debug!("discard mask lies outside the image");
        return Ok(Vec::new());
    }

    let len = (span.end - span.start) as u32;
    let first = (span.start - i64::from(x_off)) as u32;
    let extent = (lines.end - lines.start) as u32;
    let bpp = layer.bpp() as usize;
    let has_alpha = layer.has_alpha();

    let mut line = try_alloc(len as usize * bpp)?;
    let mut counts = Vec::with_capacity(extent as usize);

    progress.init("Scanning discard mask...");
    for (i, z1) in lines.enumerate() {
        layer.get_row(first, (z1 - i64::from(y_off)) as u32, len, &mut line)?;
        let active = line
            .chunks_exact(bpp)
            .filter(|pixel| is_active(pixel, has_alpha))
            .count();
        counts.push(active as u32);
        tick(progress, i as u32, extent);
    }

    tracing::debug!(lines = extent, line_length = len, "scanned discard mask");
    Ok(counts)
}
