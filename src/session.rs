// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The resize dialog, without the dialog
//!
//! Everything the front end needs to remember for one dialog run lives
//! in a `DialogContext`.  Front ends turn widget activity into
//! `DialogEvent`s and hand them to `dispatch`, which returns the
//! updated context; there is no other state.

use crate::canvas::{Canvas, LayerId};
use crate::error::LqrError;
use crate::estimate::{guess_new_size, Estimate, Geometry};
use crate::mask::Direction;
use crate::progress::Progress;
use crate::seammap::Colour;
use crate::settings::{OperMode, ResizeSettings};
use std::convert::TryFrom;

#[derive(Debug, Clone, PartialEq)]
pub enum DialogEvent {
    SizeChanged { width: u32, height: u32 },
    OperModeChanged(OperMode),
    ResOrderChanged(Direction),
    /// Raw index from the direction chooser: 0 horizontal, 1 vertical.
    GuessDirectionChanged(i32),
    DiscToggled(bool),
    DiscLayerChanged(Option<LayerId>),
    DiscCoeffChanged(i32),
    PresLayerChanged(Option<LayerId>),
    PresCoeffChanged(i32),
    OutputSeamsToggled(bool),
    SeamColoursChanged { start: Colour, end: Colour },
    /// "Auto size".
    GuessClicked,
    /// Restore the size used on the previous run.
    LastValues,
    /// Restore the original size.
    ResetValues,
    /// The user accepted the dialog.
    Accepted,
}

#[derive(Debug, Clone)]
pub struct DialogContext {
    pub settings: ResizeSettings,
    /// The layer being resized, as it was when the dialog opened.
    pub base: Geometry,
    pub disc_enabled: bool,
    /// Discarding while enlarging does nothing useful; flag it.
    pub disc_warning: bool,
    /// Last message for the user, if any.
    pub message: Option<String>,
}

impl DialogContext {
    pub fn new(settings: ResizeSettings, base: Geometry) -> Self {
        let mut context = DialogContext {
            disc_enabled: settings.disc_layer.is_some(),
            settings,
            base,
            disc_warning: false,
            message: None,
        };
        let (width, height) = match (context.settings.new_width, context.settings.new_height) {
            (0, _) | (_, 0) => (base.width, base.height),
            size => size,
        };
        context.apply_size(width, height);
        context
    }

    /// The target size currently shown.
    pub fn new_size(&self) -> (u32, u32) {
        (self.settings.new_width, self.settings.new_height)
    }

    pub fn dispatch(
        mut self,
        event: DialogEvent,
        canvas: &Canvas,
        progress: &mut dyn Progress,
    ) -> Result<Self, LqrError> {
        tracing::debug!(?event, "dialog event");
        self.message = None;
        match event {
            DialogEvent::SizeChanged { width, height } => self.apply_size(width, height),
            DialogEvent::OperModeChanged(mode) => {
                self.settings.oper_mode = mode;
                let (width, height) = self.new_size();
                self.apply_size(width, height);
            }
            DialogEvent::ResOrderChanged(order) => {
                self.settings.res_order = order;
                self.refresh_warning();
            }
            DialogEvent::GuessDirectionChanged(index) => match Direction::try_from(index) {
                Ok(direction) => self.settings.guess_direction = direction,
                Err(err) => {
                    tracing::error!(%err, "ignoring direction change");
                    self.message = Some(err.to_string());
                }
            },
            DialogEvent::DiscToggled(enabled) => {
                self.disc_enabled = enabled;
                self.refresh_warning();
            }
            DialogEvent::DiscLayerChanged(layer) => {
                self.settings.disc_layer = layer;
                self.disc_enabled = layer.is_some();
                self.refresh_warning();
            }
            DialogEvent::DiscCoeffChanged(coeff) => {
                self.settings.disc_coeff = coeff;
                self.refresh_warning();
            }
            DialogEvent::PresLayerChanged(layer) => self.settings.pres_layer = layer,
            DialogEvent::PresCoeffChanged(coeff) => self.settings.pres_coeff = coeff,
            DialogEvent::OutputSeamsToggled(enabled) => self.settings.output_seams = enabled,
            DialogEvent::SeamColoursChanged { start, end } => {
                self.settings.colour_start = start;
                self.settings.colour_end = end;
            }
            DialogEvent::GuessClicked => return self.guess(canvas, progress),
            DialogEvent::LastValues => {
                let (width, height) = (self.settings.last_used_width, self.settings.last_used_height);
                if width > 0 && height > 0 {
                    self.apply_size(width, height);
                }
            }
            DialogEvent::ResetValues => self.apply_size(self.base.width, self.base.height),
            DialogEvent::Accepted => {
                self.settings.last_used_width = self.settings.new_width;
                self.settings.last_used_height = self.settings.new_height;
            }
        }
        Ok(self)
    }

    fn guess(mut self, canvas: &Canvas, progress: &mut dyn Progress) -> Result<Self, LqrError> {
        let disc_layer = match self.settings.disc_layer {
            Some(layer) if self.disc_enabled => layer,
            _ => {
                self.message = Some("no discard layer selected".to_string());
                return Ok(self);
            }
        };
        let direction = self.settings.guess_direction;
        let (mut width, mut height) = (self.base.width, self.base.height);
        let size = match guess_new_size(canvas, disc_layer, &self.base, direction, progress)? {
            Estimate::Proposed(size) => size,
            Estimate::Unchanged { size, reason } => {
                self.message = Some(reason.to_string());
                size
            }
        };
        match direction {
            Direction::Horizontal => width = size,
            Direction::Vertical => height = size,
        }
        self.apply_size(width, height);
        Ok(self)
    }

    fn apply_size(&mut self, width: u32, height: u32) {
        let mode = self.settings.oper_mode;
        self.settings.new_width = mode.clamp_size(width, self.base.width);
        self.settings.new_height = mode.clamp_size(height, self.base.height);
        self.refresh_warning();
    }

    fn refresh_warning(&mut self) {
        self.disc_warning = self.discard_while_enlarging();
    }

    fn discard_while_enlarging(&self) -> bool {
        let s = &self.settings;
        if !s.no_disc_on_enlarge || !self.disc_enabled || s.disc_coeff == 0 {
            return false;
        }
        let (old_w, old_h) = (self.base.width, self.base.height);
        let (new_w, new_h) = (s.new_width, s.new_height);
        match s.res_order {
            Direction::Horizontal => new_w > old_w || (new_w == old_w && new_h > old_h),
            Direction::Vertical => new_h > old_h || (new_h == old_h && new_w > old_w),
        }
    }
}
