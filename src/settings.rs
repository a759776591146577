// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Persisted resize settings, kept between runs as YAML.

use crate::canvas::LayerId;
use crate::error::LqrError;
use crate::mask::Direction;
use crate::seammap::Colour;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

/// What happens after the carver has resized the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperMode {
    /// Liquid rescale only.
    Normal,
    /// Liquid rescale, then scale back to the original size.
    ScaleBack,
    /// Liquid rescale, then liquid rescale back to the original size.
    LqrBack,
}

impl Default for OperMode {
    fn default() -> Self {
        OperMode::Normal
    }
}

impl OperMode {
    /// Smallest target allowed along an axis that is `old` pixels long.
    /// Rescaling back only works if fewer than half the pixels go.
    pub fn min_size(self, old: u32) -> u32 {
        match self {
            OperMode::LqrBack => old / 2 + 1,
            _ => 0,
        }
    }

    pub fn clamp_size(self, new: u32, old: u32) -> u32 {
        std::cmp::max(new, self.min_size(old))
    }
}

impl FromStr for OperMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(OperMode::Normal),
            "scaleback" => Ok(OperMode::ScaleBack),
            "lqrback" => Ok(OperMode::LqrBack),
            _ => Err(format!("unknown operating mode '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    pub new_width: u32,
    pub new_height: u32,
    /// Layer whose painted pixels the carver should keep.
    pub pres_layer: Option<LayerId>,
    pub pres_coeff: i32,
    pub disc_layer: Option<LayerId>,
    /// Strength of the discard bias; 0 disables it.
    pub disc_coeff: i32,
    pub guess_direction: Direction,
    /// Which axis the carver resizes first.
    pub res_order: Direction,
    pub oper_mode: OperMode,
    /// Warn when a discard mask is combined with enlarging.
    pub no_disc_on_enlarge: bool,
    pub last_used_width: u32,
    pub last_used_height: u32,
    /// Add a seam map layer for every resize pass.
    pub output_seams: bool,
    /// Colour of the first seams removed.
    pub colour_start: Colour,
    /// Colour of the last seams removed.
    pub colour_end: Colour,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        ResizeSettings {
            new_width: 0,
            new_height: 0,
            pres_layer: None,
            pres_coeff: 1000,
            disc_layer: None,
            disc_coeff: 1000,
            guess_direction: Direction::Horizontal,
            res_order: Direction::Horizontal,
            oper_mode: OperMode::Normal,
            no_disc_on_enlarge: true,
            last_used_width: 0,
            last_used_height: 0,
            output_seams: false,
            colour_start: Colour::from_rgb8(255, 0, 0),
            colour_end: Colour::from_rgb8(0, 0, 255),
        }
    }
}

impl ResizeSettings {
    /// Load settings from `path`.  A missing file gives the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LqrError> {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Ok(serde_yaml::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.as_ref().display(), "no settings file, using defaults");
                Ok(ResizeSettings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LqrError> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lqrback_keeps_more_than_half() {
        assert_eq!(OperMode::LqrBack.clamp_size(10, 101), 51);
        assert_eq!(OperMode::LqrBack.clamp_size(80, 101), 80);
        assert_eq!(OperMode::LqrBack.clamp_size(3, 10), 6);
        assert_eq!(OperMode::Normal.clamp_size(0, 10), 0);
        assert_eq!(OperMode::ScaleBack.clamp_size(3, 10), 3);
    }

    #[test]
    fn settings_survive_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seammask.yaml");
        let settings = ResizeSettings {
            new_width: 320,
            disc_layer: Some(LayerId(4)),
            guess_direction: Direction::Vertical,
            oper_mode: OperMode::LqrBack,
            ..ResizeSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(ResizeSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn seam_output_and_preserve_layer_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seammask.yaml");
        let settings = ResizeSettings {
            pres_layer: Some(LayerId(2)),
            pres_coeff: 250,
            output_seams: true,
            colour_start: Colour::from_rgb8(0, 255, 0),
            colour_end: Colour::from_rgb8(255, 255, 0),
            ..ResizeSettings::default()
        };
        settings.save(&path).unwrap();
        let loaded = ResizeSettings::load(&path).unwrap();
        assert_eq!(loaded.pres_layer, Some(LayerId(2)));
        assert_eq!(loaded.pres_coeff, 250);
        assert!(loaded.output_seams);
        assert_eq!(loaded.colour_start, Colour::from_rgb8(0, 255, 0));
        assert_eq!(loaded.colour_end, Colour::from_rgb8(255, 255, 0));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ResizeSettings::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(loaded, ResizeSettings::default());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let settings: ResizeSettings =
            serde_yaml::from_str("guess_direction: vertical\noper_mode: scaleback\n").unwrap();
        assert_eq!(settings.guess_direction, Direction::Vertical);
        assert_eq!(settings.oper_mode, OperMode::ScaleBack);
        assert_eq!(settings.disc_coeff, 1000);
        assert_eq!(settings.colour_start, Colour::from_rgb8(255, 0, 0));
        assert!(!settings.output_seams);
    }

    #[test]
    fn garbage_is_a_settings_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "oper_mode: sideways\n").unwrap();
        assert!(matches!(
            ResizeSettings::load(&path),
            Err(LqrError::Settings(_))
        ));
    }
}
