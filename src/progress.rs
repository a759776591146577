// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Advisory progress reporting.  Nothing here may affect a result;
//! `NoProgress` is always a valid substitute.

/// Something that wants to hear about long-running line loops.
pub trait Progress {
    fn init(&mut self, message: &str);

    /// `fraction` runs from 0.0 to 1.0.
    fn update(&mut self, fraction: f64);
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn init(&mut self, _message: &str) {}
    fn update(&mut self, _fraction: f64) {}
}

/// Sends reports to the `tracing` subscriber at debug level.
#[derive(Debug, Default, Clone)]
pub struct LogProgress {
    task: String,
}

impl Progress for LogProgress {
    fn init(&mut self, message: &str) {
        self.task = message.to_string();
        tracing::debug!(task = %self.task, "started");
    }

    fn update(&mut self, fraction: f64) {
        tracing::debug!(task = %self.task, percent = (fraction * 100.0).round(), "progress");
    }
}

/// Reports roughly twenty times over `extent` lines, never less often
/// than every line.
pub fn update_step(extent: u32) -> u32 {
    std::cmp::max(extent.saturating_sub(1) / 20, 1)
}

/// Report line `line` of `extent` if it falls on the update cadence.
pub(crate) fn tick(progress: &mut dyn Progress, line: u32, extent: u32) {
    if line % update_step(extent) == 0 {
        let fraction = if extent > 1 {
            f64::from(line) / f64::from(extent - 1)
        } else {
            1.0
        };
        progress.update(fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<f64>);

    impl Progress for Recorder {
        fn init(&mut self, _message: &str) {}
        fn update(&mut self, fraction: f64) {
            self.0.push(fraction);
        }
    }

    #[test]
    fn cadence_matches_twentieths() {
        assert_eq!(update_step(0), 1);
        assert_eq!(update_step(1), 1);
        assert_eq!(update_step(20), 1);
        assert_eq!(update_step(41), 2);
        assert_eq!(update_step(1001), 50);
    }

    #[test]
    fn single_line_reports_completion() {
        let mut rec = Recorder::default();
        tick(&mut rec, 0, 1);
        assert_eq!(rec.0, [1.0]);
    }

    #[test]
    fn reports_are_bounded() {
        let mut rec = Recorder::default();
        for line in 0..401 {
            tick(&mut rec, line, 401);
        }
        assert_eq!(rec.0.len(), 21);
        assert_eq!(rec.0.last().copied(), Some(1.0));
    }
}
