use crate::config::CrankConfig;
use crate::host::{CrankState, SelectorFrame};

/// Number of frames in the indicator bitmap table.
pub const SELECTOR_FRAMES: u8 = 27;

/// Result of mapping one angle reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrankReading {
    pub start_pressed: bool,
    pub select_pressed: bool,
    /// Indicator position, 0 fully towards start, 1 fully towards select.
    /// `None` inside the dead band, where the indicator has no position.
    pub progress: Option<f32>,
}

pub fn map_angle(angle: f32, calibration: CrankConfig) -> CrankReading {
    let angle = angle.clamp(0.0, 360.0);
    let trigger = calibration.trigger_angle;
    let dead = calibration.dead_angle;

    if angle <= 180.0 - dead {
        let adjusted = angle.min(trigger);
        CrankReading {
            start_pressed: angle >= trigger,
            select_pressed: false,
            progress: Some(0.5 - adjusted / trigger * 0.5),
        }
    } else if angle >= 180.0 + dead {
        let adjusted = (360.0 - angle).min(trigger);
        CrankReading {
            start_pressed: false,
            select_pressed: angle <= 360.0 - trigger,
            progress: Some(0.5 + adjusted / trigger * 0.5),
        }
    } else {
        CrankReading {
            start_pressed: true,
            select_pressed: true,
            progress: None,
        }
    }
}

/// Indicator frame for a progress value; the extremes get dedicated frames.
pub fn selector_position(progress: f32) -> u8 {
    if progress <= 0.0 {
        0
    } else if progress >= 1.0 {
        SELECTOR_FRAMES - 1
    } else {
        1 + (progress * f32::from(SELECTOR_FRAMES - 2)).round() as u8
    }
}

/// Crank selector state kept by the game scene between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrankSelector {
    calibration: CrankConfig,
    progress: f32,
    start_pressed: bool,
    select_pressed: bool,
}

impl CrankSelector {
    pub fn new(calibration: CrankConfig) -> Self {
        Self {
            calibration,
            progress: 0.5,
            start_pressed: false,
            select_pressed: false,
        }
    }

    pub fn update(&mut self, crank: CrankState) {
        if crank.docked {
            self.start_pressed = false;
            self.select_pressed = false;
            self.progress = 0.5;
            return;
        }

        let reading = map_angle(crank.angle, self.calibration);
        self.start_pressed = reading.start_pressed;
        self.select_pressed = reading.select_pressed;
        if let Some(progress) = reading.progress {
            self.progress = progress;
        }
    }

    pub fn start_pressed(&self) -> bool {
        self.start_pressed
    }

    pub fn select_pressed(&self) -> bool {
        self.select_pressed
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn frame(&self) -> SelectorFrame {
        if self.start_pressed && self.select_pressed {
            SelectorFrame::StartSelect
        } else {
            SelectorFrame::Position(selector_position(self.progress))
        }
    }
}
