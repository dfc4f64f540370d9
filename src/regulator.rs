//! Single-step current regulator.
//!
//! Higher duty means less conduction. Each cycle the duty moves by at most one count
//! toward the target current and never leaves `[DUTY_MIN, DUTY_MAX]` once inside it.
//! [`DUTY_OFF`] sits above the timer reload and keeps the MOSFET off.

use crate::calibration::{DUTY_MAX, DUTY_MIN, DUTY_OFF};
use crate::data_types::{Measurement, OperationMode};
use crate::protection::undervoltage;

/// What one regulator step did.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// Mode is not ON; nothing was evaluated.
    Idle,
    /// Current matches the target or the duty sits at its clamp.
    Hold,
    /// Duty stepped down to draw more current.
    Decreased(u16),
    /// Duty stepped up to draw less current.
    Increased(u16),
    /// Source below the cutoff: duty forced to [`DUTY_OFF`]. The caller must move the
    /// mode to LVC through the guarded transition.
    Undervoltage,
}

impl StepOutcome {
    /// Mode the caller should request, if any.
    pub fn requested_mode(self) -> Option<OperationMode> {
        match self {
            StepOutcome::Undervoltage => Some(OperationMode::Lvc),
            _ => None,
        }
    }

    /// The duty changed and has to be written to the timer.
    pub fn duty_changed(self) -> bool {
        !matches!(self, StepOutcome::Idle | StepOutcome::Hold)
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Regulator {
    duty: u16,
}

impl Regulator {
    pub fn new(initial_duty: u16) -> Self {
        Self { duty: initial_duty }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }

    /// Park the output at [`DUTY_OFF`].
    pub fn force_off(&mut self) {
        self.duty = DUTY_OFF;
    }

    pub fn is_off(&self) -> bool {
        self.duty == DUTY_OFF
    }

    /// Evaluate one control cycle.
    pub fn step(
        &mut self,
        measurement: &Measurement,
        mode: OperationMode,
        target_current_ma: u16,
        low_voltage_cutoff_mv: u16,
    ) -> StepOutcome {
        if mode != OperationMode::On {
            return StepOutcome::Idle;
        }

        if undervoltage(measurement, low_voltage_cutoff_mv) {
            self.force_off();
            return StepOutcome::Undervoltage;
        }

        let current = measurement.current_ma;
        if current < target_current_ma && self.duty > DUTY_MIN {
            self.duty -= 1;
            StepOutcome::Decreased(self.duty)
        } else if current > target_current_ma && self.duty < DUTY_MAX {
            self.duty += 1;
            StepOutcome::Increased(self.duty)
        } else {
            StepOutcome::Hold
        }
    }
}
