//! Thermal protection.
//!
//! The fan is the only thermal defence: sustained power above the threshold keeps the
//! fan running but never disconnects the load. The low-voltage cutoff is evaluated by
//! the regulator, which sees the same measurement in the same cycle.

use crate::data_types::Measurement;

/// Fan state for this cycle. Level-triggered, no hysteresis.
pub fn fan_required(measurement: &Measurement, threshold_mw: u32) -> bool {
    measurement.power_mw > threshold_mw
}

/// True when the source has sagged below the cutoff.
pub fn undervoltage(measurement: &Measurement, cutoff_mv: u16) -> bool {
    measurement.voltage_mv < cutoff_mv
}
