//! Board constants and fixed-point conversions for the EBD-MINI front end.
//! Scale factors are measured on the stock board; the integer math truncates on purpose
//! so readings stay bit-compatible with the stock firmware.

/// Depth of each moving-average history.
pub const SAMPLES: usize = 12;

/// Largest code the 10-bit converter returns.
pub const ADC_MAX_CODE: u16 = 1023;

/// PWM timer auto-reload value. Compare values at or above this keep the MOSFET off.
pub const TIMER_RELOAD: u16 = 1024;
/// Duty written when the load is forced off.
pub const DUTY_OFF: u16 = TIMER_RELOAD + 1;
/// Lowest duty the regulator will step to (most conduction).
pub const DUTY_MIN: u16 = 300;
/// Highest duty the regulator will step to (least conduction).
pub const DUTY_MAX: u16 = 1000;

/// Shunt amplifier output per ADC step, in microvolts.
pub const SHUNT_MICROVOLTS_PER_STEP: u32 = 68;
/// Shunt resistance in the unit `SHUNT_MICROVOLTS_PER_STEP` expects (20 mΩ).
pub const SHUNT_DIVISOR: u32 = 20;

/// Low-gain divider, millivolts per ADC step.
pub const MILLIVOLTS_PER_STEP: u32 = 20;
/// High-gain stage, tenths of a millivolt per ADC step.
pub const TENTH_MILLIVOLTS_PER_STEP_HIGH_GAIN: u32 = 65;
/// Offset of the high-gain op-amp stage, millivolts.
pub const HIGH_GAIN_OFFSET_MV: u32 = 20;
/// Low-gain readings at or below this switch the report to the high-gain stage.
pub const HIGH_GAIN_THRESHOLD_MV: u16 = 6000;

/// Convert an averaged shunt code to milliamps.
pub fn shunt_code_to_ma(code: u16) -> u16 {
    ((code as u32 * SHUNT_MICROVOLTS_PER_STEP) / SHUNT_DIVISOR) as u16
}

/// Convert an averaged low-gain code to millivolts.
pub fn low_gain_code_to_mv(code: u16) -> u16 {
    (code as u32 * MILLIVOLTS_PER_STEP) as u16
}

/// Convert an averaged high-gain code to millivolts. Saturates at zero below the offset.
pub fn high_gain_code_to_mv(code: u16) -> u16 {
    let tenths = code as u32 * TENTH_MILLIVOLTS_PER_STEP_HIGH_GAIN;
    (tenths / 10).saturating_sub(HIGH_GAIN_OFFSET_MV) as u16
}

/// Power in milliwatts from milliamps and millivolts, truncating.
pub fn power_mw(current_ma: u16, voltage_mv: u16) -> u32 {
    (current_ma as u32 * voltage_mv as u32) / 1000
}
