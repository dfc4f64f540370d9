//! Conversion of channel averages into calibrated readings.

use crate::calibration::{
    high_gain_code_to_mv, low_gain_code_to_mv, power_mw, shunt_code_to_ma, HIGH_GAIN_THRESHOLD_MV,
};
use crate::data_types::{Channel, Measurement};
use crate::sampler::Sampler;

/// Derive current, voltage and power from the sampler's current averages.
pub fn derive<const N: usize>(sampler: &Sampler<N>) -> Measurement {
    derive_from_means(
        sampler.history(Channel::Shunt).mean(),
        sampler.history(Channel::VoltageLowGain).mean(),
        sampler.history(Channel::VoltageHighGain).mean(),
    )
}

/// Same as [`derive`], from already averaged codes.
///
/// The gain switch has no hysteresis: a source sitting on the 6 V boundary flips the
/// report between the two stages from one cycle to the next.
pub fn derive_from_means(shunt: u16, low_gain: u16, high_gain: u16) -> Measurement {
    let current_ma = shunt_code_to_ma(shunt);
    let low_gain_mv = low_gain_code_to_mv(low_gain);
    let using_high_gain = low_gain_mv <= HIGH_GAIN_THRESHOLD_MV;
    let voltage_mv = if using_high_gain {
        high_gain_code_to_mv(high_gain)
    } else {
        low_gain_mv
    };

    Measurement {
        current_ma,
        voltage_mv,
        power_mw: power_mw(current_ma, voltage_mv),
        using_high_gain,
    }
}
