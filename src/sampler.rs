//! Three-channel acquisition with moving-average histories.

use crate::calibration::{ADC_MAX_CODE, SAMPLES};
use crate::data_types::Channel;
use crate::error::{hal_error, Error};
use crate::hal::AnalogFrontEnd;

/// Fixed-depth ring of raw codes for one channel.
///
/// Slots start at zero, so averages taken before the ring has wrapped once read low.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelHistory<const N: usize = SAMPLES> {
    samples: [u16; N],
}

impl<const N: usize> Default for ChannelHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ChannelHistory<N> {
    pub const fn new() -> Self {
        Self { samples: [0; N] }
    }

    fn store(&mut self, slot: usize, code: u16) {
        self.samples[slot] = code;
    }

    pub fn samples(&self) -> &[u16; N] {
        &self.samples
    }

    pub fn sum(&self) -> u32 {
        self.samples.iter().map(|&s| s as u32).sum()
    }

    /// Truncating mean over all `N` slots.
    pub fn mean(&self) -> u16 {
        (self.sum() / N as u32) as u16
    }
}

/// Lock-step histories for the shunt and both voltage stages.
///
/// One cursor is shared by all three rings, so every ring ages out the sample taken
/// on the same tick.
#[derive(Clone, Debug, Default)]
pub struct Sampler<const N: usize = SAMPLES> {
    shunt: ChannelHistory<N>,
    low_gain: ChannelHistory<N>,
    high_gain: ChannelHistory<N>,
    cursor: usize,
}

impl<const N: usize> Sampler<N> {
    pub fn new() -> Self {
        Self {
            shunt: ChannelHistory::new(),
            low_gain: ChannelHistory::new(),
            high_gain: ChannelHistory::new(),
            cursor: 0,
        }
    }

    /// Read one sample from every channel (shunt, low gain, high gain) and store them.
    ///
    /// Blocks until each conversion finishes.
    pub fn acquire_cycle<A: AnalogFrontEnd>(&mut self, adc: &mut A) -> Result<(), Error> {
        let shunt = read_channel(adc, Channel::Shunt)?;
        let low_gain = read_channel(adc, Channel::VoltageLowGain)?;
        let high_gain = read_channel(adc, Channel::VoltageHighGain)?;
        self.record(shunt, low_gain, high_gain);
        Ok(())
    }

    /// Store one tick's codes at the cursor and advance it.
    pub fn record(&mut self, shunt: u16, low_gain: u16, high_gain: u16) {
        let slot = self.cursor;
        self.shunt.store(slot, shunt & ADC_MAX_CODE);
        self.low_gain.store(slot, low_gain & ADC_MAX_CODE);
        self.high_gain.store(slot, high_gain & ADC_MAX_CODE);
        self.cursor = (slot + 1) % N;
    }

    pub fn history(&self, channel: Channel) -> &ChannelHistory<N> {
        match channel {
            Channel::Shunt => &self.shunt,
            Channel::VoltageLowGain => &self.low_gain,
            Channel::VoltageHighGain => &self.high_gain,
        }
    }

    /// Slot the next sample lands in.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Run one conversion on `channel`, spinning on end-of-conversion.
pub fn read_channel<A: AnalogFrontEnd>(adc: &mut A, channel: Channel) -> Result<u16, Error> {
    adc.start_conversion(channel).map_err(hal_error(Error::Adc))?;
    while !adc.conversion_complete().map_err(hal_error(Error::Adc))? {
        core::hint::spin_loop();
    }
    let code = adc.take_result().map_err(hal_error(Error::Adc))?;
    Ok(code & ADC_MAX_CODE)
}
