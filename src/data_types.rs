//! Data types shared across the control core.

/// Analog inputs, in the order the sampler reads them.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Channel {
    /// Amplified voltage across the current shunt (AIN3).
    Shunt,
    /// Source voltage through the low-gain divider (AIN4), full range.
    VoltageLowGain,
    /// Source voltage through the high-gain stage (AIN5), valid up to ~6 V.
    VoltageHighGain,
}

/// Operating mode of the load.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OperationMode {
    /// Load is off.
    #[default]
    Off,
    /// Parameter entry; load is off. No guarded transition reaches it.
    Set,
    /// Load is on and regulating.
    On,
    /// Low-voltage cutoff tripped; load is off until acknowledged.
    Lvc,
}

impl OperationMode {
    /// Literal used in the telemetry line.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationMode::Off => "off",
            OperationMode::Set => "set",
            OperationMode::On => "on",
            OperationMode::Lvc => "lvc",
        }
    }
}

/// Quantity shown on the 7-segment display.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DisplayMode {
    #[default]
    Volts,
    Amps,
    AmpHours,
    Watts,
}

impl DisplayMode {
    /// Next selector in the cycle, wrapping back to volts.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Volts => DisplayMode::Amps,
            DisplayMode::Amps => DisplayMode::AmpHours,
            DisplayMode::AmpHours => DisplayMode::Watts,
            DisplayMode::Watts => DisplayMode::Volts,
        }
    }
}

/// Physical quantities derived from one cycle's channel averages.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Measurement {
    pub current_ma: u16,
    pub voltage_mv: u16,
    pub power_mw: u32,
    /// Reported voltage came from the high-gain stage.
    pub using_high_gain: bool,
}

/// User setpoints and timing knobs. Read-only to the control core once the load is built.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub target_current_ma: u16,
    pub low_voltage_cutoff_mv: u16,
    /// Duty the regulator starts from on first enable.
    pub initial_duty: u16,
    /// Fan runs while power is strictly above this.
    pub fan_threshold_mw: u32,
    /// Hold between segment/strobe edges while multiplexing.
    pub digit_settle_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_current_ma: 1000,
            low_voltage_cutoff_mv: 2000,
            initial_duty: 800,
            fan_threshold_mw: 2500,
            digit_settle_us: 100,
        }
    }
}

impl Config {
    pub fn with_target_current_ma(mut self, ma: u16) -> Self {
        self.target_current_ma = ma;
        self
    }

    pub fn with_low_voltage_cutoff_mv(mut self, mv: u16) -> Self {
        self.low_voltage_cutoff_mv = mv;
        self
    }

    pub fn with_initial_duty(mut self, duty: u16) -> Self {
        self.initial_duty = duty;
        self
    }

    pub fn with_fan_threshold_mw(mut self, mw: u32) -> Self {
        self.fan_threshold_mw = mw;
        self
    }

    pub fn with_digit_settle_us(mut self, us: u32) -> Self {
        self.digit_settle_us = us;
        self
    }
}
