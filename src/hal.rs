//! Hardware seams of the control core.
//!
//! The control logic touches the board only through these traits. Register-level
//! bring-up (clocks, timer mode, pin direction) happens before any of them is
//! handed to [`crate::ElectronicLoad`].

use embedded_hal::digital::{Error as _, ErrorKind, InputPin, OutputPin};

use crate::data_types::Channel;
use crate::display::Glyph;

/// Single-shot 10-bit converter shared by all analog channels.
///
/// The sampler polls [`conversion_complete`](Self::conversion_complete) with no
/// timeout; a converter that never finishes stalls the control loop.
pub trait AnalogFrontEnd {
    type Error: core::fmt::Debug;

    /// Select `channel` and start one conversion.
    fn start_conversion(&mut self, channel: Channel) -> Result<(), Self::Error>;

    /// End-of-conversion flag.
    fn conversion_complete(&mut self) -> Result<bool, Self::Error>;

    /// Read the right-aligned result and clear the end-of-conversion flag.
    fn take_result(&mut self) -> Result<u16, Self::Error>;
}

/// PWM timer channel driving the load MOSFET.
pub trait LoadTimer {
    type Error: core::fmt::Debug;

    fn write_compare_high(&mut self, value: u8) -> Result<(), Self::Error>;

    fn write_compare_low(&mut self, value: u8) -> Result<(), Self::Error>;

    /// Force an update event so the preloaded compare value latches.
    fn generate_update(&mut self) -> Result<(), Self::Error>;

    /// Write a 16-bit compare value. Both halves land before the update event, so the
    /// timer never latches a torn value.
    fn set_compare(&mut self, value: u16) -> Result<(), Self::Error> {
        let [high, low] = value.to_be_bytes();
        self.write_compare_high(high)?;
        self.write_compare_low(low)?;
        self.generate_update()
    }
}

/// Digital outputs owned by the control core.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Line {
    Fan,
    StatusLed,
    LoadGate,
}

pub trait ControlLines {
    type Error: core::fmt::Debug;

    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Self::Error>;
}

bitflags::bitflags! {
    /// Buttons held down at the moment of sampling.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ButtonState: u8 {
        /// ON button (PD3): toggles the load.
        const ON  = 1 << 3;
        /// SET button (PD7): cycles display mode, acknowledges LVC.
        const SET = 1 << 7;
    }
}

pub trait ButtonInputs {
    type Error: core::fmt::Debug;

    fn read_buttons(&mut self) -> Result<ButtonState, Self::Error>;
}

/// Segment lines and digit-select strobes of the 4-digit display.
pub trait SegmentDisplay {
    type Error: core::fmt::Debug;

    /// Drive the segment lines for `glyph`, plus the decimal point.
    fn set_segments(&mut self, glyph: Glyph, dot: bool) -> Result<(), Self::Error>;

    /// Assert or release the select line of digit `position` (0 = leftmost).
    fn set_digit_select(&mut self, position: usize, active: bool) -> Result<(), Self::Error>;
}

/// [`ControlLines`] over three push-pull pins.
pub struct PinLines<FAN, LED, GATE> {
    fan: FAN,
    led: LED,
    gate: GATE,
}

impl<FAN, LED, GATE> PinLines<FAN, LED, GATE> {
    pub fn new(fan: FAN, led: LED, gate: GATE) -> Self {
        Self { fan, led, gate }
    }

    /// Give the pins back.
    pub fn release(self) -> (FAN, LED, GATE) {
        (self.fan, self.led, self.gate)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), ErrorKind> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|e| e.kind())
}

impl<FAN, LED, GATE> ControlLines for PinLines<FAN, LED, GATE>
where
    FAN: OutputPin,
    LED: OutputPin,
    GATE: OutputPin,
{
    type Error = ErrorKind;

    fn set_line(&mut self, line: Line, high: bool) -> Result<(), ErrorKind> {
        match line {
            Line::Fan => drive(&mut self.fan, high),
            Line::StatusLed => drive(&mut self.led, high),
            Line::LoadGate => drive(&mut self.gate, high),
        }
    }
}

/// [`ButtonInputs`] over two pulled-up, active-low pins.
pub struct PinButtons<ON, SET> {
    on: ON,
    set: SET,
}

impl<ON, SET> PinButtons<ON, SET> {
    pub fn new(on: ON, set: SET) -> Self {
        Self { on, set }
    }

    pub fn release(self) -> (ON, SET) {
        (self.on, self.set)
    }
}

impl<ON, SET> ButtonInputs for PinButtons<ON, SET>
where
    ON: InputPin,
    SET: InputPin,
{
    type Error = ErrorKind;

    fn read_buttons(&mut self) -> Result<ButtonState, ErrorKind> {
        let mut state = ButtonState::empty();
        if self.on.is_low().map_err(|e| e.kind())? {
            state.insert(ButtonState::ON);
        }
        if self.set.is_low().map_err(|e| e.kind())? {
            state.insert(ButtonState::SET);
        }
        Ok(state)
    }
}
