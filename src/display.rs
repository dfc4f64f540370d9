//! 4-digit 7-segment display adapter.
//!
//! A reading in milli-units is shown as up to three whole-unit digits, the ones digit
//! carrying the decimal point, fractional digits filling the rest, and a unit glyph in
//! the last position. Segment patterns and pin mapping belong to the
//! [`SegmentDisplay`] implementation.

use embedded_hal::delay::DelayNs;

use crate::data_types::{DisplayMode, Measurement};
use crate::error::{hal_error, Error};
use crate::hal::SegmentDisplay;

/// Number of digit positions.
pub const DIGITS: usize = 4;

/// Symbols the segment driver knows how to draw.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Glyph {
    /// Decimal digit, 0..=9.
    Digit(u8),
    /// `A`, amps.
    A,
    /// `V`, volts from the low-gain stage.
    V,
    /// `v`, volts from the high-gain stage.
    LittleV,
    #[default]
    Blank,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Cell {
    pub glyph: Glyph,
    pub dot: bool,
}

/// One full display refresh, leftmost position first.
pub type Frame = [Cell; DIGITS];

/// Split `value` into `N` decimal digits, most significant first.
///
/// Digits are peeled from the least significant end; once the remainder is exhausted
/// the loop stops and the untouched leading slots stay zero. Values wider than `N`
/// digits keep their low `N` digits.
pub fn split<const N: usize>(mut value: u32) -> [u8; N] {
    let mut digits = [0u8; N];
    for slot in (0..N).rev() {
        let digit = value % 10;
        digits[slot] = digit as u8;
        value -= digit;
        if value == 0 {
            break;
        }
        value /= 10;
    }
    digits
}

/// Value and unit glyph for the selected display mode.
pub fn reading(mode: DisplayMode, measurement: &Measurement) -> (u32, Glyph) {
    match mode {
        DisplayMode::Volts => {
            let unit = if measurement.using_high_gain { Glyph::LittleV } else { Glyph::V };
            (measurement.voltage_mv as u32, unit)
        }
        DisplayMode::Amps => (measurement.current_ma as u32, Glyph::A),
        // No time base to integrate charge against; the counter stays at zero.
        DisplayMode::AmpHours => (0, Glyph::Blank),
        DisplayMode::Watts => (measurement.power_mw, Glyph::Blank),
    }
}

/// Lay out a milli-unit `value` followed by `unit`.
pub fn layout(value: u32, unit: Glyph) -> Frame {
    let mut frame = Frame::default();
    let mut position = 0;

    let units = split::<3>(value / 1000);
    let first = units.iter().position(|&d| d != 0).unwrap_or(2).min(2);
    for (pos, &digit) in units.iter().enumerate().skip(first) {
        frame[position] = Cell {
            glyph: Glyph::Digit(digit),
            dot: pos == 2,
        };
        position += 1;
    }

    let millis = split::<3>(value % 1000);
    for &digit in millis.iter() {
        if position >= DIGITS - 1 {
            break;
        }
        frame[position] = Cell {
            glyph: Glyph::Digit(digit),
            dot: false,
        };
        position += 1;
    }

    frame[position] = Cell { glyph: unit, dot: false };
    frame
}

/// Frame for the current display mode.
pub fn render(mode: DisplayMode, measurement: &Measurement) -> Frame {
    let (value, unit) = reading(mode, measurement);
    layout(value, unit)
}

/// Multiplex one frame: per digit, set segments, settle, strobe, settle, release.
///
/// Blocks for `2 * DIGITS * settle_us`; that time is part of the control loop period.
pub fn drive_frame<S, D>(display: &mut S, delay: &mut D, frame: &Frame, settle_us: u32) -> Result<(), Error>
where
    S: SegmentDisplay,
    D: DelayNs,
{
    for (position, cell) in frame.iter().enumerate() {
        display.set_segments(cell.glyph, cell.dot).map_err(hal_error(Error::Display))?;
        delay.delay_us(settle_us);
        display.set_digit_select(position, true).map_err(hal_error(Error::Display))?;
        delay.delay_us(settle_us);
        display.set_digit_select(position, false).map_err(hal_error(Error::Display))?;
    }
    Ok(())
}

/// Async version of [`drive_frame`].
#[cfg(feature = "async")]
pub async fn drive_frame_async<S, D>(
    display: &mut S,
    delay: &mut D,
    frame: &Frame,
    settle_us: u32,
) -> Result<(), Error>
where
    S: SegmentDisplay,
    D: embedded_hal_async::delay::DelayNs,
{
    for (position, cell) in frame.iter().enumerate() {
        display.set_segments(cell.glyph, cell.dot).map_err(hal_error(Error::Display))?;
        delay.delay_us(settle_us).await;
        display.set_digit_select(position, true).map_err(hal_error(Error::Display))?;
        delay.delay_us(settle_us).await;
        display.set_digit_select(position, false).map_err(hal_error(Error::Display))?;
    }
    Ok(())
}
