//! Per-cycle telemetry line.
//!
//! `mode,volts,amps,watts,target,lvc,duty\r\n`, each numeric field six zero-padded
//! digits, e.g. `on,005231,001003,005249,001000,002000,000623\r\n`.

use core::fmt::Write;

use heapless::String;

use crate::data_types::{Measurement, OperationMode};
use crate::display::split;
use crate::error::Error;

/// Longest line: `off` or `lvc`, seven 7-byte fields, CRLF.
pub const LINE_CAPACITY: usize = 64;

/// Width of every numeric field.
pub const FIELD_DIGITS: usize = 6;

/// State reported once per cycle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Snapshot {
    pub mode: OperationMode,
    pub measurement: Measurement,
    pub target_current_ma: u16,
    pub low_voltage_cutoff_mv: u16,
    pub duty: u16,
}

fn push_field(line: &mut String<LINE_CAPACITY>, value: u32) -> Result<(), Error> {
    line.push(',').map_err(|_| Error::Telemetry)?;
    for digit in split::<FIELD_DIGITS>(value) {
        line.push((b'0' + digit) as char).map_err(|_| Error::Telemetry)?;
    }
    Ok(())
}

/// Format the telemetry line, CRLF included.
pub fn format_line(snapshot: &Snapshot) -> Result<String<LINE_CAPACITY>, Error> {
    let mut line = String::new();
    line.push_str(snapshot.mode.as_str()).map_err(|_| Error::Telemetry)?;
    push_field(&mut line, snapshot.measurement.voltage_mv as u32)?;
    push_field(&mut line, snapshot.measurement.current_ma as u32)?;
    push_field(&mut line, snapshot.measurement.power_mw)?;
    push_field(&mut line, snapshot.target_current_ma as u32)?;
    push_field(&mut line, snapshot.low_voltage_cutoff_mv as u32)?;
    push_field(&mut line, snapshot.duty as u32)?;
    line.push_str("\r\n").map_err(|_| Error::Telemetry)?;
    Ok(line)
}

/// Format and hand the line to the serial transport.
pub fn send<W: Write>(sink: &mut W, snapshot: &Snapshot) -> Result<(), Error> {
    let line = format_line(snapshot)?;
    sink.write_str(&line).map_err(|_| Error::Telemetry)
}
