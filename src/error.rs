//! Error definitions for the load controller.

use crate::hal::Line;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Analog front end refused a channel select or result read.
    Adc,
    /// PWM timer compare/update write failed.
    Timer,
    /// Driving a digital output line failed.
    Line(Line),
    /// Reading the button port failed.
    Buttons,
    /// Segment or digit-select write failed.
    Display,
    /// Telemetry sink rejected the line.
    Telemetry,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Adc => write!(f, "ADC access failed"),
            Error::Timer => write!(f, "PWM timer write failed"),
            Error::Line(line) => write!(f, "output line {:?} write failed", line),
            Error::Buttons => write!(f, "button read failed"),
            Error::Display => write!(f, "display write failed"),
            Error::Telemetry => write!(f, "telemetry write failed"),
        }
    }
}

/// Map a backend error to `kind`, logging the backend's own report first.
pub(crate) fn hal_error<E: core::fmt::Debug>(kind: Error) -> impl FnOnce(E) -> Error {
    move |_source| {
        #[cfg(feature = "defmt")]
        defmt::error!("{}: {}", kind, defmt::Debug2Format(&_source));
        kind
    }
}
