//! Control-cycle driver for the EBD-MINI load.
//!
//! One [`ElectronicLoad::run_cycle`] call runs measure/protect/regulate, telemetry,
//! buttons and the display refresh in that order, to completion. Call it forever from
//! the main loop; nothing here is interrupt driven.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

use crate::calibration::TIMER_RELOAD;
use crate::data_types::{Config, DisplayMode, Measurement, OperationMode};
use crate::display::{drive_frame, render};
use crate::error::{hal_error, Error};
use crate::hal::{AnalogFrontEnd, ButtonInputs, ButtonState, ControlLines, Line, LoadTimer, SegmentDisplay};
use crate::measurement::derive;
use crate::mode::ModeStateMachine;
use crate::protection::fan_required;
use crate::regulator::{Regulator, StepOutcome};
use crate::sampler::Sampler;
use crate::telemetry::{self, Snapshot};

/// Peripherals the load runs on.
pub struct Board<ADC, TIM, LINES, BTN, DISP, D> {
    pub adc: ADC,
    pub timer: TIM,
    pub lines: LINES,
    pub buttons: BTN,
    pub display: DISP,
    pub delay: D,
}

/// Electronic load controller.
pub struct ElectronicLoad<ADC, TIM, LINES, BTN, DISP, D> {
    board: Board<ADC, TIM, LINES, BTN, DISP, D>,
    config: Config,
    sampler: Sampler,
    measurement: Measurement,
    regulator: Regulator,
    mode: ModeStateMachine,
    display_mode: DisplayMode,
    /// Compare value last written to the timer.
    applied_duty: u16,
    held_buttons: ButtonState,
    fan_on: bool,
}

impl<ADC, TIM, LINES, BTN, DISP, D> ElectronicLoad<ADC, TIM, LINES, BTN, DISP, D> {
    /// Wrap a board. Nothing is written until [`init`](Self::init).
    pub fn new(board: Board<ADC, TIM, LINES, BTN, DISP, D>, config: Config) -> Self {
        Self {
            board,
            config,
            sampler: Sampler::new(),
            measurement: Measurement::default(),
            regulator: Regulator::new(config.initial_duty),
            mode: ModeStateMachine::new(),
            display_mode: DisplayMode::default(),
            applied_duty: TIMER_RELOAD,
            held_buttons: ButtonState::empty(),
            fan_on: false,
        }
    }

    /// Give the peripherals back.
    pub fn release(self) -> Board<ADC, TIM, LINES, BTN, DISP, D> {
        self.board
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> OperationMode {
        self.mode.mode()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Readings from the most recent cycle.
    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    pub fn duty(&self) -> u16 {
        self.regulator.duty()
    }

    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// What the telemetry line reports.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode.mode(),
            measurement: self.measurement,
            target_current_ma: self.config.target_current_ma,
            low_voltage_cutoff_mv: self.config.low_voltage_cutoff_mv,
            duty: self.regulator.duty(),
        }
    }
}

impl<ADC, TIM, LINES, BTN, DISP, D> ElectronicLoad<ADC, TIM, LINES, BTN, DISP, D>
where
    ADC: AnalogFrontEnd,
    TIM: LoadTimer,
    LINES: ControlLines,
    BTN: ButtonInputs,
    DISP: SegmentDisplay,
{
    /// Park the output, light the status LED and spin the fan until the first cycle
    /// decides otherwise.
    pub fn init(&mut self) -> Result<(), Error> {
        self.board.timer.set_compare(TIMER_RELOAD).map_err(hal_error(Error::Timer))?;
        self.applied_duty = TIMER_RELOAD;
        self.set_line(Line::LoadGate, false)?;
        self.set_line(Line::StatusLed, true)?;
        self.set_line(Line::Fan, true)?;
        self.fan_on = true;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "load ready: target={}mA lvc={}mV duty={}",
            self.config.target_current_ma,
            self.config.low_voltage_cutoff_mv,
            self.regulator.duty()
        );
        Ok(())
    }

    /// Sample, derive, protect and regulate.
    ///
    /// Ends by bringing the timer and load gate in line with the mode, so an output
    /// write that failed in an earlier call is retried here.
    pub fn check_state(&mut self) -> Result<StepOutcome, Error> {
        self.sampler.acquire_cycle(&mut self.board.adc)?;
        self.measurement = derive(&self.sampler);

        self.update_fan()?;

        let outcome = self.regulator.step(
            &self.measurement,
            self.mode.mode(),
            self.config.target_current_ma,
            self.config.low_voltage_cutoff_mv,
        );
        if outcome.duty_changed() {
            self.apply_duty()?;
        }
        if let Some(mode) = outcome.requested_mode() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "low-voltage cutoff: {}mV < {}mV",
                self.measurement.voltage_mv,
                self.config.low_voltage_cutoff_mv
            );
            self.request_mode(mode)?;
        }
        self.reconcile_output()?;
        Ok(outcome)
    }

    /// Move to `to` through the guarded transition and apply its side effects.
    ///
    /// Returns `Ok(false)` when the edge is not legal; nothing changes in that case.
    /// An output write that fails here leaves the new mode in place and the next
    /// [`check_state`](Self::check_state) writes it again.
    pub fn request_mode(&mut self, to: OperationMode) -> Result<bool, Error> {
        let from = match self.mode.change_mode(to) {
            Ok(from) => from,
            Err(_) => return Ok(false),
        };
        if from == OperationMode::On {
            self.regulator.force_off();
            self.apply_duty()?;
            self.set_line(Line::LoadGate, false)?;
        }
        if to == OperationMode::On {
            self.apply_duty()?;
            self.set_line(Line::LoadGate, true)?;
        }
        Ok(true)
    }

    /// Emit this cycle's telemetry line.
    pub fn send_state<W: Write>(&self, sink: &mut W) -> Result<(), Error> {
        telemetry::send(sink, &self.snapshot())
    }

    /// Act on buttons pressed since the previous poll.
    pub fn check_buttons(&mut self) -> Result<(), Error> {
        let held = self.board.buttons.read_buttons().map_err(hal_error(Error::Buttons))?;
        let pressed = held.difference(self.held_buttons);
        self.held_buttons = held;

        if pressed.contains(ButtonState::ON) {
            let to = if self.mode.mode() == OperationMode::On {
                OperationMode::Off
            } else {
                OperationMode::On
            };
            self.request_mode(to)?;
        }

        if pressed.contains(ButtonState::SET) {
            match self.mode.mode() {
                OperationMode::Off => self.display_mode = self.display_mode.next(),
                OperationMode::Lvc => {
                    self.request_mode(OperationMode::Off)?;
                }
                OperationMode::Set | OperationMode::On => {}
            }
        }
        Ok(())
    }

    fn update_fan(&mut self) -> Result<(), Error> {
        let fan = fan_required(&self.measurement, self.config.fan_threshold_mw);
        self.set_line(Line::Fan, fan)?;
        if fan != self.fan_on {
            #[cfg(feature = "defmt")]
            defmt::info!("fan {} at {}mW", if fan { "on" } else { "off" }, self.measurement.power_mw);
            self.fan_on = fan;
        }
        Ok(())
    }

    /// Outside ON the timer must hold the off sentinel once the regulator has been
    /// forced off, and the gate is low; in ON both follow the regulator.
    fn reconcile_output(&mut self) -> Result<(), Error> {
        let on = self.mode.mode() == OperationMode::On;
        if on || self.regulator.is_off() {
            self.apply_duty()?;
        }
        self.set_line(Line::LoadGate, on)
    }

    fn apply_duty(&mut self) -> Result<(), Error> {
        let duty = self.regulator.duty();
        if duty == self.applied_duty {
            return Ok(());
        }
        self.board.timer.set_compare(duty).map_err(hal_error(Error::Timer))?;
        self.applied_duty = duty;
        Ok(())
    }

    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Error> {
        self.board.lines.set_line(line, high).map_err(hal_error(Error::Line(line)))
    }
}

impl<ADC, TIM, LINES, BTN, DISP, D> ElectronicLoad<ADC, TIM, LINES, BTN, DISP, D>
where
    ADC: AnalogFrontEnd,
    TIM: LoadTimer,
    LINES: ControlLines,
    BTN: ButtonInputs,
    DISP: SegmentDisplay,
    D: DelayNs,
{
    /// Multiplex the selected reading onto the display once.
    pub fn update_display(&mut self) -> Result<(), Error> {
        let frame = render(self.display_mode, &self.measurement);
        drive_frame(
            &mut self.board.display,
            &mut self.board.delay,
            &frame,
            self.config.digit_settle_us,
        )
    }

    /// One full control cycle.
    pub fn run_cycle<W: Write>(&mut self, telemetry: &mut W) -> Result<StepOutcome, Error> {
        let outcome = self.check_state()?;
        self.send_state(telemetry)?;
        self.check_buttons()?;
        self.update_display()?;
        Ok(outcome)
    }
}

#[cfg(feature = "async")]
impl<ADC, TIM, LINES, BTN, DISP, D> ElectronicLoad<ADC, TIM, LINES, BTN, DISP, D>
where
    ADC: AnalogFrontEnd,
    TIM: LoadTimer,
    LINES: ControlLines,
    BTN: ButtonInputs,
    DISP: SegmentDisplay,
    D: embedded_hal_async::delay::DelayNs,
{
    /// Async version of [`update_display`](Self::update_display).
    pub async fn update_display_async(&mut self) -> Result<(), Error> {
        let frame = render(self.display_mode, &self.measurement);
        crate::display::drive_frame_async(
            &mut self.board.display,
            &mut self.board.delay,
            &frame,
            self.config.digit_settle_us,
        )
        .await
    }

    /// Async version of [`run_cycle`](Self::run_cycle). Sampling still spins on the
    /// converter; only the display settle holds yield.
    pub async fn run_cycle_async<W: Write>(&mut self, telemetry: &mut W) -> Result<StepOutcome, Error> {
        let outcome = self.check_state()?;
        self.send_state(telemetry)?;
        self.check_buttons()?;
        self.update_display_async().await?;
        Ok(outcome)
    }
}
