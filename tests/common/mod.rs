#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use ebd_mini_rs::data_types::Channel;
use ebd_mini_rs::display::Glyph;
use ebd_mini_rs::driver::{Board, ElectronicLoad};
use ebd_mini_rs::hal::{AnalogFrontEnd, ButtonInputs, ButtonState, ControlLines, Line, LoadTimer, SegmentDisplay};
use ebd_mini_rs::Config;
use embedded_hal::delay::DelayNs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerOp {
    High(u8),
    Low(u8),
    Update,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayOp {
    Segments(Glyph, bool),
    Select(usize, bool),
}

/// Everything the fakes observe, shared with the test body.
#[derive(Default)]
pub struct Bench {
    /// Code returned per channel: shunt, low gain, high gain.
    pub codes: [u16; 3],
    /// Polls that report "busy" before each conversion completes.
    pub busy_polls: u32,
    pending: Option<Channel>,
    polls_left: u32,
    pub conversions: Vec<Channel>,
    pub timer: Vec<TimerOp>,
    pub lines: Vec<(Line, bool)>,
    pub buttons: ButtonState,
    pub display: Vec<DisplayOp>,
    pub holds: u32,
    pub held_ns: u64,
    /// Timer writes still to fail before the timer works again.
    pub timer_faults: u32,
    /// Next write to this line fails.
    pub line_fault: Option<Line>,
}

impl Bench {
    /// 16-bit compare values latched by the timer, in order.
    pub fn latched_compares(&self) -> Vec<u16> {
        let mut out = Vec::new();
        let (mut high, mut low) = (None, None);
        for op in &self.timer {
            match *op {
                TimerOp::High(h) => high = Some(h),
                TimerOp::Low(l) => low = Some(l),
                TimerOp::Update => {
                    out.push(u16::from_be_bytes([high.unwrap(), low.unwrap()]));
                }
            }
        }
        out
    }

    pub fn last_line(&self, line: Line) -> Option<bool> {
        self.lines.iter().rev().find(|(l, _)| *l == line).map(|(_, v)| *v)
    }
}

pub type Shared = Rc<RefCell<Bench>>;

/// Injected peripheral failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault;

fn take_fault(counter: &mut u32) -> Result<(), Fault> {
    if *counter > 0 {
        *counter -= 1;
        Err(Fault)
    } else {
        Ok(())
    }
}

fn channel_index(channel: Channel) -> usize {
    match channel {
        Channel::Shunt => 0,
        Channel::VoltageLowGain => 1,
        Channel::VoltageHighGain => 2,
    }
}

pub struct FakeAdc(pub Shared);

impl AnalogFrontEnd for FakeAdc {
    type Error = Infallible;

    fn start_conversion(&mut self, channel: Channel) -> Result<(), Infallible> {
        let mut bench = self.0.borrow_mut();
        bench.pending = Some(channel);
        bench.polls_left = bench.busy_polls;
        bench.conversions.push(channel);
        Ok(())
    }

    fn conversion_complete(&mut self) -> Result<bool, Infallible> {
        let mut bench = self.0.borrow_mut();
        if bench.polls_left > 0 {
            bench.polls_left -= 1;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    fn take_result(&mut self) -> Result<u16, Infallible> {
        let bench = self.0.borrow();
        let channel = bench.pending.expect("no conversion started");
        Ok(bench.codes[channel_index(channel)])
    }
}

/// Converter whose result register always fails.
pub struct BrokenAdc;

impl AnalogFrontEnd for BrokenAdc {
    type Error = ();

    fn start_conversion(&mut self, _channel: Channel) -> Result<(), ()> {
        Ok(())
    }

    fn conversion_complete(&mut self) -> Result<bool, ()> {
        Ok(true)
    }

    fn take_result(&mut self) -> Result<u16, ()> {
        Err(())
    }
}

pub struct FakeTimer(pub Shared);

impl LoadTimer for FakeTimer {
    type Error = Fault;

    fn write_compare_high(&mut self, value: u8) -> Result<(), Fault> {
        let mut bench = self.0.borrow_mut();
        take_fault(&mut bench.timer_faults)?;
        bench.timer.push(TimerOp::High(value));
        Ok(())
    }

    fn write_compare_low(&mut self, value: u8) -> Result<(), Fault> {
        self.0.borrow_mut().timer.push(TimerOp::Low(value));
        Ok(())
    }

    fn generate_update(&mut self) -> Result<(), Fault> {
        self.0.borrow_mut().timer.push(TimerOp::Update);
        Ok(())
    }
}

pub struct FakeLines(pub Shared);

impl ControlLines for FakeLines {
    type Error = Fault;

    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Fault> {
        let mut bench = self.0.borrow_mut();
        if bench.line_fault == Some(line) {
            bench.line_fault = None;
            return Err(Fault);
        }
        bench.lines.push((line, high));
        Ok(())
    }
}

pub struct FakeButtons(pub Shared);

impl ButtonInputs for FakeButtons {
    type Error = Infallible;

    fn read_buttons(&mut self) -> Result<ButtonState, Infallible> {
        Ok(self.0.borrow().buttons)
    }
}

pub struct FakeDisplay(pub Shared);

impl SegmentDisplay for FakeDisplay {
    type Error = Infallible;

    fn set_segments(&mut self, glyph: Glyph, dot: bool) -> Result<(), Infallible> {
        self.0.borrow_mut().display.push(DisplayOp::Segments(glyph, dot));
        Ok(())
    }

    fn set_digit_select(&mut self, position: usize, active: bool) -> Result<(), Infallible> {
        self.0.borrow_mut().display.push(DisplayOp::Select(position, active));
        Ok(())
    }
}

/// Records holds instead of sleeping.
pub struct FakeDelay(pub Shared);

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut bench = self.0.borrow_mut();
        bench.holds += 1;
        bench.held_ns += ns as u64;
    }
}

pub type TestLoad = ElectronicLoad<FakeAdc, FakeTimer, FakeLines, FakeButtons, FakeDisplay, FakeDelay>;

pub fn load(config: Config) -> (TestLoad, Shared) {
    let bench: Shared = Rc::new(RefCell::new(Bench::default()));
    let board = Board {
        adc: FakeAdc(bench.clone()),
        timer: FakeTimer(bench.clone()),
        lines: FakeLines(bench.clone()),
        buttons: FakeButtons(bench.clone()),
        display: FakeDisplay(bench.clone()),
        delay: FakeDelay(bench.clone()),
    };
    (ElectronicLoad::new(board, config), bench)
}

/// Set the raw codes every following conversion returns.
pub fn set_codes(bench: &Shared, shunt: u16, low_gain: u16, high_gain: u16) {
    bench.borrow_mut().codes = [shunt, low_gain, high_gain];
}

/// Run `cycles` measurement cycles so the averages equal the current codes.
pub fn settle(load: &mut TestLoad, cycles: usize) {
    for _ in 0..cycles {
        load.check_state().unwrap();
    }
}

/// Hold `buttons` for one poll, then release them on the next.
pub fn press(load: &mut TestLoad, bench: &Shared, buttons: ButtonState) {
    bench.borrow_mut().buttons = buttons;
    load.check_buttons().unwrap();
    bench.borrow_mut().buttons = ButtonState::empty();
    load.check_buttons().unwrap();
}
