//! EBD-MINI electronic load control core
//!
//! Measurement, filtering and regulation for a PWM-driven MOSFET load. The crate is
//! no-std and reaches the board only through the traits in [`hal`], so the whole
//! control cycle runs on a host against fakes. Optional async settle holds and
//! defmt logging sit behind the `async` and `defmt` features.

#![no_std]

pub mod calibration;
pub mod data_types;
pub mod display;
pub mod driver;
pub mod error;
pub mod hal;
pub mod measurement;
pub mod mode;
pub mod protection;
pub mod regulator;
pub mod sampler;
pub mod telemetry;

pub use data_types::{Config, DisplayMode, Measurement, OperationMode};
pub use driver::{Board, ElectronicLoad};
pub use error::Error;
