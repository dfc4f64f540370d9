//! Operation-mode state machine. The only writer of [`OperationMode`].

use crate::data_types::OperationMode;

/// A transition that is not in the table.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IllegalTransition {
    pub from: OperationMode,
    pub to: OperationMode,
}

impl core::fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "illegal mode transition {} -> {}", self.from.as_str(), self.to.as_str())
    }
}

/// Legal edges: OFF->ON, ON->OFF, ON->LVC, LVC->OFF. SET has none.
pub fn is_legal(from: OperationMode, to: OperationMode) -> bool {
    use OperationMode::*;
    matches!((from, to), (Off, On) | (On, Off) | (On, Lvc) | (Lvc, Off))
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModeStateMachine {
    mode: OperationMode,
}

impl ModeStateMachine {
    /// Start in OFF.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Apply `to` if the edge is legal and return the previous mode. Rejected requests
    /// leave the mode untouched.
    #[must_use = "a rejected transition leaves the mode unchanged"]
    pub fn change_mode(&mut self, to: OperationMode) -> Result<OperationMode, IllegalTransition> {
        let from = self.mode;
        if !is_legal(from, to) {
            #[cfg(feature = "defmt")]
            defmt::debug!("mode {} -> {} rejected", from, to);
            return Err(IllegalTransition { from, to });
        }
        self.mode = to;
        #[cfg(feature = "defmt")]
        defmt::info!("mode {} -> {}", from, to);
        Ok(from)
    }
}
