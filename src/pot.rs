//! Up/down protocol of the MCP401x digital potentiometers.
//!
//! The wiper moves one step per rising edge of U/D while CS is held low; the
//! level of U/D at the falling edge of CS selects the direction. The protocol
//! is write only, so the position is tracked in software.

use crate::bus::{ControlBus, Signals};
use crate::error::Error;
use crate::expander::PortExpander;

/// Highest wiper position.
pub const MAX_POSITION: u8 = 0x3f;

/// Wiper position after the potentiometer's power-on reset.
const MIDSCALE: u8 = 0x1f;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Step {
    Up,
    Down,
}

/// One MCP401x on the control bus, selected by `select` and moved by `direction`.
#[derive(Debug)]
pub struct Potentiometer {
    select: Signals,
    direction: Signals,
    position: u8,
}

impl Potentiometer {
    /// Claims the select and direction lines as outputs and parks them high.
    pub fn new<P, E>(
        bus: &mut ControlBus<P>,
        select: Signals,
        direction: Signals,
    ) -> Result<Self, Error<E>>
    where
        P: PortExpander<Error = E>,
    {
        // Latch first so the pins never drive a low select.
        bus.set_signal(select | direction, true)?;
        bus.set_input(select | direction, false)?;
        Ok(Potentiometer {
            select,
            direction,
            position: MIDSCALE,
        })
    }

    /// Tracked wiper position.
    pub fn position(&self) -> u8 {
        self.position
    }

    /// Move the wiper one step up. The pulse is sent even at the top end,
    /// where the hardware saturates silently.
    pub fn inc<P, E>(&mut self, bus: &mut ControlBus<P>) -> Result<(), Error<E>>
    where
        P: PortExpander<Error = E>,
    {
        self.burst(bus, Step::Up, 1)?;
        self.position = self.position.saturating_add(1).min(MAX_POSITION);
        Ok(())
    }

    /// Move the wiper one step down, see [`Potentiometer::inc`].
    pub fn dec<P, E>(&mut self, bus: &mut ControlBus<P>) -> Result<(), Error<E>>
    where
        P: PortExpander<Error = E>,
    {
        self.burst(bus, Step::Down, 1)?;
        self.position = self.position.saturating_sub(1);
        Ok(())
    }

    /// Move the wiper to `target`, clamped to `0..=MAX_POSITION`, in a single
    /// chip select session.
    pub fn set<P, E>(&mut self, bus: &mut ControlBus<P>, target: u8) -> Result<(), Error<E>>
    where
        P: PortExpander<Error = E>,
    {
        let target = target.min(MAX_POSITION);
        if target > self.position {
            self.burst(bus, Step::Up, target - self.position)?;
        } else if target < self.position {
            self.burst(bus, Step::Down, self.position - target)?;
        }
        self.position = target;
        Ok(())
    }

    /// Reclaim the lines after the supply came back and run the wiper to 0.
    ///
    /// The tracked position is trusted as is: the hardware cannot be read
    /// back, so a wiper moved while unpowered stays out of sync.
    pub fn power<P, E>(&mut self, bus: &mut ControlBus<P>, on: bool) -> Result<(), Error<E>>
    where
        P: PortExpander<Error = E>,
    {
        if on {
            bus.set_input(self.select | self.direction, false)?;
            bus.set_signal(self.select, true)?;
            self.set(bus, 0)?;
        }
        Ok(())
    }

    fn burst<P, E>(&mut self, bus: &mut ControlBus<P>, step: Step, count: u8) -> Result<(), Error<E>>
    where
        P: PortExpander<Error = E>,
    {
        // U/D level at the CS falling edge latches the direction.
        let idle = step == Step::Up;
        bus.set_signal(self.direction, idle)?;
        bus.set_signal(self.select, false)?;
        for _ in 0..count {
            bus.set_signal(self.direction, !idle)?;
            bus.set_signal(self.direction, idle)?;
        }
        bus.set_signal(self.select, true)
    }
}
