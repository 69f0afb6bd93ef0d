use bitflags::bitflags;

use crate::error::Error;
use crate::expander::{Port, PortExpander};

bitflags! {
    /// Lines wired to the control port of the expander.
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct Signals: u8 {
        /// LCD enable strobe; the controller latches on the falling edge.
        const EN = 1;
        /// LCD read/write, high for read.
        const RW = 1 << 1;
        /// LCD register select, high for data RAM, low for instructions.
        const RS = 1 << 2;
        /// Interrupt sense, glued to RW/RS/EN and D7. Input only.
        const IRS = 1 << 3;
        /// LCD supply switch.
        const PWR = 1 << 4;
        /// Up/down line shared by both potentiometers.
        const UD = 1 << 5;
        /// Contrast potentiometer chip select, active low.
        const CCS = 1 << 6;
        /// Backlight potentiometer chip select, active low.
        const BCS = 1 << 7;
    }
}

/// Owner of the expander and of the shadow of the control port latch.
///
/// Every signal change is a read-modify-write of the shadow followed by one
/// full byte write to the control port, so the shadow always equals the
/// latch.
#[derive(Debug)]
pub struct ControlBus<P> {
    port: P,
    shadow: Signals,
    direction: u8,
}

impl<P, E> ControlBus<P>
where
    P: PortExpander<Error = E>,
{
    /// Takes over the expander, adopting its current control latch.
    pub fn new(mut port: P) -> Result<Self, Error<E>> {
        let latch = port.port_output(Port::Control).map_err(Error::Bus)?;
        Ok(ControlBus {
            port,
            shadow: Signals::from_bits_retain(latch),
            // Power-on default of the expander: everything is an input.
            direction: 0xff,
        })
    }

    /// Current state of the control latch.
    pub fn signals(&self) -> Signals {
        self.shadow
    }

    pub fn set_signal(&mut self, mask: Signals, enabled: bool) -> Result<(), Error<E>> {
        let mut next = self.shadow;
        next.set(mask, enabled);
        self.port
            .set_port_output(Port::Control, next.bits())
            .map_err(Error::Bus)?;
        self.shadow = next;
        Ok(())
    }

    /// Switch control lines between input (`true`) and push/pull output.
    pub fn set_input(&mut self, mask: Signals, input: bool) -> Result<(), Error<E>> {
        let direction = if input {
            self.direction | mask.bits()
        } else {
            self.direction & !mask.bits()
        };
        self.set_control_direction(direction)
    }

    pub fn set_control_direction(&mut self, mask: u8) -> Result<(), Error<E>> {
        self.port
            .set_port_direction(Port::Control, mask)
            .map_err(Error::Bus)?;
        self.direction = mask;
        Ok(())
    }

    pub fn set_data_direction(&mut self, mask: u8) -> Result<(), Error<E>> {
        self.port
            .set_port_direction(Port::Data, mask)
            .map_err(Error::Bus)
    }

    pub fn write_data(&mut self, value: u8) -> Result<(), Error<E>> {
        self.port
            .set_port_output(Port::Data, value)
            .map_err(Error::Bus)
    }

    pub fn read_data(&mut self) -> Result<u8, Error<E>> {
        self.port.port_input(Port::Data).map_err(Error::Bus)
    }

    pub fn release(self) -> P {
        self.port
    }
}
