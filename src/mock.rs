//! In-memory expander wired to a minimal HD44780 and two MCP401x models.

extern crate std;

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::vec::Vec;

use hal::blocking::delay::{DelayMs, DelayUs};

use crate::bus::Signals;
use crate::expander::{Port, PortExpander};
use crate::pot::MAX_POSITION;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FakeError;

/// What the controller saw, in order, interleaved with delays.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Event {
    Command(u8),
    Data(u8),
    DelayUs(u32),
}

#[derive(Debug)]
pub struct Wiper {
    pub wiper: u8,
    /// Number of chip select falling edges.
    pub sessions: u32,
    up: Option<bool>,
}

impl Wiper {
    fn new() -> Self {
        Wiper {
            wiper: 0x1f,
            sessions: 0,
            up: None,
        }
    }

    fn observe(&mut self, prev: u8, next: u8, select: Signals) {
        let ud = Signals::UD.bits();
        let was_selected = prev & select.bits() == 0;
        let selected = next & select.bits() == 0;
        if !was_selected && selected {
            self.sessions += 1;
            self.up = Some(next & ud != 0);
        } else if was_selected && !selected {
            self.up = None;
        } else if let Some(up) = self.up {
            if prev & ud == 0 && next & ud != 0 {
                self.wiper = if up {
                    (self.wiper + 1).min(MAX_POSITION)
                } else {
                    self.wiper.saturating_sub(1)
                };
            }
        }
    }
}

#[derive(Debug)]
pub struct State {
    pub control: u8,
    pub data: u8,
    pub control_dir: u8,
    pub data_dir: u8,
    pub control_writes: Vec<u8>,
    pub events: Vec<Event>,
    pub ddram: [u8; 128],
    pub cgram: [u8; 64],
    pub ac: u8,
    cgram_mode: bool,
    /// Status reads still answering busy.
    pub busy_polls: u32,
    pub status_reads: u32,
    /// Port operations left before every further one fails.
    pub fail_after: Option<usize>,
    pub contrast: Wiper,
    pub backlight: Wiper,
}

impl State {
    fn check(&mut self) -> Result<(), FakeError> {
        match self.fail_after {
            Some(0) => Err(FakeError),
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn control_written(&mut self, prev: u8, next: u8) {
        let en = Signals::EN.bits();
        if prev & en != 0 && next & en == 0 {
            let rs = prev & Signals::RS.bits() != 0;
            let rw = prev & Signals::RW.bits() != 0;
            match (rw, rs) {
                (false, false) => self.command(self.data),
                (false, true) => self.write_ram(self.data),
                (true, true) => self.advance(),
                (true, false) => {}
            }
        }
        self.contrast.observe(prev, next, Signals::CCS);
        self.backlight.observe(prev, next, Signals::BCS);
    }

    fn command(&mut self, byte: u8) {
        match byte.leading_zeros() {
            0 => {
                self.ac = byte & 0x7f;
                self.cgram_mode = false;
            }
            1 => {
                self.ac = byte & 0x3f;
                self.cgram_mode = true;
            }
            6 => {
                self.ac = 0;
                self.cgram_mode = false;
            }
            7 => {
                self.ddram = [b' '; 128];
                self.ac = 0;
                self.cgram_mode = false;
            }
            _ => {}
        }
        self.events.push(Event::Command(byte));
    }

    fn write_ram(&mut self, byte: u8) {
        if self.cgram_mode {
            self.cgram[self.ac as usize & 0x3f] = byte;
        } else {
            self.ddram[self.ac as usize & 0x7f] = byte;
        }
        self.advance();
        self.events.push(Event::Data(byte));
    }

    fn read_ram(&self) -> u8 {
        if self.cgram_mode {
            self.cgram[self.ac as usize & 0x3f]
        } else {
            self.ddram[self.ac as usize & 0x7f]
        }
    }

    fn advance(&mut self) {
        let mask = if self.cgram_mode { 0x3f } else { 0x7f };
        self.ac = (self.ac + 1) & mask;
    }

    /// Instruction bytes sent so far.
    pub fn commands(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Command(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Fake(Rc<RefCell<State>>);

impl Fake {
    pub fn new() -> Self {
        Fake(Rc::new(RefCell::new(State {
            control: 0,
            data: 0,
            control_dir: 0xff,
            data_dir: 0xff,
            control_writes: Vec::new(),
            events: Vec::new(),
            ddram: [b' '; 128],
            cgram: [0; 64],
            ac: 0,
            cgram_mode: false,
            busy_polls: 0,
            status_reads: 0,
            fail_after: None,
            contrast: Wiper::new(),
            backlight: Wiper::new(),
        })))
    }

    pub fn state(&self) -> RefMut<'_, State> {
        self.0.borrow_mut()
    }

    pub fn expander(&self) -> FakeExpander {
        FakeExpander(self.0.clone())
    }

    pub fn delay(&self) -> FakeDelay {
        FakeDelay(self.0.clone())
    }
}

#[derive(Debug)]
pub struct FakeExpander(Rc<RefCell<State>>);

impl PortExpander for FakeExpander {
    type Error = FakeError;

    fn set_port_direction(&mut self, port: Port, mask: u8) -> Result<(), FakeError> {
        let mut state = self.0.borrow_mut();
        state.check()?;
        match port {
            Port::Control => state.control_dir = mask,
            Port::Data => state.data_dir = mask,
        }
        Ok(())
    }

    fn set_port_output(&mut self, port: Port, value: u8) -> Result<(), FakeError> {
        let mut state = self.0.borrow_mut();
        state.check()?;
        match port {
            Port::Control => {
                let prev = state.control;
                state.control = value;
                state.control_writes.push(value);
                state.control_written(prev, value);
            }
            Port::Data => state.data = value,
        }
        Ok(())
    }

    fn port_output(&mut self, port: Port) -> Result<u8, FakeError> {
        let mut state = self.0.borrow_mut();
        state.check()?;
        Ok(match port {
            Port::Control => state.control,
            Port::Data => state.data,
        })
    }

    fn port_input(&mut self, port: Port) -> Result<u8, FakeError> {
        let mut state = self.0.borrow_mut();
        state.check()?;
        let control = state.control;
        if port == Port::Control {
            return Ok(control);
        }
        if control & Signals::RW.bits() == 0 || control & Signals::EN.bits() == 0 {
            return Ok(state.data);
        }
        if control & Signals::RS.bits() != 0 {
            return Ok(state.read_ram());
        }
        state.status_reads += 1;
        if state.busy_polls > 0 {
            state.busy_polls -= 1;
            Ok(0x80 | state.ac)
        } else {
            Ok(state.ac)
        }
    }
}

#[derive(Debug)]
pub struct FakeDelay(Rc<RefCell<State>>);

impl DelayMs<u8> for FakeDelay {
    fn delay_ms(&mut self, ms: u8) {
        self.0.borrow_mut().events.push(Event::DelayUs(ms as u32 * 1000));
    }
}

impl DelayUs<u16> for FakeDelay {
    fn delay_us(&mut self, us: u16) {
        self.0.borrow_mut().events.push(Event::DelayUs(us as u32));
    }
}
