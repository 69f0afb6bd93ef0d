//! A platform agnostic Rust driver for HD44780 character LCDs wired through a
//! PCA9535 port expander, based on the
//! [`embedded-hal`](https://github.com/japaric/embedded-hal) traits.
//!
//! ## The Device
//!
//! The I2LCD module puts an HD44780 compatible display in 8-bit mode behind
//! an NXP PCA9535 16-bit I²C GPIO expander. Port 0 carries the LCD control
//! lines, the display supply switch and the up/down interface of two
//! Microchip MCP401x digital potentiometers (contrast and backlight); port 1
//! carries the LCD data bus.
//!
//! - [HD44780 datasheet](https://www.sparkfun.com/datasheets/LCD/HD44780.pdf)
//! - [PCA9535 datasheet](https://www.nxp.com/docs/en/data-sheet/PCA9535_PCA9535C.pdf)
//! - [MCP401x datasheet](https://ww1.microchip.com/downloads/en/DeviceDoc/21978c.pdf)
//!
//! ## Usage
//!
//! ### Instantiating
//!
//! Import this crate and an `embedded_hal` implementation:
//!
//! ```
//! extern crate linux_embedded_hal as hal;
//! extern crate i2lcd;
//! ```
//!
//! Then instantiate the device:
//!
//! ```no_run
//! # extern crate linux_embedded_hal as hal;
//! # extern crate i2lcd;
//! use core::fmt::Write;
//! use hal::{Delay, I2cdev};
//! use i2lcd::{I2Lcd, I2C_ADDRESS};
//!
//! # fn main() {
//! let dev = I2cdev::new("/dev/i2c-1").unwrap();
//! let mut display = I2Lcd::new(dev, I2C_ADDRESS, Delay, 16, 2).unwrap();
//! display.power(true).unwrap();
//! display.set_backlight(0x3f).unwrap();
//! display.set_contrast(0x0c).unwrap();
//! display.print("Hello\nRust").unwrap();
//! write!(display, " {}", 2018).unwrap();
//! # }
//! ```

#![no_std]

extern crate embedded_hal as hal;

mod bus;
mod command;
mod config;
mod error;
mod expander;
mod geometry;
mod layout;
#[cfg(test)]
mod mock;
mod pot;
mod wait;

use core::fmt;
use hal::blocking::delay::{DelayMs, DelayUs};
use hal::blocking::i2c::{Write, WriteRead};
use log::{debug, trace};

pub use bus::{ControlBus, Signals};
pub use command::{Direction, Instruction, Status};
pub use config::Config;
pub use error::Error;
pub use expander::{Pca9535, Port, PortExpander, I2C_ADDRESS};
pub use geometry::{DisplayType, Geometry};
pub use pot::{Potentiometer, MAX_POSITION};
pub use wait::WaitMode;

use command::*;
use layout::Spans;

/// Time the supply needs to settle before the first instruction.
const POWER_ON_DELAY_MS: u8 = 40;
/// Extra wait after the first and second function set of the reset sequence.
const RESET_DELAYS_US: [u16; 2] = [4100, 100];

/// Controller protocol state.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    Uninitialized,
    Initializing,
    Ready,
}

/// Driver for an I2LCD module
#[derive(Debug)]
pub struct I2Lcd<P, D> {
    bus: ControlBus<P>,
    delay: D,
    config: Config,
    geometry: Geometry,
    contrast: Potentiometer,
    backlight: Potentiometer,
    column: u8,
    row: u8,
    /// Last value sent with each instruction.
    commands: [u8; Instruction::COUNT],
    wait: WaitMode,
    state: State,
}

impl<I2C, E, D> I2Lcd<Pca9535<I2C>, D>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u8> + DelayUs<u16>,
{
    /// Set up the module at `address` for a `columns` x `rows` display.
    ///
    /// `rows == 0` selects a 16 column one-line display with linear
    /// addressing; `16 x 1` is driven as two lines of eight characters.
    pub fn new(i2c: I2C, address: u8, delay: D, columns: u8, rows: u8) -> Result<Self, Error<E>> {
        let display = DisplayType::from_size(columns, rows)?;
        Self::with_config(Pca9535::new(i2c, address), delay, Config::new(display))
    }
}

impl<P, E, D> I2Lcd<P, D>
where
    P: PortExpander<Error = E>,
    D: DelayMs<u8> + DelayUs<u16>,
{
    /// Take over the expander and park every line. The display stays
    /// unpowered until [`I2Lcd::power`] is called.
    pub fn with_config(expander: P, delay: D, config: Config) -> Result<Self, Error<E>> {
        let geometry = Geometry::from(config.display);
        let mut bus = ControlBus::new(expander)?;
        bus.set_signal(Signals::all(), false)?;
        bus.set_control_direction((Signals::IRS | Signals::UD | Signals::BCS | Signals::CCS).bits())?;
        bus.set_data_direction(0x00)?;
        bus.write_data(0x00)?;

        let contrast = Potentiometer::new(&mut bus, Signals::CCS, Signals::UD)?;
        let backlight = Potentiometer::new(&mut bus, Signals::BCS, Signals::UD)?;

        debug!(
            "{:?} driven as {}x{}",
            config.display, geometry.columns, geometry.rows
        );
        Ok(I2Lcd {
            bus,
            delay,
            config,
            geometry,
            contrast,
            backlight,
            column: 0,
            row: 0,
            commands: [0; Instruction::COUNT],
            wait: WaitMode::Delay,
            state: State::Uninitialized,
        })
    }

    /// Run the HD44780 reset sequence on a powered display.
    fn init(&mut self) -> Result<(), Error<E>> {
        if !self.bus.signals().contains(Signals::PWR) {
            return Err(Error::NotInitialized);
        }
        // The busy flag is not valid until the sequence has completed.
        self.state = State::Initializing;
        self.wait = WaitMode::Delay;

        let mut function = FUNCTION_8BIT;
        if self.geometry.two_lines {
            function |= FUNCTION_TWO_LINES;
        }

        self.delay.delay_ms(POWER_ON_DELAY_MS);
        for delay in RESET_DELAYS_US {
            self.command(Instruction::FunctionSet, function)?;
            self.delay.delay_us(delay);
        }
        self.command(Instruction::FunctionSet, function)?;

        self.command(Instruction::DisplayOnOff, 0)?;
        self.command(Instruction::ClearDisplay, 0)?;
        self.command(Instruction::EntryModeSet, ENTRY_INCREMENT)?;
        self.command(Instruction::DisplayOnOff, DISPLAY_ON)?;

        self.column = 0;
        self.row = 0;
        self.wait = self.config.wait;
        self.state = State::Ready;
        debug!("display initialized, waiting with {:?}", self.wait);
        Ok(())
    }

    /// Switch the display supply. Switching on re-initializes the
    /// controller, which forgets its configuration when unpowered.
    pub fn power(&mut self, on: bool) -> Result<(), Error<E>> {
        debug!("power {}", if on { "on" } else { "off" });
        if on {
            // Lines may have been tri-stated by `close`.
            self.bus
                .set_signal(Signals::EN | Signals::RS | Signals::RW, false)?;
            self.bus
                .set_input(Signals::EN | Signals::RS | Signals::RW | Signals::PWR, false)?;
            self.bus.set_data_direction(0x00)?;
        }
        self.contrast.power(&mut self.bus, on)?;
        self.backlight.power(&mut self.bus, on)?;
        self.bus.set_signal(Signals::PWR, on)?;
        if on {
            self.init()
        } else {
            self.state = State::Uninitialized;
            self.wait = WaitMode::Delay;
            Ok(())
        }
    }

    /// Switch display on
    pub fn power_on(&mut self) -> Result<(), Error<E>> {
        self.power(true)
    }

    /// Switch display off
    pub fn power_off(&mut self) -> Result<(), Error<E>> {
        self.power(false)
    }

    /// Run both potentiometers down, drop the supply and tri-state both ports.
    /// [`I2Lcd::power`] claims the ports back.
    pub fn close(&mut self) -> Result<(), Error<E>> {
        self.contrast.set(&mut self.bus, 0)?;
        self.backlight.set(&mut self.bus, 0)?;
        self.bus.set_signal(Signals::EN | Signals::PWR, false)?;
        self.bus.set_control_direction(0xff)?;
        self.bus.set_data_direction(0xff)?;
        self.state = State::Uninitialized;
        self.wait = WaitMode::Delay;
        debug!("display closed");
        Ok(())
    }

    /// Give back the expander and the delay.
    pub fn release(self) -> (P, D) {
        (self.bus.release(), self.delay)
    }

    /// Protocol state of the controller.
    pub fn state(&self) -> State {
        self.state
    }

    /// Display size as driven, after normalization.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Current `(column, row)` of the cursor.
    pub fn cursor_position(&self) -> (u8, u8) {
        (self.column, self.row)
    }

    /// Fill DDRAM with spaces and move the cursor home.
    pub fn clear(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.command(Instruction::ClearDisplay, 0)?;
        self.column = 0;
        self.row = 0;
        Ok(())
    }

    /// Move the cursor home and undo any display shift.
    pub fn home(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.command(Instruction::ReturnHome, 0)?;
        self.column = 0;
        self.row = 0;
        Ok(())
    }

    /// Move the cursor. Both coordinates wrap around the display.
    pub fn set_cursor(&mut self, column: u8, row: u8) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        let (column, row) = self.geometry.wrap(column, row);
        let address = self.geometry.address(column, row);
        self.command(Instruction::SetDdramAddress, address)?;
        self.column = column;
        self.row = row;
        Ok(())
    }

    /// Print text from the cursor on, word wrapping at the row end.
    ///
    /// Every `\n` starts a new row; printing past the last row continues on
    /// the first one.
    pub fn print(&mut self, text: &str) -> Result<(), Error<E>> {
        self.print_bytes(text.as_bytes())
    }

    /// Print raw character codes, see [`I2Lcd::print`]. Trailing whitespace
    /// is dropped.
    pub fn print_bytes(&mut self, text: &[u8]) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.put(layout::trim_end(text))
    }

    fn put(&mut self, text: &[u8]) -> Result<(), Error<E>> {
        let columns = self.geometry.columns;
        let (mut column, mut row) = (self.column, self.row);

        for (i, line) in text.split(|&c| c == b'\n').enumerate() {
            if i > 0 {
                column = 0;
                row = (row + 1) % self.geometry.rows;
            }
            let address = self.geometry.address(column, row);
            self.command(Instruction::SetDdramAddress, address)?;

            let first_width = (columns - column) as usize;
            let mut spans = Spans::new(line, first_width, columns as usize).peekable();
            while let Some(span) = spans.next() {
                if !span.is_empty() {
                    self.write_block(span)?;
                }
                column += span.len() as u8;
                // DDRAM rows are not contiguous, so every row change is explicit.
                if column >= columns || spans.peek().is_some() {
                    column = 0;
                    row = (row + 1) % self.geometry.rows;
                    let address = self.geometry.address(column, row);
                    self.command(Instruction::SetDdramAddress, address)?;
                }
            }
        }

        self.column = column % columns;
        self.row = row;
        trace!("cursor at {},{}", self.column, self.row);
        Ok(())
    }

    /// Write raw character codes at the cursor, clipped at the end of the
    /// row. No wrapping, and the stored cursor is left where it was.
    pub fn print_fast(&mut self, text: &[u8]) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        let room = (self.geometry.columns - self.column) as usize;
        let text = &text[..text.len().min(room)];
        let address = self.geometry.address(self.column, self.row);
        self.command(Instruction::SetDdramAddress, address)?;
        if !text.is_empty() {
            self.write_block(text)?;
        }
        Ok(())
    }

    /// Print at an explicit position. Unlike [`I2Lcd::set_cursor`] the
    /// position must lie on the display.
    pub fn print_at(&mut self, column: u8, row: u8, text: &str) -> Result<(), Error<E>> {
        self.check_position(column, row)?;
        self.set_cursor(column, row)?;
        self.print(text)
    }

    /// Store the 5x8 bitmap of user character `index` (0..=7).
    pub fn define_glyph(&mut self, index: u8, bitmap: &[u8; 8]) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        if index > 7 {
            return Err(Error::GlyphOutOfRange(index));
        }
        self.command(Instruction::SetCgramAddress, index << 3)?;
        self.write_block(bitmap)?;
        self.restore_cursor()
    }

    /// Read back the bitmap of user character `index` (0..=7).
    pub fn read_glyph(&mut self, index: u8) -> Result<[u8; 8], Error<E>> {
        self.ensure_ready()?;
        if index > 7 {
            return Err(Error::GlyphOutOfRange(index));
        }
        let mut bitmap = [0; 8];
        self.command(Instruction::SetCgramAddress, index << 3)?;
        self.read_block(&mut bitmap)?;
        self.restore_cursor()?;
        Ok(bitmap)
    }

    /// Read the character codes of a whole row into `buf`.
    pub fn read_row<'b>(&mut self, row: u8, buf: &'b mut [u8]) -> Result<&'b [u8], Error<E>> {
        self.ensure_ready()?;
        if row >= self.geometry.rows {
            return Err(Error::RowOutOfRange {
                row,
                rows: self.geometry.rows,
            });
        }
        let columns = self.geometry.columns as usize;
        if buf.len() < columns {
            return Err(Error::BufferTooSmall { needed: columns });
        }

        let buf = &mut buf[..columns];
        let address = self.geometry.offsets()[row as usize];
        self.command(Instruction::SetDdramAddress, address)?;
        self.read_block(buf)?;
        self.restore_cursor()?;
        Ok(buf)
    }

    /// Busy flag and address counter.
    pub fn read_status(&mut self) -> Result<Status, Error<E>> {
        self.ensure_ready()?;
        self.poll_status()
    }

    /// Move the contrast wiper to `value` (0..=63).
    pub fn set_contrast(&mut self, value: u8) -> Result<(), Error<E>> {
        self.contrast.set(&mut self.bus, value)
    }

    /// Tracked contrast wiper position.
    pub fn contrast(&self) -> u8 {
        self.contrast.position()
    }

    /// Move the backlight wiper to `value` (0..=63).
    pub fn set_backlight(&mut self, value: u8) -> Result<(), Error<E>> {
        self.backlight.set(&mut self.bus, value)
    }

    /// Tracked backlight wiper position.
    pub fn backlight(&self) -> u8 {
        self.backlight.position()
    }

    /// Move the contrast wiper one step.
    pub fn step_contrast(&mut self, up: bool) -> Result<(), Error<E>> {
        if up {
            self.contrast.inc(&mut self.bus)
        } else {
            self.contrast.dec(&mut self.bus)
        }
    }

    /// Move the backlight wiper one step.
    pub fn step_backlight(&mut self, up: bool) -> Result<(), Error<E>> {
        if up {
            self.backlight.inc(&mut self.bus)
        } else {
            self.backlight.dec(&mut self.bus)
        }
    }

    /// Blink the character under the cursor
    pub fn set_blink(&mut self, blink: bool) -> Result<(), Error<E>> {
        self.toggle(Instruction::DisplayOnOff, DISPLAY_BLINK, blink)
    }

    /// Show or hide the underline cursor
    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<(), Error<E>> {
        self.toggle(Instruction::DisplayOnOff, DISPLAY_CURSOR, visible)
    }

    /// Blank or show the display. DDRAM keeps its content while blanked.
    pub fn set_display_visible(&mut self, visible: bool) -> Result<(), Error<E>> {
        self.toggle(Instruction::DisplayOnOff, DISPLAY_ON, visible)
    }

    /// Set text moving direction
    pub fn set_text_direction(&mut self, direction: Direction) -> Result<(), Error<E>> {
        let increment = direction == Direction::LeftToRight;
        self.toggle(Instruction::EntryModeSet, ENTRY_INCREMENT, increment)
    }

    /// Shift the display instead of the cursor on every write.
    pub fn set_autoscroll(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.toggle(Instruction::EntryModeSet, ENTRY_SHIFT, enabled)
    }

    /// Shift the whole display one column left
    pub fn scroll_display_left(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.command(Instruction::CursorDisplayShift, SHIFT_DISPLAY)
    }

    /// Shift the whole display one column right
    pub fn scroll_display_right(&mut self) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        self.command(Instruction::CursorDisplayShift, SHIFT_DISPLAY | SHIFT_RIGHT)
    }

    fn ensure_ready(&self) -> Result<(), Error<E>> {
        match self.state {
            State::Ready => Ok(()),
            _ => Err(Error::NotInitialized),
        }
    }

    fn check_position(&self, column: u8, row: u8) -> Result<(), Error<E>> {
        if column >= self.geometry.columns {
            return Err(Error::ColumnOutOfRange {
                column,
                columns: self.geometry.columns,
            });
        }
        if row >= self.geometry.rows {
            return Err(Error::RowOutOfRange {
                row,
                rows: self.geometry.rows,
            });
        }
        Ok(())
    }

    /// Flip one flag of an instruction, keeping the others as last sent.
    fn toggle(&mut self, instruction: Instruction, flag: u8, enabled: bool) -> Result<(), Error<E>> {
        self.ensure_ready()?;
        let previous = self.commands[instruction.index()];
        let value = if enabled {
            previous | flag
        } else {
            previous & !flag
        };
        self.command(instruction, value)
    }

    fn restore_cursor(&mut self) -> Result<(), Error<E>> {
        let address = self.geometry.address(self.column, self.row);
        self.command(Instruction::SetDdramAddress, address)
    }

    fn command(&mut self, instruction: Instruction, value: u8) -> Result<(), Error<E>> {
        if self.wait == WaitMode::BusyFlag {
            let limit = self.config.busy_poll_limit;
            wait::poll_until_idle(limit, || Ok(self.poll_status()?.busy))?;
        }

        let byte = instruction as u8 | value;
        trace!("{:?} {:#04x}", instruction, byte);
        self.bus.set_signal(Signals::RS | Signals::RW, false)?;
        self.bus.set_signal(Signals::EN, true)?;
        self.bus.write_data(byte)?;
        self.bus
            .set_signal(Signals::RS | Signals::RW | Signals::EN, false)?;
        self.commands[instruction.index()] = value;

        if self.wait == WaitMode::Delay {
            self.delay.delay_us(instruction.execution_time_us());
        }
        Ok(())
    }

    fn poll_status(&mut self) -> Result<Status, Error<E>> {
        self.bus.set_signal(Signals::RS, false)?;
        self.bus.set_signal(Signals::RW, true)?;
        self.bus.set_data_direction(0xff)?;
        self.bus.set_signal(Signals::EN, true)?;
        let status = self.bus.read_data()?;
        self.bus
            .set_signal(Signals::RS | Signals::RW | Signals::EN, false)?;
        self.bus.set_data_direction(0x00)?;
        Ok(Status::from(status))
    }

    fn write_block(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        self.bus.set_signal(Signals::RS, true)?;
        self.bus.set_signal(Signals::RW, false)?;
        for &byte in bytes {
            self.bus.set_signal(Signals::EN, true)?;
            self.bus.write_data(byte)?;
            self.bus.set_signal(Signals::EN, false)?;
        }
        self.bus
            .set_signal(Signals::RS | Signals::RW | Signals::EN, false)
    }

    fn read_block(&mut self, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.bus.set_signal(Signals::RS, true)?;
        self.bus.set_signal(Signals::RW, true)?;
        self.bus.set_data_direction(0xff)?;
        for byte in buf.iter_mut() {
            self.bus.set_signal(Signals::EN, true)?;
            *byte = self.bus.read_data()?;
            self.bus.set_signal(Signals::EN, false)?;
        }
        self.bus
            .set_signal(Signals::RS | Signals::RW | Signals::EN, false)?;
        self.bus.set_data_direction(0x00)
    }
}

impl<P, E, D> fmt::Write for I2Lcd<P, D>
where
    P: PortExpander<Error = E>,
    D: DelayMs<u8> + DelayUs<u16>,
{
    /// Unlike [`I2Lcd::print`] whitespace is kept, formatting arguments
    /// arrive in pieces.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.ensure_ready()
            .and_then(|()| self.put(s.as_bytes()))
            .map_err(|_| fmt::Error)
    }
}
