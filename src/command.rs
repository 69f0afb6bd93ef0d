//! HD44780 instruction set.

/// Instruction opcodes. Each instruction is identified by its highest set bit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Instruction {
    ClearDisplay = 0b0000_0001,
    ReturnHome = 0b0000_0010,
    EntryModeSet = 0b0000_0100,
    DisplayOnOff = 0b0000_1000,
    CursorDisplayShift = 0b0001_0000,
    FunctionSet = 0b0010_0000,
    SetCgramAddress = 0b0100_0000,
    SetDdramAddress = 0b1000_0000,
}

impl Instruction {
    pub(crate) const COUNT: usize = 8;

    /// Slot of this instruction in the command shadow.
    pub(crate) fn index(self) -> usize {
        (self as u8).trailing_zeros() as usize
    }

    /// Worst-case execution time from the datasheet, at 270 kHz.
    pub fn execution_time_us(self) -> u16 {
        match self {
            Instruction::ClearDisplay | Instruction::ReturnHome => 1520,
            _ => 37,
        }
    }
}

// ENTRY_MODE_SET
/// Shift the display instead of the cursor on writes.
pub const ENTRY_SHIFT: u8 = 0b0000_0001;
/// Increment the address counter after each access.
pub const ENTRY_INCREMENT: u8 = 0b0000_0010;

// DISPLAY_ONOFF
pub const DISPLAY_BLINK: u8 = 0b0000_0001;
pub const DISPLAY_CURSOR: u8 = 0b0000_0010;
pub const DISPLAY_ON: u8 = 0b0000_0100;

// CURSOR_DISPLAY_SHIFT
pub const SHIFT_RIGHT: u8 = 0b0000_0100;
/// Shift the whole display instead of moving the cursor.
pub const SHIFT_DISPLAY: u8 = 0b0000_1000;

// FUNCTION_SET
pub const FUNCTION_TWO_LINES: u8 = 0b0000_1000;
pub const FUNCTION_8BIT: u8 = 0b0001_0000;

/// Busy flag in the status byte, the remaining bits are the address counter.
pub const BUSY_FLAG: u8 = 0b1000_0000;

/// Text moving direction
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// Controller status as returned by a busy flag read.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Status {
    pub busy: bool,
    /// Address counter, DDRAM or CGRAM depending on the last address set.
    pub address: u8,
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        Status {
            busy: byte & BUSY_FLAG != 0,
            address: byte & !BUSY_FLAG,
        }
    }
}
