//! Byte-level access to the two 8-bit ports of the GPIO expander.

use hal::blocking::i2c::{Write, WriteRead};

/// Default I2C address of the PCA9535 with A0..A2 tied low.
pub const I2C_ADDRESS: u8 = 0x20;

/// Expander port. The LCD control lines and potentiometer selects live on
/// `Control`, the LCD data lines D0..D7 on `Data`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Port {
    Control = 0,
    Data = 1,
}

/// Register interface of a two-port GPIO expander.
///
/// A set bit in a direction mask configures the pin as an input, a cleared
/// bit as a push/pull output.
pub trait PortExpander {
    type Error;

    /// Configure pin directions of `port`.
    fn set_port_direction(&mut self, port: Port, mask: u8) -> Result<(), Self::Error>;

    /// Write the output latch of `port`.
    fn set_port_output(&mut self, port: Port, value: u8) -> Result<(), Self::Error>;

    /// Reads back the output latch, not the pin levels.
    fn port_output(&mut self, port: Port) -> Result<u8, Self::Error>;

    /// Reads the pin levels.
    fn port_input(&mut self, port: Port) -> Result<u8, Self::Error>;
}

#[derive(Debug, Clone, Copy)]
enum Register {
    Input = 0,
    Output = 2,
    Configuration = 6,
}

impl Register {
    fn of(self, port: Port) -> u8 {
        self as u8 + port as u8
    }
}

/// Driver for the NXP PCA9535 16-bit I²C GPIO expander
#[derive(Debug)]
pub struct Pca9535<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Pca9535<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Pca9535 { i2c, address }
    }

    /// Give back the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> Result<u8, E> {
        let mut buf = [0];
        self.i2c.write_read(self.address, &[register], &mut buf)?;
        Ok(buf[0])
    }
}

impl<I2C, E> PortExpander for Pca9535<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = E;

    fn set_port_direction(&mut self, port: Port, mask: u8) -> Result<(), E> {
        self.write_register(Register::Configuration.of(port), mask)
    }

    fn set_port_output(&mut self, port: Port, value: u8) -> Result<(), E> {
        self.write_register(Register::Output.of(port), value)
    }

    fn port_output(&mut self, port: Port) -> Result<u8, E> {
        self.read_register(Register::Output.of(port))
    }

    fn port_input(&mut self, port: Port) -> Result<u8, E> {
        self.read_register(Register::Input.of(port))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn registers_are_offset_by_port() {
        let expectations = [
            I2cTransaction::write(I2C_ADDRESS, std::vec![0x06, 0x08]),
            I2cTransaction::write(I2C_ADDRESS, std::vec![0x07, 0x00]),
            I2cTransaction::write(I2C_ADDRESS, std::vec![0x03, 0x41]),
            I2cTransaction::write_read(I2C_ADDRESS, std::vec![0x02], std::vec![0xe0]),
            I2cTransaction::write_read(I2C_ADDRESS, std::vec![0x01], std::vec![0x80]),
        ];
        let mut expander = Pca9535::new(I2cMock::new(&expectations), I2C_ADDRESS);

        expander.set_port_direction(Port::Control, 0x08).unwrap();
        expander.set_port_direction(Port::Data, 0x00).unwrap();
        expander.set_port_output(Port::Data, b'A').unwrap();
        assert_eq!(expander.port_output(Port::Control).unwrap(), 0xe0);
        assert_eq!(expander.port_input(Port::Data).unwrap(), 0x80);

        expander.release().done();
    }

    #[test]
    fn custom_address() {
        let expectations = [I2cTransaction::write(0x27, std::vec![0x02, 0x10])];
        let mut expander = Pca9535::new(I2cMock::new(&expectations), 0x27);

        expander.set_port_output(Port::Control, 0x10).unwrap();

        expander.release().done();
    }
}
