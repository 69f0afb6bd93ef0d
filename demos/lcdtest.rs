extern crate i2lcd;
extern crate linux_embedded_hal as hal;

use std::thread;
use std::time::Duration;

use hal::{Delay, I2cdev};
use i2lcd::{I2Lcd, I2C_ADDRESS};

const HEART: [u8; 8] = [
    0b00000, 0b11011, 0b11111, 0b01110, 0b00100, 0b00000, 0b00000, 0b00000,
];

fn main() {
    let dev = I2cdev::new("/dev/i2c-2").unwrap();
    let mut lcd = I2Lcd::new(dev, I2C_ADDRESS, Delay, 16, 1).unwrap();

    lcd.power(true).unwrap();
    lcd.clear().unwrap();

    lcd.set_cursor(0, 0).unwrap();
    lcd.print_bytes(b"\x02\x02Hello Emy\x02\x02").unwrap();
    lcd.define_glyph(2, &HEART).unwrap();

    lcd.set_backlight(0x3f).unwrap();
    lcd.set_contrast(0x0c).unwrap();
    lcd.set_blink(true).unwrap();
    lcd.set_cursor_visible(true).unwrap();

    let mut buf = [0; 40];
    for row in 0..lcd.geometry().rows {
        let text = lcd.read_row(row, &mut buf).unwrap();
        println!("{}", String::from_utf8_lossy(text));
    }

    thread::sleep(Duration::from_secs(3));

    lcd.power(false).unwrap();
    lcd.close().unwrap();
}
