// PCA9685 16-channel PWM controller over Linux I2C
//
// Register map per the NXP datasheet: MODE1 at 0x00, four on/off count
// registers per channel starting at LED0_ON_L, prescaler at 0xFE. The
// prescaler divides the 25 MHz internal oscillator down to the carrier
// frequency shared by all channels.

use std::thread;
use std::time::Duration;

use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use tracing::{debug, info};

use super::PwmOutput;
use super::mapping::duty_to_counts;
use crate::config::{I2C_BUS, PCA9685_ADDR, PWM_FREQ_HZ};

/// Channels on one controller
pub const CHANNEL_COUNT: u8 = 16;

/// Internal oscillator frequency
const OSC_HZ: f32 = 25_000_000.0;

/// Counts per PWM period (12-bit counter)
const COUNTS_PER_PERIOD: f32 = 4096.0;

/// Register addresses
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
enum Register {
    Mode1 = 0x00,
    Led0OnL = 0x06, // 4 registers per channel from here
    Prescale = 0xFE,
}

// MODE1 bits
const MODE1_SLEEP: u8 = 0x10;
const MODE1_AUTO_INCREMENT: u8 = 0x20;
const MODE1_RESTART: u8 = 0x80;

/// Bit 12 of an on/off count forces the output fully on (ON regs) or fully
/// off (OFF regs), bypassing the counter comparison
const LED_FULL: u16 = 0x1000;

/// Error types for the PWM controller
#[derive(Debug, thiserror::Error)]
pub enum PwmError {
    #[error("I2C bus error: {0}")]
    I2c(#[from] LinuxI2CError),

    #[error("Channel {channel} out of range (controller has {CHANNEL_COUNT})")]
    ChannelOutOfRange { channel: u8 },
}

pub type Result<T> = std::result::Result<T, PwmError>;

/// PCA9685 handle - owns the I2C device and the carrier configuration
pub struct Pca9685 {
    dev: LinuxI2CDevice,
}

impl Pca9685 {
    /// Open the controller at the default bus and address, configured for the
    /// standard 50 Hz carrier.
    pub fn open() -> Result<Self> {
        Self::open_at(I2C_BUS, PCA9685_ADDR)
    }

    /// Open at a specific bus path and address
    pub fn open_at(path: &str, addr: u16) -> Result<Self> {
        info!("Opening PCA9685 on {} at 0x{:02X}", path, addr);
        let dev = LinuxI2CDevice::new(path, addr)?;
        let mut pca = Self { dev };
        pca.write_reg(Register::Mode1 as u8, MODE1_AUTO_INCREMENT)?;
        thread::sleep(Duration::from_millis(1));
        pca.set_frequency(PWM_FREQ_HZ)?;
        Ok(pca)
    }

    /// Set the carrier frequency for all channels.
    ///
    /// The prescaler register only accepts writes while the oscillator is in
    /// sleep mode, so the channel outputs glitch off briefly.
    pub fn set_frequency(&mut self, hz: u32) -> Result<()> {
        let prescale = prescale_for(hz);
        debug!("Setting carrier to {} Hz (prescale {})", hz, prescale);
        self.write_reg(Register::Mode1 as u8, MODE1_AUTO_INCREMENT | MODE1_SLEEP)?;
        self.write_reg(Register::Prescale as u8, prescale)?;
        self.write_reg(Register::Mode1 as u8, MODE1_AUTO_INCREMENT)?;
        // Oscillator needs 500us to stabilize before restart
        thread::sleep(Duration::from_millis(1));
        self.write_reg(Register::Mode1 as u8, MODE1_AUTO_INCREMENT | MODE1_RESTART)?;
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.dev.smbus_write_byte_data(reg, value)?;
        Ok(())
    }
}

impl PwmOutput for Pca9685 {
    fn set_duty(&mut self, channel: u8, fraction: f32) -> Result<()> {
        if channel >= CHANNEL_COUNT {
            return Err(PwmError::ChannelOutOfRange { channel });
        }

        let (on, off) = counts_to_registers(duty_to_counts(fraction));
        let base = Register::Led0OnL as u8 + 4 * channel;
        self.write_reg(base, (on & 0xFF) as u8)?;
        self.write_reg(base + 1, (on >> 8) as u8)?;
        self.write_reg(base + 2, (off & 0xFF) as u8)?;
        self.write_reg(base + 3, (off >> 8) as u8)?;
        Ok(())
    }
}

/// Prescaler value for a target carrier frequency
fn prescale_for(hz: u32) -> u8 {
    let prescale = (OSC_HZ / (COUNTS_PER_PERIOD * hz as f32)).round() - 1.0;
    prescale.clamp(3.0, 255.0) as u8
}

/// Map a 16-bit duty count onto the chip's 12-bit on/off register pair.
///
/// Zero and full-scale use the dedicated full-off/full-on bits so the output
/// is truly static at the extremes.
fn counts_to_registers(counts: u16) -> (u16, u16) {
    match counts {
        0 => (0, LED_FULL),
        u16::MAX => (LED_FULL, 0),
        c => (0, c >> 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescale_for_standard_carriers() {
        // 25MHz / (4096 * 50Hz) = 122.07 -> round - 1 = 121
        assert_eq!(prescale_for(50), 121);
        // 60Hz is the other common servo carrier
        assert_eq!(prescale_for(60), 101);
    }

    #[test]
    fn test_prescale_clamped() {
        assert_eq!(prescale_for(10_000), 3);
        assert_eq!(prescale_for(1), 255);
    }

    #[test]
    fn test_counts_to_registers() {
        assert_eq!(counts_to_registers(0), (0, LED_FULL));
        assert_eq!(counts_to_registers(u16::MAX), (LED_FULL, 0));
        // Mid-scale: 16-bit count shifted down to the 12-bit counter
        assert_eq!(counts_to_registers(0x8000), (0, 0x0800));
        assert_eq!(counts_to_registers(duty_to_counts(0.05)), (0, 204));
    }
}
