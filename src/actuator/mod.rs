// Actuation stack for the rover base
//
// Provides:
// - Pure duty-cycle mapping (speed percent / servo angle -> duty fraction)
// - PCA9685 16-channel PWM controller driver over Linux I2C
// - High-level drive/servo controller API

mod driver;
pub mod mapping;
pub mod pca9685;

pub use driver::{ActuationDriver, MotorChannels};
pub use pca9685::{Pca9685, PwmError};

use tracing::debug;

/// A bank of PWM channels addressed by index.
///
/// All channel writes go through a single owner of one implementation; the
/// hardware backend is [`Pca9685`], with [`SimPwm`] standing in off-target.
pub trait PwmOutput {
    /// Set one channel's duty fraction in [0.0, 1.0].
    fn set_duty(&mut self, channel: u8, fraction: f32) -> Result<(), PwmError>;
}

/// Dry-run backend: logs writes instead of touching the I2C bus.
pub struct SimPwm;

impl PwmOutput for SimPwm {
    fn set_duty(&mut self, channel: u8, fraction: f32) -> Result<(), PwmError> {
        debug!("sim: channel {} duty {:.4}", channel, fraction);
        Ok(())
    }
}
