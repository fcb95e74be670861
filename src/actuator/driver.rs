// High-level actuation driver for the rover
//
// Owns the PWM bus and applies drive and servo commands to the channel map.

use tracing::{debug, info, warn};

use super::mapping::{angle_to_duty, speed_to_duty};
use super::{PwmError, PwmOutput};
use crate::config::{LEFT_FWD, LEFT_REV, RIGHT_FWD, RIGHT_REV, SERVO_CHANNELS};

/// Directional channel assignments for the two drive motors
#[derive(Debug, Clone, Copy)]
pub struct MotorChannels {
    pub left_fwd: u8,
    pub left_rev: u8,
    pub right_fwd: u8,
    pub right_rev: u8,
}

impl Default for MotorChannels {
    fn default() -> Self {
        Self {
            left_fwd: LEFT_FWD,
            left_rev: LEFT_REV,
            right_fwd: RIGHT_FWD,
            right_rev: RIGHT_REV,
        }
    }
}

/// High-level driver for the drive motors and the servo bank
pub struct ActuationDriver<P: PwmOutput> {
    bus: P,
    motors: MotorChannels,
    servos: [u8; 8],
}

impl<P: PwmOutput> ActuationDriver<P> {
    /// Create a driver with the default channel map
    pub fn new(bus: P) -> Self {
        Self::with_channels(bus, MotorChannels::default(), SERVO_CHANNELS)
    }

    /// Create with custom motor and servo channel assignments
    pub fn with_channels(bus: P, motors: MotorChannels, servos: [u8; 8]) -> Self {
        Self { bus, motors, servos }
    }

    /// Apply a drive command, speed percent per side in [-100, 100].
    ///
    /// All four directional channels are rewritten every cycle; per motor, at
    /// most one of the forward/reverse pair ends up non-zero.
    pub fn drive(&mut self, left: i32, right: i32) -> Result<(), PwmError> {
        debug!("Drive command: left={}, right={}", left, right);
        let (lf, lr) = speed_to_duty(left);
        let (rf, rr) = speed_to_duty(right);
        let m = self.motors;
        self.write_all(&[
            (m.left_fwd, lf),
            (m.left_rev, lr),
            (m.right_fwd, rf),
            (m.right_rev, rr),
        ])
    }

    /// Zero all four motor channels regardless of prior state
    pub fn stop(&mut self) -> Result<(), PwmError> {
        info!("Stopping all motors");
        let m = self.motors;
        self.write_all(&[
            (m.left_fwd, 0.0),
            (m.left_rev, 0.0),
            (m.right_fwd, 0.0),
            (m.right_rev, 0.0),
        ])
    }

    /// Point the servo in `slot` at `angle` degrees.
    ///
    /// Returns false without touching any channel when the slot does not
    /// resolve; remote senders are allowed to probe out-of-range slots.
    pub fn set_servo(&mut self, slot: i32, angle: i32) -> Result<bool, PwmError> {
        let channel = usize::try_from(slot)
            .ok()
            .and_then(|s| self.servos.get(s).copied());
        let Some(channel) = channel else {
            debug!("Ignoring servo command for unmapped slot {}", slot);
            return Ok(false);
        };

        debug!("Servo slot {} (channel {}) -> {} deg", slot, channel, angle);
        self.bus.set_duty(channel, angle_to_duty(angle))?;
        Ok(true)
    }

    /// Force every mapped channel to zero duty (shutdown path)
    pub fn zero_all(&mut self) -> Result<(), PwmError> {
        let m = self.motors;
        let mut writes = vec![
            (m.left_fwd, 0.0),
            (m.left_rev, 0.0),
            (m.right_fwd, 0.0),
            (m.right_rev, 0.0),
        ];
        writes.extend(self.servos.iter().map(|&ch| (ch, 0.0)));
        self.write_all(&writes)
    }

    /// Write a batch of duty fractions.
    ///
    /// A failing channel does not block the remaining writes in the batch;
    /// the first error is returned after the full pass.
    fn write_all(&mut self, writes: &[(u8, f32)]) -> Result<(), PwmError> {
        let mut first_err = None;
        for &(channel, fraction) in writes {
            if let Err(e) = self.bus.set_duty(channel, fraction) {
                debug!("Write to channel {} failed: {}", channel, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

impl<P: PwmOutput> Drop for ActuationDriver<P> {
    fn drop(&mut self) {
        // Leave the hardware quiescent when the driver goes away
        if let Err(e) = self.zero_all() {
            warn!("Failed to zero channels on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::testing::RecordingPwm;

    const TOL: f32 = 1e-6;

    fn driver() -> (ActuationDriver<RecordingPwm>, RecordingPwm) {
        let pwm = RecordingPwm::new();
        let handle = pwm.clone();
        (ActuationDriver::new(pwm), handle)
    }

    #[test]
    fn test_drive_directional_exclusivity() {
        let (mut drv, pwm) = driver();

        drv.drive(50, -50).unwrap();
        assert!((pwm.duty(LEFT_FWD) - 0.5).abs() < TOL);
        assert_eq!(pwm.duty(LEFT_REV), 0.0);
        assert_eq!(pwm.duty(RIGHT_FWD), 0.0);
        assert!((pwm.duty(RIGHT_REV) - 0.5).abs() < TOL);

        // Direction flip rewrites both channels of each pair
        drv.drive(-25, 100).unwrap();
        assert_eq!(pwm.duty(LEFT_FWD), 0.0);
        assert!((pwm.duty(LEFT_REV) - 0.25).abs() < TOL);
        assert!((pwm.duty(RIGHT_FWD) - 1.0).abs() < TOL);
        assert_eq!(pwm.duty(RIGHT_REV), 0.0);
    }

    #[test]
    fn test_drive_clamps_out_of_range_speeds() {
        let (mut drv, pwm) = driver();
        drv.drive(500, -500).unwrap();
        assert!((pwm.duty(LEFT_FWD) - 1.0).abs() < TOL);
        assert!((pwm.duty(RIGHT_REV) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_stop_is_unconditional_and_idempotent() {
        let (mut drv, pwm) = driver();
        drv.drive(80, 80).unwrap();

        drv.stop().unwrap();
        let after_first = pwm.snapshot();
        assert_eq!(&after_first[..4], &[0.0; 4]);

        drv.stop().unwrap();
        assert_eq!(pwm.snapshot(), after_first);
    }

    #[test]
    fn test_servo_slot_mapping() {
        let (mut drv, pwm) = driver();
        // Slot 0 maps to channel 4; 90 degrees -> 1500us / 20000us
        assert!(drv.set_servo(0, 90).unwrap());
        assert!((pwm.duty(SERVO_CHANNELS[0]) - 0.075).abs() < TOL);

        assert!(drv.set_servo(7, 180).unwrap());
        assert!((pwm.duty(SERVO_CHANNELS[7]) - 0.10).abs() < TOL);
    }

    #[test]
    fn test_servo_invalid_slot_is_noop() {
        let (mut drv, pwm) = driver();
        drv.drive(50, 50).unwrap();
        drv.set_servo(0, 45).unwrap();
        let before = pwm.snapshot();

        assert!(!drv.set_servo(8, 45).unwrap());
        assert!(!drv.set_servo(-1, 45).unwrap());
        assert_eq!(pwm.snapshot(), before);
    }

    #[test]
    fn test_zero_all_clears_motor_and_servo_channels() {
        let (mut drv, pwm) = driver();
        drv.drive(60, -60).unwrap();
        drv.set_servo(3, 120).unwrap();

        drv.zero_all().unwrap();
        let after = pwm.snapshot();
        assert_eq!(&after[..12], &[0.0; 12]);
    }
}
