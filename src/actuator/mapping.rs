// Duty-cycle mapping for the differential drive and servo bank
// Converts high-level motion intents into per-channel duty fractions.

use crate::config::{ANGLE_MAX_DEG, PULSE_MAX_US, PULSE_MIN_US, PWM_PERIOD_US};

/// Full-scale speed command magnitude (percent)
pub const SPEED_MAX: i32 = 100;

/// Convert a signed speed percent into (forward, reverse) duty fractions.
///
/// The speed is clamped to [-100, 100], never rejected. For a non-zero speed
/// exactly one of the pair is non-zero; at zero speed both are zero, so every
/// direction change passes through an all-off state.
pub fn speed_to_duty(speed: i32) -> (f32, f32) {
    let s = speed.clamp(-SPEED_MAX, SPEED_MAX);
    let magnitude = s.unsigned_abs() as f32 / SPEED_MAX as f32;
    if s >= 0 { (magnitude, 0.0) } else { (0.0, magnitude) }
}

/// Convert a servo angle in degrees to a duty fraction.
///
/// Linear pulse mapping against the 50 Hz period: 1000 us at 0 degrees,
/// 2000 us at 180 degrees. Angles outside [0, 180] are clamped so the pulse
/// cannot leave the servo's rated range; the legacy mapping let them through.
pub fn angle_to_duty(angle: i32) -> f32 {
    let a = angle.clamp(0, ANGLE_MAX_DEG) as f32;
    let span = (PULSE_MAX_US - PULSE_MIN_US) as f32;
    let pulse = PULSE_MIN_US as f32 + (a / ANGLE_MAX_DEG as f32) * span;
    pulse / PWM_PERIOD_US as f32
}

/// Convert a duty fraction to the 16-bit count the channel driver consumes.
pub fn duty_to_counts(fraction: f32) -> u16 {
    (fraction.clamp(0.0, 1.0) * f32::from(u16::MAX)).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-6;

    #[test]
    fn test_speed_exclusivity() {
        // Exactly one direction active for every non-zero speed
        for s in [-100, -37, -1, 1, 42, 100] {
            let (fwd, rev) = speed_to_duty(s);
            assert!(
                (fwd == 0.0) != (rev == 0.0),
                "speed {} activated both directions: fwd={}, rev={}",
                s,
                fwd,
                rev
            );
            let active = if s > 0 { fwd } else { rev };
            assert!((active - s.unsigned_abs() as f32 / 100.0).abs() < TOL);
        }
    }

    #[test]
    fn test_speed_zero_is_all_off() {
        assert_eq!(speed_to_duty(0), (0.0, 0.0));
    }

    #[test]
    fn test_speed_clamped() {
        assert_eq!(speed_to_duty(250), (1.0, 0.0));
        assert_eq!(speed_to_duty(-250), (0.0, 1.0));
    }

    #[test]
    fn test_angle_endpoints() {
        // 1000us / 20000us and 2000us / 20000us
        assert!((angle_to_duty(0) - 0.05).abs() < TOL);
        assert!((angle_to_duty(180) - 0.10).abs() < TOL);
        assert!((angle_to_duty(90) - 0.075).abs() < TOL);
    }

    #[test]
    fn test_angle_clamped() {
        assert!((angle_to_duty(-45) - angle_to_duty(0)).abs() < TOL);
        assert!((angle_to_duty(270) - angle_to_duty(180)).abs() < TOL);
    }

    #[test]
    fn test_duty_to_counts() {
        assert_eq!(duty_to_counts(0.0), 0);
        assert_eq!(duty_to_counts(1.0), 65535);
        assert_eq!(duty_to_counts(0.5), 32768); // round(32767.5)
        // Out-of-range fractions are clamped
        assert_eq!(duty_to_counts(-0.1), 0);
        assert_eq!(duty_to_counts(1.5), 65535);
    }
}
