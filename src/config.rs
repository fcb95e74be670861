// Network binding, channel map, and pulse configuration

// Command server binding
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9000;

// Maximum bytes read from the session per command
pub const MAX_CHUNK: usize = 1024;

// I2C bus and address of the PCA9685 PWM controller
pub const I2C_BUS: &str = "/dev/i2c-1";
pub const PCA9685_ADDR: u16 = 0x40;

// Carrier frequency shared by all channels (motor driver inputs and servos)
pub const PWM_FREQ_HZ: u32 = 50;
pub const PWM_PERIOD_US: u32 = 20_000;

// Motor channel map (change if a side runs reversed)
pub const LEFT_FWD: u8 = 0;
pub const LEFT_REV: u8 = 1;
pub const RIGHT_FWD: u8 = 2;
pub const RIGHT_REV: u8 = 3;

// Servo slot -> channel assignments
pub const SERVO_CHANNELS: [u8; 8] = [4, 5, 6, 7, 8, 9, 10, 11];

// Servo pulse endpoints: 1000us at 0 degrees, 2000us at 180 degrees
pub const PULSE_MIN_US: u32 = 1000;
pub const PULSE_MAX_US: u32 = 2000;
pub const ANGLE_MAX_DEG: i32 = 180;
