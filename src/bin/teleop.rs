// Keyboard teleop: W/S drive, A/D turn in place, R/F speed, Q quit
use std::io::Write;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};

use rover_tcp_runtime::config::DEFAULT_PORT;

const SPEEDS: [i32; 3] = [30, 60, 100]; // percent
const INPUT_TIMEOUT_MS: u64 = 100; // Stop after this much time with no input

#[derive(Parser, Debug)]
#[command(about = "Keyboard teleop for the rover")]
struct Args {
    /// Rover address
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let stream = TcpStream::connect((args.host.as_str(), args.port))?;
    // One command per segment; coalesced writes would blur command boundaries
    stream.set_nodelay(true)?;

    println!("Connected to {}:{}", args.host, args.port);
    println!("Controls: W/S=drive, A/D=turn, R/F=speed, Q=quit");
    print_speed(0);

    enable_raw_mode()?;
    let result = run_teleop(stream);
    disable_raw_mode()?;

    result
}

fn run_teleop(mut stream: TcpStream) -> Result<(), Box<dyn std::error::Error>> {
    let mut speed_idx: usize = 0;

    // Persistent speed state
    let mut left = 0;
    let mut right = 0;
    let mut last_sent: Option<(i32, i32)> = None;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Movement - update speeds and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        left = SPEEDS[speed_idx];
                        right = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        left = -SPEEDS[speed_idx];
                        right = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        left = -SPEEDS[speed_idx];
                        right = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        left = SPEEDS[speed_idx];
                        right = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(SPEEDS.len() - 1);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Stop if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            left = 0;
            right = 0;
        }

        // Send only on change; the robot holds the last command
        if last_sent != Some((left, right)) {
            if left == 0 && right == 0 {
                stream.write_all(b"STOP")?;
            } else {
                stream.write_all(format!("MOVE {} {}", left, right).as_bytes())?;
            }
            last_sent = Some((left, right));
        }
    }

    stream.write_all(b"STOP")?;
    Ok(())
}

fn print_speed(idx: usize) {
    // Raw mode needs an explicit carriage return
    print!("Speed: {}%\r\n", SPEEDS[idx]);
}
