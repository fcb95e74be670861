// Command protocol server: one TCP session at a time, sequential dispatch
//
// Session lifecycle: listening -> connected -> per-chunk (parse, dispatch)
// loop -> back to listening when the peer closes. A zero-length read means
// the peer is gone; the listener is re-armed instead of spinning on the dead
// session. Ctrl-C at either blocking point zeroes every mapped channel before
// the process exits.
//
// Commands never straddle reads: the sender puts one command in each write
// and commands are far below the chunk size, so each read chunk is parsed as
// a single command.

use std::error::Error;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tracing::{debug, info, warn};

use crate::actuator::{ActuationDriver, PwmOutput};
use crate::command::{Command, IgnoreReason, Outcome};
use crate::config::MAX_CHUNK;

enum SessionEnd {
    PeerClosed,
    Shutdown,
}

pub struct CommandServer<P: PwmOutput> {
    driver: ActuationDriver<P>,
}

impl<P: PwmOutput> CommandServer<P> {
    pub fn new(driver: ActuationDriver<P>) -> Self {
        Self { driver }
    }

    /// Accept and serve one session at a time until Ctrl-C
    pub async fn serve(
        mut self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        loop {
            info!("Listening on {}", listener.local_addr()?);

            let stream = tokio::select! {
                res = listener.accept() => {
                    let (stream, peer) = res?;
                    info!("Peer connected: {}", peer);
                    stream
                }
                _ = signal::ctrl_c() => return self.shutdown(),
            };

            match self.run_session(stream).await {
                SessionEnd::PeerClosed => continue,
                SessionEnd::Shutdown => return self.shutdown(),
            }
        }
    }

    /// Read and dispatch chunks until the peer closes or Ctrl-C arrives
    async fn run_session(&mut self, mut stream: TcpStream) -> SessionEnd {
        let mut buf = vec![0u8; MAX_CHUNK];

        loop {
            let n = tokio::select! {
                res = stream.read(&mut buf) => match res {
                    Ok(n) => n,
                    Err(e) => {
                        // A reset peer is gone just like a closed one
                        warn!("Session read error: {}", e);
                        break;
                    }
                },
                _ = signal::ctrl_c() => return SessionEnd::Shutdown,
            };

            if n == 0 {
                info!("Peer disconnected, returning to listening");
                break;
            }

            let text = String::from_utf8_lossy(&buf[..n]);
            let outcome = self.dispatch(text.trim());
            debug!("Dispatched {:?} -> {:?}", text.trim(), outcome);
        }

        // Nobody can send STOP once the session is gone
        if let Err(e) = self.driver.stop() {
            warn!("Failed to stop motors after session: {}", e);
        }
        SessionEnd::PeerClosed
    }

    /// Parse one chunk and apply it to the actuators.
    ///
    /// Malformed chunks and unknown servo slots are dropped without any
    /// response to the peer; the returned outcome names the reason. Hardware
    /// write failures are logged and do not end the command loop.
    pub fn dispatch(&mut self, chunk: &str) -> Outcome {
        let cmd = match Command::parse(chunk) {
            Ok(cmd) => cmd,
            Err(reject) => {
                debug!("Dropping chunk {:?}: {:?}", chunk, reject);
                return Outcome::Ignored(IgnoreReason::Malformed(reject));
            }
        };

        match cmd {
            Command::Move { left, right } => {
                if let Err(e) = self.driver.drive(left, right) {
                    warn!("Drive command failed: {}", e);
                }
                Outcome::Executed
            }
            Command::Stop => {
                if let Err(e) = self.driver.stop() {
                    warn!("Stop command failed: {}", e);
                }
                Outcome::Executed
            }
            Command::Servo { slot, angle } => match self.driver.set_servo(slot, angle) {
                Ok(true) => Outcome::Executed,
                Ok(false) => Outcome::Ignored(IgnoreReason::ServoSlotOutOfRange),
                Err(e) => {
                    warn!("Servo command failed: {}", e);
                    Outcome::Executed
                }
            },
        }
    }

    fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!("Shutdown requested, zeroing all channels");
        self.driver.zero_all()?;
        Ok(())
    }
}
