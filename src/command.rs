// Text command grammar for the control protocol
//
// Commands are single-space-separated ASCII tokens, one command per read chunk:
//   MOVE <left> <right>   speed percent per side, signed
//   STOP                  halt both motors
//   SERVO <slot> <angle>  servo slot index and angle in degrees
//
// The verb match is case-sensitive. Anything that does not fit one of the three
// forms is dropped without a response; the dispatch outcome records why, so the
// policy stays observable in tests even though the sender never sees an error.

/// A parsed control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move { left: i32, right: i32 },
    Stop,
    Servo { slot: i32, angle: i32 },
}

/// Why a chunk failed to parse as a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// Nothing but whitespace in the chunk
    Empty,
    /// First token is not a known verb
    UnknownVerb,
    /// Known verb with too few argument tokens
    MissingArgument,
    /// Argument token is not a signed integer
    BadArgument,
}

/// Why a well-formed or malformed command was dropped without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Malformed(Reject),
    ServoSlotOutOfRange,
}

/// Result of dispatching one chunk; dropped commands carry their reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Executed,
    Ignored(IgnoreReason),
}

impl Command {
    /// Tokenize a chunk on ASCII whitespace and parse it into a command.
    ///
    /// Tokens beyond the ones a verb consumes are ignored.
    pub fn parse(chunk: &str) -> Result<Command, Reject> {
        let mut tokens = chunk.split_ascii_whitespace();
        let verb = tokens.next().ok_or(Reject::Empty)?;

        match verb {
            "MOVE" => {
                let left = parse_int(tokens.next())?;
                let right = parse_int(tokens.next())?;
                Ok(Command::Move { left, right })
            }
            "STOP" => Ok(Command::Stop),
            "SERVO" => {
                let slot = parse_int(tokens.next())?;
                let angle = parse_int(tokens.next())?;
                Ok(Command::Servo { slot, angle })
            }
            _ => Err(Reject::UnknownVerb),
        }
    }
}

fn parse_int(token: Option<&str>) -> Result<i32, Reject> {
    let token = token.ok_or(Reject::MissingArgument)?;
    token.parse().map_err(|_| Reject::BadArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(
            Command::parse("MOVE 50 -50"),
            Ok(Command::Move {
                left: 50,
                right: -50
            })
        );
        // Leading/trailing whitespace and extra tokens are tolerated
        assert_eq!(
            Command::parse("  MOVE 0 100 junk\n"),
            Ok(Command::Move { left: 0, right: 100 })
        );
    }

    #[test]
    fn test_parse_stop() {
        assert_eq!(Command::parse("STOP"), Ok(Command::Stop));
        assert_eq!(Command::parse("STOP\n"), Ok(Command::Stop));
    }

    #[test]
    fn test_parse_servo() {
        assert_eq!(
            Command::parse("SERVO 0 90"),
            Ok(Command::Servo { slot: 0, angle: 90 })
        );
        // Negative slots parse; range enforcement belongs to the servo controller
        assert_eq!(
            Command::parse("SERVO -1 45"),
            Ok(Command::Servo {
                slot: -1,
                angle: 45
            })
        );
    }

    #[test]
    fn test_rejects() {
        assert_eq!(Command::parse(""), Err(Reject::Empty));
        assert_eq!(Command::parse("  \t "), Err(Reject::Empty));
        assert_eq!(Command::parse("FOO 1 2"), Err(Reject::UnknownVerb));
        // Case-sensitive verb match
        assert_eq!(Command::parse("move 1 2"), Err(Reject::UnknownVerb));
        assert_eq!(Command::parse("MOVE 5"), Err(Reject::MissingArgument));
        assert_eq!(Command::parse("SERVO"), Err(Reject::MissingArgument));
        assert_eq!(Command::parse("MOVE fast slow"), Err(Reject::BadArgument));
        assert_eq!(Command::parse("SERVO 0 mid"), Err(Reject::BadArgument));
    }
}
