// Console sender: forwards user-typed command lines to the rover verbatim
use std::io::{self, BufRead, Write};
use std::net::TcpStream;

use clap::Parser;

use rover_tcp_runtime::config::DEFAULT_PORT;

#[derive(Parser, Debug)]
#[command(about = "Send motion commands to the rover")]
struct Args {
    /// Rover address
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut stream = TcpStream::connect((args.host.as_str(), args.port))?;
    println!("Connected to {}:{}", args.host, args.port);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }
        stream.write_all(cmd.as_bytes())?;
    }

    Ok(())
}
