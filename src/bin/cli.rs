//! pmrcon CLI
//!
//! Interactive shell: log in once, then forward each line as a command.

use std::io::{self, BufRead, Write};

use clap::Parser;
use pmrcon::{Config, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// Line that ends the shell
const EXIT_COMMAND: &str = ".exit";

/// pmrcon
#[derive(Parser, Debug)]
#[command(name = "pmrcon")]
#[command(about = "Remote console (RCON) client")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    address: String,

    /// RCON password
    password: String,

    /// TCP connect timeout in milliseconds (0 = OS default)
    #[arg(long, default_value = "5000")]
    connect_timeout_ms: u64,

    /// Per-command read timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Log protocol activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.verbose { "warn,pmrcon=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let config = Config::builder()
        .connect_timeout_ms(args.connect_timeout_ms)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let mut session = match Session::connect_with_config(&args.address, &args.password, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    println!("Successfully logged in at {}!", args.address);

    if let Err(e) = run_shell(&mut session) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let _ = session.close();
}

/// Read commands until `.exit` or end of input
///
/// Command errors are printed and the loop goes on; stdin errors end it.
fn run_shell(session: &mut Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        prompt()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        let input = line.trim();
        if input == EXIT_COMMAND {
            return Ok(());
        }
        if input.is_empty() {
            continue;
        }

        match session.send_command(input) {
            Ok(reply) => println!("Server:\n{}", reply),
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "Enter command:\n>")?;
    stdout.flush()
}
