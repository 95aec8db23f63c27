//! Reads MessagePack from stdin and prints one top-level item per line,
//! each prefixed with its byte offset in hex.

mod dump;

use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wirepack-dump", version, about, long_about = None)]
struct Args {
    /// Tab size. Without it, structures are written on a single line.
    #[arg(short = 't', value_name = "N", value_parser = clap::value_parser!(u8).range(1..=9))]
    tab: Option<u8>,
    /// Recognize records (arrays led by ext 127).
    #[arg(short = 'r')]
    records: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let options = dump::Options {
        indent: args.tab.map_or(0, usize::from),
        records: args.records,
    };
    let out = BufWriter::new(io::stdout().lock());
    match dump::dump(io::stdin().lock(), out, options) {
        Ok(code) => {
            tracing::debug!(code = code.code(), "input finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "cannot write output");
            ExitCode::FAILURE
        }
    }
}
