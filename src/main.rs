//! kvlog - Command-Line Front End
//! One-shot `put`, `get` and `del` commands against `data.log` in the
//! working directory.

use std::io::{self, Write};
use std::path::Path;

use kvlog::Store;

const DATA_FILE: &str = "data.log";

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Usage:")?;
    writeln!(out, "  kvlog put <key> <value>     Insert or update a key")?;
    writeln!(out, "  kvlog get <key>             Get a value")?;
    writeln!(out, "  kvlog del <key>             Delete a key")?;
    writeln!(out, "  kvlog --help                Show this help message")
}

/// Execute one command. `args` excludes the program name.
fn run(args: &[String], data_file: &Path, out: &mut impl Write) -> io::Result<()> {
    let cmd = match args.first() {
        Some(cmd) => cmd.as_str(),
        None => {
            writeln!(out, "ERROR: No command provided")?;
            return print_help(out);
        }
    };

    if cmd == "--help" || cmd == "-h" {
        return print_help(out);
    }

    let mut store = match Store::open(data_file) {
        Ok(store) => store,
        Err(err) => return writeln!(out, "ERROR: cannot open database: {}", err),
    };

    match cmd {
        "put" => {
            let (key, value) = match (args.get(1), args.get(2)) {
                (Some(key), Some(value)) => (key, value),
                _ => return writeln!(out, "ERROR: put requires <key> <value>"),
            };
            match store.put(key.as_bytes(), value.as_bytes()) {
                Ok(()) => writeln!(out, "OK"),
                Err(e) => writeln!(out, "ERROR: {}", e),
            }
        }
        "get" => {
            let key = match args.get(1) {
                Some(key) => key,
                None => return writeln!(out, "ERROR: get requires <key>"),
            };
            match store.get(key.as_bytes()) {
                Ok(Some(value)) => writeln!(out, "{}", String::from_utf8_lossy(&value)),
                Ok(None) => writeln!(out, "NOT FOUND"),
                Err(e) => {
                    log::warn!("get failed: {}", e);
                    writeln!(out, "NOT FOUND")
                }
            }
        }
        "del" => {
            let key = match args.get(1) {
                Some(key) => key,
                None => return writeln!(out, "ERROR: del requires <key>"),
            };
            match store.delete(key.as_bytes()) {
                Ok(()) => writeln!(out, "OK"),
                Err(e) => writeln!(out, "ERROR: {}", e),
            }
        }
        _ => {
            writeln!(out, "ERROR: Unknown command: {}", cmd)?;
            print_help(out)
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdout = io::stdout();
    if let Err(err) = run(&args, Path::new(DATA_FILE), &mut stdout.lock()) {
        eprintln!("[ERROR] failed to write output: {}", err);
    }
}
