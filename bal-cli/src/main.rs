//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = bal_cli::run() {
        eprintln!("bal: {err}");
        std::process::exit(1);
    }
}
