//! Entry point for the `parkspot` command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = parkspot_cli::run() {
        eprintln!("parkspot: {err}");
        std::process::exit(1);
    }
}
