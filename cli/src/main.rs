//! Binary entrypoint for fontcat.

fn main() {
    if let Err(err) = fontcat_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
