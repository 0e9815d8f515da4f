//! `duality` — standalone binary entry point.
//!
//! A thin wrapper around [`duality_cli::run_cli`], forwarding its exit
//! code. All command logic lives in the library crate for testability.

fn main() {
    std::process::exit(duality_cli::run_cli());
}
