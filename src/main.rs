use clap::Parser;
use longbias::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
