//! pkgdiagram CLI - Inspect, render and print package diagrams

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is set up in run() once the flags are known
    let mut app = cli::PkgDiagramApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
