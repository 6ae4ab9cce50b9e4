use anyhow::Result;
use clap::Parser;
use colored::*;
use csvtojson::cli::{self, Args, console::Console};
use std::process;
use tokio::io::BufReader;

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut console = Console::new(args.base_config());
    Console::print_banner();

    // Directories given on the command line arm the watcher before the first prompt
    if let Some(command) = args.initial_command() {
        if let Err(e) = command.and_then(|command| console.execute(command)) {
            eprintln!("{} {}", "Command failed:".bright_red().bold(), e);
        }
    }

    console.run(BufReader::new(tokio::io::stdin())).await
}
