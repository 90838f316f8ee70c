mod backend;
mod commands;
mod config;
mod context;
mod error;
mod executor;
mod extract;
mod gate;
mod logging;
mod presenter;
mod safety;
mod types;
mod ui;

use clap::{Parser, Subcommand};
use config::load_config;

/// Ask a language model for help and run the shell commands it suggests,
/// with confirmation scaled to how risky each command looks.
#[derive(Parser, Debug)]
#[command(
    name = "davidgnome",
    version,
    args_conflicts_with_subcommands = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// What you want to do, in plain words
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    prompt: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Choose the backend used for future queries (gpt, claude, gemini, ollama)
    SetBackend { name: Option<String> },
}

fn print_usage() {
    eprintln!("usage: davidgnome <your query>");
    eprintln!("       davidgnome set-backend <gpt|claude|gemini|ollama>");
}

fn main() {
    logging::init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::SetBackend { name }) => commands::cmd_set_backend(name.as_deref()),
        None => {
            let prompt = cli.prompt.join(" ");
            if prompt.trim().is_empty() {
                print_usage();
                std::process::exit(1);
            }
            commands::cmd_query(&prompt, &load_config())
        }
    };

    if let Err(e) = result {
        eprintln!("davidgnome: {:#}", e);
        std::process::exit(1);
    }
}
