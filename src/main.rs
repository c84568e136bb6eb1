use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(
    name = "treeburg",
    version,
    about = "treeburg: BURS tree-pattern-matcher generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a C matcher from a grammar
    #[command(name = "gen")]
    Generate(cli::generate::GenArgs),
    /// Parse and validate a grammar without generating code
    Check(cli::check::CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => cli::generate::cmd_generate(args),
        Command::Check(args) => cli::check::cmd_check(args),
    }
}
