use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{display_name, load_source};

#[derive(Args)]
pub struct CheckArgs {
    /// Input grammar file (`-` for stdin)
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let filename = display_name(&args.input);
    let source = load_source(&args.input);

    match treeburg::check(&source, &filename) {
        Ok(summary) => {
            eprintln!("OK: {}", filename);
            eprintln!(
                "  {} terminals, {} nonterminals, {} rules ({} chain)",
                summary.terminals, summary.nonterminals, summary.rules, summary.chain_rules
            );
            eprintln!("  state: {} rule bits per node", summary.state_bits);
            if summary.warnings > 0 {
                eprintln!("  {} warning(s)", summary.warnings);
            }
        }
        Err(_) => process::exit(1),
    }
}
