use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{display_name, load_source};
use treeburg::diagnostic::render_diagnostics;

#[derive(Args)]
pub struct GenArgs {
    /// Input grammar file (`-` or absent for stdin)
    pub input: Option<PathBuf>,
    /// Output C file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Prefix for every generated identifier (default: `_`)
    #[arg(long)]
    pub prefix: Option<String>,
    /// Emit a trace call before every cost comparison
    #[arg(short = 'T', long)]
    pub trace: bool,
    /// Settings file (default: nearest treeburg.toml above the input)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn cmd_generate(args: GenArgs) {
    let GenArgs {
        input,
        output,
        prefix,
        trace,
        config,
    } = args;
    let input = input.unwrap_or_else(|| PathBuf::from("-"));
    let filename = display_name(&input);
    let source = load_source(&input);

    let file_input = (input != PathBuf::from("-")).then_some(input.as_path());
    let mut options = match treeburg::resolve_options(file_input, config.as_deref()) {
        Ok(options) => options,
        Err(e) => {
            render_diagnostics(&[e], &filename, &source);
            process::exit(1);
        }
    };
    if let Some(prefix) = prefix {
        options.prefix = prefix;
    }
    options.trace |= trace;

    let code = match treeburg::generate_with_options(&source, &filename, &options) {
        Ok(code) => code,
        Err(_) => process::exit(1),
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &code) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Generated {} -> {}", filename, path.display());
        }
        None => print!("{}", code),
    }
}
