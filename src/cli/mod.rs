pub mod check;
pub mod generate;

use std::path::Path;
use std::process;

use treeburg::diagnostic::render_diagnostics;

/// Display name for diagnostics: the path, or `<stdin>` for `-`.
pub fn display_name(input: &Path) -> String {
    if input == Path::new("-") {
        "<stdin>".to_string()
    } else {
        input.display().to_string()
    }
}

/// Read grammar source or exit with an error.
pub fn load_source(input: &Path) -> String {
    match treeburg::read_source(input) {
        Ok(source) => source,
        Err(e) => {
            render_diagnostics(&[e], &display_name(input), "");
            process::exit(1);
        }
    }
}
