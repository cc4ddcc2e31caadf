use std::io::{self, Write};
use std::path::Path;

/// Write rendered output as-is, to `path` or stdout
pub fn write_rendered(rendered: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(rendered.as_bytes())?;
            out.flush()
        }
    }
}

pub fn print_text(s: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{s}")
}
