use std::io::{self, Read};
use std::path::Path;

/// Splits newline-separated input into URLs.
///
/// Each line is trimmed and blank lines are skipped. Every other line is
/// kept so that it shows up in the results, valid or not.
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads a URL list from a file, or from stdin when the path is `-`
pub fn read_url_list(path: &Path) -> io::Result<Vec<String>> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(parse_url_list(&contents))
}
