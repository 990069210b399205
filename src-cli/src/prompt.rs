//! Interactive questions for values not given on the command line.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Ask for a path on `output`, reading the answer from `input`.
///
/// An empty answer (or end of input) falls back to `default`. Surrounding
/// quotes, as left by dragging a file into a terminal, are stripped.
pub fn ask_path<R, W>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: Option<&Path>,
) -> io::Result<Option<PathBuf>>
where
    R: BufRead,
    W: Write,
{
    match default {
        Some(default) => writeln!(
            output,
            "{} {} (default: {}):",
            "[?]".cyan(),
            question,
            default.display()
        )?,
        None => writeln!(output, "{} {}:", "[?]".cyan(), question)?,
    }
    write!(output, "{} ", ">>>".bold())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().trim_matches(|c| c == '"' || c == '\'').trim();

    if answer.is_empty() {
        Ok(default.map(Path::to_path_buf))
    } else {
        Ok(Some(PathBuf::from(answer)))
    }
}

/// [`ask_path`] against the process's stdin and stdout.
pub fn ask_path_stdio(question: &str, default: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    ask_path(&mut stdin.lock(), &mut stdout, question, default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answer: &str, default: Option<&Path>) -> (Option<PathBuf>, String) {
        colored::control::set_override(false);
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut output = Vec::new();
        let path = ask_path(&mut input, &mut output, "Domain list", default).unwrap();
        (path, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_answer_is_trimmed() {
        let (path, shown) = ask("  domains.txt \n", None);
        assert_eq!(path, Some(PathBuf::from("domains.txt")));
        assert_eq!(shown, "[?] Domain list:\n>>> ");
    }

    #[test]
    fn test_empty_answer_uses_default() {
        let (path, shown) = ask("\n", Some(Path::new("sublist.txt")));
        assert_eq!(path, Some(PathBuf::from("sublist.txt")));
        assert!(shown.contains("(default: sublist.txt)"));
    }

    #[test]
    fn test_empty_answer_without_default() {
        let (path, _) = ask("", None);
        assert_eq!(path, None);
    }

    #[test]
    fn test_quotes_are_stripped() {
        let (path, _) = ask("'/tmp/my domains.txt'\n", None);
        assert_eq!(path, Some(PathBuf::from("/tmp/my domains.txt")));
    }
}
