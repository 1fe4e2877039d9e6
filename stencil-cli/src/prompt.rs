//! Console template chooser
//!
//! Renders one level of the catalog as a numbered list and reads the
//! user's pick from a line of input.

use std::io::{self, BufRead, Write};

use stencil_core::catalog::{Chooser, SelectionStep};

const RULE: &str = "-----------------------------------------";
const PROMPT: &str = "Select a template [1]: ";

/// [`Chooser`] reading answers from a line-oriented console
pub struct ConsoleChooser<R, W> {
    input: R,
    output: W,
}

impl ConsoleChooser<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    fn render(&mut self, step: &SelectionStep<'_>) -> io::Result<()> {
        let width = step
            .candidates
            .iter()
            .map(|entry| entry.title.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(self.output)?;
        writeln!(self.output, "{}", step.heading())?;
        writeln!(self.output, "{RULE}")?;
        for (i, entry) in step.candidates.iter().enumerate() {
            writeln!(
                self.output,
                "{}. {:<width$} [{}]",
                i + 1,
                entry.title,
                entry.path
            )?;
        }
        writeln!(self.output)
    }
}

impl<R: BufRead, W: Write> Chooser for ConsoleChooser<R, W> {
    fn choose(&mut self, step: &SelectionStep<'_>) -> io::Result<usize> {
        self.render(step)?;

        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "no template selected",
                ));
            }

            match parse_selection(line.trim(), step.candidates.len()) {
                Some(index) => return Ok(index),
                None => writeln!(
                    self.output,
                    "Enter a number between 1 and {}.",
                    step.candidates.len()
                )?,
            }
        }
    }
}

/// 1-based selection; empty input picks the first candidate
fn parse_selection(input: &str, len: usize) -> Option<usize> {
    if input.is_empty() {
        return Some(1);
    }

    if !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    input
        .parse::<usize>()
        .ok()
        .filter(|index| (1..=len).contains(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stencil_core::catalog::{ManifestEntry, PackageId};

    fn entries() -> Vec<ManifestEntry> {
        vec![
            ManifestEntry::template("console", "Console App", None, vec![], PackageId::new("A", "1.0")),
            ManifestEntry::template("lib", "Library", None, vec![], PackageId::new("A", "1.0")),
        ]
    }

    fn run(input: &str, candidates: &[ManifestEntry]) -> (io::Result<usize>, String) {
        let mut chooser = ConsoleChooser::new(input.as_bytes(), Vec::new());
        let step = SelectionStep {
            context: None,
            candidates,
        };
        let result = chooser.choose(&step);
        let output = String::from_utf8(chooser.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn test_renders_padded_list() {
        let (result, output) = run("2\n", &entries());

        assert_eq!(result.unwrap(), 2);
        assert_eq!(
            output,
            "\nTemplates\n-----------------------------------------\n\
             1. Console App [console]\n\
             2. Library     [lib]\n\n\
             Select a template [1]: "
        );
    }

    #[test]
    fn test_empty_input_selects_first() {
        let (result, _) = run("\n", &entries());
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_invalid_input_prompts_again() {
        let (result, output) = run("abc\n0\n3\n2\n", &entries());

        assert_eq!(result.unwrap(), 2);
        assert_eq!(output.matches("Select a template [1]: ").count(), 4);
        assert_eq!(output.matches("Enter a number between 1 and 2.").count(), 3);
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        let (result, _) = run("", &entries());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_category_heading() {
        let web = ManifestEntry::category("web", "ASP.NET Core", None, entries()).unwrap();
        let mut chooser = ConsoleChooser::new("1\n".as_bytes(), Vec::new());
        chooser
            .choose(&SelectionStep {
                context: Some(&web),
                candidates: web.children(),
            })
            .unwrap();

        let output = String::from_utf8(chooser.into_output()).unwrap();
        assert!(output.starts_with("\nASP.NET Core\n"));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("", 3), Some(1));
        assert_eq!(parse_selection("3", 3), Some(3));
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("-1", 3), None);
        assert_eq!(parse_selection("+2", 3), None);
        assert_eq!(parse_selection("2 ", 3), None);
    }
}
