use std::io::{BufRead, Stdout, StdinLock, Write};

use super::AlbumCandidate;
use crate::error::{PipelineError, PipelineResult};

/// Outcome of a human album choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Index into the candidate list.
    Select(usize),
    /// None of the candidates is the soundtrack; the game is skipped for good.
    Skip,
}

/// Decides which search candidate, if any, is the game's soundtrack.
pub trait AlbumChooser {
    fn choose(&mut self, game_title: &str, candidates: &[AlbumCandidate]) -> PipelineResult<Choice>;
}

impl<T: AlbumChooser + ?Sized> AlbumChooser for &mut T {
    fn choose(&mut self, game_title: &str, candidates: &[AlbumCandidate]) -> PipelineResult<Choice> {
        (**self).choose(game_title, candidates)
    }
}

const SKIP_SENTINEL: &str = "-1";

/// Prints the candidates as `index:name` lines and reads the answer. End of
/// input is an error, never a skip.
pub struct ConsoleChooser<R, W> {
    input: R,
    output: W,
}

impl ConsoleChooser<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
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
}

/// `-1` skips, an in-range index selects, anything else is rejected.
fn parse_choice(answer: &str, count: usize) -> Option<Choice> {
    let answer = answer.trim();
    if answer == SKIP_SENTINEL {
        return Some(Choice::Skip);
    }
    match answer.parse::<usize>() {
        Ok(index) if index < count => Some(Choice::Select(index)),
        _ => None,
    }
}

impl<R: BufRead, W: Write> AlbumChooser for ConsoleChooser<R, W> {
    fn choose(&mut self, game_title: &str, candidates: &[AlbumCandidate]) -> PipelineResult<Choice> {
        if candidates.is_empty() {
            return Ok(Choice::Skip);
        }

        writeln!(self.output, "Game: {}", game_title)?;
        for (i, candidate) in candidates.iter().enumerate() {
            writeln!(self.output, "{}:{}", i, candidate.name)?;
        }

        loop {
            write!(
                self.output,
                "Enter number of album or {} if the correct album wasn't found (will be skipped): ",
                SKIP_SENTINEL
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // Nobody answered, so nothing may be recorded for this game.
                writeln!(self.output)?;
                return Err(PipelineError::InputClosed(game_title.to_string()));
            }

            match parse_choice(&line, candidates.len()) {
                Some(choice) => return Ok(choice),
                None => writeln!(
                    self.output,
                    "'{}' is not a number between 0 and {}",
                    line.trim(),
                    candidates.len() - 1
                )?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn candidates(names: &[&str]) -> Vec<AlbumCandidate> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| AlbumCandidate {
                id: format!("id{}", i),
                name: name.to_string(),
                artists: vec!["Capcom Sound Team".to_string()],
                link: format!("https://open.spotify.com/album/id{}", i),
            })
            .collect()
    }

    fn run(answers: &str, names: &[&str]) -> (Choice, String) {
        let mut chooser = ConsoleChooser::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new());
        let choice = chooser.choose("Okami", &candidates(names)).unwrap();
        (choice, String::from_utf8(chooser.into_output()).unwrap())
    }

    #[test]
    fn test_select_prints_numbered_list() {
        let (choice, printed) = run("1\n", &["Okami Original Soundtrack", "Okami Piano"]);
        assert_eq!(choice, Choice::Select(1));
        assert!(printed.starts_with("Game: Okami\n0:Okami Original Soundtrack\n1:Okami Piano\n"));
    }

    #[test]
    fn test_sentinel_skips() {
        let (choice, _) = run("-1\n", &["Okami Original Soundtrack"]);
        assert_eq!(choice, Choice::Skip);
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let (choice, printed) = run("seven\n5\n 0 \n", &["A", "B"]);
        assert_eq!(choice, Choice::Select(0));
        assert!(printed.contains("'seven' is not a number"));
        assert!(printed.contains("'5' is not a number"));
    }

    #[test]
    fn test_eof_aborts() {
        let mut chooser = ConsoleChooser::new(Cursor::new(Vec::new()), Vec::new());
        let err = chooser.choose("Okami", &candidates(&["A"])).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Interrupted);
        assert!(!err.is_skip());

        // Input running out after a rejected answer aborts too.
        let mut chooser = ConsoleChooser::new(Cursor::new(b"nine\n".to_vec()), Vec::new());
        assert!(chooser.choose("Okami", &candidates(&["A"])).is_err());
    }

    #[test]
    fn test_no_candidates_never_prompts() {
        let (choice, printed) = run("0\n", &[]);
        assert_eq!(choice, Choice::Skip);
        assert!(printed.is_empty());
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("2\n", 3), Some(Choice::Select(2)));
        assert_eq!(parse_choice("3", 3), None);
        assert_eq!(parse_choice("-1", 0), Some(Choice::Skip));
        assert_eq!(parse_choice("-2", 3), None);
    }
}
