//! Tokenizer for analogy question files.
//!
//! ```text
//! : capital-common-countries
//! Athens Greece Baghdad Iraq
//! ```
//!
//! Question tokens are upper-cased; section labels keep their case. `EXIT`
//! in place of a question ends the stream.

use crate::vector_file::next_token;
use std::io::{self, BufRead};

const SECTION_MARKER: &str = ":";
const EXIT: &str = "EXIT";

/// "a is to b as c is to expected".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub a: String,
    pub b: String,
    pub c: String,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionLine {
    /// Start of a labeled section.
    Section(String),
    Question(Question),
}

pub struct QuestionReader<R> {
    inner: R,
    done: bool,
}

impl<R: BufRead> QuestionReader<R> {
    pub fn new(inner: R) -> Self {
        QuestionReader { inner, done: false }
    }

    fn raw_token(&mut self) -> io::Result<Option<String>> {
        if self.done {
            return Ok(None);
        }
        let token = next_token(&mut self.inner)?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned());
        if token.is_none() {
            self.done = true;
        }
        Ok(token)
    }

    fn token(&mut self) -> io::Result<Option<String>> {
        Ok(self.raw_token()?.map(|t| t.to_uppercase()))
    }

    /// `Ok(None)` at end of input, after `EXIT`, or when the input ends
    /// partway through a question or before a section label.
    pub fn next_line(&mut self) -> io::Result<Option<QuestionLine>> {
        let Some(raw) = self.raw_token()? else {
            return Ok(None);
        };

        if let Some(label) = raw.strip_prefix(SECTION_MARKER) {
            let label = if label.is_empty() {
                match self.raw_token()? {
                    Some(label) => label,
                    None => return Ok(None),
                }
            } else {
                label.to_string()
            };
            return Ok(Some(QuestionLine::Section(label)));
        }

        let first = raw.to_uppercase();
        if first == EXIT {
            self.done = true;
            return Ok(None);
        }

        let (Some(b), Some(c), Some(expected)) = (self.token()?, self.token()?, self.token()?)
        else {
            return Ok(None);
        };
        Ok(Some(QuestionLine::Question(Question {
            a: first,
            b,
            c,
            expected,
        })))
    }
}

impl<R: BufRead> Iterator for QuestionReader<R> {
    type Item = io::Result<QuestionLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str) -> Vec<QuestionLine> {
        QuestionReader::new(Cursor::new(text.as_bytes().to_vec()))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    fn q(a: &str, b: &str, c: &str, d: &str) -> QuestionLine {
        QuestionLine::Question(Question {
            a: a.into(),
            b: b.into(),
            c: c.into(),
            expected: d.into(),
        })
    }

    #[test]
    fn sections_and_questions() {
        let lines = read_all(": capital-common-countries\nAthens Greece Baghdad Iraq\n:family\nboy girl brother sister\n");
        assert_eq!(
            lines,
            vec![
                QuestionLine::Section("capital-common-countries".into()),
                q("ATHENS", "GREECE", "BAGHDAD", "IRAQ"),
                QuestionLine::Section("family".into()),
                q("BOY", "GIRL", "BROTHER", "SISTER"),
            ]
        );
    }

    #[test]
    fn section_labels_keep_their_case() {
        let lines = read_all(": Capital-World\nParis France Rome Italy\n:gram3-Comparative\n: exit\n");
        assert_eq!(
            lines,
            vec![
                QuestionLine::Section("Capital-World".into()),
                q("PARIS", "FRANCE", "ROME", "ITALY"),
                QuestionLine::Section("gram3-Comparative".into()),
                QuestionLine::Section("exit".into()),
            ]
        );
    }

    #[test]
    fn exit_stops_reading() {
        let lines = read_all("a b c d\nexit\ne f g h\n");
        assert_eq!(lines, vec![q("A", "B", "C", "D")]);
    }

    #[test]
    fn incomplete_trailing_question_is_dropped() {
        assert_eq!(read_all("a b c d\ne f"), vec![q("A", "B", "C", "D")]);
        assert!(read_all(":").is_empty());
        assert!(read_all("").is_empty());
    }
}
