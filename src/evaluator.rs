//! Scoring analogy questions against a vector store.
//!
//! Questions come in labeled sections. The first five sections of a run are
//! semantic ones (capitals, currencies, family, ...) and everything after is
//! syntactic (plurals, tenses, ...), following the layout of the Google
//! analogy corpus from Mikolov et al. (2013).

use crate::questions::{Question, QuestionLine, QuestionReader};
use crate::top_n::TopN;
use crate::word_vectors::{Representation, WordVectors};
use std::io::{self, BufRead};
use tracing::{debug, trace};

/// Sections up to and including this ordinal count as semantic.
pub const SEMANTIC_SECTIONS: usize = 5;

/// Candidates kept per question; only the best one is scored.
pub const DEFAULT_TOP_N: usize = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Percentage correct, 0 when nothing was scored.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Semantic,
    Syntactic,
}

/// Accuracy of one finished section plus the running totals at that point.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub label: String,
    pub section: Tally,
    pub overall: Tally,
    pub semantic: Tally,
    pub syntactic: Tally,
}

/// Counters for one evaluation run.
///
/// `section` is cleared at every section boundary; all other counters
/// accumulate for the whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationState {
    /// Section markers seen so far; 0 before the first one.
    pub sections_seen: usize,
    pub section_label: String,
    pub section: Tally,
    pub overall: Tally,
    pub semantic: Tally,
    pub syntactic: Tally,
    /// Every question line read.
    pub questions_seen: usize,
    /// Question lines whose four tokens were all in vocabulary.
    pub questions_scored: usize,
}

impl EvaluationState {
    pub fn bucket(&self) -> Bucket {
        if self.sections_seen <= SEMANTIC_SECTIONS {
            Bucket::Semantic
        } else {
            Bucket::Syntactic
        }
    }

    pub fn record(&mut self, correct: bool) {
        self.section.record(correct);
        self.overall.record(correct);
        match self.bucket() {
            Bucket::Semantic => self.semantic.record(correct),
            Bucket::Syntactic => self.syntactic.record(correct),
        }
    }

    /// Close the current section (if any) and open a new one.
    pub fn begin_section(&mut self, label: String) -> Option<SectionReport> {
        let report = self.flush();
        self.sections_seen += 1;
        self.section_label = label;
        report
    }

    /// Close the last section at end of input.
    pub fn finish(&mut self) -> Option<SectionReport> {
        self.flush()
    }

    fn flush(&mut self) -> Option<SectionReport> {
        if self.sections_seen == 0 {
            // Questions before the first marker still reach the running
            // totals, but never the first section's counts.
            self.section = Tally::default();
            return None;
        }
        let report = SectionReport {
            label: std::mem::take(&mut self.section_label),
            section: self.section,
            overall: self.overall,
            semantic: self.semantic,
            syntactic: self.syntactic,
        };
        self.section = Tally::default();
        Some(report)
    }

    /// Percentage of question lines that could be scored.
    pub fn scored_percent(&self) -> f64 {
        if self.questions_seen == 0 {
            0.0
        } else {
            100.0 * self.questions_scored as f64 / self.questions_seen as f64
        }
    }
}

/// Result of one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a> {
    /// A token was out of vocabulary; nothing was scored.
    Skipped,
    Scored {
        correct: bool,
        /// Empty when no candidate beat the metric's sentinel.
        prediction: &'a str,
    },
}

/// Progress notifications from [`AnalogyEvaluator::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'e> {
    SectionStarted(&'e str),
    SectionFinished(&'e SectionReport),
}

pub struct AnalogyEvaluator<'a, R: Representation> {
    vectors: &'a WordVectors<R>,
    top_n: usize,
}

impl<'a, R: Representation> AnalogyEvaluator<'a, R> {
    pub fn new(vectors: &'a WordVectors<R>) -> Self {
        AnalogyEvaluator {
            vectors,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Keep more than one candidate per question. The value is clamped to
    /// `1..=count` since the best candidate is what gets scored and no more
    /// than `count` candidates exist.
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n.clamp(1, self.vectors.count().max(1));
        self
    }

    fn tracker(&self) -> TopN<'a, R::Metric> {
        TopN::new(self.top_n, self.vectors.dimension())
    }

    pub fn evaluate(&self, question: &Question, state: &mut EvaluationState) -> Outcome<'a> {
        self.evaluate_with(question, state, &mut self.tracker())
    }

    fn evaluate_with(
        &self,
        question: &Question,
        state: &mut EvaluationState,
        top: &mut TopN<'a, R::Metric>,
    ) -> Outcome<'a> {
        state.questions_seen += 1;

        let vectors = self.vectors;
        let (Some(a), Some(b), Some(c), Some(_)) = (
            vectors.index_of(&question.a),
            vectors.index_of(&question.b),
            vectors.index_of(&question.c),
            vectors.index_of(&question.expected),
        ) else {
            trace!(?question, "out of vocabulary, skipped");
            return Outcome::Skipped;
        };
        state.questions_scored += 1;

        vectors.rank_into([a, b, c], top);
        let prediction = top.best().map_or("", |n| n.token);
        let correct = prediction == question.expected;
        state.record(correct);

        trace!(?question, prediction, correct, "scored");
        Outcome::Scored {
            correct,
            prediction,
        }
    }

    /// Evaluate a whole question stream, reporting section boundaries to
    /// `on_event`.
    pub fn run<Q, F>(&self, questions: Q, state: &mut EvaluationState, mut on_event: F) -> io::Result<()>
    where
        Q: BufRead,
        F: FnMut(Event<'_>),
    {
        let mut top = self.tracker();
        for line in QuestionReader::new(questions) {
            match line? {
                QuestionLine::Section(label) => {
                    if let Some(report) = state.begin_section(label) {
                        on_event(Event::SectionFinished(&report));
                    }
                    debug!(section = state.sections_seen, label = %state.section_label, "section");
                    on_event(Event::SectionStarted(&state.section_label));
                }
                QuestionLine::Question(question) => {
                    self.evaluate_with(&question, state, &mut top);
                }
            }
        }
        if let Some(report) = state.finish() {
            on_event(Event::SectionFinished(&report));
        }
        Ok(())
    }
}
