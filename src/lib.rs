//! Word-analogy evaluation for learned word vectors.
//!
//! Loads a vector table (optionally quantized, or reduced to sign bits),
//! answers "A is to B as C is to ?" by nearest-neighbour search over the
//! whole vocabulary, and tallies accuracy per question section.

pub mod error;
pub mod evaluator;
pub mod logging;
pub mod metric;
pub mod quantize;
pub mod questions;
pub mod top_n;
pub mod vector_file;
pub mod word_vectors;

pub use error::{LoadError, QuantizeError};
pub use evaluator::{AnalogyEvaluator, EvaluationState, Event, Outcome, SectionReport, Tally};
pub use metric::{BitwiseHamming, ContinuousDot, DistanceMetric};
pub use quantize::{BitLevel, quantize};
pub use questions::{Question, QuestionLine, QuestionReader};
pub use top_n::{Neighbor, TopN};
pub use vector_file::{Header, VectorReader, VectorWriter};
pub use word_vectors::{
    AnyVectors, BitPacked, BitPackedVectors, Continuous, ContinuousVectors, Encoding,
    LoadOptions, Representation, WordVectors,
};
