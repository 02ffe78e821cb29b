use crate::error::LoadError;
use crate::metric::{BitwiseHamming, ContinuousDot, DistanceMetric};
use crate::quantize::{BitLevel, quantize_slice};
use crate::top_n::{Neighbor, TopN};
use crate::vector_file::VectorReader;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;
use tracing::{debug, info, warn};

/// Longest token kept from a vector table, in bytes.
pub const MAX_TOKEN_LEN: usize = 50;

/// Truncate to `MAX_TOKEN_LEN` bytes on a char boundary, then upper-case.
pub fn normalize_token(raw: &str) -> String {
    let mut end = raw.len().min(MAX_TOKEN_LEN);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_uppercase()
}

/// How vectors are stored and compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// Quantized, unit-length f32 components scored by dot product.
    #[default]
    Continuous,
    /// One sign bit per component scored by Hamming distance.
    Bitwise,
}

/// Parameters for building a store from a vector table.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub encoding: Encoding,
    /// Binary f32 features (true) or decimal text features (false).
    pub binary: bool,
    /// Ignored by the bitwise encoding.
    pub bit_level: BitLevel,
    /// Load at most this many vectors; 0 loads all.
    pub word_limit: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            encoding: Encoding::Continuous,
            binary: true,
            bit_level: BitLevel::FULL,
            word_limit: 0,
        }
    }
}

/// Storage layout of one vector plus the matching query arithmetic.
pub trait Representation {
    type Element: Copy + Default + std::fmt::Debug;
    type Metric: DistanceMetric<Element = Self::Element>;

    /// Elements per stored vector.
    fn stride(dimension: usize) -> usize;

    /// Encode raw features into `out`. Returns false if the vector could
    /// not be normalized and was left as is.
    fn encode(raw: &mut [f32], bit_level: BitLevel, out: &mut [Self::Element]) -> bool;

    /// Build the query for "a is to b as c is to ?".
    fn compose(a: &[Self::Element], b: &[Self::Element], c: &[Self::Element], out: &mut [Self::Element]);
}

pub type Score<R> = <<R as Representation>::Metric as DistanceMetric>::Score;

/// Quantized then L2-normalized f32 components.
#[derive(Debug, Clone, Copy)]
pub struct Continuous;

impl Representation for Continuous {
    type Element = f32;
    type Metric = ContinuousDot;

    fn stride(dimension: usize) -> usize {
        dimension
    }

    fn encode(raw: &mut [f32], bit_level: BitLevel, out: &mut [f32]) -> bool {
        quantize_slice(raw, bit_level);
        let norm = raw.iter().map(|&x| x as f64 * x as f64).sum::<f64>().sqrt() as f32;
        out.copy_from_slice(raw);
        if norm > 0.0 {
            out.iter_mut().for_each(|e| *e /= norm);
            true
        } else {
            false
        }
    }

    fn compose(a: &[f32], b: &[f32], c: &[f32], out: &mut [f32]) {
        for (i, q) in out.iter_mut().enumerate() {
            *q = (b[i] - a[i]) + c[i];
        }
    }
}

/// One bit per component, set when the raw value is strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct BitPacked;

impl Representation for BitPacked {
    type Element = u64;
    type Metric = BitwiseHamming;

    fn stride(dimension: usize) -> usize {
        dimension.div_ceil(u64::BITS as usize)
    }

    fn encode(raw: &mut [f32], _bit_level: BitLevel, out: &mut [u64]) -> bool {
        out.fill(0);
        for (i, &value) in raw.iter().enumerate() {
            if value > 0.0 {
                out[i / 64] |= 1u64 << (i % 64);
            }
        }
        true
    }

    // (NOT a AND b) OR c. Padding bits stay clear because b's are clear.
    fn compose(a: &[u64], b: &[u64], c: &[u64], out: &mut [u64]) {
        for (i, q) in out.iter_mut().enumerate() {
            *q = (!a[i] & b[i]) | c[i];
        }
    }
}

// Token <-> index. Duplicate tokens resolve to their first occurrence.
#[derive(Debug, Default)]
struct Vocabulary {
    words: Vec<String>,
    word_map: HashMap<String, usize>,
}

impl Vocabulary {
    fn push(&mut self, word: String) {
        let index = self.words.len();
        if !self.word_map.contains_key(&word) {
            self.word_map.insert(word.clone(), index);
        } else {
            debug!(word = %word, index, "duplicate token, lookups keep the first entry");
        }
        self.words.push(word);
    }
}

/// Immutable table of word vectors in a single representation.
///
/// Vectors live in one flattened `Vec` with `R::stride(dims)` elements each.
#[derive(Debug)]
pub struct WordVectors<R: Representation> {
    vocab: Vocabulary,
    vectors: Vec<R::Element>,
    dims: usize,
    stride: usize,
}

pub type ContinuousVectors = WordVectors<Continuous>;
pub type BitPackedVectors = WordVectors<BitPacked>;

impl<R: Representation> WordVectors<R> {
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.vocab.word_map.get(word).copied()
    }

    pub fn word(&self, idx: usize) -> &str {
        &self.vocab.words[idx]
    }

    pub fn vector_at(&self, idx: usize) -> &[R::Element] {
        &self.vectors[idx * self.stride..(idx + 1) * self.stride]
    }

    pub fn count(&self) -> usize {
        self.vocab.words.len()
    }

    pub fn dimension(&self) -> usize {
        self.dims
    }

    pub fn from_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| LoadError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(BufReader::new(file), options)
    }

    pub fn load<S: BufRead>(source: S, options: &LoadOptions) -> Result<Self, LoadError> {
        let mut reader = VectorReader::new(source, options.binary);
        let header = reader.read_header()?;

        let words = if options.word_limit != 0 && header.words > options.word_limit {
            options.word_limit
        } else {
            header.words
        };
        let dims = header.dimension;
        let stride = R::stride(dims);

        let mut vectors: Vec<R::Element> = Vec::new();
        let mut vocab = Vocabulary::default();
        let megabytes = || {
            let bytes = (words as u128) * (stride as u128) * (mem::size_of::<R::Element>() as u128);
            u64::try_from(bytes / 1_048_576).unwrap_or(u64::MAX)
        };
        let total = words
            .checked_mul(stride)
            .ok_or_else(|| LoadError::Allocation {
                megabytes: megabytes(),
            })?;
        vectors
            .try_reserve_exact(total)
            .and_then(|_| vocab.words.try_reserve_exact(words))
            .map_err(|_| LoadError::Allocation {
                megabytes: megabytes(),
            })?;
        vocab
            .word_map
            .try_reserve(words)
            .map_err(|_| LoadError::Allocation {
                megabytes: megabytes(),
            })?;

        let mut raw = vec![0.0f32; dims];
        let mut degenerate = 0usize;
        for index in 0..words {
            let token = normalize_token(&reader.read_entry(index, &mut raw)?);

            let start = vectors.len();
            vectors.resize(start + stride, R::Element::default());
            if !R::encode(&mut raw, options.bit_level, &mut vectors[start..]) {
                debug!(token = %token, index, "zero-norm vector left unnormalized");
                degenerate += 1;
            }
            vocab.push(token);
        }

        if degenerate > 0 {
            warn!(degenerate, "vectors with zero norm after quantization");
        }
        info!(
            words,
            dims,
            declared = header.words,
            bit_level = %options.bit_level,
            "loaded word vectors"
        );

        Ok(WordVectors {
            vocab,
            vectors,
            dims,
            stride,
        })
    }

    /// The `n` best candidates for "a is to b as c is to ?", never
    /// including a, b or c themselves. `n` is capped at the vocabulary size.
    pub fn nearest(&self, anchors: [usize; 3], n: usize) -> Vec<Neighbor<'_, Score<R>>> {
        let mut top = TopN::<R::Metric>::new(n.min(self.count()), self.dims);
        self.rank_into(anchors, &mut top);
        top.into_results()
    }

    /// Reset `top` and refill it with the best candidates for the analogy
    /// `anchors`, so one tracker can serve a whole run.
    pub fn rank_into<'s>(&'s self, anchors: [usize; 3], top: &mut TopN<'s, R::Metric>) {
        let [a, b, c] = anchors;
        let mut query = vec![R::Element::default(); self.stride];
        R::compose(self.vector_at(a), self.vector_at(b), self.vector_at(c), &mut query);

        top.reset();
        for (idx, candidate) in self.vectors.chunks_exact(self.stride).enumerate() {
            if anchors.contains(&idx) {
                continue;
            }
            top.offer(R::Metric::score(&query, candidate), self.word(idx));
        }
    }

    /// Same as `nearest`, by word. `None` if any word is out of vocabulary.
    pub fn analogy_top_n(
        &self,
        a: &str,
        b: &str,
        c: &str,
        n: usize,
    ) -> Option<Vec<Neighbor<'_, Score<R>>>> {
        let (Some(a_idx), Some(b_idx), Some(c_idx)) =
            (self.index_of(a), self.index_of(b), self.index_of(c))
        else {
            return None;
        };
        Some(self.nearest([a_idx, b_idx, c_idx], n))
    }
}

/// A store whose representation was chosen at run time.
#[derive(Debug)]
pub enum AnyVectors {
    Continuous(ContinuousVectors),
    BitPacked(BitPackedVectors),
}

impl AnyVectors {
    pub fn from_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, LoadError> {
        Ok(match options.encoding {
            Encoding::Continuous => AnyVectors::Continuous(WordVectors::from_file(path, options)?),
            Encoding::Bitwise => AnyVectors::BitPacked(WordVectors::from_file(path, options)?),
        })
    }

    pub fn load<S: BufRead>(source: S, options: &LoadOptions) -> Result<Self, LoadError> {
        Ok(match options.encoding {
            Encoding::Continuous => AnyVectors::Continuous(WordVectors::load(source, options)?),
            Encoding::Bitwise => AnyVectors::BitPacked(WordVectors::load(source, options)?),
        })
    }

    pub fn count(&self) -> usize {
        match self {
            AnyVectors::Continuous(v) => v.count(),
            AnyVectors::BitPacked(v) => v.count(),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            AnyVectors::Continuous(v) => v.dimension(),
            AnyVectors::BitPacked(v) => v.dimension(),
        }
    }
}
