//! Text Formats
//!
//! Whitespace-separated word-vector and lexicon files.
//!
//! Vector file:  `word c1 c2 ... cN` per line, vectors unit-normalised on load.
//! Lexicon file: `word neighbor1 neighbor2 ...` per line, tokens normalised.
//! Export:       `word c1 ... cN` with 4 decimal places.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{RetrofitError, Result};
use crate::vector::{normalize_smoothed, normalize_token, Lexicon, VectorSpace};

const VECTOR_PROGRESS_LINES: usize = 100_000;
const LEXICON_PROGRESS_LINES: usize = 10_000;

fn open(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        warn!(path = %path.display(), "Input file does not exist");
        return Err(RetrofitError::InputMissing(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| RetrofitError::io(path, e))?;
    Ok(BufReader::new(file))
}

/// Load a word-vector file
pub fn read_word_vectors(path: impl AsRef<Path>) -> Result<VectorSpace> {
    let path = path.as_ref();
    info!(path = %path.display(), "Reading word vectors");
    let space = parse_word_vectors(open(path)?, path)?;
    info!(words = space.len(), dimension = ?space.dimension(), "Word vectors loaded");
    Ok(space)
}

/// Parse word vectors from any buffered reader
///
/// Lines with fewer than two tokens are skipped; unparsable or non-finite
/// components become 0.0. A line whose dimensionality differs from the
/// first accepted line fails the whole load.
pub fn parse_word_vectors<R: BufRead>(reader: R, source: &Path) -> Result<VectorSpace> {
    let mut space = VectorSpace::new();

    for_each_line(reader, source, |line_no, line| {
        let line = line.trim().to_lowercase();

        let mut tokens = line.split_whitespace();
        let Some(word) = tokens.next() else {
            warn!(line = line_no, "Skipping empty line");
            return Ok(());
        };

        let mut vector: Vec<f64> = tokens.map(|token| parse_component(token, line_no)).collect();

        if vector.is_empty() {
            warn!(line = line_no, word, "Skipping line without components");
            return Ok(());
        }

        normalize_smoothed(&mut vector);

        if let Some(expected) = space.dimension() {
            if expected != vector.len() {
                return Err(RetrofitError::dimension(
                    format!("{} line {} ('{}')", source.display(), line_no, word),
                    expected,
                    vector.len(),
                ));
            }
        }
        space.put(word, vector)?;

        if line_no % VECTOR_PROGRESS_LINES == 0 {
            debug!(lines = line_no, "Processed vector lines");
        }
        Ok(())
    })?;

    Ok(space)
}

/// `nan`, `inf` and `infinity` parse as f64 but are not vector components
fn parse_component(token: &str, line_no: usize) -> f64 {
    token
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .unwrap_or_else(|| {
            warn!(line = line_no, token, "Invalid number, using 0.0");
            0.0
        })
}

/// Feed each line to `f` with its 1-based number
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD instead of
/// failing the read.
fn for_each_line<R, F>(mut reader: R, source: &Path, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<()>,
{
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| RetrofitError::io(source, e))?;
        if read == 0 {
            return Ok(());
        }
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            warn!(line = line_no, "Line is not valid UTF-8, decoding lossily");
        }
        f(line_no, &line)?;
    }
}

/// Load a lexicon file
pub fn read_lexicon(path: impl AsRef<Path>) -> Result<Lexicon> {
    let path = path.as_ref();
    info!(path = %path.display(), "Reading lexicon");
    let lexicon = parse_lexicon(open(path)?, path)?;
    info!(entries = lexicon.len(), "Lexicon loaded");
    Ok(lexicon)
}

/// Parse a lexicon from any buffered reader; later duplicate keys win
pub fn parse_lexicon<R: BufRead>(reader: R, source: &Path) -> Result<Lexicon> {
    let mut lexicon = Lexicon::new();

    for_each_line(reader, source, |line_no, line| {
        let line = line.trim().to_lowercase();

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            warn!(line = line_no, "Skipping invalid lexicon line");
            return Ok(());
        }

        let neighbors = tokens[1..].iter().map(|t| normalize_token(t)).collect();
        lexicon.insert(normalize_token(tokens[0]), neighbors);

        if line_no % LEXICON_PROGRESS_LINES == 0 {
            debug!(lines = line_no, "Processed lexicon lines");
        }
        Ok(())
    })?;

    Ok(lexicon)
}

/// Write `space` as text, words in lexical order, components to 4 decimals
pub fn write_word_vectors(space: &VectorSpace, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    info!(path = %path.display(), words = space.len(), "Writing word vectors");

    let file = File::create(path).map_err(|e| RetrofitError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let count = format_word_vectors(space, &mut writer).map_err(|e| RetrofitError::io(path, e))?;
    writer.flush().map_err(|e| RetrofitError::io(path, e))?;

    info!(words = count, "Word vectors written");
    Ok(count)
}

fn format_word_vectors<W: Write>(space: &VectorSpace, writer: &mut W) -> std::io::Result<usize> {
    let mut count = 0;
    for word in space.sorted_words() {
        let Some(vector) = space.get(word) else {
            continue;
        };
        write!(writer, "{}", word)?;
        for x in vector {
            write!(writer, " {:.4}", x)?;
        }
        writeln!(writer)?;
        count += 1;
    }
    Ok(count)
}
