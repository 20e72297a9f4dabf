//! Text normalizer
//!
//! Streams one corpus (plain or gzip), case-folds every line and writes a
//! gzip-compressed copy. `\r\n` line endings become `\n`, so the estimation
//! tool never sees a stray `\r` glued to the last token of a line. Nothing
//! else about line structure changes, and output line count always equals
//! input line count. Memory use is bounded by the longest line, never by
//! corpus size.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{Corpus, NormalizedText, SourceFormat};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Case-fold one line
pub fn fold_case(line: &str) -> String {
    line.to_lowercase()
}

/// Which side of the stream failed
#[derive(Debug)]
enum StreamError {
    Read(io::Error),
    Write(io::Error),
}

/// Corpus normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize `corpus` into `output`
    ///
    /// Any read, decompress or write failure is returned as an I/O error
    /// naming the file involved. A partially written output is left behind.
    pub fn normalize(&self, corpus: &Corpus, output: &Path) -> PipelineResult<NormalizedText> {
        let source = &corpus.source_path;
        let format = corpus.format();

        tracing::debug!(
            corpus = corpus.index,
            source = %source.display(),
            format = ?format,
            output = %output.display(),
            "Normalizing corpus"
        );

        let input = File::open(source).map_err(|e| PipelineError::io(source, e))?;
        let reader: Box<dyn BufRead> = match format {
            SourceFormat::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(input))),
            SourceFormat::Plain => Box::new(BufReader::new(input)),
        };

        let file = File::create(output).map_err(|e| PipelineError::io(output, e))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

        let line_count = fold_stream(reader, &mut encoder).map_err(|e| match e {
            StreamError::Read(e) => PipelineError::io(source, e),
            StreamError::Write(e) => PipelineError::io(output, e),
        })?;

        encoder
            .finish()
            .and_then(|mut writer| writer.flush())
            .map_err(|e| PipelineError::io(output, e))?;

        Ok(NormalizedText {
            index: corpus.index,
            path: output.to_path_buf(),
            line_count,
        })
    }
}

/// Copy `reader` to `writer` line by line, case-folded
///
/// Returns the number of lines; a final line without a trailing newline
/// still counts. A lone `\r` is not a line break and is kept.
fn fold_stream<R: BufRead, W: Write>(mut reader: R, writer: &mut W) -> Result<u64, StreamError> {
    let mut line = String::new();
    let mut count = 0u64;

    loop {
        line.clear();
        let read = reader.read_line(&mut line).map_err(StreamError::Read)?;
        if read == 0 {
            break;
        }
        if line.ends_with("\r\n") {
            line.truncate(line.len() - 2);
            line.push('\n');
        }
        writer
            .write_all(fold_case(&line).as_bytes())
            .map_err(StreamError::Write)?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn fold_str(input: &str) -> (String, u64) {
        let mut out = Vec::new();
        let count = fold_stream(input.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), count)
    }

    fn read_gz(path: &Path) -> String {
        let mut text = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn test_fold_preserves_lines() {
        let (out, count) = fold_str("The Cat SAT\n\nÉcole Ünd\n");
        assert_eq!(out, "the cat sat\n\nécole ünd\n");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_last_line_without_newline_counts() {
        let (out, count) = fold_str("A\nB");
        assert_eq!(out, "a\nb");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_crlf_becomes_lf() {
        let (out, count) = fold_str("One\r\nTWO\r\nThree");
        assert_eq!(out, "one\ntwo\nthree");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_lone_carriage_return_kept() {
        let (out, count) = fold_str("A\rB\nC\r");
        assert_eq!(out, "a\rb\nc\r");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_fold_is_idempotent() {
        for sample in ["Hello World", "ΣΟΦΊΑ", "straße STRASSE", "İstanbul", "mixed 123 ABC"] {
            let once = fold_case(sample);
            assert_eq!(fold_case(&once), once, "fold not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_empty_input() {
        let (out, count) = fold_str("");
        assert!(out.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let mut out = Vec::new();
        let err = fold_stream(&b"ok\n\xff\xfe\n"[..], &mut out).unwrap_err();
        assert!(matches!(err, StreamError::Read(_)));
    }

    #[test]
    fn test_normalize_plain_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("corpus.txt");
        std::fs::write(&source, "Hello There\nGENERAL Kenobi\n").unwrap();
        let corpus = Corpus {
            index: 0,
            source_path: source,
            weight: 1.0,
        };
        let output = temp_dir.path().join("0_lower.txt.gz");

        let normalized = TextNormalizer::new().normalize(&corpus, &output).unwrap();

        assert_eq!(normalized.line_count, 2);
        assert_eq!(normalized.index, 0);
        assert_eq!(read_gz(&output), "hello there\ngeneral kenobi\n");
    }

    #[test]
    fn test_normalize_gzip_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("corpus.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&source).unwrap(), Compression::fast());
        encoder.write_all(b"ABC def\nGhi\n").unwrap();
        encoder.finish().unwrap();

        let corpus = Corpus {
            index: 3,
            source_path: source,
            weight: 0.5,
        };
        let output = temp_dir.path().join("3_lower.txt.gz");

        let normalized = TextNormalizer::new().normalize(&corpus, &output).unwrap();

        assert_eq!(normalized.line_count, 2);
        assert_eq!(read_gz(&output), "abc def\nghi\n");
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = Corpus {
            index: 0,
            source_path: temp_dir.path().join("absent.txt"),
            weight: 1.0,
        };
        let output = temp_dir.path().join("0_lower.txt.gz");

        let err = TextNormalizer::new().normalize(&corpus, &output).unwrap_err();

        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_corrupt_gzip_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("broken.txt.gz");
        std::fs::write(&source, b"this is not gzip data at all").unwrap();
        let corpus = Corpus {
            index: 0,
            source_path: source.clone(),
            weight: 1.0,
        };

        let err = TextNormalizer::new()
            .normalize(&corpus, &temp_dir.path().join("0_lower.txt.gz"))
            .unwrap_err();

        match err {
            PipelineError::Io { path, .. } => assert_eq!(path, source),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }
}
