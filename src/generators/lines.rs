//! Cyclic line supplier backing the log-line generators.

use super::GeneratorError;
use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_TEXT: &str = "Lorem ipsum dolor sit amet, consetetur sadipscing elitr,
sed diam nonumy eirmod tempor invidunt ut labore et dolore magna aliquyam erat,
sed diam voluptua. At vero eos et accusam et justo duo dolores et ea rebum. Stet
clita kasd gubergren, no sea takimata sanctus est Lorem ipsum dolor sit amet.
Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod
tempor invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At
vero eos et accusam et justo duo dolores et ea rebum. Stet clita kasd gubergren,
no sea takimata sanctus est Lorem ipsum dolor sit amet.";

static DEFAULT_CORPUS: Lazy<Arc<[String]>> = Lazy::new(|| split_lines(DEFAULT_TEXT));

/// Shared handle to the built-in corpus
pub fn default_corpus() -> Arc<[String]> {
    Arc::clone(&DEFAULT_CORPUS)
}

/// Read a whole sample file into memory and split it into lines.
///
/// `.gz` and `.bz2` files are decompressed first; anything else is read as
/// text. Invalid UTF-8 is replaced rather than rejected.
pub fn read_sample_file(path: &Path) -> Result<Arc<[String]>, GeneratorError> {
    let sample_err = |source: std::io::Error| GeneratorError::SampleFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(sample_err)?;
    let mut reader: Box<dyn Read> = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("gz") => {
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        }
        Some(ext) if ext.eq_ignore_ascii_case("bz2") => {
            Box::new(BzDecoder::new(BufReader::new(file)))
        }
        _ => Box::new(file),
    };

    let mut content = Vec::new();
    reader.read_to_end(&mut content).map_err(sample_err)?;
    Ok(split_lines(&String::from_utf8_lossy(&content)))
}

// Splits on '\n' exactly: a trailing newline leaves a trailing empty line,
// and empty input still yields one line.
fn split_lines(text: &str) -> Arc<[String]> {
    text.split('\n').map(str::to_owned).collect()
}

/// Ordered, fixed set of lines plus a private cursor.
///
/// The cursor always stays in `[0, len)` and wraps to the first line after
/// the last one. Sources built over the same corpus share its storage but
/// never each other's position.
#[derive(Debug, Clone)]
pub struct LineSource {
    lines: Arc<[String]>,
    cursor: usize,
}

impl LineSource {
    pub fn new(lines: Arc<[String]>) -> Result<Self, GeneratorError> {
        if lines.is_empty() {
            return Err(GeneratorError::EmptyCorpus);
        }
        Ok(Self { lines, cursor: 0 })
    }

    pub fn from_lines<I, S>(lines: I) -> Result<Self, GeneratorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(Into::into).collect())
    }

    pub fn with_default_corpus() -> Self {
        Self {
            lines: default_corpus(),
            cursor: 0,
        }
    }

    pub fn from_sample_file(path: &Path) -> Result<Self, GeneratorError> {
        Self::new(read_sample_file(path)?)
    }

    pub fn next_line(&mut self) -> &str {
        let idx = self.cursor;
        self.cursor += 1;
        if self.cursor >= self.lines.len() {
            self.cursor = 0;
        }
        &self.lines[idx]
    }

    /// Concatenate `repeat` consecutive draws into one string.
    ///
    /// A repeat of 0 is treated as 1.
    pub fn next_text(&mut self, repeat: usize) -> String {
        if repeat <= 1 {
            return self.next_line().to_owned();
        }
        let mut buf = String::new();
        for _ in 0..repeat {
            buf.push_str(self.next_line());
        }
        buf
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_path(ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("generatorbeat-{}.{}", uuid::Uuid::new_v4(), ext))
    }

    #[test]
    fn default_corpus_has_eight_lines() {
        let src = LineSource::with_default_corpus();
        assert_eq!(src.len(), 8);
    }

    #[test]
    fn cycles_back_to_first_line() {
        for len in 1..6 {
            let mut src = LineSource::from_lines((0..len).map(|i| format!("l{i}"))).unwrap();
            let first = src.next_line().to_owned();
            for _ in 1..len {
                src.next_line();
            }
            assert_eq!(src.next_line(), first, "corpus of {len}");
        }
    }

    #[test]
    fn cursor_stays_in_range() {
        let mut src = LineSource::from_lines(["a", "b", "c"]).unwrap();
        for _ in 0..10 {
            src.next_line();
            assert!(src.cursor() < src.len());
        }
    }

    #[test]
    fn repeat_concatenates_and_wraps() {
        let mut src = LineSource::from_lines(["a", "b", "c", "d"]).unwrap();
        assert_eq!(src.next_text(3), "abc");
        assert_eq!(src.next_text(3), "dab");
        assert_eq!(src.cursor(), 2);
    }

    #[test]
    fn repeat_larger_than_corpus() {
        let mut src = LineSource::from_lines(["x", "y"]).unwrap();
        assert_eq!(src.next_text(5), "xyxyx");
        assert_eq!(src.cursor(), 1);
    }

    #[test]
    fn empty_corpus_rejected() {
        let err = LineSource::from_lines(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyCorpus));
    }

    #[test]
    fn plain_sample_file_replaces_default() {
        let path = temp_path("log");
        std::fs::write(&path, "one\ntwo\nthree").unwrap();
        let mut src = LineSource::from_sample_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(src.len(), 3);
        assert_eq!(src.next_line(), "one");
        assert_eq!(src.next_line(), "two");
        assert_eq!(src.next_line(), "three");
        assert_eq!(src.next_line(), "one");
    }

    #[test]
    fn trailing_newline_keeps_empty_line() {
        let path = temp_path("txt");
        std::fs::write(&path, "a\nb\n").unwrap();
        let src = LineSource::from_sample_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(src.len(), 3);
    }

    #[test]
    fn gzip_sample_file() {
        let path = temp_path("gz");
        let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"gz-1\ngz-2").unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();
        let mut src = LineSource::from_sample_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(src.next_text(2), "gz-1gz-2");
    }

    #[test]
    fn bzip2_sample_file() {
        let path = temp_path("bz2");
        let mut enc = BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(b"bz-1\nbz-2\nbz-3").unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();
        let src = LineSource::from_sample_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(src.len(), 3);
    }

    #[test]
    fn compressed_extension_is_case_insensitive() {
        let path = temp_path("LOG.GZ");
        let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"upper-1\nupper-2").unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();
        let mut src = LineSource::from_sample_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(src.next_text(2), "upper-1upper-2");

        let path = temp_path("Bz2");
        let mut enc = BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(b"mixed").unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();
        let mut src = LineSource::from_sample_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(src.next_line(), "mixed");
    }

    #[test]
    fn corrupt_gzip_is_an_error() {
        let path = temp_path("gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        let err = LineSource::from_sample_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, GeneratorError::SampleFile { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = LineSource::from_sample_file(&temp_path("log")).unwrap_err();
        assert!(matches!(err, GeneratorError::SampleFile { .. }));
    }
}
