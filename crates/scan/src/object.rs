//! Scanning one object.

use crate::error::{ErrorKind, Result};
use crate::window::Emitter;
use exn::ResultExt;
use logscan_compress::Selector;
use logscan_compress::error::ErrorKind as CompressErrorKind;
use std::io::{self, BufRead, BufReader, Read, Seek, Write};
use tempfile::NamedTempFile;
use tracing::instrument;

const STAGING_PREFIX: &str = "logscan_";

/// Counters for one scanned object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectReport {
    /// Raw (still compressed) bytes staged.
    pub bytes: u64,
    /// Decoded lines read.
    pub lines: u64,
    /// Error lines found.
    pub matches: u64,
    /// Error and context lines printed.
    pub emitted: u64,
}

/// Scan a single object's body and print its error lines to `out`.
///
/// The body is first copied in full to a temporary file (prefix `logscan_`)
/// that is removed again when this returns, whether or not the scan
/// succeeded. The staged copy is then decoded as `selector` decides for
/// `key` and split into lines on `\n`; a `\r` right before it and the final
/// line's missing terminator are both tolerated.
///
/// Nothing is retried. The first failure is returned and the caller should
/// stop; lines already printed stay printed.
#[instrument(level = "debug", skip(body, out), fields(compression = tracing::field::Empty))]
pub fn scan_object<R: Read, W: Write>(
    key: &str,
    body: R,
    selector: Selector,
    context: usize,
    out: &mut W,
) -> Result<ObjectReport> {
    let (staged, bytes) = stage(key, body)?;
    let compression = selector.resolve(key);
    tracing::Span::current().record("compression", compression.as_str());

    let decoded = match compression.open(BufReader::new(staged.as_file())) {
        Ok(decoded) => decoded,
        Err(err) => {
            let kind = open_error(key, &err);
            return Err(err).or_raise(|| kind);
        },
    };
    let mut reader = BufReader::new(decoded);
    let mut emitter = Emitter::new(key, context, &mut *out);
    let mut buffer = Vec::new();
    let mut lines = 0;
    loop {
        buffer.clear();
        let read = reader.read_until(b'\n', &mut buffer).or_raise(|| ErrorKind::Read(key.to_string()))?;
        if read == 0 {
            break;
        }
        lines += 1;
        emitter.line(strip_terminator(&buffer)).or_raise(|| ErrorKind::Output)?;
    }
    let report = ObjectReport {
        bytes,
        lines,
        matches: emitter.matches(),
        emitted: emitter.emitted(),
    };
    tracing::debug!(bytes, lines, matches = report.matches, "Scanned object");
    Ok(report)
}

/// Copy the whole body to a fresh temporary file and rewind it.
///
/// The body is dropped (and its connection released) before returning.
fn stage<R: Read>(key: &str, mut body: R) -> Result<(NamedTempFile, u64)> {
    let staging = || ErrorKind::Staging(key.to_string());
    let mut staged = tempfile::Builder::new().prefix(STAGING_PREFIX).tempfile().or_raise(staging)?;
    let bytes = io::copy(&mut body, staged.as_file_mut()).or_raise(staging)?;
    drop(body);
    staged.as_file_mut().rewind().or_raise(staging)?;
    tracing::trace!(path = %staged.path().display(), bytes, "Staged object");
    Ok((staged, bytes))
}

/// Reading the staged copy itself failing is a staging problem; everything
/// else the decoder rejects is a decode problem.
fn open_error(key: &str, cause: &CompressErrorKind) -> ErrorKind {
    match cause {
        CompressErrorKind::Io => ErrorKind::Staging(key.to_string()),
        _ => ErrorKind::Decode(key.to_string()),
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logscan_compress::Compression;
    use rstest::rstest;
    use std::io::Cursor;

    fn scan(key: &str, body: &[u8], context: usize) -> (Result<ObjectReport>, String) {
        let mut out = Vec::new();
        let result = scan_object(key, Cursor::new(body.to_vec()), Selector::BySuffix, context, &mut out);
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    /// Text with `count` numbered lines that don't compress to nothing.
    fn numbered_lines(count: usize) -> String {
        (0..count).map(|i| format!("INFO line {i} checksum {}\n", (i * 7919) % 10007)).collect()
    }

    #[test]
    fn test_plain_object() {
        let (result, out) = scan("jobs/a.log", b"INFO start\nERROR x\nafter1\nafter2\n", 10);
        assert_eq!(out, "key:jobs/a.log\nERROR x\nafter1\nafter2\n");
        let report = result.unwrap();
        assert_eq!(report, ObjectReport {
            bytes: 33,
            lines: 4,
            matches: 1,
            emitted: 3
        });
    }

    #[test]
    fn test_suppressed_line_still_printed_as_context() {
        let body = b"a\nERROR x\nb\nc\nNo log4j2 configuration file found\n";
        let (result, out) = scan("k", body, 10);
        assert_eq!(out, "key:k\nERROR x\nb\nc\nNo log4j2 configuration file found\n");
        assert_eq!(result.unwrap().matches, 1);
    }

    #[test]
    fn test_no_errors_no_output() {
        let (result, out) = scan("quiet.log", numbered_lines(500).as_bytes(), 10);
        assert!(out.is_empty());
        assert_eq!(result.unwrap().lines, 500);
    }

    #[test]
    fn test_spaced_errors_through_gzip() {
        let mut text = String::new();
        for i in 0..5 {
            text.push_str(&format!("ERROR failure {i}\n"));
            text.push_str(&numbered_lines(15));
        }
        let archive = Compression::Gzip.compress(text.as_bytes()).unwrap();
        let (result, out) = scan("jobs/spaced.log.gz", &archive, 10);
        let report = result.unwrap();
        assert_eq!(report.matches, 5);
        assert_eq!(report.emitted, 55);
        assert_eq!(out.lines().filter(|line| *line == "key:jobs/spaced.log.gz").count(), 5);
        assert_eq!(out.lines().count(), 60);
    }

    #[test]
    fn test_gzip_object() {
        let archive = Compression::Gzip.compress(b"a\nERROR Final Counters for job\nERROR real\nb\n").unwrap();
        let (result, out) = scan("jobs/b.log.gz", &archive, 10);
        assert_eq!(out, "key:jobs/b.log.gz\nERROR real\nb\n");
        assert_eq!(result.unwrap().lines, 4);
    }

    #[test]
    fn test_bzip2_object() {
        let archive = Compression::Bzip2.compress(b"ERROR one\n").unwrap();
        let (result, out) = scan("b.log.BZ2", &archive, 0);
        assert_eq!(out, "key:b.log.BZ2\nERROR one\n");
        assert_eq!(result.unwrap().matches, 1);
    }

    #[test]
    fn test_empty_plain_object() {
        let (result, out) = scan("empty.log", b"", 10);
        assert_eq!(result.unwrap(), ObjectReport::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_plain_data_with_gz_suffix() {
        let (result, out) = scan("c.gz", b"ERROR looks like text\n", 10);
        let err = result.unwrap_err();
        assert_eq!(*err, ErrorKind::Decode("c.gz".to_string()));
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_gzip_object() {
        let (result, _) = scan("empty.log.gz", b"", 10);
        assert!(matches!(&*result.unwrap_err(), ErrorKind::Decode(_)));
    }

    #[test]
    fn test_gzip_data_without_suffix_is_scanned_raw() {
        let archive = Compression::Gzip.compress(b"ERROR hidden\n").unwrap();
        let (result, out) = scan("archive.log", &archive, 10);
        assert!(result.is_ok());
        assert!(!out.contains("ERROR hidden"));
    }

    #[test]
    fn test_forced_selector() {
        let archive = Compression::Gzip.compress(b"ERROR hidden\n").unwrap();
        let mut out = Vec::new();
        let selector = Selector::Always(Compression::Gzip);
        scan_object("archive.log", Cursor::new(archive), selector, 10, &mut out).unwrap();
        assert_eq!(out, b"key:archive.log\nERROR hidden\n");
    }

    #[test]
    fn test_truncated_gzip_is_a_read_error() {
        let mut archive = Compression::Gzip.compress(numbered_lines(20_000).as_bytes()).unwrap();
        archive.truncate(archive.len() / 2);
        let (result, _) = scan("cut.log.gz", &archive, 10);
        assert_eq!(*result.unwrap_err(), ErrorKind::Read("cut.log.gz".to_string()));
    }

    #[test]
    fn test_line_terminators() {
        let (result, out) = scan("crlf.log", b"ERROR one\r\ntwo\r\n\r\nthree", 10);
        assert_eq!(out, "key:crlf.log\nERROR one\ntwo\n\nthree\n");
        assert_eq!(result.unwrap().lines, 4);
    }

    #[test]
    fn test_final_line_without_newline() {
        let (_, out) = scan("tail.log", b"INFO a\nERROR last", 10);
        assert_eq!(out, "key:tail.log\nERROR last\n");
    }

    #[test]
    fn test_output_failure() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let err = scan_object("a.log", Cursor::new(b"ERROR x\n".to_vec()), Selector::BySuffix, 10, &mut Closed)
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Output);
    }

    #[test]
    fn test_staging_file_is_removed() {
        let (staged, bytes) = stage("a.log", Cursor::new(b"hello".to_vec())).unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(bytes, 5);
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(STAGING_PREFIX));
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }

    #[rstest]
    #[case(CompressErrorKind::Io, ErrorKind::Staging("a.gz".to_string()))]
    #[case(CompressErrorKind::InvalidData, ErrorKind::Decode("a.gz".to_string()))]
    #[case(CompressErrorKind::MissingHeader(Compression::Gzip), ErrorKind::Decode("a.gz".to_string()))]
    fn test_open_error(#[case] cause: CompressErrorKind, #[case] expected: ErrorKind) {
        assert_eq!(open_error("a.gz", &cause), expected);
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(b"a\r\n"), b"a");
        assert_eq!(strip_terminator(b"a\n"), b"a");
        assert_eq!(strip_terminator(b"a"), b"a");
        assert_eq!(strip_terminator(b"a\r"), b"a");
        assert_eq!(strip_terminator(b"\n"), b"");
    }
}
