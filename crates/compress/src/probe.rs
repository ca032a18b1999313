//! Eager decoder initialisation.
//!
//! Thin wrapper around standard library I/O primitives ([`Read::take`],
//! [`Cursor`], [`Chain`]) so that bytes read while checking a stream can be
//! replayed to whoever consumes it next.

use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Chain, Cursor, Read};
use tracing::instrument;

/// Decoded bytes needed to force a decoder through its header.
const DECODE_PROBE_SIZE: usize = 1;

/// A [`Read`]er that can look ahead without losing what it read.
///
/// Bytes pulled in by [`probe`](Self::probe) are replayed in front of the
/// remaining stream by [`into_reader`](Self::into_reader).
pub(crate) struct ProbedReader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: Read> ProbedReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, buffer: Vec::new() }
    }

    /// Read until at least `limit` bytes are buffered (or the stream ends)
    /// and return at most `limit` of them.
    ///
    /// Successive calls do not accumulate: probing 4 bytes then 2 bytes
    /// reads 4 bytes in total and returns the first 2 the second time.
    ///
    /// Failures the decoder reports about the data itself become
    /// [`InvalidData`](ErrorKind::InvalidData); anything else the underlying
    /// stream fails with is [`Io`](ErrorKind::Io).
    pub(crate) fn probe(&mut self, limit: usize) -> Result<&[u8]> {
        if self.buffer.len() < limit {
            let needed = (limit - self.buffer.len()) as u64;
            if let Err(err) = (&mut self.inner).take(needed).read_to_end(&mut self.buffer) {
                let kind = ErrorKind::from_read_error(&err);
                return Err::<&[u8], _>(err).or_raise(|| kind);
            }
        }
        Ok(&self.buffer[..self.buffer.len().min(limit)])
    }

    /// Replay the probed bytes, then stream the rest of the inner reader.
    pub(crate) fn into_reader(self) -> Chain<Cursor<Vec<u8>>, R> {
        Cursor::new(self.buffer).chain(self.inner)
    }
}

impl Compression {
    /// Open a decoded view of `reader`, failing immediately if the data is
    /// not actually in this format.
    ///
    /// Two checks happen before this returns:
    ///
    /// 1. the raw stream must start with the format's magic bytes (an empty
    ///    stream fails this for every compressed format), and
    /// 2. the decoder must produce its first byte, which makes it parse and
    ///    validate the full header.
    ///
    /// [`None`](Compression::None) skips both and hands back the raw stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::{Cursor, Read};
    /// use logscan_compress::Compression;
    ///
    /// let archive = Compression::Gzip.compress(b"ERROR disk full\n").unwrap();
    /// let mut lines = String::new();
    /// Compression::Gzip.open(Cursor::new(archive)).unwrap().read_to_string(&mut lines).unwrap();
    /// assert_eq!(lines, "ERROR disk full\n");
    ///
    /// assert!(Compression::Gzip.open(Cursor::new(b"plain text".to_vec())).is_err());
    /// ```
    #[instrument(skip(reader), fields(format = %self))]
    pub fn open<'a, R: Read + 'a>(&self, reader: R) -> Result<Chain<Cursor<Vec<u8>>, Box<dyn Read + 'a>>> {
        if *self == Compression::None {
            return Ok(ProbedReader::new(self.wrap_reader(reader)).into_reader());
        }
        let mut raw = ProbedReader::new(reader);
        let head = raw.probe(self.magic_len())?;
        if !self.check_magic_bytes(head) {
            tracing::debug!(head = ?head, "Magic bytes do not match selected format");
            exn::bail!(ErrorKind::MissingHeader(*self));
        }
        let mut decoded = ProbedReader::new(self.wrap_reader(raw.into_reader()));
        decoded.probe(DECODE_PROBE_SIZE)?;
        Ok(decoded.into_reader())
    }
}
