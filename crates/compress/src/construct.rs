use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::str::FromStr;

const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

impl FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "plain" => Ok(Compression::None),
            "bz2" | "bzip2" => Ok(Compression::Bzip2),
            "gz" | "gzip" => Ok(Compression::Gzip),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}
impl Compression {
    /// Detect compression from the suffix of an object key.
    ///
    /// Only the final `/`-separated segment is inspected, and the suffix has
    /// to follow a non-empty name: `logs/.gz` is a dotfile, not a gzip file.
    /// Matching is case-insensitive.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        let name = key.rsplit('/').next().unwrap_or(key);
        [Compression::Bzip2, Compression::Gzip]
            .into_iter()
            .find(|format| {
                let suffix = format.extension();
                name.len() > suffix.len()
                    && name.get(name.len() - suffix.len()..).is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
            })
            .unwrap_or_default()
    }

    /// Detect compression format from magic bytes.
    ///
    /// Returns `None` variant if no magic bytes match or if the input
    /// is too short to detect any format.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&BZIP2_MAGIC) {
            return Compression::Bzip2;
        }
        if bytes.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        Compression::None
    }

    /// Number of leading bytes needed to recognise this format.
    pub(crate) fn magic_len(&self) -> usize {
        match self {
            Compression::None => 0,
            Compression::Bzip2 => BZIP2_MAGIC.len(),
            Compression::Gzip => GZIP_MAGIC.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case("none", Compression::None)]
    #[case("plain", Compression::None)]
    #[case("bz2", Compression::Bzip2)]
    #[case("BZIP2", Compression::Bzip2)]
    #[case("gz", Compression::Gzip)]
    #[case("gzip", Compression::Gzip)]
    fn test_from_str(#[case] test: &str, #[case] expected: Compression) {
        assert_eq!(test.parse::<Compression>().unwrap(), expected);
    }

    #[rstest]
    #[case("zstd")]
    #[case("definitely not valid")]
    #[case(" ")]
    fn test_from_str_invalid(#[case] test: &str) {
        assert!(test.parse::<Compression>().is_err());
    }

    #[rstest]
    #[case("app.log", Compression::None)]
    #[case("logs/2024/01/app.log", Compression::None)]
    #[case("logs/2024/01/app.log.gz", Compression::Gzip)]
    #[case("app.log.GZ", Compression::Gzip)]
    #[case("archive/syslog.bz2", Compression::Bzip2)]
    // Keys carry path prefixes; only the end of the key matters.
    #[case(".gz/app.log", Compression::None)]
    #[case("gz/app.log", Compression::None)]
    #[case("logs.gz/app.log", Compression::None)]
    // A dotfile has no suffix.
    #[case(".gz", Compression::None)]
    #[case("logs/.gz", Compression::None)]
    #[case("app.gzip", Compression::None)]
    #[case("logs/", Compression::None)]
    #[case("", Compression::None)]
    fn test_from_key(#[case] key: &str, #[case] expected: Compression) {
        assert_eq!(Compression::from_key(key), expected);
    }

    #[rstest]
    #[case(b"2024-01-01 INFO started", Compression::None)]
    #[case(b"", Compression::None)]
    #[case(&[0x1F], Compression::None)]
    #[case(&[0x42, 0x5A, 0x68, 0x39], Compression::Bzip2)]
    #[case(&[0x1F, 0x8B, 0x08, 0x00], Compression::Gzip)]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Compression) {
        assert_eq!(Compression::from_magic_bytes(bytes), expected);
    }
}
