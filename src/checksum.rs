//! Streaming checksum calculation.
//!
//! Checksums are stored as `ALGO:HEXDIGEST` strings with an uppercase
//! algorithm name and uppercase hex digits, e.g. `MD5:D41D8CD98F00B204E9800998ECF8427E`.
//! The algorithm part selects the digest when a stored checksum is verified.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// Default chunk size used when streaming file contents into a digest.
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// MD5 (128 bit)
    Md5,
    /// SHA-1 (160 bit)
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl Algorithm {
    /// Every supported algorithm in presentation order.
    pub const ALL: [Self; 6] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Canonical uppercase name, as used in stored checksums.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    /// Looks up an algorithm by name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algo| algo.name().eq_ignore_ascii_case(name))
    }

    /// Looks up the algorithm named by a bare name or a full
    /// `algo:value` checksum string.
    #[must_use]
    pub fn from_checksum(checksum: &str) -> Option<Self> {
        let name = checksum
            .split_once(':')
            .map_or(checksum, |(name, _)| name);
        Self::from_name(name)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `name` is a supported algorithm (case-insensitive).
#[must_use]
pub fn exists(name: &str) -> bool {
    Algorithm::from_name(name).is_some()
}

/// Names of every supported algorithm.
#[must_use]
pub fn algorithms() -> Vec<&'static str> {
    Algorithm::ALL.iter().map(|algo| algo.name()).collect()
}

/// Running digest state.
enum State {
    Md5(Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

/// Incremental checksum calculator producing `ALGO:HEXDIGEST` strings.
pub struct ChecksumCalculator {
    /// Selected algorithm
    algorithm: Algorithm,
    /// Digest state fed by [`ChecksumCalculator::update`]
    state: State,
}

impl ChecksumCalculator {
    /// Creates a calculator from a bare algorithm name or a full
    /// `algo:value` checksum string.
    ///
    /// Returns `None` when the algorithm is not recognised.
    #[must_use]
    pub fn new(spec: &str) -> Option<Self> {
        Algorithm::from_checksum(spec).map(Self::with_algorithm)
    }

    /// Creates a calculator for a known algorithm.
    #[must_use]
    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        let state = match algorithm {
            Algorithm::Md5 => State::Md5(Md5::new()),
            Algorithm::Sha1 => State::Sha1(Sha1::new()),
            Algorithm::Sha224 => State::Sha224(Sha224::new()),
            Algorithm::Sha256 => State::Sha256(Sha256::new()),
            Algorithm::Sha384 => State::Sha384(Sha384::new()),
            Algorithm::Sha512 => State::Sha512(Sha512::new()),
        };
        Self { algorithm, state }
    }

    /// Selected algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Feeds more data into the digest.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Md5(h) => h.update(data),
            State::Sha1(h) => h.update(data),
            State::Sha224(h) => h.update(data),
            State::Sha256(h) => h.update(data),
            State::Sha384(h) => h.update(data),
            State::Sha512(h) => h.update(data),
        }
    }

    /// Finalises the digest into `ALGO:HEXDIGEST`.
    #[must_use]
    pub fn finish(self) -> String {
        let digest = match self.state {
            State::Md5(h) => hex::encode_upper(h.finalize()),
            State::Sha1(h) => hex::encode_upper(h.finalize()),
            State::Sha224(h) => hex::encode_upper(h.finalize()),
            State::Sha256(h) => hex::encode_upper(h.finalize()),
            State::Sha384(h) => hex::encode_upper(h.finalize()),
            State::Sha512(h) => hex::encode_upper(h.finalize()),
        };
        format!("{}:{}", self.algorithm.name(), digest)
    }
}

/// Streams `reader` through a digest of `algorithm`, one `buffer` at a
/// time.
///
/// `poll` runs before every chunk, including the final empty read, and
/// its error stops the stream as the outer `Err`. Read failures come back
/// as the inner `io::Result`.
///
/// # Errors
///
/// Returns the first error raised by `poll`.
pub fn checksum_reader<R, E, P>(
    mut reader: R,
    algorithm: Algorithm,
    buffer: &mut [u8],
    mut poll: P,
) -> Result<io::Result<String>, E>
where
    R: Read,
    P: FnMut() -> Result<(), E>,
{
    let mut calculator = ChecksumCalculator::with_algorithm(algorithm);

    loop {
        poll()?;
        let bytes_read = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => return Ok(Err(err)),
        };
        calculator.update(&buffer[..bytes_read]);
    }

    Ok(Ok(calculator.finish()))
}

/// Compares two checksum strings ignoring case.
#[must_use]
pub fn same_checksum(lhs: &str, rhs: &str) -> bool {
    lhs.eq_ignore_ascii_case(rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::convert::Infallible;

    #[test]
    fn test_known_digests() {
        let mut md5 = ChecksumCalculator::new("md5").expect("md5 is supported");
        md5.update(b"abc");
        assert_eq!(md5.finish(), "MD5:900150983CD24FB0D6963F7D28E17F72");

        let mut sha1 = ChecksumCalculator::new("SHA1").expect("sha1 is supported");
        sha1.update(b"abc");
        assert_eq!(sha1.finish(), "SHA1:A9993E364706816ABA3E25717850C26C9CD0D89D");

        let mut sha256 = ChecksumCalculator::new("sha256").expect("sha256 is supported");
        sha256.update(b"abc");
        assert_eq!(
            sha256.finish(),
            "SHA256:BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn test_incremental_updates_match_single_update() {
        let mut whole = ChecksumCalculator::with_algorithm(Algorithm::Sha512);
        whole.update(b"hello world");

        let mut pieces = ChecksumCalculator::with_algorithm(Algorithm::Sha512);
        pieces.update(b"hello");
        pieces.update(b" ");
        pieces.update(b"world");

        assert_eq!(whole.finish(), pieces.finish());
    }

    #[test]
    fn test_algorithm_lookup() {
        assert!(exists("sha224"));
        assert!(exists("Sha384"));
        assert!(!exists("crc32"));
        assert!(!exists(""));
        assert_eq!(
            Algorithm::from_checksum("sha256:ABCDEF"),
            Some(Algorithm::Sha256)
        );
        assert_eq!(Algorithm::from_checksum("md5"), Some(Algorithm::Md5));
        assert!(ChecksumCalculator::new("whirlpool:00").is_none());
        assert_eq!(
            algorithms(),
            vec!["MD5", "SHA1", "SHA224", "SHA256", "SHA384", "SHA512"]
        );
    }

    #[test]
    fn test_checksum_reader_small_buffer() -> Result<()> {
        let data = vec![7u8; 10_000];
        let mut polls = 0;

        let chunked = checksum_reader(&data[..], Algorithm::Md5, &mut [0u8; 7], || {
            polls += 1;
            Ok::<(), Infallible>(())
        })
        .unwrap_or_else(|never| match never {})?;
        let whole = checksum_reader(
            &data[..],
            Algorithm::Md5,
            &mut vec![0u8; DEFAULT_BUFFER_SIZE],
            || Ok::<(), Infallible>(()),
        )
        .unwrap_or_else(|never| match never {})?;

        assert_eq!(chunked, whole);
        assert!(chunked.starts_with("MD5:"));
        assert_eq!(chunked.len(), "MD5:".len() + 32);
        assert_eq!(polls, 10_000 / 7 + 2);
        Ok(())
    }

    #[test]
    fn test_checksum_reader_stops_when_poll_fails() {
        let mut polls = 0;
        let outcome = checksum_reader(&b"abcdef"[..], Algorithm::Sha1, &mut [0u8; 2], || {
            polls += 1;
            if polls > 2 { Err("stop") } else { Ok(()) }
        });
        assert_eq!(outcome.map(|r| r.is_ok()), Err("stop"));
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_same_checksum_ignores_case() {
        assert!(same_checksum("MD5:ABCD", "md5:abcd"));
        assert!(!same_checksum("MD5:ABCD", "MD5:ABCE"));
    }
}
