use std::error::Error;
use std::fmt::{Display, Formatter};
use std::{fmt, io};

/// The different kinds of errors the library can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
  /// The TOC header's magic/version did not match, or the TOC/cmp files
  /// were too short to honor a resume request.
  HeaderInvalid,
  /// The data being decoded is internally inconsistent (bad block header,
  /// out-of-range exception position, unknown codec id, ...).
  Corruption,
  /// Decoding reached the end of the provided input before producing all
  /// the requested values.
  InsufficientData,
  /// A caller-provided argument was invalid (bad block size, bad codec id,
  /// ...).
  InvalidArgument,
  /// The destination buffer passed to `encode_array`/`decode_array` is too
  /// small to hold the worst-case (or requested) output.
  BufferTooSmall,
  /// Propagated from `Read`/`Write`/`flush`/`sync_all` failures.
  Io(io::ErrorKind),
}

/// The error type used in results for all `pfordelta` functionality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PfdError {
  pub kind: ErrorKind,
  pub message: String,
}

impl PfdError {
  pub(crate) fn new<S: AsRef<str>>(kind: ErrorKind, message: S) -> Self {
    PfdError {
      kind,
      message: message.as_ref().to_string(),
    }
  }

  pub(crate) fn header_invalid<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::HeaderInvalid, message)
  }

  pub(crate) fn corruption<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::Corruption, message)
  }

  pub(crate) fn insufficient_data<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::InsufficientData, message)
  }

  pub(crate) fn invalid_argument<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::InvalidArgument, message)
  }

  pub(crate) fn buffer_too_small<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::BufferTooSmall, message)
  }
}

impl Display for PfdError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "pfordelta {:?} error: {}", self.kind, &self.message)
  }
}

impl From<io::Error> for PfdError {
  fn from(err: io::Error) -> Self {
    PfdError {
      kind: ErrorKind::Io(err.kind()),
      message: format!("{}", err),
    }
  }
}

impl Error for PfdError {}

pub type PfdResult<T> = Result<T, PfdError>;
