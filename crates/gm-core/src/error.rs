use core::fmt;
use std::io;
use std::path::PathBuf;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Allocation,
    Io,
    Format,
}

#[derive(Debug)]
pub enum Error {
    Allocation { width: usize, height: usize },
    SizeMismatch { expected: usize, actual: usize },
    Open { path: PathBuf, source: io::Error },
    InvalidFormat,
    InvalidWidth,
    InvalidHeight,
    InvalidMaxval,
    WhitespaceExpected,
    ReadPixels { expected: usize, actual: usize },
    Read(io::Error),
    WriteHeader(io::Error),
    WritePixels(io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::Open { .. }
            | Self::ReadPixels { .. }
            | Self::Read(_)
            | Self::WriteHeader(_)
            | Self::WritePixels(_) => ErrorKind::Io,
            Self::SizeMismatch { .. }
            | Self::InvalidFormat
            | Self::InvalidWidth
            | Self::InvalidHeight
            | Self::InvalidMaxval
            | Self::WhitespaceExpected => ErrorKind::Format,
        }
    }

    /// Platform error code captured when the failure happened, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_source().and_then(io::Error::raw_os_error)
    }

    fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read(e) | Self::WriteHeader(e) | Self::WritePixels(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { width, height } => {
                write!(f, "Allocation failed for {width}x{height} image")
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::Open { path, source } => {
                write!(f, "Open failed: {}: {source}", path.display())
            }
            Self::InvalidFormat => write!(f, "Invalid file format"),
            Self::InvalidWidth => write!(f, "Invalid width"),
            Self::InvalidHeight => write!(f, "Invalid height"),
            Self::InvalidMaxval => write!(f, "Invalid maxval"),
            Self::WhitespaceExpected => write!(f, "Whitespace expected"),
            Self::ReadPixels { expected, actual } => {
                write!(f, "Reading pixels: expected {expected}, got {actual}")
            }
            Self::Read(e) => write!(f, "Reading file failed: {e}"),
            Self::WriteHeader(e) => write!(f, "Writing header failed: {e}"),
            Self::WritePixels(e) => write!(f, "Writing pixels failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.io_source()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{Error, ErrorKind};

    #[test]
    fn open_failure_keeps_os_code_and_message() {
        let err = Error::Open {
            path: "missing.pgm".into(),
            source: io::Error::from_raw_os_error(2),
        };

        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.raw_os_error(), Some(2));
        assert!(err.to_string().starts_with("Open failed: missing.pgm"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn header_errors_are_format_kind_without_os_code() {
        for err in [
            Error::InvalidFormat,
            Error::InvalidWidth,
            Error::InvalidHeight,
            Error::InvalidMaxval,
            Error::WhitespaceExpected,
        ] {
            assert_eq!(err.kind(), ErrorKind::Format);
            assert_eq!(err.raw_os_error(), None);
        }
        assert_eq!(Error::InvalidMaxval.to_string(), "Invalid maxval");
    }
}
