//! Status codes and diagnostics reported by parse/save/codec operations.
//!
//! Every recoverable problem becomes a [`Diagnostic`] carrying its
//! [`DiagnosticKind`], the 1-based source line (when known) and a
//! human-readable detail. The compound outcome of an operation is a
//! [`Status`]: a signed 32-bit bitfield where non-negative means success,
//! bit 15 flags warnings and the sign bit flags errors, so statuses from
//! independent steps compose with `|`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compound outcome of an operation, packed in a signed 32-bit bitfield.
///
/// `status.0 >= 0` means the operation succeeded (possibly with warnings).
/// Each kind owns one low bit, so a `Status` accumulated over a whole parse
/// records every kind that occurred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status(pub i32);

impl Status {
    const WARN_FLAG: i32 = 0x8000;
    const ERR_FLAG: i32 = i32::MIN;

    pub const OK: Status = Status(0);
    pub const WARN_DANGLING_REFERENCE: Status = Status(Self::WARN_FLAG | 0x0001);
    pub const WARN_UNKNOWN_ATTRIBUTE: Status = Status(Self::WARN_FLAG | 0x0002);
    pub const WARN_BIT_OVERFLOW: Status = Status(Self::WARN_FLAG | 0x0004);
    pub const WARN_DUPLICATE_NAME: Status = Status(Self::WARN_FLAG | 0x0008);
    pub const ERR_IO_FAILURE: Status = Status(Self::ERR_FLAG | 0x0010);
    pub const ERR_PARSE: Status = Status(Self::ERR_FLAG | 0x0020);
    pub const ERR_INVALID_ENCODING: Status = Status(Self::ERR_FLAG | 0x0040);

    /// `true` when no error bit is set. Warnings still count as success.
    pub fn is_ok(self) -> bool {
        self.0 >= 0
    }

    pub fn is_err(self) -> bool {
        self.0 < 0
    }

    pub fn has_warnings(self) -> bool {
        self.0 & Self::WARN_FLAG != 0
    }

    /// `true` when every bit of `other` is set in `self`.
    pub fn contains(self, other: Status) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Status) -> Status {
        Status(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.0 |= rhs.0;
    }
}

/// Kind of a reported [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An attachment (`CM_`, `BA_`, `VAL_`, ...) named an object that does
    /// not exist; the attachment was dropped.
    DanglingReference,
    /// `BA_` used an attribute that has no `BA_DEF_`; the value was dropped.
    UnknownAttribute,
    /// A signal layout does not fit its message payload.
    BitOverflow,
    /// A declaration reused a name already taken in its scope; the first
    /// declaration wins.
    DuplicateName,
    IoFailure,
    /// A line did not match the grammar and was skipped.
    ParseError,
    /// The input was not valid UTF-8 and was decoded as WINDOWS-1252.
    InvalidEncoding,
}

impl DiagnosticKind {
    pub fn status(self) -> Status {
        match self {
            DiagnosticKind::DanglingReference => Status::WARN_DANGLING_REFERENCE,
            DiagnosticKind::UnknownAttribute => Status::WARN_UNKNOWN_ATTRIBUTE,
            DiagnosticKind::BitOverflow => Status::WARN_BIT_OVERFLOW,
            DiagnosticKind::DuplicateName => Status::WARN_DUPLICATE_NAME,
            DiagnosticKind::IoFailure => Status::ERR_IO_FAILURE,
            DiagnosticKind::ParseError => Status::ERR_PARSE,
            DiagnosticKind::InvalidEncoding => Status::ERR_INVALID_ENCODING,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &str = match self {
            DiagnosticKind::DanglingReference => "dangling reference",
            DiagnosticKind::UnknownAttribute => "unknown attribute",
            DiagnosticKind::BitOverflow => "bit overflow",
            DiagnosticKind::DuplicateName => "duplicate name",
            DiagnosticKind::IoFailure => "I/O failure",
            DiagnosticKind::ParseError => "parse error",
            DiagnosticKind::InvalidEncoding => "invalid encoding",
        };
        f.write_str(label)
    }
}

/// One reported problem, in emission order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based source line, when the problem is tied to one.
    pub line: Option<usize>,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}: {}", line, self.kind, self.detail),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

/// Collector threaded through the statement decoders.
///
/// Stamps each diagnostic with the current line, forwards it to the
/// registered sink (inline, in emission order) and accumulates the compound
/// [`Status`].
pub(crate) struct DiagnosticLog<'a> {
    items: Vec<Diagnostic>,
    status: Status,
    line: Option<usize>,
    sink: Option<Box<dyn FnMut(&Diagnostic) + 'a>>,
}

impl<'a> DiagnosticLog<'a> {
    pub(crate) fn new(sink: Option<Box<dyn FnMut(&Diagnostic) + 'a>>) -> Self {
        DiagnosticLog {
            items: Vec::new(),
            status: Status::OK,
            line: None,
            sink,
        }
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        self.line = Some(line);
    }

    pub(crate) fn push(&mut self, kind: DiagnosticKind, detail: String) {
        let diagnostic = Diagnostic {
            kind,
            line: self.line,
            detail,
        };
        if kind.status().is_err() {
            log::warn!("{}", diagnostic);
        } else {
            log::debug!("{}", diagnostic);
        }
        if let Some(sink) = self.sink.as_mut() {
            sink(&diagnostic);
        }
        self.status |= kind.status();
        self.items.push(diagnostic);
    }

    pub(crate) fn status(&self) -> Status {
        self.status
    }

    // Hands the sink back so a reusable parser keeps it across calls.
    #[allow(clippy::type_complexity)]
    pub(crate) fn finish(
        self,
    ) -> (
        Vec<Diagnostic>,
        Status,
        Option<Box<dyn FnMut(&Diagnostic) + 'a>>,
    ) {
        (self.items, self.status, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_flags() {
        assert!(Status::OK.is_ok());
        assert!(!Status::OK.has_warnings());

        let warned: Status = Status::OK | Status::WARN_BIT_OVERFLOW;
        assert!(warned.is_ok());
        assert!(warned.has_warnings());
        assert!(warned.contains(Status::WARN_BIT_OVERFLOW));

        let failed: Status = warned | Status::ERR_PARSE;
        assert!(failed.is_err());
        assert!(failed.has_warnings());
        assert!(failed.contains(Status::WARN_BIT_OVERFLOW));
        assert!(failed.contains(Status::ERR_PARSE));
    }

    #[test]
    fn test_log_collects_in_order() {
        let mut seen: Vec<DiagnosticKind> = Vec::new();

        let mut log: DiagnosticLog = DiagnosticLog::new(Some(Box::new(|d: &Diagnostic| {
            seen.push(d.kind);
        })));
        log.set_line(3);
        log.push(DiagnosticKind::DuplicateName, "node 'A'".to_string());
        log.set_line(7);
        log.push(DiagnosticKind::ParseError, "bad SG_ line".to_string());

        let (items, status, _) = log.finish();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].line, Some(3));
        assert_eq!(items[1].line, Some(7));
        assert!(status.is_err());
        assert!(status.has_warnings());
        assert_eq!(
            seen,
            vec![DiagnosticKind::DuplicateName, DiagnosticKind::ParseError]
        );
    }
}
