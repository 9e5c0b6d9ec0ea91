//! DBC parsing: logical-line assembly, two-pass statement dispatch and the
//! public [`Parser`] entry points.
//!
//! Pass 1 ingests structural declarations (`VERSION`, `NS_`, `BS_:`,
//! `BU_:`, `VAL_TABLE_`, `BO_`/`SG_`, `EV_`, `SGTYPE_` definitions,
//! `BA_DEF_`), pass 2 the attachments (`CM_`, `BA_`, `VAL_`, ...), so a
//! statement may reference an object declared later in the file. An
//! attachment whose target never appears is reported as a dangling
//! reference and dropped; the network is returned either way.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use log::debug;

use crate::dbc::core;
use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog, Status};
use crate::dbc::types::errors::DbcParseError;
use crate::dbc::types::network::Network;

/// Result of a parse: the network plus everything that went wrong on the
/// way. `status.is_ok()` distinguishes "clean or warnings only" from "lines
/// were lost".
#[derive(Debug)]
pub struct ParseOutcome {
    pub network: Network,
    /// Diagnostics in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Compound status accumulated over all diagnostics.
    pub status: Status,
}

/// Configurable parser carrying the optional progress and diagnostic sinks.
///
/// ```
/// use candb::dbc::parse::Parser;
///
/// let mut seen: usize = 0;
/// let outcome = Parser::new()
///     .on_diagnostic(|_d| seen += 1)
///     .parse_str("VERSION \"1.0\"\n\nBU_: ECM\n");
/// assert!(outcome.status.is_ok());
/// ```
pub struct Parser<'s> {
    progress: Option<Box<dyn FnMut(u64, u64) + 's>>,
    sink: Option<Box<dyn FnMut(&Diagnostic) + 's>>,
    progress_stride: usize,
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Parser {
            progress: None,
            sink: None,
            progress_stride: 64,
        }
    }
}

impl<'s> Parser<'s> {
    pub fn new() -> Self {
        Parser::default()
    }

    /// Registers a progress sink receiving `(bytes_consumed, bytes_total)`
    /// at coarse checkpoints. Observable side effect only.
    pub fn on_progress(mut self, f: impl FnMut(u64, u64) + 's) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Registers a diagnostic sink invoked inline for each diagnostic, in
    /// emission order.
    pub fn on_diagnostic(mut self, f: impl FnMut(&Diagnostic) + 's) -> Self {
        self.sink = Some(Box::new(f));
        self
    }

    /// Number of logical lines between progress checkpoints.
    pub fn progress_stride(mut self, lines: usize) -> Self {
        self.progress_stride = lines.max(1);
        self
    }

    /// Parses DBC text that is already valid UTF-8.
    pub fn parse_str(&mut self, text: &str) -> ParseOutcome {
        self.parse_decoded(text, false)
    }

    /// Parses raw DBC bytes. Strict UTF-8 is tried first; anything else is
    /// decoded as WINDOWS-1252 (the encoding legacy DBC files actually use)
    /// and flagged with an `InvalidEncoding` diagnostic.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> ParseOutcome {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.parse_decoded(text, false),
            Err(_) => {
                let (text, _, _) = WINDOWS_1252.decode(bytes);
                self.parse_decoded(&text, true)
            }
        }
    }

    /// Reads the whole stream and parses it.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<ParseOutcome, DbcParseError> {
        let mut bytes: Vec<u8> = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| DbcParseError::Stream { source })?;
        Ok(self.parse_bytes(&bytes))
    }

    /// Parses a DBC file from disk.
    ///
    /// # Errors
    /// Returns an error when the path does not end in `.dbc`, the file
    /// cannot be opened, or reading fails. Grammar problems never land
    /// here; they are reported through the returned
    /// [`ParseOutcome::diagnostics`].
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ParseOutcome, DbcParseError> {
        let path_text: String = path.as_ref().display().to_string();

        // check if provided file has .dbc format
        if !path_text.ends_with(".dbc") {
            return Err(DbcParseError::InvalidExtension { path: path_text });
        }

        let file: File = File::open(&path).map_err(|source| DbcParseError::OpenFile {
            path: path_text.clone(),
            source,
        })?;
        let mut reader: BufReader<File> = BufReader::new(file);

        let mut bytes: Vec<u8> = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| DbcParseError::Read {
                path: path_text,
                source,
            })?;

        Ok(self.parse_bytes(&bytes))
    }

    fn parse_decoded(&mut self, text: &str, encoding_fallback: bool) -> ParseOutcome {
        let mut log: DiagnosticLog<'s> = DiagnosticLog::new(self.sink.take());
        if encoding_fallback {
            log.push(
                DiagnosticKind::InvalidEncoding,
                "input is not valid UTF-8; decoded as WINDOWS-1252".to_string(),
            );
        }

        let network: Network = self.run(text, &mut log);

        let (diagnostics, status, sink) = log.finish();
        self.sink = sink;
        ParseOutcome {
            network,
            diagnostics,
            status,
        }
    }

    fn run(&mut self, text: &str, log: &mut DiagnosticLog) -> Network {
        let total: u64 = text.len() as u64;
        let lines: Vec<LogicalLine> = logical_lines(text);
        debug!("parsing {} logical lines ({} bytes)", lines.len(), total);

        let mut net: Network = Network::default();

        // ---- pass 1: structural declarations ----
        let mut current_msg: Option<u32> = None;
        let mut in_ns: bool = false;
        for (index, line) in lines.iter().enumerate() {
            if index % self.progress_stride == 0
                && let Some(progress) = self.progress.as_mut()
            {
                progress(line.end_offset, total);
            }
            log.set_line(line.number);

            let trimmed: &str = line.text.trim_start();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                in_ns = false;
                continue;
            }
            if in_ns {
                if let Some(symbol) = ns_continuation(&line.text) {
                    core::ns_::append_symbol(&mut net, symbol);
                    continue;
                }
                in_ns = false;
            }

            let first: &str = trimmed.split_ascii_whitespace().next().unwrap_or("");
            match first {
                "VERSION" => core::version::decode(&mut net, log, trimmed),
                "NS_" | "NS_:" => {
                    core::ns_::decode(&mut net, log, trimmed);
                    in_ns = true;
                }
                "BS_:" => core::bs_::decode(&mut net, log, trimmed),
                "BU_:" | "BU_" => core::bu_::decode(&mut net, log, trimmed),
                "VAL_TABLE_" => core::val_table_::decode(&mut net, log, trimmed),
                "BO_" => current_msg = core::bo_::decode(&mut net, log, trimmed),
                "SG_" => core::sg_::decode(&mut net, log, trimmed, current_msg),
                "EV_" => core::ev_::decode(&mut net, log, trimmed),
                "SGTYPE_" if !core::sgtype_::is_reference(trimmed) => {
                    core::sgtype_::decode_definition(&mut net, log, trimmed);
                }
                "BA_DEF_" | "BA_DEF_REL_" => {
                    core::attributes::ba_def_::decode(&mut net, log, trimmed);
                }
                // Attachments and unknown tags wait for pass 2.
                _ => {}
            }
        }

        // ---- pass 2: attachments ----
        let mut in_ns = false;
        for line in &lines {
            log.set_line(line.number);

            let trimmed: &str = line.text.trim_start();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                in_ns = false;
                continue;
            }
            if in_ns {
                if ns_continuation(&line.text).is_some() {
                    continue;
                }
                in_ns = false;
            }

            let first: &str = trimmed.split_ascii_whitespace().next().unwrap_or("");
            match first {
                "NS_" | "NS_:" => in_ns = true,
                "BO_TX_BU_" => core::bo_tx_bu_::decode(&mut net, log, trimmed),
                "ENVVAR_DATA_" => core::envvar_data_::decode(&mut net, log, trimmed),
                "SGTYPE_" if core::sgtype_::is_reference(trimmed) => {
                    core::sgtype_::decode_reference(&mut net, log, trimmed);
                }
                "SGTYPE_" => {} // definition, handled in pass 1
                "CM_" => decode_comment(&mut net, log, trimmed),
                "BA_DEF_DEF_" | "BA_DEF_DEF_REL_" => {
                    core::attributes::ba_def_def_::decode(&mut net, log, trimmed);
                }
                "BA_" => core::attributes::ba_::decode(&mut net, log, trimmed),
                "BA_REL_" => core::attributes::ba_rel_::decode(&mut net, log, trimmed),
                "VAL_" => core::val_::decode(&mut net, log, trimmed),
                "SIG_VALTYPE_" => core::sig_valtype_::decode(&mut net, log, trimmed),
                "SIG_GROUP_" => core::sig_group_::decode(&mut net, log, trimmed),
                "SIG_MUL_VAL_" => core::sig_mul_val_::decode(&mut net, log, trimmed),
                tag if is_structural_tag(tag) => {} // handled in pass 1
                tag => log.push(
                    DiagnosticKind::ParseError,
                    format!("unrecognized statement '{tag}'"),
                ),
            }
        }

        if let Some(progress) = self.progress.as_mut() {
            progress(total, total);
        }
        net
    }
}

/// Parses a DBC file and returns a populated [`Network`] plus diagnostics.
///
/// This function reads a DBC file from disk, parses its content line by
/// line in two passes, and fills the [`Network`] structure with all parsed
/// information: version, new symbols, bit timing, nodes, value tables,
/// messages and their signals, environment variables, signal types,
/// comments, attributes and attribute relations.
///
/// The parsing is tolerant: malformed lines and attachments to missing
/// objects are reported in [`ParseOutcome::diagnostics`] and skipped;
/// parsing stops only at the end of the file.
///
/// # Errors
/// Returns an `Err` only for I/O-level problems:
/// - The path does not end in `.dbc`.
/// - The file cannot be opened.
/// - Reading fails.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ParseOutcome, DbcParseError> {
    Parser::new().parse_file(path)
}

/// Parses DBC text with the default parser configuration.
pub fn from_str(text: &str) -> ParseOutcome {
    Parser::new().parse_str(text)
}

// One statement, possibly assembled from several physical lines when a
// quoted string runs past the line end.
struct LogicalLine {
    // 1-based number of the first physical line.
    number: usize,
    text: String,
    // Byte offset just past the statement in the decoded text.
    end_offset: u64,
}

fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut lines: Vec<LogicalLine> = Vec::new();
    let mut pending: Option<LogicalLine> = None;
    let mut offset: usize = 0;
    let mut number: usize = 0;

    for raw in text.split('\n') {
        number += 1;
        let end_offset: u64 = (offset + raw.len() + 1).min(text.len()) as u64;
        offset += raw.len() + 1;
        let physical: &str = raw.strip_suffix('\r').unwrap_or(raw);

        let candidate: LogicalLine = match pending.take() {
            Some(mut acc) => {
                // Keep the embedded newline; it is part of the quoted string.
                acc.text.push('\n');
                acc.text.push_str(physical);
                acc.end_offset = end_offset;
                acc
            }
            None => LogicalLine {
                number,
                text: physical.to_string(),
                end_offset,
            },
        };

        if strings::has_balanced_quotes(&candidate.text) {
            lines.push(candidate);
        } else {
            pending = Some(candidate);
        }
    }
    if let Some(acc) = pending {
        // Unclosed quote at end of file; the decoder will flag it.
        lines.push(acc);
    }
    lines
}

// An indented single token inside an NS_ block.
fn ns_continuation(raw: &str) -> Option<&str> {
    if !raw.starts_with([' ', '\t']) {
        return None;
    }
    let mut tokens = raw.split_ascii_whitespace();
    let symbol: &str = tokens.next()?;
    tokens.next().is_none().then_some(symbol)
}

fn is_structural_tag(tag: &str) -> bool {
    matches!(
        tag,
        "VERSION"
            | "BS_:"
            | "BU_:"
            | "BU_"
            | "VAL_TABLE_"
            | "BO_"
            | "SG_"
            | "EV_"
            | "BA_DEF_"
            | "BA_DEF_REL_"
    )
}

// CM_ statements come in five object-kinded forms selected by the token
// after the tag.
fn decode_comment(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    let second: &str = line.split_ascii_whitespace().nth(1).unwrap_or("");
    match second {
        "BU_" => core::cm_bu_::decode(net, log, line),
        "BO_" => core::cm_bo_::decode(net, log, line),
        "SG_" => core::cm_sg_::decode(net, log, line),
        "EV_" => core::cm_ev_::decode(net, log, line),
        _ if second.starts_with('"') => core::cm_::decode(net, log, line),
        other => log.push(
            DiagnosticKind::ParseError,
            format!("unrecognized comment form 'CM_ {other}'"),
        ),
    }
}
