// pylex - an incremental, versioned lexer for Python source code.
// Copyright (C) 2025 The pylex authors.
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

//! Dumping a lexed [`TokenList`](crate::list::TokenList) to text and
//! reconstructing it without rescanning.
//!
//! The format is line oriented, one record per line:
//!
//! ```text
//! /home/me/file1.py
//! 0;def first_line():
//!  indent=0
//!  bracket=0
//!  brace=0
//!  paren=0
//!  continue=0
//!  param=0
//!  blockstate=1
//!         0;3;KeywordDef
//!         4;14;IdentifierFunction
//!         14;15;DelimiterOpenParen
//!         15;16;DelimiterCloseParen
//!         16;17;DelimiterColon
//!         17;18;DelimiterNewLine
//! ```
//!
//! The first record is the file path.  A record starting with a space is a
//! line property, one starting with a tab (rendered as eight columns above)
//! is a token as `start;end;kind`.  Any other record opens a new line:
//! `lineNr;text`.  Scan messages are dumped after the tokens of their line
//! as ` scaninfo=severity;tokenIndex;message`, with embedded newlines
//! escaped as `\x1b` so a message never breaks the record structure.

use std::fs;
use std::io;
use std::path::Path;

use itertools::Itertools;
use thiserror::Error;

use crate::lexer::Lexer;
use crate::list::{LineId, TokenLine};
use crate::scan_info::Severity;
use crate::token::TokenKind;

/// Why a dump could not be parsed back.  `record` is the 1-based record
/// number within the dump.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("record {record}: {reason}")]
    Malformed { record: usize, reason: String },
}

impl PersistError {
    fn malformed(record: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            record,
            reason: reason.into(),
        }
    }
}

const MSG_NEWLINE_ESCAPE: char = '\x1b';

/// Serializes and deserializes the state of one [`Lexer`].
pub struct LexerPersistent<'a> {
    lexer: &'a mut Lexer,
}

impl<'a> LexerPersistent<'a> {
    pub fn new(lexer: &'a mut Lexer) -> Self {
        Self { lexer }
    }

    pub fn dump_to_string(&self) -> String {
        let list = self.lexer.list();
        let mut dmp = format!("{}\n", self.lexer.file_path().display());

        let mut line = list.first_line();
        while let Some(cur) = line {
            let slot = list.line(cur);
            // newline comes from the line text itself
            dmp += &format!("{};{}", list.line_nr(cur), slot.text());
            dmp += &format!(" indent={}\n", slot.indent());
            dmp += &format!(" bracket={}\n", slot.bracket_cnt());
            dmp += &format!(" brace={}\n", slot.brace_cnt());
            dmp += &format!(" paren={}\n", slot.paren_cnt());
            dmp += &format!(" continue={}\n", u8::from(slot.is_continuation()));
            dmp += &format!(" param={}\n", u8::from(slot.is_param_line()));
            dmp += &format!(" blockstate={}\n", slot.block_state());
            if !slot.unfinished_tokens().is_empty() {
                let idxs = slot.unfinished_tokens().iter().join(";");
                dmp += &format!(" unfinished={idxs}\n");
            }
            for tok in list.line_tokens(cur) {
                let token = list.token(tok);
                dmp += &format!(
                    "\t{};{};{}\n",
                    token.start_pos(),
                    token.end_pos(),
                    token.kind().as_str()
                );
            }
            // scan messages go after the tokens so reconstruction can
            // resolve their token indexes
            if let Some(info) = slot.scan_info() {
                for msg in info.all_messages() {
                    let pos = list
                        .token_pos(cur, msg.token())
                        .map(|pos| pos as i64)
                        .unwrap_or(-1);
                    let escaped = msg.message().split('\n').join(&MSG_NEWLINE_ESCAPE.to_string());
                    dmp += &format!(
                        " scaninfo={};{};{}\n",
                        msg.severity().as_str(),
                        pos,
                        escaped
                    );
                }
            }
            line = slot.next_line();
        }

        // no trailing newline on the last record
        if dmp.ends_with('\n') {
            dmp.pop();
        }
        dmp
    }

    pub fn dump_to_file(&self, path: &Path) -> Result<(), PersistError> {
        fs::write(path, self.dump_to_string())?;
        Ok(())
    }

    /// Rebuilds the token list from a dump.  Returns the number of records
    /// read.  The list is cleared first; on error it is left partially
    /// rebuilt, exactly as far as the dump could be parsed.
    pub fn reconstruct_from_string(&mut self, dmp: &str) -> Result<usize, PersistError> {
        self.lexer.list_mut().clear();

        let mut records = dmp.split('\n');
        let Some(path) = records.next() else {
            return Ok(0);
        };
        self.lexer.set_file_path(path);
        let mut read = 1;
        let mut active = None;

        for record in records {
            read += 1;
            if let Some(tok_record) = record.strip_prefix('\t') {
                let line = active
                    .ok_or_else(|| PersistError::malformed(read, "token record before any line"))?;
                let (start, end, kind) = parse_token_record(read, tok_record)?;
                self.lexer.list_mut().push_back(line, kind, start, end);
            } else if let Some(prop_record) = record.strip_prefix(' ') {
                let line = active.ok_or_else(|| {
                    PersistError::malformed(read, "property record before any line")
                })?;
                self.restore_property(read, line, prop_record)?;
            } else {
                let (nr, text) = record.split_once(';').ok_or_else(|| {
                    PersistError::malformed(read, "line record without a line number")
                })?;
                let nr: usize = nr
                    .parse()
                    .map_err(|_| PersistError::malformed(read, "bad line number"))?;
                let line = self.lexer.list_mut().append_line(TokenLine::new(text));
                if self.lexer.list().line_nr(line) != nr {
                    return Err(PersistError::malformed(read, "line number out of order"));
                }
                active = Some(line);
            }
        }
        Ok(read)
    }

    pub fn reconstruct_from_file(&mut self, path: &Path) -> Result<usize, PersistError> {
        let dmp = fs::read_to_string(path)?;
        self.reconstruct_from_string(&dmp)
    }

    fn restore_property(
        &mut self,
        record: usize,
        line: LineId,
        prop: &str,
    ) -> Result<(), PersistError> {
        let (key, value) = prop
            .split_once('=')
            .ok_or_else(|| PersistError::malformed(record, "property record without '='"))?;

        fn num<T: std::str::FromStr>(record: usize, value: &str) -> Result<T, PersistError> {
            value
                .parse()
                .map_err(|_| PersistError::malformed(record, "bad property value"))
        }

        let list = self.lexer.list_mut();
        match key {
            "indent" => list.line_mut(line).set_indent(num(record, value)?),
            "bracket" => list.line_mut(line).set_bracket_cnt(num(record, value)?),
            "brace" => list.line_mut(line).set_brace_cnt(num(record, value)?),
            "paren" => list.line_mut(line).set_paren_cnt(num(record, value)?),
            "continue" => list
                .line_mut(line)
                .set_continuation(num::<u8>(record, value)? != 0),
            "param" => list
                .line_mut(line)
                .set_param_line(num::<u8>(record, value)? != 0),
            "blockstate" => list.line_mut(line).set_block_state(num(record, value)?),
            "unfinished" => {
                let idxs: Vec<u32> = value
                    .split(';')
                    .map(|idx| num(record, idx))
                    .collect::<Result<_, _>>()?;
                list.line_mut(line).set_unfinished(&idxs);
            }
            "scaninfo" => {
                let mut parts = value.splitn(3, ';');
                let (Some(sev), Some(pos), Some(msg)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return Err(PersistError::malformed(record, "scaninfo needs 3 fields"));
                };
                let severity = Severity::from_name(sev)
                    .ok_or_else(|| PersistError::malformed(record, "unknown severity"))?;
                let pos: i32 = num(record, pos)?;
                let tok = list
                    .token_at_line_index(line, pos)
                    .ok_or_else(|| PersistError::malformed(record, "scaninfo token index"))?;
                let msg = msg.split(MSG_NEWLINE_ESCAPE).join("\n");
                list.line_mut(line)
                    .scan_info_mut()
                    .set_parse_message(tok, msg, severity);
            }
            _ => return Err(PersistError::malformed(record, "unknown property")),
        }
        Ok(())
    }
}

fn parse_token_record(record: usize, text: &str) -> Result<(u32, u32, TokenKind), PersistError> {
    let mut parts = text.split(';');
    let (Some(start), Some(end), Some(name), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(PersistError::malformed(record, "token needs 3 fields"));
    };
    let start = start
        .parse()
        .map_err(|_| PersistError::malformed(record, "bad token start"))?;
    let end = end
        .parse()
        .map_err(|_| PersistError::malformed(record, "bad token end"))?;
    let kind = TokenKind::from_name(name)
        .ok_or_else(|| PersistError::malformed(record, format!("unknown token kind {name}")))?;
    Ok((start, end, kind))
}
