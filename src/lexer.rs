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

//! The line-at-a-time Python lexer.
//!
//! [`Lexer::tokenize`] scans a single [`TokenLine`] and appends its tokens to
//! the owned [`TokenList`].  The only state carried from one line to the next
//! is whether a triple-quoted string is still open; everything else
//! (bracket depth, parameter-list flag, continuation) is stored on the lines
//! themselves, which is what makes retokenizing a single edited line
//! possible.
//!
//! Malformed input never fails the scan.  Bad characters become
//! [`TokenKind::SyntaxError`] tokens and bad indentation becomes
//! [`TokenKind::IndentError`] tokens, each with a message in the line's
//! [`TokenScanInfo`](crate::scan_info::TokenScanInfo).

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::list::{LineId, TokenId, TokenLine, TokenList};
use crate::scan_info::Severity;
use crate::token::TokenKind;
use crate::version::Version;

/// Scanner state carried between chars and, for the block string states,
/// between lines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LexState {
    /// Normal scanning, no pending context.
    Undetermined,
    /// Inside an unterminated `"""` string.
    LiteralBlockDouble,
    /// Inside an unterminated `'''` string.
    LiteralBlockSingle,
    /// A `def` was scanned, the next word is the function name.
    DefName,
    /// A `class` was scanned, the next word is the class name.
    ClassName,
    /// After `import`, the next word is a module name.
    Module,
    /// After `from`, the next word is a package name.
    ModulePackage,
    /// After `as` on an import line, the next word is an alias.
    ModuleAlias,
    /// A `*` glob on an import line.
    ModuleGlob,
}

// https://docs.python.org/2.7/reference/lexical_analysis.html#keywords
// minus the py2-only print and exec, which are added separately
const BASE_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

const PY2_KEYWORDS: &[&str] = &["exec", "print"];

// https://docs.python.org/3.0/reference/lexical_analysis.html#keywords
const PY3_KEYWORDS: &[&str] = &["False", "None", "True", "nonlocal"];

// reserved words since 3.7
const PY37_KEYWORDS: &[&str] = &["async", "await"];

/// Names from the interpreter's `__builtins__`, frozen here so lexing does
/// not need a running interpreter.
const BUILTINS: &[&str] = &[
    "ArithmeticError", "AssertionError", "AttributeError", "BaseException",
    "BlockingIOError", "BrokenPipeError", "BufferError", "BytesWarning",
    "ChildProcessError", "ConnectionAbortedError", "ConnectionError",
    "ConnectionRefusedError", "ConnectionResetError", "DeprecationWarning",
    "EOFError", "Ellipsis", "EnvironmentError", "Exception", "False",
    "FileExistsError", "FileNotFoundError", "FloatingPointError",
    "FutureWarning", "GeneratorExit", "IOError", "ImportError",
    "ImportWarning", "IndentationError", "IndexError", "InterruptedError",
    "IsADirectoryError", "KeyError", "KeyboardInterrupt", "LookupError",
    "MemoryError", "ModuleNotFoundError", "NameError", "None",
    "NotADirectoryError", "NotImplemented", "NotImplementedError", "OSError",
    "OverflowError", "PendingDeprecationWarning", "PermissionError",
    "ProcessLookupError", "RecursionError", "ReferenceError",
    "ResourceWarning", "RuntimeError", "RuntimeWarning", "StopAsyncIteration",
    "StopIteration", "SyntaxError", "SyntaxWarning", "SystemError",
    "SystemExit", "TabError", "TimeoutError", "True", "TypeError",
    "UnboundLocalError", "UnicodeDecodeError", "UnicodeEncodeError",
    "UnicodeError", "UnicodeTranslateError", "UnicodeWarning", "UserWarning",
    "ValueError", "Warning", "ZeroDivisionError", "__import__", "abs", "all",
    "any", "ascii", "bin", "bool", "bytearray", "bytes", "callable", "chr",
    "classmethod", "compile", "complex", "delattr", "dict", "dir", "divmod",
    "enumerate", "eval", "exec", "filter", "float", "format", "frozenset",
    "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input",
    "int", "isinstance", "issubclass", "iter", "len", "list", "locals",
    "map", "max", "memoryview", "min", "next", "object", "oct", "open",
    "ord", "pow", "print", "property", "range", "repr", "reversed", "round",
    "set", "setattr", "slice", "sorted", "staticmethod", "str", "sum",
    "super", "tuple", "type", "vars", "zip",
];

fn keyword_set(version: Version) -> HashSet<&'static str> {
    let mut keywords: HashSet<&'static str> = BASE_KEYWORDS.iter().copied().collect();
    if version.major() == 2 {
        keywords.extend(PY2_KEYWORDS);
    } else {
        keywords.extend(PY3_KEYWORDS);
        if version.has_async_await() {
            keywords.extend(PY37_KEYWORDS);
        }
    }
    keywords
}

/// Keywords take precedence over builtins, so `print` is a builtin in py3
/// but a keyword in py2.
fn builtin_set(keywords: &HashSet<&'static str>) -> HashSet<&'static str> {
    BUILTINS
        .iter()
        .copied()
        .filter(|name| !keywords.contains(name))
        .collect()
}

fn is_space(ch: u8) -> bool {
    ch == b' ' || ch == b'\t'
}

fn find_bytes(bytes: &[u8], marker: &[u8], from: usize) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(marker.len())
        .position(|window| window == marker)
        .map(|pos| pos + from)
}

/// Content length of a double quoted string starting right after the opening
/// marker.  Backslash escapes a char.
fn last_dbl_quote_string_ch(bytes: &[u8], start: u32) -> u32 {
    let mut len = 0;
    let mut pos = start as usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                len += 2;
                pos += 2;
            }
            b'"' => break,
            _ => {
                len += 1;
                pos += 1;
            }
        }
    }
    len
}

/// Content length of a single quoted string.  No escapes in this type.
fn last_sgl_quote_string_ch(bytes: &[u8], start: u32) -> u32 {
    let mut len = 0;
    let mut pos = start as usize;
    while pos < bytes.len() && bytes[pos] != b'\'' {
        len += 1;
        pos += 1;
    }
    len
}

/// The incremental lexer, owner of the [`TokenList`] it fills.
pub struct Lexer {
    list: TokenList,
    file_path: PathBuf,
    version: Version,
    keywords: HashSet<&'static str>,
    builtins: HashSet<&'static str>,
    end_state: LexState,
    insert_dedent: bool,
    is_code_line: bool,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self::with_version(Version::default())
    }

    pub fn with_version(version: Version) -> Self {
        let keywords = keyword_set(version);
        let builtins = builtin_set(&keywords);
        Self {
            list: TokenList::new(),
            file_path: PathBuf::new(),
            version,
            keywords,
            builtins,
            end_state: LexState::Undetermined,
            insert_dedent: false,
            is_code_line: false,
        }
    }

    pub fn list(&self) -> &TokenList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut TokenList {
        &mut self.list
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Switches grammar version and regenerates the keyword and builtin
    /// sets.  Already lexed lines are not rescanned.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
        self.keywords = keyword_set(version);
        self.builtins = builtin_set(&self.keywords);
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = path.into();
    }

    /// Clears the list and lexes `text` line by line.  Returns the number of
    /// lines scanned.
    pub fn read_string(&mut self, text: &str) -> usize {
        self.list.clear();
        self.end_state = LexState::Undetermined;
        self.insert_dedent = false;
        for line in text.lines() {
            let id = self.list.append_line(TokenLine::new(line));
            self.tokenize(id);
        }
        self.list.line_count()
    }

    /// Reads and lexes a whole file.
    pub fn read_file(&mut self, path: &Path) -> io::Result<usize> {
        let text = fs::read_to_string(path)?;
        self.file_path = path.to_path_buf();
        Ok(self.read_string(&text))
    }

    fn is_letter(&self, ch: u8) -> bool {
        // py3 accepts non-ascii identifier chars, py2 does not
        ch.is_ascii_alphabetic() || (self.version.has_unicode_identifiers() && ch >= 0x80)
    }

    fn last_word_ch(&self, bytes: &[u8], start: u32) -> u32 {
        let mut len = 0;
        for &ch in &bytes[start as usize..] {
            if !ch.is_ascii_digit() && !self.is_letter(ch) && ch != b'_' {
                break;
            }
            len += 1;
        }
        len
    }

    fn last_number_ch(bytes: &[u8], start: u32) -> u32 {
        let first = bytes[start as usize];
        let mut len = 0;
        let mut pos = start as usize;
        while pos < bytes.len() {
            let ch = bytes[pos].to_ascii_lowercase();
            let number_ch = ch.is_ascii_digit()
                || (b'a'..=b'f').contains(&ch)
                || ch == b'.'
                || ((ch == b'x' || ch == b'b' || ch == b'o') && first == b'0');
            if !number_ch {
                break;
            }
            len += 1;
            pos += 1;
        }
        // long integer (py2) or imaginary suffix
        if len > 0 && pos < bytes.len() {
            let suffix = bytes[pos].to_ascii_uppercase();
            if suffix == b'L' || suffix == b'J' {
                len += 1;
            }
        }
        len
    }

    fn number_kind(text: &str) -> TokenKind {
        if text.contains('.') {
            return TokenKind::NumberFloat;
        }
        let bytes = text.as_bytes();
        if bytes.len() >= 2 && bytes[0] == b'0' {
            return match bytes[1].to_ascii_lowercase() {
                b'x' => TokenKind::NumberHex,
                b'b' => TokenKind::NumberBinary,
                // 0o17 but also the py2 form 017
                _ => TokenKind::NumberOctal,
            };
        }
        TokenKind::NumberDecimal
    }

    /// Lexes one line, appending tokens to it.  Returns the number of bytes
    /// consumed.
    pub fn tokenize(&mut self, line: LineId) -> u32 {
        self.is_code_line = false;
        let mut is_module_line = false;

        // inherit bracket depth and the parameter-list flag from above
        if let Some(prev) = self.list.line(line).previous_line() {
            let prev_slot = self.list.line(prev);
            let param = prev_slot.is_param_line();
            let brace = prev_slot.brace_cnt();
            let bracket = prev_slot.bracket_cnt();
            let paren = prev_slot.paren_cnt();
            let backslash = prev_slot
                .back()
                .is_some_and(|tok| self.list.token(tok).kind() == TokenKind::DelimiterBackSlash);
            let slot = self.list.line_mut(line);
            slot.set_param_line(param);
            slot.set_brace_cnt(brace);
            slot.set_bracket_cnt(bracket);
            slot.set_paren_cnt(paren);
            slot.set_continuation(backslash || brace > 0 || bracket > 0 || paren > 0);
        }

        let text = self.list.line(line).text().to_owned();
        let bytes = text.as_bytes();
        let mut prefix_len: u32 = 0;
        let mut i: u32 = 0;

        while (i as usize) < bytes.len() {
            let ch = bytes[i as usize];

            match self.end_state {
                LexState::Undetermined => {
                    let next = bytes.get(i as usize + 1).copied().unwrap_or(0);
                    let third = bytes.get(i as usize + 2).copied().unwrap_or(0);

                    match ch {
                        b'#' => {
                            // comment to end of row, the \n stays outside it
                            let len = bytes.len() as u32 - i - 1;
                            self.set_word(line, &mut i, len, TokenKind::Comment);
                        }
                        b'"' | b'\'' => {
                            self.scan_string(line, &mut i, bytes, &mut prefix_len, next, third);
                        }
                        b' ' | b'\t' => {
                            self.scan_indentation(line, &mut i, bytes);
                        }
                        b'*' => {
                            if self.list.line(line).is_param_line() {
                                // *args or **kwargs
                                if next == b'*' {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorKeyWordParam);
                                } else {
                                    self.set_word(line, &mut i, 1, TokenKind::OperatorVariableParam);
                                }
                            } else if is_module_line {
                                // import glob, handled by the module state
                                i = i.saturating_sub(1);
                                self.end_state = LexState::ModuleGlob;
                            } else if next == b'*' {
                                if third == b'=' {
                                    self.set_word(line, &mut i, 3, TokenKind::OperatorExpoEqual);
                                } else {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorExponential);
                                }
                            } else if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorMulEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorMul);
                            }
                        }
                        b'/' => {
                            if next == b'/' {
                                if third == b'=' {
                                    self.set_word(line, &mut i, 3, TokenKind::OperatorFloorDivEqual);
                                } else {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorFloorDiv);
                                }
                            } else if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorDivEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorDiv);
                            }
                        }
                        b'>' => {
                            if next == b'>' {
                                if third == b'=' {
                                    self.set_word(line, &mut i, 3, TokenKind::OperatorBitShiftRightEqual);
                                } else {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorBitShiftRight);
                                }
                            } else if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorMoreEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorMore);
                            }
                        }
                        b'<' => {
                            if next == b'<' {
                                if third == b'=' {
                                    self.set_word(line, &mut i, 3, TokenKind::OperatorBitShiftLeftEqual);
                                } else {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorBitShiftLeft);
                                }
                            } else if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorLessEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorLess);
                            }
                        }
                        b'-' => {
                            if next == b'>' {
                                // return type annotation
                                self.set_word(line, &mut i, 2, TokenKind::DelimiterMetaData);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorMinus);
                            }
                        }
                        b'+' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorPlusEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorPlus);
                            }
                        }
                        b'%' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorModuloEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorModulo);
                            }
                        }
                        b'&' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorBitAndEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorBitAnd);
                            }
                        }
                        b'^' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorBitXorEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorBitXor);
                            }
                        }
                        b'|' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorBitOrEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorBitOr);
                            }
                        }
                        b'=' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorCompareEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorEqual);
                            }
                        }
                        b'!' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorNotEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorNot);
                            }
                        }
                        b'~' => {
                            if next == b'=' {
                                self.set_word(line, &mut i, 2, TokenKind::OperatorBitNotEqual);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::OperatorBitNot);
                            }
                        }
                        b'(' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterOpenParen);
                            let slot = self.list.line_mut(line);
                            slot.set_paren_cnt(slot.paren_cnt() + 1);
                        }
                        b')' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterCloseParen);
                            let slot = self.list.line_mut(line);
                            slot.set_paren_cnt(slot.paren_cnt() - 1);
                            if slot.paren_cnt() == 0 {
                                slot.set_param_line(false);
                            }
                        }
                        b'[' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterOpenBracket);
                            let slot = self.list.line_mut(line);
                            slot.set_bracket_cnt(slot.bracket_cnt() + 1);
                        }
                        b']' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterCloseBracket);
                            let slot = self.list.line_mut(line);
                            slot.set_bracket_cnt(slot.bracket_cnt() - 1);
                        }
                        b'{' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterOpenBrace);
                            let slot = self.list.line_mut(line);
                            slot.set_brace_cnt(slot.brace_cnt() + 1);
                        }
                        b'}' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterCloseBrace);
                            let slot = self.list.line_mut(line);
                            slot.set_brace_cnt(slot.brace_cnt() - 1);
                        }
                        b'\r' | b'\n' => {
                            // CR is stripped by TokenLine::new, so this is
                            // always a single \n.  No newline token for
                            // empty, comment only and backslash continued
                            // lines.
                            let continued = self.list.line(line).back().is_some_and(|tok| {
                                self.list.token(tok).kind() == TokenKind::DelimiterBackSlash
                            });
                            if !continued && self.is_code_line {
                                self.set_word(line, &mut i, 1, TokenKind::DelimiterNewLine);
                                self.check_line_end(line);
                            }
                        }
                        b',' => {
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterComma);
                        }
                        b'.' => {
                            if next == b'.' && third == b'.' {
                                self.set_word(line, &mut i, 3, TokenKind::DelimiterEllipsis);
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::DelimiterPeriod);
                            }
                        }
                        b';' => {
                            is_module_line = false;
                            self.set_word(line, &mut i, 1, TokenKind::DelimiterSemiColon);
                        }
                        b':' => {
                            if next == b'=' {
                                if self.version.has_walrus() {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorWalrus);
                                } else {
                                    self.set_syntax_error(line, &mut i, 2);
                                }
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::DelimiterColon);
                            }
                        }
                        b'@' => {
                            if next.is_ascii_alphabetic() || next == b'_' {
                                let len = self.last_word_ch(bytes, i + 1);
                                self.set_word(line, &mut i, len + 1, TokenKind::IdentifierDecorator);
                            } else if next == b'=' {
                                if self.version.has_matrix_mul_assign() {
                                    self.set_word(line, &mut i, 2, TokenKind::OperatorMatrixMulEqual);
                                } else {
                                    self.set_syntax_error(line, &mut i, 2);
                                }
                            } else {
                                self.set_word(line, &mut i, 1, TokenKind::Delimiter);
                            }
                        }
                        b'$' | b'?' | b'`' => {
                            self.set_syntax_error(line, &mut i, 1);
                        }
                        _ => {
                            self.scan_word_or_number(
                                line,
                                &mut i,
                                &text,
                                &mut prefix_len,
                                &mut is_module_line,
                                next,
                                third,
                            );
                        }
                    }
                }
                LexState::LiteralBlockDouble => {
                    // continued from a previous line
                    self.scan_indentation(line, &mut i, bytes);
                    match find_bytes(bytes, b"\"\"\"", i as usize) {
                        Some(end) => {
                            let len = end as u32 + 3 - i;
                            self.set_word(line, &mut i, len, TokenKind::LiteralBlockDblQuote);
                            self.end_state = LexState::Undetermined;
                        }
                        None => {
                            let len = bytes.len() as u32 - i;
                            self.set_word(line, &mut i, len, TokenKind::LiteralBlockDblQuote);
                        }
                    }
                }
                LexState::LiteralBlockSingle => {
                    self.scan_indentation(line, &mut i, bytes);
                    match find_bytes(bytes, b"'''", i as usize) {
                        Some(end) => {
                            let len = end as u32 + 3 - i;
                            self.set_word(line, &mut i, len, TokenKind::LiteralBlockSglQuote);
                            self.end_state = LexState::Undetermined;
                        }
                        None => {
                            let len = bytes.len() as u32 - i;
                            self.set_word(line, &mut i, len, TokenKind::LiteralBlockSglQuote);
                        }
                    }
                }
                LexState::DefName => {
                    while (i as usize) < bytes.len() && is_space(bytes[i as usize]) {
                        i += 1;
                    }
                    if i as usize == bytes.len() {
                        self.end_state = LexState::Undetermined;
                        break;
                    }
                    let len = self.last_word_ch(bytes, i);
                    if self.list.line(line).indent() == 0 {
                        // no indent, it cannot be a method
                        self.set_word(line, &mut i, len, TokenKind::IdentifierFunction);
                    } else {
                        self.set_undetermined(line, &mut i, len, TokenKind::IdentifierDefUnknown);
                    }
                    self.end_state = LexState::Undetermined;
                }
                LexState::ClassName => {
                    while (i as usize) < bytes.len() && is_space(bytes[i as usize]) {
                        i += 1;
                    }
                    if i as usize == bytes.len() {
                        self.end_state = LexState::Undetermined;
                        break;
                    }
                    let len = self.last_word_ch(bytes, i);
                    self.set_word(line, &mut i, len, TokenKind::IdentifierClass);
                    self.end_state = LexState::Undetermined;
                }
                LexState::Module
                | LexState::ModulePackage
                | LexState::ModuleAlias
                | LexState::ModuleGlob => {
                    // imports can name several modules, scanning bounces
                    // between this state and Undetermined
                    while (i as usize) < bytes.len() && is_space(bytes[i as usize]) {
                        i += 1;
                    }
                    if i as usize == bytes.len() {
                        self.end_state = LexState::Undetermined;
                        break;
                    }
                    let mut len = self.last_word_ch(bytes, i);
                    let mut glob = false;
                    if len < 1 && bytes[i as usize] == b'*' {
                        // globs are not word chars
                        len = 1;
                        glob = true;
                    }
                    if len >= 1 {
                        let kind = match self.end_state {
                            _ if glob => TokenKind::IdentifierModuleGlob,
                            LexState::ModulePackage => TokenKind::IdentifierModulePackage,
                            LexState::ModuleAlias => TokenKind::IdentifierModuleAlias,
                            LexState::ModuleGlob => TokenKind::IdentifierModuleGlob,
                            _ => TokenKind::IdentifierModule,
                        };
                        self.set_word(line, &mut i, len, kind);
                        self.end_state = LexState::Undetermined;
                    }
                }
            }

            i += 1;
        }

        // only block strings may span lines
        if self.end_state != LexState::LiteralBlockDouble
            && self.end_state != LexState::LiteralBlockSingle
        {
            self.end_state = LexState::Undetermined;
        }

        i
    }

    /// String literal or block string opener, with an optional `r`/`b`/`f`/
    /// `u` prefix scanned in a previous iteration.
    fn scan_string(
        &mut self,
        line: LineId,
        i: &mut u32,
        bytes: &[u8],
        prefix_len: &mut u32,
        next: u8,
        third: u8,
    ) {
        let compare = bytes[*i as usize];
        let block = next == compare && third == compare;
        let (kind, marker, start_str) = if block && compare == b'"' {
            self.end_state = LexState::LiteralBlockDouble;
            (TokenKind::LiteralBlockDblQuote, &b"\"\"\""[..], *i + 3)
        } else if block {
            self.end_state = LexState::LiteralBlockSingle;
            (TokenKind::LiteralBlockSglQuote, &b"'''"[..], *i + 3)
        } else if compare == b'"' {
            (TokenKind::LiteralDblQuote, &b"\""[..], *i + 1)
        } else {
            (TokenKind::LiteralSglQuote, &b"'"[..], *i + 1)
        };

        let mut len = if compare == b'"' {
            last_dbl_quote_string_ch(bytes, start_str)
        } else {
            last_sgl_quote_string_ch(bytes, start_str)
        };

        if let Some(end) = find_bytes(bytes, marker, (start_str + len) as usize) {
            len = end as u32 - *i;
            self.end_state = LexState::Undetermined;
        }

        // the prefix belongs to the literal token
        *i -= *prefix_len;
        self.set_word(line, i, len + marker.len() as u32 + *prefix_len, kind);
        *prefix_len = 0;

        // an unterminated block string still ends the logical line
        if self.end_state != LexState::Undetermined {
            self.check_line_end(line);
        }
    }

    /// Keyword, builtin, identifier, number or string prefix.
    #[allow(clippy::too_many_arguments)]
    fn scan_word_or_number(
        &mut self,
        line: LineId,
        i: &mut u32,
        text: &str,
        prefix_len: &mut u32,
        is_module_line: &mut bool,
        next: u8,
        third: u8,
    ) {
        let bytes = text.as_bytes();
        let ch = bytes[*i as usize];
        let low = ch.to_ascii_lowercase();

        // string prefixes, the literal itself is scanned next iteration
        if (next == b'"' || next == b'\'') && matches!(low, b'r' | b'b' | b'f' | b'u') {
            *prefix_len = 1;
            return;
        }
        if third == b'"' || third == b'\'' {
            let two = [low, next.to_ascii_lowercase()];
            if matches!(&two, b"fr" | b"rf" | b"br" | b"rb") {
                *prefix_len = 2;
                *i += 1;
                return;
            }
        }

        if self.is_letter(ch) || ch == b'_' {
            let len = self.last_word_ch(bytes, *i);
            let word = &text[*i as usize..(*i + len) as usize];

            if self.keywords.contains(word) {
                match word {
                    "continue" => self.set_word(line, i, len, TokenKind::KeywordContinue),
                    "finally" => self.set_word(line, i, len, TokenKind::KeywordFinally),
                    "import" => {
                        self.set_word(line, i, len, TokenKind::KeywordImport);
                        self.end_state = LexState::Module;
                        *is_module_line = true;
                    }
                    "return" => self.set_word(line, i, len, TokenKind::KeywordReturn),
                    "except" => self.set_word(line, i, len, TokenKind::KeywordExcept),
                    "class" => {
                        self.set_word(line, i, len, TokenKind::KeywordClass);
                        self.end_state = LexState::ClassName;
                    }
                    "yield" => self.set_word(line, i, len, TokenKind::KeywordYield),
                    "False" => self.set_word(line, i, len, TokenKind::IdentifierFalse),
                    "while" => self.set_word(line, i, len, TokenKind::KeywordWhile),
                    "break" => self.set_word(line, i, len, TokenKind::KeywordBreak),
                    "from" => {
                        self.set_word(line, i, len, TokenKind::KeywordFrom);
                        self.end_state = LexState::ModulePackage;
                        *is_module_line = true;
                    }
                    "True" => self.set_word(line, i, len, TokenKind::IdentifierTrue),
                    "None" => self.set_word(line, i, len, TokenKind::IdentifierNone),
                    "elif" => self.set_word(line, i, len, TokenKind::KeywordElIf),
                    "else" => self.set_word(line, i, len, TokenKind::KeywordElse),
                    "def" => {
                        self.list.line_mut(line).set_param_line(true);
                        self.set_word(line, i, len, TokenKind::KeywordDef);
                        self.end_state = LexState::DefName;
                    }
                    "not" => self.set_word(line, i, len, TokenKind::OperatorNot),
                    "for" => self.set_word(line, i, len, TokenKind::KeywordFor),
                    "try" => self.set_word(line, i, len, TokenKind::KeywordTry),
                    "and" => self.set_word(line, i, len, TokenKind::OperatorAnd),
                    "as" => {
                        self.set_word(line, i, len, TokenKind::KeywordAs);
                        if *is_module_line {
                            self.end_state = LexState::ModuleAlias;
                        }
                    }
                    "in" => self.set_word(line, i, len, TokenKind::OperatorIn),
                    "is" => self.set_word(line, i, len, TokenKind::OperatorIs),
                    "or" => self.set_word(line, i, len, TokenKind::OperatorOr),
                    "if" => self.set_word(line, i, len, TokenKind::KeywordIf),
                    // del, global, with, assert, pass, raise, lambda,
                    // nonlocal, async, await, print, exec
                    _ => self.set_word(line, i, len, TokenKind::Keyword),
                }
            } else if self.builtins.contains(word) {
                let after_period = self.list.line(line).back().is_some_and(|tok| {
                    self.list.token(tok).kind() == TokenKind::DelimiterPeriod
                });
                if after_period {
                    // someObj.print is not the builtin
                    self.set_word(line, i, len, TokenKind::IdentifierUnknown);
                } else {
                    self.set_word(line, i, len, TokenKind::IdentifierBuiltin);
                }
            } else if *is_module_line {
                // let the module state classify it
                *i = i.saturating_sub(1);
                self.end_state = LexState::Module;
            } else {
                self.set_undetermined(line, i, len, TokenKind::IdentifierUnknown);
            }
            return;
        }

        let len = Self::last_number_ch(bytes, *i);
        if len > 0 {
            let kind = Self::number_kind(&text[*i as usize..(*i + len) as usize]);
            self.set_word(line, i, len, kind);
        } else if ch == b'\\' {
            self.set_word(line, i, 1, TokenKind::DelimiterBackSlash);
        } else {
            let pos = *i;
            let tok = self.syntax_error_token(line, i, 1);
            let msg = format!("Unknown character 0x{ch:02x} at col {pos}");
            self.list
                .line_mut(line)
                .scan_info_mut()
                .set_parse_message(tok, msg, Severity::SyntaxError);
        }
    }

    /// Measures leading whitespace, tab counting as eight columns.  Only the
    /// first token scan of a line records indentation.
    fn scan_indentation(&mut self, line: LineId, pos: &mut u32, bytes: &[u8]) {
        if !self.list.line(line).is_empty() {
            return;
        }
        let mut count: u32 = 0;
        let mut j = *pos as usize;
        while j < bytes.len() {
            match bytes[j] {
                b' ' => count += 1,
                b'\t' => count += 8,
                _ => break,
            }
            j += 1;
        }
        if count > 0 {
            *pos = j as u32 - 1;
            self.list.line_mut(line).set_indent(count as u16);
        }
    }

    fn set_word(&mut self, line: LineId, pos: &mut u32, len: u32, kind: TokenKind) {
        let tok = self.list.new_determined_token(line, kind, *pos, len);
        if !self.is_code_line {
            self.is_code_line = self.list.token(tok).kind().is_code();
        }
        if len > 0 {
            *pos += len - 1;
        }
    }

    /// An identifier a later analysis pass is expected to resolve.
    fn set_undetermined(&mut self, line: LineId, pos: &mut u32, len: u32, kind: TokenKind) {
        self.list.new_undetermined_token(line, kind, *pos, len);
        if len > 0 {
            *pos += len - 1;
        }
    }

    fn set_syntax_error(&mut self, line: LineId, pos: &mut u32, len: u32) {
        self.syntax_error_token(line, pos, len);
    }

    fn syntax_error_token(&mut self, line: LineId, pos: &mut u32, len: u32) -> TokenId {
        let tok = self.list.new_determined_token(line, TokenKind::SyntaxError, *pos, len);
        if len > 0 {
            *pos += len - 1;
        }
        tok
    }

    /// Runs at each logical line end: settles a deferred dedent, checks
    /// whether this line opens a block and whether it closes earlier ones.
    fn check_line_end(&mut self, line: LineId) {
        if self.insert_dedent {
            self.insert_dedent_token(line);
        }
        if self.list.line(line).indent() > 0 && self.is_code_line {
            self.set_indentation(line);
        }
        // this line may dedent a previous one
        self.check_for_dedent(line);
    }

    fn insert_dedent_token(&mut self, line: LineId) {
        self.insert_dedent = false;
        self.list.line_mut(line).dec_block_state();
        if let Some(back) = self.list.line(line).back() {
            let end = self.list.token(back).end_pos();
            self.list.new_determined_token(line, TokenKind::Dedent, end, 0);
        }
    }

    /// Compares this line's indent against the enclosing code line and
    /// inserts an Indent marker or an IndentError.
    fn set_indentation(&mut self, line: LineId) {
        // nearest code line above, skipping continuation lines
        let mut prev = self.list.previous_code_line(self.list.line(line).previous_line());
        while let Some(cur) = prev {
            if !self.list.line(cur).is_continuation() {
                break;
            }
            prev = self.list.previous_code_line(self.list.line(cur).previous_line());
        }

        let indent = self.list.line(line).indent();
        let Some(prev_line) = prev else {
            if indent > 0 {
                self.create_indent_error(line, "Unexpected indent at beginning of file");
            }
            return;
        };

        let prev_indent = self.list.line(prev_line).indent();
        if indent == prev_indent {
            // back on the same level, a dedent guessed for the previous line
            // was premature
            let back = self.list.line(prev_line).back();
            if let Some(back) = back {
                if self.list.token(back).kind() == TokenKind::Dedent {
                    self.list.remove(back);
                    self.list.line_mut(prev_line).inc_block_state();
                    self.insert_dedent = true; // defer to this line's end
                }
            }
            return;
        }
        if self.list.line(line).is_continuation() || prev_indent > indent {
            return;
        }

        // deeper indent, the line right above must end a block header
        let Some(opener) = self.list.previous_code_line(self.list.line(line).previous_line())
        else {
            return;
        };
        let mut lookup = self.list.line(opener).back();
        let mut colon = false;
        while let Some(tok) = lookup {
            let token = self.list.token(tok);
            if token.line_id() != opener {
                break;
            }
            if token.kind() == TokenKind::DelimiterColon {
                colon = true;
                break;
            }
            lookup = token.previous();
        }

        if !colon {
            self.create_indent_error(line, "Blockstart without ':'");
        } else if let Some(front) = self.list.line(line).front() {
            self.list.line_mut(prev_line).inc_block_state();
            let start = self.list.token(front).start_pos();
            self.list.push_front(line, TokenKind::Indent, 0, start);
        }
    }

    fn create_indent_error(&mut self, line: LineId, msg: &str) -> TokenId {
        let front = self.list.line(line).front();
        let tok = match front {
            Some(tok) if self.list.token(tok).kind() == TokenKind::IndentError => tok,
            _ => {
                let indent = self.list.line(line).indent();
                self.list.push_front(line, TokenKind::IndentError, 0, u32::from(indent))
            }
        };
        self.list
            .line_mut(line)
            .scan_info_mut()
            .set_parse_message(tok, msg, Severity::IndentError);
        tok
    }

    /// Appends Dedent markers to the previous code line when this line steps
    /// back out of one or more blocks.
    fn check_for_dedent(&mut self, line: LineId) {
        let active_indent = self.list.line(line).indent();
        let Some(prev_line) = self.list.previous_code_line(self.list.line(line).previous_line())
        else {
            return;
        };
        let prev_indent = self.list.line(prev_line).indent();
        let prev_back = self.list.line(prev_line).back();
        let Some(prev_back) = prev_back else {
            return;
        };
        if prev_indent <= active_indent || self.list.token(prev_back).kind() == TokenKind::Dedent {
            return;
        }

        // walk up to the indent level that opened the block, balancing
        // Indent markers against already inserted Dedents
        let mut start = Some(prev_line);
        let mut dedent_cnt: i32 = 0;
        let mut indent_cnt: i32 = 0;
        let mut last_indent = prev_indent;
        while let Some(cur) = start {
            let cur_indent = self.list.line(cur).indent();
            if cur_indent <= last_indent && cur_indent > active_indent {
                let back_dedent = self.list.line(cur).back().is_some_and(|tok| {
                    self.list.token(tok).kind() == TokenKind::Dedent
                });
                if back_dedent {
                    dedent_cnt -= 1;
                    if let Some(above) =
                        self.list.previous_code_line(self.list.line(cur).previous_line())
                    {
                        last_indent = self.list.line(above).indent();
                    }
                }
                let front_indent = self.list.line(cur).front().is_some_and(|tok| {
                    self.list.token(tok).kind() == TokenKind::Indent
                });
                if front_indent {
                    indent_cnt += 1;
                    if let Some(above) =
                        self.list.previous_code_line(self.list.line(cur).previous_line())
                    {
                        last_indent = self.list.line(above).indent();
                    }
                }
            }

            if self.list.is_code_line(cur) && cur_indent <= active_indent {
                break;
            }
            start = self.list.line(cur).previous_line();
        }

        while indent_cnt + dedent_cnt > 0 {
            dedent_cnt -= 1;
            self.list.line_mut(prev_line).dec_block_state();
            if let Some(back) = self.list.line(prev_line).back() {
                let end = self.list.token(back).end_pos();
                self.list.new_determined_token(prev_line, TokenKind::Dedent, end, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests;
