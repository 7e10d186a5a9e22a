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

//! The document model: a [`TokenList`] owning lines and tokens in two arenas.
//!
//! Tokens form one document-global doubly linked chain addressed by
//! [`TokenId`] handles; lines form a second chain of [`LineId`] handles.  The
//! two chains stay consistent: walking the lines front to back visits the
//! same tokens, in the same order, as walking the token chain itself.
//!
//! Lexical problems in the input are tokens ([`TokenKind::SyntaxError`]);
//! violating a structural precondition of this API (a stale handle, a
//! range-remove across lines) is a caller bug and panics.

use std::cmp::Ordering;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::arena::Arena;
use crate::scan_info::TokenScanInfo;
use crate::token::TokenKind;

/// Handle to a token slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenId(u32);

/// Handle to a line slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineId(u32);

impl TokenId {
    #[cfg(test)]
    pub(crate) fn for_tests(idx: u32) -> Self {
        Self(idx)
    }
}

/// Notified when a token it registered on is destroyed.
///
/// Registrations are weak: dropping the observer silently deregisters it.
pub trait TokenObserver {
    fn token_deleted(&self, tok: TokenId);
}

/// A single lexical unit: kind plus byte span within its owning line.
#[derive(Debug)]
pub struct Token {
    kind: TokenKind,
    start: u32,
    end: u32,
    line: LineId,
    next: Option<TokenId>,
    prev: Option<TokenId>,
    observers: Vec<Weak<dyn TokenObserver>>,
}

impl Token {
    fn new(kind: TokenKind, start: u32, end: u32, line: LineId) -> Self {
        Self {
            kind,
            start,
            end,
            line,
            next: None,
            prev: None,
            observers: Vec::new(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Byte offset of the first char within the owning line's text.
    pub fn start_pos(&self) -> u32 {
        self.start
    }

    /// Byte offset one past the last char.
    pub fn end_pos(&self) -> u32 {
        self.end
    }

    pub fn line_id(&self) -> LineId {
        self.line
    }

    /// Next token in document order, possibly on a later line.
    pub fn next(&self) -> Option<TokenId> {
        self.next
    }

    pub fn previous(&self) -> Option<TokenId> {
        self.prev
    }
}

/// One line of source text plus its owned run of tokens and lexing state.
#[derive(Debug, Default)]
pub struct TokenLine {
    text: String,
    indent: u16,
    paren_cnt: i16,
    bracket_cnt: i16,
    brace_cnt: i16,
    block_state: i16,
    is_param_line: bool,
    is_continuation: bool,
    front: Option<TokenId>,
    back: Option<TokenId>,
    next: Option<LineId>,
    prev: Option<LineId>,
    scan_info: Option<TokenScanInfo>,
    unfinished: SmallVec<[u32; 4]>,
}

impl TokenLine {
    /// Creates a line from raw editor text.  Any trailing `\r\n`, `\n\r`,
    /// `\n` or `\r` is stripped and a single `\n` appended, so the stored
    /// text always ends in `\n` and a CR never survives into it.
    pub fn new(text: &str) -> Self {
        let trimmed = text
            .strip_suffix("\r\n")
            .or_else(|| text.strip_suffix("\n\r"))
            .or_else(|| text.strip_suffix('\n'))
            .or_else(|| text.strip_suffix('\r'))
            .unwrap_or(text);
        Self {
            text: format!("{trimmed}\n"),
            ..Self::default()
        }
    }

    /// The line's text, newline terminated.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Indentation width in columns, tab counting as eight.
    pub fn indent(&self) -> u16 {
        self.indent
    }

    pub fn paren_cnt(&self) -> i16 {
        self.paren_cnt
    }

    pub fn bracket_cnt(&self) -> i16 {
        self.bracket_cnt
    }

    pub fn brace_cnt(&self) -> i16 {
        self.brace_cnt
    }

    /// Net number of blocks this line opens (positive) or closes (negative).
    pub fn block_state(&self) -> i16 {
        self.block_state
    }

    /// True while inside a `def (...)` parameter list.
    pub fn is_param_line(&self) -> bool {
        self.is_param_line
    }

    /// True when this line continues the previous one, either through a
    /// trailing backslash or an unbalanced bracket.
    pub fn is_continuation(&self) -> bool {
        self.is_continuation
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    pub fn front(&self) -> Option<TokenId> {
        self.front
    }

    pub fn back(&self) -> Option<TokenId> {
        self.back
    }

    pub fn next_line(&self) -> Option<LineId> {
        self.next
    }

    pub fn previous_line(&self) -> Option<LineId> {
        self.prev
    }

    pub fn scan_info(&self) -> Option<&TokenScanInfo> {
        self.scan_info.as_ref()
    }

    pub fn scan_info_mut(&mut self) -> &mut TokenScanInfo {
        self.scan_info.get_or_insert_default()
    }

    /// Line-local indexes of tokens whose identifier kind is still
    /// undetermined.
    pub fn unfinished_tokens(&self) -> &[u32] {
        &self.unfinished
    }

    pub(crate) fn set_indent(&mut self, indent: u16) {
        self.indent = indent;
    }

    pub(crate) fn set_paren_cnt(&mut self, cnt: i16) {
        self.paren_cnt = cnt;
    }

    pub(crate) fn set_bracket_cnt(&mut self, cnt: i16) {
        self.bracket_cnt = cnt;
    }

    pub(crate) fn set_brace_cnt(&mut self, cnt: i16) {
        self.brace_cnt = cnt;
    }

    pub(crate) fn set_block_state(&mut self, state: i16) {
        self.block_state = state;
    }

    pub(crate) fn inc_block_state(&mut self) {
        self.block_state += 1;
    }

    pub(crate) fn dec_block_state(&mut self) {
        self.block_state -= 1;
    }

    pub(crate) fn set_param_line(&mut self, on: bool) {
        self.is_param_line = on;
    }

    pub(crate) fn set_continuation(&mut self, on: bool) {
        self.is_continuation = on;
    }

    pub(crate) fn set_unfinished(&mut self, idxs: &[u32]) {
        self.unfinished = SmallVec::from_slice(idxs);
    }

    pub(crate) fn push_unfinished(&mut self, idx: u32) {
        self.unfinished.push(idx);
    }
}

/// The full ordered collection of lines and tokens for one document.
#[derive(Debug, Default)]
pub struct TokenList {
    tokens: Arena<Token>,
    lines: Arena<TokenLine>,
    first: Option<TokenId>,
    last: Option<TokenId>,
    first_line: Option<LineId>,
    last_line: Option<LineId>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- accessors ------------------------------------------------------

    /// Resolves a token handle.  A stale handle is a caller bookkeeping bug.
    pub fn token(&self, tok: TokenId) -> &Token {
        self.tokens
            .get(tok.0)
            .unwrap_or_else(|| panic!("stale token handle {tok:?}"))
    }

    fn token_mut(&mut self, tok: TokenId) -> &mut Token {
        self.tokens
            .get_mut(tok.0)
            .unwrap_or_else(|| panic!("stale token handle {tok:?}"))
    }

    /// Resolves a line handle.  A stale handle is a caller bookkeeping bug.
    pub fn line(&self, line: LineId) -> &TokenLine {
        self.lines
            .get(line.0)
            .unwrap_or_else(|| panic!("stale line handle {line:?}"))
    }

    pub(crate) fn line_mut(&mut self, line: LineId) -> &mut TokenLine {
        self.lines
            .get_mut(line.0)
            .unwrap_or_else(|| panic!("stale line handle {line:?}"))
    }

    pub fn front(&self) -> Option<TokenId> {
        self.first
    }

    pub fn back(&self) -> Option<TokenId> {
        self.last
    }

    pub fn first_line(&self) -> Option<LineId> {
        self.first_line
    }

    pub fn last_line(&self) -> Option<LineId> {
        self.last_line
    }

    /// Number of live tokens.
    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.first_line.is_none()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The token's text, a slice of its owning line.
    pub fn token_text(&self, tok: TokenId) -> &str {
        let token = self.token(tok);
        self.line(token.line)
            .text
            .get(token.start as usize..token.end as usize)
            .unwrap_or("")
    }

    /// Derived line number, O(n) walk to the front of the document.
    /// Intentionally uncached: lines are inserted and removed far more often
    /// than their numbers are queried in bulk.
    pub fn line_nr(&self, line: LineId) -> usize {
        let mut nr = 0;
        let mut cursor = self.line(line).prev;
        while let Some(prev) = cursor {
            nr += 1;
            cursor = self.line(prev).prev;
        }
        nr
    }

    /// Indexed token lookup walking from whichever end is closer.  Negative
    /// indexes count from the back, `-1` being the last token.
    pub fn token_at_index(&self, idx: i32) -> Option<TokenId> {
        let count = self.count() as i32;
        let idx = if idx < 0 { count + idx } else { idx };
        if idx < 0 || idx >= count {
            return None;
        }
        if idx < count / 2 {
            let mut tok = self.first;
            for _ in 0..idx {
                tok = self.token(tok?).next;
            }
            tok
        } else {
            let mut tok = self.last;
            for _ in 0..(count - 1 - idx) {
                tok = self.token(tok?).prev;
            }
            tok
        }
    }

    /// Indexed line lookup; negative indexes count from the back.
    pub fn line_at(&self, idx: i32) -> Option<LineId> {
        if idx < 0 {
            let mut line = self.last_line;
            for _ in 0..(-idx - 1) {
                line = self.line(line?).prev;
            }
            line
        } else {
            let mut line = self.first_line;
            for _ in 0..idx {
                line = self.line(line?).next;
            }
            line
        }
    }

    // ---- token mutation -------------------------------------------------

    /// Splices `tok` into the global chain after `prev` (or at the head).
    fn link_after(&mut self, prev: Option<TokenId>, tok: TokenId) {
        match prev {
            Some(prev) => {
                let old_next = self.token(prev).next;
                self.token_mut(tok).prev = Some(prev);
                self.token_mut(tok).next = old_next;
                self.token_mut(prev).next = Some(tok);
                match old_next {
                    Some(next) => self.token_mut(next).prev = Some(tok),
                    None => self.last = Some(tok),
                }
            }
            None => {
                let old_first = self.first;
                self.token_mut(tok).next = old_first;
                match old_first {
                    Some(next) => self.token_mut(next).prev = Some(tok),
                    None => self.last = Some(tok),
                }
                self.first = Some(tok);
            }
        }
    }

    /// Unlinks `tok` from the global chain and from its line's front/back,
    /// leaving the slot itself alive.
    fn unlink(&mut self, tok: TokenId) {
        let (prev, next, line) = {
            let t = self.token(tok);
            (t.prev, t.next, t.line)
        };
        if let Some(prev) = prev {
            self.token_mut(prev).next = next;
        }
        if let Some(next) = next {
            self.token_mut(next).prev = prev;
        }
        if self.first == Some(tok) {
            self.first = next;
        }
        if self.last == Some(tok) {
            self.last = prev;
        }

        let line_of = |list: &Self, id: Option<TokenId>| id.map(|id| list.token(id).line);
        let next_in_line = (line_of(self, next) == Some(line)).then_some(next).flatten();
        let prev_in_line = (line_of(self, prev) == Some(line)).then_some(prev).flatten();
        let slot = self.line_mut(line);
        if slot.front == Some(tok) {
            slot.front = next_in_line;
        }
        if slot.back == Some(tok) {
            slot.back = prev_in_line;
        }

        let t = self.token_mut(tok);
        t.prev = None;
        t.next = None;
    }

    /// Notifies every live observer exactly once and clears the registry.
    fn notify_deleted(&mut self, tok: TokenId) {
        let observers = std::mem::take(&mut self.token_mut(tok).observers);
        for weak in observers {
            if let Some(observer) = weak.upgrade() {
                observer.token_deleted(tok);
            }
        }
    }

    fn clear_scan_messages(&mut self, tok: TokenId) {
        let line = self.token(tok).line;
        if let Some(info) = self.line_mut(line).scan_info.as_mut() {
            info.clear_parse_messages(tok, None);
        }
    }

    /// Appends a token to `line`, keeping the global chain continuous: an
    /// empty line's first token links after the nearest previous line that
    /// has tokens.
    pub fn push_back(&mut self, line: LineId, kind: TokenKind, start: u32, end: u32) -> TokenId {
        let tok = TokenId(self.tokens.alloc(Token::new(kind, start, end, line)));
        let before = match self.line(line).back {
            Some(back) => Some(back),
            None => self.back_of_previous_line(line),
        };
        self.link_after(before, tok);
        let slot = self.line_mut(line);
        if slot.front.is_none() {
            slot.front = Some(tok);
        }
        slot.back = Some(tok);
        tok
    }

    /// Prepends a token to `line`.
    pub fn push_front(&mut self, line: LineId, kind: TokenKind, start: u32, end: u32) -> TokenId {
        let tok = TokenId(self.tokens.alloc(Token::new(kind, start, end, line)));
        let before = match self.line(line).front {
            Some(front) => self.token(front).prev,
            None => self.back_of_previous_line(line),
        };
        self.link_after(before, tok);
        let slot = self.line_mut(line);
        if slot.back.is_none() {
            slot.back = Some(tok);
        }
        slot.front = Some(tok);
        tok
    }

    /// Splices a new token right after `prev`, which must belong to `line`.
    pub fn insert_after(
        &mut self,
        line: LineId,
        prev: TokenId,
        kind: TokenKind,
        start: u32,
        end: u32,
    ) -> TokenId {
        assert_eq!(
            self.token(prev).line,
            line,
            "insert_after: previous token not owned by the given line"
        );
        let tok = TokenId(self.tokens.alloc(Token::new(kind, start, end, line)));
        self.link_after(Some(prev), tok);
        if self.line(line).back == Some(prev) {
            self.line_mut(line).back = Some(tok);
        }
        tok
    }

    /// Unlinks and destroys `tok`; observers are notified exactly once and
    /// its scan messages dropped.  Returns false for an already-freed handle.
    pub fn remove(&mut self, tok: TokenId) -> bool {
        if self.tokens.get(tok.0).is_none() {
            return false;
        }
        self.clear_scan_messages(tok);
        self.unlink(tok);
        self.notify_deleted(tok);
        self.tokens.free(tok.0);
        true
    }

    /// Unlinks `tok` and hands its value to the caller.  Observers are kept
    /// registered on the returned value and are not notified.
    pub fn detach(&mut self, tok: TokenId) -> Token {
        self.clear_scan_messages(tok);
        self.unlink(tok);
        self.tokens.free(tok.0)
    }

    /// Removes the inclusive run `[tok, end_tok]`.  Both ends must be owned
    /// by the same line; anything else is a caller bug.
    pub fn remove_range(&mut self, tok: TokenId, end_tok: TokenId) {
        let line = self.token(tok).line;
        assert_eq!(
            self.token(end_tok).line,
            line,
            "remove_range: tokens not owned by the same line"
        );
        let stop = self.token(end_tok).next;
        let mut cursor = Some(tok);
        while let Some(cur) = cursor {
            if Some(cur) == stop {
                break;
            }
            cursor = self.token(cur).next;
            self.remove(cur);
        }
    }

    pub fn pop_back(&mut self, line: LineId) -> Option<Token> {
        let back = self.line(line).back?;
        Some(self.detach(back))
    }

    pub fn pop_front(&mut self, line: LineId) -> Option<Token> {
        let front = self.line(line).front?;
        Some(self.detach(front))
    }

    /// Re-classifies a token.  Resolving an undetermined identifier to
    /// anything but [`TokenKind::IdentifierInvalid`] clears it from the
    /// line's unfinished set.
    pub fn change_kind(&mut self, tok: TokenId, kind: TokenKind) {
        let (old_kind, line) = {
            let t = self.token(tok);
            (t.kind, t.line)
        };
        if old_kind == TokenKind::IdentifierUnknown && kind != TokenKind::IdentifierInvalid {
            if let Some(pos) = self.token_pos(line, tok) {
                // SmallVec::retain hands out &mut, unlike Vec::retain
                self.line_mut(line).unfinished.retain(|idx| *idx != pos as u32);
            }
        }
        self.token_mut(tok).kind = kind;
    }

    /// New classified token spanning `len` bytes from `start`.
    pub fn new_determined_token(
        &mut self,
        line: LineId,
        kind: TokenKind,
        start: u32,
        len: u32,
    ) -> TokenId {
        self.push_back(line, kind, start, start + len)
    }

    /// Like [`new_determined_token`](Self::new_determined_token) but also
    /// recorded in the line's unfinished set for a later analysis pass.
    pub fn new_undetermined_token(
        &mut self,
        line: LineId,
        kind: TokenKind,
        start: u32,
        len: u32,
    ) -> TokenId {
        let tok = self.push_back(line, kind, start, start + len);
        let pos = self
            .token_pos(line, tok)
            .unwrap_or_else(|| panic!("freshly pushed token not found in its line"));
        self.line_mut(line).push_unfinished(pos as u32);
        tok
    }

    // ---- observers ------------------------------------------------------

    /// Registers a weak observer; registering the same observer twice is a
    /// no-op.
    pub fn attach_observer(&mut self, tok: TokenId, observer: &Rc<dyn TokenObserver>) {
        let weak = Rc::downgrade(observer);
        let observers = &mut self.token_mut(tok).observers;
        if !observers.iter().any(|w| Weak::ptr_eq(w, &weak)) {
            observers.push(weak);
        }
    }

    pub fn detach_observer(&mut self, tok: TokenId, observer: &Rc<dyn TokenObserver>) {
        let weak = Rc::downgrade(observer);
        self.token_mut(tok)
            .observers
            .retain(|w| !Weak::ptr_eq(w, &weak));
    }

    // ---- line mutation --------------------------------------------------

    pub fn append_line(&mut self, line: TokenLine) -> LineId {
        self.insert_line_after(self.last_line, line)
    }

    /// Splices `line` into the chain after `previous`; `None` prepends.
    pub fn insert_line_after(&mut self, previous: Option<LineId>, line: TokenLine) -> LineId {
        let id = LineId(self.lines.alloc(line));
        match previous {
            Some(prev) => {
                let old_next = self.line(prev).next;
                self.line_mut(id).prev = Some(prev);
                self.line_mut(id).next = old_next;
                self.line_mut(prev).next = Some(id);
                match old_next {
                    Some(next) => self.line_mut(next).prev = Some(id),
                    None => self.last_line = Some(id),
                }
            }
            None => {
                let old_first = self.first_line;
                self.line_mut(id).next = old_first;
                match old_first {
                    Some(next) => self.line_mut(next).prev = Some(id),
                    None => self.last_line = Some(id),
                }
                self.first_line = Some(id);
            }
        }
        id
    }

    /// Inserts `line` so that it takes line number `line_nr`; out-of-range
    /// indexes append.
    pub fn insert_line_at(&mut self, line_nr: i32, line: TokenLine) -> LineId {
        match self.line_at(line_nr) {
            Some(at) => {
                let prev = self.line(at).prev;
                self.insert_line_after(prev, line)
            }
            None => self.append_line(line),
        }
    }

    /// Replaces `out`'s text and lexing state with `swap_in`, destroying
    /// `out`'s tokens; the slot keeps its place in the line chain.
    pub fn swap_line(&mut self, out: LineId, swap_in: TokenLine) {
        self.remove_line_tokens(out);
        let slot = self.line_mut(out);
        slot.text = swap_in.text;
        slot.indent = swap_in.indent;
        slot.paren_cnt = swap_in.paren_cnt;
        slot.bracket_cnt = swap_in.bracket_cnt;
        slot.brace_cnt = swap_in.brace_cnt;
        slot.block_state = swap_in.block_state;
        slot.is_param_line = swap_in.is_param_line;
        slot.is_continuation = swap_in.is_continuation;
        slot.scan_info = swap_in.scan_info;
        slot.unfinished = swap_in.unfinished;
    }

    fn remove_line_tokens(&mut self, line: LineId) {
        while let Some(front) = self.line(line).front {
            self.remove(front);
        }
    }

    /// Destroys a line and its tokens.  Token chain continuity across the
    /// removed line is restored by the per-token unlinking.
    pub fn remove_line(&mut self, line: LineId) {
        self.remove_line_tokens(line);
        let (prev, next) = {
            let l = self.line(line);
            (l.prev, l.next)
        };
        if let Some(prev) = prev {
            self.line_mut(prev).next = next;
        }
        if let Some(next) = next {
            self.line_mut(next).prev = prev;
        }
        if self.first_line == Some(line) {
            self.first_line = next;
        }
        if self.last_line == Some(line) {
            self.last_line = prev;
        }
        self.lines.free(line.0);
    }

    pub fn clear(&mut self) {
        while let Some(first) = self.first_line {
            self.remove_line(first);
        }
        self.tokens.clear();
        self.lines.clear();
        self.first = None;
        self.last = None;
    }

    // ---- line queries ---------------------------------------------------

    /// Nearest line at or above `line` that contains code; skips blank and
    /// comment-only lines.
    pub fn previous_code_line(&self, mut line: Option<LineId>) -> Option<LineId> {
        while let Some(cur) = line {
            if self.is_code_line(cur) {
                return Some(cur);
            }
            line = self.line(cur).prev;
        }
        None
    }

    pub fn is_code_line(&self, line: LineId) -> bool {
        self.line_tokens(line).any(|tok| self.token(tok).kind.is_code())
    }

    /// Iterator over the tokens owned by `line`, front to back.
    pub fn line_tokens(&self, line: LineId) -> LineTokens<'_> {
        LineTokens {
            list: self,
            line,
            cursor: self.line(line).front,
        }
    }

    pub fn line_token_count(&self, line: LineId) -> usize {
        self.line_tokens(line).count()
    }

    /// Token covering byte position `pos` within the line's text.
    pub fn token_at(&self, line: LineId, pos: u32) -> Option<TokenId> {
        self.line_tokens(line).find(|&tok| {
            let t = self.token(tok);
            t.start <= pos && pos < t.end
        })
    }

    /// Line-local index of `tok`, or `None` if it is not owned by `line`.
    pub fn token_pos(&self, line: LineId, tok: TokenId) -> Option<usize> {
        self.line_tokens(line).position(|cur| cur == tok)
    }

    /// Indexed lookup within a line; negative indexes count from the back.
    pub fn token_at_line_index(&self, line: LineId, idx: i32) -> Option<TokenId> {
        let count = self.line_token_count(line) as i32;
        let idx = if idx < 0 { count + idx } else { idx };
        if idx < 0 || idx >= count {
            return None;
        }
        self.line_tokens(line).nth(idx as usize)
    }

    /// First token of `kind` at or after byte position `search_from`;
    /// negative positions search backwards from the line end.
    pub fn find_token(&self, line: LineId, kind: TokenKind, search_from: i32) -> Option<TokenId> {
        if search_from < 0 {
            let tokens: Vec<_> = self.line_tokens(line).collect();
            tokens.into_iter().rev().find(|&tok| {
                let t = self.token(tok);
                t.kind == kind && search_from <= t.start as i32
            })
        } else {
            self.line_tokens(line).find(|&tok| {
                let t = self.token(tok);
                t.kind == kind && search_from <= t.start as i32
            })
        }
    }

    /// Document order of two tokens: by line, then by position within the
    /// line.  Both handles must be live.
    pub fn token_cmp(&self, a: TokenId, b: TokenId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let line_a = self.token(a).line;
        let line_b = self.token(b).line;
        if line_a != line_b {
            return self.line_nr(line_a).cmp(&self.line_nr(line_b));
        }
        self.token_pos(line_a, a).cmp(&self.token_pos(line_a, b))
    }

    pub fn first_code_token(&self, line: LineId) -> Option<TokenId> {
        self.line_tokens(line)
            .find(|&tok| self.token(tok).kind.is_code())
    }

    pub fn first_text_token(&self, line: LineId) -> Option<TokenId> {
        self.line_tokens(line)
            .find(|&tok| self.token(tok).kind.is_text())
    }

    /// Back token of the nearest previous line that has one.
    fn back_of_previous_line(&self, line: LineId) -> Option<TokenId> {
        let mut cursor = self.line(line).prev;
        while let Some(prev) = cursor {
            let slot = self.line(prev);
            if let Some(back) = slot.back {
                return Some(back);
            }
            cursor = slot.prev;
        }
        None
    }
}

/// See [`TokenList::line_tokens`].
pub struct LineTokens<'a> {
    list: &'a TokenList,
    line: LineId,
    cursor: Option<TokenId>,
}

impl Iterator for LineTokens<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<TokenId> {
        let tok = self.cursor?;
        let token = self.list.token(tok);
        if token.line != self.line {
            return None;
        }
        self.cursor = token.next;
        Some(tok)
    }
}
