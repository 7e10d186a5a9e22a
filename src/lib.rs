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

//! An incremental lexer for Python source code.
//!
//! Unlike a batch tokenizer, [`Lexer`] keeps its output in a
//! [`TokenList`]: a doubly linked structure of [`TokenLine`]s and
//! [`Token`]s that a host (an editor, a highlighter) can hold handles
//! into while single lines are swapped out and rescanned.  Only block
//! string state carries across line boundaries, so editing one line
//! means retokenizing one line.
//!
//! The accepted grammar is gated by a Python [`Version`]: keyword sets,
//! the walrus and matrix-multiplication operators, and non-ASCII
//! identifiers all follow the selected version.
//!
//! [`LexerPersistent`] serializes a lexed list to a line-oriented text
//! format and rebuilds it without rescanning.

mod arena;
pub mod lexer;
pub mod list;
pub mod persist;
pub mod scan_info;
pub mod token;
pub mod version;

pub use lexer::Lexer;
pub use list::{LineId, Token, TokenId, TokenLine, TokenList, TokenObserver};
pub use persist::{LexerPersistent, PersistError};
pub use scan_info::{ParseMsg, Severity, TokenScanInfo};
pub use token::{Category, TokenKind};
pub use version::Version;
