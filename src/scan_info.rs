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

//! Per-line diagnostic annotations.
//!
//! A pure annotation store: no lexing behavior depends on these messages,
//! they are read back by hosts (highlighters, problem panes) and by the
//! persistence layer.

use crate::list::TokenId;

/// Message severity, ordered from least to most severe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Message,
    Warning,
    LookupError,
    IndentError,
    SyntaxError,
}

impl Severity {
    /// Stable name used by the persistence format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::Warning => "Warning",
            Self::LookupError => "LookupError",
            Self::IndentError => "IndentError",
            Self::SyntaxError => "SyntaxError",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Message" => Some(Self::Message),
            "Warning" => Some(Self::Warning),
            "LookupError" => Some(Self::LookupError),
            "IndentError" => Some(Self::IndentError),
            "SyntaxError" => Some(Self::SyntaxError),
            _ => None,
        }
    }
}

/// One diagnostic, keyed by the token it annotates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseMsg {
    message: String,
    token: TokenId,
    severity: Severity,
}

impl ParseMsg {
    pub(crate) fn new(message: String, token: TokenId, severity: Severity) -> Self {
        Self {
            message,
            token,
            severity,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn token(&self) -> TokenId {
        self.token
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Diagnostic store for one line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenScanInfo {
    msgs: Vec<ParseMsg>,
}

impl TokenScanInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parse_message(&mut self, token: TokenId, message: impl Into<String>, severity: Severity) {
        self.msgs.push(ParseMsg::new(message.into(), token, severity));
    }

    /// Messages attached to `token`, optionally restricted to one severity.
    pub fn parse_messages(&self, token: TokenId, filter: Option<Severity>) -> Vec<&ParseMsg> {
        self.msgs
            .iter()
            .filter(|msg| msg.token == token && filter.is_none_or(|sev| msg.severity == sev))
            .collect()
    }

    /// Drops messages attached to `token`, returning how many were removed.
    pub fn clear_parse_messages(&mut self, token: TokenId, filter: Option<Severity>) -> usize {
        let before = self.msgs.len();
        self.msgs
            .retain(|msg| msg.token != token || filter.is_some_and(|sev| msg.severity != sev));
        before - self.msgs.len()
    }

    pub fn all_messages(&self) -> &[ParseMsg] {
        &self.msgs
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::{Severity, TokenScanInfo};
    use crate::list::TokenId;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Message < Severity::Warning);
        assert!(Severity::Warning < Severity::LookupError);
        assert!(Severity::LookupError < Severity::IndentError);
        assert!(Severity::IndentError < Severity::SyntaxError);
    }

    #[test]
    fn test_severity_names() {
        for sev in [
            Severity::Message,
            Severity::Warning,
            Severity::LookupError,
            Severity::IndentError,
            Severity::SyntaxError,
        ] {
            assert_eq!(Severity::from_name(sev.as_str()), Some(sev));
        }
        assert_eq!(Severity::from_name("Issue"), None);
    }

    #[test]
    fn test_set_query_clear() {
        let tok_a = TokenId::for_tests(0);
        let tok_b = TokenId::for_tests(1);
        let mut info = TokenScanInfo::new();
        info.set_parse_message(tok_a, "unexpected indent", Severity::IndentError);
        info.set_parse_message(tok_a, "just so you know", Severity::Message);
        info.set_parse_message(tok_b, "bad char", Severity::SyntaxError);

        assert_eq!(info.all_messages().len(), 3);
        assert_eq!(info.parse_messages(tok_a, None).len(), 2);
        assert_eq!(
            info.parse_messages(tok_a, Some(Severity::IndentError))
                .len(),
            1
        );
        assert_eq!(info.parse_messages(tok_b, Some(Severity::Warning)).len(), 0);

        assert_eq!(info.clear_parse_messages(tok_a, None), 2);
        assert_eq!(info.all_messages().len(), 1);
        assert_eq!(info.clear_parse_messages(tok_b, Some(Severity::SyntaxError)), 1);
        assert!(info.is_empty());
    }
}
