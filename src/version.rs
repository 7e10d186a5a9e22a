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

//! Python grammar versions and the lexical features they enable.

use std::fmt::{Display, Formatter, Result as FmtResult};

use enum_iterator::Sequence;

/// A Python grammar version.
///
/// Selects the keyword set and gates version-specific lexical syntax such as
/// the walrus operator.  [`Version::Latest`] behaves as the newest supported
/// 3.x release.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Version {
    V2_6,
    V2_7,
    V3_0,
    V3_1,
    V3_2,
    V3_3,
    V3_4,
    V3_5,
    V3_6,
    V3_7,
    V3_8,
    V3_9,
    #[default]
    Latest,
}

impl Version {
    /// Looks up the version for a `major.minor` pair.
    pub fn from_parts(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (2, 6) => Some(Self::V2_6),
            (2, 7) => Some(Self::V2_7),
            (3, 0) => Some(Self::V3_0),
            (3, 1) => Some(Self::V3_1),
            (3, 2) => Some(Self::V3_2),
            (3, 3) => Some(Self::V3_3),
            (3, 4) => Some(Self::V3_4),
            (3, 5) => Some(Self::V3_5),
            (3, 6) => Some(Self::V3_6),
            (3, 7) => Some(Self::V3_7),
            (3, 8) => Some(Self::V3_8),
            (3, 9) => Some(Self::V3_9),
            _ => None,
        }
    }

    pub fn major(self) -> u8 {
        match self {
            Self::V2_6 | Self::V2_7 => 2,
            _ => 3,
        }
    }

    pub fn minor(self) -> u8 {
        match self {
            Self::V2_6 => 6,
            Self::V2_7 => 7,
            Self::V3_0 => 0,
            Self::V3_1 => 1,
            Self::V3_2 => 2,
            Self::V3_3 => 3,
            Self::V3_4 => 4,
            Self::V3_5 => 5,
            Self::V3_6 => 6,
            Self::V3_7 => 7,
            Self::V3_8 => 8,
            Self::V3_9 | Self::Latest => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2_6 => "2.6",
            Self::V2_7 => "2.7",
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
            Self::V3_2 => "3.2",
            Self::V3_3 => "3.3",
            Self::V3_4 => "3.4",
            Self::V3_5 => "3.5",
            Self::V3_6 => "3.6",
            Self::V3_7 => "3.7",
            Self::V3_8 => "3.8",
            Self::V3_9 => "3.9",
            Self::Latest => "Latest",
        }
    }

    /// All selectable versions with their renderings.
    pub fn available() -> Vec<(Self, &'static str)> {
        enum_iterator::all::<Self>().map(|v| (v, v.as_str())).collect()
    }

    /// `:=` was introduced in 3.8.
    pub fn has_walrus(self) -> bool {
        self >= Self::V3_8
    }

    /// `@=` (matrix multiplication assignment) was introduced in 3.5.
    pub fn has_matrix_mul_assign(self) -> bool {
        self >= Self::V3_5
    }

    /// `async`/`await` became reserved keywords in 3.7.
    pub fn has_async_await(self) -> bool {
        self >= Self::V3_7
    }

    /// Python 3 identifiers may contain non-ASCII letters.
    pub fn has_unicode_identifiers(self) -> bool {
        self >= Self::V3_0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::Version;

    #[test]
    fn test_ordering_and_gates() {
        assert!(Version::V2_7 < Version::V3_0);
        assert!(Version::V3_9 < Version::Latest);
        assert!(Version::Latest.has_walrus());
        assert!(Version::V3_8.has_walrus());
        assert!(!Version::V3_7.has_walrus());
        assert!(Version::V3_5.has_matrix_mul_assign());
        assert!(!Version::V3_4.has_matrix_mul_assign());
        assert!(!Version::V2_7.has_unicode_identifiers());
    }

    #[test]
    fn test_parts() {
        assert_eq!(Version::from_parts(3, 8), Some(Version::V3_8));
        assert_eq!(Version::from_parts(2, 5), None);
        assert_eq!(Version::Latest.major(), 3);
        assert_eq!(Version::Latest.minor(), 9);
        assert_eq!(Version::V2_6.to_string(), "2.6");
        assert_eq!(Version::Latest.to_string(), "Latest");
    }

    #[test]
    fn test_available_lists_all() {
        let all = Version::available();
        assert_eq!(all.len(), 13);
        assert_eq!(all.first(), Some(&(Version::V2_6, "2.6")));
        assert_eq!(all.last(), Some(&(Version::Latest, "Latest")));
    }
}
