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

//! The token kind taxonomy.
//!
//! Every kind carries an explicit [`Category`] tag answered by a `match`
//! rather than by the position of the variant, so adding a kind cannot
//! silently shift a category boundary.

use std::fmt::{Display, Formatter, Result as FmtResult};

use enum_iterator::Sequence;

/// Coarse classification of a [`TokenKind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Synthetic markers inserted by the lexer or a later analysis pass.
    Marker,
    /// Lexical or indentation errors represented as tokens.
    Error,
    Comment,
    Number,
    Literal,
    Keyword,
    Operator,
    Delimiter,
    Identifier,
}

/// Kind of a single lexical unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence)]
pub enum TokenKind {
    /// Not yet classified.
    Undetermined,
    /// Block indentation increased.
    Indent,
    /// Block indentation decreased, inserted at the end of the deeper line.
    Dedent,
    /// `#` to end of line.
    Comment,
    /// Unrecognized or version-gated input kept as a token.
    SyntaxError,
    /// Inconsistent indentation.
    IndentError,

    /// `0x1f`.
    NumberHex,
    /// `0b101`.
    NumberBinary,
    /// `0o17`, also bare `017` (python 2 octal).
    NumberOctal,
    NumberDecimal,
    NumberFloat,

    /// `"…"`.
    LiteralDblQuote,
    /// `'…'`.
    LiteralSglQuote,
    /// `"""…"""`, may span lines.
    LiteralBlockDblQuote,
    /// `'''…'''`, may span lines.
    LiteralBlockSglQuote,

    /// Reserved word without dedicated handling (`pass`, `lambda`, …).
    Keyword,
    KeywordClass,
    KeywordDef,
    KeywordImport,
    KeywordFrom,
    KeywordAs,
    KeywordYield,
    KeywordReturn,
    KeywordIf,
    KeywordElIf,
    KeywordElse,
    KeywordFor,
    KeywordWhile,
    KeywordBreak,
    KeywordContinue,
    KeywordTry,
    KeywordExcept,
    KeywordFinally,

    // arithmetic
    OperatorPlus,
    OperatorMinus,
    OperatorMul,
    /// `**`.
    OperatorExponential,
    OperatorDiv,
    /// `//`.
    OperatorFloorDiv,
    /// `%`.
    OperatorModulo,
    /// `@` as an operator (3.5+).
    OperatorMatrixMul,

    // bitwise
    OperatorBitShiftLeft,
    OperatorBitShiftRight,
    OperatorBitAnd,
    OperatorBitOr,
    OperatorBitXor,
    OperatorBitNot,

    // assignment
    OperatorEqual,
    /// `:=` (3.8+).
    OperatorWalrus,
    OperatorPlusEqual,
    OperatorMinusEqual,
    OperatorMulEqual,
    OperatorDivEqual,
    OperatorModuloEqual,
    OperatorFloorDivEqual,
    OperatorExpoEqual,
    /// `@=` (3.5+).
    OperatorMatrixMulEqual,

    // assignment, bitwise
    OperatorBitAndEqual,
    OperatorBitOrEqual,
    OperatorBitXorEqual,
    OperatorBitNotEqual,
    OperatorBitShiftRightEqual,
    OperatorBitShiftLeftEqual,

    // compare
    OperatorCompareEqual,
    OperatorNotEqual,
    OperatorLessEqual,
    OperatorMoreEqual,
    OperatorLess,
    OperatorMore,
    /// `and`.
    OperatorAnd,
    /// `or`.
    OperatorOr,
    /// `!` or `not`.
    OperatorNot,
    /// `is`.
    OperatorIs,
    /// `in`.
    OperatorIn,

    /// `*` before a parameter name, as in `def f(*args)`.
    OperatorVariableParam,
    /// `**` before a parameter name, as in `def f(**kwargs)`.
    OperatorKeyWordParam,

    /// Any delimiter without dedicated handling.
    Delimiter,
    DelimiterOpenParen,
    DelimiterCloseParen,
    DelimiterOpenBracket,
    DelimiterCloseBracket,
    DelimiterOpenBrace,
    DelimiterCloseBrace,
    DelimiterPeriod,
    DelimiterComma,
    DelimiterColon,
    DelimiterSemiColon,
    /// `...`.
    DelimiterEllipsis,
    /// `->` in a function signature.
    DelimiterMetaData,
    /// `\` escaping the line end.
    DelimiterBackSlash,
    /// End of a code line.
    DelimiterNewLine,

    /// Name not yet resolved by any analysis pass.
    IdentifierUnknown,
    /// Name known to be bound in the current context.
    IdentifierDefined,
    /// `self`.
    IdentifierSelf,
    /// Name found in the builtins table.
    IdentifierBuiltin,
    /// Module name after `import`.
    IdentifierModule,
    /// Package name after `from`.
    IdentifierModulePackage,
    /// Alias after `import … as`.
    IdentifierModuleAlias,
    /// `*` in `from mod import *`.
    IdentifierModuleGlob,
    /// Name defined by a top level `def`.
    IdentifierFunction,
    /// Name defined by a `def` inside a class.
    IdentifierMethod,
    /// Name defined by `class`.
    IdentifierClass,
    /// Dunder method name, `__init__` and friends.
    IdentifierSuperMethod,
    /// `@property` and friends.
    IdentifierDecorator,
    /// Name after `def` before method/function is decided.
    IdentifierDefUnknown,
    /// `None`.
    IdentifierNone,
    /// `True`.
    IdentifierTrue,
    /// `False`.
    IdentifierFalse,
    /// Name that could not be bound at all.
    IdentifierInvalid,

    /// Start of an indented block, inserted by an analysis pass.
    BlockStart,
    /// End of an indented block, inserted by an analysis pass.
    BlockEnd,
    Invalid,
}

impl TokenKind {
    pub fn category(self) -> Category {
        use TokenKind::*;
        match self {
            Undetermined | Indent | Dedent | BlockStart | BlockEnd | Invalid => Category::Marker,
            SyntaxError | IndentError => Category::Error,
            Comment => Category::Comment,
            NumberHex | NumberBinary | NumberOctal | NumberDecimal | NumberFloat => {
                Category::Number
            }
            LiteralDblQuote | LiteralSglQuote | LiteralBlockDblQuote | LiteralBlockSglQuote => {
                Category::Literal
            }
            Keyword | KeywordClass | KeywordDef | KeywordImport | KeywordFrom | KeywordAs
            | KeywordYield | KeywordReturn | KeywordIf | KeywordElIf | KeywordElse | KeywordFor
            | KeywordWhile | KeywordBreak | KeywordContinue | KeywordTry | KeywordExcept
            | KeywordFinally => Category::Keyword,
            OperatorPlus | OperatorMinus | OperatorMul | OperatorExponential | OperatorDiv
            | OperatorFloorDiv | OperatorModulo | OperatorMatrixMul | OperatorBitShiftLeft
            | OperatorBitShiftRight | OperatorBitAnd | OperatorBitOr | OperatorBitXor
            | OperatorBitNot | OperatorEqual | OperatorWalrus | OperatorPlusEqual
            | OperatorMinusEqual | OperatorMulEqual | OperatorDivEqual | OperatorModuloEqual
            | OperatorFloorDivEqual | OperatorExpoEqual | OperatorMatrixMulEqual
            | OperatorBitAndEqual | OperatorBitOrEqual | OperatorBitXorEqual
            | OperatorBitNotEqual | OperatorBitShiftRightEqual | OperatorBitShiftLeftEqual
            | OperatorCompareEqual | OperatorNotEqual | OperatorLessEqual | OperatorMoreEqual
            | OperatorLess | OperatorMore | OperatorAnd | OperatorOr | OperatorNot
            | OperatorIs | OperatorIn | OperatorVariableParam | OperatorKeyWordParam => {
                Category::Operator
            }
            Delimiter | DelimiterOpenParen | DelimiterCloseParen | DelimiterOpenBracket
            | DelimiterCloseBracket | DelimiterOpenBrace | DelimiterCloseBrace
            | DelimiterPeriod | DelimiterComma | DelimiterColon | DelimiterSemiColon
            | DelimiterEllipsis | DelimiterMetaData | DelimiterBackSlash | DelimiterNewLine => {
                Category::Delimiter
            }
            IdentifierUnknown | IdentifierDefined | IdentifierSelf | IdentifierBuiltin
            | IdentifierModule | IdentifierModulePackage | IdentifierModuleAlias
            | IdentifierModuleGlob | IdentifierFunction | IdentifierMethod | IdentifierClass
            | IdentifierSuperMethod | IdentifierDecorator | IdentifierDefUnknown
            | IdentifierNone | IdentifierTrue | IdentifierFalse | IdentifierInvalid => {
                Category::Identifier
            }
        }
    }

    pub fn is_number(self) -> bool {
        self.category() == Category::Number
    }

    pub fn is_int(self) -> bool {
        self.is_number() && self != Self::NumberFloat
    }

    pub fn is_float(self) -> bool {
        self == Self::NumberFloat
    }

    pub fn is_string(self) -> bool {
        self.category() == Category::Literal
    }

    pub fn is_multiline_string(self) -> bool {
        matches!(self, Self::LiteralBlockDblQuote | Self::LiteralBlockSglQuote)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, Self::IdentifierTrue | Self::IdentifierFalse)
    }

    pub fn is_keyword(self) -> bool {
        self.category() == Category::Keyword
    }

    pub fn is_operator(self) -> bool {
        self.category() == Category::Operator
    }

    pub fn is_operator_arithmetic(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OperatorPlus
                | OperatorMinus
                | OperatorMul
                | OperatorExponential
                | OperatorDiv
                | OperatorFloorDiv
                | OperatorModulo
                | OperatorMatrixMul
        )
    }

    pub fn is_operator_bitwise(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OperatorBitShiftLeft
                | OperatorBitShiftRight
                | OperatorBitAnd
                | OperatorBitOr
                | OperatorBitXor
                | OperatorBitNot
        )
    }

    pub fn is_operator_assignment(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OperatorEqual
                | OperatorWalrus
                | OperatorPlusEqual
                | OperatorMinusEqual
                | OperatorMulEqual
                | OperatorDivEqual
                | OperatorModuloEqual
                | OperatorFloorDivEqual
                | OperatorExpoEqual
                | OperatorMatrixMulEqual
        ) || self.is_operator_assignment_bitwise()
    }

    pub fn is_operator_assignment_bitwise(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OperatorBitAndEqual
                | OperatorBitOrEqual
                | OperatorBitXorEqual
                | OperatorBitNotEqual
                | OperatorBitShiftRightEqual
                | OperatorBitShiftLeftEqual
        )
    }

    pub fn is_operator_compare(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OperatorCompareEqual
                | OperatorNotEqual
                | OperatorLessEqual
                | OperatorMoreEqual
                | OperatorLess
                | OperatorMore
        ) || self.is_operator_compare_keyword()
    }

    pub fn is_operator_compare_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            OperatorAnd | OperatorOr | OperatorNot | OperatorIs | OperatorIn
        )
    }

    pub fn is_operator_param(self) -> bool {
        matches!(self, Self::OperatorVariableParam | Self::OperatorKeyWordParam)
    }

    pub fn is_delimiter(self) -> bool {
        self.category() == Category::Delimiter
    }

    pub fn is_identifier(self) -> bool {
        self.category() == Category::Identifier
    }

    pub fn is_identifier_variable(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IdentifierUnknown | IdentifierDefined | IdentifierSelf | IdentifierBuiltin
        )
    }

    pub fn is_identifier_import(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IdentifierModule | IdentifierModulePackage | IdentifierModuleAlias
                | IdentifierModuleGlob
        )
    }

    pub fn is_identifier_declaration(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IdentifierFunction
                | IdentifierMethod
                | IdentifierClass
                | IdentifierSuperMethod
                | IdentifierDecorator
                | IdentifierDefUnknown
                | IdentifierNone
                | IdentifierTrue
                | IdentifierFalse
                | IdentifierInvalid
        )
    }

    /// True for tokens that carry program text, as opposed to layout markers,
    /// comments and line plumbing.
    pub fn is_code(self) -> bool {
        match self.category() {
            Category::Number
            | Category::Literal
            | Category::Keyword
            | Category::Operator
            | Category::Identifier => true,
            Category::Delimiter => {
                !matches!(self, Self::DelimiterBackSlash | Self::DelimiterNewLine)
            }
            Category::Marker | Category::Error | Category::Comment => false,
        }
    }

    /// Like [`is_code`](Self::is_code) but comments count too.
    pub fn is_text(self) -> bool {
        self == Self::Comment || self.is_code()
    }

    /// Stable name used by the persistence format.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Undetermined => "Undetermined",
            Indent => "Indent",
            Dedent => "Dedent",
            Comment => "Comment",
            SyntaxError => "SyntaxError",
            IndentError => "IndentError",
            NumberHex => "NumberHex",
            NumberBinary => "NumberBinary",
            NumberOctal => "NumberOctal",
            NumberDecimal => "NumberDecimal",
            NumberFloat => "NumberFloat",
            LiteralDblQuote => "LiteralDblQuote",
            LiteralSglQuote => "LiteralSglQuote",
            LiteralBlockDblQuote => "LiteralBlockDblQuote",
            LiteralBlockSglQuote => "LiteralBlockSglQuote",
            Keyword => "Keyword",
            KeywordClass => "KeywordClass",
            KeywordDef => "KeywordDef",
            KeywordImport => "KeywordImport",
            KeywordFrom => "KeywordFrom",
            KeywordAs => "KeywordAs",
            KeywordYield => "KeywordYield",
            KeywordReturn => "KeywordReturn",
            KeywordIf => "KeywordIf",
            KeywordElIf => "KeywordElIf",
            KeywordElse => "KeywordElse",
            KeywordFor => "KeywordFor",
            KeywordWhile => "KeywordWhile",
            KeywordBreak => "KeywordBreak",
            KeywordContinue => "KeywordContinue",
            KeywordTry => "KeywordTry",
            KeywordExcept => "KeywordExcept",
            KeywordFinally => "KeywordFinally",
            OperatorPlus => "OperatorPlus",
            OperatorMinus => "OperatorMinus",
            OperatorMul => "OperatorMul",
            OperatorExponential => "OperatorExponential",
            OperatorDiv => "OperatorDiv",
            OperatorFloorDiv => "OperatorFloorDiv",
            OperatorModulo => "OperatorModulo",
            OperatorMatrixMul => "OperatorMatrixMul",
            OperatorBitShiftLeft => "OperatorBitShiftLeft",
            OperatorBitShiftRight => "OperatorBitShiftRight",
            OperatorBitAnd => "OperatorBitAnd",
            OperatorBitOr => "OperatorBitOr",
            OperatorBitXor => "OperatorBitXor",
            OperatorBitNot => "OperatorBitNot",
            OperatorEqual => "OperatorEqual",
            OperatorWalrus => "OperatorWalrus",
            OperatorPlusEqual => "OperatorPlusEqual",
            OperatorMinusEqual => "OperatorMinusEqual",
            OperatorMulEqual => "OperatorMulEqual",
            OperatorDivEqual => "OperatorDivEqual",
            OperatorModuloEqual => "OperatorModuloEqual",
            OperatorFloorDivEqual => "OperatorFloorDivEqual",
            OperatorExpoEqual => "OperatorExpoEqual",
            OperatorMatrixMulEqual => "OperatorMatrixMulEqual",
            OperatorBitAndEqual => "OperatorBitAndEqual",
            OperatorBitOrEqual => "OperatorBitOrEqual",
            OperatorBitXorEqual => "OperatorBitXorEqual",
            OperatorBitNotEqual => "OperatorBitNotEqual",
            OperatorBitShiftRightEqual => "OperatorBitShiftRightEqual",
            OperatorBitShiftLeftEqual => "OperatorBitShiftLeftEqual",
            OperatorCompareEqual => "OperatorCompareEqual",
            OperatorNotEqual => "OperatorNotEqual",
            OperatorLessEqual => "OperatorLessEqual",
            OperatorMoreEqual => "OperatorMoreEqual",
            OperatorLess => "OperatorLess",
            OperatorMore => "OperatorMore",
            OperatorAnd => "OperatorAnd",
            OperatorOr => "OperatorOr",
            OperatorNot => "OperatorNot",
            OperatorIs => "OperatorIs",
            OperatorIn => "OperatorIn",
            OperatorVariableParam => "OperatorVariableParam",
            OperatorKeyWordParam => "OperatorKeyWordParam",
            Delimiter => "Delimiter",
            DelimiterOpenParen => "DelimiterOpenParen",
            DelimiterCloseParen => "DelimiterCloseParen",
            DelimiterOpenBracket => "DelimiterOpenBracket",
            DelimiterCloseBracket => "DelimiterCloseBracket",
            DelimiterOpenBrace => "DelimiterOpenBrace",
            DelimiterCloseBrace => "DelimiterCloseBrace",
            DelimiterPeriod => "DelimiterPeriod",
            DelimiterComma => "DelimiterComma",
            DelimiterColon => "DelimiterColon",
            DelimiterSemiColon => "DelimiterSemiColon",
            DelimiterEllipsis => "DelimiterEllipsis",
            DelimiterMetaData => "DelimiterMetaData",
            DelimiterBackSlash => "DelimiterBackSlash",
            DelimiterNewLine => "DelimiterNewLine",
            IdentifierUnknown => "IdentifierUnknown",
            IdentifierDefined => "IdentifierDefined",
            IdentifierSelf => "IdentifierSelf",
            IdentifierBuiltin => "IdentifierBuiltin",
            IdentifierModule => "IdentifierModule",
            IdentifierModulePackage => "IdentifierModulePackage",
            IdentifierModuleAlias => "IdentifierModuleAlias",
            IdentifierModuleGlob => "IdentifierModuleGlob",
            IdentifierFunction => "IdentifierFunction",
            IdentifierMethod => "IdentifierMethod",
            IdentifierClass => "IdentifierClass",
            IdentifierSuperMethod => "IdentifierSuperMethod",
            IdentifierDecorator => "IdentifierDecorator",
            IdentifierDefUnknown => "IdentifierDefUnknown",
            IdentifierNone => "IdentifierNone",
            IdentifierTrue => "IdentifierTrue",
            IdentifierFalse => "IdentifierFalse",
            IdentifierInvalid => "IdentifierInvalid",
            BlockStart => "BlockStart",
            BlockEnd => "BlockEnd",
            Invalid => "Invalid",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn from_name(name: &str) -> Option<Self> {
        enum_iterator::all::<Self>().find(|kind| kind.as_str() == name)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod test {
    use enum_iterator::all;

    use super::{Category, TokenKind};

    #[test]
    fn test_name_round_trip() {
        for kind in all::<TokenKind>() {
            assert_eq!(TokenKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TokenKind::from_name("NoSuchKind"), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::KeywordDef.category(), Category::Keyword);
        assert_eq!(TokenKind::OperatorWalrus.category(), Category::Operator);
        assert_eq!(TokenKind::IdentifierModuleGlob.category(), Category::Identifier);
        assert_eq!(TokenKind::Dedent.category(), Category::Marker);
        assert_eq!(TokenKind::SyntaxError.category(), Category::Error);
    }

    #[test]
    fn test_predicates() {
        assert!(TokenKind::NumberHex.is_int());
        assert!(!TokenKind::NumberFloat.is_int());
        assert!(TokenKind::NumberFloat.is_number());
        assert!(TokenKind::LiteralBlockSglQuote.is_multiline_string());
        assert!(!TokenKind::LiteralSglQuote.is_multiline_string());
        assert!(TokenKind::OperatorWalrus.is_operator_assignment());
        assert!(TokenKind::OperatorIn.is_operator_compare_keyword());
        assert!(TokenKind::OperatorIn.is_operator_compare());
        assert!(TokenKind::OperatorKeyWordParam.is_operator_param());
        assert!(TokenKind::IdentifierSelf.is_identifier_variable());
        assert!(TokenKind::IdentifierModuleAlias.is_identifier_import());
        assert!(TokenKind::IdentifierTrue.is_identifier_declaration());
        assert!(TokenKind::IdentifierTrue.is_boolean());
    }

    #[test]
    fn test_is_code() {
        assert!(TokenKind::IdentifierUnknown.is_code());
        assert!(TokenKind::DelimiterColon.is_code());
        assert!(TokenKind::LiteralBlockDblQuote.is_code());
        assert!(!TokenKind::DelimiterNewLine.is_code());
        assert!(!TokenKind::DelimiterBackSlash.is_code());
        assert!(!TokenKind::Comment.is_code());
        assert!(!TokenKind::Indent.is_code());
        assert!(!TokenKind::Dedent.is_code());
        assert!(TokenKind::Comment.is_text());
        assert!(!TokenKind::DelimiterNewLine.is_text());
    }
}
