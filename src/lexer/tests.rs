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

use super::Lexer;
use crate::list::TokenLine;
use crate::scan_info::Severity;
use crate::token::TokenKind::{self, *};
use crate::version::Version;

fn lex(lines: &[&str]) -> Lexer {
    lex_with(Lexer::new(), lines)
}

fn lex_with(mut lexer: Lexer, lines: &[&str]) -> Lexer {
    for text in lines {
        let id = lexer.list_mut().append_line(TokenLine::new(text));
        lexer.tokenize(id);
    }
    lexer
}

fn line_kinds(lexer: &Lexer, nr: i32) -> Vec<TokenKind> {
    let list = lexer.list();
    let line = list.line_at(nr).expect("line number out of range");
    list.line_tokens(line)
        .map(|tok| list.token(tok).kind())
        .collect()
}

fn line_texts(lexer: &Lexer, nr: i32) -> Vec<String> {
    let list = lexer.list();
    let line = list.line_at(nr).expect("line number out of range");
    list.line_tokens(line)
        .map(|tok| list.token_text(tok).to_string())
        .collect()
}

// a cut down FreeCAD macro, small but touches most of the scanner
const COIN_SOURCE: &[&str] = &[
    "class test(): # comment",
    "    def stringencodecoin(ustr):",
    "        \"\"\"stringencodecoin(str): Encodes a unicode object to be used as a string in coin\"\"\"",
    "        try:",
    "            from pivy import coin",
    "            coin4 = coin.COIN_MAJOR_VERSION >= 4",
    "        except (ImportError, AttributeError):",
    "            coin4 = False",
    "",
    "        if coin4:",
    "            return ustr.encode('utf-8')",
    "        else:",
    "            # comment 2",
    "            return ustr.encode('latin1')",
];

#[test]
fn test_coin_source_token_kinds() {
    let lexer = lex(COIN_SOURCE);
    assert_eq!(lexer.list().line_count(), 14);

    let expected: &[&[TokenKind]] = &[
        &[
            KeywordClass, IdentifierClass, DelimiterOpenParen, DelimiterCloseParen,
            DelimiterColon, Comment, DelimiterNewLine,
        ],
        &[
            Indent, KeywordDef, IdentifierDefUnknown, DelimiterOpenParen,
            IdentifierUnknown, DelimiterCloseParen, DelimiterColon, DelimiterNewLine,
        ],
        &[Indent, LiteralBlockDblQuote, DelimiterNewLine],
        &[KeywordTry, DelimiterColon, DelimiterNewLine],
        &[
            Indent, KeywordFrom, IdentifierModulePackage, KeywordImport,
            IdentifierModule, DelimiterNewLine,
        ],
        &[
            IdentifierUnknown, OperatorEqual, IdentifierUnknown, DelimiterPeriod,
            IdentifierUnknown, OperatorMoreEqual, NumberDecimal, DelimiterNewLine,
            Dedent,
        ],
        &[
            KeywordExcept, DelimiterOpenParen, IdentifierBuiltin, DelimiterComma,
            IdentifierBuiltin, DelimiterCloseParen, DelimiterColon, DelimiterNewLine,
        ],
        &[
            Indent, IdentifierUnknown, OperatorEqual, IdentifierFalse,
            DelimiterNewLine, Dedent,
        ],
        &[],
        &[KeywordIf, IdentifierUnknown, DelimiterColon, DelimiterNewLine],
        &[
            Indent, KeywordReturn, IdentifierUnknown, DelimiterPeriod,
            IdentifierUnknown, DelimiterOpenParen, LiteralSglQuote,
            DelimiterCloseParen, DelimiterNewLine, Dedent,
        ],
        &[KeywordElse, DelimiterColon, DelimiterNewLine],
        &[Comment],
        &[
            Indent, KeywordReturn, IdentifierUnknown, DelimiterPeriod,
            IdentifierUnknown, DelimiterOpenParen, LiteralSglQuote,
            DelimiterCloseParen, DelimiterNewLine,
        ],
    ];

    for (nr, kinds) in expected.iter().enumerate() {
        assert_eq!(
            line_kinds(&lexer, nr as i32).as_slice(),
            *kinds,
            "token kinds differ on line {nr}"
        );
    }
}

#[test]
fn test_coin_source_indents() {
    let lexer = lex(COIN_SOURCE);
    let expected: &[u16] = &[0, 4, 8, 8, 12, 12, 8, 12, 0, 8, 12, 8, 12, 12];
    for (nr, &indent) in expected.iter().enumerate() {
        let line = lexer.list().line_at(nr as i32).unwrap();
        assert_eq!(
            lexer.list().line(line).indent(),
            indent,
            "indent differs on line {nr}"
        );
    }
}

#[test]
fn test_class_header_texts() {
    let lexer = lex(&["class test(): # comment"]);
    assert_eq!(
        line_texts(&lexer, 0),
        ["class", "test", "(", ")", ":", "# comment", "\n"]
    );
}

#[test]
fn test_assign_vs_compare() {
    let lexer = lex(&["v = 0", "v == 1"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [IdentifierUnknown, OperatorEqual, NumberDecimal, DelimiterNewLine]
    );
    assert_eq!(
        line_kinds(&lexer, 1),
        [IdentifierUnknown, OperatorCompareEqual, NumberDecimal, DelimiterNewLine]
    );
}

#[test]
fn test_walrus_is_version_gated() {
    let lexer = lex(&["v := 21"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [IdentifierUnknown, OperatorWalrus, NumberDecimal, DelimiterNewLine]
    );

    let lexer = lex_with(Lexer::with_version(Version::V3_7), &["v := 21"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [IdentifierUnknown, SyntaxError, NumberDecimal, DelimiterNewLine]
    );
}

#[test]
fn test_matrix_mul_assign_is_version_gated() {
    let lexer = lex(&["a @= b"]);
    assert_eq!(line_kinds(&lexer, 0)[1], OperatorMatrixMulEqual);

    let lexer = lex_with(Lexer::with_version(Version::V3_4), &["a @= b"]);
    assert_eq!(line_kinds(&lexer, 0)[1], SyntaxError);
}

#[test]
fn test_decorator() {
    let lexer = lex(&["@staticmethod"]);
    assert_eq!(line_kinds(&lexer, 0), [IdentifierDecorator, DelimiterNewLine]);
    assert_eq!(line_texts(&lexer, 0)[0], "@staticmethod");
}

#[test]
fn test_async_keyword_since_3_7() {
    let lexer = lex(&["async def f():"]);
    assert_eq!(line_kinds(&lexer, 0)[0], Keyword);

    let lexer = lex_with(Lexer::with_version(Version::V3_6), &["async def f():"]);
    assert_eq!(line_kinds(&lexer, 0)[0], IdentifierUnknown);
}

#[test]
fn test_params_vs_mul() {
    let lexer = lex(&["def f(*args, **kwargs):", "a = b * c ** d"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [
            KeywordDef, IdentifierFunction, DelimiterOpenParen,
            OperatorVariableParam, IdentifierUnknown, DelimiterComma,
            OperatorKeyWordParam, IdentifierUnknown, DelimiterCloseParen,
            DelimiterColon, DelimiterNewLine,
        ]
    );
    assert_eq!(
        line_kinds(&lexer, 1),
        [
            IdentifierUnknown, OperatorEqual, IdentifierUnknown, OperatorMul,
            IdentifierUnknown, OperatorExponential, IdentifierUnknown,
            DelimiterNewLine,
        ]
    );
}

#[test]
fn test_import_forms() {
    let lexer = lex(&["import sys", "from os import path as p", "from os import *"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [KeywordImport, IdentifierModule, DelimiterNewLine]
    );
    assert_eq!(
        line_kinds(&lexer, 1),
        [
            KeywordFrom, IdentifierModulePackage, KeywordImport,
            IdentifierModule, KeywordAs, IdentifierModuleAlias, DelimiterNewLine,
        ]
    );
    assert_eq!(
        line_kinds(&lexer, 2),
        [
            KeywordFrom, IdentifierModulePackage, KeywordImport,
            IdentifierModuleGlob, DelimiterNewLine,
        ]
    );
}

#[test]
fn test_number_kinds() {
    let lexer = lex(&["a = 0x1f + 0b101 + 0o17 + 017 + 1.5 + 42"]);
    let kinds = line_kinds(&lexer, 0);
    let numbers: Vec<TokenKind> = kinds.into_iter().filter(|k| k.is_number()).collect();
    assert_eq!(
        numbers,
        [NumberHex, NumberBinary, NumberOctal, NumberOctal, NumberFloat, NumberDecimal]
    );
}

#[test]
fn test_number_suffixes() {
    // py2 long and imaginary suffixes belong to the number token
    let lexer = lex(&["a = 10L", "b = 3j + 1"]);
    assert_eq!(line_texts(&lexer, 0)[2], "10L");
    assert_eq!(line_kinds(&lexer, 0)[2], NumberDecimal);
    assert_eq!(line_texts(&lexer, 1)[2], "3j");
    assert_eq!(line_kinds(&lexer, 1)[2], NumberDecimal);
    assert_eq!(line_texts(&lexer, 1)[4], "1");
}

#[test]
fn test_cr_terminated_line_lexes_like_lf() {
    let lexer = lex(&["a = 1\r\n", "b = 2\n"]);
    let list = lexer.list();
    let line = list.line_at(0).unwrap();
    assert_eq!(list.line(line).text(), "a = 1\n");
    assert_eq!(
        line_kinds(&lexer, 0),
        line_kinds(&lexer, 1),
    );
    let newline = list.line(line).back().unwrap();
    assert_eq!(list.token(newline).kind(), DelimiterNewLine);
    assert_eq!(list.token(newline).end_pos(), 6);
}

#[test]
fn test_string_prefixes() {
    let lexer = lex(&["a = r'raw'", "b = rb'both'"]);
    assert_eq!(line_kinds(&lexer, 0)[2], LiteralSglQuote);
    assert_eq!(line_texts(&lexer, 0)[2], "r'raw'");
    assert_eq!(line_kinds(&lexer, 1)[2], LiteralSglQuote);
    assert_eq!(line_texts(&lexer, 1)[2], "rb'both'");
}

#[test]
fn test_block_string_spans_lines() {
    let lexer = lex(&["s = \"\"\"first", "second line", "closing\"\"\"", "x = 1"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [IdentifierUnknown, OperatorEqual, LiteralBlockDblQuote]
    );
    assert_eq!(line_kinds(&lexer, 1), [LiteralBlockDblQuote]);
    assert_eq!(line_kinds(&lexer, 2), [LiteralBlockDblQuote, DelimiterNewLine]);
    assert_eq!(
        line_kinds(&lexer, 3),
        [IdentifierUnknown, OperatorEqual, NumberDecimal, DelimiterNewLine]
    );
}

#[test]
fn test_builtin_shadowed_after_period() {
    let lexer = lex(&["print('x')", "obj.print()"]);
    assert_eq!(line_kinds(&lexer, 0)[0], IdentifierBuiltin);
    assert_eq!(line_kinds(&lexer, 1)[2], IdentifierUnknown);
}

#[test]
fn test_py2_print_is_keyword() {
    let lexer = lex_with(Lexer::with_version(Version::V2_7), &["print 'hello'"]);
    assert_eq!(line_kinds(&lexer, 0), [Keyword, LiteralSglQuote, DelimiterNewLine]);
}

#[test]
fn test_non_ascii_identifiers_need_py3() {
    let lexer = lex(&["ä = 1"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [IdentifierUnknown, OperatorEqual, NumberDecimal, DelimiterNewLine]
    );

    let lexer = lex_with(Lexer::with_version(Version::V2_7), &["ä = 1"]);
    let kinds = line_kinds(&lexer, 0);
    assert_eq!(kinds[0], SyntaxError);
    assert_eq!(kinds[1], SyntaxError);
    let line = lexer.list().line_at(0).unwrap();
    let info = lexer.list().line(line).scan_info().unwrap();
    assert_eq!(info.all_messages().len(), 2);
    assert_eq!(info.all_messages()[0].severity(), Severity::SyntaxError);
}

#[test]
fn test_backslash_continuation() {
    let lexer = lex(&["a = 1 + \\", "    2"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [
            IdentifierUnknown, OperatorEqual, NumberDecimal, OperatorPlus,
            DelimiterBackSlash,
        ]
    );
    // continued lines get neither an Indent token nor an indent error
    assert_eq!(line_kinds(&lexer, 1), [NumberDecimal, DelimiterNewLine]);
    let line = lexer.list().line_at(1).unwrap();
    assert!(lexer.list().line(line).is_continuation());
}

#[test]
fn test_bracket_continuation() {
    let lexer = lex(&["a = f(1,", "      2)"]);
    let line = lexer.list().line_at(1).unwrap();
    assert!(lexer.list().line(line).is_continuation());
    assert_eq!(line_kinds(&lexer, 1), [NumberDecimal, DelimiterCloseParen, DelimiterNewLine]);
}

#[test]
fn test_indent_at_start_of_file() {
    let lexer = lex(&["    x = 1"]);
    assert_eq!(
        line_kinds(&lexer, 0),
        [IndentError, IdentifierUnknown, OperatorEqual, NumberDecimal, DelimiterNewLine]
    );
    let line = lexer.list().line_at(0).unwrap();
    let info = lexer.list().line(line).scan_info().unwrap();
    assert_eq!(info.all_messages().len(), 1);
    assert_eq!(info.all_messages()[0].severity(), Severity::IndentError);
    assert_eq!(
        info.all_messages()[0].message(),
        "Unexpected indent at beginning of file"
    );
}

#[test]
fn test_blockstart_without_colon() {
    let lexer = lex(&["x = 1", "    y = 2"]);
    assert_eq!(line_kinds(&lexer, 1)[0], IndentError);
    let line = lexer.list().line_at(1).unwrap();
    let info = lexer.list().line(line).scan_info().unwrap();
    assert_eq!(info.all_messages()[0].message(), "Blockstart without ':'");
}

#[test]
fn test_dedent_on_block_exit() {
    let lexer = lex(&["if a:", "    b = 1", "c = 2"]);
    assert_eq!(
        line_kinds(&lexer, 1),
        [
            Indent, IdentifierUnknown, OperatorEqual, NumberDecimal,
            DelimiterNewLine, Dedent,
        ]
    );
    let line = lexer.list().line_at(1).unwrap();
    assert_eq!(lexer.list().line(line).block_state(), -1);
    let opener = lexer.list().line_at(0).unwrap();
    assert_eq!(lexer.list().line(opener).block_state(), 1);
}

#[test]
fn test_comment_and_empty_lines_have_no_newline_token() {
    let lexer = lex(&["# only comment", "", "x = 1"]);
    assert_eq!(line_kinds(&lexer, 0), [Comment]);
    assert_eq!(line_kinds(&lexer, 1), []);
    let list = lexer.list();
    assert!(!list.is_code_line(list.line_at(0).unwrap()));
    assert!(!list.is_code_line(list.line_at(1).unwrap()));
    assert!(list.is_code_line(list.line_at(2).unwrap()));
}

#[test]
fn test_unfinished_tokens_recorded() {
    let lexer = lex(&["foo = bar"]);
    let line = lexer.list().line_at(0).unwrap();
    // both identifiers await a later analysis pass
    assert_eq!(lexer.list().line(line).unfinished_tokens(), &[0, 2]);
}

#[test]
fn test_retokenize_line_is_idempotent() {
    let mut lexer = lex(COIN_SOURCE);
    let line = lexer.list().line_at(4).unwrap();
    let before = line_kinds(&lexer, 4);

    lexer
        .list_mut()
        .swap_line(line, TokenLine::new(COIN_SOURCE[4]));
    lexer.tokenize(line);

    assert_eq!(line_kinds(&lexer, 4), before);
}

#[test]
fn test_read_string() {
    let mut lexer = Lexer::new();
    let lines = lexer.read_string("a = 1\nb = 2\n");
    assert_eq!(lines, 2);
    assert_eq!(lexer.list().line_count(), 2);
    assert_eq!(
        line_kinds(&lexer, 1),
        [IdentifierUnknown, OperatorEqual, NumberDecimal, DelimiterNewLine]
    );
}
