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

use std::{
    io::{Write, stdout},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use thiserror::Error as ThisError;

use pylex::{Lexer, LexerPersistent, Version};

/// pylex, an incremental lexer for Python source code.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    Show(Show),
    Dump(Dump),
    Restore(Restore),
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Command::Show(show) => show.run(),
            Command::Dump(dump) => dump.run(),
            Command::Restore(restore) => restore.run(),
        }
    }
}

#[derive(ThisError, Debug)]
#[error("{0}: unknown Python version")]
struct UnknownVersionError(String);

fn parse_version(arg: &str) -> Result<Version, UnknownVersionError> {
    let parts = arg
        .split_once('.')
        .and_then(|(major, minor)| Some((major.parse().ok()?, minor.parse().ok()?)));
    match parts.and_then(|(major, minor)| Version::from_parts(major, minor)) {
        Some(version) => Ok(version),
        None => Err(UnknownVersionError(arg.to_string())),
    }
}

/// Tokenize a Python file and print one token per row.
#[derive(Args, Clone, Debug)]
struct Show {
    /// File to tokenize.
    input: PathBuf,

    /// Python version whose grammar to accept, as `major.minor`.
    #[arg(long, value_parser = parse_version, default_value = "3.9")]
    python: Version,
}

impl Show {
    fn run(self) -> Result<()> {
        let mut lexer = Lexer::with_version(self.python);
        lexer.set_file_path(self.input.as_path());
        lexer.read_file(&self.input)?;

        let list = lexer.list();
        let mut out = stdout().lock();
        let mut line = list.first_line();
        while let Some(cur) = line {
            let slot = list.line(cur);
            writeln!(out, "{}: {:?}", list.line_nr(cur), slot.text())?;
            for tok in list.line_tokens(cur) {
                let token = list.token(tok);
                writeln!(
                    out,
                    "    {:>3}..{:<3} {:<24} {:?}",
                    token.start_pos(),
                    token.end_pos(),
                    token.kind().as_str(),
                    list.token_text(tok),
                )?;
            }
            if let Some(info) = slot.scan_info() {
                for msg in info.all_messages() {
                    writeln!(out, "    {}: {}", msg.severity().as_str(), msg.message())?;
                }
            }
            line = slot.next_line();
        }
        Ok(())
    }
}

/// Tokenize a Python file and write the lexer state as a text dump.
#[derive(Args, Clone, Debug)]
struct Dump {
    /// File to tokenize.
    input: PathBuf,

    /// Dump file name.  If omitted, the dump is written to stdout.
    output: Option<PathBuf>,

    /// Python version whose grammar to accept, as `major.minor`.
    #[arg(long, value_parser = parse_version, default_value = "3.9")]
    python: Version,
}

impl Dump {
    fn run(self) -> Result<()> {
        let mut lexer = Lexer::with_version(self.python);
        lexer.set_file_path(self.input.as_path());
        lexer.read_file(&self.input)?;

        let persist = LexerPersistent::new(&mut lexer);
        match &self.output {
            Some(path) => persist.dump_to_file(path)?,
            None => writeln!(stdout(), "{}", persist.dump_to_string())?,
        }
        Ok(())
    }
}

/// Rebuild lexer state from a dump and report what was read.
#[derive(Args, Clone, Debug)]
struct Restore {
    /// Dump file to read.
    input: PathBuf,

    /// Write the rebuilt state back out as a dump, for comparison.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

impl Restore {
    fn run(self) -> Result<()> {
        let mut lexer = Lexer::new();
        let mut persist = LexerPersistent::new(&mut lexer);
        let records = persist.reconstruct_from_file(&self.input)?;

        if let Some(path) = &self.output {
            LexerPersistent::new(&mut lexer).dump_to_file(path)?;
        }
        println!(
            "{}: {} records, {} lines, {} tokens",
            lexer.file_path().display(),
            records,
            lexer.list().line_count(),
            lexer.list().count(),
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    Cli::parse().command.run()
}
