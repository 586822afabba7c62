use std::io::{self, BufRead, Write};

use crate::data::filter::search;
use crate::data::model::{Catalog, Record};

/// Input that ends the session (compared case-insensitively).
pub const EXIT_WORD: &str = "exit";

const PROMPT: &str = "Введите текст для поиска (или 'exit' для выхода): ";
const NO_RESULTS: &str = "Товары не найдены.";
const FAREWELL: &str = "Работа завершена.";

// ---------------------------------------------------------------------------
// Shell state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    AwaitingInput,
    Terminated,
}

/// Interactive search loop over a loaded catalog.
pub struct Shell<'a> {
    catalog: &'a Catalog,
    state: ShellState,
}

impl<'a> Shell<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            state: ShellState::AwaitingInput,
        }
    }

    /// React to one line of input (without its line terminator).
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<ShellState> {
        if self.state == ShellState::Terminated {
            return Ok(self.state);
        }
        if line.to_lowercase() == EXIT_WORD {
            writeln!(out, "{FAREWELL}")?;
            self.state = ShellState::Terminated;
        } else {
            let results = search(self.catalog, line);
            log::debug!("search {line:?}: {} hits", results.len());
            write_results(&results, out)?;
        }
        Ok(self.state)
    }

    /// Prompt, read and answer until the exit word or end of input.
    ///
    /// Returns the state the session ended in.
    pub fn run<R, W>(&mut self, mut input: R, mut out: W) -> io::Result<ShellState>
    where
        R: BufRead,
        W: Write,
    {
        let mut line = String::new();
        while self.state == ShellState::AwaitingInput {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                // EOF: behave as if the exit word was typed.
                writeln!(out)?;
                self.handle_line(EXIT_WORD, &mut out)?;
                break;
            }
            let text = line.trim_end_matches(['\n', '\r']);
            self.handle_line(text, &mut out)?;
        }
        out.flush()?;
        Ok(self.state)
    }
}

// ---------------------------------------------------------------------------
// Result table
// ---------------------------------------------------------------------------

/// Print search results as a fixed-width table, or a notice when empty.
pub fn write_results<W: Write>(results: &[&Record], out: &mut W) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "{NO_RESULTS}");
    }
    writeln!(
        out,
        "{:<3} {:<30} {:<10} {:<5} {:<15} {:<10}",
        "№", "Наименование", "Цена", "Вес", "Файл", "Цена за кг."
    )?;
    for (idx, record) in results.iter().enumerate() {
        writeln!(
            out,
            "{:<3} {:<30} {:<10} {:<5} {:<15} {:.2}",
            idx + 1,
            record.name,
            record.price,
            record.weight,
            record.source_file,
            record.unit_price
        )?;
    }
    Ok(())
}
