use std::io::{self, IsTerminal, Write};

use todomatic_core::{Filter, Task};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

/// Writes task listings and headings to a terminal-ish sink.
#[derive(Debug)]
pub struct Renderer<W> {
    out: W,
    color: bool,
}

impl Renderer<io::Stdout> {
    pub fn stdout(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.color()? && io::stdout().is_terminal();
        Ok(Self::new(io::stdout(), color))
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints the filter bar, the heading and one row per visible task.
    #[tracing::instrument(skip(self, visible, heading))]
    pub fn print_list(
        &mut self,
        filter: Filter,
        visible: &[&Task],
        heading: &str,
    ) -> anyhow::Result<()> {
        let bar = Filter::ALL
            .iter()
            .map(|candidate| {
                if *candidate == filter {
                    self.paint(&format!("[{candidate}]"), "1")
                } else {
                    format!(" {candidate} ")
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.out, "{bar}")?;

        let heading = self.paint(heading, "1");
        writeln!(self.out, "{heading}")?;

        let pos_width = visible.len().to_string().len();
        let name_width = visible
            .iter()
            .map(|task| task.name.width())
            .max()
            .unwrap_or(0);

        for (idx, task) in visible.iter().enumerate() {
            let mark = if task.completed { "[x]" } else { "[ ]" };
            let name = if task.completed {
                self.paint(&task.name, "2")
            } else {
                task.name.clone()
            };
            let pad = name_width.saturating_sub(task.name.width());
            let id = self.paint(&task.id, "33");
            writeln!(
                self.out,
                "{pos:>pos_width$}. {mark} {name}{space}  {id}",
                pos = idx + 1,
                space = " ".repeat(pad),
            )?;
        }

        self.out.flush()?;
        Ok(())
    }

    /// Re-announces the heading after a deletion moved focus to it.
    pub fn announce(&mut self, heading: &str) -> anyhow::Result<()> {
        let heading = self.paint(heading, "1;36");
        writeln!(self.out, "> {heading}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn notice(&mut self, message: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}
