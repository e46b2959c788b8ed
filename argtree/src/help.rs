use std::io::{self, Write};

use crate::command::CommandId;
use crate::parser::Parser;
use crate::Result;

impl Parser {
    /// Write the help screen of `command` to `out`.
    pub fn write_help<W: Write>(&self, command: CommandId, out: &mut W) -> Result<()> {
        let index = self.index_of(command)?;
        self.render_help(index, out)?;
        Ok(())
    }

    pub fn print_help(&self, command: CommandId) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_help(command, &mut out)
    }

    /// One-line usage synopsis, e.g. `prog run [OPTIONS] INPUT`.
    pub fn usage(&self, command: CommandId) -> Result<String> {
        let index = self.index_of(command)?;
        Ok(self.usage_line(index))
    }

    fn usage_line(&self, index: usize) -> String {
        let command = &self.commands[index];
        let mut line = self.command_path(index);
        if !command.options.is_empty() {
            line.push_str(" [OPTIONS]");
        }
        if !command.children.is_empty() {
            line.push_str(" [COMMAND]");
        }
        for positional in &command.positionals {
            line.push(' ');
            line.push_str(&positional.usage());
        }
        line
    }

    pub(crate) fn render_help(&self, index: usize, out: &mut dyn Write) -> io::Result<()> {
        let command = &self.commands[index];
        let settings = &self.settings;
        let pad = settings.indent;

        write!(out, "\n{:pad$}Usage: {}\n\n", "", self.usage_line(index), pad = pad)?;

        if let Some(desc) = command.help().filter(|desc| !desc.is_empty()) {
            let width = settings.line_width.saturating_sub(pad).max(20);
            for paragraph in desc.split('\n') {
                write!(out, "{:pad$}", "", pad = pad)?;
                write_wrapped(out, paragraph, pad, width)?;
            }
            write!(out, "\n")?;
        }

        let (required, optional): (Vec<_>, Vec<_>) =
            command.options.iter().partition(|opt| opt.is_required());
        let rows = |opts: Vec<&crate::Opt>| -> Vec<(String, String)> {
            opts.into_iter()
                .map(|opt| (opt.signature(), opt.help().unwrap_or("").to_string()))
                .collect()
        };
        self.write_section(out, "Required options:", &rows(required))?;
        self.write_section(out, "Options:", &rows(optional))?;

        let commands: Vec<(String, String)> = command
            .children
            .iter()
            .map(|&child| {
                let child = &self.commands[child];
                (child.name.clone(), child.help().unwrap_or("").to_string())
            })
            .collect();
        if !commands.is_empty() {
            self.write_section(out, "Commands:", &commands)?;
            write!(
                out,
                "{:pad$}See '{} <command> --help' for more information on a specific command.\n\n",
                "",
                self.command_path(index),
                pad = pad
            )?;
        }

        let arguments: Vec<(String, String)> = command
            .positionals
            .iter()
            .map(|p| (p.usage(), p.help().unwrap_or("").to_string()))
            .collect();
        self.write_section(out, "Arguments:", &arguments)?;

        if let Some(footer) = command.footer_text() {
            for line in footer.split('\n') {
                write!(out, "{:pad$}{}\n", "", line, pad = pad)?;
            }
            write!(out, "\n")?;
        }
        Ok(())
    }

    /// A titled block of `left  right` rows, the right column aligned to the
    /// widest left cell plus the margin.
    fn write_section(
        &self,
        out: &mut dyn Write,
        title: &str,
        rows: &[(String, String)],
    ) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let settings = &self.settings;
        let pad = settings.indent;
        let left_width = rows
            .iter()
            .map(|(left, _)| left.chars().count())
            .max()
            .unwrap_or(0);
        let indent_length = 2 * pad + left_width + settings.margin;
        let line_length = if settings.line_width > indent_length + 20 {
            settings.line_width - indent_length
        } else {
            20
        };

        write!(out, "{:pad$}{}\n", "", title, pad = pad)?;
        for (left, right) in rows {
            if right.is_empty() {
                write!(out, "{:pad$}{}\n", "", left, pad = 2 * pad)?;
                continue;
            }
            let fill = left_width - left.chars().count() + settings.margin;
            write!(out, "{:pad$}{}{:fill$}", "", left, "", pad = 2 * pad, fill = fill)?;
            write_wrapped(out, right, indent_length, line_length)?;
        }
        write!(out, "\n")
    }
}

/// Write `text` followed by a newline, breaking at the last space before
/// `line_length` characters and indenting continuation lines. Words longer
/// than a line are left unbroken.
fn write_wrapped(
    out: &mut dyn Write,
    text: &str,
    indent_length: usize,
    line_length: usize,
) -> io::Result<()> {
    let mut help = text;
    while help.chars().count() > line_length {
        let cut = help
            .char_indices()
            .nth(line_length)
            .map(|(i, _)| i)
            .unwrap_or(help.len());
        let break_pos = match help[..cut].rfind(' ') {
            Some(pos) if pos > 0 => pos,
            _ => break,
        };

        write!(out, "{}\n{:indent$}", &help[..break_pos], "", indent = indent_length)?;

        help = help[break_pos..].trim_start_matches(' ');
    }
    write!(out, "{}\n", help)
}
