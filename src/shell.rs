//! Line-oriented play shell.
//!
//! Reads one command per line, applies it to the session and prints the
//! outcome. Generic over the input/output streams so it can be driven from
//! tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cellcraft_core::{CellFormat, CellRef, TaskSession};
use log::debug;

use crate::render;

#[derive(Debug, PartialEq)]
pub enum Command {
    Select(CellRef),
    Submit(CellRef, String),
    Format(CellRef, CellFormat),
    Show,
    Check,
    Hint,
    Task,
    Save(Option<PathBuf>),
    Load(PathBuf),
    Help,
    Quit,
}

/// Parse one shell line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix(':') else {
        let (cell_str, input) = match line.split_once(char::is_whitespace) {
            Some((cell_str, input)) => (cell_str, Some(input.trim_start())),
            None => (line, None),
        };
        let cell = parse_cell(cell_str)?;
        return Ok(Some(match input {
            Some(input) => Command::Submit(cell, input.to_string()),
            None => Command::Select(cell),
        }));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    let command = match (name, args.as_slice()) {
        ("select" | "s", [cell]) => Command::Select(parse_cell(cell)?),
        ("format" | "f", [cell, format]) => Command::Format(
            parse_cell(cell)?,
            format.parse::<CellFormat>()?,
        ),
        ("show", []) => Command::Show,
        ("check", []) => Command::Check,
        ("hint", []) => Command::Hint,
        ("task", []) => Command::Task,
        ("save" | "w", []) => Command::Save(None),
        ("save" | "w", [path]) => Command::Save(Some(PathBuf::from(path))),
        ("load" | "e", [path]) => Command::Load(PathBuf::from(path)),
        ("help" | "h", []) => Command::Help,
        ("quit" | "q", []) => Command::Quit,
        ("select" | "s" | "format" | "f" | "load" | "e", _) => {
            return Err(format!("Wrong arguments for :{} (see :help)", name));
        }
        _ => return Err(format!("Unknown command: :{}", name)),
    };
    Ok(Some(command))
}

fn parse_cell(text: &str) -> Result<CellRef, String> {
    CellRef::from_str(text).ok_or_else(|| format!("Invalid cell reference: {}", text))
}

/// Run the shell until `:quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    session: &mut TaskSession,
    input: R,
    out: &mut W,
    show_hints: bool,
) -> Result<()> {
    print_task(session, out, show_hints)?;
    write!(out, "{}", render::render_grid(session))?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{}", message)?;
                continue;
            }
        };
        debug!("shell command: {:?}", command);

        if command == Command::Quit {
            break;
        }
        execute(session, command, out, show_hints)?;
    }

    if session.modified {
        writeln!(out, "Unsaved changes discarded.")?;
    }
    Ok(())
}

fn execute<W: Write>(
    session: &mut TaskSession,
    command: Command,
    out: &mut W,
    show_hints: bool,
) -> Result<()> {
    match command {
        Command::Select(cell) => {
            session.select(cell);
            writeln!(out, "{}", formula_bar_line(session))?;
        }
        Command::Submit(cell, input) => {
            let complete = session.submit(cell, &input);
            writeln!(out, "{} = {}", cell, session.display_value(&cell))?;
            report(out, complete)?;
        }
        Command::Format(cell, format) => {
            let complete = session.apply_format(cell, format);
            writeln!(out, "{} = {}", cell, session.display_value(&cell))?;
            report(out, complete)?;
        }
        Command::Show => write!(out, "{}", render::render_grid(session))?,
        Command::Check => {
            if session.is_valid() {
                writeln!(out, "Task complete!")?;
            } else {
                writeln!(out, "Not yet.")?;
            }
        }
        Command::Hint => match session.task() {
            Some(task) if !task.hints.is_empty() => {
                write!(out, "{}", render::render_hints(task))?
            }
            _ => writeln!(out, "No hints for this task.")?,
        },
        Command::Task => print_task(session, out, show_hints)?,
        Command::Save(path) => match session.save_cells(path.as_deref()) {
            Ok(path) => writeln!(out, "Saved {}", path.display())?,
            Err(err) => writeln!(out, "Error: {}", err)?,
        },
        Command::Load(path) => match session.load_cells(&path) {
            Ok(count) => {
                writeln!(out, "Loaded {} cells from {}", count, path.display())?;
                report(out, session.is_valid())?;
            }
            Err(err) => writeln!(out, "Error: {}", err)?,
        },
        Command::Help => write!(out, "{}", render::help_text())?,
        Command::Quit => {}
    }
    Ok(())
}

fn print_task<W: Write>(session: &TaskSession, out: &mut W, show_hints: bool) -> Result<()> {
    if let (Some(key), Some(task)) = (session.active_key(), session.task()) {
        write!(out, "{}", render::render_task(&key.to_string(), task, show_hints))?;
    }
    Ok(())
}

fn formula_bar_line(session: &TaskSession) -> String {
    let bar = session.formula_bar();
    if bar.is_empty() {
        format!("{}: (empty)", session.selected())
    } else {
        format!("{}: {}", session.selected(), bar)
    }
}

fn report<W: Write>(out: &mut W, complete: bool) -> Result<()> {
    if complete {
        writeln!(out, "Task complete!")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcraft_core::{TaskBank, TaskKey};
    use std::io::Cursor;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn play(key: TaskKey, script: &str) -> (TaskSession, String) {
        let mut session = TaskSession::new(TaskBank::builtin().unwrap());
        session.start_task(key).unwrap();
        let mut out = Vec::new();
        run(&mut session, Cursor::new(script), &mut out, false).unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("b5"), Ok(Some(Command::Select(cell("B5")))));
        assert_eq!(
            parse_command("A6 = SUM(A1:A5)"),
            Ok(Some(Command::Submit(cell("A6"), "= SUM(A1:A5)".into())))
        );
        assert_eq!(
            parse_command("A1 Hello World"),
            Ok(Some(Command::Submit(cell("A1"), "Hello World".into())))
        );
        assert_eq!(
            parse_command(":format C1 Currency"),
            Ok(Some(Command::Format(cell("C1"), CellFormat::Currency)))
        );
        assert_eq!(parse_command(":save"), Ok(Some(Command::Save(None))));
        assert_eq!(parse_command(":q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("11 =A1").is_err());
        assert!(parse_command(":format C1").is_err());
        assert!(parse_command(":format C1 bold").is_err());
        assert!(parse_command(":nope").is_err());
        assert!(parse_command(":load").is_err());
    }

    #[test]
    fn test_play_until_complete() {
        let (session, output) = play(TaskKey::new(1, 2), "A6 =SUM(A1:A5)\n:check\n:quit\n");
        assert!(output.contains("Task 1-2: Weekly Sales Total"));
        assert!(output.contains("A6 = 100\nTask complete!\n"));
        assert!(session.is_valid());
        assert!(output.ends_with("Unsaved changes discarded.\n"));
    }

    #[test]
    fn test_bad_lines_do_not_stop_the_shell() {
        let (session, output) = play(
            TaskKey::new(3, 5),
            ":bogus\n1A 1\nD2 =IFERROR(10/0,\"Error\")\n",
        );
        assert!(output.contains("Unknown command: :bogus"));
        assert!(output.contains("Invalid cell reference: 1A"));
        assert!(output.contains("D2 = Error"));
        assert!(session.is_valid());
    }

    #[test]
    fn test_format_command() {
        let (session, output) = play(TaskKey::new(1, 4), "C1 2450.75\n:format C1 currency\n");
        assert!(output.contains("C1 = $2450.75\nTask complete!"));
        assert!(session.is_valid());
    }
}
