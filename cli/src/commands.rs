//! Line commands accepted while a board is open.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use stacksboard::model::{Color, UnknownColor};

pub const HELP: &str = "\
commands:
  note [color]            add a note
  zone [color]            add a zone
  move <id> <x> <y>       drag an element to x,y
  resize <id> <w> <h>     resize a zone
  color <id> <color>      recolor an element
  text <id> <text...>     set note text or zone label
  delete <id>             delete an element
  list                    show every element
  share                   print the share link
  leave                   leave the board and exit
colors: yellow pink blue green purple orange";

#[derive(Debug, Clone, PartialEq)]
pub enum LineCommand {
    Note(Option<Color>),
    Zone(Option<Color>),
    Move { id: String, x: f64, y: f64 },
    Resize { id: String, width: f64, height: f64 },
    Recolor { id: String, color: Color },
    Text { id: String, text: String },
    Delete { id: String },
    List,
    Share,
    Leave,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a number: {0}")]
    Number(String),
    #[error(transparent)]
    Color(#[from] UnknownColor),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<LineCommand>, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "note" => LineCommand::Note(optional_color(&args, "note [color]")?),
        "zone" => LineCommand::Zone(optional_color(&args, "zone [color]")?),
        "move" => match args.as_slice() {
            [id, x, y] => LineCommand::Move { id: (*id).to_owned(), x: number(x)?, y: number(y)? },
            _ => return Err(ParseError::Usage("move <id> <x> <y>")),
        },
        "resize" => match args.as_slice() {
            [id, w, h] => LineCommand::Resize { id: (*id).to_owned(), width: number(w)?, height: number(h)? },
            _ => return Err(ParseError::Usage("resize <id> <w> <h>")),
        },
        "color" => match args.as_slice() {
            [id, color] => LineCommand::Recolor { id: (*id).to_owned(), color: color.parse()? },
            _ => return Err(ParseError::Usage("color <id> <color>")),
        },
        "text" => match rest.split_once(char::is_whitespace) {
            Some((id, text)) => LineCommand::Text { id: id.to_owned(), text: text.trim().to_owned() },
            None if !rest.is_empty() => LineCommand::Text { id: rest.to_owned(), text: String::new() },
            None => return Err(ParseError::Usage("text <id> <text...>")),
        },
        "delete" | "rm" => match args.as_slice() {
            [id] => LineCommand::Delete { id: (*id).to_owned() },
            _ => return Err(ParseError::Usage("delete <id>")),
        },
        "list" | "ls" => LineCommand::List,
        "share" => LineCommand::Share,
        "leave" | "quit" | "exit" => LineCommand::Leave,
        "help" | "?" => LineCommand::Help,
        other => return Err(ParseError::Unknown(other.to_owned())),
    };
    Ok(Some(command))
}

fn optional_color(args: &[&str], usage: &'static str) -> Result<Option<Color>, ParseError> {
    match args {
        [] => Ok(None),
        [color] => Ok(Some(color.parse()?)),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn number(raw: &str) -> Result<f64, ParseError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::Number(raw.to_owned())),
    }
}
