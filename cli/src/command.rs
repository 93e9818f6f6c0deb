//! Parsing of one input line.
//!
//! Outside practice, bare words are commands (`2`, `random`, `back`). In
//! practice anything without a leading `/` is a message to the partner.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 1-based list choice.
    Pick(usize),
    Random,
    Back,
    Exit,
    /// Reveal the critique of the Nth user turn.
    Unlock(usize),
    /// Reveal or toggle the suggestion of the Nth user turn.
    Hint(usize),
    Restart,
    Summary,
    Ok,
    Tips,
    Info,
    Help,
    Say(String),
    Unknown(String),
}

pub fn parse(line: &str, in_practice: bool) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('/') {
        return Some(parse_slash(rest));
    }
    if in_practice {
        return Some(Command::Say(line.to_owned()));
    }

    Some(match line.to_ascii_lowercase().as_str() {
        "random" | "r" => Command::Random,
        "back" | "b" => Command::Back,
        "exit" | "quit" | "q" => Command::Exit,
        "ok" => Command::Ok,
        "help" | "?" => Command::Help,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Command::Pick(n),
            _ => Command::Unknown(line.to_owned()),
        },
    })
}

fn parse_slash(rest: &str) -> Command {
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next().and_then(|n| n.parse::<usize>().ok());

    match (name.as_str(), arg) {
        ("unlock", Some(n)) if n > 0 => Command::Unlock(n),
        ("hint", Some(n)) if n > 0 => Command::Hint(n),
        ("restart", _) => Command::Restart,
        ("summary", _) => Command::Summary,
        ("ok", _) => Command::Ok,
        ("tips", _) => Command::Tips,
        ("info", _) => Command::Info,
        ("help", _) => Command::Help,
        ("back", _) => Command::Back,
        ("exit" | "quit", _) => Command::Exit,
        ("random", _) => Command::Random,
        _ => Command::Unknown(format!("/{rest}")),
    }
}
