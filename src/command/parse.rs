use crate::error::{AppError, AppResult};
use crate::page::{NavItemId, TargetId};

use super::types::Command;

/// Parses one line of smoke-client input. Blank lines parse to `None`.
pub fn parse_line(input: &str) -> AppResult<Option<Command>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let verb = tokens
        .next()
        .ok_or_else(|| AppError::invalid_argument("empty command"))?;

    let command = match verb {
        "nav" => {
            let url = required(&mut tokens, "nav <url> [nav-item]")?;
            let nav_item = tokens.next().map(NavItemId::new);
            no_more(&mut tokens, "nav <url> [nav-item]")?;
            Command::Navigate {
                url: url.to_string(),
                nav_item,
            }
        }
        "back" => only(&mut tokens, "back", Command::HistoryBack)?,
        "forward" => only(&mut tokens, "forward", Command::HistoryForward)?,
        "like" => single_target(&mut tokens, "like <target>", |target| Command::Like { target })?,
        "follow" => single_target(&mut tokens, "follow <target>", |target| Command::Follow {
            target,
        })?,
        "remolt" => single_target(&mut tokens, "remolt <target>", |target| Command::Remolt {
            target,
        })?,
        "unremolt" => single_target(&mut tokens, "unremolt <target>", |target| {
            Command::UndoRemolt { target }
        })?,
        "delete" => single_target(&mut tokens, "delete <target>", |target| Command::DeleteMolt {
            target,
        })?,
        "molt" => {
            let content = trimmed
                .strip_prefix("molt")
                .unwrap_or_default()
                .trim()
                .to_string();
            Command::Molt { content }
        }
        "menu" => single_target(&mut tokens, "menu <target>", |target| {
            Command::ToggleDropdown { target }
        })?,
        "dismiss" => only(&mut tokens, "dismiss", Command::DismissDropdown)?,
        "scroll" => {
            let raw = required(&mut tokens, "scroll <y>")?;
            no_more(&mut tokens, "scroll <y>")?;
            let y = raw.parse::<u32>().map_err(|_| {
                AppError::invalid_argument(format!("scroll position must be a number, got {raw:?}"))
            })?;
            Command::Scroll { y }
        }
        "top" => only(&mut tokens, "top", Command::ScrollTop)?,
        "refresh" => only(&mut tokens, "refresh", Command::Refresh)?,
        "status" => only(&mut tokens, "status", Command::Status)?,
        "quit" | "exit" => only(&mut tokens, verb, Command::Quit)?,
        other => {
            return Err(AppError::invalid_argument(format!(
                "unknown command: {other}"
            )));
        }
    };

    Ok(Some(command))
}

fn required<'a>(tokens: &mut impl Iterator<Item = &'a str>, usage: &str) -> AppResult<&'a str> {
    tokens
        .next()
        .ok_or_else(|| AppError::invalid_argument(format!("usage: {usage}")))
}

fn no_more<'a>(tokens: &mut impl Iterator<Item = &'a str>, usage: &str) -> AppResult<()> {
    if tokens.next().is_some() {
        return Err(AppError::invalid_argument(format!("usage: {usage}")));
    }
    Ok(())
}

fn only<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    usage: &str,
    command: Command,
) -> AppResult<Command> {
    no_more(tokens, usage)?;
    Ok(command)
}

fn single_target<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    usage: &str,
    build: impl FnOnce(TargetId) -> Command,
) -> AppResult<Command> {
    let target = required(tokens, usage)?;
    no_more(tokens, usage)?;
    Ok(build(TargetId::new(target)))
}
