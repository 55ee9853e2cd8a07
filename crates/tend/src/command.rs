//! Console command parsing.

use anyhow::{anyhow, bail, Context, Result};

use tend_core::{Dimensions, PageKey};

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show a page: `page <key>`
    Page(PageKey),
    /// Add a session to the visible page: `new`
    New,
    /// Switch to a tab, 1-based: `tab <n>`
    Tab(usize),
    /// Close a tab (1-based) or the active one: `close [n]`
    Close(Option<usize>),
    /// Send text to the active session: `type <text>`
    Type(String),
    /// Send a carriage return to the active session: `enter`
    Enter,
    /// Resize the visible pane: `resize <cols> <rows>`
    Resize(Dimensions),
    /// List the visible page's tabs: `list`
    List,
    /// Print the active session's screen: `screen`
    Screen,
    /// Print the command summary: `help`
    Help,
    /// Close everything and exit: `quit`
    Quit,
}

/// Command summary printed by `help`.
pub const HELP: &str = "\
page <key>            show a page (terminals, files, git, ...)
new                   add a session to the visible page
tab <n>               switch to tab n
close [n]             close tab n, or the active tab
type <text>           send text to the active session
enter                 send a carriage return to the active session
resize <cols> <rows>  resize the visible pane
list                  list tabs of the visible page
screen                print the active session's screen
quit                  close all sessions and exit";

impl Command {
    /// Parse a console line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Ok(None);
        }

        let (word, rest) = match trimmed.split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };

        let command = match word {
            "page" => {
                let key = rest.trim();
                if key.is_empty() {
                    bail!("usage: page <key>");
                }
                Self::Page(PageKey::new(key))
            }
            "new" => Self::New,
            "tab" => Self::Tab(parse_tab(rest).context("usage: tab <n>")?),
            "close" if rest.trim().is_empty() => Self::Close(None),
            "close" => Self::Close(Some(parse_tab(rest).context("usage: close [n]")?)),
            // Text is sent verbatim, including leading spaces after the first
            "type" => Self::Type(rest.to_string()),
            "enter" => Self::Enter,
            "resize" => Self::Resize(parse_dimensions(rest)?),
            "list" | "ls" => Self::List,
            "screen" => Self::Screen,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command '{other}', try 'help'"),
        };
        Ok(Some(command))
    }
}

fn parse_tab(arg: &str) -> Result<usize> {
    let n: usize = arg.trim().parse()?;
    if n == 0 {
        bail!("tabs are numbered from 1");
    }
    Ok(n)
}

fn parse_dimensions(args: &str) -> Result<Dimensions> {
    let mut parts = args.split_whitespace();
    let (Some(cols), Some(rows), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("usage: resize <cols> <rows>");
    };
    let cols: u16 = cols.parse().map_err(|e| anyhow!("bad cols '{cols}': {e}"))?;
    let rows: u16 = rows.parse().map_err(|e| anyhow!("bad rows '{rows}': {e}"))?;
    Ok(Dimensions::checked(rows, cols)?)
}
