//! Line-driven front-end: each input line is one UI event for a feed.

use crate::api::CatalogTransport;
use crate::feed::FeedController;
use crate::filter::FilterInput;
use crate::query::FeedKind;
use crate::render::TerminalSink;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

const HELP: &str = "commands: more | search <text> | sort <key> | filter key=value... | reset | open <n> | help | quit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    More,
    Search(String),
    Sort(String),
    Filter(Vec<(String, String)>),
    Reset,
    Open(usize),
    Help,
    Quit,
}

impl Command {
    /// Parse a line; `None` for blank lines, `Err` with a message for bad input
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "more" | "m" => Ok(Command::More),
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "sort" if !rest.is_empty() => Ok(Command::Sort(rest.to_string())),
            "sort" => Err("sort needs a key".to_string()),
            "filter" | "f" => rest
                .split_whitespace()
                .map(|pair| {
                    pair.split_once('=')
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .ok_or_else(|| format!("expected key=value, got {pair:?}"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Filter),
            "reset" => Ok(Command::Reset),
            "open" | "o" => rest
                .parse()
                .map(Command::Open)
                .map_err(|_| format!("expected a card number, got {rest:?}")),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command {other:?}")),
        };

        Some(command)
    }
}

/// Feed UI events from `input` into `feed` until EOF or `quit`.
pub async fn run<T, W, R>(feed: &FeedController<T, TerminalSink<W>>, input: R) -> Result<()>
where
    T: CatalogTransport,
    W: Write + Send,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    eprintln!("{HELP}");

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(message)) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::More => {
                if feed.with_sink(|sink| sink.load_more_visible()) {
                    feed.load_more().await;
                } else {
                    eprintln!("no more results");
                }
            }
            Command::Search(text) => feed.search(&text).await,
            Command::Sort(key) => feed.change_sort(&key).await,
            Command::Filter(pairs) => {
                if feed.kind() != FeedKind::Browse {
                    eprintln!("filters are only available on the browse feed");
                    continue;
                }
                let mut input = FilterInput::from_state(&feed.filters());
                let applied = pairs
                    .iter()
                    .try_for_each(|(key, value)| input.set(key, value));
                let applied = match applied {
                    Ok(()) => feed.apply_filters(&input).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = applied {
                    eprintln!("{e}");
                }
            }
            Command::Reset => feed.reset_filters().await,
            Command::Open(n) => {
                let card = feed.with_sink(|sink| sink.cards().get(n.wrapping_sub(1)).cloned());
                match card {
                    Some(card) => info!("{}", card.describe_selection()),
                    None => eprintln!("no card {n}"),
                }
            }
            Command::Help => eprintln!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}
