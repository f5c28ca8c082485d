//! Card projection and the render sink seam.

use crate::api::MangaEntry;
use std::io::{self, Write};
use tracing::warn;

/// Display fields of one result card, with placeholders already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct MangaCard {
    pub mal_id: u32,
    pub title: String,
    pub image_url: String,
    pub score: String,
    pub kind: String,
    pub volumes: String,
}

impl From<&MangaEntry> for MangaCard {
    fn from(entry: &MangaEntry) -> Self {
        let title = non_empty(entry.title.as_deref()).unwrap_or("Unknown Title");
        let score = match entry.score {
            Some(score) if score != 0.0 => score.to_string(),
            _ => "N/A".to_string(),
        };
        let volumes = match entry.volumes {
            Some(volumes) if volumes > 0 => format!("{volumes} vols"),
            _ => "Unknown volumes".to_string(),
        };

        Self {
            mal_id: entry.mal_id,
            title: title.to_string(),
            image_url: entry.image_url().unwrap_or_default().to_string(),
            score,
            kind: non_empty(entry.manga_type.as_deref())
                .unwrap_or("Unknown")
                .to_string(),
            volumes,
        }
    }
}

impl MangaCard {
    /// Line logged when a card is selected
    pub fn describe_selection(&self) -> String {
        format!("Manga clicked: {} - {}", self.mal_id, self.title)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// What the fetch cycle needs from a user interface.
///
/// `present` only ever appends; clearing is the caller's job.
pub trait RenderSink: Send {
    /// Append cards in the given order
    fn present(&mut self, cards: &[MangaCard]);

    /// Remove all cards (and any error message)
    fn clear(&mut self);

    /// Replace the grid's content with a single error message
    fn show_error(&mut self, message: &str);

    /// Show the loading indicator and hide the grid, or the reverse
    fn set_loading(&mut self, loading: bool);

    fn set_load_more_visible(&mut self, visible: bool);

    fn set_load_more_enabled(&mut self, enabled: bool);

    /// Update the result count display
    fn set_count(&mut self, count: u32);
}

/// Render sink that prints to a terminal (or any writer).
///
/// Cards are numbered in the order they were appended, so a later
/// `open <n>` can refer to them.
pub struct TerminalSink<W: Write> {
    out: W,
    cards: Vec<MangaCard>,
    load_more_visible: bool,
    count: Option<u32>,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cards: Vec::new(),
            load_more_visible: false,
            count: None,
        }
    }

    /// Cards currently shown
    pub fn cards(&self) -> &[MangaCard] {
        &self.cards
    }

    /// Whether another page can be requested
    pub fn load_more_visible(&self) -> bool {
        self.load_more_visible
    }

    /// Last result count shown, if the feed reports one
    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write + Send> RenderSink for TerminalSink<W> {
    fn present(&mut self, cards: &[MangaCard]) {
        for card in cards {
            let index = self.cards.len() + 1;
            self.write_line(format_args!(
                "{:>4}. {}  [{}]  {} | {}  (#{})",
                index, card.title, card.score, card.kind, card.volumes, card.mal_id
            ));
            self.cards.push(card.clone());
        }
    }

    fn clear(&mut self) {
        self.cards.clear();
    }

    fn show_error(&mut self, message: &str) {
        self.cards.clear();
        self.write_line(format_args!("error: {message}"));
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.write_line(format_args!("Loading..."));
        }
    }

    fn set_load_more_visible(&mut self, visible: bool) {
        self.load_more_visible = visible;
        if visible {
            self.write_line(format_args!("-- more results available --"));
        }
    }

    fn set_load_more_enabled(&mut self, _enabled: bool) {}

    fn set_count(&mut self, count: u32) {
        if self.count != Some(count) && count > 0 {
            self.write_line(format_args!("{count} results"));
        }
        self.count = Some(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ImageSet, MangaImages};

    fn entry() -> MangaEntry {
        MangaEntry {
            mal_id: 2,
            title: Some("Berserk".to_string()),
            images: Some(MangaImages {
                jpg: Some(ImageSet {
                    image_url: Some("https://cdn.example/berserk.jpg".to_string()),
                }),
            }),
            manga_type: Some("Manga".to_string()),
            volumes: Some(42),
            score: Some(9.47),
            ..Default::default()
        }
    }

    #[test]
    fn test_card_from_complete_entry() {
        let card = MangaCard::from(&entry());
        assert_eq!(card.title, "Berserk");
        assert_eq!(card.image_url, "https://cdn.example/berserk.jpg");
        assert_eq!(card.score, "9.47");
        assert_eq!(card.kind, "Manga");
        assert_eq!(card.volumes, "42 vols");
    }

    #[test]
    fn test_card_placeholders() {
        let card = MangaCard::from(&MangaEntry {
            mal_id: 7,
            ..Default::default()
        });
        assert_eq!(card.title, "Unknown Title");
        assert_eq!(card.image_url, "");
        assert_eq!(card.score, "N/A");
        assert_eq!(card.kind, "Unknown");
        assert_eq!(card.volumes, "Unknown volumes");
    }

    #[test]
    fn test_zero_and_empty_values_use_placeholders() {
        let card = MangaCard::from(&MangaEntry {
            mal_id: 8,
            title: Some(String::new()),
            manga_type: Some(String::new()),
            score: Some(0.0),
            volumes: Some(0),
            ..Default::default()
        });
        assert_eq!(card.title, "Unknown Title");
        assert_eq!(card.kind, "Unknown");
        assert_eq!(card.score, "N/A");
        assert_eq!(card.volumes, "Unknown volumes");
    }

    #[test]
    fn test_describe_selection() {
        let card = MangaCard::from(&entry());
        assert_eq!(card.describe_selection(), "Manga clicked: 2 - Berserk");
    }

    #[test]
    fn test_terminal_sink_appends_and_numbers() {
        let mut sink = TerminalSink::new(Vec::new());
        let card = MangaCard::from(&entry());

        sink.present(&[card.clone()]);
        sink.present(&[card.clone()]);
        sink.set_count(958);
        sink.set_load_more_visible(true);

        assert_eq!(sink.cards().len(), 2);
        assert!(sink.load_more_visible());
        assert_eq!(sink.count(), Some(958));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("   1. Berserk  [9.47]  Manga | 42 vols  (#2)"));
        assert!(output.contains("   2. Berserk"));
        assert!(output.contains("958 results"));
        assert!(output.contains("more results available"));
    }

    #[test]
    fn test_terminal_sink_error_replaces_cards() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.present(&[MangaCard::from(&entry())]);
        sink.show_error("Failed");

        assert!(sink.cards().is_empty());
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.ends_with("error: Failed\n"));
    }
}
