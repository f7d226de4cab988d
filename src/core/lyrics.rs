//! Verse splitting and pagination for stored lyrics

use thiserror::Error;

use super::pagination::PageWindow;

/// Blank line separating verses
pub const VERSE_DELIMITER: &str = "\n\n";

/// Result of windowing a lyrics blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersePage {
    /// The song has no lyrics at all
    NoText,
    /// Selected verses joined back with the delimiter
    Verses(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerseError {
    #[error("Page out of range")]
    OutOfRange { page: u32, limit: u32, verses: usize },
}

/// Lyrics library
pub struct LyricsLib;

impl LyricsLib {
    /// Split lyrics into verses. Empty text has no verses.
    pub fn split_verses(text: &str) -> Vec<&str> {
        if text.is_empty() {
            return Vec::new();
        }
        text.split(VERSE_DELIMITER).collect()
    }

    /// Join verses with the same delimiter used to split them
    pub fn join_verses(verses: &[&str]) -> String {
        verses.join(VERSE_DELIMITER)
    }

    /// Return the verses on `window`'s page.
    ///
    /// A page that starts past the last verse is an error; a page that is
    /// only partly filled returns what is there.
    pub fn paginate(text: &str, window: PageWindow) -> Result<VersePage, VerseError> {
        let verses = Self::split_verses(text);
        if verses.is_empty() {
            return Ok(VersePage::NoText);
        }

        let count = verses.len();
        let start = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        if start >= count {
            return Err(VerseError::OutOfRange {
                page: window.page(),
                limit: window.limit(),
                verses: count,
            });
        }

        let end = start.saturating_add(window.limit() as usize).min(count);
        Ok(VersePage::Verses(Self::join_verses(&verses[start..end])))
    }

    /// Number of verses in the text
    pub fn verse_count(text: &str) -> usize {
        Self::split_verses(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE: &str = "Is this the real life?\nIs this just fantasy?\n\n\
                         Caught in a landslide\n\n\
                         Open your eyes";

    fn window(page: u32, limit: u32) -> PageWindow {
        PageWindow::new(page, limit).unwrap()
    }

    #[test]
    fn test_first_verse() {
        assert_eq!(
            LyricsLib::paginate(THREE, window(1, 1)),
            Ok(VersePage::Verses(
                "Is this the real life?\nIs this just fantasy?".to_string()
            ))
        );
    }

    #[test]
    fn test_middle_and_last_pages() {
        assert_eq!(
            LyricsLib::paginate(THREE, window(2, 1)),
            Ok(VersePage::Verses("Caught in a landslide".to_string()))
        );
        assert_eq!(
            LyricsLib::paginate(THREE, window(2, 2)),
            Ok(VersePage::Verses("Open your eyes".to_string()))
        );
    }

    #[test]
    fn test_page_past_end() {
        assert_eq!(
            LyricsLib::paginate(THREE, window(4, 1)),
            Err(VerseError::OutOfRange {
                page: 4,
                limit: 1,
                verses: 3
            })
        );
    }

    #[test]
    fn test_large_limit_returns_everything() {
        assert_eq!(
            LyricsLib::paginate(THREE, window(1, 10)),
            Ok(VersePage::Verses(THREE.to_string()))
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(LyricsLib::paginate("", window(1, 1)), Ok(VersePage::NoText));
        assert_eq!(LyricsLib::paginate("", window(9, 9)), Ok(VersePage::NoText));
        assert_eq!(LyricsLib::verse_count(""), 0);
    }

    #[test]
    fn test_split_join_round_trip() {
        let samples = [
            "single verse",
            THREE,
            "trailing\n\n",
            "\n\nleading",
            "a\n\n\n\nb",
            "\n\n",
            "odd\n\n\nspacing",
            "line one\nline two",
        ];
        for text in samples {
            let verses = LyricsLib::split_verses(text);
            assert_eq!(LyricsLib::join_verses(&verses), text, "{text:?}");
        }
    }

    #[test]
    fn test_full_range_window_round_trip() {
        let text = "a\n\n\n\nb\n\nc";
        let count = LyricsLib::verse_count(text) as u32;
        assert_eq!(count, 4);
        assert_eq!(
            LyricsLib::paginate(text, window(1, count)),
            Ok(VersePage::Verses(text.to_string()))
        );
    }
}
