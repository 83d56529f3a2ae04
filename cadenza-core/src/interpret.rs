//! Free-form command interpretation.
//!
//! [`parse`] turns arbitrary text into exactly one [`Intent`]. Matching is
//! case-insensitive and total: text that maps to no known command becomes
//! [`Intent::Unknown`]. Rules are tried in a fixed order and the first
//! match wins; the ordering encodes intended precedence (the specific
//! playlist form before the general play form, an exact volume level
//! before the coarser up/down cues).

use serde::{Deserialize, Serialize};

/// A parsed, typed representation of one user command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Resume playback.
    Play,
    /// Search for a track and play the best match.
    PlaySearchQuery(String),
    /// Search for a playlist and play the best match.
    PlayPlaylistQuery(String),
    Pause,
    Next,
    Previous,
    /// Set the volume to an absolute level, 0-100.
    SetVolume(u8),
    VolumeUp,
    VolumeDown,
    Status,
    /// Nothing matched; carries the original text for the echo in the
    /// outcome.
    Unknown(String),
}

/// Parse a free-form command into an [`Intent`].
pub fn parse(text: &str) -> Intent {
    let command = text.to_lowercase();

    if command.contains("play") && command.contains("playlist") {
        if let Some(query) = capture_playlist_query(&command) {
            return Intent::PlayPlaylistQuery(query);
        }
    }

    if command.contains("play") && !command.contains("playlist") {
        return match capture_after(&command, "play") {
            Some(query) => Intent::PlaySearchQuery(query),
            None => Intent::Play,
        };
    }

    if command.contains("pause") {
        return Intent::Pause;
    }
    if command.contains("resume") {
        return Intent::Play;
    }
    if command.contains("skip") || command.contains("next") {
        return Intent::Next;
    }
    if command.contains("previous") || command.contains("go back") {
        return Intent::Previous;
    }

    if let Some(level) = capture_volume_level(&command) {
        return Intent::SetVolume(level);
    }
    if command.contains("volume up") {
        return Intent::VolumeUp;
    }
    if command.contains("volume down") {
        return Intent::VolumeDown;
    }

    if command.contains("status") || (command.contains("what") && command.contains("playing")) {
        return Intent::Status;
    }

    Intent::Unknown(text.to_string())
}

/// Leftmost occurrence of `keyword` followed by whitespace and a non-empty
/// remainder; returns the trimmed remainder.
fn capture_after(command: &str, keyword: &str) -> Option<String> {
    let mut start = 0;
    while let Some(idx) = command[start..].find(keyword) {
        let after = start + idx + keyword.len();
        let rest = &command[after..];
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() && !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
        start += idx + 1;
    }
    None
}

/// Leftmost match of `play <ws> playlist <ws> <query>` anywhere in the
/// text.
fn capture_playlist_query(command: &str) -> Option<String> {
    let mut start = 0;
    while let Some(idx) = command[start..].find("play") {
        let after = start + idx + "play".len();
        let rest = &command[after..];
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            if let Some(tail) = trimmed.strip_prefix("playlist") {
                let query = tail.trim_start();
                if query.len() < tail.len() && !query.is_empty() {
                    return Some(query.to_string());
                }
            }
        }
        start += idx + 1;
    }
    None
}

/// Leftmost match of `volume <ws> (to <ws>)? <digits>`; the first textual
/// match decides, and a level outside 0-100 makes the whole rule fall
/// through.
fn capture_volume_level(command: &str) -> Option<u8> {
    let mut start = 0;
    while let Some(idx) = command[start..].find("volume") {
        let after = start + idx + "volume".len();
        let rest = &command[after..];
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            let digit_start = match trimmed.strip_prefix("to") {
                Some(tail) if tail.starts_with(char::is_whitespace) => tail.trim_start(),
                _ => trimmed,
            };
            let digits: String = digit_start
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                return digits.parse::<u8>().ok().filter(|level| *level <= 100);
            }
        }
        start += idx + 1;
    }
    None
}
