/// Secret message: link codec and progressive reveal.
///
/// A message travels as Base64 of its UTF-8 bytes in the `msg` query
/// parameter of a share link. Decoding accepts missing padding, since links
/// pasted by hand often lose trailing `=`.
///
/// The reveal cursor advances one visible character per NPC encounter,
/// skipping whitespace, and stops at the end of the message.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::error::GameError;

pub const DEFAULT_MESSAGE: &str = "You Win!";
pub const QUERY_KEY: &str = "msg";

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ── Codec ──

pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn decode(encoded: &str) -> Result<String, GameError> {
    let bytes = LENIENT.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// `<base_url>?msg=<base64>`
pub fn share_link(base_url: &str, text: &str) -> String {
    format!("{}?{}={}", base_url, QUERY_KEY, encode(text))
}

/// Value of `key` in a URL or bare query string. First match wins.
///
/// Only the characters Base64 needs (`+`, `/`, `=`) are percent-decoded.
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let query = match url.split_once('?') {
        Some((_, q)) => q,
        None => url,
    };
    let query = query.split('#').next().unwrap_or("");
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, v)| *k == key && !v.is_empty())
        .map(|(_, v)| percent_decode_b64(v))
}

fn percent_decode_b64(v: &str) -> String {
    v.replace("%2B", "+")
        .replace("%2b", "+")
        .replace("%2F", "/")
        .replace("%2f", "/")
        .replace("%3D", "=")
        .replace("%3d", "=")
}

// ── Reveal ──

/// What an encounter produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RevealStep {
    /// Next character the NPC now carries.
    Next(char),
    /// The cursor just reached the end.
    Finished,
    /// Already at the end on a previous encounter.
    Exhausted,
}

#[derive(Clone, Debug)]
pub struct Reveal {
    chars: Vec<char>,
    cursor: usize,
}

impl Reveal {
    /// The cursor starts on the first printable character.
    pub fn new(message: &str) -> Self {
        let chars: Vec<char> = message.chars().collect();
        let cursor = chars.iter().take_while(|c| c.is_whitespace()).count();
        Reveal { chars, cursor }
    }

    /// Decode the `msg` parameter, or use the default message when absent.
    pub fn from_param(param: Option<&str>) -> Result<Self, GameError> {
        match param {
            Some(p) if !p.trim().is_empty() => Ok(Reveal::new(&decode(p)?)),
            _ => Ok(Reveal::new(DEFAULT_MESSAGE)),
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    /// Character under the cursor; `None` once complete.
    pub fn current(&self) -> Option<char> {
        self.chars.get(self.cursor).copied()
    }

    /// First printable character; `None` for a blank message.
    pub fn first(&self) -> Option<char> {
        self.chars.iter().copied().find(|c| !c.is_whitespace())
    }

    /// Everything before the cursor.
    pub fn revealed(&self) -> String {
        self.chars[..self.cursor].iter().collect()
    }

    /// Step past the current character and any whitespace after it.
    /// The cursor never moves past the end.
    pub fn advance(&mut self) -> RevealStep {
        if self.is_complete() {
            return RevealStep::Exhausted;
        }
        self.cursor += 1;
        while self.current().map_or(false, char::is_whitespace) {
            self.cursor += 1;
        }
        match self.current() {
            Some(c) => RevealStep::Next(c),
            None => RevealStep::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_utf8_bytes() {
        assert_eq!(encode("Hi"), "SGk=");
        assert_eq!(encode("é"), "w6k=");
        assert_eq!(decode("w6k=").unwrap(), "é");
    }

    #[test]
    fn decode_accepts_missing_padding() {
        assert_eq!(decode("SGk").unwrap(), "Hi");
        assert_eq!(decode("SGk=").unwrap(), "Hi");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode("!!!not base64"), Err(GameError::Base64(_))));
        // 0xFF is never valid UTF-8
        assert!(matches!(decode("/w=="), Err(GameError::Utf8(_))));
    }

    #[test]
    fn query_param_from_link() {
        let link = share_link("http://localhost:10001/", "Hi");
        assert_eq!(link, "http://localhost:10001/?msg=SGk=");
        assert_eq!(query_param(&link, "msg").as_deref(), Some("SGk="));
        assert_eq!(query_param("a=1&msg=abc%3D%3D#frag", "msg").as_deref(), Some("abc=="));
        assert_eq!(query_param("http://x/?other=1", "msg"), None);
        assert_eq!(query_param("http://x/?msg=&msg=b", "msg").as_deref(), Some("b"));
    }

    #[test]
    fn default_message_when_param_missing() {
        let r = Reveal::from_param(None).unwrap();
        assert_eq!(r.text(), DEFAULT_MESSAGE);
        let r = Reveal::from_param(Some("  ")).unwrap();
        assert_eq!(r.text(), DEFAULT_MESSAGE);
        let r = Reveal::from_param(Some("SGk=")).unwrap();
        assert_eq!(r.text(), "Hi");
    }

    #[test]
    fn advance_skips_whitespace() {
        let mut r = Reveal::new("a  b");
        assert_eq!(r.current(), Some('a'));
        assert_eq!(r.advance(), RevealStep::Next('b'));
        assert_eq!(r.cursor(), 3);
        assert_eq!(r.revealed(), "a  ");
    }

    #[test]
    fn advance_clamps_at_end() {
        let mut r = Reveal::new("ab ");
        assert_eq!(r.advance(), RevealStep::Next('b'));
        // trailing whitespace is skipped straight to the end
        assert_eq!(r.advance(), RevealStep::Finished);
        assert!(r.is_complete());
        assert_eq!(r.revealed(), "ab ");
        for _ in 0..5 {
            assert_eq!(r.advance(), RevealStep::Exhausted);
        }
        assert_eq!(r.cursor(), 3);
        assert_eq!(r.current(), None);
    }

    #[test]
    fn empty_message_is_already_complete() {
        let mut r = Reveal::new("");
        assert!(r.is_complete());
        assert_eq!(r.first(), None);
        assert_eq!(r.advance(), RevealStep::Exhausted);
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        let mut r = Reveal::new("  hi");
        assert_eq!(r.cursor(), 2);
        assert_eq!(r.current(), Some('h'));
        assert_eq!(r.first(), Some('h'));
        assert_eq!(r.advance(), RevealStep::Next('i'));

        let r = Reveal::new(" \t ");
        assert!(r.is_complete());
        assert_eq!(r.first(), None);
    }

    #[test]
    fn cursor_is_monotonic() {
        let mut r = Reveal::new("You Win!");
        let mut last = r.cursor();
        for _ in 0..20 {
            r.advance();
            assert!(r.cursor() >= last);
            last = r.cursor();
        }
        assert_eq!(r.revealed(), "You Win!");
    }

    proptest! {
        #[test]
        fn link_round_trips_any_text(text in any::<String>()) {
            let link = share_link("http://localhost/", &text);
            let param = query_param(&link, QUERY_KEY);
            let decoded = match param {
                Some(p) => decode(&p).unwrap(),
                // empty text encodes to an empty value
                None => String::new(),
            };
            prop_assert_eq!(decoded, text);
        }
    }
}
