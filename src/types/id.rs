//! Resource Identifiers
//!
//! Parsing and validation of Spotify resource identifiers. Identifiers arrive
//! in two equivalent shapes: the URI form `spotify:track:<id>` and the open
//! web URL form `https://open.spotify.com/track/<id>`. Both carry an item
//! category that callers validate against the categories their endpoint
//! accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Category of a Spotify resource identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdCategory {
    Track,
    Album,
    Artist,
    Playlist,
    Show,
    Episode,
    User,
}

impl IdCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Playlist => "playlist",
            Self::Show => "show",
            Self::Episode => "episode",
            Self::User => "user",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "track" => Some(Self::Track),
            "album" => Some(Self::Album),
            "artist" => Some(Self::Artist),
            "playlist" => Some(Self::Playlist),
            "show" => Some(Self::Show),
            "episode" => Some(Self::Episode),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for IdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed Spotify identifier: category plus the bare base-62 id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotifyId {
    pub category: IdCategory,
    pub id: String,
}

impl SpotifyId {
    /// Parse an identifier from its URI (`spotify:track:<id>`) or open web
    /// URL (`https://open.spotify.com/track/<id>`) form.
    pub fn parse(input: &str) -> Result<Self, Error> {
        if let Some(rest) = input.strip_prefix("spotify:") {
            return Self::parse_uri_parts(input, rest);
        }

        if let Some(rest) = input
            .strip_prefix("https://open.spotify.com/")
            .or_else(|| input.strip_prefix("http://open.spotify.com/"))
        {
            // Drop any query string ("?si=..." share suffixes)
            let path = rest.split('?').next().unwrap_or(rest);
            let mut segments = path.split('/');
            let category = segments.next().unwrap_or_default();
            let id = segments.next().unwrap_or_default();
            if segments.next().is_some() {
                return Err(parse_error(input, "unexpected trailing path segments"));
            }
            return Self::from_parts(input, category, id);
        }

        Err(parse_error(
            input,
            "expected a `spotify:` URI or an open.spotify.com URL",
        ))
    }

    fn parse_uri_parts(input: &str, rest: &str) -> Result<Self, Error> {
        let mut parts = rest.split(':');
        let category = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(parse_error(input, "expected exactly `spotify:<type>:<id>`"));
        }
        Self::from_parts(input, category, id)
    }

    fn from_parts(input: &str, category: &str, id: &str) -> Result<Self, Error> {
        let category = IdCategory::parse(category)
            .ok_or_else(|| parse_error(input, &format!("unknown item type `{category}`")))?;

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(parse_error(input, "id part is not a base-62 identifier"));
        }

        Ok(Self {
            category,
            id: id.to_string(),
        })
    }

    /// Parse and check the category against an accepted, non-empty list.
    ///
    /// Fails with [`Error::IdentifierParsing`] on malformed input and
    /// [`Error::InvalidUriType`] when the identifier is well-formed but of a
    /// category the caller does not accept.
    pub fn validate(input: &str, expected: &[IdCategory]) -> Result<Self, Error> {
        debug_assert!(!expected.is_empty(), "expected categories must be non-empty");

        let parsed = Self::parse(input)?;
        if expected.contains(&parsed.category) {
            Ok(parsed)
        } else {
            Err(Error::InvalidUriType {
                expected: expected.to_vec(),
                received: parsed.category,
            })
        }
    }

    /// Render back to the canonical URI form.
    pub fn uri(&self) -> String {
        format!("spotify:{}:{}", self.category, self.id)
    }
}

fn parse_error(input: &str, detail: &str) -> Error {
    Error::IdentifierParsing {
        message: format!("could not parse `{input}`: {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri_form() {
        let id = SpotifyId::parse("spotify:track:4iV5W9uYEdYUVa79Axb7Rh").unwrap();
        assert_eq!(id.category, IdCategory::Track);
        assert_eq!(id.id, "4iV5W9uYEdYUVa79Axb7Rh");
        assert_eq!(id.uri(), "spotify:track:4iV5W9uYEdYUVa79Axb7Rh");
    }

    #[test]
    fn test_parse_url_form() {
        let id =
            SpotifyId::parse("https://open.spotify.com/album/6akEvsycLGftJxYudPjmqK?si=abc123")
                .unwrap();
        assert_eq!(id.category, IdCategory::Album);
        assert_eq!(id.id, "6akEvsycLGftJxYudPjmqK");
    }

    #[test]
    fn test_malformed_inputs() {
        for input in [
            "",
            "4iV5W9uYEdYUVa79Axb7Rh",
            "spotify:track",
            "spotify:track:abc:extra",
            "spotify:mixtape:4iV5W9uYEdYUVa79Axb7Rh",
            "spotify:track:not/base62!",
            "https://example.com/track/4iV5W9uYEdYUVa79Axb7Rh",
        ] {
            let err = SpotifyId::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::IdentifierParsing { .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn test_validate_category_mismatch() {
        let err = SpotifyId::validate(
            "spotify:album:6akEvsycLGftJxYudPjmqK",
            &[IdCategory::Track, IdCategory::Artist],
        )
        .unwrap_err();

        match err {
            Error::InvalidUriType { expected, received } => {
                assert_eq!(expected, vec![IdCategory::Track, IdCategory::Artist]);
                assert_eq!(received, IdCategory::Album);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_accepted() {
        let id = SpotifyId::validate(
            "spotify:artist:0OdUWJ0sBjDrqHygGUXeCF",
            &[IdCategory::Track, IdCategory::Artist],
        )
        .unwrap();
        assert_eq!(id.category, IdCategory::Artist);
    }
}
