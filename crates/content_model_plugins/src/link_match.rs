// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use email_address::EmailAddress;
use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::{AsRefStr, Display};
use url::Url;

static SCHEME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(https?|ftp|mailto|tel|sms|file)://?|^(mailto|tel|sms):")
        .expect("scheme regex is valid")
});

static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9().\- ]{2,}$").expect("phone regex is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LinkScheme {
    Http,
    Https,
    Ftp,
    Mailto,
    Tel,
    Sms,
    File,
}

impl LinkScheme {
    fn parse(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            "ftp" => Some(Self::Ftp),
            "mailto" => Some(Self::Mailto),
            "tel" => Some(Self::Tel),
            "sms" => Some(Self::Sms),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// Text recognised as a link, and the URL it should point to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkMatch {
    pub scheme: LinkScheme,
    pub original_url: String,
    pub normalized_url: String,
}

/// Recognise `text` as a link. Accepts URLs with a known scheme,
/// `www.` hosts (which get `http://`) and bare email addresses (which
/// get `mailto:`). Anything containing whitespace is not a link.
pub fn match_link(text: &str) -> Option<LinkMatch> {
    let text = text.trim();
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return None;
    }

    if SCHEME_PREFIX.is_match(text) {
        let url = Url::parse(text).ok()?;
        let scheme = LinkScheme::parse(url.scheme())?;
        let valid = match scheme {
            LinkScheme::Mailto => EmailAddress::is_valid(url.path()),
            LinkScheme::Tel | LinkScheme::Sms => PHONE_NUMBER.is_match(url.path()),
            LinkScheme::File => true,
            _ => url.host_str().is_some_and(|host| host.contains('.') || host == "localhost"),
        };
        return valid.then(|| LinkMatch {
            scheme,
            original_url: text.to_owned(),
            normalized_url: text.to_owned(),
        });
    }

    let has_www = text.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."));
    if has_www && text.len() > 4 {
        let normalized_url = format!("http://{text}");
        let url = Url::parse(&normalized_url).ok()?;
        return url
            .host_str()
            .is_some_and(|host| host.matches('.').count() >= 2)
            .then(|| LinkMatch {
                scheme: LinkScheme::Http,
                original_url: text.to_owned(),
                normalized_url,
            });
    }

    EmailAddress::is_valid(text).then(|| LinkMatch {
        scheme: LinkScheme::Mailto,
        original_url: text.to_owned(),
        normalized_url: format!("mailto:{text}"),
    })
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    fn normalized(text: &str) -> Option<String> {
        match_link(text).map(|m| m.normalized_url)
    }

    #[test]
    fn urls_with_a_scheme_are_kept_as_typed() {
        assert_that!(normalized("https://matrix.org/docs"))
            .is_equal_to(Some("https://matrix.org/docs".to_owned()));
        assert_that!(match_link("ftp://example.com/file").map(|m| m.scheme))
            .is_equal_to(Some(LinkScheme::Ftp));
        assert_that!(normalized("mailto:alice@example.com"))
            .is_equal_to(Some("mailto:alice@example.com".to_owned()));
        assert_that!(normalized("tel:+44 20 7946 0000")).is_none();
        assert_that!(normalized("tel:+442079460000"))
            .is_equal_to(Some("tel:+442079460000".to_owned()));
    }

    #[test]
    fn www_and_email_get_a_scheme() {
        assert_that!(normalized("www.example.com"))
            .is_equal_to(Some("http://www.example.com".to_owned()));
        assert_that!(normalized("bob@example.org"))
            .is_equal_to(Some("mailto:bob@example.org".to_owned()));
    }

    #[test]
    fn plain_words_are_not_links() {
        assert_that!(normalized("hello")).is_none();
        assert_that!(normalized("www.")).is_none();
        assert_that!(normalized("https://")).is_none();
        assert_that!(normalized("http://nodot")).is_none();
        assert_that!(normalized("see https://matrix.org")).is_none();
        assert_that!(normalized("mailto:not-an-email")).is_none();
    }
}
