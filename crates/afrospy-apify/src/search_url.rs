//! Facebook Ad Library search URL handed to the scraper actor.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const AD_LIBRARY_BASE: &str = "https://www.facebook.com/ads/library/";

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds the active-ads search URL for `keyword` in `country`.
///
/// The parameter order is fixed so the same inputs always produce the same
/// URL.
#[must_use]
pub fn ad_library_search_url(keyword: &str, country: &str) -> String {
    format!(
        "{AD_LIBRARY_BASE}?active_status=active&ad_type=all&country={}&q={}&media_type=all",
        utf8_percent_encode(country, COMPONENT),
        utf8_percent_encode(keyword, COMPONENT),
    )
}
