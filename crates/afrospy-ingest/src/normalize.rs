//! Total mapping from a raw scraped item to the fields of an ad.
//!
//! Items come from the scraper as loosely shaped JSON. Every lookup below is
//! a first-match-wins ladder in which "falsy" values (missing, `null`, `""`,
//! `0`, `false`) fall through to the next rung.

use afrospy_core::{AdRecord, EMPTY_COPY_PLACEHOLDER, UNKNOWN_PAGE_NAME};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Fields extracted from one raw item, before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAd {
    pub page_name: String,
    /// Body text; empty when the item has none.
    pub body: String,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub cta_link: Option<String>,
    pub archive_id: String,
    pub started_at: NaiveDate,
}

impl NormalizedAd {
    /// Unknown page, no body and no video: nothing worth storing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_name == UNKNOWN_PAGE_NAME && self.body.is_empty() && self.video_url.is_none()
    }

    #[must_use]
    pub fn has_video(&self) -> bool {
        self.video_url.is_some()
    }

    /// Builds the stored row. An empty body becomes the placeholder copy and
    /// the thumbnail mirrors the image.
    #[must_use]
    pub fn into_record(self, platform: &str, trend_score: f64) -> AdRecord {
        let ad_copy = if self.body.is_empty() {
            EMPTY_COPY_PLACEHOLDER.to_owned()
        } else {
            self.body
        };
        AdRecord {
            page_name: self.page_name,
            ad_copy,
            cta_link: self.cta_link,
            video_url: self.video_url,
            thumbnail_url: self.image_url.clone(),
            image_url: self.image_url,
            ad_archive_id: self.archive_id,
            platform: platform.to_owned(),
            is_active: true,
            started_at: self.started_at,
            trend_score,
        }
    }
}

/// Maps `item` onto [`NormalizedAd`]. Never fails: anything missing or
/// malformed degrades to its default, and a missing or unusable start date
/// becomes `today`.
#[must_use]
pub fn normalize_item(item: &Value, today: NaiveDate) -> NormalizedAd {
    let snapshot = item.get("snapshot");
    let snap = |key: &str| snapshot.and_then(|s| s.get(key));
    let first = |key: &str| snap(key).and_then(|list| list.get(0));

    let page_name = first_text([snap("page_name"), item.get("page_name")])
        .unwrap_or_else(|| UNKNOWN_PAGE_NAME.to_owned());

    let body = first_text([
        snap("body").and_then(|b| b.get("text")),
        snap("link_description"),
        snap("title"),
    ])
    .unwrap_or_default();

    let video = first("videos");
    let video_url = first_text([
        video.and_then(|v| v.get("video_hd_url")),
        video.and_then(|v| v.get("video_sd_url")),
    ]);

    let image = first("images");
    let image_url = first_text([
        image.and_then(|i| i.get("resized_image_url")),
        image.and_then(|i| i.get("original_image_url")),
        snap("page_profile_picture_url"),
    ]);

    let cta_link = first_text([snap("link_url")]);

    let archive_id =
        first_text([item.get("ad_archive_id"), item.get("collation_id")]).unwrap_or_default();

    let started_at = item
        .get("start_date")
        .and_then(start_date_from_unix_seconds)
        .unwrap_or(today);

    NormalizedAd {
        page_name,
        body,
        video_url,
        image_url,
        cta_link,
        archive_id,
        started_at,
    }
}

/// First truthy candidate rendered as text.
fn first_text<const N: usize>(candidates: [Option<&Value>; N]) -> Option<String> {
    candidates.into_iter().flatten().find_map(as_text)
}

/// Text form of a truthy scalar. Objects and arrays carry no usable text
/// and are skipped.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()) => {
            Some(n.to_string())
        }
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}

/// UTC calendar date of a Unix timestamp in seconds, given as a number or a
/// numeric string. Fractional seconds are allowed; zero counts as absent.
fn start_date_from_unix_seconds(value: &Value) -> Option<NaiveDate> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !seconds.is_finite() || seconds == 0.0 {
        return None;
    }
    let millis = (seconds * 1000.0).trunc();
    if millis.abs() > 8.64e15 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
