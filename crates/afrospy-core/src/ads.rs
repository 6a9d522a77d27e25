//! The canonical ad record persisted to the `ads` table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Page name used when a scraped item carries no usable page name.
pub const UNKNOWN_PAGE_NAME: &str = "Page inconnue";

/// Stored in `ad_copy` when the scraped item has no body text.
pub const EMPTY_COPY_PLACEHOLDER: &str = "(aucun texte)";

pub const DEFAULT_PLATFORM: &str = "facebook";

/// One normalized advertisement, shaped exactly like a row of the `ads`
/// table. `(page_name, ad_copy)` is the conflict key on upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub page_name: String,
    pub ad_copy: String,
    pub cta_link: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub ad_archive_id: String,
    pub platform: String,
    pub is_active: bool,
    pub started_at: NaiveDate,
    pub trend_score: f64,
}

impl AdRecord {
    /// The natural key the store resolves conflicts on.
    #[must_use]
    pub fn conflict_key(&self) -> (&str, &str) {
        (&self.page_name, &self.ad_copy)
    }

    #[must_use]
    pub fn has_video(&self) -> bool {
        self.video_url.is_some()
    }

    /// Whether the call-to-action points at a Shopify storefront.
    ///
    /// Product pages (`/products/...`) and `*.myshopify.com` hosts both
    /// count.
    #[must_use]
    pub fn is_shopify_lander(&self) -> bool {
        self.cta_link
            .as_deref()
            .is_some_and(|link| link.contains("/products") || link.contains("myshopify.com"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cta_link: Option<&str>) -> AdRecord {
        AdRecord {
            page_name: "Boutique Kara".to_string(),
            ad_copy: "Livraison gratuite".to_string(),
            cta_link: cta_link.map(str::to_string),
            video_url: None,
            image_url: Some("https://cdn.example.com/a.jpg".to_string()),
            thumbnail_url: Some("https://cdn.example.com/a.jpg".to_string()),
            ad_archive_id: "123".to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            is_active: true,
            started_at: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            trend_score: 0.8,
        }
    }

    #[test]
    fn serializes_started_at_as_calendar_date() {
        let json = serde_json::to_value(record(None)).unwrap();
        assert_eq!(json["started_at"], "2026-10-01");
        assert_eq!(json["is_active"], true);
        assert_eq!(json["cta_link"], serde_json::Value::Null);
        assert_eq!(json["page_name"], "Boutique Kara");
    }

    #[test]
    fn conflict_key_is_page_and_copy() {
        let r = record(None);
        assert_eq!(r.conflict_key(), ("Boutique Kara", "Livraison gratuite"));
    }

    #[test]
    fn shopify_lander_detects_product_paths() {
        assert!(record(Some("https://kara.shop/products/serum")).is_shopify_lander());
        assert!(record(Some("https://kara.myshopify.com/")).is_shopify_lander());
    }

    #[test]
    fn shopify_lander_false_for_other_links() {
        assert!(!record(Some("https://wa.me/23500000000")).is_shopify_lander());
        assert!(!record(None).is_shopify_lander());
    }
}
