//! Country and limit policy applied to ingestion triggers.

use crate::app_config::AppConfig;

/// Markets the trigger endpoint is allowed to target. Anything else is
/// coerced to the configured default.
pub const ALLOWED_COUNTRIES: &[&str] = &[
    "MA", "DZ", "TN", "EG", "SN", "CI", "CM", "GA", "TD", "CD", "BJ", "TG", "NE", "BF", "ML",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPolicy {
    pub default_country: String,
    pub max_limit: u32,
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            default_country: "TD".to_string(),
            max_limit: 30,
        }
    }
}

impl TriggerPolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            default_country: config.default_country.clone(),
            max_limit: config.max_limit,
        }
    }

    /// Returns the country the search will actually target.
    ///
    /// Input is trimmed and upper-cased before the allow-list check.
    #[must_use]
    pub fn effective_country(&self, requested: Option<&str>) -> String {
        let candidate = requested.unwrap_or_default().trim().to_ascii_uppercase();
        if ALLOWED_COUNTRIES.contains(&candidate.as_str()) {
            candidate
        } else {
            self.default_country.clone()
        }
    }

    /// Clamps the requested result count to `[1, max_limit]`. A missing
    /// limit means "as many as allowed".
    #[must_use]
    pub fn effective_limit(&self, requested: Option<i64>) -> u32 {
        let max = i64::from(self.max_limit);
        let clamped = requested.unwrap_or(max).clamp(1, max);
        u32::try_from(clamped).unwrap_or(self.max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_country_passes_through() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.effective_country(Some("SN")), "SN");
        assert_eq!(policy.effective_country(Some("TD")), "TD");
    }

    #[test]
    fn country_outside_allow_list_uses_default() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.effective_country(Some("US")), "TD");
        assert_eq!(policy.effective_country(Some("FR")), "TD");
    }

    #[test]
    fn missing_or_blank_country_uses_default() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.effective_country(None), "TD");
        assert_eq!(policy.effective_country(Some("  ")), "TD");
    }

    #[test]
    fn country_is_case_insensitive() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.effective_country(Some(" ci ")), "CI");
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.effective_limit(Some(500)), 30);
        assert_eq!(policy.effective_limit(Some(30)), 30);
        assert_eq!(policy.effective_limit(Some(5)), 5);
    }

    #[test]
    fn limit_has_floor_of_one() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.effective_limit(Some(0)), 1);
        assert_eq!(policy.effective_limit(Some(-4)), 1);
    }

    #[test]
    fn missing_limit_defaults_to_max() {
        let policy = TriggerPolicy {
            default_country: "MA".to_string(),
            max_limit: 12,
        };
        assert_eq!(policy.effective_limit(None), 12);
        assert_eq!(policy.effective_country(Some("XX")), "MA");
    }
}
