//! Recency score for an ad.
//!
//! Linear decay from 1.0 on the start day to 0.0 at 90 days, plus a flat
//! 0.15 bonus (capped at 1.0) for ads with video. Rounded to 3 decimals.

use chrono::{DateTime, NaiveDate, Utc};

const DECAY_DAYS: f64 = 90.0;
const VIDEO_BONUS: f64 = 0.15;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Scores an ad started on `started_at` (taken as midnight UTC) as seen at
/// `now`. Always within `[0, 1]`.
#[must_use]
pub fn trend_score_at(started_at: NaiveDate, has_video: bool, now: DateTime<Utc>) -> f64 {
    let start = started_at.and_time(chrono::NaiveTime::MIN).and_utc();
    #[allow(clippy::cast_precision_loss)]
    let age_days = (now - start).num_milliseconds() as f64 / MILLIS_PER_DAY;

    let mut score = (1.0 - age_days / DECAY_DAYS).max(0.0);
    if has_video {
        score = (score + VIDEO_BONUS).min(1.0);
    }
    // Start dates in the future would otherwise score above 1.
    round3(score.min(1.0))
}

#[must_use]
pub fn trend_score(started_at: NaiveDate, has_video: bool) -> f64 {
    trend_score_at(started_at, has_video, Utc::now())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn days_later(days: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)
    }

    #[test]
    fn fresh_ad_scores_one() {
        assert!((trend_score_at(start(), false, days_later(0)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ninety_days_scores_zero() {
        assert!(trend_score_at(start(), false, days_later(90)).abs() < f64::EPSILON);
    }

    #[test]
    fn old_ads_clamp_at_zero() {
        let score = trend_score_at(start(), false, days_later(200));
        assert!(score.abs() < f64::EPSILON);
        assert!(score >= 0.0);
    }

    #[test]
    fn halfway_is_half() {
        assert!((trend_score_at(start(), false, days_later(45)) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn video_adds_flat_bonus_up_to_one() {
        let at_45 = days_later(45);
        assert!((trend_score_at(start(), true, at_45) - 0.65).abs() < 1e-9);
        assert!((trend_score_at(start(), true, days_later(0)) - 1.0).abs() < f64::EPSILON);
        assert!((trend_score_at(start(), true, days_later(120)) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn video_bonus_matches_formula_at_every_age() {
        for days in 0..=120 {
            let now = days_later(days);
            let plain = trend_score_at(start(), false, now);
            let video = trend_score_at(start(), true, now);
            let expected = round3((plain + VIDEO_BONUS).min(1.0));
            assert!((video - expected).abs() < 1e-9, "day {days}");
        }
    }

    #[test]
    fn non_increasing_with_age_and_bounded() {
        for has_video in [false, true] {
            let mut previous = f64::INFINITY;
            for days in 0..=200 {
                let score = trend_score_at(start(), has_video, days_later(days));
                assert!((0.0..=1.0).contains(&score), "day {days}: {score}");
                assert!(score <= previous, "day {days}: {score} > {previous}");
                previous = score;
            }
        }
    }

    #[test]
    fn rounds_to_three_decimals() {
        // 1 - 1/90 = 0.98888...
        assert!((trend_score_at(start(), false, days_later(1)) - 0.989).abs() < 1e-9);
    }

    #[test]
    fn future_start_dates_stay_bounded() {
        let score = trend_score_at(start(), false, days_later(-10));
        assert!((score - 1.0).abs() < f64::EPSILON);
    }
}
