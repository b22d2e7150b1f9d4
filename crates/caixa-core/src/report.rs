//! # Report Windows & Result Types
//!
//! Date-range resolution for sales reports, plus the aggregate shapes the
//! ledger queries fill in.
//!
//! ## Why Local Time?
//! Operators open and close tills by wall-clock time, so "sales of
//! 2024-06-10" means the local calendar day, not the UTC one. Storage is
//! UTC; a report day is widened to `[00:00:00, 23:59:59]` in the till's
//! local zone and only then converted to UTC bounds for querying.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::PaymentMethod;

/// Length of the default report window, in calendar days.
pub const DEFAULT_REPORT_DAYS: i64 = 7;

/// Default limit for the top-products ranking.
pub const TOP_PRODUCTS_LIMIT: u32 = 10;

// =============================================================================
// Report Window
// =============================================================================

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

impl ReportWindow {
    /// The default window: the trailing [`DEFAULT_REPORT_DAYS`] calendar days
    /// ending `today`, inclusive.
    pub fn default_ending(today: NaiveDate) -> Self {
        ReportWindow {
            start_day: today - Duration::days(DEFAULT_REPORT_DAYS - 1),
            end_day: today,
        }
    }

    /// A single-day window.
    pub fn single_day(day: NaiveDate) -> Self {
        ReportWindow {
            start_day: day,
            end_day: day,
        }
    }

    /// Resolves user-supplied `YYYY-MM-DD` filter strings.
    ///
    /// Missing or malformed input falls back *silently* to the default
    /// window - report screens always render, they never reject a query
    /// string.
    ///
    /// ## Example
    /// ```rust
    /// use caixa_core::report::ReportWindow;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    /// let w = ReportWindow::resolve(None, None, today);
    /// assert_eq!(w.start_day, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    /// assert_eq!(w.end_day, today);
    /// ```
    pub fn resolve(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Self {
        let parsed = |s: Option<&str>| {
            s.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
        };

        match (parsed(start), parsed(end)) {
            (Some(start_day), Some(end_day)) => ReportWindow { start_day, end_day },
            _ => ReportWindow::default_ending(today),
        }
    }

    /// The UTC query bounds: local `00:00:00` of the first day through local
    /// `23:59:59` of the last day.
    pub fn utc_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (local_day_start_utc(self.start_day), local_day_end_utc(self.end_day))
    }
}

/// UTC instant of local midnight at the start of `day`.
pub fn local_day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    local_to_utc(day.and_time(NaiveTime::MIN))
}

/// UTC instant of local `23:59:59` at the end of `day`.
pub fn local_day_end_utc(day: NaiveDate) -> DateTime<Utc> {
    local_to_utc(day.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::seconds(1))
}

/// Converts a local wall-clock time to UTC.
///
/// DST transitions make some wall-clock times ambiguous (fall-back) or
/// nonexistent (spring-forward). Ambiguous times take the earlier instant;
/// nonexistent ones are nudged forward an hour.
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => match Local.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&naive),
        },
    }
}

// =============================================================================
// Aggregate Shapes
// =============================================================================

/// Per-payment-method slice of a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MethodBreakdown {
    pub method: PaymentMethod,
    pub sale_count: i64,
    pub total_cents: i64,
}

/// Headline report figures for a window: count, revenue, average ticket,
/// and the per-method split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub total_cents: i64,
    /// total / count, zero when there were no sales.
    pub average_ticket_cents: i64,
    pub by_method: Vec<MethodBreakdown>,
}

impl SalesSummary {
    /// An all-zero summary - report queries return this for empty windows
    /// instead of erroring.
    pub fn empty() -> Self {
        SalesSummary {
            sale_count: 0,
            total_cents: 0,
            average_ticket_cents: 0,
            by_method: Vec::new(),
        }
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One row of the best-sellers ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopProduct {
    pub product_id: String,
    pub barcode: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

/// One flat sale-item row for the external spreadsheet exporter.
///
/// Pure serialization contract: the exporter turns a `Vec` of these into a
/// workbook; nothing in the core knows about spreadsheet formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItemExportRow {
    pub sale_id: String,
    pub sale_number: String,
    pub sold_at: DateTime<Utc>,
    pub operator_name: String,
    pub payment_method: PaymentMethod,
    pub product_barcode: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// The admin landing-page figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Finalized revenue of the current local day.
    pub today_total_cents: i64,
    /// Active products at or below their minimum stock.
    pub low_stock_count: i64,
    /// Active catalog size.
    pub active_products: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_is_trailing_seven_days() {
        // report run on 2024-06-10 with no params covers [06-04, 06-10]
        let w = ReportWindow::resolve(None, None, day(2024, 6, 10));
        assert_eq!(w.start_day, day(2024, 6, 4));
        assert_eq!(w.end_day, day(2024, 6, 10));
    }

    #[test]
    fn test_resolve_parses_valid_dates() {
        let w = ReportWindow::resolve(Some("2024-01-01"), Some("2024-01-31"), day(2024, 6, 10));
        assert_eq!(w.start_day, day(2024, 1, 1));
        assert_eq!(w.end_day, day(2024, 1, 31));
    }

    #[test]
    fn test_resolve_falls_back_silently_on_garbage() {
        let today = day(2024, 6, 10);
        let fallback = ReportWindow::default_ending(today);

        assert_eq!(ReportWindow::resolve(Some("10/06/2024"), Some("2024-06-10"), today), fallback);
        assert_eq!(ReportWindow::resolve(Some("2024-06-01"), Some("not-a-date"), today), fallback);
        assert_eq!(ReportWindow::resolve(Some("2024-13-40"), None, today), fallback);
        assert_eq!(ReportWindow::resolve(None, Some("2024-06-10"), today), fallback);
    }

    #[test]
    fn test_utc_bounds_cover_the_whole_day() {
        let w = ReportWindow::single_day(day(2024, 6, 10));
        let (start, end) = w.utc_bounds();

        // 23:59:59 of the same local day
        assert_eq!(end - start, Duration::days(1) - Duration::seconds(1));

        // converting back lands on the requested local day
        let local_start = start.with_timezone(&Local);
        assert_eq!(local_start.date_naive(), day(2024, 6, 10));
        assert_eq!(local_start.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_summary_empty_is_all_zero() {
        let s = SalesSummary::empty();
        assert_eq!(s.sale_count, 0);
        assert_eq!(s.total_cents, 0);
        assert_eq!(s.average_ticket_cents, 0);
        assert!(s.by_method.is_empty());
    }
}
