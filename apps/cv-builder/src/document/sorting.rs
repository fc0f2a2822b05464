//! Read-only orderings for the academic sections. Stored order is never changed;
//! these only produce views for rendering.

use std::cmp::Reverse;

use crate::models::entries::{Conference, Grant, Publication};
use crate::models::Entry;

/// Leading year, month and day digits of a loosely formatted date ("2023-05", "2023.05.12").
fn date_key(date: &str) -> Option<(i32, u32, u32)> {
    let mut parts = date
        .split(|c: char| c == '-' || c == '/' || c == '.')
        .map(str::trim);
    let year = parts.next()?.parse().ok()?;
    let month = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
    let day = parts.next().and_then(|d| d.parse().ok()).unwrap_or(0);
    Some((year, month, day))
}

/// Keeps only digits and dots, so "$1,200,000" and "₩50,000,000" both parse.
fn amount_value(amount: &str) -> Option<f64> {
    let cleaned: String = amount
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// Newest first; entries without a numeric year go last.
pub fn publications_by_year(items: &[Entry<Publication>]) -> Vec<&Entry<Publication>> {
    let mut view: Vec<_> = items.iter().collect();
    view.sort_by_key(|e| Reverse(e.details.year.trim().parse::<i32>().ok()));
    view
}

pub fn conferences_by_date(items: &[Entry<Conference>]) -> Vec<&Entry<Conference>> {
    let mut view: Vec<_> = items.iter().collect();
    view.sort_by_key(|e| Reverse(date_key(&e.details.date)));
    view
}

/// Largest award first.
pub fn grants_by_amount(items: &[Entry<Grant>]) -> Vec<&Entry<Grant>> {
    let mut view: Vec<_> = items.iter().collect();
    view.sort_by(|a, b| {
        let a = amount_value(&a.details.amount).unwrap_or(f64::NEG_INFINITY);
        let b = amount_value(&b.details.amount).unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    view
}
