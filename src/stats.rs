// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{BookingDetails, Category, Record};
use crate::store::RecordStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_bookings: usize,
    pub service_stats: BTreeMap<Category, CategoryStats>,
}

/// One row of the cross-category "recent bookings" feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub category: Category,
    pub service_type: &'static str,
    pub date: NaiveDate,
    pub cost: Decimal,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub id: String,
}

// (cost, revenue) as counted by the summary. Forex has no cost or
// selling price, so it only contributes to the booking count.
fn summary_amounts(details: &BookingDetails) -> (Decimal, Decimal) {
    match details {
        BookingDetails::Flight(d) | BookingDetails::Train(d) => (d.cost_price, d.selling_price),
        BookingDetails::Hotel(d) => (d.cost_price, d.selling_price),
        BookingDetails::Tour(d) => (d.cost_price, d.selling_price),
        BookingDetails::Car(d) => (d.cost_price, d.selling_price),
        BookingDetails::Visa(d) => (d.cost_price, d.selling_price),
        BookingDetails::Forex(_) => (Decimal::ZERO, Decimal::ZERO),
        BookingDetails::Wajibath(d) => (d.amount_paid, Decimal::ZERO),
    }
}

// (date, cost, revenue) as shown in the recent bookings feed.
fn feed_entry(details: &BookingDetails) -> (NaiveDate, Decimal, Decimal) {
    match details {
        BookingDetails::Flight(d) | BookingDetails::Train(d) => {
            (d.booking_date, d.cost_price, d.selling_price)
        }
        BookingDetails::Hotel(d) => (d.check_in_date, d.cost_price, d.selling_price),
        BookingDetails::Tour(d) => (d.travel_date, d.cost_price, d.selling_price),
        BookingDetails::Car(d) => (d.hire_date, d.cost_price, d.selling_price),
        BookingDetails::Visa(d) => (d.application_date, d.cost_price, d.selling_price),
        BookingDetails::Forex(d) => (d.transaction_date, Decimal::ZERO, d.total_amount),
        BookingDetails::Wajibath(d) => (d.date_paid, d.amount_paid, Decimal::ZERO),
    }
}

pub fn category_totals(records: &[Record]) -> CategoryStats {
    let (cost, revenue) = records
        .iter()
        .map(|r| summary_amounts(&r.details))
        .fold((Decimal::ZERO, Decimal::ZERO), |(c, v), (rc, rv)| {
            (c + rc, v + rv)
        });
    CategoryStats {
        total_cost: cost,
        total_revenue: revenue,
        total_profit: revenue - cost,
        count: records.len(),
    }
}

pub fn summarize(store: &RecordStore) -> Stats {
    let mut stats = Stats::default();
    for category in Category::ALL {
        let totals = category_totals(store.list(category));
        stats.total_cost += totals.total_cost;
        stats.total_revenue += totals.total_revenue;
        stats.total_bookings += totals.count;
        stats.service_stats.insert(category, totals);
    }
    stats.total_profit = stats.total_revenue - stats.total_cost;
    stats
}

/// Newest first by each category's booking date; ties keep category order,
/// then insertion order.
pub fn recent(store: &RecordStore, limit: usize) -> Vec<BookingSummary> {
    let mut feed: Vec<BookingSummary> = Category::ALL
        .iter()
        .flat_map(|c| store.list(*c))
        .map(|r| {
            let (date, cost, revenue) = feed_entry(&r.details);
            BookingSummary {
                category: r.category(),
                service_type: r.category().display_name(),
                date,
                cost,
                revenue,
                profit: revenue - cost,
                id: r.id.clone(),
            }
        })
        .collect();
    feed.sort_by(|a, b| b.date.cmp(&a.date));
    feed.truncate(limit);
    feed
}
