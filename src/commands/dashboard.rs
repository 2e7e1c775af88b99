// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_store;
use crate::stats::{BookingSummary, Stats};
use crate::store::DEFAULT_RECENT_LIMIT;
use crate::utils::{fmt_money, get_currency_symbol, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: Stats,
    pub recent_bookings: Vec<BookingSummary>,
}

pub fn build(conn: &Connection, limit: usize) -> Result<Dashboard> {
    let store = load_store(conn)?;
    Ok(Dashboard {
        stats: store.summary_stats(),
        recent_bookings: store.recent_bookings(limit),
    })
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let limit = *sub.get_one::<usize>("limit").unwrap_or(&5);
    let dash = build(conn, limit)?;
    if maybe_print_json(sub.get_flag("json"), false, &dash)? {
        return Ok(());
    }
    let sym = get_currency_symbol(conn)?;
    let s = &dash.stats;
    println!(
        "{}",
        pretty_table(
            &["Revenue", "Cost", "Profit", "Bookings"],
            vec![vec![
                fmt_money(&s.total_revenue, &sym),
                fmt_money(&s.total_cost, &sym),
                fmt_money(&s.total_profit, &sym),
                s.total_bookings.to_string(),
            ]],
        )
    );
    let rows: Vec<Vec<String>> = s
        .service_stats
        .iter()
        .map(|(c, cs)| {
            vec![
                c.display_name().to_string(),
                cs.count.to_string(),
                fmt_money(&cs.total_cost, &sym),
                fmt_money(&cs.total_revenue, &sym),
                fmt_money(&cs.total_profit, &sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Service", "Count", "Cost", "Revenue", "Profit"], rows)
    );
    print_recent(&dash.recent_bookings, &sym);
    Ok(())
}

pub fn recent(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let limit = *sub
        .get_one::<usize>("limit")
        .unwrap_or(&DEFAULT_RECENT_LIMIT);
    let store = load_store(conn)?;
    let feed = store.recent_bookings(limit);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &feed)? {
        print_recent(&feed, &get_currency_symbol(conn)?);
    }
    Ok(())
}

fn print_recent(feed: &[BookingSummary], sym: &str) {
    if feed.is_empty() {
        println!("No bookings found");
        return;
    }
    let rows: Vec<Vec<String>> = feed
        .iter()
        .map(|b| {
            vec![
                b.service_type.to_string(),
                b.id.clone(),
                b.date.format("%d %b %Y").to_string(),
                fmt_money(&b.cost, sym),
                fmt_money(&b.revenue, sym),
                fmt_money(&b.profit, sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Service", "ID", "Date", "Cost", "Revenue", "Profit"], rows)
    );
}
