// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_store, save_category};
use crate::error::StoreError;
use crate::models::{BookingDetails, Category, Record};
use crate::store::RecordStore;
use crate::utils::{
    field_args, fmt_money, get_currency_symbol, humanize_field, maybe_print_json,
    parse_category, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn category_of(sub: &clap::ArgMatches) -> Result<Category> {
    parse_category(sub.get_one::<String>("category").unwrap())
}

/// Validates `--set` fields and appends a new record; returns its id.
pub fn add_from_args(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<String> {
    let category = category_of(sub)?;
    let fields = field_args(sub)?;
    let details = BookingDetails::from_fields(category, &fields)?;
    let mut store = load_store(conn)?;
    let id = store.add(details).id.clone();
    save_category(conn, &store, category)?;
    Ok(id)
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = add_from_args(conn, sub)?;
    println!("Added {} '{}'", category_of(sub)?.display_name(), id);
    Ok(())
}

/// Applies `--set` fields on top of the stored record and replaces it.
pub fn update_from_args(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<Record> {
    let category = category_of(sub)?;
    let id = sub.get_one::<String>("id").unwrap().trim();
    let overrides = field_args(sub)?;
    let mut store = load_store(conn)?;
    let current = store
        .get(category, id)
        .ok_or_else(|| StoreError::not_found(category, id))?;
    let details = current.details.merged(&overrides)?;
    let updated = store.update(category, id, details)?.clone();
    save_category(conn, &store, category)?;
    Ok(updated)
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rec = update_from_args(conn, sub)?;
    println!("Updated {} '{}'", rec.category().display_name(), rec.id);
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = category_of(sub)?;
    let id = sub.get_one::<String>("id").unwrap().trim();
    let mut store = load_store(conn)?;
    let removed = store.remove(category, id)?;
    save_category(conn, &store, category)?;
    println!("Removed {} '{}'", category.display_name(), removed.id);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = category_of(sub)?;
    let id = sub.get_one::<String>("id").unwrap().trim();
    let store = load_store(conn)?;
    let rec = store
        .get(category, id)
        .ok_or_else(|| StoreError::not_found(category, id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), rec)? {
        let rows: Vec<Vec<String>> = std::iter::once(("id", rec.id.clone()))
            .chain(rec.details.to_fields())
            .map(|(k, v)| vec![humanize_field(k), v])
            .collect();
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

/// Table rows for one category: id, every field, then profit where it applies.
pub fn table_rows(store: &RecordStore, category: Category, symbol: &str) -> Vec<Vec<String>> {
    store
        .list(category)
        .iter()
        .map(|r| {
            let mut row = vec![r.id.clone()];
            row.extend(r.details.to_fields().into_iter().map(|(_, v)| v));
            if let Some(p) = r.details.profit() {
                row.push(fmt_money(&p, symbol));
            }
            row
        })
        .collect()
}

pub fn table_headers(category: Category) -> Vec<String> {
    let mut h = vec!["ID".to_string()];
    h.extend(category.field_names().iter().map(|f| humanize_field(f)));
    if category != Category::Forex {
        h.push("Profit".to_string());
    }
    h
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = category_of(sub)?;
    let store = load_store(conn)?;
    if maybe_print_json(
        sub.get_flag("json"),
        sub.get_flag("jsonl"),
        &store.list(category),
    )? {
        return Ok(());
    }
    let symbol = get_currency_symbol(conn)?;
    let rows = table_rows(&store, category, &symbol);
    if rows.is_empty() {
        println!("No {} records found", category.display_name().to_lowercase());
        return Ok(());
    }
    let headers = table_headers(category);
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    println!("{}", pretty_table(&header_refs, rows));

    let totals = store.category_stats(category);
    if category == Category::Forex {
        let converted: rust_decimal::Decimal = store
            .list(category)
            .iter()
            .filter_map(|r| match &r.details {
                BookingDetails::Forex(fx) => Some(fx.total_amount),
                _ => None,
            })
            .sum();
        println!(
            "{} transactions | total {}",
            totals.count,
            fmt_money(&converted, &symbol)
        );
        return Ok(());
    }
    println!(
        "{} records | cost {} | revenue {} | profit {}",
        totals.count,
        fmt_money(&totals.total_cost, &symbol),
        fmt_money(&totals.total_revenue, &symbol),
        fmt_money(&totals.total_profit, &symbol)
    );
    Ok(())
}
