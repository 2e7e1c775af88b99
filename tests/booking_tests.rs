// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use tripledger::{cli, commands::bookings, db, Category, StoreError};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

/// Parses `tripledger booking <args..>` and returns the leaf matches.
fn booking_matches(args: &[&str]) -> (String, clap::ArgMatches) {
    let mut argv = vec!["tripledger", "booking"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("booking", b)) = matches.subcommand() {
        if let Some((name, sub)) = b.subcommand() {
            return (name.to_string(), sub.clone());
        }
    }
    panic!("no booking subcommand");
}

#[test]
fn visa_adds_get_sequential_ids() {
    let mut conn = setup();
    let args = [
        "add",
        "visa",
        "--set",
        "country=UAE",
        "--set",
        "applicationDate=2024-05-05",
        "--set",
        "costPrice=8000",
        "--set",
        "sellingPrice=10000",
    ];
    let (_, sub) = booking_matches(&args);
    assert_eq!(bookings::add_from_args(&mut conn, &sub).unwrap(), "v1");
    assert_eq!(bookings::add_from_args(&mut conn, &sub).unwrap(), "v2");

    let store = db::load_store(&conn).unwrap();
    let ids: Vec<_> = store
        .list(Category::Visa)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, ["v1", "v2"]);
}

#[test]
fn invalid_fields_leave_store_untouched() {
    let mut conn = setup();
    let (_, sub) = booking_matches(&[
        "add",
        "wajibath",
        "-s",
        "amountPaid=lots",
        "-s",
        "datePaid=2024-05-01",
    ]);
    let err = bookings::add_from_args(&mut conn, &sub).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Validation(_))
    ));
    assert!(db::load_store(&conn).unwrap().is_empty());
}

#[test]
fn update_merges_and_keeps_neighbours() {
    let mut conn = setup();
    let store = tripledger::RecordStore::with_sample_data();
    db::save_all(&mut conn, &store).unwrap();

    let (_, sub) = booking_matches(&["update", "flight", "f1", "--set", "sellingPrice=29500"]);
    let rec = bookings::update_from_args(&mut conn, &sub).unwrap();
    assert_eq!(rec.id, "f1");
    assert_eq!(rec.details.profit(), Some(4500.into()));

    let reloaded = db::load_store(&conn).unwrap();
    assert_eq!(
        reloaded.get(Category::Flight, "f2"),
        store.get(Category::Flight, "f2")
    );
    assert_eq!(reloaded.list(Category::Flight)[0].id, "f1");
}

#[test]
fn update_unknown_id_is_not_found() {
    let mut conn = setup();
    let store = tripledger::RecordStore::with_sample_data();
    db::save_all(&mut conn, &store).unwrap();

    let (_, sub) = booking_matches(&["update", "hotel", "h7", "--set", "notes=late checkout"]);
    let err = bookings::update_from_args(&mut conn, &sub).unwrap_err();
    assert_eq!(
        err.downcast_ref::<StoreError>(),
        Some(&StoreError::NotFound {
            category: Category::Hotel,
            id: "h7".into()
        })
    );

    let reloaded = db::load_store(&conn).unwrap();
    for c in Category::ALL {
        assert_eq!(reloaded.list(c), store.list(c));
    }
}

#[test]
fn removing_twice_reports_not_found() {
    let mut conn = setup();
    let (_, add) = booking_matches(&[
        "add",
        "car",
        "--set",
        "fromLocation=Chennai",
        "--set",
        "toLocation=Pondicherry",
        "--set",
        "hireDate=2024-05-25",
        "--set",
        "returnDate=2024-05-27",
        "--set",
        "costPrice=5000",
        "--set",
        "sellingPrice=6500",
    ]);
    assert_eq!(bookings::add_from_args(&mut conn, &add).unwrap(), "c1");

    let argv = ["tripledger", "booking", "rm", "car", "c1"];
    let m = cli::build_cli().get_matches_from(argv);
    let (_, booking_m) = m.subcommand().unwrap();
    bookings::handle(&mut conn, booking_m).unwrap();
    assert!(db::load_store(&conn).unwrap().list(Category::Car).is_empty());

    let err = bookings::handle(&mut conn, booking_m).unwrap_err();
    assert_eq!(
        err.downcast_ref::<StoreError>(),
        Some(&StoreError::NotFound {
            category: Category::Car,
            id: "c1".into()
        })
    );
}

#[test]
fn table_rows_include_profit_except_forex() {
    let store = tripledger::RecordStore::with_sample_data();
    let rows = bookings::table_rows(&store, Category::Visa, "₹");
    assert_eq!(rows[0].first().unwrap(), "v1");
    assert_eq!(rows[0].last().unwrap(), "₹2000.00");
    assert_eq!(
        bookings::table_headers(Category::Visa).len(),
        rows[0].len()
    );

    let fx = bookings::table_rows(&store, Category::Forex, "₹");
    assert_eq!(bookings::table_headers(Category::Forex).len(), fx[0].len());
    assert_eq!(fx[0].last().unwrap(), "For Dubai trip");
}
