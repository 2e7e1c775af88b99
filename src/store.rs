// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::models::{
    BookingDetails, CarDetails, Category, ForexDetails, HotelDetails, Record, RouteDetails,
    TourDetails, VisaDetails, WajibathDetails,
};
use crate::stats::{self, BookingSummary, CategoryStats, Stats};

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// In-memory bookings, one ordered collection per category.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<Category, Vec<Record>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, category: Category) -> &[Record] {
        self.records
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Like [`list`](Self::list) but keyed by name; unknown names yield nothing.
    pub fn list_by_key(&self, key: &str) -> &[Record] {
        match key.parse::<Category>() {
            Ok(c) => self.list(c),
            Err(_) => &[],
        }
    }

    pub fn get(&self, category: Category, id: &str) -> Option<&Record> {
        self.list(category).iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn add(&mut self, details: BookingDetails) -> &Record {
        let category = details.category();
        let id = self.next_id(category);
        info!(%category, %id, "adding record");
        let bucket = self.records.entry(category).or_default();
        bucket.push(Record { id, details });
        &bucket[bucket.len() - 1]
    }

    /// Replaces the record with `id` wholesale; the id itself never changes.
    pub fn update(
        &mut self,
        category: Category,
        id: &str,
        details: BookingDetails,
    ) -> StoreResult<&Record> {
        if details.category() != category {
            return Err(StoreError::validation(format!(
                "{} details cannot replace a {} record",
                details.category(),
                category
            )));
        }
        let slot = self
            .records
            .get_mut(&category)
            .and_then(|bucket| bucket.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::not_found(category, id))?;
        info!(%category, id, "updating record");
        slot.details = details;
        Ok(&*slot)
    }

    pub fn remove(&mut self, category: Category, id: &str) -> StoreResult<Record> {
        let bucket = self
            .records
            .get_mut(&category)
            .ok_or_else(|| StoreError::not_found(category, id))?;
        let idx = bucket
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(category, id))?;
        info!(%category, id, "removing record");
        Ok(bucket.remove(idx))
    }

    /// Swaps in a category's records as loaded from storage.
    pub fn replace_category(&mut self, category: Category, records: Vec<Record>) {
        debug!(%category, count = records.len(), "replacing category");
        self.records.insert(category, records);
    }

    pub fn summary_stats(&self) -> Stats {
        stats::summarize(self)
    }

    pub fn category_stats(&self, category: Category) -> CategoryStats {
        stats::category_totals(self.list(category))
    }

    pub fn recent_bookings(&self, limit: usize) -> Vec<BookingSummary> {
        stats::recent(self, limit)
    }

    /// `<prefix><n>` with the smallest unused positive `n` in this category.
    fn next_id(&self, category: Category) -> String {
        let prefix = category.id_prefix();
        let taken: HashSet<&str> = self.list(category).iter().map(|r| r.id.as_str()).collect();
        (1u64..)
            .map(|n| format!("{}{}", prefix, n))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| format!("{}0", prefix))
    }

    /// The agency's demo data set.
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();
        for (category, records) in sample_records() {
            store.replace_category(category, records);
        }
        store
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn rec(id: &str, details: BookingDetails) -> Record {
    Record {
        id: id.to_string(),
        details,
    }
}

fn sample_records() -> Vec<(Category, Vec<Record>)> {
    vec![
        (
            Category::Flight,
            vec![
                rec(
                    "f1",
                    BookingDetails::Flight(RouteDetails {
                        from_city: "Mumbai".into(),
                        to_city: "Dubai".into(),
                        booking_date: ymd(2024, 5, 15),
                        travel_date: ymd(2024, 6, 1),
                        cost_price: Decimal::from(25000),
                        selling_price: Decimal::from(28000),
                        notes: "Round trip, Emirates Airlines".into(),
                    }),
                ),
                rec(
                    "f2",
                    BookingDetails::Flight(RouteDetails {
                        from_city: "Chennai".into(),
                        to_city: "Singapore".into(),
                        booking_date: ymd(2024, 5, 10),
                        travel_date: ymd(2024, 6, 15),
                        cost_price: Decimal::from(30000),
                        selling_price: Decimal::from(34500),
                        notes: "One way, Singapore Airlines".into(),
                    }),
                ),
            ],
        ),
        (
            Category::Hotel,
            vec![rec(
                "h1",
                BookingDetails::Hotel(HotelDetails {
                    hotel_name: "Burj Al Arab".into(),
                    location: "Dubai, UAE".into(),
                    check_in_date: ymd(2024, 6, 1),
                    check_out_date: ymd(2024, 6, 5),
                    cost_price: Decimal::from(120000),
                    selling_price: Decimal::from(135000),
                    notes: "Deluxe suite, breakfast included".into(),
                }),
            )],
        ),
        (
            Category::Tour,
            vec![rec(
                "t1",
                BookingDetails::Tour(TourDetails {
                    destination: "Bali, Indonesia".into(),
                    travel_date: ymd(2024, 7, 10),
                    return_date: ymd(2024, 7, 17),
                    cost_price: Decimal::from(85000),
                    selling_price: Decimal::from(98000),
                    details: "Includes hotel, flights, and local tours".into(),
                    notes: "4-star accommodation, all meals included".into(),
                }),
            )],
        ),
        (
            Category::Forex,
            vec![rec(
                "fx1",
                BookingDetails::Forex(ForexDetails {
                    currency: "USD".into(),
                    amount: Decimal::from(5000),
                    exchange_rate: Decimal::new(835, 1),
                    total_amount: Decimal::from(417500),
                    transaction_date: ymd(2024, 5, 20),
                    notes: "For Dubai trip".into(),
                }),
            )],
        ),
        (
            Category::Wajibath,
            vec![rec(
                "w1",
                BookingDetails::Wajibath(WajibathDetails {
                    amount_paid: Decimal::from(50000),
                    date_paid: ymd(2024, 5, 1),
                    notes: "Hajj arrangement fee".into(),
                }),
            )],
        ),
        (
            Category::Car,
            vec![rec(
                "c1",
                BookingDetails::Car(CarDetails {
                    from_location: "Chennai".into(),
                    to_location: "Pondicherry".into(),
                    hire_date: ymd(2024, 5, 25),
                    return_date: ymd(2024, 5, 27),
                    cost_price: Decimal::from(5000),
                    selling_price: Decimal::from(6500),
                    notes: "SUV, with driver".into(),
                }),
            )],
        ),
        (
            Category::Visa,
            vec![rec(
                "v1",
                BookingDetails::Visa(VisaDetails {
                    country: "UAE".into(),
                    application_date: ymd(2024, 5, 5),
                    cost_price: Decimal::from(8000),
                    selling_price: Decimal::from(10000),
                    notes: "30-day tourist visa".into(),
                }),
            )],
        ),
        (
            Category::Train,
            vec![rec(
                "tr1",
                BookingDetails::Train(RouteDetails {
                    from_city: "Chennai".into(),
                    to_city: "Delhi".into(),
                    booking_date: ymd(2024, 5, 18),
                    travel_date: ymd(2024, 6, 10),
                    cost_price: Decimal::from(3500),
                    selling_price: Decimal::from(4200),
                    notes: "AC First Class, Rajdhani Express".into(),
                }),
            )],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldMap;

    fn visa(country: &str, cost: i64, sell: i64) -> BookingDetails {
        BookingDetails::Visa(VisaDetails {
            country: country.into(),
            application_date: ymd(2024, 5, 5),
            cost_price: Decimal::from(cost),
            selling_price: Decimal::from(sell),
            notes: String::new(),
        })
    }

    fn car(from: &str) -> BookingDetails {
        BookingDetails::Car(CarDetails {
            from_location: from.into(),
            to_location: "Pondicherry".into(),
            hire_date: ymd(2024, 5, 25),
            return_date: ymd(2024, 5, 27),
            cost_price: Decimal::from(5000),
            selling_price: Decimal::from(6500),
            notes: String::new(),
        })
    }

    #[test]
    fn visa_ids_are_sequential() {
        let mut store = RecordStore::new();
        assert_eq!(store.add(visa("UAE", 8000, 10000)).id, "v1");
        assert_eq!(store.add(visa("Oman", 6000, 7000)).id, "v2");
        assert_eq!(store.list(Category::Visa).len(), 2);
    }

    #[test]
    fn freed_ids_are_reused_smallest_first() {
        let mut store = RecordStore::new();
        for _ in 0..3 {
            store.add(car("Chennai"));
        }
        store.remove(Category::Car, "c2").unwrap();
        assert_eq!(store.add(car("Madurai")).id, "c2");
        let ids: Vec<_> = store.list(Category::Car).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c3", "c2"]);
    }

    #[test]
    fn update_replaces_only_the_target() {
        let mut store = RecordStore::with_sample_data();
        let before_f2 = store.get(Category::Flight, "f2").cloned().unwrap();
        let mut fields: FieldMap = store
            .get(Category::Flight, "f1")
            .unwrap()
            .details
            .to_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        fields.insert("sellingPrice".into(), "29000".into());
        let details = BookingDetails::from_fields(Category::Flight, &fields).unwrap();

        let updated = store.update(Category::Flight, "f1", details).unwrap();
        assert_eq!(updated.id, "f1");
        assert_eq!(updated.details.profit(), Some(Decimal::from(4000)));
        assert_eq!(store.get(Category::Flight, "f2"), Some(&before_f2));
        assert_eq!(store.list(Category::Flight)[0].id, "f1");
    }

    #[test]
    fn update_missing_id_is_not_found_and_changes_nothing() {
        let mut store = RecordStore::with_sample_data();
        let snapshot = store.list(Category::Visa).to_vec();
        let err = store
            .update(Category::Visa, "v9", visa("Qatar", 1, 2))
            .unwrap_err();
        assert_eq!(err, StoreError::not_found(Category::Visa, "v9"));
        assert_eq!(store.list(Category::Visa), snapshot.as_slice());
    }

    #[test]
    fn update_with_wrong_variant_is_rejected() {
        let mut store = RecordStore::with_sample_data();
        let err = store.update(Category::Car, "c1", visa("UAE", 1, 2)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(matches!(
            store.get(Category::Car, "c1").unwrap().details,
            BookingDetails::Car(_)
        ));
    }

    #[test]
    fn remove_twice_is_not_found() {
        let mut store = RecordStore::new();
        store.add(car("Chennai"));
        let removed = store.remove(Category::Car, "c1").unwrap();
        assert_eq!(removed.id, "c1");
        assert!(store.list(Category::Car).is_empty());
        assert_eq!(
            store.remove(Category::Car, "c1"),
            Err(StoreError::not_found(Category::Car, "c1"))
        );
    }

    #[test]
    fn unknown_category_key_lists_nothing() {
        let store = RecordStore::with_sample_data();
        assert!(store.list_by_key("cruise").is_empty());
        assert_eq!(store.list_by_key("flight").len(), 2);
    }

    #[test]
    fn sample_data_covers_every_category() {
        let store = RecordStore::with_sample_data();
        assert!(Category::ALL.iter().all(|c| !store.list(*c).is_empty()));
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn forex_add_uses_first_letter_prefix() {
        let mut store = RecordStore::with_sample_data();
        let fx = store.list(Category::Forex)[0].details.clone();
        // the seeded record is "fx1", so "f1" is still free here
        assert_eq!(store.add(fx).id, "f1");
    }
}
