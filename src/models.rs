// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Loosely-typed field bag keyed by camelCase field name.
pub type FieldMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Flight,
    Hotel,
    Tour,
    Forex,
    Wajibath,
    Car,
    Visa,
    Train,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Flight,
        Category::Hotel,
        Category::Tour,
        Category::Forex,
        Category::Wajibath,
        Category::Car,
        Category::Visa,
        Category::Train,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Flight => "flight",
            Category::Hotel => "hotel",
            Category::Tour => "tour",
            Category::Forex => "forex",
            Category::Wajibath => "wajibath",
            Category::Car => "car",
            Category::Visa => "visa",
            Category::Train => "train",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Flight => "Flight Ticket",
            Category::Hotel => "Hotel Reservation",
            Category::Tour => "Tour Package",
            Category::Forex => "Foreign Exchange",
            Category::Wajibath => "Wajibath",
            Category::Car => "Car Rental",
            Category::Visa => "Visa",
            Category::Train => "Train Booking",
        }
    }

    /// First letter of the key; shared by flight/forex and tour/train.
    pub fn id_prefix(self) -> char {
        self.key().chars().next().unwrap_or('x')
    }

    /// Field names in schema order, without the id.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Category::Flight | Category::Train => &[
                "fromCity",
                "toCity",
                "bookingDate",
                "travelDate",
                "costPrice",
                "sellingPrice",
                "notes",
            ],
            Category::Hotel => &[
                "hotelName",
                "location",
                "checkInDate",
                "checkOutDate",
                "costPrice",
                "sellingPrice",
                "notes",
            ],
            Category::Tour => &[
                "destination",
                "travelDate",
                "returnDate",
                "costPrice",
                "sellingPrice",
                "details",
                "notes",
            ],
            Category::Car => &[
                "fromLocation",
                "toLocation",
                "hireDate",
                "returnDate",
                "costPrice",
                "sellingPrice",
                "notes",
            ],
            Category::Forex => &[
                "currency",
                "amount",
                "exchangeRate",
                "totalAmount",
                "transactionDate",
                "notes",
            ],
            Category::Visa => &[
                "country",
                "applicationDate",
                "costPrice",
                "sellingPrice",
                "notes",
            ],
            Category::Wajibath => &["amountPaid", "datePaid", "notes"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| StoreError::validation(format!("unknown category '{}'", s)))
    }
}

// Field parsing helpers. All errors name the offending field.

fn required<'a>(fields: &'a FieldMap, key: &str) -> StoreResult<&'a str> {
    match fields.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StoreError::validation(format!("missing field '{}'", key))),
    }
}

fn text(fields: &FieldMap, key: &str) -> StoreResult<String> {
    Ok(required(fields, key)?.to_string())
}

fn optional_text(fields: &FieldMap, key: &str) -> String {
    fields.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn date(fields: &FieldMap, key: &str) -> StoreResult<NaiveDate> {
    let raw = required(fields, key)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        StoreError::validation(format!(
            "invalid date '{}' for '{}', expected YYYY-MM-DD",
            raw, key
        ))
    })
}

fn amount(fields: &FieldMap, key: &str) -> StoreResult<Decimal> {
    let raw = required(fields, key)?;
    let d = raw
        .parse::<Decimal>()
        .map_err(|_| StoreError::validation(format!("invalid amount '{}' for '{}'", raw, key)))?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(StoreError::validation(format!(
            "'{}' must not be negative (got {})",
            key, d
        )));
    }
    Ok(d)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetails {
    pub from_city: String,
    pub to_city: String,
    pub booking_date: NaiveDate,
    pub travel_date: NaiveDate,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub notes: String,
}

impl RouteDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        Ok(Self {
            from_city: text(f, "fromCity")?,
            to_city: text(f, "toCity")?,
            booking_date: date(f, "bookingDate")?,
            travel_date: date(f, "travelDate")?,
            cost_price: amount(f, "costPrice")?,
            selling_price: amount(f, "sellingPrice")?,
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fromCity", self.from_city.clone()),
            ("toCity", self.to_city.clone()),
            ("bookingDate", self.booking_date.to_string()),
            ("travelDate", self.travel_date.to_string()),
            ("costPrice", self.cost_price.to_string()),
            ("sellingPrice", self.selling_price.to_string()),
            ("notes", self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDetails {
    pub hotel_name: String,
    pub location: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub notes: String,
}

impl HotelDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        Ok(Self {
            hotel_name: text(f, "hotelName")?,
            location: text(f, "location")?,
            check_in_date: date(f, "checkInDate")?,
            check_out_date: date(f, "checkOutDate")?,
            cost_price: amount(f, "costPrice")?,
            selling_price: amount(f, "sellingPrice")?,
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("hotelName", self.hotel_name.clone()),
            ("location", self.location.clone()),
            ("checkInDate", self.check_in_date.to_string()),
            ("checkOutDate", self.check_out_date.to_string()),
            ("costPrice", self.cost_price.to_string()),
            ("sellingPrice", self.selling_price.to_string()),
            ("notes", self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDetails {
    pub destination: String,
    pub travel_date: NaiveDate,
    pub return_date: NaiveDate,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub details: String,
    pub notes: String,
}

impl TourDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        Ok(Self {
            destination: text(f, "destination")?,
            travel_date: date(f, "travelDate")?,
            return_date: date(f, "returnDate")?,
            cost_price: amount(f, "costPrice")?,
            selling_price: amount(f, "sellingPrice")?,
            details: optional_text(f, "details"),
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("destination", self.destination.clone()),
            ("travelDate", self.travel_date.to_string()),
            ("returnDate", self.return_date.to_string()),
            ("costPrice", self.cost_price.to_string()),
            ("sellingPrice", self.selling_price.to_string()),
            ("details", self.details.clone()),
            ("notes", self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetails {
    pub from_location: String,
    pub to_location: String,
    pub hire_date: NaiveDate,
    pub return_date: NaiveDate,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub notes: String,
}

impl CarDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        Ok(Self {
            from_location: text(f, "fromLocation")?,
            to_location: text(f, "toLocation")?,
            hire_date: date(f, "hireDate")?,
            return_date: date(f, "returnDate")?,
            cost_price: amount(f, "costPrice")?,
            selling_price: amount(f, "sellingPrice")?,
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fromLocation", self.from_location.clone()),
            ("toLocation", self.to_location.clone()),
            ("hireDate", self.hire_date.to_string()),
            ("returnDate", self.return_date.to_string()),
            ("costPrice", self.cost_price.to_string()),
            ("sellingPrice", self.selling_price.to_string()),
            ("notes", self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForexDetails {
    pub currency: String,
    pub amount: Decimal,
    pub exchange_rate: Decimal,
    pub total_amount: Decimal,
    pub transaction_date: NaiveDate,
    pub notes: String,
}

impl ForexDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        let amt = amount(f, "amount")?;
        let rate = amount(f, "exchangeRate")?;
        // Same as the booking form: total = amount * rate unless given.
        let total = match f.get("totalAmount").map(|v| v.trim()) {
            Some(v) if !v.is_empty() => amount(f, "totalAmount")?,
            _ => (amt * rate).round_dp(2),
        };
        Ok(Self {
            currency: text(f, "currency")?.to_uppercase(),
            amount: amt,
            exchange_rate: rate,
            total_amount: total,
            transaction_date: date(f, "transactionDate")?,
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currency", self.currency.clone()),
            ("amount", self.amount.to_string()),
            ("exchangeRate", self.exchange_rate.to_string()),
            ("totalAmount", self.total_amount.to_string()),
            ("transactionDate", self.transaction_date.to_string()),
            ("notes", self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaDetails {
    pub country: String,
    pub application_date: NaiveDate,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub notes: String,
}

impl VisaDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        Ok(Self {
            country: text(f, "country")?,
            application_date: date(f, "applicationDate")?,
            cost_price: amount(f, "costPrice")?,
            selling_price: amount(f, "sellingPrice")?,
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("country", self.country.clone()),
            ("applicationDate", self.application_date.to_string()),
            ("costPrice", self.cost_price.to_string()),
            ("sellingPrice", self.selling_price.to_string()),
            ("notes", self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WajibathDetails {
    pub amount_paid: Decimal,
    pub date_paid: NaiveDate,
    pub notes: String,
}

impl WajibathDetails {
    fn from_fields(f: &FieldMap) -> StoreResult<Self> {
        Ok(Self {
            amount_paid: amount(f, "amountPaid")?,
            date_paid: date(f, "datePaid")?,
            notes: optional_text(f, "notes"),
        })
    }

    fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("amountPaid", self.amount_paid.to_string()),
            ("datePaid", self.date_paid.to_string()),
            ("notes", self.notes.clone()),
        ]
    }
}

/// Category-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BookingDetails {
    Flight(RouteDetails),
    Hotel(HotelDetails),
    Tour(TourDetails),
    Forex(ForexDetails),
    Wajibath(WajibathDetails),
    Car(CarDetails),
    Visa(VisaDetails),
    Train(RouteDetails),
}

impl BookingDetails {
    pub fn category(&self) -> Category {
        match self {
            BookingDetails::Flight(_) => Category::Flight,
            BookingDetails::Hotel(_) => Category::Hotel,
            BookingDetails::Tour(_) => Category::Tour,
            BookingDetails::Forex(_) => Category::Forex,
            BookingDetails::Wajibath(_) => Category::Wajibath,
            BookingDetails::Car(_) => Category::Car,
            BookingDetails::Visa(_) => Category::Visa,
            BookingDetails::Train(_) => Category::Train,
        }
    }

    /// Validates a field bag against the category's schema.
    ///
    /// Unknown names, missing required fields, malformed dates and
    /// malformed or negative amounts are rejected. `notes` (and a tour's
    /// `details`) default to empty.
    pub fn from_fields(category: Category, fields: &FieldMap) -> StoreResult<Self> {
        let allowed = category.field_names();
        if let Some(unknown) = fields.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(StoreError::validation(format!(
                "unknown field '{}' for {} (expected one of: {})",
                unknown,
                category,
                allowed.join(", ")
            )));
        }
        let details = match category {
            Category::Flight => BookingDetails::Flight(RouteDetails::from_fields(fields)?),
            Category::Hotel => BookingDetails::Hotel(HotelDetails::from_fields(fields)?),
            Category::Tour => BookingDetails::Tour(TourDetails::from_fields(fields)?),
            Category::Forex => BookingDetails::Forex(ForexDetails::from_fields(fields)?),
            Category::Wajibath => BookingDetails::Wajibath(WajibathDetails::from_fields(fields)?),
            Category::Car => BookingDetails::Car(CarDetails::from_fields(fields)?),
            Category::Visa => BookingDetails::Visa(VisaDetails::from_fields(fields)?),
            Category::Train => BookingDetails::Train(RouteDetails::from_fields(fields)?),
        };
        Ok(details)
    }

    /// Fields in schema order, rendered as strings.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            BookingDetails::Flight(d) | BookingDetails::Train(d) => d.to_fields(),
            BookingDetails::Hotel(d) => d.to_fields(),
            BookingDetails::Tour(d) => d.to_fields(),
            BookingDetails::Forex(d) => d.to_fields(),
            BookingDetails::Wajibath(d) => d.to_fields(),
            BookingDetails::Car(d) => d.to_fields(),
            BookingDetails::Visa(d) => d.to_fields(),
        }
    }

    /// Overlays `overrides` on the current fields and re-validates.
    pub fn merged(&self, overrides: &FieldMap) -> StoreResult<Self> {
        let mut fields: FieldMap = self
            .to_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        if matches!(self, BookingDetails::Forex(_))
            && !overrides.contains_key("totalAmount")
            && (overrides.contains_key("amount") || overrides.contains_key("exchangeRate"))
        {
            // let the total follow the new amount/rate
            fields.remove("totalAmount");
        }
        for (k, v) in overrides {
            fields.insert(k.clone(), v.clone());
        }
        BookingDetails::from_fields(self.category(), &fields)
    }

    /// Selling price minus cost price; wajibath is a pure expense and
    /// forex carries no margin of its own.
    pub fn profit(&self) -> Option<Decimal> {
        match self {
            BookingDetails::Flight(d) | BookingDetails::Train(d) => {
                Some(d.selling_price - d.cost_price)
            }
            BookingDetails::Hotel(d) => Some(d.selling_price - d.cost_price),
            BookingDetails::Tour(d) => Some(d.selling_price - d.cost_price),
            BookingDetails::Car(d) => Some(d.selling_price - d.cost_price),
            BookingDetails::Visa(d) => Some(d.selling_price - d.cost_price),
            BookingDetails::Wajibath(d) => Some(-d.amount_paid),
            BookingDetails::Forex(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub details: BookingDetails,
}

impl Record {
    pub fn category(&self) -> Category {
        self.details.category()
    }
}

/// Parses `key=value` pairs as given on the command line.
pub fn parse_assignments<'a, I>(pairs: I) -> StoreResult<FieldMap>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = FieldMap::new();
    for pair in pairs {
        let (k, v) = pair.split_once('=').ok_or_else(|| {
            StoreError::validation(format!("expected key=value, got '{}'", pair))
        })?;
        let k = k.trim();
        if k.is_empty() {
            return Err(StoreError::validation(format!("empty field name in '{}'", pair)));
        }
        out.insert(k.to_string(), v.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Wajibath".parse::<Category>().unwrap(), Category::Wajibath);
        assert!("bus".parse::<Category>().is_err());
    }

    #[test]
    fn visa_fields_validate() {
        let d = BookingDetails::from_fields(
            Category::Visa,
            &fields(&[
                ("country", "UAE"),
                ("applicationDate", "2024-05-05"),
                ("costPrice", "8000"),
                ("sellingPrice", "10000"),
            ]),
        )
        .unwrap();
        assert_eq!(d.category(), Category::Visa);
        assert_eq!(d.profit(), Some(dec("2000")));
        let f = d.to_fields();
        assert_eq!(f.last().unwrap(), &("notes", String::new()));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = BookingDetails::from_fields(
            Category::Wajibath,
            &fields(&[("amountPaid", "-5"), ("datePaid", "2024-05-01")]),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn unknown_and_missing_fields_are_rejected() {
        let unknown = BookingDetails::from_fields(
            Category::Wajibath,
            &fields(&[("amountPaid", "5"), ("datePaid", "2024-05-01"), ("price", "1")]),
        );
        assert!(matches!(unknown, Err(StoreError::Validation(m)) if m.contains("price")));

        let missing =
            BookingDetails::from_fields(Category::Wajibath, &fields(&[("amountPaid", "5")]));
        assert!(matches!(missing, Err(StoreError::Validation(m)) if m.contains("datePaid")));
    }

    #[test]
    fn bad_date_is_rejected() {
        let r = BookingDetails::from_fields(
            Category::Wajibath,
            &fields(&[("amountPaid", "5"), ("datePaid", "01/05/2024")]),
        );
        assert!(r.is_err());
    }

    #[test]
    fn forex_total_defaults_to_amount_times_rate() {
        let d = BookingDetails::from_fields(
            Category::Forex,
            &fields(&[
                ("currency", "usd"),
                ("amount", "5000"),
                ("exchangeRate", "83.5"),
                ("transactionDate", "2024-05-20"),
            ]),
        )
        .unwrap();
        match &d {
            BookingDetails::Forex(fx) => {
                assert_eq!(fx.currency, "USD");
                assert_eq!(fx.total_amount, dec("417500"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let updated = d.merged(&fields(&[("exchangeRate", "84")])).unwrap();
        match updated {
            BookingDetails::Forex(fx) => assert_eq!(fx.total_amount, dec("420000")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn merged_keeps_untouched_fields() {
        let d = BookingDetails::from_fields(
            Category::Car,
            &fields(&[
                ("fromLocation", "Chennai"),
                ("toLocation", "Pondicherry"),
                ("hireDate", "2024-05-25"),
                ("returnDate", "2024-05-27"),
                ("costPrice", "5000"),
                ("sellingPrice", "6500"),
                ("notes", "SUV, with driver"),
            ]),
        )
        .unwrap();
        let m = d.merged(&fields(&[("sellingPrice", "7000")])).unwrap();
        match m {
            BookingDetails::Car(c) => {
                assert_eq!(c.selling_price, dec("7000"));
                assert_eq!(c.notes, "SUV, with driver");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn assignments_split_on_first_equals() {
        let m = parse_assignments(["notes=a=b", "costPrice=10"]).unwrap();
        assert_eq!(m["notes"], "a=b");
        assert_eq!(m["costPrice"], "10");
        assert!(parse_assignments(["oops"]).is_err());
    }
}
