//! Bookstore record types read by the reporter.
//!
//! These mirror the external bookstore schema. Only `Order` and `OrderLine`
//! feed the daily report; the reference tables are declared so the shape of
//! the data source is explicit.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub order_date: NaiveDateTime,
    pub dest_address_id: u64,
}

impl Order {
    pub fn new(order_id: u64, order_date: NaiveDateTime, dest_address_id: u64) -> Self {
        Self {
            order_id,
            order_date,
            dest_address_id,
        }
    }

    /// Order timestamp truncated to its calendar date.
    pub fn day(&self) -> NaiveDate {
        self.order_date.date()
    }
}

/// A line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: u64,
    pub order_id: u64,
    pub book_id: u64,
    pub price: Decimal,
}

impl OrderLine {
    pub fn new(line_id: u64, order_id: u64, book_id: u64, price: Decimal) -> Self {
        Self {
            line_id,
            order_id,
            book_id,
            price,
        }
    }
}

// Reference tables below are never read by the reporter. They describe the
// columns `init_schema` creates for book, author, book_author, address and
// country.

/// A row of the book table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: u64,
    pub title: String,
    pub publication_date: Option<NaiveDate>,
}

/// A row of the author table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub author_id: u64,
    pub author_name: String,
}

/// Book/author association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAuthor {
    pub book_id: u64,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: u64,
    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub country_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub country_id: u64,
    pub country_name: String,
}
