use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use rand::{Rng, RngCore};
use uuid::Uuid;

use rowforge_schema::Attribute;

/// Delimiter joining elements of list-valued attributes.
pub const LIST_DELIMITER: char = ';';

/// Resolved generation kind for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Text,
    Int,
    Float,
    Bool,
    Date,
    Timestamp,
    Uuid,
    Email,
    PersonName,
}

/// Map a declared type (plus attribute-name hints) to a generation kind.
///
/// Name hints only apply to string-like types, mirroring how email-ish
/// columns are routed to a semantic generator rather than random text.
pub fn attribute_kind(attribute: &Attribute) -> AttributeKind {
    match attribute.data_type.trim().to_lowercase().as_str() {
        "int" | "integer" | "long" | "number" => AttributeKind::Int,
        "float" | "double" | "decimal" | "numeric" => AttributeKind::Float,
        "bool" | "boolean" => AttributeKind::Bool,
        "date" => AttributeKind::Date,
        "timestamp" | "datetime" => AttributeKind::Timestamp,
        "uuid" | "guid" => AttributeKind::Uuid,
        "email" => AttributeKind::Email,
        "name" => AttributeKind::PersonName,
        _ => {
            let name = attribute.name.to_lowercase();
            if name.contains("email") {
                AttributeKind::Email
            } else if name.contains("name") {
                AttributeKind::PersonName
            } else {
                AttributeKind::Text
            }
        }
    }
}

/// Fixed reference date so runs with the same seed reproduce exactly.
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Synthesize one scalar value with no uniqueness requirement.
pub fn synthesize<R: Rng + ?Sized>(attribute: &Attribute, kind: AttributeKind, rng: &mut R) -> String {
    match kind {
        AttributeKind::Int => rng.random_range(1..=100_000i64).to_string(),
        AttributeKind::Float => format!("{:.2}", rng.random_range(0.0..=100_000.0f64)),
        AttributeKind::Bool => rng.random_bool(0.5).to_string(),
        AttributeKind::Date => {
            let offset = rng.random_range(0..=365i64);
            (base_date() + Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string()
        }
        AttributeKind::Timestamp => {
            let offset = rng.random_range(0..=365i64);
            let date = base_date() + Duration::days(offset);
            timestamp_at_noon(date)
        }
        AttributeKind::Uuid => random_uuid(rng),
        AttributeKind::Email => SafeEmail().fake_with_rng::<String, _>(rng),
        AttributeKind::PersonName => Name().fake_with_rng::<String, _>(rng),
        AttributeKind::Text => format!("{}_{}", attribute.name, rng.random::<u32>()),
    }
}

/// Deterministic, sequence-derived value for a unique-id attribute.
///
/// Derived from the row index so uniqueness needs no retry loop.
pub fn unique_value(attribute: &Attribute, kind: AttributeKind, index: u64) -> String {
    match kind {
        AttributeKind::Int | AttributeKind::Float => (index + 1).to_string(),
        AttributeKind::Uuid => Uuid::from_u128(u128::from(index) + 1).to_string(),
        AttributeKind::Date => (base_date() + Duration::days(index as i64))
            .format("%Y-%m-%d")
            .to_string(),
        AttributeKind::Timestamp => {
            timestamp_at_noon(base_date() + Duration::days(index as i64))
        }
        AttributeKind::Email => format!("user{:05}@example.com", index + 1),
        _ => format!("{}_{:05}", attribute.name, index + 1),
    }
}

/// Synthesize a delimited list value for list-typed attributes.
pub fn synthesize_list<R: Rng + ?Sized>(
    attribute: &Attribute,
    kind: AttributeKind,
    rng: &mut R,
) -> String {
    let elements = rng.random_range(2..=4usize);
    let values: Vec<String> = (0..elements)
        .map(|_| synthesize(attribute, kind, rng))
        .collect();
    values.join(&LIST_DELIMITER.to_string())
}

fn timestamp_at_noon(date: NaiveDate) -> String {
    let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    NaiveDateTime::new(date, time)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes).to_string()
}
