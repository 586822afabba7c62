use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Amount – a numeric cell (price or weight)
// ---------------------------------------------------------------------------

/// A numeric cell value, kept in the shape the tabular parser produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(i64),
    Float(f64),
}

impl Amount {
    /// Parse a text cell. Integers win over floats; surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Some(Amount::Integer(i));
        }
        s.parse::<f64>().ok().map(Amount::Float)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Amount::Float(_))
    }

    /// The same value as a float.
    pub fn to_float(self) -> Amount {
        Amount::Float(self.as_f64())
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Amount::Integer(i) => *i as f64,
            Amount::Float(v) => *v,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so callers can align amounts in fixed-width tables.
        let text = match self {
            Amount::Integer(i) => i.to_string(),
            Amount::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                format!("{v:.1}")
            }
            Amount::Float(v) => v.to_string(),
        };
        f.pad(&text)
    }
}

/// Price per unit of weight; zero when the weight is not positive.
pub fn unit_price(price: Amount, weight: Amount) -> f64 {
    let weight = weight.as_f64();
    if weight > 0.0 {
        price.as_f64() / weight
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Record – one row of one price list
// ---------------------------------------------------------------------------

/// A single product row with its derived unit price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub price: Amount,
    pub weight: Amount,
    /// File name the row came from.
    pub source_file: String,
    /// Computed once in [`Record::new`].
    pub unit_price: f64,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        price: Amount,
        weight: Amount,
        source_file: impl Into<String>,
    ) -> Self {
        Record {
            name: name.into(),
            price,
            weight,
            source_file: source_file.into(),
            unit_price: unit_price(price, weight),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog – every record loaded in this session
// ---------------------------------------------------------------------------

/// Ordered, append-only collection of records: files in listing order,
/// rows in source order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
