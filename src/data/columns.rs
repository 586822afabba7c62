use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Canonical fields and their default header synonyms
// ---------------------------------------------------------------------------

/// Header names accepted for the product name column.
pub const NAME_SYNONYMS: &[&str] = &["товар", "название", "наименование", "продукт"];
/// Header names accepted for the price column.
pub const PRICE_SYNONYMS: &[&str] = &["розница", "цена"];
/// Header names accepted for the weight column (kg).
pub const WEIGHT_SYNONYMS: &[&str] = &["вес", "масса", "фасовка"];

/// A logical column every price list must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Price,
    Weight,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Price, Field::Weight];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Weight => "weight",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Resolution result
// ---------------------------------------------------------------------------

/// Header positions found for each field, `None` when no header matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub name: Option<usize>,
    pub price: Option<usize>,
    pub weight: Option<usize>,
}

/// All three columns, once every field was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub name: usize,
    pub price: usize,
    pub weight: usize,
}

impl ResolvedColumns {
    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => self.name,
            Field::Price => self.price,
            Field::Weight => self.weight,
        }
    }

    /// Unresolved fields in canonical order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn complete(&self) -> Option<ColumnIndices> {
        Some(ColumnIndices {
            name: self.name?,
            price: self.price?,
            weight: self.weight?,
        })
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Maps loosely named headers onto [`Field`]s by exact, case-insensitive
/// membership in per-field synonym sets.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    /// field → lowercase synonyms
    synonyms: BTreeMap<Field, BTreeSet<String>>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::empty()
            .with_synonyms(Field::Name, NAME_SYNONYMS.iter().copied())
            .with_synonyms(Field::Price, PRICE_SYNONYMS.iter().copied())
            .with_synonyms(Field::Weight, WEIGHT_SYNONYMS.iter().copied())
    }
}

impl ColumnResolver {
    /// A resolver that recognises nothing; see [`ColumnResolver::with_synonyms`].
    pub fn empty() -> Self {
        Self {
            synonyms: BTreeMap::new(),
        }
    }

    /// Add header names accepted for `field`.
    pub fn with_synonyms<I, S>(mut self, field: Field, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.synonyms
            .entry(field)
            .or_default()
            .extend(names.into_iter().map(|n| n.as_ref().to_lowercase()));
        self
    }

    pub fn is_synonym(&self, field: Field, header: &str) -> bool {
        self.synonyms
            .get(&field)
            .is_some_and(|set| set.contains(&header.to_lowercase()))
    }

    /// Position of the first header, in file order, accepted for `field`.
    pub fn resolve_field<S: AsRef<str>>(&self, field: Field, headers: &[S]) -> Option<usize> {
        headers
            .iter()
            .position(|h| self.is_synonym(field, h.as_ref()))
    }

    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ResolvedColumns {
        ResolvedColumns {
            name: self.resolve_field(Field::Name, headers),
            price: self.resolve_field(Field::Price, headers),
            weight: self.resolve_field(Field::Weight, headers),
        }
    }
}
