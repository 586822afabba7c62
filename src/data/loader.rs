use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::columns::{ColumnIndices, ColumnResolver, Field};
use super::model::{Amount, Catalog, Record};

/// Only files whose name contains this marker are scanned.
pub const FILE_NAME_MARKER: &str = "price";

/// Extensions (lowercase) of the price list formats we can parse.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "json"];

/// Rows shown in the debug preview of each loaded file.
const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Errors and load summary
// ---------------------------------------------------------------------------

/// Why a single price list was rejected. Any of these skips the whole file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of objects")]
    NotAnArray,

    #[error("row {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("required columns not found: {}", join_fields(.0))]
    MissingColumns(Vec<Field>),

    #[error("row {row}: {field} column '{column}' has no text value")]
    MissingText {
        row: usize,
        field: Field,
        column: String,
    },

    #[error("row {row}: {field} column '{column}' holds '{value}', which is not a number")]
    NotANumber {
        row: usize,
        field: Field,
        column: String,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A file whose records made it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub file_name: String,
    pub records: usize,
}

/// A candidate file that was skipped, with the reason.
#[derive(Debug)]
pub struct SkippedFile {
    pub file_name: String,
    pub error: LoadError,
}

/// Outcome of scanning one directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LoadedFile>,
    pub skipped: Vec<SkippedFile>,
}

impl LoadReport {
    /// Total records appended during the scan.
    pub fn record_count(&self) -> usize {
        self.loaded.iter().map(|f| f.records).sum()
    }
}

/// Whether a directory entry name qualifies as a price list.
///
/// The marker is matched case-sensitively, the extension is not.
pub fn is_price_file(file_name: &str) -> bool {
    if !file_name.contains(FILE_NAME_MARKER) {
        return false;
    }
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Scans directories for price lists and turns their rows into [`Record`]s.
#[derive(Debug, Clone, Default)]
pub struct PriceLoader {
    resolver: ColumnResolver,
}

impl PriceLoader {
    pub fn new(resolver: ColumnResolver) -> Self {
        Self { resolver }
    }

    /// Load every price list in `dir` into `catalog`.
    ///
    /// A broken file is skipped and reported, it never stops the scan. Only
    /// failing to list `dir` itself is returned as an error.
    pub fn load_directory(
        &self,
        dir: &Path,
        catalog: &mut Catalog,
    ) -> Result<LoadReport, LoadError> {
        let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
        Ok(self.load_entries(entries, catalog))
    }

    /// Load the price lists among `entries`, in the given order.
    ///
    /// An entry that could not be read is logged and passed over.
    pub fn load_entries<I>(&self, entries: I, catalog: &mut Catalog) -> LoadReport
    where
        I: IntoIterator<Item = io::Result<PathBuf>>,
    {
        let mut report = LoadReport::default();

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::debug!("ignoring non UTF-8 entry {path:?}");
                continue;
            };
            if !is_price_file(file_name) {
                log::debug!("ignoring {file_name}");
                continue;
            }

            match self.load_file(&path) {
                Ok(records) => {
                    log::info!("loaded {file_name}: {} records", records.len());
                    for record in records.iter().take(PREVIEW_ROWS) {
                        log::debug!(
                            "  {} | {} | {} | {:.2}",
                            record.name,
                            record.price,
                            record.weight,
                            record.unit_price
                        );
                    }
                    report.loaded.push(LoadedFile {
                        file_name: file_name.to_string(),
                        records: records.len(),
                    });
                    catalog.extend(records);
                }
                Err(error) => {
                    log::debug!("skipping {file_name}: {error}");
                    report.skipped.push(SkippedFile {
                        file_name: file_name.to_string(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Parse one price list. Dispatch by extension.
    ///
    /// Either every row of the file is returned or an error; rows are never
    /// partially ingested.
    pub fn load_file(&self, path: &Path) -> Result<Vec<Record>, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => self.load_csv(path, &file_name),
            "json" => self.load_json(path, &file_name),
            other => Err(LoadError::UnsupportedExtension(other.to_string())),
        }
    }

    fn columns(&self, headers: &[String]) -> Result<ColumnIndices, LoadError> {
        let resolved = self.resolver.resolve(headers);
        resolved
            .complete()
            .ok_or_else(|| LoadError::MissingColumns(resolved.missing()))
    }

    // -----------------------------------------------------------------------
    // CSV
    // -----------------------------------------------------------------------

    /// Comma separated UTF-8 text with a header row.
    fn load_csv(&self, path: &Path, file_name: &str) -> Result<Vec<Record>, LoadError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let columns = self.columns(&headers)?;

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let row = result?;
            let cell = |idx: usize| match row.get(idx) {
                Some(s) if !s.is_empty() => Cell::Text(s),
                _ => Cell::Missing,
            };
            let source = RowSource {
                row: i + 1,
                headers: &headers,
                columns,
            };
            rows.push(source.parse(
                cell(columns.name),
                cell(columns.price),
                cell(columns.weight),
            )?);
        }
        Ok(into_records(rows, file_name))
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    /// Records-oriented JSON:
    ///
    /// ```json
    /// [
    ///   { "товар": "Молоко", "цена": 80, "вес": 1 },
    ///   ...
    /// ]
    /// ```
    ///
    /// Header order is the key order of the first object.
    fn load_json(&self, path: &Path, file_name: &str) -> Result<Vec<Record>, LoadError> {
        let text = fs::read_to_string(path)?;
        let root: JsonValue = serde_json::from_str(&text)?;
        let objects = root.as_array().ok_or(LoadError::NotAnArray)?;

        let Some(first) = objects.first() else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = first
            .as_object()
            .ok_or(LoadError::NotAnObject { row: 1 })?
            .keys()
            .cloned()
            .collect();
        let columns = self.columns(&headers)?;

        let mut rows = Vec::with_capacity(objects.len());
        for (i, value) in objects.iter().enumerate() {
            let row_no = i + 1;
            let obj = value
                .as_object()
                .ok_or(LoadError::NotAnObject { row: row_no })?;
            let cell = |idx: usize| match obj.get(&headers[idx]) {
                Some(JsonValue::String(s)) if !s.is_empty() => Cell::Text(s),
                Some(JsonValue::Number(n)) => json_number(n),
                _ => Cell::Missing,
            };
            let source = RowSource {
                row: row_no,
                headers: &headers,
                columns,
            };
            rows.push(source.parse(
                cell(columns.name),
                cell(columns.price),
                cell(columns.weight),
            )?);
        }
        Ok(into_records(rows, file_name))
    }
}

fn json_number(n: &serde_json::Number) -> Cell<'static> {
    if let Some(i) = n.as_i64() {
        Cell::Number(Amount::Integer(i))
    } else if let Some(f) = n.as_f64() {
        Cell::Number(Amount::Float(f))
    } else {
        Cell::Missing
    }
}

// ---------------------------------------------------------------------------
// Row normalisation shared by both formats
// ---------------------------------------------------------------------------

/// A row that passed validation, before column types are settled.
struct ParsedRow {
    name: String,
    price: Amount,
    weight: Amount,
}

/// Build the file's records once every row has parsed.
///
/// A column holds one numeric type: if any price (or weight) is a float,
/// every integer in that column is widened to a float, so `1` next to `0.5`
/// reads `1.0`.
fn into_records(rows: Vec<ParsedRow>, file_name: &str) -> Vec<Record> {
    let float_prices = rows.iter().any(|r| r.price.is_float());
    let float_weights = rows.iter().any(|r| r.weight.is_float());
    let widen = |amount: Amount, float: bool| if float { amount.to_float() } else { amount };

    rows.into_iter()
        .map(|row| {
            Record::new(
                row.name,
                widen(row.price, float_prices),
                widen(row.weight, float_weights),
                file_name,
            )
        })
        .collect()
}

/// One cell as the parser handed it over.
enum Cell<'a> {
    Text(&'a str),
    Number(Amount),
    Missing,
}

struct RowSource<'a> {
    row: usize,
    headers: &'a [String],
    columns: ColumnIndices,
}

impl RowSource<'_> {
    fn column(&self, field: Field) -> String {
        let idx = match field {
            Field::Name => self.columns.name,
            Field::Price => self.columns.price,
            Field::Weight => self.columns.weight,
        };
        self.headers[idx].clone()
    }

    fn parse(
        &self,
        name: Cell<'_>,
        price: Cell<'_>,
        weight: Cell<'_>,
    ) -> Result<ParsedRow, LoadError> {
        let name = match name {
            Cell::Text(s) => s.trim().to_string(),
            _ => {
                return Err(LoadError::MissingText {
                    row: self.row,
                    field: Field::Name,
                    column: self.column(Field::Name),
                })
            }
        };
        let price = self.amount(Field::Price, price)?;
        let weight = self.amount(Field::Weight, weight)?;
        Ok(ParsedRow {
            name,
            price,
            weight,
        })
    }

    fn amount(&self, field: Field, cell: Cell<'_>) -> Result<Amount, LoadError> {
        let parsed = match &cell {
            Cell::Number(a) => Some(*a),
            Cell::Text(s) => Amount::parse(s),
            Cell::Missing => None,
        };
        parsed.ok_or_else(|| LoadError::NotANumber {
            row: self.row,
            field,
            column: self.column(field),
            value: match cell {
                Cell::Text(s) => s.to_string(),
                _ => String::new(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn load(dir: &Path) -> (Catalog, LoadReport) {
        let mut catalog = Catalog::new();
        let report = PriceLoader::default()
            .load_directory(dir, &mut catalog)
            .unwrap();
        (catalog, report)
    }

    #[test]
    fn price_file_gate() {
        assert!(is_price_file("price_list.csv"));
        assert!(is_price_file("my-price.CSV"));
        assert!(is_price_file("price_3.json"));
        assert!(!is_price_file("Price_list.csv"));
        assert!(!is_price_file("other.csv"));
        assert!(!is_price_file("price_list.txt"));
        assert!(!is_price_file("price"));
    }

    #[test]
    fn loads_single_row_with_padded_cells() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "price_list.csv", "название,цена,фасовка\nМолоко, 80, 1\n");

        let (catalog, report) = load(dir.path());

        assert_eq!(catalog.len(), 1);
        let record = &catalog.records()[0];
        assert_eq!(record.name, "Молоко");
        assert_eq!(record.price, Amount::Integer(80));
        assert_eq!(record.weight, Amount::Integer(1));
        assert_eq!(record.source_file, "price_list.csv");
        assert_eq!(format!("{:.2}", record.unit_price), "80.00");
        let expected = LoadedFile {
            file_name: "price_list.csv".into(),
            records: 1,
        };
        assert_eq!(report.loaded, vec![expected]);
    }

    #[test]
    fn zero_weight_row_is_kept_with_zero_unit_price() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "price_list.csv",
            "название,цена,фасовка\nМолоко, 80, 1\nПакет,5,0\n",
        );

        let (catalog, report) = load(dir.path());

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[1].name, "Пакет");
        assert_eq!(format!("{:.2}", catalog.records()[1].unit_price), "0.00");
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn files_without_marker_are_never_read() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "price_list.csv", "товар,цена,вес\nХлеб,40,1\n");
        write(dir.path(), "other.csv", "товар,цена,вес\nСыр,500,1\n");
        write(dir.path(), "notes.txt", "price list notes");

        let (catalog, report) = load(dir.path());

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].name, "Хлеб");
        assert_eq!(report.loaded.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn file_missing_a_column_is_skipped_entirely() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "price_a.csv", "товар,цена,количество\nХлеб,40,3\n");

        let (catalog, report) = load(dir.path());

        assert!(catalog.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file_name, "price_a.csv");
        assert!(matches!(
            &report.skipped[0].error,
            LoadError::MissingColumns(fields) if fields == &vec![Field::Weight]
        ));
    }

    #[test]
    fn bad_row_aborts_its_file_but_not_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "price_bad.csv", "товар,цена,вес\nХлеб,40,1\nСыр,дорого,1\n");
        write(dir.path(), "price_good.csv", "продукт,розница,масса\nЧай,120,0.1\n");

        let (catalog, report) = load(dir.path());

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].source_file, "price_good.csv");
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            &report.skipped[0].error,
            LoadError::NotANumber { row: 2, field: Field::Price, value, .. } if value == "дорого"
        ));
    }

    #[test]
    fn empty_name_aborts_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.csv", "товар,цена,вес\n,40,1\n");

        let err = PriceLoader::default().load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingText { row: 1, field: Field::Name, .. }));
    }

    #[test]
    fn ragged_row_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.csv", "товар,цена,вес\nХлеб,40\n");

        let err = PriceLoader::default().load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cp1251 = b"\xf2\xee\xe2\xe0\xf0,\xf6\xe5\xed\xe0,\xe2\xe5\xf1\n";
        fs::write(dir.path().join("price_cp1251.csv"), cp1251).unwrap();

        let (catalog, report) = load(dir.path());

        assert!(catalog.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn header_only_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "price.csv", "товар,цена,вес\n");

        let (catalog, report) = load(dir.path());

        assert!(catalog.is_empty());
        assert_eq!(report.loaded[0].records, 0);
    }

    #[test]
    fn float_cells_keep_their_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.csv", "Наименование,Цена,Вес\n Сыр ,450.0,0.5\n");

        let records = PriceLoader::default().load_file(&path).unwrap();

        assert_eq!(records[0].name, "Сыр");
        assert_eq!(records[0].price, Amount::Float(450.0));
        assert_eq!(records[0].weight, Amount::Float(0.5));
        assert_eq!(records[0].unit_price, 900.0);
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "price.json",
            r#"[
                {"артикул": 1, "товар": "  Кофе ", "цена": 700, "вес": "0.25"},
                {"артикул": 2, "товар": "Сахар", "цена": 90.5, "вес": 1}
            ]"#,
        );

        let records = PriceLoader::default().load_file(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Кофе");
        assert_eq!(records[0].weight, Amount::Float(0.25));
        assert_eq!(records[0].unit_price, 2800.0);
        assert_eq!(records[1].price, Amount::Float(90.5));
        assert_eq!(records[1].source_file, "price.json");
        // both columns hold a float, so the integers are widened
        assert_eq!(records[0].price, Amount::Float(700.0));
        assert_eq!(records[1].weight, Amount::Float(1.0));
    }

    #[test]
    fn one_float_makes_the_whole_column_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.csv", "товар,цена,вес
Молоко,80,1
Сыр,450,0.5
");

        let records = PriceLoader::default().load_file(&path).unwrap();

        assert_eq!(records[0].weight, Amount::Float(1.0));
        assert_eq!(records[0].weight.to_string(), "1.0");
        assert_eq!(records[1].weight.to_string(), "0.5");
        // the price column is all integers and stays that way
        assert_eq!(records[0].price, Amount::Integer(80));
        assert_eq!(records[1].price.to_string(), "450");
        assert_eq!(records[0].unit_price, 80.0);
    }

    #[test]
    fn column_types_are_settled_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "price_a.csv", "товар,цена,вес
Молоко,80,1
");
        write(dir.path(), "price_b.csv", "товар,цена,вес
Сыр,450,0.5
");

        let (catalog, _) = load(dir.path());

        let milk = catalog.iter().find(|r| r.name == "Молоко").unwrap();
        assert_eq!(milk.weight, Amount::Integer(1));
    }

    #[test]
    fn unreadable_entry_does_not_stop_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "price_list.csv", "товар,цена,вес
Хлеб,40,1
");
        let entries = vec![
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Ok(good),
        ];

        let mut catalog = Catalog::new();
        let report = PriceLoader::default().load_entries(entries, &mut catalog);

        assert_eq!(catalog.len(), 1);
        assert_eq!(report.loaded.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn json_numeric_name_aborts_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.json", r#"[{"товар": 42, "цена": 1, "вес": 1}]"#);

        let err = PriceLoader::default().load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingText { .. }));
    }

    #[test]
    fn json_must_be_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.json", r#"{"товар": "Кофе"}"#);

        let err = PriceLoader::default().load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray));
    }

    #[test]
    fn custom_resolver_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "price.csv", "товар,цена,нетто\nХлеб,40,2\n");

        assert!(matches!(
            PriceLoader::default().load_file(&path),
            Err(LoadError::MissingColumns(_))
        ));

        let resolver = ColumnResolver::default().with_synonyms(Field::Weight, ["нетто"]);
        let records = PriceLoader::new(resolver).load_file(&path).unwrap();
        assert_eq!(records[0].unit_price, 20.0);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::new();
        let missing = dir.path().join("nope");
        let result = PriceLoader::default().load_directory(&missing, &mut catalog);
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
