use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::model::Catalog;

/// Where the report goes when no path is given.
pub const DEFAULT_REPORT_FILE: &str = "output.html";

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Позиции продуктов</title>
    <style>
        table {
            width: 100%;
            border-collapse: collapse;
        }
        th, td {
            border: 1px solid black;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #f2f2f2;
        }
    </style>
</head>
<body>
    <h1>Список товаров</h1>
    <table>
        <tr>
            <th>Номер</th>
            <th>Название</th>
            <th>Цена</th>
            <th>Фасовка</th>
            <th>Файл</th>
            <th>Цена за кг.</th>
        </tr>
"#;

const TAIL: &str = "    </table>
</body>
</html>
";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Escape text for use inside HTML element content or attribute values.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Render the whole catalog, in catalog order, as a standalone HTML page.
pub fn render_html(catalog: &Catalog) -> String {
    let mut html = String::from(HEAD);
    for (idx, record) in catalog.records().iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "        <tr>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{:.2}</td>
        </tr>
",
            idx + 1,
            escape_html(&record.name),
            record.price,
            record.weight,
            escape_html(&record.source_file),
            record.unit_price
        );
    }
    html.push_str(TAIL);
    html
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the catalog to `path`, replacing any existing file.
///
/// A `.json` destination gets the records as a JSON array, anything else
/// gets the HTML table.
pub fn export(catalog: &Catalog, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let contents = if is_json {
        serde_json::to_string_pretty(catalog).context("serializing catalog")?
    } else {
        render_html(catalog)
    };

    fs::write(path, contents)
        .with_context(|| format!("writing report to {}", path.display()))?;
    log::info!("exported {} records to {}", catalog.len(), path.display());
    Ok(())
}
