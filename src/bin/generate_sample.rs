use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Deterministic price jitter (splitmix64), so sample files are reproducible.
struct PriceJitter(u64);

impl PriceJitter {
    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        ((z ^ (z >> 31)) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Whole-rouble price around `base`, ±20%.
    fn price_near(&mut self, base: f64) -> i64 {
        (base * (0.8 + 0.4 * self.next_unit())).round() as i64
    }
}

/// (product, base price, pack weight in kg)
const PRODUCTS: &[(&str, f64, &str)] = &[
    ("Молоко 3,2%", 95.0, "1"),
    ("Молоко топлёное", 70.0, "0.5"),
    ("Сыр Российский", 450.0, "0.5"),
    ("Масло сливочное", 180.0, "0.18"),
    ("Хлеб бородинский", 60.0, "0.4"),
    ("Чай чёрный", 120.0, "0.1"),
    ("Кофе молотый", 650.0, "0.25"),
    ("Сахар", 90.0, "1"),
];

/// Each shop names its columns differently.
const SHOPS: &[(&str, &[&str])] = &[
    ("price_1.csv", &["название", "цена", "фасовка"]),
    ("price_2.csv", &["Товар", "Розница", "Вес"]),
    ("price_3.csv", &["артикул", "наименование", "цена", "масса"]),
];

fn write_shop(
    dir: &Path,
    file: &str,
    headers: &[&str],
    jitter: &mut PriceJitter,
) -> Result<usize> {
    let mut out = headers.join(",");
    out.push('\n');
    let with_sku = headers.len() == 4;
    let mut rows = 0;
    for (i, (name, base, weight)) in PRODUCTS.iter().enumerate() {
        // Not every shop carries every product.
        if jitter.next_unit() < 0.25 {
            continue;
        }
        let price = jitter.price_near(*base);
        let name = if name.contains(',') {
            format!("\"{name}\"")
        } else {
            name.to_string()
        };
        if with_sku {
            out.push_str(&format!("{},{name},{price},{weight}\n", 1000 + i));
        } else {
            out.push_str(&format!("{name}, {price}, {weight}\n"));
        }
        rows += 1;
    }
    // Promotional gift bag, weightless.
    let gift_bag = if with_sku {
        "9999,Пакет подарочный,0,0\n"
    } else {
        "Пакет подарочный,0,0\n"
    };
    out.push_str(gift_bag);
    rows += 1;

    let path = dir.join(file);
    fs::write(&path, out)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(rows)
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating {}", dir.display()))?;

    let mut jitter = PriceJitter(42);
    for (file, headers) in SHOPS {
        let rows = write_shop(&dir, file, headers, &mut jitter)?;
        println!("Wrote {rows} rows to {}", dir.join(file).display());
    }

    // Not a price list: the scanner must ignore it.
    let other = dir.join("other.csv");
    fs::write(&other, "товар,цена,вес\nНе должен попасть в каталог,1,1\n")
        .with_context(|| format!("writing {}", other.display()))?;
    println!("Wrote decoy {}", other.display());
    Ok(())
}
