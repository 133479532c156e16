use anyhow::{Context, Result};
use rusty_charts::data::model::{Cell, Column, Table};
use rusty_charts::export::{export, ExportFormat};

/// SplitMix64: small, deterministic, good enough for sample data.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Roughly bell-shaped noise around `centre`: the mean of four uniform
    /// draws, stretched to `±spread`.
    fn around(&mut self, centre: f64, spread: f64) -> f64 {
        let mean = (0..4).map(|_| self.unit()).sum::<f64>() / 4.0;
        centre + (mean * 2.0 - 1.0) * spread
    }
}

/// Monthly sales per region, with one duplicated row and a few gaps so the
/// cleaning options have something to do.
fn sample_table(rng: &mut SampleRng) -> Result<Table> {
    let regions = ["North", "South", "East"];
    let months = 1..=12;

    let mut month = Vec::new();
    let mut region = Vec::new();
    let mut units = Vec::new();
    let mut revenue = Vec::new();

    for m in months {
        for (r, name) in regions.iter().enumerate() {
            let sold = rng.around(120.0 + 30.0 * r as f64, 40.0).round().max(0.0) as i64;
            let price = 9.5 + r as f64;
            month.push(Cell::Integer(m));
            region.push(Cell::Text(name.to_string()));
            units.push(Cell::Integer(sold));
            // Every ninth entry has no revenue recorded.
            if (m as usize * regions.len() + r) % 9 == 0 {
                revenue.push(Cell::Missing);
            } else {
                revenue.push(Cell::Float((sold as f64 * price * 100.0).round() / 100.0));
            }
        }
    }

    // Duplicate the first row.
    for col in [&mut month, &mut region, &mut units, &mut revenue] {
        let first = col[0].clone();
        col.push(first);
    }

    Table::new(vec![
        Column::new("month", month),
        Column::new("region", region),
        Column::new("units", units),
        Column::new("revenue", revenue),
    ])
    .context("building sample table")
}

fn main() -> Result<()> {
    let mut rng = SampleRng(42);
    let table = sample_table(&mut rng)?;

    for (format, path) in [
        (ExportFormat::Csv, "sample_sales.csv"),
        (ExportFormat::Excel, "sample_sales.xlsx"),
    ] {
        let bytes = export(&table, format).with_context(|| format!("encoding {path}"))?;
        std::fs::write(path, bytes).with_context(|| format!("writing {path}"))?;
        println!("Wrote {} rows x {} columns to {path}", table.len(), table.width());
    }
    Ok(())
}
