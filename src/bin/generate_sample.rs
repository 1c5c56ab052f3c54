//! Writes a synthetic workbook (one CSV per worksheet) for the
//! `csv_directory` source: `cargo run --bin generate_sample [out_dir]`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// (category, vendors, description stems, typical amount)
const SPENDING: &[(&str, &[&str], &[&str], f64)] = &[
    ("Food", &["Safeway", "Trader Joe's", "Chipotle", "Starbucks"], &["Groceries", "Lunch", "Coffee"], 25.0),
    ("Rent", &["Landlord"], &["Rent"], 1800.0),
    ("Utilities", &["PG&E", "Comcast", "AT&T"], &["Power bill", "Internet", "Phone"], 80.0),
    ("Travel", &["United", "Airbnb", "Hertz", "Marriott"], &["Flight", "Lodging", "Car rental"], 350.0),
    ("Fun", &["AMC", "Steam", "REI", "Ticketmaster"], &["Movie", "Game", "Gear", "Concert"], 60.0),
    ("Health", &["CVS", "Kaiser", "Equinox"], &["Pharmacy", "Copay", "Gym"], 45.0),
    ("xxx", &["Transfer"], &["Reimbursable"], 200.0),
];

const MONTHS: usize = 30;

fn month_label(i: usize) -> (i32, u32) {
    (2021 + (i / 12) as i32, (i % 12) as u32 + 1)
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

fn write_expenditures(dir: &Path, rng: &mut SimpleRng) -> Result<Vec<[f64; 7]>> {
    let mut w = csv::Writer::from_path(dir.join("Expenditures.csv"))?;
    w.write_record(["Timestamp", "Amount", "Categories", "Vendor", "Description"])?;

    // per-month per-category totals feed Historical_Spending
    let mut monthly = vec![[0.0; 7]; MONTHS];

    for (m, totals) in monthly.iter_mut().enumerate() {
        let (year, month) = month_label(m);
        for (c, &(category, vendors, stems, typical)) in SPENDING.iter().enumerate() {
            let count = if category == "Rent" { 1 } else { 1 + rng.below(6) };
            for _ in 0..count {
                let day = 1 + rng.below(28);
                let amount = (typical * (0.5 + rng.next_f64())).max(1.0);
                let amount = (amount * 100.0).round() / 100.0;
                totals[c] += amount;
                w.write_record([
                    format!("{month}/{day}/{year} {:02}:{:02}:00", rng.below(24), rng.below(60)),
                    money(amount),
                    category.to_string(),
                    rng.pick(vendors).to_string(),
                    rng.pick(stems).to_string(),
                ])?;
            }
        }
    }
    w.flush()?;
    Ok(monthly)
}

fn write_historical(dir: &Path, monthly: &[[f64; 7]]) -> Result<()> {
    let mut w = csv::Writer::from_path(dir.join("Historical_Spending.csv"))?;
    let mut header = vec!["Date".to_string()];
    header.extend(SPENDING.iter().map(|(c, ..)| c.to_string()));
    w.write_record(&header)?;

    for (m, totals) in monthly.iter().enumerate() {
        let (year, month) = month_label(m);
        let mut row = vec![format!("{month}/1/{year}")];
        row.extend(totals.iter().map(|&v| money(v)));
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

fn write_savings(dir: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut w = csv::Writer::from_path(dir.join("Savings Totals.csv"))?;
    w.write_record(["Date", "401k", "Roth IRA", "GESPP", "Vangaurd", "HSA", "CD", "Total"])?;

    let contributions = [1500.0, 500.0, 400.0, 300.0, 250.0, 0.0];
    let mut balances = [20000.0, 8000.0, 3000.0, 5000.0, 2000.0, 10000.0];

    // opening row first; it is not charted in the per-account view
    for m in 0..=MONTHS {
        let (year, month) = month_label(m);
        let mut row = vec![format!("{month}/1/{year}")];
        row.extend(balances.iter().map(|&b| money(b)));
        row.push(money(balances.iter().sum()));
        w.write_record(&row)?;

        for (b, c) in balances.iter_mut().zip(contributions) {
            let growth = 1.0 + (rng.next_f64() - 0.4) * 0.04;
            *b = (*b * growth + c).max(0.0);
        }
    }
    w.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out = std::env::args().nth(1).unwrap_or_else(|| "sample_data".to_string());
    let dir = Path::new(&out);
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let monthly = write_expenditures(dir, &mut rng)?;
    write_historical(dir, &monthly)?;
    write_savings(dir, &mut rng)?;

    println!(
        "Wrote {MONTHS} months of sample worksheets to {}/ \
         (set FINANCE_EXPLORER_SOURCE__KIND=csv_directory and \
         FINANCE_EXPLORER_SOURCE__DIRECTORY={out})",
        dir.display()
    );
    Ok(())
}
