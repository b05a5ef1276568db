//! Fit an ARIMA model to daily closes and print the summary and forecast.
//!
//! Run with:
//!   cargo run --example stock_forecast -- closes.csv [p d q] [horizon]
//!
//! The CSV needs a header row followed by `date,close` rows with ISO dates.
//! Without a file argument a synthetic price path is used.

use arima_forecast::core::TimeSeries;
use arima_forecast::models::arima::{fit_and_forecast_with, ArimaConfig, ArimaOrder};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read `date,close` rows, skipping the header.
fn read_closes(path: &Path) -> Result<Vec<(NaiveDate, f64)>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut closes = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if i == 0 || line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() >= 2 {
            let date = NaiveDate::parse_from_str(parts[0].trim(), "%Y-%m-%d")?;
            let close: f64 = parts[1].trim().parse()?;
            closes.push((date, close));
        }
    }
    Ok(closes)
}

/// A year of business-day prices with drift and irregular moves.
fn synthetic_closes() -> Vec<(NaiveDate, f64)> {
    let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default();
    let mut price = 150.0;
    let mut closes = Vec::new();
    for i in 0..252 {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
        }
        let shock = ((i * 7919 + 13) % 101) as f64 / 101.0 - 0.5;
        price += 0.08 + 1.5 * shock;
        closes.push((date, price));
        date += Duration::days(1);
    }
    closes
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (closes, label) = match args.first() {
        Some(path) => (read_closes(Path::new(path))?, path.clone()),
        None => (synthetic_closes(), "synthetic".to_string()),
    };

    let numbers: Vec<i64> = args
        .iter()
        .skip(1)
        .map(|a| a.parse())
        .collect::<Result<_, _>>()?;
    let (p, d, q) = match numbers.as_slice() {
        [p, d, q, ..] => (*p, *d, *q),
        _ => (5, 1, 5),
    };
    let order = ArimaOrder::new(p, d, q)?;

    let config = ArimaConfig::default().with_interval_level(0.95);
    let horizon = match numbers.get(3) {
        Some(&h) => usize::try_from(h)?,
        None => config.horizon,
    };

    let series = TimeSeries::from_daily_closes(closes)?.with_label(label);
    println!(
        "Fitting ARIMA{} to {} closes of {}\n",
        order,
        series.len(),
        series.label().unwrap_or("")
    );

    let out = fit_and_forecast_with(&series, order, horizon, &config)?;
    println!("{}", out.report);

    println!("{:<12}{:>12}{:>12}{:>12}", "date", "forecast", "lower", "upper");
    let interval = out.forecast.interval();
    for (i, (ts, value)) in out.forecast.iter().enumerate() {
        let (lo, hi) = interval
            .map(|iv| (iv.lower[i], iv.upper[i]))
            .unwrap_or((f64::NAN, f64::NAN));
        println!(
            "{:<12}{:>12.2}{:>12.2}{:>12.2}",
            ts.date_naive(),
            value,
            lo,
            hi
        );
    }

    Ok(())
}
