//! Instrument level results reconciliation example
//!
//! Run with `cargo run --example instrument_results`, optionally passing
//! `--mode simple` or `--mode finance` (the default runs both).

use reconcile_core::plugins::{
    F64Plugin, FilterPlugin, SignedIntegerPlugin, StringPlugin, Tolerance,
};
use reconcile_core::{
    CompositeKey, Flattener, JsonFlattener, NoAvailablePluginBehaviour, ReconcilerConfig,
    SetReconciler, ValueReconciler,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct InstrumentResults {
    identifier: String,
    local_value: f64,
    base_currency_value: f64,
    base_currency: String,
}

#[derive(Serialize)]
struct Nested {
    ratio: f64,
    scale: f32,
    code: String,
}

#[derive(Serialize)]
struct Simple {
    price: f64,
    weight: f32,
    label: String,
    count: i32,
    nested: Nested,
}

fn simple_mode() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔎 Simple mode\n");

    let expected = Simple {
        price: 2.3,
        weight: 2.3,
        label: "str".to_string(),
        count: 1,
        nested: Nested {
            ratio: 5.6,
            scale: 2.3,
            code: "AOF".to_string(),
        },
    };
    let actual = Simple {
        price: 2.31,
        weight: 2.33,
        label: "str".to_string(),
        count: 1,
        nested: Nested {
            ratio: 5.6,
            scale: 2.3,
            code: "aof".to_string(),
        },
    };

    // JSON flattening widens every integer to i64 and every float to f64
    let reconciler = ValueReconciler::with_config(
        ReconcilerConfig::default()
            .with_no_available_plugin(NoAvailablePluginBehaviour::ReportAsDifference),
    )
    .with_plugin(F64Plugin::new())
    .with_plugin(SignedIntegerPlugin::new())
    .with_plugin(StringPlugin::new().with_ignore_case(true));

    let differences = reconciler.reconcile(
        JsonFlattener.flatten(None, &expected)?,
        JsonFlattener.flatten(None, &actual)?,
    )?;

    for difference in differences.sorted() {
        println!(
            "  {} - {:?} vs. {:?} => {:?}",
            difference.key, difference.expected_value, difference.actual_value, difference.payload
        );
    }
    println!();

    Ok(())
}

fn instrument_results(adjust: bool) -> Vec<InstrumentResults> {
    (0..200)
        .map(|j| {
            let value = 200.0 + 20.0 * j as f64;
            let mut result = InstrumentResults {
                identifier: format!("Trade #{j}"),
                local_value: value,
                base_currency_value: value,
                base_currency: "GBP".to_string(),
            };

            // Spread a handful of breaks across the book
            if adjust && j % 37 == 5 {
                result.local_value += 0.75 * (j % 4) as f64;
                if j % 2 == 0 {
                    result.base_currency_value += 0.005;
                }
            }
            result
        })
        .collect()
}

fn finance_mode() -> Result<(), Box<dyn std::error::Error>> {
    println!("💹 Finance mode\n");

    let expected = instrument_results(false);
    let actual = instrument_results(true);

    // Base currency values tolerate rounding noise, everything else is exact
    let base_currency_tolerance = FilterPlugin::for_key_prefix(
        F64Plugin::new().with_tolerance(Tolerance::absolute(0.01))?,
        "base_currency_value",
    );
    let reconciler = ValueReconciler::with_config(ReconcilerConfig::strict())
        .with_plugin(base_currency_tolerance)
        .with_plugin(F64Plugin::new())
        .with_plugin(StringPlugin::new());

    let set_reconciler = SetReconciler::new(JsonFlattener, reconciler);
    let result = set_reconciler.reconcile_sets(
        |_, results: &InstrumentResults| {
            CompositeKey::single("identifier", results.identifier.as_str())
        },
        expected,
        actual,
    )?;

    let summary = result.summary();
    println!("📊 Summary:");
    println!("  Keys:         {}", summary.total_keys);
    println!("  Matching:     {}", summary.matching);
    println!("  Differing:    {}", summary.differing);
    println!("  Missing:      {}", summary.missing);
    println!("  Additional:   {}", summary.additional);
    println!("  Incomparable: {}", summary.incomparable);
    println!();

    let mut differing: Vec<_> = result.differing.values().collect();
    differing.sort_by(|a, b| a.expected.identifier.cmp(&b.expected.identifier));

    println!("⚠️  Breaks:");
    for pair in differing {
        println!("  {}", pair.expected.identifier);
        for difference in pair.payload.sorted() {
            println!(
                "    {}: {:?} vs. {:?} => {:?}",
                difference.key,
                difference.expected_value,
                difference.actual_value,
                difference.payload
            );
        }
    }
    println!();

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Reconcile Core - Instrument Results Example\n");

    let args: Vec<String> = std::env::args().collect();
    let mode = match args.iter().position(|arg| arg == "--mode") {
        Some(index) => args.get(index + 1).map(|m| m.to_lowercase()),
        None => None,
    };

    match mode.as_deref() {
        Some("simple") => simple_mode()?,
        Some("finance") => finance_mode()?,
        Some(other) => {
            eprintln!("Invalid mode - {other}");
            std::process::exit(2);
        }
        None => {
            simple_mode()?;
            finance_mode()?;
        }
    }

    println!("✅ Reconciliation examples completed successfully!");

    Ok(())
}
