//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{MerchantCatalog, ProductRecord};
use crate::io::ingest::Dataset;

/// Format the run summary (dataset stats + selection + counts + skip reasons).
pub fn format_run_summary(dataset: &Dataset, run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== elast - Price Elasticity of Demand ===\n");
    out.push_str(&format!("Merchant: {}\n", run.selection.merchant));
    out.push_str(&format!("Category: {}\n", run.selection.category));
    out.push_str(&format!(
        "Rows: read={} | rejected={} | matched={}\n",
        dataset.rows_read,
        dataset.row_errors.len(),
        run.rows_matched,
    ));
    out.push_str(&format!(
        "Products: fitted={} | significant={} | presented={}\n",
        run.products_fitted,
        run.table.len(),
        run.presented.len(),
    ));

    if !run.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for s in &run.skipped {
            out.push_str(&format!("  {:<32} {}\n", truncate(&s.name, 32), s.reason));
        }
    }
    out.push('\n');

    out
}

/// Format presented rows as a fixed-width table.
pub fn format_table(rows: &[ProductRecord]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No products with a significant price/demand relationship.\n");
        return out;
    }

    out.push_str(
        format!(
            "{:<32} {:<14} {:>10} {:>10} {:>12} {:>9} {:>7} {:>6}\n",
            "name", "brand", "elasticity", "price", "quantity", "t", "p", "r2"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<32} {:-<14} {:->10} {:->10} {:->12} {:->9} {:->7} {:->6}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<32} {:<14} {:>10.4} {:>10.2} {:>12.2} {:>9.3} {:>7.3} {:>6.3}\n",
                truncate(&r.name, 32),
                truncate(r.brand.as_deref().unwrap_or(""), 14),
                r.price_elasticity,
                r.price_mean,
                r.quantity_mean,
                r.t_score,
                r.coefficient_pvalue,
                r.rsquared,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format every field of one record.
pub fn format_detail(record: &ProductRecord) -> String {
    let mut out = String::new();
    for (label, value) in record.fields() {
        out.push_str(&format!("{label:<20} {value}\n"));
    }
    out
}

/// Format the merchant/category enumeration.
pub fn format_merchants(catalog: &MerchantCatalog) -> String {
    let mut out = String::new();
    for merchant in catalog.merchants() {
        out.push_str(&format!("{merchant}\n"));
        for category in catalog.categories(merchant) {
            out.push_str(&format!("  - {category}\n"));
        }
    }
    out
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
