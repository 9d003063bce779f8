use spens_core::{grand_total, SubcategoryTotal};
use std::fmt::Write;

fn label(total: &SubcategoryTotal) -> String {
    if total.subcategory.is_empty() {
        total.category.clone()
    } else {
        format!("{} / {}", total.category, total.subcategory)
    }
}

/// Renders totals as aligned `label  amount currency` lines plus a grand total.
pub fn render_totals(totals: &[SubcategoryTotal], currency: &str) -> String {
    let rows: Vec<(String, String)> = totals
        .iter()
        .map(|t| (label(t), t.amount.to_string()))
        .chain(std::iter::once((
            "Total".to_string(),
            grand_total(totals).to_string(),
        )))
        .collect();

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let amount_width = rows.iter().map(|(_, a)| a.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, amount) in rows {
        let pad = label_width - label.chars().count();
        let _ = writeln!(
            out,
            "{label}{}  {amount:>amount_width$} {currency}",
            " ".repeat(pad)
        );
    }
    out
}
