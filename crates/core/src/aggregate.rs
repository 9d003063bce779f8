//! Per-subcategory spend totals.

use std::collections::HashMap;

use crate::money::Money;
use crate::transaction::{NormalizedTransaction, SubcategoryTotal};

/// Sums transaction amounts per (category, subcategory).
///
/// Buckets appear in the order their pair is first seen in `transactions`,
/// followed by exactly one unclassified bucket, which is present even when
/// nothing lands in it. Every addition is rounded to cents on the spot, so
/// totals match a fixed-point running balance rather than a rounded float sum.
pub fn aggregate(transactions: &[NormalizedTransaction]) -> Vec<SubcategoryTotal> {
    let mut totals: Vec<SubcategoryTotal> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut unclassified = SubcategoryTotal::unclassified();

    for tx in transactions {
        let bucket = if tx.is_classified() {
            let idx = *index
                .entry((tx.category.as_str(), tx.subcategory.as_str()))
                .or_insert_with(|| {
                    totals.push(SubcategoryTotal::new(&tx.category, &tx.subcategory));
                    totals.len() - 1
                });
            &mut totals[idx]
        } else {
            &mut unclassified
        };
        bucket.amount = bucket.amount.add_rounded(tx.amount);
    }

    totals.push(unclassified);
    totals
}

/// Sum of every bucket, unclassified included.
pub fn grand_total(totals: &[SubcategoryTotal]) -> Money {
    totals
        .iter()
        .fold(Money::zero(), |acc, t| acc.add_rounded(t.amount))
}
