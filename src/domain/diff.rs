//! The stock diff engine.
//!
//! Pure and synchronous: given two consecutive snapshots and the product's
//! watch/notified sets, decide which sizes restocked and which alert gates
//! re-armed. No I/O happens here; the monitor applies the outcome.

use std::collections::BTreeSet;

use super::product::{SizeStock, StockMap};

/// A size that transitioned back in stock and has not been announced yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restock {
    pub size: String,
    pub stock: SizeStock,
}

/// Outcome of diffing two consecutive snapshots.
#[derive(Debug, Clone, Default)]
pub struct StockDiff {
    /// Restocks to announce, one per rising transition.
    pub restocks: Vec<Restock>,
    /// Sizes that went back out of stock this check; their alert gate is
    /// re-armed so a future restock notifies again.
    pub cleared: Vec<String>,
    /// Updated notified-sizes set, to replace the product's.
    pub notified: BTreeSet<String>,
}

/// Diff `current` against `previous` for one product.
///
/// An empty `watched` set means every size on the page is watched. A size
/// absent from `previous` counts as out of stock, so a size that is already
/// in stock on a product's very first check announces immediately. Sizes
/// present only in `previous` are left untouched: a size disappearing from
/// the page is a scrape gap, not a stock change.
///
/// Each size is evaluated independently; the result is order-insensitive.
pub fn diff_stock(
    previous: &StockMap,
    current: &StockMap,
    watched: &BTreeSet<String>,
    notified: &BTreeSet<String>,
) -> StockDiff {
    let mut diff = StockDiff {
        notified: notified.clone(),
        ..StockDiff::default()
    };

    for (size, entry) in current {
        let is_watched = watched.is_empty() || watched.contains(size);
        if !is_watched {
            continue;
        }

        let was_in_stock = previous.get(size).is_some_and(|e| e.in_stock);

        if !was_in_stock && entry.in_stock {
            // Rising transition. The notified set gates re-announcement while
            // the size stays in stock.
            if diff.notified.insert(size.clone()) {
                diff.restocks.push(Restock {
                    size: size.clone(),
                    stock: entry.clone(),
                });
            }
        } else if was_in_stock && !entry.in_stock {
            diff.notified.remove(size);
            diff.cleared.push(size.clone());
        }
    }

    diff
}
