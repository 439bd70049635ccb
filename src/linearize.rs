use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::fee_frac::FeeFrac;

/// Opaque transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Txid([u8; 32]);

impl Txid {
    /// Creates a txid from its raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw bytes of the id.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Txid {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({self})")
    }
}

/// A transaction removed from the mempool by a connecting block.
///
/// The validation collaborator delivers these in confirmation order:
/// parents always precede their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedTransaction {
    /// The transaction's id.
    pub txid: Txid,

    /// Txids referenced by this transaction's inputs. Ids pointing outside
    /// the removed set (earlier blocks, coinbases) are allowed and ignored
    /// by the ancestry scan.
    pub inputs: Vec<Txid>,

    /// Fee paid, in satoshis.
    pub fee: u64,

    /// Virtual size in vbytes.
    pub vsize: u64,
}

impl RemovedTransaction {
    /// Creates a removed-transaction record.
    pub fn new(txid: Txid, inputs: Vec<Txid>, fee: u64, vsize: u64) -> Self {
        Self {
            txid,
            inputs,
            fee,
            vsize,
        }
    }
}

/// A transaction's ancestor and descendant closures within one block.
///
/// Every transaction is a member of both of its own sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxLineage {
    /// The transaction plus everything it transitively spends from.
    pub ancestors: BTreeSet<Txid>,

    /// The transaction plus everything transitively spending from it.
    pub descendants: BTreeSet<Txid>,
}

/// Ancestor/descendant closures for every transaction removed by a block.
///
/// The graph is symmetric: `b` is an ancestor of `a` exactly when `a` is a
/// descendant of `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxAncestryGraph {
    entries: BTreeMap<Txid, TxLineage>,
}

impl TxAncestryGraph {
    /// Derives the closures from a removed-transaction list in confirmation
    /// order (parents before children).
    pub fn from_removed(transactions: &[RemovedTransaction]) -> Self {
        let mut entries: BTreeMap<Txid, TxLineage> = BTreeMap::new();

        for tx in transactions {
            let mut lineage = TxLineage::default();
            lineage.ancestors.insert(tx.txid);
            lineage.descendants.insert(tx.txid);
            entries.insert(tx.txid, lineage);

            // A parent seen earlier contributes its whole ancestor closure;
            // inputs referencing txids outside the block are skipped.
            let mut inherited: BTreeSet<Txid> = BTreeSet::new();
            for input in &tx.inputs {
                if *input == tx.txid {
                    continue;
                }
                if let Some(parent) = entries.get(input) {
                    inherited.extend(parent.ancestors.iter().copied());
                }
            }

            for ancestor in &inherited {
                if let Some(entry) = entries.get_mut(ancestor) {
                    entry.descendants.insert(tx.txid);
                }
            }
            if let Some(entry) = entries.get_mut(&tx.txid) {
                entry.ancestors.extend(inherited);
            }
        }

        Self { entries }
    }

    /// The closures of `txid`, if it is in the graph.
    pub fn get(&self, txid: &Txid) -> Option<&TxLineage> {
        self.entries.get(txid)
    }

    /// Number of transactions in the graph.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the graph holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all transactions and their closures.
    pub fn iter(&self) -> impl Iterator<Item = (&Txid, &TxLineage)> {
        self.entries.iter()
    }
}

// Working aggregates of a not-yet-selected transaction: its own fee/size
// plus the sums over its still-unselected ancestors.
struct PackageEntry {
    fee: u64,
    vsize: u64,
    ancestor_fee: u64,
    ancestor_vsize: u64,
}

impl PackageEntry {
    fn ancestor_rate(&self) -> FeeFrac {
        FeeFrac::new(self.ancestor_fee, self.ancestor_vsize)
    }
}

/// Orders a block's removed transactions by mining score and emits one
/// `FeeFrac(fee, vsize)` per transaction, ready for percentile computation.
///
/// Selection mirrors ancestor-package block assembly: the transaction whose
/// ancestor package pays the best rate goes next, dragging its unselected
/// ancestors along parents-first; every selected transaction then leaves
/// the aggregates of its remaining descendants. Raw fee rates in the output
/// need not decrease monotonically, only the package scores that drove the
/// ordering do.
pub fn linearize_transactions(txs_removed_for_block: &[RemovedTransaction]) -> Vec<FeeFrac> {
    let graph = TxAncestryGraph::from_removed(txs_removed_for_block);

    let info: BTreeMap<Txid, (u64, u64)> = txs_removed_for_block
        .iter()
        .map(|tx| (tx.txid, (tx.fee, tx.vsize)))
        .collect();

    let mut remaining: BTreeMap<Txid, PackageEntry> = BTreeMap::new();
    for (txid, lineage) in graph.iter() {
        let Some(&(fee, vsize)) = info.get(txid) else {
            continue;
        };
        let mut ancestor_fee: u64 = 0;
        let mut ancestor_vsize: u64 = 0;
        for ancestor in &lineage.ancestors {
            if let Some(&(ancestor_fee_part, ancestor_vsize_part)) = info.get(ancestor) {
                ancestor_fee = ancestor_fee.saturating_add(ancestor_fee_part);
                ancestor_vsize = ancestor_vsize.saturating_add(ancestor_vsize_part);
            }
        }
        remaining.insert(
            *txid,
            PackageEntry {
                fee,
                vsize,
                ancestor_fee,
                ancestor_vsize,
            },
        );
    }

    let mut histogram = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        // Best ancestor-package rate next; ties fall to the smallest txid
        // via the map's iteration order.
        let mut best: Option<(Txid, FeeFrac)> = None;
        for (txid, entry) in &remaining {
            let rate = entry.ancestor_rate();
            match &best {
                Some((_, best_rate)) if rate <= *best_rate => {}
                _ => best = Some((*txid, rate)),
            }
        }
        let Some((best_txid, _)) = best else {
            break;
        };

        // The package: the chosen transaction plus its unselected
        // ancestors, parents first (fewer unselected ancestors first).
        let mut package: Vec<Txid> = match graph.get(&best_txid) {
            Some(lineage) => lineage
                .ancestors
                .iter()
                .copied()
                .filter(|ancestor| remaining.contains_key(ancestor))
                .collect(),
            None => Vec::new(),
        };
        package.sort_by_key(|txid| {
            let unselected_ancestors = graph
                .get(txid)
                .map(|lineage| {
                    lineage
                        .ancestors
                        .iter()
                        .filter(|ancestor| remaining.contains_key(*ancestor))
                        .count()
                })
                .unwrap_or(0);
            (unselected_ancestors, *txid)
        });

        for txid in &package {
            if let Some(entry) = remaining.get(txid) {
                histogram.push(FeeFrac::new(entry.fee, entry.vsize));
            }
        }

        for txid in &package {
            let Some(selected) = remaining.remove(txid) else {
                continue;
            };
            let Some(lineage) = graph.get(txid) else {
                continue;
            };
            for descendant in &lineage.descendants {
                if let Some(entry) = remaining.get_mut(descendant) {
                    entry.ancestor_fee = entry.ancestor_fee.saturating_sub(selected.fee);
                    entry.ancestor_vsize = entry.ancestor_vsize.saturating_sub(selected.vsize);
                }
            }
        }
    }

    histogram
}
