// src/cache.rs
use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ActivityError, ExplorerError};
use crate::explorer::Explorer;
use crate::models::{
    Activity, ActivityPage, PageMetadata, PageParams, Pagination, RawTransaction,
    TokenTransferRecord,
};
use crate::{merger, projector};

/// Position in one of the explorer's page streams
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cursor {
    /// Nothing fetched yet; the next request asks for the first page
    #[default]
    Start,
    Next(PageParams),
    Exhausted,
}

impl Cursor {
    fn from_next(next: Option<PageParams>) -> Self {
        next.map_or(Cursor::Exhausted, Cursor::Next)
    }

    pub fn params(&self) -> Option<&PageParams> {
        match self {
            Cursor::Next(params) => Some(params),
            Cursor::Start | Cursor::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Cursor::Exhausted)
    }
}

/// Position in the token-transfer stream plus transfers fetched but not yet merged
#[derive(Debug, Clone, Default)]
struct TransferStream {
    cursor: Cursor,
    backlog: Vec<TokenTransferRecord>,
}

impl TransferStream {
    fn has_transfer_for(&self, hash: &str) -> bool {
        self.backlog
            .iter()
            .any(|t| t.transaction_hash.eq_ignore_ascii_case(hash))
    }
}

/// Everything already fetched and classified for one address
#[derive(Debug, Default)]
pub struct CacheEntry {
    activities: Vec<Activity>,
    cursor: Cursor,
    items_seen: usize,
    transfers: TransferStream,
}

impl CacheEntry {
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Raw transactions received from the explorer, including skipped ones
    pub fn items_seen(&self) -> usize {
        self.items_seen
    }

    /// Record one fetched page. The buffer and cursor move together.
    pub fn append_page(
        &mut self,
        activities: Vec<Activity>,
        items_seen: usize,
        next: Option<PageParams>,
    ) {
        self.activities.extend(activities);
        self.items_seen += items_seen;
        self.cursor = Cursor::from_next(next);
    }

    fn covers(&self, p: &Pagination) -> bool {
        self.activities.len() >= p.offset.saturating_add(p.limit)
    }

    pub fn window(&self, p: &Pagination) -> ActivityPage {
        let total = self.activities.len();
        let end = p.offset.saturating_add(p.limit);
        let activities = self.activities[p.offset.min(total)..end.min(total)].to_vec();

        ActivityPage {
            activities,
            metadata: PageMetadata {
                count: total,
                offset: p.offset,
                limit: p.limit,
                has_next_page: !self.cursor.is_exhausted() || total > end,
            },
        }
    }
}

/// Per-address activity buffers. Each entry sits behind its own async lock,
/// so at most one explorer fetch is in flight per address.
#[derive(Debug, Default)]
pub struct ActivityCache {
    entries: Mutex<HashMap<Address, Arc<AsyncMutex<CacheEntry>>>>,
}

impl ActivityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `address`, created empty on first use
    pub fn get(&self, address: &Address) -> Arc<AsyncMutex<CacheEntry>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(*address).or_default())
    }

    /// Drop the entry for `address`. Returns whether one existed.
    pub fn reset(&self, address: &Address) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(address).is_some()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serves paginated activities, fetching from the explorer only when the buffer runs short
pub struct ActivityService {
    explorer: Arc<dyn Explorer>,
    cache: ActivityCache,
    max_pages_per_request: usize,
    max_transfer_pages: usize,
    abort_on_invalid_transaction: bool,
}

impl ActivityService {
    pub fn new(explorer: Arc<dyn Explorer>, cfg: &Config) -> Self {
        Self {
            explorer,
            cache: ActivityCache::new(),
            max_pages_per_request: cfg.max_pages_per_request.max(1),
            max_transfer_pages: cfg.max_transfer_pages,
            abort_on_invalid_transaction: cfg.abort_on_invalid_transaction,
        }
    }

    pub fn cache(&self) -> &ActivityCache {
        &self.cache
    }

    pub async fn get_activities_by_address(
        &self,
        address: &Address,
        pagination: Option<Pagination>,
    ) -> Result<ActivityPage, ActivityError> {
        let pagination = pagination.unwrap_or_default();
        let entry = self.cache.get(address);
        let mut entry = entry.lock().await;

        let mut fetched = 0;
        while !entry.covers(&pagination) && !entry.cursor.is_exhausted() {
            if fetched >= self.max_pages_per_request {
                warn!(
                    "Stopped after {} explorer pages for {} with {} activities buffered",
                    fetched,
                    address,
                    entry.len()
                );
                break;
            }
            self.fetch_next_page(address, &mut entry).await?;
            fetched += 1;
        }

        if fetched == 0 {
            debug!("Served {} {:?} from cache", address, pagination);
        }

        Ok(entry.window(&pagination))
    }

    async fn fetch_next_page(
        &self,
        address: &Address,
        entry: &mut CacheEntry,
    ) -> Result<(), ActivityError> {
        let page = self
            .explorer
            .transactions(address, entry.cursor.params())
            .await?;

        // Transfer stream changes are staged and only committed with the page
        let mut transfers = entry.transfers.clone();
        let transactions = if merger::needs_merge(&page.items) {
            self.backfill_transfers(address, &mut transfers, &page.items)
                .await?;
            let merged = merger::merge_token_transfers(&page.items, &transfers.backlog);
            prune_backlog(&mut transfers.backlog, &merged);
            merged
        } else {
            page.items
        };

        let mut activities = Vec::with_capacity(transactions.len());
        for tx in &transactions {
            match projector::project_activity(tx, address) {
                Ok(activity) => activities.push(activity),
                Err(e) if self.abort_on_invalid_transaction => return Err(e.into()),
                Err(e) => warn!("Skipping transaction {:?} for {}: {}", tx.hash, address, e),
            }
        }

        info!(
            "Fetched {} transactions for {} → {} activities (next page: {})",
            transactions.len(),
            address,
            activities.len(),
            page.next_page_params.is_some()
        );

        entry.transfers = transfers;
        entry.append_page(activities, transactions.len(), page.next_page_params);
        Ok(())
    }

    /// Pull token-transfer pages until every unmerged transaction's block has been passed
    async fn backfill_transfers(
        &self,
        address: &Address,
        transfers: &mut TransferStream,
        transactions: &[RawTransaction],
    ) -> Result<(), ExplorerError> {
        let pending: Vec<&RawTransaction> = transactions
            .iter()
            .filter(|tx| tx.token_transfers.is_none())
            .collect();
        let oldest_block = pending.iter().filter_map(|tx| tx.block_number).min();

        let mut fetched = 0;
        loop {
            let done = match oldest_block {
                Some(oldest) => transfers
                    .backlog
                    .iter()
                    .any(|t| t.block_number.map_or(false, |b| b < oldest)),
                None => pending.iter().all(|tx| transfers.has_transfer_for(&tx.hash)),
            };
            if done || transfers.cursor.is_exhausted() {
                break;
            }
            if fetched >= self.max_transfer_pages {
                let unmatched: Vec<&str> = pending
                    .iter()
                    .filter(|tx| !transfers.has_transfer_for(&tx.hash))
                    .map(|tx| tx.hash.as_str())
                    .collect();
                warn!(
                    "Token transfer backfill for {} stopped after {} pages; no transfers found for {:?}",
                    address, fetched, unmatched
                );
                break;
            }

            let page = self
                .explorer
                .token_transfers(address, transfers.cursor.params())
                .await?;
            debug!(
                "Fetched {} token transfers for {}",
                page.items.len(),
                address
            );
            transfers.backlog.extend(page.items);
            transfers.cursor = Cursor::from_next(page.next_page_params);
            fetched += 1;
        }

        Ok(())
    }
}

/// Forget transfers that can no longer match a future transaction page
fn prune_backlog(backlog: &mut Vec<TokenTransferRecord>, merged: &[RawTransaction]) {
    let oldest_block = merged.iter().filter_map(|tx| tx.block_number).min();
    backlog.retain(|t| {
        let merged_already = merged
            .iter()
            .any(|tx| tx.hash.eq_ignore_ascii_case(&t.transaction_hash));
        let passed = match (oldest_block, t.block_number) {
            (Some(oldest), Some(b)) => b > oldest,
            _ => false,
        };
        !merged_already && !passed
    });
}
