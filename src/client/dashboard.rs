//! Dashboard list state: the loaded rows, their stats and the per-row
//! actions (status toggle, delete).
//!
//! Each row action is keyed by `(kind, id)`. While one is pending a second
//! action on the same row fails fast with [`ClientError::ActionInFlight`]
//! and sends nothing.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use uuid::Uuid;

use super::{ClientError, TradeMartClient};
use crate::database::schema::types::UserRole;
use crate::models::{DashboardItem, DashboardStats, DashboardView, ItemKind, Rfq};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Dashboard {
    client: TradeMartClient,
    role: UserRole,
    view: DashboardView,
    items: Mutex<Vec<DashboardItem>>,
    in_flight: Mutex<HashSet<(ItemKind, Uuid)>>,
}

/// Clears the row's in-flight mark however the action ends
struct InFlightMark<'a> {
    set: &'a Mutex<HashSet<(ItemKind, Uuid)>>,
    key: (ItemKind, Uuid),
}

impl<'a> InFlightMark<'a> {
    fn acquire(
        set: &'a Mutex<HashSet<(ItemKind, Uuid)>>,
        key: (ItemKind, Uuid),
    ) -> Result<Self, ClientError> {
        if !lock(set).insert(key) {
            return Err(ClientError::ActionInFlight(key.1));
        }
        Ok(Self { set, key })
    }
}

impl Drop for InFlightMark<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.key);
    }
}

impl Dashboard {
    /// Fetch the dashboard. `None` lets the server pick the role's default view.
    pub async fn load(
        client: TradeMartClient,
        view: Option<DashboardView>,
    ) -> Result<Self, ClientError> {
        let data = client.dashboard(view).await?;
        debug!(role = %data.role, view = ?data.view, items = data.items.len(), "Dashboard loaded");
        Ok(Self {
            client,
            role: data.role,
            view: data.view,
            items: Mutex::new(data.items),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// Re-fetch the rows of the current view
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let data = self.client.dashboard(Some(self.view)).await?;
        *lock(&self.items) = data.items;
        Ok(())
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn view(&self) -> DashboardView {
        self.view
    }

    pub fn items(&self) -> Vec<DashboardItem> {
        lock(&self.items).clone()
    }

    /// Stats of the rows currently held, recomputed after every change
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::for_items(self.view, &lock(&self.items))
    }

    /// Rows whose title contains `query`, ignoring case. An empty query keeps every row.
    pub fn filter(&self, query: &str) -> Vec<DashboardItem> {
        let needle = query.trim().to_lowercase();
        lock(&self.items)
            .iter()
            .filter(|item| needle.is_empty() || item.title().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn is_in_flight(&self, kind: ItemKind, id: Uuid) -> bool {
        lock(&self.in_flight).contains(&(kind, id))
    }

    fn find(&self, kind: ItemKind, id: Uuid) -> Result<DashboardItem, ClientError> {
        lock(&self.items)
            .iter()
            .find(|item| item.kind() == kind && item.id() == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{:?} {}", kind, id)))
    }

    /// Flip an RFQ between open and closed (a quoted RFQ closes).
    /// The row is replaced with the server's copy on success.
    pub async fn toggle_rfq_status(&self, id: Uuid) -> Result<Rfq, ClientError> {
        let current = match self.find(ItemKind::Rfq, id)? {
            DashboardItem::Rfq(rfq) => rfq,
            DashboardItem::Product(_) => return Err(ClientError::NotFound(id.to_string())),
        };
        let _mark = InFlightMark::acquire(&self.in_flight, (ItemKind::Rfq, id))?;

        let next = current.status.toggled();
        let key = TradeMartClient::new_idempotency_key();
        let updated = self.client.update_rfq_status(id, next, &key).await?;
        info!(rfq_id = %id, from = %current.status, to = %updated.status, "RFQ status changed");

        let mut items = lock(&self.items);
        if let Some(slot) = items
            .iter_mut()
            .find(|item| item.kind() == ItemKind::Rfq && item.id() == id)
        {
            *slot = DashboardItem::Rfq(updated.clone());
        }
        Ok(updated)
    }

    /// Delete one row through its own kind's endpoint and drop exactly that row
    pub async fn delete_item(&self, kind: ItemKind, id: Uuid) -> Result<(), ClientError> {
        let item = self.find(kind, id)?;
        let _mark = InFlightMark::acquire(&self.in_flight, (kind, id))?;

        let key = TradeMartClient::new_idempotency_key();
        self.client.delete_path(&item.delete_path(), &key).await?;
        info!(?kind, item_id = %id, "Dashboard item deleted");

        lock(&self.items).retain(|row| !(row.kind() == kind && row.id() == id));
        Ok(())
    }
}
