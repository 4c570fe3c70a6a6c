//! Context menu registry.

use async_trait::async_trait;
use parking_lot::Mutex;

use inkcheck_protocols::{ContextId, HostError, MenuClick, MenuHost, MenuItem};

/// In-memory [`MenuHost`]. Creating an entry whose id already exists fails,
/// as it does in a real browser.
#[derive(Default)]
pub struct MenuRegistry {
    items: Mutex<Vec<MenuItem>>,
}

impl MenuRegistry {
    pub fn items(&self) -> Vec<MenuItem> {
        self.items.lock().clone()
    }

    /// Click an entry over a selection in `page`.
    pub fn click(
        &self,
        id: &str,
        selection: Option<&str>,
        page: ContextId,
    ) -> Result<MenuClick, HostError> {
        if !self.items.lock().iter().any(|item| item.id == id) {
            return Err(HostError::Failed(format!("no menu item with id {}", id)));
        }
        Ok(MenuClick {
            menu_item_id: id.to_string(),
            selection_text: selection.map(str::to_string),
            page,
        })
    }
}

#[async_trait]
impl MenuHost for MenuRegistry {
    async fn remove_all(&self) -> Result<(), HostError> {
        self.items.lock().clear();
        Ok(())
    }

    async fn create(&self, item: MenuItem) -> Result<(), HostError> {
        let mut items = self.items.lock();
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(HostError::Failed(format!(
                "Cannot create item with duplicate id {}",
                item.id
            )));
        }
        items.push(item);
        Ok(())
    }
}
