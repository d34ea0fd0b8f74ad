use crate::db::AccountStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared by every handler. Cloned per request, so keep it cheap.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub template_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(accounts: AccountStore, template_path: PathBuf) -> Self {
        Self {
            accounts,
            template_path: Arc::new(template_path),
        }
    }
}
