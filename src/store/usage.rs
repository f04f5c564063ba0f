use crate::model::Usage;
use crate::repos::UsageRepo;
use crate::store::Loadable;

/// State behind the usage history page.
#[derive(Debug)]
pub struct UsageStore {
    repo: UsageRepo,
    pub usages: Loadable<Vec<Usage>>,
}

impl UsageStore {
    pub fn new(repo: UsageRepo) -> Self {
        Self {
            repo,
            usages: Loadable::default(),
        }
    }

    /// Load the ten most recent usages.
    pub async fn load_last(&mut self) {
        self.usages.set_loading();
        let result = self.repo.list_last().await;
        self.usages.settle(result);
    }

    pub async fn load_page(&mut self, skip: u32, limit: u32) {
        self.usages.set_loading();
        let result = self.repo.list_by_timestamp(skip, limit).await;
        self.usages.settle(result);
    }
}
