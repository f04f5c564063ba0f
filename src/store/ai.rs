use nonempty::NonEmpty;

use crate::model::Answer;
use crate::repos::AiRepo;
use crate::store::Loadable;

/// State behind the question-answering page and the online indicator.
#[derive(Debug)]
pub struct AiStore {
    repo: AiRepo,
    pub answer: Loadable<Option<Answer>>,
    pub health: Loadable<bool>,
}

impl AiStore {
    pub fn new(repo: AiRepo) -> Self {
        Self {
            repo,
            answer: Loadable::new(None),
            health: Loadable::default(),
        }
    }

    pub async fn simple_extract(&mut self, question: &str, documents: &NonEmpty<String>) {
        self.answer.set_loading();
        let result = self.repo.simple_extract(question, documents).await;
        self.answer.settle(result.map(Some));
    }

    pub async fn check_health(&mut self) {
        self.health.set_loading();
        let online = self.repo.health_check().await;
        self.health.set_value(online);
    }

    pub fn is_online(&self) -> bool {
        self.health.has_data() && *self.health.value()
    }
}
