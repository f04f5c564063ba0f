use crate::model::{Document, DocumentWithSimilarity};
use crate::repos::DocumentRepo;
use crate::store::Loadable;

const MY_DOCUMENTS_PAGE: u32 = 10;

/// State behind the document pages.
#[derive(Debug)]
pub struct DocumentStore {
    repo: DocumentRepo,
    pub upload: Loadable<()>,
    pub my_documents: Loadable<Vec<Document>>,
    /// Holds the id of the document being deleted while the call is in flight.
    pub delete_document: Loadable<Option<String>>,
    pub public_query: Loadable<Vec<DocumentWithSimilarity>>,
}

impl DocumentStore {
    pub fn new(repo: DocumentRepo) -> Self {
        Self {
            repo,
            upload: Loadable::default(),
            my_documents: Loadable::default(),
            delete_document: Loadable::new(None),
            public_query: Loadable::default(),
        }
    }

    /// Upload a file, then refresh the user's document list.
    pub async fn upload_file(&mut self, namespace: &str, filename: &str, bytes: Vec<u8>) {
        self.upload.set_loading();
        match self.repo.upload_file(namespace, filename, bytes).await {
            Ok(_) => {
                self.upload.set_value(());
                self.list_my_documents().await;
            }
            Err(e) => {
                self.upload.set_error(e.message());
            }
        }
    }

    /// Upload text, then refresh the user's document list.
    pub async fn upload_text(&mut self, namespace: &str, title: &str, text: &str) {
        self.upload.set_loading();
        match self.repo.upload_text(namespace, title, text).await {
            Ok(_) => {
                self.upload.set_value(());
                self.list_my_documents().await;
            }
            Err(e) => {
                self.upload.set_error(e.message());
            }
        }
    }

    pub async fn list_my_documents(&mut self) {
        self.my_documents.set_loading();
        let result = self.repo.list_my(0, MY_DOCUMENTS_PAGE).await;
        self.my_documents.settle(result);
    }

    pub async fn delete_document(&mut self, doc_id: &str) {
        self.delete_document
            .reset()
            .set_value(Some(doc_id.to_string()))
            .set_loading();
        match self.repo.delete(doc_id).await {
            Ok(_) => {
                self.delete_document.set_value(None);
                self.list_my_documents().await;
            }
            Err(e) => {
                self.delete_document.set_error(e.message());
            }
        }
    }

    pub async fn query_public_documents(&mut self, namespace: &str, query: &str) {
        self.public_query.reset().set_loading();
        let result = self.repo.query_public_documents(namespace, query).await;
        self.public_query.settle(result);
    }
}
