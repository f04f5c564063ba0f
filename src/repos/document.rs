//! Document upload, listing and search.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::client::{ApiClient, ClientError};
use crate::model::{Document, DocumentWithSimilarity};

const PREFIX: &str = "/document";
const PUBLIC: &str = "public";
const QUERY_LIMIT: u32 = 5;

/// Client for `/document/*`.
#[derive(Debug, Clone)]
pub struct DocumentRepo {
    client: ApiClient,
}

#[derive(Serialize)]
struct UploadLandpress<'a> {
    namespace: &'a str,
    url: &'a str,
    visibility: &'a str,
}

#[derive(Serialize)]
struct UploadText<'a> {
    namespace: &'a str,
    title: &'a str,
    text: &'a str,
    visibility: &'a str,
}

#[derive(Serialize)]
struct ParseHtml<'a> {
    html: &'a str,
}

#[derive(Serialize)]
struct QueryDocuments<'a> {
    namespace: &'a str,
    query: &'a str,
    limit: u32,
}

impl DocumentRepo {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload a file as a public document.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_file(
        &self,
        namespace: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, ClientError> {
        let file = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new()
            .text("namespace", namespace.to_string())
            .text("visibility", PUBLIC)
            .part("file", file);

        let req = self
            .client
            .request(reqwest::Method::POST, &format!("{PREFIX}/upload/file"))
            .multipart(form);
        self.client.send_json(req).await
    }

    /// Ask the server to fetch and ingest a Landpress page.
    #[instrument(skip(self))]
    pub async fn upload_landpress(&self, namespace: &str, url: &str) -> Result<Value, ClientError> {
        let body = UploadLandpress {
            namespace,
            url,
            visibility: PUBLIC,
        };
        self.client
            .post_json(&format!("{PREFIX}/upload/landpress"), &body)
            .await
    }

    /// Upload raw text as a public document.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn upload_text(
        &self,
        namespace: &str,
        title: &str,
        text: &str,
    ) -> Result<Value, ClientError> {
        let body = UploadText {
            namespace,
            title,
            text,
            visibility: PUBLIC,
        };
        self.client
            .post_json(&format!("{PREFIX}/upload/text"), &body)
            .await
    }

    /// Extract readable text from an HTML page.
    #[instrument(skip_all)]
    pub async fn parse_html(&self, html: &str) -> Result<String, ClientError> {
        self.client
            .post_json(&format!("{PREFIX}/parse/html_page"), &ParseHtml { html })
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, doc_id: &str) -> Result<Value, ClientError> {
        self.client
            .delete(&format!("{PREFIX}/delete/{doc_id}"))
            .await
    }

    /// Documents uploaded by the signed-in user.
    #[instrument(skip(self))]
    pub async fn list_my(&self, skip: u32, limit: u32) -> Result<Vec<Document>, ClientError> {
        self.client
            .get_json(&format!("{PREFIX}/list_my?skip={skip}&limit={limit}"))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_public(&self, skip: u32, limit: u32) -> Result<Vec<Document>, ClientError> {
        self.client
            .get_json(&format!("{PREFIX}/list_public?skip={skip}&limit={limit}"))
            .await
    }

    /// Public documents whose summaries best match `query`.
    #[instrument(skip(self))]
    pub async fn query_public_documents(
        &self,
        namespace: &str,
        query: &str,
    ) -> Result<Vec<DocumentWithSimilarity>, ClientError> {
        let body = QueryDocuments {
            namespace,
            query,
            limit: QUERY_LIMIT,
        };
        self.client
            .post_json(&format!("{PREFIX}/query_public_document_summary"), &body)
            .await
    }
}
