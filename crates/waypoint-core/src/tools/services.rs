//! Optional editor and language-server services.
//!
//! The engine only reads from these. Hosts that have an editor attach an
//! implementation with `ToolEngineBuilder::with_services`; every method it
//! does not override reports `Unsupported`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{StoreError, StoreResult};

/// A position in a document, as passed to the `lsp_*` tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub path: String,
    /// 0-based line
    pub line: u32,
    /// 0-based UTF-16 column
    pub character: u32,
}

/// Read-only editor and language-server queries.
#[async_trait]
pub trait EditorServices: Send + Sync {
    async fn active_file(&self) -> StoreResult<Value> {
        Err(StoreError::unsupported("editor_getActiveFile"))
    }

    async fn selection(&self) -> StoreResult<Value> {
        Err(StoreError::unsupported("editor_getSelection"))
    }

    async fn semantic_search(&self, _query: &str, _limit: usize) -> StoreResult<Value> {
        Err(StoreError::unsupported("workspace_semanticSearch"))
    }

    async fn hover(&self, _at: &Position) -> StoreResult<Value> {
        Err(StoreError::unsupported("lsp_hover"))
    }

    async fn definition(&self, _at: &Position) -> StoreResult<Value> {
        Err(StoreError::unsupported("lsp_definition"))
    }

    async fn references(&self, _at: &Position) -> StoreResult<Value> {
        Err(StoreError::unsupported("lsp_references"))
    }

    async fn symbols(&self, _path: &str) -> StoreResult<Value> {
        Err(StoreError::unsupported("lsp_symbols"))
    }

    async fn diagnostics(&self, _path: Option<&str>) -> StoreResult<Value> {
        Err(StoreError::unsupported("lsp_diagnostics"))
    }

    async fn completions(&self, _at: &Position) -> StoreResult<Value> {
        Err(StoreError::unsupported("lsp_completions"))
    }
}
