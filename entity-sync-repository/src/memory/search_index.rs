use async_trait::async_trait;
use entity_sync_shared::{Entity, EntityId};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;

type Document = Map<String, Value>;

/// Search index holding documents as JSON field maps.
///
/// Query syntax is a small subset of the OpenSearch `query_string` grammar:
///
/// - every whitespace-separated term must match (implicit AND)
/// - `"some phrase"` is a single term, spaces included
/// - `field:value` matches when that field equals `value`, ignoring case
/// - a bare term or phrase matches when any field contains it, ignoring case
/// - an empty query or `*` matches every document
pub struct InMemorySearchIndex<E: Entity> {
    documents: Mutex<BTreeMap<EntityId, Document>>,
    config: SearchIndexConfig,
    available: AtomicBool,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: Entity> InMemorySearchIndex<E> {
    pub fn new() -> Self {
        Self::with_config(SearchIndexConfig::default())
    }

    pub fn with_config(config: SearchIndexConfig) -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            config,
            available: AtomicBool::new(true),
            _entity: std::marker::PhantomData,
        }
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The indexed document for `id`, if present.
    pub async fn get_document(&self, id: EntityId) -> Result<Option<E>, SearchIndexError> {
        match self.documents.lock().await.get(&id) {
            Some(doc) => Ok(Some(E::from_fields(doc.clone(), id)?)),
            None => Ok(None),
        }
    }

    /// Make every subsequent operation fail with `Unavailable` (or recover).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), SearchIndexError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SearchIndexError::unavailable(format!(
                "in-memory {} index is switched off",
                E::COLLECTION
            )))
        }
    }
}

impl<E: Entity> Default for InMemorySearchIndex<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Text form of a field value used for matching. `null` never matches.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.to_lowercase()),
        other => Some(other.to_string().to_lowercase()),
    }
}

/// One query term. Double-quoted text stays together as a phrase.
#[derive(Debug, PartialEq)]
enum Term {
    /// `field:value` or `field:"some value"`: that field equals the value.
    Field(String, String),
    /// A bare word or quoted phrase: some field contains it.
    Text(String),
}

fn tokenize(query: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut raw = String::new();
        let mut quoted = None;
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            if c == '"' {
                let phrase: String = chars.by_ref().take_while(|&c| c != '"').collect();
                quoted = Some(phrase);
                break;
            }
            raw.push(c);
        }

        let term = match (raw.strip_suffix(':'), quoted) {
            (Some(field), Some(phrase)) if !field.is_empty() => {
                Term::Field(field.to_string(), phrase)
            }
            (_, Some(phrase)) => Term::Text(format!("{}{}", raw, phrase)),
            (None, None) => match raw.split_once(':') {
                Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                    Term::Field(field.to_string(), value.to_string())
                }
                _ => Term::Text(raw),
            },
            (Some(_), None) => Term::Text(raw),
        };
        terms.push(term);
    }

    terms
}

fn term_matches(doc: &Document, term: &Term) -> bool {
    match term {
        Term::Field(field, expected) => {
            let expected = expected.to_lowercase();
            doc.get(field)
                .and_then(value_text)
                .is_some_and(|text| text == expected)
        }
        Term::Text(needle) => {
            let needle = needle.to_lowercase();
            doc.values()
                .filter_map(value_text)
                .any(|text| text.contains(&needle))
        }
    }
}

fn matches_query(doc: &Document, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() || query == "*" {
        return true;
    }
    tokenize(query).iter().all(|term| term_matches(doc, term))
}

#[async_trait]
impl<E: Entity> SearchIndexProvider<E> for InMemorySearchIndex<E> {
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        self.check_available()
    }

    async fn index_document(&self, record: &E) -> Result<(), SearchIndexError> {
        self.check_available()?;
        let id = record.id().ok_or_else(|| {
            SearchIndexError::index(format!("cannot index an unsaved {}", E::ENTITY_NAME))
        })?;

        let doc = record.to_fields()?;
        self.documents.lock().await.insert(id, doc);
        debug!(entity = E::ENTITY_NAME, id, "Document indexed in memory");
        Ok(())
    }

    async fn delete_document(&self, id: EntityId) -> Result<(), SearchIndexError> {
        self.check_available()?;
        self.documents.lock().await.remove(&id);
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<E>, SearchIndexError> {
        self.check_available()?;
        let documents = self.documents.lock().await;

        documents
            .iter()
            .filter(|(_, doc)| matches_query(doc, query))
            .take(self.config.effective_limit())
            .map(|(id, doc)| E::from_fields(doc.clone(), *id).map_err(SearchIndexError::from))
            .collect()
    }

    async fn clear(&self) -> Result<(), SearchIndexError> {
        self.check_available()?;
        self.documents.lock().await.clear();
        Ok(())
    }
}
