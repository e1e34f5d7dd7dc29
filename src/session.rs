//! Per-user session state: login, the loaded document, and its chat history.
//!
//! History belongs to a document. Loading a different document replaces the
//! [`DocumentSession`] and clears every [`ChatEntry`]; logging out drops both.
//! The extracted text of a loaded document is never mutated.

use crate::auth::AuthState;
use crate::error::DocQaError;
use crate::output::{Answer, Extraction, ExtractionMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The currently loaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSession {
    extraction: Extraction,
    loaded_at: DateTime<Utc>,
}

impl DocumentSession {
    pub fn new(extraction: Extraction) -> Self {
        Self {
            extraction,
            loaded_at: Utc::now(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.extraction.file_name
    }

    pub fn content_hash(&self) -> &str {
        &self.extraction.content_hash
    }

    pub fn text(&self) -> &str {
        &self.extraction.text
    }

    pub fn method(&self) -> ExtractionMethod {
        self.extraction.method
    }

    pub fn used_ocr(&self) -> bool {
        self.extraction.method.used_ocr()
    }

    pub fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// One question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub answer: Answer,
    pub timestamp: DateTime<Utc>,
}

impl ChatEntry {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer,
            timestamp: Utc::now(),
        }
    }

    pub fn question(&self) -> &str {
        &self.answer.question
    }

    pub fn answer_text(&self) -> &str {
        &self.answer.raw
    }
}

/// Everything one user has in flight.
#[derive(Debug, Clone)]
pub struct Session {
    auth: AuthState,
    document: Option<DocumentSession>,
    history: Vec<ChatEntry>,
}

impl Session {
    pub fn new(auth: AuthState) -> Self {
        Self {
            auth,
            document: None,
            history: Vec::new(),
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Log in through the session's gate.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), DocQaError> {
        self.auth.login(username, password)
    }

    /// Log out and forget the document and its history.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.document = None;
        self.history.clear();
    }

    pub fn document(&self) -> Option<&DocumentSession> {
        self.document.as_ref()
    }

    /// `true` if the document with `content_hash` is already loaded.
    pub fn is_current(&self, content_hash: &str) -> bool {
        self.document
            .as_ref()
            .is_some_and(|d| d.content_hash() == content_hash)
    }

    /// Install a freshly extracted document, clearing the previous history.
    pub fn load_document(&mut self, extraction: Extraction) -> &DocumentSession {
        if !self.history.is_empty() {
            debug!("Clearing {} history entries", self.history.len());
        }
        self.history.clear();
        info!(
            "Loaded '{}' via {} ({} chars)",
            extraction.file_name,
            extraction.method,
            extraction.char_count()
        );
        self.document.insert(DocumentSession::new(extraction))
    }

    /// Append an answer to the current document's history.
    pub fn record(&mut self, answer: Answer) -> Result<&ChatEntry, DocQaError> {
        if self.document.is_none() {
            return Err(DocQaError::NoDocumentLoaded);
        }
        self.history.push(ChatEntry::new(answer));
        self.history
            .last()
            .ok_or_else(|| DocQaError::Internal("history push lost".into()))
    }

    pub fn history(&self) -> &[ChatEntry] {
        &self.history
    }

    pub fn last_entry(&self) -> Option<&ChatEntry> {
        self.history.last()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn extraction(name: &str) -> Extraction {
        Extraction {
            file_name: name.into(),
            content_hash: format!("hash-of-{name}"),
            text: format!("contents of {name}"),
            method: ExtractionMethod::TextLayer,
            page_count: 1,
            duration_ms: 1,
        }
    }

    fn answer(q: &str) -> Answer {
        Answer {
            question: q.into(),
            raw: format!("answer to {q}"),
            segments: vec![],
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 0,
            retries: 0,
        }
    }

    #[test]
    fn history_accumulates_in_order() {
        let mut s = Session::new(AuthState::open());
        s.load_document(extraction("a.pdf"));
        s.record(answer("one")).unwrap();
        s.record(answer("two")).unwrap();
        let qs: Vec<&str> = s.history().iter().map(ChatEntry::question).collect();
        assert_eq!(qs, vec!["one", "two"]);
        assert_eq!(s.last_entry().unwrap().answer_text(), "answer to two");
    }

    #[test]
    fn loading_new_document_clears_history() {
        let mut s = Session::new(AuthState::open());
        s.load_document(extraction("a.pdf"));
        s.record(answer("q")).unwrap();
        s.load_document(extraction("b.pdf"));
        assert!(s.history().is_empty());
        assert_eq!(s.document().unwrap().file_name(), "b.pdf");
        assert!(s.is_current("hash-of-b.pdf"));
        assert!(!s.is_current("hash-of-a.pdf"));
    }

    #[test]
    fn identity_is_the_content_not_the_name() {
        let mut s = Session::new(AuthState::open());
        s.load_document(extraction("tender.pdf"));
        assert!(!s.is_current("tender.pdf"));
        assert!(s.is_current("hash-of-tender.pdf"));
    }

    #[test]
    fn record_without_document_fails() {
        let mut s = Session::new(AuthState::open());
        assert!(matches!(
            s.record(answer("q")),
            Err(DocQaError::NoDocumentLoaded)
        ));
    }

    #[test]
    fn logout_drops_document_and_history() {
        let mut s = Session::new(AuthState::new(Some(Credentials::new("u", "p")), false));
        s.login("u", "p").unwrap();
        s.load_document(extraction("a.pdf"));
        s.record(answer("q")).unwrap();
        s.logout();
        assert!(!s.auth().is_authenticated());
        assert!(s.document().is_none());
        assert!(s.history().is_empty());
    }

    #[test]
    fn clear_history_keeps_document() {
        let mut s = Session::new(AuthState::open());
        s.load_document(extraction("a.pdf"));
        s.record(answer("q")).unwrap();
        s.clear_history();
        assert!(s.history().is_empty());
        assert_eq!(s.document().unwrap().text(), "contents of a.pdf");
    }
}
