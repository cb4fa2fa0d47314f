//! Per-document decisions and the documents a user has on file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use udhaar_types::DocumentType;

/// An admin's call on one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject { reason: String },
}

impl Decision {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }
}

/// The three decisions being assembled for one review. Any may still be open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDecisions {
    pub identity: Option<Decision>,
    pub address: Option<Decision>,
    pub selfie: Option<Decision>,
}

impl DocumentDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approve_all() -> Self {
        Self {
            identity: Some(Decision::Approve),
            address: Some(Decision::Approve),
            selfie: Some(Decision::Approve),
        }
    }

    pub fn get(&self, document: DocumentType) -> Option<&Decision> {
        match document {
            DocumentType::Identity => self.identity.as_ref(),
            DocumentType::Address => self.address.as_ref(),
            DocumentType::Selfie => self.selfie.as_ref(),
        }
    }

    pub fn set(&mut self, document: DocumentType, decision: Decision) {
        let slot = match document {
            DocumentType::Identity => &mut self.identity,
            DocumentType::Address => &mut self.address,
            DocumentType::Selfie => &mut self.selfie,
        };
        *slot = Some(decision);
    }

    pub fn with(mut self, document: DocumentType, decision: Decision) -> Self {
        self.set(document, decision);
        self
    }
}

/// Documents on file for a user, keyed by type. Values are upload references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedDocuments {
    documents: BTreeMap<DocumentType, String>,
}

impl SubmittedDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, document: DocumentType, reference: impl Into<String>) -> Self {
        self.submit(document, reference);
        self
    }

    /// Store or replace a document.
    pub fn submit(&mut self, document: DocumentType, reference: impl Into<String>) {
        self.documents.insert(document, reference.into());
    }

    pub fn get(&self, document: DocumentType) -> Option<&str> {
        self.documents.get(&document).map(String::as_str)
    }

    pub fn contains(&self, document: DocumentType) -> bool {
        self.documents.contains_key(&document)
    }

    pub fn remove(&mut self, document: DocumentType) -> Option<String> {
        self.documents.remove(&document)
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// The first document type not yet on file, in review order.
    pub fn first_missing(&self) -> Option<DocumentType> {
        DocumentType::ALL
            .into_iter()
            .find(|doc| !self.documents.contains_key(doc))
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentType, &str)> {
        self.documents.iter().map(|(doc, r)| (*doc, r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_by_document() {
        let decisions = DocumentDecisions::new()
            .with(DocumentType::Selfie, Decision::reject("face not visible"));
        assert_eq!(decisions.get(DocumentType::Identity), None);
        assert_eq!(
            decisions.get(DocumentType::Selfie),
            Some(&Decision::reject("face not visible"))
        );
    }

    #[test]
    fn documents_complete_when_all_three_present() {
        let mut docs = SubmittedDocuments::new()
            .with(DocumentType::Identity, "/uploads/id.jpg")
            .with(DocumentType::Selfie, "/uploads/selfie.jpg");
        assert_eq!(docs.first_missing(), Some(DocumentType::Address));
        docs.submit(DocumentType::Address, "/uploads/address.jpg");
        assert!(docs.is_complete());
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn documents_serialize_as_map() {
        let docs = SubmittedDocuments::new().with(DocumentType::Identity, "id.jpg");
        let json = serde_json::to_string(&docs).unwrap();
        assert_eq!(json, r#"{"identity":"id.jpg"}"#);
    }
}
