use serde::Deserialize;
use thiserror::Error;

use crate::models::ApplicationRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("record '{0}' not found")]
    NotFound(String),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Remote persistence for application records. The collection lives at the
/// store; the client only caches it for the session.
pub trait RecordStore {
    fn list(&self) -> StoreResult<Vec<ApplicationRecord>>;
    fn create(&self, record: &ApplicationRecord) -> StoreResult<ApplicationRecord>;
    fn update(&self, id: &str, record: &ApplicationRecord) -> StoreResult<ApplicationRecord>;
    fn delete(&self, id: &str) -> StoreResult<()>;
}

// --- HTTP store ---

const API_PATH: &str = "/api/applications";

pub struct HttpRecordStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRecordStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, API_PATH)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, API_PATH, id)
    }

    fn check(response: reqwest::blocking::Response, id: Option<&str>) -> StoreResult<reqwest::blocking::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }
        let message = response.text().unwrap_or_default();
        Err(StoreError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

// Some backends answer update/delete with the record, others with an
// acknowledgment body. Accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpdateReply {
    Record(ApplicationRecord),
    Ack(serde_json::Value),
}

impl RecordStore for HttpRecordStore {
    fn list(&self) -> StoreResult<Vec<ApplicationRecord>> {
        let response = self.client.get(self.collection_url()).send()?;
        Ok(Self::check(response, None)?.json()?)
    }

    fn create(&self, record: &ApplicationRecord) -> StoreResult<ApplicationRecord> {
        let response = self.client.post(self.collection_url()).json(record).send()?;
        Ok(Self::check(response, None)?.json()?)
    }

    fn update(&self, id: &str, record: &ApplicationRecord) -> StoreResult<ApplicationRecord> {
        let response = self.client.put(self.record_url(id)).json(record).send()?;
        let reply: UpdateReply = Self::check(response, Some(id))?.json()?;
        Ok(match reply {
            UpdateReply::Record(rec) => rec,
            // Acknowledgment only: fall back to what we sent, with the id.
            UpdateReply::Ack(_) => {
                let mut rec = record.clone();
                rec.id = Some(id.to_string());
                rec
            }
        })
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let response = self.client.delete(self.record_url(id)).send()?;
        Self::check(response, Some(id))?;
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::models::Status;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct MockState {
        records: Vec<ApplicationRecord>,
        next_id: u64,
        fail_next: bool,
        calls: Vec<&'static str>,
    }

    /// In-memory stand-in for the HTTP store. Clones share state, so tests
    /// can keep a handle after handing one to the view-model.
    #[derive(Clone, Default)]
    pub struct MockStore {
        state: Rc<RefCell<MockState>>,
    }

    impl MockStore {
        pub fn with_records(records: Vec<ApplicationRecord>) -> Self {
            let store = MockStore::default();
            store.state.borrow_mut().records = records;
            store
        }

        /// Make the next call fail with a server error.
        pub fn fail_next(&self) {
            self.state.borrow_mut().fail_next = true;
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.state.borrow().calls.clone()
        }

        pub fn records(&self) -> Vec<ApplicationRecord> {
            self.state.borrow().records.clone()
        }

        fn gate(&self, call: &'static str) -> StoreResult<()> {
            let mut state = self.state.borrow_mut();
            state.calls.push(call);
            if state.fail_next {
                state.fail_next = false;
                return Err(StoreError::Server {
                    status: 500,
                    message: "mock failure".to_string(),
                });
            }
            Ok(())
        }
    }

    impl RecordStore for MockStore {
        fn list(&self) -> StoreResult<Vec<ApplicationRecord>> {
            self.gate("list")?;
            Ok(self.state.borrow().records.clone())
        }

        fn create(&self, record: &ApplicationRecord) -> StoreResult<ApplicationRecord> {
            self.gate("create")?;
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let mut rec = record.clone();
            rec.id = Some(format!("id-{}", state.next_id));
            state.records.push(rec.clone());
            Ok(rec)
        }

        fn update(&self, id: &str, record: &ApplicationRecord) -> StoreResult<ApplicationRecord> {
            self.gate("update")?;
            let mut state = self.state.borrow_mut();
            let slot = state
                .records
                .iter_mut()
                .find(|r| r.id.as_deref() == Some(id))
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let mut rec = record.clone();
            rec.id = Some(id.to_string());
            *slot = rec.clone();
            Ok(rec)
        }

        fn delete(&self, id: &str) -> StoreResult<()> {
            self.gate("delete")?;
            let mut state = self.state.borrow_mut();
            let before = state.records.len();
            state.records.retain(|r| r.id.as_deref() != Some(id));
            if state.records.len() == before {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Ok(())
        }
    }

    pub fn record(id: &str, company: &str, status: Status) -> ApplicationRecord {
        ApplicationRecord {
            id: Some(id.to_string()),
            company: company.to_string(),
            position: "Engineer".to_string(),
            location: String::new(),
            status,
            date: "2024-01-01".to_string(),
            salary: String::new(),
            notes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_cleanly() {
        let store = HttpRecordStore::new("http://localhost:5000/");
        assert_eq!(store.collection_url(), "http://localhost:5000/api/applications");
        assert_eq!(store.record_url("abc"), "http://localhost:5000/api/applications/abc");
    }

    #[test]
    fn test_update_reply_accepts_record_or_ack() {
        let rec: UpdateReply =
            serde_json::from_str(r#"{"_id":"a","company":"Acme","position":"Eng"}"#).unwrap();
        assert!(matches!(rec, UpdateReply::Record(_)));

        let ack: UpdateReply = serde_json::from_str(r#"{"acknowledged":true}"#).unwrap();
        assert!(matches!(ack, UpdateReply::Ack(_)));
    }
}
