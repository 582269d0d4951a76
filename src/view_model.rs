use std::cmp::Ordering;

use anyhow::{Result, anyhow};

use crate::models::{ApplicationRecord, Status};
use crate::store::RecordStore;

/// Which statuses the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => *s == status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(s) => s.label(),
        }
    }

    /// Cycle order used by the TUI: all -> pending -> interview -> offer ->
    /// rejected -> all.
    pub fn next(&self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Only(Status::Pending),
            StatusFilter::Only(Status::Pending) => StatusFilter::Only(Status::Interview),
            StatusFilter::Only(Status::Interview) => StatusFilter::Only(Status::Offer),
            StatusFilter::Only(Status::Offer) => StatusFilter::Only(Status::Rejected),
            StatusFilter::Only(_) => StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    DateAsc,
    #[default]
    DateDesc,
    CompanyAsc,
    CompanyDesc,
    SalaryAsc,
    SalaryDesc,
}

impl SortKey {
    pub fn name(&self) -> &'static str {
        match self {
            SortKey::DateAsc => "date-asc",
            SortKey::DateDesc => "date-desc",
            SortKey::CompanyAsc => "company-asc",
            SortKey::CompanyDesc => "company-desc",
            SortKey::SalaryAsc => "salary-asc",
            SortKey::SalaryDesc => "salary-desc",
        }
    }

    pub fn next(&self) -> SortKey {
        match self {
            SortKey::DateDesc => SortKey::DateAsc,
            SortKey::DateAsc => SortKey::CompanyAsc,
            SortKey::CompanyAsc => SortKey::CompanyDesc,
            SortKey::CompanyDesc => SortKey::SalaryDesc,
            SortKey::SalaryDesc => SortKey::SalaryAsc,
            SortKey::SalaryAsc => SortKey::DateDesc,
        }
    }
}

pub fn resolve_sort(name: &str) -> Result<SortKey> {
    match name {
        "date-asc" => Ok(SortKey::DateAsc),
        "date-desc" => Ok(SortKey::DateDesc),
        "company-asc" => Ok(SortKey::CompanyAsc),
        "company-desc" => Ok(SortKey::CompanyDesc),
        "salary-asc" => Ok(SortKey::SalaryAsc),
        "salary-desc" => Ok(SortKey::SalaryDesc),
        _ => Err(anyhow!(
            "Unknown sort '{}'. Available: date-asc, date-desc, company-asc, \
             company-desc, salary-asc, salary-desc",
            name
        )),
    }
}

/// Derived statistics over the whole collection, filters not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
    /// Percentage of applications that got any response, rounded to the
    /// nearest integer. 0 for an empty collection.
    pub response_rate: u32,
}

/// Session-scoped state behind the list view: the cached collection plus
/// the search/filter/sort the user has dialed in.
///
/// All store calls are blocking and issued from the one logical thread, so
/// mutations are serialized; a stale list() response can never overwrite a
/// later local change.
pub struct ViewModel {
    store: Box<dyn RecordStore>,
    records: Vec<ApplicationRecord>,
    search_term: String,
    filter: StatusFilter,
    sort: SortKey,
    loading: bool,
    last_error: Option<String>,
}

impl ViewModel {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            store,
            records: Vec::new(),
            search_term: String::new(),
            filter: StatusFilter::All,
            sort: SortKey::default(),
            loading: false,
            last_error: None,
        }
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Most recent store failure, cleared by the next successful call.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    pub fn find(&self, id: &str) -> Option<&ApplicationRecord> {
        self.records.iter().find(|r| r.id.as_deref() == Some(id))
    }

    /// Fetch the full collection, replacing the cache wholesale. On failure
    /// the previous cache (empty on first load) is kept.
    pub fn load(&mut self) -> Result<()> {
        self.loading = true;
        let result = self.store.list();
        self.loading = false;
        match result {
            Ok(records) => {
                self.records = records;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to load applications: {}", e);
                self.last_error = Some(message.clone());
                Err(anyhow!(message))
            }
        }
    }

    /// Delete at the store first; the cache only changes on success.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        match self.store.delete(id) {
            Ok(()) => {
                self.records.retain(|r| r.id.as_deref() != Some(id));
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to delete application: {}", e);
                self.last_error = Some(message.clone());
                Err(anyhow!(message))
            }
        }
    }

    pub(crate) fn store_create(&mut self, draft: &ApplicationRecord) -> Result<()> {
        match self.store.create(draft) {
            Ok(created) => {
                self.records.push(created);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to save application: {}", e);
                self.last_error = Some(message.clone());
                Err(anyhow!(message))
            }
        }
    }

    pub(crate) fn store_update(&mut self, id: &str, draft: &ApplicationRecord) -> Result<()> {
        match self.store.update(id, draft) {
            // Trust the server copy over the local draft; the store may
            // normalize fields on write.
            Ok(updated) => {
                if let Some(slot) = self.records.iter_mut().find(|r| r.id.as_deref() == Some(id)) {
                    *slot = updated;
                }
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to save application: {}", e);
                self.last_error = Some(message.clone());
                Err(anyhow!(message))
            }
        }
    }

    pub fn stats(&self) -> Stats {
        let count = |s: Status| self.records.iter().filter(|r| r.status == s).count();
        let total = self.records.len();
        let pending = count(Status::Pending);
        let response_rate = if total > 0 {
            (((total - pending) as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Stats {
            total,
            pending,
            interview: count(Status::Interview),
            offer: count(Status::Offer),
            rejected: count(Status::Rejected),
            response_rate,
        }
    }

    /// The filtered, sorted sequence the list renders. The cache itself is
    /// never reordered; ties keep their arrival order.
    pub fn visible(&self) -> Vec<ApplicationRecord> {
        let term = self.search_term.to_lowercase();
        let mut rows: Vec<ApplicationRecord> = self
            .records
            .iter()
            .filter(|r| {
                let matches_search = term.is_empty()
                    || r.company.to_lowercase().contains(&term)
                    || r.position.to_lowercase().contains(&term)
                    || r.location.to_lowercase().contains(&term);
                matches_search && self.filter.matches(r.status)
            })
            .cloned()
            .collect();

        // Vec::sort_by is stable.
        match self.sort {
            SortKey::DateAsc => rows.sort_by_key(|r| r.date_value()),
            SortKey::DateDesc => rows.sort_by(|a, b| b.date_value().cmp(&a.date_value())),
            SortKey::CompanyAsc => rows.sort_by(|a, b| compare_company(a, b)),
            SortKey::CompanyDesc => rows.sort_by(|a, b| compare_company(b, a)),
            SortKey::SalaryAsc => rows.sort_by_key(|r| r.salary_value()),
            SortKey::SalaryDesc => rows.sort_by(|a, b| b.salary_value().cmp(&a.salary_value())),
        }
        rows
    }
}

fn compare_company(a: &ApplicationRecord, b: &ApplicationRecord) -> Ordering {
    a.company.to_lowercase().cmp(&b.company.to_lowercase())
}
