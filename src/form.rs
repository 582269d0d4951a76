use anyhow::Result;

use crate::models::{ApplicationRecord, Status, today};
use crate::view_model::ViewModel;

/// What the form is currently doing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Closed,
    Creating,
    Editing(String),
}

/// One field of the draft. Field changes arrive as explicit messages so the
/// controller works the same from CLI flags and from the TUI overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Company,
    Position,
    Location,
    Salary,
    Status,
    Date,
    Notes,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Company,
        Field::Position,
        Field::Location,
        Field::Salary,
        Field::Status,
        Field::Date,
        Field::Notes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Company => "Company",
            Field::Position => "Position",
            Field::Location => "Location",
            Field::Salary => "Salary",
            Field::Status => "Status",
            Field::Date => "Date",
            Field::Notes => "Notes",
        }
    }
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// Guard failed (company or position empty); nothing happened.
    Blocked,
    /// Store accepted the draft; the form is closed.
    Saved,
}

/// Deterministic state machine over {closed, creating, editing(id)} holding
/// the in-progress draft. Store I/O happens only inside submit().
pub struct FormController {
    mode: Mode,
    draft: ApplicationRecord,
}

fn blank_draft() -> ApplicationRecord {
    ApplicationRecord {
        id: None,
        company: String::new(),
        position: String::new(),
        location: String::new(),
        status: Status::Pending,
        date: today(),
        salary: String::new(),
        notes: String::new(),
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self {
            mode: Mode::Closed,
            draft: blank_draft(),
        }
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != Mode::Closed
    }

    pub fn draft(&self) -> &ApplicationRecord {
        &self.draft
    }

    pub fn open_create(&mut self) {
        self.draft = blank_draft();
        self.mode = Mode::Creating;
    }

    /// Copy an existing record into the draft. No-op when the id isn't in
    /// the collection.
    pub fn open_edit(&mut self, vm: &ViewModel, id: &str) {
        let Some(existing) = vm.find(id) else { return };
        let mut draft = existing.clone();
        draft.date = existing.date_only().to_string();
        self.draft = draft;
        self.mode = Mode::Editing(id.to_string());
    }

    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::Company => self.draft.company = value.to_string(),
            Field::Position => self.draft.position = value.to_string(),
            Field::Location => self.draft.location = value.to_string(),
            Field::Salary => self.draft.salary = value.to_string(),
            Field::Date => self.draft.date = value.to_string(),
            Field::Notes => self.draft.notes = value.to_string(),
            // Invalid status text leaves the draft as it was.
            Field::Status => {
                if let Some(status) = Status::parse(value) {
                    self.draft.status = status;
                }
            }
        }
    }

    pub fn get(&self, field: Field) -> String {
        match field {
            Field::Company => self.draft.company.clone(),
            Field::Position => self.draft.position.clone(),
            Field::Location => self.draft.location.clone(),
            Field::Salary => self.draft.salary.clone(),
            Field::Date => self.draft.date.clone(),
            Field::Notes => self.draft.notes.clone(),
            Field::Status => self.draft.status.value().to_string(),
        }
    }

    pub fn cycle_status(&mut self) {
        let next = match self.draft.status {
            Status::Pending => Status::Interview,
            Status::Interview => Status::Offer,
            Status::Offer => Status::Rejected,
            Status::Rejected | Status::Unknown => Status::Pending,
        };
        self.draft.status = next;
    }

    /// Required fields for the draft to be persistable.
    pub fn is_valid(&self) -> bool {
        !self.draft.company.is_empty() && !self.draft.position.is_empty()
    }

    /// Push the draft into the store. Blocked drafts make no store call and
    /// leave the mode unchanged. A store failure keeps the form open with
    /// the draft intact so nothing the user typed is lost.
    pub fn submit(&mut self, vm: &mut ViewModel) -> Result<Submit> {
        if !self.is_valid() {
            return Ok(Submit::Blocked);
        }
        match self.mode.clone() {
            Mode::Closed => Ok(Submit::Blocked),
            Mode::Creating => {
                vm.store_create(&self.draft)?;
                self.close();
                Ok(Submit::Saved)
            }
            Mode::Editing(id) => {
                vm.store_update(&id, &self.draft)?;
                self.close();
                Ok(Submit::Saved)
            }
        }
    }

    /// Discard the draft without touching the store.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.draft = blank_draft();
        self.mode = Mode::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{MockStore, record};

    fn setup(records: Vec<ApplicationRecord>) -> (ViewModel, MockStore) {
        let store = MockStore::with_records(records);
        let mut vm = ViewModel::new(Box::new(store.clone()));
        vm.load().unwrap();
        (vm, store)
    }

    #[test]
    fn test_open_create_populates_defaults() {
        let mut form = FormController::new();
        form.open_create();
        assert_eq!(*form.mode(), Mode::Creating);
        assert_eq!(form.draft().status, Status::Pending);
        assert_eq!(form.draft().date, today());
        assert!(form.draft().company.is_empty());
        assert!(form.draft().id.is_none());
    }

    #[test]
    fn test_guarded_submit_makes_no_store_call() {
        let (mut vm, store) = setup(vec![]);
        let calls_before = store.calls().len();

        let mut form = FormController::new();
        form.open_create();
        form.set(Field::Position, "Engineer");
        // company left empty
        let outcome = form.submit(&mut vm).unwrap();

        assert_eq!(outcome, Submit::Blocked);
        assert_eq!(*form.mode(), Mode::Creating);
        assert_eq!(store.calls().len(), calls_before);
    }

    #[test]
    fn test_create_appends_store_assigned_record() {
        let (mut vm, store) = setup(vec![]);
        let mut form = FormController::new();
        form.open_create();
        form.set(Field::Company, "Acme");
        form.set(Field::Position, "Engineer");
        form.set(Field::Salary, "$80,000");

        assert_eq!(form.submit(&mut vm).unwrap(), Submit::Saved);
        assert_eq!(*form.mode(), Mode::Closed);
        assert_eq!(vm.records().len(), 1);
        // The store assigned the id, not the client.
        assert!(vm.records()[0].id.is_some());
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn test_edit_replaces_with_store_response() {
        let (mut vm, _) = setup(vec![record("1", "Acme", Status::Pending)]);
        let mut form = FormController::new();
        form.open_edit(&vm, "1");
        assert_eq!(*form.mode(), Mode::Editing("1".to_string()));
        form.set(Field::Status, "offer");
        form.set(Field::Company, "Acme Corp");

        assert_eq!(form.submit(&mut vm).unwrap(), Submit::Saved);
        assert_eq!(*form.mode(), Mode::Closed);
        let updated = vm.find("1").unwrap();
        assert_eq!(updated.company, "Acme Corp");
        assert_eq!(updated.status, Status::Offer);
    }

    #[test]
    fn test_open_edit_strips_time_of_day() {
        let mut rec = record("1", "Acme", Status::Pending);
        rec.date = "2024-03-05T00:00:00.000Z".to_string();
        let (vm, _) = setup(vec![rec]);

        let mut form = FormController::new();
        form.open_edit(&vm, "1");
        assert_eq!(form.draft().date, "2024-03-05");
    }

    #[test]
    fn test_open_edit_unknown_id_is_a_noop() {
        let (vm, _) = setup(vec![]);
        let mut form = FormController::new();
        form.open_edit(&vm, "missing");
        assert_eq!(*form.mode(), Mode::Closed);
    }

    #[test]
    fn test_edit_then_cancel_changes_nothing() {
        let (vm, _) = setup(vec![record("1", "Acme", Status::Pending)]);
        let mut form = FormController::new();
        form.open_edit(&vm, "1");
        form.set(Field::Company, "Scrapped Rename");
        form.cancel();

        assert_eq!(*form.mode(), Mode::Closed);
        assert_eq!(vm.find("1").unwrap().company, "Acme");
    }

    #[test]
    fn test_store_failure_keeps_form_open_and_draft_intact() {
        let (mut vm, store) = setup(vec![]);
        let mut form = FormController::new();
        form.open_create();
        form.set(Field::Company, "Acme");
        form.set(Field::Position, "Engineer");
        form.set(Field::Notes, "half-written notes");

        store.fail_next();
        assert!(form.submit(&mut vm).is_err());
        assert_eq!(*form.mode(), Mode::Creating);
        assert_eq!(form.draft().notes, "half-written notes");
        assert_eq!(vm.records().len(), 0);
        assert!(vm.last_error().is_some());
    }

    #[test]
    fn test_invalid_status_text_is_ignored() {
        let mut form = FormController::new();
        form.open_create();
        form.set(Field::Status, "interview");
        form.set(Field::Status, "ghosted");
        assert_eq!(form.draft().status, Status::Interview);
    }

    #[test]
    fn test_cycle_status_wraps() {
        let mut form = FormController::new();
        form.open_create();
        for _ in 0..4 {
            form.cycle_status();
        }
        assert_eq!(form.draft().status, Status::Pending);
    }
}
