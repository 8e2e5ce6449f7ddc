use api_types::{
    RecordIds,
    expense::{ExpenseNew, ExpenseUpdate, ExpenseView},
};

use crate::collection::{RemoteCollection, Resource};

/// Expense as kept in the cache.
///
/// The backend calls the free text `note`; the cache exposes it as
/// `description`. Conversions in both directions live in this module only.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub ids: RecordIds,
    pub date: String,
    pub amount: f64,
    pub description: String,
}

impl From<ExpenseView> for Expense {
    fn from(view: ExpenseView) -> Self {
        let description = view.description().to_string();
        Self {
            ids: view.ids,
            date: view.date,
            amount: view.amount,
            description,
        }
    }
}

/// A new expense before it reaches the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub date: String,
    pub amount: f64,
    pub description: String,
}

impl From<ExpenseDraft> for ExpenseNew {
    fn from(draft: ExpenseDraft) -> Self {
        Self {
            date: draft.date,
            amount: draft.amount,
            note: Some(draft.description),
        }
    }
}

/// Fields to change on an existing expense. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

impl From<ExpenseChanges> for ExpenseUpdate {
    fn from(changes: ExpenseChanges) -> Self {
        Self {
            date: changes.date,
            amount: changes.amount,
            note: changes.description,
        }
    }
}

pub struct Expenses;

impl Resource for Expenses {
    const PATH: &'static str = "expenses";
    const SINGULAR: &'static str = "expense";
    const PLURAL: &'static str = "expenses";

    type Wire = ExpenseView;
    type Record = Expense;
    type New = ExpenseNew;
    type Patch = ExpenseUpdate;

    fn from_wire(wire: ExpenseView) -> Expense {
        wire.into()
    }

    fn ids(record: &Expense) -> &RecordIds {
        &record.ids
    }
}

pub type ExpenseCollection = RemoteCollection<Expenses>;

impl RemoteCollection<Expenses> {
    /// Expenses whose date is exactly `date` (`YYYY-MM-DD`).
    pub fn by_date(&self, date: &str) -> Vec<Expense> {
        self.filtered(|expense| expense.date == date)
    }

    /// Expenses whose date starts with `month` (`YYYY-MM`).
    pub fn by_month(&self, month: &str) -> Vec<Expense> {
        self.filtered(|expense| expense.date.starts_with(month))
    }

    pub fn total_by_date(&self, date: &str) -> f64 {
        total(&self.by_date(date))
    }

    pub fn total_by_month(&self, month: &str) -> f64 {
        total(&self.by_month(month))
    }
}

fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}
