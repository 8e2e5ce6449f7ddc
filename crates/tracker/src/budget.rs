//! Daily and monthly budget ceilings kept in local storage.
//!
//! Budgets are sparse: a value set once keeps applying to later periods
//! until overridden. Resolution walks back from the requested period to the
//! nearest explicit value, within a bounded window:
//!
//! - daily: up to [`DAILY_LOOKBACK_DAYS`] days back;
//! - monthly: up to [`MONTHLY_LOOKBACK_MONTHS`] months back.
//!
//! Nothing found inside the window resolves to `0.0`.
use std::{collections::BTreeMap, sync::Arc};

use chrono::{Days, Months, NaiveDate};
use serde_json::Value;

use crate::{
    error::{Result, TrackerError},
    storage::KeyValueStore,
};

pub const DAILY_BUDGETS_KEY: &str = "dailyBudgets";
pub const MONTHLY_BUDGETS_KEY: &str = "monthlyBudgets";
pub const DAILY_LOOKBACK_DAYS: u32 = 30;
pub const MONTHLY_LOOKBACK_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetPeriod {
    /// Keyed by `YYYY-MM-DD`.
    Daily,
    /// Keyed by `YYYY-MM`.
    Monthly,
}

impl BudgetPeriod {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Daily => DAILY_BUDGETS_KEY,
            Self::Monthly => MONTHLY_BUDGETS_KEY,
        }
    }

    pub fn lookback(self) -> u32 {
        match self {
            Self::Daily => DAILY_LOOKBACK_DAYS,
            Self::Monthly => MONTHLY_LOOKBACK_MONTHS,
        }
    }

    fn parse(self, key: &str) -> Option<NaiveDate> {
        match self {
            Self::Daily => NaiveDate::parse_from_str(key, "%Y-%m-%d").ok(),
            Self::Monthly => NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok(),
        }
    }

    fn step_back(self, from: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            Self::Daily => from.checked_sub_days(Days::new(steps.into())),
            Self::Monthly => from.checked_sub_months(Months::new(steps)),
        }
    }

    fn format(self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Monthly => date.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Clone)]
pub struct BudgetStore {
    storage: Arc<dyn KeyValueStore>,
}

impl BudgetStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn set_daily(&self, date: &str, amount: f64) -> Result<()> {
        self.set(BudgetPeriod::Daily, date, amount)
    }

    pub fn set_monthly(&self, month: &str, amount: f64) -> Result<()> {
        self.set(BudgetPeriod::Monthly, month, amount)
    }

    pub fn get_daily(&self, date: &str) -> f64 {
        self.get(BudgetPeriod::Daily, date)
    }

    pub fn get_monthly(&self, month: &str) -> f64 {
        self.get(BudgetPeriod::Monthly, month)
    }

    /// Upserts the budget for `key` and persists the whole map.
    pub fn set(&self, period: BudgetPeriod, key: &str, amount: f64) -> Result<()> {
        if !amount.is_finite() {
            return Err(TrackerError::InvalidAmount(amount));
        }
        let mut budgets = self.load(period);
        budgets.insert(key.to_string(), Value::from(amount));
        let payload = serde_json::to_string(&budgets)?;
        self.storage.set(period.storage_key(), &payload)?;
        tracing::debug!(period = ?period, key, amount, "budget saved");
        Ok(())
    }

    /// Resolves the budget in effect for `key`.
    pub fn get(&self, period: BudgetPeriod, key: &str) -> f64 {
        let budgets = self.load(period);
        if let Some(amount) = explicit(&budgets, key) {
            return amount;
        }

        let Some(start) = period.parse(key) else {
            tracing::warn!(period = ?period, key, "cannot parse budget key, defaulting to 0");
            return 0.0;
        };

        (1..=period.lookback())
            .filter_map(|steps| period.step_back(start, steps))
            .find_map(|previous| explicit(&budgets, &period.format(previous)))
            .unwrap_or(0.0)
    }

    /// Every explicit value stored for `period`, in key order.
    pub fn explicit_budgets(&self, period: BudgetPeriod) -> BTreeMap<String, f64> {
        let budgets = self.load(period);
        budgets
            .keys()
            .filter_map(|key| explicit(&budgets, key).map(|amount| (key.clone(), amount)))
            .collect()
    }

    fn load(&self, period: BudgetPeriod) -> BTreeMap<String, Value> {
        let raw = match self.storage.get(period.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(err) => {
                tracing::warn!("failed to read {}: {err}", period.storage_key());
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(budgets) => budgets,
            Err(err) => {
                tracing::warn!("ignoring malformed {}: {err}", period.storage_key());
                BTreeMap::new()
            }
        }
    }
}

fn explicit(budgets: &BTreeMap<String, Value>, key: &str) -> Option<f64> {
    let value = budgets.get(key)?;
    let amount = api_types::coerce::number(value);
    if amount.is_none() {
        tracing::warn!(key, "ignoring non-numeric budget value {value}");
    }
    amount
}
