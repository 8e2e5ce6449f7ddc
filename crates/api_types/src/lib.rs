use serde::{Deserialize, Serialize};

/// Error payload returned by the backend on non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Identifier fields a record may carry on the wire.
///
/// The backend answers with `_id`, while entries created by older clients
/// (or held locally before a round-trip) may only have `id`. Every lookup
/// goes through [`RecordIds::matches`] so both conventions are honoured.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIds {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RecordIds {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            object_id: Some(id.into()),
            id: None,
        }
    }

    /// Returns the identifier used to address the record on the backend.
    ///
    /// `_id` wins over `id` when both are set.
    pub fn canonical(&self) -> Option<&str> {
        self.object_id.as_deref().or(self.id.as_deref())
    }

    /// True when either identifier field equals `id`.
    pub fn matches(&self, id: &str) -> bool {
        self.object_id.as_deref() == Some(id) || self.id.as_deref() == Some(id)
    }
}

pub mod coerce {
    //! Lenient numeric parsing for values that may arrive as numbers or as
    //! numeric strings.

    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
        Null(()),
    }

    /// Parses a JSON value into a float, accepting `12.5` and `"12.5"`.
    pub fn number(value: &serde_json::Value) -> Option<f64> {
        match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `deserialize_with` helper: numbers and numeric strings become `f64`,
    /// `null` becomes `0.0`.
    pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid amount: {s:?}"))),
            NumberOrText::Null(()) => Ok(0.0),
        }
    }
}

pub mod expense {
    use super::*;

    /// Expense as returned by `GET /expenses` and the write endpoints.
    ///
    /// The backend stores the free text in `note`; some records also carry a
    /// `description`. Use [`ExpenseView::description`] to read it.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        #[serde(flatten)]
        pub ids: RecordIds,
        #[serde(default)]
        pub date: String,
        #[serde(default, deserialize_with = "crate::coerce::amount")]
        pub amount: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
    }

    impl ExpenseView {
        /// `description`, falling back to `note`, falling back to `""`.
        pub fn description(&self) -> &str {
            [self.description.as_deref(), self.note.as_deref()]
                .into_iter()
                .flatten()
                .find(|text| !text.is_empty())
                .unwrap_or("")
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: String,
        pub amount: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
    }

    /// Partial update sent to `PUT /expenses/{id}`. Unset fields are omitted.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
    }
}

pub mod mood {
    use std::fmt;

    use super::*;

    /// A mood is either a numeric score or a free label (e.g. `"calm"`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum MoodValue {
        Score(f64),
        Label(String),
    }

    impl fmt::Display for MoodValue {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Score(score) => write!(f, "{score}"),
                Self::Label(label) => f.write_str(label),
            }
        }
    }

    impl From<f64> for MoodValue {
        fn from(value: f64) -> Self {
            Self::Score(value)
        }
    }

    impl From<&str> for MoodValue {
        fn from(value: &str) -> Self {
            Self::Label(value.to_string())
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MoodView {
        #[serde(flatten)]
        pub ids: RecordIds,
        pub date: String,
        pub value: MoodValue,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MoodNew {
        pub date: String,
        pub value: MoodValue,
    }
}

pub mod task {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TaskView {
        #[serde(flatten)]
        pub ids: RecordIds,
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub date: String,
        #[serde(default)]
        pub completed: bool,
        /// Position inside the day list, when the backend tracks one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub order: Option<i64>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TaskNew {
        pub title: String,
        pub date: String,
        #[serde(default)]
        pub completed: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub order: Option<i64>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct TaskUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub completed: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub order: Option<i64>,
    }

    impl From<&TaskView> for TaskUpdate {
        fn from(task: &TaskView) -> Self {
            Self {
                title: Some(task.title.clone()),
                date: Some(task.date.clone()),
                completed: Some(task.completed),
                order: task.order,
            }
        }
    }
}
