use chrono::{DateTime, Utc};
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    ToSql,
};
use serde::{Deserialize, Serialize};

pub type NoteId = i64;

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub labels: Labels,
}

/// Ordered tags of a note. Never holds empty or repeated entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(Vec<String>);

impl Labels {
    /// Splits a comma-separated form field, trimming every entry and
    /// dropping blanks and repeats.
    pub fn parse(input: &str) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for label in input.split(',').map(str::trim).filter(|l| !l.is_empty()) {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        Self(labels)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromSql for Labels {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|v| serde_json::from_str::<Vec<String>>(v).map_err(|e| FromSqlError::Other(e.into())))
            .map(|labels| Self(labels.into_iter().filter(|l| !l.trim().is_empty()).collect()))
    }
}

impl ToSql for Labels {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let json = serde_json::to_string(&self.0).map_err(|e| rusqlite::Error::ToSqlConversionFailure(e.into()))?;
        Ok(ToSqlOutput::from(json))
    }
}

/// Fields posted by the create and edit forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub labels: String,
}

#[derive(Debug, Clone)]
pub struct WriteNote {
    pub title: String,
    pub content: String,
    pub labels: Labels,
}

impl TryFrom<NoteForm> for WriteNote {
    type Error = crate::Error;

    fn try_from(NoteForm { title, content, labels }: NoteForm) -> Result<Self, Self::Error> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(crate::Error::Validation("Title is required".into()));
        }

        Ok(Self {
            title,
            content,
            labels: Labels::parse(&labels),
        })
    }
}

/// Query string of a note page. A repeated key keeps its first value.
#[derive(Debug, Default)]
pub struct NoteQuery {
    pub edit: Option<String>,
}

impl FromIterator<(String, String)> for NoteQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let edit = pairs.into_iter().find(|(key, _)| key == "edit").map(|(_, value)| value);
        Self { edit }
    }
}

impl NoteQuery {
    pub fn is_editing(&self) -> bool {
        self.edit.as_deref() == Some("true")
    }
}
