use serde::{Deserialize, Serialize};

use dueping_core::{DueError, DueResult, Task};

pub const NAME_FIELD: &str = "properties.Name.title[0].plain_text";
pub const DUE_FIELD: &str = "properties.Due.date.start";

/// Body of `POST /v1/databases/{id}/query`.
///
/// Every property on the path to a task's name and due date is optional, so a
/// page missing one decodes fine and fails later with the field it lacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "Name", default)]
    pub name: Option<TitleProperty>,
    #[serde(rename = "Due", default)]
    pub due: Option<DateProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleProperty {
    #[serde(default)]
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateProperty {
    #[serde(default)]
    pub date: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl Page {
    pub fn name(&self) -> Option<&str> {
        self.properties
            .name
            .as_ref()?
            .title
            .first()?
            .plain_text
            .as_deref()
            .filter(|s| !s.is_empty())
    }

    pub fn due_start(&self) -> Option<&str> {
        self.properties.due.as_ref()?.date.as_ref()?.start.as_deref()
    }

    /// `index` labels the page in errors when Notion sent no id.
    pub fn to_task(&self, index: usize) -> DueResult<Task> {
        let label = || self.id.clone().unwrap_or_else(|| format!("#{index}"));

        let name = self.name().ok_or_else(|| DueError::MalformedRecord {
            page: label(),
            field: NAME_FIELD,
        })?;
        let due = self.due_start().ok_or_else(|| DueError::MalformedRecord {
            page: label(),
            field: DUE_FIELD,
        })?;

        Ok(Task::new(name, due))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(value: serde_json::Value) -> Page {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_page_becomes_task() {
        let p = page(json!({
            "object": "page",
            "id": "p-1",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [
                    {"type": "text", "plain_text": "Problem set 3"}
                ]},
                "Due": {"id": "x", "type": "date", "date": {
                    "start": "2024-08-02", "end": null, "time_zone": null
                }}
            }
        }));
        assert_eq!(p.to_task(0).unwrap(), Task::new("Problem set 3", "2024-08-02"));
    }

    #[test]
    fn empty_title_is_malformed() {
        let p = page(json!({
            "id": "p-2",
            "properties": {
                "Name": {"title": []},
                "Due": {"date": {"start": "2024-08-02"}}
            }
        }));
        let err = p.to_task(0).unwrap_err();
        assert!(matches!(err, DueError::MalformedRecord { field: NAME_FIELD, .. }));
    }

    #[test]
    fn null_date_is_malformed_and_labelled_by_index() {
        let p = page(json!({
            "properties": {
                "Name": {"title": [{"plain_text": "No date"}]},
                "Due": {"date": null}
            }
        }));
        match p.to_task(4).unwrap_err() {
            DueError::MalformedRecord { page, field } => {
                assert_eq!(page, "#4");
                assert_eq!(field, DUE_FIELD);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_properties_decode() {
        let p = page(json!({"id": "p-3"}));
        assert!(p.name().is_none());
        assert!(p.due_start().is_none());
    }
}
