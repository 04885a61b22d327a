/// Payload validation
///
/// Request bodies arrive as raw JSON. Validation runs in two passes:
///
/// 1. Each known field is read with its expected JSON type. A wrong type
///    (`"title": 5`) is reported against that field; unknown fields are
///    ignored.
/// 2. The typed payload goes through its `validator` rules (lengths, ranges,
///    enum membership, date format).
///
/// Every failing field is reported, not just the first one. Field names in
/// errors use the camelCase wire names (`dueDate`, `projectId`).
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskdeck_shared::models::task::TaskPriority;
/// use taskdeck_shared::validation::validate_create;
///
/// let task = validate_create(&json!({
///     "title": "Write spec",
///     "priority": "high",
///     "status": "todo",
/// })).unwrap();
/// assert_eq!(task.priority, Some(TaskPriority::High));
///
/// let err = validate_create(&json!({
///     "title": "Write spec",
///     "priority": "urgent",
///     "status": "todo",
/// })).unwrap_err();
/// assert!(err.has_field("priority"));
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::project::CreateProject;
use crate::models::task::{NewTask, TaskPatch, TaskPriority, TaskStatus};

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field that failed validation, sorted by field name
///
/// Only the first failure per field is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {} error(s)", .errors.len())]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    fn from_errors(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        errors.dedup_by(|a, b| a.field == b.field);
        Self { errors }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let collected = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = camel_case(&field);
                field_errors
                    .iter()
                    .map(move |error| FieldError::new(field.clone(), message_of(error)))
            })
            .collect();

        Self::from_errors(collected)
    }
}

fn message_of(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

/// `due_date` -> `dueDate`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;

    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Parses a due date as RFC 3339 or as a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn check_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskStatus>()
        .map(|_| ())
        .map_err(|e| ValidationError::new("enum").with_message(Cow::Owned(e.to_string())))
}

fn check_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskPriority>()
        .map(|_| ())
        .map_err(|e| ValidationError::new("enum").with_message(Cow::Owned(e.to_string())))
}

fn check_due_date(value: &str) -> Result<(), ValidationError> {
    match parse_due_date(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date")
            .with_message(Cow::Borrowed("Expected an RFC 3339 date-time or YYYY-MM-DD date"))),
    }
}

/// Typed reader over a JSON object that records wrong-type errors
struct Fields<'a> {
    map: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn of(body: &'a Value) -> Result<Self, ValidationFailure> {
        let map = body
            .as_object()
            .ok_or_else(|| ValidationFailure::single("body", "Expected a JSON object"))?;

        Ok(Self {
            map,
            errors: Vec::new(),
        })
    }

    fn reject(&mut self, key: &str, message: &str) {
        self.errors.push(FieldError::new(key, message));
    }

    fn has_error(&self, key: &str) -> bool {
        self.errors.iter().any(|e| e.field == key)
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.reject(key, "Expected a string");
                None
            }
        }
    }

    /// Like [`Fields::string`], but a missing field is an error too
    fn required_string(&mut self, key: &str) -> String {
        if !self.map.contains_key(key) {
            self.reject(key, "Required");
        }
        self.string(key).unwrap_or_default()
    }

    fn boolean(&mut self, key: &str) -> Option<bool> {
        match self.map.get(key)? {
            Value::Bool(b) => Some(*b),
            _ => {
                self.reject(key, "Expected a boolean");
                None
            }
        }
    }

    /// `Some(None)` for an explicit null
    fn nullable_id(&mut self, key: &str) -> Option<Option<i64>> {
        match self.map.get(key)? {
            Value::Null => Some(None),
            Value::Number(n) => match n.as_i64() {
                Some(id) => Some(Some(id)),
                None => {
                    self.reject(key, "Expected an integer");
                    None
                }
            },
            _ => {
                self.reject(key, "Expected an integer or null");
                None
            }
        }
    }

    fn finish<T: Validate>(self, payload: T) -> Result<T, ValidationFailure> {
        let mut errors = self.errors;

        if let Err(failed) = payload.validate() {
            errors.extend(ValidationFailure::from(failed).errors);
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(ValidationFailure::from_errors(errors))
        }
    }
}

#[derive(Debug, Default, Validate)]
struct TaskPayload {
    #[validate(length(min = 1, message = "Title is required"))]
    title: Option<String>,

    description: Option<String>,

    #[validate(custom(function = "check_status"))]
    status: Option<String>,

    #[validate(custom(function = "check_priority"))]
    priority: Option<String>,

    #[validate(custom(function = "check_due_date"))]
    due_date: Option<String>,

    #[validate(range(min = 1, max = 2147483647, message = "Must be a positive integer"))]
    project_id: Option<i64>,

    #[validate(range(min = 1, max = 2147483647, message = "Must be a positive integer"))]
    category_id: Option<i64>,

    favorite: Option<bool>,

    detach_project: bool,
    detach_category: bool,
}

impl TaskPayload {
    fn read(fields: &mut Fields<'_>) -> Self {
        let project = fields.nullable_id("projectId");
        let category = fields.nullable_id("categoryId");

        Self {
            title: fields.string("title"),
            description: fields.string("description"),
            status: fields.string("status"),
            priority: fields.string("priority"),
            due_date: fields.string("dueDate"),
            project_id: project.flatten(),
            category_id: category.flatten(),
            favorite: fields.boolean("favorite"),
            detach_project: project == Some(None),
            detach_category: category == Some(None),
        }
    }

    fn status(&self) -> Result<Option<TaskStatus>, ValidationFailure> {
        self.status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()
            .map_err(|e| ValidationFailure::single("status", e.to_string()))
    }

    fn priority(&self) -> Result<Option<TaskPriority>, ValidationFailure> {
        self.priority
            .as_deref()
            .map(str::parse::<TaskPriority>)
            .transpose()
            .map_err(|e| ValidationFailure::single("priority", e.to_string()))
    }

    fn due_date(&self) -> Result<Option<DateTime<Utc>>, ValidationFailure> {
        match self.due_date.as_deref() {
            None => Ok(None),
            Some(raw) => parse_due_date(raw)
                .map(Some)
                .ok_or_else(|| ValidationFailure::single("dueDate", "Invalid date")),
        }
    }

    fn project_id(&self) -> Option<i32> {
        self.project_id.and_then(|id| i32::try_from(id).ok())
    }

    fn category_id(&self) -> Option<i32> {
        self.category_id.and_then(|id| i32::try_from(id).ok())
    }
}

/// Validates a create payload
///
/// `title`, `priority` and `status` are required; `description`, `dueDate`,
/// `projectId`, `categoryId` and `favorite` are optional. A null `projectId`
/// or `categoryId` is the same as leaving it out.
pub fn validate_create(body: &Value) -> Result<NewTask, ValidationFailure> {
    let mut fields = Fields::of(body)?;
    let payload = TaskPayload::read(&mut fields);

    for (key, present) in [
        ("title", payload.title.is_some()),
        ("priority", payload.priority.is_some()),
        ("status", payload.status.is_some()),
    ] {
        if !present && !fields.has_error(key) {
            fields.reject(key, "Required");
        }
    }

    let payload = fields.finish(payload)?;

    Ok(NewTask {
        status: payload.status()?,
        priority: payload.priority()?,
        due_date: payload.due_date()?,
        project_id: payload.project_id(),
        category_id: payload.category_id(),
        favorite: payload.favorite,
        description: payload.description,
        title: payload.title.unwrap_or_default(),
    })
}

/// Validates a partial update payload
///
/// Any subset of fields may be present, including none. An explicit null
/// `projectId`/`categoryId` detaches the task.
pub fn validate_update(body: &Value) -> Result<TaskPatch, ValidationFailure> {
    let mut fields = Fields::of(body)?;
    let payload = TaskPayload::read(&mut fields);
    let payload = fields.finish(payload)?;

    let project_id = match (payload.detach_project, payload.project_id()) {
        (true, _) => Some(None),
        (false, Some(id)) => Some(Some(id)),
        (false, None) => None,
    };
    let category_id = match (payload.detach_category, payload.category_id()) {
        (true, _) => Some(None),
        (false, Some(id)) => Some(Some(id)),
        (false, None) => None,
    };

    Ok(TaskPatch {
        status: payload.status()?,
        priority: payload.priority()?,
        due_date: payload.due_date()?,
        project_id,
        category_id,
        favorite: payload.favorite,
        description: payload.description,
        title: payload.title,
    })
}

/// Validates the `date`/`priority` query of the calendar view
pub fn validate_calendar_query(
    date: Option<&str>,
    priority: Option<&str>,
) -> Result<(NaiveDate, Option<TaskPriority>), ValidationFailure> {
    let mut errors = Vec::new();

    let date = match date {
        None => {
            errors.push(FieldError::new("date", "Required"));
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(FieldError::new("date", "Expected a YYYY-MM-DD date"));
                None
            }
        },
    };

    let priority = match priority.filter(|p| !p.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<TaskPriority>() {
            Ok(priority) => Some(priority),
            Err(e) => {
                errors.push(FieldError::new("priority", e.to_string()));
                None
            }
        },
    };

    match date {
        Some(date) if errors.is_empty() => Ok((date, priority)),
        _ => Err(ValidationFailure::from_errors(errors)),
    }
}

/// Registration form
#[derive(Debug, Clone, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

pub fn validate_register(body: &Value) -> Result<RegisterPayload, ValidationFailure> {
    let mut fields = Fields::of(body)?;
    let payload = RegisterPayload {
        name: fields.required_string("name"),
        email: fields.required_string("email"),
        password: fields.required_string("password"),
    };

    fields.finish(payload)
}

/// Login form
#[derive(Debug, Clone, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Required"))]
    pub password: String,
}

pub fn validate_login(body: &Value) -> Result<LoginPayload, ValidationFailure> {
    let mut fields = Fields::of(body)?;
    let payload = LoginPayload {
        email: fields.required_string("email"),
        password: fields.required_string("password"),
    };

    fields.finish(payload)
}

#[derive(Debug, Validate)]
struct NamedPayload {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    name: String,

    description: Option<String>,
}

/// Validates a project create payload (`name`, optional `description`)
pub fn validate_project(body: &Value) -> Result<CreateProject, ValidationFailure> {
    let mut fields = Fields::of(body)?;
    let payload = NamedPayload {
        name: fields.required_string("name"),
        description: fields.string("description"),
    };
    let payload = fields.finish(payload)?;

    Ok(CreateProject {
        name: payload.name,
        description: payload.description,
    })
}

/// Validates a category create payload and returns the name
pub fn validate_category(body: &Value) -> Result<String, ValidationFailure> {
    let mut fields = Fields::of(body)?;
    let payload = NamedPayload {
        name: fields.required_string("name"),
        description: None,
    };

    fields.finish(payload).map(|p| p.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields_of(err: &ValidationFailure) -> Vec<&str> {
        err.errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_create_minimal() {
        let task = validate_create(&json!({
            "title": "Write spec",
            "priority": "high",
            "status": "todo",
        }))
        .unwrap();

        assert_eq!(task.title, "Write spec");
        assert_eq!(task.priority, Some(TaskPriority::High));
        assert_eq!(task.status, Some(TaskStatus::Todo));
        assert_eq!(task.due_date, None);
        assert_eq!(task.favorite, None);
    }

    #[test]
    fn test_create_all_fields() {
        let task = validate_create(&json!({
            "title": "Ship",
            "description": "Release 1.0",
            "priority": "low",
            "status": "in_progress",
            "dueDate": "2025-03-04T17:00:00Z",
            "projectId": 3,
            "categoryId": null,
            "favorite": true,
            "somethingElse": [1, 2, 3],
        }))
        .unwrap();

        assert_eq!(task.description.as_deref(), Some("Release 1.0"));
        assert_eq!(task.status, Some(TaskStatus::InProgress));
        assert_eq!(task.due_date, Some(Utc.with_ymd_and_hms(2025, 3, 4, 17, 0, 0).unwrap()));
        assert_eq!(task.project_id, Some(3));
        assert_eq!(task.category_id, None);
        assert_eq!(task.favorite, Some(true));
    }

    #[test]
    fn test_create_requires_title_priority_status() {
        let err = validate_create(&json!({})).unwrap_err();

        assert_eq!(fields_of(&err), vec!["priority", "status", "title"]);
        assert!(err.errors.iter().all(|e| e.message == "Required"));
    }

    #[test]
    fn test_create_empty_title() {
        let err = validate_create(&json!({
            "title": "",
            "priority": "medium",
            "status": "todo",
        }))
        .unwrap_err();

        assert_eq!(err.errors, vec![FieldError::new("title", "Title is required")]);
    }

    #[test]
    fn test_create_rejects_unknown_priority() {
        let err = validate_create(&json!({
            "title": "Write spec",
            "priority": "urgent",
            "status": "todo",
        }))
        .unwrap_err();

        assert_eq!(fields_of(&err), vec!["priority"]);
        assert!(err.errors[0].message.contains("urgent"));
    }

    #[test]
    fn test_wrong_type_names_field() {
        let err = validate_create(&json!({
            "title": 5,
            "priority": "high",
            "status": "todo",
        }))
        .unwrap_err();

        assert_eq!(err.errors, vec![FieldError::new("title", "Expected a string")]);
    }

    #[test]
    fn test_reports_every_failing_field() {
        let err = validate_create(&json!({
            "title": "",
            "priority": "urgent",
            "status": "later",
            "dueDate": "next tuesday",
            "projectId": 0,
            "favorite": "yes",
        }))
        .unwrap_err();

        assert_eq!(
            fields_of(&err),
            vec!["dueDate", "favorite", "priority", "projectId", "status", "title"]
        );
    }

    #[test]
    fn test_non_object_body() {
        for body in [json!([]), json!("task"), json!(null), json!(3)] {
            let err = validate_create(&body).unwrap_err();
            assert_eq!(fields_of(&err), vec!["body"]);

            let err = validate_update(&body).unwrap_err();
            assert_eq!(fields_of(&err), vec!["body"]);
        }
    }

    #[test]
    fn test_update_empty_is_valid() {
        let patch = validate_update(&json!({})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_subset() {
        let patch = validate_update(&json!({
            "status": "done",
            "dueDate": "2025-03-04",
        }))
        .unwrap();

        assert_eq!(patch.status, Some(TaskStatus::Done));
        assert_eq!(patch.due_date, Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap()));
        assert_eq!(patch.title, None);
        assert_eq!(patch.priority, None);
    }

    #[test]
    fn test_update_null_ids_detach() {
        let patch = validate_update(&json!({
            "projectId": null,
            "categoryId": 4,
        }))
        .unwrap();

        assert_eq!(patch.project_id, Some(None));
        assert_eq!(patch.category_id, Some(Some(4)));
    }

    #[test]
    fn test_update_rejects_empty_title_and_bad_status() {
        let err = validate_update(&json!({"title": "", "status": "DONE"})).unwrap_err();
        assert_eq!(fields_of(&err), vec!["status", "title"]);
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2025-03-04T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_due_date("2025-12-31"),
            Some(Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_due_date("2025-02-30"), None);
        assert_eq!(parse_due_date("tomorrow"), None);
        assert_eq!(parse_due_date(""), None);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("due_date"), "dueDate");
        assert_eq!(camel_case("project_id"), "projectId");
        assert_eq!(camel_case("title"), "title");
    }

    #[test]
    fn test_calendar_query() {
        let (date, priority) = validate_calendar_query(Some("2025-03-04"), Some("high")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(priority, Some(TaskPriority::High));

        let (_, priority) = validate_calendar_query(Some("2025-03-04"), Some("")).unwrap();
        assert_eq!(priority, None);

        let err = validate_calendar_query(None, Some("urgent")).unwrap_err();
        assert_eq!(fields_of(&err), vec!["date", "priority"]);

        let err = validate_calendar_query(Some("03/04/2025"), None).unwrap_err();
        assert_eq!(fields_of(&err), vec!["date"]);
    }

    #[test]
    fn test_register() {
        let payload = validate_register(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter22",
        }))
        .unwrap();
        assert_eq!(payload.email, "ada@example.com");

        let err = validate_register(&json!({
            "name": "A",
            "email": "not-an-email",
            "password": "123",
        }))
        .unwrap_err();
        assert_eq!(fields_of(&err), vec!["email", "name", "password"]);

        let err = validate_register(&json!({"name": "Ada"})).unwrap_err();
        assert!(err.has_field("email"));
        assert!(err.has_field("password"));
    }

    #[test]
    fn test_login() {
        assert!(validate_login(&json!({"email": "ada@example.com", "password": "x"})).is_ok());

        let err = validate_login(&json!({"email": "", "password": 12})).unwrap_err();
        assert!(err.has_field("email"));
        assert!(err.has_field("password"));
    }

    #[test]
    fn test_project_and_category_names() {
        let project = validate_project(&json!({"name": "Home", "description": "Chores"})).unwrap();
        assert_eq!(project.name, "Home");
        assert_eq!(project.description.as_deref(), Some("Chores"));

        assert_eq!(validate_category(&json!({"name": "Errands"})).unwrap(), "Errands");

        let long = "x".repeat(101);
        assert!(validate_project(&json!({"name": long})).unwrap_err().has_field("name"));
        assert!(validate_category(&json!({"name": ""})).unwrap_err().has_field("name"));
        assert!(validate_category(&json!({})).unwrap_err().has_field("name"));
    }
}
