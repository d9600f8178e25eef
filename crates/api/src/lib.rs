//! Shared API types, crypto, and SQL builders for daybook.
//!
//! This crate is the **single source of truth** for all API request/response types.
//! TypeScript types are generated via `ts-rs` for the web frontend.
//!
//! To regenerate TypeScript types:
//!   cargo test -p daybook-api --features ts -- export_typescript --nocapture

use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod crypto;
#[cfg(feature = "backend")]
pub mod db;
pub mod deploy;
pub mod google;
#[cfg(feature = "backend")]
pub mod service;

// ─── Shared Enums ────────────────────────────────────────────────────────────

/// List a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Category {
    Today,
    Other,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Today, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "other" => Ok(Self::Other),
            other => Err(ServiceError::BadRequest(format!(
                "unknown category '{other}' (expected 'today' or 'other')"
            ))),
        }
    }
}

/// Ordinal importance tag. Serialized as its integer value (0-3).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    #[default]
    None,
    Overhead,
    Neutral,
    Leverage,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Overhead => "overhead",
            Self::Neutral => "neutral",
            Self::Leverage => "leverage",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        match p {
            Priority::None => 0,
            Priority::Overhead => 1,
            Priority::Neutral => 2,
            Priority::Leverage => 3,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::None),
            1 => Ok(Self::Overhead),
            2 => Ok(Self::Neutral),
            3 => Ok(Self::Leverage),
            other => Err(format!("priority must be 0-3, got {other}")),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Email + password registration.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Email + password login.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google Identity Services sign-in: the ID token ("credential") handed to the browser.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GoogleLoginRequest {
    pub credential: String,
}

/// Public user profile. Never carries password material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: String,
}

/// Returned on successful login / register / Google sign-in.
///
/// The server also sets the session cookie; `session_token` is for clients
/// that send it as a bearer token instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthResponse {
    pub user: User,
    pub session_token: String,
    pub expires_at: String,
}

/// Generic success response for operations that don't return data.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct OkResponse {
    pub ok: bool,
}

/// Returned by the wipe endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct WipeResponse {
    pub tasks: u64,
    pub moods: u64,
    pub gratitude: u64,
    pub notes: u64,
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

/// A task row as stored by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Task {
    pub id: i64,
    pub content: String,
    pub completed: bool,
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub priority: Priority,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    pub created_at: String,
    pub user_id: String,
}

/// Body for `POST /api/tasks/{category}`. The category comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateTaskRequest {
    pub content: String,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// Body for `PATCH /api/tasks/{id}`. Absent fields are left untouched.
///
/// `estimated_time` distinguishes "absent" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "ts", ts(type = "number | null"))]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub estimated_time: Option<Option<String>>,
}

impl UpdateTaskRequest {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.estimated_time.is_none()
    }

    /// Apply this patch to a task in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(content) = &self.content {
            task.content = content.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(estimated_time) = &self.estimated_time {
            task.estimated_time = estimated_time.clone();
        }
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<String>>, D::Error> {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

// ─── Journal ─────────────────────────────────────────────────────────────────

/// An append-only mood log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct MoodEntry {
    pub id: i64,
    pub mood: String,
    pub created_at: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateMoodRequest {
    pub mood: String,
}

/// A free-text entry: used for both gratitude entries and notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TextEntry {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateTextEntryRequest {
    pub content: String,
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service Error ───────────────────────────────────────────────────────────

/// Framework-agnostic service error. Backends map it to HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

/// JSON error shape `{ "error": "..." }` returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ApiError {
    pub error: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            error: e.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Priority::Leverage).unwrap(), "3");
        let p: Priority = serde_json::from_str("1").unwrap();
        assert_eq!(p, Priority::Overhead);
        assert!(serde_json::from_str::<Priority>("4").is_err());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Today".parse::<Category>().unwrap(), Category::Today);
        assert_eq!(" other ".parse::<Category>().unwrap(), Category::Other);
        let err = "someday".parse::<Category>().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn create_request_defaults_priority() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"content":"Buy milk"}"#).unwrap();
        assert_eq!(req.priority, Priority::None);
        assert_eq!(req.estimated_time, None);
    }

    #[test]
    fn update_request_distinguishes_clear_from_absent() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(absent.estimated_time, None);

        let cleared: UpdateTaskRequest =
            serde_json::from_str(r#"{"estimated_time":null}"#).unwrap();
        assert_eq!(cleared.estimated_time, Some(None));

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"estimated_time":"30m"}"#).unwrap();
        assert_eq!(set.estimated_time, Some(Some("30m".into())));
        assert!(UpdateTaskRequest::default().is_empty());
    }

    #[test]
    fn apply_patch_touches_only_given_fields() {
        let mut task = Task {
            id: 7,
            content: "Write report".into(),
            completed: false,
            priority: Priority::Neutral,
            category: Category::Today,
            estimated_time: Some("1h".into()),
            created_at: "2024-01-01 00:00:00".into(),
            user_id: "u1".into(),
        };
        UpdateTaskRequest {
            completed: Some(true),
            estimated_time: Some(None),
            ..Default::default()
        }
        .apply_to(&mut task);
        assert!(task.completed);
        assert_eq!(task.estimated_time, None);
        assert_eq!(task.content, "Write report");
        assert_eq!(task.priority, Priority::Neutral);
    }
}

// ─── TypeScript generation ───────────────────────────────────────────────────

#[cfg(all(test, feature = "ts"))]
mod ts_export {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use ts_rs::TS;

    #[test]
    fn patch_estimate_is_optional_nullable_string() {
        let decl = UpdateTaskRequest::decl(&ts_rs::Config::new());
        assert!(decl.contains("estimated_time?: string | null"), "{decl}");
        assert!(decl.contains("priority?: number | null"), "{decl}");
    }

    /// Run with: cargo test -p daybook-api --features ts -- export_typescript --nocapture
    #[test]
    fn export_typescript() {
        let out_path =
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../web/src/api-types.generated.ts");

        let cfg = ts_rs::Config::new().with_large_int("number");
        let mut parts: Vec<String> = Vec::new();
        parts.push("// AUTO-GENERATED by daybook-api — DO NOT EDIT".to_string());
        parts.push(String::new());

        // Structs become interfaces, unions stay type aliases.
        macro_rules! collect_ts {
            ($($t:ty),+ $(,)?) => {
                $(
                    let decl = <$t>::decl(&cfg);
                    let decl = if decl.contains(" = {") {
                        decl
                            .replacen("type ", "export interface ", 1)
                            .replace(" = {", " {")
                            .trim_end_matches(';')
                            .to_string()
                    } else {
                        decl
                            .replacen("type ", "export type ", 1)
                            .trim_end_matches(';')
                            .to_string()
                    };
                    parts.push(decl);
                    parts.push(String::new());
                )+
            };
        }

        collect_ts!(
            Category,
            RegisterRequest,
            LoginRequest,
            GoogleLoginRequest,
            User,
            AuthResponse,
            OkResponse,
            WipeResponse,
            Task,
            CreateTaskRequest,
            UpdateTaskRequest,
            MoodEntry,
            CreateMoodRequest,
            TextEntry,
            CreateTextEntryRequest,
            HealthResponse,
            ApiError,
        );

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let mut file = std::fs::File::create(&out_path)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", out_path.display(), e));
        file.write_all(parts.join("\n").as_bytes())
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", out_path.display(), e));
    }
}
