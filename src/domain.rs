/// Dashboard record types
///
/// Typed versions of the four collections the admin API serves. Each one
/// exposes its fields to the view engine through `Fields` (camelCase names,
/// as the API spells them) and carries the presets its list page starts
/// from: search fields, filter controls, page size and CSV layout.

use crate::error::SourceError;
use crate::export::{CellFormat, CsvExport};
use crate::filter::{FilterSpec, Presence, ALL};
use crate::page::PageSpec;
use crate::record::Fields;
use crate::sort::{SortKind, SortSpec, CREATED_AT};
use crate::state::ListState;
use crate::value::FieldValue;
use crate::view::{ViewQuery, DEFAULT_PAGE_SIZE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const PROJECT_STATUSES: &[&str] = &["pending", "active", "deactive"];
pub const GENDERS: &[&str] = &["male", "female", "other"];

/// Per-collection list page presets.
pub trait ListPreset: Fields + Sized {
    /// Collection name, also the export file prefix
    const NAME: &'static str;
    const SEARCH_FIELDS: &'static [&'static str];
    const PAGE_SIZE: usize = DEFAULT_PAGE_SIZE;

    /// Filter controls beyond the search box, in their initial position.
    fn extra_filters() -> Vec<FilterSpec> {
        Vec::new()
    }

    fn default_query() -> ViewQuery {
        let mut query = ViewQuery::new()
            .filter(FilterSpec::text_any(Self::SEARCH_FIELDS.iter().copied(), ""))
            .page(PageSpec::first(Self::PAGE_SIZE));
        query.filters.extend(Self::extra_filters());
        query
    }

    fn csv_export() -> Option<CsvExport> {
        None
    }

    /// Field and values summarized by the stat cards, if any.
    fn status_field() -> Option<(&'static str, &'static [&'static str])> {
        None
    }

    fn list_state() -> ListState<Self> {
        let state = ListState::new(Self::default_query());
        match Self::status_field() {
            Some((field, values)) => state.with_status_field(field, values),
            None => state,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub project_name: Option<String>,
    pub project_type: Option<String>,
    pub status: Option<String>,
    pub slug: Option<String>,
    pub project_image: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Fields for Project {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "_id" | "id" => Some(self.id.clone().into()),
            "projectName" => Some(self.project_name.clone().into()),
            "projectType" => Some(self.project_type.clone().into()),
            "status" => Some(self.status.clone().into()),
            "slug" => Some(self.slug.clone().into()),
            "projectImage" => Some(
                self.project_image
                    .as_ref()
                    .map(FieldValue::from_json)
                    .unwrap_or(FieldValue::Null),
            ),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl ListPreset for Project {
    const NAME: &'static str = "projects";
    const SEARCH_FIELDS: &'static [&'static str] = &["projectType", "projectName"];

    fn extra_filters() -> Vec<FilterSpec> {
        vec![
            FilterSpec::equals("status", ALL),
            FilterSpec::equals("projectType", ALL),
        ]
    }

    fn status_field() -> Option<(&'static str, &'static [&'static str])> {
        Some(("status", PROJECT_STATUSES))
    }
}

impl Project {
    /// Body of a full project update. The edit form needs a project type
    /// and at least one uploaded image before it submits.
    pub fn update_body(&self) -> Result<JsonValue, SourceError> {
        if self.project_type.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(SourceError::InvalidArgument("select a project type".to_string()));
        }
        let has_image = matches!(&self.project_image, Some(JsonValue::Array(images)) if !images.is_empty());
        if !has_image {
            return Err(SourceError::InvalidArgument(
                "upload at least one project image".to_string(),
            ));
        }
        Ok(serde_json::to_value(self)?)
    }

    /// Cloudinary ids of the uploaded images, in display order.
    pub fn image_public_ids(&self) -> Vec<&str> {
        match &self.project_image {
            Some(JsonValue::Array(images)) => images
                .iter()
                .filter_map(|image| image.get("public_id").and_then(JsonValue::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Sort choices of the project list's drop-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSort {
    Newest,
    Oldest,
    ProjectType,
}

impl ProjectSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(ProjectSort::Newest),
            "oldest" => Some(ProjectSort::Oldest),
            "name" => Some(ProjectSort::ProjectType),
            _ => None,
        }
    }

    pub fn spec(self) -> SortSpec {
        match self {
            ProjectSort::Newest => SortSpec::default(),
            ProjectSort::Oldest => SortSpec::ascending(CREATED_AT).with_kind(SortKind::Instant),
            ProjectSort::ProjectType => SortSpec::ascending("projectType"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareerApplication {
    #[serde(rename = "_id")]
    pub id: String,
    pub salutation: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    /// Sent as a number or a string depending on the form version
    pub age: Option<JsonValue>,
    pub resume: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CareerApplication {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Download name for the attached resume.
    pub fn resume_file_name(&self) -> String {
        format!(
            "resume-{}-{}.pdf",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
    }
}

impl Fields for CareerApplication {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "_id" | "id" => Some(self.id.clone().into()),
            "salutation" => Some(self.salutation.clone().into()),
            "firstName" => Some(self.first_name.clone().into()),
            "lastName" => Some(self.last_name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "phoneNumber" => Some(self.phone_number.clone().into()),
            "address" => Some(self.address.clone().into()),
            "gender" => Some(self.gender.clone().into()),
            "age" => Some(
                self.age
                    .as_ref()
                    .map(FieldValue::from_json)
                    .unwrap_or(FieldValue::Null),
            ),
            "resume" => Some(self.resume.clone().into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl ListPreset for CareerApplication {
    const NAME: &'static str = "career-applications";
    const SEARCH_FIELDS: &'static [&'static str] =
        &["firstName", "lastName", "email", "phoneNumber", "address"];
    const PAGE_SIZE: usize = 8;

    fn extra_filters() -> Vec<FilterSpec> {
        vec![FilterSpec::equals("gender", ALL)]
    }

    fn status_field() -> Option<(&'static str, &'static [&'static str])> {
        Some(("gender", GENDERS))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscriber {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Fields for Subscriber {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "_id" | "id" => Some(self.id.clone().into()),
            "email" => Some(self.email.clone().into()),
            "phone" => Some(self.phone.clone().into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl ListPreset for Subscriber {
    const NAME: &'static str = "subscribers";
    const SEARCH_FIELDS: &'static [&'static str] = &["email", "phone"];

    fn extra_filters() -> Vec<FilterSpec> {
        vec![FilterSpec::presence("phone", Presence::Any)]
    }

    fn csv_export() -> Option<CsvExport> {
        Some(
            CsvExport::default()
                .column("Email", "email", CellFormat::Text)
                .column("Phone", "phone", CellFormat::TextOr("N/A".to_string()))
                .column("Subscription Date", CREATED_AT, CellFormat::Date)
                .column("Subscription Time", CREATED_AT, CellFormat::Time),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactQuery {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Fields for ContactQuery {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "_id" | "id" => Some(self.id.clone().into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "phone" => Some(self.phone.clone().into()),
            "message" => Some(self.message.clone().into()),
            "createdAt" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl ListPreset for ContactQuery {
    const NAME: &'static str = "contact-queries";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "phone", "message"];

    fn csv_export() -> Option<CsvExport> {
        Some(
            CsvExport::default()
                .column("Name", "name", CellFormat::Text)
                .column("Phone", "phone", CellFormat::Text)
                .column("Email", "email", CellFormat::Text)
                .column("Message", "message", CellFormat::Text)
                .column("Date", CREATED_AT, CellFormat::Date)
                .column("Time", CREATED_AT, CellFormat::Time),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Target;
    use serde_json::json;

    fn subscribers() -> Vec<Subscriber> {
        serde_json::from_value(json!([
            {"_id": "s1", "email": "alpha@example.com", "phone": "555-0101", "createdAt": "2024-01-05T10:00:00.000Z"},
            {"_id": "s2", "email": "beta@example.com", "createdAt": "2024-03-05T10:00:00.000Z"},
            {"_id": "s3", "email": "gamma@example.org", "phone": "", "createdAt": "2024-02-05T10:00:00.000Z"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_project_deserialize_and_fields() {
        let project: Project = serde_json::from_value(json!({
            "_id": "p1",
            "projectName": "Harbour House",
            "projectType": "Residential",
            "status": "active",
            "projectImage": [{"url": "https://img/1.jpg", "public_id": "a1"}],
            "createdAt": "2024-02-01T08:00:00.000Z",
            "__v": 0
        }))
        .unwrap();

        assert_eq!(project.record_id().as_deref(), Some("p1"));
        assert_eq!(project.field("projectName"), Some(FieldValue::from("Harbour House")));
        assert_eq!(project.field("slug"), Some(FieldValue::Null));
        assert!(matches!(project.field("createdAt"), Some(FieldValue::Timestamp(_))));
        assert!(matches!(project.field("projectImage"), Some(FieldValue::Nested(_))));
        assert_eq!(project.field("budget"), None);
    }

    #[test]
    fn test_project_update_body() {
        let mut project: Project = serde_json::from_value(json!({
            "_id": "p1",
            "projectName": "Harbour House",
            "projectType": "Residential",
            "projectImage": [{"url": "https://img/1.jpg", "public_id": "a1"}, {"url": "https://img/2.jpg", "public_id": "a2"}]
        }))
        .unwrap();
        assert_eq!(project.image_public_ids(), vec!["a1", "a2"]);

        let body = project.update_body().unwrap();
        assert_eq!(body["_id"], json!("p1"));
        assert_eq!(body["projectType"], json!("Residential"));
        assert_eq!(body["projectImage"][1]["public_id"], json!("a2"));

        project.project_image = Some(json!([]));
        assert!(matches!(project.update_body(), Err(SourceError::InvalidArgument(_))));
        assert!(project.image_public_ids().is_empty());

        project.project_image = Some(json!([{"public_id": "a1"}]));
        project.project_type = Some("  ".to_string());
        assert!(matches!(project.update_body(), Err(SourceError::InvalidArgument(_))));
    }

    #[test]
    fn test_project_default_query() {
        let query = Project::default_query();
        assert_eq!(query.filters.len(), 3);
        assert!(query.active_filters().is_empty());
        assert_eq!(query.page.size, 10);
        assert_eq!(query.sort, SortSpec::default());
    }

    #[test]
    fn test_project_sort_presets() {
        assert_eq!(ProjectSort::parse("newest").unwrap().spec(), SortSpec::default());
        assert_eq!(ProjectSort::parse("name").unwrap().spec(), SortSpec::ascending("projectType"));
        assert!(ProjectSort::parse("random").is_none());
    }

    #[test]
    fn test_career_search_and_gender_filter() {
        let applications: Vec<CareerApplication> = serde_json::from_value(json!([
            {"_id": "c1", "firstName": "Ada", "lastName": "Lovelace", "gender": "female", "age": 36},
            {"_id": "c2", "firstName": "Alan", "lastName": "Turing", "gender": "male", "age": "41"},
            {"_id": "c3", "firstName": "Grace", "lastName": "Hopper", "gender": "female", "address": "Arlington"}
        ]))
        .unwrap();

        let mut state = CareerApplication::list_state();
        state.replace_records(applications).unwrap();
        assert_eq!(state.query().page.size, 8);
        assert_eq!(state.status_counts().unwrap().get("female"), 2);

        state.set_search("ar");
        state.set_equals("gender", Target::parse("female")).unwrap();
        let result = state.render().unwrap();
        // Only the address matches
        assert_eq!(result.filtered_count, 1);
        assert_eq!(result.visible[0].id, "c3");
    }

    #[test]
    fn test_career_names() {
        let app = CareerApplication {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..Default::default()
        };
        assert_eq!(app.full_name(), "Ada Lovelace");
        assert_eq!(app.resume_file_name(), "resume-Ada-Lovelace.pdf");
    }

    #[test]
    fn test_subscriber_phone_filter_and_export() {
        let mut state = Subscriber::list_state();
        state.replace_records(subscribers()).unwrap();

        state.set_presence("phone", Presence::Without).unwrap();
        let rows = state.export_rows().unwrap();
        let ids: Vec<&str> = rows.iter().map(|s| s.id.as_str()).collect();
        // Newest first
        assert_eq!(ids, vec!["s2", "s3"]);

        let csv = Subscriber::csv_export().unwrap().to_csv_string(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "\"beta@example.com\",\"N/A\",\"2024-03-05\",\"10:00:00\"");
        assert_eq!(lines[2], "\"gamma@example.org\",\"N/A\",\"2024-02-05\",\"10:00:00\"");
    }

    #[test]
    fn test_contact_query_search_message() {
        let queries: Vec<ContactQuery> = serde_json::from_value(json!([
            {"_id": "q1", "name": "Sam", "message": "Interested in a KITCHEN remodel", "createdAt": "2024-01-01T00:00:00Z"},
            {"_id": "q2", "name": "Kit", "message": "Office fit-out", "createdAt": "2024-01-02T00:00:00Z"},
            {"_id": "q3", "name": "Lee", "message": "Question", "createdAt": "2024-01-03T00:00:00Z"}
        ]))
        .unwrap();

        let mut state = ContactQuery::list_state();
        state.replace_records(queries).unwrap();
        state.set_search("kit");

        let result = state.render().unwrap();
        let ids: Vec<&str> = result.visible.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q2", "q1"]);
        assert!(state.status_counts().is_none());
    }
}
