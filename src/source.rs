/// Fetch and mutation collaborators
///
/// The admin API is reached by whatever HTTP client the host application
/// uses. This module holds what that client needs from us: the endpoint
/// table, the bearer session, payload decoding, and the traits a list page
/// calls through. `MemorySource` implements them in-process.

use crate::config::AdminConfig;
use crate::error::SourceError;
use crate::record::Fields;
use crate::state::ListState;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// The collections the admin API lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    Projects,
    Careers,
    Subscribers,
    ContactQueries,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Projects,
        Collection::Careers,
        Collection::Subscribers,
        Collection::ContactQueries,
    ];

    pub fn list_path(self) -> &'static str {
        match self {
            Collection::Projects => "/api/get-project",
            Collection::Careers => "/api/getCarrer",
            Collection::Subscribers => "/api/getSubscribers",
            Collection::ContactQueries => "/api/getAllQuery",
        }
    }

    pub fn delete_path(self, id: &str) -> String {
        let prefix = match self {
            Collection::Projects => "/api/delete-project",
            Collection::Careers => "/api/delete-carrer",
            Collection::Subscribers => "/api/deleteSubscriber",
            Collection::ContactQueries => "/api/deleteQuery",
        };
        format!("{}/{}", prefix, id)
    }

    /// Only project routes check the bearer token.
    pub fn requires_auth(self) -> bool {
        matches!(self, Collection::Projects)
    }

    pub fn name(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Careers => "careers",
            Collection::Subscribers => "subscribers",
            Collection::ContactQueries => "contact-queries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| SourceError::InvalidArgument(format!("unknown collection: {}", s)))
    }
}

pub fn update_status_path(id: &str) -> String {
    format!("/api/updateProjectStatus/{}", id)
}

/// One project, as the edit page loads it.
pub fn project_path(id: &str) -> String {
    format!("/api/getCategoryWiseProject/{}", id)
}

pub fn update_project_path(id: &str) -> String {
    format!("/api/updateProject/{}", id)
}

pub const DELETE_IMAGE_PATH: &str = "/api/delete-image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A fully described API call, ready for an HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// `Authorization` header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

/// Base URL plus the admin's login token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

impl Session {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Session {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Session::new(&config.base_url, config.token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Download URL of an uploaded file such as a resume. Stored upload
    /// paths may use Windows separators or start with `./`.
    pub fn asset_url(&self, path: &str) -> String {
        let path = path.trim().replace('\\', "/");
        let mut rest = path.as_str();
        loop {
            let stripped = rest.trim_start_matches('/');
            match stripped.strip_prefix("./") {
                Some(next) => rest = next,
                None => {
                    rest = stripped;
                    break;
                }
            }
        }
        self.url(rest)
    }

    pub fn list_request(&self, collection: Collection) -> Result<ApiRequest, SourceError> {
        self.request(collection.requires_auth(), Method::Get, collection.list_path(), None)
    }

    pub fn delete_request(&self, collection: Collection, id: &str) -> Result<ApiRequest, SourceError> {
        require_id(id)?;
        self.request(
            collection.requires_auth(),
            Method::Delete,
            &collection.delete_path(id),
            None,
        )
    }

    pub fn update_status_request(&self, id: &str, status: &str) -> Result<ApiRequest, SourceError> {
        require_id(id)?;
        self.request(
            true,
            Method::Put,
            &update_status_path(id),
            Some(json!({ "status": status })),
        )
    }

    pub fn project_request(&self, id: &str) -> Result<ApiRequest, SourceError> {
        require_id(id)?;
        self.request(false, Method::Get, &project_path(id), None)
    }

    /// Full project update, sending `body` as the new project document.
    pub fn update_project_request(&self, id: &str, body: JsonValue) -> Result<ApiRequest, SourceError> {
        require_id(id)?;
        if !body.is_object() {
            return Err(SourceError::InvalidArgument(
                "project update body must be a JSON object".to_string(),
            ));
        }
        self.request(true, Method::Put, &update_project_path(id), Some(body))
    }

    /// Remove an uploaded project image from the image host.
    pub fn delete_image_request(&self, public_id: &str) -> Result<ApiRequest, SourceError> {
        if public_id.is_empty() {
            return Err(SourceError::InvalidArgument("image public_id must not be empty".to_string()));
        }
        self.request(
            false,
            Method::Post,
            DELETE_IMAGE_PATH,
            Some(json!({ "public_id": public_id })),
        )
    }

    fn request(
        &self,
        auth: bool,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> Result<ApiRequest, SourceError> {
        let authorization = if auth {
            Some(self.authorization().ok_or_else(|| {
                SourceError::Unauthorized(format!("{} needs a login token", path))
            })?)
        } else {
            None
        };
        Ok(ApiRequest {
            method,
            url: self.url(path),
            authorization,
            body,
        })
    }
}

fn require_id(id: &str) -> Result<(), SourceError> {
    if id.is_empty() {
        return Err(SourceError::InvalidArgument("record id must not be empty".to_string()));
    }
    Ok(())
}

/// Decode a list response. The API wraps lists as `{ "data": [...] }`; a
/// missing or null `data` is an empty list, and a bare array is accepted
/// too.
pub fn decode_collection<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, SourceError> {
    let value: JsonValue = serde_json::from_str(body)?;
    let items = match value {
        JsonValue::Array(items) => JsonValue::Array(items),
        JsonValue::Object(mut map) => match map.remove("data") {
            None | Some(JsonValue::Null) => return Ok(Vec::new()),
            Some(data @ JsonValue::Array(_)) => data,
            Some(_) => {
                return Err(SourceError::MalformedPayload(
                    "\"data\" is not an array".to_string(),
                ))
            }
        },
        _ => {
            return Err(SourceError::MalformedPayload(
                "expected an array or a { data } envelope".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(items)?)
}

/// Decode a single-record response, `{ "data": {...} }` or a bare object.
pub fn decode_record<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    let value: JsonValue = serde_json::from_str(body)?;
    let item = match value {
        JsonValue::Object(mut map) if map.contains_key("data") => match map.remove("data") {
            Some(data @ JsonValue::Object(_)) => data,
            _ => {
                return Err(SourceError::MalformedPayload(
                    "\"data\" is not an object".to_string(),
                ))
            }
        },
        object @ JsonValue::Object(_) => object,
        _ => {
            return Err(SourceError::MalformedPayload(
                "expected an object or a { data } envelope".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(item)?)
}

pub trait RecordSource<R> {
    fn fetch(&self) -> Result<Vec<R>, SourceError>;

    /// One record by id. The default scans `fetch`.
    fn fetch_one(&self, id: &str) -> Result<R, SourceError>
    where
        R: Fields,
    {
        require_id(id)?;
        self.fetch()?
            .into_iter()
            .find(|r| r.record_id().as_deref() == Some(id))
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

pub trait RecordMutator {
    fn delete(&mut self, id: &str) -> Result<(), SourceError>;
    fn update_status(&mut self, id: &str, status: &str) -> Result<(), SourceError>;
    /// Replace the fields named in `body` (a JSON object).
    fn update(&mut self, id: &str, body: &JsonValue) -> Result<(), SourceError>;
}

/// Writes a new status into a record.
pub type StatusWriter<R> = fn(&mut R, &str);

/// Applies an update body to a record.
pub type RecordUpdater<R> = fn(&mut R, &JsonValue) -> Result<(), SourceError>;

/// `RecordUpdater` for serde records: the keys of `body` overwrite the
/// record's serialized fields and the result is decoded back.
pub fn merge_json<R: Serialize + DeserializeOwned>(record: &mut R, body: &JsonValue) -> Result<(), SourceError> {
    let JsonValue::Object(changes) = body else {
        return Err(SourceError::InvalidArgument(
            "update body must be a JSON object".to_string(),
        ));
    };
    let mut current = match serde_json::to_value(&*record)? {
        JsonValue::Object(map) => map,
        _ => {
            return Err(SourceError::MalformedPayload(
                "record does not serialize to an object".to_string(),
            ))
        }
    };
    for (key, value) in changes {
        current.insert(key.clone(), value.clone());
    }
    *record = serde_json::from_value(JsonValue::Object(current))?;
    Ok(())
}

/// In-process source and mutator over an owned record list.
#[derive(Clone)]
pub struct MemorySource<R> {
    records: Vec<R>,
    status_writer: Option<StatusWriter<R>>,
    updater: Option<RecordUpdater<R>>,
}

impl<R> fmt::Debug for MemorySource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("records", &self.records.len())
            .field("status_writer", &self.status_writer.is_some())
            .field("updater", &self.updater.is_some())
            .finish()
    }
}

impl<R: Fields + Clone> MemorySource<R> {
    pub fn new(records: Vec<R>) -> Self {
        MemorySource {
            records,
            status_writer: None,
            updater: None,
        }
    }

    pub fn with_status_writer(mut self, writer: StatusWriter<R>) -> Self {
        self.status_writer = Some(writer);
        self
    }

    pub fn with_updater(mut self, updater: RecordUpdater<R>) -> Self {
        self.updater = Some(updater);
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    fn position(&self, id: &str) -> Result<usize, SourceError> {
        require_id(id)?;
        self.records
            .iter()
            .position(|r| r.record_id().as_deref() == Some(id))
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

impl<R: Fields + Clone + DeserializeOwned> MemorySource<R> {
    pub fn from_json(body: &str) -> Result<Self, SourceError> {
        Ok(MemorySource::new(decode_collection(body)?))
    }
}

impl<R: Fields + Clone> RecordSource<R> for MemorySource<R> {
    fn fetch(&self) -> Result<Vec<R>, SourceError> {
        Ok(self.records.clone())
    }
}

impl<R: Fields + Clone> RecordMutator for MemorySource<R> {
    fn delete(&mut self, id: &str) -> Result<(), SourceError> {
        let index = self.position(id)?;
        self.records.remove(index);
        Ok(())
    }

    fn update_status(&mut self, id: &str, status: &str) -> Result<(), SourceError> {
        let writer = self
            .status_writer
            .ok_or_else(|| SourceError::Request("status updates are not supported".to_string()))?;
        let index = self.position(id)?;
        writer(&mut self.records[index], status);
        Ok(())
    }

    fn update(&mut self, id: &str, body: &JsonValue) -> Result<(), SourceError> {
        let updater = self
            .updater
            .ok_or_else(|| SourceError::Request("record updates are not supported".to_string()))?;
        let index = self.position(id)?;
        let mut record = self.records[index].clone();
        updater(&mut record, body)?;
        self.records[index] = record;
        Ok(())
    }
}

/// Fetch the collection and install it in `state`. Returns the record count.
pub fn refresh<R, S>(source: &S, state: &mut ListState<R>) -> Result<usize, SourceError>
where
    R: Fields,
    S: RecordSource<R> + ?Sized,
{
    let records = source.fetch()?;
    let count = records.len();
    state.replace_records(records)?;
    Ok(count)
}

/// Delete remotely, then drop the record from `state` on success.
pub fn delete_record<R, M>(mutator: &mut M, state: &mut ListState<R>, id: &str) -> Result<(), SourceError>
where
    R: Fields,
    M: RecordMutator + ?Sized,
{
    mutator.delete(id)?;
    state.remove_by_id(id)?;
    info!("deleted record {}", id);
    Ok(())
}

/// Update a status remotely, then mirror it locally with `apply`.
pub fn update_status<R, M, F>(
    mutator: &mut M,
    state: &mut ListState<R>,
    id: &str,
    status: &str,
    apply: F,
) -> Result<(), SourceError>
where
    R: Fields,
    M: RecordMutator + ?Sized,
    F: FnOnce(&mut R, &str),
{
    mutator.update_status(id, status)?;
    let patched = state.patch_by_id(id, |r| apply(r, status))?;
    debug!("status of {} set to {} (local copy: {})", id, status, patched);
    Ok(())
}

/// Update a record remotely, then apply the same body to the local copy.
/// The local copy is left untouched when `apply` fails.
pub fn update_record<R, M, F>(
    mutator: &mut M,
    state: &mut ListState<R>,
    id: &str,
    body: &JsonValue,
    apply: F,
) -> Result<(), SourceError>
where
    R: Fields + Clone,
    M: RecordMutator + ?Sized,
    F: FnOnce(&mut R, &JsonValue) -> Result<(), SourceError>,
{
    mutator.update(id, body)?;
    let mut outcome = Ok(());
    let patched = state.patch_by_id(id, |record| {
        let mut edited = record.clone();
        outcome = apply(&mut edited, body);
        if outcome.is_ok() {
            *record = edited;
        }
    })?;
    outcome?;
    debug!("updated {} (local copy: {})", id, patched);
    Ok(())
}
