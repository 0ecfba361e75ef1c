//! CMIS 1.1 browser binding client.
//!
//! A blocking JSON-over-HTTP implementation of [`Repository`]. Objects are
//! addressed by path through the repository's root folder URL and by id
//! through `objectId` query parameters. Properties are requested in succinct
//! form, so each object arrives as a flat `succinctProperties` map.

use crate::error::{RepoError, RepoOpContext, RepoResult};
use crate::object::{ObjectId, ObjectKind, RepoObject, RepositoryInfo, BASE_TYPE_FOLDER};
use crate::path::RepoPath;
use crate::repository::{ContentStream, Repository};
use crate::session::SessionParams;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};
use url::Url;

const USER_AGENT: &str = concat!("cmisdrive/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const PAGE_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryInfoJson {
    repository_id: String,
    #[serde(default)]
    repository_name: String,
    #[serde(default)]
    vendor_name: String,
    #[serde(default)]
    product_name: String,
    root_folder_id: String,
    root_folder_url: String,
}

#[derive(Debug, Deserialize)]
struct ChildrenJson {
    #[serde(default)]
    objects: Vec<ChildEntryJson>,
    #[serde(default, rename = "hasMoreItems")]
    has_more_items: bool,
}

#[derive(Debug, Deserialize)]
struct ChildEntryJson {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct ParentEntryJson {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorJson {
    exception: Option<String>,
    message: Option<String>,
}

/// Repository session over the CMIS browser binding.
#[derive(Debug)]
pub struct BrowserBindingRepository {
    client: Client,
    user: String,
    password: SecretString,
    info: RepositoryInfo,
    root_folder_url: Url,
}

impl BrowserBindingRepository {
    /// Fetch the service document and bind to a repository.
    ///
    /// Uses `params.repository_id` when set, otherwise the first repository
    /// in the service document.
    pub fn connect(params: &SessionParams) -> RepoResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| transport(&params.url, &e))?;

        debug!(url = %params.url, user = %params.user, "Fetching repository infos");
        let response = client
            .get(&params.url)
            .basic_auth(&params.user, Some(params.password.expose_secret()))
            .send()
            .map_err(|e| transport(&params.url, &e))?;

        if response.status().as_u16() == 401 {
            return Err(RepoError::Unauthorized { user: params.user.clone() });
        }
        let ctx = RepoOpContext::new().with_operation("getRepositories");
        let response = check_status(response, &ctx)?;
        let body: Value = response.json().map_err(|e| protocol(&e, ctx.clone()))?;
        let json = select_repository(body, params.repository_id.as_deref())?;

        let root_folder_url = Url::parse(&json.root_folder_url).map_err(|e| RepoError::Protocol {
            reason: format!("invalid rootFolderUrl '{}': {e}", json.root_folder_url),
            context: ctx,
        })?;

        Ok(Self {
            client,
            user: params.user.clone(),
            password: params.password.clone(),
            info: RepositoryInfo {
                id: json.repository_id,
                name: json.repository_name,
                product_name: json.product_name,
                vendor_name: json.vendor_name,
                root_folder_id: ObjectId::new(json.root_folder_id),
            },
            root_folder_url,
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.user, Some(self.password.expose_secret()))
    }

    fn object_url(&self, id: &ObjectId, selector: Option<&str>) -> Url {
        let mut url = self.root_folder_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("objectId", id.as_str());
            if let Some(selector) = selector {
                query.append_pair("cmisselector", selector);
                query.append_pair("succinct", "true");
            }
        }
        url
    }

    fn get(&self, url: Url, ctx: &RepoOpContext) -> RepoResult<Response> {
        trace!(%url, "GET");
        let response = self
            .authed(self.client.get(url.clone()))
            .send()
            .map_err(|e| transport(url.as_str(), &e))?;
        check_status(response, ctx)
    }

    fn post_form(&self, url: Url, form: &[(&str, &str)], ctx: &RepoOpContext) -> RepoResult<Response> {
        trace!(%url, action = ?form.first(), "POST");
        let response = self
            .authed(self.client.post(url.clone()))
            .form(form)
            .send()
            .map_err(|e| transport(url.as_str(), &e))?;
        check_status(response, ctx)
    }

    fn post_multipart(&self, url: Url, form: multipart::Form, ctx: &RepoOpContext) -> RepoResult<Response> {
        trace!(%url, "POST multipart");
        let response = self
            .authed(self.client.post(url.clone()))
            .multipart(form)
            .send()
            .map_err(|e| transport(url.as_str(), &e))?;
        check_status(response, ctx)
    }

    fn object_response(response: Response, ctx: RepoOpContext) -> RepoResult<RepoObject> {
        let value: Value = response.json().map_err(|e| protocol(&e, ctx.clone()))?;
        parse_object(&value, &ctx)
    }

    fn object_by_id(&self, id: &ObjectId) -> RepoResult<RepoObject> {
        let ctx = RepoOpContext::new().with_operation("getObject").with_object_id(id.as_str());
        let response = self.get(self.object_url(id, Some("object")), &ctx)?;
        Self::object_response(response, ctx)
    }

    fn parent_of(&self, object: &RepoObject) -> RepoResult<ObjectId> {
        if let Some(parent) = &object.parent_id {
            return Ok(parent.clone());
        }
        let ctx = RepoOpContext::new()
            .with_operation("getObjectParents")
            .with_object_id(object.id.as_str());
        let response = self.get(self.object_url(&object.id, Some("parents")), &ctx)?;
        let parents: Vec<ParentEntryJson> = response.json().map_err(|e| protocol(&e, ctx.clone()))?;
        let first = parents.first().ok_or_else(|| RepoError::Protocol {
            reason: "object has no parent folder".to_string(),
            context: ctx.clone(),
        })?;
        Ok(parse_object(&first.object, &ctx)?.id)
    }
}

impl Repository for BrowserBindingRepository {
    fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    fn object_by_path(&self, path: &RepoPath) -> RepoResult<RepoObject> {
        let ctx = RepoOpContext::new().with_operation("getObjectByPath").with_path(path.as_str());
        let url = path_url(&self.root_folder_url, path);
        let response = self.get(url, &ctx)?;
        Self::object_response(response, ctx)
    }

    fn children(&self, folder: &RepoObject) -> RepoResult<Vec<RepoObject>> {
        let ctx = RepoOpContext::new()
            .with_operation("getChildren")
            .with_object_id(folder.id.as_str());
        let mut out = Vec::new();
        loop {
            let mut url = self.object_url(&folder.id, Some("children"));
            url.query_pairs_mut()
                .append_pair("maxItems", &PAGE_SIZE.to_string())
                .append_pair("skipCount", &out.len().to_string());
            let page: ChildrenJson = self
                .get(url, &ctx)?
                .json()
                .map_err(|e| protocol(&e, ctx.clone()))?;
            let fetched = page.objects.len();
            for entry in &page.objects {
                let mut child = parse_object(&entry.object, &ctx)?;
                child.parent_id.get_or_insert_with(|| folder.id.clone());
                out.push(child);
            }
            if !page.has_more_items || fetched == 0 {
                break;
            }
        }
        trace!(folder = %folder.id, count = out.len(), "Listed children");
        Ok(out)
    }

    fn content_stream(&self, document: &RepoObject) -> RepoResult<ContentStream> {
        let ctx = RepoOpContext::new()
            .with_operation("getContentStream")
            .with_object_id(document.id.as_str());
        let response = self
            .get(self.object_url(&document.id, Some("content")), &ctx)
            .map_err(missing_content)?;
        Ok(Box::new(response))
    }

    fn create_folder(&self, parent: &RepoObject, name: &str) -> RepoResult<RepoObject> {
        let ctx = RepoOpContext::new()
            .with_operation("createFolder")
            .with_object_id(parent.id.as_str());
        let form = [
            ("cmisaction", "createFolder"),
            ("propertyId[0]", "cmis:name"),
            ("propertyValue[0]", name),
            ("propertyId[1]", "cmis:objectTypeId"),
            ("propertyValue[1]", BASE_TYPE_FOLDER),
            ("succinct", "true"),
        ];
        let response = self.post_form(self.object_url(&parent.id, None), &form, &ctx)?;
        Self::object_response(response, ctx)
    }

    fn create_document(
        &self,
        parent: &RepoObject,
        name: &str,
        content: &[u8],
    ) -> RepoResult<RepoObject> {
        let ctx = RepoOpContext::new()
            .with_operation("createDocument")
            .with_object_id(parent.id.as_str());
        let form = multipart::Form::new()
            .text("cmisaction", "createDocument")
            .text("propertyId[0]", "cmis:name")
            .text("propertyValue[0]", name.to_string())
            .text("propertyId[1]", "cmis:objectTypeId")
            .text("propertyValue[1]", "cmis:document")
            .text("succinct", "true")
            .part("content", content_part(name, content, &ctx)?);
        let response = self.post_multipart(self.object_url(&parent.id, None), form, &ctx)?;
        Self::object_response(response, ctx)
    }

    fn set_content_stream(&self, document: &RepoObject, content: &[u8]) -> RepoResult<RepoObject> {
        let ctx = RepoOpContext::new()
            .with_operation("setContentStream")
            .with_object_id(document.id.as_str());
        let form = multipart::Form::new()
            .text("cmisaction", "setContent")
            .text("overwriteFlag", "true")
            .text("succinct", "true")
            .part("content", content_part(&document.name, content, &ctx)?);
        let response = self.post_multipart(self.object_url(&document.id, None), form, &ctx)?;
        // Versioning repositories may answer with a new version's id
        match Self::object_response(response, ctx) {
            Ok(updated) => Ok(updated),
            Err(RepoError::Protocol { .. }) => self.object_by_id(&document.id),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, object: &RepoObject, recursive: bool) -> RepoResult<()> {
        let ctx = RepoOpContext::new().with_operation("delete").with_object_id(object.id.as_str());
        let url = self.object_url(&object.id, None);
        let result = if object.is_folder() && recursive {
            self.post_form(
                url,
                &[("cmisaction", "deleteTree"), ("allVersions", "true"), ("continueOnFailure", "false")],
                &ctx,
            )
        } else {
            self.post_form(url, &[("cmisaction", "delete"), ("allVersions", "true")], &ctx)
        };
        match result {
            Ok(_) => Ok(()),
            // Deleting a folder that still has children violates a constraint
            Err(RepoError::Runtime { reason, context })
                if object.is_folder() && !recursive && reason.starts_with("constraint") =>
            {
                Err(RepoError::FolderNotEmpty { context })
            }
            Err(e) => Err(e),
        }
    }

    fn rename(&self, object: &RepoObject, new_path: &RepoPath) -> RepoResult<RepoObject> {
        let (parent_path, new_name) = new_path.split_leaf().ok_or_else(|| {
            RepoError::InvalidArgument { reason: "cannot rename onto the root folder".to_string() }
        })?;
        let target_parent = self.object_by_path(&parent_path)?;
        if !target_parent.is_folder() {
            return Err(RepoError::NotAFolder {
                context: RepoOpContext::new().with_operation("move").with_path(parent_path.as_str()),
            });
        }

        let mut current = object.clone();
        let source_parent = self.parent_of(object)?;
        if source_parent != target_parent.id {
            let ctx = RepoOpContext::new().with_operation("move").with_object_id(object.id.as_str());
            debug!(object = %object.id, from = %source_parent, to = %target_parent.id, "Moving object");
            let form = [
                ("cmisaction", "move"),
                ("sourceFolderId", source_parent.as_str()),
                ("targetFolderId", target_parent.id.as_str()),
                ("succinct", "true"),
            ];
            let response = self.post_form(self.object_url(&object.id, None), &form, &ctx)?;
            current = Self::object_response(response, ctx)?;
        }

        if current.name != new_name {
            let ctx = RepoOpContext::new()
                .with_operation("updateProperties")
                .with_object_id(current.id.as_str());
            let form = [
                ("cmisaction", "update"),
                ("propertyId[0]", "cmis:name"),
                ("propertyValue[0]", new_name),
                ("succinct", "true"),
            ];
            let response = self.post_form(self.object_url(&current.id, None), &form, &ctx)?;
            current = Self::object_response(response, ctx)?;
        }
        current.parent_id = Some(target_parent.id);
        Ok(current)
    }
}

fn transport(url: &str, err: &reqwest::Error) -> RepoError {
    RepoError::Transport { url: url.to_string(), reason: err.to_string() }
}

fn protocol(err: &reqwest::Error, context: RepoOpContext) -> RepoError {
    RepoError::Protocol { reason: err.to_string(), context }
}

fn content_part(name: &str, content: &[u8], ctx: &RepoOpContext) -> RepoResult<multipart::Part> {
    multipart::Part::bytes(content.to_vec())
        .file_name(name.to_string())
        .mime_str("application/octet-stream")
        .map_err(|e| protocol(&e, ctx.clone()))
}

fn check_status(response: Response, ctx: &RepoOpContext) -> RepoResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let parsed: Option<ErrorJson> = serde_json::from_str(&body).ok();
    let (exception, message) = parsed.map_or((None, None), |e| (e.exception, e.message));
    let err = map_failure(status.as_u16(), exception.as_deref(), message.as_deref(), ctx.clone());
    debug!(status = status.as_u16(), exception = ?exception, "Repository request failed: {err}");
    Err(err)
}

/// A `constraint` failure from `getContentStream` means the document carries
/// no stream at all.
fn missing_content(err: RepoError) -> RepoError {
    match err {
        RepoError::Runtime { reason, context } if reason.starts_with("constraint") => {
            debug!(reason = %reason, "Document has no content stream");
            RepoError::NoContentStream { context }
        }
        other => other,
    }
}

/// Map a failed browser binding response to a [`RepoError`].
///
/// The CMIS exception name wins over the HTTP status when both are present.
fn map_failure(
    status: u16,
    exception: Option<&str>,
    message: Option<&str>,
    context: RepoOpContext,
) -> RepoError {
    let message = message.unwrap_or("").to_string();
    let missing = context.path.clone().or_else(|| context.object_id.clone()).unwrap_or_default();
    match exception {
        Some("objectNotFound") => return RepoError::ObjectNotFound { path: missing },
        Some("nameConstraintViolation" | "contentAlreadyExists") => {
            return RepoError::NameConflict { name: message, context };
        }
        Some("permissionDenied") => return RepoError::PermissionDenied { context },
        Some("invalidArgument") => return RepoError::InvalidArgument { reason: message },
        Some("constraint") => {
            return RepoError::Runtime { reason: format!("constraint: {message}"), context };
        }
        _ => {}
    }
    match status {
        404 => RepoError::ObjectNotFound { path: missing },
        409 => RepoError::NameConflict { name: message, context },
        401 => RepoError::Unauthorized { user: String::new() },
        403 => RepoError::PermissionDenied { context },
        _ => RepoError::Runtime {
            reason: match exception {
                Some(ex) => format!("{ex}: {message}"),
                None => format!("HTTP {status}: {message}"),
            },
            context,
        },
    }
}

fn select_repository(body: Value, wanted: Option<&str>) -> RepoResult<RepositoryInfoJson> {
    let ctx = RepoOpContext::new().with_operation("getRepositories");
    let mut repos: BTreeMap<String, RepositoryInfoJson> =
        serde_json::from_value(body).map_err(|e| RepoError::Protocol {
            reason: e.to_string(),
            context: ctx.clone(),
        })?;
    match wanted {
        Some(id) => repos.remove(id).ok_or_else(|| RepoError::InvalidArgument {
            reason: format!("repository '{id}' is not offered by this endpoint"),
        }),
        None => repos.into_values().next().ok_or_else(|| RepoError::Protocol {
            reason: "endpoint offers no repositories".to_string(),
            context: ctx,
        }),
    }
}

fn path_url(root_folder_url: &Url, path: &RepoPath) -> Url {
    let mut url = root_folder_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        segments.extend(path.segments());
    }
    url.query_pairs_mut()
        .append_pair("cmisselector", "object")
        .append_pair("succinct", "true");
    url
}

fn property<'a>(props: &'a Value, name: &str) -> Option<&'a Value> {
    match props.get(name)? {
        Value::Array(values) => values.first(),
        Value::Null => None,
        value => Some(value),
    }
}

fn property_str(props: &Value, name: &str) -> Option<String> {
    property(props, name).and_then(Value::as_str).map(str::to_string)
}

fn property_time(props: &Value, name: &str) -> Option<SystemTime> {
    let millis = property(props, name)?.as_i64()?;
    if millis >= 0 {
        UNIX_EPOCH.checked_add(Duration::from_millis(millis.unsigned_abs()))
    } else {
        UNIX_EPOCH.checked_sub(Duration::from_millis(millis.unsigned_abs()))
    }
}

/// Parse a succinct object response into a [`RepoObject`].
fn parse_object(value: &Value, ctx: &RepoOpContext) -> RepoResult<RepoObject> {
    let malformed = |what: &str| RepoError::Protocol {
        reason: format!("object response is missing {what}"),
        context: ctx.clone(),
    };
    let props = value.get("succinctProperties").ok_or_else(|| malformed("succinctProperties"))?;
    let id = property_str(props, "cmis:objectId").ok_or_else(|| malformed("cmis:objectId"))?;
    let base = property_str(props, "cmis:baseTypeId").ok_or_else(|| malformed("cmis:baseTypeId"))?;
    let length = property(props, "cmis:contentStreamLength").and_then(Value::as_u64);

    Ok(RepoObject {
        id: ObjectId::new(id),
        name: property_str(props, "cmis:name").unwrap_or_default(),
        kind: ObjectKind::from_base_type(&base, length),
        created: property_time(props, "cmis:creationDate"),
        modified: property_time(props, "cmis:lastModificationDate"),
        parent_id: property_str(props, "cmis:parentId").map(ObjectId::new),
    })
}
