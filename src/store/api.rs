//! Request/response protocol between the editor and its store.
//!
//! [`Router`] is the serving side: it maps `(method, path, body)` onto a
//! [`Storage`]. [`ApiClient`] is the calling side and implements
//! [`StoreClient`] over any [`Transport`].

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use super::{Storage, StoreClient};
use crate::error::{StoreError, StoreResult};
use crate::file::{FileEntity, FileId, FilePatch, NewFile};
use crate::settings::EditorSettings;

const STORE_ORIGIN: &str = "http://store.local/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

impl Response {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(err) => Self::message(500, &err.to_string()),
        }
    }

    fn message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(json!({ "message": message })),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send {
    fn send(&mut self, request: Request) -> StoreResult<Response>;
}

/// Serves store requests from a backing [`Storage`].
pub struct Router {
    storage: Box<dyn Storage>,
    origin: Url,
}

impl Router {
    pub fn new(storage: Box<dyn Storage>) -> StoreResult<Self> {
        let origin = Url::parse(STORE_ORIGIN).map_err(|e| StoreError::Invalid(e.to_string()))?;
        Ok(Self { storage, origin })
    }

    pub fn handle(&mut self, request: Request) -> Response {
        let Ok(url) = self.origin.join(&request.path) else {
            return Response::message(400, "malformed path");
        };
        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let result = match segments.as_slice() {
            ["api", "files"] => self.files_collection(request.method, request.body),
            ["api", "files", raw_id] => match raw_id.parse::<u64>() {
                Ok(id) => self.file_item(request.method, FileId(id), request.body),
                Err(_) => Ok(Response::message(400, "invalid file id")),
            },
            ["api", "settings"] => self.settings_resource(request.method, request.body),
            _ => Ok(Response::message(404, "no such resource")),
        };
        result.unwrap_or_else(|err| {
            log::error!("store {} {} failed: {err}", request.method, request.path);
            Response::message(500, &err.to_string())
        })
    }

    fn files_collection(&mut self, method: Method, body: Option<Value>) -> StoreResult<Response> {
        match method {
            Method::Get => Ok(Response::json(200, &self.storage.list_files()?)),
            Method::Post => {
                let new: NewFile = match parse_body(body) {
                    Ok(new) => new,
                    Err(resp) => return Ok(resp),
                };
                if let Err(msg) = new.validate() {
                    return Ok(Response::message(400, &msg));
                }
                let file = self.storage.create_file(new)?;
                log::info!("store created file {} ({})", file.id, file.name);
                Ok(Response::json(201, &file))
            }
            _ => Ok(Response::message(405, "method not allowed")),
        }
    }

    fn file_item(
        &mut self,
        method: Method,
        id: FileId,
        body: Option<Value>,
    ) -> StoreResult<Response> {
        match method {
            Method::Get => Ok(match self.storage.get_file(id)? {
                Some(file) => Response::json(200, &file),
                None => Response::message(404, "file not found"),
            }),
            Method::Patch => {
                let patch: FilePatch = match parse_body(body) {
                    Ok(patch) => patch,
                    Err(resp) => return Ok(resp),
                };
                Ok(match self.storage.update_file(id, patch.content)? {
                    Some(file) => Response::json(200, &file),
                    None => Response::message(404, "file not found"),
                })
            }
            Method::Delete => Ok(if self.storage.delete_file(id)? {
                Response::empty(204)
            } else {
                Response::message(404, "file not found")
            }),
            _ => Ok(Response::message(405, "method not allowed")),
        }
    }

    fn settings_resource(&mut self, method: Method, body: Option<Value>) -> StoreResult<Response> {
        match method {
            Method::Get => Ok(Response::json(200, &self.storage.settings()?)),
            Method::Put => {
                let settings: EditorSettings = match parse_body(body) {
                    Ok(settings) => settings,
                    Err(resp) => return Ok(resp),
                };
                Ok(Response::json(200, &self.storage.update_settings(settings)?))
            }
            _ => Ok(Response::message(405, "method not allowed")),
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: Option<Value>) -> Result<T, Response> {
    let Some(body) = body else {
        return Err(Response::message(400, "missing body"));
    };
    serde_json::from_value(body).map_err(|e| Response::message(400, &e.to_string()))
}

/// In-process transport: requests go straight to a [`Router`].
pub struct LocalTransport {
    router: Router,
}

impl LocalTransport {
    pub fn new(storage: Box<dyn Storage>) -> StoreResult<Self> {
        Ok(Self {
            router: Router::new(storage)?,
        })
    }
}

impl Transport for LocalTransport {
    fn send(&mut self, request: Request) -> StoreResult<Response> {
        Ok(self.router.handle(request))
    }
}

pub struct ApiClient<T: Transport> {
    transport: T,
    base: Url,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> StoreResult<Self> {
        let base = Url::parse(STORE_ORIGIN).map_err(|e| StoreError::Invalid(e.to_string()))?;
        Ok(Self { transport, base })
    }

    fn path(&self, relative: &str) -> StoreResult<String> {
        self.base
            .join(relative)
            .map(|url| url.path().to_string())
            .map_err(|e| StoreError::Invalid(e.to_string()))
    }

    fn call(&mut self, method: Method, relative: &str, body: Option<Value>) -> StoreResult<Response> {
        let mut request = Request::new(method, self.path(relative)?);
        request.body = body;
        log::debug!("store request {} {}", request.method, request.path);
        let response = self.transport.send(request)?;
        if response.is_success() {
            Ok(response)
        } else if response.status == 404 {
            Err(StoreError::NotFound)
        } else {
            Err(StoreError::Status(response.status))
        }
    }

    fn call_json<R: DeserializeOwned>(
        &mut self,
        method: Method,
        relative: &str,
        body: Option<Value>,
    ) -> StoreResult<R> {
        let response = self.call(method, relative, body)?;
        Ok(serde_json::from_value(response.body.unwrap_or(Value::Null))?)
    }
}

impl<T: Transport> StoreClient for ApiClient<T> {
    fn list_files(&mut self) -> StoreResult<Vec<FileEntity>> {
        self.call_json(Method::Get, "api/files", None)
    }

    fn read_file(&mut self, id: FileId) -> StoreResult<FileEntity> {
        self.call_json(Method::Get, &format!("api/files/{id}"), None)
    }

    fn create_file(&mut self, new: &NewFile) -> StoreResult<FileEntity> {
        let body = serde_json::to_value(new)?;
        self.call_json(Method::Post, "api/files", Some(body))
    }

    fn update_file(&mut self, id: FileId, patch: &FilePatch) -> StoreResult<FileEntity> {
        let body = serde_json::to_value(patch)?;
        self.call_json(Method::Patch, &format!("api/files/{id}"), Some(body))
    }

    fn delete_file(&mut self, id: FileId) -> StoreResult<()> {
        self.call(Method::Delete, &format!("api/files/{id}"), None)
            .map(|_| ())
    }

    fn read_settings(&mut self) -> StoreResult<EditorSettings> {
        self.call_json(Method::Get, "api/settings", None)
    }

    fn replace_settings(&mut self, settings: &EditorSettings) -> StoreResult<EditorSettings> {
        let body = serde_json::to_value(settings)?;
        self.call_json(Method::Put, "api/settings", Some(body))
    }
}

/// Client wired to an in-process router over `storage`.
pub fn local_client(storage: Box<dyn Storage>) -> StoreResult<ApiClient<LocalTransport>> {
    ApiClient::new(LocalTransport::new(storage)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageMode;
    use crate::store::MemStorage;

    fn router() -> Router {
        Router::new(Box::new(MemStorage::with_samples())).expect("router")
    }

    fn client() -> ApiClient<LocalTransport> {
        local_client(Box::new(MemStorage::with_samples())).expect("client")
    }

    #[test]
    fn router_lists_files() {
        let resp = router().handle(Request::new(Method::Get, "/api/files"));
        assert_eq!(resp.status, 200);
        let body = resp.body.expect("body");
        assert_eq!(body.as_array().map(Vec::len), Some(3));
        assert_eq!(body[0]["name"], "index.js");
    }

    #[test]
    fn router_rejects_bad_bodies_and_paths() {
        let mut router = router();
        let missing = router.handle(Request::new(Method::Post, "/api/files"));
        assert_eq!(missing.status, 400);
        let bogus = router
            .handle(Request::new(Method::Post, "/api/files").with_body(json!({ "name": 1 })));
        assert_eq!(bogus.status, 400);
        let blank = router.handle(
            Request::new(Method::Post, "/api/files").with_body(json!({ "name": "", "path": "/" })),
        );
        assert_eq!(blank.status, 400);
        let bad_id = router.handle(Request::new(Method::Get, "/api/files/abc"));
        assert_eq!(bad_id.status, 400);
        let unknown = router.handle(Request::new(Method::Get, "/api/nothing"));
        assert_eq!(unknown.status, 404);
        let wrong_method = router.handle(Request::new(Method::Put, "/api/files"));
        assert_eq!(wrong_method.status, 405);
    }

    #[test]
    fn router_tolerates_trailing_slash() {
        let resp = router().handle(Request::new(Method::Get, "/api/files/1/"));
        assert_eq!(resp.status, 200);
    }

    #[test]
    fn router_rejects_out_of_domain_settings() {
        let resp = router().handle(
            Request::new(Method::Put, "/api/settings").with_body(json!({ "fontSize": 15 })),
        );
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn client_create_update_delete() {
        let mut client = client();
        let created = client
            .create_file(&NewFile {
                name: "q.sql".into(),
                content: None,
                language: Some(LanguageMode::Sql),
                path: "/q.sql".into(),
            })
            .expect("create");
        assert_eq!(created.id, FileId(4));
        assert_eq!(created.content, "");
        let updated = client
            .update_file(created.id, &FilePatch { content: "select 1;".into() })
            .expect("update");
        assert_eq!(updated.content, "select 1;");
        assert_eq!(client.read_file(created.id).expect("read").content, "select 1;");
        client.delete_file(created.id).expect("delete");
        assert!(matches!(client.read_file(created.id), Err(StoreError::NotFound)));
        assert!(matches!(client.delete_file(created.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn client_settings_round_trip() {
        let mut client = client();
        let mut settings = client.read_settings().expect("read");
        assert!(settings.emacs_mode);
        settings.emacs_mode = false;
        let stored = client.replace_settings(&settings).expect("replace");
        assert!(!stored.emacs_mode);
        assert!(!client.read_settings().expect("read").emacs_mode);
    }

    struct Failing;

    impl Transport for Failing {
        fn send(&mut self, _request: Request) -> StoreResult<Response> {
            Ok(Response::empty(503))
        }
    }

    #[test]
    fn non_success_status_is_generic_failure() {
        let mut client = ApiClient::new(Failing).expect("client");
        assert!(matches!(client.list_files(), Err(StoreError::Status(503))));
    }
}
