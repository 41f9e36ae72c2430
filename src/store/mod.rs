//! File and settings persistence.
//!
//! Two layers live here. [`Storage`] is a backing implementation (in-memory or
//! a JSON file) that the request router in [`api`] serves. [`StoreClient`] is
//! the capability the editor depends on; it only maps operations to
//! request/response pairs and knows nothing about which backing answers them.

pub(crate) mod api;
pub(crate) mod json;
pub(crate) mod memory;
pub(crate) mod worker;

use crate::error::StoreResult;
use crate::file::{FileEntity, FileId, FilePatch, NewFile};
use crate::settings::EditorSettings;

pub use api::{
    ApiClient, LocalTransport, Method, Request, Response, Router, Transport, local_client,
};
pub use json::JsonStorage;
pub use memory::MemStorage;
pub use worker::{StoreReply, StoreRequest, StoreWorker};

pub trait Storage: Send {
    fn list_files(&mut self) -> StoreResult<Vec<FileEntity>>;
    fn get_file(&mut self, id: FileId) -> StoreResult<Option<FileEntity>>;
    fn get_file_by_path(&mut self, path: &str) -> StoreResult<Option<FileEntity>>;
    fn create_file(&mut self, new: NewFile) -> StoreResult<FileEntity>;
    fn update_file(&mut self, id: FileId, content: String) -> StoreResult<Option<FileEntity>>;
    fn delete_file(&mut self, id: FileId) -> StoreResult<bool>;
    fn settings(&mut self) -> StoreResult<EditorSettings>;
    fn update_settings(&mut self, settings: EditorSettings) -> StoreResult<EditorSettings>;
}

pub trait StoreClient: Send {
    fn list_files(&mut self) -> StoreResult<Vec<FileEntity>>;
    fn read_file(&mut self, id: FileId) -> StoreResult<FileEntity>;
    fn create_file(&mut self, new: &NewFile) -> StoreResult<FileEntity>;
    fn update_file(&mut self, id: FileId, patch: &FilePatch) -> StoreResult<FileEntity>;
    fn delete_file(&mut self, id: FileId) -> StoreResult<()>;
    fn read_settings(&mut self) -> StoreResult<EditorSettings>;
    fn replace_settings(&mut self, settings: &EditorSettings) -> StoreResult<EditorSettings>;
}
