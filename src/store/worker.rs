use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use super::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::file::{FileEntity, FileId, NewFile};
use crate::session::SaveTicket;
use crate::settings::EditorSettings;

#[derive(Debug)]
pub enum StoreRequest {
    ListFiles,
    CreateFile(NewFile),
    SaveFile(SaveTicket),
    DeleteFile(FileId),
    LoadSettings,
    SaveSettings(EditorSettings),
}

/// Completion of a [`StoreRequest`], delivered in request order.
#[derive(Debug)]
pub enum StoreReply {
    Files(StoreResult<Vec<FileEntity>>),
    Created(StoreResult<FileEntity>),
    Saved(SaveTicket, StoreResult<FileEntity>),
    Deleted(FileId, StoreResult<()>),
    Settings(StoreResult<EditorSettings>),
    SettingsSaved(StoreResult<EditorSettings>),
}

/// Background thread that owns the store client and answers requests one at
/// a time.
pub struct StoreWorker {
    tx: Option<Sender<StoreRequest>>,
    rx: Receiver<StoreReply>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWorker {
    pub fn spawn(client: Box<dyn StoreClient>) -> io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<StoreRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<StoreReply>();
        let handle = thread::Builder::new()
            .name("mxedit-store".into())
            .spawn(move || worker_loop(client, req_rx, reply_tx))?;
        Ok(Self {
            tx: Some(req_tx),
            rx: reply_rx,
            handle: Some(handle),
        })
    }

    pub fn send(&self, request: StoreRequest) -> StoreResult<()> {
        let tx = self.tx.as_ref().ok_or(StoreError::Disconnected)?;
        tx.send(request).map_err(|_| StoreError::Disconnected)
    }

    /// All replies that have arrived since the last call.
    pub fn poll(&self) -> Vec<StoreReply> {
        let mut replies = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(reply) => replies.push(reply),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        replies
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<StoreReply> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the loop.
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("store worker panicked");
        }
    }
}

fn worker_loop(
    mut client: Box<dyn StoreClient>,
    requests: Receiver<StoreRequest>,
    replies: Sender<StoreReply>,
) {
    while let Ok(request) = requests.recv() {
        let reply = match request {
            StoreRequest::ListFiles => StoreReply::Files(client.list_files()),
            StoreRequest::CreateFile(new) => StoreReply::Created(client.create_file(&new)),
            StoreRequest::SaveFile(ticket) => {
                let result = client.update_file(ticket.id, &ticket.patch());
                StoreReply::Saved(ticket, result)
            }
            StoreRequest::DeleteFile(id) => StoreReply::Deleted(id, client.delete_file(id)),
            StoreRequest::LoadSettings => StoreReply::Settings(client.read_settings()),
            StoreRequest::SaveSettings(settings) => {
                StoreReply::SettingsSaved(client.replace_settings(&settings))
            }
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    log::debug!("store worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemStorage, local_client};
    use std::time::Duration;

    fn worker() -> StoreWorker {
        let client = local_client(Box::new(MemStorage::with_samples())).expect("client");
        StoreWorker::spawn(Box::new(client)).expect("spawn")
    }

    fn next(worker: &StoreWorker) -> StoreReply {
        worker
            .recv_timeout(Duration::from_secs(5))
            .expect("reply within timeout")
    }

    #[test]
    fn replies_arrive_in_request_order() {
        let worker = worker();
        worker.send(StoreRequest::ListFiles).expect("send");
        worker
            .send(StoreRequest::SaveFile(SaveTicket {
                id: FileId(1),
                content: "saved".into(),
                revision: 3,
            }))
            .expect("send");
        worker.send(StoreRequest::ListFiles).expect("send");

        match next(&worker) {
            StoreReply::Files(Ok(files)) => assert!(!files[0].content.contains("saved")),
            other => panic!("unexpected {other:?}"),
        }
        match next(&worker) {
            StoreReply::Saved(ticket, Ok(file)) => {
                assert_eq!(ticket.revision, 3);
                assert_eq!(file.content, "saved");
            }
            other => panic!("unexpected {other:?}"),
        }
        match next(&worker) {
            StoreReply::Files(Ok(files)) => assert_eq!(files[0].content, "saved"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failures_come_back_as_results() {
        let worker = worker();
        worker.send(StoreRequest::DeleteFile(FileId(99))).expect("send");
        match next(&worker) {
            StoreReply::Deleted(id, Err(StoreError::NotFound)) => assert_eq!(id, FileId(99)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn settings_round_trip() {
        let worker = worker();
        let mut settings = EditorSettings::default();
        settings.emacs_mode = false;
        worker.send(StoreRequest::SaveSettings(settings)).expect("send");
        worker.send(StoreRequest::LoadSettings).expect("send");
        assert!(matches!(next(&worker), StoreReply::SettingsSaved(Ok(_))));
        match next(&worker) {
            StoreReply::Settings(Ok(loaded)) => assert!(!loaded.emacs_mode),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn poll_is_non_blocking() {
        let worker = worker();
        assert!(worker.poll().is_empty());
        worker
            .send(StoreRequest::CreateFile(NewFile {
                name: "n.py".into(),
                content: None,
                language: None,
                path: "/n.py".into(),
            }))
            .expect("send");
        let reply = next(&worker);
        assert!(matches!(reply, StoreReply::Created(Ok(ref f)) if f.name == "n.py"));
    }
}
