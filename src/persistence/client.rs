//! Background score client
//!
//! Each request runs on its own short-lived thread. Successful replies come
//! back over a channel; failures are logged and dropped, never retried.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use super::{ScoreService, ScoreSink, ServerReply, SubmitBody};

pub struct BackgroundClient<S: ScoreService + 'static> {
    service: Arc<S>,
    tx: Sender<ServerReply>,
    rx: Receiver<ServerReply>,
}

impl<S: ScoreService + 'static> BackgroundClient<S> {
    pub fn new(service: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service: Arc::new(service),
            tx,
            rx,
        }
    }

    fn spawn<F>(&self, name: &str, job: F)
    where
        F: FnOnce(&S) -> Option<ServerReply> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("score-{name}"))
            .spawn(move || {
                if let Some(reply) = job(service.as_ref()) {
                    // The session may be gone by now; nobody to tell
                    let _ = tx.send(reply);
                }
            });
        if let Err(e) = spawned {
            log::warn!("Could not start score request thread: {e}");
        }
    }
}

impl<S: ScoreService + 'static> ScoreSink for BackgroundClient<S> {
    fn request_best(&mut self) {
        self.spawn("best", |service| match service.fetch_best() {
            Ok(best) => Some(ServerReply::Best(best)),
            Err(e) => {
                log::info!("Server offline - playing local mode ({e})");
                None
            }
        });
    }

    fn submit(&mut self, body: SubmitBody) {
        self.spawn("submit", move |service| match service.submit(&body) {
            Ok(reply) => Some(ServerReply::Submitted(reply)),
            Err(e) => {
                log::warn!("Server offline - cannot save score ({e})");
                None
            }
        });
    }

    fn poll(&mut self) -> Vec<ServerReply> {
        self.rx.try_iter().collect()
    }
}
