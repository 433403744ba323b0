use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use restockd::domain::ProductSnapshot;
use restockd::error::SourceError;
use restockd::port::SnapshotSource;

/// One scripted response from the fake snapshot source.
#[derive(Clone)]
enum Scripted {
    Snapshot(ProductSnapshot),
    FetchError,
    ParseError,
}

/// Snapshot source replaying a scripted sequence of responses.
///
/// Queued responses are consumed in order; once the queue runs dry the last
/// consumed response replays for every further fetch, so scheduler loops of
/// unknown length stay scripted.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<Script>,
    fetches: AtomicUsize,
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Scripted>,
    last: Option<Scripted>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_snapshot(&self, snapshot: ProductSnapshot) {
        self.push(Scripted::Snapshot(snapshot));
    }

    /// Queue a transport failure (a 503 from the shop).
    pub fn push_fetch_error(&self) {
        self.push(Scripted::FetchError);
    }

    /// Queue an undecodable payload.
    pub fn push_parse_error(&self) {
        self.push(Scripted::ParseError);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn push(&self, response: Scripted) {
        self.responses
            .lock()
            .expect("lock scripted responses")
            .queue
            .push_back(response);
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<ProductSnapshot, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let response = {
            let mut script = self.responses.lock().expect("lock scripted responses");
            match script.queue.pop_front() {
                Some(response) => {
                    script.last = Some(response.clone());
                    response
                }
                None => script
                    .last
                    .clone()
                    .unwrap_or_else(|| panic!("unscripted fetch of {url}")),
            }
        };

        match response {
            Scripted::Snapshot(snapshot) => Ok(snapshot),
            Scripted::FetchError => Err(SourceError::Status {
                status: 503,
                url: url.to_string(),
            }),
            Scripted::ParseError => Err(SourceError::Parse("unexpected markup".into())),
        }
    }
}
