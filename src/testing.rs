//! In-memory fakes for the network seams, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::api::{GenerateText, GenerationError, GenerationRequest};
use crate::http::{FetchError, PageFetcher};

/// [`PageFetcher`] answering from per-URL queues of scripted responses.
///
/// `Err(status)` entries become [`FetchError::Status`]. A URL whose queue is
/// empty (or was never scripted) fails with a transport error.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, VecDeque<Result<String, u16>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, response: Result<&str, u16>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response.map(str::to_string));
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front());
        match next {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
            None => Err(FetchError::Transport {
                url: url.to_string(),
                message: "no scripted response".to_string(),
            }),
        }
    }
}

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync>;

/// [`GenerateText`] backed by a closure; records every request it sees.
pub struct ScriptedModel {
    responder: Responder,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    pub fn new<R>(responder: R) -> Self
    where
        R: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl GenerateText for ScriptedModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}
