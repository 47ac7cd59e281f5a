use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};

use super::traits::{Method, Transport, UNSET_TIMESTAMP, WireRequest, WireResponse};

/// Correlates one issued request with the result later delivered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    #[cfg(test)]
    pub(crate) fn test(value: u64) -> Self {
        Self(value)
    }
}

enum GatewayRequest {
    Dispatch { id: RequestId, request: WireRequest },
    Shutdown,
}

#[derive(Debug)]
pub struct GatewayResult {
    pub id: RequestId,
    pub result: AppResult<WireResponse>,
    pub elapsed: Duration,
}

#[derive(Debug)]
struct InFlightRequest {
    url: String,
}

struct GatewayRuntime {
    _owned: Option<Runtime>,
    handle: Handle,
}

impl GatewayRuntime {
    fn new() -> Self {
        if let Ok(handle) = Handle::try_current() {
            return Self {
                _owned: None,
                handle,
            };
        }

        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("molt-gateway")
            .build()
            .expect("gateway runtime should initialize");
        let handle = runtime.handle().clone();
        Self {
            _owned: Some(runtime),
            handle,
        }
    }

    fn spawn_blocking<F>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn_blocking(task)
    }
}

/// Uniform wrapper over outbound asynchronous HTTP calls.
///
/// Requests are executed on a blocking worker pool over a shared
/// [`Transport`]; each issued request produces exactly one [`GatewayResult`]
/// on the result channel, success or failure, never both. There are no
/// retries and no cancellation: a transient network failure is surfaced to
/// the caller, not masked.
pub struct RequestGateway {
    base_url: url::Url,
    request_tx: UnboundedSender<GatewayRequest>,
    result_rx: UnboundedReceiver<GatewayResult>,
    in_flight: HashMap<RequestId, InFlightRequest>,
    _runtime: GatewayRuntime,
    workers: Vec<JoinHandle<()>>,
    worker_threads: usize,
    next_request_id: u64,
}

impl RequestGateway {
    pub fn spawn(
        base_url: &str,
        worker_threads: usize,
        transport: Arc<dyn Transport>,
    ) -> AppResult<Self> {
        let base_url = url::Url::parse(base_url)
            .map_err(|source| AppError::invalid_argument(format!("invalid base URL: {source}")))?;
        let (request_tx, request_rx) = unbounded_channel();
        let (result_tx, result_rx) = unbounded_channel();
        let runtime = GatewayRuntime::new();
        let worker_threads = worker_threads.max(1);
        let request_rx = Arc::new(Mutex::new(request_rx));
        let mut workers = Vec::with_capacity(worker_threads);
        for _ in 0..worker_threads {
            let request_rx = Arc::clone(&request_rx);
            let transport = Arc::clone(&transport);
            let result_tx = result_tx.clone();
            let worker =
                runtime.spawn_blocking(move || gateway_worker_main(request_rx, transport, result_tx));
            workers.push(worker);
        }

        Ok(Self {
            base_url,
            request_tx,
            result_rx,
            in_flight: HashMap::new(),
            _runtime: runtime,
            workers,
            worker_threads,
            next_request_id: 1,
        })
    }

    /// POST of serialized form fields to the form's declared action URL, or
    /// to the current path (slash-normalized) when the form declares none.
    pub fn submit_form(
        &mut self,
        action_url: Option<&str>,
        current_path: &str,
        fields: Vec<(String, String)>,
    ) -> AppResult<RequestId> {
        let target = match action_url {
            Some(action) => action.to_string(),
            None => {
                let mut path = current_path.to_string();
                if !path.ends_with('/') {
                    path.push('/');
                }
                path
            }
        };
        let url = self.absolute(&target)?;
        self.dispatch(WireRequest {
            method: Method::Post,
            url,
            params: fields,
        })
    }

    /// GET carrying the marker parameter that asks the server for fragment
    /// output instead of a full document.
    pub fn fetch_fragment(&mut self, url: &str) -> AppResult<RequestId> {
        let url = self.absolute(url)?;
        self.dispatch(WireRequest {
            method: Method::Get,
            url,
            params: vec![("ajax_json".to_string(), "true".to_string())],
        })
    }

    /// Parameterized GET against a resource-name-keyed endpoint. Parameters
    /// valued with the unset-timestamp sentinel are rewritten to the
    /// supplied page-scoped last-refresh marker before transmission.
    pub fn fetch_named_resource(
        &mut self,
        name: &str,
        mut params: Vec<(String, String)>,
        last_refresh: Option<&str>,
    ) -> AppResult<RequestId> {
        if let Some(marker) = last_refresh {
            for (_, value) in &mut params {
                if value == UNSET_TIMESTAMP {
                    *value = marker.to_string();
                }
            }
        }
        let url = self.absolute(&format!("/ajax_request/{name}"))?;
        self.dispatch(WireRequest {
            method: Method::Get,
            url,
            params,
        })
    }

    pub fn owns(&self, id: RequestId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn in_flight_url(&self, id: RequestId) -> Option<&str> {
        self.in_flight.get(&id).map(|entry| entry.url.as_str())
    }

    pub async fn recv_result(&mut self) -> Option<GatewayResult> {
        while let Some(event) = self.result_rx.recv().await {
            if let Some(result) = self.accept_result(event) {
                return Some(result);
            }
        }
        None
    }

    /// At-most-once delivery: results for ids no longer tracked are dropped.
    fn accept_result(&mut self, event: GatewayResult) -> Option<GatewayResult> {
        self.in_flight.remove(&event.id)?;
        Some(event)
    }

    fn dispatch(&mut self, request: WireRequest) -> AppResult<RequestId> {
        let id = RequestId(self.next_request_id);
        self.next_request_id = self.next_request_id.saturating_add(1);
        let url = request.url.clone();
        self.request_tx
            .send(GatewayRequest::Dispatch { id, request })
            .map_err(|_| AppError::unsupported("gateway workers have shut down"))?;
        self.in_flight.insert(id, InFlightRequest { url });
        Ok(id)
    }

    fn absolute(&self, url: &str) -> AppResult<String> {
        // Relative and absolute URLs are treated identically.
        let joined = self
            .base_url
            .join(url)
            .map_err(|source| AppError::invalid_argument(format!("invalid URL {url:?}: {source}")))?;
        Ok(joined.to_string())
    }

    fn shutdown(&mut self) {
        for _ in 0..self.worker_threads {
            let _ = self.request_tx.send(GatewayRequest::Shutdown);
        }
        while let Some(worker) = self.workers.pop() {
            worker.abort();
        }
    }
}

impl Drop for RequestGateway {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn gateway_worker_main(
    request_rx: Arc<Mutex<UnboundedReceiver<GatewayRequest>>>,
    transport: Arc<dyn Transport>,
    result_tx: UnboundedSender<GatewayResult>,
) {
    loop {
        let request = match request_rx.lock() {
            Ok(mut request_rx) => request_rx.blocking_recv(),
            Err(_) => None,
        };
        let request = match request {
            Some(request) => request,
            None => break,
        };

        match request {
            GatewayRequest::Dispatch { id, request } => {
                let started = Instant::now();
                let result = transport.execute(&request).and_then(|response| {
                    if response.is_success() {
                        Ok(response)
                    } else {
                        Err(AppError::status(response.status, request.url.clone()))
                    }
                });
                if let Err(err) = &result {
                    log::warn!("request {} to {} failed: {err}", id.0, request.url);
                }

                let event = GatewayResult {
                    id,
                    result,
                    elapsed: started.elapsed(),
                };
                let _ = result_tx.send(event);
            }
            GatewayRequest::Shutdown => break,
        }
    }
}
