use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::ApiKey;

use super::{BoxFuture, GatewayClient, HttpFailure, HttpResponse, HttpTransport};

pub(crate) const FAKE_ENDPOINT: &str = "https://example.invalid/dev/bulkV2";
pub(crate) const FAKE_API_KEY: &str = "test_key";

/// Recording transport: answers from a script first, then with a fixed response.
#[derive(Debug, Clone)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

#[derive(Debug)]
struct FakeTransportState {
    calls: Vec<RecordedCall>,
    scripted: VecDeque<Result<HttpResponse, HttpFailure>>,
    response_status: u16,
    response_body: String,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub url: String,
    pub authorization: String,
    pub body: serde_json::Value,
}

impl FakeTransport {
    pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                calls: Vec::new(),
                scripted: VecDeque::new(),
                response_status,
                response_body: response_body.into(),
            })),
        }
    }

    /// Client with a 15 second timeout talking to this transport.
    pub(crate) fn client(&self) -> GatewayClient {
        GatewayClient {
            api_key: ApiKey::new(FAKE_API_KEY).unwrap(),
            endpoint: FAKE_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(15),
            http: Arc::new(self.clone()),
        }
    }

    /// The first call fails with `failure`.
    pub(super) fn failing(failure: HttpFailure) -> Self {
        let transport = Self::new(0, "");
        transport.push_failure(failure);
        transport
    }

    pub(crate) fn push_response(&self, status: u16, body: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.scripted.push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    pub(super) fn push_failure(&self, failure: HttpFailure) {
        let mut state = self.state.lock().unwrap();
        state.scripted.push_back(Err(failure));
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }
}

impl HttpTransport for FakeTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        authorization: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, HttpFailure>> {
        let result = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(RecordedCall {
                url: url.to_owned(),
                authorization: authorization.to_owned(),
                body,
            });
            match state.scripted.pop_front() {
                Some(next) => next,
                None => Ok(HttpResponse {
                    status: state.response_status,
                    body: state.response_body.clone(),
                }),
            }
        };
        Box::pin(async move { result })
    }
}
