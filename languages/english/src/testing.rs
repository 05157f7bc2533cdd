use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use wordlens_provider::{
    HttpError, HttpRequest, HttpResponse, HttpStream, HttpTransport, RetryPolicy,
    RetryingHttpClient,
};

/// Answers requests from a queue of canned `(status, body)` pairs and records them
#[derive(Default)]
pub(crate) struct Canned {
    responses: Mutex<VecDeque<(u16, Vec<u8>)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Canned {
    pub(crate) fn new(responses: Vec<(u16, &str)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (status, body.as_bytes().to_vec()))
                    .collect(),
            ),
            requests: Mutex::new(vec![]),
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &HttpRequest) -> Result<(u16, Vec<u8>), HttpError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HttpError::Connection("no canned response".into()))
    }
}

#[async_trait::async_trait]
impl HttpTransport for Canned {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let (status, body) = self.next(request)?;
        Ok(HttpResponse { status, body })
    }

    async fn stream(&self, request: &HttpRequest) -> Result<HttpStream, HttpError> {
        let (status, body) = self.next(request)?;
        let chunks: Vec<Result<Vec<u8>, HttpError>> =
            body.chunks(4).map(|c| Ok(c.to_vec())).collect();
        Ok(HttpStream {
            status,
            body: futures_util::stream::iter(chunks).boxed(),
        })
    }
}

pub(crate) fn client(name: &str, base_url: &str, transport: Arc<Canned>) -> RetryingHttpClient {
    RetryingHttpClient::new(name, base_url, transport).with_policy(RetryPolicy::none())
}
