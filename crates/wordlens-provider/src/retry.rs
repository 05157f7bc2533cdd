use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::http::{HttpError, HttpRequest, HttpResponse, HttpStream, HttpTransport};

/// When and how often a provider call is repeated
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub backoff: Duration,
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration, retry_statuses: Vec<u16>) -> Self {
        Self {
            max_retries,
            backoff,
            retry_statuses,
        }
    }

    /// Single attempt
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, vec![])
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(200), vec![429, 502, 503, 504])
    }
}

/// HTTP client bound to one external provider.
///
/// Carries the provider's base URL and auth (default query parameters or
/// headers), a hard per-attempt timeout and the shared retry policy. Each
/// provider gets its own instance so a slow one cannot starve the rest.
#[derive(Clone)]
pub struct RetryingHttpClient {
    name: String,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    timeout: Duration,
    default_query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl RetryingHttpClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            transport,
            policy: RetryPolicy::default(),
            timeout: Duration::from_secs(10),
            default_query: vec![],
            headers: vec![],
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sent with every request, e.g. an API key parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_query.push((name.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `base_url/path`. A non-2xx status that survives the retries is
    /// returned as a response, not as an error.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpResponse, HttpError> {
        let request = self.request(self.join(path), params);
        self.execute(request).await
    }

    /// GET an absolute URL (e.g. an image the provider pointed at) with this
    /// provider's headers, timeout and retries
    pub async fn get_url(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest {
            url: url.to_string(),
            query: vec![],
            headers: self.headers.clone(),
            timeout: self.timeout,
        };
        self.execute(request).await
    }

    /// Single attempt; the timeout covers getting the response head
    pub async fn get_stream(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpStream, HttpError> {
        let request = self.request(self.join(path), params);
        tracing::debug!("[{}] -> STREAM {}", self.name, request.display_url());

        match tokio::time::timeout(self.timeout, self.transport.stream(&request)).await {
            Ok(result) => result,
            Err(_) => Err(HttpError::Timeout(self.timeout)),
        }
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut attempt = 0;

        loop {
            let started = Instant::now();
            tracing::debug!("[{}] -> GET {}", self.name, request.display_url());

            let outcome = match tokio::time::timeout(self.timeout, self.transport.send(&request)).await {
                Ok(result) => result,
                Err(_) => Err(HttpError::Timeout(self.timeout)),
            };

            let retries_left = attempt < self.policy.max_retries;
            match &outcome {
                Ok(response) => {
                    tracing::debug!(
                        "[{}] <- {} (took {:.3}s)",
                        self.name,
                        response.status,
                        started.elapsed().as_secs_f64()
                    );
                    if !(retries_left && self.policy.should_retry_status(response.status)) {
                        return outcome;
                    }
                }
                Err(e) => {
                    tracing::debug!("[{}] <- error: {}", self.name, e);
                    if !(retries_left && e.is_transient()) {
                        return outcome;
                    }
                }
            }

            let delay = self.policy.backoff_for(attempt);
            attempt += 1;
            tracing::debug!(
                "[{}] retry {}/{} in {:?}",
                self.name,
                attempt,
                self.policy.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn join(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, url: String, params: &[(&str, &str)]) -> HttpRequest {
        let mut query = self.default_query.clone();
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        HttpRequest {
            url,
            query,
            headers: self.headers.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays a fixed script of outcomes and counts calls
    struct Scripted {
        script: Mutex<VecDeque<Result<u16, ()>>>,
        fallback: u16,
        calls: Mutex<Vec<HttpRequest>>,
        delay: Duration,
    }

    impl Scripted {
        fn new(script: Vec<Result<u16, ()>>, fallback: u16) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: Mutex::new(vec![]),
                delay: Duration::ZERO,
            })
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for Scripted {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
            self.calls.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(self.fallback));
            match next {
                Ok(status) => Ok(HttpResponse { status, body: b"{}".to_vec() }),
                Err(()) => Err(HttpError::Connection("refused".into())),
            }
        }

        async fn stream(&self, _request: &HttpRequest) -> Result<HttpStream, HttpError> {
            Err(HttpError::Connection("not scripted".into()))
        }
    }

    fn client(transport: Arc<Scripted>, max_retries: u32) -> RetryingHttpClient {
        RetryingHttpClient::new("test", "http://provider.test/api/", transport)
            .with_policy(RetryPolicy::new(max_retries, Duration::ZERO, vec![429, 502, 503, 504]))
            .with_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn retry_exhaustion_makes_max_retries_plus_one_calls() {
        let transport = Scripted::new(vec![], 503);
        let response = client(transport.clone(), 2).get("", &[]).await.unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_status() {
        let transport = Scripted::new(vec![Ok(502), Ok(429)], 200);
        let response = client(transport.clone(), 2).get("", &[]).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn permanent_status_is_not_retried() {
        let transport = Scripted::new(vec![Ok(404)], 200);
        let response = client(transport.clone(), 2).get("", &[]).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn connection_errors_are_retried_then_returned() {
        let transport = Scripted::new(vec![Err(()), Err(()), Err(())], 200);
        let result = client(transport.clone(), 2).get("", &[]).await;

        assert!(matches!(result, Err(HttpError::Connection(_))));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn hung_provider_times_out() {
        let transport = Arc::new(Scripted {
            script: Mutex::new(VecDeque::new()),
            fallback: 200,
            calls: Mutex::new(vec![]),
            delay: Duration::from_secs(5),
        });
        let client = RetryingHttpClient::new("slow", "http://slow.test", transport.clone())
            .with_policy(RetryPolicy::new(1, Duration::ZERO, vec![]))
            .with_timeout(Duration::from_millis(20));

        let started = Instant::now();
        let result = client.get("", &[]).await;

        assert!(matches!(result, Err(HttpError::Timeout(_))));
        assert_eq!(transport.calls(), 2);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn default_query_and_path_are_joined() {
        let transport = Scripted::new(vec![], 200);
        let client = client(transport.clone(), 0).with_query("key", "secret");

        client.get("/entries/en/cat", &[("lang", "en-ru")]).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].url, "http://provider.test/api/entries/en/cat");
        assert_eq!(
            calls[0].query,
            vec![
                ("key".to_string(), "secret".to_string()),
                ("lang".to_string(), "en-ru".to_string())
            ]
        );
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(800));
    }
}
