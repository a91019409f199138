//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses or errors for testing purposes, including one-shot response
//! sequences (a 401 followed by a 200 for replay tests) and per-URL
//! response delays (to hold a renewal round open while concurrent callers
//! pile up).

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<Bytes>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a completed response
    Success(Response),
    /// Return a transport error
    Error(HttpError),
}

/// Mock HTTP client for testing.
///
/// This client can be configured to return specific responses for URLs,
/// allowing tests to verify HTTP interactions without network access.
///
/// # Example
///
/// ```ignore
/// use dropline::adapters::mock::{MockHttpClient, MockResponse};
/// use dropline::traits::{Headers, HttpClient, Response};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
///
/// // Configure a response
/// client.set_response(
///     "https://api.example.com/data",
///     MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
/// );
///
/// // Make a request
/// let response = client.get("https://api.example.com/data", &Headers::new()).await?;
/// assert_eq!(response.status, 200);
///
/// // Verify the request was made
/// let requests = client.get_requests();
/// assert_eq!(requests.len(), 1);
/// assert_eq!(requests[0].url, "https://api.example.com/data");
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// One-shot response queues, consumed before `responses` is consulted
    sequences: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Artificial delay before answering, by URL pattern
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            sequences: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a specific URL.
    ///
    /// The URL is matched exactly first, then as a prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Queue a sequence of one-shot responses for a URL.
    ///
    /// Each request consumes the front of the queue; once the queue is
    /// empty, lookups fall back to [`set_response`](Self::set_response)
    /// entries and then the default.
    pub fn set_response_sequence(&self, url: &str, sequence: Vec<MockResponse>) {
        let mut sequences = self.sequences.lock().unwrap();
        sequences.insert(url.to_string(), sequence.into());
    }

    /// Delay every answer for a URL, simulating a slow server.
    pub fn set_response_delay(&self, url: &str, delay: Duration) {
        let mut delays = self.delays.lock().unwrap();
        delays.insert(url.to_string(), delay);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Count the recorded requests for one URL.
    pub fn requests_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Clear all configured responses.
    pub fn clear_responses(&self) {
        self.responses.lock().unwrap().clear();
        self.sequences.lock().unwrap().clear();
    }

    /// Record a request.
    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<Bytes>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    /// Exact match first, then prefix match (for URL patterns).
    fn matching_key<T>(map: &HashMap<String, T>, url: &str) -> Option<String> {
        if map.contains_key(url) {
            return Some(url.to_string());
        }
        map.keys()
            .find(|pattern| url.starts_with(pattern.as_str()))
            .cloned()
    }

    /// Get the configured delay for a URL, if any.
    fn get_delay(&self, url: &str) -> Option<Duration> {
        let delays = self.delays.lock().unwrap();
        Self::matching_key(&delays, url).map(|key| delays[&key])
    }

    /// Get the response for a URL.
    fn get_response(&self, url: &str) -> Option<MockResponse> {
        // One-shot sequences win over fixed responses
        {
            let mut sequences = self.sequences.lock().unwrap();
            if let Some(key) = Self::matching_key(&sequences, url) {
                if let Some(response) = sequences.get_mut(&key).and_then(VecDeque::pop_front) {
                    return Some(response);
                }
            }
        }

        {
            let responses = self.responses.lock().unwrap();
            if let Some(key) = Self::matching_key(&responses, url) {
                return Some(responses[&key].clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    /// Answer a recorded request. Lock guards are scoped so none is held
    /// across the delay.
    async fn respond(&self, url: &str) -> Result<Response, HttpError> {
        if let Some(delay) = self.get_delay(url) {
            tokio::time::sleep(delay).await;
        }

        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.respond(url).await
    }

    async fn post(
        &self,
        url: &str,
        body: Bytes,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body));
        self.respond(url).await
    }
}
