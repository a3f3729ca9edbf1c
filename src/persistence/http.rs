//! HTTP score service (blocking, run off-thread by the background client)

use std::time::Duration;

use super::{BestScore, PersistenceError, ScoreService, SubmitBody, SubmitReply};

/// How long a single request may take before the server counts as offline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct HttpScoreService {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpScoreService {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn convert_error(e: ureq::Error) -> PersistenceError {
        match e {
            ureq::Error::Status(code, _) => PersistenceError::Status(code),
            other => PersistenceError::Unavailable(other.to_string()),
        }
    }
}

impl ScoreService for HttpScoreService {
    fn fetch_best(&self) -> Result<u64, PersistenceError> {
        let reply: BestScore = self
            .agent
            .get(&self.url("/get_best"))
            .call()
            .map_err(Self::convert_error)?
            .into_json()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;
        Ok(reply.high_score)
    }

    fn submit(&self, body: &SubmitBody) -> Result<SubmitReply, PersistenceError> {
        self.agent
            .post(&self.url("/submit_run"))
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(Self::convert_error)?
            .into_json()
            .map_err(|e| PersistenceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    /// One-shot HTTP server: answers a single request with `status` and
    /// `body`, and hands back the raw request it received
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut payload = vec![0u8; content_length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8_lossy(&payload));

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(request).unwrap();
        });
        (format!("http://{addr}/"), rx)
    }

    #[test]
    fn test_fetch_best() {
        let (url, requests) = serve_once("200 OK", r#"{"high_score": 1337}"#);
        let service = HttpScoreService::new(&url, DEFAULT_TIMEOUT);
        assert_eq!(service.fetch_best().unwrap(), 1337);
        assert!(requests.recv().unwrap().starts_with("GET /get_best "));
    }

    #[test]
    fn test_submit_posts_json() {
        let (url, requests) = serve_once(
            "200 OK",
            r#"{"status": "success", "message": "Run Recorded.", "high_score": 2000}"#,
        );
        let service = HttpScoreService::new(&url, DEFAULT_TIMEOUT);
        let reply = service.submit(&SubmitBody::Simple { score: 640 }).unwrap();
        assert_eq!(reply.high_score, 2000);
        assert_eq!(reply.message, "Run Recorded.");

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /submit_run "));
        assert!(request.ends_with(r#"{"score":640}"#));
    }

    #[test]
    fn test_server_error_status() {
        let (url, _requests) = serve_once("500 Internal Server Error", "{}");
        let service = HttpScoreService::new(&url, DEFAULT_TIMEOUT);
        assert!(matches!(service.fetch_best(), Err(PersistenceError::Status(500))));
    }

    #[test]
    fn test_garbage_reply_is_decode_error() {
        let (url, _requests) = serve_once("200 OK", "not json");
        let service = HttpScoreService::new(&url, DEFAULT_TIMEOUT);
        assert!(matches!(service.fetch_best(), Err(PersistenceError::Decode(_))));
    }

    #[test]
    fn test_unreachable_server() {
        // Grab a free port, then close it so nothing is listening
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let service = HttpScoreService::new(&format!("http://127.0.0.1:{port}"), DEFAULT_TIMEOUT);
        assert!(matches!(service.fetch_best(), Err(PersistenceError::Unavailable(_))));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let service = HttpScoreService::new("http://example.test:5000//", DEFAULT_TIMEOUT);
        assert_eq!(service.base_url(), "http://example.test:5000");
    }
}
