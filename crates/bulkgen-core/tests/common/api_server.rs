//! Minimal HTTP/1.1 fake of the bulk generation backend for integration tests.
//!
//! Keeps jobs in memory. Every request must carry the expected Basic
//! `Authorization` header, otherwise it gets a 401. Jobs move to `GENERATING`
//! on `/bulk/generate/{id}`; the first status fetch after that reports 33% and
//! the next one reports the job completed.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

/// Credentials the fake accepts, and their `Authorization` header value.
pub const USERNAME: &str = "editor";
pub const PASSWORD: &str = "s3cret";
const AUTHORIZATION: &str = "Basic ZWRpdG9yOnMzY3JldA==";

#[derive(Default)]
struct State {
    next_id: u32,
    jobs: Vec<Value>,
    /// Status fetches served per job while generating.
    polls: HashMap<String, u32>,
    /// Every request as "METHOD /path".
    log: Vec<String>,
    /// Last review body received.
    last_review: Option<Value>,
}

/// Handle to a running fake server.
#[derive(Clone)]
pub struct ApiServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl ApiServer {
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn last_review(&self) -> Option<Value> {
        self.state.lock().unwrap().last_review.clone()
    }

    pub fn count(&self, request: &str) -> usize {
        self.requests().iter().filter(|r| *r == request).count()
    }
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start() -> ApiServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State::default()));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state));
        }
    });
    ApiServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

struct Request {
    method: String,
    path: String,
    authorization: Option<String>,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?;
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut authorization = None;
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = data[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some(Request {
        method,
        path,
        authorization,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, body: Option<&Value>) {
    let payload = body.map(|v| v.to_string()).unwrap_or_default();
    let content_type = if body.is_some() {
        "Content-Type: application/json\r\n"
    } else {
        ""
    };
    let response = format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let mut state = state.lock().unwrap();
    state
        .log
        .push(format!("{} {}", request.method, request.path));

    if request.authorization.as_deref() != Some(AUTHORIZATION) {
        respond(&mut stream, "401 Unauthorized", Some(&json!({"detail": "Not authenticated"})));
        return;
    }

    let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
    let segments: Vec<&str> = request
        .path
        .trim_matches('/')
        .split('/')
        .collect();
    let (status, reply) = route(&mut state, &request.method, &segments, body);
    respond(&mut stream, status, reply.as_ref());
}

fn not_found() -> (&'static str, Option<Value>) {
    ("404 Not Found", Some(json!({"detail": "Job not found"})))
}

fn route(
    state: &mut State,
    method: &str,
    segments: &[&str],
    body: Value,
) -> (&'static str, Option<Value>) {
    match (method, segments) {
        ("POST", ["bulk", "brainstorm"]) => brainstorm(state, &body),
        ("PUT", ["bulk", "review", id]) => {
            let Some(job) = find(state, id) else {
                return not_found();
            };
            let approved = body["approved_ideas"].as_array().map_or(0, Vec::len);
            if approved == 0 {
                return (
                    "422 Unprocessable Entity",
                    Some(json!({"detail": [{"loc": ["body", "approved_ideas"], "msg": "must not be empty"}]})),
                );
            }
            job["status"] = json!("REVIEWED");
            job["total_articles"] = json!(approved);
            state.last_review = Some(body);
            ("200 OK", Some(json!({"message": "Review saved"})))
        }
        ("POST", ["bulk", "generate", id]) => {
            let Some(job) = find(state, id) else {
                return not_found();
            };
            job["status"] = json!("GENERATING");
            job["completed_articles"] = json!(0);
            ("204 No Content", None)
        }
        ("POST", ["bulk", "direct"]) => {
            let id = new_id(state);
            let job = json!({
                "id": id,
                "topic": body["topic"],
                "category": body["category"],
                "num_articles": body["num_articles"],
                "status": "GENERATING",
                "completed_articles": 0
            });
            state.jobs.push(job.clone());
            ("200 OK", Some(job))
        }
        ("GET", ["bulk", "jobs"]) => (
            "200 OK",
            Some(json!({"jobs": state.jobs, "total": state.jobs.len()})),
        ),
        ("GET", ["bulk", "jobs", id]) => {
            let id = id.to_string();
            let polls = state.polls.entry(id.clone()).or_default();
            let generating_poll = *polls;
            let Some(job) = find(state, &id) else {
                return not_found();
            };
            if job["status"] == "GENERATING" {
                let total = job["total_articles"].as_u64().unwrap_or(0);
                if generating_poll == 0 {
                    job["progress_percent"] = json!(33);
                } else {
                    job["status"] = json!("COMPLETED");
                    job["completed_articles"] = json!(total);
                    job["progress_percent"] = json!(100);
                }
                let snapshot = job.clone();
                *state.polls.entry(id).or_default() += 1;
                return ("200 OK", Some(snapshot));
            }
            ("200 OK", Some(job.clone()))
        }
        ("PATCH", ["bulk", "jobs", id, "cancel"]) => {
            let Some(job) = find(state, id) else {
                return not_found();
            };
            let status = job["status"].as_str().unwrap_or_default().to_string();
            if matches!(status.as_str(), "COMPLETED" | "FAILED" | "CANCELLED") {
                return (
                    "400 Bad Request",
                    Some(json!({"detail": format!("Job already {}", status.to_lowercase())})),
                );
            }
            job["status"] = json!("CANCELLED");
            ("200 OK", Some(json!({"message": "Job cancelled"})))
        }
        ("DELETE", ["bulk", "jobs", id]) => {
            let before = state.jobs.len();
            state.jobs.retain(|j| j["_id"] != *id && j["id"] != *id);
            if state.jobs.len() == before {
                return not_found();
            }
            ("204 No Content", None)
        }
        _ => ("404 Not Found", Some(json!({"detail": "Not Found"}))),
    }
}

fn new_id(state: &mut State) -> String {
    state.next_id += 1;
    format!("65f0c0ffee{:04}", state.next_id)
}

fn find<'a>(state: &'a mut State, id: &str) -> Option<&'a mut Value> {
    state
        .jobs
        .iter_mut()
        .find(|j| j["_id"] == *id || j["id"] == *id)
}

/// Stores the job under `_id` and answers with `job_id`, like the real backend.
fn brainstorm(state: &mut State, body: &Value) -> (&'static str, Option<Value>) {
    let topic = body["topic"].as_str().unwrap_or_default().to_string();
    let count = body["num_articles"].as_u64().unwrap_or(0);
    let id = new_id(state);
    let ideas: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "id": format!("idea-{}", n),
                "title": format!("{} guide part {}", topic, n),
                "primaryKeyword": format!("{} {}", topic.to_lowercase(), n),
                "secondaryKeywords": ["beginner", "equipment"],
                "searchIntent": "informational",
                "funnelStage": "awareness"
            })
        })
        .collect();
    let stored = json!({
        "_id": id,
        "topic": topic,
        "category": body["category"],
        "status": "PENDING_REVIEW",
        "total_articles": count,
        "completed_articles": 0,
        "ideas": ideas,
        "target_length": body["target_length"],
        "brand_voice": body["brand_voice"]
    });
    state.jobs.push(stored);
    (
        "200 OK",
        Some(json!({
            "job_id": id,
            "status": "PENDING_REVIEW",
            "article_ideas": ideas
        })),
    )
}
