#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One request as seen by the fake provider.
#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
}

pub struct FakeProvider {
    pub base_url: String,
    handle: JoinHandle<RecordedRequest>,
}

impl FakeProvider {
    /// Serves exactly one request with the given status and body.
    pub fn respond(status: u16, body: String) -> Self {
        Self::spawn(move |stream| write_response(stream, status, &body))
    }

    /// Accepts one request and never answers it.
    pub fn stall(for_duration: Duration) -> Self {
        Self::spawn(move |_stream| thread::sleep(for_duration))
    }

    fn spawn(reply: impl FnOnce(&mut TcpStream) + Send + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept should succeed");
            let request = read_request(&mut stream);
            reply(&mut stream);
            request
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    pub fn request(self) -> RecordedRequest {
        self.handle.join().expect("fake provider thread should join")
    }
}

/// A bound port that records whether anything connected to it.
pub struct UnusedEndpoint {
    pub base_url: String,
    listener: TcpListener,
}

impl UnusedEndpoint {
    pub fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        Self {
            base_url: format!("http://{addr}"),
            listener,
        }
    }

    /// Connections complete in the kernel backlog even without `accept`, so
    /// after the process exits a pending connection means it dialled us.
    pub fn was_contacted(&self) -> bool {
        self.listener
            .set_nonblocking(true)
            .expect("listener should switch to non-blocking");
        self.listener.accept().is_ok()
    }
}

fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("stream should clone"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("request line should be readable");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("header should be readable");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let len = headers
        .get("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; len];
    reader.read_exact(&mut body).expect("body should be readable");
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    RecordedRequest {
        method,
        path,
        headers,
        body,
    }
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(response.as_bytes())
        .expect("response should be written");
    stream.flush().expect("response should flush");
}

pub fn openai_reply(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

pub fn anthropic_reply(text: &str) -> String {
    serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
    .to_string()
}

/// The binary with a clean provider environment, run from `cwd`.
pub fn lal(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lal"));
    cmd.current_dir(cwd)
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("LAL_MODEL")
        .env_remove("LAL_OPENAI_BASE_URL")
        .env_remove("LAL_ANTHROPIC_BASE_URL")
        .env_remove("LAL_TIMEOUT_SECS")
        .env_remove("LAL_SHELL")
        .env_remove("RUST_LOG")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_FORMAT")
        .env_remove("LOG_FILE_PATH");
    for proxy in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        cmd.env_remove(proxy);
    }
    cmd
}

/// Runs the command feeding `stdin` to it (or a closed stdin when `None`).
pub fn run_with_stdin(cmd: &mut Command, stdin: Option<&str>) -> Output {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    match stdin {
        None => {
            cmd.stdin(Stdio::null());
            cmd.output().expect("failed to run lal binary")
        }
        Some(input) => {
            cmd.stdin(Stdio::piped());
            let mut child = cmd.spawn().expect("failed to spawn lal binary");
            let mut pipe = child.stdin.take().expect("stdin should be piped");
            // The binary may exit before reading, e.g. on an early error.
            let _ = pipe.write_all(input.as_bytes());
            drop(pipe);
            child.wait_with_output().expect("failed to wait for lal binary")
        }
    }
}
