//! Bare HTTP/1.1 server for tests that need exact control over the status line.

use crate::client::Config;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

/// Serves every connection with `route(request_line)` and closes it.
pub(crate) struct StubServer {
    addr: SocketAddr,
}

impl StubServer {
    pub(crate) fn start<F>(route: F) -> Self
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle(stream, &route);
            }
        });

        StubServer { addr }
    }

    pub(crate) fn config(&self) -> Config {
        Config::new("http".to_string(), self.addr.to_string())
    }
}

/// A complete response with a JSON content type and `Connection: close`
pub(crate) fn raw_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

pub(crate) fn token_reply(token: &str, expires_in: i64) -> String {
    let body = format!(r#"{{"access_token":"{}","expires_in":{}}}"#, token, expires_in);
    raw_response("200 OK", &body)
}

pub(crate) fn is_auth_request(request_line: &str) -> bool {
    request_line.contains("/authentication/token/new")
}

fn handle<F>(mut stream: TcpStream, route: &F)
where
    F: Fn(&str) -> String,
{
    let Ok(read_half) = stream.try_clone() else { return };
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut body);

    let _ = stream.write_all(route(&request_line).as_bytes());
    let _ = stream.flush();
}
