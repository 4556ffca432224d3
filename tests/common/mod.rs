//! Test helpers: scripted and in-memory stores on a loopback port

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chipmunk::Config;
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// How long the stores wait for more request bytes before treating the
/// request as complete (the protocol has no request terminator)
const REQUEST_IDLE: Duration = Duration::from_millis(50);

// =============================================================================
// Scripted store
// =============================================================================

/// What a scripted store does once it has read a request
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write the bytes and close
    Bytes(Vec<u8>),

    /// Write each segment with a pause in between, then close
    Segments(Vec<Vec<u8>>, Duration),

    /// Write the bytes, keep the connection open for a while, then close
    Stall(Vec<u8>, Duration),

    /// Write nothing, keep the connection open for a while, then close
    Hang(Duration),
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Bytes(s.as_bytes().to_vec())
    }
}

/// A store that answers each connection with the next scripted reply and
/// hands every request it read to the test
pub struct MockStore {
    addr: SocketAddr,
    requests: Receiver<Vec<u8>>,
}

impl MockStore {
    pub fn spawn(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = unbounded();

        thread::spawn(move || {
            for reply in replies {
                let (stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                serve_scripted(stream, reply, &tx);
            }
        });

        Self { addr, requests: rx }
    }

    /// Shorthand for a store that answers one request with `text`
    pub fn replying(text: &str) -> Self {
        Self::spawn(vec![Reply::text(text)])
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Config pointing at this store with short time bounds
    pub fn config(&self) -> Config {
        config_for(self.port())
    }

    /// The next request the store received
    pub fn request(&self) -> Vec<u8> {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("store received no request")
    }
}

fn serve_scripted(mut stream: TcpStream, reply: Reply, tx: &Sender<Vec<u8>>) {
    let request = read_request(&mut stream);
    let _ = tx.send(request);

    match reply {
        Reply::Bytes(bytes) => {
            let _ = stream.write_all(&bytes);
        }
        Reply::Segments(segments, gap) => {
            for segment in segments {
                let _ = stream.write_all(&segment);
                let _ = stream.flush();
                thread::sleep(gap);
            }
        }
        Reply::Stall(bytes, hold) => {
            let _ = stream.write_all(&bytes);
            let _ = stream.flush();
            thread::sleep(hold);
        }
        Reply::Hang(hold) => thread::sleep(hold),
    }
}

/// Read until the client stops sending for `REQUEST_IDLE` or closes
pub fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    stream.set_read_timeout(Some(REQUEST_IDLE)).unwrap();
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    let mut waited = Duration::ZERO;

    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => request.extend_from_slice(&buf[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                if !request.is_empty() {
                    break;
                }
                // Nothing yet: give the client up to a second to start writing
                waited += REQUEST_IDLE;
                if waited >= Duration::from_secs(1) {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    request
}

pub fn config_for(port: u16) -> Config {
    Config::builder()
        .port(port)
        .connect_timeout_ms(1000)
        .read_timeout_ms(1000)
        .write_timeout_ms(1000)
        .response_timeout_ms(3000)
        .build()
        .unwrap()
}

/// A port nothing is listening on
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Clone)]
struct Entry {
    metadata: Vec<(String, String)>,
    payload: Vec<u8>,
}

/// A store that speaks the protocol against a `HashMap`
///
/// `Remove` answers with the removed entry's metadata as a JSON object.
pub struct InMemoryStore {
    addr: SocketAddr,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryStore {
    pub fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let entries: Arc<Mutex<HashMap<String, Entry>>> = Arc::default();

        let shared = Arc::clone(&entries);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { return };
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let request = read_request(&mut stream);
                    let reply = handle(&shared, &request);
                    let _ = stream.write_all(&reply);
                });
            }
        });

        Self { addr, entries }
    }

    pub fn config(&self) -> Config {
        config_for(self.addr.port())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

fn handle(entries: &Mutex<HashMap<String, Entry>>, request: &[u8]) -> Vec<u8> {
    let Some((&cmd, body)) = request.split_first() else {
        return b"NODATA".to_vec();
    };

    match cmd {
        b'G' => {
            let id = String::from_utf8_lossy(body).into_owned();
            match entries.lock().get(&id) {
                Some(entry) => entry.payload.clone(),
                None => b"NODATA".to_vec(),
            }
        }
        b'R' => {
            let id = String::from_utf8_lossy(body).into_owned();
            match entries.lock().remove(&id) {
                Some(entry) => {
                    let record: serde_json::Map<String, serde_json::Value> = entry
                        .metadata
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::String(v)))
                        .collect();
                    serde_json::to_vec(&record).unwrap()
                }
                None => b"NODATA".to_vec(),
            }
        }
        b'S' => {
            let mut fields = body.splitn(3, |b| *b == b'|');
            let (Some(id), Some(meta), Some(payload)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return b"ERROR".to_vec();
            };
            let metadata = String::from_utf8_lossy(meta)
                .split('#')
                .filter(|s| !s.is_empty())
                .filter_map(|pair| pair.split_once(':'))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            entries.lock().insert(
                String::from_utf8_lossy(id).into_owned(),
                Entry {
                    metadata,
                    payload: payload.to_vec(),
                },
            );
            b"SAVED".to_vec()
        }
        b'O' | b'A' => {
            let text = String::from_utf8_lossy(body).into_owned();
            let (query, subset) = text.split_once('\n').unwrap_or((text.as_str(), ""));
            let terms: Vec<(String, bool, String)> = query
                .split('#')
                .filter(|s| !s.is_empty())
                .map(parse_term)
                .collect();
            let subset: Vec<&str> = subset.split('#').filter(|s| !s.is_empty()).collect();

            let entries = entries.lock();
            let mut hits: Vec<&String> = entries
                .iter()
                .filter(|(id, _)| subset.is_empty() || subset.contains(&id.as_str()))
                .filter(|(_, entry)| {
                    let matches = terms.iter().map(|(key, equals, value)| {
                        let found = entry.metadata.iter().any(|(k, v)| k == key && v == value);
                        found == *equals
                    });
                    if cmd == b'O' {
                        matches.into_iter().any(|m| m)
                    } else {
                        matches.into_iter().all(|m| m)
                    }
                })
                .map(|(id, _)| id)
                .collect();

            if hits.is_empty() {
                return b"NODATA".to_vec();
            }
            hits.sort();
            hits.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("|").into_bytes()
        }
        _ => b"NODATA".to_vec(),
    }
}

/// `k:v` → (k, true, v); `k:=:v` / `k:!:v` → explicit condition
fn parse_term(raw: &str) -> (String, bool, String) {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    match parts.as_slice() {
        [k, "=", v] => (k.to_string(), true, v.to_string()),
        [k, "!", v] => (k.to_string(), false, v.to_string()),
        [k, rest @ ..] => (k.to_string(), true, rest.join(":")),
        [] => (String::new(), true, String::new()),
    }
}
