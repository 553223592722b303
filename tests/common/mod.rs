//! Fake remote catalog served over HTTP for client and CLI tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

pub const GAMES_JSON: &str = r#"[
  {
    "id": 1942,
    "name": "The Witcher 3: Wild Hunt",
    "summary": "Geralt hunts.",
    "total_rating": 92.4,
    "first_release_date": 1431993600,
    "cover": {"url": "//images.igdb.com/igdb/image/upload/t_thumb/co1wyy.jpg"},
    "platforms": [{"name": "PC"}, {"name": "PlayStation 4"}],
    "genres": [{"name": "Role-playing (RPG)"}],
    "similar_games": [1020, 472],
    "involved_companies": [
      {"company": {"name": "CD Projekt RED"}, "developer": true, "publisher": false},
      {"company": {"name": "Bandai Namco"}, "developer": false, "publisher": true}
    ],
    "screenshots": [{"url": "//images.igdb.com/igdb/image/upload/t_thumb/sc1.jpg"}]
  },
  {
    "id": 1020,
    "name": "Grand Theft Auto V",
    "total_rating": 90.1,
    "genres": [{"name": "Shooter"}]
  }
]"#;

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: String,
}

pub struct FakeCatalog {
    pub requests: Mutex<Vec<CapturedRequest>>,
    response: Mutex<(u16, String)>,
    delay_ms: AtomicU64,
}

impl FakeCatalog {
    pub fn new(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: Mutex::new((status, body.to_string())),
            delay_ms: AtomicU64::new(0),
        })
    }

    pub fn respond(&self, status: u16, body: &str) {
        *self.response.lock().unwrap() = (status, body.to_string());
    }

    pub fn delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request captured")
    }
}

async fn handle(
    State(fake): State<Arc<FakeCatalog>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    fake.requests
        .lock()
        .unwrap()
        .push(CapturedRequest { headers, body });
    let delay = fake.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let (status, body) = fake.response.lock().unwrap().clone();
    (StatusCode::from_u16(status).unwrap(), body)
}

/// Serve `fake` on an ephemeral port and return the games endpoint URL.
pub async fn serve(fake: Arc<FakeCatalog>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/v4/games", post(handle))
        .with_state(fake);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v4/games", addr)
}

/// An endpoint nothing listens on.
pub fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/v4/games", port)
}
