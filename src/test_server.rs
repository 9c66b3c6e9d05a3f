//! Local axum server for tests: canned responses per path, request log,
//! and a route that never answers in time.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

#[derive(Clone)]
pub enum Route {
    Respond { status: StatusCode, body: String },
    Redirect(String),
    /// Sleeps far past any client timeout used in tests.
    Hang,
}

impl Route {
    pub fn ok(body: &str) -> Self {
        Route::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Route::Respond {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Route::Redirect(location.to_string())
    }
}

#[derive(Clone)]
struct AppState {
    routes: Arc<HashMap<String, Route>>,
    requests: Arc<Mutex<Vec<String>>>,
}

pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Unlisted paths answer 404.
    pub async fn start(routes: Vec<(&str, Route)>) -> Self {
        let state = AppState {
            routes: Arc::new(
                routes
                    .into_iter()
                    .map(|(path, route)| (path.to_string(), route))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = Arc::clone(&state.requests);

        let app = Router::new().fallback(respond).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    /// `host:port`, usable as a host filter.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Request paths in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(path.clone());

    match state.routes.get(&path).cloned() {
        Some(Route::Respond { status, body }) => (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response(),
        Some(Route::Redirect(location)) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        Some(Route::Hang) => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            StatusCode::OK.into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
