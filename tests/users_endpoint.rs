//! HTTP-level tests for `GET /users`.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! an in-memory connection provider, so no database is needed. One test uses
//! the real MySQL provider pointed at a closed port.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use users_api::database::{
    ConnectionLease, ConnectionProvider, DbConnection, MySqlProvider, OpenConnections, ResultRow,
    SqlValue,
};
use users_api::{router, AppState, DatabaseConfig, HttpConfig, ServerError};

/// What the fake `users` table currently looks like.
#[derive(Clone)]
enum Table {
    Rows(Vec<ResultRow>),
    Missing,
}

/// In-memory provider standing in for a MySQL server.
struct MemoryProvider {
    table: Mutex<Table>,
    reachable: bool,
    open: OpenConnections,
    acquired: AtomicUsize,
}

impl MemoryProvider {
    fn with_table(table: Table) -> Self {
        Self {
            table: Mutex::new(table),
            reachable: true,
            open: OpenConnections::new(),
            acquired: AtomicUsize::new(0),
        }
    }

    fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::with_table(Table::Rows(Vec::new()))
        }
    }
}

struct MemoryConnection {
    table: Table,
    _lease: ConnectionLease,
}

#[async_trait]
impl ConnectionProvider for MemoryProvider {
    type Connection = MemoryConnection;

    async fn acquire(&self) -> Result<MemoryConnection, ServerError> {
        if !self.reachable {
            return Err(ServerError::connection("Can't connect to MySQL server"));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            table: self.table.lock().unwrap().clone(),
            _lease: self.open.lease(),
        })
    }

    fn open_connections(&self) -> usize {
        self.open.count()
    }
}

#[async_trait]
impl DbConnection for MemoryConnection {
    async fn fetch_all(&mut self, _query: &str) -> Result<Vec<ResultRow>, ServerError> {
        match &self.table {
            Table::Rows(rows) => Ok(rows.clone()),
            Table::Missing => Err(ServerError::query("Table 'app.users' doesn't exist")),
        }
    }

    async fn close(self) -> Result<(), ServerError> {
        Ok(())
    }
}

fn user(id: i64, name: &str) -> ResultRow {
    [
        ("id", SqlValue::Int(id)),
        ("name", SqlValue::String(name.to_string())),
    ]
    .into_iter()
    .collect()
}

fn build_app<P: ConnectionProvider>(provider: Arc<P>) -> Router {
    let state = AppState {
        provider,
        query_timeout: Duration::from_secs(5),
    };
    router(state, &HttpConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_users(app: &Router) -> (StatusCode, String) {
    send(app, Method::GET, "/users").await
}

#[tokio::test]
async fn returns_rows_in_column_and_row_order() {
    let provider = Arc::new(MemoryProvider::with_table(Table::Rows(vec![
        user(1, "a"),
        user(2, "b"),
    ])));
    let app = build_app(provider.clone());

    let (status, body) = get_users(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"id":1,"name":"a"},{"id":2,"name":"b"}]"#);
    assert_eq!(provider.open_connections(), 0);
}

#[tokio::test]
async fn array_length_matches_row_count() {
    let rows: Vec<ResultRow> = (1..=25).map(|i| user(i, &format!("user{i}"))).collect();
    let provider = Arc::new(MemoryProvider::with_table(Table::Rows(rows)));
    let app = build_app(provider);

    let (status, body) = get_users(&app).await;
    let parsed: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parsed.as_array().map(Vec::len), Some(25));
}

#[tokio::test]
async fn empty_table_is_empty_array() {
    let provider = Arc::new(MemoryProvider::with_table(Table::Rows(Vec::new())));
    let app = build_app(provider.clone());

    let (status, body) = get_users(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    assert_eq!(provider.open_connections(), 0);
}

#[tokio::test]
async fn heterogeneous_values_pass_through() {
    let row: ResultRow = [
        ("id", SqlValue::UInt(7)),
        ("email", SqlValue::Null),
        ("active", SqlValue::Bool(true)),
        ("score", SqlValue::Double(9.5)),
    ]
    .into_iter()
    .collect();
    let provider = Arc::new(MemoryProvider::with_table(Table::Rows(vec![row])));
    let app = build_app(provider);

    let (status, body) = get_users(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"id":7,"email":null,"active":true,"score":9.5}]"#
    );
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let provider = Arc::new(MemoryProvider::with_table(Table::Rows(vec![
        user(3, "c"),
        user(1, "a"),
    ])));
    let app = build_app(provider.clone());

    let first = get_users(&app).await;
    let second = get_users(&app).await;

    assert_eq!(first, second);
    assert_eq!(provider.acquired.load(Ordering::SeqCst), 2);
    assert_eq!(provider.open_connections(), 0);
}

#[tokio::test]
async fn connection_failure_returns_connection_error() {
    let provider = Arc::new(MemoryProvider::unreachable());
    let app = build_app(provider.clone());

    let (status, body) = get_users(&app).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"error": "Database connection error"})
    );
    assert_eq!(provider.open_connections(), 0);
}

#[tokio::test]
async fn query_failure_returns_fetch_error() {
    let provider = Arc::new(MemoryProvider::with_table(Table::Missing));
    let app = build_app(provider.clone());

    let (status, body) = get_users(&app).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"error": "Failed to fetch data"})
    );
    assert_eq!(provider.open_connections(), 0);
}

#[tokio::test]
async fn failure_does_not_affect_next_request() {
    let provider = Arc::new(MemoryProvider::with_table(Table::Missing));
    let app = build_app(provider.clone());

    let (status, _) = get_users(&app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    *provider.table.lock().unwrap() = Table::Rows(vec![user(1, "a")]);

    let (status, body) = get_users(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"id":1,"name":"a"}]"#);
}

#[tokio::test]
async fn only_get_users_is_routed() {
    let provider = Arc::new(MemoryProvider::with_table(Table::Rows(Vec::new())));
    let app = build_app(provider.clone());

    let (status, _) = send(&app, Method::GET, "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/users").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(provider.acquired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_mysql_server_returns_connection_error() {
    let mut config = DatabaseConfig::new("127.0.0.1", "reader", "pw", "app", "/nonexistent/ca.pem");
    config.port = 1;
    config.connect_timeout = Duration::from_secs(5);
    let provider = Arc::new(MySqlProvider::new(&config));
    let app = build_app(provider.clone());

    let (status, body) = get_users(&app).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"error": "Database connection error"})
    );
    assert_eq!(provider.open_connections(), 0);
}
