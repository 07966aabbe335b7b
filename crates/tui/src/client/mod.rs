use std::time::Duration;

use api_types::transaction::{TransactionId, TransactionNew, TransactionView};
use reqwest::{Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

#[cfg(test)]
pub mod memory;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// The store answers at most `limit` rows per list request.
const PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The store answered with a success status but an unreadable body.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Persistence for transactions.
///
/// The view-model only talks to this trait; [`Client`] is the HTTP
/// implementation.
pub trait TransactionStore {
    /// `GET /transactions/`
    async fn list(&self) -> std::result::Result<Vec<TransactionView>, ClientError>;
    /// `POST /transactions/`, returns the stored record.
    async fn create(
        &self,
        payload: &TransactionNew,
    ) -> std::result::Result<TransactionView, ClientError>;
    /// `DELETE /transactions/{id}`, returns the deleted record.
    async fn delete(&self, id: TransactionId)
    -> std::result::Result<TransactionView, ClientError>;
    /// `DELETE /transactions/`, returns how many records were removed.
    async fn delete_all(&self) -> std::result::Result<u64, ClientError>;
}

/// FastAPI-style error body. `detail` is a string for handler errors and a
/// list of objects for request validation errors.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        // `Url::join` drops the last path segment unless it ends with '/'.
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized).map_err(|err| AppError::BaseUrl(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Health check against the store root.
    pub async fn ping(&self) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint("")?;
        let res = self.http.get(endpoint).send().await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(res).await)
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid endpoint `{path}`: {err}")))
    }
}

impl TransactionStore for Client {
    async fn list(&self) -> std::result::Result<Vec<TransactionView>, ClientError> {
        let endpoint = self.endpoint("transactions/")?;
        let mut records: Vec<TransactionView> = Vec::new();
        loop {
            let res = self
                .http
                .get(endpoint.clone())
                .query(&[("skip", records.len()), ("limit", PAGE_SIZE)])
                .send()
                .await?;
            let page: Vec<TransactionView> = read_json(res).await?;
            let len = page.len();
            // A store that ignores `skip` would hand back the same page forever.
            let repeated = page
                .first()
                .is_some_and(|first| records.iter().any(|known| known.id == first.id));
            if repeated {
                break;
            }
            records.extend(page);
            if len != PAGE_SIZE {
                break;
            }
        }
        Ok(records)
    }

    async fn create(
        &self,
        payload: &TransactionNew,
    ) -> std::result::Result<TransactionView, ClientError> {
        let endpoint = self.endpoint("transactions/")?;
        let res = self.http.post(endpoint).json(payload).send().await?;
        read_json(res).await
    }

    async fn delete(
        &self,
        id: TransactionId,
    ) -> std::result::Result<TransactionView, ClientError> {
        let endpoint = self.endpoint(&format!("transactions/{id}"))?;
        let res = self.http.delete(endpoint).send().await?;
        read_json(res).await
    }

    async fn delete_all(&self) -> std::result::Result<u64, ClientError> {
        let endpoint = self.endpoint("transactions/")?;
        let res = self.http.delete(endpoint).send().await?;
        read_json(res).await
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> std::result::Result<T, ClientError> {
    if res.status().is_success() {
        let body = res.bytes().await?;
        return serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()));
    }
    Err(error_from_response(res).await)
}

async fn error_from_response(res: Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| match err.detail {
            serde_json::Value::String(message) => message,
            other => other.to_string(),
        })
        .unwrap_or_else(|_| "unknown error".to_string());

    tracing::debug!(%status, "store answered with an error: {body}");

    match status.as_u16() {
        404 => ClientError::NotFound,
        400 | 422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use api_types::transaction::Category;
    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        routing::{delete, get},
    };
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Default)]
    struct FakeInner {
        records: Vec<Value>,
        next_id: i64,
        last_body: Option<Value>,
    }

    type FakeState = Arc<Mutex<FakeInner>>;

    #[derive(Deserialize)]
    struct PageParams {
        skip: Option<usize>,
        limit: Option<usize>,
    }

    async fn list_handler(
        State(state): State<FakeState>,
        Query(page): Query<PageParams>,
    ) -> Json<Vec<Value>> {
        let inner = state.lock().unwrap();
        let skip = page.skip.unwrap_or(0);
        let limit = page.limit.unwrap_or(100);
        Json(inner.records.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn create_handler(
        State(state): State<FakeState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let mut inner = state.lock().unwrap();
        inner.next_id += 1;
        let mut record = body.clone();
        record["id"] = json!(inner.next_id);
        inner.records.push(record.clone());
        inner.last_body = Some(body);
        Json(record)
    }

    async fn delete_handler(
        State(state): State<FakeState>,
        Path(id): Path<i64>,
    ) -> std::result::Result<Json<Value>, (StatusCode, Json<Value>)> {
        let mut inner = state.lock().unwrap();
        let Some(pos) = inner.records.iter().position(|r| r["id"] == json!(id)) else {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Transaction not found" })),
            ));
        };
        Ok(Json(inner.records.remove(pos)))
    }

    async fn delete_all_handler(State(state): State<FakeState>) -> Json<u64> {
        let mut inner = state.lock().unwrap();
        let count = inner.records.len() as u64;
        inner.records.clear();
        Json(count)
    }

    fn fake_router(state: FakeState) -> Router {
        Router::new()
            .route("/", get(|| async { Json("hello") }))
            .route(
                "/transactions/",
                get(list_handler)
                    .post(create_handler)
                    .delete(delete_all_handler),
            )
            .route("/transactions/{id}", delete(delete_handler))
            .with_state(state)
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn seeded(records: Vec<Value>) -> FakeState {
        let next_id = records.len() as i64;
        Arc::new(Mutex::new(FakeInner {
            records,
            next_id,
            last_body: None,
        }))
    }

    fn record(id: i64, amount: f64, category: &str, date: &str) -> Value {
        json!({
            "id": id,
            "amount": amount,
            "category": category,
            "description": "",
            "date": date,
        })
    }

    #[tokio::test]
    async fn list_decodes_store_records() {
        let state = seeded(vec![
            record(1, 10.0, "Groceries", "2024-01-02"),
            record(2, 5.5, "Travel", "2024-01-03"),
        ]);
        let base = spawn(fake_router(state)).await;
        let client = Client::new(&base).unwrap();

        let items = client.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, TransactionId(1));
        assert_eq!(items[1].category, Category::Travel);
        assert_eq!(items[1].amount, Some(5.5));
    }

    #[tokio::test]
    async fn list_reads_every_page() {
        let records = (1..=250)
            .map(|id| record(id, 1.0, "Other", "2024-01-01"))
            .collect();
        let base = spawn(fake_router(seeded(records))).await;
        let client = Client::new(&base).unwrap();

        let items = client.list().await.unwrap();
        assert_eq!(items.len(), 250);
        assert_eq!(items[0].id, TransactionId(1));
        assert_eq!(items[249].id, TransactionId(250));
    }

    #[tokio::test]
    async fn list_stops_when_store_ignores_paging() {
        let full_page: Vec<Value> = (1..=100)
            .map(|id| record(id, 1.0, "Other", "2024-01-01"))
            .collect();
        let router = Router::new().route(
            "/transactions/",
            get(move || {
                let page = full_page.clone();
                async move { Json(page) }
            }),
        );
        let base = spawn(router).await;
        let client = Client::new(&base).unwrap();

        assert_eq!(client.list().await.unwrap().len(), 100);
    }

    #[tokio::test]
    async fn unknown_category_is_a_decode_error() {
        let state = seeded(vec![record(1, 10.0, "Pets", "2024-01-02")]);
        let base = spawn(fake_router(state)).await;
        let client = Client::new(&base).unwrap();

        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(ref msg) if msg.contains("Pets")));
    }

    #[tokio::test]
    async fn create_posts_calendar_date_and_returns_record() {
        let state = seeded(Vec::new());
        let base = spawn(fake_router(state.clone())).await;
        let client = Client::new(&base).unwrap();

        let payload = TransactionNew {
            amount: 42.0,
            category: Category::Housing,
            description: "rent".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        let created = client.create(&payload).await.unwrap();
        assert_eq!(created.id, TransactionId(1));
        assert_eq!(created.description, "rent");

        let body = state.lock().unwrap().last_body.clone().unwrap();
        assert_eq!(body["date"], "2024-05-01");
        assert_eq!(body["category"], "Housing");
        assert_eq!(body["amount"], 42.0);
    }

    #[tokio::test]
    async fn delete_missing_maps_to_not_found() {
        let base = spawn(fake_router(seeded(Vec::new()))).await;
        let client = Client::new(&base).unwrap();

        let err = client.delete(TransactionId(99)).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound));
    }

    #[tokio::test]
    async fn delete_one_and_delete_all() {
        let state = seeded(vec![
            record(1, 1.0, "Other", "2024-01-01"),
            record(2, 2.0, "Other", "2024-01-01"),
            record(3, 3.0, "Other", "2024-01-01"),
        ]);
        let base = spawn(fake_router(state.clone())).await;
        let client = Client::new(&base).unwrap();

        let deleted = client.delete(TransactionId(2)).await.unwrap();
        assert_eq!(deleted.id, TransactionId(2));
        assert_eq!(client.delete_all().await.unwrap(), 2);
        assert!(state.lock().unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn validation_detail_is_rendered() {
        let router = Router::new().route(
            "/transactions/",
            get(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": [{ "loc": ["body", "amount"], "msg": "field required" }] })),
                )
            }),
        );
        let base = spawn(router).await;
        let client = Client::new(&base).unwrap();

        let err = client.list().await.unwrap_err();
        let ClientError::Validation(message) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(message.contains("field required"));
    }

    #[tokio::test]
    async fn server_error_without_body_is_unknown() {
        let router = Router::new().route(
            "/transactions/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn(router).await;
        let client = Client::new(&base).unwrap();

        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Server(ref msg) if msg == "unknown error"));
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let router = Router::new().nest("/api", fake_router(seeded(Vec::new())));
        let base = spawn(router).await;
        let client = Client::new(&format!("{base}/api")).unwrap();

        assert!(client.list().await.unwrap().is_empty());
        assert!(client.base_url().ends_with("/api/"));
    }

    #[tokio::test]
    async fn ping_reports_reachability() {
        let base = spawn(fake_router(seeded(Vec::new()))).await;
        let client = Client::new(&base).unwrap();
        client.ping().await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let offline = Client::new(&format!("http://{addr}")).unwrap();
        let err = offline.ping().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            Client::new("not a url"),
            Err(AppError::BaseUrl(_))
        ));
    }
}
