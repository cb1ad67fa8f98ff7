use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use stockroom_core::{ProductRecord, StoredProduct, ValidationPolicy};
use stockroom_pipeline::store::{ProductStore, StoreTransaction};
use stockroom_pipeline::{csv_template, MemoryProductStore, SqliteProductStore, StoreError};
use stockroom_server::{build_router, AppState, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "stockroom-test-boundary";
const HEADER: &str = "Product Name,SKU,Category,Purchase Price,Selling Price,Stock Quantity";

struct TestServer {
    addr: std::net::SocketAddr,
    upload_dir: tempfile::TempDir,
}

async fn start(store: Arc<dyn ProductStore>, policy: ValidationPolicy) -> TestServer {
    start_with(store, ServerConfig {
        validation_policy: policy,
        ..ServerConfig::default()
    })
    .await
}

async fn start_with(store: Arc<dyn ProductStore>, config: ServerConfig) -> TestServer {
    let upload_dir = tempfile::tempdir().expect("upload dir");
    let config = ServerConfig {
        upload_dir: upload_dir.path().to_path_buf(),
        ..config
    };
    let app = build_router(AppState::new(store, &config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    TestServer { addr, upload_dir }
}

async fn start_sqlite(policy: ValidationPolicy) -> TestServer {
    let store = SqliteProductStore::open_in_memory().expect("sqlite store");
    start(Arc::new(store), policy).await
}

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: &[u8],
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(ct) = content_type {
        req.push_str(&format!("Content-Type: {ct}\r\n"));
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
    let mut bytes = req.into_bytes();
    bytes.extend_from_slice(body);
    stream.write_all(&bytes).await.expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, head.to_string(), body.to_string())
}

async fn get(addr: std::net::SocketAddr, path: &str) -> (u16, String, String) {
    send_raw(addr, "GET", path, None, b"").await
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, contents: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

async fn post_file(
    addr: std::net::SocketAddr,
    path: &str,
    file_name: &str,
    content_type: &str,
    contents: &str,
) -> (u16, Value) {
    let body = multipart_body("file", file_name, content_type, contents);
    let ct = format!("multipart/form-data; boundary={BOUNDARY}");
    let (status, _, body) = send_raw(addr, "POST", path, Some(&ct), &body).await;
    (status, serde_json::from_str(&body).expect("json body"))
}

async fn upload_csv(addr: std::net::SocketAddr, contents: &str) -> (u16, Value) {
    post_file(addr, "/api/upload", "inventory.csv", "text/csv", contents).await
}

async fn products(addr: std::net::SocketAddr) -> Vec<Value> {
    let (status, _, body) = get(addr, "/api/products").await;
    assert_eq!(status, 200);
    serde_json::from_str(&body).expect("products json")
}

fn spooled_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Eight products across three categories with distinct profits.
fn hardware_csv() -> String {
    format!(
        "{HEADER}\n\
         Cordless Drill,DRL-100,Tools,80,130,12\n\
         Paint Roller,PNT-220,Paint,3,7,40\n\
         Garden Hose,GRD-310,Garden,12,20,3\n\
         Hammer,HM-001,Tools,5,14,9\n\
         Exterior Paint,PNT-500,Paint,20,45,6\n\
         Rake,GRD-120,Garden,10,12,15\n\
         Saw,SW-010,Tools,15,45,11\n\
         Primer,PNT-010,Paint,8,9,2\n"
    )
}

struct FailingStore {
    inner: MemoryProductStore,
}

struct FailingTransaction<'a> {
    inner: Box<dyn StoreTransaction + 'a>,
    seen: usize,
}

impl ProductStore for FailingStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin()?,
            seen: 0,
        }))
    }

    fn list_products(&self) -> Result<Vec<StoredProduct>, StoreError> {
        self.inner.list_products()
    }
}

impl StoreTransaction for FailingTransaction<'_> {
    fn insert(&mut self, record: &ProductRecord) -> Result<i64, StoreError> {
        self.seen += 1;
        if self.seen == 2 {
            return Err(StoreError::Unavailable("database is locked".into()));
        }
        self.inner.insert(record)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.commit()
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_persists_rows_and_reports_counts() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;

    let (status, body) = upload_csv(server.addr, &hardware_csv()).await;

    assert_eq!(status, 200, "body: {body}");
    assert_eq!(body["message"], "Upload successful");
    assert_eq!(body["parsedRows"], 8);
    assert_eq!(body["inserted"], 8);
    assert_eq!(body["blankRows"], 0);
    assert_eq!(body["rejected"].as_array().map(Vec::len), Some(0));
    assert_eq!(products(server.addr).await.len(), 8);
    assert_eq!(spooled_files(server.upload_dir.path()), 0);
}

#[tokio::test]
async fn duplicate_sku_is_reported_but_upload_succeeds() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    let csv = format!("{HEADER}\nHammer,HM-1,Tools,5,9,10\nHammer 2,HM-1,Tools,5,9,10\nSaw,SW-1,Tools,12,20,4\n");

    let (status, body) = upload_csv(server.addr, &csv).await;

    assert_eq!(status, 200);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["rejected"][0]["row"], 2);
    assert_eq!(body["rejected"][0]["sku"], "HM-1");
    let skus: Vec<String> = products(server.addr)
        .await
        .iter()
        .map(|p| p["sku"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(skus, vec!["HM-1", "SW-1"]);
}

#[tokio::test]
async fn non_numeric_price_becomes_zero_profit_reflects_it() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    let csv = format!("{HEADER}\nMystery Box,MYS-1,Misc,10,abc,2\n");

    let (status, _) = upload_csv(server.addr, &csv).await;
    assert_eq!(status, 200);

    let listed = products(server.addr).await;
    assert_eq!(listed[0]["sellingPrice"], 0.0);
    assert_eq!(listed[0]["profit"], -10.0);
    assert_eq!(listed[0]["category"], "Misc");
    assert!(listed[0]["uploadDate"].is_string());
    assert!(listed[0]["id"].is_i64());
}

#[tokio::test]
async fn non_csv_upload_is_unsupported_media_type() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;

    let (status, body) =
        post_file(server.addr, "/api/upload", "stock.txt", "text/plain", "hello").await;

    assert_eq!(status, 415);
    assert!(body["error"].as_str().unwrap_or_default().contains("CSV"));
    assert!(products(server.addr).await.is_empty());
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    let body = multipart_body("attachment", "inventory.csv", "text/csv", &hardware_csv());
    let ct = format!("multipart/form-data; boundary={BOUNDARY}");

    let (status, _, body) = send_raw(server.addr, "POST", "/api/upload", Some(&ct), &body).await;

    assert_eq!(status, 400);
    assert!(body.contains("No file uploaded"));
}

#[tokio::test]
async fn missing_required_header_is_bad_request() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;

    let (status, body) = upload_csv(server.addr, "Name,Code\nHammer,HM-1\n").await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap_or_default().contains("SKU"));
    assert!(products(server.addr).await.is_empty());
    assert_eq!(spooled_files(server.upload_dir.path()), 0);
}

#[tokio::test]
async fn strict_policy_rejects_with_row_details() {
    let server = start_sqlite(ValidationPolicy::Strict).await;
    let csv = format!("{HEADER}\nHammer,HM-1,Tools,5,9,10\nSaw,,Tools,x,20,4\n");

    let (status, body) = upload_csv(server.addr, &csv).await;

    assert_eq!(status, 422);
    assert_eq!(
        body["details"],
        serde_json::json!(["Row 2: SKU is required", "Row 2: Invalid Purchase Price"])
    );
    assert!(products(server.addr).await.is_empty());
}

#[tokio::test]
async fn store_failure_is_opaque_500_and_rolls_back() {
    let store = Arc::new(FailingStore {
        inner: MemoryProductStore::new(),
    });
    let server = start(store, ValidationPolicy::Lenient).await;

    let (status, body) = upload_csv(server.addr, &hardware_csv()).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Upload failed");
    assert!(products(server.addr).await.is_empty());
    assert_eq!(spooled_files(server.upload_dir.path()), 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected_and_not_spooled() {
    let store = SqliteProductStore::open_in_memory().expect("sqlite store");
    let server = start_with(
        Arc::new(store),
        ServerConfig {
            max_upload_bytes: 256,
            ..ServerConfig::default()
        },
    )
    .await;
    let mut csv = format!("{HEADER}\n");
    for i in 0..100 {
        csv.push_str(&format!("Bolt {i},BLT-{i:03},Fasteners,1,2,50\n"));
    }
    assert!(csv.len() > 2_000);

    let (status, body) = upload_csv(server.addr, &csv).await;

    assert_eq!(status, 413);
    assert_eq!(body["error"], "File exceeds the upload size limit");
    assert!(products(server.addr).await.is_empty());
    assert_eq!(spooled_files(server.upload_dir.path()), 0);
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_reports_issues_without_persisting() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    let csv = format!("{HEADER}\n,HM-1,Tools,5,9,ten\n");

    let (status, body) =
        post_file(server.addr, "/api/validate", "inventory.csv", "text/csv", &csv).await;

    assert_eq!(status, 200);
    assert_eq!(body["valid"], false);
    assert_eq!(body["rowCount"], 1);
    assert_eq!(
        body["errors"],
        serde_json::json!(["Row 1: Product Name is required", "Row 1: Invalid Stock Quantity"])
    );
    assert!(products(server.addr).await.is_empty());
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_derives_all_views() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    upload_csv(server.addr, &hardware_csv()).await;

    let (status, _, body) = get(server.addr, "/api/dashboard").await;
    assert_eq!(status, 200);
    let view: Value = serde_json::from_str(&body).expect("dashboard json");

    let top: Vec<&str> = view["topProfit"]
        .as_array()
        .expect("topProfit")
        .iter()
        .filter_map(|p| p["sku"].as_str())
        .collect();
    assert_eq!(top, vec!["DRL-100", "SW-010", "PNT-500", "HM-001", "GRD-310"]);

    assert_eq!(
        view["categories"],
        serde_json::json!([
            {"category": "Tools", "count": 3},
            {"category": "Paint", "count": 3},
            {"category": "Garden", "count": 2},
        ])
    );

    let low: Vec<u64> = view["lowStock"]
        .as_array()
        .expect("lowStock")
        .iter()
        .filter_map(|p| p["stockQuantity"].as_u64())
        .collect();
    assert_eq!(low, vec![2, 3, 6, 9]);

    assert_eq!(view["summary"]["totalProducts"], 8);
    assert_eq!(view["summary"]["lowStockCount"], 4);
    assert_eq!(view["summary"]["totalProfit"], 129.0);
}

#[tokio::test]
async fn dashboard_honors_query_overrides() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    upload_csv(server.addr, &hardware_csv()).await;

    let (status, _, body) = get(server.addr, "/api/dashboard?top=2&threshold=4").await;
    assert_eq!(status, 200);
    let view: Value = serde_json::from_str(&body).expect("dashboard json");
    assert_eq!(view["topProfit"].as_array().map(Vec::len), Some(2));
    assert_eq!(view["lowStock"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn dashboard_rejects_malformed_query_as_json() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;

    let (status, _, body) = get(server.addr, "/api/dashboard?top=many").await;

    assert_eq!(status, 400);
    let error: Value = serde_json::from_str(&body).expect("error json");
    assert!(error["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Invalid query"));
}

#[tokio::test]
async fn dashboard_of_empty_store_is_empty() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    let (status, _, body) = get(server.addr, "/api/dashboard").await;
    assert_eq!(status, 200);
    let view: Value = serde_json::from_str(&body).expect("dashboard json");
    assert_eq!(view["summary"]["totalProducts"], 0);
    assert_eq!(view["topProfit"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Template, health, CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn template_downloads_as_csv_attachment() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;

    let (status, head, body) = get(server.addr, "/api/template").await;

    assert_eq!(status, 200);
    let head = head.to_ascii_lowercase();
    assert!(head.contains("content-type: text/csv"));
    assert!(head.contains("inventory_template.csv"));
    assert_eq!(body, csv_template());
}

#[tokio::test]
async fn uploaded_template_yields_example_product() {
    let server = start_sqlite(ValidationPolicy::Strict).await;

    let (status, body) = upload_csv(server.addr, &csv_template()).await;
    assert_eq!(status, 200);
    assert_eq!(body["inserted"], 1);

    let listed = products(server.addr).await;
    assert_eq!(listed[0]["name"], "Example Product");
    assert_eq!(listed[0]["sku"], "SKU123");
    assert_eq!(listed[0]["profit"], 50.0);
}

#[tokio::test]
async fn healthz_is_ok() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;
    let (status, _, body) = get(server.addr, "/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let server = start_sqlite(ValidationPolicy::Lenient).await;

    let (status, head, _) = send_raw(server.addr, "OPTIONS", "/api/upload", None, b"").await;

    assert_eq!(status, 204);
    assert!(head
        .to_ascii_lowercase()
        .contains("access-control-allow-origin: *"));
}
