//! End-to-end tests for the HTTP collaborators.
//!
//! Serves canned JSON per route from an axum app on a local port, then
//! drives the resolver and address helpers through it.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use peer_select::{ClientConfig, DeviceClient, HttpRegistry};
use peer_select_core::{
    create_address, delete_address, AddressError, AddressQuery, AddressResolver,
    FacilityDirectory, NewAddress, RegistryKind, RemoteCatalog, Resolution, ResolveError,
};
use tokio::net::TcpListener;

/// Canned response for requests whose target contains `pattern`.
#[derive(Clone)]
struct Route {
    method: Method,
    pattern: &'static str,
    status: StatusCode,
    body: String,
    delay_ms: u64,
}

fn route(method: Method, pattern: &'static str, status: u16, body: &str) -> Route {
    Route {
        method,
        pattern,
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        delay_ms: 0,
    }
}

/// A request as seen by the test server.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: String,
}

impl Recorded {
    fn bypasses_cache(&self) -> bool {
        self.headers
            .get(CACHE_CONTROL)
            .is_some_and(|v| v.as_bytes() == b"no-cache")
    }
}

struct ServerState {
    routes: Vec<Route>,
    requests: Mutex<Vec<Recorded>>,
}

struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl TestServer {
    async fn start(routes: Vec<Route>) -> Self {
        let state = Arc::new(ServerState {
            routes,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .fallback(respond)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    fn client(&self) -> DeviceClient {
        let config = ClientConfig::default()
            .with_device_url(self.url())
            .with_request_timeout(Duration::from_millis(500));
        DeviceClient::new(&config).unwrap()
    }

    fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    fn requests_matching(&self, needle: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.target.contains(needle))
            .collect()
    }
}

/// Record the request, then answer with the first route matching method and target.
async fn respond(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        target: target.clone(),
        headers,
        body,
    });

    let matched = state
        .routes
        .iter()
        .find(|r| r.method == method && target.contains(r.pattern))
        .cloned()
        .unwrap_or_else(|| route(method, "", 404, r#"{"detail": "Not found."}"#));

    if matched.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(matched.delay_ms)).await;
    }

    (matched.status, [(CONTENT_TYPE, "application/json")], matched.body).into_response()
}

const LOCATIONS: &str = r#"[
    {"id": "loc-a", "nickname": "A", "base_url": "http://peer-a/", "available": true,
     "subset_of_users_device": false, "kolibri_version": "1.2.0"},
    {"id": "loc-b", "nickname": "B", "base_url": "http://peer-b/", "available": false,
     "subset_of_users_device": false, "kolibri_version": "0.16.0"},
    {"id": "loc-c", "nickname": "C", "base_url": "http://peer-c/", "available": true,
     "subset_of_users_device": false, "kolibri_version": "0.10.0"}
]"#;

fn resolver(server: &TestServer, kind: RegistryKind) -> AddressResolver<HttpRegistry> {
    let client = server.client();
    let catalog: Arc<dyn RemoteCatalog> = Arc::new(client.clone());
    let facilities: Arc<dyn FacilityDirectory> = Arc::new(client.clone());
    AddressResolver::new(HttpRegistry::new(client, kind), catalog, facilities)
}

fn flags(resolution: Resolution) -> Vec<(String, bool)> {
    match resolution {
        Resolution::Annotated(list) => list
            .into_iter()
            .map(|l| (l.location.id, l.has_content))
            .collect(),
        Resolution::Eligible(_) => panic!("expected annotated resolution"),
    }
}

#[tokio::test]
async fn test_channel_resolution_over_http() {
    let server = TestServer::start(vec![
        route(Method::GET, "/api/discovery/staticnetworklocation/", 200, LOCATIONS),
        route(
            Method::GET,
            "remotechannel/chan-1/?baseurl=http%3A%2F%2Fpeer-a",
            200,
            r#"{"id": "chan-1", "name": "Science"}"#,
        ),
        route(
            Method::GET,
            "remotechannel/chan-1/?baseurl=http%3A%2F%2Fpeer-c",
            404,
            r#"{"detail": "Not found."}"#,
        ),
    ])
    .await;

    let result = resolver(&server, RegistryKind::Static)
        .resolve(&AddressQuery::channel("chan-1"))
        .await
        .unwrap();

    assert_eq!(
        flags(result),
        vec![
            ("loc-a".to_string(), true),
            ("loc-b".to_string(), false),
            ("loc-c".to_string(), false),
        ]
    );

    // Unavailable peer B is never probed
    let probes = server.requests_matching("remotechannel");
    assert_eq!(probes.len(), 2);
    assert!(probes.iter().all(|r| !r.target.contains("peer-b")));
    assert!(probes.iter().all(Recorded::bypasses_cache));

    let registry = server.requests_matching("staticnetworklocation");
    assert_eq!(registry.len(), 1);
    assert!(registry[0].bypasses_cache());
    assert!(!registry[0].target.contains("subset_of_users_device"));
}

#[tokio::test]
async fn test_facility_resolution_requests_subset_filter() {
    let server = TestServer::start(vec![
        route(Method::GET, "/api/discovery/dynamicnetworklocation/", 200, LOCATIONS),
        route(
            Method::GET,
            "networklocation_facilities/loc-a/",
            200,
            r#"{"facilities": [{"id": "fac-1", "name": "School"}]}"#,
        ),
        route(
            Method::GET,
            "networklocation_facilities/loc-c/",
            200,
            r#"{"facilities": [{"id": "fac-2", "name": "Other"}]}"#,
        ),
    ])
    .await;

    let result = resolver(&server, RegistryKind::Dynamic)
        .resolve(&AddressQuery::facility("fac-1"))
        .await
        .unwrap();

    assert_eq!(
        flags(result),
        vec![
            ("loc-a".to_string(), true),
            ("loc-b".to_string(), false),
            ("loc-c".to_string(), false),
        ]
    );

    let registry = server.requests_matching("dynamicnetworklocation");
    assert_eq!(registry.len(), 1);
    assert!(registry[0].target.ends_with("?subset_of_users_device=false"));
}

#[tokio::test]
async fn test_local_discovery_over_http() {
    let server = TestServer::start(vec![route(
        Method::GET,
        "/api/discovery/dynamicnetworklocation/",
        200,
        LOCATIONS,
    )])
    .await;

    let result = resolver(&server, RegistryKind::Dynamic)
        .resolve(&AddressQuery::LocalDiscovery)
        .await
        .unwrap();

    assert_eq!(result.ids(), vec!["loc-a", "loc-b"]);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_slow_peer_times_out_to_false() {
    let mut slow = route(
        Method::GET,
        "remotechannel/chan-1/?baseurl=http%3A%2F%2Fpeer-a",
        200,
        r#"{"id": "chan-1"}"#,
    );
    slow.delay_ms = 2_000;

    let server = TestServer::start(vec![
        route(Method::GET, "/api/discovery/staticnetworklocation/", 200, LOCATIONS),
        slow,
        route(
            Method::GET,
            "remotechannel/chan-1/?baseurl=http%3A%2F%2Fpeer-c",
            200,
            r#"{"id": "chan-1"}"#,
        ),
    ])
    .await;

    let result = resolver(&server, RegistryKind::Static)
        .with_channel("chan-1")
        .await
        .unwrap();

    let flags: Vec<_> = result.iter().map(|l| l.has_content).collect();
    assert_eq!(flags, vec![false, false, true]);
}

#[tokio::test]
async fn test_malformed_probe_response_is_false() {
    let server = TestServer::start(vec![
        route(Method::GET, "/api/discovery/staticnetworklocation/", 200, LOCATIONS),
        route(Method::GET, "networklocation_facilities/", 200, "<html>oops</html>"),
    ])
    .await;

    let result = resolver(&server, RegistryKind::Static)
        .with_facility("fac-1")
        .await
        .unwrap();

    assert!(result.iter().all(|l| !l.has_content));
}

#[tokio::test]
async fn test_registry_error_fails_resolution() {
    let server = TestServer::start(vec![route(
        Method::GET,
        "/api/discovery/staticnetworklocation/",
        500,
        r#"{"detail": "boom"}"#,
    )])
    .await;

    let result = resolver(&server, RegistryKind::Static)
        .resolve(&AddressQuery::Any)
        .await;

    assert!(matches!(result, Err(ResolveError::Registry(_))));
}

#[tokio::test]
async fn test_unreachable_device_fails_resolution() {
    // Bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::default().with_device_url(format!("http://{addr}/"));
    let client = DeviceClient::new(&config).unwrap();
    let resolver = AddressResolver::new(
        HttpRegistry::new(client.clone(), RegistryKind::Static),
        Arc::new(client.clone()),
        Arc::new(client),
    );

    let result = resolver.resolve(&AddressQuery::channel("chan-1")).await;
    assert!(matches!(result, Err(ResolveError::Registry(_))));
}

#[tokio::test]
async fn test_create_and_delete_address() {
    let server = TestServer::start(vec![
        route(
            Method::POST,
            "/api/discovery/staticnetworklocation/",
            201,
            r#"{"id": "new-1", "nickname": "Lab", "base_url": "http://10.0.0.9:8080/",
                "available": true, "subset_of_users_device": false, "kolibri_version": "0.16.0"}"#,
        ),
        route(Method::DELETE, "/api/discovery/staticnetworklocation/new-1/", 204, ""),
    ])
    .await;
    let client = server.client();

    let address = NewAddress {
        base_url: "http://10.0.0.9:8080/".into(),
        nickname: "Lab".into(),
    };
    let created = create_address(&client, &address).await.unwrap();
    assert_eq!(created.id, "new-1");

    delete_address(&client, "new-1").await.unwrap();

    let missing = delete_address(&client, "gone").await;
    assert!(matches!(missing, Err(AddressError::NotFound(_))));

    let requests = server.requests();
    let post = requests.iter().find(|r| r.method == Method::POST).unwrap();
    let body: serde_json::Value = serde_json::from_str(&post.body).unwrap();
    assert_eq!(body["base_url"], "http://10.0.0.9:8080/");
    assert_eq!(body["device_name"], "Lab");
    assert!(requests.iter().any(|r| r.method == Method::DELETE && r.target.contains("new-1")));
}
