// Shared bootstrap and helpers for dispatch server integration tests.
use futures::StreamExt;
use serde_json::Value;
use std::{
    net::SocketAddr,
    sync::{OnceLock, mpsc},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

// Client half of a staff socket as the tests see it.
pub type StaffSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Base URL of the one server every test in this binary talks to.
static BASE_URL: OnceLock<String> = OnceLock::new();

// Start the dispatch server on first use and return its base URL.
pub fn ensure_server() -> &'static str {
    BASE_URL.get_or_init(|| {
        // The server thread reports the port it bound back over this channel.
        let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();

        // A dedicated thread and runtime keep the server alive across `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Port 0 lets the OS pick a free port.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                addr_tx.send(addr).expect("test thread waits for the address");
                dispatch_server::run(listener).await.expect("server failed");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("server should bind in time");
        wait_until_accepting(addr);
        format!("http://{addr}")
    })
}

// Poll the listener until a plain TCP connect succeeds.
fn wait_until_accepting(addr: SocketAddr) {
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

// Unique staff id so tests sharing one server never see each other's offers.
pub fn staff_id(label: &str) -> String {
    format!("{label}-{}", uuid::Uuid::new_v4())
}

// Open a staff socket; the server registers it and re-pushes open offers.
pub async fn connect_staff(base_url: &str, staff_id: &str) -> StaffSocket {
    let ws_url = format!(
        "{}/ws?staffId={staff_id}",
        base_url.replacen("http://", "ws://", 1)
    );
    let (socket, _) = connect_async(ws_url)
        .await
        .expect("websocket handshake should succeed");
    socket
}

// Read frames until the next JSON text event, failing after a short wait.
pub async fn next_event(socket: &mut StaffSocket) -> Value {
    let read = async {
        while let Some(frame) = socket.next().await {
            match frame.expect("websocket frame") {
                Message::Text(text) => {
                    return serde_json::from_str(text.as_str()).expect("json event");
                }
                Message::Close(_) => panic!("socket closed while waiting for an event"),
                _ => continue,
            }
        }
        panic!("socket ended while waiting for an event");
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("event should arrive in time")
}

// Create an offer for `ORD-IT` through the HTTP API and return its id.
pub async fn create_assignment(
    client: &reqwest::Client,
    base_url: &str,
    candidates: &[&str],
    timeout_ms: u64,
) -> String {
    let payload = serde_json::json!({
        "order": {
            "tableNumber": 8,
            "orderNumber": "ORD-IT",
            "items": [{ "name": "Lemonade", "quantity": 2 }]
        },
        "candidateStaffIds": candidates,
        "timeoutMs": timeout_ms,
    });
    let res = client
        .post(format!("{base_url}/assignments"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let body: Value = res.json().await.expect("json body");
    body["assignmentId"]
        .as_str()
        .expect("assignment id")
        .to_string()
}
