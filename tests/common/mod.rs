//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use portfolio_guard::config::GuardConfig;
use portfolio_guard::contact::MemoryInbox;
use portfolio_guard::http::HttpServer;
use portfolio_guard::lifecycle::Shutdown;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A running server plus handles to observe and steer it.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub inbox: Arc<MemoryInbox>,
    pub config_tx: mpsc::UnboundedSender<GuardConfig>,
    pub shutdown: Shutdown,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// The origin browsers would send for pages served by this server.
    #[allow(dead_code)]
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a server on an ephemeral port with an in-memory inbox.
pub async fn start_server(config: GuardConfig) -> TestServer {
    let inbox = Arc::new(MemoryInbox::new());
    let server = HttpServer::with_sink(config, inbox.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (config_tx, config_updates) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        inbox,
        config_tx,
        shutdown,
    }
}

/// Client that neither follows redirects nor uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// A valid contact form body.
#[allow(dead_code)]
pub fn contact_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "subject": "Collaboration",
        "message": "I enjoyed your article on analytical engines."
    })
}
