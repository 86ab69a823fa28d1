// Shared primitives for one-time server bootstrapping across integration tests.
use std::{
    collections::HashSet,
    sync::{Arc, OnceLock},
    time::Duration,
};

use async_trait::async_trait;
use playback_server::domain::entities::EpisodeAssetLayout;
use playback_server::domain::ports::ObjectStorage;
use playback_server::interface_adapters::state::{AppState, InMemorySessionStore, SystemClock};

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Bucket objects every test can rely on.
pub const SEEDED_OBJECTS: [&str; 3] = [
    "episodes/ep1/manifest.m3u8",
    "episodes/ep1/enc.key",
    "episodes/ep-partial/manifest.m3u8",
];

// In-process stand-in for the storage bucket; signs with a recognizable fake scheme.
struct SeededStorage {
    objects: HashSet<String>,
}

#[async_trait]
impl ObjectStorage for SeededStorage {
    async fn exists(&self, path: &str) -> Result<bool, String> {
        Ok(self.objects.contains(path))
    }

    fn sign_read_url(
        &self,
        path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<String, String> {
        Ok(format!(
            "https://storage.test/bucket/{path}?X-Goog-Date={signed_at}&X-Goog-Expires={ttl_seconds}"
        ))
    }
}

fn build_state() -> Arc<AppState> {
    Arc::new(AppState {
        sessions: Arc::new(InMemorySessionStore::default()),
        storage: Arc::new(SeededStorage {
            objects: SEEDED_OBJECTS.iter().map(|p| p.to_string()).collect(),
        }),
        clock: Arc::new(SystemClock),
        asset_layout: EpisodeAssetLayout::default(),
    })
}

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                playback_server::run(listener, build_state())
                    .await
                    .expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication and then for the server socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
