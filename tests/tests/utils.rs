#![allow(unused)]
use metrics_exporter_prometheus::PrometheusBuilder;
pub use mock_backend::client::HttpBackend;
use std::net::{SocketAddr, TcpStream};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

pub const MOCK_ADDR: &str = "127.0.0.1:3002";
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Set up logging, metrics and the shared mock backend once per test binary.
///
/// The mock backend runs on its own thread and runtime, so it outlives the runtime of
/// whichever test happened to call this first.
pub async fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
            std::process::exit(1);
        }));

        FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_env_filter("assay=trace,mock_backend=debug,axum::rejection=trace")
            .init();

        std::thread::Builder::new()
            .name("mock-backend".to_string())
            .spawn(|| {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                runtime.block_on(async {
                    PrometheusBuilder::new()
                        .with_http_listener("0.0.0.0:8002".parse::<SocketAddr>().unwrap())
                        .install()
                        .unwrap();

                    if let Err(err) = mock_backend::run(mock_addr()).await {
                        error!("Mock backend exited: {err:?}");
                    }
                });
            })
            .unwrap();

        wait_for_backend();
    });
}

pub fn mock_addr() -> SocketAddr {
    MOCK_ADDR.parse().unwrap()
}

/// Client for `route` on the shared mock backend.
pub fn backend(route: &str) -> HttpBackend {
    HttpBackend::new(mock_addr(), route)
}

fn wait_for_backend() {
    let start = Instant::now();
    while TcpStream::connect(mock_addr()).is_err() {
        assert!(
            start.elapsed() < READY_TIMEOUT,
            "mock backend did not start listening on {MOCK_ADDR}"
        );
        std::thread::sleep(Duration::from_millis(10));
    }
}
