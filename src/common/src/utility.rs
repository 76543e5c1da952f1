use tokio::{net::UdpSocket, signal, sync::broadcast};
use tracing::info;

/// Broadcast channel that fires once on ctrl-c. Every long-running task
/// resubscribes to it.
pub async fn create_shutdown_channel() -> broadcast::Receiver<()> {
    let (shutdown_sender, shutdown_receiver): (broadcast::Sender<()>, broadcast::Receiver<()>) =
        broadcast::channel::<()>(100);
    tokio::spawn(async move {
        shutdown_signal().await;
        if shutdown_sender.send(()).is_err() {
            info!("Shutdown requested but nothing is listening");
        }
    });
    shutdown_receiver
}

// Source: https://pg3.dev/post/7
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}

/// A free local port, for in-process test servers.
pub async fn random_address() -> String {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("Failed to get random port");
    socket
        .local_addr()
        .expect("Failed to unwrap local address")
        .to_string()
}
