use crate::{Error, Result};
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

pub const DEFAULT_PORT: u16 = 5000;
pub const HEALTH_BODY: &str = "Bot is running!";

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Liveness endpoint: `GET /` answers 200, everything else 404
pub struct HealthServer {
    listener: TcpListener,
}

impl HealthServer {
    /// Bind on all interfaces; port 0 picks a free port
    pub async fn bind(port: u16) -> Result<Self> {
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind {}: {}", addr, e)))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` completes
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!("✓ Health endpoint listening on http://{}", addr);

        let listener = &self.listener;
        accept_loop(
            move || listener.accept(),
            |stream: tokio::net::TcpStream, peer: SocketAddr| {
                tokio::spawn(async move {
                    let service =
                        service_fn(|req| async move { Ok::<_, Infallible>(respond(&req)) });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!("Health connection from {} failed: {}", peer, e);
                    }
                });
            },
            shutdown,
        )
        .await;

        tracing::info!("Health endpoint stopped");
        Ok(())
    }
}

/// Hand every accepted connection to `handle` until `shutdown` completes.
/// Accept errors are logged and never end the loop.
async fn accept_loop<C, A, Fut, H, F>(mut accept: A, mut handle: H, shutdown: F)
where
    A: FnMut() -> Fut,
    Fut: Future<Output = io::Result<(C, SocketAddr)>>,
    H: FnMut(C, SocketAddr),
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let accepted = tokio::select! {
            accepted = accept() => accepted,
            _ = &mut shutdown => break,
        };

        match accepted {
            Ok((conn, peer)) => handle(conn, peer),
            Err(e) => {
                tracing::warn!("Health endpoint failed to accept a connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

fn respond<B>(req: &Request<B>) -> Response<Full<Bytes>> {
    let (status, body) = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => (StatusCode::OK, HEALTH_BODY),
        _ => (StatusCode::NOT_FOUND, "Not Found"),
    };

    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}
