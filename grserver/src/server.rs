//! # Module Server - API de haut niveau pour Axum
//!
//! Ce module fournit une abstraction simple pour le serveur web du device :
//! routage, démarrage avec port éphémère, et arrêt gracieux.
//!
//! ## Fonctionnalités
//!
//! - 🚀 **Routes JSON simples** : Ajoutez des endpoints avec `add_route()`
//! - 🎯 **Handlers personnalisés** : `add_handler()`, `add_router()`
//! - ⚡ **Arrêt gracieux** : SIGINT/SIGTERM ou demande explicite via `shutdown()`
//! - 🔌 **Port éphémère** : `port = 0` laisse l'OS choisir, `start()` retourne l'adresse liée

use axum::handler::Handler;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Info serveur sérialisable
#[derive(Clone, Serialize)]
pub struct ServerInfo {
    /// Nom du serveur
    pub name: String,
    /// URL de base
    pub base_url: String,
    /// Port HTTP effectivement lié
    pub http_port: u16,
}

/// Serveur principal
pub struct Server {
    name: String,
    host: String,
    http_port: u16,
    bound_addr: Option<SocketAddr>,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl Server {
    /// Crée une nouvelle instance de serveur.
    ///
    /// # Arguments
    ///
    /// * `name` - Nom du serveur (pour les logs)
    /// * `host` - Adresse IP locale à lier (ex: "192.168.1.42")
    /// * `http_port` - Port HTTP à écouter (0 = éphémère)
    pub fn new(name: impl Into<String>, host: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            http_port,
            bound_addr: None,
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Ajoute une route JSON dynamique.
    ///
    /// Crée un endpoint GET qui retourne du JSON. La closure fournie sera
    /// appelée à chaque requête.
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// # use grserver::Server;
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let mut server = Server::new("Test", "127.0.0.1", 3000);
    /// server.add_route("/info", || async {
    ///     serde_json::json!({"status": "online"})
    /// }).await;
    /// # }
    /// ```
    pub async fn add_route<F, Fut, T>(&mut self, path: &str, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = T> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let f = Arc::new(f);

        let handler = {
            let f = f.clone();
            move || {
                let f = f.clone();
                async move { Json(f().await) }
            }
        };

        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).route(path, get(handler));
    }

    /// Fusionne un router Axum complet dans le router principal.
    ///
    /// Les chemins du router fourni doivent être absolus.
    pub async fn add_router(&mut self, route: Router) {
        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).merge(route);
    }

    /// Ajoute un handler Axum GET sur un chemin précis.
    pub async fn add_handler<H, T>(&mut self, path: &str, handler: H)
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).route(path, get(handler));
    }

    /// Démarre le serveur HTTP.
    ///
    /// Lie l'adresse configurée (port 0 accepté : l'OS choisit), lance la
    /// boucle de service et installe la gestion SIGINT/SIGTERM pour un
    /// arrêt gracieux.
    ///
    /// # Returns
    ///
    /// L'adresse effectivement liée (utile avec un port éphémère).
    pub async fn start(&mut self) -> std::io::Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;
        self.bound_addr = Some(bound);

        info!("Server {} running at http://{}", self.name, bound);

        let router = self.router.clone();
        let shutdown = self.shutdown.clone();

        self.join_handle = Some(tokio::spawn(async move {
            let r = router.read().await.clone();
            let serve = axum::serve(listener, r.into_make_service())
                .with_graceful_shutdown(wait_for_shutdown(shutdown));
            if let Err(e) = serve.await {
                tracing::error!("HTTP server error: {e}");
            }
        }));

        Ok(bound)
    }

    /// Demande l'arrêt du serveur (équivalent programmatique de Ctrl+C).
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Attend la fin du serveur (signal ou `shutdown()`).
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    /// URL de base du serveur (`http://host:port`).
    ///
    /// Après `start()`, reflète le port réellement lié.
    pub fn base_url(&self) -> String {
        match self.bound_addr {
            Some(addr) => format!("http://{addr}"),
            None => format!("http://{}:{}", self.host, self.http_port),
        }
    }

    /// Récupère les infos du serveur.
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            base_url: self.base_url(),
            http_port: self.bound_addr.map(|a| a.port()).unwrap_or(self.http_port),
        }
    }
}

/// Se résout quand un signal d'arrêt arrive ou que le token est annulé.
async fn wait_for_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
        _ = token.cancelled() => info!("shutdown requested"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ephemeral_bind_reports_port() {
        let mut server = Server::new("Test", "127.0.0.1", 0);
        server
            .add_route("/info", || async { serde_json::json!({"ok": true}) })
            .await;

        let addr = server.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.info().http_port, addr.port());
        assert_eq!(server.base_url(), format!("http://{addr}"));

        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn test_routes_are_served() {
        let mut server = Server::new("Test", "127.0.0.1", 0);
        server
            .add_handler("/ping", || async { "pong" })
            .await;

        let addr = server.start().await.unwrap();

        let body = http_get(addr, "/ping").await;
        assert_eq!(body, "pong");

        server.shutdown();
        server.wait().await;
    }

    /// GET minimal sur une socket locale, sans dépendance client HTTP.
    async fn http_get(addr: SocketAddr, path: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(req.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        let text = String::from_utf8_lossy(&buf);
        text.split("\r\n\r\n").nth(1).unwrap_or("").to_string()
    }
}
