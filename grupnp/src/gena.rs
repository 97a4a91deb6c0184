//! # Module GENA - Abonnements aux événements UPnP
//!
//! Gère les abonnements SUBSCRIBE/UNSUBSCRIBE des control points et la
//! notification des changements de variables d'état.
//!
//! ## Fonctionnalités
//!
//! - ✅ Souscription avec émission de SID et timeout
//! - ✅ Renouvellement et désabonnement
//! - ✅ Événement initial avec l'état courant (SEQ 0)
//! - ✅ Notifier périodique qui vide le buffer des changements
//!
//! Les NOTIFY sortants partent en tâche de fond (reqwest), un abonné lent
//! ne bloque jamais le traitement d'une action.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

/// Méthodes HTTP pour les événements UPnP.
pub const METHOD_SUBSCRIBE: &str = "SUBSCRIBE";
pub const METHOD_UNSUBSCRIBE: &str = "UNSUBSCRIBE";

/// Timeout par défaut d'un abonnement.
const DEFAULT_TIMEOUT: &str = "Second-1800";

/// Abonnements et notifications d'un service UPnP.
pub struct SubscriptionStore {
    /// Nom du service (ex: "AVTransport")
    service_name: String,

    /// Abonnés (SID -> Callback URL)
    subscribers: RwLock<HashMap<String, String>>,

    /// Dernière valeur connue des variables notifiées
    snapshot: Mutex<HashMap<String, String>>,

    /// Buffer des changements en attente de notification
    changed_buffer: Mutex<HashMap<String, String>>,

    /// Compteurs de séquence par abonné
    seqid: Mutex<HashMap<String, u32>>,
}

impl SubscriptionStore {
    /// Crée un store vide pour un service nommé.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            subscribers: RwLock::new(HashMap::new()),
            snapshot: Mutex::new(HashMap::new()),
            changed_buffer: Mutex::new(HashMap::new()),
            seqid: Mutex::new(HashMap::new()),
        }
    }

    /// Nom du service couvert par ce store.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Ajoute un abonné.
    pub fn add_subscriber(&self, sid: String, callback: String) {
        let mut subscribers = self.subscribers.write().unwrap();
        subscribers.insert(sid, callback);
    }

    /// Renouvelle un abonnement.
    pub fn renew_subscriber(&self, sid: &str, timeout: &str) {
        debug!("Renewed SID {} for timeout {}", sid, timeout);
    }

    /// Supprime un abonné.
    pub fn remove_subscriber(&self, sid: &str) {
        let mut subscribers = self.subscribers.write().unwrap();
        subscribers.remove(sid);
        self.seqid.lock().unwrap().remove(sid);
    }

    /// Nombre d'abonnés actifs.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap().len()
    }

    /// Enregistre un changement de variable à notifier.
    ///
    /// Met aussi à jour l'instantané courant servi aux nouveaux abonnés.
    pub fn variable_changed(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.snapshot
            .lock()
            .unwrap()
            .insert(name.clone(), value.clone());
        self.changed_buffer.lock().unwrap().insert(name, value);
    }

    /// Envoie l'événement initial (SEQ 0) à un nouvel abonné.
    pub fn send_initial_event(&self, sid: String) {
        let callback = {
            let subscribers = self.subscribers.read().unwrap();
            subscribers.get(&sid).cloned()
        };

        let Some(callback) = callback else {
            return;
        };

        let snapshot = self.snapshot.lock().unwrap().clone();
        if snapshot.is_empty() {
            return;
        }

        let service = self.service_name.clone();
        tokio::spawn(async move {
            send_notify(&service, &callback, &sid, "0", snapshot).await;
        });
    }

    /// Récupère le prochain numéro de séquence pour un abonné.
    fn next_seq(&self, sid: &str) -> String {
        let mut seqid = self.seqid.lock().unwrap();
        let counter = seqid.entry(sid.to_string()).or_insert(0);
        *counter += 1;
        counter.to_string()
    }

    /// Notifie tous les abonnés des changements bufferisés.
    pub fn notify_subscribers(&self) {
        let subscribers_copy = {
            let subscribers = self.subscribers.read().unwrap();
            if subscribers.is_empty() {
                return;
            }
            subscribers.clone()
        };

        let changed = {
            let mut buffer = self.changed_buffer.lock().unwrap();
            if buffer.is_empty() {
                return;
            }
            std::mem::take(&mut *buffer)
        };

        for (sid, callback) in subscribers_copy {
            let changed_clone = changed.clone();
            let seq = self.next_seq(&sid);
            let service = self.service_name.clone();

            tokio::spawn(async move {
                send_notify(&service, &callback, &sid, &seq, changed_clone).await;
            });
        }
    }

    /// Démarre le notifier périodique.
    ///
    /// # Returns
    ///
    /// Un handle vers la tâche tokio ; l'appelant l'annule à l'arrêt.
    pub fn start_notifier(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            debug!(
                "Starting {} event notifier every {:?}",
                store.service_name, interval
            );

            loop {
                ticker.tick().await;
                store.notify_subscribers();
            }
        })
    }
}

/// Envoie un NOTIFY GENA à un abonné.
async fn send_notify(
    service: &str,
    callback: &str,
    sid: &str,
    seq: &str,
    changed: HashMap<String, String>,
) {
    let callback = callback.trim().trim_matches(|c| c == '<' || c == '>');

    let mut body = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0">"#.to_string();
    for (name, val) in changed {
        body.push_str(&format!("<e:property><{0}>{1}</{0}></e:property>", name, val));
    }
    body.push_str("</e:propertyset>");

    let client = reqwest::Client::new();
    let method = match reqwest::Method::from_bytes(b"NOTIFY") {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to build NOTIFY method: {e}");
            return;
        }
    };

    match client
        .request(method, callback)
        .header("Content-Type", r#"text/xml; charset="utf-8""#)
        .header("NT", "upnp:event")
        .header("NTS", "upnp:propchange")
        .header("SID", sid)
        .header("SEQ", seq)
        .body(body)
        .send()
        .await
    {
        Ok(resp) => {
            debug!(
                "{} event SEQ={} sent to {}, status={}",
                service,
                seq,
                callback,
                resp.status()
            );
        }
        Err(e) => {
            warn!("Failed to notify {} subscriber {}: {}", service, callback, e);
        }
    }
}

/// Ensemble des stores GENA indexés par nom de service.
pub type GenaServices = Arc<HashMap<String, Arc<SubscriptionStore>>>;

/// Router Axum pour les souscriptions `/virtual/event/{service}`.
pub fn event_router(services: GenaServices) -> Router {
    Router::new()
        .route("/virtual/event/{service}", any(event_sub_handler))
        .with_state(services)
}

/// Handler SUBSCRIBE/UNSUBSCRIBE.
async fn event_sub_handler(
    State(services): State<GenaServices>,
    Path(service): Path<String>,
    headers: HeaderMap,
    req: Request<Body>,
) -> Response {
    let Some(store) = services.get(&service) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let method = req.method().as_str();
    let sid = headers.get("SID").and_then(|v| v.to_str().ok()).unwrap_or("");
    let timeout = headers
        .get("Timeout")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let callback = headers
        .get("Callback")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match method {
        METHOD_SUBSCRIBE => {
            let (response_sid, response_timeout) = if sid.is_empty() {
                // Nouvelle souscription
                let new_sid = format!("uuid:{}", uuid::Uuid::new_v4());
                if !callback.is_empty() {
                    store.add_subscriber(new_sid.clone(), callback.to_string());
                }
                let timeout_val = if timeout.is_empty() {
                    DEFAULT_TIMEOUT
                } else {
                    timeout
                };
                info!(
                    "New {} subscription: SID={}, Callback={}, Timeout={}",
                    service, new_sid, callback, timeout_val
                );

                store.send_initial_event(new_sid.clone());

                (new_sid, timeout_val.to_string())
            } else {
                // Renouvellement
                store.renew_subscriber(sid, timeout);
                (sid.to_string(), timeout.to_string())
            };

            let mut response = StatusCode::OK.into_response();
            let headers = response.headers_mut();
            if let Ok(v) = axum::http::HeaderValue::from_str(&response_sid) {
                headers.insert(axum::http::HeaderName::from_static("sid"), v);
            }
            if let Ok(v) = axum::http::HeaderValue::from_str(&response_timeout) {
                headers.insert(axum::http::HeaderName::from_static("timeout"), v);
            }
            response
        }
        METHOD_UNSUBSCRIBE => {
            if !sid.is_empty() {
                store.remove_subscriber(sid);
                info!("Unsubscribe {} SID={}", service, sid);
            }
            StatusCode::OK.into_response()
        }
        _ => {
            warn!("Unsupported EventSub method: {}", method);
            StatusCode::METHOD_NOT_ALLOWED.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_unsubscribe_bookkeeping() {
        let store = SubscriptionStore::new("AVTransport");
        store.add_subscriber("uuid:sid-1".to_string(), "<http://cp/cb>".to_string());
        assert_eq!(store.subscriber_count(), 1);

        store.remove_subscriber("uuid:sid-1");
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_variable_changed_feeds_snapshot_and_buffer() {
        let store = SubscriptionStore::new("RenderingControl");
        store.variable_changed("Volume", "42");
        store.variable_changed("Volume", "43");

        assert_eq!(
            store.snapshot.lock().unwrap().get("Volume"),
            Some(&"43".to_string())
        );
        assert_eq!(store.changed_buffer.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_seq_increments_per_subscriber() {
        let store = SubscriptionStore::new("AVTransport");
        assert_eq!(store.next_seq("uuid:a"), "1");
        assert_eq!(store.next_seq("uuid:a"), "2");
        assert_eq!(store.next_seq("uuid:b"), "1");
    }

    #[tokio::test]
    async fn test_subscribe_returns_sid_header() {
        use tower::util::ServiceExt;

        let mut map = HashMap::new();
        map.insert(
            "AVTransport".to_string(),
            Arc::new(SubscriptionStore::new("AVTransport")),
        );
        let services: GenaServices = Arc::new(map);
        let router = event_router(services.clone());

        let request = Request::builder()
            .method("SUBSCRIBE")
            .uri("/virtual/event/AVTransport")
            .header("Callback", "<http://127.0.0.1:9/cb>")
            .header("Timeout", "Second-300")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sid = response.headers().get("sid").unwrap().to_str().unwrap();
        assert!(sid.starts_with("uuid:"));
        assert_eq!(
            response.headers().get("timeout").unwrap().to_str().unwrap(),
            "Second-300"
        );
        assert_eq!(services["AVTransport"].subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_event_unknown_service_is_404() {
        use tower::util::ServiceExt;

        let services: GenaServices = Arc::new(HashMap::new());
        let router = event_router(services);

        let request = Request::builder()
            .method("SUBSCRIBE")
            .uri("/virtual/event/Nope")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
