//! Cycle de vie du renderer.
//!
//! Assemble les briques dans l'ordre imposé par le démarrage :
//!
//! 1. Initialisation du player (pipeline + threads de surveillance)
//! 2. Génération de l'UDN et chargement des fichiers virtuels
//! 3. Construction des routes HTTP (description, contrôle, événements,
//!    répertoire virtuel)
//! 4. Bind du serveur (port éphémère accepté) puis annonces SSDP
//! 5. Attente du signal d'arrêt, puis cascade de teardown :
//!    deinit du player → byebye SSDP → fin
//!
//! Tout échec avant le point 5 remonte en erreur : le binaire sort en
//! code 1 sans avoir annoncé le device.

use crate::control::control_router;
use crate::device::{DEVICE_TYPE, DeviceIdentity, media_renderer_description};
use crate::dispatcher::SoapDispatcher;
use anyhow::Context;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use grplayer::{GstPlayer, PlayerBackend, PlayerOptions};
use grserver::Server;
use grupnp::gena::{GenaServices, SubscriptionStore, event_router};
use grupnp::ssdp::{SsdpDevice, SsdpServer};
use grupnp::vfs::{VirtualFileStore, virtual_dir_router};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Intervalle de flush des notifications GENA.
const NOTIFY_INTERVAL: Duration = Duration::from_secs(1);

/// Les trois services du MediaRenderer.
const SERVICES: [&str; 3] = ["AVTransport", "RenderingControl", "ConnectionManager"];

/// Configuration complète du renderer.
#[derive(Debug, Clone)]
pub struct RendererOptions {
    /// Nom convivial annoncé aux control points
    pub friendly_name: String,

    /// Interface réseau à utiliser ; `None` = auto-détection
    pub interface_name: Option<String>,

    /// Port TCP du webserver (0 = éphémère)
    pub port: u16,

    /// UUID imposé ; `None` = UUIDv4 généré
    pub uuid: Option<String>,

    /// Répertoire des icônes PNG
    pub icons_dir: PathBuf,

    /// Répertoire des documents SCPD
    pub service_dir: PathBuf,

    /// Options du backend de lecture
    pub player: PlayerOptions,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            friendly_name: "DLNA MediaRenderer".to_string(),
            interface_name: None,
            port: 49494,
            uuid: None,
            icons_dir: PathBuf::from("./icons"),
            service_dir: PathBuf::from("./service"),
            player: PlayerOptions::default(),
        }
    }
}

/// Charge les cinq fichiers virtuels du device.
///
/// Appelé avant le bind du serveur : aucun GET ne peut arriver sur un
/// catalogue incomplet.
pub fn load_virtual_files(
    store: &mut VirtualFileStore,
    icons_dir: &Path,
    service_dir: &Path,
) -> anyhow::Result<()> {
    let entries = [
        (
            icons_dir.join("grender-64x64.png"),
            "/virtual/grender-64x64.png",
            "image/png",
        ),
        (
            icons_dir.join("grender-128x128.png"),
            "/virtual/grender-128x128.png",
            "image/png",
        ),
        (
            service_dir.join("AVTransport.xml"),
            "/virtual/AVTransport.xml",
            "text/xml",
        ),
        (
            service_dir.join("RenderingControl.xml"),
            "/virtual/RenderingControl.xml",
            "text/xml",
        ),
        (
            service_dir.join("ConnectionManager.xml"),
            "/virtual/ConnectionManager.xml",
            "text/xml",
        ),
    ];

    for (real_path, virtual_path, content_type) in entries {
        store
            .register(&real_path, virtual_path, content_type)
            .with_context(|| format!("failed to load {}", real_path.display()))?;
    }

    Ok(())
}

/// Normalise un UUID fourni ou en génère un.
fn resolve_udn(uuid: &Option<String>) -> String {
    let raw = match uuid {
        Some(value) => value.trim().trim_start_matches("uuid:").to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    };
    format!("uuid:{raw}")
}

/// En-tête SERVER des annonces SSDP.
fn server_header() -> String {
    format!(
        "{} UPnP/1.0 GRender/{}",
        grutils::get_os_string(),
        env!("CARGO_PKG_VERSION")
    )
}

/// Démarre le renderer et bloque jusqu'au signal d'arrêt.
pub async fn run(options: RendererOptions) -> anyhow::Result<()> {
    info!("===== Starting DLNA Media Renderer =====");

    // Player d'abord : un pipeline qui ne se construit pas est fatal
    let player =
        Arc::new(GstPlayer::init(&options.player).context("failed to initialize player")?);

    let identity = DeviceIdentity {
        udn: resolve_udn(&options.uuid),
        friendly_name: options.friendly_name.clone(),
        interface: options.interface_name.clone(),
        port: options.port,
    };
    info!("Device UDN: {}", identity.udn);

    let mut store = VirtualFileStore::new();
    load_virtual_files(&mut store, &options.icons_dir, &options.service_dir)
        .context("failed to load virtual files")?;
    let store = Arc::new(store);

    let description_xml = media_renderer_description(&identity)
        .to_xml_string()
        .context("failed to generate device description")?;

    // Stores GENA + notifiers périodiques
    let mut services = HashMap::new();
    for name in SERVICES {
        services.insert(name.to_string(), Arc::new(SubscriptionStore::new(name)));
    }
    let services: GenaServices = Arc::new(services);
    let notifiers: Vec<_> = services
        .values()
        .map(|store| store.start_notifier(NOTIFY_INTERVAL))
        .collect();

    let backend: Arc<dyn PlayerBackend> = player.clone();
    let dispatcher = Arc::new(
        SoapDispatcher::new(backend.clone(), backend.volume()).with_events(services.clone()),
    );

    // Adresse locale : interface imposée, sinon auto-détection
    let host = match &identity.interface {
        Some(name) => grutils::interface_ip(name)
            .with_context(|| format!("no usable IPv4 address on interface {name}"))?,
        None => grutils::guess_local_ip(),
    };

    let mut server = Server::new("GRender", host, identity.port);

    let desc = description_xml.clone();
    server
        .add_handler("/description.xml", move || {
            let desc = desc.clone();
            async move {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"")],
                    desc,
                )
                    .into_response()
            }
        })
        .await;

    server.add_router(virtual_dir_router(store.clone())).await;
    server.add_router(control_router(dispatcher.clone())).await;
    server.add_router(event_router(services.clone())).await;

    server
        .add_route("/info", || async {
            serde_json::json!({"version": env!("CARGO_PKG_VERSION")})
        })
        .await;

    let bound = server.start().await.context("failed to start HTTP server")?;
    info!("UPnP running at {}", bound);

    // SSDP : alive initial + ré-annonces périodiques
    let location = format!("{}/description.xml", server.base_url());
    let mut ssdp = SsdpServer::new();
    ssdp.start().map_err(annotate_ssdp_error)?;

    let mut ssdp_device = SsdpDevice::new(
        identity.udn.trim_start_matches("uuid:").to_string(),
        DEVICE_TYPE.to_string(),
        location.clone(),
        server_header(),
    );
    for name in SERVICES {
        ssdp_device.add_service_type(format!("urn:schemas-upnp-org:service:{name}:1"));
    }
    ssdp.add_device(ssdp_device);

    info!("Device description available at: {}", location);
    info!("DLNA Renderer is running. Press Ctrl+C to exit...");

    server.wait().await;

    // ===== Cascade de teardown =====
    info!("===== Cleaning up resources =====");

    player.deinit();

    for notifier in notifiers {
        notifier.abort();
    }

    ssdp.stop();

    info!("DLNA Renderer exited cleanly");
    Ok(())
}

/// Enrichit une erreur de bind SSDP avec le processus fautif si possible.
fn annotate_ssdp_error(e: std::io::Error) -> anyhow::Error {
    use grutils::{TransportProtocol, find_process_using_port};

    if e.kind() == std::io::ErrorKind::AddrInUse {
        let port = grupnp::ssdp::SSDP_PORT;
        if let Some(process) = find_process_using_port(port, TransportProtocol::Udp) {
            return anyhow::anyhow!(
                "SSDP port {} is already in use by PID {} ({}) owned by {}: {}",
                port,
                process.pid,
                process.process_name,
                process.owner,
                e
            );
        }
        return anyhow::anyhow!(
            "SSDP port {} is already in use (check with `lsof -nP -i UDP:{}`): {}",
            port,
            port,
            e
        );
    }
    anyhow::Error::from(e).context("SSDP initialization failed")
}
