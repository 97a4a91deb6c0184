//! Serveur SSDP

use super::{ANNOUNCE_INTERVAL_SECS, MAX_AGE, SSDP_MULTICAST_ADDR, SSDP_PORT, SsdpDevice};
use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Serveur SSDP gérant les annonces et découvertes
///
/// Deux threads tournent tant que le serveur est actif : un annonceur
/// périodique (NOTIFY alive toutes les [`ANNOUNCE_INTERVAL_SECS`] secondes
/// avec max-age [`MAX_AGE`]) et un écouteur M-SEARCH qui répond en unicast.
/// L'arrêt ([`stop`](Self::stop) ou drop) envoie un byebye par device.
pub struct SsdpServer {
    /// Devices enregistrés (UUID -> Device)
    devices: Arc<RwLock<HashMap<String, SsdpDevice>>>,

    /// Socket UDP pour SSDP
    socket: Option<Arc<UdpSocket>>,

    /// Drapeau d'exécution partagé avec les threads
    running: Arc<AtomicBool>,
}

impl SsdpServer {
    /// Crée un nouveau serveur SSDP
    pub fn new() -> Self {
        Self {
            devices: Arc::new(RwLock::new(HashMap::new())),
            socket: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Démarre le serveur SSDP
    ///
    /// # Returns
    ///
    /// `Ok(())` si le démarrage a réussi, `Err` sinon
    pub fn start(&mut self) -> std::io::Result<()> {
        let socket = UdpSocket::bind(("0.0.0.0", SSDP_PORT))?;

        socket.join_multicast_v4(
            &SSDP_MULTICAST_ADDR
                .parse()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?,
            &std::net::Ipv4Addr::UNSPECIFIED,
        )?;

        socket.set_read_timeout(Some(Duration::from_secs(1)))?;
        socket.set_multicast_loop_v4(false)?;

        let socket = Arc::new(socket);
        self.socket = Some(socket.clone());
        self.running.store(true, Ordering::SeqCst);

        info!("SSDP server started on {}:{}", SSDP_MULTICAST_ADDR, SSDP_PORT);

        self.start_periodic_announcements(socket.clone());
        self.start_msearch_listener(socket);

        Ok(())
    }

    /// Arrête les threads SSDP et envoie un byebye par device.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(ref socket) = self.socket {
            let devices = self.devices.read().unwrap();
            for device in devices.values() {
                for nt in device.notification_types() {
                    Self::send_byebye(socket, device, &nt);
                }
            }
        }
        info!("SSDP server stopped");
    }

    /// Ajoute un device et envoie un alive initial
    pub fn add_device(&self, device: SsdpDevice) {
        let uuid = device.uuid.clone();
        let mut devices = self.devices.write().unwrap();
        devices.insert(uuid, device.clone());
        drop(devices);

        if let Some(ref socket) = self.socket {
            for nt in device.notification_types() {
                Self::send_alive(socket, &device, &nt);
            }
        }
    }

    /// Supprime un device et envoie un byebye
    pub fn remove_device(&self, uuid: &str) {
        let mut devices = self.devices.write().unwrap();
        if let Some(device) = devices.remove(uuid) {
            drop(devices);

            if let Some(ref socket) = self.socket {
                for nt in device.notification_types() {
                    Self::send_byebye(socket, &device, &nt);
                }
            }
        }
    }

    /// Envoie un NOTIFY alive
    fn send_alive(socket: &UdpSocket, device: &SsdpDevice, nt: &str) {
        let usn = device.usn_for(nt);
        let msg = format!(
            "NOTIFY * HTTP/1.1\r\n\
             HOST: {}:{}\r\n\
             CACHE-CONTROL: max-age={}\r\n\
             LOCATION: {}\r\n\
             NT: {}\r\n\
             NTS: ssdp:alive\r\n\
             SERVER: {}\r\n\
             USN: {}\r\n\
             \r\n",
            SSDP_MULTICAST_ADDR, SSDP_PORT, MAX_AGE, device.location, nt, device.server, usn
        );

        match socket.send_to(msg.as_bytes(), Self::multicast_addr()) {
            Ok(_) => debug!("NOTIFY alive: {} (NT={})", usn, nt),
            Err(e) => warn!("Failed to send NOTIFY alive for {}: {}", usn, e),
        }
    }

    /// Envoie un NOTIFY byebye
    fn send_byebye(socket: &UdpSocket, device: &SsdpDevice, nt: &str) {
        let usn = device.usn_for(nt);
        let msg = format!(
            "NOTIFY * HTTP/1.1\r\n\
             HOST: {}:{}\r\n\
             NT: {}\r\n\
             NTS: ssdp:byebye\r\n\
             USN: {}\r\n\
             \r\n",
            SSDP_MULTICAST_ADDR, SSDP_PORT, nt, usn
        );

        match socket.send_to(msg.as_bytes(), Self::multicast_addr()) {
            Ok(_) => debug!("NOTIFY byebye: {} (NT={})", usn, nt),
            Err(e) => warn!("Failed to send NOTIFY byebye for {}: {}", usn, e),
        }
    }

    fn multicast_addr() -> SocketAddr {
        SocketAddr::from((
            SSDP_MULTICAST_ADDR
                .parse::<std::net::Ipv4Addr>()
                .expect("valid multicast literal"),
            SSDP_PORT,
        ))
    }

    /// Démarre les annonces périodiques
    fn start_periodic_announcements(&self, socket: Arc<UdpSocket>) {
        let devices = Arc::clone(&self.devices);
        let running = Arc::clone(&self.running);
        let period = Duration::from_secs(ANNOUNCE_INTERVAL_SECS);

        std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(period);
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let devices = devices.read().unwrap();
                for device in devices.values() {
                    for nt in device.notification_types() {
                        Self::send_alive(&socket, device, &nt);
                    }
                }
            }
        });
    }

    /// Démarre l'écoute des M-SEARCH
    fn start_msearch_listener(&self, socket: Arc<UdpSocket>) {
        let devices = Arc::clone(&self.devices);
        let running = Arc::clone(&self.running);

        std::thread::spawn(move || {
            let mut buf = [0u8; 8192];
            while running.load(Ordering::SeqCst) {
                match socket.recv_from(&mut buf) {
                    Ok((n, src)) => {
                        let data = String::from_utf8_lossy(&buf[..n]);
                        if data.starts_with("M-SEARCH") {
                            if let Some(st) = Self::parse_st(&data) {
                                let devices = devices.read().unwrap();
                                for device in devices.values() {
                                    Self::handle_msearch(&socket, &src, &st, device);
                                }
                            }
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        // Timeout de lecture, on re-teste le drapeau
                        continue;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                        continue;
                    }
                    Err(e) => {
                        warn!("SSDP read error: {}", e);
                    }
                }
            }
        });
    }

    /// Parse le champ ST d'un M-SEARCH
    fn parse_st(data: &str) -> Option<String> {
        for line in data.lines() {
            if line.to_uppercase().starts_with("ST:") {
                let st = line[3..].trim().to_string();
                debug!("M-SEARCH received with ST={}", st);
                return Some(st);
            }
        }
        None
    }

    /// Répond à un M-SEARCH
    fn handle_msearch(socket: &UdpSocket, src: &SocketAddr, st: &str, device: &SsdpDevice) {
        let nts = device.matching_targets(st);
        if nts.is_empty() {
            return; // Pas de match
        }

        for nt in nts {
            let usn = device.usn_for(&nt);
            let date = chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT");

            let resp = format!(
                "HTTP/1.1 200 OK\r\n\
                 CACHE-CONTROL: max-age={}\r\n\
                 DATE: {}\r\n\
                 EXT:\r\n\
                 LOCATION: {}\r\n\
                 SERVER: {}\r\n\
                 ST: {}\r\n\
                 USN: {}\r\n\
                 \r\n",
                MAX_AGE, date, device.location, device.server, nt, usn
            );

            match socket.send_to(resp.as_bytes(), src) {
                Ok(_) => debug!("M-SEARCH response sent to {} with ST={}", src, nt),
                Err(e) => warn!("Failed to send M-SEARCH response to {}: {}", src, e),
            }
        }
    }
}

impl Default for SsdpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SsdpServer {
    fn drop(&mut self) {
        self.stop();
    }
}
