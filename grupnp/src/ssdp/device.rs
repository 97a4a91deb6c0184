//! Identité SSDP du device racine.
//!
//! Le renderer annonce un unique device racine et ses services. Plutôt
//! que de maintenir une liste figée de notification types, le device
//! mémorise ses types de service et dérive à la demande l'ensemble des NT
//! à annoncer, l'USN de chacun et la réponse à donner à un ST de
//! M-SEARCH.

/// Device racine tel qu'annoncé sur le bus SSDP.
#[derive(Debug, Clone)]
pub struct SsdpDevice {
    /// UUID du device (sans le préfixe "uuid:")
    pub uuid: String,

    /// Type du device (ex: "urn:schemas-upnp-org:device:MediaRenderer:1")
    pub device_type: String,

    /// URL du document de description
    pub location: String,

    /// Identifiant du serveur (ex: "Linux/6.1 UPnP/1.0 GRender/0.1")
    pub server: String,

    /// Types des services embarqués
    service_types: Vec<String>,
}

impl SsdpDevice {
    /// Crée un device racine sans services.
    pub fn new(uuid: String, device_type: String, location: String, server: String) -> Self {
        Self {
            uuid,
            device_type,
            location,
            server,
            service_types: Vec::new(),
        }
    }

    /// Déclare un service embarqué (ex: "urn:schemas-upnp-org:service:AVTransport:1").
    pub fn add_service_type(&mut self, service_type: String) {
        if !self.service_types.contains(&service_type) {
            self.service_types.push(service_type);
        }
    }

    /// Ensemble des notification types à annoncer : l'UUID du device,
    /// `upnp:rootdevice`, le type du device puis chaque service.
    pub fn notification_types(&self) -> Vec<String> {
        let mut nts = Vec::with_capacity(3 + self.service_types.len());
        nts.push(format!("uuid:{}", self.uuid));
        nts.push("upnp:rootdevice".to_string());
        nts.push(self.device_type.clone());
        nts.extend(self.service_types.iter().cloned());
        nts
    }

    /// USN associé à un notification type.
    ///
    /// Le NT de l'UUID est son propre USN ; les autres sont qualifiés par
    /// l'UUID du device ("uuid:x::NT").
    pub fn usn_for(&self, nt: &str) -> String {
        if nt.starts_with("uuid:") {
            nt.to_string()
        } else {
            format!("uuid:{}::{}", self.uuid, nt)
        }
    }

    /// Notification types couverts par le ST d'un M-SEARCH.
    ///
    /// `ssdp:all` couvre tout ; un ST précis ne matche que s'il fait
    /// partie des NT du device. Vide si le device n'est pas concerné.
    pub fn matching_targets(&self, st: &str) -> Vec<String> {
        let nts = self.notification_types();
        if st == "ssdp:all" {
            nts
        } else {
            nts.into_iter().filter(|nt| nt == st).collect()
        }
    }
}
