//! Définition du device MediaRenderer.
//!
//! MediaRenderer audio-only conforme UPnP AV Architecture 1.0.
//!
//! # Services inclus
//!
//! - **AVTransport:1** : Contrôle de la lecture
//! - **RenderingControl:1** : Contrôle du volume et du mute
//! - **ConnectionManager:1** : Gestion des connexions
//!
//! # Spécifications
//!
//! - Device Type : `urn:schemas-upnp-org:device:MediaRenderer:1`
//! - friendlyName : `"{nom} ({hostname})"`
//! - Deux icônes PNG (64x64 et 128x128) servies depuis `/virtual/`

use grupnp::description::{DeviceDescription, DeviceIcon, ServiceRef};

/// Type du device racine.
pub const DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:MediaRenderer:1";

/// Identité immuable du device, fixée à l'init.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// UDN complet ("uuid:...")
    pub udn: String,

    /// Nom convivial configuré (sans le hostname)
    pub friendly_name: String,

    /// Interface réseau choisie, si imposée par la configuration
    pub interface: Option<String>,

    /// Port TCP demandé (0 = éphémère)
    pub port: u16,
}

/// Construit le document de description du MediaRenderer.
pub fn media_renderer_description(identity: &DeviceIdentity) -> DeviceDescription {
    let hostname = grutils::hostname();

    DeviceDescription {
        device_type: DEVICE_TYPE.to_string(),
        friendly_name: format!("{} ({})", identity.friendly_name, hostname),
        manufacturer: "Open Source Project".to_string(),
        manufacturer_url: "https://github.com".to_string(),
        model_description: "UPnP Media Renderer".to_string(),
        model_name: "MediaRenderer".to_string(),
        model_number: "1.0".to_string(),
        serial_number: "12345678".to_string(),
        udn: identity.udn.clone(),
        icons: vec![
            DeviceIcon {
                mimetype: "image/png".to_string(),
                width: 64,
                height: 64,
                depth: 24,
                url: "/virtual/grender-64x64.png".to_string(),
            },
            DeviceIcon {
                mimetype: "image/png".to_string(),
                width: 128,
                height: 128,
                depth: 24,
                url: "/virtual/grender-128x128.png".to_string(),
            },
        ],
        services: vec![
            ServiceRef::virtual_dir("AVTransport", 1),
            ServiceRef::virtual_dir("RenderingControl", 1),
            ServiceRef::virtual_dir("ConnectionManager", 1),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_has_renderer_shape() {
        let identity = DeviceIdentity {
            udn: "uuid:11111111-2222-3333-4444-555555555555".to_string(),
            friendly_name: "DLNA MediaRenderer".to_string(),
            interface: None,
            port: 49494,
        };

        let xml = media_renderer_description(&identity).to_xml_string().unwrap();

        assert!(xml.contains(DEVICE_TYPE));
        assert!(xml.contains("uuid:11111111-2222-3333-4444-555555555555"));
        assert!(xml.contains("DLNA MediaRenderer ("));
        assert!(xml.contains("/virtual/grender-64x64.png"));
        assert!(xml.contains("/virtual/grender-128x128.png"));
        assert!(xml.contains("urn:upnp-org:serviceId:AVTransport"));
        assert!(xml.contains("urn:upnp-org:serviceId:RenderingControl"));
        assert!(xml.contains("urn:upnp-org:serviceId:ConnectionManager"));
    }
}
