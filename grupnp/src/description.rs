//! Génération du document de description de device UPnP.
//!
//! Le document (`/description.xml`) est rendu avec `xmltree` à partir d'un
//! modèle immuable construit une fois au démarrage. Toutes les valeurs
//! textuelles passent par des nœuds texte : l'échappement XML est garanti
//! par l'émetteur.

use xmltree::{Element, EmitterConfig, XMLNode};

/// Référence d'un service dans le document de description.
#[derive(Debug, Clone)]
pub struct ServiceRef {
    /// Type de service (ex: "urn:schemas-upnp-org:service:AVTransport:1")
    pub service_type: String,

    /// Identifiant (ex: "urn:upnp-org:serviceId:AVTransport")
    pub service_id: String,

    /// URL de la description SCPD
    pub scpd_url: String,

    /// URL de contrôle SOAP
    pub control_url: String,

    /// URL de souscription aux événements
    pub event_sub_url: String,
}

impl ServiceRef {
    /// Construit la référence standard d'un service nommé (ex: "AVTransport")
    /// dont les documents vivent sous `/virtual/`.
    pub fn virtual_dir(name: &str, version: u8) -> Self {
        Self {
            service_type: format!("urn:schemas-upnp-org:service:{name}:{version}"),
            service_id: format!("urn:upnp-org:serviceId:{name}"),
            scpd_url: format!("/virtual/{name}.xml"),
            control_url: format!("/virtual/control/{name}"),
            event_sub_url: format!("/virtual/event/{name}"),
        }
    }
}

/// Icône déclarée dans le document de description.
#[derive(Debug, Clone)]
pub struct DeviceIcon {
    pub mimetype: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub url: String,
}

/// Modèle du document de description d'un device racine.
#[derive(Debug, Clone)]
pub struct DeviceDescription {
    /// Type du device (ex: "urn:schemas-upnp-org:device:MediaRenderer:1")
    pub device_type: String,

    /// Nom convivial, typiquement "{nom} ({hostname})"
    pub friendly_name: String,

    pub manufacturer: String,
    pub manufacturer_url: String,
    pub model_description: String,
    pub model_name: String,
    pub model_number: String,
    pub serial_number: String,

    /// UDN avec le préfixe "uuid:"
    pub udn: String,

    pub icons: Vec<DeviceIcon>,
    pub services: Vec<ServiceRef>,
}

impl DeviceDescription {
    /// Génère l'élément `<device>` du document.
    fn device_element(&self) -> Element {
        let mut elem = Element::new("device");

        push_text(&mut elem, "deviceType", &self.device_type);
        push_text(&mut elem, "friendlyName", &self.friendly_name);
        push_text(&mut elem, "manufacturer", &self.manufacturer);
        push_text(&mut elem, "manufacturerURL", &self.manufacturer_url);
        push_text(&mut elem, "modelDescription", &self.model_description);
        push_text(&mut elem, "modelName", &self.model_name);
        push_text(&mut elem, "modelNumber", &self.model_number);
        push_text(&mut elem, "serialNumber", &self.serial_number);
        push_text(&mut elem, "UDN", &self.udn);

        if !self.icons.is_empty() {
            let mut icon_list = Element::new("iconList");
            for icon in &self.icons {
                let mut icon_elem = Element::new("icon");
                push_text(&mut icon_elem, "mimetype", &icon.mimetype);
                push_text(&mut icon_elem, "width", &icon.width.to_string());
                push_text(&mut icon_elem, "height", &icon.height.to_string());
                push_text(&mut icon_elem, "depth", &icon.depth.to_string());
                push_text(&mut icon_elem, "url", &icon.url);
                icon_list.children.push(XMLNode::Element(icon_elem));
            }
            elem.children.push(XMLNode::Element(icon_list));
        }

        if !self.services.is_empty() {
            let mut service_list = Element::new("serviceList");
            for service in &self.services {
                let mut service_elem = Element::new("service");
                push_text(&mut service_elem, "serviceType", &service.service_type);
                push_text(&mut service_elem, "serviceId", &service.service_id);
                push_text(&mut service_elem, "SCPDURL", &service.scpd_url);
                push_text(&mut service_elem, "controlURL", &service.control_url);
                push_text(&mut service_elem, "eventSubURL", &service.event_sub_url);
                service_list.children.push(XMLNode::Element(service_elem));
            }
            elem.children.push(XMLNode::Element(service_list));
        }

        elem
    }

    /// Génère l'élément racine du document de description.
    pub fn description_element(&self) -> Element {
        let mut root = Element::new("root");
        root.attributes.insert(
            "xmlns".to_string(),
            "urn:schemas-upnp-org:device-1-0".to_string(),
        );

        let mut spec = Element::new("specVersion");
        push_text(&mut spec, "major", "1");
        push_text(&mut spec, "minor", "0");
        root.children.push(XMLNode::Element(spec));

        root.children.push(XMLNode::Element(self.device_element()));

        root
    }

    /// Sérialise le document complet en XML.
    pub fn to_xml_string(&self) -> Result<String, xmltree::Error> {
        let elem = self.description_element();

        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("  ");

        let mut buf = Vec::new();
        elem.write_with_config(&mut buf, config)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

fn push_text(parent: &mut Element, name: &str, value: &str) {
    let mut child = Element::new(name);
    child.children.push(XMLNode::Text(value.to_string()));
    parent.children.push(XMLNode::Element(child));
}
