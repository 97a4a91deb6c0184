//! Enveloppes d'erreur des invocations d'action.
//!
//! UPnP 1.0 n'admet qu'une seule forme de fault pour le contrôle : un
//! `s:Fault` de code `s:Client`, faultstring `UPnPError`, portant le code
//! numérique et sa description dans un bloc `<UPnPError>` du détail. Le
//! renderer ne produit donc qu'un type, construit depuis le code d'erreur
//! d'action (700..715).

use xmltree::{Element, EmitterConfig, XMLNode};

/// faultcode imposé pour les erreurs d'invocation.
const FAULT_CODE: &str = "s:Client";

/// faultstring imposé pour les erreurs d'invocation.
const FAULT_STRING: &str = "UPnPError";

/// Namespace du bloc de détail UPnPError.
const CONTROL_NS: &str = "urn:schemas-upnp-org:control-1-0";

/// Fault UPnP prêt à sérialiser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Code d'erreur numérique (ex: 701, 712)
    pub code: u16,

    /// Description courte de l'erreur (ex: "Invalid URI")
    pub description: String,
}

impl SoapFault {
    /// Crée un fault depuis un code d'erreur d'action et sa description.
    pub fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// Élément `<s:Fault>` complet, détail UPnPError inclus.
    fn fault_element(&self) -> Element {
        let mut upnp_error = Element::new("UPnPError");
        upnp_error
            .attributes
            .insert("xmlns".to_string(), CONTROL_NS.to_string());
        upnp_error
            .children
            .push(XMLNode::Element(text_element("errorCode", &self.code.to_string())));
        upnp_error
            .children
            .push(XMLNode::Element(text_element("errorDescription", &self.description)));

        let mut detail = Element::new("detail");
        detail.children.push(XMLNode::Element(upnp_error));

        let mut fault = Element::new("s:Fault");
        fault
            .children
            .push(XMLNode::Element(text_element("faultcode", FAULT_CODE)));
        fault
            .children
            .push(XMLNode::Element(text_element("faultstring", FAULT_STRING)));
        fault.children.push(XMLNode::Element(detail));

        fault
    }

    /// Sérialise l'enveloppe de fault complète.
    pub fn to_xml_string(&self) -> Result<String, xmltree::Error> {
        let mut body = Element::new("s:Body");
        body.children.push(XMLNode::Element(self.fault_element()));

        let mut envelope = Element::new("s:Envelope");
        envelope.attributes.insert(
            "xmlns:s".to_string(),
            "http://schemas.xmlsoap.org/soap/envelope/".to_string(),
        );
        envelope.children.push(XMLNode::Element(body));

        let mut buf = Vec::new();
        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("  ");
        envelope.write_with_config(&mut buf, config)?;

        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UPnPError {}: {}", self.code, self.description)
    }
}

fn text_element(name: &str, value: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(value.to_string()));
    elem
}
