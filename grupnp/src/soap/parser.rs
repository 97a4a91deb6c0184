//! Extraction des invocations d'action depuis les POST SOAP.
//!
//! Le renderer n'a besoin que d'une chose côté parsing : retrouver, dans
//! le corps de l'enveloppe, l'élément d'action et ses arguments texte.
//! Le document est donc parcouru en place, sans matérialiser d'enveloppe
//! intermédiaire ; les préfixes de namespace des control points variant
//! d'une implémentation à l'autre, les éléments structurels sont reconnus
//! par suffixe de nom local.

use std::collections::HashMap;
use std::io::BufReader;
use xmltree::Element;

/// Invocation d'action extraite d'un POST de contrôle.
#[derive(Debug, Clone)]
pub struct SoapAction {
    /// Nom de l'action (ex: "Play", "SetAVTransportURI")
    pub name: String,

    /// Type de service porté par le xmlns de l'action
    /// (ex: "urn:schemas-upnp-org:service:AVTransport:1")
    pub service_type: Option<String>,

    /// Arguments IN (nom -> valeur texte, vide si l'élément est vide)
    pub args: HashMap<String, String>,
}

impl SoapAction {
    /// Accès à un argument, `None` si absent.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

/// Erreur de parsing d'une invocation SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),

    #[error("document root is not a SOAP Envelope")]
    NotAnEnvelope,

    #[error("SOAP Envelope has no Body")]
    MissingBody,

    #[error("SOAP Body carries no action element")]
    NoAction,
}

/// Parse une invocation d'action à partir du corps d'un POST de contrôle.
///
/// Format attendu :
///
/// ```text
/// <s:Envelope>
///   <s:Body>
///     <u:ActionName xmlns:u="service-urn">
///       <ArgName>value</ArgName>
///       ...
///     </u:ActionName>
///   </s:Body>
/// </s:Envelope>
/// ```
pub fn parse_soap_action(xml: &[u8]) -> Result<SoapAction, SoapParseError> {
    let root = Element::parse(BufReader::new(xml))?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::NotAnEnvelope);
    }

    let body = child_with_suffix(&root, "Body").ok_or(SoapParseError::MissingBody)?;
    let action = first_child_element(body).ok_or(SoapParseError::NoAction)?;

    let mut args = HashMap::new();
    for child in action.children.iter().filter_map(|n| n.as_element()) {
        let value = child.get_text().unwrap_or_default().to_string();
        args.insert(child.name.clone(), value);
    }

    Ok(SoapAction {
        name: action.name.clone(),
        service_type: action.namespace.clone(),
        args,
    })
}

/// Premier enfant élément dont le nom local se termine par `suffix`.
///
/// Tolère les préfixes arbitraires (`s:Body`, `SOAP-ENV:Body`, `Body`).
fn child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|e| e.name.ends_with(suffix))
}

/// Premier enfant élément, quel que soit son nom.
fn first_child_element(parent: &Element) -> Option<&Element> {
    parent.children.iter().find_map(|n| n.as_element())
}
