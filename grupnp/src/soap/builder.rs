//! Construction de réponses SOAP

use xmltree::{Element, EmitterConfig, XMLNode};

/// Construit une réponse SOAP UPnP
///
/// Les arguments OUT sont émis dans l'ordre fourni, comme l'exige la
/// déclaration SCPD de l'action. Les valeurs sont insérées comme nœuds
/// texte : l'échappement XML (`< > & " '`) est garanti par l'émetteur.
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:AVTransport:1")
/// * `action` - Nom de l'action (ex: "GetPositionInfo")
/// * `values` - Arguments de sortie, dans l'ordre de déclaration
///
/// # Returns
///
/// XML SOAP formaté en String
pub fn build_soap_response(
    service_urn: &str,
    action: &str,
    values: &[(String, String)],
) -> Result<String, xmltree::Error> {
    // <u:ActionResponse xmlns:u="service-urn">
    let mut response_elem = Element::new(&format!("u:{}Response", action));
    response_elem
        .attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (key, value) in values {
        let mut child = Element::new(key);
        child.children.push(XMLNode::Text(value.clone()));
        response_elem.children.push(XMLNode::Element(child));
    }

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(response_elem));

    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        "http://schemas.xmlsoap.org/soap/envelope/".to_string(),
    );
    envelope.attributes.insert(
        "s:encodingStyle".to_string(),
        "http://schemas.xmlsoap.org/soap/encoding/".to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_response() {
        let values = vec![
            ("Track".to_string(), "0".to_string()),
            ("TrackDuration".to_string(), "00:03:45".to_string()),
        ];

        let xml = build_soap_response(
            "urn:schemas-upnp-org:service:AVTransport:1",
            "GetPositionInfo",
            &values,
        )
        .unwrap();

        assert!(xml.contains("GetPositionInfoResponse"));
        assert!(xml.contains("<Track>0</Track>"));
        assert!(xml.contains("<TrackDuration>00:03:45</TrackDuration>"));
        assert!(xml.contains("xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\""));
    }

    #[test]
    fn test_build_response_preserves_order() {
        let values = vec![
            ("B".to_string(), "2".to_string()),
            ("A".to_string(), "1".to_string()),
        ];

        let xml = build_soap_response("urn:schemas-upnp-org:service:AVTransport:1", "Foo", &values)
            .unwrap();

        let b = xml.find("<B>").unwrap();
        let a = xml.find("<A>").unwrap();
        assert!(b < a, "out-arguments must keep declaration order");
    }

    #[test]
    fn test_build_response_escapes_values() {
        let values = vec![(
            "TrackURI".to_string(),
            "http://host/a&b<c>\"d\".mp3".to_string(),
        )];

        let xml = build_soap_response(
            "urn:schemas-upnp-org:service:AVTransport:1",
            "GetPositionInfo",
            &values,
        )
        .unwrap();

        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&lt;c&gt;"));
        assert!(!xml.contains("a&b"));
    }

    #[test]
    fn test_build_empty_response() {
        let xml = build_soap_response("urn:schemas-upnp-org:service:AVTransport:1", "Stop", &[])
            .unwrap();

        assert!(xml.contains("StopResponse"));
        assert!(xml.contains("xmlns:u=\"urn:schemas-upnp-org:service:AVTransport:1\""));
    }
}
