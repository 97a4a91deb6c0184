//! # Module SOAP - Simple Object Access Protocol
//!
//! Ce module couvre les trois besoins SOAP du renderer :
//!
//! - ✅ Extraction des invocations d'action des POST de contrôle
//! - ✅ Construction de réponses d'action (arguments OUT ordonnés)
//! - ✅ Enveloppes de fault UPnPError (codes d'erreur d'action)
//!
//! ## Example
//!
//! ```
//! use grupnp::soap::{SoapFault, build_soap_response, parse_soap_action};
//!
//! let body = r#"<?xml version="1.0"?>
//! <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
//!   <s:Body>
//!     <u:Play xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
//!       <InstanceID>0</InstanceID>
//!       <Speed>1</Speed>
//!     </u:Play>
//!   </s:Body>
//! </s:Envelope>"#;
//!
//! let action = parse_soap_action(body.as_bytes()).unwrap();
//! assert_eq!(action.name, "Play");
//! assert_eq!(action.arg("Speed"), Some("1"));
//!
//! let response = build_soap_response(
//!     "urn:schemas-upnp-org:service:AVTransport:1",
//!     "Play",
//!     &[("Speed".to_string(), "1".to_string())],
//! ).unwrap();
//! assert!(response.contains("PlayResponse"));
//!
//! let fault = SoapFault::new(702, "URI not set").to_xml_string().unwrap();
//! assert!(fault.contains("<errorCode>702</errorCode>"));
//! ```

mod builder;
mod fault;
mod parser;

pub use builder::build_soap_response;
pub use fault::SoapFault;
pub use parser::{SoapAction, SoapParseError, parse_soap_action};
