//! Glue HTTP ↔ SOAP des endpoints de contrôle.
//!
//! Un POST sur `/virtual/control/{Service}` est parsé en
//! [`ActionRequest`], dispatché sous le mutex du renderer, puis la réponse
//! typée (ou le fault) est re-sérialisée en enveloppe SOAP. Le dispatcher
//! produit toujours une enveloppe bien formée : une erreur d'action sort
//! en `s:Fault`/`UPnPError` avec HTTP 500, jamais en panique.

use crate::dispatcher::{ActionRequest, SoapDispatcher};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use grupnp::soap::{SoapFault, build_soap_response, parse_soap_action};
use std::sync::Arc;
use tracing::{debug, error};

/// Router des endpoints de contrôle SOAP.
pub fn control_router(dispatcher: Arc<SoapDispatcher>) -> Router {
    Router::new()
        .route("/virtual/control/{service}", post(control_handler))
        .with_state(dispatcher)
}

/// Handler POST pour `/virtual/control/{service}`.
async fn control_handler(
    State(dispatcher): State<Arc<SoapDispatcher>>,
    Path(service): Path<String>,
    body: String,
) -> Response {
    let action = match parse_soap_action(body.as_bytes()) {
        Ok(action) => action,
        Err(e) => {
            error!("SOAP parse error on {} control endpoint: {}", service, e);
            return soap_fault_response(402, "Invalid Args");
        }
    };

    debug!("Action request: {} for service: {}", action.name, service);

    let request = ActionRequest {
        service_id: format!("urn:upnp-org:serviceId:{service}"),
        action_name: action.name,
        args: action.args,
    };

    match dispatcher.dispatch(&request) {
        Ok(response) => {
            match build_soap_response(
                &response.service_type,
                &response.action_name,
                &response.out_args,
            ) {
                Ok(xml) => xml_response(StatusCode::OK, xml),
                Err(e) => {
                    error!("Failed to serialize SOAP response: {}", e);
                    soap_fault_response(501, "Action Failed")
                }
            }
        }
        Err(fault) => soap_fault_response(fault.code, &fault.message),
    }
}

/// Enveloppe fault + statut 500, comme l'exige UPnP 1.0 pour les erreurs
/// d'invocation.
fn soap_fault_response(code: u16, message: &str) -> Response {
    match SoapFault::new(code, message).to_xml_string() {
        Ok(xml) => xml_response(StatusCode::INTERNAL_SERVER_ERROR, xml),
        Err(e) => {
            error!("Failed to serialize SOAP fault: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn xml_response(status: StatusCode, xml: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/xml; charset=\"utf-8\"")],
        xml,
    )
        .into_response()
}
