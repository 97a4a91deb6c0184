//! Actions du service ConnectionManager:1.
//!
//! Le renderer expose une unique connexion implicite (ID 0) et la liste
//! des formats audio que le pipeline sait consommer en http-get.

use crate::dispatcher::{ActionFault, ActionRequest};
use tracing::error;

type OutArgs = Vec<(String, String)>;

/// ProtocolInfo des formats audio acceptés par le sink.
const SINK_PROTOCOL_INFO: &str = "http-get:*:audio/mpeg:*,\
http-get:*:audio/mp4:*,\
http-get:*:audio/x-m4a:*,\
http-get:*:audio/flac:*,\
http-get:*:audio/x-flac:*,\
http-get:*:audio/wav:*,\
http-get:*:audio/x-wav:*,\
http-get:*:audio/ogg:*,\
http-get:*:audio/aac:*,\
http-get:*:audio/L16:*";

/// Route une action ConnectionManager.
pub(crate) fn handle(request: &ActionRequest) -> Result<OutArgs, ActionFault> {
    match request.action_name.as_str() {
        "GetProtocolInfo" => Ok(get_protocol_info()),
        "GetCurrentConnectionIDs" => Ok(get_current_connection_ids()),
        other => {
            error!("Unhandled ConnectionManager action: {}", other);
            Err(ActionFault::new(709, "Unsupported action"))
        }
    }
}

fn get_protocol_info() -> OutArgs {
    vec![
        ("Source".to_string(), String::new()),
        ("Sink".to_string(), SINK_PROTOCOL_INFO.to_string()),
    ]
}

fn get_current_connection_ids() -> OutArgs {
    vec![("ConnectionIDs".to_string(), "0".to_string())]
}
