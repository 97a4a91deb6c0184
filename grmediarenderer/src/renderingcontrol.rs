//! Actions du service RenderingControl:1.
//!
//! Seul le canal "Master" est supporté ; le volume est borné à 0..100.

use crate::dispatcher::{ActionFault, ActionRequest, EventSink};
use crate::state::RendererState;
use grplayer::PlayerBackend;
use tracing::{debug, error};

/// Nom du service pour les notifications GENA.
const SERVICE: &str = "RenderingControl";

type OutArgs = Vec<(String, String)>;

/// Route une action RenderingControl.
pub(crate) fn handle(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
    request: &ActionRequest,
) -> Result<OutArgs, ActionFault> {
    match request.action_name.as_str() {
        "GetVolume" => get_volume(player, request),
        "SetVolume" => set_volume(state, player, events, request),
        "GetMute" => Ok(get_mute(player)),
        "SetMute" => set_mute(state, player, events, request),
        other => {
            error!("Unhandled RenderingControl action: {}", other);
            Err(ActionFault::new(709, "Unsupported action"))
        }
    }
}

/// Canal demandé, "Master" par défaut.
fn channel<'a>(request: &'a ActionRequest) -> &'a str {
    request.arg("Channel").unwrap_or("Master")
}

fn get_volume(
    player: &dyn PlayerBackend,
    request: &ActionRequest,
) -> Result<OutArgs, ActionFault> {
    if channel(request) != "Master" {
        return Err(ActionFault::new(710, "Unsupported channel"));
    }

    let volume = player.volume();
    debug!("Getting volume: {}%", volume);
    Ok(vec![("CurrentVolume".to_string(), volume.to_string())])
}

fn set_volume(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
    request: &ActionRequest,
) -> Result<OutArgs, ActionFault> {
    let desired = request
        .arg("DesiredVolume")
        .ok_or_else(|| ActionFault::new(711, "Missing volume value"))?;

    let volume: i64 = desired
        .trim()
        .parse()
        .map_err(|_| ActionFault::new(712, "Volume out of range"))?;
    if !(0..=100).contains(&volume) {
        return Err(ActionFault::new(712, "Volume out of range"));
    }

    if channel(request) != "Master" {
        return Err(ActionFault::new(713, "Unsupported channel"));
    }

    let volume = volume as u32;
    player
        .set_volume(volume)
        .map_err(|_| ActionFault::new(714, "Set volume failed"))?;

    // Le volume 0 active le mute, toute valeur non nulle le désactive
    state.volume_percent = volume;
    state.muted = volume == 0;

    events.push(SERVICE, "Volume", volume.to_string());
    events.push(SERVICE, "Mute", if state.muted { "1" } else { "0" });

    Ok(Vec::new())
}

/// Le mute est lu sur le pipeline vivant, pas sur un état mémorisé.
fn get_mute(player: &dyn PlayerBackend) -> OutArgs {
    let mute = player.mute();
    vec![(
        "CurrentMute".to_string(),
        if mute { "1" } else { "0" }.to_string(),
    )]
}

fn set_mute(
    state: &mut RendererState,
    player: &dyn PlayerBackend,
    events: &EventSink,
    request: &ActionRequest,
) -> Result<OutArgs, ActionFault> {
    let desired = request
        .arg("DesiredMute")
        .ok_or_else(|| ActionFault::new(715, "Missing mute value"))?;

    let mute = parse_upnp_bool(desired);
    if let Err(e) = player.set_mute(mute) {
        error!("Set mute failed: {}", e);
    }
    state.muted = mute;

    events.push(SERVICE, "Mute", if mute { "1" } else { "0" });

    Ok(Vec::new())
}

/// Booléen UPnP : "1", "true" et "yes" sont vrais.
fn parse_upnp_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
