/// Utilitaires réseau et système partagés par les crates GRender.
///
/// # Fonctions principales
///
/// - [`guess_local_ip`] : Devine l'adresse IP locale utilisée pour les connexions sortantes
/// - [`interface_ip`] : Résout l'adresse IPv4 d'une interface nommée
/// - [`get_os_string`] : Chaîne OS/version pour l'en-tête SERVER des annonces SSDP
/// - [`hostname`] : Nom d'hôte de la machine (pour le friendlyName du device)
mod ip_utils;
mod process;

pub use ip_utils::{guess_local_ip, interface_ip};
pub use process::{ProcessPortInfo, TransportProtocol, find_process_using_port};

/// Retourne une chaîne `OS/version` utilisable dans un en-tête SERVER UPnP.
///
/// Exemple : `"Linux/6.1"`. Les espaces du nom d'OS sont remplacés pour
/// rester conformes au format `token/version` attendu par les control points.
pub fn get_os_string() -> String {
    let info = os_info::get();
    format!("{}/{}", info.os_type().to_string().replace(' ', ""), info.version())
}

/// Nom d'hôte de la machine, ou `"unknown"` si indisponible.
pub fn hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}
