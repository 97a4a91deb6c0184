use get_if_addrs::get_if_addrs;
use std::net::UdpSocket;

/// Devine l'adresse IP locale de la machine.
///
/// Crée un socket UDP vers un serveur DNS public (8.8.8.8) et demande au
/// système quelle interface serait utilisée pour l'atteindre. Aucune
/// donnée n'est envoyée (UDP est sans connexion).
///
/// # Returns
///
/// L'adresse IP locale sous forme de `String`, ou `"127.0.0.1"` en cas d'échec.
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            "127.0.0.1".to_string()
        }
        Err(_) => "127.0.0.1".to_string(),
    }
}

/// Résout l'adresse IPv4 d'une interface réseau nommée (ex: `"eth0"`).
///
/// Les adresses de loopback et IPv6 sont ignorées. Retourne `None` si
/// l'interface n'existe pas ou ne porte aucune adresse IPv4.
///
/// # Examples
///
/// ```no_run
/// use grutils::interface_ip;
///
/// if let Some(ip) = interface_ip("eth0") {
///     println!("eth0: {ip}");
/// }
/// ```
pub fn interface_ip(name: &str) -> Option<String> {
    let interfaces = get_if_addrs().ok()?;
    interfaces
        .into_iter()
        .filter(|iface| iface.name == name)
        .map(|iface| iface.ip())
        .find(|ip| ip.is_ipv4() && !ip.is_loopback())
        .map(|ip| ip.to_string())
}
