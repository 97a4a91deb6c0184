//! # grserver - Serveur HTTP de GRender
//!
//! Enveloppe de haut niveau autour d'Axum pour les besoins du renderer :
//! enregistrement de routes, bind (port éphémère compris), arrêt gracieux
//! sur SIGINT/SIGTERM et initialisation du logging.

pub mod logs;
mod server;

pub use logs::init_logging;
pub use server::{Server, ServerInfo};
