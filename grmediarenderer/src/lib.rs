//! # grmediarenderer - MediaRenderer UPnP
//!
//! Ce crate assemble le substrat UPnP (`grupnp`), le serveur HTTP
//! (`grserver`) et le backend GStreamer (`grplayer`) en MediaRenderer
//! audio-only conforme UPnP AV Architecture 1.0.
//!
//! # Architecture
//!
//! Le renderer est composé de trois services obligatoires :
//!
//! - **AVTransport** : Contrôle de la lecture (play, pause, stop, seek)
//! - **RenderingControl** : Contrôle du volume et du mute
//! - **ConnectionManager** : Gestion des connexions et des protocoles
//!
//! Toutes les actions passent par le [`SoapDispatcher`], qui sérialise
//! chaque requête sous l'unique mutex de l'état du renderer.
//!
//! # Utilisation
//!
//! ```ignore
//! use grmediarenderer::{RendererOptions, run};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = RendererOptions::default();
//! run(options).await
//! # }
//! ```

mod avtransport;
mod connectionmanager;
mod control;
pub mod device;
pub mod dispatcher;
mod lifecycle;
mod renderingcontrol;
pub mod state;

pub use dispatcher::{ActionFault, ActionRequest, ActionResponse, SoapDispatcher};
pub use lifecycle::{RendererOptions, load_virtual_files, run};
pub use state::{RendererState, TransportState};
