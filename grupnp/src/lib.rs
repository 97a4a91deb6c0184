//! # grupnp - Substrat UPnP de GRender
//!
//! Ce crate fournit l'infrastructure UPnP dont le MediaRenderer a besoin :
//!
//! - ✅ Parsing et construction d'enveloppes SOAP ([`soap`])
//! - ✅ Annonces SSDP et réponses M-SEARCH ([`ssdp`])
//! - ✅ Abonnements GENA et notifications d'événements ([`gena`])
//! - ✅ Système de fichiers virtuel du webserver ([`vfs`])
//! - ✅ Génération du document de description de device ([`description`])
//!
//! Le crate est agnostique du type de device : c'est `grmediarenderer` qui
//! assemble ces briques en MediaRenderer complet.

pub mod description;
pub mod gena;
pub mod soap;
pub mod ssdp;
pub mod vfs;
