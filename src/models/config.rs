//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub secret: String,
    /// Endpoint of the emailer PUB socket outbound notifications are published to.
    pub zmq_emailer_pub: String,
    /// Glob of email templates, e.g. `templates/email/**/*`.
    pub templates_dir: String,
    /// Directory CSV exports are written to.
    pub exports_dir: String,
    /// Sender address used for outbound notifications.
    pub mail_from: String,
}
