/// A chat-webhook delivery target.
///
/// The URL decides the provider protocol (see [`crate::Provider::detect`]);
/// the optional secret feeds that provider's signing scheme.
#[derive(Debug, Clone)]
pub struct Webhook {
    pub url: String,
    pub sign: Option<String>,
}
