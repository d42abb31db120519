use base64::Engine;
use serde::{Deserialize, Serialize};

/// Spotify application identifiers from the developer dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    /// Value for a `Basic` authorization header
    pub fn auth(&self) -> String {
        let auth = format!("{}:{}", self.client_id, self.client_secret);
        base64::engine::general_purpose::STANDARD.encode(auth.as_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_auth_is_base64_of_id_and_secret() {
        let creds = ClientCredentials::new("id", "secret");
        assert_eq!(creds.auth(), "aWQ6c2VjcmV0");
    }
}
