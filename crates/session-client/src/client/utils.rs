use secrecy::ExposeSecret;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;

use crate::client::config::Config;
use crate::client::consts::AUTHORIZATION_HEADER;

pub fn build_request(config: &Config) -> tokio_tungstenite::tungstenite::Result<Request> {
    let mut request = config.url().into_client_request()?;
    if let Some(token) = config.token() {
        request.headers_mut().insert(
            AUTHORIZATION_HEADER,
            format!("Bearer {}", token.expose_secret()).as_str().parse()?,
        );
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_only_when_token_set() {
        let anonymous = Config::builder().with_url("ws://localhost:5000/ws").build();
        let request = build_request(&anonymous).unwrap();
        assert_eq!(request.uri().to_string(), "ws://localhost:5000/ws");
        assert!(request.headers().get(AUTHORIZATION_HEADER).is_none());

        let authed = Config::builder()
            .with_url("wss://interview.example.com/ws")
            .with_token("s3cret")
            .build();
        let request = build_request(&authed).unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION_HEADER).unwrap(),
            "Bearer s3cret"
        );
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let config = Config::builder().with_url("not a url").build();
        assert!(build_request(&config).is_err());
    }
}
