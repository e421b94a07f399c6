use crate::{
    error::PipelineError,
    types::{Credential, TokenResponse},
};

use super::SpotifyApi;

impl SpotifyApi {
    /// Exchanges client credentials for a bearer token.
    ///
    /// Uses the OAuth 2.0 client-credentials grant: the client id and secret
    /// are sent as HTTP basic auth and `grant_type=client_credentials` as the
    /// form body. The returned [`Credential`] is handed to every subsequent
    /// call; it is never stored on the client.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Auth`] when the request cannot be sent, the
    /// token endpoint answers with a non-2xx status, or the body carries no
    /// `access_token`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let api = SpotifyApi::new(config::DEFAULT_API_URL, config::DEFAULT_TOKEN_URL);
    /// let credential = api.authorize("client-id", "client-secret").await?;
    /// ```
    pub async fn authorize(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Credential, PipelineError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PipelineError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Auth(format!(
                "token endpoint {} answered with status {}",
                self.token_url,
                status.as_u16()
            )));
        }

        let json = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| PipelineError::Auth(format!("cannot decode token response: {e}")))?;

        let access_token = json
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PipelineError::Auth("token response without access_token".to_string()))?;

        Ok(Credential { access_token })
    }
}
