use thiserror::Error;

use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer; `message` is the server's own text.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Session absente, veuillez vous connecter")]
    NotAuthenticated,

    #[error("Erreur réseau: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Réponse inattendue du serveur: {0}")]
    Decode(String),

    #[error("URL invalide: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
