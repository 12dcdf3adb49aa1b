use crate::config::SignatureAlgorithm;
use jsonwebtoken::Header;

/// JOSE header of a signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwsHeader {
    pub algorithm: SignatureAlgorithm,
    pub key_id: Option<String>,
    pub token_type: Option<String>,
}

impl JwsHeader {
    pub fn with(algorithm: SignatureAlgorithm) -> JwsHeaderBuilder {
        JwsHeaderBuilder {
            header: Self {
                algorithm,
                key_id: None,
                token_type: Some("JWT".to_string()),
            },
        }
    }

    pub(crate) fn to_jsonwebtoken(&self) -> Header {
        let mut header = Header::new(self.algorithm.to_jsonwebtoken());
        header.kid = self.key_id.clone();
        header.typ = self.token_type.clone();
        header
    }
}

/// Header under construction; exposed to token customizers.
#[derive(Debug, Clone)]
pub struct JwsHeaderBuilder {
    header: JwsHeader,
}

impl JwsHeaderBuilder {
    pub fn algorithm(&mut self, algorithm: SignatureAlgorithm) -> &mut Self {
        self.header.algorithm = algorithm;
        self
    }

    pub fn key_id(&mut self, kid: impl Into<String>) -> &mut Self {
        self.header.key_id = Some(kid.into());
        self
    }

    pub fn token_type(&mut self, typ: impl Into<String>) -> &mut Self {
        self.header.token_type = Some(typ.into());
        self
    }

    pub fn get_algorithm(&self) -> SignatureAlgorithm {
        self.header.algorithm
    }

    pub fn build(self) -> JwsHeader {
        self.header
    }
}
