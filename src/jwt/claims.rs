//! JWT claim sets.
//!
//! Claims are collected in insertion order by a [`ClaimsBuilder`] and frozen
//! into a [`ClaimsSet`] before signing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered and OIDC claim names.
pub mod names {
    pub const ISS: &str = "iss";
    pub const SUB: &str = "sub";
    pub const AUD: &str = "aud";
    pub const EXP: &str = "exp";
    pub const NBF: &str = "nbf";
    pub const IAT: &str = "iat";
    pub const JTI: &str = "jti";
    pub const SCOPE: &str = "scope";
    pub const AZP: &str = "azp";
    pub const NONCE: &str = "nonce";
    pub const SID: &str = "sid";
    pub const AUTH_TIME: &str = "auth_time";
    pub const AUTHORITIES: &str = "authorities";
}

/// Frozen, ordered claim set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimsSet {
    claims: Map<String, Value>,
}

impl ClaimsSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn has_claim(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.claims.get(name).and_then(Value::as_i64)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str(names::ISS)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str(names::SUB)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str(names::JTI)
    }

    pub fn audience(&self) -> Vec<&str> {
        match self.claims.get(names::AUD) {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(names::IAT)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(names::EXP)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.timestamp(names::NBF)
    }

    /// Numeric-date claim as a UTC instant.
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get_i64(name)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Claim names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Mutable claim collection used during assembly and customization.
#[derive(Debug, Clone, Default)]
pub struct ClaimsBuilder {
    claims: Map<String, Value>,
}

impl ClaimsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing claim set.
    pub fn from_claims(claims: &ClaimsSet) -> Self {
        Self {
            claims: claims.claims.clone(),
        }
    }

    pub fn issuer(&mut self, issuer: impl Into<String>) -> &mut Self {
        self.claim(names::ISS, issuer.into())
    }

    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.claim(names::SUB, subject.into())
    }

    pub fn audience(&mut self, audience: Vec<String>) -> &mut Self {
        self.claim(names::AUD, audience)
    }

    pub fn issued_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.claim(names::IAT, at.timestamp())
    }

    pub fn expires_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.claim(names::EXP, at.timestamp())
    }

    pub fn not_before(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.claim(names::NBF, at.timestamp())
    }

    pub fn id(&mut self, jti: impl Into<String>) -> &mut Self {
        self.claim(names::JTI, jti.into())
    }

    /// Set any claim, replacing a previous value of the same name.
    pub fn claim(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.claims.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// Freeze into a [`ClaimsSet`].
    pub fn build(self) -> ClaimsSet {
        ClaimsSet {
            claims: self.claims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_builder_keeps_insertion_order() {
        let mut builder = ClaimsBuilder::new();
        builder
            .issuer("https://auth.example.com")
            .subject("user-123")
            .audience(vec!["client-a".to_string()])
            .claim("custom", "x");

        let claims = builder.build();
        let names: Vec<&str> = claims.names().collect();
        assert_eq!(names, vec!["iss", "sub", "aud", "custom"]);
    }

    #[test]
    fn test_typed_accessors() {
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap();
        let mut builder = ClaimsBuilder::new();
        builder
            .subject("user-123")
            .audience(vec!["client-a".to_string()])
            .issued_at(now)
            .not_before(now)
            .expires_at(now + Duration::minutes(30))
            .id("jti-1");

        let claims = builder.build();
        assert_eq!(claims.subject(), Some("user-123"));
        assert_eq!(claims.audience(), vec!["client-a"]);
        assert_eq!(claims.issued_at(), Some(now));
        assert_eq!(claims.not_before(), Some(now));
        assert_eq!(claims.expires_at(), Some(now + Duration::minutes(30)));
        assert_eq!(claims.id(), Some("jti-1"));
        assert_eq!(claims.issuer(), None);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut builder = ClaimsBuilder::new();
        builder.claim("a", 1).claim("b", 2).claim("c", 3);
        assert_eq!(builder.remove("b"), Some(Value::from(2)));

        let claims = builder.build();
        assert_eq!(claims.names().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut builder = ClaimsBuilder::new();
        builder.subject("user-123").claim("sid", "s-1");
        let json = serde_json::to_string(&builder.build()).unwrap();
        assert_eq!(json, r#"{"sub":"user-123","sid":"s-1"}"#);
    }
}
