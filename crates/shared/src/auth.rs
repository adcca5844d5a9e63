//! Authentication claims carried by bearer tokens.
//!
//! Token issuance belongs to the upstream auth service; this crate only needs
//! to read the tenant out of a validated token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::OwnerId;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID). Every invoice, customer and sales invoice row is
    /// owned by this user.
    pub sub: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the tenant the token is scoped to.
    ///
    /// A nil subject never identifies a tenant.
    #[must_use]
    pub fn owner_id(&self) -> Option<OwnerId> {
        (!self.sub.is_nil()).then_some(OwnerId::from_uuid(self.sub))
    }
}
