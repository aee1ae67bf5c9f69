//! Request context: who is calling, resolved once by the auth middleware.

use lib_auth::Claims;
use lib_core::model::Role;
use lib_core::{AppError, Scope};

#[derive(Debug, Clone, PartialEq)]
pub struct Ctx {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
    pub is_admin: bool,
}

impl Ctx {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let user_id = claims.user_id().map_err(AppError::Unauthorized)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::Unauthorized(format!("Unknown role in token: {}", claims.role)))?;

        Ok(Self {
            user_id,
            name: claims.name.clone(),
            role,
            is_admin: claims.is_admin,
        })
    }

    /// Admins see system-wide data, everyone else their own rows.
    pub fn scope(&self) -> Scope {
        if self.is_admin {
            Scope::System
        } else {
            Scope::User(self.user_id)
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Rows without an owner are system rows: readable by all, writable by admins.
    pub fn can_read(&self, owner: Option<i64>) -> bool {
        self.is_admin || owner.is_none() || owner == Some(self.user_id)
    }

    pub fn can_write(&self, owner: Option<i64>) -> bool {
        self.is_admin || owner == Some(self.user_id)
    }

    pub fn ensure_read(&self, owner: Option<i64>) -> Result<(), AppError> {
        if self.can_read(owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not allowed to view this record".to_string()))
        }
    }

    pub fn ensure_write(&self, owner: Option<i64>) -> Result<(), AppError> {
        if self.can_write(owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not allowed to modify this record".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(is_admin: bool) -> Ctx {
        Ctx {
            user_id: 5,
            name: "Dana".into(),
            role: if is_admin { Role::Admin } else { Role::Supplier },
            is_admin,
        }
    }

    #[test]
    fn test_from_claims() {
        let claims = Claims {
            sub: "5".into(),
            name: "Dana".into(),
            role: "supplier".into(),
            is_admin: false,
            exp: 0,
            iat: 0,
        };
        assert_eq!(Ctx::from_claims(&claims).unwrap(), ctx(false));

        let bad = Claims { role: "pilot".into(), ..claims };
        assert!(matches!(Ctx::from_claims(&bad), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_ownership_rules() {
        let user = ctx(false);
        assert!(user.can_read(Some(5)));
        assert!(user.can_read(None));
        assert!(!user.can_read(Some(6)));
        assert!(user.can_write(Some(5)));
        assert!(!user.can_write(None));

        let admin = ctx(true);
        assert!(admin.can_write(Some(6)));
        assert!(admin.can_write(None));
        assert_eq!(admin.scope(), Scope::System);
        assert_eq!(user.scope(), Scope::User(5));
    }
}
