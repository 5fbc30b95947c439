use axum::extract::FromRequestParts;
use sea_orm::EntityTrait;

use crate::{
    entity::users::{Entity as Users, Model as UserModel},
    error::AppError,
    models::{ApprovalStatus, Role},
    session::{decode_token, token_from_headers},
    state::AppState,
};

/// The caller behind a verified token, loaded fresh from the database.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
    pub approval: ApprovalStatus,
}

impl From<&UserModel> for AuthUser {
    fn from(user: &UserModel) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            approval: user.is_approved,
        }
    }
}

pub fn ensure_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if !allowed.contains(&user.role) {
        return Err(AppError::forbidden(format!(
            "User with this role ({}) not allowed to access this resource",
            user.role
        )));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Admin])
}

/// Vendors act on the catalog only once an admin approved the account.
pub fn ensure_vendor(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Vendor])?;
    match user.approval {
        ApprovalStatus::Approved => Ok(()),
        ApprovalStatus::Pending => Err(AppError::forbidden(
            "Your account is pending approval by admin.",
        )),
        ApprovalStatus::Rejected => Err(AppError::forbidden(
            "Your account was rejected by admin.",
        )),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::bad_request("User is not authenticated!"))?;

        let claims = decode_token(&state.config, &token)?;

        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user id in token"))?;

        let user = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        Ok(AuthUser::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, approval: ApprovalStatus) -> AuthUser {
        AuthUser {
            user_id: 1,
            role,
            approval,
        }
    }

    #[test]
    fn role_gate_names_the_rejected_role() {
        let err = ensure_admin(&user(Role::Vendor, ApprovalStatus::Approved)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User with this role (vendor) not allowed to access this resource"
        );
        assert!(ensure_role(&user(Role::User, ApprovalStatus::Approved), &[Role::User, Role::Admin]).is_ok());
    }

    #[test]
    fn vendor_gate_requires_approval() {
        assert!(ensure_vendor(&user(Role::Vendor, ApprovalStatus::Approved)).is_ok());
        assert!(matches!(
            ensure_vendor(&user(Role::Vendor, ApprovalStatus::Pending)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_vendor(&user(Role::Vendor, ApprovalStatus::Rejected)),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_vendor(&user(Role::Admin, ApprovalStatus::Approved)).is_err());
    }
}
