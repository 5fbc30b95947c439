use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{models::User, uploads::MultipartForm};

/// Registration form, assembled from the multipart body.
#[derive(Debug, Clone, Default, Validate, ToSchema)]
#[validate(schema(function = "validate_passwords_match"))]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Username must contain at least 3 characters!"))]
    pub user_name: String,
    #[validate(email(message = "Please provide a valid email!"))]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 6, message = "Password must contain at least 6 characters!"))]
    pub password: String,
    pub confirm_password: String,
    pub role: String,
    pub shop_name: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<String>,
    pub bank_name: Option<String>,
}

fn validate_passwords_match(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req.password != req.confirm_password {
        return Err(ValidationError::new("password_mismatch")
            .with_message("Passwords do not match!".into()));
    }
    Ok(())
}

impl RegisterRequest {
    /// `None` when one of the fields every account needs is missing.
    pub fn from_form(form: &MultipartForm) -> Option<Self> {
        Some(Self {
            user_name: form.text("user_name")?,
            email: form.text("email")?,
            phone: form.text("phone")?,
            password: form.text("password")?,
            confirm_password: form.text("confirm_password")?,
            role: form.text("role")?,
            shop_name: form.text("shop_name"),
            address: form.text("address"),
            payment_method: form.text("payment_method"),
            payment_details: form.text("payment_details"),
            bank_name: form.text("bank_name"),
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: Option<String>,
    pub user: User,
}

#[derive(Debug, Default, ToSchema)]
pub struct ProfileUpdate {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub shop_name: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn from_form(form: &MultipartForm) -> Self {
        Self {
            user_name: form.text("user_name"),
            email: form.text("email"),
            phone: form.text("phone"),
            password: form.text("password"),
            shop_name: form.text("shop_name"),
            address: form.text("address"),
        }
    }
}
