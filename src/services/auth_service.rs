use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter, Set,
};
use validator::Validate;

use crate::{
    audit,
    dto::auth::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    mailer::{self, new_vendor_mail},
    middleware::auth::AuthUser,
    models::{ApprovalStatus, Role, User},
    response::{ApiResponse, Meta},
    session::issue_token,
    state::AppState,
    uploads::{self, AssetBase, MultipartForm},
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::internal("Invalid password hash"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Checks everything that can be checked without touching storage and
/// returns the role the account will get.
pub fn validate_registration(req: &RegisterRequest, has_license: bool) -> AppResult<Role> {
    let role = Role::parse_self_service(&req.role).ok_or_else(|| {
        AppError::bad_request("Invalid role! Role must be 'user' or 'vendor'")
    })?;

    req.validate()?;

    if role == Role::Vendor {
        if req.shop_name.is_none() || req.address.is_none() || !has_license {
            return Err(AppError::bad_request(
                "Vendor must provide shop_name, business_license, and address!",
            ));
        }
        if req.payment_method.is_none() || req.payment_details.is_none() {
            return Err(AppError::bad_request(
                "Vendor must provide payment method and payment details!",
            ));
        }
        if req.payment_method.as_deref() == Some("Bank") && req.bank_name.is_none() {
            return Err(AppError::bad_request(
                "Vendor must provide bank_name if payment method is Bank!",
            ));
        }
    }

    Ok(role)
}

pub async fn register(
    state: &AppState,
    assets: &AssetBase,
    form: MultipartForm,
) -> AppResult<ApiResponse<AuthResponse>> {
    let req = RegisterRequest::from_form(&form)
        .ok_or_else(|| AppError::bad_request("Please fill all required fields!"))?;
    let license = form.file("business_license");
    let role = validate_registration(&req, license.is_some())?;

    let existing = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Email.eq(req.email.as_str()))
                .add(UserCol::UserName.eq(req.user_name.as_str())),
        )
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists!".into()));
    }

    let password_hash = hash_password(&req.password)?;

    let license_name = match (role, license) {
        (Role::Vendor, Some(file)) => Some(uploads::store(&state.config.upload_dir, file).await?),
        _ => None,
    };

    let is_vendor = role == Role::Vendor;
    let active = UserActive {
        id: NotSet,
        user_name: Set(req.user_name.clone()),
        email: Set(req.email.clone()),
        password_hash: Set(password_hash),
        role: Set(role),
        phone: Set(Some(req.phone.clone())),
        shop_name: Set(req.shop_name.clone().filter(|_| is_vendor)),
        shop_logo: Set(None),
        profile_avatar: Set(None),
        address: Set(req.address.clone().filter(|_| is_vendor)),
        business_license: Set(license_name.clone()),
        payment_method: Set(req.payment_method.clone().filter(|_| is_vendor)),
        payment_details: Set(req.payment_details.clone().filter(|_| is_vendor)),
        bank_name: Set(req
            .bank_name
            .clone()
            .filter(|_| is_vendor && req.payment_method.as_deref() == Some("Bank"))),
        is_approved: Set(if is_vendor {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Approved
        }),
        created_at: NotSet,
        updated_at: NotSet,
    };

    let user = match active.insert(&state.orm).await {
        Ok(user) => user,
        Err(err) => {
            if let Some(name) = license_name {
                uploads::remove(&state.config.upload_dir, &[name]).await;
            }
            return Err(err.into());
        }
    };

    tracing::info!(user_id = user.id, role = %user.role, "account registered");
    audit::record(
        state,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role.as_str() }),
    )
    .await;

    let (token, message) = match role {
        Role::Vendor => {
            notify_admin_of_vendor(state, &user).await;
            (
                None,
                "vendor registered successfully! Your Detail has been sent to admin. Please wait for approval before login.",
            )
        }
        Role::User | Role::Admin => (
            Some(issue_token(&state.config, user.id, user.role)?),
            "user registered successfully!",
        ),
    };

    Ok(ApiResponse::success(
        message,
        AuthResponse {
            token,
            user: user_from_entity(user, assets),
        },
        Some(Meta::empty()),
    ))
}

async fn notify_admin_of_vendor(state: &AppState, vendor: &UserModel) {
    let admin = Users::find()
        .filter(UserCol::Role.eq(Role::Admin))
        .one(&state.orm)
        .await;
    match admin {
        Ok(Some(admin)) => {
            mailer::deliver(state.mailer.as_ref(), new_vendor_mail(&admin.email, vendor)).await
        }
        Ok(None) => tracing::warn!(vendor_id = vendor.id, "no admin account to notify"),
        Err(err) => tracing::warn!(vendor_id = vendor.id, error = %err, "admin lookup failed"),
    }
}

fn credentials(payload: LoginRequest, missing: &str) -> AppResult<(String, String)> {
    match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            Ok((email.trim().to_string(), password))
        }
        _ => Err(AppError::bad_request(missing)),
    }
}

/// Vendors get a session only once an admin approved them.
pub fn ensure_sign_in_allowed(role: Role, approval: ApprovalStatus) -> AppResult<()> {
    match (role, approval) {
        (Role::Vendor, ApprovalStatus::Pending) => Err(AppError::forbidden(
            "Your account is pending approval by admin.",
        )),
        (Role::Vendor, ApprovalStatus::Rejected) => {
            Err(AppError::forbidden("Your account was rejected by admin."))
        }
        _ => Ok(()),
    }
}

pub async fn login(
    state: &AppState,
    assets: &AssetBase,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let (email, password) = credentials(payload, "Please enter both email and password")?;

    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    ensure_sign_in_allowed(user.role, user.is_approved)?;

    let token = issue_token(&state.config, user.id, user.role)?;
    let message = format!("{} logged in successfully!", user.role);
    tracing::info!(user_id = user.id, "login");

    Ok(ApiResponse::success(
        message,
        AuthResponse {
            token: Some(token),
            user: user_from_entity(user, assets),
        },
        Some(Meta::empty()),
    ))
}

pub async fn admin_login(
    state: &AppState,
    assets: &AssetBase,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let (email, password) = credentials(payload, "Please provide email and password")?;

    let admin = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
        .filter(|u| u.role == Role::Admin)
        .ok_or_else(|| AppError::unauthorized("Invalid email or not authorized as admin"))?;

    if !verify_password(&password, &admin.password_hash)? {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(&state.config, admin.id, admin.role)?;
    Ok(ApiResponse::success(
        "Admin logged in successfully",
        AuthResponse {
            token: Some(token),
            user: user_from_entity(admin, assets),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ApiResponse::success(
        "Profile",
        user_from_entity(model, assets),
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    assets: &AssetBase,
    form: MultipartForm,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let update = ProfileUpdate::from_form(&form);
    if update
        .user_name
        .as_ref()
        .is_some_and(|name| name.chars().count() < 3)
    {
        return Err(AppError::bad_request(
            "Username must contain at least 3 characters!",
        ));
    }

    let upload_dir = &state.config.upload_dir;
    let avatar = match form.file("profileAvatar") {
        Some(file) => Some(uploads::store(upload_dir, file).await?),
        None => None,
    };
    let shop_logo = match (existing.role, form.file("shop_logo")) {
        (Role::Vendor, Some(file)) => Some(uploads::store(upload_dir, file).await?),
        _ => None,
    };

    let mut replaced = Vec::new();
    let role = existing.role;
    let mut active: UserActive = existing.clone().into();
    if let Some(user_name) = update.user_name {
        active.user_name = Set(user_name);
    }
    if let Some(email) = update.email {
        active.email = Set(email);
    }
    if let Some(phone) = update.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(password) = update.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(name) = &avatar {
        replaced.extend(existing.profile_avatar.clone());
        active.profile_avatar = Set(Some(name.clone()));
    }
    if role == Role::Vendor {
        if let Some(shop_name) = update.shop_name {
            active.shop_name = Set(Some(shop_name));
        }
        if let Some(address) = update.address {
            active.address = Set(Some(address));
        }
        if let Some(name) = &shop_logo {
            replaced.extend(existing.shop_logo.clone());
            active.shop_logo = Set(Some(name.clone()));
        }
    }
    active.updated_at = Set(Utc::now().into());

    let updated = match active.update(&state.orm).await {
        Ok(updated) => updated,
        Err(err) => {
            let fresh: Vec<String> = avatar.into_iter().chain(shop_logo).collect();
            uploads::remove(upload_dir, &fresh).await;
            return Err(err.into());
        }
    };
    uploads::remove(upload_dir, &replaced).await;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        user_from_entity(updated, assets),
        Some(Meta::empty()),
    ))
}

pub fn user_from_entity(model: UserModel, assets: &AssetBase) -> User {
    User {
        id: model.id,
        user_name: model.user_name,
        email: model.email,
        role: model.role,
        phone: model.phone,
        shop_name: model.shop_name,
        shop_logo: assets.url_opt(model.shop_logo.as_deref()),
        profile_avatar: assets.url_opt(model.profile_avatar.as_deref()),
        address: model.address,
        business_license: assets.url_opt(model.business_license.as_deref()),
        payment_method: model.payment_method,
        payment_details: model.payment_details,
        bank_name: model.bank_name,
        is_approved: model.is_approved,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
