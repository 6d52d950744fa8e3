//! Sign-up, approval, removal and login.

use chrono::Utc;
use leadboard_core::affiliate::{
    Credential, NewRegistration, Registration, is_valid_utm_id, normalize_username,
    validate_registration,
};
use leadboard_core::auth::{hash_password, verify_password};
use leadboard_core::earnings::UtmSummary;
use leadboard_shared::auth::{Role, SessionUser};
use leadboard_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use super::Workbook;

/// Admin choices when approving a registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveInput {
    /// UTM id to assign. Falls back to the one requested at sign-up.
    #[serde(default)]
    pub utm_id: Option<String>,
    /// Payout per lead. Falls back to the existing summary row, then the
    /// configured default.
    #[serde(default)]
    pub rate_per_lead: Option<Decimal>,
}

/// What an approval produced.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Approval {
    /// The new credential.
    pub credential: Credential,
    /// The affiliate's UTM summary row after the approval.
    pub summary: UtmSummary,
}

/// Checks a password against a stored hash. Malformed hashes never match.
fn password_matches(password: &str, hash: &str, username: &str) -> bool {
    match verify_password(password, hash) {
        Ok(matched) => matched,
        Err(e) => {
            warn!(username, error = %e, "Stored password hash could not be checked");
            false
        }
    }
}

impl Workbook {
    fn is_admin_name(&self, username: &str) -> bool {
        normalize_username(&self.admin.username) == username
    }

    /// Records a new sign-up as a pending registration.
    ///
    /// # Errors
    ///
    /// - `Validation` when a field breaks the sign-up rules
    /// - `Conflict` when the username is pending, approved, or the admin's
    /// - `ExternalService` when the spreadsheet call fails
    pub async fn register(&self, input: NewRegistration) -> AppResult<Registration> {
        let input = validate_registration(input)?;
        if self.is_admin_name(&input.username) {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let _guard = self.lock().await;

        if self.credentials.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
        if self.registrations.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict(
                "A registration for this username is already pending".to_string(),
            ));
        }

        let registration = Registration {
            password_hash: hash_password(&input.password)?,
            name: input.name,
            email: input.email,
            social_link: input.social_link,
            mobile: input.mobile,
            username: input.username,
            utm_id: input.utm_id,
            submitted_at: Some(Utc::now()),
        };
        self.registrations.create(&registration).await?;

        info!(username = %registration.username, "Registration submitted");
        Ok(registration)
    }

    /// Moves a pending registration to the credentials tab and sets up its
    /// UTM summary row.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no registration exists for `username`
    /// - `Validation` when no usable UTM id is given or the rate is negative
    /// - `BusinessRule` when leads × rate is out of range
    /// - `Conflict` when the username is already approved or the UTM id
    ///   belongs to another affiliate
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn approve(&self, username: &str, input: ApproveInput) -> AppResult<Approval> {
        let username = normalize_username(username);
        if input.rate_per_lead.is_some_and(|r| r < Decimal::ZERO) {
            return Err(AppError::Validation(
                "rate_per_lead must not be negative".to_string(),
            ));
        }

        let _guard = self.lock().await;

        let registration = self
            .registrations
            .find_by_username(&username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No pending registration for {username}")))?;

        if self.credentials.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(format!("{username} is already approved")));
        }

        let utm_id = input
            .utm_id
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or(registration.utm_id.as_deref())
            .ok_or_else(|| AppError::Validation("utm_id is required".to_string()))?
            .to_string();
        if !is_valid_utm_id(&utm_id) {
            return Err(AppError::Validation(
                "UTM id must be 1-64 characters of letters, digits, '_' or '-'".to_string(),
            ));
        }
        if let Some(owner) = self.credentials.find_by_utm(&utm_id).await? {
            return Err(AppError::Conflict(format!(
                "UTM id {utm_id} is already assigned to {}",
                owner.username
            )));
        }

        let leads = self.lead_report.leads_for(&utm_id).await?;
        let existing_rate = self
            .utm_summaries
            .find(&utm_id)
            .await?
            .map(|s| s.rate_per_lead);
        let rate = input
            .rate_per_lead
            .or(existing_rate)
            .unwrap_or_else(|| self.utm_summaries.default_rate());
        let summary = UtmSummary::new(utm_id.clone(), leads, rate)?;

        let credential = Credential::from_registration(&registration, utm_id, Utc::now());
        self.credentials.create(&credential).await?;
        self.registrations.delete_by_username(&username).await?;
        self.utm_summaries.upsert(&summary).await?;

        info!(
            username = %credential.username,
            utm_id = %credential.utm_id,
            rate_per_lead = %rate,
            "Registration approved"
        );
        Ok(Approval {
            credential,
            summary,
        })
    }

    /// Deletes a pending registration.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no registration exists for `username`
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn reject(&self, username: &str) -> AppResult<()> {
        let username = normalize_username(username);
        let _guard = self.lock().await;

        if !self.registrations.delete_by_username(&username).await? {
            return Err(AppError::NotFound(format!(
                "No pending registration for {username}"
            )));
        }

        info!(username = %username, "Registration rejected");
        Ok(())
    }

    /// Deletes an affiliate's credential and any leftover registration row.
    ///
    /// # Errors
    ///
    /// - `NotFound` when neither tab has the username
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn remove_affiliate(&self, username: &str) -> AppResult<()> {
        let username = normalize_username(username);
        let _guard = self.lock().await;

        let removed_credential = self.credentials.delete_by_username(&username).await?;
        let removed_registration = self.registrations.delete_by_username(&username).await?;
        if !removed_credential && !removed_registration {
            return Err(AppError::NotFound(format!("No affiliate named {username}")));
        }

        info!(username = %username, removed_credential, removed_registration, "Affiliate removed");
        Ok(())
    }

    /// Checks a username and password.
    ///
    /// The configured admin is checked first, then the credentials tab. A
    /// correct password for a registration that is still pending is refused
    /// with `Forbidden` so the client can say so.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for unknown users or wrong passwords
    /// - `Forbidden` when the account is awaiting approval
    /// - `ExternalService` when a spreadsheet call fails
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<SessionUser> {
        let username = normalize_username(username);
        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

        if self.is_admin_name(&username) {
            if !password_matches(password, &self.admin.password_hash, &username) {
                info!(username = %username, "Failed admin login");
                return Err(invalid());
            }
            return Ok(SessionUser {
                username,
                name: "Administrator".to_string(),
                role: Role::Admin,
                utm_id: None,
            });
        }

        if let Some(credential) = self.credentials.find_by_username(&username).await? {
            if !password_matches(password, &credential.password_hash, &username) {
                info!(username = %username, "Failed login - invalid password");
                return Err(invalid());
            }
            return Ok(SessionUser {
                username: credential.username,
                name: credential.name,
                role: Role::Affiliate,
                utm_id: Some(credential.utm_id),
            });
        }

        if let Some(registration) = self.registrations.find_by_username(&username).await?
            && password_matches(password, &registration.password_hash, &username)
        {
            info!(username = %username, "Login refused - registration pending");
            return Err(AppError::Forbidden(
                "Your registration is awaiting admin approval".to_string(),
            ));
        }

        info!(username = %username, "Failed login - unknown user");
        Err(invalid())
    }
}
