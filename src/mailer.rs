//! Outbound notifications.
//!
//! Delivery is always best effort: callers log a failed send and carry on,
//! a state change that triggered the mail is never rolled back.

use async_trait::async_trait;
use serde::Serialize;

use crate::{config::AppConfig, entity::users::Model as UserModel, models::ApprovalStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> anyhow::Result<()>;
}

/// Writes mails to the log instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail (not delivered, no relay configured)");
        Ok(())
    }
}

/// Posts mails as JSON to an HTTP relay.
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        let payload = RelayPayload {
            from: &self.from,
            to: &mail.to,
            subject: &mail.subject,
            html: &mail.html,
        };
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request.send().await?.error_for_status()?;
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail sent");
        Ok(())
    }
}

pub fn mailer_from_config(config: &AppConfig) -> std::sync::Arc<dyn Mailer> {
    match &config.mail_api_url {
        Some(url) => std::sync::Arc::new(HttpMailer::new(
            url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        )),
        None => std::sync::Arc::new(LogMailer),
    }
}

/// Send and swallow the error, logging it.
pub async fn deliver(mailer: &dyn Mailer, mail: Mail) {
    let to = mail.to.clone();
    if let Err(err) = mailer.send(mail).await {
        tracing::warn!(error = %err, to = %to, "mail delivery failed");
    }
}

pub fn vendor_decision_mail(vendor: &UserModel, status: ApprovalStatus) -> Option<Mail> {
    let (subject, body) = match status {
        ApprovalStatus::Approved => (
            "Your Vendor Account is Approved!",
            "Your vendor account has been <strong>approved</strong>. You can now login and use the Website.",
        ),
        ApprovalStatus::Rejected => (
            "Your Vendor Account is Rejected",
            "We regret to inform you that your vendor account has been <strong>rejected</strong>. Please contact support for more information.",
        ),
        ApprovalStatus::Pending => return None,
    };

    Some(Mail {
        to: vendor.email.clone(),
        subject: subject.to_string(),
        html: format!(
            "<h3>Dear {},</h3><p>{}</p>",
            escape_html(&vendor.user_name),
            body
        ),
    })
}

pub fn new_vendor_mail(admin_email: &str, vendor: &UserModel) -> Mail {
    let field = |label: &str, value: Option<&str>| {
        format!(
            "<p><strong>{label}:</strong> {}</p>",
            escape_html(value.unwrap_or("-"))
        )
    };

    let mut html = String::from("<h3>New Vendor Registered</h3>");
    html.push_str(&field("Name", Some(&vendor.user_name)));
    html.push_str(&field("Email", Some(&vendor.email)));
    html.push_str(&field("Phone", vendor.phone.as_deref()));
    html.push_str(&field("Shop Name", vendor.shop_name.as_deref()));
    html.push_str(&field("Payment Method", vendor.payment_method.as_deref()));
    html.push_str(&field("Account Number", vendor.payment_details.as_deref()));
    if vendor.bank_name.is_some() {
        html.push_str(&field("Bank Name", vendor.bank_name.as_deref()));
    }

    Mail {
        to: admin_email.to_string(),
        subject: "New Vendor Registration".to_string(),
        html,
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn vendor() -> UserModel {
        let now = Utc::now().fixed_offset();
        UserModel {
            id: 7,
            user_name: "Ada <Shop>".into(),
            email: "ada@example.com".into(),
            password_hash: "x".into(),
            role: Role::Vendor,
            phone: Some("555".into()),
            shop_name: Some("Ada's".into()),
            shop_logo: None,
            profile_avatar: None,
            address: Some("Main St".into()),
            business_license: Some("license.pdf".into()),
            payment_method: Some("Bank".into()),
            payment_details: Some("0012".into()),
            bank_name: Some("First Bank".into()),
            is_approved: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn decision_mails_match_outcome() {
        let approved = vendor_decision_mail(&vendor(), ApprovalStatus::Approved).unwrap();
        assert_eq!(approved.to, "ada@example.com");
        assert_eq!(approved.subject, "Your Vendor Account is Approved!");
        assert!(approved.html.contains("Ada &lt;Shop&gt;"));

        let rejected = vendor_decision_mail(&vendor(), ApprovalStatus::Rejected).unwrap();
        assert!(rejected.html.contains("rejected"));

        assert!(vendor_decision_mail(&vendor(), ApprovalStatus::Pending).is_none());
    }

    #[test]
    fn new_vendor_mail_lists_bank_when_present() {
        let mail = new_vendor_mail("admin@example.com", &vendor());
        assert_eq!(mail.to, "admin@example.com");
        assert!(mail.html.contains("First Bank"));

        let mut no_bank = vendor();
        no_bank.bank_name = None;
        assert!(!new_vendor_mail("admin@example.com", &no_bank).html.contains("Bank Name"));
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _mail: Mail) -> anyhow::Result<()> {
            anyhow::bail!("relay down")
        }
    }

    #[tokio::test]
    async fn deliver_swallows_failures() {
        let mail = new_vendor_mail("admin@example.com", &vendor());
        deliver(&FailingMailer, mail).await;
    }
}
