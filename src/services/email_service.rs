use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;

/// Envoi des emails de validation pour les annonces anonymes
/// Configuré au démarrage depuis les variables d'environnement
#[derive(Clone)]
pub struct EmailService {
    smtp_host: String,
    smtp_username: String,
    smtp_password: String,
    from: String,
    base_url: String,
}

impl EmailService {
    pub fn from_env() -> Self {
        EmailService {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: env::var("SMTP_FROM").unwrap_or_else(|_| "no-reply@marketplace.local".to_string()),
            base_url: env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }

    /// Envoie le lien de validation (le token expire après 24 heures)
    pub fn send_validation_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        listing_title: &str,
        token: &str,
    ) -> Result<(), String> {
        let validation_link = format!("{}/api/listings/validate?token={}", self.base_url, token);

        let email = Message::builder()
            .from(Mailbox::new(
                Some("Marketplace".to_owned()),
                self.from
                    .parse()
                    .map_err(|e| format!("Failed to parse sender email: {}", e))?,
            ))
            .to(Mailbox::new(
                to_name.map(|n| n.to_owned()),
                to_email
                    .parse()
                    .map_err(|e| format!("Failed to parse receiver email: {}", e))?,
            ))
            .subject("Confirmă anunțul tău")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Salut,\n\nAnunțul \"{}\" a fost înregistrat.\n\
                 Confirmă-l în următoarele 24 de ore accesând linkul:\n{}\n\n\
                 Dacă nu ai publicat acest anunț, ignoră acest email.",
                listing_title, validation_link
            ))
            .map_err(|e| format!("Failed to build a message: {}", e))?;

        let creds = Credentials::new(self.smtp_username.clone(), self.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.smtp_host)
            .map_err(|e| format!("Wrong smtp transport: {}", e))?
            .credentials(creds)
            .build();

        mailer
            .send(&email)
            .map_err(|e| format!("failed to send an email: {}", e))?;

        Ok(())
    }
}
