//! Order confirmation emails
//!
//! Two messages per confirmed order: a plaintext notification to the shop
//! operator carrying every order field, and an HTML receipt to the customer
//! with the subset they care about. Both go through the same transport and
//! sender identity; the operator address is the reply-to on both.

use crate::orders::view::CustomerInfo;
use crate::services::mailer::{EmailBody, MailError, MailResult, Mailer, OutboundEmail};
use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn success(message_id: Option<String>) -> Self {
        Self {
            sent: true,
            message_id,
            error: None,
        }
    }

    fn failure(err: &MailError) -> Self {
        Self {
            sent: false,
            message_id: None,
            error: Some(err.to_string()),
        }
    }
}

/// Combined outcome of the operator and customer sends.
///
/// Both messages are attempted unconditionally; a partial failure is reported
/// here rather than aborting after the first error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub operator: DispatchOutcome,
    pub customer: DispatchOutcome,
}

impl DispatchReport {
    pub fn all_sent(&self) -> bool {
        self.operator.sent && self.customer.sent
    }
}

pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    operator_email: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, operator_email: impl Into<String>) -> Self {
        Self {
            mailer,
            operator_email: operator_email.into(),
        }
    }

    /// Send both confirmation emails for one paid order.
    ///
    /// An absent transport configuration fails the whole operation; any other
    /// failure on either side is collected into the report so the caller
    /// learns about partial delivery instead of a blind throw.
    pub async fn send_order_confirmation(
        &self,
        info: &CustomerInfo,
    ) -> MailResult<DispatchReport> {
        info!(
            reference = %info.reference,
            customer_email = %info.email,
            "sending order confirmation emails"
        );

        let operator_result = self
            .mailer
            .send(OutboundEmail {
                to: self.operator_email.clone(),
                reply_to: self.operator_email.clone(),
                subject: format!("Nouvelle commande - {}", info.reference),
                body: EmailBody::Text(operator_text(info)),
            })
            .await;

        if let Err(MailError::NotConfigured { .. }) = operator_result {
            return Err(operator_result.unwrap_err());
        }

        let customer_result = self
            .mailer
            .send(OutboundEmail {
                to: info.email.clone(),
                reply_to: self.operator_email.clone(),
                subject: "Confirmation de commande - L'Avenue 120".to_string(),
                body: EmailBody::Html(customer_html(info)),
            })
            .await;

        let report = DispatchReport {
            operator: match &operator_result {
                Ok(receipt) => DispatchOutcome::success(receipt.message_id.clone()),
                Err(e) => DispatchOutcome::failure(e),
            },
            customer: match &customer_result {
                Ok(receipt) => DispatchOutcome::success(receipt.message_id.clone()),
                Err(e) => DispatchOutcome::failure(e),
            },
        };

        if report.all_sent() {
            info!(reference = %info.reference, "confirmation emails sent");
        } else {
            error!(
                reference = %info.reference,
                operator_error = ?report.operator.error,
                customer_error = ?report.customer.error,
                "confirmation email dispatch incomplete"
            );
        }

        Ok(report)
    }
}

/// Operator-facing plaintext message with every order field.
fn operator_text(info: &CustomerInfo) -> String {
    format!(
        "Nouvelle commande reçue :\n\
         \n\
         Référence: {reference}\n\
         Montant: {amount}€\n\
         Méthode de livraison: {shipping_method}\n\
         \n\
         Informations client:\n\
         -------------------\n\
         Nom: {last_name}\n\
         Prénom: {first_name}\n\
         Email: {email}\n\
         Téléphone: {phone}\n\
         Pseudo TikTok: {tiktok_pseudo}\n\
         \n\
         Adresse de livraison:\n\
         --------------------\n\
         {address}\n\
         {postal_code} {city}\n",
        reference = info.reference,
        amount = info.amount,
        shipping_method = info.shipping_method,
        last_name = info.last_name,
        first_name = info.first_name,
        email = info.email,
        phone = info.phone,
        tiktok_pseudo = info.tiktok_pseudo,
        address = info.address,
        postal_code = info.postal_code,
        city = info.city,
    )
}

/// Customer-facing HTML receipt.
fn customer_html(info: &CustomerInfo) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ text-align: center; padding: 20px 0; }}
    .logo {{ font-size: 24px; font-weight: bold; color: #000; }}
    .content {{ background: #f9f9f9; padding: 20px; border-radius: 8px; }}
    .order-info {{ background: #fff; padding: 15px; border-radius: 4px; margin: 10px 0; }}
    .footer {{ text-align: center; margin-top: 20px; font-size: 12px; color: #666; }}
    .highlight {{ color: #000; font-weight: bold; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <div class="logo">L'Avenue 120</div>
    </div>

    <div class="content">
      <h2>Merci pour votre commande !</h2>
      <p>Cher(e) {first_name},</p>
      <p>Nous avons bien reçu votre commande et nous vous en remercions ! Voici un récapitulatif de votre commande :</p>

      <div class="order-info">
        <p><span class="highlight">Référence de commande :</span> {reference}</p>
        <p><span class="highlight">Montant total :</span> {amount}€</p>
        <p><span class="highlight">Mode de livraison :</span> {shipping_label}</p>
      </div>

      <div class="order-info">
        <p><span class="highlight">Adresse de livraison :</span></p>
        <p>{first_name} {last_name}</p>
        <p>{address}</p>
        <p>{postal_code} {city}</p>
      </div>

      <p>Nous vous tiendrons informé(e) de l'expédition de votre commande par email.</p>

      <p>Si vous avez des questions, n'hésitez pas à nous contacter :</p>
      <p>📧 lavenue120@gmail.com</p>
      <p>📱 TikTok : @lavenue120</p>
    </div>

    <div class="footer">
      <p>L'Avenue 120 - Parfums de Luxe</p>
      <p>© {year} Tous droits réservés</p>
    </div>
  </div>
</body>
</html>
"#,
        first_name = info.first_name,
        last_name = info.last_name,
        reference = info.reference,
        amount = info.amount,
        shipping_label = info.shipping_label(),
        address = info.address,
        postal_code = info.postal_code,
        city = info.city,
        year = Utc::now().year(),
    )
}
