//! Transactional email via AWS SES v2
//!
//! Templates render to [`Rendered`] (subject + HTML + text) so they can be
//! checked without SES. Sending is fire-and-forget: the request that
//! triggered an email never fails because delivery did.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use rust_decimal::Decimal;
use shared::models::{Booking, GiftCard, PhotoChallenge};

use crate::db::BoxError;

/// A rendered email ready for SES
#[derive(Debug, Clone)]
pub struct Rendered {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Escape user-provided text for embedding in HTML bodies
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn money(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {}", amount, currency.to_uppercase())
}

fn when(booking: &Booking) -> String {
    match (&booking.start_time, &booking.end_time) {
        (Some(start), Some(end)) => format!("{} {}–{}", booking.date, start, end),
        _ => format!("{} (whole day)", booking.date),
    }
}

/// Wrap body paragraphs (already escaped) in a minimal HTML document
fn html_document(title: &str, paragraphs: &[String]) -> String {
    let mut html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>",
        escape_html(title)
    );
    for p in paragraphs {
        html.push_str("<p>");
        html.push_str(p);
        html.push_str("</p>");
    }
    html.push_str("</body></html>");
    html
}

pub mod templates {
    use super::*;

    pub fn booking_confirmation(booking: &Booking, service_name: &str, currency: &str) -> Rendered {
        let subject = format!("Booking received: {service_name} on {}", booking.date);
        let text = format!(
            "Hi {name},\n\n\
             We received your booking for {service_name} on {when}.\n\
             Total: {total}\n\
             Booking reference: {id}\n\n\
             We will confirm it shortly.",
            name = booking.client_name,
            when = when(booking),
            total = money(booking.total, currency),
            id = booking.id,
        );
        let html = html_document(
            &subject,
            &[
                format!("Hi {},", escape_html(&booking.client_name)),
                format!(
                    "We received your booking for <strong>{}</strong> on {}.",
                    escape_html(service_name),
                    escape_html(&when(booking))
                ),
                format!("Total: {}<br>Booking reference: {}", money(booking.total, currency), booking.id),
                "We will confirm it shortly.".to_string(),
            ],
        );
        Rendered { subject, html, text }
    }

    pub fn studio_new_booking(booking: &Booking, service_name: &str, currency: &str) -> Rendered {
        let subject = format!("New booking: {service_name} on {}", booking.date);
        let phone = booking.client_phone.as_deref().unwrap_or("-");
        let notes = booking.notes.as_deref().unwrap_or("-");
        let text = format!(
            "{service_name} on {when}\n\
             Client: {name} <{email}>, phone {phone}\n\
             Total: {total}\n\
             Notes: {notes}\n\
             Booking #{id}",
            when = when(booking),
            name = booking.client_name,
            email = booking.client_email,
            total = money(booking.total, currency),
            id = booking.id,
        );
        let html = html_document(
            &subject,
            &[
                format!("<strong>{}</strong> on {}", escape_html(service_name), escape_html(&when(booking))),
                format!(
                    "Client: {} &lt;{}&gt;, phone {}",
                    escape_html(&booking.client_name),
                    escape_html(&booking.client_email),
                    escape_html(phone)
                ),
                format!("Total: {}", money(booking.total, currency)),
                format!("Notes: {}", escape_html(notes)),
                format!("Booking #{}", booking.id),
            ],
        );
        Rendered { subject, html, text }
    }

    pub fn booking_status_changed(booking: &Booking, service_name: &str) -> Rendered {
        let status = booking.status.as_str();
        let subject = format!("Your booking is now {status}");
        let text = format!(
            "Hi {name},\n\nYour booking for {service_name} on {when} is now {status}.",
            name = booking.client_name,
            when = when(booking),
        );
        let html = html_document(
            &subject,
            &[
                format!("Hi {},", escape_html(&booking.client_name)),
                format!(
                    "Your booking for {} on {} is now <strong>{}</strong>.",
                    escape_html(service_name),
                    escape_html(&when(booking)),
                    status
                ),
            ],
        );
        Rendered { subject, html, text }
    }

    pub fn gift_card_delivery(card: &GiftCard, currency: &str, shop_url: &str) -> Rendered {
        let recipient = card.recipient_name.as_deref().unwrap_or("there");
        let subject = format!("{} sent you a photo session gift card", card.purchaser_name);
        let message = card.message.as_deref().unwrap_or("");
        let expires = chrono::DateTime::from_timestamp_millis(card.expires_at)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let text = format!(
            "Hi {recipient},\n\n\
             {from} sent you a gift card worth {amount}.\n\
             {message}\n\n\
             Code: {code}\n\
             Valid until: {expires}\n\
             Book your session at {shop_url}",
            from = card.purchaser_name,
            amount = money(card.initial_amount, currency),
            code = card.code,
        );
        let mut paragraphs = vec![
            format!("Hi {},", escape_html(recipient)),
            format!(
                "{} sent you a gift card worth <strong>{}</strong>.",
                escape_html(&card.purchaser_name),
                money(card.initial_amount, currency)
            ),
        ];
        if !message.is_empty() {
            paragraphs.push(format!("<em>{}</em>", escape_html(message)));
        }
        paragraphs.push(format!(
            "Code: <strong>{}</strong><br>Valid until: {}",
            escape_html(&card.code),
            expires
        ));
        paragraphs.push(format!(
            "<a href=\"{url}\">{url}</a>",
            url = escape_html(shop_url)
        ));
        let html = html_document(&subject, &paragraphs);
        Rendered { subject, html, text }
    }

    pub fn gift_card_receipt(card: &GiftCard, currency: &str) -> Rendered {
        let subject = "Your gift card purchase".to_string();
        let delivered_to = card.recipient_email.as_deref().unwrap_or(&card.purchaser_email);
        let text = format!(
            "Hi {name},\n\n\
             Thank you for your purchase of a {amount} gift card.\n\
             Code: {code}\n\
             The card was delivered to {delivered_to}.",
            name = card.purchaser_name,
            amount = money(card.initial_amount, currency),
            code = card.code,
        );
        let html = html_document(
            &subject,
            &[
                format!("Hi {},", escape_html(&card.purchaser_name)),
                format!(
                    "Thank you for your purchase of a {} gift card.",
                    money(card.initial_amount, currency)
                ),
                format!("Code: <strong>{}</strong>", escape_html(&card.code)),
                format!("The card was delivered to {}.", escape_html(delivered_to)),
            ],
        );
        Rendered { subject, html, text }
    }

    pub fn challenge_invitation(challenge: &PhotoChallenge, service_name: &str, invite_url: &str) -> Rendered {
        let subject = format!("{} challenged you to a photo session", challenge.sender_name);
        let message = challenge.message.as_deref().unwrap_or("");
        let text = format!(
            "Hi {recipient},\n\n\
             {sender} invites you to a {service_name} with {pct}% off.\n\
             {message}\n\n\
             Answer the challenge: {invite_url}",
            recipient = challenge.recipient_name,
            sender = challenge.sender_name,
            pct = challenge.discount_percent,
        );
        let mut paragraphs = vec![
            format!("Hi {},", escape_html(&challenge.recipient_name)),
            format!(
                "{} invites you to a <strong>{}</strong> with {}% off.",
                escape_html(&challenge.sender_name),
                escape_html(service_name),
                challenge.discount_percent
            ),
        ];
        if !message.is_empty() {
            paragraphs.push(format!("<em>{}</em>", escape_html(message)));
        }
        paragraphs.push(format!(
            "<a href=\"{url}\">Answer the challenge</a>",
            url = escape_html(invite_url)
        ));
        let html = html_document(&subject, &paragraphs);
        Rendered { subject, html, text }
    }

    pub fn challenge_accepted(challenge: &PhotoChallenge) -> Rendered {
        let subject = format!("{} accepted your photo challenge", challenge.recipient_name);
        let text = format!(
            "Hi {sender},\n\n{recipient} accepted your photo challenge. \
             We will let you know once the session is scheduled.",
            sender = challenge.sender_name,
            recipient = challenge.recipient_name,
        );
        let html = html_document(
            &subject,
            &[
                format!("Hi {},", escape_html(&challenge.sender_name)),
                format!(
                    "{} accepted your photo challenge. We will let you know once the session is scheduled.",
                    escape_html(&challenge.recipient_name)
                ),
            ],
        );
        Rendered { subject, html, text }
    }
}

/// SES sender bound to the studio's addresses
#[derive(Clone)]
pub struct Mailer {
    ses: SesClient,
    from: String,
    studio_inbox: String,
    public_base_url: String,
    currency: String,
}

impl Mailer {
    pub fn new(ses: SesClient, from: String, studio_inbox: String, public_base_url: String, currency: String) -> Self {
        Self {
            ses,
            from,
            studio_inbox,
            public_base_url,
            currency,
        }
    }

    pub async fn send(&self, to: &str, email: &Rendered) -> Result<(), BoxError> {
        let subject = Content::builder().data(&email.subject).charset("UTF-8").build()?;

        let body = Body::builder()
            .html(Content::builder().data(&email.html).charset("UTF-8").build()?)
            .text(Content::builder().data(&email.text).charset("UTF-8").build()?)
            .build();

        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        tracing::info!(to = to, subject = %email.subject, "Email sent");
        Ok(())
    }

    /// Send in the background; failures are only logged
    pub fn dispatch(&self, to: String, email: Rendered) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&to, &email).await {
                tracing::warn!(to = %to, subject = %email.subject, error = %e, "Email delivery failed");
            }
        });
    }

    pub fn booking_created(&self, booking: &Booking, service_name: &str) {
        self.dispatch(
            booking.client_email.clone(),
            templates::booking_confirmation(booking, service_name, &self.currency),
        );
        self.dispatch(
            self.studio_inbox.clone(),
            templates::studio_new_booking(booking, service_name, &self.currency),
        );
    }

    pub fn booking_status_changed(&self, booking: &Booking, service_name: &str) {
        self.dispatch(
            booking.client_email.clone(),
            templates::booking_status_changed(booking, service_name),
        );
    }

    /// Card goes to the recipient (or the purchaser when bought for themselves);
    /// the purchaser always gets a receipt.
    pub fn gift_card_activated(&self, card: &GiftCard) {
        let to = card
            .recipient_email
            .clone()
            .unwrap_or_else(|| card.purchaser_email.clone());
        self.dispatch(
            to,
            templates::gift_card_delivery(card, &self.currency, &self.public_base_url),
        );
        self.dispatch(
            card.purchaser_email.clone(),
            templates::gift_card_receipt(card, &self.currency),
        );
    }

    pub fn challenge_invitation(&self, challenge: &PhotoChallenge, service_name: &str) {
        let invite_url = self.challenge_url(&challenge.token);
        self.dispatch(
            challenge.recipient_email.clone(),
            templates::challenge_invitation(challenge, service_name, &invite_url),
        );
    }

    pub fn challenge_accepted(&self, challenge: &PhotoChallenge) {
        self.dispatch(challenge.sender_email.clone(), templates::challenge_accepted(challenge));
    }

    pub fn challenge_url(&self, token: &str) -> String {
        format!("{}/challenge/{token}", self.public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::challenge::ChallengeStatus;
    use shared::models::{BookingStatus, GiftCardStatus};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn booking() -> Booking {
        Booking {
            id: 42,
            service_type_id: 1,
            date: "2024-06-12".into(),
            start_time: Some("18:00".into()),
            end_time: Some("19:00".into()),
            client_name: "Ola <script>".into(),
            client_email: "ola@example.com".into(),
            client_phone: None,
            notes: Some("Bring the dog & cat".into()),
            status: BookingStatus::Pending,
            price: dec("300"),
            discount_amount: dec("0"),
            gift_card_amount: dec("0"),
            total: dec("300"),
            promo_code: None,
            gift_card_code: None,
            challenge_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn booking_confirmation_escapes_client_input() {
        let email = templates::booking_confirmation(&booking(), "Portrait session", "pln");
        assert!(email.html.contains("Ola &lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
        assert!(email.text.contains("2024-06-12 18:00–19:00"));
        assert!(email.text.contains("300.00 PLN"));
    }

    #[test]
    fn studio_notice_lists_notes() {
        let email = templates::studio_new_booking(&booking(), "Portrait session", "pln");
        assert!(email.html.contains("Bring the dog &amp; cat"));
        assert!(email.text.contains("phone -"));
    }

    #[test]
    fn whole_day_bookings_have_no_times() {
        let mut b = booking();
        b.start_time = None;
        b.end_time = None;
        b.status = BookingStatus::Confirmed;
        let email = templates::booking_status_changed(&b, "Wedding");
        assert!(email.text.contains("2024-06-12 (whole day)"));
        assert!(email.subject.contains("confirmed"));
    }

    #[test]
    fn gift_card_delivery_shows_code() {
        let card = GiftCard {
            id: 7,
            code: "GC-ABCD-EFGH".into(),
            initial_amount: dec("250"),
            balance: dec("250"),
            purchaser_name: "Marek".into(),
            purchaser_email: "marek@example.com".into(),
            recipient_name: Some("Ania".into()),
            recipient_email: Some("ania@example.com".into()),
            message: Some("Happy <b>birthday</b>".into()),
            status: GiftCardStatus::Active,
            expires_at: 1_735_689_600_000,
            payment_session_id: None,
            created_at: 0,
            updated_at: 0,
        };
        let email = templates::gift_card_delivery(&card, "pln", "https://studio.example");
        assert!(email.html.contains("GC-ABCD-EFGH"));
        assert!(email.html.contains("Happy &lt;b&gt;birthday&lt;/b&gt;"));
        assert!(email.text.contains("250.00 PLN"));
        assert!(email.text.contains("2025-01-01"));

        let receipt = templates::gift_card_receipt(&card, "pln");
        assert!(receipt.text.contains("ania@example.com"));
    }

    #[test]
    fn challenge_invitation_links_token() {
        let challenge = PhotoChallenge {
            id: 9,
            token: "abc123".into(),
            sender_name: "Kasia".into(),
            sender_email: "kasia@example.com".into(),
            recipient_name: "Piotr".into(),
            recipient_email: "piotr@example.com".into(),
            message: None,
            service_type_id: 1,
            discount_percent: 20,
            status: ChallengeStatus::Sent,
            is_paid: true,
            booking_id: None,
            payment_session_id: None,
            expires_at: 0,
            viewed_at: None,
            responded_at: None,
            created_at: 0,
            updated_at: 0,
        };
        let email = templates::challenge_invitation(&challenge, "Portrait session", "https://studio.example/challenge/abc123");
        assert!(email.html.contains("href=\"https://studio.example/challenge/abc123\""));
        assert!(email.text.contains("20% off"));

        let accepted = templates::challenge_accepted(&challenge);
        assert!(accepted.subject.starts_with("Piotr accepted"));
    }
}
