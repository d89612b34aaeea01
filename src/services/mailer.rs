use std::time::Duration;

use serde_json::json;

use crate::config::Config;

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";
const SEND_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Transactional email client. Sending is handed to a spawned task so a
/// provider outage never blocks or fails the request that triggered it.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
    activation_base_url: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.brevo_api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            activation_base_url: config.activation_base_url.clone(),
        })
    }

    /// Fire-and-forget dispatch of the activation email with a bounded
    /// number of retries. Terminal failure is logged, not surfaced.
    pub fn dispatch_activation(&self, email: String, nombre: String, token: String) {
        let mailer = self.clone();
        tokio::spawn(async move {
            for attempt in 1..=SEND_ATTEMPTS {
                match mailer.send_activation(&email, &nombre, &token).await {
                    Ok(()) => {
                        tracing::info!("activation email sent to {}", email);
                        return;
                    }
                    Err(e) if attempt < SEND_ATTEMPTS => {
                        tracing::warn!(
                            "activation email to {} failed (attempt {}): {}",
                            email,
                            attempt,
                            e
                        );
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                    Err(e) => {
                        tracing::error!("activation email to {} abandoned: {}", email, e);
                    }
                }
            }
        });
    }

    async fn send_activation(
        &self,
        email: &str,
        nombre: &str,
        token: &str,
    ) -> Result<(), reqwest::Error> {
        let link = self.activation_link(token);
        let body = json!({
            "sender": { "name": self.sender_name, "email": self.sender_email },
            "to": [{ "email": email, "name": nombre }],
            "subject": "🎉 Activa tu cuenta en el Directorio de Negocios",
            "htmlContent": activation_html(nombre, &link),
        });

        self.client
            .post(BREVO_ENDPOINT)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    fn activation_link(&self, token: &str) -> String {
        format!("{}/activar/activar?token={}", self.activation_base_url, token)
    }
}

fn activation_html(nombre: &str, link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head><meta charset="UTF-8"><title>Activa tu cuenta</title></head>
<body style="margin:0;padding:0;font-family:Arial,sans-serif;background-color:#f5f5f5;">
  <table width="100%" cellpadding="0" cellspacing="0" style="padding:20px 0;">
    <tr><td align="center">
      <table width="600" cellpadding="0" cellspacing="0" style="background-color:#ffffff;border-radius:8px;">
        <tr>
          <td style="background:#059669;padding:40px 30px;text-align:center;">
            <h1 style="margin:0;color:#ffffff;font-size:28px;">RUIZ CORTINES</h1>
            <p style="margin:10px 0 0 0;color:#ffffff;font-size:14px;">Directorio de Negocios</p>
          </td>
        </tr>
        <tr>
          <td style="padding:40px 30px;">
            <h2 style="margin:0 0 20px 0;color:#1f2937;">¡Hola, {nombre}!</h2>
            <p style="color:#4b5563;font-size:16px;line-height:1.6;">
              ¡Bienvenido/a al <strong>Directorio de Negocios de Ruiz Cortines</strong>!
              Para comenzar, activa tu cuenta haciendo clic en el botón de abajo:
            </p>
            <table width="100%" cellpadding="0" cellspacing="0" style="margin:30px 0;">
              <tr><td align="center">
                <a href="{link}" style="display:inline-block;background:#059669;color:#ffffff;text-decoration:none;padding:16px 40px;border-radius:6px;font-size:16px;font-weight:600;">
                  Activar mi cuenta
                </a>
              </td></tr>
            </table>
            <p style="color:#92400e;font-size:14px;background-color:#fef3c7;padding:16px;border-radius:4px;">
              <strong>Importante:</strong> Este enlace expirará en <strong>30 minutos</strong> por seguridad.
              Si no activas tu cuenta a tiempo, tendrás que registrarte nuevamente.
            </p>
            <p style="color:#6b7280;font-size:14px;">
              Si el botón no funciona, copia y pega el siguiente enlace en tu navegador:
            </p>
            <p style="word-break:break-all;font-size:13px;color:#4b5563;">{link}</p>
          </td>
        </tr>
        <tr>
          <td style="background-color:#f9fafb;padding:30px;text-align:center;">
            <p style="margin:0;color:#6b7280;font-size:13px;">
              Si no creaste una cuenta en nuestro directorio, puedes ignorar este correo de forma segura.
            </p>
          </td>
        </tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_link_carries_token() {
        let mailer = Mailer {
            client: reqwest::Client::new(),
            api_key: "k".into(),
            sender_email: "s@x.com".into(),
            sender_name: "S".into(),
            activation_base_url: "http://localhost:8000".into(),
        };
        assert_eq!(
            mailer.activation_link("tok-123"),
            "http://localhost:8000/activar/activar?token=tok-123"
        );
    }

    #[test]
    fn html_includes_name_link_and_expiry_warning() {
        let html = activation_html("Ana", "http://x/activar/activar?token=t");
        assert!(html.contains("Ana"));
        assert!(html.contains("http://x/activar/activar?token=t"));
        assert!(html.contains("30 minutos"));
    }
}
