//! RFC 6238 codes via `totp-rs`: SHA1, 6 digits, 30 second steps.

use anyhow::anyhow;
use totp_rs::{Algorithm, Secret, TOTP};

pub const TOTP_DIGITS: usize = 6;
pub const TOTP_STEP_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct TotpService {
    issuer: String,
    skew: u8,
}

impl TotpService {
    pub fn new(issuer: impl Into<String>, skew: u8) -> Self {
        Self {
            issuer: issuer.into(),
            skew,
        }
    }

    /// Fresh 160-bit secret, base32 encoded.
    pub fn generate_secret() -> String {
        Secret::generate_secret().to_encoded().to_string()
    }

    fn totp(&self, secret: &str, account: &str) -> anyhow::Result<TOTP> {
        let bytes = Secret::Encoded(secret.to_owned())
            .to_bytes()
            .map_err(|e| anyhow!("invalid TOTP secret: {e}"))?;
        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            self.skew,
            TOTP_STEP_SECS,
            bytes,
            Some(otpauth_label(&self.issuer)),
            otpauth_label(account),
        )
        .map_err(|e| anyhow!("TOTP init error: {e}"))
    }

    /// `otpauth://totp/...` URI for authenticator enrollment.
    pub fn provisioning_uri(&self, secret: &str, account: &str) -> anyhow::Result<String> {
        Ok(self.totp(secret, account)?.get_url())
    }

    /// PNG QR code of the provisioning URI as a `data:` URI.
    pub fn qr_code_png_base64(&self, secret: &str, account: &str) -> anyhow::Result<String> {
        let png = self
            .totp(secret, account)?
            .get_qr_base64()
            .map_err(|e| anyhow!("QR gen error: {e}"))?;
        Ok(format!("data:image/png;base64,{png}"))
    }

    /// Check `code` against the current time window, allowing `skew` steps of drift.
    pub fn verify(&self, secret: &str, code: &str) -> anyhow::Result<bool> {
        if !is_well_formed(code) {
            return Ok(false);
        }
        // account name is not part of the code derivation
        let totp = self.totp(secret, "user")?;
        totp.check_current(code)
            .map_err(|e| anyhow!("system clock error: {e}"))
    }

    /// Same as [`verify`](Self::verify) at an explicit unix time.
    pub fn verify_at(&self, secret: &str, code: &str, unix_secs: u64) -> anyhow::Result<bool> {
        if !is_well_formed(code) {
            return Ok(false);
        }
        Ok(self.totp(secret, "user")?.check(code, unix_secs))
    }
}

/// `:` separates issuer from account in the `otpauth://` label, so neither may
/// contain one. Accounts created before signup checked email shape can still
/// carry it.
fn otpauth_label(value: &str) -> String {
    value.replace(':', "_")
}

fn is_well_formed(code: &str) -> bool {
    code.len() == TOTP_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}
