//! Local hostname lookup.
//!
//! The hostname is stamped into the HTML body and used as the SMTP client
//! identity (EHLO name).

/// Used when the OS lookup fails or yields an empty name.
pub const FALLBACK_HOSTNAME: &str = "localhost";

/// Return the system hostname; never empty.
pub fn local_hostname() -> String {
    match ::hostname::get() {
        Ok(name) => non_empty_or_fallback(name.to_string_lossy().trim()),
        Err(e) => {
            tracing::warn!(error = %e, fallback = FALLBACK_HOSTNAME, "Hostname lookup failed");
            FALLBACK_HOSTNAME.to_string()
        }
    }
}

fn non_empty_or_fallback(name: &str) -> String {
    if name.is_empty() {
        FALLBACK_HOSTNAME.to_string()
    } else {
        name.to_string()
    }
}
