//! Commit email normalization.

use std::sync::OnceLock;

use regex_lite::Regex;

const NOREPLY_SUFFIX: &str = "@users.noreply.github.com";

fn numeric_id_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[0-9]+\+)+").expect("valid numeric id prefix pattern"))
}

/// Normalize a commit author email into an author key.
///
/// Lower-cases the address, strips the GitHub noreply domain and strips the
/// numeric user id prefix (`12345+`) noreply addresses carry, so
/// `12345+Alice@users.noreply.github.com` becomes `alice`.
pub fn normalize_email(email: &str) -> String {
    let lowered = email.trim().to_lowercase();
    let local = lowered.strip_suffix(NOREPLY_SUFFIX).unwrap_or(&lowered);
    numeric_id_prefix().replace(local, "").into_owned()
}
