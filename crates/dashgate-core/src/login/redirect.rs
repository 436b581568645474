/// Builds the post-login location.
///
/// - No target: the application root under `base_path`.
/// - Target already under `base_path`: used as-is.
/// - Otherwise: `base_path` is prepended.
pub fn redirect_target(redirect_url: Option<&str>, base_path: &str) -> String {
    match redirect_url.filter(|url| !url.is_empty()) {
        Some(url) if !base_path.is_empty() && !url.starts_with(base_path) => {
            format!("{base_path}{url}")
        }
        Some(url) => url.to_string(),
        None => format!("{base_path}/"),
    }
}
