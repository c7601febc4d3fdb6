use http::Uri;

use crate::Error;

/// Checks the URL typed by the user. Runs before any request is made.
///
/// Accepts absolute URLs only, i.e. with both a scheme and a host, and returns the trimmed input.
pub fn validate_url(input: &str) -> Result<String, Error> {
    let url = input.trim();
    if url.is_empty() {
        return Err(Error::Validation("Please enter a video URL".to_string()));
    }

    let invalid = || Error::Validation("Please enter a valid URL".to_string());
    let uri: Uri = url.parse().map_err(|_| invalid())?;
    if uri.scheme().is_none() || uri.host().is_none_or(str::is_empty) {
        return Err(invalid());
    }

    Ok(url.to_string())
}
