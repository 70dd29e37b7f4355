//! Pull request page detection.

/// Whether `pathname` contains a `/pull/<number>` segment.
pub fn is_pull_request_path(pathname: &str) -> bool {
    pathname.match_indices("/pull/").any(|(start, marker)| {
        pathname[start + marker.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}
