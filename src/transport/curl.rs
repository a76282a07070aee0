use std::fmt::Write;

use super::HttpRequest;
use crate::headers::AUTHORIZATION;

/// Renders `request` as a `curl` invocation for debug logs.
///
/// Authorization values keep their scheme and hide the credential.
pub fn curl_command(request: &HttpRequest) -> String {
    let mut command = format!("curl -X {}", request.method);
    for (name, value) in &request.headers {
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            let _ = write!(command, " --header \"{name}: {}\"", redact(value));
        } else {
            let _ = write!(command, " --header \"{name}: {value}\"");
        }
    }
    let _ = write!(command, " -L \"{}\"", request.url);
    command
}

fn redact(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, _)) => format!("{scheme} <redacted>"),
        None => "<redacted>".to_owned(),
    }
}
