use url::Url;

// * Canonicalizes a domain or URL string to a bare lowercase host.
// * Every other component keys on this representation.
// *
// * Logic:
// * 1. Trim and lowercase.
// * 2. If a scheme is present, let the URL parser pull the host out.
// * 3. Otherwise strip path, query, fragment, userinfo and port by hand.
// * 4. Drop a leading `www.` and any trailing dot.
// *
// * Total: unrecognized input is passed through lowercased.
pub fn normalize_domain(input: &str) -> String {
    // * Step 1: Trim and Lowercase
    let lowered = input.trim().to_lowercase();
    if lowered.is_empty() {
        return lowered;
    }

    // * Step 2: Real URL parse when there is a scheme
    let parsed_host = if lowered.contains("://") {
        Url::parse(&lowered)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    } else {
        None
    };

    // * Step 3: Manual strip for bare hosts and unparseable input
    let mut host = parsed_host.unwrap_or_else(|| strip_host(&lowered).to_string());

    // * Step 4: Drop www. and trailing dots
    if let Some(rest) = host.strip_prefix("www.") {
        host = rest.to_string();
    }
    let trimmed = host.trim_end_matches(['.', '/']);
    if trimmed.is_empty() {
        return lowered.trim_end_matches('/').to_string();
    }
    trimmed.to_string()
}

// * Cuts scheme, path, userinfo and port from a scheme-less host string
fn strip_host(value: &str) -> &str {
    let value = match value.find("://") {
        Some(idx) => &value[idx + 3..],
        None => value.trim_start_matches("//"),
    };

    let end = value.find(['/', '?', '#']).unwrap_or(value.len());
    let mut host = &value[..end];

    if let Some((_, after_userinfo)) = host.rsplit_once('@') {
        host = after_userinfo;
    }

    // ! Only strip a port when it is all digits, so bracketed IPv6 survives
    if let Some((name, port)) = host.rsplit_once(':') {
        if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) && !name.ends_with(':') {
            host = name;
        }
    }

    host
}

// * Extracts the normalized domain of an absolute http(s) URL
pub fn domain_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?;
    let domain = normalize_domain(host);
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

// * True if `host` is `domain` or one of its subdomains (both normalized)
pub fn is_same_site(host: &str, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

// * Returns `.` + final label of a domain, e.g. `.com`
pub fn tld_of(domain: &str) -> Option<String> {
    let (_, label) = domain.rsplit_once('.')?;
    if label.is_empty() {
        None
    } else {
        Some(format!(".{}", label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        assert_eq!(normalize_domain("HTTPS://WWW.Example.com/"), "example.com");
        assert_eq!(normalize_domain("http://blog.example.com/a/b?c=1#d"), "blog.example.com");
    }

    #[test]
    fn test_bare_hosts() {
        assert_eq!(normalize_domain("www.example.com/"), "example.com");
        assert_eq!(normalize_domain("  Example.COM  "), "example.com");
        assert_eq!(normalize_domain("example.com:8080/path"), "example.com");
        assert_eq!(normalize_domain("user@example.com"), "example.com");
    }

    #[test]
    fn test_passthrough_and_empty() {
        assert_eq!(normalize_domain(""), "");
        assert_eq!(normalize_domain("   "), "");
        assert_eq!(normalize_domain("Not A Domain"), "not a domain");
    }

    #[test]
    fn test_domain_from_url() {
        assert_eq!(domain_from_url("https://www.reddit.com/r/rust").as_deref(), Some("reddit.com"));
        assert_eq!(domain_from_url("ftp://files.example.com"), None);
        assert_eq!(domain_from_url("not a url"), None);
    }

    #[test]
    fn test_same_site() {
        assert!(is_same_site("example.com", "example.com"));
        assert!(is_same_site("docs.example.com", "example.com"));
        assert!(!is_same_site("notexample.com", "example.com"));
        assert!(!is_same_site("example.com", ""));
    }

    #[test]
    fn test_tld_of() {
        assert_eq!(tld_of("spam.example.xyz").as_deref(), Some(".xyz"));
        assert_eq!(tld_of("localhost"), None);
    }
}
