pub const LOGIN_FLAG_COOKIE: &str = "is_logged_in";
pub const ROLE_COOKIE: &str = "role";
pub const IDENTITY_COOKIE: &str = "auth_identity";

/// Value of cookie `name` in a `Cookie` request header. Empty values count as absent.
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        if key.trim() == name {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub fn build_clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; SameSite=Lax; Max-Age=0")
}

/// Undo the URL encoding the backend applies to cookie values.
pub fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; is_logged_in=true;role=admin ; empty=";
        assert_eq!(cookie_value(header, "is_logged_in").as_deref(), Some("true"));
        assert_eq!(cookie_value(header, "role").as_deref(), Some("admin"));
        assert_eq!(cookie_value(header, "empty"), None);
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_prefix_does_not_match() {
        assert_eq!(cookie_value("xrole=user", "role"), None);
    }

    #[test]
    fn test_clear_cookie_expires() {
        assert_eq!(
            build_clear_cookie("role"),
            "role=; Path=/; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("eyJpdiI6%3D%3D"), "eyJpdiI6==");
        assert_eq!(percent_decode("a%2Bb%2Fc"), "a+b/c");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
