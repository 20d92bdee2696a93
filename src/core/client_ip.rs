use axum::http::HeaderMap;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";

/// 取得請求者 IP，依序：X-Forwarded-For 第一段、X-Real-IP、連線位址的 host。
///
/// 永遠會回傳某個字串；連線位址無法拆成 host:port 時原樣回傳。
pub fn resolve_client_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    if let Some(forwarded) = header_value(headers, FORWARDED_FOR) {
        // 最左邊是最初的客戶端
        let first = forwarded.split(',').next().unwrap_or_default();
        return first.trim().to_string();
    }

    if let Some(real_ip) = header_value(headers, REAL_IP) {
        return real_ip.to_string();
    }

    split_host(remote_addr).unwrap_or(remote_addr).to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// `host:port` 或 `[v6]:port` 的 host 部分
fn split_host(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        let port = after.strip_prefix(':')?;
        if port.contains([':', '[', ']']) {
            return None;
        }
        return Some(host);
    }

    let (host, _port) = addr.rsplit_once(':')?;
    if host.contains([':', '[', ']']) {
        return None;
    }
    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_entry_trimmed() {
        let h = headers(&[("x-forwarded-for", "1.2.3.4, 5.6.7.8")]);
        assert_eq!(resolve_client_ip(&h, "10.0.0.1:443"), "1.2.3.4");

        let h = headers(&[("x-forwarded-for", "  1.2.3.4  ")]);
        assert_eq!(resolve_client_ip(&h, "10.0.0.1:443"), "1.2.3.4");
    }

    #[test]
    fn test_forwarded_for_wins_over_real_ip() {
        let h = headers(&[
            ("x-forwarded-for", "1.2.3.4"),
            ("x-real-ip", "8.8.8.8"),
        ]);
        assert_eq!(resolve_client_ip(&h, "10.0.0.1:443"), "1.2.3.4");
    }

    #[test]
    fn test_real_ip_is_returned_verbatim() {
        let h = headers(&[("x-real-ip", " 8.8.8.8")]);
        assert_eq!(resolve_client_ip(&h, "10.0.0.1:443"), " 8.8.8.8");
    }

    #[test]
    fn test_empty_forwarded_for_falls_through() {
        let h = headers(&[("x-forwarded-for", ""), ("x-real-ip", "8.8.8.8")]);
        assert_eq!(resolve_client_ip(&h, "10.0.0.1:443"), "8.8.8.8");
    }

    #[test]
    fn test_remote_address_host() {
        let h = HeaderMap::new();
        assert_eq!(resolve_client_ip(&h, "9.9.9.9:51515"), "9.9.9.9");
        assert_eq!(resolve_client_ip(&h, "[2001:db8::1]:8080"), "2001:db8::1");
        assert_eq!(resolve_client_ip(&h, "localhost:80"), "localhost");
    }

    #[test]
    fn test_malformed_remote_address_is_returned_raw() {
        let h = HeaderMap::new();
        assert_eq!(resolve_client_ip(&h, "9.9.9.9"), "9.9.9.9");
        assert_eq!(resolve_client_ip(&h, "2001:db8::1"), "2001:db8::1");
        assert_eq!(resolve_client_ip(&h, "[2001:db8::1]"), "[2001:db8::1]");
        assert_eq!(resolve_client_ip(&h, ""), "");
    }

    #[test]
    fn test_non_utf8_header_is_ignored() {
        let mut h = HeaderMap::new();
        h.insert(
            FORWARDED_FOR,
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        assert_eq!(resolve_client_ip(&h, "9.9.9.9:1"), "9.9.9.9");
    }
}
