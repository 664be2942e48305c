use crate::error::LoggerError;
use crate::types::IpPayload;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;

pub const UNKNOWN: &str = "unknown";

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const PLATFORM_CLIENT_IP: &str = "x-nf-client-connection-ip";

/// How the visitor's address is pulled out of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Body fields first, then forwarded headers, then the peer address.
    #[default]
    Auto,
    /// `{ipv4, ipv6}` body with `{ip}` as fallback.
    DualIp,
    /// `{ip}` body, rejected when absent.
    SingleField,
    /// Forwarded headers and peer address only.
    Headers,
}

/// Everything the normalizer may look at for one request.
pub struct RequestPayload<'a> {
    pub body: Option<&'a [u8]>,
    pub headers: &'a HeaderMap,
    pub peer: Option<SocketAddr>,
}

impl ExtractionStrategy {
    pub fn normalize(&self, req: &RequestPayload<'_>) -> Result<String, LoggerError> {
        match self {
            ExtractionStrategy::Auto => {
                if let Some(text) = parse_body(req.body)?.as_ref().and_then(from_body) {
                    return Ok(text);
                }
                Ok(from_headers(req.headers, req.peer).unwrap_or_else(|| UNKNOWN.to_string()))
            }
            ExtractionStrategy::DualIp => Ok(parse_body(req.body)?
                .as_ref()
                .and_then(from_body)
                .unwrap_or_else(|| UNKNOWN.to_string())),
            ExtractionStrategy::SingleField => {
                let payload = parse_body(req.body)?.ok_or_else(|| {
                    LoggerError::InputParseError("missing request body".into())
                })?;
                non_empty(payload.ip.as_deref())
                    .map(str::to_string)
                    .ok_or_else(|| LoggerError::InputParseError("missing 'ip' field".into()))
            }
            ExtractionStrategy::Headers => {
                Ok(from_headers(req.headers, req.peer).unwrap_or_else(|| UNKNOWN.to_string()))
            }
        }
    }
}

/// An empty body is treated as no body at all. Valid JSON that is not an
/// object carries no fields.
fn parse_body(body: Option<&[u8]>) -> Result<Option<IpPayload>, LoggerError> {
    let bytes = match body {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
        _ => return Ok(None),
    };

    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| LoggerError::InputParseError(e.to_string()))?;
    if !value.is_object() {
        return Ok(Some(IpPayload::default()));
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| LoggerError::InputParseError(e.to_string()))
}

fn from_body(payload: &IpPayload) -> Option<String> {
    let ipv4 = non_empty(payload.ipv4.as_deref());
    let ipv6 = non_empty(payload.ipv6.as_deref());

    if let (Some(v4), Some(v6)) = (ipv4, ipv6) {
        return Some(format!("IPv4: {}, IPv6: {}", v4, v6));
    }

    non_empty(payload.ip.as_deref()).map(str::to_string)
}

fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = header_str(headers, FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| header_str(headers, REAL_IP))
        .or_else(|| header_str(headers, PLATFORM_CLIENT_IP))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn run(
        strategy: ExtractionStrategy,
        body: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<String, LoggerError> {
        strategy.normalize(&RequestPayload {
            body: body.map(str::as_bytes),
            headers,
            peer: None,
        })
    }

    fn forwarded(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn dual_fields_are_combined() {
        let headers = HeaderMap::new();
        let body = r#"{"ipv4":"1.2.3.4","ipv6":"::1"}"#;
        for strategy in [ExtractionStrategy::Auto, ExtractionStrategy::DualIp] {
            let text = run(strategy, Some(body), &headers).unwrap();
            assert_eq!(text, "IPv4: 1.2.3.4, IPv6: ::1");
        }
    }

    #[test]
    fn single_field_is_used_verbatim() {
        let headers = HeaderMap::new();
        let body = r#"{"ip":"  not-an-ip "}"#;
        let text = run(ExtractionStrategy::SingleField, Some(body), &headers).unwrap();
        assert_eq!(text, "  not-an-ip ");
    }

    #[test]
    fn lone_ipv4_falls_back_to_ip_field() {
        let headers = HeaderMap::new();
        let body = r#"{"ipv4":"1.2.3.4","ip":"5.6.7.8"}"#;
        let text = run(ExtractionStrategy::DualIp, Some(body), &headers).unwrap();
        assert_eq!(text, "5.6.7.8");
    }

    #[test]
    fn nothing_found_is_unknown() {
        let headers = HeaderMap::new();
        let strategies = [
            ExtractionStrategy::Auto,
            ExtractionStrategy::DualIp,
            ExtractionStrategy::Headers,
        ];
        for strategy in strategies {
            assert_eq!(run(strategy, None, &headers).unwrap(), UNKNOWN);
        }
        assert_eq!(
            run(ExtractionStrategy::DualIp, Some("{}"), &headers).unwrap(),
            UNKNOWN
        );
    }

    #[test]
    fn non_object_bodies_carry_no_fields() {
        let headers = HeaderMap::new();
        for body in [r#"["1.2.3.4","::1"]"#, r#""1.2.3.4""#, "42", "null"] {
            assert_eq!(
                run(ExtractionStrategy::DualIp, Some(body), &headers).unwrap(),
                UNKNOWN
            );
            assert!(matches!(
                run(ExtractionStrategy::SingleField, Some(body), &headers),
                Err(LoggerError::InputParseError(_))
            ));
        }

        let headers = forwarded(&[("x-real-ip", "8.8.8.8")]);
        let text = run(ExtractionStrategy::Auto, Some(r#"["1.2.3.4","::1"]"#), &headers).unwrap();
        assert_eq!(text, "8.8.8.8");
    }

    #[test]
    fn strict_variant_rejects_missing_ip() {
        let headers = HeaderMap::new();
        assert!(matches!(
            run(ExtractionStrategy::SingleField, Some("{}"), &headers),
            Err(LoggerError::InputParseError(_))
        ));
        assert!(matches!(
            run(ExtractionStrategy::SingleField, None, &headers),
            Err(LoggerError::InputParseError(_))
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let headers = HeaderMap::new();
        let strategies = [
            ExtractionStrategy::Auto,
            ExtractionStrategy::DualIp,
            ExtractionStrategy::SingleField,
        ];
        for strategy in strategies {
            assert!(matches!(
                run(strategy, Some("{not json"), &headers),
                Err(LoggerError::InputParseError(_))
            ));
        }
        // body is never read in header mode
        assert_eq!(
            run(ExtractionStrategy::Headers, Some("{not json"), &headers).unwrap(),
            UNKNOWN
        );
    }

    #[test]
    fn headers_follow_priority_order() {
        let headers = forwarded(&[
            ("x-forwarded-for", "9.9.9.9, 10.0.0.1"),
            ("x-real-ip", "8.8.8.8"),
            ("x-nf-client-connection-ip", "7.7.7.7"),
        ]);
        assert_eq!(
            run(ExtractionStrategy::Headers, None, &headers).unwrap(),
            "9.9.9.9"
        );

        let headers = forwarded(&[
            ("x-real-ip", "8.8.8.8"),
            ("x-nf-client-connection-ip", "7.7.7.7"),
        ]);
        assert_eq!(
            run(ExtractionStrategy::Headers, None, &headers).unwrap(),
            "8.8.8.8"
        );

        let headers = forwarded(&[("x-nf-client-connection-ip", "7.7.7.7")]);
        assert_eq!(
            run(ExtractionStrategy::Headers, None, &headers).unwrap(),
            "7.7.7.7"
        );
    }

    #[test]
    fn peer_address_is_last_resort() {
        let headers = HeaderMap::new();
        let text = ExtractionStrategy::Headers
            .normalize(&RequestPayload {
                body: None,
                headers: &headers,
                peer: Some("203.0.113.5:51000".parse().unwrap()),
            })
            .unwrap();
        assert_eq!(text, "203.0.113.5");
    }

    #[test]
    fn auto_prefers_body_over_headers() {
        let headers = forwarded(&[("x-forwarded-for", "9.9.9.9")]);
        let body = r#"{"ip":"1.1.1.1"}"#;
        assert_eq!(
            run(ExtractionStrategy::Auto, Some(body), &headers).unwrap(),
            "1.1.1.1"
        );
        assert_eq!(
            run(ExtractionStrategy::Auto, Some("{}"), &headers).unwrap(),
            "9.9.9.9"
        );
        assert_eq!(
            run(ExtractionStrategy::Auto, Some("   "), &headers).unwrap(),
            "9.9.9.9"
        );
    }
}
