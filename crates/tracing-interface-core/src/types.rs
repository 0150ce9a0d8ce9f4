use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::constants::{keys, ports};
use crate::error::DecodeError;
use crate::traits::Databag;

/// Trace ingestion protocols a backend can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngesterType {
    OtlpGrpc,
    OtlpHttp,
    Zipkin,
    Tempo,
}

impl IngesterType {
    pub const ALL: [IngesterType; 4] = [
        IngesterType::OtlpGrpc,
        IngesterType::OtlpHttp,
        IngesterType::Zipkin,
        IngesterType::Tempo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngesterType::OtlpGrpc => "otlp_grpc",
            IngesterType::OtlpHttp => "otlp_http",
            IngesterType::Zipkin => "zipkin",
            IngesterType::Tempo => "tempo",
        }
    }
}

impl fmt::Display for IngesterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngesterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IngesterType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown ingester type '{s}' (expected otlp_grpc, otlp_http, zipkin or tempo)"
                )
            })
    }
}

/// One ingestion endpoint: a protocol and the port it listens on.
///
/// On the wire this is `{"port": "4317", "type": "otlp_grpc"}`. Integer
/// ports are accepted when decoding and normalized to canonical text, so
/// `"04317"` and `4317` both decode to `"4317"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingester {
    #[serde(deserialize_with = "deserialize_port")]
    port: String,
    #[serde(rename = "type")]
    ingester_type: IngesterType,
}

impl Ingester {
    pub fn new(ingester_type: IngesterType, port: u16) -> Self {
        Self {
            port: port.to_string(),
            ingester_type,
        }
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn ingester_type(&self) -> IngesterType {
        self.ingester_type
    }

    /// Every protocol Tempo serves, on its stock port.
    pub fn tempo_defaults() -> Vec<Ingester> {
        vec![
            Ingester::new(IngesterType::Tempo, ports::TEMPO),
            Ingester::new(IngesterType::OtlpGrpc, ports::OTLP_GRPC),
            Ingester::new(IngesterType::OtlpHttp, ports::OTLP_HTTP),
            Ingester::new(IngesterType::Zipkin, ports::ZIPKIN),
        ]
    }
}

/// Parses `type=port`, e.g. `otlp_grpc=4317`.
impl FromStr for Ingester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ingester_type, port) = s
            .split_once('=')
            .ok_or_else(|| format!("invalid ingester '{s}', expected <type>=<port>"))?;
        let port = parse_port(port).ok_or_else(|| format!("invalid port in '{s}'"))?;
        Ok(Ingester::new(ingester_type.parse()?, port))
    }
}

/// A port is one to five ASCII digits naming a value in `1..=65535`.
///
/// `str::parse::<u16>` alone would also take a leading `+`, which cannot
/// appear in a URL authority.
fn parse_port(text: &str) -> Option<u16> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u16>().ok().filter(|port| *port != 0)
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Text(String),
        Number(u64),
    }

    let text = match RawPort::deserialize(deserializer)? {
        RawPort::Text(text) => text,
        RawPort::Number(n) => n.to_string(),
    };
    match parse_port(&text) {
        Some(port) => Ok(port.to_string()),
        None => Err(serde::de::Error::custom(DecodeError::InvalidPort(text))),
    }
}

/// What a traced service publishes: where it can be reached and which
/// ingesters it speaks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracingRequirerData {
    hostname: String,
    ingesters: Vec<Ingester>,
}

impl TracingRequirerData {
    /// Build a descriptor, rejecting hostnames that cannot be the authority
    /// of an `http://` URL.
    pub fn new(hostname: impl Into<String>, ingesters: Vec<Ingester>) -> Result<Self, DecodeError> {
        let hostname = hostname.into();
        validate_hostname(&hostname)?;
        Ok(Self {
            hostname,
            ingesters,
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn ingesters(&self) -> &[Ingester] {
        &self.ingesters
    }

    pub fn into_parts(self) -> (String, Vec<Ingester>) {
        (self.hostname, self.ingesters)
    }

    /// First ingester of the given type, in publication order.
    pub fn ingester(&self, ingester_type: IngesterType) -> Option<&Ingester> {
        self.ingesters
            .iter()
            .find(|i| i.ingester_type == ingester_type)
    }

    /// `http://{hostname}:{port}` for the first ingester of the given type.
    pub fn endpoint(&self, ingester_type: IngesterType) -> Option<String> {
        self.ingester(ingester_type)
            .map(|i| format!("http://{}:{}", self.hostname, i.port))
    }

    /// Application databag contents for this descriptor.
    pub fn to_databag(&self) -> Result<Databag, serde_json::Error> {
        let mut databag = Databag::new();
        databag.insert(keys::HOSTNAME.to_string(), self.hostname.clone());
        databag.insert(
            keys::INGESTERS.to_string(),
            serde_json::to_string(&self.ingesters)?,
        );
        Ok(databag)
    }

    pub fn from_databag(databag: &Databag) -> Result<Self, DecodeError> {
        let hostname = databag
            .get(keys::HOSTNAME)
            .ok_or(DecodeError::MissingKey(keys::HOSTNAME))?;
        let ingesters = databag
            .get(keys::INGESTERS)
            .ok_or(DecodeError::MissingKey(keys::INGESTERS))?;
        let ingesters: Vec<Ingester> = serde_json::from_str(ingesters)?;
        Self::new(hostname.clone(), ingesters)
    }
}

/// A hostname is valid if `http://{hostname}` parses and `{hostname}` is
/// nothing more than a host: no port, path, query, fragment or userinfo.
///
/// Whitespace and control characters are rejected before parsing: the URL
/// parser would silently strip them, and the stored hostname would no
/// longer match the host the endpoint URLs name.
fn validate_hostname(hostname: &str) -> Result<(), DecodeError> {
    let invalid = |reason: &str| DecodeError::InvalidHostname {
        hostname: hostname.to_string(),
        reason: reason.to_string(),
    };

    if hostname.is_empty() {
        return Err(invalid("hostname is empty"));
    }
    if hostname.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("hostname contains whitespace or control characters"));
    }
    if hostname.contains(['/', '\\', '?', '#', '@']) {
        return Err(invalid("expected a bare host"));
    }
    let bracketed = hostname.starts_with('[') && hostname.ends_with(']');
    if !bracketed && hostname.contains(':') {
        return Err(invalid("expected a bare host"));
    }

    let url = Url::parse(&format!("http://{hostname}")).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("no host"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingester_wire_format() {
        let ingester = Ingester::new(IngesterType::OtlpGrpc, 4317);
        assert_eq!(
            serde_json::to_string(&ingester).unwrap(),
            r#"{"port":"4317","type":"otlp_grpc"}"#
        );
    }

    #[test]
    fn test_ingester_accepts_integer_port() {
        let ingester: Ingester =
            serde_json::from_str(r#"{"port": 9411, "type": "zipkin"}"#).unwrap();
        assert_eq!(ingester, Ingester::new(IngesterType::Zipkin, 9411));
    }

    #[test]
    fn test_ingester_rejects_bad_port() {
        for bad in [
            r#"{"port": "http", "type": "tempo"}"#,
            r#"{"port": 70000, "type": "tempo"}"#,
            r#"{"port": "+80", "type": "tempo"}"#,
            r#"{"port": "-80", "type": "tempo"}"#,
            r#"{"port": " 80", "type": "tempo"}"#,
            r#"{"port": "", "type": "tempo"}"#,
            r#"{"port": "0", "type": "tempo"}"#,
            r#"{"port": 0, "type": "tempo"}"#,
        ] {
            assert!(serde_json::from_str::<Ingester>(bad).is_err(), "{bad} should be rejected");
        }
        assert!("tempo=+80".parse::<Ingester>().is_err());
        assert!("tempo=0".parse::<Ingester>().is_err());
    }

    #[test]
    fn test_ingester_port_is_canonical() {
        let ingester: Ingester =
            serde_json::from_str(r#"{"port": "04317", "type": "otlp_grpc"}"#).unwrap();
        assert_eq!(ingester.port(), "4317");

        let data = TracingRequirerData::new("myhost.local", vec![ingester]).unwrap();
        assert_eq!(
            data.endpoint(IngesterType::OtlpGrpc).as_deref(),
            Some("http://myhost.local:4317")
        );
    }

    #[test]
    fn test_ingester_rejects_unknown_type() {
        let err =
            serde_json::from_str::<Ingester>(r#"{"port": "1", "type": "bogus"}"#).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_ingester_from_str() {
        let ingester: Ingester = "otlp_http=4318".parse().unwrap();
        assert_eq!(ingester.ingester_type(), IngesterType::OtlpHttp);
        assert_eq!(ingester.port(), "4318");

        assert!("otlp_http".parse::<Ingester>().is_err());
        assert!("jaeger=14268".parse::<Ingester>().is_err());
        assert!("tempo=port".parse::<Ingester>().is_err());
    }

    #[test]
    fn test_hostname_validation() {
        for ok in [
            "myhost.local",
            "10.1.2.3",
            "tempo-0.tempo-endpoints.cos.svc.cluster.local",
            "[::1]",
        ] {
            assert!(TracingRequirerData::new(ok, vec![]).is_ok(), "{ok} should be accepted");
        }
        for bad in [
            "",
            "my host",
            "http://myhost",
            "myhost:3200",
            "user@myhost",
            "myhost/path",
            "myhost\\path",
            "[::1",
            "myhost.local ",
            " myhost.local",
            "my\thost.local",
            "myhost\n.local",
            "myhost.local\r",
        ] {
            assert!(
                matches!(
                    TracingRequirerData::new(bad, vec![]),
                    Err(DecodeError::InvalidHostname { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_endpoint_first_match_wins() {
        let data = TracingRequirerData::new(
            "myhost.local",
            vec![
                Ingester::new(IngesterType::Tempo, 3200),
                Ingester::new(IngesterType::OtlpGrpc, 4317),
                Ingester::new(IngesterType::OtlpGrpc, 14317),
            ],
        )
        .unwrap();

        assert_eq!(
            data.endpoint(IngesterType::OtlpGrpc).as_deref(),
            Some("http://myhost.local:4317")
        );
        assert_eq!(data.endpoint(IngesterType::Zipkin), None);
    }

    #[test]
    fn test_databag_round_trip() {
        let data = TracingRequirerData::new("myhost.local", Ingester::tempo_defaults()).unwrap();
        let databag = data.to_databag().unwrap();
        assert_eq!(databag[keys::HOSTNAME], "myhost.local");
        assert_eq!(TracingRequirerData::from_databag(&databag).unwrap(), data);
    }

    #[test]
    fn test_from_databag_missing_keys() {
        let mut databag = Databag::new();
        assert!(matches!(
            TracingRequirerData::from_databag(&databag),
            Err(DecodeError::MissingKey("hostname"))
        ));

        databag.insert("hostname".to_string(), "myhost.local".to_string());
        assert!(matches!(
            TracingRequirerData::from_databag(&databag),
            Err(DecodeError::MissingKey("ingesters"))
        ));
    }

    #[test]
    fn test_from_databag_malformed_ingesters() {
        let mut databag = Databag::new();
        databag.insert("hostname".to_string(), "myhost.local".to_string());

        for bad in [
            r#"[{"port": "3200", "type": "tempo"}"#,
            r#"[{"port": "3200"}]"#,
            r#"{"port": "3200", "type": "tempo"}"#,
        ] {
            databag.insert("ingesters".to_string(), bad.to_string());
            assert!(
                matches!(TracingRequirerData::from_databag(&databag), Err(DecodeError::Json(_))),
                "{bad} should be rejected"
            );
        }
    }
}
