use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::Error;
use crate::error::Result;

////////////////////////////////////////////////////////////
// Record type
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    HTTPS,
    TXT,
    SRV,
    LOC,
    MX,
    NS,
    CERT,
    DNSKEY,
    DS,
    NAPTR,
    SMIMEA,
    SSHFP,
    SVCB,
    TLSA,
    URI,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::HTTPS => "HTTPS",
            RecordType::TXT => "TXT",
            RecordType::SRV => "SRV",
            RecordType::LOC => "LOC",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
            RecordType::CERT => "CERT",
            RecordType::DNSKEY => "DNSKEY",
            RecordType::DS => "DS",
            RecordType::NAPTR => "NAPTR",
            RecordType::SMIMEA => "SMIMEA",
            RecordType::SSHFP => "SSHFP",
            RecordType::SVCB => "SVCB",
            RecordType::TLSA => "TLSA",
            RecordType::URI => "URI",
        }
    }

    // MX, SRV and URI records carry a priority field on the wire.
    pub fn takes_priority(&self) -> bool {
        matches!(self, RecordType::MX | RecordType::SRV | RecordType::URI)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ty = match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::AAAA,
            "CNAME" => RecordType::CNAME,
            "HTTPS" => RecordType::HTTPS,
            "TXT" => RecordType::TXT,
            "SRV" => RecordType::SRV,
            "LOC" => RecordType::LOC,
            "MX" => RecordType::MX,
            "NS" => RecordType::NS,
            "CERT" => RecordType::CERT,
            "DNSKEY" => RecordType::DNSKEY,
            "DS" => RecordType::DS,
            "NAPTR" => RecordType::NAPTR,
            "SMIMEA" => RecordType::SMIMEA,
            "SSHFP" => RecordType::SSHFP,
            "SVCB" => RecordType::SVCB,
            "TLSA" => RecordType::TLSA,
            "URI" => RecordType::URI,
            _ => return Err(Error::ParseError(format!("Unknown record type: {}", s))),
        };
        Ok(ty)
    }
}

impl Serialize for RecordType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

////////////////////////////////////////////////////////////
// TTL
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Value(u32),
    Auto,
}

impl Default for Ttl {
    fn default() -> Self {
        Self::Auto
    }
}

impl Ttl {
    // Cloudflare encodes "automatic" as a ttl of 1.
    pub fn as_secs(&self) -> u32 {
        match self {
            Ttl::Value(v) => *v,
            Ttl::Auto => 1,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Ttl::Value(v) => (60..=86400).contains(v),
            Ttl::Auto => true,
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ttl::Value(v) => write!(f, "{}", v),
            Ttl::Auto => f.write_str("auto"),
        }
    }
}

impl Serialize for Ttl {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.as_secs())
    }
}

impl<'de> Deserialize<'de> for Ttl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u32::deserialize(deserializer)?;
        match secs {
            1 => Ok(Ttl::Auto),
            v => Ok(Ttl::Value(v)),
        }
    }
}

////////////////////////////////////////////////////////////
// Record key
////////////////////////////////////////////////////////////
// Records within a zone are addressed by (name, type), the pair Cloudflare
// treats as a logical record identity for non-round-robin setups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub name: String,
    pub rtype: RecordType,
}

impl RecordKey {
    pub fn new<S: Into<String>>(name: S, rtype: RecordType) -> Self {
        Self {
            name: name.into(),
            rtype,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.rtype)
    }
}

////////////////////////////////////////////////////////////
// Record spec
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSpec {
    #[serde(rename = "type")]
    pub rtype: RecordType,
    pub name: String,
    pub content: String,

    #[serde(default)]
    pub ttl: Ttl,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    #[serde(default)]
    pub proxied: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RecordSpec {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.name.clone(), self.rtype)
    }

    // Every problem is reported, not just the first one found.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.name.is_empty() {
            problems.push("name must not be empty".to_string());
        }

        if self.content.is_empty() {
            problems.push("content must not be empty".to_string());
        }

        if self.rtype.takes_priority() {
            if self.priority.is_none() {
                problems.push(format!("{} records require a priority", self.rtype));
            }
        } else if self.priority.is_some() {
            problems.push(format!("{} records do not take a priority", self.rtype));
        }

        if !self.ttl.is_valid() {
            problems.push(format!(
                "ttl must be 1 (auto) or between 60 and 86400, got {}",
                self.ttl.as_secs()
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationError(problems))
        }
    }
}

////////////////////////////////////////////////////////////
// Unit test
////////////////////////////////////////////////////////////
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_type_round_trip() {
        for s in ["A", "AAAA", "CNAME", "TXT", "MX", "SRV", "URI", "TLSA"] {
            let ty: RecordType = s.parse().unwrap();
            assert_eq!(ty.as_str(), s);
        }

        let ty: RecordType = "cname".parse().unwrap();
        assert_eq!(ty, RecordType::CNAME);

        assert!("BOGUS".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_ttl_deserialize() {
        let ttl: Ttl = serde_json::from_str("1").unwrap();
        assert_eq!(ttl, Ttl::Auto);

        let ttl: Ttl = serde_json::from_str("3600").unwrap();
        assert_eq!(ttl, Ttl::Value(3600));
    }

    #[test]
    fn test_ttl_serialize() {
        assert_eq!(serde_json::to_string(&Ttl::Auto).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Ttl::Value(300)).unwrap(), "300");
    }

    #[test]
    fn test_validate_ok() {
        let spec = RecordSpec {
            rtype: RecordType::TXT,
            name: "cfdns.example.com".to_string(),
            content: "hello".to_string(),
            ttl: Ttl::Auto,
            priority: None,
            proxied: false,
            comment: None,
        };
        spec.validate().unwrap();
    }

    #[test]
    fn test_validate_mx_requires_priority() {
        let mut spec = RecordSpec {
            rtype: RecordType::MX,
            name: "example.com".to_string(),
            content: "mail.example.com".to_string(),
            ttl: Ttl::Value(3600),
            priority: None,
            proxied: false,
            comment: None,
        };
        assert!(spec.validate().is_err());

        spec.priority = Some(10);
        spec.validate().unwrap();
    }

    #[test]
    fn test_validate_priority_rejected_for_a() {
        let spec = RecordSpec {
            rtype: RecordType::A,
            name: "www.example.com".to_string(),
            content: "192.0.2.1".to_string(),
            ttl: Ttl::Auto,
            priority: Some(10),
            proxied: true,
            comment: None,
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_ttl_range() {
        let mut spec = RecordSpec {
            rtype: RecordType::A,
            name: "www.example.com".to_string(),
            content: "192.0.2.1".to_string(),
            ttl: Ttl::Value(59),
            priority: None,
            proxied: false,
            comment: None,
        };
        assert!(spec.validate().is_err());

        spec.ttl = Ttl::Value(86401);
        assert!(spec.validate().is_err());

        spec.ttl = Ttl::Value(60);
        spec.validate().unwrap();

        spec.ttl = Ttl::Value(86400);
        spec.validate().unwrap();
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let spec = RecordSpec {
            rtype: RecordType::MX,
            name: "".to_string(),
            content: "".to_string(),
            ttl: Ttl::Value(5),
            priority: None,
            proxied: false,
            comment: None,
        };
        match spec.validate() {
            Err(Error::ValidationError(problems)) => assert_eq!(problems.len(), 4),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_spec_serialize() {
        let spec = RecordSpec {
            rtype: RecordType::A,
            name: "www.example.com".to_string(),
            content: "192.0.2.1".to_string(),
            ttl: Ttl::Auto,
            priority: None,
            proxied: true,
            comment: None,
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"{"type":"A","name":"www.example.com","content":"192.0.2.1","ttl":1,"proxied":true}"#
        );
    }
}
