use strum::{Display, EnumString};

/// Whether clients must negotiate TLS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
pub enum TlsRequired {
    /// TLS is optional.
    #[default]
    #[strum(serialize = "false")]
    Disabled,
    /// Every TCP and HTTP client must use TLS.
    #[strum(serialize = "true")]
    Required,
    /// TCP clients must use TLS; plain HTTP stays available.
    #[strum(serialize = "tcp-https")]
    TcpAndHttps,
}

/// Oldest TLS protocol version accepted from clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum TlsVersion {
    /// TLS 1.0.
    #[default]
    #[strum(serialize = "tls1.0")]
    Tls10,
    /// TLS 1.1.
    #[strum(serialize = "tls1.1")]
    Tls11,
    /// TLS 1.2.
    #[strum(serialize = "tls1.2")]
    Tls12,
    /// TLS 1.3.
    #[strum(serialize = "tls1.3")]
    Tls13,
}

/// Client certificate policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
pub enum TlsClientAuthPolicy {
    /// Client certificates are not requested.
    #[default]
    #[strum(serialize = "")]
    None,
    /// A client certificate must be presented.
    #[strum(serialize = "require")]
    Require,
    /// A client certificate must be presented and verify against the root CA.
    #[strum(serialize = "require-verify")]
    RequireVerify,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_spellings() {
        assert_eq!("tcp-https".parse::<TlsRequired>().ok(), Some(TlsRequired::TcpAndHttps));
        assert_eq!("TLS1.2".parse::<TlsVersion>().ok(), Some(TlsVersion::Tls12));
        assert_eq!("".parse::<TlsClientAuthPolicy>().ok(), Some(TlsClientAuthPolicy::None));
        assert!("ssl3.0".parse::<TlsVersion>().is_err());
    }
}
