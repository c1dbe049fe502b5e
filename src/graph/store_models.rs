use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::technology::Technology;

static NON_ID_CHARS: OnceLock<Regex> = OnceLock::new();

fn non_id_chars() -> &'static Regex {
    NON_ID_CHARS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// Normalize a free-form title into an ID fragment (`"Web Traffic"` -> `"web-traffic"`).
pub fn make_id(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    non_id_chars()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

string_enum! {
    #[derive(Default)]
    pub enum Confidentiality {
        #[default]
        Public => "public",
        Internal => "internal",
        Restricted => "restricted",
        Confidential => "confidential",
        StrictlyConfidential => "strictly-confidential",
    }
}

string_enum! {
    /// Rating used for both integrity and availability
    #[derive(Default)]
    pub enum Criticality {
        #[default]
        Archive => "archive",
        Operational => "operational",
        Important => "important",
        Critical => "critical",
        MissionCritical => "mission-critical",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Quantity {
        #[default]
        VeryFew => "very-few",
        Few => "few",
        Many => "many",
        VeryMany => "very-many",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum TechnicalAssetType {
        ExternalEntity => "external-entity",
        #[default]
        Process => "process",
        Datastore => "datastore",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Size {
        System => "system",
        Service => "service",
        #[default]
        Application => "application",
        Component => "component",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Machine {
        Physical => "physical",
        #[default]
        Virtual => "virtual",
        Container => "container",
        Serverless => "serverless",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum EncryptionStyle {
        #[default]
        None => "none",
        Transparent => "transparent",
        DataWithSymmetricSharedKey => "data-with-symmetric-shared-key",
        DataWithAsymmetricSharedKey => "data-with-asymmetric-shared-key",
        DataWithEnduserIndividualKey => "data-with-enduser-individual-key",
    }
}

string_enum! {
    pub enum DataFormat {
        Json => "json",
        Xml => "xml",
        Serialization => "serialization",
        File => "file",
        Csv => "csv",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Usage {
        #[default]
        Business => "business",
        Devops => "devops",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Authentication {
        #[default]
        None => "none",
        Credentials => "credentials",
        SessionId => "session-id",
        Token => "token",
        ClientCertificate => "client-certificate",
        TwoFactor => "two-factor",
        Externalized => "externalized",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Authorization {
        #[default]
        None => "none",
        TechnicalUser => "technical-user",
        EnduserIdentityPropagation => "enduser-identity-propagation",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum Protocol {
        #[default]
        Unknown => "unknown-protocol",
        Http => "http",
        Https => "https",
        Ws => "ws",
        Wss => "wss",
        ReverseProxyWebProtocol => "reverse-proxy-web-protocol",
        ReverseProxyWebProtocolEncrypted => "reverse-proxy-web-protocol-encrypted",
        Mqtt => "mqtt",
        Jdbc => "jdbc",
        JdbcEncrypted => "jdbc-encrypted",
        Odbc => "odbc",
        OdbcEncrypted => "odbc-encrypted",
        SqlAccessProtocol => "sql-access-protocol",
        SqlAccessProtocolEncrypted => "sql-access-protocol-encrypted",
        NosqlAccessProtocol => "nosql-access-protocol",
        NosqlAccessProtocolEncrypted => "nosql-access-protocol-encrypted",
        Binary => "binary",
        BinaryEncrypted => "binary-encrypted",
        Text => "text",
        TextEncrypted => "text-encrypted",
        Ssh => "ssh",
        SshTunnel => "ssh-tunnel",
        Smtp => "smtp",
        SmtpEncrypted => "smtp-encrypted",
        Pop3 => "pop3",
        Pop3Encrypted => "pop3-encrypted",
        Imap => "imap",
        ImapEncrypted => "imap-encrypted",
        Ftp => "ftp",
        Ftps => "ftps",
        Sftp => "sftp",
        Scp => "scp",
        Ldap => "ldap",
        Ldaps => "ldaps",
        Jms => "jms",
        Nfs => "nfs",
        Smb => "smb",
        SmbEncrypted => "smb-encrypted",
        LocalFileAccess => "local-file-access",
        Nrpe => "nrpe",
        Xmpp => "xmpp",
        Iiop => "iiop",
        IiopEncrypted => "iiop-encrypted",
        Jrmp => "jrmp",
        JrmpEncrypted => "jrmp-encrypted",
        InProcessLibraryCall => "in-process-library-call",
        ContainerSpawning => "container-spawning",
    }
}

impl Protocol {
    /// Protocols that never leave the host.
    pub fn is_process_local(self) -> bool {
        matches!(
            self,
            Protocol::InProcessLibraryCall | Protocol::LocalFileAccess | Protocol::ContainerSpawning
        )
    }

    pub fn is_encrypted(self) -> bool {
        use Protocol::*;
        matches!(
            self,
            Https
                | Wss
                | JdbcEncrypted
                | OdbcEncrypted
                | NosqlAccessProtocolEncrypted
                | SqlAccessProtocolEncrypted
                | BinaryEncrypted
                | TextEncrypted
                | Ssh
                | SshTunnel
                | Ftps
                | Sftp
                | Scp
                | Ldaps
                | ReverseProxyWebProtocolEncrypted
                | IiopEncrypted
                | JrmpEncrypted
                | SmbEncrypted
                | SmtpEncrypted
                | Pop3Encrypted
                | ImapEncrypted
        )
    }

    /// With `lax`, HTTP and binary protocols also count (REST-based stores).
    pub fn is_potential_database_access_protocol(self, lax: bool) -> bool {
        use Protocol::*;
        let strict = matches!(
            self,
            Jdbc | JdbcEncrypted
                | Odbc
                | OdbcEncrypted
                | SqlAccessProtocol
                | SqlAccessProtocolEncrypted
                | NosqlAccessProtocol
                | NosqlAccessProtocolEncrypted
        );
        strict || (lax && matches!(self, Http | Https | Binary | BinaryEncrypted))
    }

    pub fn is_potential_web_access_protocol(self) -> bool {
        use Protocol::*;
        matches!(
            self,
            Http | Https | Ws | Wss | ReverseProxyWebProtocol | ReverseProxyWebProtocolEncrypted
        )
    }
}

string_enum! {
    pub enum TrustBoundaryType {
        NetworkOnPrem => "network-on-prem",
        NetworkDedicatedHoster => "network-dedicated-hoster",
        NetworkVirtualLan => "network-virtual-lan",
        NetworkCloudProvider => "network-cloud-provider",
        NetworkCloudSecurityGroup => "network-cloud-security-group",
        NetworkPolicyNamespaceIsolation => "network-policy-namespace-isolation",
        ExecutionEnvironment => "execution-environment",
    }
}

impl TrustBoundaryType {
    /// Every kind except execution environments segments the network.
    pub fn is_network_boundary(self) -> bool {
        !matches!(self, TrustBoundaryType::ExecutionEnvironment)
    }
}

/// Business data handled by technical assets
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataAsset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub usage: Usage,
    pub tags: Vec<String>,
    pub origin: String,
    pub owner: String,
    pub quantity: Quantity,
    pub confidentiality: Confidentiality,
    pub integrity: Criticality,
    pub availability: Criticality,
    pub justification_cia_rating: String,
}

impl DataAsset {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_cia(
        mut self,
        confidentiality: Confidentiality,
        integrity: Criticality,
        availability: Criticality,
    ) -> Self {
        self.confidentiality = confidentiality;
        self.integrity = integrity;
        self.availability = availability;
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Directed communication from a source asset to a target asset
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommunicationLink {
    /// `<source-id>><make_id(title)>`
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub title: String,
    pub description: String,
    pub protocol: Protocol,
    pub tags: Vec<String>,
    pub vpn: bool,
    pub ip_filtered: bool,
    pub readonly: bool,
    pub authentication: Authentication,
    pub authorization: Authorization,
    pub usage: Usage,
    pub data_assets_sent: Vec<String>,
    pub data_assets_received: Vec<String>,
}

impl CommunicationLink {
    pub fn new(source_id: &str, title: &str, target_id: &str, protocol: Protocol) -> Self {
        Self {
            id: Self::link_id(source_id, title),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            title: title.to_string(),
            protocol,
            ..Default::default()
        }
    }

    pub fn link_id(source_id: &str, title: &str) -> String {
        format!("{}>{}", source_id, make_id(title))
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn with_data_sent(mut self, ids: &[&str]) -> Self {
        self.data_assets_sent = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_data_received(mut self, ids: &[&str]) -> Self {
        self.data_assets_received = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_vpn(mut self, vpn: bool) -> Self {
        self.vpn = vpn;
        self
    }

}

/// A running component of the architecture
#[derive(Debug, Clone, Default, Serialize)]
pub struct TechnicalAsset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub usage: Usage,
    #[serde(rename = "type")]
    pub asset_type: TechnicalAssetType,
    pub size: Size,
    pub technology: Technology,
    pub machine: Machine,
    pub internet: bool,
    pub multi_tenant: bool,
    pub redundant: bool,
    pub custom_developed_parts: bool,
    pub out_of_scope: bool,
    pub justification_out_of_scope: String,
    pub owner: String,
    pub confidentiality: Confidentiality,
    pub integrity: Criticality,
    pub availability: Criticality,
    pub justification_cia_rating: String,
    pub encryption: EncryptionStyle,
    pub data_formats_accepted: Vec<DataFormat>,
    pub tags: Vec<String>,
    pub data_assets_processed: Vec<String>,
    pub data_assets_stored: Vec<String>,
    /// Outgoing links, in document order
    pub communication_links: Vec<CommunicationLink>,
    /// Relative attacker attractiveness, written once by the RAA scorer
    pub raa: f64,
}

impl TechnicalAsset {
    pub fn new(id: &str, technology: Technology) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            technology,
            ..Default::default()
        }
    }

    pub fn with_type(mut self, asset_type: TechnicalAssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    pub fn with_cia(
        mut self,
        confidentiality: Confidentiality,
        integrity: Criticality,
        availability: Criticality,
    ) -> Self {
        self.confidentiality = confidentiality;
        self.integrity = integrity;
        self.availability = availability;
        self
    }

    pub fn with_link(mut self, link: CommunicationLink) -> Self {
        self.communication_links.push(link);
        self
    }

    pub fn with_processed(mut self, ids: &[&str]) -> Self {
        self.data_assets_processed = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_stored(mut self, ids: &[&str]) -> Self {
        self.data_assets_stored = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn out_of_scope(mut self) -> Self {
        self.out_of_scope = true;
        self
    }

    pub fn is_datastore(&self) -> bool {
        self.asset_type == TechnicalAssetType::Datastore
    }
}

/// A security perimeter grouping assets and nested boundaries
#[derive(Debug, Clone, Serialize)]
pub struct TrustBoundary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub boundary_type: TrustBoundaryType,
    pub tags: Vec<String>,
    pub technical_assets_inside: Vec<String>,
    pub trust_boundaries_nested: Vec<String>,
}

impl TrustBoundary {
    pub fn new(id: &str, boundary_type: TrustBoundaryType) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            boundary_type,
            tags: Vec::new(),
            technical_assets_inside: Vec::new(),
            trust_boundaries_nested: Vec::new(),
        }
    }

    pub fn with_assets(mut self, ids: &[&str]) -> Self {
        self.technical_assets_inside = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_nested(mut self, ids: &[&str]) -> Self {
        self.trust_boundaries_nested = ids.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Assets executing on common infrastructure
#[derive(Debug, Clone, Default, Serialize)]
pub struct SharedRuntime {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub technical_assets_running: Vec<String>,
}

impl SharedRuntime {
    pub fn new(id: &str, running: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            technical_assets_running: running.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_make_id_normalizes_titles() {
        assert_eq!(make_id("Web Traffic"), "web-traffic");
        assert_eq!(make_id("  DB Access (JDBC)  "), "db-access-jdbc");
        assert_eq!(make_id("--x--"), "x");
    }

    #[test]
    fn test_link_id_uses_source_and_title() {
        let link = CommunicationLink::new("web", "Database Access", "db", Protocol::Jdbc);
        assert_eq!(link.id, "web>database-access");
    }

    #[test]
    fn test_protocol_predicates() {
        assert!(Protocol::Https.is_encrypted());
        assert!(!Protocol::Http.is_encrypted());
        assert!(Protocol::LocalFileAccess.is_process_local());
        assert!(Protocol::Wss.is_potential_web_access_protocol());
        assert!(Protocol::Jdbc.is_potential_database_access_protocol(false));
        assert!(!Protocol::Http.is_potential_database_access_protocol(false));
        assert!(Protocol::Http.is_potential_database_access_protocol(true));
    }

    #[test]
    fn test_boundary_kinds() {
        assert!(TrustBoundaryType::NetworkVirtualLan.is_network_boundary());
        assert!(!TrustBoundaryType::ExecutionEnvironment.is_network_boundary());
    }

    #[test]
    fn test_ratings_are_ordered() {
        assert!(Confidentiality::StrictlyConfidential > Confidentiality::Confidential);
        assert!(Criticality::MissionCritical > Criticality::Critical);
        assert_eq!(
            Criticality::from_str("mission-critical").expect("parse"),
            Criticality::MissionCritical
        );
    }

    #[test]
    fn test_from_str_agrees_with_document_names() {
        for protocol in Protocol::ALL {
            let parsed = Protocol::from_str(protocol.as_str()).expect("parse");
            assert_eq!(parsed, *protocol);
            let from_json: Protocol =
                serde_json::from_value(serde_json::Value::from(protocol.as_str())).expect("json");
            assert_eq!(from_json, parsed);
        }
        assert_eq!(
            TrustBoundaryType::from_str(" network-on-prem ").expect("parse"),
            TrustBoundaryType::NetworkOnPrem
        );
        let err = Criticality::from_str("MissionCritical").unwrap_err();
        assert_eq!(err.to_string(), "Unknown Criticality 'MissionCritical'");
    }
}
