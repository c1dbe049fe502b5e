//! Technology classification of technical assets
//!
//! Rules never match on individual technologies directly. They ask
//! whether a technology has a [`Capability`], so adding a technology only
//! means extending the capability table below.

string_enum! {
    /// Kind of software or system a technical asset is
    #[derive(Default)]
    pub enum Technology {
        #[default]
        Unknown => "unknown-technology",
        ClientSystem => "client-system",
        Browser => "browser",
        Desktop => "desktop",
        MobileApp => "mobile-app",
        DevopsClient => "devops-client",
        WebServer => "web-server",
        WebApplication => "web-application",
        ApplicationServer => "application-server",
        Database => "database",
        FileServer => "file-server",
        LocalFileSystem => "local-file-system",
        Erp => "erp",
        Cms => "cms",
        WebServiceRest => "web-service-rest",
        WebServiceSoap => "web-service-soap",
        Ejb => "ejb",
        SearchIndex => "search-index",
        SearchEngine => "search-engine",
        ServiceRegistry => "service-registry",
        ReverseProxy => "reverse-proxy",
        LoadBalancer => "load-balancer",
        BuildPipeline => "build-pipeline",
        SourcecodeRepository => "sourcecode-repository",
        ArtifactRegistry => "artifact-registry",
        CodeInspectionPlatform => "code-inspection-platform",
        Monitoring => "monitoring",
        LdapServer => "ldap-server",
        ContainerPlatform => "container-platform",
        BatchProcessing => "batch-processing",
        EventListener => "event-listener",
        IdentityProvider => "identity-provider",
        IdentityStoreLdap => "identity-store-ldap",
        IdentityStoreDatabase => "identity-store-database",
        Tool => "tool",
        Cli => "cli",
        Task => "task",
        Function => "function",
        Gateway => "gateway",
        IotDevice => "iot-device",
        MessageQueue => "message-queue",
        StreamProcessing => "stream-processing",
        ServiceMesh => "service-mesh",
        DataLake => "data-lake",
        BigDataPlatform => "big-data-platform",
        ReportEngine => "report-engine",
        Ai => "ai",
        MailServer => "mail-server",
        Vault => "vault",
        Hsm => "hsm",
        Waf => "waf",
        Ids => "ids",
        Ips => "ips",
        Scheduler => "scheduler",
        Mainframe => "mainframe",
        BlockStorage => "block-storage",
        Library => "library",
    }
}

string_enum! {
    /// Named boolean property of a technology
    pub enum Capability {
        WebApplication => "web-application",
        WebService => "web-service",
        IdentityRelated => "identity-related",
        SecurityControlRelated => "security-control-related",
        UnprotectedCommsTolerated => "unprotected-comms-tolerated",
        UnnecessaryDataTolerated => "unnecessary-data-tolerated",
        CloseToHighValueTargetsTolerated => "close-to-high-value-targets-tolerated",
        Client => "client",
        PropagatesIdentity => "propagates-identity",
        LessProtectedType => "less-protected-type",
        ProcessesEnduserRequests => "processes-enduser-requests",
        StoresEnduserData => "stores-enduser-data",
        ExclusivelyFrontend => "exclusively-frontend",
        ExclusivelyBackend => "exclusively-backend",
        DevelopmentRelevant => "development-relevant",
        TrafficForwarding => "traffic-forwarding",
        EmbeddedComponent => "embedded-component",
    }
}

impl Technology {
    pub fn has_capability(self, capability: Capability) -> bool {
        use Technology::*;
        match capability {
            Capability::WebApplication => matches!(
                self,
                WebServer
                    | WebApplication
                    | ApplicationServer
                    | Erp
                    | Cms
                    | IdentityProvider
                    | ReportEngine
            ),
            Capability::WebService => matches!(self, WebServiceRest | WebServiceSoap),
            Capability::IdentityRelated => {
                matches!(self, IdentityProvider | IdentityStoreLdap | IdentityStoreDatabase)
            }
            Capability::SecurityControlRelated => matches!(self, Vault | Hsm | Waf | Ids | Ips),
            Capability::UnprotectedCommsTolerated | Capability::UnnecessaryDataTolerated => {
                matches!(self, Monitoring | Ids | Ips)
            }
            Capability::CloseToHighValueTargetsTolerated => {
                matches!(self, Monitoring | Ids | Ips | LoadBalancer | ReverseProxy)
            }
            Capability::Client => matches!(
                self,
                ClientSystem | Browser | Desktop | MobileApp | DevopsClient | IotDevice
            ),
            Capability::PropagatesIdentity => matches!(
                self,
                ClientSystem
                    | Browser
                    | Desktop
                    | MobileApp
                    | DevopsClient
                    | WebServer
                    | WebApplication
                    | ApplicationServer
                    | Erp
                    | Cms
                    | WebServiceRest
                    | WebServiceSoap
                    | Ejb
                    | SearchEngine
                    | ReverseProxy
                    | LoadBalancer
                    | IdentityProvider
                    | Tool
                    | Cli
                    | Task
                    | Function
                    | Gateway
                    | IotDevice
                    | MessageQueue
                    | ServiceMesh
                    | ReportEngine
                    | Waf
                    | Library
            ),
            Capability::LessProtectedType => matches!(
                self,
                ClientSystem
                    | Browser
                    | Desktop
                    | MobileApp
                    | DevopsClient
                    | WebServer
                    | WebApplication
                    | ApplicationServer
                    | Cms
                    | WebServiceRest
                    | WebServiceSoap
                    | Ejb
                    | BuildPipeline
                    | SourcecodeRepository
                    | ArtifactRegistry
                    | CodeInspectionPlatform
                    | Monitoring
                    | IotDevice
                    | Ai
                    | MailServer
                    | Scheduler
                    | Mainframe
            ),
            Capability::ProcessesEnduserRequests => matches!(
                self,
                WebServer
                    | WebApplication
                    | ApplicationServer
                    | Erp
                    | WebServiceRest
                    | WebServiceSoap
                    | Ejb
                    | ReportEngine
            ),
            Capability::StoresEnduserData => matches!(
                self,
                Database
                    | Erp
                    | FileServer
                    | LocalFileSystem
                    | BlockStorage
                    | MailServer
                    | StreamProcessing
                    | MessageQueue
            ),
            Capability::ExclusivelyFrontend => matches!(
                self,
                ClientSystem
                    | Browser
                    | Desktop
                    | MobileApp
                    | DevopsClient
                    | Cms
                    | ReverseProxy
                    | Waf
                    | LoadBalancer
                    | Gateway
                    | IotDevice
            ),
            Capability::ExclusivelyBackend => matches!(
                self,
                Database
                    | IdentityProvider
                    | IdentityStoreLdap
                    | IdentityStoreDatabase
                    | Erp
                    | WebServiceRest
                    | WebServiceSoap
                    | Ejb
                    | SearchIndex
                    | SearchEngine
                    | ContainerPlatform
                    | BatchProcessing
                    | EventListener
                    | DataLake
                    | BigDataPlatform
                    | MessageQueue
                    | StreamProcessing
                    | ServiceMesh
                    | Vault
                    | Hsm
                    | Scheduler
                    | Mainframe
                    | FileServer
                    | BlockStorage
            ),
            Capability::DevelopmentRelevant => matches!(
                self,
                BuildPipeline
                    | SourcecodeRepository
                    | ArtifactRegistry
                    | CodeInspectionPlatform
                    | DevopsClient
            ),
            Capability::TrafficForwarding => matches!(self, LoadBalancer | ReverseProxy | Waf),
            Capability::EmbeddedComponent => matches!(self, Library),
        }
    }

    /// All capabilities this technology has.
    pub fn capabilities(self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| self.has_capability(*c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_and_display_roundtrip_names() {
        let t = Technology::from_str("identity-store-ldap").expect("parse technology");
        assert_eq!(t, Technology::IdentityStoreLdap);
        assert_eq!(Technology::IotDevice.to_string(), "iot-device");
        assert!(Technology::from_str("quantum-computer").is_err());
    }

    #[test]
    fn test_traffic_forwarding() {
        assert!(Technology::LoadBalancer.has_capability(Capability::TrafficForwarding));
        assert!(Technology::Waf.has_capability(Capability::TrafficForwarding));
        assert!(!Technology::WebServer.has_capability(Capability::TrafficForwarding));
    }

    #[test]
    fn test_monitoring_tolerates_unprotected_comms() {
        let caps = Technology::Monitoring.capabilities();
        assert!(caps.contains(&Capability::UnprotectedCommsTolerated));
        assert!(caps.contains(&Capability::CloseToHighValueTargetsTolerated));
        assert!(caps.contains(&Capability::LessProtectedType));
        assert!(!caps.contains(&Capability::Client));
    }

    #[test]
    fn test_unknown_technology_has_no_capabilities() {
        assert!(Technology::Unknown.capabilities().is_empty());
        assert_eq!(Technology::default(), Technology::Unknown);
    }
}
