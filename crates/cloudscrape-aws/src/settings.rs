//! Region, credentials and endpoint selection for the SDK client.

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};

/// STS session name used when assuming `role_arn`.
pub const ASSUME_ROLE_SESSION_NAME: &str = "cloudwatch_exporter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub region: String,
    pub role_arn: Option<String>,
    /// Replaces the regional endpoint of every AWS service, STS included.
    pub endpoint_url: Option<String>,
}

impl ClientSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            role_arn: None,
            endpoint_url: None,
        }
    }

    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// SDK config loader for this region using the default provider chain.
    pub fn loader(&self) -> ConfigLoader {
        let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        match &self.endpoint_url {
            Some(url) => loader.endpoint_url(url.clone()),
            None => loader,
        }
    }

    pub fn credential_source(&self) -> CredentialSource {
        match &self.role_arn {
            Some(role_arn) => CredentialSource::AssumeRole {
                role_arn: role_arn.clone(),
                session_name: ASSUME_ROLE_SESSION_NAME,
            },
            None => CredentialSource::DefaultChain,
        }
    }
}

/// How CloudWatch requests obtain credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Whatever the loaded SDK config resolves.
    DefaultChain,
    /// STS AssumeRole, signed with the credentials of the loaded SDK config.
    AssumeRole {
        role_arn: String,
        session_name: &'static str,
    },
}

impl CredentialSource {
    /// CloudWatch client config derived from `base`.
    ///
    /// Credentials are resolved lazily on the first request.
    pub async fn cloudwatch_config(&self, base: &SdkConfig) -> aws_sdk_cloudwatch::Config {
        let builder = aws_sdk_cloudwatch::config::Builder::from(base);
        match self {
            Self::DefaultChain => builder.build(),
            Self::AssumeRole { role_arn, session_name } => {
                let provider = AssumeRoleProvider::builder(role_arn.clone())
                    .session_name(*session_name)
                    .configure(base)
                    .build()
                    .await;
                builder.credentials_provider(provider).build()
            }
        }
    }
}
