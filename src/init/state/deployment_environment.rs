use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeploymentEnvironment {
    Local,
    Dev,
    Staging,
    Prod,
}

impl DeploymentEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentEnvironment::Local => "local",
            DeploymentEnvironment::Dev => "dev",
            DeploymentEnvironment::Staging => "staging",
            DeploymentEnvironment::Prod => "prd",
        }
    }
}

impl FromStr for DeploymentEnvironment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(DeploymentEnvironment::Local),
            "dev" => Ok(DeploymentEnvironment::Dev),
            "staging" | "stg" => Ok(DeploymentEnvironment::Staging),
            "prd" | "prod" => Ok(DeploymentEnvironment::Prod),
            other => Err(anyhow!("Unknown deployment environment: {other}")),
        }
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
