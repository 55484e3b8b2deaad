use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    pub company: String,
    pub contract: String,
}

/// Upstream that owns contract data.
#[async_trait]
pub trait ContractSource: Send + Sync {
    /// `company` is already sanitized.
    async fn contracts_for(&self, company: &str) -> anyhow::Result<Vec<Contract>>;
}

/// Stand-in source answering one contract per company.
#[derive(Debug, Clone, Default)]
pub struct MockContracts;

#[async_trait]
impl ContractSource for MockContracts {
    async fn contracts_for(&self, company: &str) -> anyhow::Result<Vec<Contract>> {
        Ok(vec![Contract {
            company: company.to_owned(),
            contract: "Contract 1".into(),
        }])
    }
}

/// Drops every character outside `[A-Za-z0-9]`.
pub fn sanitize_company(raw: &str) -> String {
    lazy_static! {
        static ref NOT_ALNUM: Regex = Regex::new(r"[^A-Za-z0-9]").unwrap();
    }
    NOT_ALNUM.replace_all(raw, "").into_owned()
}
