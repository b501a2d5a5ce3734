//! Loopback alias operations
//!
//! Each operation is a single shot: build the invocation, run it through the
//! [`PrivilegedRunner`], classify, and hand back an [`AliasReport`]. Nothing
//! here returns an error to the caller; a failing address becomes a report
//! and the batch moves on to the next one.

use crate::address::{is_loopback, normalize_prefix, AliasListing};
use crate::classify::{classify, Classification, Operation, Outcome};
use crate::config::{AliasConfig, ProbeSettings, ToolPaths};
use crate::error::{AliasError, AliasResult};
use crate::executor::{CommandInvocation, PrivilegedRunner};
use tracing::{debug, info, warn};

/// Label shown when remove targets the loopback address
pub const REFUSAL_LABEL: &str = "seriously? Not gonna do that!";

/// Line shown when the device query fails
pub const LIST_FAILED_LABEL: &str = "Failed to list loopback aliases";

/// Argument that turns `remove` into remove-all
pub const REMOVE_ALL_KEYWORD: &str = "all";

/// What a report line is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Test,
    /// One row of the listing with its probe result
    ListEntry,
    /// The device query itself
    Query,
}

impl From<Operation> for Action {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Add => Action::Add,
            Operation::Remove => Action::Remove,
            Operation::Test => Action::Test,
        }
    }
}

/// Result of one address (or of the device query)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasReport {
    pub action: Action,
    pub target: String,
    pub status: Classification,
}

impl AliasReport {
    pub fn outcome(&self) -> Outcome {
        self.status.outcome
    }
}

/// One parsed front-end request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Add(Vec<String>),
    Remove(Vec<String>),
    RemoveAll,
    Test(Vec<String>),
    List,
}

impl Request {
    /// `remove all` selects remove-all, any other argument list is taken literally
    pub fn remove(addresses: Vec<String>) -> Self {
        match addresses.as_slice() {
            [only] if only == REMOVE_ALL_KEYWORD => Request::RemoveAll,
            _ => Request::Remove(addresses),
        }
    }
}

/// Per-batch tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub failures: usize,
}

impl BatchSummary {
    pub fn record(&mut self, report: &AliasReport) {
        self.total += 1;
        if report.outcome().is_failure() {
            self.failures += 1;
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }
}

/// Alias operations against one device
pub struct AliasManager<R> {
    runner: R,
    device: String,
    tools: ToolPaths,
    probe: ProbeSettings,
}

impl<R: PrivilegedRunner> AliasManager<R> {
    pub fn new(runner: R, config: &AliasConfig) -> Self {
        Self {
            runner,
            device: config.device.clone(),
            tools: config.tools.clone(),
            probe: config.probe.clone(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `ip address add <addr>[/32] dev <device>`
    pub fn add_invocation(&self, address: &str) -> CommandInvocation {
        self.address_invocation("add", address)
    }

    /// `ip address del <addr>[/32] dev <device>`
    pub fn remove_invocation(&self, address: &str) -> CommandInvocation {
        self.address_invocation("del", address)
    }

    /// `ip address show dev <device>`
    pub fn query_invocation(&self) -> CommandInvocation {
        CommandInvocation::new(&self.tools.ip).args([
            "address",
            "show",
            "dev",
            self.device.as_str(),
        ])
    }

    /// `ping -c <count> -w <timeout> <addr>`
    pub fn probe_invocation(&self, address: &str) -> CommandInvocation {
        CommandInvocation::new(&self.tools.ping).args([
            "-c".to_string(),
            self.probe.count.to_string(),
            "-w".to_string(),
            self.probe.timeout_secs.to_string(),
            address.to_string(),
        ])
    }

    fn address_invocation(&self, verb: &str, address: &str) -> CommandInvocation {
        let address = normalize_prefix(address);
        CommandInvocation::new(&self.tools.ip).args([
            "address",
            verb,
            address.as_str(),
            "dev",
            self.device.as_str(),
        ])
    }

    pub async fn add(&self, address: &str) -> AliasReport {
        info!("Adding alias {} on {}", address, self.device);
        let invocation = self.add_invocation(address);
        self.run_classified(Operation::Add, address, &invocation).await
    }

    pub async fn remove(&self, address: &str) -> AliasReport {
        if is_loopback(address) {
            warn!("Refusing to remove loopback address {}", address);
            return AliasReport {
                action: Action::Remove,
                target: address.to_string(),
                status: Classification::new(Outcome::Refused, REFUSAL_LABEL),
            };
        }

        info!("Removing alias {} from {}", address, self.device);
        let invocation = self.remove_invocation(address);
        self.run_classified(Operation::Remove, address, &invocation).await
    }

    pub async fn test(&self, address: &str) -> AliasReport {
        info!("Probing {}", address);
        let invocation = self.probe_invocation(address);
        self.run_classified(Operation::Test, address, &invocation).await
    }

    /// Query the device and parse the aliases on it
    pub async fn query(&self) -> AliasResult<AliasListing> {
        let invocation = self.query_invocation();
        let result = self.runner.run(&invocation).await?;

        if !result.success() {
            return Err(AliasError::CommandFailed {
                cmd: invocation.shell_line(),
                detail: result.detail(),
            });
        }

        let listing = AliasListing::parse(&result.text());
        debug!("Found {} aliases on {}", listing.len(), self.device);
        Ok(listing)
    }

    /// Every alias on the device, each with a probe result
    pub async fn list(&self) -> Vec<AliasReport> {
        let mut reports = Vec::new();
        self.list_with(&mut |report| reports.push(report)).await;
        reports
    }

    /// Remove every alias currently on the device
    pub async fn remove_all(&self) -> Vec<AliasReport> {
        let mut reports = Vec::new();
        self.remove_all_with(&mut |report| reports.push(report)).await;
        reports
    }

    async fn list_with<F: FnMut(AliasReport)>(&self, emit: &mut F) {
        let listing = match self.query().await {
            Ok(listing) => listing,
            Err(e) => return emit(self.query_failed(e)),
        };

        for entry in listing.iter() {
            let address = entry.address.to_string();
            let invocation = self.probe_invocation(&address);
            let status = self.run_and_classify(Operation::Test, &invocation).await;
            emit(AliasReport {
                action: Action::ListEntry,
                target: entry.to_string(),
                status,
            });
        }
    }

    async fn remove_all_with<F: FnMut(AliasReport)>(&self, emit: &mut F) {
        let listing = match self.query().await {
            Ok(listing) => listing,
            Err(e) => return emit(self.query_failed(e)),
        };

        for entry in listing.iter() {
            emit(self.remove(&entry.to_string()).await);
        }
    }

    /// Run a whole request in input order, passing each report to `sink` as it completes
    pub async fn execute<F: FnMut(&AliasReport)>(
        &self,
        request: &Request,
        mut sink: F,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut emit = |report: AliasReport| {
            summary.record(&report);
            sink(&report);
        };

        match request {
            Request::Add(addresses) => {
                for address in addresses {
                    emit(self.add(address).await);
                }
            }
            Request::Remove(addresses) => {
                for address in addresses {
                    emit(self.remove(address).await);
                }
            }
            Request::RemoveAll => self.remove_all_with(&mut emit).await,
            Request::Test(addresses) => {
                for address in addresses {
                    emit(self.test(address).await);
                }
            }
            Request::List => self.list_with(&mut emit).await,
        }

        summary
    }

    async fn run_classified(
        &self,
        op: Operation,
        address: &str,
        invocation: &CommandInvocation,
    ) -> AliasReport {
        AliasReport {
            action: op.into(),
            target: address.to_string(),
            status: self.run_and_classify(op, invocation).await,
        }
    }

    async fn run_and_classify(
        &self,
        op: Operation,
        invocation: &CommandInvocation,
    ) -> Classification {
        let status = match self.runner.run(invocation).await {
            Ok(result) => classify(op, &result),
            Err(e) => Classification::failure(op.failure_label(), e.to_string()),
        };

        if status.outcome.is_failure() {
            warn!("{} '{}' failed: {}", op, invocation, status.text());
        } else {
            debug!("{} '{}': {:?}", op, invocation, status.outcome);
        }
        status
    }

    fn query_failed(&self, e: AliasError) -> AliasReport {
        warn!("{}: {}", LIST_FAILED_LABEL, e);
        AliasReport {
            action: Action::Query,
            target: self.device.clone(),
            status: Classification::failure(LIST_FAILED_LABEL, e.to_string()),
        }
    }
}
