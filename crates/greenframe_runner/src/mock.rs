//! Mock runtime client for testing.
//!
//! Simulates container existence the way the Docker CLI reports it, records
//! every call, and lets tests script the output of individual primitives.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::client::{CommandOutput, CreateSpec, RuntimeClient};
use crate::error::{RuntimeError, RuntimeResult};

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: String,
    pub name: String,
    pub args: Vec<String>,
    pub spec: Option<CreateSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimState {
    Created,
    Running,
}

/// Mock runtime client for testing.
///
/// Without scripted responses it behaves like a daemon: `create` conflicts
/// on an existing name, `start`/`rename`/`stop` fail on a missing one, and
/// `rm -f` of a missing container succeeds silently.
#[derive(Clone, Default)]
pub struct MockClient {
    /// Simulated containers by name.
    containers: Arc<RwLock<HashMap<String, SimState>>>,
    /// Scripted outputs per method, consumed in order.
    scripted: Arc<RwLock<HashMap<String, VecDeque<CommandOutput>>>>,
    /// Methods that fail to spawn.
    unavailable: Arc<RwLock<HashSet<String>>>,
    /// Report "No such container" when force-removing a missing container.
    strict_remove: Arc<RwLock<bool>>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
}

impl MockClient {
    /// Create a new mock client with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a container already exists.
    pub fn with_container(self, name: impl Into<String>, running: bool) -> Self {
        let state = if running {
            SimState::Running
        } else {
            SimState::Created
        };
        self.containers.write().insert(name.into(), state);
        self
    }

    /// Queue an output for the next call to `method`, bypassing simulation.
    pub fn script(self, method: &str, output: CommandOutput) -> Self {
        self.scripted
            .write()
            .entry(method.to_string())
            .or_default()
            .push_back(output);
        self
    }

    /// Make `method` fail as if the runtime binary could not be spawned.
    pub fn unavailable(self, method: &str) -> Self {
        self.unavailable.write().insert(method.to_string());
        self
    }

    /// Make `rm -f` of a missing container fail like older runtimes do.
    pub fn strict_remove(self) -> Self {
        *self.strict_remove.write() = true;
        self
    }

    /// Check if a simulated container exists.
    pub fn exists(&self, name: &str) -> bool {
        self.containers.read().contains_key(name)
    }

    /// Check if a simulated container is running.
    pub fn is_running(&self, name: &str) -> bool {
        self.containers.read().get(name) == Some(&SimState::Running)
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Names of the methods called, in order.
    pub fn method_sequence(&self) -> Vec<String> {
        self.captured_calls
            .read()
            .iter()
            .map(|c| c.method.clone())
            .collect()
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Check if a specific method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.captured_calls.read().iter().any(|c| c.method == method)
    }

    fn record(&self, method: &str, name: &str, args: Vec<String>, spec: Option<CreateSpec>) {
        self.captured_calls.write().push(CapturedCall {
            method: method.to_string(),
            name: name.to_string(),
            args,
            spec,
        });
    }

    /// Spawn failure or scripted output, if any applies to `method`.
    fn intercept(&self, method: &str) -> Option<RuntimeResult<CommandOutput>> {
        if self.unavailable.read().contains(method) {
            return Some(Err(RuntimeError::Spawn {
                program: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock runtime missing"),
            }));
        }
        self.scripted
            .write()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .map(Ok)
    }

    fn no_such_container(name: &str) -> CommandOutput {
        CommandOutput::failed(1, format!("Error: No such container: {}\n", name))
    }
}

#[async_trait]
impl RuntimeClient for MockClient {
    async fn remove(&self, name: &str, force: bool) -> RuntimeResult<CommandOutput> {
        self.record("remove", name, vec![force.to_string()], None);
        if let Some(out) = self.intercept("remove") {
            return out;
        }

        let mut containers = self.containers.write();
        match containers.get(name).copied() {
            Some(SimState::Running) if !force => Ok(CommandOutput::failed(
                1,
                format!("Error: cannot remove running container {}\n", name),
            )),
            Some(_) => {
                containers.remove(name);
                Ok(CommandOutput::ok(format!("{}\n", name)))
            }
            None if *self.strict_remove.read() => Ok(Self::no_such_container(name)),
            None => Ok(CommandOutput::ok("")),
        }
    }

    async fn create(&self, spec: &CreateSpec) -> RuntimeResult<CommandOutput> {
        self.record("create", &spec.name, Vec::new(), Some(spec.clone()));
        if let Some(out) = self.intercept("create") {
            return out;
        }

        let mut containers = self.containers.write();
        if containers.contains_key(&spec.name) {
            return Ok(CommandOutput::failed(
                125,
                format!(
                    "Error response from daemon: Conflict. The container name \"/{}\" is already in use.\n",
                    spec.name
                ),
            ));
        }
        containers.insert(spec.name.clone(), SimState::Created);
        Ok(CommandOutput::ok("4f1c2a9e8b7d\n"))
    }

    async fn start(&self, name: &str) -> RuntimeResult<CommandOutput> {
        self.record("start", name, Vec::new(), None);
        if let Some(out) = self.intercept("start") {
            return out;
        }

        let mut containers = self.containers.write();
        match containers.get_mut(name) {
            Some(state) => {
                *state = SimState::Running;
                Ok(CommandOutput::ok(format!("{}\n", name)))
            }
            None => Ok(Self::no_such_container(name)),
        }
    }

    async fn exec(&self, name: &str, command: &[String]) -> RuntimeResult<CommandOutput> {
        self.record("exec", name, command.to_vec(), None);
        if let Some(out) = self.intercept("exec") {
            return out;
        }

        match self.containers.read().get(name) {
            Some(SimState::Running) => Ok(CommandOutput::ok("=====TIMELINES=====\n[]\n")),
            Some(SimState::Created) => Ok(CommandOutput::failed(
                1,
                format!("Error response from daemon: Container {} is not running\n", name),
            )),
            None => Ok(Self::no_such_container(name)),
        }
    }

    async fn stop(&self, name: &str) -> RuntimeResult<CommandOutput> {
        self.record("stop", name, Vec::new(), None);
        if let Some(out) = self.intercept("stop") {
            return out;
        }

        // Containers are created with --rm, so stopping removes them.
        match self.containers.write().remove(name) {
            Some(_) => Ok(CommandOutput::ok(format!("{}\n", name))),
            None => Ok(Self::no_such_container(name)),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> RuntimeResult<CommandOutput> {
        self.record("rename", from, vec![to.to_string()], None);
        if let Some(out) = self.intercept("rename") {
            return out;
        }

        let mut containers = self.containers.write();
        match containers.remove(from) {
            Some(state) => {
                containers.insert(to.to_string(), state);
                Ok(CommandOutput::ok(""))
            }
            None => Ok(Self::no_such_container(from)),
        }
    }

    async fn copy_into(
        &self,
        source: &Path,
        name: &str,
        destination: &str,
    ) -> RuntimeResult<CommandOutput> {
        self.record(
            "copy_into",
            name,
            vec![source.display().to_string(), destination.to_string()],
            None,
        );
        if let Some(out) = self.intercept("copy_into") {
            return out;
        }

        if self.exists(name) {
            Ok(CommandOutput::ok(""))
        } else {
            Ok(Self::no_such_container(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> CreateSpec {
        CreateSpec {
            name: name.to_string(),
            image: "img".to_string(),
            env: Vec::new(),
            hosts: Vec::new(),
            tty: true,
            auto_remove: true,
        }
    }

    #[tokio::test]
    async fn test_create_conflicts_on_existing_name() {
        let client = MockClient::new().with_container("c", false);

        let output = client.create(&spec("c")).await.unwrap();

        assert!(!output.success());
        assert!(output.stderr.contains("already in use"));
    }

    #[tokio::test]
    async fn test_force_remove_missing_is_silent() {
        let client = MockClient::new();
        let output = client.remove("c", true).await.unwrap();
        assert!(output.success());

        let strict = MockClient::new().strict_remove();
        let output = strict.remove("c", true).await.unwrap();
        assert!(output.stderr.contains("No such container"));
    }

    #[tokio::test]
    async fn test_rename_moves_container() {
        let client = MockClient::new().with_container("c", true);

        client.rename("c", "c-stopping").await.unwrap();

        assert!(!client.exists("c"));
        assert!(client.is_running("c-stopping"));
    }

    #[tokio::test]
    async fn test_scripted_output_takes_precedence() {
        let client = MockClient::new()
            .with_container("c", true)
            .script("exec", CommandOutput::ok("scripted"));

        let first = client.exec("c", &[]).await.unwrap();
        let second = client.exec("c", &[]).await.unwrap();

        assert_eq!(first.stdout, "scripted");
        assert!(second.stdout.contains("=====TIMELINES====="));
    }

    #[tokio::test]
    async fn test_unavailable_method() {
        let client = MockClient::new().unavailable("start");
        assert!(client.start("c").await.is_err());
        assert!(client.was_called("start"));
    }
}
