//! Registry test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tagwatch::app::App;
use tagwatch::config::{EndpointsConfig, RetryConfig, TagwatchConfig};
use tagwatch::version::command::{CommandOutput, CommandRunner, display_command};
use tagwatch::version::error::ResolveError;

/// Config pointing every endpoint at `base_url` with millisecond backoff
pub fn test_config(base_url: &str) -> TagwatchConfig {
    TagwatchConfig {
        retry: RetryConfig {
            max_retries: 2,
            backoff_ms: vec![1, 2],
            request_timeout_ms: 5_000,
        },
        endpoints: EndpointsConfig {
            pypi: base_url.to_string(),
            go_proxy: base_url.to_string(),
            github: base_url.to_string(),
            gitlab: base_url.to_string(),
            docker_hub: base_url.to_string(),
        },
        ..Default::default()
    }
}

/// App against a mock server, with scripted subprocesses
pub fn create_test_app(base_url: &str, runner: FakeRunner) -> App {
    App::with_runner(test_config(base_url), Arc::new(runner)).unwrap()
}

/// Command runner answering from a table keyed by the full command line
#[derive(Default)]
pub struct FakeRunner {
    outputs: HashMap<String, CommandOutput>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command: &str, code: i32, stdout: &str) -> Self {
        self.outputs.insert(
            command.to_string(),
            CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    /// Handle to the commands run so far
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ResolveError> {
        let command = display_command(program, args);
        self.calls.lock().unwrap().push(command.clone());
        match self.outputs.get(&command) {
            Some(output) => Ok(output.clone()),
            None => Err(ResolveError::Subprocess {
                command,
                status: "not scripted".to_string(),
                stderr: String::new(),
            }),
        }
    }
}

/// Docker Hub tag page body with no further pages
pub fn tag_page(tags: &[&str]) -> String {
    let results: Vec<String> = tags
        .iter()
        .map(|tag| format!(r#"{{"name": "{tag}"}}"#))
        .collect();
    format!(r#"{{"next": null, "results": [{}]}}"#, results.join(", "))
}
