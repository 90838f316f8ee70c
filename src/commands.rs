use crate::backend::{self, BackendKind};
use crate::config::{get_config_path, save_config_to, Config};
use crate::context;
use crate::executor::ShellRunner;
use crate::gate::ExecutionGate;
use crate::presenter::process_response;
use crate::ui::{GumPrompter, Prompter};
use anyhow::{bail, Context};
use std::{io::Write, path::Path};

pub fn cmd_query(prompt: &str, config: &Config) -> anyhow::Result<()> {
    let kind = config.backend_kind()?;
    let backend = backend::connect(kind)
        .with_context(|| format!("cannot use backend '{}'", kind))?;

    let ctx = context::gather();
    tracing::debug!(
        backend = backend.name(),
        history = ctx.history.len(),
        "sending query"
    );

    eprint!("thinking...");
    std::io::stderr().flush().ok();
    let reply = backend.query(prompt, &ctx.history, &ctx.system_info);
    eprint!("\r           \r");
    std::io::stderr().flush().ok();
    let reply = reply.with_context(|| format!("error querying {}", kind))?;

    let prompter = GumPrompter::stdio().context("cannot read from stdin")?;
    let runner = ShellRunner::default();
    let gate = ExecutionGate::new(backend.as_ref(), &prompter, &runner);

    let outcome = process_response(&reply, &gate, &prompter, &ctx)
        .with_context(|| format!("error querying {}", kind))?;
    if let Some(outcome) = outcome {
        tracing::debug!(succeeded = outcome.succeeded(), "round finished");
    }
    Ok(())
}

pub fn cmd_set_backend(name: Option<&str>) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => {
            let names: Vec<&str> = BackendKind::ALL.iter().map(|k| k.as_str()).collect();
            GumPrompter::stdio()
                .context("cannot read from stdin")?
                .prompt_text(&format!("backend ({})", names.join(", ")), false)
        }
    };
    let path = get_config_path()?;
    set_backend_at(&name, &path)
}

/// Validates `name` and only then writes it to the config file at `path`.
fn set_backend_at(name: &str, path: &Path) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bail!("no backend given");
    }

    let kind: BackendKind = name.parse()?;
    save_config_to(&Config::for_backend(kind), path).context("cannot save config")?;
    println!("backend set to {}", kind);
    println!("  config: {}", path.display());

    if let Some(var) = kind.api_key_var() {
        if std::env::var_os(var).is_none() {
            println!("  note: {} is not set", var);
        }
    }
    Ok(())
}
