use crate::cluster::KubeCluster;
use crate::local::LocalCluster;
use crate::output::{print_json, print_table, print_yaml_documents};
use anyhow::Context;
use kamel_core::action::Collaborators;
use kamel_core::collection::Resource;
use kamel_core::config::Config;
use kamel_core::handler::{Event, Handler};
use kamel_core::manifest;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Serialize)]
struct Outcome {
    file: PathBuf,
    kind: String,
    name: Option<String>,
    phase: Option<&'static str>,
    resources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    ignored: bool,
}

impl Outcome {
    fn result(&self) -> &str {
        match (&self.error, self.ignored) {
            (Some(e), _) => e,
            (None, true) => "ignored",
            (None, false) => "ok",
        }
    }
}

pub fn run(
    config_path: &Path,
    files: &[PathBuf],
    apply: bool,
    emit: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let local = LocalCluster::new(&config.registry);
    let collaborators = if apply {
        let kube = KubeCluster::connect(local.clone())?;
        Collaborators::new(local.clone(), kube.clone(), kube)
    } else {
        local.collaborators()
    };
    let handler = Handler::new(collaborators, Arc::new(config));

    let mut outcomes = Vec::new();
    let mut staged: Vec<Resource> = Vec::new();

    for file in files {
        let mut event = manifest::load_event(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let ignored = matches!(event, Event::Unrecognized { .. });

        let result = handler.handle(&mut event);
        manifest::save_event(file, &event)
            .with_context(|| format!("failed to write status to {}", file.display()))?;

        let resources = local.take_staged();
        if let Err(e) = &result {
            tracing::warn!(file = %file.display(), error = %e, "reconcile failed");
        }
        outcomes.push(Outcome {
            file: file.clone(),
            kind: event.kind().to_string(),
            name: event.name().map(str::to_string),
            phase: event.phase(),
            resources: resources.len(),
            error: result.err().map(|e| e.to_string()),
            ignored,
        });
        staged.extend(resources);
    }

    if emit {
        print_yaml_documents(&staged)?;
    } else if json {
        print_json(&outcomes)?;
    } else {
        let rows = outcomes
            .iter()
            .map(|o| {
                vec![
                    o.file.display().to_string(),
                    o.kind.clone(),
                    o.name.clone().unwrap_or_else(|| "-".to_string()),
                    o.phase.unwrap_or("-").to_string(),
                    o.resources.to_string(),
                    o.result().to_string(),
                ]
            })
            .collect();
        print_table(
            &["FILE", "KIND", "NAME", "PHASE", "RESOURCES", "RESULT"],
            rows,
        );
    }

    let failed: Vec<&Outcome> = outcomes.iter().filter(|o| o.error.is_some()).collect();
    if emit {
        for o in &failed {
            eprintln!("{}: {}", o.file.display(), o.result());
        }
    }

    if apply && !emit && !json {
        println!("Applied {} resource(s).", staged.len());
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} manifest(s) failed to reconcile",
            failed.len(),
            outcomes.len()
        );
    }
    Ok(())
}
