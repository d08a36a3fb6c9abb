//! Render command implementation.
//!
//! Loads a desired-state document of decoded cluster objects, routes them
//! through the OpenShift adapters into a fresh synchronizer and waits for
//! the writer to put the result on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use k8s_openapi::api::core::v1::ConfigMap;
use serde::Deserialize;
use tracing::info;

use sysconfig_openshift::{certificates, icsp, image, Image, ImageContentSourcePolicy};
use sysconfig_syncer::{ConfigSyncer, PassOutcome, SyncerConfig};

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Desired-state YAML file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output path of registries.conf
    #[arg(long, env = "SYSCONFIG_REGISTRIES_CONF")]
    pub registries_conf: Option<PathBuf>,

    /// Output path of policy.json
    #[arg(long, env = "SYSCONFIG_POLICY_JSON")]
    pub policy_json: Option<PathBuf>,

    /// Certificate trust directory (removed and rebuilt)
    #[arg(long, env = "SYSCONFIG_CERTS_DIR")]
    pub certs_dir: Option<PathBuf>,
}

impl RenderArgs {
    fn syncer_config(&self) -> SyncerConfig {
        let mut config = SyncerConfig::default();
        if let Some(path) = &self.registries_conf {
            config = config.with_registries_conf(path);
        }
        if let Some(path) = &self.policy_json {
            config = config.with_policy_json(path);
        }
        if let Some(path) = &self.certs_dir {
            config = config.with_certs_dir(path);
        }
        config
    }
}

/// Cluster objects to render, as they would be decoded from a watch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    /// The `config.openshift.io/v1` `Image` object.
    #[serde(default)]
    pub image: Option<Image>,

    /// `ImageContentSourcePolicy` objects.
    #[serde(default)]
    pub image_content_source_policies: Vec<ImageContentSourcePolicy>,

    /// The registry certificates config map.
    #[serde(default)]
    pub registry_certificates: Option<ConfigMap>,
}

impl DesiredState {
    /// Loads a desired-state document from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse desired state in {}", path.display()))
    }
}

/// Runs the render command.
pub async fn run(args: &RenderArgs) -> Result<()> {
    let state = DesiredState::load(&args.input)?;
    let config = args.syncer_config();
    info!(input = ?args.input, "Rendering system configuration");

    println!("Sysconfig Renderer");
    println!("==================");
    println!("Input: {}", args.input.display());
    println!();

    let syncer = ConfigSyncer::start(config);
    let posted = apply(&syncer, &state).await?;
    if posted == 0 {
        anyhow::bail!("{} contains no registry configuration", args.input.display());
    }

    let report = syncer.wait_for_pass(posted).await?;
    match report.outcome {
        PassOutcome::Completed(summary) => {
            println!("✓ {}", syncer.config().registries_conf.display());
            println!("✓ {}", syncer.config().policy_json.display());
            println!("✓ {}", syncer.config().certs_dir.display());
            println!();
            println!(
                "{} registries, {} rejected, {} certificates",
                summary.registries, summary.rejected, summary.certificates
            );
            Ok(())
        }
        PassOutcome::Failed { stage, error } => {
            anyhow::bail!("Rendering failed at {stage} stage: {error}")
        }
    }
}

/// Feeds every object to its adapter. Returns the number of accepted
/// mutations.
async fn apply(syncer: &ConfigSyncer, state: &DesiredState) -> Result<u64> {
    let mut posted = 0u64;

    for policy in &state.image_content_source_policies {
        posted += u64::try_from(icsp::on_add(syncer, policy).await)?;
    }

    if let Some(cluster_image) = &state.image {
        if image::on_apply(syncer, cluster_image)
            .await
            .context("Failed to apply image registry sources")?
        {
            posted += 1;
        }
    }

    if let Some(config_map) = &state.registry_certificates {
        if certificates::on_apply(syncer, config_map)
            .await
            .context("Failed to apply registry certificates")?
        {
            posted += 1;
        }
    }

    Ok(posted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STATE: &str = r"
image:
  apiVersion: config.openshift.io/v1
  kind: Image
  metadata:
    name: cluster
  spec:
    registrySources:
      blockedRegistries:
      - untrusted.io
      insecureRegistries:
      - registry.local:5000
imageContentSourcePolicies:
- apiVersion: operator.openshift.io/v1alpha1
  kind: ImageContentSourcePolicy
  metadata:
    name: release
  spec:
    repositoryDigestMirrors:
    - source: quay.io/openshift-release-dev/ocp-release
      mirrors:
      - mirror.local/ocp/release
registryCertificates:
  apiVersion: v1
  kind: ConfigMap
  metadata:
    name: image-registry-certificates
    namespace: openshift-image-registry
  data:
    registry.local..5000: |
      -----BEGIN CERTIFICATE-----
      MIIB
      -----END CERTIFICATE-----
";

    fn args(temp: &TempDir, input: PathBuf) -> RenderArgs {
        let config = SyncerConfig::under(temp.path());
        RenderArgs {
            input,
            registries_conf: Some(config.registries_conf),
            policy_json: Some(config.policy_json),
            certs_dir: Some(config.certs_dir),
        }
    }

    #[test]
    fn test_load_desired_state() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("state.yaml");
        std::fs::write(&input, STATE).unwrap();

        let state = DesiredState::load(&input).unwrap();

        assert!(state.image.is_some());
        assert_eq!(state.image_content_source_policies.len(), 1);
        assert!(state.registry_certificates.is_some());
    }

    #[tokio::test]
    async fn test_render_writes_all_artifacts() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("state.yaml");
        std::fs::write(&input, STATE).unwrap();
        let args = args(&temp, input);

        run(&args).await.unwrap();

        let registries = std::fs::read_to_string(args.registries_conf.unwrap()).unwrap();
        assert!(registries.contains("mirror.local/ocp/release"));
        assert!(registries.contains("untrusted.io"));

        let policy = std::fs::read_to_string(args.policy_json.unwrap()).unwrap();
        assert!(policy.contains("reject"));

        let cert = args
            .certs_dir
            .unwrap()
            .join("registry.local:5000")
            .join("ca.crt");
        assert!(std::fs::read_to_string(cert)
            .unwrap()
            .starts_with("-----BEGIN CERTIFICATE-----"));
    }

    #[tokio::test]
    async fn test_render_empty_state_fails() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("state.yaml");
        std::fs::write(&input, "imageContentSourcePolicies: []\n").unwrap();

        let result = run(&args(&temp, input)).await;

        assert!(result.is_err());
    }
}
