use anyhow::Context;
use scp_cloud::ProviderBlock;
use scp_profile::ProfileContext;

pub fn handle(ctx: &ProfileContext, profile: Option<String>) -> anyhow::Result<()> {
    let block = ProviderBlock {
        profile,
        ..Default::default()
    };
    let config = scp_provider::resolve_with(&block, ctx)
        .context("Failed to resolve the provider configuration")?;

    println!("{}", serde_json::to_string_pretty(&config.to_masked_json())?);
    Ok(())
}
