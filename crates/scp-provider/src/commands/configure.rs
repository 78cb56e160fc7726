use anyhow::{Context, bail};
use colored::Colorize;
use scp_cloud::{Attribute, mask_secret, section_name};
use scp_profile::{CONFIGURATIONS, CREDENTIALS, Profile, ProfileContext, ProfileError};

fn parse_key(key: &str) -> anyhow::Result<Attribute> {
    match Attribute::parse(key) {
        Some(attr) => Ok(attr),
        None => {
            let known: Vec<&str> = Attribute::ALL.iter().map(|a| a.file_key()).collect();
            bail!("Unknown key '{}' (expected one of: {})", key, known.join(", "))
        }
    }
}

/// Secrets and the auth method live in the credentials file
fn target_file(attr: Attribute, force_credentials: bool) -> &'static str {
    if force_credentials || attr.is_secret() || attr == Attribute::AuthMethod {
        CREDENTIALS
    } else {
        CONFIGURATIONS
    }
}

/// Existing profile file, or an empty one if it was never written
fn load_or_new(ctx: &ProfileContext, logical_name: &str) -> anyhow::Result<Profile> {
    match ctx.load_profile(logical_name) {
        Ok(profile) => Ok(profile),
        Err(ProfileError::FileError { .. }) => Ok(Profile::new(logical_name)),
        Err(e) => Err(e).with_context(|| format!("Failed to read the {} file", logical_name)),
    }
}

pub fn set(
    ctx: &ProfileContext,
    profile: &str,
    key: &str,
    value: &str,
    force_credentials: bool,
) -> anyhow::Result<()> {
    let attr = parse_key(key)?;
    let file = target_file(attr, force_credentials);

    let mut stored = load_or_new(ctx, file)?;
    stored.set(&section_name(profile), attr.file_key(), value)?;
    ctx.save_profile(file, &stored)?;

    let shown = if attr.is_secret() {
        mask_secret(value)
    } else {
        value.to_string()
    };
    println!(
        "{} {} = {} ({} {})",
        "✓".green(),
        attr.file_key().cyan(),
        shown,
        file,
        section_name(profile).dimmed()
    );
    Ok(())
}

pub fn unset(ctx: &ProfileContext, profile: &str, key: &str) -> anyhow::Result<()> {
    let attr = parse_key(key)?;

    for file in [CREDENTIALS, CONFIGURATIONS] {
        let mut stored = load_or_new(ctx, file)?;
        if stored.get(&section_name(profile), attr.file_key()).is_none() {
            continue;
        }
        stored.unset(&section_name(profile), attr.file_key());
        ctx.save_profile(file, &stored)?;
        println!("{} removed {} from {}", "✓".green(), attr.file_key().cyan(), file);
    }
    Ok(())
}

pub fn show(ctx: &ProfileContext, profile: &str) {
    let profiles = ctx.load_profiles();
    println!(
        "Profile {} in {}",
        section_name(profile).cyan(),
        ctx.config_dir().display()
    );

    for file in [CREDENTIALS, CONFIGURATIONS] {
        println!();
        println!("{}", file.bold());
        let entries = profiles
            .get(file)
            .and_then(|p| p.section(&section_name(profile)))
            .map(|props| props.entries())
            .unwrap_or_default();
        if entries.is_empty() {
            println!("  {}", "(empty)".dimmed());
            continue;
        }
        for (key, value) in entries {
            println!("  {} = {}", key.cyan(), display_value(key, value));
        }
    }
}

fn display_value(key: &str, value: &str) -> String {
    match Attribute::parse(key) {
        Some(attr) if attr.is_secret() => mask_secret(value),
        _ => value.to_string(),
    }
}
