use anyhow::bail;
use serde_json::Value;

pub fn handle(resource: Option<&str>) -> anyhow::Result<()> {
    let provider = scp_provider::provider()?;
    let document = provider.schema_document();

    let output = match resource {
        None => document,
        Some(name) => match lookup(&document, name) {
            Some(schema) => schema.clone(),
            None => bail!("Unknown resource or data source type '{}'", name),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn lookup<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    ["resource_schemas", "data_source_schemas"]
        .into_iter()
        .find_map(|table| document[table].get(name))
}
