use anyhow::{bail, Context, Result};
use clap::Parser;
use datasource_model::classify;
use datasource_model::config::{Args, Config, Query};
use datasource_model::{DataProvider, DataSourceModel, MetadataSource};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args(Args::parse());
    info!("Loading metadata from {}", config.metadata.display());

    let source = MetadataSource::load(&config.metadata)?;
    let mut provider = DataProvider::new();
    provider.init(source, config.url.clone());
    if let Some(url) = provider.url() {
        info!("Metadata URL: {}", url);
    }

    let model = match provider.model_representation() {
        Ok(Some(model)) => model,
        Ok(None) => bail!("data provider is not initialized"),
        Err(e) => {
            error!("Failed to build model: {}", e);
            return Err(e.into());
        }
    };

    match &config.query {
        Some(Query::Classify {
            predicate,
            entity,
            member,
        }) => {
            let answer = answer_query(&model, predicate, entity, member.as_deref())?;
            println!("{}", answer);
        }
        None => write_model(&config, &model)?,
    }

    Ok(())
}

fn write_model(config: &Config, model: &DataSourceModel) -> Result<()> {
    let json = if config.pretty {
        serde_json::to_string_pretty(model)?
    } else {
        serde_json::to_string(model)?
    };

    match &config.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} entities to {}", model.entities.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn answer_query(
    model: &DataSourceModel,
    predicate: &str,
    entity: &str,
    member: Option<&str>,
) -> Result<bool> {
    if predicate == "root-entity" {
        return Ok(classify::is_root_entity(entity, &model.entities));
    }

    let Some(member) = member else {
        bail!("predicate '{}' needs a property or navigation name", predicate);
    };
    let Some(target) = model
        .entities
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(entity))
    else {
        return Ok(false);
    };

    let properties = &target.elements;
    let navigations = &target.navigations;
    Ok(match predicate {
        "key" => classify::is_key_property(member, properties),
        "string" => classify::is_string_property(member, properties),
        "date" => classify::is_date_property(member, properties),
        "numeric" => classify::is_numeric_property(member, properties),
        "boolean" => classify::is_boolean_property(member, properties),
        "binary" => classify::is_binary_property(member, properties),
        "guid" => classify::is_guid_property(member, properties),
        "to-one" => classify::is_navigations_to_one(member, navigations),
        "to-many" => classify::is_navigations_to_many(member, navigations),
        other => bail!("unknown predicate '{}'", other),
    })
}
