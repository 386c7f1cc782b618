//! Catalog maintenance: init, products, rules

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use qrs_common::catalog::{
    add_product, add_rule, default_rule, new_product, remove_product, remove_rule,
    rename_product,
};
use qrs_common::config::{default_config_path, write_toml_config};
use qrs_common::rules::CodeRule;
use qrs_common::storage::ScanRepository;
use qrs_common::{Error, Rule};
use tracing::info;

use crate::cli::{ProductsCommand, RulesCommand};
use crate::report;
use crate::Station;

/// Seed the catalog files and write a configuration file if none exists
pub async fn init(station: &Station, config_path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let created = station
        .store
        .seed_defaults()
        .await
        .context("Failed to seed catalog files")?;
    for path in &created {
        writeln!(out, "Created {}", path.display())?;
    }

    if let Some(path) = config_path.map(Path::to_path_buf).or_else(default_config_path) {
        if path.exists() {
            writeln!(out, "Config file {} already exists", path.display())?;
        } else {
            let mut config = station.config.clone();
            config.root_folder = Some(station.store.root().to_path_buf());
            write_toml_config(&config, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Created {}", path.display())?;
        }
    }

    writeln!(out, "Data root: {}", station.store.root().display())?;
    Ok(())
}

pub async fn products(station: &Station, command: ProductsCommand, out: &mut impl Write) -> Result<()> {
    let store = &station.store;
    let mut products = store.read_products().await?;

    match command {
        ProductsCommand::List => {
            report::write_products(out, &products)?;
            return Ok(());
        }
        ProductsCommand::Add { name, rule } => {
            let rules = store.read_rules().await?;
            let pattern = match rule {
                Some(rule_name) => Some(
                    rules
                        .iter()
                        .find(|r| r.rule_name == rule_name)
                        .map(|r| r.rule_value.clone())
                        .ok_or_else(|| Error::NotFound(format!("rule '{}'", rule_name)))?,
                ),
                None => default_rule(&rules).map(|r| r.rule_value.clone()),
            };
            let product = new_product(&name, pattern)?;
            let label = format!("{} ({})", product.product_name, product.product_value);
            add_product(&mut products, product)?;
            writeln!(out, "Added {}", label)?;
        }
        ProductsCommand::Rename { id, new_name } => {
            let (old, new) = rename_product(&mut products, &id, &new_name)?;
            if old.product_value != new.product_value && store.target_dir(&old.product_value).exists() {
                let outcome = store
                    .rename_target_folder(&old.product_value, &new.product_value)
                    .await;
                if !outcome.success {
                    bail!("Failed to move recorded data: {}", outcome.message);
                }
            }
            writeln!(
                out,
                "Renamed {} -> {} ({})",
                old.product_name, new.product_name, new.product_value
            )?;
        }
        ProductsCommand::Remove { id } => {
            let removed = remove_product(&mut products, &id)?;
            writeln!(
                out,
                "Removed {}; recorded data kept in {}",
                removed.product_name,
                store.target_dir(&removed.product_value).display()
            )?;
        }
    }

    store
        .write_products(&products)
        .await
        .context("Failed to save scan targets")?;
    info!("Saved {} scan targets", products.len());
    Ok(())
}

pub async fn rules(station: &Station, command: RulesCommand, out: &mut impl Write) -> Result<()> {
    let store = &station.store;
    let mut rules = store.read_rules().await?;

    match command {
        RulesCommand::List => {
            report::write_rules(out, &rules)?;
            return Ok(());
        }
        RulesCommand::Add {
            name,
            pattern,
            default,
        } => {
            let rule = Rule {
                rule_name: name,
                rule_value: pattern,
                is_default: default,
            };
            let compiled = CodeRule::from_rule(&rule)?;
            add_rule(&mut rules, rule)?;
            writeln!(out, "Added rule {}", compiled.name())?;
        }
        RulesCommand::Remove { name } => {
            let removed = remove_rule(&mut rules, &name)?;
            writeln!(out, "Removed rule {}", removed.rule_name)?;
        }
    }

    store
        .write_rules(&rules)
        .await
        .context("Failed to save rules")?;
    info!("Saved {} rules", rules.len());
    Ok(())
}
