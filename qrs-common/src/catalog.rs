//! Scan target and rule catalogs
//!
//! Pure list operations; reading and writing the catalog files is done by
//! [`crate::storage::JsonFileStore`].

use crate::models::{Product, Rule};
use crate::{Error, Result};

/// Name of the rule seeded on first start
pub const DEFAULT_RULE_NAME: &str = "Production line 18-digit barcode";

/// Pattern of the seeded rule: 7 digits, `W`, 10 digits
pub const DEFAULT_RULE_PATTERN: &str = r"^\d{7}W\d{10}$";

/// Rules written when no rule file exists yet
pub fn default_rules() -> Vec<Rule> {
    vec![Rule {
        rule_name: DEFAULT_RULE_NAME.to_string(),
        rule_value: DEFAULT_RULE_PATTERN.to_string(),
        is_default: true,
    }]
}

/// Derive a storage identifier from a display name
///
/// ASCII letters and digits are lowercased, runs of whitespace and
/// punctuation become a single `_`, any other character is kept as is.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() || (!ch.is_ascii() && ch.is_alphanumeric()) {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Build a product from a display name
pub fn new_product(name: &str, scan_rule: Option<String>) -> Result<Product> {
    let product_name = name.trim().to_string();
    let product_value = slugify(&product_name);
    if product_value.is_empty() {
        return Err(Error::InvalidInput(format!(
            "scan target name '{}' has no usable characters",
            name
        )));
    }
    Ok(Product {
        product_name,
        product_value,
        scan_rule,
    })
}

pub fn find_product<'a>(products: &'a [Product], id: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.product_value == id)
}

/// Append a product, rejecting duplicate names and identifiers
pub fn add_product(products: &mut Vec<Product>, product: Product) -> Result<()> {
    if products.iter().any(|p| p.product_name == product.product_name) {
        return Err(Error::InvalidInput(format!(
            "scan target '{}' already exists",
            product.product_name
        )));
    }
    if find_product(products, &product.product_value).is_some() {
        return Err(Error::InvalidInput(format!(
            "scan target id '{}' already exists",
            product.product_value
        )));
    }
    products.push(product);
    Ok(())
}

/// Rename a product in place
///
/// Returns `(old, new)`; the caller moves the storage folder from the old
/// identifier to the new one.
pub fn rename_product(
    products: &mut [Product],
    id: &str,
    new_name: &str,
) -> Result<(Product, Product)> {
    let new_name = new_name.trim();
    let existing = find_product(products, id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("scan target '{}'", id)))?;
    if existing.product_name == new_name {
        return Err(Error::InvalidInput(
            "new name must differ from the current name".to_string(),
        ));
    }
    if products.iter().any(|p| p.product_name == new_name) {
        return Err(Error::InvalidInput(format!(
            "scan target '{}' already exists",
            new_name
        )));
    }
    let renamed = new_product(new_name, existing.scan_rule.clone())?;
    if renamed.product_value != existing.product_value
        && find_product(products, &renamed.product_value).is_some()
    {
        return Err(Error::InvalidInput(format!(
            "scan target id '{}' already exists",
            renamed.product_value
        )));
    }
    for p in products.iter_mut() {
        if p.product_value == existing.product_value {
            *p = renamed.clone();
        }
    }
    Ok((existing, renamed))
}

/// Remove a product from the list; its recorded data stays on disk
pub fn remove_product(products: &mut Vec<Product>, id: &str) -> Result<Product> {
    let idx = products
        .iter()
        .position(|p| p.product_value == id)
        .ok_or_else(|| Error::NotFound(format!("scan target '{}'", id)))?;
    Ok(products.remove(idx))
}

/// Append a rule; a new default rule clears the flag on the others
pub fn add_rule(rules: &mut Vec<Rule>, rule: Rule) -> Result<()> {
    if rules.iter().any(|r| r.rule_name == rule.rule_name) {
        return Err(Error::InvalidInput(format!(
            "rule '{}' already exists",
            rule.rule_name
        )));
    }
    if rule.is_default {
        for r in rules.iter_mut() {
            r.is_default = false;
        }
    }
    rules.push(rule);
    Ok(())
}

pub fn remove_rule(rules: &mut Vec<Rule>, name: &str) -> Result<Rule> {
    let idx = rules
        .iter()
        .position(|r| r.rule_name == name)
        .ok_or_else(|| Error::NotFound(format!("rule '{}'", name)))?;
    Ok(rules.remove(idx))
}

pub fn default_rule(rules: &[Rule]) -> Option<&Rule> {
    rules.iter().find(|r| r.is_default)
}
