//! Recipe-based crafting.
//!
//! Crafting is all-or-nothing: every check runs before any ingredient is
//! consumed or energy spent.

use super::errors::ActionError;
use super::inventory::{add_item, remove_item};
use super::types::{Character, Item, Recipe};
use log::info;
use std::collections::BTreeMap;

/// Ingredient totals keyed by lowercased name, so differently-cased entries
/// for one item are checked together.
fn ingredient_totals(recipe: &Recipe) -> BTreeMap<String, (&str, usize)> {
    let mut totals: BTreeMap<String, (&str, usize)> = BTreeMap::new();
    for (ingredient, count) in &recipe.ingredients {
        let entry = totals
            .entry(ingredient.to_ascii_lowercase())
            .or_insert((ingredient.as_str(), 0));
        entry.1 = entry.1.saturating_add(*count as usize);
    }
    totals
}

fn find<'a>(recipes: &'a [Recipe], name: &str) -> Result<&'a Recipe, ActionError> {
    recipes
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ActionError::UnknownRecipe(name.to_string()))
}

pub fn list_recipes(recipes: &[Recipe]) -> Vec<String> {
    if recipes.is_empty() {
        return vec!["No known recipes".to_string()];
    }
    recipes
        .iter()
        .map(|r| {
            let parts: Vec<String> = r
                .ingredients
                .iter()
                .map(|(item, count)| format!("{}x {}", count, item))
                .collect();
            format!("{}: {} ({} energy)", r.name, parts.join(" + "), r.energy_cost)
        })
        .collect()
}

/// Consume the recipe's ingredients and energy and add the output item.
///
/// `catalog` resolves the output name to its item template. Returns the crafted
/// item's name.
pub fn craft(
    character: &mut Character,
    recipes: &[Recipe],
    catalog: &[Item],
    name: &str,
) -> Result<String, ActionError> {
    let recipe = find(recipes, name)?;
    let output = catalog
        .iter()
        .find(|item| item.name.eq_ignore_ascii_case(&recipe.output))
        .ok_or_else(|| ActionError::UnknownItem(recipe.output.clone()))?;

    let totals = ingredient_totals(recipe);
    for (ingredient, count) in totals.values() {
        if character.item_count(ingredient) < *count {
            return Err(ActionError::NotOwned(ingredient.to_string()));
        }
    }
    if character.energy < recipe.energy_cost {
        return Err(ActionError::InsufficientResource {
            resource: "energy",
            needed: recipe.energy_cost.max(0) as u32,
            available: character.energy.max(0) as u32,
        });
    }

    for (ingredient, count) in totals.values() {
        for _ in 0..*count {
            remove_item(character, ingredient)?;
        }
    }
    character.adjust_energy(-recipe.energy_cost);
    info!("{} crafts {}", character.name, output.name);
    add_item(character, output.clone());
    Ok(output.name.clone())
}
