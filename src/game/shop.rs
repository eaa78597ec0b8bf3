//! Credit economy: buying template items and selling owned ones.
//!
//! The shop stocks every item template with a non-zero value in unlimited
//! quantity. Sale price is half the item's value, rounded down.

use super::errors::ActionError;
use super::inventory::{add_item, remove_item};
use super::types::{Character, Item};
use log::info;

/// Price paid to the player for `item`.
pub fn sell_price(item: &Item) -> u32 {
    item.value / 2
}

fn find<'a>(catalog: &'a [Item], name: &str) -> Result<&'a Item, ActionError> {
    catalog
        .iter()
        .find(|item| item.value > 0 && item.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ActionError::UnknownItem(name.to_string()))
}

/// Stock lines: "Name - N cr".
pub fn list_stock(catalog: &[Item]) -> Vec<String> {
    let lines: Vec<String> = catalog
        .iter()
        .filter(|item| item.value > 0)
        .map(|item| format!("{} - {} cr", item.name, item.value))
        .collect();
    if lines.is_empty() {
        vec!["Nothing for sale".to_string()]
    } else {
        lines
    }
}

/// Buy one copy of `name`. Returns the price paid.
pub fn buy(character: &mut Character, catalog: &[Item], name: &str) -> Result<u32, ActionError> {
    let item = find(catalog, name)?;
    if character.credits < item.value {
        return Err(ActionError::InsufficientResource {
            resource: "credits",
            needed: item.value,
            available: character.credits,
        });
    }
    character.credits -= item.value;
    info!("{} buys {} for {}", character.name, item.name, item.value);
    let price = item.value;
    add_item(character, item.clone());
    Ok(price)
}

/// Sell one owned copy of `name`. Returns the credits received.
pub fn sell(character: &mut Character, name: &str) -> Result<u32, ActionError> {
    let item = remove_item(character, name)?;
    let price = sell_price(&item);
    character.credits = character.credits.saturating_add(price);
    info!("{} sells {} for {}", character.name, item.name, price);
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::ItemType;

    fn catalog() -> Vec<Item> {
        vec![
            Item::new("Stim", ItemType::Consumable).with_value(25),
            Item::new("Data Shard", ItemType::Quest),
        ]
    }

    #[test]
    fn buy_deducts_credits_and_adds_item() {
        let mut c = Character::new("Ash").with_credits(30);
        assert_eq!(buy(&mut c, &catalog(), "stim"), Ok(25));
        assert_eq!(c.credits, 5);
        assert!(c.has_item("Stim"));
        assert_eq!(
            buy(&mut c, &catalog(), "Stim"),
            Err(ActionError::InsufficientResource {
                resource: "credits",
                needed: 25,
                available: 5
            })
        );
        assert_eq!(c.item_count("Stim"), 1);
    }

    #[test]
    fn worthless_items_are_not_stocked() {
        let mut c = Character::new("Ash").with_credits(100);
        assert_eq!(
            buy(&mut c, &catalog(), "Data Shard"),
            Err(ActionError::UnknownItem("Data Shard".into()))
        );
        assert_eq!(list_stock(&catalog()), vec!["Stim - 25 cr".to_string()]);
    }

    #[test]
    fn sell_pays_half_value() {
        let mut c = Character::new("Ash");
        c.inventory.push(Item::new("Stim", ItemType::Consumable).with_value(25));
        assert_eq!(sell(&mut c, "Stim"), Ok(12));
        assert_eq!(c.credits, 12);
        assert_eq!(sell(&mut c, "Stim"), Err(ActionError::NotOwned("Stim".into())));
    }
}
