//! Static British Sign Language video metadata served to the frontend and the
//! assistant. Read-only lookup tables; there is no persistence behind these.

use serde::Serialize;

use crate::utils::errorhandler::AppError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Video {
    pub name: &'static str,
}

const fn video(name: &'static str) -> Video {
    Video { name }
}

pub const MENU_VIDEOS: &[Video] = &[
    video("Single Espresso"),
    video("Double Espresso"),
    video("Turkish Coffee"),
    video("Americano"),
    video("Decaf Coffee"),
    video("Filter Coffee"),
    video("Flat White"),
    video("Cappuccino"),
    video("Coffee Latte"),
    video("Macchiato"),
    video("Breakfast Tea"),
    video("Earl Grey"),
    video("Pepper Mint"),
    video("Hot Chocolate"),
    video("Chai Latte"),
    video("Normal Milk"),
    video("Skimmed Milk"),
    video("Oat Milk"),
    video("Soy Milk"),
    video("Almond Milk"),
    video("Coconut Milk"),
    video("White Sugar"),
    video("Brown Sugar"),
    video("Sweetener"),
    video("Chocolate Powder"),
    video("Still Water"),
    video("Sparkling Water"),
    video("Lemonade Lime"),
    video("Lemonade Blood Orange"),
    video("Lemonade Ginger"),
    video("Lemonade Passion Fruit"),
    video("Kombucha Citro Hops"),
    video("Kombucha Ginger&Hibiscus"),
    video("Croissant"),
    video("Almond Croissant"),
    video("Pain Au Chocolat"),
    video("Nutella Doughnut"),
    video("Apricot Danish"),
    video("Pain Aux Raisins"),
    video("Cinnamon Bun"),
    video("Chocolate&Custard Muffin"),
    video("Plain Nata"),
    video("Matcha&Raspberry Coconut Cookie"),
    video("Salted Caramel Brownie"),
];

pub const TRAINING_VIDEOS: &[Video] = &[
    video("Good morning"),
    video("How are you?"),
    video("Good evening"),
    video("Hello"),
    video("Hello-Please-Thank You"),
    video("Please"),
    video("Thank You"),
    video("Change my mind"),
    video("It's a lovely day"),
    video("See you later"),
    video("I'm fine"),
    video("I don't like it"),
    video("Do you like it?"),
    video("Goodbye"),
    video("Yes, I like it"),
];

/// Looks up a category's videos, optionally narrowed by a case-insensitive
/// keyword match on the name.
pub fn videos_by_category(
    category: &str,
    search: Option<&str>,
) -> Result<Vec<&'static Video>, AppError> {
    let videos = match category {
        "menu" => MENU_VIDEOS,
        "training" => TRAINING_VIDEOS,
        other => {
            return Err(AppError::invalid_request(format!(
                "invalid category: {other}"
            )));
        }
    };

    let filtered = match search {
        Some(keyword) => {
            let keyword = keyword.to_lowercase();
            videos
                .iter()
                .filter(|v| v.name.to_lowercase().contains(&keyword))
                .collect()
        }
        None => videos.iter().collect(),
    };
    Ok(filtered)
}
