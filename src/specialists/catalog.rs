//! 内置创意目录（印度庆典）
//!
//! 模板推理与推理失败时的兜底共用此目录。

use crate::core::Idea;

fn idea(title: &str, details: &[&str]) -> Idea {
    Idea {
        title: title.to_string(),
        details: details.iter().map(|d| d.to_string()).collect(),
    }
}

pub fn themes() -> Vec<Idea> {
    vec![
        idea(
            "Marigold Mela",
            &[
                "Mood Palette: saffron, marigold and leaf green",
                "Headline Visuals: genda phool torans and brass diyas",
                "Decor Touches: block-print table runners, kulhad candles",
                "Why it fits: a festive bazaar feel that works indoors or on a terrace",
            ],
        ),
        idea(
            "Bollywood Retro Night",
            &[
                "Mood Palette: ruby, gold and black",
                "Headline Visuals: hand-painted film posters and a marquee photo wall",
                "Decor Touches: vinyl records, fairy lights, filmi props",
                "Why it fits: high-energy nostalgia every generation can join",
            ],
        ),
        idea(
            "Monsoon Chai Soiree",
            &[
                "Mood Palette: slate blue, jade and cream",
                "Headline Visuals: paper umbrellas and rain-chain lanterns",
                "Decor Touches: floor cushions, jute rugs, clay cups",
                "Why it fits: relaxed and intimate, ideal for smaller homes",
            ],
        ),
    ]
}

pub fn menus() -> Vec<Idea> {
    vec![
        idea(
            "Chaat Counter",
            &[
                "Signature Dish: pani puri and dahi bhalla live station",
                "Side or Snack: masala corn cups",
                "Drink Pairing: jaljeera and rose lassi",
                "Dietary Notes: vegetarian; swap dahi for coconut yoghurt to make it vegan",
                "Estimated cost: 350 INR per guest",
            ],
        ),
        idea(
            "Royal Thali",
            &[
                "Signature Dish: paneer makhani with jeera rice",
                "Side or Snack: onion-free kachori for Jain guests",
                "Drink Pairing: kesar thandai",
                "Dietary Notes: vegetarian; contains dairy and gluten",
                "Estimated cost: 600 INR per guest",
            ],
        ),
    ]
}

pub fn activities() -> Vec<Idea> {
    vec![
        idea(
            "Sangeet Showdown",
            &[
                "Runtime: 45 minutes",
                "Energy Level: high",
                "Required Props: speaker, playlist, dupattas for teams",
                "Tip: pair shy guests with confident dancers",
            ],
        ),
        idea(
            "Mehendi & Chai Corner",
            &[
                "Runtime: rolling, 2 hours",
                "Energy Level: quiet",
                "Required Props: henna cones, cushions, chai urn",
                "Tip: book one artist per 15 guests",
            ],
        ),
        idea(
            "DIY Rangoli Relay",
            &[
                "Runtime: 30 minutes",
                "Energy Level: medium",
                "Required Props: coloured powder, stencils, chalk outlines",
                "Tip: photograph every team's design for take-home prints",
            ],
        ),
    ]
}

pub fn savings_tips() -> Vec<String> {
    vec![
        "Buy marigolds from the wholesale flower market the morning of the event".to_string(),
        "Borrow brass and steel serveware from family instead of renting".to_string(),
        "Run the playlist yourself and spend the DJ budget on food".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_multiple_options() {
        assert!(themes().len() >= 2);
        assert_eq!(menus().len(), 2);
        assert!(activities().iter().any(|a| a.details.iter().any(|d| d.contains("quiet"))));
        assert!(activities().iter().any(|a| a.details.iter().any(|d| d.contains("high"))));
        assert!(menus().iter().all(|m| m.details.iter().any(|d| d.starts_with("Dietary Notes"))));
    }
}
