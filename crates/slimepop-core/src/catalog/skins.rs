//! Skin registry: 50 slime skins.
//!
//! Tiers: `skin_001` is the free starter, `skin_002..=skin_012` are gameplay
//! unlocks bought with coins, everything from `skin_013` up is a premium
//! platform purchase. Glow is reserved for neon-style skins.

use super::types::{skin_id, Rgb, SkinDef};

/// (name, base colour, highlight colour, glowing, coin price, premium)
type SkinRow = (&'static str, u32, u32, bool, u32, bool);

const SKIN_ROWS: [SkinRow; 50] = [
    ("Velvet Mint", 0x70DB93, 0xB4EEB4, false, 0, false),
    ("Rose Quartz", 0xF7CAC9, 0xFFD1DC, false, 300, false),
    ("Midnight Ink", 0x000033, 0x191970, false, 500, false),
    ("Honey Amber", 0xFFBF00, 0xFFD700, false, 800, false),
    ("Ocean Glass", 0x48D1CC, 0xE0FFFF, false, 1200, false),
    ("Lilac Haze", 0x8E4585, 0xD8BFD8, false, 1600, false),
    ("Neon Coral", 0xFF4040, 0xFF7F50, true, 2000, false),
    ("Arctic Pearl", 0xDEE4E7, 0xF0F8FF, false, 2500, false),
    ("Cocoa Silk", 0x3E2723, 0xA1887F, false, 3000, false),
    ("Sunset Sherbet", 0xFF4E50, 0xF9D423, false, 3500, false),
    ("Aurora Bloom", 0x00D2FF, 0x92FE9D, true, 5000, false),
    ("Sapphire Mist", 0x0066B2, 0x87CEFA, false, 8000, false),
    ("Matcha Foam", 0x96A265, 0xC1CDC1, false, 0, true),
    ("Cherry Blossom", 0xFFB7C5, 0xFFF0F5, false, 0, true),
    ("Copper Glow", 0xB87333, 0xDAA520, false, 0, true),
    ("Blue Lagoon", 0x007BA7, 0xAFEEEE, false, 0, true),
    ("Grape Jelly", 0x6F2DA8, 0xE6E6FA, false, 0, true),
    ("Mango Cream", 0xFF8243, 0xFFE5B4, false, 0, true),
    ("Silver Lining", 0xC0C0C0, 0xE8E8E8, false, 0, true),
    ("Opal Dream", 0xA8E6CF, 0xFFD3B6, false, 0, true),
    ("Frosted Plum", 0x8E4585, 0xDDA0DD, false, 0, true),
    ("Citrus Zest", 0xFFA500, 0xFFFF00, false, 0, true),
    ("Rainy Day", 0x708090, 0xB0C4DE, false, 0, true),
    ("Lavender Milk", 0x967BB6, 0xE6E6FA, false, 0, true),
    ("Sea Salt", 0xF5F5DC, 0xF0FFF0, false, 0, true),
    ("Pistachio", 0x93C572, 0xE9FFDB, false, 0, true),
    ("Strawberry Milk", 0xFC8EAC, 0xFFF0F5, false, 0, true),
    ("Cosmic Violet", 0x240046, 0xBFD7ED, true, 0, true),
    ("Lemon Fizz", 0xFFF44F, 0xFFFFF0, false, 0, true),
    ("Rosewood", 0x65000B, 0xCD5C5C, false, 0, true),
    ("Tidepool", 0x2F4F4F, 0x20B2AA, false, 0, true),
    ("Sky Candy", 0x87CEEB, 0xFFB6C1, false, 0, true),
    ("Mocha Cloud", 0x4B3621, 0xD2B48C, false, 0, true),
    ("Watermelon Pop", 0xE34234, 0x90EE90, false, 0, true),
    ("Dragonfruit", 0xC71585, 0xFF69B4, true, 0, true),
    ("Peach Sorbet", 0xFFDAB9, 0xFFE4E1, false, 0, true),
    ("Galaxy Teal", 0x008080, 0xE6E6FA, true, 0, true),
    ("Berry Jam", 0x7A0823, 0xFF4D00, false, 0, true),
    ("Pearl Pink", 0xFAD6A5, 0xFFFDD0, false, 0, true),
    ("Canyon Clay", 0xA0522D, 0xDEB887, false, 0, true),
    ("Glacier Blue", 0x00FFFF, 0xF0FFFF, true, 0, true),
    ("Jade Satin", 0x00A86B, 0x98FF98, false, 0, true),
    ("Sunrise Gold", 0xFFD700, 0xFFFACD, false, 0, true),
    ("Ink Wash", 0x36454F, 0xDCDCDC, false, 0, true),
    ("Coconut Cream", 0xFFFDD0, 0xFFFFFF, false, 0, true),
    ("Sakura Glow", 0xFF69B4, 0xFFF0F5, true, 0, true),
    ("Stormy Slate", 0x4A4E69, 0x9A8C98, false, 0, true),
    ("Mint Chip", 0x3EB489, 0xE0FFF0, false, 0, true),
    ("Plum Velvet", 0x673147, 0xDDA0DD, false, 0, true),
    ("Electric Lime", 0xCCFF00, 0x7FFF00, true, 0, true),
];

pub(crate) fn standard_skins() -> Vec<SkinDef> {
    SKIN_ROWS
        .iter()
        .enumerate()
        .map(|(i, &(name, base, highlight, glowing, coin_price, premium))| SkinDef {
            id: skin_id(i as u32 + 1),
            display_name: name.to_string(),
            base_color: Rgb(base),
            highlight_color: Rgb(highlight),
            is_glowing: glowing,
            coin_price,
            requires_platform_purchase: premium,
        })
        .collect()
}
