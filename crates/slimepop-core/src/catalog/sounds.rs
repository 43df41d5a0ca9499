//! Sound registry: 50 ambient soundscapes. `sound_001` is free, the rest are
//! premium platform purchases.

use super::types::{sound_id, SoundDef};

const SOUND_ROWS: [(&str, &str); 50] = [
    ("Soft Rain", "Gentle rain tapping on a window."),
    ("Forest Whispers", "Calm wind and rustling leaves."),
    ("Crunchy Taps", "High-frequency ASMR tapping."),
    ("Ocean Waves", "Steady rhythm of the tide."),
    ("Cat Purr", "A soothing, deep rumble."),
    ("Cozy Fire", "Crackling wood in a fireplace."),
    ("Magic Chimes", "Ethereal, light bells."),
    ("Page Flips", "Crispy paper sounds."),
    ("Snow Crunch", "Walking on fresh powder."),
    ("Keyboard Clicks", "Mechanical typing satisfaction."),
    ("Ticking Clock", "Steady, hypnotic tempo."),
    ("Bubble Wrap", "Infinite popping satisfaction."),
    ("White Noise", "Classic static for focus."),
    ("Deep Hum", "Low-frequency vibration."),
    ("Rainforest", "Tropical birds and rain."),
    ("Stream Flow", "Babbling brook water."),
    ("Zen Garden", "Sand raking and calm."),
    ("Wind Chimes", "Breezy bamboo sounds."),
    ("Vinyl Static", "Vintage record player crackle."),
    ("Bowl Sing", "Tibetan singing bowl resonance."),
    ("Rain on Tin", "Loud, metallic rain taps."),
    ("Library Ambience", "Quiet echoes and whispers."),
    ("Coffee Shop", "Muted chatter and cups."),
    ("Crickets", "Warm summer night vibes."),
    ("Space Drone", "Cinematic sci-fi void."),
    ("Submarine", "Sonar pings and deep water."),
    ("Train Tracks", "Rhythmic clack of the rail."),
    ("Thunder", "Distant, rolling storms."),
    ("Grass Rustle", "Walking through a meadow."),
    ("Sand Pour", "Flowing granular texture."),
    ("Plastic Crinkle", "Snack bag ASMR."),
    ("Soap Carving", "Crisp shaving sounds."),
    ("Pencil Sketch", "Lead on textured paper."),
    ("Ice Clink", "Glass and frozen cubes."),
    ("Fan Whir", "Steady electric hum."),
    ("Beating Heart", "Vital, steady pulse."),
    ("Boiling Water", "Soft bubbling texture."),
    ("Windy Canyon", "Howling mountain air."),
    ("Scissor Snip", "Sharp metallic cuts."),
    ("Brush Strokes", "Soft canvas painting."),
    ("Bee Buzz", "Distant summer garden."),
    ("Frogs", "Evening swamp chorus."),
    ("Dripping Tap", "Echoing water drops."),
    ("Paper Rip", "Clean, fibrous tearing."),
    ("Wooden Blocks", "Solid wood clicks."),
    ("Clock Tower", "Distant, heavy bells."),
    ("Dry Leaves", "Autumn forest walk."),
    ("Marble Roll", "Glass on hard wood."),
    ("Whale Song", "Deep oceanic moans."),
    ("Supernova", "Ethereal cosmic explosion."),
];

pub(crate) fn standard_sounds() -> Vec<SoundDef> {
    SOUND_ROWS
        .iter()
        .enumerate()
        .map(|(i, &(name, description))| SoundDef {
            id: sound_id(i as u32 + 1),
            display_name: name.to_string(),
            description: description.to_string(),
            requires_platform_purchase: i > 0,
            coin_price: 0,
        })
        .collect()
}
