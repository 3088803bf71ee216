use rand::Rng;
use rand::seq::SliceRandom;

use crate::assets::atlas::{PartCategory, SpriteAtlas};
use crate::portrait::selection::PortraitSelection;

const HAIR_PALETTE: [&str; 8] = [
    "#1c1c1c", "#2c1b10", "#4a3020", "#6b4e31", "#8e7355", "#a55728", "#b89b72", "#d6c4a0",
];

const SKIN_PALETTE: [&str; 7] = [
    "#ffdbac", "#f1c27d", "#e0ac69", "#c68642", "#bc8277", "#a3705f", "#8d5524",
];

const FACIAL_CHANCE: f64 = 0.4;
const HAIR_BACK_CHANCE: f64 = 0.3;

/// Draws random, renderable selections from an atlas' part keys.
#[derive(Clone, Debug)]
pub struct SelectionSampler<'a> {
    hair: Vec<&'a str>,
    brow: Vec<&'a str>,
    facial: Vec<&'a str>,
    hair_back: Vec<&'a str>,
    heads: Vec<&'a str>,
    ears: Vec<&'a str>,
}

impl<'a> SelectionSampler<'a> {
    /// Sampler over every part listed in `atlas`.
    pub fn new(atlas: &'a SpriteAtlas) -> Self {
        let head_sheet = atlas.part_keys(PartCategory::Head);
        let prefixed = |prefix: &str| -> Vec<&'a str> {
            head_sheet
                .iter()
                .copied()
                .filter(|k| {
                    k.get(..prefix.len())
                        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
                })
                .collect()
        };
        Self {
            hair: atlas.part_keys(PartCategory::Hair),
            brow: atlas.part_keys(PartCategory::Brow),
            facial: atlas.part_keys(PartCategory::Facial),
            hair_back: atlas.part_keys(PartCategory::HairBack),
            heads: prefixed("head"),
            ears: prefixed("ear"),
        }
    }

    /// One random selection. Facial hair and back hair are optional.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PortraitSelection {
        let facial = if rng.gen_bool(FACIAL_CHANCE) {
            pick(&self.facial, rng)
        } else {
            String::new()
        };
        let hair_back = if rng.gen_bool(HAIR_BACK_CHANCE) {
            pick(&self.hair_back, rng)
        } else {
            String::new()
        };
        PortraitSelection {
            hair: pick(&self.hair, rng),
            brow: pick(&self.brow, rng),
            facial,
            hair_back,
            head: pick(&self.heads, rng),
            ears: pick(&self.ears, rng),
            hair_color: pick(&HAIR_PALETTE, rng),
            skin_color: pick(&SKIN_PALETTE, rng),
        }
    }
}

fn pick<R: Rng + ?Sized>(keys: &[&str], rng: &mut R) -> String {
    keys.choose(rng).copied().unwrap_or("").to_owned()
}
