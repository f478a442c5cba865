use crate::state::{EntityDetail, Skin, SubResourceTag};

const MAX_EXTRA_SKINS: usize = 5;

/// Three-star rendering of a 0-10 difficulty rating.
pub fn difficulty_stars(difficulty: u8) -> String {
    let filled = (difficulty as usize).div_ceil(3).min(3);
    format!("{}{}", "★".repeat(filled), "☆".repeat(3 - filled))
}

/// Heading and description for the given ability, or `None` when the spell is missing.
pub fn ability_text(detail: &EntityDetail, tag: SubResourceTag) -> Option<(String, String)> {
    match tag.spell_index() {
        None => Some((
            format!("Passive: {}", detail.passive.name),
            strip_markup(&detail.passive.description),
        )),
        Some(idx) => detail.spells.get(idx).map(|spell| {
            (
                format!("{}: {}", tag.as_str().to_uppercase(), spell.name),
                strip_markup(&spell.description),
            )
        }),
    }
}

/// Default skin first, then up to five more in source order.
pub fn skin_choices(detail: &EntityDetail) -> Vec<Skin> {
    let mut choices = vec![Skin {
        num: 0,
        name: "Default".to_string(),
    }];
    choices.extend(detail.skins.iter().skip(1).take(MAX_EXTRA_SKINS).cloned());
    choices
}

/// Turns `<br>` variants into newlines and drops every other tag.
pub fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = rest[open + 1..open + close]
            .trim()
            .trim_end_matches('/')
            .trim()
            .to_ascii_lowercase();
        if tag == "br" {
            out.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}
