use ddragon_terminal::error::PipelineError;
use ddragon_terminal::media::MediaLocator;
use ddragon_terminal::state::{EntityKeyIndex, SubResourceTag};

fn locator() -> MediaLocator {
    MediaLocator::new(
        "https://ddragon.leagueoflegends.com/",
        "https://d28xe8vt774jo5.cloudfront.net",
    )
}

fn index() -> EntityKeyIndex {
    [
        ("Ahri".to_string(), "103".to_string()),
        ("Nunu".to_string(), "89".to_string()),
    ]
    .into_iter()
    .collect()
}

#[test]
fn short_keys_are_zero_padded() {
    let url = locator()
        .build_media_reference(&index(), "Nunu", SubResourceTag::Q.as_str())
        .expect("media reference");
    assert!(url.contains("0089"));
    assert!(url.contains("Q1"));
    assert_eq!(
        url,
        "https://d28xe8vt774jo5.cloudfront.net/champion-abilities/0089/ability_0089_Q1.webm"
    );
}

#[test]
fn unknown_tags_use_the_passive_clip() {
    let url = locator()
        .build_media_reference(&index(), "Ahri", "ultimate")
        .expect("media reference");
    assert!(url.ends_with("ability_0103_P1.webm"));
}

#[test]
fn missing_key_is_media_unavailable() {
    let err = locator()
        .build_media_reference(&index(), "Zed", "r")
        .expect_err("no key for Zed");
    assert_eq!(err, PipelineError::MediaUnavailable("Zed".to_string()));
}

#[test]
fn image_locators() {
    let loc = locator();
    assert_eq!(
        loc.portrait_url("14.1.1", "Ahri.png"),
        "https://ddragon.leagueoflegends.com/cdn/14.1.1/img/champion/Ahri.png"
    );
    assert_eq!(
        loc.splash_url("Ahri", 7),
        "https://ddragon.leagueoflegends.com/cdn/img/champion/splash/Ahri_7.jpg"
    );
    assert_eq!(
        loc.passive_icon_url("14.1.1", "Ahri_P.png"),
        "https://ddragon.leagueoflegends.com/cdn/14.1.1/img/passive/Ahri_P.png"
    );
    assert_eq!(
        loc.spell_icon_url("14.1.1", "AhriQ.png"),
        "https://ddragon.leagueoflegends.com/cdn/14.1.1/img/spell/AhriQ.png"
    );
}
