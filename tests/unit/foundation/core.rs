use super::*;

#[test]
fn asset_id_parses_and_displays_hyphenated() {
    let id: AssetId = "c228d1cf-4b5d-4ba8-84f4-899a0796aa97".parse().unwrap();
    assert_eq!(id, AssetId::DEFAULT_AVATAR_TEXTURE);
    assert_eq!(id.to_string(), "c228d1cf-4b5d-4ba8-84f4-899a0796aa97");
    assert!("not-a-uuid".parse::<AssetId>().is_err());
}

#[test]
fn placeholder_ids_are_not_real_textures() {
    assert!(!AssetId::NIL.is_real_texture());
    assert!(!AssetId::DEFAULT_AVATAR_TEXTURE.is_real_texture());
    assert!(!AssetId::DEFAULT_TEXTURE.is_real_texture());
    assert!(AssetId::random().is_real_texture());
}

#[test]
fn tint_channels_clamp_into_unit_range() {
    let t = TintColor::new(-0.5, 1.5, 0.25);
    assert_eq!(t.r, 0.0);
    assert_eq!(t.g, 1.0);
    assert_eq!(t.b, 0.25);
    assert!(TintColor::default().is_identity());
}

#[test]
fn size_byte_len() {
    assert_eq!(Size::square(4).rgba8_len().unwrap(), 64);
    let huge = Size {
        width: u32::MAX,
        height: u32::MAX,
    };
    assert!(huge.rgba8_len().is_err());
}
