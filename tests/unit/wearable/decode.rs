use super::*;

const SHIRT: &str = "LLWearable version 22
Red Shirt

\tpermissions 0
\t{
\t\tbase_mask\t7fffffff
\t\towner_mask\t7fffffff
\t\tcreator_id\t00000000-0000-0000-0000-000000000000
\t}
\tsale_info\t0
\t{
\t\tsale_type\tnot
\t\tsale_price\t10
\t}
type 4
parameters 3
781 .3
803 1
804 0
textures 1
1 5748decc-f629-461c-9a36-a35a221fe21f
";

#[test]
fn decodes_type_params_and_textures() {
    let w = decode_wearable(SHIRT.as_bytes()).unwrap();
    assert_eq!(w.wearable_type, WearableType::Shirt);
    assert_eq!(w.name, "Red Shirt");
    assert_eq!(w.description, "");
    assert_eq!(w.params.len(), 3);
    assert!((w.param(781).unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(w.param(803), Some(1.0));
    assert_eq!(
        w.texture(AvatarTextureIndex::UpperShirt),
        Some(AssetId::DEFAULT_TEXTURE)
    );
}

#[test]
fn encode_output_decodes_to_same_wearable() {
    let w = Wearable::new(WearableType::Tattoo)
        .with_param(1071, 0.25)
        .with_texture(AvatarTextureIndex::LowerTattoo, AssetId::random());
    let back = decode_wearable(&encode_wearable(&w)).unwrap();
    assert_eq!(back, w);
}

#[test]
fn rejects_garbage_and_bad_headers() {
    assert!(decode_wearable(b"").is_err());
    assert!(decode_wearable(b"\xff\xfe\x00").is_err());
    assert!(decode_wearable(b"PNG\r\n").is_err());
    assert!(decode_wearable(b"LLWearable version 7\nold\ntype 0\n").is_err());
}

#[test]
fn rejects_truncated_sections_and_missing_type() {
    let truncated = "LLWearable version 22\nx\n\ntype 4\nparameters 2\n781 0.5\n";
    assert!(matches!(
        decode_wearable(truncated.as_bytes()),
        Err(BakeError::Decode(_))
    ));

    let untyped = "LLWearable version 22\nx\n\nparameters 0\ntextures 0\n";
    assert!(decode_wearable(untyped.as_bytes()).is_err());

    let bad_slot = "LLWearable version 22\nx\n\ntype 4\ntextures 1\n99 5748decc-f629-461c-9a36-a35a221fe21f\n";
    assert!(decode_wearable(bad_slot.as_bytes()).is_err());
}

#[test]
fn rejects_unbalanced_blocks() {
    let open = "LLWearable version 22\nx\n\n\tpermissions 0\n\t{\ntype 4\n";
    assert!(decode_wearable(open.as_bytes()).is_err());

    let close = "LLWearable version 22\nx\n\n}\ntype 4\n";
    assert!(decode_wearable(close.as_bytes()).is_err());
}

#[test]
fn description_line_is_kept() {
    let text = SHIRT.replacen("Red Shirt\n\n", "Red Shirt\nMade by Bob\n", 1);
    let w = decode_wearable(text.as_bytes()).unwrap();
    assert_eq!(w.name, "Red Shirt");
    assert_eq!(w.description, "Made by Bob");
    assert_eq!(w.wearable_type, WearableType::Shirt);
    assert_eq!(w.params.len(), 3);

    let mut described = Wearable::new(WearableType::Pants);
    described.description = "type 4 textures".to_string();
    assert_eq!(decode_wearable(&encode_wearable(&described)).unwrap(), described);
}
