use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use avatar_bake::{
    AssetId, AssetType, AvatarTextureIndex, BakeCache, BakeOpts, BakeTarget, FolderType,
    InventoryFolder, InventoryItem, InventoryType, ItemId, MemoryAssetService,
    MemoryInventoryService, PrincipalId, Wearable, WearableType, decode_wearable,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avatar-bake", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load an outfit fixture, bake it, and write the baked textures as PNGs.
    Bake(BakeArgs),
    /// Decode a wearable asset and print it as JSON.
    Decode(DecodeArgs),
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// Input outfit fixture JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for baked PNGs and `appearance.json`.
    #[arg(long)]
    out: PathBuf,

    /// Override every target's edge length in pixels.
    #[arg(long)]
    resolution: Option<u32>,

    /// Bake targets in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Wearable asset file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

/// Outfit fixture: every worn item, with texture files relative to the fixture.
#[derive(serde::Deserialize, Debug)]
struct Fixture {
    #[serde(default)]
    opts: Option<BakeOpts>,
    items: Vec<FixtureItem>,
}

#[derive(serde::Deserialize, Debug)]
struct FixtureItem {
    /// Layer order written into the link description.
    ordinal: Option<i32>,
    /// Encoded wearable asset file; takes precedence over the inline fields.
    #[serde(default)]
    wearable: Option<PathBuf>,
    #[serde(rename = "type")]
    wearable_type: Option<WearableType>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    params: BTreeMap<u32, f32>,
    #[serde(default)]
    textures: BTreeMap<AvatarTextureIndex, PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Bake(args) => cmd_bake(args),
        Command::Decode(args) => cmd_decode(args),
    }
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read wearable '{}'", args.in_path.display()))?;
    let wearable = decode_wearable(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&wearable)?);
    Ok(())
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read fixture '{}'", args.in_path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("parse fixture '{}'", args.in_path.display()))?;
    let root = args
        .in_path
        .parent()
        .unwrap_or_else(|| Path::new("."));

    let mut opts = fixture.opts.unwrap_or_default();
    if args.resolution.is_some() {
        opts.resolution = args.resolution;
    }
    opts.parallel |= args.parallel;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }

    let principal = PrincipalId::random();
    let inventory = MemoryInventoryService::new();
    let assets = MemoryAssetService::new();
    let folder_id = ItemId::random();
    inventory.add_folder(InventoryFolder {
        id: folder_id,
        owner: principal,
        name: "Current Outfit".to_string(),
        folder_type: FolderType::CurrentOutfit,
    });
    for (pos, item) in fixture.items.iter().enumerate() {
        stage_item(root, folder_id, pos, item, &inventory, &assets)?;
    }

    let cache = BakeCache::new(opts);
    let report = cache.load_from_current_outfit(principal, &inventory, &assets)?;
    for skipped in &report.skipped {
        eprintln!("skipped {}: {:?}", skipped.item_id, skipped.reason);
    }
    let info = cache.bake(&assets)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    for target in BakeTarget::ALL {
        let id = info.baked_texture(target);
        let Some(asset) = assets.asset(id) else {
            continue;
        };
        let path = args.out.join(format!("{}.png", target_file_stem(target)));
        std::fs::write(&path, &asset.data)
            .with_context(|| format!("write png '{}'", path.display()))?;
    }

    let path = args.out.join("appearance.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&info)?)
        .with_context(|| format!("write '{}'", path.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

// Put one fixture item into the stores: texture assets, the wearable asset, the real item, and
// its current-outfit link.
fn stage_item(
    root: &Path,
    folder_id: ItemId,
    pos: usize,
    item: &FixtureItem,
    inventory: &MemoryInventoryService,
    assets: &MemoryAssetService,
) -> anyhow::Result<()> {
    let asset_id = AssetId::random();
    let (asset_type, name) = if let Some(rel) = &item.wearable {
        let path = root.join(rel);
        let data = std::fs::read(&path)
            .with_context(|| format!("read wearable '{}'", path.display()))?;
        assets.insert(avatar_bake::Asset {
            id: asset_id,
            asset_type: AssetType::Clothing,
            name: item.name.clone(),
            temporary: false,
            data,
        });
        (AssetType::Clothing, item.name.clone())
    } else {
        let ty = item
            .wearable_type
            .with_context(|| format!("fixture item {pos} needs 'type' or 'wearable'"))?;
        let mut wearable = Wearable::new(ty);
        wearable.name = item.name.clone();
        wearable.params = item.params.clone();
        for (&slot, rel) in &item.textures {
            let path = root.join(rel);
            let data = std::fs::read(&path)
                .with_context(|| format!("read texture '{}'", path.display()))?;
            let tex = AssetId::random();
            assets.insert_texture(tex, data);
            wearable.textures.insert(slot, tex);
        }
        assets.insert_wearable(asset_id, &wearable);
        let asset_type = if ty.is_body_part() {
            AssetType::Bodypart
        } else {
            AssetType::Clothing
        };
        (asset_type, wearable.name)
    };

    let item_id = ItemId::random();
    inventory.add_item(InventoryItem {
        id: item_id,
        folder_id: ItemId::random(),
        asset_id,
        asset_type,
        inventory_type: InventoryType::Wearable,
        name: name.clone(),
        description: String::new(),
    });
    inventory.add_item(InventoryItem {
        id: ItemId::random(),
        folder_id,
        asset_id: AssetId(item_id.0),
        asset_type: AssetType::Link,
        inventory_type: InventoryType::Wearable,
        name,
        description: item.ordinal.map(|o| format!("@{o}")).unwrap_or_default(),
    });
    Ok(())
}

fn target_file_stem(target: BakeTarget) -> &'static str {
    match target {
        BakeTarget::Head => "head",
        BakeTarget::UpperBody => "upper_body",
        BakeTarget::LowerBody => "lower_body",
        BakeTarget::Eyes => "eyes",
        BakeTarget::Hair => "hair",
        BakeTarget::Skirt => "skirt",
        BakeTarget::LeftArm => "left_arm",
        BakeTarget::LeftLeg => "left_leg",
        BakeTarget::Aux1 => "aux1",
        BakeTarget::Aux2 => "aux2",
        BakeTarget::Aux3 => "aux3",
    }
}
