//! # Vein Simulation
//!
//! Headless run of one vein mining session on the 20Hz server clock.
//!
//! Generates an iron vein that crosses into the deepslate layer, breaks one
//! of its blocks and ticks until the cascade finishes.
//!
//! ```bash
//! # Shipped configuration
//! vein_sim
//!
//! # Custom files and seed
//! vein_sim config/veinmine.toml config/loot.toml 42
//! ```

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use lode::{EventBus, GameEvent, MiningServer, TickLoop};
use lode_economy::{Enchantments, FixedPoint, LootSeed, LootTables, StaminaPool, TheBank, Tool};
use lode_mining::{Activation, VeinConfig};
use lode_shared::{BlockId, BlockPos, BlockRegistry, EffectEvent};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PLAYER: u64 = 1;
const EFFECT_CAPACITY: usize = 16_384;
const VEIN_LENGTH: usize = 120;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map_or("config/veinmine.toml", String::as_str);
    let loot_path = args.get(2).map_or("config/loot.toml", String::as_str);
    let seed: u64 = args.get(3).map_or(Ok(7), |s| s.parse())?;

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                      LODE VEIN SIMULATION");
    println!("═══════════════════════════════════════════════════════════════════");

    let config = VeinConfig::load(config_path)?;
    let registry = Arc::new(BlockRegistry::with_blocks(
        ["stone", "deepslate"]
            .into_iter()
            .chain(config.eligible.iter().map(String::as_str)),
        &config.depth_variant_prefixes,
    ));
    let loot = LootTables::load(loot_path, &registry, loot_seed(seed))?;

    let bank = Arc::new(TheBank::new(FixedPoint::from_whole(64)));
    bank.set_stamina(PLAYER, StaminaPool::full(FixedPoint::from_whole(200)));
    bank.equip(
        PLAYER,
        Tool::new(1, 257, 250).with_enchantments(Enchantments {
            fortune: 1,
            silk_touch: false,
        }),
    );

    let (sender, receiver) = EventBus::create_pair(EFFECT_CAPACITY);
    let mut server =
        MiningServer::new(config, Arc::clone(&registry), loot, Arc::clone(&bank), sender)?;

    let origin = generate_vein(&mut server, &registry, seed)?;
    println!(
        "World: {} blocks, vein of {} from {}",
        server.world().block_count(),
        VEIN_LENGTH,
        origin
    );

    match server.break_block(PLAYER, origin) {
        Activation::Scheduled { session, jobs } => {
            println!("Session {session} scheduled: {jobs} blocks");
        }
        Activation::Completed(report) => {
            println!("Vein broken instantly: {} blocks", report.broken);
        }
        other => {
            println!("No vein: {other:?}");
            return Ok(());
        }
    }

    let mut tick_loop = TickLoop::default();
    while server.miner().active_sessions() > 0 {
        while tick_loop.should_tick() {
            let (_, start) = tick_loop.begin_tick();
            for report in server.run_tick() {
                println!(
                    "Tick {}: session {} done, {} broken, {} skipped",
                    server.current_tick(),
                    report.session,
                    report.broken,
                    report.skipped
                );
            }
            tick_loop.end_tick(start);
        }
        tick_loop.wait_for_next_tick();
    }

    summarize(&receiver.drain());
    if let Some(left) = bank.stamina(PLAYER) {
        println!("Stamina left: {left}");
    }
    let stats = tick_loop.stats();
    println!(
        "Ticks: {} (avg {}us, max {}us, late {})",
        stats.total_ticks, stats.avg_tick_us, stats.max_tick_us, stats.late_ticks
    );
    Ok(())
}

fn loot_seed(seed: u64) -> LootSeed {
    let mut secret = [0_u8; 16];
    secret[..8].copy_from_slice(&seed.to_le_bytes());
    secret[8..].copy_from_slice(&(!seed).to_le_bytes());
    LootSeed::new(&secret)
}

/// Stone above y=0, deepslate below, and a wandering iron vein through both.
fn generate_vein(
    server: &mut MiningServer,
    registry: &BlockRegistry,
    seed: u64,
) -> Result<BlockPos, Box<dyn Error>> {
    let lookup = |name: &str| registry.id(name).ok_or_else(|| format!("{name} not registered"));
    let stone = lookup("stone")?;
    let deepslate = lookup("deepslate")?;
    let iron = lookup("iron_ore")?;
    let deep_iron = lookup("deepslate_iron_ore")?;

    let world = server.world_mut();
    for x in -12..=12 {
        for y in -12..=12 {
            for z in -12..=12 {
                let host = if y < 0 { deepslate } else { stone };
                world.set_block(BlockPos::new(x, y, z), host);
            }
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut placed: HashMap<BlockPos, BlockId> = HashMap::new();
    let mut pos = BlockPos::new(0, 4, 0);
    let origin = pos;
    while placed.len() < VEIN_LENGTH {
        let ore = if pos.y < 0 { deep_iron } else { iron };
        placed.insert(pos, ore);
        pos = pos.offset(
            rng.gen_range(-1..=1),
            rng.gen_range(-1..=0),
            rng.gen_range(-1..=1),
        );
        if pos.chebyshev_distance(origin) > 10 {
            pos = origin;
        }
    }
    for (pos, ore) in placed {
        world.set_block(pos, ore);
    }
    Ok(origin)
}

fn summarize(events: &[GameEvent]) {
    let mut removed = 0;
    let mut spawned: HashMap<u32, u64> = HashMap::new();
    let mut particles = 0_u64;
    let mut sounds = 0;

    for event in events {
        match event {
            GameEvent::BlockRemoved { .. } => removed += 1,
            GameEvent::ItemSpawned { stack, .. } => {
                *spawned.entry(stack.item_id).or_default() += u64::from(stack.count);
            }
            GameEvent::Effect(EffectEvent::Particles { count, .. }) => {
                particles += u64::from(*count);
            }
            GameEvent::Effect(EffectEvent::Sound { .. }) => sounds += 1,
            GameEvent::BlockBroken { .. } | GameEvent::VeinFinished(_) => {}
        }
    }

    println!("Blocks removed by the vein: {removed}");
    println!("Effects: {particles} particles, {sounds} sounds");
    let mut items: Vec<_> = spawned.into_iter().collect();
    items.sort_unstable();
    for (item_id, count) in items {
        println!("  item {item_id}: {count}");
    }
}
