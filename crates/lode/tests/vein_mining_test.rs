//! End-to-end vein mining through the server.

use std::sync::Arc;

use lode::{EventBus, EventReceiver, GameEvent, MiningServer};
use lode_economy::{
    Enchantments, FixedPoint, LootSeed, LootTables, StaminaPool, TheBank, Tool,
};
use lode_mining::{Activation, BlockAccess, ExecutionMode, ToolBreakPolicy, VeinConfig, VeinReport};
use lode_shared::{BlockId, BlockPos, BlockRegistry};

const PLAYER: u64 = 1;
const COAL_ITEM: u32 = 263;

const LOOT: &str = r#"
    [[tables]]
    block = "coal_ore"
    [[tables.entries]]
    item_id = 263
    min_quantity = 1
    max_quantity = 1

    [[tables]]
    block = "iron_ore"
    [[tables.entries]]
    item_id = 265
    min_quantity = 1
    max_quantity = 1

    [[tables]]
    block = "deepslate_iron_ore"
    [[tables.entries]]
    item_id = 265
    min_quantity = 1
    max_quantity = 1

    [[tables]]
    block = "gold_ore"
    [[tables.entries]]
    item_id = 266
    min_quantity = 1
    max_quantity = 1
"#;

struct Harness {
    server: MiningServer,
    events: EventReceiver,
    bank: Arc<TheBank>,
    coal: BlockId,
    iron: BlockId,
    deep_iron: BlockId,
    gold: BlockId,
    stone: BlockId,
}

impl Harness {
    fn new(mode: ExecutionMode, stamina: u64) -> Self {
        Self::with_config(
            VeinConfig {
                mode,
                ..config()
            },
            stamina,
            1_000,
        )
    }

    fn with_config(config: VeinConfig, stamina: u64, durability: u32) -> Self {
        Self::with_bus(config, stamina, durability, 65_536)
    }

    fn with_bus(config: VeinConfig, stamina: u64, durability: u32, effects: usize) -> Self {
        let registry = Arc::new(BlockRegistry::with_blocks(
            [
                "stone",
                "coal_ore",
                "iron_ore",
                "deepslate_iron_ore",
                "gold_ore",
            ],
            &config.depth_variant_prefixes,
        ));
        let loot = LootTables::from_toml_str(LOOT, &registry, LootSeed::test_seed()).unwrap();

        let bank = Arc::new(TheBank::new(FixedPoint::from_whole(100)));
        bank.set_stamina(PLAYER, StaminaPool::full(FixedPoint::from_whole(stamina)));
        bank.equip(PLAYER, Tool::new(1, 257, durability));

        let (sender, events) = EventBus::create_pair(effects);
        let server =
            MiningServer::new(config, Arc::clone(&registry), loot, Arc::clone(&bank), sender)
                .unwrap();

        let id = |name: &str| registry.id(name).unwrap();
        Self {
            coal: id("coal_ore"),
            iron: id("iron_ore"),
            deep_iron: id("deepslate_iron_ore"),
            gold: id("gold_ore"),
            stone: id("stone"),
            server,
            events,
            bank,
        }
    }

    fn place(&mut self, positions: &[BlockPos], block: BlockId) {
        for &pos in positions {
            self.server.world_mut().set_block(pos, block);
        }
    }

    fn stamina(&self) -> FixedPoint {
        self.bank.stamina(PLAYER).unwrap()
    }

    /// Runs ticks until the player's vein finishes.
    fn run_until_done(&mut self, limit: u64) -> VeinReport {
        for _ in 0..limit {
            if let Some(report) = self.server.run_tick().into_iter().next() {
                return report;
            }
        }
        panic!("vein not finished after {limit} ticks");
    }
}

fn config() -> VeinConfig {
    VeinConfig {
        eligible: ["coal_ore", "iron_ore", "deepslate_iron_ore", "gold_ore"]
            .map(String::from)
            .to_vec(),
        trail_particles: 2,
        ..VeinConfig::default()
    }
}

fn removed(events: &[GameEvent]) -> Vec<BlockPos> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::BlockRemoved { pos } => Some(*pos),
            _ => None,
        })
        .collect()
}

/// Item spawns that came after the last vein removal.
fn consolidated_spawns(events: &[GameEvent]) -> Vec<(BlockPos, u32, u32)> {
    let last_removal = events
        .iter()
        .rposition(|e| matches!(e, GameEvent::BlockRemoved { .. }))
        .unwrap_or(0);
    events[last_removal..]
        .iter()
        .filter_map(|e| match e {
            GameEvent::ItemSpawned { pos, stack } => Some((*pos, stack.item_id, stack.count)),
            _ => None,
        })
        .collect()
}

fn line(from: BlockPos, n: i32) -> Vec<BlockPos> {
    (1..=n).map(|x| from.offset(x, 0, 0)).collect()
}

#[test]
fn test_three_neighbors_one_consolidated_spawn() {
    let mut h = Harness::new(ExecutionMode::Cascade, 100);
    let origin = BlockPos::new(0, 20, 0);
    let neighbors = [
        origin.offset(1, 0, 0),
        origin.offset(0, -1, 0),
        origin.offset(-1, 1, 1),
    ];
    h.place(&[origin], h.coal);
    h.place(&neighbors, h.coal);
    h.place(&[origin.offset(0, 0, 1)], h.stone);

    let outcome = h.server.break_block(PLAYER, origin);
    assert!(matches!(outcome, Activation::Scheduled { jobs: 3, .. }));

    let report = h.run_until_done(10);
    assert_eq!(report.discovered, 3);
    assert_eq!(report.broken, 3);
    assert_eq!(h.server.current_tick(), 3);

    let events = h.events.drain();
    assert_eq!(removed(&events).len(), 3);
    let spawns = consolidated_spawns(&events);
    assert_eq!(spawns.len(), 3);
    assert!(spawns.iter().all(|&(at, item, _)| at == origin && item == COAL_ITEM));
    assert!(matches!(events.last(), Some(GameEvent::VeinFinished(_))));
    assert_eq!(h.server.world().block_at(origin.offset(0, 0, 1)), h.stone);
}

#[test]
fn test_600_block_vein_takes_511() {
    let mut h = Harness::new(ExecutionMode::Instant, 1_000);
    let mut body = Vec::with_capacity(600);
    'fill: for y in 0..10 {
        for x in 0..10 {
            for z in 0..10 {
                if body.len() == 600 {
                    break 'fill;
                }
                body.push(BlockPos::new(x, y, z));
            }
        }
    }
    h.place(&body, h.coal);

    let Activation::Completed(report) = h.server.break_block(PLAYER, body[0]) else {
        panic!("instant vein should complete in the call");
    };
    assert_eq!(report.discovered, 511);
    assert_eq!(report.broken, 511);
    assert_eq!(h.server.world().count_of(h.coal), 600 - 1 - 511);
    assert_eq!(h.stamina(), FixedPoint::from_parts(744, 500_000));
}

#[test]
fn test_insufficient_stamina_breaks_nothing_more() {
    let mut h = Harness::new(ExecutionMode::Instant, 10);
    let origin = BlockPos::new(0, 0, 0);
    let slab: Vec<BlockPos> = (1..=5)
        .flat_map(|x| (0..5).flat_map(move |z| (0..2).map(move |y| BlockPos::new(x, y, z))))
        .collect();
    assert_eq!(slab.len(), 50);
    h.place(&[origin], h.coal);
    h.place(&slab, h.coal);

    let outcome = h.server.break_block(PLAYER, origin);
    assert_eq!(
        outcome,
        Activation::Declined {
            discovered: 50,
            cost: FixedPoint::from_whole(25),
        }
    );
    assert_eq!(h.server.world().count_of(h.coal), 50);
    assert_eq!(h.stamina(), FixedPoint::from_whole(10));
    assert!(removed(&h.events.drain()).is_empty());
    assert_eq!(h.server.miner().active_sessions(), 0);
}

#[test]
fn test_cascade_fires_in_order_on_schedule() {
    let mut h = Harness::with_config(
        VeinConfig {
            step_delay_ticks: 2,
            ..config()
        },
        100,
        1_000,
    );
    let origin = BlockPos::new(0, 5, 0);
    let targets = line(origin, 5);
    h.place(&[origin], h.iron);
    h.place(&targets, h.iron);
    assert!(matches!(
        h.server.break_block(PLAYER, origin),
        Activation::Scheduled { jobs: 5, .. }
    ));
    h.events.drain();

    let mut fired_at = Vec::new();
    for _ in 0..12 {
        h.server.run_tick();
        for pos in removed(&h.events.drain()) {
            fired_at.push((h.server.current_tick(), pos));
        }
    }
    let expected: Vec<(u64, BlockPos)> = targets
        .iter()
        .enumerate()
        .map(|(i, &pos)| (2 * (i as u64 + 1), pos))
        .collect();
    assert_eq!(fired_at, expected);
}

#[test]
fn test_instant_matches_cascade_order() {
    let origin = BlockPos::new(3, 3, 3);
    let body: Vec<BlockPos> = (0..3)
        .flat_map(|x| (0..3).flat_map(move |y| (0..3).map(move |z| origin.offset(x, y, z))))
        .skip(1)
        .collect();

    let run = |mode| {
        let mut h = Harness::new(mode, 100);
        h.place(&[origin], h.gold);
        h.place(&body, h.gold);
        let _ = h.server.break_block(PLAYER, origin);
        while h.server.miner().active_sessions() > 0 {
            h.server.run_tick();
        }
        removed(&h.events.drain())
    };

    let cascade = run(ExecutionMode::Cascade);
    let instant = run(ExecutionMode::Instant);
    assert_eq!(cascade.len(), 26);
    assert_eq!(cascade, instant);
}

#[test]
fn test_depth_variants_join_the_vein() {
    for (origin_is_deep, expect) in [(false, 2), (true, 2)] {
        let mut h = Harness::new(ExecutionMode::Instant, 100);
        let origin = BlockPos::new(0, 0, 0);
        let (first, second) = if origin_is_deep {
            (h.deep_iron, h.iron)
        } else {
            (h.iron, h.deep_iron)
        };
        h.place(&[origin], first);
        h.place(&[origin.offset(0, -1, 0)], second);
        h.place(&[origin.offset(1, 0, 0)], first);
        h.place(&[origin.offset(0, 1, 0)], h.gold);

        let Activation::Completed(report) = h.server.break_block(PLAYER, origin) else {
            panic!("expected an instant vein");
        };
        assert_eq!(report.broken, expect);
        assert_eq!(h.server.world().block_at(origin.offset(0, 1, 0)), h.gold);
    }
}

#[test]
fn test_tool_break_stops_vein() {
    let mut h = Harness::with_config(
        VeinConfig {
            mode: ExecutionMode::Instant,
            ..config()
        },
        100,
        3,
    );
    let origin = BlockPos::ORIGIN;
    h.place(&[origin], h.coal);
    h.place(&line(origin, 10), h.coal);

    // Origin break leaves 2 durability: two vein blocks, then it snaps.
    let Activation::Completed(report) = h.server.break_block(PLAYER, origin) else {
        panic!("expected an instant vein");
    };
    assert!(report.tool_broke);
    assert_eq!(report.broken, 2);
    assert_eq!(report.stacks_spawned, 2);
    assert!(h.bank.held_tool(PLAYER).is_bare_hand());
    assert_eq!(h.server.world().count_of(h.coal), 8);
}

#[test]
fn test_tool_break_bare_hand_continues() {
    let mut h = Harness::with_config(
        VeinConfig {
            mode: ExecutionMode::Instant,
            on_tool_break: ToolBreakPolicy::BareHand,
            ..config()
        },
        100,
        3,
    );
    let origin = BlockPos::ORIGIN;
    h.place(&[origin], h.coal);
    h.place(&line(origin, 10), h.coal);

    let Activation::Completed(report) = h.server.break_block(PLAYER, origin) else {
        panic!("expected an instant vein");
    };
    assert!(report.tool_broke);
    assert_eq!(report.broken, 10);
}

#[test]
fn test_tool_swapped_mid_cascade_is_not_worn() {
    let mut h = Harness::new(ExecutionMode::Cascade, 100);
    h.bank.equip(
        PLAYER,
        Tool::new(1, 257, 1_000).with_enchantments(Enchantments {
            fortune: 3,
            silk_touch: false,
        }),
    );
    let origin = BlockPos::ORIGIN;
    h.place(&[origin], h.coal);
    h.place(&line(origin, 10), h.coal);

    assert!(matches!(
        h.server.break_block(PLAYER, origin),
        Activation::Scheduled { jobs: 10, .. }
    ));
    h.server.run_tick();
    h.server.run_tick();
    h.bank.equip(PLAYER, Tool::new(2, 270, 1_000));

    let report = h.run_until_done(20);
    assert!(report.tool_lost);
    assert!(!report.tool_broke);
    assert_eq!(report.broken, 2);
    assert_eq!(report.unfired(), 8);
    let held = h.bank.held_tool(PLAYER);
    assert_eq!(held.id, 2);
    assert_eq!(held.durability, 1_000);
    assert_eq!(h.server.world().count_of(h.coal), 8);
}

#[test]
fn test_small_effect_channel_keeps_every_item() {
    let mut h = Harness::with_bus(
        VeinConfig {
            mode: ExecutionMode::Instant,
            ..config()
        },
        100,
        1_000,
        64,
    );
    let origin = BlockPos::ORIGIN;
    h.place(&[origin], h.coal);
    h.place(&line(origin, 20), h.coal);

    let Activation::Completed(report) = h.server.break_block(PLAYER, origin) else {
        panic!("expected an instant vein");
    };
    assert_eq!(report.stacks_lost, 0);
    assert!(report.items_spawned > 0);

    let events = h.events.drain();
    let spawned: u64 = consolidated_spawns(&events)
        .iter()
        .map(|&(_, _, count)| u64::from(count))
        .sum();
    assert_eq!(spawned, report.items_spawned);
    assert_eq!(removed(&events).len(), report.broken as usize);
    assert!(matches!(events.last(), Some(GameEvent::VeinFinished(_))));
}

#[test]
fn test_disconnect_spawns_what_was_collected() {
    let mut h = Harness::new(ExecutionMode::Cascade, 100);
    let origin = BlockPos::new(0, 40, 0);
    h.place(&[origin], h.coal);
    h.place(&line(origin, 6), h.coal);
    let _ = h.server.break_block(PLAYER, origin);
    for _ in 0..3 {
        h.server.run_tick();
    }
    h.events.drain();

    let report = h.server.disconnect(PLAYER).unwrap();
    assert!(report.cancelled);
    assert_eq!(report.broken, 3);
    assert_eq!(report.unfired(), 3);
    let events = h.events.drain();
    let spawned: u32 = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ItemSpawned { stack, .. } => Some(stack.count),
            _ => None,
        })
        .sum();
    assert_eq!(spawned, 3);

    for _ in 0..10 {
        assert!(h.server.run_tick().is_empty());
    }
    assert_eq!(h.server.world().count_of(h.coal), 3);
    assert!(h.server.disconnect(PLAYER).is_none());
}

#[test]
fn test_second_vein_while_busy() {
    let mut h = Harness::new(ExecutionMode::Cascade, 100);
    let origin = BlockPos::ORIGIN;
    h.place(&[origin], h.coal);
    h.place(&line(origin, 4), h.coal);
    let other = BlockPos::new(0, 50, 0);
    h.place(&[other, other.offset(0, 1, 0)], h.coal);

    let _ = h.server.break_block(PLAYER, origin);
    assert_eq!(h.server.break_block(PLAYER, other), Activation::Busy);
    // The second block itself is broken normally.
    assert!(h.server.world().block_at(other).is_air());
    assert_eq!(h.server.world().block_at(other.offset(0, 1, 0)), h.coal);
}

#[test]
fn test_concurrent_removal_is_skipped() {
    let mut h = Harness::new(ExecutionMode::Cascade, 100);
    let origin = BlockPos::ORIGIN;
    let targets = line(origin, 4);
    h.place(&[origin], h.coal);
    h.place(&targets, h.coal);
    let _ = h.server.break_block(PLAYER, origin);

    // Another player digs out the third block first.
    h.server.world_mut().set_block(targets[2], BlockId::AIR);
    let report = h.run_until_done(10);
    assert_eq!(report.broken, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.stacks_spawned, 3);
}

#[test]
fn test_block_entity_is_left_alone() {
    let mut h = Harness::new(ExecutionMode::Instant, 100);
    let origin = BlockPos::ORIGIN;
    let targets = line(origin, 3);
    h.place(&[origin], h.coal);
    h.place(&targets, h.coal);
    h.server.world_mut().attach_entity(targets[1], 5);

    let Activation::Completed(report) = h.server.break_block(PLAYER, origin) else {
        panic!("expected an instant vein");
    };
    assert_eq!(report.skipped, 1);
    assert_eq!(h.server.world().block_at(targets[1]), h.coal);
}

#[test]
fn test_stone_is_ineligible() {
    let mut h = Harness::new(ExecutionMode::Instant, 100);
    h.place(&[BlockPos::ORIGIN], h.stone);
    h.place(&line(BlockPos::ORIGIN, 3), h.stone);

    assert_eq!(h.server.break_block(PLAYER, BlockPos::ORIGIN), Activation::Ineligible);
    assert_eq!(h.server.world().count_of(h.stone), 3);
    assert_eq!(h.stamina(), FixedPoint::from_whole(100));
}

#[test]
fn test_shutdown_finishes_every_vein() {
    let mut h = Harness::new(ExecutionMode::Cascade, 100);
    h.place(&[BlockPos::ORIGIN], h.coal);
    h.place(&line(BlockPos::ORIGIN, 5), h.coal);
    let _ = h.server.break_block(PLAYER, BlockPos::ORIGIN);
    h.server.run_tick();

    let reports = h.server.shutdown();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].cancelled);
    assert_eq!(h.server.miner().active_sessions(), 0);
}
