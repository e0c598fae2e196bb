//! # kindred_app — demo tick loop
//!
//! Spawns a handful of actors and players in an in-memory [`World`], binds
//! them to their declared slots, and runs a fixed-timestep tick loop over
//! them.
//!
//! ## Startup Sequence
//!
//! 1. Register the demo kinds with a [`BehaviourSystem`].
//! 2. Spawn actors by kind name, each with a starting position.
//! 3. Spawn players. The first gets a `Position` assigned directly before it
//!    is wrapped by hand, which the binding layer keeps. The rest are tagged
//!    with a [`KindTag`] and adopted by the system.
//! 4. Run the tick loop for `--ticks` ticks and log where everyone ended up.

mod kinds;
mod tick;

use anyhow::Result;
use clap::Parser;
use kindred_binding::{BehaviourSystem, EntityKind, KindTag};
use kindred_component::{ComponentArgs, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kinds::{Actor, Player, Position};
use tick::{TickConfig, TickLoop};

#[derive(Parser)]
#[command(name = "kindred_app", about = "Tick loop over declaratively bound entities")]
struct Args {
    /// Target ticks per second
    #[arg(long, default_value_t = 60.0, value_parser = tick::parse_tick_rate)]
    tick_rate: f64,

    /// Number of ticks to run (0 = run forever)
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// Number of plain actors to spawn
    #[arg(long, default_value_t = 3)]
    actors: usize,

    /// Number of players to spawn
    #[arg(long, default_value_t = 1)]
    players: usize,
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kindred_app=info".parse()?))
        .init();

    let args = Args::parse();
    let config = TickConfig {
        tick_rate: args.tick_rate,
        max_ticks: args.ticks,
    };

    let world = World::new();
    let mut system = BehaviourSystem::new(&world);
    system.register::<Actor>();
    system.register::<Player>();

    for index in 0..args.actors {
        let start = ComponentArgs::new().arg(0.0).arg(index as f32);
        system.spawn(world.spawn()?, Actor::slots().kind(), &start)?;
    }

    for index in 0..args.players {
        let entity = world.spawn()?;
        if index == 0 {
            world.assign(entity, Position { x: 10.0, y: 10.0 })?;
            let mut player = Player::new(&world, entity)?;
            let start = player.position()?;
            info!(%entity, sprite = %player.sprite()?, x = start.x, y = start.y, "spawned player");
            system.add(player);
        } else {
            let tag = KindTag::new(Player::slots().kind())
                .arg(index as f32 * 5.0)
                .arg(0.0);
            world.assign(entity, tag)?;
            system.adopt(entity)?;
            info!(%entity, "adopted tagged player");
        }
    }

    info!(entities = world.entity_count(), "world populated");

    let entities = system.entities();
    let mut tick_loop = TickLoop::new(config, system);
    info!(entities = tick_loop.system().len(), "entities bound");
    tick_loop.run()?;

    for entity in entities {
        if let Some(position) = world.component::<Position>(entity) {
            let position = position.borrow();
            info!(%entity, x = position.x, y = position.y, "final position");
        }
    }

    info!("kindred_app shut down");
    Ok(())
}
