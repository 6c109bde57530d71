use std::sync::Once;

use tracing::{info, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use socket_wfc::{
    CompatibilityMode, Palette, PaletteMode, PaletteSet, Side, Socket, Solver, SymmetryType,
    TileInfo,
};

const WIDTH: usize = 24;
const HEIGHT: usize = 12;
const MAX_RETRIES: u64 = 20;

static TRACING_SUBSCRIBER: Once = Once::new();

fn init_tracing() {
    TRACING_SUBSCRIBER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_target(true)
            .init();
    })
}

fn glyph(socket: Socket) -> char {
    let [up, down, left, right] =
        [Side::Up, Side::Down, Side::Left, Side::Right].map(|side| socket.is_connector(side));
    match (up, down, left, right) {
        (false, false, false, false) => ' ',
        (true, true, false, false) => '│',
        (false, false, true, true) => '─',
        (true, false, false, true) => '└',
        (true, false, true, false) => '┘',
        (false, true, false, true) => '┌',
        (false, true, true, false) => '┐',
        (true, false, true, true) => '┴',
        (false, true, true, true) => '┬',
        (true, true, false, true) => '├',
        (true, true, true, false) => '┤',
        (true, true, true, true) => '┼',
        (true, false, false, false) => '╵',
        (false, true, false, false) => '╷',
        (false, false, true, false) => '╴',
        (false, false, false, true) => '╶',
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let n = Socket::NONE;
    let pipes = Palette::new(
        "pipes",
        PaletteMode::Fold,
        vec![
            TileInfo::blank(0),
            TileInfo::new(1, SymmetryType::I, Socket::new(0, 0, n, n)),
            TileInfo::new(2, SymmetryType::L, Socket::new(0, n, n, 0)),
            TileInfo::new(3, SymmetryType::T, Socket::new(0, n, 0, 0)),
            TileInfo::new(4, SymmetryType::X, Socket::new(0, 0, 0, 0)),
        ],
    );
    let palette_set = PaletteSet::single(pipes, CompatibilityMode::Multiple);

    let mut solver = Solver::new(WIDTH, HEIGHT, palette_set.clone(), 0)?;
    if let Err(err) = solver.rule().check_symmetry(solver.states()) {
        warn!("{err}");
    } else {
        info!("rule is symmetric for {} states", solver.states().len());
    }

    for seed in 1..=MAX_RETRIES {
        if solver.run() {
            break;
        }
        info!("contradiction, retrying with seed {seed}");
        solver.reseed(seed);
        solver.reset(WIDTH, HEIGHT, palette_set.clone())?;
    }

    for row in solver.collapsed_states() {
        let line = row
            .iter()
            .map(|state| state.map_or('?', |s| glyph(s.socket)))
            .collect::<String>();
        println!("{line}");
    }
    Ok(())
}
