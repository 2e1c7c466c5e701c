use dread_maze_core::{CellCoord, PickupKind, RunSnapshot, Tile};

/// Renders the level as ASCII, one line per grid row.
///
/// Entities are drawn over tiles with the later layer winning: pickups,
/// NPCs, the exit, enemies and finally the actor.
pub(crate) fn render(snapshot: &RunSnapshot<'_>) -> String {
    let grid = snapshot.grid;
    let width = grid.width() as usize;
    let mut canvas: Vec<Vec<char>> = grid
        .rows()
        .map(|row| {
            row.iter()
                .map(|tile| match tile {
                    Tile::Wall => '#',
                    Tile::Floor => '.',
                })
                .collect()
        })
        .collect();

    let mut plot = |cell: Option<CellCoord>, glyph: char| {
        let Some(cell) = cell else {
            return;
        };
        if let Some(slot) = canvas
            .get_mut(cell.row() as usize)
            .and_then(|row| row.get_mut(cell.column() as usize))
        {
            *slot = glyph;
        }
    };

    for pickup in &snapshot.pickups {
        let glyph = match pickup.kind {
            PickupKind::Key => 'k',
            PickupKind::OxygenTank { .. } => 'o',
            PickupKind::Clue { .. } => '?',
        };
        plot(Some(pickup.cell), glyph);
    }
    for npc in snapshot.npcs.iter().filter(|npc| !npc.used) {
        plot(CellCoord::containing(npc.position), 'N');
    }
    plot(
        Some(snapshot.exit),
        if snapshot.exit_unlocked { 'E' } else { 'X' },
    );
    for enemy in &snapshot.enemies {
        plot(
            CellCoord::containing(enemy.position),
            if enemy.spitter { 's' } else { 'z' },
        );
    }
    if let Some(actor) = &snapshot.actor {
        plot(CellCoord::containing(actor.position), '@');
    }

    let mut out = String::with_capacity(canvas.len() * (width + 1));
    for row in canvas {
        out.extend(row);
        out.push('\n');
    }
    out
}
